// SPDX-FileCopyrightText: 2026 GSI Helmholtzzentrum f. Schwerionenforschung GmbH, Darmstadt, Germany
// SPDX-License-Identifier: LGPL-3.0-or-later

//! Performance view: system timings grouped by pipeline phase.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::app::App;
use crate::ecs::perf::{PerfGroup, PerfReport};

use super::tree::{phase_color, ACTIVE_BORDER};

/// Width of the system name column
const NAME_WIDTH: usize = 24;
/// Room kept right of the bar for the time label
const TIME_WIDTH: usize = 10;
const TIME_COLOR: Color = Color::Yellow;

pub fn render_performance(frame: &mut Frame, area: Rect, app: &mut App) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(ACTIVE_BORDER))
        .title(" Performance ");
    let inner = block.inner(area);
    frame.render_widget(block, area);

    if app.perf.is_empty() {
        let waiting = Paragraph::new(Span::styled(
            "Waiting for pipeline data",
            Style::default().add_modifier(Modifier::DIM),
        ));
        frame.render_widget(waiting, inner);
        return;
    }

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2), // Frame stats
            Constraint::Min(0),    // Phase groups
            Constraint::Length(1), // Totals
        ])
        .split(inner);

    app.perf_scroll.set_total(app.perf.row_count());
    app.perf_scroll.set_visible_rows(chunks[1].height as usize);

    let app: &App = app;
    render_stats(frame, chunks[0], app);

    let bar_max = (chunks[1].width as usize)
        .saturating_sub(NAME_WIDTH + TIME_WIDTH + 4)
        .max(4);
    let lines = report_lines(&app.perf, bar_max);
    let visible: Vec<Line> = app
        .perf_scroll
        .visible_range()
        .filter_map(|idx| lines.get(idx).cloned())
        .collect();
    frame.render_widget(Paragraph::new(visible), chunks[1]);

    render_totals(frame, chunks[2], app);
}

fn render_stats(frame: &mut Frame, area: Rect, app: &App) {
    let label = Style::default().fg(Color::Cyan);
    let line = match &app.world {
        Some(w) => Line::from(vec![
            Span::styled(" FPS: ", label),
            Span::raw(format!("{:.1}", w.fps)),
            Span::styled("   Frame: ", label),
            Span::raw(format!("{:.2}ms", w.frame_time_ms)),
            Span::styled("   Systems: ", label),
            Span::raw(app.perf.system_count.to_string()),
        ]),
        None => Line::from(Span::styled(
            " No world stats available",
            Style::default().add_modifier(Modifier::DIM),
        )),
    };
    frame.render_widget(Paragraph::new(line), area);
}

/// All scrollable rows: per group a header, its systems, and a blank line
fn report_lines(report: &PerfReport, bar_max: usize) -> Vec<Line<'static>> {
    let mut lines = Vec::with_capacity(report.row_count());
    for group in &report.groups {
        lines.push(group_header(group));
        let color = phase_color(group.phase);
        for entry in &group.entries {
            let name_style = if entry.disabled {
                Style::default().fg(Color::DarkGray).add_modifier(Modifier::DIM)
            } else {
                Style::default().fg(color)
            };
            let bar = "─".repeat(report.bar_width(entry.time_ms, bar_max));
            lines.push(Line::from(vec![
                Span::raw("    "),
                Span::styled(
                    format!("{:<width$.width$}", entry.name, width = NAME_WIDTH),
                    name_style,
                ),
                Span::styled(bar, Style::default().fg(color).add_modifier(Modifier::BOLD)),
                Span::styled(
                    format!(" {:.3}ms", entry.time_ms),
                    Style::default().fg(TIME_COLOR),
                ),
            ]));
        }
        lines.push(Line::default());
    }
    lines
}

fn group_header(group: &PerfGroup) -> Line<'static> {
    let count = group.entries.len();
    Line::from(vec![
        Span::styled(
            format!("  {}", group.phase),
            Style::default()
                .fg(phase_color(group.phase))
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!(
                " ({} system{}, {:.2}ms)",
                count,
                if count == 1 { "" } else { "s" },
                group.total_ms
            ),
            Style::default().add_modifier(Modifier::DIM),
        ),
    ])
}

fn render_totals(frame: &mut Frame, area: Rect, app: &App) {
    let report = &app.perf;
    let mut spans = vec![
        Span::styled(" Total:", Style::default().add_modifier(Modifier::BOLD)),
        Span::raw(format!(
            " {} system{}, {:.2}ms/frame",
            report.system_count,
            if report.system_count == 1 { "" } else { "s" },
            report.total_ms
        )),
    ];
    if let Some(usage) = app.world.and_then(|w| report.budget_usage(w.fps)) {
        spans.push(Span::styled(
            format!("  ({:.0}% of frame budget)", usage),
            Style::default().add_modifier(Modifier::DIM),
        ));
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::perf::PerfEntry;

    fn entry(name: &str, time_ms: f64) -> PerfEntry {
        PerfEntry {
            name: name.into(),
            time_ms,
            disabled: false,
        }
    }

    #[test]
    fn test_report_lines_layout() {
        let report = PerfReport {
            groups: vec![
                PerfGroup {
                    phase: "OnLoad",
                    entries: vec![entry("Load", 1.0)],
                    total_ms: 1.0,
                },
                PerfGroup {
                    phase: "OnUpdate",
                    entries: vec![entry("Move", 2.0), entry("Tick", 0.5)],
                    total_ms: 2.5,
                },
            ],
            max_ms: 2.0,
            total_ms: 3.5,
            system_count: 3,
        };

        let lines = report_lines(&report, 20);
        assert_eq!(lines.len(), report.row_count());

        let text = |i: usize| -> String {
            lines[i].spans.iter().map(|s| s.content.as_ref()).collect()
        };
        assert_eq!(text(0), "  OnLoad (1 system, 1.00ms)");
        assert_eq!(text(2), "");
        assert_eq!(text(3), "  OnUpdate (2 systems, 2.50ms)");
        assert!(text(4).starts_with("    Move"));
        assert_eq!(lines[4].spans[2].content.chars().count(), 20);
        assert_eq!(lines[5].spans[2].content.chars().count(), 5);
        assert!(text(5).ends_with(" 0.500ms"));
    }
}
