// SPDX-FileCopyrightText: 2026 GSI Helmholtzzentrum f. Schwerionenforschung GmbH, Darmstadt, Germany
// SPDX-License-Identifier: LGPL-3.0-or-later

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table},
    Frame,
};

use crate::app::{App, Focus, View};
use crate::client::ConnectionState;
use crate::ecs::phase::{CUSTOM_GROUP, OBSERVER_GROUP};
use crate::ecs::{EntityClass, EntityList, EntityNode, NodeId};
use crate::tree_view::{tree_prefix, DisplayRow, TreeView};

use super::inspector::render_inspector;
use super::performance::render_performance;

/// Colors for the tree visualization
const BRANCH_COLOR: Color = Color::DarkGray;
const SELECTED_BG: Color = Color::DarkGray;
const ENTITY_NAME_COLOR: Color = Color::White;
const ANONYMOUS_COLOR: Color = Color::Gray;
const SECTION_COLOR: Color = Color::Cyan;
const DETAIL_COLOR: Color = Color::Cyan;
pub(super) const ACTIVE_BORDER: Color = Color::White;
pub(super) const INACTIVE_BORDER: Color = Color::DarkGray;

/// Width of the right-aligned info column
const COL_INFO: u16 = 28;

/// Number of component names listed before "+N more"
const MAX_LISTED_COMPONENTS: usize = 3;

/// Color of a pipeline phase tag; OnStart shares the OnLoad color
pub fn phase_color(phase: &str) -> Color {
    match phase {
        "OnStart" | "OnLoad" => Color::Blue,
        "PostLoad" => Color::LightBlue,
        "PreUpdate" => Color::Cyan,
        "OnUpdate" => Color::Green,
        "OnValidate" => Color::LightGreen,
        "PostUpdate" => Color::Yellow,
        "PreStore" => Color::LightYellow,
        "OnStore" => Color::Magenta,
        "PostFrame" => Color::LightMagenta,
        OBSERVER_GROUP => Color::LightRed,
        CUSTOM_GROUP => Color::Gray,
        _ => Color::Gray,
    }
}

/// Render the entire UI
pub fn render_ui(frame: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Title bar
            Constraint::Min(0),    // Panes
            Constraint::Length(1), // Footer/status
        ])
        .split(frame.area());

    render_title(frame, chunks[0], app);
    match app.view {
        View::Entities => {
            let panes = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
                .split(chunks[1]);
            render_tree(frame, panes[0], app);
            render_inspector(frame, panes[1], app);
        }
        View::Performance => render_performance(frame, chunks[1], app),
    }
    render_footer(frame, chunks[2], app);
}

fn render_title(frame: &mut Frame, area: Rect, app: &App) {
    let title = " ecsi | ";
    let state_label = app.connection.label();
    let state_color = match app.connection {
        ConnectionState::Connected => Color::Green,
        ConnectionState::Disconnected => Color::Red,
        ConnectionState::Reconnecting => Color::Yellow,
    };

    let stats = match &app.world {
        Some(w) => format!(
            "entities:{:.0}  systems:{:.0}  {:.1}fps  frame:{:.2}ms ",
            w.entity_count, w.system_count, w.fps, w.frame_time_ms
        ),
        None => String::new(),
    };

    let used = title.len() + state_label.len() + stats.len();
    let padding = (area.width as usize).saturating_sub(used);

    let header_line = Line::from(vec![
        Span::styled(title, Style::default().fg(Color::White).add_modifier(Modifier::BOLD)),
        Span::styled(state_label, Style::default().fg(state_color).add_modifier(Modifier::BOLD)),
        Span::raw(" ".repeat(padding)),
        Span::styled(stats, Style::default().fg(Color::Gray)),
    ]);

    let header = Paragraph::new(header_line).style(Style::default().bg(Color::Black));
    frame.render_widget(header, area);
}

fn render_tree(frame: &mut Frame, area: Rect, app: &mut App) {
    let border = if app.focus == Focus::Tree {
        ACTIVE_BORDER
    } else {
        INACTIVE_BORDER
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border))
        .title(" Entities ");

    let inner_height = area.height.saturating_sub(2) as usize;
    app.tree.scroll.set_visible_rows(inner_height);

    if app.tree.is_empty() {
        let connected = app.connection == ConnectionState::Connected;
        let text = if app.entities.is_empty() && connected {
            "No entities"
        } else {
            "Waiting for data"
        };
        let empty = Paragraph::new(Span::styled(text, Style::default().add_modifier(Modifier::DIM)))
            .block(block);
        frame.render_widget(empty, area);
        return;
    }

    let tree = &app.tree;
    let list = &app.entities;
    let rows: Vec<Row> = tree
        .scroll
        .visible_range()
        .map(|idx| {
            let row = render_tree_row(tree, list, tree.rows()[idx]);
            if idx == tree.scroll.cursor {
                row.style(Style::default().bg(SELECTED_BG))
            } else {
                row
            }
        })
        .collect();

    let table = Table::new(rows, [Constraint::Min(10), Constraint::Length(COL_INFO)]).block(block);
    frame.render_widget(table, area);
}

fn render_tree_row(tree: &TreeView, list: &EntityList, row: DisplayRow) -> Row<'static> {
    match row {
        DisplayRow::Section(class) => {
            let marker = if tree.is_section_collapsed(class) { "> " } else { "v " };
            let name = class.section_name();
            let line = Line::from(vec![
                Span::raw(marker),
                Span::styled(
                    name[..1].to_string(),
                    Style::default().fg(SECTION_COLOR).add_modifier(Modifier::BOLD),
                ),
                Span::styled(
                    format!("{} ({})", &name[1..], tree.section_count(class)),
                    Style::default().fg(SECTION_COLOR),
                ),
            ]);
            Row::new(vec![Cell::from(line), Cell::from("")])
        }
        DisplayRow::Phase(index) => {
            let Some(group) = tree.phases.get(index) else {
                return Row::new(vec![Cell::from(""), Cell::from("")]);
            };
            let marker = if group.collapsed { "  > " } else { "  v " };
            let line = Line::from(vec![
                Span::raw(marker),
                Span::styled(
                    group.name.clone(),
                    Style::default().fg(phase_color(&group.name)).add_modifier(Modifier::BOLD),
                ),
                Span::styled(
                    format!(" ({})", group.system_count),
                    Style::default().add_modifier(Modifier::DIM),
                ),
            ]);
            Row::new(vec![Cell::from(line), Cell::from("")])
        }
        DisplayRow::Entity { node, .. } => render_entity_row(list, node),
    }
}

fn render_entity_row(list: &EntityList, id: NodeId) -> Row<'static> {
    let node = list.node(id);

    let marker = if !node.has_children() {
        "  "
    } else if node.expanded {
        "v "
    } else {
        "> "
    };
    let name_style = if node.is_anonymous() {
        Style::default().fg(ANONYMOUS_COLOR).add_modifier(Modifier::DIM)
    } else {
        Style::default().fg(ENTITY_NAME_COLOR)
    };

    let name_cell = Line::from(vec![
        Span::styled(tree_prefix(list, id), Style::default().fg(BRANCH_COLOR)),
        Span::raw(marker),
        Span::styled(node.display_name(), name_style),
    ]);

    let row = Row::new(vec![Cell::from(name_cell), Cell::from(info_line(node).right_aligned())]);

    // Disabled systems render entirely dimmed
    if node.class == EntityClass::System && node.disabled {
        row.style(Style::default().add_modifier(Modifier::DIM))
    } else {
        row
    }
}

/// Right column: phase tag for systems, detail label, or component names
fn info_line(node: &EntityNode) -> Line<'static> {
    match (&node.class_detail, node.class) {
        (Some(detail), EntityClass::System) => {
            let mut spans = vec![Span::styled(
                format!("[{}]", detail),
                Style::default().fg(phase_color(detail)),
            )];
            if node.match_count > 0 {
                spans.push(Span::styled(
                    format!(" ({})", node.match_count),
                    Style::default().add_modifier(Modifier::DIM),
                ));
            }
            Line::from(spans)
        }
        (Some(detail), _) => Line::from(Span::styled(
            format!("[{}]", detail),
            Style::default().fg(DETAIL_COLOR).add_modifier(Modifier::DIM),
        )),
        (None, _) if !node.components.is_empty() => {
            let mut text = node
                .components
                .iter()
                .take(MAX_LISTED_COMPONENTS)
                .cloned()
                .collect::<Vec<_>>()
                .join(", ");
            if node.components.len() > MAX_LISTED_COMPONENTS {
                text.push_str(&format!(" +{} more", node.components.len() - MAX_LISTED_COMPONENTS));
            }
            Line::from(Span::styled(text, Style::default().add_modifier(Modifier::DIM)))
        }
        (None, _) => Line::default(),
    }
}

fn render_footer(frame: &mut Frame, area: Rect, app: &App) {
    let text = if let Some(notice) = app.notice() {
        Span::styled(format!(" {} ", notice), Style::default().fg(Color::Yellow))
    } else if let Some(ref err) = app.error {
        Span::styled(format!(" Error: {} ", err), Style::default().fg(Color::Red))
    } else if app.view == View::Performance {
        Span::styled(
            " q:quit  j/k:scroll  p:entities  r:refresh ",
            Style::default().fg(Color::Gray),
        )
    } else {
        let count = app.tree.rows().len();
        let pos = if count > 0 { app.tree.scroll.cursor + 1 } else { 0 };
        let anon = if app.tree.show_anonymous() { "hide" } else { "show" };
        Span::styled(
            format!(
                " {}/{} | q:quit  j/k:nav  enter:toggle  tab:pane  f:{} anon  p:perf  r:refresh ",
                pos, count, anon
            ),
            Style::default().fg(Color::Gray),
        )
    };

    let footer = Paragraph::new(Line::from(text));
    frame.render_widget(footer, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::phase::PHASE_ORDER;

    #[test]
    fn test_phase_colors() {
        assert_eq!(phase_color("OnStart"), phase_color("OnLoad"));
        assert_eq!(phase_color("Custom"), Color::Gray);
        for phase in PHASE_ORDER.iter().skip(1) {
            assert_ne!(phase_color(phase), Color::Gray, "{}", phase);
        }
    }

    #[test]
    fn test_info_line_lists_components() {
        let mut node = EntityNode::new(1, Some("Ship".into()));
        node.components = vec!["A".into(), "B".into(), "C".into(), "D".into(), "E".into()];
        let line = info_line(&node);
        assert_eq!(line.spans[0].content, "A, B, C +2 more");
    }
}
