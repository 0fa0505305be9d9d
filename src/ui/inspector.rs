// SPDX-FileCopyrightText: 2026 GSI Helmholtzzentrum f. Schwerionenforschung GmbH, Darmstadt, Germany
// SPDX-License-Identifier: LGPL-3.0-or-later

//! Right-hand pane: detail of the selected entity.

use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph},
    Frame,
};

use crate::app::{App, Focus, InspectorItem};

use super::tree::{ACTIVE_BORDER, INACTIVE_BORDER};

const HEADING_COLOR: Color = Color::Cyan;
const KEY_COLOR: Color = Color::Cyan;
const VALUE_COLOR: Color = Color::Yellow;
const LINK_COLOR: Color = Color::Green;
const SELECTED_BG: Color = Color::DarkGray;
const CHANGED_BG: Color = Color::Yellow;

pub fn render_inspector(frame: &mut Frame, area: Rect, app: &mut App) {
    let border = if app.focus == Focus::Inspector {
        ACTIVE_BORDER
    } else {
        INACTIVE_BORDER
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border))
        .title(" Inspector ");

    let items = app.inspector_items();
    app.inspector.set_total(items.len());
    app.inspector.set_visible_rows(area.height.saturating_sub(2) as usize);

    if items.is_empty() {
        let hint = Paragraph::new(Span::styled(
            "Select an entity",
            Style::default().add_modifier(Modifier::DIM),
        ))
        .block(block);
        frame.render_widget(hint, area);
        return;
    }

    let app: &App = app;
    let show_cursor = app.focus == Focus::Inspector;
    let lines: Vec<ListItem> = app
        .inspector
        .visible_range()
        .map(|idx| {
            let line = item_line(app, &items[idx]);
            let item = ListItem::new(line);
            if show_cursor && idx == app.inspector.cursor {
                item.style(Style::default().bg(SELECTED_BG))
            } else {
                item
            }
        })
        .collect();

    frame.render_widget(List::new(lines).block(block), area);
}

fn item_line(app: &App, item: &InspectorItem) -> Line<'static> {
    match item {
        InspectorItem::Heading(text) => Line::from(Span::styled(
            text.clone(),
            Style::default().fg(HEADING_COLOR).add_modifier(Modifier::BOLD),
        )),
        InspectorItem::Field { key, value } => {
            // Recently changed values flash
            let value_style = if app.value_changed(key) {
                Style::default().fg(Color::Black).bg(CHANGED_BG)
            } else {
                Style::default().fg(VALUE_COLOR)
            };
            Line::from(vec![
                Span::styled(format!("  {}: ", key), Style::default().fg(KEY_COLOR)),
                Span::styled(value.clone(), value_style),
            ])
        }
        InspectorItem::Text(text) => Line::from(format!("  {}", text)),
        InspectorItem::Entity(id) => {
            let node = app.entities.node(*id);
            Line::from(vec![
                Span::raw("  "),
                Span::styled(node.display_name(), Style::default().fg(LINK_COLOR)),
                Span::styled(
                    format!("  {}", node.full_path),
                    Style::default().add_modifier(Modifier::DIM),
                ),
            ])
        }
    }
}
