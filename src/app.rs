// SPDX-FileCopyrightText: 2026 GSI Helmholtzzentrum f. Schwerionenforschung GmbH, Darmstadt, Germany
// SPDX-License-Identifier: LGPL-3.0-or-later

use std::collections::HashMap;
use std::time::{Duration, Instant};

use log::{debug, warn};
use serde_json::Value;

use crate::client::{ConnectionState, EcsClient};
use crate::ecs::classify::{
    annotate_components, classify_all, enrich_systems, entities_for_system, entities_with_component,
};
use crate::ecs::perf::PerfReport;
use crate::ecs::types::{ComponentRegistry, EntityDetail, SystemRegistry, WorldSnapshot};
use crate::ecs::{ClassificationPolicy, DefaultPolicy, EntityClass, EntityList, NodeId};
use crate::scroll::ScrollState;
use crate::tree_view::TreeView;

/// How long a footer notice stays visible
pub const NOTICE_DURATION: Duration = Duration::from_secs(3);

/// Notice shown when the selected entity disappears between polls
pub const NOTICE_SELECTION_GONE: &str = "Selected entity is gone";

/// How long a changed component value stays highlighted
pub const CHANGE_HIGHLIGHT: Duration = Duration::from_secs(2);

/// Top-level screen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    /// Entity tree and inspector
    Entities,
    /// Per-phase system timings
    Performance,
}

impl View {
    pub fn toggle(self) -> Self {
        match self {
            View::Entities => View::Performance,
            View::Performance => View::Entities,
        }
    }
}

/// Pane receiving navigation keys in the entities view
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Tree,
    Inspector,
}

/// One line of the inspector pane
#[derive(Debug, Clone, PartialEq)]
pub enum InspectorItem {
    Heading(String),
    Field { key: String, value: String },
    Text(String),
    /// Entity reference, Enter jumps to it in the tree
    Entity(NodeId),
}

/// Application state
pub struct App {
    /// Live entity list of the latest successful poll
    pub entities: EntityList,
    /// Component registry of the latest poll
    pub components: ComponentRegistry,
    /// Pipeline stats of the latest poll
    pub systems: SystemRegistry,
    /// World gauges of the latest poll
    pub world: Option<WorldSnapshot>,
    /// Detail of the selected entity
    pub detail: Option<EntityDetail>,
    /// Row model of the tree pane
    pub tree: TreeView,
    /// Cursor of the inspector pane
    pub inspector: ScrollState,
    /// Screen currently shown
    pub view: View,
    /// Pane receiving navigation keys
    pub focus: Focus,
    /// Path of the entity whose detail is polled
    pub selected_path: Option<String>,
    /// Entity id behind `selected_path`, followed across renames
    selected_id: Option<u64>,
    /// When each detail component value last changed
    changed: HashMap<String, Instant>,
    /// Timing breakdown for the performance view
    pub perf: PerfReport,
    /// Scroll position of the performance view
    pub perf_scroll: ScrollState,
    /// Reachability of the REST endpoint
    pub connection: ConnectionState,
    /// Transient footer notice and when it was raised
    notice: Option<(String, Instant)>,
    /// Last poll error, cleared by the next successful poll
    pub error: Option<String>,
    /// Last refresh time
    pub last_refresh: Instant,
    /// Refresh interval
    pub refresh_interval: Duration,
    /// Should quit
    pub should_quit: bool,
    policy: Box<dyn ClassificationPolicy>,
}

impl App {
    pub fn new(refresh_ms: u64) -> Self {
        Self::with_policy(refresh_ms, Box::new(DefaultPolicy))
    }

    pub fn with_policy(refresh_ms: u64, policy: Box<dyn ClassificationPolicy>) -> Self {
        let refresh_interval = Duration::from_millis(refresh_ms);
        Self {
            entities: EntityList::default(),
            components: ComponentRegistry::default(),
            systems: SystemRegistry::default(),
            world: None,
            detail: None,
            tree: TreeView::new(),
            inspector: ScrollState::new(),
            view: View::Entities,
            focus: Focus::Tree,
            selected_path: None,
            selected_id: None,
            changed: HashMap::new(),
            perf: PerfReport::default(),
            perf_scroll: ScrollState::new(),
            connection: ConnectionState::Disconnected,
            notice: None,
            error: None,
            // Poll right away on the first tick
            last_refresh: Instant::now()
                .checked_sub(refresh_interval)
                .unwrap_or_else(Instant::now),
            refresh_interval,
            should_quit: false,
            policy,
        }
    }

    /// Check if refresh is needed
    pub fn needs_refresh(&self) -> bool {
        self.last_refresh.elapsed() >= self.refresh_interval
    }

    /// Poll every endpoint and install whatever arrived intact.
    ///
    /// A failed endpoint leaves its previous data in place.
    pub fn refresh(&mut self, client: &mut EcsClient) {
        self.last_refresh = Instant::now();

        let world = client.world_stats();
        self.connection = client.state;
        match world {
            Ok(snapshot) => self.world = Some(snapshot),
            Err(e) => {
                self.error = Some(format!("{:#}", e));
                return;
            }
        }

        match client.components() {
            Ok(components) => self.components = components,
            Err(e) => warn!("Keeping previous component registry: {:#}", e),
        }
        match client.pipeline() {
            Ok(systems) => self.systems = systems,
            Err(e) => warn!("Keeping previous pipeline stats: {:#}", e),
        }

        match client.entities() {
            Ok(list) => {
                self.error = None;
                self.install_entities(list);
            }
            Err(e) => {
                warn!("Keeping previous entity list: {:#}", e);
                self.error = Some(format!("{:#}", e));
                self.perf = PerfReport::build(&self.systems, &self.entities);
            }
        }

        if let Some(path) = self.selected_path.clone() {
            match client.entity_detail(&path) {
                Ok(detail) => self.record_detail(detail),
                Err(e) => debug!("No detail for {}: {:#}", path, e),
            }
        }
        self.connection = client.state;
    }

    /// Replace the live entity list and derive everything built on it
    pub fn install_entities(&mut self, list: EntityList) {
        let previous = self.selected_id;

        self.entities = list;
        self.tree.apply_expand_state(&mut self.entities);
        classify_all(&mut self.entities, self.policy.as_ref());
        annotate_components(&mut self.entities, &self.components);
        enrich_systems(&mut self.entities, &self.systems);
        self.tree.phases.regroup(&self.entities);
        self.tree.rebuild(&self.entities);

        debug!(
            "Installed {} entities ({} roots, {} rows)",
            self.entities.count(),
            self.entities.root_count(),
            self.tree.rows().len()
        );

        if let Some(entity_id) = previous {
            if self.entities.find_by_id(entity_id).is_none() {
                self.raise_notice(NOTICE_SELECTION_GONE);
            }
        }
        self.sync_selection();
        self.perf = PerfReport::build(&self.systems, &self.entities);
    }

    /// Derive the selection from the tree cursor.
    ///
    /// On a header row the previous selection stays, found again by id. The
    /// first entity is only picked while nothing is selected.
    fn sync_selection(&mut self) {
        let node = match (self.tree.selected(), self.selected_id) {
            (Some(id), _) => Some(id),
            (None, Some(entity_id)) => self.entities.find_by_id(entity_id),
            (None, None) => self.tree.first_entity(),
        };
        let path = node.map(|id| self.entities.node(id).full_path.clone());

        if path != self.selected_path {
            self.detail = None;
            self.changed.clear();
            self.inspector.reset();
        }
        self.selected_path = path;
        self.selected_id = node.map(|id| self.entities.node(id).id);
    }

    /// Store a freshly polled detail, timestamping component values that
    /// differ from the previous detail of the same entity
    pub fn record_detail(&mut self, detail: EntityDetail) {
        self.record_detail_at(detail, Instant::now());
    }

    fn record_detail_at(&mut self, detail: EntityDetail, now: Instant) {
        match &self.detail {
            Some(old) if old.id == detail.id => {
                for (name, value) in &detail.components {
                    let before = old.components.iter().find(|(n, _)| n == name).map(|(_, v)| v);
                    if before != Some(value) {
                        self.changed.insert(name.clone(), now);
                    }
                }
            }
            _ => self.changed.clear(),
        }
        self.changed.retain(|_, at| now.duration_since(*at) < CHANGE_HIGHLIGHT);
        self.detail = Some(detail);
    }

    /// True while the component value `name` is inside its highlight window
    pub fn value_changed(&self, name: &str) -> bool {
        self.value_changed_at(name, Instant::now())
    }

    fn value_changed_at(&self, name: &str, now: Instant) -> bool {
        self.changed
            .get(name)
            .is_some_and(|at| now.duration_since(*at) < CHANGE_HIGHLIGHT)
    }

    fn raise_notice(&mut self, text: &str) {
        self.notice = Some((text.to_string(), Instant::now()));
    }

    /// Footer notice, while it has not expired
    pub fn notice(&self) -> Option<&str> {
        self.notice_at(Instant::now())
    }

    fn notice_at(&self, now: Instant) -> Option<&str> {
        match &self.notice {
            Some((text, raised)) if now.duration_since(*raised) < NOTICE_DURATION => {
                Some(text.as_str())
            }
            _ => None,
        }
    }

    /// Entity under the tree cursor, else the entity whose detail is polled
    pub fn selected_node(&self) -> Option<NodeId> {
        self.tree
            .selected()
            .or_else(|| self.selected_id.and_then(|id| self.entities.find_by_id(id)))
    }

    fn focused_scroll(&mut self) -> &mut ScrollState {
        match (self.view, self.focus) {
            (View::Performance, _) => &mut self.perf_scroll,
            (View::Entities, Focus::Tree) => &mut self.tree.scroll,
            (View::Entities, Focus::Inspector) => &mut self.inspector,
        }
    }

    fn after_move(&mut self) {
        if self.view == View::Entities && self.focus == Focus::Tree {
            self.sync_selection();
        }
    }

    /// Move selection up
    pub fn select_prev(&mut self) {
        self.focused_scroll().move_by(-1);
        self.after_move();
    }

    /// Move selection down
    pub fn select_next(&mut self) {
        self.focused_scroll().move_by(1);
        self.after_move();
    }

    /// Page up
    pub fn page_up(&mut self) {
        self.focused_scroll().page(-1);
        self.after_move();
    }

    /// Page down
    pub fn page_down(&mut self) {
        self.focused_scroll().page(1);
        self.after_move();
    }

    /// Jump to top
    pub fn select_first(&mut self) {
        self.focused_scroll().to_top();
        self.after_move();
    }

    /// Jump to bottom
    pub fn select_last(&mut self) {
        self.focused_scroll().to_bottom();
        self.after_move();
    }

    pub fn toggle_view(&mut self) {
        self.view = self.view.toggle();
    }

    pub fn toggle_focus(&mut self) {
        self.focus = match self.focus {
            Focus::Tree => Focus::Inspector,
            Focus::Inspector => Focus::Tree,
        };
    }

    /// Enter: toggle in the tree, follow an entity link in the inspector
    pub fn activate(&mut self) {
        if self.view == View::Performance {
            return;
        }
        match self.focus {
            Focus::Tree => {
                self.tree.toggle(&mut self.entities);
                self.sync_selection();
            }
            Focus::Inspector => {
                let items = self.inspector_items();
                if let Some(InspectorItem::Entity(id)) = items.get(self.inspector.cursor) {
                    let path = self.entities.node(*id).full_path.clone();
                    self.navigate_to(&path);
                }
            }
        }
    }

    /// Move the tree cursor onto the entity at `path`
    pub fn navigate_to(&mut self, path: &str) -> bool {
        if self.tree.reveal(&mut self.entities, path) {
            self.focus = Focus::Tree;
            self.sync_selection();
            true
        } else {
            self.raise_notice("Entity not found");
            false
        }
    }

    pub fn toggle_anonymous(&mut self) {
        self.tree.toggle_anonymous(&self.entities);
        self.sync_selection();
    }

    /// Lines of the inspector pane for the current selection
    pub fn inspector_items(&self) -> Vec<InspectorItem> {
        let mut items = Vec::new();
        let Some(id) = self.selected_node() else {
            return items;
        };
        let node = self.entities.node(id);

        items.push(InspectorItem::Heading(node.display_name()));
        items.push(field("path", &node.full_path));
        items.push(field("id", &node.id.to_string()));
        let class = match &node.class_detail {
            Some(detail) => format!("{} [{}]", node.class.section_name(), detail),
            None => node.class.section_name().to_string(),
        };
        items.push(field("class", &class));

        if node.class == EntityClass::Component {
            let users = entities_with_component(&self.entities, id);
            items.push(InspectorItem::Heading(format!(
                "Entities with {} ({})",
                node.display_name(),
                users.len()
            )));
            items.extend(users.into_iter().map(InspectorItem::Entity));
            return items;
        }

        if node.class == EntityClass::System {
            items.push(field("matched", &node.match_count.to_string()));
            items.push(field("disabled", if node.disabled { "yes" } else { "no" }));
            if let Some(info) = node.name.as_deref().and_then(|n| self.systems.find(n)) {
                items.push(field("pipeline", &info.full_path));
                items.push(field("tables", &info.matched_table_count.to_string()));
                items.push(field("time", &format!("{:.3}ms", info.time_spent_ms)));
            }
        }

        let detail = self
            .detail
            .as_ref()
            .filter(|d| d.id == node.id || d.path.as_deref() == Some(node.full_path.as_str()));
        if let Some(detail) = detail {
            if let Some(brief) = &detail.doc_brief {
                items.push(InspectorItem::Text(brief.clone()));
            }
            if !detail.components.is_empty() {
                items.push(InspectorItem::Heading("Components".to_string()));
                for (name, value) in &detail.components {
                    items.push(field(name, &format_value(value)));
                }
            }
            if !detail.tags.is_empty() {
                items.push(InspectorItem::Heading("Tags".to_string()));
                items.extend(detail.tags.iter().cloned().map(InspectorItem::Text));
            }
            if !detail.pairs.is_empty() {
                items.push(InspectorItem::Heading("Pairs".to_string()));
                for (relation, target) in &detail.pairs {
                    items.push(field(relation, &format_value(target)));
                }
            }
        } else if !node.components.is_empty() {
            items.push(InspectorItem::Heading("Components".to_string()));
            items.extend(node.components.iter().cloned().map(InspectorItem::Text));
        }

        if node.class == EntityClass::System {
            let matched = entities_for_system(&self.entities, id);
            items.push(InspectorItem::Heading(format!(
                "Matched entities, approx. ({})",
                matched.len()
            )));
            items.extend(matched.into_iter().map(InspectorItem::Entity));
        }

        items
    }
}

fn field(key: &str, value: &str) -> InspectorItem {
    InspectorItem::Field {
        key: key.to_string(),
        value: value.to_string(),
    }
}

/// Compact one-line rendering of a component value
fn format_value(value: &Value) -> String {
    match value {
        Value::Null => "-".to_string(),
        Value::String(s) => s.clone(),
        Value::Object(map) => {
            let fields: Vec<String> = map
                .iter()
                .map(|(k, v)| format!("{}: {}", k, format_value(v)))
                .collect();
            format!("{{{}}}", fields.join(", "))
        }
        Value::Array(items) => {
            let items: Vec<String> = items.iter().map(format_value).collect();
            format!("[{}]", items.join(", "))
        }
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::parser::parse_entity_list;
    use crate::tree_view::DisplayRow;

    const POLL: &str = r#"{"results": [
        {"name": "Scene", "id": 1},
        {"name": "Player", "parent": "Scene", "id": 2, "components": {"Position": null}},
        {"name": "Rock", "id": 3, "components": {"Position": null}},
        {"name": "Move", "id": 10, "components": {"Position": null},
         "tags": ["flecs.system.System", "flecs.pipeline.OnUpdate"]},
        {"name": "Position", "id": 30, "components": {"Component": null}}
    ]}"#;

    fn app_with(json: &str) -> App {
        let mut app = App::new(500);
        for class in EntityClass::ALL {
            app.tree.set_section_collapsed(class, false);
        }
        app.install_entities(parse_entity_list(json).unwrap());
        app
    }

    fn cursor_to(app: &mut App, path: &str) {
        let index = app
            .tree
            .rows()
            .iter()
            .position(|row| match row {
                DisplayRow::Entity { node, .. } => app.entities.node(*node).full_path == path,
                _ => false,
            })
            .unwrap();
        app.tree.scroll.select(index);
        app.sync_selection();
    }

    #[test]
    fn test_first_entity_becomes_selection_target() {
        let app = app_with(POLL);
        assert_eq!(app.selected_path.as_deref(), Some("Scene"));
    }

    #[test]
    fn test_install_classifies_and_groups() {
        let app = app_with(POLL);
        let mv = app.entities.find_by_path("Move").unwrap();
        assert_eq!(app.entities.node(mv).class, EntityClass::System);
        assert_eq!(app.tree.phases.groups().len(), 1);
        assert_eq!(app.tree.phases.groups()[0].name, "OnUpdate");
    }

    #[test]
    fn test_selection_survives_poll() {
        let mut app = app_with(POLL);
        cursor_to(&mut app, "Rock");
        app.install_entities(parse_entity_list(POLL).unwrap());
        assert_eq!(app.selected_path.as_deref(), Some("Rock"));
        assert_eq!(app.notice(), None);
    }

    #[test]
    fn test_vanished_selection_raises_notice() {
        let mut app = app_with(POLL);
        cursor_to(&mut app, "Rock");
        app.detail = Some(EntityDetail::default());

        let next = parse_entity_list(r#"{"results": [{"name": "Scene", "id": 1}]}"#).unwrap();
        app.install_entities(next);
        assert_eq!(app.notice(), Some(NOTICE_SELECTION_GONE));
        assert!(app.detail.is_none());

        let (_, raised) = app.notice.clone().unwrap();
        assert_eq!(app.notice_at(raised + NOTICE_DURATION), None);
    }

    #[test]
    fn test_component_inspector_lists_users() {
        let mut app = app_with(POLL);
        cursor_to(&mut app, "Position");
        let entities: Vec<String> = app
            .inspector_items()
            .into_iter()
            .filter_map(|item| match item {
                InspectorItem::Entity(id) => Some(app.entities.node(id).full_path.clone()),
                _ => None,
            })
            .collect();
        assert_eq!(entities, vec!["Scene/Player", "Rock", "Move"]);
    }

    #[test]
    fn test_inspector_cross_navigation() {
        let mut app = app_with(POLL);
        cursor_to(&mut app, "Move");
        let items = app.inspector_items();
        let rock = items
            .iter()
            .position(|item| match item {
                InspectorItem::Entity(id) => app.entities.node(*id).full_path == "Rock",
                _ => false,
            })
            .unwrap();

        app.toggle_focus();
        app.inspector.set_total(items.len());
        app.inspector.select(rock);
        app.activate();

        assert_eq!(app.focus, Focus::Tree);
        assert_eq!(app.selected_path.as_deref(), Some("Rock"));
    }

    #[test]
    fn test_navigate_to_missing_entity() {
        let mut app = app_with(POLL);
        assert!(!app.navigate_to("Nowhere"));
        assert_eq!(app.notice(), Some("Entity not found"));
    }

    #[test]
    fn test_detail_rendered_in_inspector() {
        let mut app = app_with(POLL);
        cursor_to(&mut app, "Rock");
        app.detail = Some(EntityDetail {
            path: Some("Rock".into()),
            id: 3,
            components: vec![("Position".into(), serde_json::json!({"x": 1, "y": 2.5}))],
            tags: vec!["Heavy".into()],
            ..Default::default()
        });
        let items = app.inspector_items();
        assert!(items.contains(&field("Position", "{x: 1, y: 2.5}")));
        assert!(items.contains(&InspectorItem::Text("Heavy".into())));
    }

    #[test]
    fn test_header_cursor_keeps_selection_across_polls() {
        let mut app = app_with(POLL);
        app.tree.scroll.select(0);
        app.detail = Some(EntityDetail {
            id: 1,
            ..Default::default()
        });

        let mut seen = Vec::new();
        for _ in 0..4 {
            app.install_entities(parse_entity_list(POLL).unwrap());
            seen.push(app.selected_path.clone());
        }
        assert_eq!(seen, vec![Some("Scene".to_string()); 4]);
        assert!(app.detail.is_some());
    }

    #[test]
    fn test_link_to_system_in_collapsed_section() {
        let mut app = App::new(500);
        for class in EntityClass::ALL {
            app.tree.set_section_collapsed(class, class == EntityClass::System);
        }
        app.install_entities(parse_entity_list(POLL).unwrap());

        assert!(app.navigate_to("Move"));
        assert_eq!(app.selected_path.as_deref(), Some("Move"));
        assert!(!app.tree.is_section_collapsed(EntityClass::System));
        assert_eq!(app.notice(), None);
    }

    #[test]
    fn test_renamed_entity_keeps_selection_quietly() {
        let mut app = app_with(POLL);
        cursor_to(&mut app, "Rock");

        let renamed = POLL.replace(r#""name": "Rock""#, r#""name": "Boulder""#);
        app.install_entities(parse_entity_list(&renamed).unwrap());
        assert_eq!(app.selected_path.as_deref(), Some("Boulder"));
        assert_eq!(app.notice(), None);
    }

    #[test]
    fn test_changed_values_highlighted() {
        let mut app = app_with(POLL);
        cursor_to(&mut app, "Rock");
        let detail = |x: i64| EntityDetail {
            path: Some("Rock".into()),
            id: 3,
            components: vec![
                ("Position".into(), serde_json::json!({"x": x})),
                ("Mass".into(), serde_json::json!(5)),
            ],
            ..Default::default()
        };

        let start = Instant::now();
        app.record_detail_at(detail(1), start);
        assert!(!app.value_changed_at("Position", start));

        app.record_detail_at(detail(2), start);
        assert!(app.value_changed_at("Position", start));
        assert!(!app.value_changed_at("Mass", start));
        assert!(!app.value_changed_at("Position", start + CHANGE_HIGHLIGHT));

        // Another entity starts with a clean slate
        app.record_detail_at(EntityDetail { id: 1, ..detail(3) }, start);
        assert!(!app.value_changed_at("Position", start));
    }

    #[test]
    fn test_performance_view() {
        let mut app = App::new(500);
        app.systems = SystemRegistry {
            systems: vec![crate::ecs::types::SystemInfo {
                name: "Move".into(),
                time_spent_ms: 1.5,
                ..Default::default()
            }],
        };
        app.install_entities(parse_entity_list(POLL).unwrap());
        assert_eq!(app.perf.groups.len(), 1);
        assert_eq!(app.perf.groups[0].phase, "OnUpdate");
        assert_eq!(app.perf.total_ms, 1.5);

        app.toggle_view();
        assert_eq!(app.view, View::Performance);
        app.perf_scroll.set_total(app.perf.row_count());
        let tree_cursor = app.tree.scroll.cursor;
        app.select_next();
        assert_eq!(app.perf_scroll.cursor, 1);
        assert_eq!(app.tree.scroll.cursor, tree_cursor);

        app.toggle_view();
        assert_eq!(app.view, View::Entities);
    }
}
