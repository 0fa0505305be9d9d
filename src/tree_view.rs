// SPDX-FileCopyrightText: 2026 GSI Helmholtzzentrum f. Schwerionenforschung GmbH, Darmstadt, Germany
// SPDX-License-Identifier: LGPL-3.0-or-later

//! Flattening of the classified entity tree into display rows.
//!
//! Rows reference nodes of the live `EntityList` by `NodeId` and also carry
//! the entity id, so the selection can be found again after the list has been
//! replaced by a new poll.

use std::collections::HashSet;

use crate::ecs::phase::group_of;
use crate::ecs::{EntityClass, EntityList, NodeId, PhaseGroups};
use crate::scroll::ScrollState;

/// One line of the tree pane
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayRow {
    /// Section header, shown whenever the section has roots
    Section(EntityClass),
    /// Phase sub-header inside the Systems section (index into the phase groups)
    Phase(usize),
    /// Entity row
    Entity { node: NodeId, id: u64 },
}

/// Tree indentation glyphs for `id`, derived from its ancestry.
///
/// Roots get no prefix. Every level above the node's own shows a vertical
/// line when the ancestor at that level has a later sibling.
pub fn tree_prefix(list: &EntityList, id: NodeId) -> String {
    let depth = list.node(id).depth;
    let mut prefix = String::with_capacity(depth * 4);
    for level in 1..depth {
        if list.ancestor_has_next_sibling(id, level) {
            prefix.push_str("│   ");
        } else {
            prefix.push_str("    ");
        }
    }
    if depth > 0 {
        if list.is_last_child(id) {
            prefix.push_str("└── ");
        } else {
            prefix.push_str("├── ");
        }
    }
    prefix
}

/// Collapsible, filterable row model over one entity list
#[derive(Debug, Clone)]
pub struct TreeView {
    rows: Vec<DisplayRow>,
    /// Cursor and viewport over `rows`
    pub scroll: ScrollState,
    section_collapsed: [bool; EntityClass::ALL.len()],
    section_counts: [usize; EntityClass::ALL.len()],
    /// Phase sub-headers of the Systems section
    pub phases: PhaseGroups,
    show_anonymous: bool,
    /// Entity ids the user collapsed, re-applied after every poll
    collapsed_ids: HashSet<u64>,
}

impl Default for TreeView {
    fn default() -> Self {
        Self::new()
    }
}

impl TreeView {
    pub fn new() -> Self {
        Self {
            rows: Vec::new(),
            scroll: ScrollState::new(),
            section_collapsed: [true; EntityClass::ALL.len()],
            section_counts: [0; EntityClass::ALL.len()],
            phases: PhaseGroups::new(),
            show_anonymous: false,
            collapsed_ids: HashSet::new(),
        }
    }

    pub fn rows(&self) -> &[DisplayRow] {
        &self.rows
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Number of roots in `class`
    pub fn section_count(&self, class: EntityClass) -> usize {
        self.section_counts[class.index()]
    }

    pub fn is_section_collapsed(&self, class: EntityClass) -> bool {
        self.section_collapsed[class.index()]
    }

    pub fn set_section_collapsed(&mut self, class: EntityClass, collapsed: bool) {
        self.section_collapsed[class.index()] = collapsed;
    }

    pub fn show_anonymous(&self) -> bool {
        self.show_anonymous
    }

    /// Row under the cursor
    pub fn current_row(&self) -> Option<DisplayRow> {
        self.rows.get(self.scroll.cursor).copied()
    }

    /// Entity under the cursor, None on headers
    pub fn selected(&self) -> Option<NodeId> {
        match self.current_row() {
            Some(DisplayRow::Entity { node, .. }) => Some(node),
            _ => None,
        }
    }

    /// First entity row, if any
    pub fn first_entity(&self) -> Option<NodeId> {
        self.rows.iter().find_map(|row| match row {
            DisplayRow::Entity { node, .. } => Some(*node),
            _ => None,
        })
    }

    fn selected_id(&self) -> Option<u64> {
        match self.current_row() {
            Some(DisplayRow::Entity { id, .. }) => Some(id),
            _ => None,
        }
    }

    /// Re-stamp expand flags on a freshly installed list.
    ///
    /// Ids of entities missing from `list` are forgotten.
    pub fn apply_expand_state(&mut self, list: &mut EntityList) {
        if self.collapsed_ids.is_empty() {
            return;
        }
        let collapsed: Vec<NodeId> = list
            .iter()
            .filter(|(_, n)| self.collapsed_ids.contains(&n.id))
            .map(|(id, _)| id)
            .collect();
        self.collapsed_ids = collapsed.iter().map(|&id| list.node(id).id).collect();
        for id in collapsed {
            list.node_mut(id).expanded = false;
        }
    }

    /// Rebuild the rows from `list`, keeping the cursor on the same entity
    pub fn rebuild(&mut self, list: &EntityList) {
        let prev_id = self.selected_id();

        self.section_counts = [0; EntityClass::ALL.len()];
        for &root in list.roots() {
            self.section_counts[list.node(root).class.index()] += 1;
        }

        let mut rows = Vec::with_capacity(list.count() + EntityClass::ALL.len());
        for class in EntityClass::ALL {
            if self.section_counts[class.index()] == 0 {
                continue;
            }
            rows.push(DisplayRow::Section(class));
            if self.section_collapsed[class.index()] {
                continue;
            }

            if class == EntityClass::System && !self.phases.is_empty() {
                for (index, group) in self.phases.groups().iter().enumerate() {
                    if group.system_count == 0 {
                        continue;
                    }
                    rows.push(DisplayRow::Phase(index));
                    if group.collapsed {
                        continue;
                    }
                    for &root in list.roots() {
                        let node = list.node(root);
                        if node.class == EntityClass::System && group_of(node) == group.name {
                            self.collect(list, root, &mut rows);
                        }
                    }
                }
            } else {
                for &root in list.roots() {
                    if list.node(root).class == class {
                        self.collect(list, root, &mut rows);
                    }
                }
            }
        }

        self.rows = rows;
        self.scroll.set_total(self.rows.len());

        if let Some(prev_id) = prev_id {
            let found = self
                .rows
                .iter()
                .position(|row| matches!(row, DisplayRow::Entity { id, .. } if *id == prev_id));
            if let Some(index) = found {
                self.scroll.select(index);
            }
        }
    }

    /// Depth-first walk honoring expand flags and the anonymous filter
    fn collect(&self, list: &EntityList, id: NodeId, rows: &mut Vec<DisplayRow>) {
        let node = list.node(id);
        if node.is_anonymous() && !self.show_anonymous {
            return;
        }
        rows.push(DisplayRow::Entity { node: id, id: node.id });
        if node.expanded {
            for &child in &node.children {
                self.collect(list, child, rows);
            }
        }
    }

    /// Toggle whatever is under the cursor and rebuild
    pub fn toggle(&mut self, list: &mut EntityList) {
        match self.current_row() {
            Some(DisplayRow::Section(class)) => {
                let collapsed = &mut self.section_collapsed[class.index()];
                *collapsed = !*collapsed;
            }
            Some(DisplayRow::Phase(index)) => self.phases.toggle(index),
            Some(DisplayRow::Entity { node, id }) => {
                let node = list.node_mut(node);
                if node.has_children() {
                    node.expanded = !node.expanded;
                    if node.expanded {
                        self.collapsed_ids.remove(&id);
                    } else {
                        self.collapsed_ids.insert(id);
                    }
                }
            }
            None => {}
        }
        self.rebuild(list);
    }

    /// Flip the anonymous filter and rebuild
    pub fn toggle_anonymous(&mut self, list: &EntityList) {
        self.show_anonymous = !self.show_anonymous;
        self.rebuild(list);
    }

    /// Expand whatever hides the entity at `path` and move the cursor to it.
    ///
    /// Opens the target's own section and, for systems, its phase group.
    /// Returns false when no row with that path can be shown.
    pub fn reveal(&mut self, list: &mut EntityList, path: &str) -> bool {
        let Some(target) = list.find_by_path(path) else {
            return false;
        };

        let mut root = target;
        while let Some(parent) = list.node(root).parent {
            let node = list.node_mut(parent);
            node.expanded = true;
            self.collapsed_ids.remove(&node.id);
            root = parent;
        }

        let class = list.node(target).class;
        self.set_section_collapsed(class, false);
        if class == EntityClass::System {
            self.phases.expand(group_of(list.node(root)));
        }
        self.rebuild(list);

        let found = self
            .rows
            .iter()
            .position(|row| matches!(row, DisplayRow::Entity { node, .. } if *node == target));
        match found {
            Some(index) => {
                self.scroll.select(index);
                true
            }
            None => false,
        }
    }
}
