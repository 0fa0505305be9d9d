// SPDX-FileCopyrightText: 2026 GSI Helmholtzzentrum f. Schwerionenforschung GmbH, Darmstadt, Germany
// SPDX-License-Identifier: LGPL-3.0-or-later

//! Pipeline phase grouping of classified systems.

use super::classify::DETAIL_OBSERVER;
use super::types::{EntityClass, EntityList, EntityNode};

/// Canonical pipeline phase execution order
pub const PHASE_ORDER: [&str; 10] = [
    "OnStart",
    "OnLoad",
    "PostLoad",
    "PreUpdate",
    "OnUpdate",
    "OnValidate",
    "PostUpdate",
    "PreStore",
    "OnStore",
    "PostFrame",
];

/// Synthetic group for observers, after the canonical phases
pub const OBSERVER_GROUP: &str = "Observer";
/// Synthetic group for systems outside the canonical table, always last
pub const CUSTOM_GROUP: &str = "Custom";

/// Position of `phase` in the canonical table
pub fn phase_index(phase: &str) -> Option<usize> {
    PHASE_ORDER.iter().position(|p| *p == phase)
}

/// Name of the group a system root falls into
pub fn group_of(node: &EntityNode) -> &str {
    match node.class_detail.as_deref() {
        Some(DETAIL_OBSERVER) => OBSERVER_GROUP,
        Some(detail) => match phase_index(detail) {
            Some(i) => PHASE_ORDER[i],
            None => CUSTOM_GROUP,
        },
        None => CUSTOM_GROUP,
    }
}

/// One phase sub-header under the Systems section
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhaseGroup {
    pub name: String,
    pub system_count: usize,
    pub collapsed: bool,
}

/// Ordered phase groups, with collapse state carried across polls
#[derive(Debug, Clone, Default)]
pub struct PhaseGroups {
    groups: Vec<PhaseGroup>,
}

impl PhaseGroups {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn groups(&self) -> &[PhaseGroup] {
        &self.groups
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&PhaseGroup> {
        self.groups.get(index)
    }

    /// Expand the group called `name`, if present
    pub fn expand(&mut self, name: &str) {
        if let Some(group) = self.groups.iter_mut().find(|g| g.name == name) {
            group.collapsed = false;
        }
    }

    /// Flip the collapse state of the group at `index`
    pub fn toggle(&mut self, index: usize) {
        if let Some(group) = self.groups.get_mut(index) {
            group.collapsed = !group.collapsed;
        }
    }

    /// Recompute the groups from the system roots of `list`.
    ///
    /// Groups that survive keep their collapse state by name; new ones start
    /// expanded. Only groups with at least one system are kept.
    pub fn regroup(&mut self, list: &EntityList) {
        let mut canonical = [0usize; PHASE_ORDER.len()];
        let mut observers = 0;
        let mut custom = 0;

        for &root in list.roots() {
            let node = list.node(root);
            if node.class != EntityClass::System {
                continue;
            }
            match group_of(node) {
                OBSERVER_GROUP => observers += 1,
                CUSTOM_GROUP => custom += 1,
                phase => {
                    if let Some(i) = phase_index(phase) {
                        canonical[i] += 1;
                    }
                }
            }
        }

        let counts = PHASE_ORDER
            .iter()
            .copied()
            .zip(canonical)
            .chain([(OBSERVER_GROUP, observers), (CUSTOM_GROUP, custom)]);

        let groups = counts
            .filter(|(_, count)| *count > 0)
            .map(|(name, system_count)| PhaseGroup {
                name: name.to_string(),
                system_count,
                collapsed: self
                    .groups
                    .iter()
                    .find(|g| g.name == name)
                    .map(|g| g.collapsed)
                    .unwrap_or(false),
            })
            .collect();

        self.groups = groups;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::classify::{classify_all, DefaultPolicy};
    use crate::ecs::parser::parse_entity_list;

    fn systems(json: &str) -> EntityList {
        let mut list = parse_entity_list(json).unwrap();
        classify_all(&mut list, &DefaultPolicy);
        list
    }

    fn index_of(groups: &PhaseGroups, name: &str) -> usize {
        groups.groups().iter().position(|g| g.name == name).unwrap()
    }

    fn names(groups: &PhaseGroups) -> Vec<&str> {
        groups.groups().iter().map(|g| g.name.as_str()).collect()
    }

    #[test]
    fn test_canonical_order() {
        let list = systems(
            r#"{"results": [
                {"name": "Move", "id": 1, "tags": ["flecs.system.System", "flecs.pipeline.OnUpdate"]},
                {"name": "Load", "id": 2, "tags": ["flecs.system.System", "flecs.pipeline.OnLoad"]}
            ]}"#,
        );
        let mut groups = PhaseGroups::new();
        groups.regroup(&list);
        assert_eq!(names(&groups), vec!["OnLoad", "OnUpdate"]);
        assert!(groups.groups().iter().all(|g| !g.collapsed));
    }

    #[test]
    fn test_synthetic_groups_trail() {
        let list = systems(
            r#"{"results": [
                {"name": "A", "id": 1, "tags": ["flecs.system.System"]},
                {"name": "B", "id": 2, "tags": ["flecs.system.System", "flecs.pipeline.MyPhase"]},
                {"name": "C", "id": 3, "tags": ["flecs.core.Observer"]},
                {"name": "D", "id": 4, "tags": ["flecs.system.System", "flecs.pipeline.PostFrame"]},
                {"name": "E", "id": 5, "tags": ["flecs.system.System", "flecs.pipeline.OnStart"]}
            ]}"#,
        );
        let mut groups = PhaseGroups::new();
        groups.regroup(&list);
        assert_eq!(names(&groups), vec!["OnStart", "PostFrame", "Observer", "Custom"]);
        let custom = groups.get(index_of(&groups, "Custom")).unwrap();
        assert_eq!(custom.system_count, 2);
    }

    #[test]
    fn test_regroup_preserves_collapse_by_name() {
        let first = systems(
            r#"{"results": [
                {"name": "Move", "id": 1, "tags": ["flecs.system.System", "flecs.pipeline.OnUpdate"]},
                {"name": "Load", "id": 2, "tags": ["flecs.system.System", "flecs.pipeline.OnLoad"]}
            ]}"#,
        );
        let mut groups = PhaseGroups::new();
        groups.regroup(&first);
        groups.toggle(index_of(&groups, "OnUpdate"));

        let second = systems(
            r#"{"results": [
                {"name": "Move", "id": 1, "tags": ["flecs.system.System", "flecs.pipeline.OnUpdate"]},
                {"name": "Store", "id": 3, "tags": ["flecs.system.System", "flecs.pipeline.OnStore"]},
                {"name": "Load", "id": 2, "tags": ["flecs.system.System", "flecs.pipeline.OnLoad"]}
            ]}"#,
        );
        groups.regroup(&second);
        assert_eq!(names(&groups), vec!["OnLoad", "OnUpdate", "OnStore"]);
        let collapsed: Vec<bool> = groups.groups().iter().map(|g| g.collapsed).collect();
        assert_eq!(collapsed, vec![false, true, false]);
    }

    #[test]
    fn test_no_systems_no_groups() {
        let list = systems(r#"{"results": [{"name": "Scene", "id": 1}]}"#);
        let mut groups = PhaseGroups::new();
        groups.regroup(&list);
        assert!(groups.is_empty());
    }
}
