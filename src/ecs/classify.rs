// SPDX-FileCopyrightText: 2026 GSI Helmholtzzentrum f. Schwerionenforschung GmbH, Darmstadt, Germany
// SPDX-License-Identifier: LGPL-3.0-or-later

//! Section classification of root entities and registry enrichment.
//!
//! Only roots are classified; every descendant inherits its root's class so a
//! subtree never spans two sections.

use super::types::{ComponentRegistry, EntityClass, EntityList, EntityNode, NodeId, SystemRegistry};

/// Tag (substring) marking pipeline systems
pub const SYSTEM_TAG: &str = "flecs.system.System";
/// Tag (substring) marking observers
pub const OBSERVER_TAG: &str = "flecs.core.Observer";
/// Prefix of the tag carrying a system's pipeline phase
pub const PHASE_TAG_PREFIX: &str = "flecs.pipeline.";
/// Component present on component-type meta entities
pub const COMPONENT_MARKER: &str = "Component";

/// Detail label for systems without a phase tag
pub const DETAIL_SYSTEM: &str = "System";
/// Detail label for observers
pub const DETAIL_OBSERVER: &str = "Observer";

/// Decides the section of one root entity
pub trait ClassificationPolicy {
    /// Class and optional detail label for `root`
    fn classify(&self, list: &EntityList, root: NodeId) -> (EntityClass, Option<String>);
}

/// Tag and naming heuristics for flecs-style worlds
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultPolicy;

fn has_tag(node: &EntityNode, needle: &str) -> bool {
    node.tags.iter().any(|t| t.contains(needle))
}

fn pipeline_phase(node: &EntityNode) -> Option<String> {
    node.tags
        .iter()
        .filter_map(|t| t.strip_prefix(PHASE_TAG_PREFIX))
        .find(|phase| !phase.is_empty())
        .map(str::to_string)
}

impl ClassificationPolicy for DefaultPolicy {
    fn classify(&self, list: &EntityList, root: NodeId) -> (EntityClass, Option<String>) {
        let node = list.node(root);

        if has_tag(node, SYSTEM_TAG) {
            let phase = pipeline_phase(node).unwrap_or_else(|| DETAIL_SYSTEM.to_string());
            return (EntityClass::System, Some(phase));
        }
        if has_tag(node, OBSERVER_TAG) {
            return (EntityClass::System, Some(DETAIL_OBSERVER.to_string()));
        }
        if node.name.as_deref().is_some_and(|n| n.ends_with("Lifecycle")) {
            return (EntityClass::Lifecycle, None);
        }
        if node.components.iter().any(|c| c == COMPONENT_MARKER) {
            return (EntityClass::Component, None);
        }
        if !node.has_children() && !node.components.is_empty() {
            return (EntityClass::Entity, None);
        }
        (EntityClass::Composition, None)
    }
}

/// Classify every root and propagate its class to the whole subtree
pub fn classify_all(list: &mut EntityList, policy: &dyn ClassificationPolicy) {
    let roots = list.roots().to_vec();
    for root in roots {
        let (class, detail) = policy.classify(list, root);
        list.for_each_in_subtree(root, &mut |node: &mut EntityNode| {
            node.class = class;
            node.class_detail = None;
        });
        list.node_mut(root).class_detail = detail;
    }
}

/// Label component-type roots with their registry usage ("3 entities, 8B")
pub fn annotate_components(list: &mut EntityList, registry: &ComponentRegistry) {
    let roots = list.roots().to_vec();
    for root in roots {
        let node = list.node(root);
        if node.class != EntityClass::Component {
            continue;
        }
        let Some(info) = node.name.as_deref().and_then(|n| registry.find(n)) else {
            continue;
        };
        let detail = match info.size {
            Some(size) if size > 0 => format!("{} entities, {}B", info.entity_count, size),
            _ => format!("{} entities", info.entity_count),
        };
        list.node_mut(root).class_detail = Some(detail);
    }
}

/// Copy match count and disabled flag onto system roots, by leaf name
pub fn enrich_systems(list: &mut EntityList, registry: &SystemRegistry) {
    let roots = list.roots().to_vec();
    for root in roots {
        let node = list.node(root);
        if node.class != EntityClass::System {
            continue;
        }
        let Some(info) = node.name.as_deref().and_then(|n| registry.find(n)) else {
            continue;
        };
        let (count, disabled) = (info.matched_entity_count, info.disabled);
        let node = list.node_mut(root);
        node.match_count = count;
        node.disabled = disabled;
    }
}

/// Entities sharing at least one user component with `system`.
///
/// Best-effort stand-in for real query matching: internal (`flecs.`) and
/// marker components are ignored, and only Entity/Composition nodes count.
pub fn entities_for_system(list: &EntityList, system: NodeId) -> Vec<NodeId> {
    let wanted: Vec<&str> = list
        .node(system)
        .components
        .iter()
        .map(String::as_str)
        .filter(|c| !c.starts_with("flecs.") && *c != COMPONENT_MARKER)
        .collect();
    if wanted.is_empty() {
        return Vec::new();
    }

    list.iter()
        .filter(|(id, n)| {
            *id != system
                && matches!(n.class, EntityClass::Entity | EntityClass::Composition)
                && n.components.iter().any(|c| wanted.contains(&c.as_str()))
        })
        .map(|(id, _)| id)
        .collect()
}

/// Entities carrying the component named by `component`
pub fn entities_with_component(list: &EntityList, component: NodeId) -> Vec<NodeId> {
    let Some(name) = list.node(component).name.as_deref() else {
        return Vec::new();
    };
    list.iter()
        .filter(|(_, n)| {
            n.class != EntityClass::Component && n.components.iter().any(|c| c == name)
        })
        .map(|(id, _)| id)
        .collect()
}
