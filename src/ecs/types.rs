// SPDX-FileCopyrightText: 2026 GSI Helmholtzzentrum f. Schwerionenforschung GmbH, Darmstadt, Germany
// SPDX-License-Identifier: LGPL-3.0-or-later

use serde_json::Value;

/// Index of a node inside its owning `EntityList`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub usize);

/// Semantic section an entity subtree belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum EntityClass {
    /// Structural containers (scene roots, UI trees)
    #[default]
    Composition,
    /// Leaf entities carrying component data
    Entity,
    /// Lifecycle controllers
    Lifecycle,
    /// Pipeline systems and observers
    System,
    /// Component type definitions
    Component,
}

impl EntityClass {
    /// Display order of the sections
    pub const ALL: [EntityClass; 5] = [
        EntityClass::Composition,
        EntityClass::Entity,
        EntityClass::Lifecycle,
        EntityClass::System,
        EntityClass::Component,
    ];

    pub fn index(self) -> usize {
        match self {
            EntityClass::Composition => 0,
            EntityClass::Entity => 1,
            EntityClass::Lifecycle => 2,
            EntityClass::System => 3,
            EntityClass::Component => 4,
        }
    }

    /// Section header label
    pub fn section_name(self) -> &'static str {
        match self {
            EntityClass::Composition => "Compositions",
            EntityClass::Entity => "Entities",
            EntityClass::Lifecycle => "Lifecycles",
            EntityClass::System => "Systems",
            EntityClass::Component => "Components",
        }
    }
}

/// One entity from a single poll
#[derive(Debug, Clone, Default)]
pub struct EntityNode {
    /// Numeric entity id
    pub id: u64,
    /// Leaf name, None for anonymous entities
    pub name: Option<String>,
    /// Slash-separated path used for REST lookups (e.g. "Sun/Earth")
    pub full_path: String,
    /// Component names, in payload order
    pub components: Vec<String>,
    /// Tag names, in payload order
    pub tags: Vec<String>,
    /// Parent node, None for roots
    pub parent: Option<NodeId>,
    /// Child nodes, in payload order
    pub children: Vec<NodeId>,
    /// Nesting depth (0 = root)
    pub depth: usize,
    /// UI expand state
    pub expanded: bool,
    /// Section classification, inherited from the root
    pub class: EntityClass,
    /// Display label next to the name ("OnLoad", "Observer", "3 entities", ...)
    pub class_detail: Option<String>,
    /// Matched entity count from pipeline stats (systems only)
    pub match_count: u32,
    /// System disabled flag from pipeline stats
    pub disabled: bool,
}

impl EntityNode {
    pub fn new(id: u64, name: Option<String>) -> Self {
        Self {
            id,
            name,
            expanded: true,
            ..Self::default()
        }
    }

    pub fn is_anonymous(&self) -> bool {
        self.name.is_none()
    }

    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }

    /// Name for display: the leaf name or `#<id>`
    pub fn display_name(&self) -> String {
        match &self.name {
            Some(name) => name.clone(),
            None => format!("#{}", self.id),
        }
    }
}

/// All entities from one poll: a flat arena plus the root subset
#[derive(Debug, Clone, Default)]
pub struct EntityList {
    nodes: Vec<EntityNode>,
    roots: Vec<NodeId>,
}

impl EntityList {
    pub(crate) fn from_parts(nodes: Vec<EntityNode>, roots: Vec<NodeId>) -> Self {
        Self { nodes, roots }
    }

    /// Total number of entities
    pub fn count(&self) -> usize {
        self.nodes.len()
    }

    pub fn root_count(&self) -> usize {
        self.roots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    pub fn node(&self, id: NodeId) -> &EntityNode {
        &self.nodes[id.0]
    }

    pub fn node_mut(&mut self, id: NodeId) -> &mut EntityNode {
        &mut self.nodes[id.0]
    }

    /// Iterate all nodes with their ids, in payload order
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &EntityNode)> {
        self.nodes.iter().enumerate().map(|(i, n)| (NodeId(i), n))
    }

    /// Find a node by its slash-separated path
    pub fn find_by_path(&self, path: &str) -> Option<NodeId> {
        self.iter().find(|(_, n)| n.full_path == path).map(|(id, _)| id)
    }

    /// Find a node by its numeric entity id
    pub fn find_by_id(&self, entity_id: u64) -> Option<NodeId> {
        self.iter().find(|(_, n)| n.id == entity_id).map(|(id, _)| id)
    }

    /// True if `id` is the last child of its parent (roots count as last)
    pub fn is_last_child(&self, id: NodeId) -> bool {
        match self.node(id).parent {
            Some(parent) => self.node(parent).children.last() == Some(&id),
            None => true,
        }
    }

    /// True if the ancestor of `id` at `depth` has a sibling after it.
    ///
    /// Walks the parent chain on every call; nothing is cached per node.
    pub fn ancestor_has_next_sibling(&self, id: NodeId, depth: usize) -> bool {
        let mut ancestor = id;
        while self.node(ancestor).depth > depth {
            match self.node(ancestor).parent {
                Some(parent) => ancestor = parent,
                None => return false,
            }
        }
        !self.is_last_child(ancestor)
    }

    /// Apply `f` to `id` and all of its descendants, depth-first
    pub fn for_each_in_subtree(&mut self, id: NodeId, f: &mut impl FnMut(&mut EntityNode)) {
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            let node = &mut self.nodes[current.0];
            f(node);
            stack.extend(node.children.iter().rev().copied());
        }
    }
}

/// Component type info from the components endpoint
#[derive(Debug, Clone, PartialEq)]
pub struct ComponentInfo {
    pub name: String,
    pub entity_count: u32,
    /// Type size in bytes, None when the component has no type info
    pub size: Option<u32>,
}

/// All component types from one poll
#[derive(Debug, Clone, Default)]
pub struct ComponentRegistry {
    pub components: Vec<ComponentInfo>,
}

impl ComponentRegistry {
    pub fn find(&self, name: &str) -> Option<&ComponentInfo> {
        self.components.iter().find(|c| c.name == name)
    }
}

/// One system from the pipeline stats endpoint
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SystemInfo {
    /// Leaf name (e.g. "MovementSystem")
    pub name: String,
    /// Dot-separated path as reported by the pipeline
    pub full_path: String,
    pub disabled: bool,
    pub matched_entity_count: u32,
    pub matched_table_count: u32,
    pub time_spent_ms: f64,
}

/// All systems from one poll
#[derive(Debug, Clone, Default)]
pub struct SystemRegistry {
    pub systems: Vec<SystemInfo>,
}

impl SystemRegistry {
    pub fn find(&self, name: &str) -> Option<&SystemInfo> {
        self.systems.iter().find(|s| s.name == name)
    }
}

/// Latest world-level gauges
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct WorldSnapshot {
    pub entity_count: f64,
    pub fps: f64,
    pub frame_time_ms: f64,
    pub system_count: f64,
}

/// Component values of the selected entity
#[derive(Debug, Clone, Default)]
pub struct EntityDetail {
    /// Slash-separated path, None for anonymous entities
    pub path: Option<String>,
    pub id: u64,
    /// Component name to value, in payload order
    pub components: Vec<(String, Value)>,
    pub tags: Vec<String>,
    pub pairs: Vec<(String, Value)>,
    pub doc_brief: Option<String>,
}
