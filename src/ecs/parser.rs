// SPDX-FileCopyrightText: 2026 GSI Helmholtzzentrum f. Schwerionenforschung GmbH, Darmstadt, Germany
// SPDX-License-Identifier: LGPL-3.0-or-later

//! Decoding of the REST payloads into entity lists and registries.
//!
//! Wire structs are private; callers only see the types from `types`.

use std::collections::HashMap;

use anyhow::{Context, Result};
use serde::Deserialize;
use serde_json::{Map, Value};

use super::types::{
    ComponentInfo, ComponentRegistry, EntityDetail, EntityList, EntityNode, NodeId, SystemInfo,
    SystemRegistry, WorldSnapshot,
};

/// Component names with this prefix are documentation metadata, not data
const DOC_COMPONENT_PREFIX: &str = "flecs.doc.";

/// One flat entity record, before linking
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EntityRecord {
    pub id: u64,
    /// Leaf name, None (or empty) for anonymous entities
    pub name: Option<String>,
    /// Dot-separated parent path
    pub parent: Option<String>,
    pub components: Vec<String>,
    pub tags: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct RawListing {
    results: Vec<RawEntity>,
}

#[derive(Debug, Deserialize)]
struct RawEntity {
    #[serde(default)]
    name: Option<Value>,
    #[serde(default)]
    parent: Option<Value>,
    #[serde(default)]
    id: Option<Value>,
    #[serde(default)]
    components: Option<Value>,
    #[serde(default)]
    tags: Option<Value>,
}

/// Metric object carrying a circular buffer of samples
#[derive(Debug, Default, Deserialize)]
struct RawGauge {
    #[serde(default)]
    avg: Vec<Value>,
}

impl RawGauge {
    /// Most recent sample, 0.0 when absent or not a number
    fn latest(&self) -> f64 {
        self.avg.last().and_then(Value::as_f64).unwrap_or(0.0)
    }
}

#[derive(Debug, Deserialize)]
struct RawPipelineEntry {
    #[serde(default)]
    name: Option<Value>,
    #[serde(default)]
    system_count: Option<Value>,
    #[serde(default)]
    disabled: Option<Value>,
    #[serde(default)]
    matched_entity_count: Option<RawGauge>,
    #[serde(default)]
    matched_table_count: Option<RawGauge>,
    #[serde(default)]
    time_spent: Option<RawGauge>,
}

#[derive(Debug, Deserialize)]
struct RawComponent {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    entity_count: Option<i64>,
    #[serde(default, rename = "type")]
    type_info: Option<RawTypeInfo>,
}

#[derive(Debug, Deserialize)]
struct RawTypeInfo {
    #[serde(default)]
    size: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct RawDetail {
    #[serde(default)]
    id: Option<Value>,
    #[serde(default)]
    name: Option<Value>,
    #[serde(default)]
    parent: Option<Value>,
    #[serde(default)]
    components: Option<Map<String, Value>>,
    #[serde(default)]
    tags: Option<Vec<Value>>,
    #[serde(default)]
    pairs: Option<Map<String, Value>>,
    #[serde(default)]
    doc: Option<RawDoc>,
}

#[derive(Debug, Deserialize)]
struct RawDoc {
    #[serde(default)]
    brief: Option<Value>,
}

fn as_nonempty_str(value: Option<&Value>) -> Option<String> {
    value
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn as_id(value: Option<&Value>) -> u64 {
    value.and_then(Value::as_u64).unwrap_or(0)
}

/// Keys of a `components` object, minus documentation components
fn component_names(value: Option<&Value>) -> Vec<String> {
    match value.and_then(Value::as_object) {
        Some(map) => map
            .keys()
            .filter(|k| !k.starts_with(DOC_COMPONENT_PREFIX))
            .cloned()
            .collect(),
        None => Vec::new(),
    }
}

/// String entries of a `tags` array; other entries are dropped
fn string_list(values: &[Value]) -> Vec<String> {
    values
        .iter()
        .filter_map(Value::as_str)
        .map(str::to_string)
        .collect()
}

/// Join a dotted parent path and a leaf name into a slash-separated path
pub fn build_full_path(parent: Option<&str>, name: &str) -> String {
    match parent {
        Some(parent) if !parent.is_empty() => format!("{}/{}", parent.replace('.', "/"), name),
        _ => name.to_string(),
    }
}

/// Parse the `/query` listing into a linked entity list.
///
/// An empty `results` array is a valid, empty list. Anything that is not an
/// object with a `results` array is an error.
pub fn parse_entity_list(json: &str) -> Result<EntityList> {
    let listing: RawListing =
        serde_json::from_str(json).context("Failed to parse entity listing")?;

    let records = listing
        .results
        .into_iter()
        .map(|raw| EntityRecord {
            id: as_id(raw.id.as_ref()),
            name: as_nonempty_str(raw.name.as_ref()),
            parent: as_nonempty_str(raw.parent.as_ref()),
            components: component_names(raw.components.as_ref()),
            tags: raw
                .tags
                .as_ref()
                .and_then(Value::as_array)
                .map(|t| string_list(t))
                .unwrap_or_default(),
        })
        .collect();

    Ok(build_entity_list(records))
}

/// Materialize nodes from flat records and link them by path
pub fn build_entity_list(records: Vec<EntityRecord>) -> EntityList {
    let mut nodes: Vec<EntityNode> = records
        .into_iter()
        .map(|record| {
            let name = record.name.filter(|n| !n.is_empty());
            let full_path = match &name {
                Some(name) => build_full_path(record.parent.as_deref(), name),
                None => record.id.to_string(),
            };
            let mut node = EntityNode::new(record.id, name);
            node.full_path = full_path;
            node.components = record.components;
            node.tags = record.tags;
            node
        })
        .collect();

    // First occurrence of a path wins as parent candidate
    let mut by_path: HashMap<String, NodeId> = HashMap::with_capacity(nodes.len());
    for (i, node) in nodes.iter().enumerate() {
        by_path.entry(node.full_path.clone()).or_insert(NodeId(i));
    }

    for i in 0..nodes.len() {
        let parent_id = match nodes[i].full_path.rfind('/') {
            Some(0) | None => continue,
            Some(pos) => match by_path.get(&nodes[i].full_path[..pos]) {
                Some(&parent_id) if parent_id.0 != i => parent_id,
                _ => continue,
            },
        };
        nodes[i].parent = Some(parent_id);
        nodes[parent_id.0].children.push(NodeId(i));
    }

    let roots: Vec<NodeId> = nodes
        .iter()
        .enumerate()
        .filter(|(_, n)| n.parent.is_none())
        .map(|(i, _)| NodeId(i))
        .collect();

    // Depth top-down, independent of record order
    let mut stack: Vec<(NodeId, usize)> = roots.iter().map(|&r| (r, 0)).collect();
    while let Some((id, depth)) = stack.pop() {
        nodes[id.0].depth = depth;
        stack.extend(nodes[id.0].children.iter().map(|&c| (c, depth + 1)));
    }

    EntityList::from_parts(nodes, roots)
}

/// Parse `/components` into the component registry
pub fn parse_component_registry(json: &str) -> Result<ComponentRegistry> {
    let raw: Vec<RawComponent> =
        serde_json::from_str(json).context("Failed to parse component registry")?;

    let components = raw
        .into_iter()
        .filter_map(|c| {
            let name = c.name?;
            Some(ComponentInfo {
                name,
                entity_count: c.entity_count.unwrap_or(0).max(0) as u32,
                size: c
                    .type_info
                    .map(|t| t.size.unwrap_or(0).max(0) as u32),
            })
        })
        .collect();

    Ok(ComponentRegistry { components })
}

/// Parse `/stats/pipeline` into the system registry, skipping sync points
pub fn parse_pipeline_stats(json: &str) -> Result<SystemRegistry> {
    let raw: Vec<RawPipelineEntry> =
        serde_json::from_str(json).context("Failed to parse pipeline stats")?;

    let latest = |g: &Option<RawGauge>| g.as_ref().map(RawGauge::latest).unwrap_or(0.0);

    let systems = raw
        .iter()
        .filter(|entry| entry.system_count.is_none())
        .filter_map(|entry| {
            let full_path = entry.name.as_ref()?.as_str()?.to_string();
            let name = match full_path.rfind('.') {
                Some(pos) => full_path[pos + 1..].to_string(),
                None => full_path.clone(),
            };
            Some(SystemInfo {
                name,
                full_path,
                disabled: entry
                    .disabled
                    .as_ref()
                    .and_then(Value::as_bool)
                    .unwrap_or(false),
                matched_entity_count: latest(&entry.matched_entity_count) as u32,
                matched_table_count: latest(&entry.matched_table_count) as u32,
                time_spent_ms: latest(&entry.time_spent) * 1000.0,
            })
        })
        .collect();

    Ok(SystemRegistry { systems })
}

/// Parse `/stats/world` into a snapshot of the latest gauges
pub fn parse_world_stats(json: &str) -> Result<WorldSnapshot> {
    let raw: HashMap<String, Value> =
        serde_json::from_str(json).context("Failed to parse world stats")?;

    let gauge = |key: &str| {
        raw.get(key)
            .and_then(|v| RawGauge::deserialize(v).ok())
            .map(|g| g.latest())
            .unwrap_or(0.0)
    };

    Ok(WorldSnapshot {
        entity_count: gauge("entities.count"),
        fps: gauge("performance.fps"),
        frame_time_ms: gauge("performance.frame_time") * 1000.0,
        system_count: gauge("queries.system_count"),
    })
}

/// Parse `/entity/<path>` into the detail of one entity
pub fn parse_entity_detail(json: &str) -> Result<EntityDetail> {
    let raw: RawDetail = serde_json::from_str(json).context("Failed to parse entity detail")?;

    let parent = raw.parent.as_ref().and_then(Value::as_str);
    let path = raw
        .name
        .as_ref()
        .and_then(Value::as_str)
        .map(|name| build_full_path(parent, name));

    Ok(EntityDetail {
        path,
        id: as_id(raw.id.as_ref()),
        components: raw.components.unwrap_or_default().into_iter().collect(),
        tags: raw.tags.as_deref().map(string_list).unwrap_or_default(),
        pairs: raw.pairs.unwrap_or_default().into_iter().collect(),
        doc_brief: raw.doc.and_then(|d| as_nonempty_str(d.brief.as_ref())),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SOLAR: &str = r#"{"results": [
        {"name": "Sun", "id": 1, "components": {"Position": null, "flecs.doc.Description": null}},
        {"name": "Earth", "parent": "Sun", "id": 2, "components": {"Position": null}, "tags": ["Planet", 5]},
        {"name": "Moon", "parent": "Sun.Earth", "id": 3},
        {"id": 7, "components": {"Velocity": null}}
    ]}"#;

    #[test]
    fn test_sun_earth_tree() {
        let list = parse_entity_list(SOLAR).unwrap();
        assert_eq!(list.count(), 4);
        assert_eq!(list.root_count(), 2);

        let sun = list.find_by_path("Sun").unwrap();
        let earth = list.find_by_path("Sun/Earth").unwrap();
        let moon = list.find_by_path("Sun/Earth/Moon").unwrap();

        assert_eq!(list.node(sun).children, vec![earth]);
        assert_eq!(list.node(earth).parent, Some(sun));
        assert_eq!(list.node(earth).depth, 1);
        assert_eq!(list.node(moon).depth, 2);
        assert_eq!(list.node(sun).components, vec!["Position"]);
        assert_eq!(list.node(earth).tags, vec!["Planet"]);
    }

    #[test]
    fn test_anonymous_entity_uses_id_path() {
        let list = parse_entity_list(SOLAR).unwrap();
        let anon = list.find_by_path("7").unwrap();
        let node = list.node(anon);
        assert!(node.is_anonymous());
        assert_eq!(node.full_path, "7");
        assert_eq!(node.display_name(), "#7");
        assert_eq!(node.id, 7);
        assert!(node.parent.is_none());
    }

    #[test]
    fn test_empty_listing_is_not_an_error() {
        let list = parse_entity_list(r#"{"results": []}"#).unwrap();
        assert!(list.is_empty());
        assert_eq!(list.root_count(), 0);
    }

    #[test]
    fn test_malformed_listing_is_an_error() {
        assert!(parse_entity_list("not json").is_err());
        assert!(parse_entity_list(r#"{"rows": []}"#).is_err());
        assert!(parse_entity_list(r#"[1, 2]"#).is_err());
    }

    #[test]
    fn test_depth_independent_of_record_order() {
        let records = vec![
            EntityRecord {
                id: 3,
                name: Some("C".into()),
                parent: Some("A.B".into()),
                ..Default::default()
            },
            EntityRecord {
                id: 2,
                name: Some("B".into()),
                parent: Some("A".into()),
                ..Default::default()
            },
            EntityRecord {
                id: 1,
                name: Some("A".into()),
                ..Default::default()
            },
        ];
        let list = build_entity_list(records);
        assert_eq!(list.roots(), &[NodeId(2)]);
        assert_eq!(list.node(NodeId(0)).depth, 2);
        assert_eq!(list.node(NodeId(1)).depth, 1);
    }

    #[test]
    fn test_duplicate_paths_first_wins() {
        let records = vec![
            EntityRecord {
                id: 1,
                name: Some("A".into()),
                ..Default::default()
            },
            EntityRecord {
                id: 2,
                name: Some("A".into()),
                ..Default::default()
            },
            EntityRecord {
                id: 3,
                name: Some("B".into()),
                parent: Some("A".into()),
                ..Default::default()
            },
        ];
        let list = build_entity_list(records);
        assert_eq!(list.root_count(), 2);
        assert_eq!(list.node(NodeId(0)).children, vec![NodeId(2)]);
        assert!(list.node(NodeId(1)).children.is_empty());
    }

    #[test]
    fn test_every_child_path_extends_its_parent() {
        let list = parse_entity_list(SOLAR).unwrap();
        for (_, node) in list.iter() {
            if let Some(parent) = node.parent {
                let pos = node.full_path.rfind('/').unwrap();
                assert_eq!(list.node(parent).full_path, node.full_path[..pos]);
                assert_eq!(node.depth, list.node(parent).depth + 1);
            }
        }
    }

    #[test]
    fn test_pipeline_skips_sync_points() {
        let json = r#"[
            {"name": "app.systems.Move", "disabled": false,
             "matched_entity_count": {"avg": [1, 2, 12]},
             "matched_table_count": {"avg": [3]},
             "time_spent": {"avg": [0.0, 0.002]}},
            {"system_count": 1, "multi_threaded": false},
            {"name": "Render", "disabled": true}
        ]"#;
        let reg = parse_pipeline_stats(json).unwrap();
        assert_eq!(reg.systems.len(), 2);

        let mv = reg.find("Move").unwrap();
        assert_eq!(mv.full_path, "app.systems.Move");
        assert_eq!(mv.matched_entity_count, 12);
        assert_eq!(mv.matched_table_count, 3);
        assert!((mv.time_spent_ms - 2.0).abs() < 1e-9);

        let render = reg.find("Render").unwrap();
        assert!(render.disabled);
        assert_eq!(render.matched_entity_count, 0);
    }

    #[test]
    fn test_world_stats_latest_gauge() {
        let json = r#"{
            "entities.count": {"avg": [10, 20, 42]},
            "performance.fps": {"avg": [59.5, 60.0]},
            "performance.frame_time": {"avg": [0.016]},
            "queries.system_count": {"avg": []},
            "world_time": 12.5
        }"#;
        let snap = parse_world_stats(json).unwrap();
        assert_eq!(snap.entity_count, 42.0);
        assert_eq!(snap.fps, 60.0);
        assert!((snap.frame_time_ms - 16.0).abs() < 1e-9);
        assert_eq!(snap.system_count, 0.0);
    }

    #[test]
    fn test_component_registry() {
        let json = r#"[
            {"name": "Position", "entity_count": 3, "type": {"size": 8}},
            {"name": "Tag", "entity_count": 1},
            {"entity_count": 9}
        ]"#;
        let reg = parse_component_registry(json).unwrap();
        assert_eq!(reg.components.len(), 2);
        assert_eq!(reg.find("Position").unwrap().size, Some(8));
        assert_eq!(reg.find("Tag").unwrap().size, None);
    }

    #[test]
    fn test_entity_detail() {
        let json = r#"{
            "id": 2, "name": "Earth", "parent": "Sun",
            "components": {"Position": {"x": 1, "y": 2}, "Mass": {"value": 5.9}},
            "tags": ["Planet"],
            "doc": {"brief": "Third rock"}
        }"#;
        let detail = parse_entity_detail(json).unwrap();
        assert_eq!(detail.path.as_deref(), Some("Sun/Earth"));
        assert_eq!(detail.id, 2);
        let names: Vec<&str> = detail.components.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(names, vec!["Position", "Mass"]);
        assert_eq!(detail.tags, vec!["Planet"]);
        assert!(detail.pairs.is_empty());
        assert_eq!(detail.doc_brief.as_deref(), Some("Third rock"));
    }
}
