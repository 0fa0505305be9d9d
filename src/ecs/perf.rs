// SPDX-FileCopyrightText: 2026 GSI Helmholtzzentrum f. Schwerionenforschung GmbH, Darmstadt, Germany
// SPDX-License-Identifier: LGPL-3.0-or-later

//! Per-phase timing breakdown of the pipeline stats.

use super::phase::{phase_index, CUSTOM_GROUP, PHASE_ORDER};
use super::types::{EntityClass, EntityList, SystemRegistry};

/// Timing of one system
#[derive(Debug, Clone, PartialEq)]
pub struct PerfEntry {
    pub name: String,
    pub time_ms: f64,
    pub disabled: bool,
}

/// Systems of one phase, in registry order
#[derive(Debug, Clone, PartialEq)]
pub struct PerfGroup {
    pub phase: &'static str,
    pub entries: Vec<PerfEntry>,
    pub total_ms: f64,
}

/// Timing breakdown of one poll
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PerfReport {
    /// Non-empty groups: canonical phases in execution order, then Custom
    pub groups: Vec<PerfGroup>,
    /// Slowest single system, the scale of every bar
    pub max_ms: f64,
    pub total_ms: f64,
    pub system_count: usize,
}

impl PerfReport {
    /// Group every registry system by the phase of its classified root.
    ///
    /// Systems without a root, without a canonical phase, and observers all
    /// land in Custom.
    pub fn build(registry: &SystemRegistry, list: &EntityList) -> Self {
        let mut buckets: Vec<Vec<PerfEntry>> = vec![Vec::new(); PHASE_ORDER.len() + 1];
        let mut report = PerfReport::default();

        for info in &registry.systems {
            let phase = list
                .roots()
                .iter()
                .map(|&root| list.node(root))
                .find(|node| node.name.as_deref() == Some(info.name.as_str()))
                .filter(|node| node.class == EntityClass::System)
                .and_then(|node| node.class_detail.as_deref())
                .and_then(phase_index);

            buckets[phase.unwrap_or(PHASE_ORDER.len())].push(PerfEntry {
                name: info.name.clone(),
                time_ms: info.time_spent_ms,
                disabled: info.disabled,
            });
            report.max_ms = report.max_ms.max(info.time_spent_ms);
            report.total_ms += info.time_spent_ms;
            report.system_count += 1;
        }

        let names = PHASE_ORDER.iter().copied().chain([CUSTOM_GROUP]);
        report.groups = names
            .zip(buckets)
            .filter(|(_, entries)| !entries.is_empty())
            .map(|(phase, entries)| PerfGroup {
                phase,
                total_ms: entries.iter().map(|e| e.time_ms).sum(),
                entries,
            })
            .collect();
        report
    }

    pub fn is_empty(&self) -> bool {
        self.system_count == 0
    }

    /// Bar length for `time_ms` out of `max_width` cells; any non-zero time
    /// gets at least one cell
    pub fn bar_width(&self, time_ms: f64, max_width: usize) -> usize {
        if self.max_ms <= 0.0 || time_ms <= 0.0 {
            return 0;
        }
        let width = (time_ms / self.max_ms * max_width as f64) as usize;
        width.clamp(1, max_width.max(1))
    }

    /// Share of the frame budget at `fps` spent in systems, in percent
    pub fn budget_usage(&self, fps: f64) -> Option<f64> {
        if fps <= 0.0 {
            return None;
        }
        Some(self.total_ms / (1000.0 / fps) * 100.0)
    }

    /// Rows the report occupies when rendered: one header per group, one row
    /// per system, a blank line after every group
    pub fn row_count(&self) -> usize {
        self.groups.iter().map(|g| g.entries.len() + 2).sum()
    }
}
