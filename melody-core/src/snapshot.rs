//! Snapshot projection
//!
//! The sole read path exposed to the presentation boundary: a pure,
//! side-effect-free view over the record set, the registered plugins, and
//! the current stage, assembled fresh on every request.

use serde::Serialize;

use crate::engine::Stage;
use crate::record::Record;
use crate::registry::PluginRegistry;

/// One registered plugin, projected for display.
#[derive(Debug, Clone, Serialize)]
pub struct PluginDescriptor {
    name: String,
}

impl PluginDescriptor {
    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Read-only projection of the engine state.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    track_data: Vec<Record>,
    plugins: Vec<PluginDescriptor>,
    stage: Stage,
}

impl Snapshot {
    pub(crate) fn of(records: Option<&[Record]>, registry: &PluginRegistry, stage: Stage) -> Self {
        Self {
            track_data: records.map(<[Record]>::to_vec).unwrap_or_default(),
            plugins: registry
                .names()
                .into_iter()
                .map(|name| PluginDescriptor { name })
                .collect(),
            stage,
        }
    }

    /// Current record set, empty when nothing has been fetched.
    pub fn track_data(&self) -> &[Record] {
        &self.track_data
    }

    pub fn plugins(&self) -> &[PluginDescriptor] {
        &self.plugins
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }
}
