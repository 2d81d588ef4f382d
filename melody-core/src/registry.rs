//! Plugin registry
//!
//! Append-only, ordered collection of registered data-source plugins.
//! Registration order is the only ordering guarantee and doubles as the
//! stable index used for selection-by-position at the transport boundary.

use std::sync::Arc;

use tracing::info;

use crate::plugin::SourcePlugin;
use crate::{Error, Result};

/// Ordered collection of registered plugins.
#[derive(Default)]
pub struct PluginRegistry {
    plugins: Vec<Arc<dyn SourcePlugin>>,
}

impl PluginRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a plugin and invoke its one-time setup hook.
    ///
    /// Rejects a plugin with an empty name and the exact same plugin
    /// instance registered twice (identity, not name, equality).
    pub fn register(&mut self, plugin: Arc<dyn SourcePlugin>) -> Result<()> {
        if plugin.name().trim().is_empty() {
            return Err(Error::InvalidPlugin(
                "plugin name must be non-empty".to_string(),
            ));
        }
        if self.contains(&plugin) {
            return Err(Error::InvalidPlugin(format!(
                "plugin '{}' already registered",
                plugin.name()
            )));
        }

        plugin.on_register();
        info!("Registered data plugin '{}'", plugin.name());
        self.plugins.push(plugin);
        Ok(())
    }

    /// Whether this exact plugin instance is registered.
    pub fn contains(&self, plugin: &Arc<dyn SourcePlugin>) -> bool {
        self.plugins.iter().any(|p| Arc::ptr_eq(p, plugin))
    }

    /// Plugin at the given registration position.
    pub fn get(&self, index: usize) -> Option<&Arc<dyn SourcePlugin>> {
        self.plugins.get(index)
    }

    /// Plugin names in registration order.
    pub fn names(&self) -> Vec<String> {
        self.plugins.iter().map(|p| p.name().to_string()).collect()
    }

    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }
}
