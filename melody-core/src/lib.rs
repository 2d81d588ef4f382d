//! # Melody Core (melody-core)
//!
//! Orchestration engine for the Melody sentiment playlist analyzer.
//!
//! **Purpose:** Manage a set of registered data-source plugins, walk one
//! user session through the four-stage selection → auth → fetch → display
//! workflow, and project the resulting enriched record set for display.
//!
//! **Architecture:** A single [`WorkflowEngine`] owns the plugin registry
//! and the per-session state. Plugins implement [`SourcePlugin`] and are
//! handed an [`Enricher`] at construction for sentiment scoring. The
//! transport layer (melody-web) drives the engine one operation at a time
//! and reads back a [`Snapshot`] after each.

pub mod engine;
pub mod error;
pub mod plugin;
pub mod record;
pub mod registry;
pub mod sentiment;
pub mod snapshot;

pub use engine::{Stage, TokenMethod, WorkflowEngine};
pub use error::{Error, Result};
pub use plugin::SourcePlugin;
pub use record::{Record, Sentiment};
pub use registry::PluginRegistry;
pub use sentiment::{Enricher, NullAnalyzer, SentimentAnalyzer};
pub use snapshot::{PluginDescriptor, Snapshot};
