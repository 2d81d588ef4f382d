//! Workflow engine — the stage-gated session state machine
//!
//! One engine instance carries one in-flight user session through the
//! linear cycle select plugin → enter access token → fetch → display.
//! Every driving operation checks the current stage first and fails with
//! [`Error::InvalidStage`] when invoked out of sequence; the stage only
//! advances when the operation succeeds, so a failed step can be retried.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::plugin::SourcePlugin;
use crate::record::Record;
use crate::registry::PluginRegistry;
use crate::snapshot::Snapshot;
use crate::{Error, Result};

/// Default timeout for the interactive browser-based credential exchange,
/// the only unbounded operation in the workflow.
pub const DEFAULT_BROWSER_AUTH_TIMEOUT: Duration = Duration::from_secs(120);

/// The engine's position in its four-step cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Stage {
    /// Initial state, no plugin chosen yet
    SelectDataPlugin,
    /// A plugin has been chosen; a credential is required next
    EnterAccessToken,
    /// Credential obtained; ready to fetch
    SelectDisplayPlugin,
    /// Data fetched; terminal state for this cycle
    Display,
}

impl Stage {
    /// Next stage in the single forward cycle.
    fn next(self) -> Stage {
        match self {
            Stage::SelectDataPlugin => Stage::EnterAccessToken,
            Stage::EnterAccessToken => Stage::SelectDisplayPlugin,
            Stage::SelectDisplayPlugin => Stage::Display,
            Stage::Display => Stage::SelectDataPlugin,
        }
    }
}

/// How `set_access_token` resolves the credential.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenMethod {
    /// Store the caller-supplied token verbatim
    Custom,
    /// Ask the plugin for its pre-provisioned credential
    Default,
    /// Run the plugin's interactive browser exchange (may block)
    Browser,
}

/// Orchestration engine for one workflow session.
///
/// Owns the plugin registry for the process lifetime and the mutable
/// session state (selection, credential, record set, stage). The record
/// set and credential are only meaningful relative to the selected
/// plugin; `reset` clears all three together.
pub struct WorkflowEngine {
    registry: PluginRegistry,
    current_plugin: Option<Arc<dyn SourcePlugin>>,
    records: Option<Vec<Record>>,
    access_token: Option<String>,
    stage: Stage,
    browser_auth_timeout: Duration,
}

impl WorkflowEngine {
    pub fn new() -> Self {
        Self {
            registry: PluginRegistry::new(),
            current_plugin: None,
            records: None,
            access_token: None,
            stage: Stage::SelectDataPlugin,
            browser_auth_timeout: DEFAULT_BROWSER_AUTH_TIMEOUT,
        }
    }

    /// Override the interactive-auth timeout (configuration hook).
    pub fn with_browser_auth_timeout(mut self, timeout: Duration) -> Self {
        self.browser_auth_timeout = timeout;
        self
    }

    /// Register a data plugin. Allowed in any stage; the registry is
    /// independent of the session cycle.
    pub fn register_plugin(&mut self, plugin: Arc<dyn SourcePlugin>) -> Result<()> {
        self.registry.register(plugin)
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn registry(&self) -> &PluginRegistry {
        &self.registry
    }

    pub fn access_token(&self) -> Option<&str> {
        self.access_token.as_deref()
    }

    fn require_stage(&self, operation: &'static str, expected: Stage) -> Result<()> {
        if self.stage != expected {
            return Err(Error::InvalidStage {
                operation,
                stage: self.stage,
            });
        }
        Ok(())
    }

    /// Select the data plugin for this session.
    ///
    /// The plugin must be registry-resident; an instance the registry has
    /// never seen fails with [`Error::UnknownPlugin`].
    pub fn select_plugin(&mut self, plugin: Arc<dyn SourcePlugin>) -> Result<()> {
        self.require_stage("select_plugin", Stage::SelectDataPlugin)?;
        if !self.registry.contains(&plugin) {
            return Err(Error::UnknownPlugin(plugin.name().to_string()));
        }

        info!("Selected data plugin '{}'", plugin.name());
        self.current_plugin = Some(plugin);
        self.stage = self.stage.next();
        Ok(())
    }

    /// Select a plugin by its registration position. This is the form the
    /// transport layer uses.
    pub fn select_plugin_at(&mut self, index: usize) -> Result<()> {
        self.require_stage("select_plugin", Stage::SelectDataPlugin)?;
        let plugin = self
            .registry
            .get(index)
            .cloned()
            .ok_or_else(|| Error::UnknownPlugin(format!("no plugin at position {}", index)))?;
        self.select_plugin(plugin)
    }

    /// Resolve and store the session credential.
    ///
    /// `Custom` stores `value` verbatim; `Default` asks the plugin for a
    /// non-interactive credential; `Browser` runs the plugin's interactive
    /// exchange under the configured timeout. The stage advances only on
    /// success, so a failed or timed-out exchange can be retried.
    pub async fn set_access_token(
        &mut self,
        method: TokenMethod,
        value: Option<&str>,
    ) -> Result<()> {
        self.require_stage("set_access_token", Stage::EnterAccessToken)?;
        let plugin = self
            .current_plugin
            .as_ref()
            .ok_or_else(|| Error::NoPluginSelected("set_access_token".to_string()))?
            .clone();

        let token = match method {
            TokenMethod::Custom => value
                .map(str::to_string)
                .ok_or_else(|| Error::Credential("custom method requires a token".to_string()))?,
            TokenMethod::Default => plugin.access_token(true).await?,
            TokenMethod::Browser => {
                debug!(
                    "Starting interactive credential exchange for '{}' (timeout {:?})",
                    plugin.name(),
                    self.browser_auth_timeout
                );
                tokio::time::timeout(self.browser_auth_timeout, plugin.access_token(false))
                    .await
                    .map_err(|_| {
                        Error::Credential(format!(
                            "interactive auth for '{}' timed out after {:?}",
                            plugin.name(),
                            self.browser_auth_timeout
                        ))
                    })??
            }
        };

        self.access_token = Some(token);
        self.stage = self.stage.next();
        Ok(())
    }

    /// Fetch the collection from the selected plugin, replacing the
    /// stored record set wholesale.
    ///
    /// A provider failure propagates as [`Error::DataFetch`] without
    /// retry, leaving the stage unadvanced so the step can be retried.
    pub async fn fetch_data(&mut self) -> Result<()> {
        self.require_stage("fetch_data", Stage::SelectDisplayPlugin)?;
        let plugin = self
            .current_plugin
            .as_ref()
            .ok_or_else(|| Error::NoPluginSelected("fetch_data".to_string()))?
            .clone();
        let token = self
            .access_token
            .as_ref()
            .ok_or_else(|| Error::NoPluginSelected("no access token set".to_string()))?
            .clone();

        info!("Fetching data from '{}'", plugin.name());
        let records = plugin.fetch_records(&token).await?;
        info!("Fetched {} records from '{}'", records.len(), plugin.name());

        self.records = Some(records);
        self.stage = self.stage.next();
        Ok(())
    }

    /// Start a new session: clear selection, credential, and record set,
    /// return to the initial stage. The plugin registry is kept.
    /// Callable from any stage.
    pub fn reset(&mut self) {
        debug!("Resetting workflow from stage {:?}", self.stage);
        self.current_plugin = None;
        self.records = None;
        self.access_token = None;
        self.stage = Stage::SelectDataPlugin;
    }

    /// Read-only projection of the current engine state for presentation.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot::of(self.records.as_deref(), &self.registry, self.stage)
    }
}

impl Default for WorkflowEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Sentiment;
    use async_trait::async_trait;

    struct StubPlugin {
        name: &'static str,
        titles: Vec<&'static str>,
    }

    impl StubPlugin {
        fn named(name: &'static str) -> Arc<dyn SourcePlugin> {
            Arc::new(Self {
                name,
                titles: Vec::new(),
            })
        }

        fn with_titles(titles: Vec<&'static str>) -> Arc<dyn SourcePlugin> {
            Arc::new(Self {
                name: "Stub",
                titles,
            })
        }
    }

    #[async_trait]
    impl SourcePlugin for StubPlugin {
        fn name(&self) -> &str {
            self.name
        }

        async fn access_token(&self, _use_default: bool) -> Result<String> {
            Ok("stub-token".to_string())
        }

        async fn fetch_records(&self, _access_token: &str) -> Result<Vec<Record>> {
            Ok(self
                .titles
                .iter()
                .map(|t| Record::new(*t, "Artist", vec![], "2023-01-01T00:00:00Z", Sentiment::default()))
                .collect())
        }
    }

    #[tokio::test]
    async fn stage_follows_the_transition_table() {
        let mut engine = WorkflowEngine::new();
        let plugin = StubPlugin::with_titles(vec!["X"]);
        engine.register_plugin(plugin.clone()).unwrap();
        assert_eq!(engine.stage(), Stage::SelectDataPlugin);

        engine.select_plugin(plugin).unwrap();
        assert_eq!(engine.stage(), Stage::EnterAccessToken);

        engine
            .set_access_token(TokenMethod::Custom, Some("tok"))
            .await
            .unwrap();
        assert_eq!(engine.stage(), Stage::SelectDisplayPlugin);
        assert_eq!(engine.access_token(), Some("tok"));

        engine.fetch_data().await.unwrap();
        assert_eq!(engine.stage(), Stage::Display);
    }

    #[tokio::test]
    async fn out_of_stage_operations_fail_without_mutating() {
        let mut engine = WorkflowEngine::new();
        let plugin = StubPlugin::named("Stub");
        engine.register_plugin(plugin.clone()).unwrap();

        // set_access_token before any plugin is selected
        let err = engine
            .set_access_token(TokenMethod::Custom, Some("tok"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidStage { .. }));
        assert_eq!(engine.stage(), Stage::SelectDataPlugin);
        assert_eq!(engine.access_token(), None);

        // selecting twice in a row
        engine.select_plugin(plugin.clone()).unwrap();
        let err = engine.select_plugin(plugin).unwrap_err();
        assert!(matches!(err, Error::InvalidStage { .. }));
        assert_eq!(engine.stage(), Stage::EnterAccessToken);
    }

    #[tokio::test]
    async fn fetch_without_plugin_fails_with_no_plugin_selected() {
        let mut engine = WorkflowEngine::new();
        // Force the fetch stage without a selection to exercise the guard
        // behind the stage check.
        engine.stage = Stage::SelectDisplayPlugin;

        let err = engine.fetch_data().await.unwrap_err();
        assert!(matches!(err, Error::NoPluginSelected(_)));
        assert_eq!(engine.stage(), Stage::SelectDisplayPlugin);
    }

    #[tokio::test]
    async fn selecting_an_unregistered_plugin_fails() {
        let mut engine = WorkflowEngine::new();
        engine.register_plugin(StubPlugin::named("Registered")).unwrap();

        let outsider = StubPlugin::named("Outsider");
        let err = engine.select_plugin(outsider).unwrap_err();
        assert!(matches!(err, Error::UnknownPlugin(_)));
        assert_eq!(engine.stage(), Stage::SelectDataPlugin);
    }

    #[tokio::test]
    async fn select_by_position_uses_registration_order() {
        let mut engine = WorkflowEngine::new();
        engine.register_plugin(StubPlugin::named("First")).unwrap();
        engine.register_plugin(StubPlugin::named("Second")).unwrap();

        engine.select_plugin_at(1).unwrap();
        assert_eq!(engine.stage(), Stage::EnterAccessToken);

        engine.reset();
        let err = engine.select_plugin_at(5).unwrap_err();
        assert!(matches!(err, Error::UnknownPlugin(_)));
    }

    #[tokio::test]
    async fn out_of_stage_select_by_position_fails_on_the_stage_first() {
        let mut engine = WorkflowEngine::new();
        engine.register_plugin(StubPlugin::named("Only")).unwrap();
        engine.select_plugin_at(0).unwrap();

        // Past the selection stage, even a bad index is a stage error.
        let err = engine.select_plugin_at(5).unwrap_err();
        assert!(matches!(err, Error::InvalidStage { .. }));
        assert_eq!(engine.stage(), Stage::EnterAccessToken);
    }

    #[tokio::test]
    async fn custom_method_requires_a_token_value() {
        let mut engine = WorkflowEngine::new();
        let plugin = StubPlugin::named("Stub");
        engine.register_plugin(plugin.clone()).unwrap();
        engine.select_plugin(plugin).unwrap();

        let err = engine
            .set_access_token(TokenMethod::Custom, None)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Credential(_)));
        assert_eq!(engine.stage(), Stage::EnterAccessToken);
    }

    #[tokio::test]
    async fn default_method_asks_the_plugin() {
        let mut engine = WorkflowEngine::new();
        let plugin = StubPlugin::named("Stub");
        engine.register_plugin(plugin.clone()).unwrap();
        engine.select_plugin(plugin).unwrap();

        engine
            .set_access_token(TokenMethod::Default, None)
            .await
            .unwrap();
        assert_eq!(engine.access_token(), Some("stub-token"));
    }

    #[tokio::test]
    async fn browser_method_times_out_as_credential_error() {
        struct HangingPlugin;

        #[async_trait]
        impl SourcePlugin for HangingPlugin {
            fn name(&self) -> &str {
                "Hanging"
            }

            async fn access_token(&self, use_default: bool) -> Result<String> {
                if use_default {
                    return Ok("default".to_string());
                }
                // Simulates a browser exchange the user never completes.
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Ok("never".to_string())
            }

            async fn fetch_records(&self, _access_token: &str) -> Result<Vec<Record>> {
                Ok(Vec::new())
            }
        }

        let mut engine =
            WorkflowEngine::new().with_browser_auth_timeout(Duration::from_millis(20));
        let plugin: Arc<dyn SourcePlugin> = Arc::new(HangingPlugin);
        engine.register_plugin(plugin.clone()).unwrap();
        engine.select_plugin(plugin).unwrap();

        let err = engine
            .set_access_token(TokenMethod::Browser, None)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Credential(_)));
        assert_eq!(engine.stage(), Stage::EnterAccessToken);
    }

    #[tokio::test]
    async fn reset_clears_session_state_but_not_the_registry() {
        let mut engine = WorkflowEngine::new();
        let plugin = StubPlugin::with_titles(vec!["X", "Y"]);
        engine.register_plugin(plugin.clone()).unwrap();
        engine.select_plugin(plugin).unwrap();
        engine
            .set_access_token(TokenMethod::Custom, Some("tok"))
            .await
            .unwrap();
        engine.fetch_data().await.unwrap();
        assert_eq!(engine.stage(), Stage::Display);

        engine.reset();
        assert_eq!(engine.stage(), Stage::SelectDataPlugin);
        assert_eq!(engine.access_token(), None);
        assert!(engine.snapshot().track_data().is_empty());
        assert_eq!(engine.registry().len(), 1);
    }

    #[tokio::test]
    async fn failed_fetch_leaves_the_stage_for_retry() {
        struct FailingPlugin;

        #[async_trait]
        impl SourcePlugin for FailingPlugin {
            fn name(&self) -> &str {
                "Failing"
            }

            async fn access_token(&self, _use_default: bool) -> Result<String> {
                Ok("token".to_string())
            }

            async fn fetch_records(&self, _access_token: &str) -> Result<Vec<Record>> {
                Err(Error::DataFetch("provider unreachable".to_string()))
            }
        }

        let mut engine = WorkflowEngine::new();
        let plugin: Arc<dyn SourcePlugin> = Arc::new(FailingPlugin);
        engine.register_plugin(plugin.clone()).unwrap();
        engine.select_plugin(plugin).unwrap();
        engine
            .set_access_token(TokenMethod::Custom, Some("tok"))
            .await
            .unwrap();

        let err = engine.fetch_data().await.unwrap_err();
        assert!(matches!(err, Error::DataFetch(_)));
        assert_eq!(engine.stage(), Stage::SelectDisplayPlugin);
        assert!(engine.snapshot().track_data().is_empty());
    }

    #[test]
    fn stage_serializes_in_screaming_snake_case() {
        assert_eq!(
            serde_json::to_string(&Stage::SelectDataPlugin).unwrap(),
            "\"SELECT_DATA_PLUGIN\""
        );
        assert_eq!(
            serde_json::to_string(&Stage::Display).unwrap(),
            "\"DISPLAY\""
        );
    }

    #[test]
    fn token_method_deserializes_from_lowercase() {
        let method: TokenMethod = serde_json::from_str("\"browser\"").unwrap();
        assert_eq!(method, TokenMethod::Browser);
    }
}
