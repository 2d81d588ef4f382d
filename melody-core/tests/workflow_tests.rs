//! End-to-end workflow tests over the public melody-core API
//!
//! Exercises the full select → token → fetch → display cycle with stub
//! plugins and a stubbed sentiment analyzer, the way the transport layer
//! drives the engine.

use std::sync::Arc;

use async_trait::async_trait;
use melody_core::{
    Enricher, Error, Record, Result, Sentiment, SentimentAnalyzer, SourcePlugin, Stage,
    TokenMethod, WorkflowEngine,
};

/// Plugin that enriches a fixed set of titles through an injected
/// enricher, mirroring how the real source plugins are built.
struct EnrichingPlugin {
    titles: Vec<&'static str>,
    enricher: Enricher,
}

#[async_trait]
impl SourcePlugin for EnrichingPlugin {
    fn name(&self) -> &str {
        "Enriching"
    }

    async fn access_token(&self, _use_default: bool) -> Result<String> {
        Ok("token".to_string())
    }

    async fn fetch_records(&self, _access_token: &str) -> Result<Vec<Record>> {
        let mut records = Vec::with_capacity(self.titles.len());
        for title in &self.titles {
            let sentiment = self.enricher.enrich(title).await;
            records.push(Record::new(
                *title,
                "Artist",
                vec!["pop".to_string()],
                "2023-04-01T12:00:00Z",
                sentiment,
            ));
        }
        Ok(records)
    }
}

struct FixedAnalyzer(Sentiment);

#[async_trait]
impl SentimentAnalyzer for FixedAnalyzer {
    async fn analyze(&self, _text: &str) -> Result<Sentiment> {
        Ok(self.0)
    }
}

struct BrokenAnalyzer;

#[async_trait]
impl SentimentAnalyzer for BrokenAnalyzer {
    async fn analyze(&self, _text: &str) -> Result<Sentiment> {
        Err(Error::Credential("quota exceeded".to_string()))
    }
}

#[tokio::test]
async fn full_cycle_with_custom_token_reaches_display() {
    let enricher = Enricher::new(Arc::new(FixedAnalyzer(Sentiment::new(1.0, 0.5))));
    let plugin: Arc<dyn SourcePlugin> = Arc::new(EnrichingPlugin {
        titles: vec!["X"],
        enricher,
    });

    let mut engine = WorkflowEngine::new();
    engine.register_plugin(plugin.clone()).unwrap();

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

    let snapshot = engine.snapshot();
    assert_eq!(snapshot.track_data().len(), 1);
    assert_eq!(snapshot.track_data()[0].title(), "X");
    assert_eq!(
        snapshot.track_data()[0].sentiment(),
        Sentiment::new(1.0, 0.5)
    );
}

#[tokio::test]
async fn fetch_preserves_provider_order() {
    let enricher = Enricher::new(Arc::new(FixedAnalyzer(Sentiment::default())));
    let plugin: Arc<dyn SourcePlugin> = Arc::new(EnrichingPlugin {
        titles: vec!["a", "b", "c", "d"],
        enricher,
    });

    let mut engine = WorkflowEngine::new();
    engine.register_plugin(plugin.clone()).unwrap();
    engine.select_plugin(plugin).unwrap();
    engine
        .set_access_token(TokenMethod::Default, None)
        .await
        .unwrap();
    engine.fetch_data().await.unwrap();

    let snapshot = engine.snapshot();
    let titles: Vec<&str> = snapshot
        .track_data()
        .iter()
        .map(Record::title)
        .collect();
    assert_eq!(titles, vec!["a", "b", "c", "d"]);
}

#[tokio::test]
async fn empty_collection_fetch_reaches_display() {
    let enricher = Enricher::new(Arc::new(FixedAnalyzer(Sentiment::default())));
    let plugin: Arc<dyn SourcePlugin> = Arc::new(EnrichingPlugin {
        titles: Vec::new(),
        enricher,
    });

    let mut engine = WorkflowEngine::new();
    engine.register_plugin(plugin.clone()).unwrap();
    engine.select_plugin(plugin).unwrap();
    engine
        .set_access_token(TokenMethod::Custom, Some("tok"))
        .await
        .unwrap();

    // A provider with no items yields an empty set, not a failure.
    engine.fetch_data().await.unwrap();
    assert_eq!(engine.stage(), Stage::Display);
    assert!(engine.snapshot().track_data().is_empty());
}

#[tokio::test]
async fn enrichment_failure_never_fails_the_fetch() {
    let enricher = Enricher::new(Arc::new(BrokenAnalyzer));
    let plugin: Arc<dyn SourcePlugin> = Arc::new(EnrichingPlugin {
        titles: vec!["sad song", "happy song"],
        enricher,
    });

    let mut engine = WorkflowEngine::new();
    engine.register_plugin(plugin.clone()).unwrap();
    engine.select_plugin(plugin).unwrap();
    engine
        .set_access_token(TokenMethod::Custom, Some("tok"))
        .await
        .unwrap();

    engine.fetch_data().await.unwrap();
    assert_eq!(engine.stage(), Stage::Display);
    for record in engine.snapshot().track_data() {
        assert_eq!(record.sentiment(), Sentiment::default());
    }
}

#[tokio::test]
async fn next_fetch_replaces_the_record_set_wholesale() {
    let enricher = Enricher::new(Arc::new(FixedAnalyzer(Sentiment::default())));
    let plugin: Arc<dyn SourcePlugin> = Arc::new(EnrichingPlugin {
        titles: vec!["old"],
        enricher: enricher.clone(),
    });
    let other: Arc<dyn SourcePlugin> = Arc::new(EnrichingPlugin {
        titles: vec!["new-1", "new-2"],
        enricher,
    });

    let mut engine = WorkflowEngine::new();
    engine.register_plugin(plugin.clone()).unwrap();
    engine.register_plugin(other.clone()).unwrap();

    engine.select_plugin(plugin).unwrap();
    engine
        .set_access_token(TokenMethod::Custom, Some("tok"))
        .await
        .unwrap();
    engine.fetch_data().await.unwrap();
    assert_eq!(engine.snapshot().track_data().len(), 1);

    engine.reset();
    engine.select_plugin(other).unwrap();
    engine
        .set_access_token(TokenMethod::Custom, Some("tok"))
        .await
        .unwrap();
    engine.fetch_data().await.unwrap();

    let snapshot = engine.snapshot();
    let titles: Vec<&str> = snapshot
        .track_data()
        .iter()
        .map(Record::title)
        .collect();
    assert_eq!(titles, vec!["new-1", "new-2"]);
}
