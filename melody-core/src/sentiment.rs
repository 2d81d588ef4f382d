//! Sentiment enrichment
//!
//! [`SentimentAnalyzer`] is the seam to the external sentiment backend;
//! [`Enricher`] is the infallible handle plugins receive at construction.
//! Enrichment failure is never fatal to a fetch: any analyzer error is
//! absorbed into the `(0, 0)` default pair.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::warn;

use crate::record::Sentiment;
use crate::Result;

/// External sentiment-analysis collaborator.
#[async_trait]
pub trait SentimentAnalyzer: Send + Sync {
    /// Score the given free text.
    async fn analyze(&self, text: &str) -> Result<Sentiment>;
}

/// Enrichment handle handed to each plugin when it is constructed.
///
/// Cheap to clone; wraps the shared analyzer and applies the fallback
/// policy so plugins never have to handle analyzer errors themselves.
#[derive(Clone)]
pub struct Enricher {
    analyzer: Arc<dyn SentimentAnalyzer>,
}

impl Enricher {
    pub fn new(analyzer: Arc<dyn SentimentAnalyzer>) -> Self {
        Self { analyzer }
    }

    /// Score `text`, falling back to the zero pair on any analyzer error
    /// or on empty input.
    pub async fn enrich(&self, text: &str) -> Sentiment {
        if text.trim().is_empty() {
            return Sentiment::default();
        }
        match self.analyzer.analyze(text).await {
            Ok(sentiment) => sentiment,
            Err(e) => {
                warn!("Sentiment analysis failed, using default score: {}", e);
                Sentiment::default()
            }
        }
    }
}

/// Analyzer that scores nothing. Used when no sentiment backend is
/// configured; every record then carries the default pair.
pub struct NullAnalyzer;

#[async_trait]
impl SentimentAnalyzer for NullAnalyzer {
    async fn analyze(&self, _text: &str) -> Result<Sentiment> {
        Ok(Sentiment::default())
    }
}
