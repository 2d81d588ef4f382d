//! Google Cloud Natural Language sentiment client
//!
//! Implements [`SentimentAnalyzer`] over the REST `analyzeSentiment`
//! endpoint with an API key. The engine's enrichment handle absorbs any
//! error from here into the default score.

use async_trait::async_trait;
use melody_core::{Error, Result, Sentiment, SentimentAnalyzer};
use serde::{Deserialize, Serialize};
use tracing::debug;

const ANALYZE_SENTIMENT_URL: &str =
    "https://language.googleapis.com/v1/documents:analyzeSentiment";

#[derive(Serialize)]
struct AnalyzeRequest<'a> {
    document: Document<'a>,
}

#[derive(Serialize)]
struct Document<'a> {
    #[serde(rename = "type")]
    doc_type: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct AnalyzeResponse {
    #[serde(rename = "documentSentiment")]
    document_sentiment: Option<DocumentSentiment>,
}

#[derive(Deserialize)]
struct DocumentSentiment {
    #[serde(default)]
    magnitude: f64,
    #[serde(default)]
    score: f64,
}

/// Sentiment backend client
pub struct GoogleSentimentClient {
    api_key: String,
    client: reqwest::Client,
}

impl GoogleSentimentClient {
    pub fn new(api_key: String) -> Self {
        Self {
            api_key,
            client: reqwest::Client::builder()
                .timeout(std::time::Duration::from_secs(30))
                .build()
                .expect("Failed to build HTTP client (system error)"),
        }
    }
}

#[async_trait]
impl SentimentAnalyzer for GoogleSentimentClient {
    async fn analyze(&self, text: &str) -> Result<Sentiment> {
        debug!("Analyzing sentiment for {} chars of text", text.len());

        let request = AnalyzeRequest {
            document: Document {
                doc_type: "PLAIN_TEXT",
                content: text,
            },
        };

        let response = self
            .client
            .post(ANALYZE_SENTIMENT_URL)
            .query(&[("key", self.api_key.as_str())])
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::DataFetch(format!("sentiment API request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(Error::DataFetch(format!(
                "sentiment API returned {}",
                response.status()
            )));
        }

        let analyzed: AnalyzeResponse = response
            .json()
            .await
            .map_err(|e| Error::DataFetch(format!("sentiment API response malformed: {}", e)))?;

        let sentiment = analyzed
            .document_sentiment
            .map(|s| Sentiment::new(s.magnitude, s.score))
            .unwrap_or_default();
        Ok(sentiment)
    }
}
