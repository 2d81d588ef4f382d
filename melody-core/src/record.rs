//! Enriched playlist records
//!
//! A [`Record`] is one item of an external media collection after
//! enrichment. Records are built once, with every field known, and never
//! mutated; the engine replaces the whole set on each fetch.

use serde::{Serialize, Serializer};

/// Sentiment analysis result for the text associated with a record.
///
/// `(0.0, 0.0)` is the defined fallback when enrichment is unavailable.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Sentiment {
    /// Overall strength of emotion in the text (non-negative)
    pub magnitude: f64,
    /// Emotional leaning of the text (-1.0 negative to 1.0 positive)
    pub score: f64,
}

impl Sentiment {
    pub fn new(magnitude: f64, score: f64) -> Self {
        Self { magnitude, score }
    }
}

// The display layer expects the sentiment as a two-element array,
// [magnitude, score].
impl Serialize for Sentiment {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        [self.magnitude, self.score].serialize(serializer)
    }
}

/// One enriched item of external media data (track, video, ...).
#[derive(Debug, Clone, Serialize)]
pub struct Record {
    /// Item title
    title: String,
    /// Creator name (artist, channel owner)
    artist: String,
    /// Category tags in provider order, possibly empty
    genre: Vec<String>,
    /// Externally supplied added/published time, ISO-8601 text
    timestamp: String,
    /// Sentiment pair for the associated free text
    #[serde(rename = "score")]
    sentiment: Sentiment,
}

impl Record {
    /// Build a record once all fields, including enrichment, are known.
    pub fn new(
        title: impl Into<String>,
        artist: impl Into<String>,
        genre: Vec<String>,
        timestamp: impl Into<String>,
        sentiment: Sentiment,
    ) -> Self {
        Self {
            title: title.into(),
            artist: artist.into(),
            genre,
            timestamp: timestamp.into(),
            sentiment,
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn artist(&self) -> &str {
        &self.artist
    }

    pub fn genre(&self) -> &[String] {
        &self.genre
    }

    pub fn timestamp(&self) -> &str {
        &self.timestamp
    }

    pub fn sentiment(&self) -> Sentiment {
        self.sentiment
    }
}
