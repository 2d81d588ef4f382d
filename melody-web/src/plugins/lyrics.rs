//! Musixmatch lyric lookup
//!
//! Resolves a track to its lyrics in two calls: `matcher.track.get` to
//! find the track id, then `track.lyrics.get` for the lyrics body. Any
//! failure yields an empty string; a track without lyrics is simply
//! enriched with the default score downstream.

use serde::Deserialize;
use tracing::{debug, warn};

const MUSIXMATCH_API_URL: &str = "https://api.musixmatch.com/ws/1.1";

#[derive(Deserialize)]
struct MatcherResponse {
    message: MatcherMessage,
}

#[derive(Deserialize)]
struct MatcherMessage {
    body: Option<MatcherBody>,
}

#[derive(Deserialize)]
struct MatcherBody {
    track: Option<MatchedTrack>,
}

#[derive(Deserialize)]
struct MatchedTrack {
    track_id: u64,
    #[serde(default)]
    has_lyrics: u8,
}

#[derive(Deserialize)]
struct LyricsResponse {
    message: LyricsMessage,
}

#[derive(Deserialize)]
struct LyricsMessage {
    body: Option<LyricsBody>,
}

#[derive(Deserialize)]
struct LyricsBody {
    lyrics: Option<Lyrics>,
}

#[derive(Deserialize)]
struct Lyrics {
    lyrics_body: String,
}

/// Musixmatch API client, shared by the music plugins.
#[derive(Clone)]
pub struct MusixmatchClient {
    api_key: Option<String>,
    client: reqwest::Client,
}

impl MusixmatchClient {
    pub fn new(api_key: Option<String>) -> Self {
        Self {
            api_key,
            client: super::http_client(),
        }
    }

    /// Fetch lyrics for a track, or an empty string when the track has no
    /// lyrics, the key is unconfigured, or any call fails.
    pub async fn fetch_lyrics(&self, title: &str, artist: &str) -> String {
        let Some(api_key) = self.api_key.as_deref() else {
            return String::new();
        };

        match self.try_fetch(api_key, title, artist).await {
            Ok(lyrics) => lyrics,
            Err(e) => {
                warn!("Lyric lookup failed for '{}' by '{}': {}", title, artist, e);
                String::new()
            }
        }
    }

    async fn try_fetch(&self, api_key: &str, title: &str, artist: &str) -> reqwest::Result<String> {
        let matched: MatcherResponse = self
            .client
            .get(format!("{}/matcher.track.get", MUSIXMATCH_API_URL))
            .query(&[
                ("q_track", title),
                ("q_artist", artist),
                ("apikey", api_key),
            ])
            .send()
            .await?
            .json()
            .await?;

        let Some(track) = matched.message.body.and_then(|b| b.track) else {
            debug!("No Musixmatch match for '{}' by '{}'", title, artist);
            return Ok(String::new());
        };
        if track.has_lyrics != 1 {
            return Ok(String::new());
        }

        let lyrics: LyricsResponse = self
            .client
            .get(format!("{}/track.lyrics.get", MUSIXMATCH_API_URL))
            .query(&[
                ("track_id", track.track_id.to_string().as_str()),
                ("apikey", api_key),
            ])
            .send()
            .await?
            .json()
            .await?;

        Ok(lyrics
            .message
            .body
            .and_then(|b| b.lyrics)
            .map(|l| l.lyrics_body)
            .unwrap_or_default())
    }
}
