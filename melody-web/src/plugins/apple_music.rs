//! Apple Music data plugin
//!
//! Pulls a catalog playlist with a pre-signed developer token. Release
//! dates are normalized to ISO-8601 instants; each track is enriched over
//! its lyrics (Musixmatch).

use async_trait::async_trait;
use chrono::NaiveDate;
use melody_core::{Enricher, Error, Record, Result, SourcePlugin};
use serde::Deserialize;
use tracing::info;

use super::lyrics::MusixmatchClient;
use crate::config::AppleMusicConfig;

const API_URL: &str = "https://api.music.apple.com/v1/catalog/us/playlists";

#[derive(Deserialize)]
struct PlaylistResponse {
    data: Vec<Playlist>,
}

#[derive(Deserialize)]
struct Playlist {
    relationships: Relationships,
}

#[derive(Deserialize)]
struct Relationships {
    tracks: Tracks,
}

#[derive(Deserialize)]
struct Tracks {
    data: Vec<TrackData>,
}

#[derive(Deserialize)]
struct TrackData {
    attributes: TrackAttributes,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct TrackAttributes {
    name: String,
    artist_name: String,
    #[serde(default)]
    genre_names: Vec<String>,
    release_date: Option<String>,
}

/// Data plugin for Apple Music catalog playlists.
pub struct AppleMusicPlugin {
    config: AppleMusicConfig,
    client: reqwest::Client,
    lyrics: MusixmatchClient,
    enricher: Enricher,
}

impl AppleMusicPlugin {
    pub fn new(config: AppleMusicConfig, lyrics: MusixmatchClient, enricher: Enricher) -> Self {
        Self {
            config,
            client: super::http_client(),
            lyrics,
            enricher,
        }
    }

    /// Release dates arrive as `YYYY-MM-DD`; render them as the start of
    /// that day in UTC. Unparseable dates pass through verbatim.
    fn normalize_release_date(date: &str) -> String {
        match NaiveDate::parse_from_str(date, "%Y-%m-%d") {
            Ok(parsed) => parsed
                .and_hms_opt(0, 0, 0)
                .map(|dt| dt.and_utc().to_rfc3339())
                .unwrap_or_else(|| date.to_string()),
            Err(_) => date.to_string(),
        }
    }
}

#[async_trait]
impl SourcePlugin for AppleMusicPlugin {
    fn name(&self) -> &str {
        "AppleMusic"
    }

    async fn access_token(&self, _use_default: bool) -> Result<String> {
        // The developer token is provisioned out of band; there is no
        // interactive flow for catalog access.
        if self.config.developer_token.trim().is_empty() {
            return Err(Error::Credential(
                "Apple Music developer token is not configured".to_string(),
            ));
        }
        Ok(self.config.developer_token.clone())
    }

    async fn fetch_records(&self, access_token: &str) -> Result<Vec<Record>> {
        info!("Fetching playlist from the Apple Music API");
        let playlist_id = super::id_from_share_url(&self.config.playlist_url).ok_or_else(|| {
            Error::DataFetch(format!(
                "cannot extract playlist id from '{}'",
                self.config.playlist_url
            ))
        })?;

        let response = self
            .client
            .get(format!("{}/{}", API_URL, playlist_id))
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| Error::DataFetch(format!("Apple Music request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(Error::DataFetch(format!(
                "Apple Music endpoint returned {}",
                response.status()
            )));
        }

        let playlist: PlaylistResponse = response
            .json()
            .await
            .map_err(|e| Error::DataFetch(format!("Apple Music response malformed: {}", e)))?;

        let tracks = playlist
            .data
            .into_iter()
            .next()
            .map(|p| p.relationships.tracks.data)
            .unwrap_or_default();

        let mut records = Vec::with_capacity(tracks.len());
        for track in tracks {
            let attributes = track.attributes;
            let lyrics = self
                .lyrics
                .fetch_lyrics(&attributes.name, &attributes.artist_name)
                .await;
            let sentiment = self.enricher.enrich(&lyrics).await;
            let timestamp = attributes
                .release_date
                .as_deref()
                .map(Self::normalize_release_date)
                .unwrap_or_default();

            records.push(Record::new(
                attributes.name,
                attributes.artist_name,
                attributes.genre_names,
                timestamp,
                sentiment,
            ));
        }
        Ok(records)
    }
}
