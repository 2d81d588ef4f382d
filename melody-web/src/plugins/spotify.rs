//! Spotify data plugin
//!
//! Pulls a playlist via the Spotify Web API. Credentials come from the
//! client-credentials grant, which has no interactive step, so both token
//! methods resolve the same way. Each track is enriched over its lyrics
//! (Musixmatch) and tagged with the genres of its lead artist.

use async_trait::async_trait;
use melody_core::{Enricher, Error, Record, Result, SourcePlugin};
use serde::Deserialize;
use tracing::{info, warn};

use super::lyrics::MusixmatchClient;
use crate::config::SpotifyConfig;

const TOKEN_URL: &str = "https://accounts.spotify.com/api/token";
const API_URL: &str = "https://api.spotify.com/v1";

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Deserialize)]
struct PlaylistItemsResponse {
    items: Vec<PlaylistItem>,
}

#[derive(Deserialize)]
struct PlaylistItem {
    added_at: Option<String>,
    track: Option<PlaylistTrack>,
}

#[derive(Deserialize)]
struct PlaylistTrack {
    name: String,
    artists: Vec<TrackArtist>,
}

#[derive(Deserialize)]
struct TrackArtist {
    id: Option<String>,
    name: String,
}

#[derive(Deserialize)]
struct ArtistResponse {
    #[serde(default)]
    genres: Vec<String>,
}

/// Data plugin for Spotify playlists.
pub struct SpotifyPlugin {
    config: SpotifyConfig,
    client: reqwest::Client,
    lyrics: MusixmatchClient,
    enricher: Enricher,
}

impl SpotifyPlugin {
    pub fn new(config: SpotifyConfig, lyrics: MusixmatchClient, enricher: Enricher) -> Self {
        Self {
            config,
            client: super::http_client(),
            lyrics,
            enricher,
        }
    }

    fn playlist_id(&self) -> Result<&str> {
        super::id_from_share_url(&self.config.playlist_url).ok_or_else(|| {
            Error::DataFetch(format!(
                "cannot extract playlist id from '{}'",
                self.config.playlist_url
            ))
        })
    }

    /// Genres of the track's lead artist; empty on any lookup problem.
    async fn artist_genres(&self, access_token: &str, artist_id: &str) -> Vec<String> {
        let request = self
            .client
            .get(format!("{}/artists/{}", API_URL, artist_id))
            .bearer_auth(access_token)
            .send()
            .await;

        match request {
            Ok(response) => response
                .json::<ArtistResponse>()
                .await
                .map(|a| a.genres)
                .unwrap_or_default(),
            Err(e) => {
                warn!("Artist genre lookup failed for {}: {}", artist_id, e);
                Vec::new()
            }
        }
    }
}

#[async_trait]
impl SourcePlugin for SpotifyPlugin {
    fn name(&self) -> &str {
        "Spotify"
    }

    async fn access_token(&self, _use_default: bool) -> Result<String> {
        let response = self
            .client
            .post(TOKEN_URL)
            .basic_auth(&self.config.client_id, Some(&self.config.client_secret))
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await
            .map_err(|e| Error::Credential(format!("Spotify token request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(Error::Credential(format!(
                "Spotify token endpoint returned {}",
                response.status()
            )));
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| Error::Credential(format!("Spotify token response malformed: {}", e)))?;
        Ok(token.access_token)
    }

    async fn fetch_records(&self, access_token: &str) -> Result<Vec<Record>> {
        info!("Fetching playlist from the Spotify API");
        let playlist_id = self.playlist_id()?;

        let response = self
            .client
            .get(format!("{}/playlists/{}/tracks", API_URL, playlist_id))
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| Error::DataFetch(format!("Spotify playlist request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(Error::DataFetch(format!(
                "Spotify playlist endpoint returned {}",
                response.status()
            )));
        }

        let playlist: PlaylistItemsResponse = response
            .json()
            .await
            .map_err(|e| Error::DataFetch(format!("Spotify playlist response malformed: {}", e)))?;

        let mut records = Vec::with_capacity(playlist.items.len());
        for item in playlist.items {
            // Local tracks and removed episodes come back without a track
            // object; skip those rather than failing the whole fetch.
            let Some(track) = item.track else {
                continue;
            };
            let Some(artist) = track.artists.first() else {
                continue;
            };

            let genre = match &artist.id {
                Some(id) => self.artist_genres(access_token, id).await,
                None => Vec::new(),
            };

            let lyrics = self.lyrics.fetch_lyrics(&track.name, &artist.name).await;
            let sentiment = self.enricher.enrich(&lyrics).await;
            let timestamp = item.added_at.unwrap_or_default();

            records.push(Record::new(
                track.name,
                artist.name.clone(),
                genre,
                timestamp,
                sentiment,
            ));
        }
        Ok(records)
    }
}
