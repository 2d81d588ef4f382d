//! Vimeo data plugin
//!
//! Pulls the authenticated user's liked videos and enriches each one over
//! its description. The `default` token method uses a pre-provisioned
//! token; the `browser` method runs the OAuth implicit grant against a
//! one-shot localhost redirect listener. The engine bounds the
//! interactive exchange with its configured timeout.

use async_trait::async_trait;
use melody_core::{Enricher, Error, Record, Result, SourcePlugin};
use serde::Deserialize;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tracing::{info, warn};

use crate::config::VimeoConfig;

const API_URL: &str = "https://api.vimeo.com";
const AUTHORIZE_URL: &str = "https://api.vimeo.com/oauth/authorize";
const AUTH_STATE: &str = "melody";

// Page served on the first redirect hit; the token arrives in the URL
// fragment, which never reaches the server, so this script reflects it
// back as a query string.
const FRAGMENT_RELAY_PAGE: &str = "<!DOCTYPE html><html><body>\
<script>location.replace('/callback?' + location.hash.substring(1));</script>\
</body></html>";

const DONE_PAGE: &str =
    "<!DOCTYPE html><html><body>Authorized. You can close this tab.</body></html>";

#[derive(Deserialize)]
struct LikesResponse {
    data: Vec<Video>,
}

#[derive(Deserialize)]
struct Video {
    name: String,
    user: VideoUser,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    categories: Vec<Category>,
    metadata: Option<VideoMetadata>,
}

#[derive(Deserialize)]
struct VideoUser {
    name: String,
}

#[derive(Deserialize)]
struct Category {
    name: String,
}

#[derive(Deserialize)]
struct VideoMetadata {
    interactions: Option<Interactions>,
}

#[derive(Deserialize)]
struct Interactions {
    like: Option<LikeInteraction>,
}

#[derive(Deserialize)]
struct LikeInteraction {
    added_time: Option<String>,
}

/// Data plugin for Vimeo likes.
pub struct VimeoPlugin {
    config: VimeoConfig,
    client: reqwest::Client,
    enricher: Enricher,
}

impl VimeoPlugin {
    pub fn new(config: VimeoConfig, enricher: Enricher) -> Self {
        Self {
            config,
            client: super::http_client(),
            enricher,
        }
    }

    /// Run the implicit-grant exchange: log the authorize URL for the
    /// user, then wait on the local redirect listener for the token.
    async fn browser_token(&self) -> Result<String> {
        let client_id = self.config.client_id.as_deref().ok_or_else(|| {
            Error::Credential("Vimeo client_id is not configured for browser auth".to_string())
        })?;

        let redirect_uri = format!("http://127.0.0.1:{}/callback", self.config.callback_port);
        let authorize_url = format!(
            "{}?response_type=token&client_id={}&redirect_uri={}&state={}",
            AUTHORIZE_URL, client_id, redirect_uri, AUTH_STATE
        );

        let listener = TcpListener::bind(("127.0.0.1", self.config.callback_port))
            .await
            .map_err(|e| {
                Error::Credential(format!(
                    "cannot bind redirect listener on port {}: {}",
                    self.config.callback_port, e
                ))
            })?;

        info!("Open this URL in a browser to authorize Vimeo access:");
        info!("  {}", authorize_url);

        loop {
            let (stream, _) = listener
                .accept()
                .await
                .map_err(|e| Error::Credential(format!("redirect listener failed: {}", e)))?;

            match Self::handle_redirect(stream).await {
                Ok(Some(token)) => return Ok(token),
                Ok(None) => continue,
                Err(e) => warn!("Ignoring malformed redirect request: {}", e),
            }
        }
    }

    /// Serve one redirect request. Returns the token once the relayed
    /// query-string form arrives.
    async fn handle_redirect(mut stream: TcpStream) -> std::io::Result<Option<String>> {
        let mut buf = vec![0u8; 4096];
        let n = stream.read(&mut buf).await?;
        let request = String::from_utf8_lossy(&buf[..n]);
        let target = request
            .lines()
            .next()
            .and_then(|line| line.split_whitespace().nth(1))
            .unwrap_or("/");

        if let Some(token) = Self::token_from_target(target) {
            Self::respond(&mut stream, DONE_PAGE).await?;
            return Ok(Some(token));
        }

        Self::respond(&mut stream, FRAGMENT_RELAY_PAGE).await?;
        Ok(None)
    }

    fn token_from_target(target: &str) -> Option<String> {
        let (_, query) = target.split_once('?')?;
        query
            .split('&')
            .find_map(|pair| pair.strip_prefix("access_token="))
            .filter(|token| !token.is_empty())
            .map(str::to_string)
    }

    async fn respond(stream: &mut TcpStream, body: &str) -> std::io::Result<()> {
        let response = format!(
            "HTTP/1.1 200 OK\r\nContent-Type: text/html\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            body.len(),
            body
        );
        stream.write_all(response.as_bytes()).await?;
        stream.shutdown().await
    }
}

#[async_trait]
impl SourcePlugin for VimeoPlugin {
    fn name(&self) -> &str {
        "Vimeo"
    }

    async fn access_token(&self, use_default: bool) -> Result<String> {
        if use_default {
            return self
                .config
                .default_access_token
                .clone()
                .ok_or_else(|| {
                    Error::Credential("Vimeo default access token is not configured".to_string())
                });
        }
        self.browser_token().await
    }

    async fn fetch_records(&self, access_token: &str) -> Result<Vec<Record>> {
        info!("Fetching liked videos from the Vimeo API");

        let response = self
            .client
            .get(format!("{}/me/likes", API_URL))
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| Error::DataFetch(format!("Vimeo likes request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(Error::DataFetch(format!(
                "Vimeo likes endpoint returned {}",
                response.status()
            )));
        }

        let likes: LikesResponse = response
            .json()
            .await
            .map_err(|e| Error::DataFetch(format!("Vimeo likes response malformed: {}", e)))?;

        let mut records = Vec::with_capacity(likes.data.len());
        for video in likes.data {
            let description = video.description.unwrap_or_default();
            let sentiment = self.enricher.enrich(&description).await;
            let genre = video.categories.into_iter().map(|c| c.name).collect();
            let timestamp = video
                .metadata
                .and_then(|m| m.interactions)
                .and_then(|i| i.like)
                .and_then(|l| l.added_time)
                .unwrap_or_default();

            records.push(Record::new(
                video.name,
                video.user.name,
                genre,
                timestamp,
                sentiment,
            ));
        }
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_is_extracted_from_relayed_query() {
        assert_eq!(
            VimeoPlugin::token_from_target("/callback?access_token=abc123&state=melody"),
            Some("abc123".to_string())
        );
        assert_eq!(
            VimeoPlugin::token_from_target("/callback?state=melody&access_token=xyz"),
            Some("xyz".to_string())
        );
    }

    #[test]
    fn first_redirect_without_query_yields_no_token() {
        assert_eq!(VimeoPlugin::token_from_target("/callback"), None);
        assert_eq!(VimeoPlugin::token_from_target("/callback?access_token="), None);
    }
}
