//! Configuration resolution for melody-web
//!
//! TOML config file with environment-variable override (ENV beats TOML)
//! for the secret keys. Provider sections are optional; a plugin is only
//! constructed when its section is present.

use std::path::{Path, PathBuf};

use melody_core::{Error, Result};
use serde::Deserialize;
use tracing::info;

fn default_bind_addr() -> String {
    "127.0.0.1:8080".to_string()
}

fn default_browser_auth_timeout_secs() -> u64 {
    120
}

fn default_spotify_playlist_url() -> String {
    "https://open.spotify.com/playlist/37i9dQZF1DXcF6B6QPhFDv".to_string()
}

fn default_apple_music_playlist_url() -> String {
    "https://music.apple.com/us/playlist/pop-playlist-2023/pl.8041a56e48ac4650aa0bb67aff6194c6"
        .to_string()
}

fn default_vimeo_callback_port() -> u16 {
    8919
}

/// Spotify provider credentials (client-credentials grant)
#[derive(Debug, Clone, Deserialize)]
pub struct SpotifyConfig {
    pub client_id: String,
    pub client_secret: String,
    #[serde(default = "default_spotify_playlist_url")]
    pub playlist_url: String,
}

/// Apple Music provider credentials
#[derive(Debug, Clone, Deserialize)]
pub struct AppleMusicConfig {
    /// Pre-signed developer token sent as a Bearer credential
    pub developer_token: String,
    #[serde(default = "default_apple_music_playlist_url")]
    pub playlist_url: String,
}

/// Vimeo provider credentials
#[derive(Debug, Clone, Deserialize)]
pub struct VimeoConfig {
    /// Client id for the interactive implicit-grant flow
    pub client_id: Option<String>,
    /// Pre-provisioned token used by the `default` token method
    pub default_access_token: Option<String>,
    /// Local port the implicit-grant redirect listener binds to
    #[serde(default = "default_vimeo_callback_port")]
    pub callback_port: u16,
}

/// Service configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// Timeout for the interactive browser credential exchange
    #[serde(default = "default_browser_auth_timeout_secs")]
    pub browser_auth_timeout_secs: u64,

    /// Google Cloud Natural Language API key for sentiment enrichment
    pub google_api_key: Option<String>,

    /// Musixmatch API key for lyric lookup
    pub musixmatch_api_key: Option<String>,

    pub spotify: Option<SpotifyConfig>,
    pub apple_music: Option<AppleMusicConfig>,
    pub vimeo: Option<VimeoConfig>,
}

impl Default for Config {
    fn default() -> Self {
        // Empty TOML yields all serde defaults
        toml::from_str("").expect("empty config must parse")
    }
}

impl Config {
    /// Load configuration with CLI > ENV keys > TOML priority.
    ///
    /// An explicitly given path must exist; otherwise the platform config
    /// file is used when present and built-in defaults when not.
    pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
        let mut config = match explicit_path {
            Some(path) => Self::from_file(path)?,
            None => match Self::default_path() {
                Some(path) if path.exists() => Self::from_file(&path)?,
                _ => {
                    info!("No config file found, using built-in defaults");
                    Self::default()
                }
            },
        };
        config.apply_env_overrides();
        Ok(config)
    }

    fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Read config failed ({}): {}", path.display(), e)))?;
        let config = toml::from_str(&content)
            .map_err(|e| Error::Config(format!("Parse config failed ({}): {}", path.display(), e)))?;
        info!("Configuration loaded from {}", path.display());
        Ok(config)
    }

    /// Default configuration file path for the platform
    /// (`~/.config/melody/melody-web.toml` on Linux).
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("melody").join("melody-web.toml"))
    }

    /// Environment variables take priority over TOML for the secret keys.
    fn apply_env_overrides(&mut self) {
        if let Ok(key) = std::env::var("MELODY_GOOGLE_API_KEY") {
            if !key.trim().is_empty() {
                info!("Google API key loaded from environment variable");
                self.google_api_key = Some(key);
            }
        }
        if let Ok(key) = std::env::var("MELODY_MUSIXMATCH_API_KEY") {
            if !key.trim().is_empty() {
                info!("Musixmatch API key loaded from environment variable");
                self.musixmatch_api_key = Some(key);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_when_config_is_empty() {
        let config = Config::default();
        assert_eq!(config.bind_addr, "127.0.0.1:8080");
        assert_eq!(config.browser_auth_timeout_secs, 120);
        assert!(config.spotify.is_none());
        assert!(config.google_api_key.is_none());
    }

    #[test]
    fn provider_sections_parse_with_defaulted_urls() {
        let config: Config = toml::from_str(
            r#"
            bind_addr = "0.0.0.0:9000"

            [spotify]
            client_id = "id"
            client_secret = "secret"

            [vimeo]
            default_access_token = "tok"
            "#,
        )
        .unwrap();

        assert_eq!(config.bind_addr, "0.0.0.0:9000");
        let spotify = config.spotify.unwrap();
        assert_eq!(spotify.client_id, "id");
        assert!(spotify.playlist_url.contains("open.spotify.com/playlist/"));
        let vimeo = config.vimeo.unwrap();
        assert_eq!(vimeo.callback_port, 8919);
        assert_eq!(vimeo.default_access_token.as_deref(), Some("tok"));
    }
}
