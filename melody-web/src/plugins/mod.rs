//! Concrete data-source plugins
//!
//! Each plugin maps one provider's API into enriched [`melody_core::Record`]
//! values. Plugins are constructed in `main` from resolved configuration
//! with the enrichment handle injected, then registered with the engine.

pub mod apple_music;
pub mod lyrics;
pub mod spotify;
pub mod vimeo;

pub use apple_music::AppleMusicPlugin;
pub use spotify::SpotifyPlugin;
pub use vimeo::VimeoPlugin;

/// Shared HTTP client construction for provider calls.
pub(crate) fn http_client() -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(30))
        .build()
        .expect("Failed to build HTTP client (system error)")
}

/// Extract the trailing path segment of a share URL, dropping any query.
///
/// Both Spotify and Apple Music playlist URLs carry the playlist id as
/// the last path segment.
pub(crate) fn id_from_share_url(url: &str) -> Option<&str> {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    path.trim_end_matches('/')
        .rsplit('/')
        .next()
        .filter(|segment| !segment.is_empty())
}
