//! melody-web - Sentiment playlist analysis service
//!
//! Hosts the orchestration engine behind a thin HTTP layer: register the
//! configured data plugins at startup, then let the display layer drive
//! the select → auth → fetch → display workflow and read back snapshots.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use melody_core::{Enricher, NullAnalyzer, SentimentAnalyzer, SourcePlugin, WorkflowEngine};
use melody_web::config::Config;
use melody_web::plugins::lyrics::MusixmatchClient;
use melody_web::plugins::{AppleMusicPlugin, SpotifyPlugin, VimeoPlugin};
use melody_web::sentiment::GoogleSentimentClient;
use melody_web::{build_router, AppState};
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser)]
#[command(name = "melody-web", version, about = "Sentiment playlist analysis service")]
struct Args {
    /// Path to the TOML configuration file
    #[arg(long, env = "MELODY_CONFIG")]
    config: Option<PathBuf>,

    /// Address to bind, overriding the configured one
    #[arg(long, env = "MELODY_BIND")]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("Starting melody-web (Sentiment Playlist Analyzer)");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    let args = Args::parse();
    let config = Config::load(args.config.as_deref())?;
    let bind_addr = args.bind.unwrap_or_else(|| config.bind_addr.clone());

    let analyzer: Arc<dyn SentimentAnalyzer> = match &config.google_api_key {
        Some(key) => {
            info!("Sentiment enrichment via Google Cloud Natural Language");
            Arc::new(GoogleSentimentClient::new(key.clone()))
        }
        None => {
            warn!("No Google API key configured; records will carry the default score");
            Arc::new(NullAnalyzer)
        }
    };
    let enricher = Enricher::new(analyzer);
    let lyrics = MusixmatchClient::new(config.musixmatch_api_key.clone());

    let mut engine = WorkflowEngine::new()
        .with_browser_auth_timeout(Duration::from_secs(config.browser_auth_timeout_secs));

    for plugin in build_plugins(&config, &enricher, &lyrics) {
        // One bad plugin must not keep the service from starting.
        if let Err(e) = engine.register_plugin(plugin) {
            warn!("Skipping plugin registration: {}", e);
        }
    }
    if engine.registry().is_empty() {
        warn!("No data plugins configured; the workflow cannot leave its initial stage");
    }

    let state = AppState::new(engine);
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    info!("Listening on http://{}", bind_addr);
    info!("Health check: http://{}/health", bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}

/// Construct a plugin for every provider section present in the config.
fn build_plugins(
    config: &Config,
    enricher: &Enricher,
    lyrics: &MusixmatchClient,
) -> Vec<Arc<dyn SourcePlugin>> {
    let mut plugins: Vec<Arc<dyn SourcePlugin>> = Vec::new();

    if let Some(spotify) = config.spotify.clone() {
        plugins.push(Arc::new(SpotifyPlugin::new(
            spotify,
            lyrics.clone(),
            enricher.clone(),
        )));
    }
    if let Some(apple_music) = config.apple_music.clone() {
        plugins.push(Arc::new(AppleMusicPlugin::new(
            apple_music,
            lyrics.clone(),
            enricher.clone(),
        )));
    }
    if let Some(vimeo) = config.vimeo.clone() {
        plugins.push(Arc::new(VimeoPlugin::new(vimeo, enricher.clone())));
    }

    plugins
}
