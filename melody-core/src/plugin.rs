//! Data-source plugin contract
//!
//! Every external media source (Spotify, Apple Music, Vimeo, ...) is a
//! [`SourcePlugin`]. Plugins receive an [`crate::Enricher`] at
//! construction and use it to score the free text associated with each
//! item before building the [`Record`].

use async_trait::async_trait;

use crate::record::Record;
use crate::Result;

/// Capability set every data source implements.
#[async_trait]
pub trait SourcePlugin: Send + Sync {
    /// Stable, non-empty identifier used for display and lookup.
    fn name(&self) -> &str;

    /// One-time setup hook, invoked exactly once at registration time.
    /// The registry guarantees at-most-once invocation per instance.
    fn on_register(&self) {}

    /// Resolve a credential for this source.
    ///
    /// With `use_default` the plugin must return a credential without any
    /// interactive step (pre-provisioned service credential or cached
    /// token). Otherwise it may run an interactive, out-of-band exchange
    /// and block until a credential is obtained; an aborted or timed-out
    /// exchange fails with [`crate::Error::Credential`].
    async fn access_token(&self, use_default: bool) -> Result<String>;

    /// Fetch one full collection from the provider, enriching each item.
    ///
    /// Returns an empty vector (not an error) when the provider has no
    /// items. Per-item provider failures are skipped or default-enriched,
    /// never surfaced; only unrecoverable transport/auth failure is an
    /// error ([`crate::Error::DataFetch`]).
    async fn fetch_records(&self, access_token: &str) -> Result<Vec<Record>>;
}
