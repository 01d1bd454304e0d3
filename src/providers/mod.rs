//! # Provider Clients Module
//!
//! ## Purpose
//! One client per external data source consulted during resolution, plus the
//! shared HTTP plumbing. Each client exposes a small async surface returning
//! parsed, structured data; none retries beyond following at most
//! [`MAX_REDIRECTS`] HTTP redirects.
//!
//! ## Sources
//! - `govinfo.rs`: legislative document archive — metadata records, related
//!   documents, no-redirect existence checks
//! - `govtrack.rs`: bill tracking site — search-page redirect resolution
//! - `courtlistener.rs`: case-law search engine — credentialed search
//! - `legisworks.rs`: historical statute volumes — local YAML datasets
//!
//! ## Failure Model
//! Clients surface transport and parse failures as [`ResolveError`]; the
//! resolver layer decides whether a failure is recovered (enrichment is
//! best-effort) or the citation passes through unchanged.

pub mod courtlistener;
pub mod govinfo;
pub mod govtrack;
pub mod legisworks;

use crate::config::ProvidersConfig;
use crate::errors::{ResolveError, Result};
use reqwest::redirect::Policy;
use reqwest::Client;
use std::time::Duration;

/// Redirect chains longer than this are treated as errors
pub const MAX_REDIRECTS: usize = 5;

/// All provider clients, constructed once at start-up and shared across
/// requests. The underlying HTTP clients are connection-pooled and cheap to
/// clone.
pub struct ProviderClients {
    pub govinfo: govinfo::GovInfoClient,
    pub govtrack: govtrack::GovTrackClient,
    pub courtlistener: courtlistener::CourtListenerClient,
    pub legisworks: legisworks::LegisworksStore,
}

impl ProviderClients {
    pub fn new(config: &ProvidersConfig) -> Result<Self> {
        let timeout = Duration::from_secs(config.timeout_seconds);

        let http = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(timeout)
            .redirect(Policy::limited(MAX_REDIRECTS))
            .build()
            .map_err(|e| ResolveError::Network {
                details: format!("failed to build HTTP client: {e}"),
            })?;

        // Existence checks must observe the redirect itself: a 302 to the
        // not-found page means the document does not exist.
        let http_no_redirect = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(timeout)
            .redirect(Policy::none())
            .build()
            .map_err(|e| ResolveError::Network {
                details: format!("failed to build HTTP client: {e}"),
            })?;

        Ok(Self {
            govinfo: govinfo::GovInfoClient::new(
                http.clone(),
                http_no_redirect,
                config.govinfo.base_url.clone(),
            )?,
            govtrack: govtrack::GovTrackClient::new(http.clone())?,
            courtlistener: courtlistener::CourtListenerClient::new(
                http,
                config.courtlistener.base_url.clone(),
                config.courtlistener.credentials(),
            ),
            legisworks: legisworks::LegisworksStore::new(config.legisworks.data_dir.clone()),
        })
    }
}
