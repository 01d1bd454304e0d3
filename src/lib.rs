//! # Legal Citation Resolution Service
//!
//! ## Overview
//! This library enriches legal citations (statutes, public laws, U.S. Code
//! sections, case reporters, bills) extracted from free text with
//! authoritative links, metadata and cross-references ("parallel
//! citations") drawn from government and third-party data sources, and
//! serves the enriched data over HTTP.
//!
//! ## Architecture
//! The system is composed of several key modules:
//! - `citation`: the central data model — tagged payloads, deterministic
//!   ids, links and checked markers
//! - `registry`: immutable citation-type descriptor table (canonical
//!   renderings, link builders), built once at start-up
//! - `finder`: regex-based citation extraction from free text
//! - `providers`: one async client per external data source
//! - `resolver`: the ordered resolver strategies (explode, verify, enrich)
//! - `engine`: the iterative fixed-point resolution engine
//! - `api`: REST API endpoints
//! - `config`: configuration management and settings
//! - `errors`: centralized error handling and types
//!
//! ## Input/Output Specification
//! - **Input**: Free text or citation permalink ids
//! - **Output**: Enriched citation trees (JSON), each top-level citation
//!   carrying a depth-1 list of parallel citations
//!
//! ## Usage
//! ```rust,no_run
//! use std::sync::Arc;
//! use citation_resolver::{
//!     config::Config, engine::ResolutionEngine, finder::CitationFinder,
//!     providers::ProviderClients, registry::CitationRegistry,
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::from_file("config.toml")?;
//!     let registry = Arc::new(CitationRegistry::bootstrap());
//!     let providers = Arc::new(ProviderClients::new(&config.providers)?);
//!     let finder = CitationFinder::new(registry.clone())?;
//!     let engine = ResolutionEngine::new(registry, providers, config.resolution);
//!
//!     let citations = finder.find("Pub. L. 93-406, 88 Stat. 829");
//!     let resolved = engine.resolve(citations).await;
//!     println!("resolved {} citations", resolved.len());
//!     Ok(())
//! }
//! ```

// Core modules
pub mod api;
pub mod citation;
pub mod config;
pub mod engine;
pub mod errors;
pub mod finder;
pub mod providers;
pub mod registry;
pub mod resolver;

// Re-exports for convenience
pub use citation::{Citation, CitationKind, CitationPayload};
pub use config::Config;
pub use engine::ResolutionEngine;
pub use errors::{ResolveError, Result};
pub use finder::CitationFinder;
pub use registry::CitationRegistry;

use chrono::{DateTime, Utc};
use std::sync::Arc;

/// Application state shared across API handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<config::Config>,
    pub registry: Arc<registry::CitationRegistry>,
    pub providers: Arc<providers::ProviderClients>,
    pub finder: Arc<finder::CitationFinder>,
    pub engine: Arc<engine::ResolutionEngine>,
    pub started_at: DateTime<Utc>,
}
