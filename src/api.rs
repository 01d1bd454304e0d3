//! # API Server Module
//!
//! ## Purpose
//! REST API server exposing citation extraction and resolution, plus system
//! health and statistics endpoints.
//!
//! ## Input/Output Specification
//! - **Input**: HTTP requests carrying free text or citation permalinks
//! - **Output**: JSON responses with enriched citations (links, metadata,
//!   parallel citations)
//! - **Endpoints**: `/citation/find`, `/citation/{id}`, `/health`, `/stats`
//!
//! ## Failure Behavior
//! Enrichment failures never surface to the caller; a degraded response is a
//! citation with fewer links or parallel citations. Only total failures
//! (e.g. a bind error) are fatal.

use crate::citation::Citation;
use crate::errors::{ResolveError, Result};
use actix_cors::Cors;
use actix_web::middleware::Condition;
use actix_web::{web, App, HttpResponse, HttpServer, Result as ActixResult};
use serde::{Deserialize, Serialize};

/// API server wrapping the shared application state
pub struct ApiServer {
    app_state: crate::AppState,
}

/// Query payload for citation extraction
#[derive(Debug, Deserialize)]
pub struct FindParams {
    pub text: String,
}

/// A resolved citation as served to clients
#[derive(Debug, Serialize)]
pub struct ResolvedCitation {
    #[serde(flatten)]
    pub citation: Citation,
    /// Whether `/citation/{id}` can serve this citation directly
    pub can_permalink: bool,
}

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_seconds: i64,
    pub components: HealthComponents,
}

/// Component health status
#[derive(Debug, Serialize)]
pub struct HealthComponents {
    pub historical_dataset: String,
    pub case_law_search: String,
}

impl ApiServer {
    /// Create new API server
    pub fn new(app_state: crate::AppState) -> Self {
        Self { app_state }
    }

    /// Run the API server until shutdown
    pub async fn run(self) -> Result<()> {
        let bind_addr = format!(
            "{}:{}",
            self.app_state.config.server.host, self.app_state.config.server.port
        );
        let enable_cors = self.app_state.config.server.enable_cors;

        tracing::info!("starting API server on {}", bind_addr);

        HttpServer::new(move || {
            App::new()
                .app_data(web::Data::new(self.app_state.clone()))
                .wrap(Condition::new(enable_cors, Cors::permissive()))
                .route("/citation/find", web::get().to(find_handler))
                .route("/citation/find", web::post().to(find_handler))
                .route("/citation/{id:.*}", web::get().to(permalink_handler))
                .route("/health", web::get().to(health_handler))
                .route("/stats", web::get().to(stats_handler))
                .route("/", web::get().to(index_handler))
        })
        .bind(&bind_addr)
        .map_err(|e| ResolveError::Internal {
            message: format!("failed to bind server to {}: {}", bind_addr, e),
        })?
        .run()
        .await
        .map_err(|e| ResolveError::Internal {
            message: format!("server error: {}", e),
        })?;

        Ok(())
    }
}

/// Extraction + resolution endpoint handler
async fn find_handler(
    app_state: web::Data<crate::AppState>,
    params: web::Query<FindParams>,
) -> ActixResult<HttpResponse> {
    let citations = app_state.finder.find(&params.text);
    tracing::debug!(count = citations.len(), "extracted citations");

    let resolved = app_state.engine.resolve(citations).await;
    let response: Vec<ResolvedCitation> = resolved
        .into_iter()
        .map(|citation| ResolvedCitation {
            can_permalink: app_state.registry.can_permalink(citation.kind()),
            citation,
        })
        .collect();

    Ok(HttpResponse::Ok().json(response))
}

/// Permalink endpoint handler: reverse the id, then resolve that citation
async fn permalink_handler(
    app_state: web::Data<crate::AppState>,
    path: web::Path<String>,
) -> ActixResult<HttpResponse> {
    let id = path.into_inner();
    let payload = match app_state.registry.from_id(&id) {
        Some(payload) => payload,
        None => {
            return Ok(HttpResponse::NotFound().json(serde_json::json!({
                "error": "unknown citation id",
                "id": id,
            })));
        }
    };

    let citation = app_state.registry.create_top_level(payload);
    let mut resolved = app_state.engine.resolve(vec![citation]).await;

    match resolved.pop() {
        Some(citation) => Ok(HttpResponse::Ok().json(ResolvedCitation {
            can_permalink: app_state.registry.can_permalink(citation.kind()),
            citation,
        })),
        // The existence check can legitimately remove the citation.
        None => Ok(HttpResponse::NotFound().json(serde_json::json!({
            "error": "citation does not resolve",
            "id": id,
        }))),
    }
}

/// Health check endpoint handler
async fn health_handler(app_state: web::Data<crate::AppState>) -> ActixResult<HttpResponse> {
    let dataset = app_state.providers.legisworks.dataset_present();
    let case_law = app_state.providers.courtlistener.enabled();

    let response = HealthResponse {
        status: if dataset { "healthy" } else { "degraded" }.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: (chrono::Utc::now() - app_state.started_at).num_seconds(),
        components: HealthComponents {
            historical_dataset: if dataset { "available" } else { "missing" }.to_string(),
            case_law_search: if case_law { "enabled" } else { "disabled" }.to_string(),
        },
    };

    Ok(HttpResponse::Ok().json(response))
}

/// Statistics endpoint handler
async fn stats_handler(app_state: web::Data<crate::AppState>) -> ActixResult<HttpResponse> {
    let resolution = app_state.engine.stats().await;
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "resolution": resolution,
        "uptime_seconds": (chrono::Utc::now() - app_state.started_at).num_seconds(),
    })))
}

/// Index page handler
async fn index_handler() -> ActixResult<HttpResponse> {
    let html = r#"
    <!DOCTYPE html>
    <html>
    <head>
        <title>Citation Resolver</title>
        <style>
            body { font-family: Arial, sans-serif; margin: 40px; }
            .header { color: #2c3e50; }
            .endpoint { margin: 20px 0; padding: 15px; background: #f8f9fa; border-radius: 5px; }
            .method { font-weight: bold; color: #27ae60; }
        </style>
    </head>
    <body>
        <h1 class="header">Citation Resolver API</h1>
        <p>Extracts legal citations from text and enriches them with authoritative links,
        metadata and parallel citations.</p>

        <h2>Available Endpoints</h2>

        <div class="endpoint">
            <span class="method">GET</span> /citation/find?text=...
            <p>Extract and resolve all citations found in the given text.</p>
        </div>

        <div class="endpoint">
            <span class="method">GET</span> /citation/{id}
            <p>Resolve a single citation by its permalink id, e.g. <code>/citation/stat/50/100</code>.</p>
        </div>

        <div class="endpoint">
            <span class="method">GET</span> /health
            <p>Check the health status of system components.</p>
        </div>

        <div class="endpoint">
            <span class="method">GET</span> /stats
            <p>Get resolution statistics.</p>
        </div>

        <h2>Example</h2>
        <pre>GET /citation/find?text=Pub.%20L.%2093-406%2C%2088%20Stat.%20829</pre>
    </body>
    </html>
    "#;

    Ok(HttpResponse::Ok().content_type("text/html").body(html))
}
