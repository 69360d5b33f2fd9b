//! API Service - JSON backend for the localities dashboard
//!
//! Endpoints:
//! - GET /health - Health check
//! - GET /dashboard - Summary the dashboard frontend renders
//! - GET /regioes - Municipality counts per region
//! - GET /estados - Canonical state table
//! - GET /municipios?uf=&limit= - Canonical municipality table
//!
//! Every data endpoint goes through the snapshot cache: within the TTL
//! (default one hour) repeated requests reuse the same load.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use geodata::{
    aggregate, load_geography, Snapshot, SnapshotCache, SourceConfig, SourceError, SourceMode,
};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tower_http::cors::{Any, CorsLayer};

const DEFAULT_LIMIT: usize = 100;
const MAX_LIMIT: usize = 5570;

// ============================================================================
// State
// ============================================================================

struct AppState {
    source: SourceConfig,
    cache: RwLock<SnapshotCache>,
}

// ============================================================================
// Response types
// ============================================================================

#[derive(Serialize)]
struct HealthResponse {
    ok: bool,
    version: &'static str,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

#[derive(Deserialize)]
struct MunicipiosQuery {
    uf: Option<String>,
    limit: Option<usize>,
}

// ============================================================================
// Snapshot access
// ============================================================================

/// Cached snapshot, refreshed wholesale when the TTL lapses. The write lock
/// is held across the reload so concurrent misses trigger a single fetch.
async fn current_snapshot(state: &AppState) -> Result<Arc<Snapshot>, SourceError> {
    if let Some(snapshot) = state.cache.read().await.get() {
        return Ok(snapshot);
    }

    let mut cache = state.cache.write().await;
    if let Some(snapshot) = cache.get() {
        return Ok(snapshot);
    }
    let snapshot = load_geography(&state.source).await?;
    Ok(cache.put(snapshot))
}

fn load_error(e: SourceError) -> axum::response::Response {
    (
        StatusCode::BAD_GATEWAY,
        Json(ErrorResponse {
            error: e.to_string(),
        }),
    )
        .into_response()
}

// ============================================================================
// Handlers
// ============================================================================

async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        ok: true,
        version: env!("CARGO_PKG_VERSION"),
    })
}

async fn dashboard_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match current_snapshot(&state).await {
        Ok(snapshot) => Json(aggregate::summarize(&snapshot)).into_response(),
        Err(e) => load_error(e),
    }
}

async fn regioes_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match current_snapshot(&state).await {
        Ok(snapshot) => {
            let regioes = aggregate::count_by_region(&snapshot.municipios);
            Json(serde_json::json!({
                "fonte": snapshot.fonte.label(),
                "regioes": regioes,
            }))
            .into_response()
        }
        Err(e) => load_error(e),
    }
}

async fn estados_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match current_snapshot(&state).await {
        Ok(snapshot) => Json(serde_json::json!({
            "fonte": snapshot.fonte.label(),
            "estados": snapshot.estados,
        }))
        .into_response(),
        Err(e) => load_error(e),
    }
}

async fn municipios_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<MunicipiosQuery>,
) -> impl IntoResponse {
    let limit = params.limit.unwrap_or(DEFAULT_LIMIT).min(MAX_LIMIT);

    match current_snapshot(&state).await {
        Ok(snapshot) => {
            let uf_filter = params.uf.map(|uf| uf.to_uppercase());
            let municipios: Vec<_> = snapshot
                .municipios
                .iter()
                .filter(|m| match (&uf_filter, &m.uf) {
                    (Some(wanted), Some(uf)) => uf == wanted,
                    (Some(_), None) => false,
                    (None, _) => true,
                })
                .take(limit)
                .collect();

            Json(serde_json::json!({
                "fonte": snapshot.fonte.label(),
                "total": municipios.len(),
                "municipios": municipios,
            }))
            .into_response()
        }
        Err(e) => load_error(e),
    }
}

// ============================================================================
// Main
// ============================================================================

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    env_logger::init();

    let bind = std::env::var("API_BIND").unwrap_or_else(|_| "127.0.0.1:8080".to_string());
    let ttl_secs: u64 = std::env::var("CACHE_TTL_SECS")
        .unwrap_or_else(|_| "3600".to_string())
        .parse()
        .unwrap_or(3600);

    let mode = match std::env::var("SOURCE").as_deref() {
        Ok("warehouse") => SourceMode::Warehouse {
            db_url: std::env::var("DB_URL")
                .context("DB_URL env var missing (SOURCE=warehouse)")?,
        },
        _ => SourceMode::Remote,
    };

    let source = SourceConfig {
        base_url: std::env::var("IBGE_BASE_URL")
            .unwrap_or_else(|_| geodata::source::api::DEFAULT_BASE_URL.to_string()),
        estados_csv_url: std::env::var("ESTADOS_CSV_URL")
            .unwrap_or_else(|_| geodata::source::mirror::DEFAULT_ESTADOS_URL.to_string()),
        municipios_csv_url: std::env::var("MUNICIPIOS_CSV_URL")
            .unwrap_or_else(|_| geodata::source::mirror::DEFAULT_MUNICIPIOS_URL.to_string()),
        mode,
    };

    println!("=== Localidades API ===");
    println!("Cache TTL: {ttl_secs}s");

    let state = Arc::new(AppState {
        source,
        cache: RwLock::new(SnapshotCache::new(Duration::from_secs(ttl_secs))),
    });

    // CORS for the dashboard frontend
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        .route("/health", get(health_handler))
        .route("/dashboard", get(dashboard_handler))
        .route("/regioes", get(regioes_handler))
        .route("/estados", get(estados_handler))
        .route("/municipios", get(municipios_handler))
        .layer(cors)
        .with_state(state);

    println!("API listening on http://{bind}");
    println!("\nEndpoints:");
    println!("  GET /health");
    println!("  GET /dashboard");
    println!("  GET /regioes");
    println!("  GET /estados");
    println!("  GET /municipios?uf=&limit=");

    let listener = tokio::net::TcpListener::bind(&bind).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
