//! # VIC Share service
//!
//! HTTP service exposing the VIC share lifecycle (create, access,
//! revoke, list, audit) plus a hospital-side issuance stub, built on
//! the `vic-share` SDK.

mod handler;
mod provider;

use std::env;

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::filter::EnvFilter;
use vic_share::gateway::AccessGateway;
use vic_share::provider::MemoryCredentialStore;
use vic_share::share::{MemoryShareStore, ShareTokenManager};

use crate::provider::Provider;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Share token lifecycle operations.
    pub manager: ShareTokenManager<MemoryShareStore>,

    /// Share redemption.
    pub gateway: AccessGateway<MemoryCredentialStore, MemoryShareStore>,

    /// Issuance store, written by the issuance stub.
    pub credentials: MemoryCredentialStore,

    /// Externally visible address, used in verification URLs.
    pub external_address: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let http_addr = env::var("VICSHARE_HTTP_ADDR").unwrap_or_else(|_| "0.0.0.0:8502".into());
    let external_address =
        env::var("VICSHARE_EXTERNAL_ADDR").unwrap_or_else(|_| format!("http://{http_addr}"));

    let provider = Provider::new();
    let state = AppState {
        manager: provider.manager(),
        gateway: provider.gateway(),
        credentials: provider.credentials.clone(),
        external_address,
    };

    let router = router(state);
    let listener = tokio::net::TcpListener::bind(&http_addr).await?;
    tracing::info!("listening on {http_addr}");
    axum::serve(listener, router).await?;
    Ok(())
}

/// Builds the service router. Split from `main` so tests can drive the
/// full HTTP surface in process.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handler::index))
        .route("/api/health", get(handler::health))
        .route("/api/issue-vic", post(handler::issuer::issue))
        .route("/verify/:transaction_hash", get(handler::issuer::verify))
        .route("/api/vic-share/create", post(handler::share::create))
        .route("/api/vic-share/patient/:patient_id", get(handler::share::patient_shares))
        .route("/api/vic-share/:token", get(handler::share::access))
        .route("/api/vic-share/:token/revoke", post(handler::share::revoke))
        .route("/api/vic-share/:token/access-logs", get(handler::share::access_logs))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
