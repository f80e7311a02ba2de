//! Attest collaborator API stub server: standalone development server.
//!
//! In-memory implementation of the collaborator endpoints that
//! `attest-client` calls, seeded with the SOC 2 and NIST CSF catalogues.
//! Point the CLI at it with `ATTEST_API_URL=http://localhost:8000/api/v1`.
//!
//! Storage is in-memory (DashMap) with no persistence; data is lost on
//! restart.

mod routes;
mod store;

use std::net::SocketAddr;

use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> std::io::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let port: u16 = std::env::var("ATTEST_STUB_PORT")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(8000);

    let state = store::AppState::seeded();
    for framework in state.catalogue() {
        tracing::info!(
            code = framework["code"].as_str().unwrap_or_default(),
            id = framework["id"].as_str().unwrap_or_default(),
            "framework available"
        );
    }
    let app = routes::router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("attest-stub listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app.into_make_service()).await
}
