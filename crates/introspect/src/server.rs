//! Binding and serving the endpoint.

use axum::Router;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tracing::info;

use crate::error::{IntrospectError, Result};

/// Bind the endpoint's listener.
///
/// # Errors
///
/// Returns `IntrospectError::Bind` if the address is unavailable.
pub async fn bind(addr: SocketAddr) -> Result<TcpListener> {
    TcpListener::bind(addr)
        .await
        .map_err(|source| IntrospectError::Bind { addr, source })
}

/// Serve `router` on `listener` until the server stops.
///
/// # Errors
///
/// Returns `IntrospectError::Serve` if the accept loop fails.
pub async fn serve(listener: TcpListener, router: Router) -> Result<()> {
    if let Ok(addr) = listener.local_addr() {
        info!("Introspection endpoint listening on http://{addr}/debug/probes/");
    }
    axum::serve(listener, router)
        .await
        .map_err(IntrospectError::Serve)
}
