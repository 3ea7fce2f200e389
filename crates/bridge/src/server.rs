//! HTTP surface: the axum router and the serve loop.

use std::any::Any;
use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::rejection::BytesRejection;
use axum::extract::{RawQuery, State};
use axum::http::{HeaderMap, Method};
use axum::response::{IntoResponse, Response};
use axum::routing::any;
use axum::Router;
use thiserror::Error;
use tokio::net::TcpListener;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use crate::config::{BridgeConfig, ConfigError};
use crate::error::BridgeError;
use crate::handler::{Bridge, BridgeOutcome};
use crate::request::{InboundBody, InboundRequest};

/// Primary endpoint path.
pub const BRIDGE_PATH: &str = "/api/create-bridge";

/// Older endpoint name, served by the same handler.
pub const LEGACY_BRIDGE_PATH: &str = "/api/create-todoist";

/// Errors that stop the server from starting or running.
#[derive(Debug, Error)]
pub enum ServeError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("failed to build Todoist client: {0}")]
    Client(#[from] todoist_api_rs::error::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Builds the router. Every method is routed to the handler so it can
/// answer 405 itself.
pub fn router(bridge: Arc<Bridge>) -> Router {
    Router::new()
        .route(BRIDGE_PATH, any(bridge_endpoint))
        .route(LEGACY_BRIDGE_PATH, any(bridge_endpoint))
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(TraceLayer::new_for_http())
        .with_state(bridge)
}

async fn bridge_endpoint(
    State(bridge): State<Arc<Bridge>>,
    method: Method,
    headers: HeaderMap,
    RawQuery(query): RawQuery,
    body: Result<Bytes, BytesRejection>,
) -> Result<BridgeOutcome, BridgeError> {
    // Unreadable bodies still go through the method and secret gates.
    let body = match body {
        Ok(bytes) => InboundBody::Raw(bytes),
        Err(rejection) => {
            warn!(status = %rejection.status(), "failed to buffer request body");
            InboundBody::Unreadable(rejection.body_text())
        }
    };
    let request = InboundRequest {
        method,
        headers,
        query,
        body,
    };
    bridge.handle(request).await
}

/// Turns a panic inside request handling into the "Unhandled exception"
/// envelope.
fn panic_response(panic: Box<dyn Any + Send + 'static>) -> Response {
    let message = if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else {
        "panic in request handler".to_string()
    };
    error!(%message, "request handler panicked");
    BridgeError::UnhandledFault(message).into_response()
}

/// Binds the configured address and serves until Ctrl-C.
pub async fn serve(config: BridgeConfig) -> Result<(), ServeError> {
    let addr = config.listen_addr();
    let bridge = Arc::new(Bridge::new(config)?);

    if bridge.config().todoist_token().is_none() {
        info!("TODOIST_TOKEN not set, only dry-run requests will succeed");
    }

    let listener = TcpListener::bind(addr).await?;
    info!("task bridge listening on http://{}{}", addr, BRIDGE_PATH);

    axum::serve(listener, router(bridge))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("task bridge stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}
