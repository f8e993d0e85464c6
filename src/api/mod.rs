//! HTTP surface: `GET /health` and `POST /check`.

mod error;
mod handlers;

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::routing::{get, post};
use tokio::net::TcpListener;

use crate::auth::CredentialCache;
use crate::evaluator::{EvaluatorSettings, LoginLocks};
use crate::github::GatewayFactory;
use crate::persistence::CooldownStore;
use crate::telemetry::{TelemetrySink, TracingTelemetrySink};

pub use error::ApiError;

/// Shared state handed to every request.
#[derive(Clone)]
pub struct AppState {
    store: Arc<dyn CooldownStore>,
    gateways: Arc<dyn GatewayFactory>,
    credentials: Arc<CredentialCache>,
    login_locks: Arc<LoginLocks>,
    settings: EvaluatorSettings,
    request_timeout: Duration,
    telemetry: Arc<dyn TelemetrySink>,
}

impl AppState {
    /// Creates state whose telemetry goes to `tracing`.
    #[must_use]
    pub fn new(
        store: Arc<dyn CooldownStore>,
        gateways: Arc<dyn GatewayFactory>,
        credentials: CredentialCache,
        settings: EvaluatorSettings,
        request_timeout: Duration,
    ) -> Self {
        Self {
            store,
            gateways,
            credentials: Arc::new(credentials),
            login_locks: Arc::new(LoginLocks::new()),
            settings,
            request_timeout,
            telemetry: Arc::new(TracingTelemetrySink),
        }
    }

    /// Replaces the telemetry sink.
    #[must_use]
    pub fn with_telemetry(mut self, telemetry: Arc<dyn TelemetrySink>) -> Self {
        self.telemetry = telemetry;
        self
    }
}

/// Builds the service router.
#[must_use]
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/check", post(handlers::check))
        .with_state(state)
}

/// Serves the router on `listener` until `shutdown` resolves, then drains
/// in-flight requests.
///
/// # Errors
///
/// Returns the I/O error that stopped the accept loop.
pub async fn serve<F>(listener: TcpListener, state: AppState, shutdown: F) -> std::io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    if let Ok(addr) = listener.local_addr() {
        tracing::info!(%addr, "listening");
    }
    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown)
        .await
}
