//! Main webserver implementation
//!
//! Wires the session registry into an axum router and serves it until
//! Ctrl+C.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use axum::{
    routing::{delete, get, patch, post},
    Router,
};
use tokio::task::JoinHandle;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use designer::{DesignTextGenerator, ImageSearchProvider};
use shared::logging;

use crate::error::{WebServerError, WebServerResult};
use crate::state::WebServerState;
use crate::web::handlers::api;

/// Main webserver struct, generic over the injected collaborators
pub struct WebServer<G, S>
where
    G: DesignTextGenerator,
    S: ImageSearchProvider,
{
    state: Arc<WebServerState<G, S>>,
}

impl<G, S> Clone for WebServer<G, S>
where
    G: DesignTextGenerator,
    S: ImageSearchProvider,
{
    fn clone(&self) -> Self {
        Self { state: self.state.clone() }
    }
}

impl<G, S> WebServer<G, S>
where
    G: DesignTextGenerator + 'static,
    S: ImageSearchProvider + 'static,
{
    pub fn new(state: WebServerState<G, S>) -> Self {
        Self { state: Arc::new(state) }
    }

    /// Build the Axum router with all routes
    pub fn build_router(&self) -> Router {
        Router::new()
            // Health check
            .route("/health", get(api::health::<G, S>))

            // Session lifecycle
            .route("/api/sessions", post(api::create_session::<G, S>))
            .route("/api/sessions/:id", delete(api::close_session::<G, S>))

            // Form editing
            .route(
                "/api/sessions/:id/form",
                get(api::get_form::<G, S>)
                    .patch(api::update_form::<G, S>)
                    .delete(api::reset_form::<G, S>),
            )
            .route("/api/sessions/:id/rooms", post(api::add_room::<G, S>))
            .route(
                "/api/sessions/:id/rooms/:index",
                patch(api::update_room::<G, S>).delete(api::remove_room::<G, S>),
            )

            // Results
            .route(
                "/api/sessions/:id/design",
                post(api::submit_design::<G, S>).get(api::latest_design::<G, S>),
            )
            .route("/api/sessions/:id/export", get(api::export_design::<G, S>))
            .route("/api/sessions/:id/cache", get(api::cache_stats::<G, S>))

            .layer(
                ServiceBuilder::new()
                    .layer(TraceLayer::new_for_http())
                    .layer(CorsLayer::permissive()) // Browser front end is served separately
                    .into_inner(),
            )
            .with_state(self.state.clone())
    }

    /// Serve until Ctrl+C; pending submits are cancelled on the way out
    pub async fn run(&self, bind_address: SocketAddr) -> WebServerResult<()> {
        let router = self.build_router();

        let listener = tokio::net::TcpListener::bind(bind_address)
            .await
            .map_err(|e| WebServerError::ServerStartup(format!("Failed to bind to {bind_address}: {e}")))?;

        tracing::info!("🌐 Web server listening on http://{}", bind_address);

        let sweeper = self.spawn_session_sweeper();
        let served = axum::serve(listener, router)
            .with_graceful_shutdown(shutdown_signal())
            .await;
        sweeper.abort();
        served?;

        let closed = self.state.close_all().await;
        tracing::info!(closed, "Closed remaining sessions");
        Ok(())
    }

    /// Periodically close sessions idle past the TTL
    pub fn spawn_session_sweeper(&self) -> JoinHandle<()> {
        let state = self.state.clone();
        let period = sweep_period(state.limits().idle_ttl);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                let expired = state.sweep_expired().await;
                if expired > 0 {
                    let remaining = state.session_count().await;
                    tracing::info!(expired, remaining, "Swept idle sessions");
                }
            }
        })
    }

    /// Get server state for external access
    pub fn state(&self) -> &Arc<WebServerState<G, S>> {
        &self.state
    }
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => logging::log_shutdown("Received Ctrl+C signal"),
        Err(err) => logging::log_error(None, "Signal handling", &err),
    }
}

/// Sweep a few times per TTL, between one second and one minute
fn sweep_period(idle_ttl: Duration) -> Duration {
    (idle_ttl / 4).clamp(Duration::from_secs(1), Duration::from_secs(60))
}

#[cfg(test)]
mod tests {
    use super::*;
    use designer::{MockDesignTextGenerator, MockImageSearchProvider, SessionSettings};

    use crate::state::SessionLimits;

    #[test]
    fn test_sweep_period_bounds() {
        assert_eq!(sweep_period(Duration::from_millis(10)), Duration::from_secs(1));
        assert_eq!(sweep_period(Duration::from_secs(20)), Duration::from_secs(5));
        assert_eq!(sweep_period(Duration::from_secs(30 * 60)), Duration::from_secs(60));
    }

    #[tokio::test]
    async fn test_sweeper_closes_idle_sessions() {
        let state = WebServerState::new(
            Arc::new(MockDesignTextGenerator::new()),
            Arc::new(MockImageSearchProvider::new()),
            SessionSettings::default(),
        )
        .with_limits(SessionLimits { idle_ttl: Duration::ZERO, max_sessions: 10 });
        let server = WebServer::new(state);
        server.state().create_session().await;
        server.state().create_session().await;

        let sweeper = server.spawn_session_sweeper();
        tokio::time::sleep(Duration::from_millis(50)).await;
        sweeper.abort();

        assert_eq!(server.state().session_count().await, 0);
    }
}
