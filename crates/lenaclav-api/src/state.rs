//! Application state

use lenaclav_auth::{IdentityProvider, TokenVerifier};
use lenaclav_db::Database;
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub verifier: Arc<TokenVerifier>,
    pub identity: Arc<dyn IdentityProvider>,
}

impl AppState {
    pub fn new(
        db: Database,
        verifier: Arc<TokenVerifier>,
        identity: Arc<dyn IdentityProvider>,
    ) -> Self {
        Self {
            db,
            verifier,
            identity,
        }
    }
}

/// Handle for rendering Prometheus metrics
#[derive(Clone)]
pub struct MetricsHandle {
    handle: PrometheusHandle,
}

impl MetricsHandle {
    pub fn new(handle: PrometheusHandle) -> Self {
        Self { handle }
    }

    pub fn render(&self) -> String {
        self.handle.render()
    }
}
