//! Application state shared across handlers.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::config::ServerConfig;
use crate::db::Store;
use crate::metrics::PrometheusMetrics;
use crate::services::auth::{AuthService, PasswordHasher, TokenService};
use crate::services::{RequestScope, Workflow};

/// Error building the application state.
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("metrics registry: {0}")]
    Metrics(#[from] prometheus::Error),
    #[error("password hasher: {0}")]
    PasswordHasher(argon2::Error),
}

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to the
/// services, the store and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: ServerConfig,
    store: Arc<dyn Store>,
    workflow: Workflow,
    auth: AuthService,
    metrics: Arc<PrometheusMetrics>,
    shutdown: CancellationToken,
}

impl AppState {
    /// Create a new application state with production password hashing.
    ///
    /// # Errors
    ///
    /// Returns an error if the metrics registry or password hasher cannot be built.
    pub fn new(config: ServerConfig, store: Arc<dyn Store>) -> Result<Self, StateError> {
        let hasher = PasswordHasher::production().map_err(StateError::PasswordHasher)?;
        Self::with_hasher(config, store, hasher)
    }

    /// Create a new application state with an explicit password hasher.
    ///
    /// # Errors
    ///
    /// Returns an error if the metrics registry cannot be built.
    pub fn with_hasher(
        config: ServerConfig,
        store: Arc<dyn Store>,
        hasher: PasswordHasher,
    ) -> Result<Self, StateError> {
        let metrics = Arc::new(PrometheusMetrics::new()?);
        let workflow = Workflow::new(Arc::clone(&store), metrics.clone());
        let tokens = TokenService::new(&config.jwt_secret, config.jwt_expiration);
        let auth = AuthService::new(Arc::clone(&store), tokens, hasher);

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                store,
                workflow,
                auth,
                metrics,
                shutdown: CancellationToken::new(),
            }),
        })
    }

    /// Get a reference to the server configuration.
    #[must_use]
    pub fn config(&self) -> &ServerConfig {
        &self.inner.config
    }

    /// Get a reference to the backing store.
    #[must_use]
    pub fn store(&self) -> &dyn Store {
        self.inner.store.as_ref()
    }

    #[must_use]
    pub fn workflow(&self) -> &Workflow {
        &self.inner.workflow
    }

    #[must_use]
    pub fn auth(&self) -> &AuthService {
        &self.inner.auth
    }

    #[must_use]
    pub fn metrics(&self) -> &PrometheusMetrics {
        &self.inner.metrics
    }

    /// Token cancelled when the server begins shutting down.
    #[must_use]
    pub fn shutdown_token(&self) -> &CancellationToken {
        &self.inner.shutdown
    }

    /// Scope for one request: the configured deadline, cancelled on shutdown.
    #[must_use]
    pub fn request_scope(&self) -> RequestScope {
        RequestScope::with_timeout(self.inner.config.request_timeout)
            .cancellation(self.inner.shutdown.child_token())
    }
}
