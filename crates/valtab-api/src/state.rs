//! # Application State
//!
//! Shared state for the Axum application, passed to all route handlers
//! via the `State` extractor.
//!
//! AppState holds the configured [`UpdateCycle`] (which owns every
//! collaborator it writes through), a read handle for history and status
//! queries, and the optional database pool for readiness checks.

use std::sync::Arc;

use sqlx::PgPool;
use valtab_extract::{CategoryRegistry, ExtractResult};
use valtab_update::{
    DataTypeLocks, DocumentSource, Notifier, PipelineConfig, Ports, TextExtractor, UpdateCycle,
};

use crate::store::{HistoryQuery, TableStore};

/// Errors reading the server configuration.
#[derive(Debug, thiserror::Error)]
pub enum AppConfigError {
    /// `PORT` is not a valid port number.
    #[error("PORT must be a port number, got {0:?}")]
    InvalidPort(String),
}

/// Server configuration.
#[derive(Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Port to bind the HTTP server to.
    pub port: u16,
    /// Shared secret for the trigger and query endpoints.
    /// If `None`, every authenticated request is rejected.
    pub cron_secret: Option<String>,
    /// Postgres connection string. If `None`, the in-memory store is used.
    pub database_url: Option<String>,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("port", &self.port)
            .field(
                "cron_secret",
                &self.cron_secret.as_ref().map(|_| "[REDACTED]"),
            )
            .field(
                "database_url",
                &self.database_url.as_ref().map(|_| "[REDACTED]"),
            )
            .finish()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            cron_secret: None,
            database_url: None,
        }
    }
}

impl AppConfig {
    /// Read `PORT`, `CRON_SECRET`, and `DATABASE_URL` from the environment.
    pub fn from_env() -> Result<Self, AppConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read configuration through `lookup`. Empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppConfigError> {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        let port = match get("PORT") {
            Some(raw) => raw
                .trim()
                .parse()
                .map_err(|_| AppConfigError::InvalidPort(raw))?,
            None => Self::default().port,
        };
        Ok(Self {
            port,
            cron_secret: get("CRON_SECRET"),
            database_url: get("DATABASE_URL"),
        })
    }
}

/// External collaborators the cycle reads from and reports through.
#[derive(Clone)]
pub struct Collaborators {
    /// Index and document retrieval.
    pub documents: Arc<dyn DocumentSource>,
    /// Byte-to-text conversion.
    pub text: Arc<dyn TextExtractor>,
    /// Notification delivery.
    pub notifier: Arc<dyn Notifier>,
}

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Server configuration.
    pub config: AppConfig,
    /// The update cycle run by the trigger endpoint.
    pub cycle: UpdateCycle,
    /// History and status reads.
    pub history: Arc<dyn HistoryQuery>,
    /// Database pool, when persistence is backed by Postgres.
    pub db_pool: Option<PgPool>,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("config", &self.config)
            .field("cycle", &self.cycle)
            .field("db_pool", &self.db_pool.is_some())
            .finish_non_exhaustive()
    }
}

impl AppState {
    /// Wire a cycle whose snapshot lookup, persistence, and history reads
    /// all go through `store`.
    pub fn assemble<S: TableStore + 'static>(
        config: AppConfig,
        pipeline: Arc<PipelineConfig>,
        collaborators: Collaborators,
        store: Arc<S>,
        db_pool: Option<PgPool>,
    ) -> ExtractResult<Self> {
        let registry = Arc::new(CategoryRegistry::new(pipeline.era_base_year)?);
        let ports = Ports {
            documents: collaborators.documents,
            text: collaborators.text,
            snapshots: store.clone(),
            sink: store.clone(),
            notifier: collaborators.notifier,
        };
        let cycle = UpdateCycle::new(pipeline, registry, ports, DataTypeLocks::new());
        Ok(Self {
            config,
            cycle,
            history: store,
            db_pool,
        })
    }
}
