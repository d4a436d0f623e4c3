//! # Database Persistence Layer
//!
//! Postgres persistence via SQLx. The database is optional: when
//! `DATABASE_URL` is unset the service runs on [`crate::store::MemoryStore`]
//! and nothing survives a restart.
//!
//! Schema lives in `migrations/` and is applied at startup.

pub mod history;
pub mod records;

use async_trait::async_trait;
use sqlx::postgres::{PgPool, PgPoolOptions};
use valtab_core::{PeriodKey, RecordBatch, RecordKind, UpdateHistoryEntry};
use valtab_update::{
    ExistingSnapshot, LoadedAmendment, PortError, RecordSink, ReplaceScope, SnapshotLookup,
};

use crate::store::{DataTypeStatus, HistoryQuery, StoreStatus};

/// Errors from the Postgres store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Query or connection failure.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    /// Embedded migration failure.
    #[error("migration failed: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
    /// A stored row could not be mapped back to a domain value.
    #[error("corrupt {table} row: {reason}")]
    Corrupt { table: &'static str, reason: String },
}

impl From<StoreError> for PortError {
    fn from(err: StoreError) -> Self {
        PortError::Storage(err.to_string())
    }
}

/// Initialize the connection pool and run migrations.
///
/// Returns `None` if `url` is `None` (in-memory mode).
pub async fn init_pool(url: Option<&str>) -> Result<Option<PgPool>, StoreError> {
    let Some(url) = url else {
        tracing::warn!(
            "DATABASE_URL not set, running in-memory only mode. \
             State will not survive restarts."
        );
        return Ok(None);
    };

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .min_connections(1)
        .acquire_timeout(std::time::Duration::from_secs(5))
        .connect(url)
        .await?;
    tracing::info!("Connected to PostgreSQL");

    sqlx::migrate!("./migrations").run(&pool).await?;
    tracing::info!("Database migrations applied");

    Ok(Some(pool))
}

/// Store backed by a Postgres pool.
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Wrap a connected pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// The underlying pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl SnapshotLookup for PgStore {
    async fn find_snapshot(
        &self,
        kind: RecordKind,
        period: PeriodKey,
    ) -> Result<Option<ExistingSnapshot>, PortError> {
        let record_count = records::count_period(&self.pool, kind, period)
            .await
            .map_err(StoreError::from)?;
        Ok((record_count > 0).then_some(ExistingSnapshot {
            period,
            record_count,
        }))
    }

    async fn latest_amendment(
        &self,
        kind: RecordKind,
    ) -> Result<Option<LoadedAmendment>, PortError> {
        let entry = history::latest_amendment(&self.pool, kind).await?;
        Ok(entry.and_then(|e| {
            Some(LoadedAmendment {
                amendment_id: e.amendment_id?,
                period: e.period?,
                loaded_at: e.executed_at,
            })
        }))
    }
}

#[async_trait]
impl RecordSink for PgStore {
    async fn replace(&self, batch: &RecordBatch, scope: ReplaceScope) -> Result<u64, PortError> {
        Ok(records::replace(&self.pool, batch, scope)
            .await
            .map_err(StoreError::from)?)
    }

    async fn append_history(&self, entry: &UpdateHistoryEntry) -> Result<(), PortError> {
        Ok(history::insert(&self.pool, entry)
            .await
            .map_err(StoreError::from)?)
    }
}

#[async_trait]
impl HistoryQuery for PgStore {
    async fn recent_history(
        &self,
        data_type: Option<RecordKind>,
        limit: u32,
    ) -> Result<Vec<UpdateHistoryEntry>, PortError> {
        Ok(history::recent(&self.pool, data_type, limit).await?)
    }

    async fn status(&self) -> Result<StoreStatus, PortError> {
        let mut latest = history::latest_per_type(&self.pool).await?;
        let mut data_types = Vec::new();
        let mut total_records = 0;
        for kind in RecordKind::ALL {
            let (stored_records, latest_period) = records::table_summary(&self.pool, kind)
                .await
                .map_err(StoreError::from)?;
            total_records += stored_records;
            data_types.push(DataTypeStatus {
                data_type: kind,
                stored_records,
                latest_period,
                last_update: latest.remove(&kind),
            });
        }
        Ok(StoreStatus {
            data_types,
            total_records,
        })
    }
}
