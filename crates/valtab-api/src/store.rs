//! # Record Stores
//!
//! Both stores implement the cycle's [`SnapshotLookup`] and [`RecordSink`]
//! ports plus [`HistoryQuery`] for the read endpoints:
//!
//! - [`MemoryStore`]: process-local, used when `DATABASE_URL` is unset and
//!   in tests. Enforces the same unique keys and replace semantics as the
//!   database schema.
//! - [`crate::db::PgStore`]: Postgres via SQLx.

use std::collections::{BTreeMap, HashSet};
use std::hash::Hash;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use valtab_core::{
    CompanySizeCriterion, ComparableIndustryRecord, DividendReductionBand, HistoryStatus,
    PeriodKey, RecordBatch, RecordKind, UpdateHistoryEntry,
};
use valtab_update::{
    ExistingSnapshot, LoadedAmendment, PortError, RecordSink, ReplaceScope, SnapshotLookup,
};

/// Stored state per data type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataTypeStatus {
    /// Data type.
    pub data_type: RecordKind,
    /// Rows currently stored.
    pub stored_records: u64,
    /// Newest stored period.
    pub latest_period: Option<PeriodKey>,
    /// Newest history entry.
    pub last_update: Option<UpdateHistoryEntry>,
}

/// Summary across all data types.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreStatus {
    /// One entry per data type, in [`RecordKind::ALL`] order.
    pub data_types: Vec<DataTypeStatus>,
    /// Rows stored across all data tables.
    pub total_records: u64,
}

/// Read access to history and stored counts.
#[async_trait]
pub trait HistoryQuery: Send + Sync {
    /// Newest-first history, optionally filtered by data type.
    async fn recent_history(
        &self,
        data_type: Option<RecordKind>,
        limit: u32,
    ) -> Result<Vec<UpdateHistoryEntry>, PortError>;

    /// Current stored state.
    async fn status(&self) -> Result<StoreStatus, PortError>;
}

/// Everything the service needs from a store.
pub trait TableStore: SnapshotLookup + RecordSink + HistoryQuery {}

impl<T: SnapshotLookup + RecordSink + HistoryQuery> TableStore for T {}

// ---------------------------------------------------------------------------
// Row keys
// ---------------------------------------------------------------------------

trait Keyed: Clone {
    type Key: Eq + Hash;

    fn unique_key(&self) -> Option<Self::Key>;
    fn row_period(&self) -> Option<PeriodKey>;
}

impl Keyed for ComparableIndustryRecord {
    type Key = (i32, i32, String);

    fn unique_key(&self) -> Option<Self::Key> {
        Some((self.year?, self.month?, self.industry_code.clone()?))
    }

    fn row_period(&self) -> Option<PeriodKey> {
        self.period()
    }
}

impl Keyed for DividendReductionBand {
    type Key = (i32, i32, u64, u64);

    fn unique_key(&self) -> Option<Self::Key> {
        Some((
            self.year?,
            self.month?,
            self.capital_range_min?.to_bits(),
            self.capital_range_max?.to_bits(),
        ))
    }

    fn row_period(&self) -> Option<PeriodKey> {
        self.period()
    }
}

impl Keyed for CompanySizeCriterion {
    type Key = (i32, i32, String, String);

    fn unique_key(&self) -> Option<Self::Key> {
        Some((
            self.year?,
            self.month?,
            self.industry_type.clone()?,
            self.size_category.clone()?,
        ))
    }

    fn row_period(&self) -> Option<PeriodKey> {
        self.period()
    }
}

/// The table contents after replacing `incoming` under `scope`, or a
/// storage error if a key is missing or duplicated. `existing` is untouched
/// on error.
fn replaced<T: Keyed>(
    existing: &[T],
    incoming: &[T],
    scope: ReplaceScope,
) -> Result<Vec<T>, PortError> {
    let mut periods = HashSet::new();
    for (i, row) in incoming.iter().enumerate() {
        let period = row
            .row_period()
            .ok_or_else(|| PortError::Storage(format!("record[{i}] has no valid period")))?;
        periods.insert(period);
    }

    let mut next: Vec<T> = match scope {
        ReplaceScope::Table => Vec::new(),
        ReplaceScope::Period => existing
            .iter()
            .filter(|row| row.row_period().map_or(true, |p| !periods.contains(&p)))
            .cloned()
            .collect(),
    };

    let mut keys: HashSet<T::Key> = next.iter().filter_map(Keyed::unique_key).collect();
    for (i, row) in incoming.iter().enumerate() {
        let key = row
            .unique_key()
            .ok_or_else(|| PortError::Storage(format!("record[{i}] is missing a key field")))?;
        if !keys.insert(key) {
            return Err(PortError::Storage(format!(
                "record[{i}] violates the unique key"
            )));
        }
        next.push(row.clone());
    }
    Ok(next)
}

fn count_in<T: Keyed>(rows: &[T], period: PeriodKey) -> u64 {
    rows.iter().filter(|r| r.row_period() == Some(period)).count() as u64
}

fn latest_in<T: Keyed>(rows: &[T]) -> Option<PeriodKey> {
    rows.iter().filter_map(Keyed::row_period).max()
}

// ---------------------------------------------------------------------------
// MemoryStore
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
struct Tables {
    comparable: Vec<ComparableIndustryRecord>,
    dividend: Vec<DividendReductionBand>,
    size: Vec<CompanySizeCriterion>,
    history: Vec<UpdateHistoryEntry>,
}

/// Thread-safe, cloneable in-memory store.
///
/// The lock is `parking_lot` and is never held across an `.await`.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    tables: Arc<RwLock<Tables>>,
}

impl MemoryStore {
    /// An empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stored rows of `kind` as a batch.
    pub fn snapshot(&self, kind: RecordKind) -> RecordBatch {
        let tables = self.tables.read();
        match kind {
            RecordKind::ComparableIndustry => {
                RecordBatch::ComparableIndustry(tables.comparable.clone())
            }
            RecordKind::DividendReduction => {
                RecordBatch::DividendReduction(tables.dividend.clone())
            }
            RecordKind::CompanySize => RecordBatch::CompanySize(tables.size.clone()),
        }
    }

    /// All history entries in append order.
    pub fn history(&self) -> Vec<UpdateHistoryEntry> {
        self.tables.read().history.clone()
    }

    fn stored(&self, kind: RecordKind) -> (u64, Option<PeriodKey>) {
        let tables = self.tables.read();
        match kind {
            RecordKind::ComparableIndustry => {
                (tables.comparable.len() as u64, latest_in(&tables.comparable))
            }
            RecordKind::DividendReduction => {
                (tables.dividend.len() as u64, latest_in(&tables.dividend))
            }
            RecordKind::CompanySize => (tables.size.len() as u64, latest_in(&tables.size)),
        }
    }
}

#[async_trait]
impl SnapshotLookup for MemoryStore {
    async fn find_snapshot(
        &self,
        kind: RecordKind,
        period: PeriodKey,
    ) -> Result<Option<ExistingSnapshot>, PortError> {
        let tables = self.tables.read();
        let record_count = match kind {
            RecordKind::ComparableIndustry => count_in(&tables.comparable, period),
            RecordKind::DividendReduction => count_in(&tables.dividend, period),
            RecordKind::CompanySize => count_in(&tables.size, period),
        };
        Ok((record_count > 0).then_some(ExistingSnapshot {
            period,
            record_count,
        }))
    }

    async fn latest_amendment(
        &self,
        kind: RecordKind,
    ) -> Result<Option<LoadedAmendment>, PortError> {
        let tables = self.tables.read();
        Ok(tables
            .history
            .iter()
            .filter(|e| e.data_type == kind)
            .filter(|e| matches!(e.status, HistoryStatus::Completed | HistoryStatus::Partial))
            .filter_map(|e| {
                Some(LoadedAmendment {
                    amendment_id: e.amendment_id?,
                    period: e.period?,
                    loaded_at: e.executed_at,
                })
            })
            .max_by_key(|loaded| loaded.loaded_at))
    }
}

#[async_trait]
impl RecordSink for MemoryStore {
    async fn replace(&self, batch: &RecordBatch, scope: ReplaceScope) -> Result<u64, PortError> {
        let mut tables = self.tables.write();
        match batch {
            RecordBatch::ComparableIndustry(rows) => {
                let next = replaced(&tables.comparable, rows, scope)?;
                tables.comparable = next;
            }
            RecordBatch::DividendReduction(rows) => {
                let next = replaced(&tables.dividend, rows, scope)?;
                tables.dividend = next;
            }
            RecordBatch::CompanySize(rows) => {
                let next = replaced(&tables.size, rows, scope)?;
                tables.size = next;
            }
        }
        Ok(batch.len() as u64)
    }

    async fn append_history(&self, entry: &UpdateHistoryEntry) -> Result<(), PortError> {
        self.tables.write().history.push(entry.clone());
        Ok(())
    }
}

#[async_trait]
impl HistoryQuery for MemoryStore {
    async fn recent_history(
        &self,
        data_type: Option<RecordKind>,
        limit: u32,
    ) -> Result<Vec<UpdateHistoryEntry>, PortError> {
        let tables = self.tables.read();
        let mut entries: Vec<UpdateHistoryEntry> = tables
            .history
            .iter()
            .filter(|e| data_type.map_or(true, |k| e.data_type == k))
            .cloned()
            .collect();
        // Stable sort keeps append order among equal timestamps; reverse for newest first.
        entries.sort_by_key(|e| e.executed_at);
        entries.reverse();
        entries.truncate(limit as usize);
        Ok(entries)
    }

    async fn status(&self) -> Result<StoreStatus, PortError> {
        let mut data_types = Vec::new();
        let mut total_records = 0;
        let mut last: BTreeMap<RecordKind, UpdateHistoryEntry> = BTreeMap::new();
        for entry in self.tables.read().history.iter() {
            let newer = last
                .get(&entry.data_type)
                .map_or(true, |prev| entry.executed_at >= prev.executed_at);
            if newer {
                last.insert(entry.data_type, entry.clone());
            }
        }
        for kind in RecordKind::ALL {
            let (stored_records, latest_period) = self.stored(kind);
            total_records += stored_records;
            data_types.push(DataTypeStatus {
                data_type: kind,
                stored_records,
                latest_period,
                last_update: last.remove(&kind),
            });
        }
        Ok(StoreStatus {
            data_types,
            total_records,
        })
    }
}
