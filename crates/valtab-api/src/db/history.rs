//! Update history persistence.
//!
//! Entries are append-only; there are no update or delete operations.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::PgPool;
use uuid::Uuid;
use valtab_core::{HistoryStatus, PeriodKey, RecordCounts, RecordKind, UpdateHistoryEntry};

use super::StoreError;

const COLUMNS: &str = "id, check_date, data_type, period_year, period_month, source_url,
     content_hash, extracted_count, valid_count, invalid_count, persisted_count,
     status, notes, executed_at, amendment_id";

fn to_i64(n: u64) -> i64 {
    i64::try_from(n).unwrap_or(i64::MAX)
}

/// Append one entry.
pub async fn insert(pool: &PgPool, entry: &UpdateHistoryEntry) -> Result<(), sqlx::Error> {
    sqlx::query(&format!(
        "INSERT INTO update_history ({COLUMNS})
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)"
    ))
    .bind(entry.id)
    .bind(entry.check_date)
    .bind(entry.data_type.as_str())
    .bind(entry.period.map(|p| p.year))
    .bind(entry.period.map(|p| p.month as i32))
    .bind(&entry.source_url)
    .bind(&entry.content_hash)
    .bind(to_i64(entry.record_counts.extracted))
    .bind(to_i64(entry.record_counts.valid))
    .bind(to_i64(entry.record_counts.invalid))
    .bind(to_i64(entry.record_counts.persisted))
    .bind(entry.status.as_str())
    .bind(&entry.notes)
    .bind(entry.executed_at)
    .bind(entry.amendment_id.map(to_i64))
    .execute(pool)
    .await?;
    Ok(())
}

/// Newest-first entries, optionally for one data type.
pub async fn recent(
    pool: &PgPool,
    data_type: Option<RecordKind>,
    limit: u32,
) -> Result<Vec<UpdateHistoryEntry>, StoreError> {
    let rows = sqlx::query_as::<_, HistoryRow>(&format!(
        "SELECT {COLUMNS} FROM update_history
         WHERE ($1::TEXT IS NULL OR data_type = $1)
         ORDER BY executed_at DESC
         LIMIT $2"
    ))
    .bind(data_type.map(|k| k.as_str()))
    .bind(i64::from(limit))
    .fetch_all(pool)
    .await?;
    rows.into_iter().map(HistoryRow::into_entry).collect()
}

/// Newest entry for each data type that has any.
pub async fn latest_per_type(
    pool: &PgPool,
) -> Result<BTreeMap<RecordKind, UpdateHistoryEntry>, StoreError> {
    let rows = sqlx::query_as::<_, HistoryRow>(&format!(
        "SELECT DISTINCT ON (data_type) {COLUMNS} FROM update_history
         ORDER BY data_type, executed_at DESC"
    ))
    .fetch_all(pool)
    .await?;
    rows.into_iter()
        .map(|row| row.into_entry().map(|e| (e.data_type, e)))
        .collect()
}

/// Newest completed or partial entry of `data_type` that loaded an
/// amendment notice.
pub async fn latest_amendment(
    pool: &PgPool,
    data_type: RecordKind,
) -> Result<Option<UpdateHistoryEntry>, StoreError> {
    let row = sqlx::query_as::<_, HistoryRow>(&format!(
        "SELECT {COLUMNS} FROM update_history
         WHERE data_type = $1
           AND amendment_id IS NOT NULL
           AND status IN ('completed', 'partial')
         ORDER BY executed_at DESC
         LIMIT 1"
    ))
    .bind(data_type.as_str())
    .fetch_optional(pool)
    .await?;
    row.map(HistoryRow::into_entry).transpose()
}

/// Internal row type for SQLx mapping.
#[derive(sqlx::FromRow)]
struct HistoryRow {
    id: Uuid,
    check_date: NaiveDate,
    data_type: String,
    period_year: Option<i32>,
    period_month: Option<i32>,
    source_url: Option<String>,
    content_hash: Option<String>,
    extracted_count: i64,
    valid_count: i64,
    invalid_count: i64,
    persisted_count: i64,
    status: String,
    notes: Option<String>,
    executed_at: DateTime<Utc>,
    amendment_id: Option<i64>,
}

impl HistoryRow {
    fn into_entry(self) -> Result<UpdateHistoryEntry, StoreError> {
        let corrupt = |reason: String| StoreError::Corrupt {
            table: "update_history",
            reason,
        };
        let data_type: RecordKind = self
            .data_type
            .parse()
            .map_err(|e: valtab_core::CoreError| corrupt(e.to_string()))?;
        let status = HistoryStatus::parse(&self.status)
            .ok_or_else(|| corrupt(format!("unknown status {:?}", self.status)))?;
        let period = match (self.period_year, self.period_month) {
            (Some(year), Some(month)) => {
                Some(PeriodKey::new(year, month).map_err(|e| corrupt(e.to_string()))?)
            }
            _ => None,
        };
        let count = |n: i64| u64::try_from(n).unwrap_or(0);
        Ok(UpdateHistoryEntry {
            id: self.id,
            check_date: self.check_date,
            data_type,
            period,
            source_url: self.source_url,
            content_hash: self.content_hash,
            amendment_id: self.amendment_id.and_then(|id| u64::try_from(id).ok()),
            record_counts: RecordCounts {
                extracted: count(self.extracted_count),
                valid: count(self.valid_count),
                invalid: count(self.invalid_count),
                persisted: count(self.persisted_count),
            },
            status,
            notes: self.notes,
            executed_at: self.executed_at,
        })
    }
}
