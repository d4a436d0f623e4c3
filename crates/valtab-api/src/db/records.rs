//! Valuation table persistence.
//!
//! A replace runs in one transaction: delete the rows in scope, insert the
//! batch, commit. Any failure rolls the whole batch back.

use sqlx::{PgPool, Postgres, Transaction};
use valtab_core::{PeriodKey, RecordBatch, RecordKind};
use valtab_update::ReplaceScope;

/// Table holding rows of `kind`.
pub fn table_name(kind: RecordKind) -> &'static str {
    match kind {
        RecordKind::ComparableIndustry => "comparable_industry_data",
        RecordKind::DividendReduction => "dividend_reduction_rates",
        RecordKind::CompanySize => "company_size_criteria",
    }
}

/// Replace stored rows with `batch` under `scope`. Returns rows inserted.
pub async fn replace(
    pool: &PgPool,
    batch: &RecordBatch,
    scope: ReplaceScope,
) -> Result<u64, sqlx::Error> {
    let table = table_name(batch.kind());
    let mut tx = pool.begin().await?;

    match scope {
        ReplaceScope::Table => {
            sqlx::query(&format!("DELETE FROM {table}"))
                .execute(&mut *tx)
                .await?;
        }
        ReplaceScope::Period => {
            for period in batch.periods() {
                sqlx::query(&format!("DELETE FROM {table} WHERE year = $1 AND month = $2"))
                    .bind(period.year)
                    .bind(period.month as i32)
                    .execute(&mut *tx)
                    .await?;
            }
        }
    }

    let inserted = insert_rows(&mut tx, batch).await?;
    tx.commit().await?;
    Ok(inserted)
}

async fn insert_rows(
    tx: &mut Transaction<'_, Postgres>,
    batch: &RecordBatch,
) -> Result<u64, sqlx::Error> {
    let mut inserted = 0;
    match batch {
        RecordBatch::ComparableIndustry(rows) => {
            for r in rows {
                inserted += sqlx::query(
                    "INSERT INTO comparable_industry_data (year, month, industry_code,
                     industry_name, average_price, average_dividend, average_profit,
                     average_net_assets)
                     VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
                )
                .bind(r.year)
                .bind(r.month)
                .bind(&r.industry_code)
                .bind(&r.industry_name)
                .bind(r.average_price)
                .bind(r.average_dividend)
                .bind(r.average_profit)
                .bind(r.average_net_assets)
                .execute(&mut **tx)
                .await?
                .rows_affected();
            }
        }
        RecordBatch::DividendReduction(rows) => {
            for r in rows {
                inserted += sqlx::query(
                    "INSERT INTO dividend_reduction_rates (year, month, capital_range_min,
                     capital_range_max, reduction_rate)
                     VALUES ($1, $2, $3, $4, $5)",
                )
                .bind(r.year)
                .bind(r.month)
                .bind(r.capital_range_min)
                .bind(r.capital_range_max)
                .bind(r.reduction_rate)
                .execute(&mut **tx)
                .await?
                .rows_affected();
            }
        }
        RecordBatch::CompanySize(rows) => {
            for r in rows {
                inserted += sqlx::query(
                    "INSERT INTO company_size_criteria (year, month, industry_type,
                     size_category, employee_min, employee_max, asset_min, asset_max,
                     sales_min, sales_max)
                     VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)",
                )
                .bind(r.year)
                .bind(r.month)
                .bind(&r.industry_type)
                .bind(&r.size_category)
                .bind(r.employee_min)
                .bind(r.employee_max)
                .bind(r.asset_min)
                .bind(r.asset_max)
                .bind(r.sales_min)
                .bind(r.sales_max)
                .execute(&mut **tx)
                .await?
                .rows_affected();
            }
        }
    }
    Ok(inserted)
}

/// Rows of `kind` stored for `period`.
pub async fn count_period(
    pool: &PgPool,
    kind: RecordKind,
    period: PeriodKey,
) -> Result<u64, sqlx::Error> {
    let table = table_name(kind);
    let count: i64 = sqlx::query_scalar(&format!(
        "SELECT COUNT(*) FROM {table} WHERE year = $1 AND month = $2"
    ))
    .bind(period.year)
    .bind(period.month as i32)
    .fetch_one(pool)
    .await?;
    Ok(u64::try_from(count).unwrap_or(0))
}

/// Total rows of `kind` and the newest stored period.
pub async fn table_summary(
    pool: &PgPool,
    kind: RecordKind,
) -> Result<(u64, Option<PeriodKey>), sqlx::Error> {
    let table = table_name(kind);
    let (count, latest): (i64, Option<i64>) = sqlx::query_as(&format!(
        "SELECT COUNT(*), MAX(year::BIGINT * 100 + month) FROM {table}"
    ))
    .fetch_one(pool)
    .await?;
    let latest = latest.and_then(|ordinal| {
        let year = i32::try_from(ordinal / 100).ok()?;
        let month = i32::try_from(ordinal % 100).ok()?;
        PeriodKey::new(year, month).ok()
    });
    Ok((u64::try_from(count).unwrap_or(0), latest))
}
