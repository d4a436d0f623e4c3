//! # Update Cycle
//!
//! One strictly sequential pass: retrieve the index, discover, select one
//! primary source per category, then for each primary source in rank order
//! decide, retrieve, convert to text, extract, validate, persist, and append
//! history. A [`SourceError`] stops only its own source. A [`CycleError`]
//! aborts the run before any document is retrieved and is reported through
//! the notifier before being returned.
//!
//! The retrieval-through-persistence span of each source runs under the
//! per-data-type lock from [`DataTypeLocks`].

use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Datelike, Utc};
use sha2::{Digest, Sha256};
use valtab_core::{
    DiscoveredSource, HistoryStatus, PeriodKey, RecordBatch, RecordCounts, RecordKind,
    SourceCategory, UpdateHistoryEntry,
};
use valtab_extract::{discover, parse_base_url, CategoryRegistry};
use valtab_validate::validate_batch;

use crate::config::{PipelineConfig, ValidationPolicy};
use crate::decision::{decide, decide_amendment, UpdateDecision};
use crate::error::{CycleError, SourceError};
use crate::lock::DataTypeLocks;
use crate::notification::{Notification, NotificationKind};
use crate::ports::{DocumentSource, Notifier, RecordSink, SnapshotLookup, TextExtractor};
use crate::priority::{select_primary, PrimarySource};
use crate::report::{CycleEvent, CycleReport, SourceOutcome, ValidationSummary};

/// The collaborators a cycle talks to.
#[derive(Clone)]
pub struct Ports {
    /// Index and document retrieval.
    pub documents: Arc<dyn DocumentSource>,
    /// Byte-to-text conversion.
    pub text: Arc<dyn TextExtractor>,
    /// Existing snapshot lookup.
    pub snapshots: Arc<dyn SnapshotLookup>,
    /// Persistence and history.
    pub sink: Arc<dyn RecordSink>,
    /// Notification delivery.
    pub notifier: Arc<dyn Notifier>,
}

impl std::fmt::Debug for Ports {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Ports").finish_non_exhaustive()
    }
}

/// A configured update cycle. Cheap to clone; run it as often as needed.
#[derive(Debug, Clone)]
pub struct UpdateCycle {
    config: Arc<PipelineConfig>,
    registry: Arc<CategoryRegistry>,
    ports: Ports,
    locks: DataTypeLocks,
}

/// Everything learned about one source before it succeeded or failed.
#[derive(Debug, Default)]
struct Progress {
    period: Option<PeriodKey>,
    reason: Option<String>,
    counts: RecordCounts,
    validation: Option<ValidationSummary>,
    content_hash: Option<String>,
}

impl UpdateCycle {
    /// Assemble a cycle from its configuration and collaborators.
    pub fn new(
        config: Arc<PipelineConfig>,
        registry: Arc<CategoryRegistry>,
        ports: Ports,
        locks: DataTypeLocks,
    ) -> Self {
        Self {
            config,
            registry,
            ports,
            locks,
        }
    }

    /// The configuration this cycle runs with.
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Run one cycle at `now`.
    pub async fn run(&self, now: DateTime<Utc>) -> Result<CycleReport, CycleError> {
        let started = Instant::now();
        let mut events = Vec::new();
        match self.run_sources(now, &mut events).await {
            Ok(outcomes) => {
                let mut report = CycleReport {
                    started_at: now,
                    duration_ms: elapsed_ms(started),
                    outcomes,
                    events,
                };
                let notification = summary_notification(&report);
                if let Err(e) = self.ports.notifier.notify(&notification).await {
                    report.events.push(CycleEvent::NotificationFailed {
                        error: e.to_string(),
                    });
                }
                Ok(report)
            }
            Err(err) => {
                let notification = Notification {
                    kind: NotificationKind::Error,
                    title: "Valuation table update failed".to_string(),
                    message: err.to_string(),
                    details: serde_json::json!({
                        "durationMs": elapsed_ms(started),
                        "startedAt": now,
                    }),
                };
                // No report carries events on this path, so log directly.
                if let Err(e) = self.ports.notifier.notify(&notification).await {
                    tracing::warn!(
                        error = %e,
                        cycle_error = %err,
                        "error notification could not be delivered"
                    );
                }
                Err(err)
            }
        }
    }

    async fn run_sources(
        &self,
        now: DateTime<Utc>,
        events: &mut Vec<CycleEvent>,
    ) -> Result<Vec<SourceOutcome>, CycleError> {
        let base_url = parse_base_url(&self.config.base_url)?;
        let index_url = base_url
            .join(&self.config.index_path)
            .map_err(|source| valtab_extract::ExtractError::InvalidBaseUrl {
                url: format!("{}{}", self.config.base_url, self.config.index_path),
                source,
            })?;
        let index_text = self
            .ports
            .documents
            .fetch_index(index_url.as_str())
            .await
            .map_err(CycleError::IndexRetrieval)?;

        let sources = discover(
            &self.registry,
            &index_text,
            &base_url,
            &self.config.required_categories,
        )?;
        for (category, candidates) in sources.iter() {
            events.push(CycleEvent::Discovered {
                category,
                candidates: candidates.len(),
            });
        }

        let mut outcomes = Vec::new();
        for primary in select_primary(&sources) {
            outcomes.push(self.run_source(&primary, now, events).await);
        }
        Ok(outcomes)
    }

    async fn run_source(
        &self,
        primary: &PrimarySource,
        now: DateTime<Utc>,
        events: &mut Vec<CycleEvent>,
    ) -> SourceOutcome {
        let source = &primary.source;
        let category = source.category;
        let kind = category.record_kind();
        let mut progress = Progress::default();

        let result = self.process(primary, now, events, &mut progress).await;
        let (success, status, error) = match result {
            Ok(status) => (true, status, None),
            Err(e) => {
                events.push(CycleEvent::SourceFailed {
                    category,
                    error: e.to_string(),
                });
                (false, HistoryStatus::Failed, Some(e.to_string()))
            }
        };

        let mut entry = UpdateHistoryEntry::new(kind, status, now)
            .with_period(progress.period)
            .with_source_url(source.url.clone())
            .with_content_hash(progress.content_hash.clone())
            .with_amendment_id(source.amendment_id)
            .with_counts(progress.counts);
        if let Some(note) = error.clone().or_else(|| progress.reason.clone()) {
            entry = entry.with_notes(note);
        }
        if let Err(e) = self.ports.sink.append_history(&entry).await {
            events.push(CycleEvent::HistoryFailed {
                category,
                error: e.to_string(),
            });
        }

        SourceOutcome {
            rank: primary.rank,
            category,
            data_type: kind,
            url: source.url.clone(),
            period: progress.period,
            success,
            status,
            reason: progress.reason,
            counts: progress.counts,
            validation: progress.validation,
            content_hash: progress.content_hash,
            error,
        }
    }

    /// Periodic sources are keyed by their own period; amendment notices by
    /// identifier against the last loaded notice.
    async fn decide_source(
        &self,
        source: &DiscoveredSource,
        kind: RecordKind,
        now: DateTime<Utc>,
        events: &mut Vec<CycleEvent>,
    ) -> Result<UpdateDecision, SourceError> {
        let snapshots = &self.ports.snapshots;
        let period = match source.period() {
            Some(period) if source.category != SourceCategory::Amendment => period,
            _ => {
                let mut loaded = snapshots
                    .latest_amendment(kind)
                    .await
                    .map_err(SourceError::SnapshotLookup)?;
                if let Some(notice) = loaded {
                    // Rows removed since the load count as never loaded.
                    let rows = snapshots
                        .find_snapshot(kind, notice.period)
                        .await
                        .map_err(SourceError::SnapshotLookup)?;
                    if rows.is_none() {
                        loaded = None;
                    }
                }
                return Ok(decide_amendment(
                    source,
                    loaded.as_ref(),
                    now,
                    &self.config.thresholds,
                ));
            }
        };

        if source.category == SourceCategory::Annual && period.year < now.year() - 1 {
            events.push(CycleEvent::StalePeriod {
                category: source.category,
                url: source.url.clone(),
                period,
            });
        }
        let snapshot = snapshots
            .find_snapshot(kind, period)
            .await
            .map_err(SourceError::SnapshotLookup)?;
        Ok(decide(
            source,
            period,
            snapshot.as_ref(),
            now,
            &self.config.thresholds,
        ))
    }

    async fn process(
        &self,
        primary: &PrimarySource,
        now: DateTime<Utc>,
        events: &mut Vec<CycleEvent>,
        progress: &mut Progress,
    ) -> Result<HistoryStatus, SourceError> {
        let source = &primary.source;
        let category = source.category;
        let kind = category.record_kind();

        let decision = self.decide_source(source, kind, now, events).await?;
        let period = decision.period;
        progress.period = Some(period);
        events.push(CycleEvent::Decided {
            category,
            url: source.url.clone(),
            needs_update: decision.needs_update,
            reason: decision.reason.clone(),
        });
        progress.reason = Some(decision.reason.clone());
        if !decision.needs_update {
            return Ok(HistoryStatus::Skipped);
        }

        let _guard = self
            .locks
            .try_acquire(kind)
            .ok_or(SourceError::Busy(kind))?;

        let bytes = self
            .ports
            .documents
            .fetch_document(&source.url)
            .await
            .map_err(SourceError::Download)?;
        progress.content_hash = Some(content_hash(&bytes));

        let text = self
            .ports
            .text
            .to_text(&bytes)
            .await
            .map_err(SourceError::Extraction)?;
        let batch = self
            .registry
            .extract(kind, &text, period.year, period.month as i32);
        if batch.is_empty() {
            return Err(SourceError::NoRecords(kind));
        }

        let validation = validate_batch(&batch);
        progress.counts.extracted = batch.len() as u64;
        progress.counts.invalid = validation.invalid_records.len() as u64;
        progress.counts.valid = validation.valid_count() as u64;
        events.push(CycleEvent::Validated {
            category,
            records: batch.len(),
            errors: validation.errors.len(),
            warnings: validation.warnings.len(),
            quality_score: validation.quality_score,
        });
        progress.validation = Some(ValidationSummary {
            is_valid: validation.is_valid,
            errors: validation.errors.clone(),
            warnings: validation.warnings.clone(),
            quality_score: validation.quality_score,
        });

        let to_persist: RecordBatch = match self.config.validation_policy {
            ValidationPolicy::PersistAll => batch,
            ValidationPolicy::BlockOnErrors if !validation.is_valid => {
                return Err(SourceError::ValidationBlocked {
                    errors: validation.errors.len(),
                });
            }
            ValidationPolicy::BlockOnErrors => batch,
            ValidationPolicy::PersistValidSubset => {
                let subset = batch.without_indices(&validation.invalid_records);
                if subset.is_empty() {
                    return Err(SourceError::NothingValid {
                        invalid: validation.invalid_records.len(),
                    });
                }
                subset
            }
        };

        let rows = self
            .ports
            .sink
            .replace(&to_persist, self.config.replace_scope)
            .await
            .map_err(SourceError::Persistence)?;
        progress.counts.persisted = rows;
        events.push(CycleEvent::Persisted { category, rows });

        if rows == progress.counts.extracted {
            Ok(HistoryStatus::Completed)
        } else {
            Ok(HistoryStatus::Partial)
        }
    }
}


/// Lowercase hex SHA-256 of `bytes`.
pub fn content_hash(bytes: &[u8]) -> String {
    Sha256::digest(bytes)
        .iter()
        .map(|b| format!("{b:02x}"))
        .collect()
}

fn elapsed_ms(started: Instant) -> u64 {
    u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX)
}

fn summary_notification(report: &CycleReport) -> Notification {
    let failed: Vec<&SourceOutcome> = report.failures().collect();
    let updated: Vec<&SourceOutcome> = report.updated().collect();
    let kind = if failed.is_empty() {
        NotificationKind::Success
    } else if updated.is_empty() && failed.len() == report.outcomes.len() {
        NotificationKind::Error
    } else {
        NotificationKind::Warning
    };
    let title = match kind {
        NotificationKind::Success => "Valuation table update completed",
        NotificationKind::Warning => "Valuation table update completed with failures",
        NotificationKind::Error => "Valuation table update failed",
    };
    let categories = |outcomes: &[&SourceOutcome]| -> Vec<SourceCategory> {
        outcomes.iter().map(|o| o.category).collect()
    };
    Notification {
        kind,
        title: title.to_string(),
        message: format!(
            "{} source(s) processed: {} updated, {} failed, {} skipped",
            report.outcomes.len(),
            updated.len(),
            failed.len(),
            report
                .outcomes
                .iter()
                .filter(|o| o.status == HistoryStatus::Skipped)
                .count()
        ),
        details: serde_json::json!({
            "durationMs": report.duration_ms,
            "updated": categories(&updated),
            "failed": failed
                .iter()
                .map(|o| serde_json::json!({
                    "category": o.category,
                    "error": o.error,
                }))
                .collect::<Vec<_>>(),
        }),
    }
}
