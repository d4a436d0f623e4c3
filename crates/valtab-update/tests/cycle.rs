//! Update cycle behavior against in-memory collaborators.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use parking_lot::Mutex;
use valtab_core::{
    HistoryStatus, PeriodKey, RecordBatch, RecordKind, SourceCategory, UpdateHistoryEntry,
};
use valtab_extract::CategoryRegistry;
use valtab_update::memory::{MemoryDocuments, RecordingNotifier};
use valtab_update::{
    CycleError, CycleEvent, DataTypeLocks, ExistingSnapshot, LoadedAmendment, Notification,
    NotificationKind, Notifier, PipelineConfig, PortError, Ports, RecordSink, ReplaceScope,
    SnapshotLookup, TextExtractor, UpdateCycle, ValidationPolicy,
};

const INDEX_URL: &str = "https://www.nta.go.jp/law/tsutatsu/kobetsu/hyoka/index.htm";
const ANNUAL_URL: &str = "https://www.nta.go.jp/law/tsutatsu/kobetsu/hyoka/r07/0601/pdf/01.pdf";
const BIMONTHLY_URL: &str = "https://www.nta.go.jp/law/tsutatsu/kobetsu/hyoka/200706/06_07.pdf";

const INDEX_HTML: &str = r#"<html><body>
<a href="/law/tsutatsu/kobetsu/hyoka/r07/0601/pdf/01.pdf">類似業種比準価額</a>
<a href="/law/tsutatsu/kobetsu/hyoka/200706/06_07.pdf">配当還元率</a>
</body></html>"#;

const ANNUAL_TEXT: &str = "業種目 株価 配当 利益 純資産\n01 製造業 1,500 2.5 8 1,200\n02 建設業 900 1.5 6 800\n";
const BIMONTHLY_TEXT: &str = "0万円～50万円 10.0%\n50万円～100万円 8.0%\n";

struct Utf8Text;

#[async_trait]
impl TextExtractor for Utf8Text {
    async fn to_text(&self, bytes: &[u8]) -> Result<String, PortError> {
        String::from_utf8(bytes.to_vec()).map_err(|e| PortError::TextExtraction(e.to_string()))
    }
}

#[derive(Default)]
struct FakeStore {
    snapshots: Mutex<HashMap<(RecordKind, PeriodKey), u64>>,
    replaced: Mutex<Vec<RecordBatch>>,
    history: Mutex<Vec<UpdateHistoryEntry>>,
}

#[async_trait]
impl SnapshotLookup for FakeStore {
    async fn find_snapshot(
        &self,
        kind: RecordKind,
        period: PeriodKey,
    ) -> Result<Option<ExistingSnapshot>, PortError> {
        Ok(self
            .snapshots
            .lock()
            .get(&(kind, period))
            .map(|&record_count| ExistingSnapshot {
                period,
                record_count,
            }))
    }

    async fn latest_amendment(
        &self,
        kind: RecordKind,
    ) -> Result<Option<LoadedAmendment>, PortError> {
        Ok(self
            .history
            .lock()
            .iter()
            .rev()
            .filter(|e| e.data_type == kind)
            .filter(|e| matches!(e.status, HistoryStatus::Completed | HistoryStatus::Partial))
            .find_map(|e| {
                Some(LoadedAmendment {
                    amendment_id: e.amendment_id?,
                    period: e.period?,
                    loaded_at: e.executed_at,
                })
            }))
    }
}

#[async_trait]
impl RecordSink for FakeStore {
    async fn replace(&self, batch: &RecordBatch, _scope: ReplaceScope) -> Result<u64, PortError> {
        self.replaced.lock().push(batch.clone());
        Ok(batch.len() as u64)
    }

    async fn append_history(&self, entry: &UpdateHistoryEntry) -> Result<(), PortError> {
        self.history.lock().push(entry.clone());
        Ok(())
    }
}

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2007, 7, 1, 3, 0, 0).unwrap()
}

fn full_site() -> MemoryDocuments {
    MemoryDocuments::new()
        .with(INDEX_URL, INDEX_HTML)
        .with(ANNUAL_URL, ANNUAL_TEXT)
        .with(BIMONTHLY_URL, BIMONTHLY_TEXT)
}

struct Harness {
    cycle: UpdateCycle,
    documents: Arc<MemoryDocuments>,
    store: Arc<FakeStore>,
    notifier: Arc<RecordingNotifier>,
    locks: DataTypeLocks,
}

fn harness(documents: MemoryDocuments, store: FakeStore, config: PipelineConfig) -> Harness {
    let documents = Arc::new(documents);
    let store = Arc::new(store);
    let notifier = Arc::new(RecordingNotifier::new());
    let locks = DataTypeLocks::new();
    let ports = Ports {
        documents: documents.clone(),
        text: Arc::new(Utf8Text),
        snapshots: store.clone(),
        sink: store.clone(),
        notifier: notifier.clone(),
    };
    let registry = CategoryRegistry::new(config.era_base_year).unwrap();
    let cycle = UpdateCycle::new(Arc::new(config), Arc::new(registry), ports, locks.clone());
    Harness {
        cycle,
        documents,
        store,
        notifier,
        locks,
    }
}

#[tokio::test]
async fn empty_store_persists_every_primary_source() {
    let h = harness(full_site(), FakeStore::default(), PipelineConfig::default());
    let report = h.cycle.run(now()).await.unwrap();

    assert_eq!(report.outcomes.len(), 2);
    assert_eq!(report.outcomes[0].category, SourceCategory::Annual);
    assert_eq!(report.outcomes[1].category, SourceCategory::Bimonthly);
    for outcome in &report.outcomes {
        assert!(outcome.success, "{outcome:?}");
        assert_eq!(outcome.status, HistoryStatus::Completed);
        assert!(outcome.reason.as_deref().unwrap().starts_with("no existing data"));
    }
    assert_eq!(report.outcomes[0].counts.persisted, 2);
    assert_eq!(report.outcomes[1].counts.persisted, 2);

    let history = h.store.history.lock();
    assert_eq!(history.len(), 2);
    assert!(history.iter().all(|e| e.content_hash.as_ref().map(String::len) == Some(64)));

    let sent = h.notifier.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].kind, NotificationKind::Success);
    assert!(!report
        .events
        .iter()
        .any(|e| matches!(e, CycleEvent::StalePeriod { .. })));
}

#[tokio::test]
async fn fresh_snapshot_skips_without_download() {
    let store = FakeStore::default();
    let period = PeriodKey::new(2007, 6).unwrap();
    store
        .snapshots
        .lock()
        .insert((RecordKind::ComparableIndustry, period), 2);
    store
        .snapshots
        .lock()
        .insert((RecordKind::DividendReduction, period), 2);
    let h = harness(full_site(), store, PipelineConfig::default());

    let report = h.cycle.run(now()).await.unwrap();
    assert!(report
        .outcomes
        .iter()
        .all(|o| o.status == HistoryStatus::Skipped && o.success));
    assert_eq!(h.documents.requests(), vec![INDEX_URL.to_string()]);
    assert!(h.store.replaced.lock().is_empty());
    assert_eq!(h.store.history.lock().len(), 2);
}

#[tokio::test]
async fn missing_required_category_aborts_and_notifies() {
    let documents = MemoryDocuments::new().with(INDEX_URL, "<html>nothing here</html>");
    let h = harness(documents, FakeStore::default(), PipelineConfig::default());

    let err = h.cycle.run(now()).await.unwrap_err();
    assert!(matches!(err, CycleError::Discovery(_)));
    assert!(h.store.history.lock().is_empty());
    let sent = h.notifier.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].kind, NotificationKind::Error);
}

#[tokio::test]
async fn index_failure_is_fatal() {
    let h = harness(MemoryDocuments::new(), FakeStore::default(), PipelineConfig::default());
    let err = h.cycle.run(now()).await.unwrap_err();
    assert!(matches!(err, CycleError::IndexRetrieval(_)));
}

#[tokio::test]
async fn failed_download_does_not_stop_later_sources() {
    let documents = MemoryDocuments::new()
        .with(INDEX_URL, INDEX_HTML)
        .with(BIMONTHLY_URL, BIMONTHLY_TEXT);
    let h = harness(documents, FakeStore::default(), PipelineConfig::default());

    let report = h.cycle.run(now()).await.unwrap();
    assert!(!report.outcomes[0].success);
    assert_eq!(report.outcomes[0].status, HistoryStatus::Failed);
    assert!(report.outcomes[0].error.as_deref().unwrap().contains("download failed"));
    assert!(report.outcomes[1].success);

    let history = h.store.history.lock();
    assert_eq!(history[0].status, HistoryStatus::Failed);
    assert_eq!(history[1].status, HistoryStatus::Completed);
    assert_eq!(h.notifier.sent()[0].kind, NotificationKind::Warning);
}

#[tokio::test]
async fn invalid_rows_are_dropped_under_default_policy() {
    let annual = "01 製造業 1,500 2.5 8 1,200\n01 製造業 900 1.5 6 800\n";
    let documents = full_site().with(ANNUAL_URL, annual);
    let h = harness(documents, FakeStore::default(), PipelineConfig::default());

    let report = h.cycle.run(now()).await.unwrap();
    let annual = &report.outcomes[0];
    assert_eq!(annual.status, HistoryStatus::Partial);
    assert_eq!(annual.counts.extracted, 2);
    assert_eq!(annual.counts.invalid, 1);
    assert_eq!(annual.counts.persisted, 1);
}

#[tokio::test]
async fn block_policy_rejects_batches_with_errors() {
    let annual = "01 製造業 1,500 2.5 8 1,200\n01 製造業 900 1.5 6 800\n";
    let documents = full_site().with(ANNUAL_URL, annual);
    let config = PipelineConfig {
        validation_policy: ValidationPolicy::BlockOnErrors,
        ..PipelineConfig::default()
    };
    let h = harness(documents, FakeStore::default(), config);

    let report = h.cycle.run(now()).await.unwrap();
    assert!(!report.outcomes[0].success);
    assert_eq!(report.outcomes[0].counts.persisted, 0);
    assert_eq!(h.store.replaced.lock().len(), 1);
}

#[tokio::test]
async fn busy_data_type_fails_only_that_source() {
    let h = harness(full_site(), FakeStore::default(), PipelineConfig::default());
    let _held = h.locks.try_acquire(RecordKind::DividendReduction).unwrap();

    let report = h.cycle.run(now()).await.unwrap();
    assert!(report.outcomes[0].success);
    assert!(!report.outcomes[1].success);
    assert!(report.outcomes[1]
        .error
        .as_deref()
        .unwrap()
        .contains("already in progress"));
    assert!(!h.documents.requests().contains(&BIMONTHLY_URL.to_string()));
}

struct DownNotifier;

#[async_trait]
impl Notifier for DownNotifier {
    async fn notify(&self, _notification: &Notification) -> Result<(), PortError> {
        Err(PortError::Notification("webhook unreachable".into()))
    }
}

#[derive(Clone, Default)]
struct LogBuffer(Arc<Mutex<Vec<u8>>>);

impl std::io::Write for LogBuffer {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl<'a> tracing_subscriber::fmt::MakeWriter<'a> for LogBuffer {
    type Writer = LogBuffer;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

#[tokio::test]
async fn undeliverable_error_notification_is_logged() {
    let logs = LogBuffer::default();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(logs.clone())
        .with_ansi(false)
        .finish();
    let _guard = tracing::subscriber::set_default(subscriber);

    let store = Arc::new(FakeStore::default());
    let ports = Ports {
        documents: Arc::new(MemoryDocuments::new()),
        text: Arc::new(Utf8Text),
        snapshots: store.clone(),
        sink: store,
        notifier: Arc::new(DownNotifier),
    };
    let config = PipelineConfig::default();
    let registry = CategoryRegistry::new(config.era_base_year).unwrap();
    let cycle = UpdateCycle::new(
        Arc::new(config),
        Arc::new(registry),
        ports,
        DataTypeLocks::new(),
    );

    let err = cycle.run(now()).await.unwrap_err();
    assert!(matches!(err, CycleError::IndexRetrieval(_)));
    let logged = String::from_utf8(logs.0.lock().clone()).unwrap();
    assert!(logged.contains("error notification could not be delivered"), "{logged}");
    assert!(logged.contains("webhook unreachable"), "{logged}");
}
