//! # valtab-update — Update Orchestration
//!
//! Decides what to refresh and runs the refresh:
//!
//! 1. **Priority** ([`priority`]): one primary source per category.
//! 2. **Decision** ([`decision`]): pure staleness check against the stored
//!    snapshot.
//! 3. **Cycle** ([`pipeline`]): the strictly sequential
//!    discover → decide → retrieve → extract → validate → persist → history
//!    pass, talking to the outside world only through [`ports`].
//!
//! Configuration ([`config`]) is built once and shared by reference.
//! The cycle never logs; it returns a [`CycleReport`] whose events a binary
//! replays with [`report::replay_events`].

pub mod config;
pub mod decision;
pub mod error;
pub mod lock;
pub mod memory;
pub mod notification;
pub mod pipeline;
pub mod ports;
pub mod priority;
pub mod report;

pub use config::{ConfigError, PipelineConfig, ReplaceScope, StalenessThresholds, ValidationPolicy};
pub use decision::{
    decide, decide_amendment, needs_update, ExistingSnapshot, LoadedAmendment, UpdateDecision,
    NO_EXISTING_DATA,
};
pub use error::{CycleError, SourceError};
pub use lock::DataTypeLocks;
pub use notification::{Notification, NotificationKind};
pub use pipeline::{content_hash, Ports, UpdateCycle};
pub use ports::{DocumentSource, Notifier, PortError, RecordSink, SnapshotLookup, TextExtractor};
pub use priority::{select_primary, PrimarySource};
pub use report::{CycleEvent, CycleReport, SourceOutcome};
