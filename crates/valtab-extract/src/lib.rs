//! # valtab-extract — Discovery and Field Extraction
//!
//! Pure, network-free functions that turn an index page into candidate
//! sources and a document's text into typed record batches.
//!
//! ## Components
//!
//! - **Registry** ([`registry`]): the declarative category table. Every
//!   pattern used by this crate is compiled once, here.
//! - **Metadata** ([`metadata`]): URL → year/month/sub-period/amendment id.
//! - **Discovery** ([`discovery`]): index text → per-category candidates.
//! - **Parsers** ([`comparable`], [`dividend`], [`company_size`]): tolerant
//!   line-shape extraction. Lines that do not match are skipped; duplicate
//!   keys pass through for the validator to report.
//!
//! Nothing in this crate logs or performs I/O.

pub mod company_size;
pub mod comparable;
pub mod discovery;
pub mod dividend;
pub mod error;
pub mod metadata;
pub mod registry;

pub use discovery::{discover, parse_base_url, DiscoveredSources};
pub use error::{ExtractError, ExtractResult};
pub use metadata::DEFAULT_ERA_BASE_YEAR;
pub use registry::{CategoryEntry, CategoryRegistry};
