//! # Category Registry
//!
//! Declarative table mapping each [`SourceCategory`] to the four units that
//! handle it: a link shape (discovery), a metadata deriver, a line shape
//! (extraction), and a record builder. Patterns are compiled once when the
//! registry is built; the registry is immutable afterwards and is passed by
//! reference to discovery and extraction.

use regex::Regex;
use valtab_core::{DiscoveredSource, RecordBatch, RecordKind, SourceCategory};

use crate::error::{ExtractError, ExtractResult};
use crate::{company_size, comparable, dividend, metadata};

/// Compiled patterns for one category.
#[derive(Debug, Clone)]
pub struct CategoryEntry {
    category: SourceCategory,
    link_shape: Regex,
    line_shape: Regex,
}

impl CategoryEntry {
    /// The category this entry handles.
    pub fn category(&self) -> SourceCategory {
        self.category
    }

    /// The record kind this category's documents carry.
    pub fn record_kind(&self) -> RecordKind {
        self.category.record_kind()
    }

    /// Pattern matching candidate document links in index text.
    pub fn link_shape(&self) -> &Regex {
        &self.link_shape
    }

    /// Pattern matching one record line in document text.
    pub fn line_shape(&self) -> &Regex {
        &self.line_shape
    }
}

/// The three category entries plus the era base used by the deriver.
#[derive(Debug, Clone)]
pub struct CategoryRegistry {
    entries: [CategoryEntry; 3],
    era_base_year: i32,
}

fn compile(name: &'static str, pattern: &str) -> ExtractResult<Regex> {
    Regex::new(pattern).map_err(|source| ExtractError::Pattern { name, source })
}

impl CategoryRegistry {
    /// Build the registry with the given era base year.
    pub fn new(era_base_year: i32) -> ExtractResult<Self> {
        let entries = [
            CategoryEntry {
                category: SourceCategory::Annual,
                link_shape: compile("annual link shape", metadata::ANNUAL_LINK)?,
                line_shape: compile("comparable line shape", comparable::LINE_SHAPE)?,
            },
            CategoryEntry {
                category: SourceCategory::Bimonthly,
                link_shape: compile("bimonthly link shape", metadata::BIMONTHLY_LINK)?,
                line_shape: compile("dividend line shape", dividend::LINE_SHAPE)?,
            },
            CategoryEntry {
                category: SourceCategory::Amendment,
                link_shape: compile("amendment link shape", metadata::AMENDMENT_LINK)?,
                line_shape: compile("company size line shape", company_size::LINE_SHAPE)?,
            },
        ];
        Ok(Self {
            entries,
            era_base_year,
        })
    }

    /// Build the registry with [`metadata::DEFAULT_ERA_BASE_YEAR`].
    pub fn standard() -> ExtractResult<Self> {
        Self::new(metadata::DEFAULT_ERA_BASE_YEAR)
    }

    /// Era base year applied to annual URLs.
    pub fn era_base_year(&self) -> i32 {
        self.era_base_year
    }

    /// All entries in priority order.
    pub fn entries(&self) -> &[CategoryEntry] {
        &self.entries
    }

    /// The entry for `category`.
    pub fn entry(&self, category: SourceCategory) -> &CategoryEntry {
        &self.entries[usize::from(category.priority_rank() - 1)]
    }

    /// Derive period metadata for a document URL (see [`metadata::derive`]).
    pub fn derive_metadata(&self, category: SourceCategory, url: &str) -> Option<DiscoveredSource> {
        metadata::derive(
            category,
            self.entry(category).link_shape(),
            url,
            self.era_base_year,
        )
    }

    /// Extract every record of `kind` from `text`, stamped with the given
    /// period. Lines that do not match the line shape are skipped.
    pub fn extract(&self, kind: RecordKind, text: &str, year: i32, month: i32) -> RecordBatch {
        let shape = self.entry(kind.category()).line_shape();
        match kind {
            RecordKind::ComparableIndustry => {
                RecordBatch::ComparableIndustry(comparable::extract(shape, text, year, month))
            }
            RecordKind::DividendReduction => {
                RecordBatch::DividendReduction(dividend::extract(shape, text, year, month))
            }
            RecordKind::CompanySize => {
                RecordBatch::CompanySize(company_size::extract(shape, text, year, month))
            }
        }
    }
}
