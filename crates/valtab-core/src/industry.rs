//! # Industry and Size Tables
//!
//! Reference vocabularies shared by extraction (label normalization) and
//! validation (membership checks):
//!
//! - [`KNOWN_INDUSTRY_CODES`]: sector codes used to look up comparable
//!   valuation multiples. An unknown code is a warning, never an error.
//! - [`IndustryType`]: the three sector groupings used by the company size
//!   criteria.
//! - [`SizeCategory`]: the three canonical company size tiers.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Sector codes and their published names for comparable-industry tables.
pub const KNOWN_INDUSTRY_CODES: &[(&str, &str)] = &[
    ("01", "製造業"),
    ("02", "建設業"),
    ("03", "電気・ガス・熱供給・水道業"),
    ("04", "情報通信業"),
    ("05", "運輸業、郵便業"),
    ("06", "卸売業"),
    ("07", "小売業"),
    ("08", "金融業、保険業"),
    ("09", "不動産業、物品賃貸業"),
    ("10", "専門・技術サービス業"),
    ("11", "宿泊業"),
    ("12", "飲食サービス業"),
    ("13", "生活関連サービス業、娯楽業"),
    ("14", "教育、学習支援業"),
    ("15", "医療、福祉"),
    ("16", "サービス業（他に分類されないもの）"),
    ("17", "農業、林業"),
    ("18", "漁業"),
    ("19", "鉱業、採石業、砂利採取業"),
    ("20", "その他の産業"),
];

/// Whether `code` appears in [`KNOWN_INDUSTRY_CODES`].
pub fn is_known_industry_code(code: &str) -> bool {
    KNOWN_INDUSTRY_CODES.iter().any(|(c, _)| *c == code)
}

/// Published name for a known industry code.
pub fn industry_name(code: &str) -> Option<&'static str> {
    KNOWN_INDUSTRY_CODES
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(_, name)| *name)
}

// ---------------------------------------------------------------------------
// IndustryType
// ---------------------------------------------------------------------------

/// Sector grouping used by the company size criteria.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IndustryType {
    /// 卸売業
    Wholesale,
    /// 小売・サービス業
    RetailService,
    /// 卸売業、小売・サービス業以外
    Other,
}

impl IndustryType {
    /// All canonical industry types.
    pub const ALL: [IndustryType; 3] = [Self::Wholesale, Self::RetailService, Self::Other];

    /// Canonical key.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Wholesale => "wholesale",
            Self::RetailService => "retail_service",
            Self::Other => "other",
        }
    }

    /// Resolve a canonical key or a published Japanese label.
    ///
    /// The longest label (`卸売業、小売・サービス業以外`) is checked before
    /// its prefix `卸売業`.
    pub fn parse(label: &str) -> Option<Self> {
        let label = label.trim();
        match label {
            "wholesale" => return Some(Self::Wholesale),
            "retail_service" => return Some(Self::RetailService),
            "other" => return Some(Self::Other),
            _ => {}
        }
        if label.contains("以外") {
            Some(Self::Other)
        } else if label.starts_with("卸売") {
            Some(Self::Wholesale)
        } else if label.starts_with("小売") {
            Some(Self::RetailService)
        } else {
            None
        }
    }
}

impl fmt::Display for IndustryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// SizeCategory
// ---------------------------------------------------------------------------

/// Canonical company size tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SizeCategory {
    /// 小会社
    Small,
    /// 中会社
    Mid,
    /// 大会社
    Large,
}

impl SizeCategory {
    /// All size tiers, smallest first.
    pub const ALL: [SizeCategory; 3] = [Self::Small, Self::Mid, Self::Large];

    /// Canonical key.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Small => "small",
            Self::Mid => "mid",
            Self::Large => "large",
        }
    }

    /// Resolve a canonical key, the legacy `medium` key, or a Japanese label.
    pub fn parse(label: &str) -> Option<Self> {
        match label.trim() {
            "small" | "小会社" => Some(Self::Small),
            "mid" | "medium" | "中会社" => Some(Self::Mid),
            "large" | "大会社" => Some(Self::Large),
            _ => None,
        }
    }
}

impl fmt::Display for SizeCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SizeCategory {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| CoreError::UnknownSizeCategory(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manufacturing_is_code_01() {
        assert!(is_known_industry_code("01"));
        assert_eq!(industry_name("01"), Some("製造業"));
        assert!(!is_known_industry_code("99"));
    }

    #[test]
    fn industry_codes_are_unique() {
        let mut codes: Vec<&str> = KNOWN_INDUSTRY_CODES.iter().map(|(c, _)| *c).collect();
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), KNOWN_INDUSTRY_CODES.len());
    }

    #[test]
    fn industry_type_japanese_labels() {
        assert_eq!(IndustryType::parse("卸売業"), Some(IndustryType::Wholesale));
        assert_eq!(IndustryType::parse("小売・サービス業"), Some(IndustryType::RetailService));
        assert_eq!(
            IndustryType::parse("卸売業、小売・サービス業以外"),
            Some(IndustryType::Other)
        );
        assert_eq!(IndustryType::parse("retail_service"), Some(IndustryType::RetailService));
        assert_eq!(IndustryType::parse("mining"), None);
    }

    #[test]
    fn size_category_labels() {
        assert_eq!(SizeCategory::parse("大会社"), Some(SizeCategory::Large));
        assert_eq!(SizeCategory::parse("中会社"), Some(SizeCategory::Mid));
        assert_eq!(SizeCategory::parse("小会社"), Some(SizeCategory::Small));
        assert_eq!(SizeCategory::parse("medium"), Some(SizeCategory::Mid));
        assert!("huge".parse::<SizeCategory>().is_err());
    }
}
