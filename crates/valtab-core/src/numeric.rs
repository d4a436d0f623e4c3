//! # Numeric Token Normalization
//!
//! Document text renders numbers with thousands separators (ASCII `,` or
//! full-width `，`) and occasionally full-width digits. Every numeric token
//! in the workspace is converted through [`parse_number`] so extraction and
//! JSON import agree on what a number is.

use serde::{Deserialize, Deserializer};

/// Parse a numeric token, stripping thousands separators first.
///
/// Full-width digits, the full-width period, and the full-width minus sign
/// are folded to ASCII. Returns `None` for empty or non-numeric tokens.
pub fn parse_number(token: &str) -> Option<f64> {
    let normalized: String = token
        .trim()
        .chars()
        .filter(|c| *c != ',' && *c != '，')
        .map(|c| match c {
            '０'..='９' => char::from(b'0' + (c as u32 - '０' as u32) as u8),
            '．' => '.',
            '－' | '−' => '-',
            other => other,
        })
        .collect();
    if normalized.is_empty() {
        return None;
    }
    normalized.parse::<f64>().ok()
}

/// Serde helper for optional numeric fields at the import boundary.
///
/// Accepts JSON numbers, numeric strings (with separators), `null`, or a
/// missing field. A string that does not parse becomes `NaN` so the
/// validator can report it as non-numeric instead of failing the whole
/// batch at deserialization time.
pub(crate) fn lenient_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(serde_json::Value::Null) => None,
        Some(serde_json::Value::Number(n)) => Some(n.as_f64().unwrap_or(f64::NAN)),
        Some(serde_json::Value::String(s)) => {
            if s.trim().is_empty() {
                None
            } else {
                Some(parse_number(&s).unwrap_or(f64::NAN))
            }
        }
        Some(_) => Some(f64::NAN),
    })
}
