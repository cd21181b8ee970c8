//! Conversions for subgraph payloads.
//!
//! The Graph serializes `BigDecimal` and `BigInt` fields as JSON strings,
//! while `Int` fields arrive as numbers. These helpers accept both forms.

use std::str::FromStr;

use alloy::primitives::Address;
use bigdecimal::BigDecimal;
use num_traits::ToPrimitive;
use serde::{Deserialize, Deserializer};

// ============================================
// Decimal Parsing
// ============================================

/// Parse a subgraph decimal string into f64 using BigDecimal.
///
/// Returns `None` for empty or malformed input, or values outside f64 range.
pub fn parse_decimal(value: &str) -> Option<f64> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }

    let big_value = BigDecimal::from_str(trimmed).ok()?;
    let result = big_value.to_f64()?;

    if result.is_finite() {
        Some(result)
    } else {
        None
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrString {
    Number(f64),
    String(String),
}

/// Serde helper: decimal string or number into f64, malformed input becomes 0.
pub fn de_decimal<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = match Option::<NumberOrString>::deserialize(deserializer)? {
        Some(NumberOrString::Number(n)) if n.is_finite() => n,
        Some(NumberOrString::String(s)) => parse_decimal(&s).unwrap_or(0.0),
        _ => 0.0,
    };
    Ok(value)
}

/// Serde helper: integer string or number into i64 (timestamps, block numbers).
pub fn de_integer<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    match NumberOrString::deserialize(deserializer)? {
        NumberOrString::Number(n) => Ok(n as i64),
        NumberOrString::String(s) => s
            .trim()
            .parse::<i64>()
            .map_err(|e| serde::de::Error::custom(format!("invalid integer {:?}: {}", s, e))),
    }
}

// ============================================
// Addresses
// ============================================

/// Normalize an address to lowercase hex with 0x prefix.
///
/// Store keys and subgraph ids are always lowercase. Returns `None` if the
/// input is not a 20-byte hex address.
pub fn normalize_address(address: &str) -> Option<String> {
    Address::from_str(address.trim())
        .ok()
        .map(|a| a.to_string().to_lowercase())
}

/// Strip the `-suffix` part of a subgraph entity id (`0xhash-3`, `0xtoken-18745`).
pub fn entity_id_prefix(id: &str) -> &str {
    id.split('-').next().unwrap_or(id)
}
