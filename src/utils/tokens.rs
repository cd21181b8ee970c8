//! Display overrides for special-cased token addresses.
//!
//! Subgraphs report the wrapped native asset under its contract symbol
//! (`WBNB`); the dashboard always shows the native symbol instead.

use once_cell::sync::Lazy;
use rustc_hash::FxHashMap;

use crate::models::SupportedDex;

/// Wrapped BNB on BNB Smart Chain.
pub const WBNB_ADDRESS: &str = "0xbb4cdb9cbd36b01bd1cbaebf2de08d9173bc095c";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenOverride {
    pub symbol: &'static str,
    pub name: &'static str,
}

type OverrideTable = FxHashMap<SupportedDex, FxHashMap<&'static str, TokenOverride>>;

static TOKEN_OVERRIDES: Lazy<OverrideTable> = Lazy::new(|| {
    let bnb = TokenOverride {
        symbol: "BNB",
        name: "BNB",
    };

    let mut table = OverrideTable::default();
    for dex in SupportedDex::ALL {
        table.entry(dex).or_default().insert(WBNB_ADDRESS, bnb);
    }
    table
});

/// Override entry for an address on a network, if any.
pub fn token_override(dex: SupportedDex, address: &str) -> Option<TokenOverride> {
    let address = address.to_lowercase();
    TOKEN_OVERRIDES
        .get(&dex)
        .and_then(|by_address| by_address.get(address.as_str()))
        .copied()
}

/// Symbol to display, preferring the override table over the subgraph value.
pub fn format_token_symbol(dex: SupportedDex, address: &str, symbol: &str) -> String {
    token_override(dex, address)
        .map(|o| o.symbol.to_string())
        .unwrap_or_else(|| symbol.to_string())
}

/// Name to display, preferring the override table over the subgraph value.
pub fn format_token_name(dex: SupportedDex, address: &str, name: &str) -> String {
    token_override(dex, address)
        .map(|o| o.name.to_string())
        .unwrap_or_else(|| name.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wbnb_shown_as_bnb_everywhere() {
        for dex in SupportedDex::ALL {
            assert_eq!(format_token_symbol(dex, WBNB_ADDRESS, "WBNB"), "BNB");
            assert_eq!(format_token_name(dex, WBNB_ADDRESS, "Wrapped BNB"), "BNB");
        }
    }

    #[test]
    fn test_override_lookup_is_case_insensitive() {
        let checksummed = "0xbb4CdB9CBd36B01bD1cBaEBF2De08d9173bc095c";
        assert_eq!(
            format_token_symbol(SupportedDex::Biswap, checksummed, "WBNB"),
            "BNB"
        );
    }

    #[test]
    fn test_other_tokens_pass_through() {
        let busd = "0xe9e7cea3dedca5984780bafc599bd69add087d56";
        assert_eq!(format_token_symbol(SupportedDex::Pancakeswap, busd, "BUSD"), "BUSD");
        assert_eq!(
            format_token_name(SupportedDex::Pancakeswap, busd, "BUSD Token"),
            "BUSD Token"
        );
    }
}
