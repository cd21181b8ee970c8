use std::fmt;

use serde::{Deserialize, Serialize};

/// DEX deployments the dashboard knows how to query.
///
/// Deployments share the Uniswap V2 subgraph schema but differ in a few
/// entity names (Pancakeswap prefixes its factory and day data entities).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SupportedDex {
    Litedex,
    Biswap,
    Pancakeswap,
}

impl SupportedDex {
    pub const ALL: [SupportedDex; 3] = [
        SupportedDex::Litedex,
        SupportedDex::Biswap,
        SupportedDex::Pancakeswap,
    ];

    /// URL path segment used by the dashboard
    pub fn route(&self) -> &'static str {
        match self {
            SupportedDex::Litedex => "litedex",
            SupportedDex::Biswap => "biswap",
            SupportedDex::Pancakeswap => "pancakeswap",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            SupportedDex::Litedex => "Litedex",
            SupportedDex::Biswap => "Biswap",
            SupportedDex::Pancakeswap => "Pancakeswap",
        }
    }

    /// Subgraph entity holding protocol-wide cumulative totals
    pub fn factory_entity(&self) -> &'static str {
        match self {
            SupportedDex::Pancakeswap => "pancakeFactories",
            _ => "prodFactories",
        }
    }

    /// Subgraph entity holding protocol-wide day datas
    pub fn day_data_entity(&self) -> &'static str {
        match self {
            SupportedDex::Pancakeswap => "pancakeDayDatas",
            _ => "prodDayDatas",
        }
    }

    /// Litedex token day datas are not indexed by date, so the top-token
    /// query cannot filter on `date_gt`.
    pub fn filters_top_tokens_by_date(&self) -> bool {
        !matches!(self, SupportedDex::Litedex)
    }
}

impl fmt::Display for SupportedDex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.route())
    }
}
