//! Token metadata, fixed at initialization

use serde::{Deserialize, Serialize};

/// Display metadata for the DAO's membership token
///
/// Set once by the Init message and immutable afterwards. `denomination`
/// is display precision only; stored balances are never rescaled.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenMetadata {
    pub name: String,
    pub ticker: String,
    pub denomination: u8,
}

impl TokenMetadata {
    pub fn new(name: impl Into<String>, ticker: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ticker: ticker.into(),
            denomination: 12,
        }
    }

    pub fn with_denomination(mut self, denomination: u8) -> Self {
        self.denomination = denomination;
        self
    }

    /// Canonical Info text: `Name: {name} Ticker: {ticker} Denomination: {denomination}`
    pub fn info_line(&self) -> String {
        format!(
            "Name: {} Ticker: {} Denomination: {}",
            self.name, self.ticker, self.denomination
        )
    }
}

impl Default for TokenMetadata {
    fn default() -> Self {
        Self::new("DAO Token", "DAO")
    }
}
