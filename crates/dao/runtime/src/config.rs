//! Configuration for the DAO process

use dao_types::{Amount, TokenMetadata, VotingRule};
use serde::{Deserialize, Serialize};

/// Main process configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DaoConfig {
    /// Token defaults, overridable by Init tags
    #[serde(default)]
    pub token: TokenConfig,

    /// Grant applied when a request is approved
    #[serde(default)]
    pub admission: AdmissionConfig,

    /// Vote weighting
    #[serde(default)]
    pub voting: VotingConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Token configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenConfig {
    #[serde(default = "default_name")]
    pub name: String,

    #[serde(default = "default_ticker")]
    pub ticker: String,

    #[serde(default = "default_denomination")]
    pub denomination: u8,

    /// Supply credited to the treasury at Init
    #[serde(default = "default_initial_supply")]
    pub initial_supply: u64,
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            ticker: default_ticker(),
            denomination: default_denomination(),
            initial_supply: default_initial_supply(),
        }
    }
}

impl TokenConfig {
    pub fn metadata(&self) -> TokenMetadata {
        TokenMetadata::new(self.name.clone(), self.ticker.clone())
            .with_denomination(self.denomination)
    }

    pub fn initial_supply(&self) -> Amount {
        Amount::from(self.initial_supply)
    }
}

/// Admission grant configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdmissionConfig {
    /// Moved from the treasury to the new member
    #[serde(default = "default_grant_amount")]
    pub transfer_amount: u64,

    /// Newly minted into the new member
    #[serde(default = "default_grant_amount")]
    pub mint_amount: u64,
}

impl Default for AdmissionConfig {
    fn default() -> Self {
        Self {
            transfer_amount: default_grant_amount(),
            mint_amount: default_grant_amount(),
        }
    }
}

/// Voting configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VotingConfig {
    #[serde(default)]
    pub rule: VotingRule,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub level: String,

    /// JSON format
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

// Default value helpers
fn default_name() -> String {
    "DAO Token".to_string()
}

fn default_ticker() -> String {
    "DAO".to_string()
}

fn default_denomination() -> u8 {
    12
}

fn default_initial_supply() -> u64 {
    10_000_000_000_000
}

fn default_grant_amount() -> u64 {
    1_000_000_000_000
}

fn default_log_level() -> String {
    "info".to_string()
}

impl DaoConfig {
    /// Load configuration: defaults, then an optional file, then `DAO__`
    /// environment variables (e.g. `DAO__VOTING__RULE=one-member-one-vote`)
    pub fn load(path: Option<&str>) -> Result<Self, config::ConfigError> {
        let mut builder = config::Config::builder();

        builder = builder.add_source(config::Config::try_from(&DaoConfig::default())?);

        if let Some(path) = path {
            builder = builder.add_source(config::File::with_name(path).required(false));
        }

        builder = builder.add_source(
            config::Environment::with_prefix("DAO")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        builder.build()?.try_deserialize()
    }
}
