//! Application configuration management.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Consolidation engine configuration.
    #[serde(default)]
    pub consolidation: ConsolidationConfig,
    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Default `EnvFilter` directive when `RUST_LOG` is unset.
    #[serde(default = "default_log_filter")]
    pub filter: String,
    /// Emit JSON log lines instead of human-readable ones.
    #[serde(default)]
    pub json: bool,
}

fn default_log_filter() -> String {
    "consolidator=info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: default_log_filter(),
            json: false,
        }
    }
}

/// A grouping the engine posts synthetic amounts to, with the
/// classification used when the parent's chart does not know the code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyntheticGrouping {
    /// Grouping code.
    pub code: String,
    /// Grouping display name.
    pub name: String,
    /// Minor head code.
    pub minor_head_code: String,
    /// Minor head display name.
    pub minor_head_name: String,
    /// Major head code (A, B or C).
    pub major_head_code: String,
    /// Major head display name.
    pub major_head_name: String,
}

/// Consolidation engine configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ConsolidationConfig {
    /// Allowed absolute difference between total assets and total
    /// liabilities before a result is flagged as unbalanced.
    #[serde(default = "default_balance_tolerance")]
    pub balance_tolerance: Decimal,
    /// Timeout for a single entity fetch, in seconds.
    #[serde(default = "default_fetch_timeout_secs")]
    pub fetch_timeout_secs: u64,
    /// Minor-head code prefixes that hold equity.
    #[serde(default = "default_equity_minor_heads")]
    pub equity_minor_heads: Vec<String>,
    /// Minor-head code prefixes under major head C that hold income.
    #[serde(default = "default_revenue_minor_heads")]
    pub revenue_minor_heads: Vec<String>,
    /// Minor-head prefixes scanned for related-party receivables.
    #[serde(default = "default_receivable_minor_heads")]
    pub receivable_minor_heads: Vec<String>,
    /// Minor-head prefixes scanned for related-party payables.
    #[serde(default = "default_payable_minor_heads")]
    pub payable_minor_heads: Vec<String>,
    /// Grouping receiving the equity-method investment.
    #[serde(default = "default_associate_investment")]
    pub associate_investment: SyntheticGrouping,
    /// Grouping receiving the equity-method share of profit.
    #[serde(default = "default_associate_profit_share")]
    pub associate_profit_share: SyntheticGrouping,
    /// Also compute minority interest for proportionately consolidated
    /// subsidiaries.
    #[serde(default)]
    pub proportionate_minority_interest: bool,
    /// Maximum number of cached entity names.
    #[serde(default = "default_name_cache_capacity")]
    pub name_cache_capacity: u64,
    /// Time-to-live of a cached entity name, in seconds.
    #[serde(default = "default_name_cache_ttl_secs")]
    pub name_cache_ttl_secs: u64,
}

fn default_balance_tolerance() -> Decimal {
    Decimal::ONE
}

fn default_fetch_timeout_secs() -> u64 {
    30
}

fn prefixes(codes: &[&str]) -> Vec<String> {
    codes.iter().map(|c| (*c).to_string()).collect()
}

fn default_equity_minor_heads() -> Vec<String> {
    prefixes(&["B.10", "B.20"])
}

fn default_revenue_minor_heads() -> Vec<String> {
    prefixes(&["C.10", "C.20"])
}

fn default_receivable_minor_heads() -> Vec<String> {
    prefixes(&["A.110", "A.120"])
}

fn default_payable_minor_heads() -> Vec<String> {
    prefixes(&["B.70", "B.80"])
}

fn default_associate_investment() -> SyntheticGrouping {
    SyntheticGrouping {
        code: "A.50.02".to_string(),
        name: "Equity Investments – Associates".to_string(),
        minor_head_code: "A.50".to_string(),
        minor_head_name: "Non-Current Investments".to_string(),
        major_head_code: "A".to_string(),
        major_head_name: "Assets".to_string(),
    }
}

fn default_associate_profit_share() -> SyntheticGrouping {
    SyntheticGrouping {
        code: "C.20.06".to_string(),
        name: "Share of Profit of Associates".to_string(),
        minor_head_code: "C.20".to_string(),
        minor_head_name: "Other Income".to_string(),
        major_head_code: "C".to_string(),
        major_head_name: "Profit & Loss Statement".to_string(),
    }
}

fn default_name_cache_capacity() -> u64 {
    1_000
}

fn default_name_cache_ttl_secs() -> u64 {
    300 // 5 minutes
}

impl Default for ConsolidationConfig {
    fn default() -> Self {
        Self {
            balance_tolerance: default_balance_tolerance(),
            fetch_timeout_secs: default_fetch_timeout_secs(),
            equity_minor_heads: default_equity_minor_heads(),
            revenue_minor_heads: default_revenue_minor_heads(),
            receivable_minor_heads: default_receivable_minor_heads(),
            payable_minor_heads: default_payable_minor_heads(),
            associate_investment: default_associate_investment(),
            associate_profit_share: default_associate_profit_share(),
            proportionate_minority_interest: false,
            name_cache_capacity: default_name_cache_capacity(),
            name_cache_ttl_secs: default_name_cache_ttl_secs(),
        }
    }
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(config::Environment::with_prefix("CONSOLIDATOR").separator("__"))
            .build()?;

        config.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_defaults_without_sources() {
        let config = temp_env::with_var_unset("RUN_MODE", AppConfig::load).unwrap();

        assert_eq!(config.consolidation.balance_tolerance, dec!(1));
        assert_eq!(config.consolidation.fetch_timeout_secs, 30);
        assert_eq!(config.consolidation.equity_minor_heads, vec!["B.10", "B.20"]);
        assert_eq!(config.consolidation.associate_investment.code, "A.50.02");
        assert!(!config.consolidation.proportionate_minority_interest);
        assert_eq!(config.logging.filter, "consolidator=info");
    }

    #[test]
    fn test_environment_override() {
        let config = temp_env::with_var(
            "CONSOLIDATOR__CONSOLIDATION__FETCH_TIMEOUT_SECS",
            Some("5"),
            AppConfig::load,
        )
        .unwrap();

        assert_eq!(config.consolidation.fetch_timeout_secs, 5);
        assert_eq!(config.consolidation.revenue_minor_heads, vec!["C.10", "C.20"]);
    }

    #[test]
    fn test_partial_section_keeps_defaults() {
        let config: ConsolidationConfig =
            serde_json::from_str(r#"{"balance_tolerance": "0.5"}"#).unwrap();

        assert_eq!(config.balance_tolerance, dec!(0.5));
        assert_eq!(config.associate_profit_share.minor_head_code, "C.20");
        assert_eq!(config.name_cache_capacity, 1_000);
    }
}
