//! Application configuration management.

use rust_decimal::Decimal;
use serde::Deserialize;

/// Application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Ledger rules and thresholds.
    #[serde(default)]
    pub ledger: LedgerConfig,
    /// Demo data generation.
    #[serde(default)]
    pub seed: SeedConfig,
}

/// Ledger rules and thresholds.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    /// Category stamped on both legs of a top-up.
    pub transfer_category: String,
    /// Category stamped on salary payments.
    pub payroll_category: String,
    /// Number of most recent dates kept in a chart series.
    pub chart_window: usize,
    /// Days before pay day at which an employee counts as due soon.
    pub due_soon_days: i64,
    /// Petty-cash balance under which an outlet is flagged.
    pub low_petty_cash_threshold: Decimal,
    /// Maximum active transactions loaded on refresh.
    pub active_limit: usize,
    /// Maximum trashed transactions loaded on refresh.
    pub trash_limit: usize,
    /// Re-run the petty-cash sufficiency check when editing.
    pub validate_edits: bool,
    /// Refuse salary payments the main treasury cannot cover.
    pub check_payroll_funds: bool,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            transfer_category: "Top Up Kas Kecil".to_string(),
            payroll_category: "Gaji Pegawai".to_string(),
            chart_window: 5,
            due_soon_days: 3,
            low_petty_cash_threshold: Decimal::from(500_000),
            active_limit: 100,
            trash_limit: 50,
            validate_edits: false,
            check_payroll_funds: false,
        }
    }
}

/// Demo data generation.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SeedConfig {
    /// Number of employees to create.
    pub employees: usize,
    /// Number of transactions to record.
    pub transactions: usize,
    /// How far back transaction dates are spread.
    pub days_back: i64,
}

impl Default for SeedConfig {
    fn default() -> Self {
        Self {
            employees: 10,
            transactions: 50,
            days_back: 30,
        }
    }
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// Sources, later ones winning: `config/default`, `config/{RUN_MODE}`,
    /// then `TREASURY__SECTION__KEY` environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(
                config::Environment::with_prefix("TREASURY")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}
