//! User settings for walletbook
//!
//! Display preferences and the capacity applied to every transaction list.

use chrono::format::{Item, StrftimeItems};
use serde::{Deserialize, Serialize};

use super::paths::WalletPaths;
use crate::error::WalletError;
use crate::models::ledger::DEFAULT_CAPACITY;

/// Largest ledger capacity a user may configure
pub const MAX_LEDGER_CAPACITY: usize = 10_000;

/// User settings for walletbook
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Schema version for migration support
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,

    /// Currency symbol used when printing amounts
    #[serde(default = "default_currency")]
    pub currency_symbol: String,

    /// Date format preference (strftime format)
    #[serde(default = "default_date_format")]
    pub date_format: String,

    /// Entries kept per transaction list before the oldest is dropped
    #[serde(default = "default_ledger_capacity")]
    pub ledger_capacity: usize,

    /// Entries shown by listing commands when no count is given (0 = all)
    #[serde(default = "default_display_count")]
    pub default_display_count: usize,
}

fn default_schema_version() -> u32 {
    1
}

fn default_currency() -> String {
    "$".to_string()
}

fn default_date_format() -> String {
    "%Y-%m-%d".to_string()
}

fn default_ledger_capacity() -> usize {
    DEFAULT_CAPACITY
}

fn default_display_count() -> usize {
    30
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            schema_version: default_schema_version(),
            currency_symbol: default_currency(),
            date_format: default_date_format(),
            ledger_capacity: default_ledger_capacity(),
            default_display_count: default_display_count(),
        }
    }
}

impl Settings {
    /// Load settings from disk, or return defaults if the file doesn't exist
    pub fn load_or_create(paths: &WalletPaths) -> Result<Self, WalletError> {
        let settings_path = paths.settings_file();

        if !settings_path.exists() {
            return Ok(Settings::default());
        }

        let contents = std::fs::read_to_string(&settings_path)
            .map_err(|e| WalletError::Io(format!("Failed to read settings file: {}", e)))?;

        serde_json::from_str(&contents)
            .map_err(|e| WalletError::Config(format!("Failed to parse settings file: {}", e)))
    }

    /// Save settings to disk
    pub fn save(&self, paths: &WalletPaths) -> Result<(), WalletError> {
        paths.ensure_directories()?;

        let contents = serde_json::to_string_pretty(self)
            .map_err(|e| WalletError::Config(format!("Failed to serialize settings: {}", e)))?;

        std::fs::write(paths.settings_file(), contents)
            .map_err(|e| WalletError::Io(format!("Failed to write settings file: {}", e)))?;

        Ok(())
    }

    /// Update one setting by its key
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), WalletError> {
        match key {
            "currency_symbol" => {
                if value.is_empty() || value.chars().count() > 3 {
                    return Err(WalletError::Config(
                        "currency_symbol must be 1 to 3 characters".into(),
                    ));
                }
                self.currency_symbol = value.to_string();
            }
            "date_format" => {
                let malformed = StrftimeItems::new(value).any(|item| matches!(item, Item::Error));
                if value.is_empty() || malformed {
                    return Err(WalletError::Config(format!(
                        "date_format '{}' is not a valid strftime format",
                        value
                    )));
                }
                self.date_format = value.to_string();
            }
            "ledger_capacity" => {
                let capacity = parse_count(key, value)?;
                if capacity == 0 || capacity > MAX_LEDGER_CAPACITY {
                    return Err(WalletError::Config(format!(
                        "ledger_capacity must be between 1 and {}",
                        MAX_LEDGER_CAPACITY
                    )));
                }
                self.ledger_capacity = capacity;
            }
            "default_display_count" => {
                self.default_display_count = parse_count(key, value)?;
            }
            other => {
                return Err(WalletError::Config(format!("Unknown setting '{}'", other)));
            }
        }
        Ok(())
    }
}

fn parse_count(key: &str, value: &str) -> Result<usize, WalletError> {
    value
        .trim()
        .parse()
        .map_err(|_| WalletError::Config(format!("{} must be a whole number", key)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.currency_symbol, "$");
        assert_eq!(settings.ledger_capacity, 500);
        assert_eq!(settings.default_display_count, 30);
    }

    #[test]
    fn test_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let paths = WalletPaths::with_base_dir(temp_dir.path().to_path_buf());

        let mut settings = Settings::default();
        settings.ledger_capacity = 50;
        settings.save(&paths).unwrap();

        let loaded = Settings::load_or_create(&paths).unwrap();
        assert_eq!(loaded, settings);
    }

    #[test]
    fn test_missing_fields_take_defaults() {
        let loaded: Settings = serde_json::from_str(r#"{"currency_symbol": "S$"}"#).unwrap();
        assert_eq!(loaded.currency_symbol, "S$");
        assert_eq!(loaded.ledger_capacity, DEFAULT_CAPACITY);
    }

    #[test]
    fn test_set() {
        let mut settings = Settings::default();
        settings.set("ledger_capacity", "120").unwrap();
        assert_eq!(settings.ledger_capacity, 120);

        assert!(settings.set("ledger_capacity", "0").is_err());
        assert!(settings.set("ledger_capacity", "many").is_err());
        assert!(settings.set("theme", "dark").is_err());
        assert_eq!(settings.ledger_capacity, 120);

        assert!(settings.set("date_format", "%d/%m/%Y").is_ok());
        assert!(settings.set("date_format", "%Q").is_err());

        settings.set("currency_symbol", "€").unwrap();
        assert_eq!(settings.currency_symbol, "€");
    }
}
