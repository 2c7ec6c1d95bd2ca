//! walletbook - terminal personal-finance ledger
//!
//! Tracks bank accounts, credit cards and savings goals from the command
//! line. Card spending is capped per calendar month by the card's limit, and
//! a month's bill can be paid from a saving account, which moves that
//! month's expenditures from the card's unpaid list to its paid list.
//!
//! # Architecture
//!
//! The crate is organized into the following modules:
//!
//! - `config`: Configuration and path management
//! - `error`: Custom error types
//! - `models`: Core data models (money, ledgers, cards, bank accounts, goals)
//! - `validation`: Parsing and checking of raw command arguments
//! - `storage`: JSON file storage layer
//! - `services`: Business logic layer
//! - `audit`: Audit logging system
//! - `display`: Terminal output formatting
//! - `export`: CSV export
//! - `cli`: Command handlers
//!
//! # Example
//!
//! ```rust,ignore
//! use walletbook::config::{WalletPaths, Settings};
//!
//! let paths = WalletPaths::new()?;
//! let settings = Settings::load_or_create(&paths)?;
//! ```

pub mod audit;
pub mod cli;
pub mod config;
pub mod display;
pub mod error;
pub mod export;
pub mod models;
pub mod services;
pub mod storage;
pub mod validation;

pub use error::{WalletError, WalletResult};

use std::sync::Once;

/// Environment variable holding the diagnostics filter, e.g. `walletbook=debug`
pub const LOG_ENV: &str = "WALLETBOOK_LOG";

static INIT_TRACING: Once = Once::new();

/// Install the global tracing subscriber, writing to stderr
///
/// Only errors are shown unless `WALLETBOOK_LOG` says otherwise.
pub fn init_tracing() {
    INIT_TRACING.call_once(|| {
        use tracing_subscriber::{fmt, EnvFilter};

        let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("error"));

        // A subscriber installed elsewhere (e.g. by a test harness) wins.
        let _ = fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .try_init();
    });
}
