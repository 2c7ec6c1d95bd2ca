//! Configuration module for walletbook
//!
//! Path resolution for the data directory and persisted user settings.

pub mod paths;
pub mod settings;

pub use paths::WalletPaths;
pub use settings::Settings;
