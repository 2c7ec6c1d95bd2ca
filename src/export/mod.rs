//! Export module for walletbook
//!
//! Card and bank ledgers export to CSV for spreadsheets.

pub mod csv;

pub use self::csv::export_ledger_csv;
