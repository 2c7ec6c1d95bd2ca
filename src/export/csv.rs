//! CSV export of transaction ledgers
//!
//! Rows are written in display order, so the `Index` column matches the
//! numbers the edit and delete commands take.

use crate::error::{WalletError, WalletResult};
use crate::models::TransactionLedger;
use std::io::Write;

const HEADER: [&str; 6] = ["Index", "Date", "Description", "Category", "Kind", "Amount"];

/// Export every entry of a ledger to CSV
pub fn export_ledger_csv<W: Write>(writer: W, ledger: &TransactionLedger) -> WalletResult<usize> {
    let mut wtr = csv::Writer::from_writer(writer);

    wtr.write_record(HEADER)
        .map_err(|e| WalletError::Export(e.to_string()))?;

    let mut rows = 0;
    for (slot, txn) in ledger.iter().enumerate() {
        wtr.write_record([
            (slot + 1).to_string(),
            txn.date.format("%Y-%m-%d").to_string(),
            txn.description.clone(),
            txn.category.clone(),
            txn.kind.to_string(),
            txn.amount.to_decimal_string(),
        ])
        .map_err(|e| WalletError::Export(e.to_string()))?;
        rows += 1;
    }

    wtr.flush().map_err(|e| WalletError::Export(e.to_string()))?;
    Ok(rows)
}
