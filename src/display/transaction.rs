//! Transaction display formatting
//!
//! Numbered listings use the same 1-based numbers the edit and delete
//! commands take.

use crate::config::Settings;
use crate::models::{Transaction, TransactionKind};

/// Format one numbered row of a listing
pub fn format_transaction_row(index: usize, txn: &Transaction, settings: &Settings) -> String {
    let amount = match txn.kind {
        TransactionKind::Deposit => format!("+{}", txn.amount.format_with_symbol(&settings.currency_symbol)),
        TransactionKind::Expenditure => txn.amount.format_with_symbol(&settings.currency_symbol),
    };

    format!(
        "{:>4}  {:10}  {:30}  {:15}  {:>14}",
        index,
        txn.date.format(&settings.date_format).to_string(),
        truncate(&txn.description, 30),
        truncate(&txn.category, 15),
        amount
    )
}

/// Format numbered rows under a title
pub fn format_transaction_list<'a, I>(title: &str, entries: I, settings: &Settings) -> String
where
    I: IntoIterator<Item = (usize, &'a Transaction)>,
{
    let mut output = format!("{}\n", title);
    output.push_str(&format!(
        "{:>4}  {:10}  {:30}  {:15}  {:>14}\n",
        "No.", "Date", "Description", "Category", "Amount"
    ));
    output.push_str(&"-".repeat(83));
    output.push('\n');

    let mut count = 0;
    for (index, txn) in entries {
        output.push_str(&format_transaction_row(index, txn, settings));
        output.push('\n');
        count += 1;
    }

    if count == 0 {
        output.push_str("No matching transactions.\n");
    }

    output
}

/// Format transaction details for display
pub fn format_transaction_details(txn: &Transaction, settings: &Settings) -> String {
    let mut output = String::new();

    output.push_str(&format!("Description: {}\n", txn.description));
    output.push_str(&format!("Date:        {}\n", txn.date.format(&settings.date_format)));
    output.push_str(&format!(
        "Amount:      {}\n",
        txn.amount.format_with_symbol(&settings.currency_symbol)
    ));
    output.push_str(&format!("Category:    {}\n", txn.category));
    output.push_str(&format!("Type:        {}\n", txn.kind));

    output
}

/// Truncate a string to a maximum number of characters
pub(crate) fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let head: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", head)
    }
}
