//! CLI command handlers
//!
//! This module contains the implementation of CLI commands,
//! bridging the clap argument parsing with the service layer.

pub mod bank;
pub mod card;
pub mod goal;

pub use bank::{handle_bank_command, BankCommands, RecurringCommands};
pub use card::{handle_card_command, CardCommands};
pub use goal::{handle_goal_command, GoalCommands};

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use crate::error::{WalletError, WalletResult};
use crate::models::{TransactionEdit, TransactionQuery};
use crate::validation;

/// Build a search query from the `find` options; at least one is required
pub(crate) fn build_query(
    description: Option<&str>,
    category: Option<&str>,
    from: Option<&str>,
    to: Option<&str>,
) -> WalletResult<TransactionQuery> {
    if description.is_none() && category.is_none() && from.is_none() && to.is_none() {
        return Err(WalletError::Validation(
            "Give at least one of --description, --category, --from or --to".into(),
        ));
    }

    let mut query = TransactionQuery::new();
    if let Some(keyword) = description {
        query = query.description(keyword);
    }
    if let Some(keyword) = category {
        query = query.category(keyword);
    }
    if let Some(from) = from {
        query = query.from(validation::parse_date(from)?);
    }
    if let Some(to) = to {
        query = query.to(validation::parse_date(to)?);
    }
    query.validate()?;
    Ok(query)
}

/// Build a transaction edit from the edit options
pub(crate) fn build_edit(
    description: Option<&str>,
    amount: Option<&str>,
    date: Option<&str>,
    category: Option<&str>,
) -> WalletResult<TransactionEdit> {
    let mut edit = TransactionEdit::new();
    if let Some(description) = description {
        edit = edit.description(validation::check_description(description)?);
    }
    if let Some(amount) = amount {
        edit = edit.amount(validation::parse_positive_amount("Amount", amount)?);
    }
    if let Some(date) = date {
        let date = validation::parse_date(date)?;
        validation::check_not_future("Date", date, validation::today())?;
        edit = edit.date(date);
    }
    if let Some(category) = category {
        edit = edit.category(validation::check_category(category)?);
    }
    Ok(edit)
}

/// Parse and check the date of a new transaction; defaults to today
pub(crate) fn transaction_date(date: Option<&str>) -> WalletResult<chrono::NaiveDate> {
    let date = validation::parse_date_or_today(date)?;
    validation::check_not_future("Date", date, validation::today())?;
    Ok(date)
}

/// Open an export file for buffered writing
pub(crate) fn create_export_file(output: &Path) -> WalletResult<BufWriter<File>> {
    let file = File::create(output).map_err(|e| {
        WalletError::Export(format!(
            "Failed to create file {}: {}",
            output.display(),
            e
        ))
    })?;
    Ok(BufWriter::new(file))
}
