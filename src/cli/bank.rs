//! Bank CLI commands
//!
//! Implements CLI commands for bank accounts and their transactions.

use clap::Subcommand;
use std::path::PathBuf;

use super::{build_edit, build_query, create_export_file, transaction_date};
use crate::config::Settings;
use crate::display::{
    format_bank_details, format_bank_list, format_recurring_list, format_transaction_list,
};
use crate::error::{WalletError, WalletResult};
use crate::export::export_ledger_csv;
use crate::models::{BankKind, Money, RecurringExpenditure, Transaction};
use crate::services::BankService;
use crate::storage::Storage;
use crate::validation;

/// Bank subcommands
#[derive(Subcommand)]
pub enum BankCommands {
    /// Open a new bank account
    Create {
        /// Account name
        name: String,
        /// Account type (saving, investment)
        #[arg(short = 't', long, default_value = "saving")]
        kind: String,
        /// Opening balance (e.g., "1000.00" or "1000")
        #[arg(short, long, default_value = "0")]
        balance: String,
        /// Monthly income, saving accounts only
        #[arg(short, long)]
        income: Option<String>,
    },
    /// List all bank accounts
    List,
    /// Close a bank account
    Delete {
        /// Account name
        bank: String,
    },
    /// Record money coming in
    Deposit {
        /// Account name
        bank: String,
        /// Where the money came from
        description: String,
        /// Amount deposited
        amount: String,
        /// Category
        #[arg(short, long, default_value = "Others")]
        category: String,
        /// Date (YYYY-MM-DD or DD/MM/YYYY), defaults to today
        #[arg(short, long)]
        date: Option<String>,
    },
    /// Record money going out of an account
    Spend {
        /// Account name
        bank: String,
        /// What the money was spent on
        description: String,
        /// Amount spent
        amount: String,
        /// Spending category
        #[arg(short, long, default_value = "Others")]
        category: String,
        /// Date (YYYY-MM-DD or DD/MM/YYYY), defaults to today
        #[arg(short, long)]
        date: Option<String>,
    },
    /// List an account's transactions, most recent first
    History {
        /// Account name
        bank: String,
        /// Number of entries to show (0 = all)
        #[arg(short = 'n', long)]
        count: Option<usize>,
    },
    /// Edit a transaction by its number in `history`
    EditTxn {
        /// Account name
        bank: String,
        /// Transaction number
        index: usize,
        /// New description
        #[arg(long)]
        description: Option<String>,
        /// New amount
        #[arg(short, long)]
        amount: Option<String>,
        /// New date
        #[arg(short, long)]
        date: Option<String>,
        /// New category
        #[arg(short, long)]
        category: Option<String>,
    },
    /// Delete a transaction by its number in `history`
    DeleteTxn {
        /// Account name
        bank: String,
        /// Transaction number
        index: usize,
    },
    /// Search an account's transactions
    Find {
        /// Account name
        bank: String,
        /// Keyword in the description
        #[arg(long)]
        description: Option<String>,
        /// Keyword in the category
        #[arg(short, long)]
        category: Option<String>,
        /// Earliest date
        #[arg(long)]
        from: Option<String>,
        /// Latest date
        #[arg(long)]
        to: Option<String>,
    },
    /// Export an account's transactions to CSV
    Export {
        /// Account name
        bank: String,
        /// Output file path
        output: PathBuf,
    },
    /// Monthly recurring expenditures of a saving account
    Recurring {
        #[command(subcommand)]
        action: RecurringCommands,
    },
}

/// Recurring expenditure subcommands
#[derive(Subcommand)]
pub enum RecurringCommands {
    /// Add a monthly expenditure, charged from its start date onwards
    Add {
        /// Account name
        bank: String,
        /// What the money is spent on
        description: String,
        /// Amount charged each month
        amount: String,
        /// Spending category
        #[arg(short, long, default_value = "Others")]
        category: String,
        /// First charge date (YYYY-MM-DD or DD/MM/YYYY), defaults to today
        #[arg(short, long)]
        start: Option<String>,
    },
    /// List an account's recurring expenditures
    List {
        /// Account name
        bank: String,
    },
    /// Edit a recurring expenditure by its number in `list`
    Edit {
        /// Account name
        bank: String,
        /// Recurring expenditure number
        index: usize,
        /// New description
        #[arg(long)]
        description: Option<String>,
        /// New amount
        #[arg(short, long)]
        amount: Option<String>,
        /// New category
        #[arg(short, long)]
        category: Option<String>,
    },
    /// Delete a recurring expenditure by its number in `list`
    Delete {
        /// Account name
        bank: String,
        /// Recurring expenditure number
        index: usize,
    },
}

/// Handle a bank command
pub fn handle_bank_command(
    storage: &Storage,
    settings: &Settings,
    cmd: BankCommands,
) -> WalletResult<()> {
    let service = BankService::new(storage);
    let symbol = settings.currency_symbol.as_str();

    match cmd {
        BankCommands::Create {
            name,
            kind,
            balance,
            income,
        } => {
            let name = validation::check_name("Account name", &name)?;
            let kind = BankKind::parse(&kind).ok_or_else(|| {
                WalletError::Validation(format!(
                    "Invalid account type: '{}'. Valid types: saving, investment",
                    kind
                ))
            })?;
            let balance = validation::parse_amount("Balance", &balance)?;
            let income = income
                .map(|i| validation::parse_amount("Income", &i))
                .transpose()?
                .unwrap_or_else(Money::zero);

            let bank = service.create(&name, kind, balance, income)?;
            println!("Created bank account: {}", bank.name);
            print!("{}", format_bank_details(&bank, settings));
        }

        BankCommands::List => {
            let banks = service.list()?;
            print!("{}", format_bank_list(&banks, settings));
        }

        BankCommands::Delete { bank } => {
            let deleted = service.delete(&bank)?;
            println!("Deleted bank account: {}", deleted.name);
        }

        BankCommands::Deposit {
            bank,
            description,
            amount,
            category,
            date,
        } => {
            let txn = Transaction::deposit(
                validation::parse_positive_amount("Amount", &amount)?,
                transaction_date(date.as_deref())?,
                validation::check_description(&description)?,
                validation::check_category(&category)?,
            );
            let amount = txn.amount;

            let updated = service.deposit(&bank, txn)?;
            println!(
                "Deposited {} into {}. Balance: {}",
                amount.format_with_symbol(symbol),
                updated.name,
                updated.balance().format_with_symbol(symbol)
            );
        }

        BankCommands::Spend {
            bank,
            description,
            amount,
            category,
            date,
        } => {
            let txn = Transaction::expenditure(
                validation::parse_positive_amount("Amount", &amount)?,
                transaction_date(date.as_deref())?,
                validation::check_description(&description)?,
                validation::check_category(&category)?,
            );
            let amount = txn.amount;

            let updated = service.spend(&bank, txn)?;
            println!(
                "Spent {} from {}. Balance: {}",
                amount.format_with_symbol(symbol),
                updated.name,
                updated.balance().format_with_symbol(symbol)
            );
        }

        BankCommands::History { bank, count } => {
            let found = service.get(&bank)?;
            let count = count.unwrap_or(settings.default_display_count);
            let title = format!(
                "Transactions of {} (balance {})",
                found.name,
                found.balance().format_with_symbol(symbol)
            );
            let entries = found.list(count)?;
            print!("{}", format_transaction_list(&title, entries, settings));
        }

        BankCommands::EditTxn {
            bank,
            index,
            description,
            amount,
            date,
            category,
        } => {
            let edit = build_edit(
                description.as_deref(),
                amount.as_deref(),
                date.as_deref(),
                category.as_deref(),
            )?;
            let edited = service.edit_transaction(&bank, index, &edit)?;
            println!(
                "Updated transaction #{}: {} {}",
                index,
                edited.description,
                edited.amount.format_with_symbol(symbol)
            );
        }

        BankCommands::DeleteTxn { bank, index } => {
            let removed = service.delete_transaction(&bank, index)?;
            println!(
                "Deleted transaction #{}: {} {}",
                index,
                removed.description,
                removed.amount.format_with_symbol(symbol)
            );
        }

        BankCommands::Find {
            bank,
            description,
            category,
            from,
            to,
        } => {
            let query = build_query(
                description.as_deref(),
                category.as_deref(),
                from.as_deref(),
                to.as_deref(),
            )?;
            let found = service.get(&bank)?;
            let matches = found.find(&query)?;
            let title = format!("Transactions of {} matching the search", found.name);
            print!("{}", format_transaction_list(&title, matches, settings));
        }

        BankCommands::Export { bank, output } => {
            let found = service.get(&bank)?;
            let writer = create_export_file(&output)?;
            let rows = export_ledger_csv(writer, found.ledger())?;
            println!(
                "Exported {} transaction(s) of {} to: {}",
                rows,
                found.name,
                output.display()
            );
        }

        BankCommands::Recurring { action } => {
            handle_recurring_command(&service, settings, action)?;
        }
    }

    Ok(())
}

fn handle_recurring_command(
    service: &BankService<'_>,
    settings: &Settings,
    cmd: RecurringCommands,
) -> WalletResult<()> {
    let symbol = settings.currency_symbol.as_str();

    match cmd {
        RecurringCommands::Add {
            bank,
            description,
            amount,
            category,
            start,
        } => {
            let item = RecurringExpenditure::new(
                validation::parse_positive_amount("Amount", &amount)?,
                validation::parse_date_or_today(start.as_deref())?,
                validation::check_description(&description)?,
                validation::check_category(&category)?,
            );
            let added = service.add_recurring(&bank, item)?;
            println!(
                "Added recurring expenditure: {} {} monthly from {}",
                added.description,
                added.amount.format_with_symbol(symbol),
                added.start.format(&settings.date_format)
            );
        }

        RecurringCommands::List { bank } => {
            let found = service.get(&bank)?;
            print!("{}", format_recurring_list(&found, settings));
        }

        RecurringCommands::Edit {
            bank,
            index,
            description,
            amount,
            category,
        } => {
            let edit = build_edit(description.as_deref(), amount.as_deref(), None, category.as_deref())?;
            let edited = service.edit_recurring(&bank, index, &edit)?;
            println!(
                "Updated recurring expenditure #{}: {} {}",
                index,
                edited.description,
                edited.amount.format_with_symbol(symbol)
            );
        }

        RecurringCommands::Delete { bank, index } => {
            let removed = service.delete_recurring(&bank, index)?;
            println!(
                "Deleted recurring expenditure #{}: {}",
                index, removed.description
            );
        }
    }

    Ok(())
}
