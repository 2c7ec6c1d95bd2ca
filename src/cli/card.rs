//! Card CLI commands
//!
//! Implements CLI commands for cards, their expenditures and monthly bills.

use clap::Subcommand;
use std::path::PathBuf;

use super::{build_edit, build_query, create_export_file, transaction_date};
use crate::config::Settings;
use crate::display::{
    format_bill_payment, format_card_details, format_card_list, format_transaction_list,
};
use crate::error::WalletResult;
use crate::export::export_ledger_csv;
use crate::models::{Transaction, YearMonth};
use crate::services::{CardService, EditCardInput};
use crate::storage::Storage;
use crate::validation;

/// Card subcommands
#[derive(Subcommand)]
pub enum CardCommands {
    /// Add a new card
    Create {
        /// Card name
        name: String,
        /// Monthly spending limit (e.g., "500" or "500.00")
        #[arg(short, long)]
        limit: String,
        /// Cash back percentage, 0 to 20 (e.g., "1.5")
        #[arg(short, long, default_value = "0")]
        rebate: String,
    },
    /// List cards with their standing for a month
    List {
        /// Month (YYYY-MM), defaults to the current month
        #[arg(short, long)]
        month: Option<String>,
    },
    /// Change a card's name, limit or rebate
    Edit {
        /// Card name
        card: String,
        /// New name
        #[arg(short, long)]
        name: Option<String>,
        /// New monthly limit
        #[arg(short, long)]
        limit: Option<String>,
        /// New rebate percentage
        #[arg(short, long)]
        rebate: Option<String>,
    },
    /// Delete a card and its expenditures
    Delete {
        /// Card name
        card: String,
    },
    /// Record an expenditure on a card
    Spend {
        /// Card name
        card: String,
        /// What was bought
        description: String,
        /// Amount spent
        amount: String,
        /// Spending category
        #[arg(short, long, default_value = "Others")]
        category: String,
        /// Date (YYYY-MM-DD or DD/MM/YYYY), defaults to today
        #[arg(short, long)]
        date: Option<String>,
        /// Record straight into the paid list
        #[arg(long)]
        paid: bool,
    },
    /// List a card's expenditures, most recent first
    Expenses {
        /// Card name
        card: String,
        /// Show the paid list instead of the unpaid one
        #[arg(long)]
        paid: bool,
        /// Number of entries to show (0 = all)
        #[arg(short = 'n', long)]
        count: Option<usize>,
    },
    /// Edit an unpaid expenditure by its number in `expenses`
    EditExpense {
        /// Card name
        card: String,
        /// Expenditure number
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
    /// Delete an unpaid expenditure by its number in `expenses`
    DeleteExpense {
        /// Card name
        card: String,
        /// Expenditure number
        index: usize,
    },
    /// Search a card's unpaid expenditures
    Find {
        /// Card name
        card: String,
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
    /// Show how much of a month's limit is left
    Remaining {
        /// Card name
        card: String,
        /// Month (YYYY-MM), defaults to the current month
        #[arg(short, long)]
        month: Option<String>,
    },
    /// Pay a month's bill from a saving account
    Bill {
        /// Card name
        card: String,
        /// Saving account to pay from
        #[arg(short, long)]
        bank: String,
        /// Month (YYYY-MM), defaults to the previous month
        #[arg(short, long)]
        month: Option<String>,
    },
    /// Reverse a month's bill payment
    Unbill {
        /// Card name
        card: String,
        /// Account the bill was paid from
        #[arg(short, long)]
        bank: String,
        /// Month (YYYY-MM)
        #[arg(short, long)]
        month: String,
    },
    /// Export a card's expenditures to CSV
    Export {
        /// Card name
        card: String,
        /// Output file path
        output: PathBuf,
        /// Export the paid list instead of the unpaid one
        #[arg(long)]
        paid: bool,
    },
}

/// Handle a card command
pub fn handle_card_command(
    storage: &Storage,
    settings: &Settings,
    cmd: CardCommands,
) -> WalletResult<()> {
    let service = CardService::new(storage);
    let symbol = settings.currency_symbol.as_str();

    match cmd {
        CardCommands::Create {
            name,
            limit,
            rebate,
        } => {
            let name = validation::check_name("Card name", &name)?;
            let limit = validation::parse_positive_amount("Limit", &limit)?;
            let rebate = validation::parse_rebate(&rebate)?;

            let card = service.create(&name, limit, rebate)?;
            println!("Created card: {}", card.name);
            print!(
                "{}",
                format_card_details(&card, YearMonth::current(), settings)
            );
        }

        CardCommands::List { month } => {
            let month = month_or_current(month.as_deref())?;
            let cards = service.list()?;
            print!("{}", format_card_list(&cards, month, settings));
        }

        CardCommands::Edit {
            card,
            name,
            limit,
            rebate,
        } => {
            let input = EditCardInput {
                name: name
                    .map(|n| validation::check_name("Card name", &n))
                    .transpose()?,
                limit: limit
                    .map(|l| validation::parse_positive_amount("Limit", &l))
                    .transpose()?,
                rebate: rebate.map(|r| validation::parse_rebate(&r)).transpose()?,
            };

            if input.name.is_none() && input.limit.is_none() && input.rebate.is_none() {
                println!("No changes specified. Use --name, --limit or --rebate.");
                return Ok(());
            }

            let updated = service.edit(&card, input)?;
            println!("Updated card: {}", updated.name);
            print!(
                "{}",
                format_card_details(&updated, YearMonth::current(), settings)
            );
        }

        CardCommands::Delete { card } => {
            let deleted = service.delete(&card)?;
            println!("Deleted card: {}", deleted.name);
        }

        CardCommands::Spend {
            card,
            description,
            amount,
            category,
            date,
            paid,
        } => {
            let txn = Transaction::expenditure(
                validation::parse_positive_amount("Amount", &amount)?,
                transaction_date(date.as_deref())?,
                validation::check_description(&description)?,
                validation::check_category(&category)?,
            );

            let recorded = service.add_expenditure(&card, txn, paid)?;
            println!(
                "Added {} expenditure to {}: {} {} on {}",
                if paid { "paid" } else { "unpaid" },
                card.trim(),
                recorded.description,
                recorded.amount.format_with_symbol(symbol),
                recorded.date.format(&settings.date_format)
            );

            if !paid {
                let month = YearMonth::of(recorded.date);
                let remaining = service.remaining_limit(&card, month)?;
                println!(
                    "Remaining limit for {}: {}",
                    month,
                    remaining.format_with_symbol(symbol)
                );
            }
        }

        CardCommands::Expenses { card, paid, count } => {
            let found = service.get(&card)?;
            let count = count.unwrap_or(settings.default_display_count);
            let (title, entries) = if paid {
                (format!("Paid expenditures of {}", found.name), found.list_paid(count)?)
            } else {
                (
                    format!("Unpaid expenditures of {}", found.name),
                    found.list_unpaid(count)?,
                )
            };
            print!("{}", format_transaction_list(&title, entries, settings));
        }

        CardCommands::EditExpense {
            card,
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
            let edited = service.edit_expenditure(&card, index, &edit)?;
            println!(
                "Updated expenditure #{}: {} {}",
                index,
                edited.description,
                edited.amount.format_with_symbol(symbol)
            );
        }

        CardCommands::DeleteExpense { card, index } => {
            let removed = service.delete_expenditure(&card, index)?;
            println!(
                "Deleted expenditure #{}: {} {}",
                index,
                removed.description,
                removed.amount.format_with_symbol(symbol)
            );
        }

        CardCommands::Find {
            card,
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
            let found = service.get(&card)?;
            let matches = found.find_unpaid(&query)?;
            let title = format!("Unpaid expenditures of {} matching the search", found.name);
            print!("{}", format_transaction_list(&title, matches, settings));
        }

        CardCommands::Remaining { card, month } => {
            let month = month_or_current(month.as_deref())?;
            let remaining = service.remaining_limit(&card, month)?;
            println!(
                "Remaining limit on {} for {}: {}",
                card.trim(),
                month,
                remaining.format_with_symbol(symbol)
            );
        }

        CardCommands::Bill { card, bank, month } => {
            let today = validation::today();
            let month = match month {
                Some(month) => validation::parse_month(&month)?,
                None => YearMonth::of(today).prev(),
            };
            let payment = service.pay_bill(&card, &bank, month, today)?;
            print!("{}", format_bill_payment(&payment, true, settings));
        }

        CardCommands::Unbill { card, bank, month } => {
            let month = validation::parse_month(&month)?;
            let payment = service.reverse_bill(&card, &bank, month)?;
            print!("{}", format_bill_payment(&payment, false, settings));
        }

        CardCommands::Export { card, output, paid } => {
            let found = service.get(&card)?;
            let ledger = if paid { found.paid() } else { found.unpaid() };
            let writer = create_export_file(&output)?;
            let rows = export_ledger_csv(writer, ledger)?;
            println!(
                "Exported {} {} expenditure(s) of {} to: {}",
                rows,
                if paid { "paid" } else { "unpaid" },
                found.name,
                output.display()
            );
        }
    }

    Ok(())
}

fn month_or_current(month: Option<&str>) -> WalletResult<YearMonth> {
    match month {
        Some(month) => validation::parse_month(month),
        None => Ok(YearMonth::current()),
    }
}
