//! Bank account display formatting

use super::transaction::truncate;
use crate::config::Settings;
use crate::models::{BankAccount, BankKind, Money};

/// Format bank accounts as a table with a total row
pub fn format_bank_list(banks: &[BankAccount], settings: &Settings) -> String {
    if banks.is_empty() {
        return "No bank accounts found.\n".to_string();
    }

    let symbol = &settings.currency_symbol;
    let name_width = banks
        .iter()
        .map(|b| b.name.chars().count())
        .max()
        .unwrap_or(4)
        .max(5);

    let mut output = String::new();
    output.push_str(&format!(
        "{:<name_width$}  {:<10}  {:>14}  {:>14}\n",
        "Name",
        "Type",
        "Balance",
        "Income",
        name_width = name_width,
    ));
    output.push_str(&format!(
        "{:-<name_width$}  {:-<10}  {:->14}  {:->14}\n",
        "",
        "",
        "",
        "",
        name_width = name_width,
    ));

    for bank in banks {
        let income = match bank.kind {
            BankKind::Saving => bank.monthly_income.format_with_symbol(symbol),
            BankKind::Investment => "-".to_string(),
        };
        output.push_str(&format!(
            "{:<name_width$}  {:<10}  {:>14}  {:>14}\n",
            bank.name,
            bank.kind.to_string(),
            bank.balance().format_with_symbol(symbol),
            income,
            name_width = name_width,
        ));
    }

    let total: Money = banks.iter().map(|b| b.balance()).sum();
    output.push_str(&format!(
        "{:<name_width$}  {:<10}  {:>14}\n",
        "Total",
        "",
        total.format_with_symbol(symbol),
        name_width = name_width,
    ));

    output
}

/// Format one account's details
pub fn format_bank_details(bank: &BankAccount, settings: &Settings) -> String {
    let symbol = &settings.currency_symbol;
    let mut output = String::new();

    output.push_str(&format!("Account:  {}\n", bank.name));
    output.push_str(&format!("ID:       {}\n", bank.id));
    output.push_str(&format!("Type:     {}\n", bank.kind));
    output.push_str(&format!("Balance:  {}\n", bank.balance().format_with_symbol(symbol)));
    if bank.kind == BankKind::Saving {
        output.push_str(&format!(
            "Income:   {}\n",
            bank.monthly_income.format_with_symbol(symbol)
        ));
    }
    output.push_str(&format!("Entries:  {}\n", bank.ledger().len()));
    if !bank.recurring().is_empty() {
        output.push_str(&format!("Monthly:  {} recurring\n", bank.recurring().len()));
    }

    output
}

/// Format an account's recurring expenditures, numbered for edit and delete
pub fn format_recurring_list(bank: &BankAccount, settings: &Settings) -> String {
    if bank.recurring().is_empty() {
        return format!("No recurring expenditures on {}.\n", bank.name);
    }

    let mut output = format!("Recurring expenditures of {}\n", bank.name);
    output.push_str(&format!(
        "{:>4}  {:30}  {:15}  {:>14}  {:10}\n",
        "No.", "Description", "Category", "Amount", "Next due"
    ));
    output.push_str(&"-".repeat(83));
    output.push('\n');

    for (slot, item) in bank.recurring().iter().enumerate() {
        let next_due = item
            .next_due()
            .map(|d| d.format(&settings.date_format).to_string())
            .unwrap_or_else(|| "-".to_string());
        output.push_str(&format!(
            "{:>4}  {:30}  {:15}  {:>14}  {:10}\n",
            slot + 1,
            truncate(&item.description, 30),
            truncate(&item.category, 15),
            item.amount.format_with_symbol(&settings.currency_symbol),
            next_due
        ));
    }

    let monthly: Money = bank.recurring().iter().map(|r| r.amount).sum();
    output.push_str(&format!(
        "Total per month: {}\n",
        monthly.format_with_symbol(&settings.currency_symbol)
    ));

    output
}
