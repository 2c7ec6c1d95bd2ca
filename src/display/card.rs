//! Card display formatting

use crate::config::Settings;
use crate::models::{Card, YearMonth};
use crate::services::BillPayment;

/// Format cards as a table with each card's standing for `month`
pub fn format_card_list(cards: &[Card], month: YearMonth, settings: &Settings) -> String {
    if cards.is_empty() {
        return "No cards found.\n".to_string();
    }

    let symbol = &settings.currency_symbol;
    let name_width = cards
        .iter()
        .map(|c| c.name.chars().count())
        .max()
        .unwrap_or(4)
        .max(4);

    let mut output = format!("Cards for {}\n", month);
    output.push_str(&format!(
        "{:<name_width$}  {:>14}  {:>8}  {:>14}  {:>14}\n",
        "Name",
        "Limit",
        "Rebate",
        "Unpaid",
        "Remaining",
        name_width = name_width,
    ));
    output.push_str(&format!(
        "{:-<name_width$}  {:->14}  {:->8}  {:->14}  {:->14}\n",
        "",
        "",
        "",
        "",
        "",
        name_width = name_width,
    ));

    for card in cards {
        output.push_str(&format!(
            "{:<name_width$}  {:>14}  {:>8}  {:>14}  {:>14}\n",
            card.name,
            card.limit.format_with_symbol(symbol),
            card.rebate.to_string(),
            card.unpaid_bill_amount(month).format_with_symbol(symbol),
            card.remaining_limit(month).format_with_symbol(symbol),
            name_width = name_width,
        ));
    }

    output
}

/// Format one card's details for `month`
pub fn format_card_details(card: &Card, month: YearMonth, settings: &Settings) -> String {
    let symbol = &settings.currency_symbol;
    let mut output = String::new();

    output.push_str(&format!("Card:       {}\n", card.name));
    output.push_str(&format!("ID:         {}\n", card.id));
    output.push_str(&format!("Limit:      {}\n", card.limit.format_with_symbol(symbol)));
    output.push_str(&format!("Rebate:     {}\n", card.rebate));
    output.push_str(&format!(
        "Unpaid {}: {}\n",
        month,
        card.unpaid_bill_amount(month).format_with_symbol(symbol)
    ));
    output.push_str(&format!(
        "Remaining:  {}\n",
        card.remaining_limit(month).format_with_symbol(symbol)
    ));
    output.push_str(&format!(
        "Entries:    {} unpaid, {} paid\n",
        card.unpaid().len(),
        card.paid().len()
    ));

    output
}

/// Format the outcome of `card bill` (paid) or `card unbill`
pub fn format_bill_payment(payment: &BillPayment, paid: bool, settings: &Settings) -> String {
    let symbol = &settings.currency_symbol;
    let mut output = if paid {
        format!(
            "Paid {} bill of {} for {} from {}.\n",
            payment.card,
            payment.amount.format_with_symbol(symbol),
            payment.month,
            payment.bank
        )
    } else {
        format!(
            "Reversed {} bill of {} for {}; {} refunded to {}.\n",
            payment.card,
            payment.amount.format_with_symbol(symbol),
            payment.month,
            payment.amount.format_with_symbol(symbol),
            payment.bank
        )
    };

    if !payment.rebate.is_zero() {
        let verb = if paid { "credited to" } else { "taken back from" };
        output.push_str(&format!(
            "Rebate of {} {} {}.\n",
            payment.rebate.format_with_symbol(symbol),
            verb,
            payment.bank
        ));
    }
    output.push_str(&format!("{} expenditure(s) moved.\n", payment.moved));

    output
}
