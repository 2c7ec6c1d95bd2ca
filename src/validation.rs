//! Input checks shared by every command
//!
//! Each function validates one kind of raw argument and returns the typed
//! value or a `WalletError::Validation` naming the offending field.

use chrono::{Datelike, Duration, NaiveDate};

use crate::error::{WalletError, WalletResult};
use crate::models::card::MAX_CARD_NAME_LEN;
use crate::models::goal::MAX_DEADLINE_DAYS;
use crate::models::transaction::{MAX_CATEGORY_LEN, MAX_DESCRIPTION_LEN};
use crate::models::{Money, RebateRate, YearMonth};

const MIN_YEAR: i32 = 1900;
const MAX_YEAR: i32 = 2099;

/// A card, bank or goal name: letters, digits and spaces, at most 30 characters
pub fn check_name(field: &str, name: &str) -> WalletResult<String> {
    let name = name.trim();
    if name.is_empty()
        || name.chars().count() > MAX_CARD_NAME_LEN
        || !name.chars().all(|c| c.is_alphanumeric() || c == ' ')
    {
        return Err(WalletError::Validation(format!(
            "{} can only be alphanumeric and at most {} characters",
            field, MAX_CARD_NAME_LEN
        )));
    }
    Ok(name.to_string())
}

/// A transaction description: letters, digits and spaces, at most 50 characters
pub fn check_description(description: &str) -> WalletResult<String> {
    let description = description.trim();
    if description.is_empty()
        || description.chars().count() > MAX_DESCRIPTION_LEN
        || !description.chars().all(|c| c.is_alphanumeric() || c == ' ')
    {
        return Err(WalletError::Validation(format!(
            "Description can only be alphanumeric and at most {} characters",
            MAX_DESCRIPTION_LEN
        )));
    }
    Ok(description.to_string())
}

/// A free-form category of at most 15 characters
pub fn check_category(category: &str) -> WalletResult<String> {
    let category = category.trim();
    if category.is_empty() || category.chars().count() > MAX_CATEGORY_LEN {
        return Err(WalletError::Validation(format!(
            "Category cannot be empty or longer than {} characters",
            MAX_CATEGORY_LEN
        )));
    }
    Ok(category.to_string())
}

/// A non-negative amount with at most 9 integer digits and 2 decimals
pub fn parse_amount(field: &str, amount: &str) -> WalletResult<Money> {
    Money::parse_amount(amount).map_err(|e| {
        WalletError::Validation(format!("{} '{}' is not valid: {}", field, amount, e))
    })
}

/// Like [`parse_amount`] but zero is refused
pub fn parse_positive_amount(field: &str, amount: &str) -> WalletResult<Money> {
    let money = parse_amount(field, amount)?;
    if !money.is_positive() {
        return Err(WalletError::Validation(format!(
            "{} must be greater than zero",
            field
        )));
    }
    Ok(money)
}

/// A date as YYYY-MM-DD or DD/MM/YYYY with the year in 1900-2099
pub fn parse_date(date: &str) -> WalletResult<NaiveDate> {
    let date = date.trim();
    let parsed = NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(date, "%d/%m/%Y"))
        .ok()
        .filter(|d| (MIN_YEAR..=MAX_YEAR).contains(&d.year()));

    parsed.ok_or_else(|| {
        WalletError::Validation(format!(
            "Invalid date '{}'. Use YYYY-MM-DD or DD/MM/YYYY in year range {}-{}",
            date, MIN_YEAR, MAX_YEAR
        ))
    })
}

/// Parse a date string or return today's date
pub fn parse_date_or_today(date: Option<&str>) -> WalletResult<NaiveDate> {
    match date {
        Some(date) => parse_date(date),
        None => Ok(today()),
    }
}

/// A YYYY-MM month
pub fn parse_month(month: &str) -> WalletResult<YearMonth> {
    YearMonth::parse(month).map_err(|e| WalletError::Validation(e.to_string()))
}

/// A cash-back percentage from 0 to 20
pub fn parse_rebate(rebate: &str) -> WalletResult<RebateRate> {
    RebateRate::parse_percent(rebate).map_err(WalletError::Validation)
}

/// Deadline `days` from `today`, 1 to 365 days ahead
pub fn deadline_in_days(days: u32, today: NaiveDate) -> WalletResult<NaiveDate> {
    if days == 0 || days > MAX_DEADLINE_DAYS {
        return Err(WalletError::Validation(format!(
            "Days can only be a positive number up to {}",
            MAX_DEADLINE_DAYS
        )));
    }
    Ok(today + Duration::days(i64::from(days)))
}

/// Refuse dates before `today`
pub fn check_not_past(field: &str, date: NaiveDate, today: NaiveDate) -> WalletResult<()> {
    if date < today {
        return Err(WalletError::Validation(format!(
            "{} {} has already passed",
            field, date
        )));
    }
    Ok(())
}

/// Refuse dates after `today`
pub fn check_not_future(field: &str, date: NaiveDate, today: NaiveDate) -> WalletResult<()> {
    if date > today {
        return Err(WalletError::Validation(format!(
            "{} {} is in the future",
            field, date
        )));
    }
    Ok(())
}

/// Today's date in local time
pub fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}
