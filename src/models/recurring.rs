//! Recurring expenditure model
//!
//! A fixed monthly charge on a saving account. It falls due on the start
//! date and then on the same day of every following month, clamped to the
//! last day of shorter months.

use chrono::{DateTime, Months, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::ids::TransactionId;
use super::money::Money;
use super::transaction::{Transaction, TransactionEdit, TransactionValidationError};
use crate::error::{WalletError, WalletResult};

/// Maximum number of recurring expenditures per account
pub const MAX_RECURRING: usize = 12;

/// A monthly expenditure posted to its account as it falls due
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecurringExpenditure {
    pub id: TransactionId,

    pub description: String,

    pub amount: Money,

    pub category: String,

    /// First due date
    pub start: NaiveDate,

    /// Occurrences already posted
    #[serde(default)]
    pub posted: u32,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

impl RecurringExpenditure {
    pub fn new(
        amount: Money,
        start: NaiveDate,
        description: impl Into<String>,
        category: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: TransactionId::new(),
            description: description.into(),
            amount,
            category: category.into(),
            start,
            posted: 0,
            created_at: now,
            updated_at: now,
        }
    }

    /// Date of the next occurrence not yet posted
    pub fn next_due(&self) -> Option<NaiveDate> {
        self.start.checked_add_months(Months::new(self.posted))
    }

    /// The expenditure posted for the occurrence due on `due`
    pub fn occurrence(&self, due: NaiveDate) -> Transaction {
        Transaction::expenditure(self.amount, due, self.description.clone(), self.category.clone())
    }

    /// Apply an edit; the schedule itself cannot be moved
    pub fn apply(&mut self, edit: &TransactionEdit) -> WalletResult<()> {
        if edit.date.is_some() {
            return Err(WalletError::Validation(
                "A recurring expenditure's date cannot be changed; delete it and add a new one"
                    .into(),
            ));
        }

        let mut preview = self.clone();
        if let Some(description) = &edit.description {
            preview.description = description.clone();
        }
        if let Some(amount) = edit.amount {
            preview.amount = amount;
        }
        if let Some(category) = &edit.category {
            preview.category = category.clone();
        }
        preview
            .validate()
            .map_err(|e| WalletError::Validation(e.to_string()))?;

        *self = preview;
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Same rules as a single transaction
    pub fn validate(&self) -> Result<(), TransactionValidationError> {
        self.occurrence(self.start).validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn netflix(start: NaiveDate) -> RecurringExpenditure {
        RecurringExpenditure::new(Money::from_cents(1_598), start, "Netflix", "Entertainment")
    }

    #[test]
    fn test_due_dates_keep_the_start_day() {
        let mut item = netflix(date(2024, 1, 31));
        assert_eq!(item.next_due(), Some(date(2024, 1, 31)));

        item.posted = 1;
        assert_eq!(item.next_due(), Some(date(2024, 2, 29)));

        item.posted = 2;
        assert_eq!(item.next_due(), Some(date(2024, 3, 31)));
    }

    #[test]
    fn test_occurrence_is_an_expenditure_on_the_due_date() {
        let item = netflix(date(2024, 1, 15));
        let txn = item.occurrence(date(2024, 2, 15));
        assert!(!txn.is_deposit());
        assert_eq!(txn.date, date(2024, 2, 15));
        assert_eq!(txn.amount, Money::from_cents(1_598));
        assert_eq!(txn.description, "Netflix");
    }

    #[test]
    fn test_apply_edit() {
        let mut item = netflix(date(2024, 1, 15));
        item.apply(&TransactionEdit::new().amount(Money::from_cents(1_898)))
            .unwrap();
        assert_eq!(item.amount, Money::from_cents(1_898));
        assert_eq!(item.category, "Entertainment");

        assert!(item
            .apply(&TransactionEdit::new().date(date(2024, 2, 1)))
            .unwrap_err()
            .is_validation());

        let err = item
            .apply(&TransactionEdit::new().description("x".repeat(51)))
            .unwrap_err();
        assert!(err.is_validation());
        assert_eq!(item.description, "Netflix");
    }
}
