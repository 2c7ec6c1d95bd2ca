//! Transaction model
//!
//! A single deposit or expenditure held by exactly one ledger.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::{CardId, TransactionId};
use super::money::Money;
use super::month::YearMonth;

/// Maximum description length in characters
pub const MAX_DESCRIPTION_LEN: usize = 50;

/// Maximum category length in characters
pub const MAX_CATEGORY_LEN: usize = 15;

/// Direction of a transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    /// Money leaving the account or charged to a card
    #[default]
    Expenditure,
    /// Money entering the account
    Deposit,
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Expenditure => write!(f, "Expenditure"),
            Self::Deposit => write!(f, "Deposit"),
        }
    }
}

/// The card bill a bank transaction settles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BillRef {
    pub card: CardId,
    pub month: YearMonth,
}

/// A financial transaction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// Unique identifier
    pub id: TransactionId,

    /// Deposit or expenditure
    #[serde(default)]
    pub kind: TransactionKind,

    /// Transaction date
    pub date: NaiveDate,

    /// Amount, always non-negative; `kind` carries the direction
    pub amount: Money,

    /// Short free-text description
    pub description: String,

    /// Spending category
    pub category: String,

    /// Card bill this payment or rebate belongs to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bill: Option<BillRef>,

    /// When the transaction was created
    pub created_at: DateTime<Utc>,

    /// When the transaction was last modified
    pub updated_at: DateTime<Utc>,
}

impl Transaction {
    /// Create an expenditure
    pub fn expenditure(
        amount: Money,
        date: NaiveDate,
        description: impl Into<String>,
        category: impl Into<String>,
    ) -> Self {
        Self::with_kind(TransactionKind::Expenditure, amount, date, description, category)
    }

    /// Create a deposit
    pub fn deposit(
        amount: Money,
        date: NaiveDate,
        description: impl Into<String>,
        category: impl Into<String>,
    ) -> Self {
        Self::with_kind(TransactionKind::Deposit, amount, date, description, category)
    }

    fn with_kind(
        kind: TransactionKind,
        amount: Money,
        date: NaiveDate,
        description: impl Into<String>,
        category: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: TransactionId::new(),
            kind,
            date,
            amount,
            description: description.into(),
            category: category.into(),
            bill: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Tag the transaction as part of a card's monthly bill
    pub fn for_bill(mut self, card: CardId, month: YearMonth) -> Self {
        self.bill = Some(BillRef { card, month });
        self
    }

    pub fn is_deposit(&self) -> bool {
        self.kind == TransactionKind::Deposit
    }

    /// Signed effect on an account balance
    pub fn signed_amount(&self) -> Money {
        match self.kind {
            TransactionKind::Deposit => self.amount,
            TransactionKind::Expenditure => -self.amount,
        }
    }

    /// Apply the set fields of an edit
    pub fn apply(&mut self, edit: &TransactionEdit) {
        if let Some(description) = &edit.description {
            self.description = description.clone();
        }
        if let Some(amount) = edit.amount {
            self.amount = amount;
        }
        if let Some(date) = edit.date {
            self.date = date;
        }
        if let Some(category) = &edit.category {
            self.category = category.clone();
        }
        self.updated_at = Utc::now();
    }

    /// Validate the transaction
    pub fn validate(&self) -> Result<(), TransactionValidationError> {
        if self.amount.is_negative() {
            return Err(TransactionValidationError::NegativeAmount(self.amount));
        }

        let desc_len = self.description.chars().count();
        if desc_len > MAX_DESCRIPTION_LEN {
            return Err(TransactionValidationError::DescriptionTooLong(desc_len));
        }

        if self.category.trim().is_empty() {
            return Err(TransactionValidationError::EmptyCategory);
        }

        let cat_len = self.category.chars().count();
        if cat_len > MAX_CATEGORY_LEN {
            return Err(TransactionValidationError::CategoryTooLong(cat_len));
        }

        Ok(())
    }
}

impl fmt::Display for Transaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} [{}]",
            self.date.format("%Y-%m-%d"),
            self.description,
            self.amount,
            self.category
        )
    }
}

/// Field changes for an existing transaction; `None` leaves a field as is
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransactionEdit {
    pub description: Option<String>,
    pub amount: Option<Money>,
    pub date: Option<NaiveDate>,
    pub category: Option<String>,
}

impl TransactionEdit {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn amount(mut self, amount: Money) -> Self {
        self.amount = Some(amount);
        self
    }

    pub fn date(mut self, date: NaiveDate) -> Self {
        self.date = Some(date);
        self
    }

    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// True when no field would change
    pub fn is_empty(&self) -> bool {
        self.description.is_none()
            && self.amount.is_none()
            && self.date.is_none()
            && self.category.is_none()
    }
}

/// Validation errors for transactions
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransactionValidationError {
    NegativeAmount(Money),
    DescriptionTooLong(usize),
    EmptyCategory,
    CategoryTooLong(usize),
}

impl fmt::Display for TransactionValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NegativeAmount(amount) => {
                write!(f, "Transaction amount cannot be negative ({})", amount)
            }
            Self::DescriptionTooLong(len) => write!(
                f,
                "Description too long ({} chars, max {})",
                len, MAX_DESCRIPTION_LEN
            ),
            Self::EmptyCategory => write!(f, "Category cannot be empty"),
            Self::CategoryTooLong(len) => write!(
                f,
                "Category too long ({} chars, max {})",
                len, MAX_CATEGORY_LEN
            ),
        }
    }
}

impl std::error::Error for TransactionValidationError {}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_new_expenditure() {
        let txn = Transaction::expenditure(
            Money::from_cents(5000),
            date(2025, 1, 15),
            "Groceries run",
            "Food",
        );
        assert_eq!(txn.kind, TransactionKind::Expenditure);
        assert_eq!(txn.signed_amount(), Money::from_cents(-5000));
        assert!(txn.validate().is_ok());
    }

    #[test]
    fn test_deposit_signed_amount() {
        let txn = Transaction::deposit(Money::from_cents(1000), date(2025, 1, 15), "Pay", "Salary");
        assert!(txn.is_deposit());
        assert_eq!(txn.signed_amount(), Money::from_cents(1000));
    }

    #[test]
    fn test_apply_edit_keeps_unset_fields() {
        let mut txn =
            Transaction::expenditure(Money::from_cents(1000), date(2025, 1, 15), "Lunch", "Food");
        let id = txn.id;
        txn.apply(&TransactionEdit::new().amount(Money::from_cents(1500)));

        assert_eq!(txn.id, id);
        assert_eq!(txn.amount, Money::from_cents(1500));
        assert_eq!(txn.description, "Lunch");
        assert_eq!(txn.date, date(2025, 1, 15));
        assert_eq!(txn.category, "Food");
    }

    #[test]
    fn test_edit_is_empty() {
        assert!(TransactionEdit::new().is_empty());
        assert!(!TransactionEdit::new().category("Travel").is_empty());
    }

    #[test]
    fn test_validation() {
        let mut txn =
            Transaction::expenditure(Money::from_cents(1000), date(2025, 1, 15), "Lunch", "Food");

        txn.description = "a".repeat(51);
        assert_eq!(
            txn.validate(),
            Err(TransactionValidationError::DescriptionTooLong(51))
        );

        txn.description = "Lunch".into();
        txn.category = "  ".into();
        assert_eq!(txn.validate(), Err(TransactionValidationError::EmptyCategory));

        txn.category = "Food".into();
        txn.amount = Money::from_cents(-1);
        assert!(matches!(
            txn.validate(),
            Err(TransactionValidationError::NegativeAmount(_))
        ));
    }

    #[test]
    fn test_bill_tag_survives_edits_and_serde() {
        let card = CardId::new();
        let march = YearMonth::new(2024, 3).unwrap();
        let mut txn =
            Transaction::expenditure(Money::from_cents(8000), date(2024, 4, 10), "Paid Visa", "Card Bill")
                .for_bill(card, march);
        txn.apply(&TransactionEdit::new().description("Visa March"));
        assert_eq!(txn.bill, Some(BillRef { card, month: march }));

        let json = serde_json::to_string(&txn).unwrap();
        let back: Transaction = serde_json::from_str(&json).unwrap();
        assert_eq!(back.bill, txn.bill);

        let plain = Transaction::deposit(Money::from_cents(100), date(2024, 4, 10), "Gift", "Income");
        assert!(!serde_json::to_string(&plain).unwrap().contains("bill"));
    }

    #[test]
    fn test_display() {
        let txn =
            Transaction::expenditure(Money::from_cents(5000), date(2025, 1, 15), "Shoes", "Shopping");
        assert_eq!(format!("{}", txn), "2025-01-15 Shoes $50.00 [Shopping]");
    }
}
