//! Credit card model
//!
//! A card owns an `unpaid` and a `paid` ledger. For every month the unpaid
//! total may not exceed the card's limit; each mutation that could raise an
//! unpaid monthly total is checked before it is applied, so a refused
//! operation never leaves partial changes behind.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use tracing::{debug, warn};

use super::ids::CardId;
use super::ledger::{Entries, Matches, TransactionLedger, TransactionQuery};
use super::money::Money;
use super::month::YearMonth;
use super::transaction::{Transaction, TransactionEdit};
use crate::error::{WalletError, WalletResult};

/// Maximum card name length in characters
pub const MAX_CARD_NAME_LEN: usize = 30;

/// Highest accepted cash-back rate, in hundredths of a percent (20%)
pub const MAX_REBATE_BASIS_POINTS: u32 = 2_000;

/// Cash-back rate stored in hundredths of a percent
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RebateRate(u32);

impl RebateRate {
    pub const fn from_basis_points(basis_points: u32) -> Self {
        Self(basis_points)
    }

    pub const fn basis_points(&self) -> u32 {
        self.0
    }

    /// Parse a percentage such as "1.5" or "2.25"
    pub fn parse_percent(s: &str) -> Result<Self, String> {
        let s = s.trim().trim_end_matches('%');
        let amount = Money::parse_amount(s).map_err(|e| e.to_string())?;
        let basis_points = u32::try_from(amount.cents())
            .ok()
            .filter(|bp| *bp <= MAX_REBATE_BASIS_POINTS)
            .ok_or_else(|| format!("Rebate '{}' must be between 0 and 20 percent", s))?;
        Ok(Self(basis_points))
    }

    /// Cash back earned on `amount`
    pub fn rebate_on(&self, amount: Money) -> Money {
        amount.scale_basis_points(self.0)
    }
}

impl fmt::Display for RebateRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:02}%", self.0 / 100, self.0 % 100)
    }
}

/// A credit card with its unpaid and paid expenditure lists
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Card {
    /// Unique identifier
    pub id: CardId,

    /// Card name, unique across cards
    pub name: String,

    /// Monthly spending limit on unpaid expenditures
    pub limit: Money,

    /// Cash-back rate applied when a bill is paid
    pub rebate: RebateRate,

    unpaid: TransactionLedger,

    paid: TransactionLedger,

    /// When the card was created
    pub created_at: DateTime<Utc>,

    /// When the card was last modified
    pub updated_at: DateTime<Utc>,
}

impl Card {
    /// Create a card with empty ledgers
    pub fn new(name: impl Into<String>, limit: Money, rebate: RebateRate) -> Self {
        let now = Utc::now();
        Self {
            id: CardId::new(),
            name: name.into(),
            limit,
            rebate,
            unpaid: TransactionLedger::new(),
            paid: TransactionLedger::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Apply a ledger capacity to both lists
    pub fn set_ledger_capacity(&mut self, capacity: usize) {
        self.unpaid.set_capacity(capacity);
        self.paid.set_capacity(capacity);
    }

    /// Read-only view of the unpaid list
    pub fn unpaid(&self) -> &TransactionLedger {
        &self.unpaid
    }

    /// Read-only view of the paid list
    pub fn paid(&self) -> &TransactionLedger {
        &self.paid
    }

    pub fn is_unpaid_empty(&self) -> bool {
        self.unpaid.is_empty()
    }

    /// Limit left for `month` after unpaid spending
    pub fn remaining_limit(&self, month: YearMonth) -> Money {
        self.limit - self.unpaid.month_amount_spent(month)
    }

    /// Limit left for the current calendar month
    pub fn remaining_limit_now(&self) -> Money {
        self.remaining_limit(YearMonth::current())
    }

    pub fn unpaid_bill_amount(&self, month: YearMonth) -> Money {
        self.unpaid.month_amount_spent(month)
    }

    pub fn paid_bill_amount(&self, month: YearMonth) -> Money {
        self.paid.month_amount_spent(month)
    }

    /// Highest unpaid total across all months
    pub fn max_monthly_unpaid(&self) -> Money {
        let mut totals: BTreeMap<YearMonth, Money> = BTreeMap::new();
        for txn in self.unpaid.iter() {
            *totals.entry(YearMonth::of(txn.date)).or_default() += txn.amount;
        }
        totals.into_values().max().unwrap_or_default()
    }

    /// Add an unpaid expenditure if it fits within the month's remaining limit
    pub fn add_expenditure(&mut self, txn: Transaction) -> WalletResult<()> {
        self.check_within_limit(&txn)?;
        debug!(card = %self.name, amount = %txn.amount, date = %txn.date, "add unpaid expenditure");
        self.unpaid.add(txn);
        self.touch();
        Ok(())
    }

    /// Add an already-paid expenditure. The limit is still checked against
    /// the month's unpaid total.
    pub fn add_paid_expenditure(&mut self, txn: Transaction) -> WalletResult<()> {
        self.check_within_limit(&txn)?;
        debug!(card = %self.name, amount = %txn.amount, date = %txn.date, "add paid expenditure");
        self.paid.add(txn);
        self.touch();
        Ok(())
    }

    /// Edit an unpaid expenditure by 1-based index
    ///
    /// The limit check targets the month the entry will be in after the edit.
    /// The entry's current amount is credited back when it already counts
    /// towards that month. A date-only edit into a month without room is
    /// refused with `LimitExceeded`.
    pub fn edit_expenditure(
        &mut self,
        index: usize,
        edit: &TransactionEdit,
    ) -> WalletResult<Transaction> {
        let existing = self.unpaid.get(index)?;
        let existing_month = YearMonth::of(existing.date);
        let existing_amount = existing.amount;

        if edit.amount.is_some() || edit.date.is_some() {
            let target = edit.date.map(YearMonth::of).unwrap_or(existing_month);
            let mut allowance = self.remaining_limit(target);
            if target == existing_month {
                allowance += existing_amount;
            }

            let new_amount = edit.amount.unwrap_or(existing_amount);
            if new_amount > allowance {
                warn!(card = %self.name, month = %target, %new_amount, %allowance, "edit refused over limit");
                return Err(WalletError::LimitExceeded {
                    card: self.name.clone(),
                    month: target,
                    remaining: allowance,
                });
            }
        }

        let edited = self.unpaid.edit_by_index(index, edit)?.clone();
        self.touch();
        Ok(edited)
    }

    /// Delete an unpaid expenditure by 1-based index
    pub fn delete_expenditure(&mut self, index: usize) -> WalletResult<Transaction> {
        let removed = self.unpaid.delete_by_index(index)?;
        self.touch();
        Ok(removed)
    }

    /// Move every unpaid entry dated in `month` to the paid list
    ///
    /// Returns the number of entries moved. A month with no entries is a
    /// no-op; only an entirely empty unpaid list is an error.
    pub fn transfer_unpaid_to_paid(&mut self, month: YearMonth) -> WalletResult<usize> {
        if self.unpaid.is_empty() {
            return Err(self.empty_error("unpaid"));
        }
        let moved = move_month(&mut self.unpaid, &mut self.paid, month)?;
        debug!(card = %self.name, %month, moved, "unpaid -> paid");
        if moved > 0 {
            self.touch();
        }
        Ok(moved)
    }

    /// Move every paid entry dated in `month` back to the unpaid list
    ///
    /// Reversal is not new spending, so the limit is not checked.
    pub fn transfer_paid_to_unpaid(&mut self, month: YearMonth) -> WalletResult<usize> {
        if self.paid.is_empty() {
            return Err(self.empty_error("paid"));
        }
        let moved = move_month(&mut self.paid, &mut self.unpaid, month)?;
        debug!(card = %self.name, %month, moved, "paid -> unpaid");
        if moved > 0 {
            self.touch();
        }
        Ok(moved)
    }

    /// Unpaid expenditures for display
    pub fn list_unpaid(&self, display_count: usize) -> WalletResult<Entries<'_>> {
        self.unpaid
            .list(display_count)
            .map_err(|_| self.empty_error("unpaid"))
    }

    /// Paid expenditures for display
    pub fn list_paid(&self, display_count: usize) -> WalletResult<Entries<'_>> {
        self.paid
            .list(display_count)
            .map_err(|_| self.empty_error("paid"))
    }

    /// Search the unpaid expenditures
    pub fn find_unpaid(&self, query: &TransactionQuery) -> WalletResult<Matches<'_>> {
        query.validate()?;
        Ok(self.unpaid.find_matching(query))
    }

    /// Cash back for a bill of `amount`
    pub fn rebate_for(&self, amount: Money) -> Money {
        self.rebate.rebate_on(amount)
    }

    /// Validate card attributes
    pub fn validate(&self) -> Result<(), CardValidationError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(CardValidationError::EmptyName);
        }

        let len = name.chars().count();
        if len > MAX_CARD_NAME_LEN {
            return Err(CardValidationError::NameTooLong(len));
        }

        if !name.chars().all(|c| c.is_alphanumeric() || c == ' ') {
            return Err(CardValidationError::NameNotAlphanumeric);
        }

        if !self.limit.is_positive() {
            return Err(CardValidationError::NonPositiveLimit);
        }

        if self.rebate.basis_points() > MAX_REBATE_BASIS_POINTS {
            return Err(CardValidationError::RebateTooHigh(self.rebate));
        }

        Ok(())
    }

    fn check_within_limit(&self, txn: &Transaction) -> WalletResult<()> {
        let month = YearMonth::of(txn.date);
        let remaining = self.remaining_limit(month);
        if txn.amount > remaining {
            warn!(card = %self.name, %month, amount = %txn.amount, %remaining, "expenditure refused over limit");
            return Err(WalletError::LimitExceeded {
                card: self.name.clone(),
                month,
                remaining,
            });
        }
        Ok(())
    }

    fn empty_error(&self, list: &str) -> WalletError {
        WalletError::EmptyLedger(format!("the {} list of card '{}'", list, self.name))
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

/// Find the next entry in `month`, move it, repeat. Indices are re-queried
/// after every removal because removal shifts them.
fn move_month(
    from: &mut TransactionLedger,
    to: &mut TransactionLedger,
    month: YearMonth,
) -> WalletResult<usize> {
    let mut moved = 0;
    while let Some(index) = from.find_index_by_year_month(month) {
        let txn = from.delete_by_index(index)?;
        to.receive(txn);
        moved += 1;
    }
    Ok(moved)
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (limit {}, rebate {})", self.name, self.limit, self.rebate)
    }
}

/// Validation errors for cards
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CardValidationError {
    EmptyName,
    NameTooLong(usize),
    NameNotAlphanumeric,
    NonPositiveLimit,
    RebateTooHigh(RebateRate),
}

impl fmt::Display for CardValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyName => write!(f, "Card name cannot be empty"),
            Self::NameTooLong(len) => write!(
                f,
                "Card name too long ({} chars, max {})",
                len, MAX_CARD_NAME_LEN
            ),
            Self::NameNotAlphanumeric => {
                write!(f, "Card name can only contain letters, digits and spaces")
            }
            Self::NonPositiveLimit => write!(f, "Card limit must be greater than zero"),
            Self::RebateTooHigh(rate) => write!(f, "Rebate {} exceeds 20.00%", rate),
        }
    }
}

impl std::error::Error for CardValidationError {}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn march() -> YearMonth {
        YearMonth::new(2024, 3).unwrap()
    }

    fn dollars(d: i64) -> Money {
        Money::from_dollars_cents(d, 0)
    }

    fn exp(amount: Money, d: NaiveDate) -> Transaction {
        Transaction::expenditure(amount, d, "Purchase", "Shopping")
    }

    fn card(limit: i64) -> Card {
        Card::new("Visa", dollars(limit), RebateRate::from_basis_points(100))
    }

    fn assert_invariant(card: &Card) {
        assert!(card.max_monthly_unpaid() <= card.limit);
    }

    #[test]
    fn test_add_within_and_over_limit() {
        let mut card = card(500);
        card.add_expenditure(exp(dollars(300), date(2024, 3, 5))).unwrap();
        assert_eq!(card.remaining_limit(march()), dollars(200));

        let err = card
            .add_expenditure(exp(dollars(250), date(2024, 3, 5)))
            .unwrap_err();
        assert!(matches!(
            err,
            WalletError::LimitExceeded { remaining, .. } if remaining == dollars(200)
        ));
        assert_eq!(card.remaining_limit(march()), dollars(200));
        assert_eq!(card.unpaid().len(), 1);
        assert_invariant(&card);
    }

    #[test]
    fn test_amount_equal_to_remaining_is_allowed() {
        let mut card = card(500);
        card.add_expenditure(exp(dollars(300), date(2024, 3, 5))).unwrap();
        card.add_expenditure(exp(dollars(200), date(2024, 3, 6))).unwrap();
        assert_eq!(card.remaining_limit(march()), Money::zero());
        assert!(card
            .add_expenditure(exp(Money::from_cents(1), date(2024, 3, 7)))
            .is_err());
    }

    #[test]
    fn test_limit_is_per_month() {
        let mut card = card(500);
        card.add_expenditure(exp(dollars(500), date(2024, 3, 5))).unwrap();
        card.add_expenditure(exp(dollars(500), date(2024, 4, 5))).unwrap();
        assert_invariant(&card);
    }

    #[test]
    fn test_paid_expenditure_checks_unpaid_total() {
        let mut card = card(500);
        card.add_expenditure(exp(dollars(400), date(2024, 3, 5))).unwrap();

        assert!(card
            .add_paid_expenditure(exp(dollars(150), date(2024, 3, 6)))
            .unwrap_err()
            .is_limit_exceeded());

        card.add_paid_expenditure(exp(dollars(100), date(2024, 3, 6)))
            .unwrap();
        assert_eq!(card.paid().len(), 1);
        // Paid entries do not count against the limit
        assert_eq!(card.remaining_limit(march()), dollars(100));
    }

    #[test]
    fn test_edit_credits_back_existing_amount() {
        let mut card = card(500);
        card.add_expenditure(exp(dollars(300), date(2024, 3, 1))).unwrap();
        card.add_expenditure(exp(dollars(100), date(2024, 3, 5))).unwrap();
        assert_eq!(card.remaining_limit(march()), dollars(100));

        let edited = card
            .edit_expenditure(1, &TransactionEdit::new().amount(dollars(150)))
            .unwrap();
        assert_eq!(edited.amount, dollars(150));
        assert_eq!(card.remaining_limit(march()), dollars(50));
        assert_invariant(&card);
    }

    #[test]
    fn test_edit_over_allowance_is_refused() {
        let mut card = card(500);
        card.add_expenditure(exp(dollars(300), date(2024, 3, 1))).unwrap();
        card.add_expenditure(exp(dollars(100), date(2024, 3, 5))).unwrap();
        let before = card.clone();

        let err = card
            .edit_expenditure(1, &TransactionEdit::new().amount(dollars(201)))
            .unwrap_err();
        assert!(matches!(
            err,
            WalletError::LimitExceeded { remaining, .. } if remaining == dollars(200)
        ));
        assert_eq!(card, before);
    }

    #[test]
    fn test_edit_changes_month_total_by_difference() {
        let mut card = card(1000);
        card.add_expenditure(exp(dollars(120), date(2024, 3, 2))).unwrap();
        card.add_expenditure(exp(dollars(80), date(2024, 3, 9))).unwrap();
        let before = card.unpaid_bill_amount(march());

        card.edit_expenditure(2, &TransactionEdit::new().amount(dollars(45)))
            .unwrap();
        assert_eq!(card.unpaid_bill_amount(march()) - before, dollars(45) - dollars(120));
    }

    #[test]
    fn test_edit_moving_into_full_month_is_refused() {
        let mut card = card(500);
        card.add_expenditure(exp(dollars(450), date(2024, 4, 1))).unwrap();
        card.add_expenditure(exp(dollars(100), date(2024, 3, 5))).unwrap();

        // Moving $100 into April would put April at $550
        let result = card.edit_expenditure(1, &TransactionEdit::new().date(date(2024, 4, 20)));
        assert!(result.unwrap_err().is_limit_exceeded());

        card.edit_expenditure(
            1,
            &TransactionEdit::new()
                .date(date(2024, 4, 20))
                .amount(dollars(50)),
        )
        .unwrap();
        assert_eq!(card.unpaid_bill_amount(YearMonth::new(2024, 4).unwrap()), dollars(500));
        assert_invariant(&card);
    }

    #[test]
    fn test_date_only_edit_within_a_full_month_is_allowed() {
        let mut card = card(100);
        card.add_expenditure(exp(dollars(100), date(2024, 3, 5))).unwrap();

        let edited = card
            .edit_expenditure(1, &TransactionEdit::new().date(date(2024, 3, 28)))
            .unwrap();
        assert_eq!(edited.date, date(2024, 3, 28));
        assert_eq!(card.remaining_limit(march()), Money::zero());
        assert_invariant(&card);
    }

    #[test]
    fn test_edit_without_amount_or_date_skips_limit() {
        let mut card = card(100);
        card.add_expenditure(exp(dollars(100), date(2024, 3, 5))).unwrap();
        let edited = card
            .edit_expenditure(1, &TransactionEdit::new().description("Gift"))
            .unwrap();
        assert_eq!(edited.description, "Gift");
    }

    #[test]
    fn test_edit_invalid_index() {
        let mut card = card(100);
        assert!(matches!(
            card.edit_expenditure(1, &TransactionEdit::new().amount(dollars(1))),
            Err(WalletError::InvalidIndex { .. })
        ));
    }

    #[test]
    fn test_delete_frees_limit() {
        let mut card = card(500);
        card.add_expenditure(exp(dollars(300), date(2024, 3, 5))).unwrap();
        let removed = card.delete_expenditure(1).unwrap();
        assert_eq!(removed.amount, dollars(300));
        assert_eq!(card.remaining_limit(march()), dollars(500));
        assert!(card.is_unpaid_empty());
        assert!(matches!(
            card.delete_expenditure(1),
            Err(WalletError::InvalidIndex { .. })
        ));
    }

    #[test]
    fn test_transfer_moves_only_target_month() {
        let mut card = card(500);
        card.add_expenditure(exp(dollars(80), date(2024, 3, 1))).unwrap();
        card.add_expenditure(exp(dollars(20), date(2024, 4, 1))).unwrap();
        let march_entry = card.unpaid().get(2).unwrap().clone();

        let moved = card.transfer_unpaid_to_paid(march()).unwrap();
        assert_eq!(moved, 1);
        assert_eq!(card.paid_bill_amount(march()), dollars(80));
        assert_eq!(card.unpaid_bill_amount(march()), Money::zero());
        assert_eq!(card.unpaid().len(), 1);
        assert_eq!(card.unpaid().get(1).unwrap().date, date(2024, 4, 1));
        assert_eq!(card.paid().get(1).unwrap(), &march_entry);
    }

    #[test]
    fn test_transfer_is_a_move_for_many_entries() {
        let mut card = card(10_000);
        for day in 1..=6 {
            card.add_expenditure(exp(dollars(10), date(2024, 3, day))).unwrap();
            card.add_expenditure(exp(dollars(5), date(2024, 5, day))).unwrap();
        }
        let total_before = card.unpaid().len() + card.paid().len();
        let march_ids: Vec<_> = card
            .unpaid()
            .iter()
            .filter(|t| march().contains(t.date))
            .map(|t| t.id)
            .collect();

        assert_eq!(card.transfer_unpaid_to_paid(march()).unwrap(), 6);

        assert_eq!(card.unpaid().len() + card.paid().len(), total_before);
        for id in march_ids {
            assert!(card.unpaid().iter().all(|t| t.id != id));
            assert!(card.paid().iter().any(|t| t.id == id));
        }
        assert_eq!(card.unpaid().find_index_by_year_month(march()), None);
    }

    #[test]
    fn test_transfer_with_no_match_is_noop() {
        let mut card = card(500);
        card.add_expenditure(exp(dollars(20), date(2024, 4, 1))).unwrap();
        let before = card.clone();

        assert_eq!(card.transfer_unpaid_to_paid(march()).unwrap(), 0);
        assert_eq!(card, before);
    }

    #[test]
    fn test_transfer_from_empty_ledger_fails() {
        let mut card = card(500);
        assert!(matches!(
            card.transfer_unpaid_to_paid(march()),
            Err(WalletError::EmptyLedger(_))
        ));
        assert!(matches!(
            card.transfer_paid_to_unpaid(march()),
            Err(WalletError::EmptyLedger(_))
        ));
    }

    #[test]
    fn test_reverse_transfer_bypasses_limit() {
        let mut card = card(500);
        card.add_expenditure(exp(dollars(400), date(2024, 3, 1))).unwrap();
        card.transfer_unpaid_to_paid(march()).unwrap();
        card.add_expenditure(exp(dollars(300), date(2024, 3, 2))).unwrap();

        assert_eq!(card.transfer_paid_to_unpaid(march()).unwrap(), 1);
        assert_eq!(card.unpaid_bill_amount(march()), dollars(700));
        assert!(card.paid().is_empty());
    }

    #[test]
    fn test_list_empty_names_the_card() {
        let card = card(500);
        match card.list_unpaid(0) {
            Err(WalletError::EmptyLedger(label)) => assert!(label.contains("Visa")),
            other => panic!("expected EmptyLedger, got {:?}", other.map(|e| e.count())),
        }
    }

    #[test]
    fn test_find_unpaid_validates_range() {
        let card = card(500);
        let query = TransactionQuery::new()
            .from(date(2024, 5, 1))
            .to(date(2024, 4, 1));
        assert!(card.find_unpaid(&query).is_err());
    }

    #[test]
    fn test_rebate() {
        let rate = RebateRate::parse_percent("1.5").unwrap();
        assert_eq!(rate.basis_points(), 150);
        assert_eq!(rate.to_string(), "1.50%");
        assert!(RebateRate::parse_percent("20.01").is_err());
        assert!(RebateRate::parse_percent("-1").is_err());

        let card = Card::new("Visa", dollars(500), rate);
        assert_eq!(card.rebate_for(dollars(200)), dollars(3));
    }

    #[test]
    fn test_validation() {
        let mut card = card(500);
        assert!(card.validate().is_ok());

        card.name = "x".repeat(31);
        assert_eq!(card.validate(), Err(CardValidationError::NameTooLong(31)));

        card.name = "Visa!".into();
        assert_eq!(card.validate(), Err(CardValidationError::NameNotAlphanumeric));

        card.name = "Visa".into();
        card.limit = Money::zero();
        assert_eq!(card.validate(), Err(CardValidationError::NonPositiveLimit));
    }

    #[test]
    fn test_serialization_round_trip() {
        let mut card = card(500);
        card.add_expenditure(exp(dollars(20), date(2024, 4, 1))).unwrap();
        let json = serde_json::to_string(&card).unwrap();
        let restored: Card = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, card);
    }
}
