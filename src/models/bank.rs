//! Bank account model
//!
//! Saving and investment accounts keep a stored balance next to their
//! transaction list. The balance may never go negative.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, warn};

use super::ids::BankId;
use super::ledger::{Entries, Matches, TransactionLedger, TransactionQuery};
use super::money::Money;
use super::recurring::{RecurringExpenditure, MAX_RECURRING};
use super::transaction::{BillRef, Transaction, TransactionEdit, TransactionKind};
use crate::error::{WalletError, WalletResult};

/// Kind of bank account
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum BankKind {
    /// Savings account; may carry a monthly income and back goals
    #[default]
    Saving,
    /// Investment account
    Investment,
}

impl BankKind {
    /// Parse a kind from user input
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "saving" | "savings" => Some(Self::Saving),
            "investment" | "invest" => Some(Self::Investment),
            _ => None,
        }
    }
}

impl fmt::Display for BankKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Saving => write!(f, "Saving"),
            Self::Investment => write!(f, "Investment"),
        }
    }
}

/// A bank account
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BankAccount {
    /// Unique identifier
    pub id: BankId,

    /// Account name, unique across bank accounts
    pub name: String,

    /// Saving or investment
    pub kind: BankKind,

    balance: Money,

    /// Monthly income, informational and only meaningful for saving accounts
    #[serde(default)]
    pub monthly_income: Money,

    ledger: TransactionLedger,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    recurring: Vec<RecurringExpenditure>,

    /// When the account was created
    pub created_at: DateTime<Utc>,

    /// When the account was last modified
    pub updated_at: DateTime<Utc>,
}

impl BankAccount {
    /// Create an account with an opening balance
    pub fn new(name: impl Into<String>, kind: BankKind, balance: Money) -> Self {
        let now = Utc::now();
        Self {
            id: BankId::new(),
            name: name.into(),
            kind,
            balance,
            monthly_income: Money::zero(),
            ledger: TransactionLedger::new(),
            recurring: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Set the monthly income
    pub fn with_income(mut self, income: Money) -> Self {
        self.monthly_income = income;
        self
    }

    pub fn balance(&self) -> Money {
        self.balance
    }

    pub fn ledger(&self) -> &TransactionLedger {
        &self.ledger
    }

    pub fn set_ledger_capacity(&mut self, capacity: usize) {
        self.ledger.set_capacity(capacity);
    }

    /// Record a deposit and raise the balance
    pub fn deposit(&mut self, txn: Transaction) -> WalletResult<()> {
        if txn.kind != TransactionKind::Deposit {
            return Err(WalletError::Validation(
                "Only deposits can be recorded as a deposit".into(),
            ));
        }
        debug!(bank = %self.name, amount = %txn.amount, "deposit");
        self.balance += txn.amount;
        self.ledger.add(txn);
        self.touch();
        Ok(())
    }

    /// Record an expenditure, refused when it exceeds the balance
    pub fn spend(&mut self, txn: Transaction) -> WalletResult<()> {
        if txn.kind != TransactionKind::Expenditure {
            return Err(WalletError::Validation(
                "Only expenditures can be spent from an account".into(),
            ));
        }
        self.ensure_covers(txn.amount)?;
        debug!(bank = %self.name, amount = %txn.amount, "spend");
        self.balance -= txn.amount;
        self.ledger.add(txn);
        self.touch();
        Ok(())
    }

    /// Edit a transaction by 1-based index, re-deriving the balance
    pub fn edit_transaction(
        &mut self,
        index: usize,
        edit: &TransactionEdit,
    ) -> WalletResult<Transaction> {
        let existing = self.ledger.get(index)?;
        let mut preview = existing.clone();
        preview.apply(edit);

        let new_balance = self.balance - existing.signed_amount() + preview.signed_amount();
        if new_balance.is_negative() {
            warn!(bank = %self.name, %new_balance, "edit refused, balance would go negative");
            return Err(self.insufficient(self.balance - new_balance));
        }

        let edited = self.ledger.edit_by_index(index, edit)?.clone();
        self.balance = new_balance;
        self.touch();
        Ok(edited)
    }

    /// Delete a transaction by 1-based index, reverting its effect on the balance
    pub fn delete_transaction(&mut self, index: usize) -> WalletResult<Transaction> {
        let existing = self.ledger.get(index)?;
        let new_balance = self.balance - existing.signed_amount();
        if new_balance.is_negative() {
            warn!(bank = %self.name, %new_balance, "delete refused, balance would go negative");
            return Err(self.insufficient(existing.amount));
        }

        let removed = self.ledger.delete_by_index(index)?;
        self.balance = new_balance;
        self.touch();
        Ok(removed)
    }

    /// Total paid towards `bill` from this account
    pub fn bill_paid(&self, bill: BillRef) -> Money {
        self.ledger.bill_total(bill, TransactionKind::Expenditure)
    }

    /// Delete every payment and rebate recorded for `bill`
    ///
    /// Returns the payments and rebates removed. Payments go first so the
    /// refund covers taking the rebates back. On error nothing is removed.
    pub fn remove_bill_entries(&mut self, bill: BillRef) -> WalletResult<(Money, Money)> {
        let mut working = self.clone();
        let mut paid = Money::zero();
        let mut rebate = Money::zero();

        while let Some(index) = working.ledger.position_of_bill(bill, TransactionKind::Expenditure) {
            paid += working.delete_transaction(index)?.amount;
        }
        while let Some(index) = working.ledger.position_of_bill(bill, TransactionKind::Deposit) {
            rebate += working.delete_transaction(index)?.amount;
        }

        *self = working;
        Ok((paid, rebate))
    }

    /// Recurring expenditures in the order they were added
    pub fn recurring(&self) -> &[RecurringExpenditure] {
        &self.recurring
    }

    /// Schedule a monthly expenditure; saving accounts only
    pub fn add_recurring(&mut self, item: RecurringExpenditure) -> WalletResult<()> {
        if self.kind != BankKind::Saving {
            return Err(WalletError::Validation(format!(
                "Recurring expenditures can only be set on a saving account, '{}' is {}",
                self.name, self.kind
            )));
        }
        if self.recurring.len() >= MAX_RECURRING {
            return Err(WalletError::Validation(format!(
                "'{}' already has the maximum of {} recurring expenditures",
                self.name, MAX_RECURRING
            )));
        }
        item.validate()
            .map_err(|e| WalletError::Validation(e.to_string()))?;

        self.recurring.push(item);
        self.touch();
        Ok(())
    }

    /// Edit a recurring expenditure by 1-based number
    pub fn edit_recurring(
        &mut self,
        index: usize,
        edit: &TransactionEdit,
    ) -> WalletResult<RecurringExpenditure> {
        let slot = self.recurring_slot(index)?;
        self.recurring[slot].apply(edit)?;
        self.touch();
        Ok(self.recurring[slot].clone())
    }

    /// Delete a recurring expenditure by 1-based number
    pub fn delete_recurring(&mut self, index: usize) -> WalletResult<RecurringExpenditure> {
        let slot = self.recurring_slot(index)?;
        let removed = self.recurring.remove(slot);
        self.touch();
        Ok(removed)
    }

    /// Post every recurring occurrence due on or before `today`, oldest first
    ///
    /// An occurrence the balance cannot cover stays pending, together with
    /// the later occurrences of the same item.
    pub fn post_due_recurring(&mut self, today: NaiveDate) -> Vec<Transaction> {
        let mut posted = Vec::new();
        let mut blocked = vec![false; self.recurring.len()];

        loop {
            let next = self
                .recurring
                .iter()
                .enumerate()
                .filter(|(slot, _)| !blocked[*slot])
                .filter_map(|(slot, item)| {
                    item.next_due()
                        .filter(|due| *due <= today)
                        .map(|due| (due, slot))
                })
                .min();
            let Some((due, slot)) = next else { break };

            let item = &mut self.recurring[slot];
            if item.amount > self.balance {
                warn!(
                    bank = %self.name,
                    recurring = %item.description,
                    %due,
                    balance = %self.balance,
                    "recurring expenditure not covered, left pending"
                );
                blocked[slot] = true;
                continue;
            }

            let txn = item.occurrence(due);
            item.posted += 1;
            debug!(bank = %self.name, recurring = %item.description, %due, "recurring expenditure posted");
            self.balance -= txn.amount;
            self.ledger.add(txn.clone());
            posted.push(txn);
        }

        if !posted.is_empty() {
            self.touch();
        }
        posted
    }

    /// Fail with `InsufficientFunds` unless the balance covers `amount`
    pub fn ensure_covers(&self, amount: Money) -> WalletResult<()> {
        if amount > self.balance {
            warn!(bank = %self.name, %amount, balance = %self.balance, "insufficient funds");
            return Err(self.insufficient(amount));
        }
        Ok(())
    }

    pub fn list(&self, display_count: usize) -> WalletResult<Entries<'_>> {
        self.ledger.list(display_count).map_err(|_| {
            WalletError::EmptyLedger(format!("bank account '{}'", self.name))
        })
    }

    pub fn find(&self, query: &TransactionQuery) -> WalletResult<Matches<'_>> {
        query.validate()?;
        Ok(self.ledger.find_matching(query))
    }

    /// Validate account attributes
    pub fn validate(&self) -> Result<(), String> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err("Bank account name cannot be empty".into());
        }
        if name.chars().count() > super::card::MAX_CARD_NAME_LEN {
            return Err(format!(
                "Bank account name too long (max {} chars)",
                super::card::MAX_CARD_NAME_LEN
            ));
        }
        if self.balance.is_negative() {
            return Err("Bank account balance cannot be negative".into());
        }
        if self.kind == BankKind::Investment && !self.monthly_income.is_zero() {
            return Err("Investment accounts do not have a monthly income".into());
        }
        Ok(())
    }

    fn recurring_slot(&self, index: usize) -> WalletResult<usize> {
        if index == 0 || index > self.recurring.len() {
            return Err(WalletError::InvalidIndex {
                index,
                len: self.recurring.len(),
            });
        }
        Ok(index - 1)
    }

    fn insufficient(&self, needed: Money) -> WalletError {
        WalletError::InsufficientFunds {
            account: self.name.clone(),
            needed,
            available: self.balance,
        }
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

impl fmt::Display for BankAccount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}) {}", self.name, self.kind, self.balance)
    }
}
