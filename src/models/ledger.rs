//! Transaction ledger
//!
//! An ordered list of transactions, most recent insert first. Callers address
//! entries by 1-based display index. Monthly totals are computed by scanning
//! the live list on every query, so they are exact right after any mutation.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::iter::{Enumerate, Take};
use std::slice::Iter;
use tracing::debug;

use super::money::Money;
use super::month::YearMonth;
use super::transaction::{BillRef, Transaction, TransactionEdit, TransactionKind};
use crate::error::{WalletError, WalletResult};

/// Number of entries kept before the oldest are pruned
pub const DEFAULT_CAPACITY: usize = 500;

fn default_capacity() -> usize {
    DEFAULT_CAPACITY
}

/// Ordered transaction store for one card list or bank account
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionLedger {
    #[serde(default = "default_capacity")]
    capacity: usize,

    /// Index 0 is the most recent insert
    #[serde(default)]
    entries: Vec<Transaction>,
}

impl Default for TransactionLedger {
    fn default() -> Self {
        Self::new()
    }
}

impl TransactionLedger {
    /// Create an empty ledger with the default capacity
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Create an empty ledger that keeps at most `capacity` entries on `add`
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            entries: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Change the capacity; takes effect on the next `add`
    pub fn set_capacity(&mut self, capacity: usize) {
        self.capacity = capacity.max(1);
    }

    /// All entries in display order
    pub fn iter(&self) -> Iter<'_, Transaction> {
        self.entries.iter()
    }

    /// Insert a new entry at the front, dropping the oldest entry when the
    /// ledger grows past its capacity. Performs no limit checks.
    pub fn add(&mut self, transaction: Transaction) {
        self.entries.insert(0, transaction);
        while self.entries.len() > self.capacity {
            if let Some(dropped) = self.entries.pop() {
                debug!(id = %dropped.id, capacity = self.capacity, "pruned oldest ledger entry");
            }
        }
    }

    /// Insert an entry moved from another ledger. Never prunes, so a move
    /// cannot lose a transaction.
    pub(crate) fn receive(&mut self, transaction: Transaction) {
        self.entries.insert(0, transaction);
    }

    /// Sum of amounts dated within `month`, zero when nothing matches
    pub fn month_amount_spent(&self, month: YearMonth) -> Money {
        self.entries
            .iter()
            .filter(|t| month.contains(t.date))
            .map(|t| t.amount)
            .sum()
    }

    /// Entries for display, most recent first, at most `display_count`
    /// of them (`0` lists everything)
    pub fn list(&self, display_count: usize) -> WalletResult<Entries<'_>> {
        if self.entries.is_empty() {
            return Err(WalletError::EmptyLedger("this list".into()));
        }

        let count = if display_count == 0 {
            self.entries.len()
        } else {
            display_count
        };

        Ok(Entries {
            inner: self.entries.iter().enumerate().take(count),
        })
    }

    /// Entry at a 1-based index
    pub fn get(&self, index: usize) -> WalletResult<&Transaction> {
        let slot = self.slot(index)?;
        Ok(&self.entries[slot])
    }

    pub fn amount_at(&self, index: usize) -> WalletResult<Money> {
        self.get(index).map(|t| t.amount)
    }

    pub fn date_at(&self, index: usize) -> WalletResult<NaiveDate> {
        self.get(index).map(|t| t.date)
    }

    /// Apply `edit` to the entry at `index`. The entry is replaced only if the
    /// edited copy still validates.
    pub fn edit_by_index(
        &mut self,
        index: usize,
        edit: &TransactionEdit,
    ) -> WalletResult<&Transaction> {
        let slot = self.slot(index)?;

        let mut edited = self.entries[slot].clone();
        edited.apply(edit);
        edited
            .validate()
            .map_err(|e| WalletError::Validation(e.to_string()))?;

        self.entries[slot] = edited;
        Ok(&self.entries[slot])
    }

    /// Remove the entry at `index`; later entries shift down by one
    pub fn delete_by_index(&mut self, index: usize) -> WalletResult<Transaction> {
        let slot = self.slot(index)?;
        Ok(self.entries.remove(slot))
    }

    /// Entries matching every filter set on `query`
    pub fn find_matching(&self, query: &TransactionQuery) -> Matches<'_> {
        Matches {
            inner: self.entries.iter().enumerate(),
            query: query.clone(),
        }
    }

    /// First index whose date falls in `month`
    pub fn find_index_by_year_month(&self, month: YearMonth) -> Option<usize> {
        self.entries
            .iter()
            .position(|t| month.contains(t.date))
            .map(|slot| slot + 1)
    }

    /// First index of a `kind` entry tagged with `bill`
    pub fn position_of_bill(&self, bill: BillRef, kind: TransactionKind) -> Option<usize> {
        self.entries
            .iter()
            .position(|t| t.kind == kind && t.bill == Some(bill))
            .map(|slot| slot + 1)
    }

    /// Sum of the `kind` entries tagged with `bill`
    pub fn bill_total(&self, bill: BillRef, kind: TransactionKind) -> Money {
        self.entries
            .iter()
            .filter(|t| t.kind == kind && t.bill == Some(bill))
            .map(|t| t.amount)
            .sum()
    }

    fn slot(&self, index: usize) -> WalletResult<usize> {
        if index == 0 || index > self.entries.len() {
            return Err(WalletError::InvalidIndex {
                index,
                len: self.entries.len(),
            });
        }
        Ok(index - 1)
    }
}

/// Lazy listing of `(index, transaction)` pairs; clone it to restart
#[derive(Debug, Clone)]
pub struct Entries<'a> {
    inner: Take<Enumerate<Iter<'a, Transaction>>>,
}

impl<'a> Iterator for Entries<'a> {
    type Item = (usize, &'a Transaction);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(slot, t)| (slot + 1, t))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

/// Lazy search results as `(index, transaction)` pairs
#[derive(Debug, Clone)]
pub struct Matches<'a> {
    inner: Enumerate<Iter<'a, Transaction>>,
    query: TransactionQuery,
}

impl<'a> Iterator for Matches<'a> {
    type Item = (usize, &'a Transaction);

    fn next(&mut self) -> Option<Self::Item> {
        let query = &self.query;
        self.inner
            .by_ref()
            .find(|(_, t)| query.matches(t))
            .map(|(slot, t)| (slot + 1, t))
    }
}

/// Search filters; an unset filter matches everything
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransactionQuery {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    description: Option<String>,
    category: Option<String>,
}

impl TransactionQuery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Only entries dated on or after `from`
    pub fn from(mut self, from: NaiveDate) -> Self {
        self.from = Some(from);
        self
    }

    /// Only entries dated on or before `to`
    pub fn to(mut self, to: NaiveDate) -> Self {
        self.to = Some(to);
        self
    }

    /// Only entries whose description contains `keyword`, ignoring case
    pub fn description(mut self, keyword: &str) -> Self {
        self.description = normalize_keyword(keyword);
        self
    }

    /// Only entries whose category contains `keyword`, ignoring case
    pub fn category(mut self, keyword: &str) -> Self {
        self.category = normalize_keyword(keyword);
        self
    }

    /// Reject an inverted date range
    pub fn validate(&self) -> WalletResult<()> {
        if let (Some(from), Some(to)) = (self.from, self.to) {
            if from > to {
                return Err(WalletError::Validation(format!(
                    "Start date {} is after end date {}",
                    from, to
                )));
            }
        }
        Ok(())
    }

    pub fn matches(&self, txn: &Transaction) -> bool {
        if self.from.is_some_and(|from| txn.date < from) {
            return false;
        }
        if self.to.is_some_and(|to| txn.date > to) {
            return false;
        }
        if let Some(keyword) = &self.description {
            if !txn.description.to_lowercase().contains(keyword) {
                return false;
            }
        }
        if let Some(keyword) = &self.category {
            if !txn.category.to_lowercase().contains(keyword) {
                return false;
            }
        }
        true
    }
}

fn normalize_keyword(keyword: &str) -> Option<String> {
    let keyword = keyword.trim();
    (!keyword.is_empty()).then(|| keyword.to_lowercase())
}
