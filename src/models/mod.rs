//! Core data models for walletbook
//!
//! Cards with their unpaid and paid ledgers, bank accounts with their
//! recurring expenditures, goals, and the transaction types they hold.

pub mod bank;
pub mod card;
pub mod goal;
pub mod ids;
pub mod ledger;
pub mod money;
pub mod month;
pub mod recurring;
pub mod transaction;

pub use bank::{BankAccount, BankKind};
pub use card::{Card, CardValidationError, RebateRate};
pub use goal::{Goal, GoalStatus, MAX_GOALS};
pub use ids::{BankId, CardId, GoalId, TransactionId};
pub use ledger::{Entries, Matches, TransactionLedger, TransactionQuery};
pub use money::{Money, MoneyParseError};
pub use month::{MonthParseError, YearMonth};
pub use recurring::{RecurringExpenditure, MAX_RECURRING};
pub use transaction::{BillRef, Transaction, TransactionEdit, TransactionKind};
