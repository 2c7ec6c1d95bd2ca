//! Service layer for walletbook
//!
//! Services validate commands against the stored state, apply them through
//! the repositories, persist the touched collection and write audit entries.

pub mod bank;
pub mod card;
pub mod goal;

pub use bank::BankService;
pub use card::{BillPayment, CardService, EditCardInput};
pub use goal::{EditGoalInput, GoalProgress, GoalService};
