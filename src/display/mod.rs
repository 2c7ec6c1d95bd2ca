//! Display formatting for terminal output
//!
//! Plain-text tables and detail views. Amounts and dates follow the
//! currency symbol and date format in the user's settings.

pub mod bank;
pub mod card;
pub mod goal;
pub mod transaction;

pub use bank::{format_bank_details, format_bank_list, format_recurring_list};
pub use card::{format_bill_payment, format_card_details, format_card_list};
pub use goal::format_goal_list;
pub use transaction::{format_transaction_details, format_transaction_list};
