//! Savings goal model

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::GoalId;
use super::money::Money;

/// Maximum number of goals a user can keep
pub const MAX_GOALS: usize = 20;

/// Longest deadline offset accepted by `goal add --in`
pub const MAX_DEADLINE_DAYS: u32 = 365;

/// A savings target with a deadline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Goal {
    pub id: GoalId,

    /// Goal name, unique across goals
    pub name: String,

    /// Amount to reach
    pub target: Money,

    /// Day by which the target should be reached
    pub deadline: NaiveDate,

    /// Name of the saving account whose balance counts towards the goal
    #[serde(default)]
    pub saving: Option<String>,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

impl Goal {
    pub fn new(
        name: impl Into<String>,
        target: Money,
        deadline: NaiveDate,
        saving: Option<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: GoalId::new(),
            name: name.into(),
            target,
            deadline,
            saving,
            created_at: now,
            updated_at: now,
        }
    }

    /// Progress given the linked account's balance and today's date
    ///
    /// Achievement wins over an expired deadline.
    pub fn status(&self, linked_balance: Option<Money>, today: NaiveDate) -> GoalStatus {
        let saved = linked_balance.unwrap_or_default();
        if saved >= self.target {
            GoalStatus::Achieved
        } else if today > self.deadline {
            GoalStatus::Overdue
        } else {
            GoalStatus::InProgress {
                remaining: self.target - saved,
                days_left: (self.deadline - today).num_days(),
            }
        }
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

impl fmt::Display for Goal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({} by {})", self.name, self.target, self.deadline)
    }
}

/// Where a goal stands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GoalStatus {
    Achieved,
    Overdue,
    InProgress { remaining: Money, days_left: i64 },
}

impl GoalStatus {
    pub fn is_achieved(&self) -> bool {
        matches!(self, Self::Achieved)
    }
}

impl fmt::Display for GoalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Achieved => write!(f, "Achieved"),
            Self::Overdue => write!(f, "Overdue"),
            Self::InProgress {
                remaining,
                days_left,
            } => write!(f, "{} to go, {} days left", remaining, days_left),
        }
    }
}
