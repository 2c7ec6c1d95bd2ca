//! Goal service
//!
//! Goals track a saving account's balance against a target and deadline.

use chrono::NaiveDate;
use tracing::info;

use crate::audit::EntityType;
use crate::error::{WalletError, WalletResult};
use crate::models::{BankKind, Goal, GoalStatus, Money, MAX_GOALS};
use crate::storage::Storage;

/// Service for goal management
pub struct GoalService<'a> {
    storage: &'a Storage,
}

/// Changes to a goal; `None` leaves a field as is
#[derive(Debug, Clone, Default)]
pub struct EditGoalInput {
    pub name: Option<String>,
    pub target: Option<Money>,
    pub deadline: Option<NaiveDate>,
    pub saving: Option<String>,
}

impl EditGoalInput {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.target.is_none() && self.deadline.is_none() && self.saving.is_none()
    }
}

/// A goal with its current status
#[derive(Debug, Clone)]
pub struct GoalProgress {
    pub goal: Goal,
    /// Balance of the linked saving account, if any
    pub saved: Option<Money>,
    pub status: GoalStatus,
}

impl<'a> GoalService<'a> {
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    /// Add a goal, optionally tracking a saving account
    pub fn create(
        &self,
        name: &str,
        target: Money,
        deadline: NaiveDate,
        saving: Option<&str>,
        today: NaiveDate,
    ) -> WalletResult<Goal> {
        let name = name.trim();
        if self.storage.goals.count()? >= MAX_GOALS {
            return Err(WalletError::Validation(format!(
                "You've reached the limit of {} goals!",
                MAX_GOALS
            )));
        }
        if self.storage.goals.name_exists(name)? {
            return Err(WalletError::Duplicate {
                entity_type: "Goal",
                identifier: name.to_string(),
            });
        }
        check_deadline(deadline, today)?;

        let saving = saving.map(|s| self.saving_account_name(s)).transpose()?;
        let goal = Goal::new(name, target, deadline, saving);
        if self.progress(goal.clone(), today)?.status.is_achieved() {
            return Err(WalletError::Validation(
                "You cannot add a goal that is already achieved!".into(),
            ));
        }

        self.storage.goals.insert(goal.clone())?;
        self.storage.goals.save()?;

        self.storage.log_create(
            EntityType::Goal,
            goal.id.to_string(),
            Some(goal.name.clone()),
            &goal,
        )?;

        info!(goal = %goal.name, target = %goal.target, deadline = %goal.deadline, "goal created");
        Ok(goal)
    }

    /// Change a goal's name, target, deadline or linked account
    pub fn edit(&self, name: &str, input: EditGoalInput, today: NaiveDate) -> WalletResult<Goal> {
        if input.is_empty() {
            return Err(WalletError::Validation(
                "Edit should have at least 1 differing parameter to change".into(),
            ));
        }

        let before = self
            .storage
            .goals
            .get_by_name(name)?
            .ok_or_else(|| WalletError::goal_not_found(name))?;
        let mut goal = before.clone();

        if let Some(new_name) = &input.name {
            let new_name = new_name.trim();
            if !new_name.eq_ignore_ascii_case(&goal.name) && self.storage.goals.name_exists(new_name)? {
                return Err(WalletError::Duplicate {
                    entity_type: "Goal",
                    identifier: new_name.to_string(),
                });
            }
            goal.name = new_name.to_string();
        }
        if let Some(target) = input.target {
            goal.target = target;
        }
        if let Some(deadline) = input.deadline {
            check_deadline(deadline, today)?;
            goal.deadline = deadline;
        }
        if let Some(saving) = &input.saving {
            goal.saving = Some(self.saving_account_name(saving)?);
        }
        goal.touch();

        self.storage.goals.replace(&before.name, goal.clone())?;
        self.storage.goals.save()?;

        self.storage.log_update(
            EntityType::Goal,
            goal.id.to_string(),
            Some(goal.name.clone()),
            &before,
            &goal,
            None,
        )?;

        Ok(goal)
    }

    pub fn delete(&self, name: &str) -> WalletResult<Goal> {
        if self.storage.goals.count()? == 0 {
            return Err(WalletError::NotFound {
                entity_type: "Goal",
                identifier: format!("{} (there are no goals set)", name.trim()),
            });
        }

        let goal = self.storage.goals.delete(name)?;
        self.storage.goals.save()?;

        self.storage.log_delete(
            EntityType::Goal,
            goal.id.to_string(),
            Some(goal.name.clone()),
            &goal,
        )?;

        info!(goal = %goal.name, "goal deleted");
        Ok(goal)
    }

    /// Every goal with its status as of `today`
    pub fn list(&self, today: NaiveDate) -> WalletResult<Vec<GoalProgress>> {
        self.storage
            .goals
            .get_all()?
            .into_iter()
            .map(|goal| self.progress(goal, today))
            .collect()
    }

    /// Status of one goal as of `today`
    pub fn status(&self, name: &str, today: NaiveDate) -> WalletResult<GoalStatus> {
        let goal = self
            .storage
            .goals
            .get_by_name(name)?
            .ok_or_else(|| WalletError::goal_not_found(name))?;
        Ok(self.progress(goal, today)?.status)
    }

    fn progress(&self, goal: Goal, today: NaiveDate) -> WalletResult<GoalProgress> {
        let saved = match &goal.saving {
            Some(account) => self.storage.banks.get_by_name(account)?.map(|b| b.balance()),
            None => None,
        };
        let status = goal.status(saved, today);
        Ok(GoalProgress {
            goal,
            saved,
            status,
        })
    }

    /// Resolve a saving account by name, returning its stored spelling
    fn saving_account_name(&self, name: &str) -> WalletResult<String> {
        let bank = self
            .storage
            .banks
            .get_by_name(name)?
            .ok_or_else(|| WalletError::bank_not_found(name))?;
        if bank.kind != BankKind::Saving {
            return Err(WalletError::Validation(format!(
                "Goals can only track saving accounts, '{}' is {}",
                bank.name, bank.kind
            )));
        }
        Ok(bank.name)
    }
}

fn check_deadline(deadline: NaiveDate, today: NaiveDate) -> WalletResult<()> {
    if deadline < today {
        return Err(WalletError::Validation(format!(
            "Deadline {} has already passed",
            deadline
        )));
    }
    Ok(())
}
