//! Goal CLI commands

use chrono::NaiveDate;
use clap::{ArgGroup, Subcommand};

use crate::config::Settings;
use crate::display::format_goal_list;
use crate::error::{WalletError, WalletResult};
use crate::services::{EditGoalInput, GoalService};
use crate::storage::Storage;
use crate::validation;

/// Goal subcommands
#[derive(Subcommand)]
pub enum GoalCommands {
    /// Set a savings goal
    #[command(group(ArgGroup::new("deadline").required(true).args(["by", "days"])))]
    Add {
        /// Goal name
        name: String,
        /// Amount to save
        #[arg(short, long)]
        target: String,
        /// Deadline date (YYYY-MM-DD or DD/MM/YYYY)
        #[arg(long)]
        by: Option<String>,
        /// Deadline as a number of days from today (1 to 365)
        #[arg(long = "in")]
        days: Option<u32>,
        /// Saving account whose balance counts towards the goal
        #[arg(short, long)]
        saving: Option<String>,
    },
    /// List goals with their progress
    List,
    /// Change a goal
    #[command(group(ArgGroup::new("deadline").args(["by", "days"])))]
    Edit {
        /// Goal name
        goal: String,
        /// New name
        #[arg(short, long)]
        name: Option<String>,
        /// New target amount
        #[arg(short, long)]
        target: Option<String>,
        /// New deadline date
        #[arg(long)]
        by: Option<String>,
        /// New deadline in days from today
        #[arg(long = "in")]
        days: Option<u32>,
        /// New saving account
        #[arg(short, long)]
        saving: Option<String>,
    },
    /// Delete a goal
    Delete {
        /// Goal name
        goal: String,
    },
}

/// Handle a goal command
pub fn handle_goal_command(
    storage: &Storage,
    settings: &Settings,
    cmd: GoalCommands,
) -> WalletResult<()> {
    let service = GoalService::new(storage);
    let today = validation::today();

    match cmd {
        GoalCommands::Add {
            name,
            target,
            by,
            days,
            saving,
        } => {
            let name = validation::check_name("Goal name", &name)?;
            let target = validation::parse_positive_amount("Target", &target)?;
            let deadline = parse_deadline(by.as_deref(), days, today)?.ok_or_else(|| {
                WalletError::Validation("Give a deadline with --by or --in".into())
            })?;

            let goal = service.create(&name, target, deadline, saving.as_deref(), today)?;
            println!(
                "Added goal: {} ({} by {})",
                goal.name,
                goal.target.format_with_symbol(&settings.currency_symbol),
                goal.deadline.format(&settings.date_format)
            );
        }

        GoalCommands::List => {
            let goals = service.list(today)?;
            print!("{}", format_goal_list(&goals, settings));
        }

        GoalCommands::Edit {
            goal,
            name,
            target,
            by,
            days,
            saving,
        } => {
            let input = EditGoalInput {
                name: name
                    .map(|n| validation::check_name("Goal name", &n))
                    .transpose()?,
                target: target
                    .map(|t| validation::parse_positive_amount("Target", &t))
                    .transpose()?,
                deadline: parse_deadline(by.as_deref(), days, today)?,
                saving,
            };

            let updated = service.edit(&goal, input, today)?;
            println!("Updated goal: {}", updated.name);
        }

        GoalCommands::Delete { goal } => {
            let deleted = service.delete(&goal)?;
            println!("Deleted goal: {}", deleted.name);
        }
    }

    Ok(())
}

/// Resolve `--by` or `--in` into a deadline date
fn parse_deadline(
    by: Option<&str>,
    days: Option<u32>,
    today: NaiveDate,
) -> WalletResult<Option<NaiveDate>> {
    match (by, days) {
        (Some(date), _) => validation::parse_date(date).map(Some),
        (None, Some(days)) => validation::deadline_in_days(days, today).map(Some),
        (None, None) => Ok(None),
    }
}
