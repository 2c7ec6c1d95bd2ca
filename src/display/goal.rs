//! Goal display formatting

use crate::config::Settings;
use crate::models::GoalStatus;
use crate::services::GoalProgress;

/// Format goals with their progress
pub fn format_goal_list(goals: &[GoalProgress], settings: &Settings) -> String {
    if goals.is_empty() {
        return "There are no goals set!\n".to_string();
    }

    let symbol = &settings.currency_symbol;
    let mut output = String::new();

    for (i, progress) in goals.iter().enumerate() {
        let goal = &progress.goal;
        let status = match progress.status {
            GoalStatus::InProgress {
                remaining,
                days_left,
            } => format!(
                "{} to go, {} day(s) left",
                remaining.format_with_symbol(symbol),
                days_left
            ),
            other => other.to_string(),
        };

        output.push_str(&format!(
            "{}. {}  target {} by {}\n",
            i + 1,
            goal.name,
            goal.target.format_with_symbol(symbol),
            goal.deadline.format(&settings.date_format)
        ));
        match (&goal.saving, progress.saved) {
            (Some(account), Some(saved)) => output.push_str(&format!(
                "   Saving:  {} ({})\n",
                account,
                saved.format_with_symbol(symbol)
            )),
            (Some(account), None) => {
                output.push_str(&format!("   Saving:  {} (account missing)\n", account))
            }
            (None, _) => output.push_str("   Saving:  not linked\n"),
        }
        output.push_str(&format!("   Status:  {}\n", status));
    }

    output
}
