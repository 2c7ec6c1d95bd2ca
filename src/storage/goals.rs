//! Goal repository for JSON storage

use std::path::PathBuf;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::error::{WalletError, WalletResult};
use crate::models::Goal;

use super::file_io::{read_json, write_json_atomic};

#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
struct GoalData {
    goals: Vec<Goal>,
}

/// Repository for goal persistence, in creation order
pub struct GoalRepository {
    path: PathBuf,
    data: RwLock<Vec<Goal>>,
}

impl GoalRepository {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            data: RwLock::new(Vec::new()),
        }
    }

    pub fn load(&self) -> WalletResult<()> {
        let file_data: GoalData = read_json(&self.path)?;
        *self.write()? = file_data.goals;
        Ok(())
    }

    pub fn save(&self) -> WalletResult<()> {
        let file_data = GoalData {
            goals: self.read()?.clone(),
        };
        write_json_atomic(&self.path, &file_data)
    }

    pub fn get_all(&self) -> WalletResult<Vec<Goal>> {
        Ok(self.read()?.clone())
    }

    pub fn get_by_name(&self, name: &str) -> WalletResult<Option<Goal>> {
        let data = self.read()?;
        Ok(position(&data, name).map(|i| data[i].clone()))
    }

    pub fn name_exists(&self, name: &str) -> WalletResult<bool> {
        Ok(position(&self.read()?, name).is_some())
    }

    pub fn count(&self) -> WalletResult<usize> {
        Ok(self.read()?.len())
    }

    pub fn insert(&self, goal: Goal) -> WalletResult<()> {
        self.write()?.push(goal);
        Ok(())
    }

    /// Replace the named goal with `goal`
    pub fn replace(&self, name: &str, goal: Goal) -> WalletResult<()> {
        let mut data = self.write()?;
        let index = position(&data, name).ok_or_else(|| WalletError::goal_not_found(name))?;
        data[index] = goal;
        Ok(())
    }

    pub fn delete(&self, name: &str) -> WalletResult<Goal> {
        let mut data = self.write()?;
        let index = position(&data, name).ok_or_else(|| WalletError::goal_not_found(name))?;
        Ok(data.remove(index))
    }

    fn read(&self) -> WalletResult<RwLockReadGuard<'_, Vec<Goal>>> {
        self.data
            .read()
            .map_err(|e| WalletError::Storage(format!("Failed to acquire read lock: {}", e)))
    }

    fn write(&self) -> WalletResult<RwLockWriteGuard<'_, Vec<Goal>>> {
        self.data
            .write()
            .map_err(|e| WalletError::Storage(format!("Failed to acquire write lock: {}", e)))
    }
}

fn position(goals: &[Goal], name: &str) -> Option<usize> {
    let name = name.trim();
    goals.iter().position(|g| g.name.eq_ignore_ascii_case(name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Money;
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn trip() -> Goal {
        Goal::new(
            "Trip",
            Money::from_cents(100_000),
            NaiveDate::from_ymd_opt(2030, 1, 1).unwrap(),
            None,
        )
    }

    #[test]
    fn test_save_and_reload() {
        let temp_dir = TempDir::new().unwrap();
        let repo = GoalRepository::new(temp_dir.path().join("goals.json"));
        repo.insert(trip()).unwrap();
        repo.save().unwrap();

        let repo2 = GoalRepository::new(temp_dir.path().join("goals.json"));
        repo2.load().unwrap();
        assert_eq!(repo2.count().unwrap(), 1);
        assert!(repo2.name_exists("TRIP").unwrap());
    }

    #[test]
    fn test_replace_and_delete() {
        let temp_dir = TempDir::new().unwrap();
        let repo = GoalRepository::new(temp_dir.path().join("goals.json"));
        repo.insert(trip()).unwrap();

        let mut renamed = trip();
        renamed.name = "Holiday".into();
        repo.replace("trip", renamed).unwrap();
        assert!(repo.get_by_name("Trip").unwrap().is_none());

        repo.delete("Holiday").unwrap();
        assert!(repo.delete("Holiday").unwrap_err().is_not_found());
    }
}
