//! Bank account repository for JSON storage

use std::path::PathBuf;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::error::{WalletError, WalletResult};
use crate::models::BankAccount;

use super::file_io::{read_json, write_json_atomic};

#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
struct BankData {
    banks: Vec<BankAccount>,
}

/// Repository for bank account persistence, in creation order
pub struct BankRepository {
    path: PathBuf,
    data: RwLock<Vec<BankAccount>>,
}

impl BankRepository {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            data: RwLock::new(Vec::new()),
        }
    }

    pub fn load(&self) -> WalletResult<()> {
        let file_data: BankData = read_json(&self.path)?;
        *self.write()? = file_data.banks;
        Ok(())
    }

    pub fn save(&self) -> WalletResult<()> {
        let file_data = BankData {
            banks: self.read()?.clone(),
        };
        write_json_atomic(&self.path, &file_data)
    }

    pub fn get_all(&self) -> WalletResult<Vec<BankAccount>> {
        Ok(self.read()?.clone())
    }

    /// Get an account by name (case-insensitive)
    pub fn get_by_name(&self, name: &str) -> WalletResult<Option<BankAccount>> {
        let data = self.read()?;
        Ok(position(&data, name).map(|i| data[i].clone()))
    }

    pub fn name_exists(&self, name: &str) -> WalletResult<bool> {
        Ok(position(&self.read()?, name).is_some())
    }

    pub fn insert(&self, bank: BankAccount) -> WalletResult<()> {
        self.write()?.push(bank);
        Ok(())
    }

    /// Run `f` on a copy of the named account, committing it only on success
    pub fn update<R>(
        &self,
        name: &str,
        f: impl FnOnce(&mut BankAccount) -> WalletResult<R>,
    ) -> WalletResult<R> {
        let mut data = self.write()?;
        let index = position(&data, name).ok_or_else(|| WalletError::bank_not_found(name))?;

        let mut working = data[index].clone();
        let result = f(&mut working)?;
        data[index] = working;
        Ok(result)
    }

    pub fn delete(&self, name: &str) -> WalletResult<BankAccount> {
        let mut data = self.write()?;
        let index = position(&data, name).ok_or_else(|| WalletError::bank_not_found(name))?;
        Ok(data.remove(index))
    }

    pub fn set_ledger_capacity(&self, capacity: usize) -> WalletResult<()> {
        for bank in self.write()?.iter_mut() {
            bank.set_ledger_capacity(capacity);
        }
        Ok(())
    }

    fn read(&self) -> WalletResult<RwLockReadGuard<'_, Vec<BankAccount>>> {
        self.data
            .read()
            .map_err(|e| WalletError::Storage(format!("Failed to acquire read lock: {}", e)))
    }

    fn write(&self) -> WalletResult<RwLockWriteGuard<'_, Vec<BankAccount>>> {
        self.data
            .write()
            .map_err(|e| WalletError::Storage(format!("Failed to acquire write lock: {}", e)))
    }
}

fn position(banks: &[BankAccount], name: &str) -> Option<usize> {
    let name = name.trim();
    banks.iter().position(|b| b.name.eq_ignore_ascii_case(name))
}
