//! Bank account service

use chrono::NaiveDate;
use tracing::{info, warn};

use crate::audit::EntityType;
use crate::error::{WalletError, WalletResult};
use crate::models::{
    BankAccount, BankKind, Money, RecurringExpenditure, Transaction, TransactionEdit,
};
use crate::storage::Storage;

/// Service for bank account management
pub struct BankService<'a> {
    storage: &'a Storage,
}

impl<'a> BankService<'a> {
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    /// Open a new account with an opening balance
    pub fn create(
        &self,
        name: &str,
        kind: BankKind,
        balance: Money,
        income: Money,
    ) -> WalletResult<BankAccount> {
        let name = name.trim();
        if self.storage.banks.name_exists(name)? {
            return Err(WalletError::Duplicate {
                entity_type: "Bank account",
                identifier: name.to_string(),
            });
        }

        let mut bank = BankAccount::new(name, kind, balance).with_income(income);
        bank.set_ledger_capacity(self.storage.ledger_capacity());
        bank.validate().map_err(WalletError::Validation)?;

        self.storage.banks.insert(bank.clone())?;
        self.storage.banks.save()?;

        self.storage.log_create(
            EntityType::BankAccount,
            bank.id.to_string(),
            Some(bank.name.clone()),
            &bank,
        )?;

        info!(bank = %bank.name, kind = %bank.kind, balance = %bank.balance(), "bank account created");
        Ok(bank)
    }

    pub fn get(&self, name: &str) -> WalletResult<BankAccount> {
        self.storage
            .banks
            .get_by_name(name)?
            .ok_or_else(|| WalletError::bank_not_found(name))
    }

    pub fn list(&self) -> WalletResult<Vec<BankAccount>> {
        self.storage.banks.get_all()
    }

    /// Close an account; refused while a goal tracks it
    pub fn delete(&self, name: &str) -> WalletResult<BankAccount> {
        let linked = self
            .storage
            .goals
            .get_all()?
            .into_iter()
            .filter(|g| {
                g.saving
                    .as_deref()
                    .is_some_and(|s| s.eq_ignore_ascii_case(name.trim()))
            })
            .map(|g| g.name)
            .collect::<Vec<_>>();
        if !linked.is_empty() {
            return Err(WalletError::Validation(format!(
                "Bank account '{}' is tracked by goal(s): {}",
                name.trim(),
                linked.join(", ")
            )));
        }

        let bank = self.storage.banks.delete(name)?;
        self.storage.banks.save()?;

        self.storage.log_delete(
            EntityType::BankAccount,
            bank.id.to_string(),
            Some(bank.name.clone()),
            &bank,
        )?;

        info!(bank = %bank.name, "bank account deleted");
        Ok(bank)
    }

    pub fn deposit(&self, name: &str, txn: Transaction) -> WalletResult<BankAccount> {
        let summary = format!("deposit '{}' {}", txn.description, txn.amount);
        self.update(name, summary, |bank| bank.deposit(txn))
            .map(|(bank, ())| bank)
    }

    pub fn spend(&self, name: &str, txn: Transaction) -> WalletResult<BankAccount> {
        let summary = format!("expenditure '{}' {}", txn.description, txn.amount);
        self.update(name, summary, |bank| bank.spend(txn))
            .map(|(bank, ())| bank)
    }

    pub fn edit_transaction(
        &self,
        name: &str,
        index: usize,
        edit: &TransactionEdit,
    ) -> WalletResult<Transaction> {
        if edit.is_empty() {
            return Err(WalletError::Validation(
                "Nothing to change: give a new description, amount, date or category".into(),
            ));
        }
        let summary = format!("edited transaction #{}", index);
        self.update(name, summary, |bank| bank.edit_transaction(index, edit))
            .map(|(_, txn)| txn)
    }

    pub fn delete_transaction(&self, name: &str, index: usize) -> WalletResult<Transaction> {
        let summary = format!("deleted transaction #{}", index);
        self.update(name, summary, |bank| bank.delete_transaction(index))
            .map(|(_, txn)| txn)
    }

    /// Schedule a monthly expenditure on a saving account
    pub fn add_recurring(
        &self,
        name: &str,
        item: RecurringExpenditure,
    ) -> WalletResult<RecurringExpenditure> {
        let summary = format!("added recurring '{}' {}", item.description, item.amount);
        let added = item.clone();
        self.update(name, summary, |bank| bank.add_recurring(item))?;
        Ok(added)
    }

    pub fn edit_recurring(
        &self,
        name: &str,
        index: usize,
        edit: &TransactionEdit,
    ) -> WalletResult<RecurringExpenditure> {
        if edit.is_empty() {
            return Err(WalletError::Validation(
                "Nothing to change: give a new description, amount or category".into(),
            ));
        }
        let summary = format!("edited recurring #{}", index);
        self.update(name, summary, |bank| bank.edit_recurring(index, edit))
            .map(|(_, item)| item)
    }

    pub fn delete_recurring(&self, name: &str, index: usize) -> WalletResult<RecurringExpenditure> {
        let summary = format!("deleted recurring #{}", index);
        self.update(name, summary, |bank| bank.delete_recurring(index))
            .map(|(_, item)| item)
    }

    /// Post the recurring expenditures due by `today` on every account
    ///
    /// Only accounts with something to post are saved and audited. Returns
    /// the number of expenditures posted.
    pub fn apply_recurring(&self, today: NaiveDate) -> WalletResult<usize> {
        let mut total = 0;
        for bank in self.storage.banks.get_all()? {
            if bank.recurring().is_empty() || bank.clone().post_due_recurring(today).is_empty() {
                continue;
            }

            let summary = format!("posted recurring expenditures due by {}", today);
            let (bank, posted) =
                self.update(&bank.name, summary, |bank| Ok(bank.post_due_recurring(today)))?;
            info!(bank = %bank.name, count = posted.len(), "recurring expenditures posted");
            total += posted.len();
        }

        let pending = self
            .storage
            .banks
            .get_all()?
            .iter()
            .flat_map(|b| b.recurring())
            .filter(|r| r.next_due().is_some_and(|due| due <= today))
            .count();
        if pending > 0 {
            warn!(pending, "recurring expenditures left unpaid for lack of funds");
        }

        Ok(total)
    }

    fn update<R>(
        &self,
        name: &str,
        summary: String,
        f: impl FnOnce(&mut BankAccount) -> WalletResult<R>,
    ) -> WalletResult<(BankAccount, R)> {
        let (before, after, result) = self.storage.banks.update(name, |bank| {
            let before = bank.clone();
            let result = f(bank)?;
            Ok((before, bank.clone(), result))
        })?;
        self.storage.banks.save()?;

        self.storage.log_update(
            EntityType::BankAccount,
            after.id.to_string(),
            Some(after.name.clone()),
            &before,
            &after,
            Some(summary),
        )?;

        Ok((after, result))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::WalletPaths;
    use crate::models::Goal;
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn create_test_storage() -> (TempDir, Storage) {
        let temp_dir = TempDir::new().unwrap();
        let paths = WalletPaths::with_base_dir(temp_dir.path().to_path_buf());
        let storage = Storage::new(paths).unwrap();
        storage.load_all().unwrap();
        (temp_dir, storage)
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()
    }

    fn dollars(d: i64) -> Money {
        Money::from_dollars_cents(d, 0)
    }

    #[test]
    fn test_create_and_duplicate() {
        let (_temp_dir, storage) = create_test_storage();
        let service = BankService::new(&storage);

        let bank = service
            .create("DBS", BankKind::Saving, dollars(100), dollars(3_000))
            .unwrap();
        assert_eq!(bank.monthly_income, dollars(3_000));

        assert!(matches!(
            service.create("dbs", BankKind::Saving, dollars(1), Money::zero()),
            Err(WalletError::Duplicate { .. })
        ));
        assert!(service
            .create("Broker", BankKind::Investment, dollars(1), dollars(1))
            .unwrap_err()
            .is_validation());
    }

    #[test]
    fn test_transactions_move_balance() {
        let (_temp_dir, storage) = create_test_storage();
        let service = BankService::new(&storage);
        service
            .create("DBS", BankKind::Saving, dollars(100), Money::zero())
            .unwrap();

        service
            .deposit("DBS", Transaction::deposit(dollars(50), date(), "Salary", "Income"))
            .unwrap();
        let bank = service
            .spend("DBS", Transaction::expenditure(dollars(30), date(), "Food", "Food"))
            .unwrap();
        assert_eq!(bank.balance(), dollars(120));

        let err = service
            .spend("DBS", Transaction::expenditure(dollars(500), date(), "TV", "Home"))
            .unwrap_err();
        assert!(matches!(err, WalletError::InsufficientFunds { .. }));

        service.delete_transaction("DBS", 1).unwrap();
        assert_eq!(service.get("DBS").unwrap().balance(), dollars(150));

        let entries = storage.audit().read_all().unwrap();
        assert_eq!(entries.len(), 4);
    }

    #[test]
    fn test_recurring_lifecycle_is_audited() {
        let (_temp_dir, storage) = create_test_storage();
        let service = BankService::new(&storage);
        service
            .create("DBS", BankKind::Saving, dollars(100), Money::zero())
            .unwrap();

        service
            .add_recurring("DBS", RecurringExpenditure::new(dollars(15), date(), "Netflix", "Fun"))
            .unwrap();
        let edited = service
            .edit_recurring("dbs", 1, &TransactionEdit::new().category("Leisure"))
            .unwrap();
        assert_eq!(edited.category, "Leisure");
        assert!(service
            .edit_recurring("DBS", 1, &TransactionEdit::new())
            .unwrap_err()
            .is_validation());

        let removed = service.delete_recurring("DBS", 1).unwrap();
        assert_eq!(removed.description, "Netflix");
        assert!(service.get("DBS").unwrap().recurring().is_empty());
        assert!(matches!(
            service.delete_recurring("DBS", 1),
            Err(WalletError::InvalidIndex { .. })
        ));

        // create, add, edit, delete
        assert_eq!(storage.audit().read_all().unwrap().len(), 4);
    }

    #[test]
    fn test_apply_recurring_posts_and_persists_once() {
        let (temp_dir, storage) = create_test_storage();
        let service = BankService::new(&storage);
        service
            .create("DBS", BankKind::Saving, dollars(100), Money::zero())
            .unwrap();
        service
            .create("Broker", BankKind::Investment, dollars(100), Money::zero())
            .unwrap();
        service
            .add_recurring("DBS", RecurringExpenditure::new(dollars(15), date(), "Netflix", "Fun"))
            .unwrap();
        let audited = storage.audit().read_all().unwrap().len();

        let today = NaiveDate::from_ymd_opt(2024, 5, 10).unwrap();
        assert_eq!(service.apply_recurring(today).unwrap(), 3);
        assert_eq!(service.apply_recurring(today).unwrap(), 0);
        assert_eq!(storage.audit().read_all().unwrap().len(), audited + 1);

        let paths = WalletPaths::with_base_dir(temp_dir.path().to_path_buf());
        let reloaded = Storage::new(paths).unwrap();
        reloaded.load_all().unwrap();
        let bank = reloaded.banks.get_by_name("DBS").unwrap().unwrap();
        assert_eq!(bank.balance(), dollars(55));
        assert_eq!(bank.ledger().len(), 3);
        assert_eq!(bank.recurring()[0].posted, 3);
    }

    #[test]
    fn test_delete_refused_while_goal_links_it() {
        let (_temp_dir, storage) = create_test_storage();
        let service = BankService::new(&storage);
        service
            .create("DBS", BankKind::Saving, dollars(100), Money::zero())
            .unwrap();
        storage
            .goals
            .insert(Goal::new(
                "Trip",
                dollars(500),
                NaiveDate::from_ymd_opt(2030, 1, 1).unwrap(),
                Some("DBS".into()),
            ))
            .unwrap();

        assert!(service.delete("DBS").unwrap_err().is_validation());
        storage.goals.delete("Trip").unwrap();
        service.delete("DBS").unwrap();
        assert!(service.get("DBS").unwrap_err().is_not_found());
    }
}
