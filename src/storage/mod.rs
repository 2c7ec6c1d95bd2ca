//! Storage layer for walletbook
//!
//! One JSON file per collection, written atomically, plus the audit log.

pub mod banks;
pub mod cards;
pub mod file_io;
pub mod goals;

pub use banks::BankRepository;
pub use cards::CardRepository;
pub use file_io::{read_json, write_json_atomic};
pub use goals::GoalRepository;

use serde::Serialize;

use crate::audit::{generate_diff, AuditEntry, AuditLogger, EntityType};
use crate::config::paths::WalletPaths;
use crate::error::WalletResult;
use crate::models::ledger::DEFAULT_CAPACITY;

/// Main storage coordinator that provides access to all repositories
pub struct Storage {
    paths: WalletPaths,
    ledger_capacity: usize,
    pub cards: CardRepository,
    pub banks: BankRepository,
    pub goals: GoalRepository,
    audit: AuditLogger,
}

impl Storage {
    /// Create a new Storage instance, creating the data directories
    pub fn new(paths: WalletPaths) -> WalletResult<Self> {
        paths.ensure_directories()?;

        Ok(Self {
            cards: CardRepository::new(paths.cards_file()),
            banks: BankRepository::new(paths.banks_file()),
            goals: GoalRepository::new(paths.goals_file()),
            audit: AuditLogger::new(paths.audit_log()),
            ledger_capacity: DEFAULT_CAPACITY,
            paths,
        })
    }

    pub fn paths(&self) -> &WalletPaths {
        &self.paths
    }

    /// Capacity given to the ledgers of new cards and bank accounts
    pub fn ledger_capacity(&self) -> usize {
        self.ledger_capacity
    }

    /// Apply a ledger capacity to every loaded ledger and to future ones
    pub fn set_ledger_capacity(&mut self, capacity: usize) -> WalletResult<()> {
        self.ledger_capacity = capacity.max(1);
        self.cards.set_ledger_capacity(self.ledger_capacity)?;
        self.banks.set_ledger_capacity(self.ledger_capacity)?;
        Ok(())
    }

    /// Load all data from disk
    pub fn load_all(&self) -> WalletResult<()> {
        self.cards.load()?;
        self.banks.load()?;
        self.goals.load()?;
        Ok(())
    }

    /// Save all data to disk
    pub fn save_all(&self) -> WalletResult<()> {
        self.cards.save()?;
        self.banks.save()?;
        self.goals.save()?;
        Ok(())
    }

    pub fn audit(&self) -> &AuditLogger {
        &self.audit
    }

    /// Record the creation of an entity
    pub fn log_create<T: Serialize>(
        &self,
        entity_type: EntityType,
        entity_id: impl Into<String>,
        entity_name: Option<String>,
        entity: &T,
    ) -> WalletResult<()> {
        self.audit
            .log(&AuditEntry::create(entity_type, entity_id, entity_name, entity))
    }

    /// Record an update; the summary defaults to a diff of the snapshots
    pub fn log_update<T: Serialize>(
        &self,
        entity_type: EntityType,
        entity_id: impl Into<String>,
        entity_name: Option<String>,
        before: &T,
        after: &T,
        summary: Option<String>,
    ) -> WalletResult<()> {
        let mut entry =
            AuditEntry::update(entity_type, entity_id, entity_name, before, after, summary);
        if entry.diff_summary.is_none() {
            if let (Some(before), Some(after)) = (&entry.before, &entry.after) {
                entry.diff_summary = generate_diff(before, after);
            }
        }
        self.audit.log(&entry)
    }

    /// Record the deletion of an entity
    pub fn log_delete<T: Serialize>(
        &self,
        entity_type: EntityType,
        entity_id: impl Into<String>,
        entity_name: Option<String>,
        entity: &T,
    ) -> WalletResult<()> {
        self.audit
            .log(&AuditEntry::delete(entity_type, entity_id, entity_name, entity))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::Operation;
    use serde_json::json;
    use tempfile::TempDir;

    fn create_test_storage() -> (TempDir, Storage) {
        let temp_dir = TempDir::new().unwrap();
        let paths = WalletPaths::with_base_dir(temp_dir.path().to_path_buf());
        let storage = Storage::new(paths).unwrap();
        (temp_dir, storage)
    }

    #[test]
    fn test_storage_creation() {
        let (temp_dir, storage) = create_test_storage();
        assert!(temp_dir.path().join("data").exists());
        storage.load_all().unwrap();
        assert_eq!(storage.cards.count().unwrap(), 0);
    }

    #[test]
    fn test_save_all_writes_every_collection() {
        let (temp_dir, storage) = create_test_storage();
        storage.save_all().unwrap();

        for file in ["cards.json", "banks.json", "goals.json"] {
            assert!(temp_dir.path().join("data").join(file).exists());
        }
    }

    #[test]
    fn test_log_update_fills_in_diff() {
        let (_temp_dir, storage) = create_test_storage();
        storage
            .log_update(
                EntityType::Goal,
                "goal-1",
                None,
                &json!({"target": 100}),
                &json!({"target": 200}),
                None,
            )
            .unwrap();

        let entries = storage.audit().read_all().unwrap();
        assert_eq!(entries[0].operation, Operation::Update);
        assert_eq!(entries[0].diff_summary.as_deref(), Some("target: 100 -> 200"));
    }
}
