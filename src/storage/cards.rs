//! Card repository for JSON storage
//!
//! Manages loading and saving cards, with both of their ledgers, to cards.json

use std::path::PathBuf;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::error::{WalletError, WalletResult};
use crate::models::Card;

use super::file_io::{read_json, write_json_atomic};

/// Serializable card data structure
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
struct CardData {
    cards: Vec<Card>,
}

/// Repository for card persistence, in creation order
pub struct CardRepository {
    path: PathBuf,
    data: RwLock<Vec<Card>>,
}

impl CardRepository {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            data: RwLock::new(Vec::new()),
        }
    }

    /// Load cards from disk
    pub fn load(&self) -> WalletResult<()> {
        let file_data: CardData = read_json(&self.path)?;
        *self.write()? = file_data.cards;
        Ok(())
    }

    /// Save cards to disk
    pub fn save(&self) -> WalletResult<()> {
        let file_data = CardData {
            cards: self.read()?.clone(),
        };
        write_json_atomic(&self.path, &file_data)
    }

    pub fn get_all(&self) -> WalletResult<Vec<Card>> {
        Ok(self.read()?.clone())
    }

    /// Get a card by name (case-insensitive)
    pub fn get_by_name(&self, name: &str) -> WalletResult<Option<Card>> {
        let data = self.read()?;
        Ok(position(&data, name).map(|i| data[i].clone()))
    }

    pub fn name_exists(&self, name: &str) -> WalletResult<bool> {
        Ok(position(&self.read()?, name).is_some())
    }

    pub fn count(&self) -> WalletResult<usize> {
        Ok(self.read()?.len())
    }

    /// Append a new card
    pub fn insert(&self, card: Card) -> WalletResult<()> {
        self.write()?.push(card);
        Ok(())
    }

    /// Run `f` on the named card under one write lock
    ///
    /// `f` works on a copy that replaces the stored card only when `f`
    /// succeeds, so an error leaves the card as it was.
    pub fn update<R>(
        &self,
        name: &str,
        f: impl FnOnce(&mut Card) -> WalletResult<R>,
    ) -> WalletResult<R> {
        let mut data = self.write()?;
        let index = position(&data, name).ok_or_else(|| WalletError::card_not_found(name))?;

        let mut working = data[index].clone();
        let result = f(&mut working)?;
        data[index] = working;
        Ok(result)
    }

    /// Remove the named card with both of its ledgers
    pub fn delete(&self, name: &str) -> WalletResult<Card> {
        let mut data = self.write()?;
        let index = position(&data, name).ok_or_else(|| WalletError::card_not_found(name))?;
        Ok(data.remove(index))
    }

    /// Apply a ledger capacity to every card
    pub fn set_ledger_capacity(&self, capacity: usize) -> WalletResult<()> {
        for card in self.write()?.iter_mut() {
            card.set_ledger_capacity(capacity);
        }
        Ok(())
    }

    fn read(&self) -> WalletResult<RwLockReadGuard<'_, Vec<Card>>> {
        self.data
            .read()
            .map_err(|e| WalletError::Storage(format!("Failed to acquire read lock: {}", e)))
    }

    fn write(&self) -> WalletResult<RwLockWriteGuard<'_, Vec<Card>>> {
        self.data
            .write()
            .map_err(|e| WalletError::Storage(format!("Failed to acquire write lock: {}", e)))
    }
}

fn position(cards: &[Card], name: &str) -> Option<usize> {
    let name = name.trim();
    cards.iter().position(|c| c.name.eq_ignore_ascii_case(name))
}
