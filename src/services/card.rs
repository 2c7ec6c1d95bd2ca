//! Card service
//!
//! Card lifecycle, expenditures, and the monthly bill cycle: paying a
//! month's unpaid bill from a saving account and reversing that payment.

use chrono::NaiveDate;
use tracing::{error, info, warn};

use crate::audit::EntityType;
use crate::error::{WalletError, WalletResult};
use crate::models::{
    BankAccount, BankKind, BillRef, Card, Money, RebateRate, Transaction, TransactionEdit,
    YearMonth,
};
use crate::storage::Storage;

/// Category of the bank expenditure recorded for a bill payment
pub const BILL_CATEGORY: &str = "Card Bill";

/// Category of the bank deposit recorded for a bill rebate
pub const REBATE_CATEGORY: &str = "Rebate";

/// Service for card management
pub struct CardService<'a> {
    storage: &'a Storage,
}

/// Changes to a card's attributes; `None` leaves a field as is
#[derive(Debug, Clone, Default)]
pub struct EditCardInput {
    pub name: Option<String>,
    pub limit: Option<Money>,
    pub rebate: Option<RebateRate>,
}

/// Outcome of paying or reversing a monthly bill
#[derive(Debug, Clone, PartialEq)]
pub struct BillPayment {
    pub card: String,
    pub bank: String,
    pub month: YearMonth,
    /// Bill amount moved between the card's lists
    pub amount: Money,
    /// Cash back deposited (or withdrawn on reversal)
    pub rebate: Money,
    /// Number of expenditures moved
    pub moved: usize,
}

impl<'a> CardService<'a> {
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    /// Create a new card
    pub fn create(&self, name: &str, limit: Money, rebate: RebateRate) -> WalletResult<Card> {
        let name = name.trim();
        if self.storage.cards.name_exists(name)? {
            return Err(WalletError::Duplicate {
                entity_type: "Card",
                identifier: name.to_string(),
            });
        }

        let mut card = Card::new(name, limit, rebate);
        card.set_ledger_capacity(self.storage.ledger_capacity());
        card.validate()
            .map_err(|e| WalletError::Validation(e.to_string()))?;

        self.storage.cards.insert(card.clone())?;
        self.storage.cards.save()?;

        self.storage.log_create(
            EntityType::Card,
            card.id.to_string(),
            Some(card.name.clone()),
            &card,
        )?;

        info!(card = %card.name, limit = %card.limit, "card created");
        Ok(card)
    }

    /// Get a card by name, failing with `NotFound`
    pub fn get(&self, name: &str) -> WalletResult<Card> {
        self.storage
            .cards
            .get_by_name(name)?
            .ok_or_else(|| WalletError::card_not_found(name))
    }

    pub fn list(&self) -> WalletResult<Vec<Card>> {
        self.storage.cards.get_all()
    }

    /// Rename a card or change its limit or rebate
    ///
    /// A limit below any month's unpaid total is refused.
    pub fn edit(&self, name: &str, input: EditCardInput) -> WalletResult<Card> {
        if let Some(new_name) = &input.name {
            let new_name = new_name.trim();
            if !new_name.eq_ignore_ascii_case(name.trim())
                && self.storage.cards.name_exists(new_name)?
            {
                return Err(WalletError::Duplicate {
                    entity_type: "Card",
                    identifier: new_name.to_string(),
                });
            }
        }

        let (card, ()) = self.update_card(name, None, |card| {
            if let Some(limit) = input.limit {
                let highest = card.max_monthly_unpaid();
                if limit < highest {
                    return Err(WalletError::Validation(format!(
                        "Limit {} is below the {} already spent in one month on card '{}'",
                        limit, highest, card.name
                    )));
                }
                card.limit = limit;
            }
            if let Some(rebate) = input.rebate {
                card.rebate = rebate;
            }
            if let Some(new_name) = &input.name {
                card.name = new_name.trim().to_string();
            }
            card.validate()
                .map_err(|e| WalletError::Validation(e.to_string()))?;
            card.updated_at = chrono::Utc::now();
            Ok(())
        })?;

        Ok(card)
    }

    /// Delete a card with both of its expenditure lists
    pub fn delete(&self, name: &str) -> WalletResult<Card> {
        let card = self.storage.cards.delete(name)?;
        self.storage.cards.save()?;

        self.storage.log_delete(
            EntityType::Card,
            card.id.to_string(),
            Some(card.name.clone()),
            &card,
        )?;

        info!(card = %card.name, "card deleted");
        Ok(card)
    }

    /// Record an expenditure on a card, unpaid unless `paid` is set
    pub fn add_expenditure(
        &self,
        name: &str,
        txn: Transaction,
        paid: bool,
    ) -> WalletResult<Transaction> {
        let summary = format!(
            "added {} expenditure '{}' {}",
            if paid { "paid" } else { "unpaid" },
            txn.description,
            txn.amount
        );
        let recorded = txn.clone();

        self.update_card(name, Some(summary), |card| {
            if paid {
                card.add_paid_expenditure(txn)
            } else {
                card.add_expenditure(txn)
            }
        })?;

        Ok(recorded)
    }

    /// Edit an unpaid expenditure by its listing number
    pub fn edit_expenditure(
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

        let summary = format!("edited unpaid expenditure #{}", index);
        let (_, edited) =
            self.update_card(name, Some(summary), |card| card.edit_expenditure(index, edit))?;
        Ok(edited)
    }

    /// Delete an unpaid expenditure by its listing number
    pub fn delete_expenditure(&self, name: &str, index: usize) -> WalletResult<Transaction> {
        let summary = format!("deleted unpaid expenditure #{}", index);
        let (_, removed) =
            self.update_card(name, Some(summary), |card| card.delete_expenditure(index))?;
        Ok(removed)
    }

    /// Remaining limit for a month
    pub fn remaining_limit(&self, name: &str, month: YearMonth) -> WalletResult<Money> {
        Ok(self.get(name)?.remaining_limit(month))
    }

    /// Pay a card's bill for `month` from a saving account
    ///
    /// `today` dates the bank transactions and decides which months are
    /// closed: only months before the current one can be paid.
    pub fn pay_bill(
        &self,
        card_name: &str,
        bank_name: &str,
        month: YearMonth,
        today: NaiveDate,
    ) -> WalletResult<BillPayment> {
        let card = self.get(card_name)?;
        let bank = self.get_bank(bank_name)?;

        if month >= YearMonth::of(today) {
            return Err(WalletError::Validation(format!(
                "The bill for {} can only be paid after the month has ended",
                month
            )));
        }

        let amount = card.unpaid_bill_amount(month);
        if amount.is_zero() {
            return Err(WalletError::Validation(format!(
                "There is no unpaid bill on card '{}' for {}",
                card.name, month
            )));
        }

        if bank.kind != BankKind::Saving {
            return Err(WalletError::Validation(format!(
                "Bills can only be paid from a saving account, '{}' is {}",
                bank.name, bank.kind
            )));
        }
        bank.ensure_covers(amount)?;

        let rebate = card.rebate_for(amount);
        let payment = Transaction::expenditure(
            amount,
            today,
            payment_description(&card.name, month),
            BILL_CATEGORY,
        )
        .for_bill(card.id, month);
        let deposit = Transaction::deposit(
            rebate,
            today,
            rebate_description(&card.name, month),
            REBATE_CATEGORY,
        )
        .for_bill(card.id, month);

        let summary = format!("paid {} bill {} of {}", card.name, month, amount);
        let bank_before = self.update_bank(&bank.name, summary.clone(), |bank| {
            bank.spend(payment)?;
            if !rebate.is_zero() {
                bank.deposit(deposit)?;
            }
            Ok(())
        })?;

        let moved = self.settle_card(&card.name, summary, bank_before, |card| {
            card.transfer_unpaid_to_paid(month)
        })?;

        info!(card = %card.name, bank = %bank.name, %month, %amount, %rebate, "bill paid");
        Ok(BillPayment {
            card: card.name,
            bank: bank.name,
            month,
            amount,
            rebate,
            moved,
        })
    }

    /// Undo a month's bill: refund every payment recorded for it, take back
    /// the rebates, and move the month's expenditures back to the unpaid list
    ///
    /// Payments are found by the card and month they settle, so a renamed
    /// card still reverses cleanly.
    pub fn reverse_bill(
        &self,
        card_name: &str,
        bank_name: &str,
        month: YearMonth,
    ) -> WalletResult<BillPayment> {
        let card = self.get(card_name)?;
        let bank = self.get_bank(bank_name)?;

        let amount = card.paid_bill_amount(month);
        if amount.is_zero() {
            return Err(WalletError::Validation(format!(
                "There is no paid bill on card '{}' for {}",
                card.name, month
            )));
        }

        let bill = BillRef {
            card: card.id,
            month,
        };
        let recorded = bank.bill_paid(bill);
        if recorded.is_zero() {
            return Err(WalletError::Validation(format!(
                "No payment for the {} bill of card '{}' was found in '{}'",
                month, card.name, bank.name
            )));
        }
        if recorded != amount {
            warn!(card = %card.name, bank = %bank.name, %month, %recorded, %amount, "bill payments differ from the paid total");
        }

        let summary = format!("reversed {} bill {}", card.name, month);
        let mut rebate = Money::zero();
        let bank_before = self.update_bank(&bank.name, summary.clone(), |bank| {
            rebate = bank.remove_bill_entries(bill)?.1;
            Ok(())
        })?;

        let moved = self.settle_card(&card.name, summary, bank_before, |card| {
            card.transfer_paid_to_unpaid(month)
        })?;

        info!(card = %card.name, bank = %bank.name, %month, %amount, %recorded, "bill reversed");
        Ok(BillPayment {
            card: card.name,
            bank: bank.name,
            month,
            amount,
            rebate,
            moved,
        })
    }

    /// Apply the card side of a bill change, putting the bank back as it was
    /// when the card cannot be updated
    ///
    /// The card error is returned even when restoring the bank fails too.
    fn settle_card(
        &self,
        card_name: &str,
        summary: String,
        bank_before: BankAccount,
        f: impl FnOnce(&mut Card) -> WalletResult<usize>,
    ) -> WalletResult<usize> {
        match self.update_card(card_name, Some(summary), f) {
            Ok((_, moved)) => Ok(moved),
            Err(e) => {
                warn!(card = %card_name, error = %e, "bill transfer failed, restoring bank");
                if let Err(restore_err) = self.restore_bank(bank_before) {
                    error!(
                        card = %card_name,
                        error = %e,
                        %restore_err,
                        "bank could not be restored after a failed bill transfer"
                    );
                }
                Err(e)
            }
        }
    }

    fn get_bank(&self, name: &str) -> WalletResult<BankAccount> {
        self.storage
            .banks
            .get_by_name(name)?
            .ok_or_else(|| WalletError::bank_not_found(name))
    }

    /// Mutate a card, save, and audit the change
    fn update_card<R>(
        &self,
        name: &str,
        summary: Option<String>,
        f: impl FnOnce(&mut Card) -> WalletResult<R>,
    ) -> WalletResult<(Card, R)> {
        let (before, after, result) = self.storage.cards.update(name, |card| {
            let before = card.clone();
            let result = f(card)?;
            Ok((before, card.clone(), result))
        })?;
        self.storage.cards.save()?;

        self.storage.log_update(
            EntityType::Card,
            after.id.to_string(),
            Some(after.name.clone()),
            &before,
            &after,
            summary,
        )?;

        Ok((after, result))
    }

    /// Mutate a bank account, save, audit, and return its prior state
    fn update_bank(
        &self,
        name: &str,
        summary: String,
        f: impl FnOnce(&mut BankAccount) -> WalletResult<()>,
    ) -> WalletResult<BankAccount> {
        let (before, after) = self.storage.banks.update(name, |bank| {
            let before = bank.clone();
            f(bank)?;
            Ok((before, bank.clone()))
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

        Ok(before)
    }

    fn restore_bank(&self, snapshot: BankAccount) -> WalletResult<()> {
        let name = snapshot.name.clone();
        self.update_bank(&name, "restored after failed bill update".into(), |bank| {
            *bank = snapshot;
            Ok(())
        })?;
        Ok(())
    }
}

fn payment_description(card: &str, month: YearMonth) -> String {
    format!("Paid {} bill {}", card, month)
}

fn rebate_description(card: &str, month: YearMonth) -> String {
    format!("Rebate {} bill {}", card, month)
}
