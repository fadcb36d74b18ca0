//! Ledger: balances and total supply
//!
//! The ledger is the single source of truth for who holds what, and by
//! extension for who is a member. Every mutating operation validates first
//! and mutates second, so a failed call leaves the ledger untouched.
//!
//! Invariant: the sum of all balances equals `total_supply`.

use crate::{Amount, DaoError, DaoResult, Identity};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Token balances keyed by holder, in first-credit order
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ledger {
    balances: IndexMap<Identity, Amount>,
    total_supply: Amount,
}

impl Ledger {
    /// Create an empty ledger
    pub fn new() -> Self {
        Self::default()
    }

    /// Balance of an identity (zero if it never held tokens)
    pub fn balance_of(&self, holder: &Identity) -> Amount {
        self.balances.get(holder).copied().unwrap_or_default()
    }

    /// Total issued supply
    pub fn total_supply(&self) -> Amount {
        self.total_supply
    }

    /// Every identity that holds or has held a balance, in first-credit order
    pub fn all_balances(&self) -> &IndexMap<Identity, Amount> {
        &self.balances
    }

    /// Membership view: an identity is a member iff its balance is positive
    pub fn is_member(&self, holder: &Identity) -> bool {
        !self.balance_of(holder).is_zero()
    }

    /// Current members, in first-credit order
    pub fn members(&self) -> impl Iterator<Item = &Identity> {
        self.balances
            .iter()
            .filter(|(_, balance)| !balance.is_zero())
            .map(|(holder, _)| holder)
    }

    pub fn member_count(&self) -> usize {
        self.members().count()
    }

    /// Mint new supply into `holder`
    pub fn credit(&mut self, holder: &Identity, amount: Amount) -> DaoResult<()> {
        if amount.is_zero() {
            return Ok(());
        }
        let supply = self
            .total_supply
            .checked_add(amount)
            .ok_or(DaoError::SupplyOverflow)?;
        let balance = self
            .balance_of(holder)
            .checked_add(amount)
            .ok_or(DaoError::SupplyOverflow)?;

        self.total_supply = supply;
        self.balances.insert(holder.clone(), balance);
        Ok(())
    }

    /// Burn `amount` from `holder`
    pub fn debit(&mut self, holder: &Identity, amount: Amount) -> DaoResult<()> {
        if amount.is_zero() {
            return Ok(());
        }
        let balance = self.checked_withdrawal(holder, amount)?;
        // The holder's balance is part of the supply, so this cannot underflow.
        let supply = self.total_supply.checked_sub(amount).unwrap_or_default();

        self.total_supply = supply;
        self.balances.insert(holder.clone(), balance);
        Ok(())
    }

    /// Move `amount` from `from` to `to`; supply is unchanged
    pub fn transfer(&mut self, from: &Identity, to: &Identity, amount: Amount) -> DaoResult<()> {
        if amount.is_zero() {
            return Ok(());
        }
        let from_balance = self.checked_withdrawal(from, amount)?;
        if from == to {
            return Ok(());
        }
        let to_balance = self
            .balance_of(to)
            .checked_add(amount)
            .ok_or(DaoError::SupplyOverflow)?;

        self.balances.insert(from.clone(), from_balance);
        self.balances.insert(to.clone(), to_balance);
        Ok(())
    }

    /// Transfer `transfer` from `from` to `to` and mint `mint` into `to`,
    /// as one step: either both apply or neither does
    pub fn grant(
        &mut self,
        from: &Identity,
        to: &Identity,
        transfer: Amount,
        mint: Amount,
    ) -> DaoResult<()> {
        self.checked_withdrawal(from, transfer)?;
        self.total_supply
            .checked_add(mint)
            .ok_or(DaoError::SupplyOverflow)?;

        self.transfer(from, to, transfer)?;
        self.credit(to, mint)
    }

    /// Check the supply invariant
    pub fn is_consistent(&self) -> bool {
        self.balances
            .values()
            .try_fold(Amount::zero(), |acc, b| acc.checked_add(*b))
            == Some(self.total_supply)
    }

    fn checked_withdrawal(&self, holder: &Identity, amount: Amount) -> DaoResult<Amount> {
        let available = self.balance_of(holder);
        available
            .checked_sub(amount)
            .ok_or_else(|| DaoError::InsufficientFunds {
                account: holder.clone(),
                required: amount,
                available,
            })
    }
}
