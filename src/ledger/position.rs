//! Liquidity positions keyed by `(owner, tick)`.

use std::collections::BTreeMap;

use ethnum::U256;

use crate::domain::{Address, Amount, Radius, Tick};
use crate::error::AmmError;
use crate::math::narrow;

/// One owner's radius at one tick, with its fee snapshot and unpaid
/// balances.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PositionInfo {
    radius: Radius,
    fee_growth_inside_last: Vec<u128>,
    tokens_owed: Vec<Amount>,
}

impl PositionInfo {
    /// Empty position for an `assets`-asset pool.
    #[must_use]
    pub fn new(assets: usize) -> Self {
        Self {
            radius: Radius::ZERO,
            fee_growth_inside_last: vec![0; assets],
            tokens_owed: vec![Amount::ZERO; assets],
        }
    }

    /// Radius contributed.
    pub const fn radius(&self) -> Radius {
        self.radius
    }

    /// Fee growth inside the tick at the last update (Q128).
    #[must_use]
    pub fn fee_growth_inside_last(&self) -> &[u128] {
        &self.fee_growth_inside_last
    }

    /// Fees and withdrawn principal not yet collected.
    #[must_use]
    pub fn tokens_owed(&self) -> &[Amount] {
        &self.tokens_owed
    }

    /// Accrues fees earned since the last snapshot and applies
    /// `radius_delta`.
    ///
    /// Owed fees are `radius · Δgrowth / 2^128`, rounded down.
    ///
    /// # Errors
    ///
    /// - [`AmmError::Underflow`] if the radius would go negative.
    /// - [`AmmError::Overflow`] if owed balances overflow.
    pub fn update(&mut self, radius_delta: i128, fee_growth_inside: &[u128]) -> crate::error::Result<()> {
        let radius = self.radius.apply_delta(radius_delta).ok_or(if radius_delta < 0 {
            AmmError::Underflow("position radius underflow")
        } else {
            AmmError::Overflow("position radius overflow")
        })?;
        for ((owed, last), inside) in self
            .tokens_owed
            .iter_mut()
            .zip(self.fee_growth_inside_last.iter_mut())
            .zip(fee_growth_inside)
        {
            let growth = inside.wrapping_sub(*last);
            let earned = (U256::from(self.radius.get()) * U256::from(growth)) >> 128;
            let earned = narrow(earned, "position fees exceed u128")?;
            *owed = owed
                .checked_add(&Amount::new(earned))
                .ok_or(AmmError::Overflow("position owed overflow"))?;
            *last = *inside;
        }
        self.radius = radius;
        Ok(())
    }

    /// Adds withdrawn principal to the owed balances.
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::Overflow`] if an owed balance overflows.
    pub fn credit(&mut self, amounts: &[Amount]) -> crate::error::Result<()> {
        for (owed, amount) in self.tokens_owed.iter_mut().zip(amounts) {
            *owed = owed
                .checked_add(amount)
                .ok_or(AmmError::Overflow("position owed overflow"))?;
        }
        Ok(())
    }

    /// Clears and returns the owed balances.
    pub fn take_owed(&mut self) -> Vec<Amount> {
        let assets = self.tokens_owed.len();
        core::mem::replace(&mut self.tokens_owed, vec![Amount::ZERO; assets])
    }
}

/// All positions of a pool.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PositionLedger {
    positions: BTreeMap<(Address, Tick), PositionInfo>,
}

impl PositionLedger {
    /// Creates an empty ledger.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            positions: BTreeMap::new(),
        }
    }

    /// Returns the position of `owner` at `tick`.
    #[must_use]
    pub fn get(&self, owner: Address, tick: Tick) -> Option<&PositionInfo> {
        self.positions.get(&(owner, tick))
    }

    /// Mutable access to an existing position.
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::PositionNotFound`] if none exists.
    pub fn get_mut(&mut self, owner: Address, tick: Tick) -> crate::error::Result<&mut PositionInfo> {
        self.positions
            .get_mut(&(owner, tick))
            .ok_or(AmmError::PositionNotFound)
    }

    /// Position of `owner` at `tick`, created empty on first use.
    pub fn entry(&mut self, owner: Address, tick: Tick, assets: usize) -> &mut PositionInfo {
        self.positions
            .entry((owner, tick))
            .or_insert_with(|| PositionInfo::new(assets))
    }

    /// Iterates over all positions.
    pub fn iter(&self) -> impl Iterator<Item = (&(Address, Tick), &PositionInfo)> + '_ {
        self.positions.iter()
    }

    /// Number of positions ever opened.
    #[must_use]
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    /// `true` if no position was ever opened.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}
