//! Per-tick radius and fee-growth bookkeeping.
//!
//! Ticks are nested: a tick is *interior* while the pool's current tick
//! lies below it and *boundary* once the pool has moved past it. Crossing
//! a tick away from the equal-price point removes its net radius from the
//! pool; crossing back adds it again.
//!
//! Fee growth follows the usual outside-accumulator convention. For a
//! tick `t`, `fee_growth_outside` holds the growth accumulated on the
//! side of `t` the pool is *not* on, so the growth earned while `t` was
//! interior is available in O(1) via [`TickLedger::fee_growth_inside`].

use std::collections::BTreeMap;

use crate::domain::{Radius, Tick};
use crate::error::AmmError;

/// State of one initialized tick.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TickInfo {
    radius_gross: Radius,
    radius_net: i128,
    fee_growth_outside: Vec<u128>,
}

impl TickInfo {
    /// Total radius registered at this tick.
    pub const fn radius_gross(&self) -> Radius {
        self.radius_gross
    }

    /// Signed radius applied to the pool when the tick is crossed.
    #[must_use]
    pub const fn radius_net(&self) -> i128 {
        self.radius_net
    }

    /// Per-asset fee growth outside this tick (Q128).
    #[must_use]
    pub fn fee_growth_outside(&self) -> &[u128] {
        &self.fee_growth_outside
    }

    /// `true` while radius is registered at this tick.
    #[must_use]
    pub const fn is_initialized(&self) -> bool {
        !self.radius_gross.is_zero()
    }
}

/// Map of tick index to [`TickInfo`].
///
/// Records are created on first use and never removed; a tick whose gross
/// radius returns to zero simply reads as uninitialized.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TickLedger {
    ticks: BTreeMap<Tick, TickInfo>,
}

impl TickLedger {
    /// Creates an empty ledger.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            ticks: BTreeMap::new(),
        }
    }

    /// Returns the record of `tick`, if it was ever touched.
    #[must_use]
    pub fn get(&self, tick: Tick) -> Option<&TickInfo> {
        self.ticks.get(&tick)
    }

    /// Iterates over initialized ticks in ascending order.
    pub fn initialized(&self) -> impl Iterator<Item = (Tick, &TickInfo)> + '_ {
        self.ticks
            .iter()
            .filter(|(_, info)| info.is_initialized())
            .map(|(t, info)| (*t, info))
    }

    /// Applies `radius_delta` to `tick` and returns whether its initialized
    /// state flipped.
    ///
    /// On first initialization `fee_growth_outside` is seeded with the
    /// global growth if the tick is interior (`current < tick`) and with
    /// zero otherwise. The seed is a snapshot and is never revisited.
    ///
    /// # Errors
    ///
    /// - [`AmmError::Underflow`] if the gross radius would go negative.
    /// - [`AmmError::Overflow`] on radius overflow.
    pub fn update(
        &mut self,
        tick: Tick,
        radius_delta: i128,
        current: Tick,
        fee_growth_global: &[u128],
    ) -> crate::error::Result<bool> {
        let info = self.ticks.entry(tick).or_default();
        let before = info.radius_gross;
        let after = before.apply_delta(radius_delta).ok_or(if radius_delta < 0 {
            AmmError::Underflow("tick gross radius underflow")
        } else {
            AmmError::Overflow("tick gross radius overflow")
        })?;
        let net = info
            .radius_net
            .checked_add(radius_delta)
            .ok_or(AmmError::Overflow("tick net radius overflow"))?;

        if before.is_zero() && !after.is_zero() {
            info.fee_growth_outside = if current < tick {
                fee_growth_global.to_vec()
            } else {
                vec![0; fee_growth_global.len()]
            };
        }
        info.radius_gross = after;
        info.radius_net = net;
        Ok(before.is_zero() != after.is_zero())
    }

    /// Crosses `tick`, flipping its fee growth outside, and returns its net
    /// radius.
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::InvalidTick`] if the tick has no record.
    pub fn cross(&mut self, tick: Tick, fee_growth_global: &[u128]) -> crate::error::Result<i128> {
        let info = self
            .ticks
            .get_mut(&tick)
            .ok_or(AmmError::InvalidTick("crossed tick is not initialized"))?;
        for (outside, global) in info.fee_growth_outside.iter_mut().zip(fee_growth_global) {
            *outside = global.wrapping_sub(*outside);
        }
        Ok(info.radius_net)
    }

    /// Per-asset fee growth accumulated while `tick` was interior.
    #[must_use]
    pub fn fee_growth_inside(&self, tick: Tick, current: Tick, fee_growth_global: &[u128]) -> Vec<u128> {
        let Some(info) = self.ticks.get(&tick) else {
            return vec![0; fee_growth_global.len()];
        };
        fee_growth_global
            .iter()
            .zip(&info.fee_growth_outside)
            .map(|(global, outside)| {
                if current < tick {
                    global.wrapping_sub(*outside)
                } else {
                    *outside
                }
            })
            .collect()
    }
}
