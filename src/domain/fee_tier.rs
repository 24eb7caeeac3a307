//! Swap fee rate expressed in pips.

use core::fmt;

use super::{Amount, Rounding};
use crate::error::AmmError;
use crate::math::mul_div;

/// One hundred percent in pips.
pub const PIPS_DENOMINATOR: u32 = 1_000_000;

/// Swap fee rate in pips (1 pip = 0.0001%, 1 000 000 pips = 100%).
///
/// The fee is always taken from the input before the curve is solved:
///
/// ```text
/// net  = ⌊amount · (1e6 − fee) / 1e6⌋
/// fee  = amount − net                       (input fully consumed)
/// fee  = ⌈net · fee / (1e6 − fee)⌉          (step stopped at a target)
/// ```
///
/// # Examples
///
/// ```
/// use orbital_amm::domain::{Amount, FeeTier};
///
/// let tier = FeeTier::TIER_0_05_PERCENT;
/// assert_eq!(tier.pips(), 500);
/// assert_eq!(tier.net_of_fee(Amount::new(10_000_000)), Ok(Amount::new(9_995_000)));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FeeTier(u32);

impl FeeTier {
    /// 0.01% fee (100 pips).
    pub const TIER_0_01_PERCENT: Self = Self(100);

    /// 0.05% fee (500 pips), the stablecoin default.
    pub const TIER_0_05_PERCENT: Self = Self(500);

    /// 0.30% fee (3 000 pips).
    pub const TIER_0_30_PERCENT: Self = Self(3_000);

    /// 1.00% fee (10 000 pips).
    pub const TIER_1_00_PERCENT: Self = Self(10_000);

    /// Creates a fee tier from a raw pip count.
    pub const fn new(pips: u32) -> Self {
        Self(pips)
    }

    /// Returns the fee in pips.
    #[must_use]
    pub const fn pips(&self) -> u32 {
        self.0
    }

    /// Returns `true` if the fee is strictly below 100%.
    #[must_use]
    pub const fn is_valid(&self) -> bool {
        self.0 < PIPS_DENOMINATOR
    }

    /// Fee owed on a gross `amount`.
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::Overflow`] if the result does not fit.
    pub fn apply_to_amount(&self, amount: Amount, rounding: Rounding) -> crate::error::Result<Amount> {
        mul_div(
            amount.get(),
            u128::from(self.0),
            u128::from(PIPS_DENOMINATOR),
            rounding,
        )
        .map(Amount::new)
    }

    /// Portion of `amount` left for the curve after the fee, rounded down.
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::InvalidFee`] for a 100% fee.
    pub fn net_of_fee(&self, amount: Amount) -> crate::error::Result<Amount> {
        let keep = self
            .complement()
            .ok_or(AmmError::InvalidFee("fee must be below 100%"))?;
        mul_div(
            amount.get(),
            u128::from(keep),
            u128::from(PIPS_DENOMINATOR),
            Rounding::Down,
        )
        .map(Amount::new)
    }

    /// Fee that accompanies a `net` amount spent on the curve, rounded up.
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::InvalidFee`] for a 100% fee.
    pub fn fee_on_net(&self, net: Amount) -> crate::error::Result<Amount> {
        let keep = self
            .complement()
            .ok_or(AmmError::InvalidFee("fee must be below 100%"))?;
        mul_div(net.get(), u128::from(self.0), u128::from(keep), Rounding::Up).map(Amount::new)
    }

    fn complement(&self) -> Option<u32> {
        match PIPS_DENOMINATOR.checked_sub(self.0) {
            Some(0) | None => None,
            Some(v) => Some(v),
        }
    }
}

impl fmt::Display for FeeTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FeeTier({}pips)", self.0)
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    const E18: u128 = 1_000_000_000_000_000_000;

    // -- Presets ------------------------------------------------------------

    #[test]
    fn preset_values() {
        assert_eq!(FeeTier::TIER_0_01_PERCENT.pips(), 100);
        assert_eq!(FeeTier::TIER_0_05_PERCENT.pips(), 500);
        assert_eq!(FeeTier::TIER_0_30_PERCENT.pips(), 3_000);
        assert_eq!(FeeTier::TIER_1_00_PERCENT.pips(), 10_000);
        assert!(FeeTier::TIER_1_00_PERCENT.is_valid());
        assert!(!FeeTier::new(PIPS_DENOMINATOR).is_valid());
    }

    // -- Fee split ----------------------------------------------------------

    #[test]
    fn net_plus_fee_is_gross() {
        let tier = FeeTier::TIER_0_05_PERCENT;
        let gross = Amount::new(10 * E18);
        let Ok(net) = tier.net_of_fee(gross) else {
            panic!("expected Ok");
        };
        let Ok(fee) = tier.apply_to_amount(gross, Rounding::Up) else {
            panic!("expected Ok");
        };
        assert_eq!(fee.get(), 10 * E18 * 500 / 1_000_000);
        assert_eq!(net.get() + fee.get(), gross.get());
    }

    #[test]
    fn fee_on_net_rounds_up() {
        let tier = FeeTier::TIER_0_30_PERCENT;
        // 1 · 3000 / 997000 is a fraction of a unit
        assert_eq!(tier.fee_on_net(Amount::new(1)), Ok(Amount::new(1)));
        assert_eq!(tier.fee_on_net(Amount::ZERO), Ok(Amount::ZERO));
    }

    #[test]
    fn fee_on_net_inverts_net_of_fee() {
        let tier = FeeTier::TIER_0_05_PERCENT;
        let Ok(net) = tier.net_of_fee(Amount::new(1_000_000)) else {
            panic!("expected Ok");
        };
        assert_eq!(net, Amount::new(999_500));
        assert_eq!(tier.fee_on_net(net), Ok(Amount::new(500)));
    }

    #[test]
    fn full_fee_rejected() {
        let tier = FeeTier::new(PIPS_DENOMINATOR);
        assert_eq!(
            tier.net_of_fee(Amount::new(1)),
            Err(AmmError::InvalidFee("fee must be below 100%"))
        );
    }

    #[test]
    fn display() {
        assert_eq!(format!("{}", FeeTier::TIER_0_05_PERCENT), "FeeTier(500pips)");
    }
}
