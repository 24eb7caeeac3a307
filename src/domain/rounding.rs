//! Explicit rounding direction for arithmetic operations.

/// Rounding direction for every division in the engine.
///
/// Amounts owed to the pool round [`Up`](Self::Up); amounts paid out and
/// liquidity credited round [`Down`](Self::Down).
///
/// # Examples
///
/// ```
/// use orbital_amm::domain::Rounding;
///
/// assert!(Rounding::Up.is_up());
/// assert_eq!(Rounding::Up.opposite(), Rounding::Down);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Rounding {
    /// Round towards positive infinity (ceiling).
    Up,
    /// Round towards zero (floor).
    Down,
}

impl Rounding {
    /// Returns `true` if this is [`Rounding::Up`].
    #[must_use]
    pub const fn is_up(&self) -> bool {
        matches!(self, Self::Up)
    }

    /// Returns `true` if this is [`Rounding::Down`].
    #[must_use]
    pub const fn is_down(&self) -> bool {
        matches!(self, Self::Down)
    }

    /// Returns the other direction.
    ///
    /// Subtracting a quotient rounded one way yields a difference rounded
    /// the other way, so `a − ⌊b/c⌋` is the upward-rounded `a − b/c`.
    #[must_use]
    pub const fn opposite(&self) -> Self {
        match self {
            Self::Up => Self::Down,
            Self::Down => Self::Up,
        }
    }
}
