//! Packed presence map of initialized ticks.
//!
//! A tick is first compressed by the pool's tick spacing, then split into
//! a word index and a bit position with Euclidean division, so negative
//! ticks map onto the same layout as positive ones:
//!
//! ```text
//! compressed = tick.div_euclid(spacing)
//! word       = compressed.div_euclid(256)
//! bit        = compressed.rem_euclid(256)
//! ```

use std::collections::BTreeMap;

use ethnum::U256;

use crate::domain::Tick;
use crate::error::AmmError;

const WORD_BITS: i32 = 256;

/// Bitmap of initialized ticks keyed by signed word index.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TickBitmap {
    words: BTreeMap<i32, U256>,
}

impl TickBitmap {
    /// Creates an empty bitmap.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            words: BTreeMap::new(),
        }
    }

    /// Toggles the bit of `tick`.
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::InvalidTick`] if `tick` is not a multiple of
    /// `spacing`.
    pub fn flip(&mut self, tick: Tick, spacing: u32) -> crate::error::Result<()> {
        if !tick.is_aligned(spacing) {
            return Err(AmmError::InvalidTick("tick not aligned to spacing"));
        }
        let (word, bit) = position(compress(tick.get(), spacing));
        let entry = self.words.entry(word).or_insert(U256::ZERO);
        *entry ^= U256::ONE << bit;
        if *entry == U256::ZERO {
            self.words.remove(&word);
        }
        Ok(())
    }

    /// `true` if the bit of `tick` is set.
    #[must_use]
    pub fn is_initialized(&self, tick: Tick, spacing: u32) -> bool {
        if !tick.is_aligned(spacing) {
            return false;
        }
        let (word, bit) = position(compress(tick.get(), spacing));
        self.words
            .get(&word)
            .is_some_and(|w| *w & (U256::ONE << bit) != U256::ZERO)
    }

    /// Nearest initialized tick within the word of `tick`.
    ///
    /// With `lte` the search covers `tick` and everything below it in the
    /// word, otherwise everything strictly above `tick`. Returns the tick
    /// found and `true`, or the last tick of the searched word range and
    /// `false`, so the caller can continue from there into the next word.
    #[must_use]
    pub fn next_initialized_tick_within_one_word(&self, tick: i32, spacing: u32, lte: bool) -> (i32, bool) {
        let step = spacing_i32(spacing);
        let compressed = compress(tick, spacing);
        if lte {
            let (word, bit) = position(compressed);
            // bits at or below `bit`
            let mask = if bit == 255 {
                U256::MAX
            } else {
                (U256::ONE << (bit + 1)) - U256::ONE
            };
            let masked = self.word(word) & mask;
            if masked == U256::ZERO {
                ((compressed - bit as i32) * step, false)
            } else {
                let msb = 255 - masked.leading_zeros();
                ((compressed - (bit - msb) as i32) * step, true)
            }
        } else {
            let (word, bit) = position(compressed + 1);
            // bits at or above `bit`
            let mask = !((U256::ONE << bit) - U256::ONE);
            let masked = self.word(word) & mask;
            if masked == U256::ZERO {
                ((compressed + 1 + (255 - bit) as i32) * step, false)
            } else {
                let lsb = masked.trailing_zeros();
                ((compressed + 1 + (lsb - bit) as i32) * step, true)
            }
        }
    }

    fn word(&self, index: i32) -> U256 {
        self.words.get(&index).copied().unwrap_or(U256::ZERO)
    }
}

fn spacing_i32(spacing: u32) -> i32 {
    i32::try_from(spacing.max(1)).unwrap_or(i32::MAX)
}

fn compress(tick: i32, spacing: u32) -> i32 {
    tick.div_euclid(spacing_i32(spacing))
}

fn position(compressed: i32) -> (i32, u32) {
    (
        compressed.div_euclid(WORD_BITS),
        compressed.rem_euclid(WORD_BITS).unsigned_abs(),
    )
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    fn tick(v: i32) -> Tick {
        let Ok(t) = Tick::new(v) else {
            panic!("invalid tick in test: {v}");
        };
        t
    }

    fn bitmap_with(ticks: &[i32], spacing: u32) -> TickBitmap {
        let mut bitmap = TickBitmap::new();
        for &t in ticks {
            let Ok(()) = bitmap.flip(tick(t), spacing) else {
                panic!("flip failed for {t}");
            };
        }
        bitmap
    }

    // -- flip ---------------------------------------------------------------

    #[test]
    fn flip_toggles() {
        let mut bitmap = bitmap_with(&[-230, 70], 10);
        assert!(bitmap.is_initialized(tick(-230), 10));
        assert!(bitmap.is_initialized(tick(70), 10));
        assert!(!bitmap.is_initialized(tick(80), 10));
        let Ok(()) = bitmap.flip(tick(70), 10) else {
            panic!("expected Ok");
        };
        assert!(!bitmap.is_initialized(tick(70), 10));
    }

    #[test]
    fn flip_rejects_misaligned() {
        let mut bitmap = TickBitmap::new();
        assert_eq!(
            bitmap.flip(tick(15), 10),
            Err(AmmError::InvalidTick("tick not aligned to spacing"))
        );
    }

    #[test]
    fn empty_words_are_dropped() {
        let mut bitmap = bitmap_with(&[5], 1);
        let _ = bitmap.flip(tick(5), 1);
        assert_eq!(bitmap, TickBitmap::new());
    }

    // -- Search at or below -------------------------------------------------

    #[test]
    fn lte_finds_self_and_lower() {
        let bitmap = bitmap_with(&[-200, -55, -4, 70, 78, 84, 139, 240, 535], 1);
        assert_eq!(bitmap.next_initialized_tick_within_one_word(78, 1, true), (78, true));
        assert_eq!(bitmap.next_initialized_tick_within_one_word(79, 1, true), (78, true));
        assert_eq!(bitmap.next_initialized_tick_within_one_word(69, 1, true), (0, false));
        assert_eq!(bitmap.next_initialized_tick_within_one_word(-1, 1, true), (-4, true));
        assert_eq!(bitmap.next_initialized_tick_within_one_word(-60, 1, true), (-200, true));
    }

    #[test]
    fn lte_stops_at_word_start() {
        let bitmap = bitmap_with(&[535], 1);
        // word 2 covers [512, 767]
        assert_eq!(bitmap.next_initialized_tick_within_one_word(520, 1, true), (512, false));
        assert_eq!(bitmap.next_initialized_tick_within_one_word(-1, 1, true), (-256, false));
    }

    // -- Search above -------------------------------------------------------

    #[test]
    fn gt_finds_strictly_greater() {
        let bitmap = bitmap_with(&[-200, -55, -4, 70, 78, 84, 139, 240, 535], 1);
        assert_eq!(bitmap.next_initialized_tick_within_one_word(78, 1, false), (84, true));
        assert_eq!(bitmap.next_initialized_tick_within_one_word(77, 1, false), (78, true));
        assert_eq!(bitmap.next_initialized_tick_within_one_word(-56, 1, false), (-55, true));
        assert_eq!(bitmap.next_initialized_tick_within_one_word(-5, 1, false), (-4, true));
    }

    #[test]
    fn gt_stops_at_word_end() {
        let bitmap = bitmap_with(&[535], 1);
        assert_eq!(bitmap.next_initialized_tick_within_one_word(255, 1, false), (511, false));
        assert_eq!(bitmap.next_initialized_tick_within_one_word(240, 1, false), (255, false));
        assert_eq!(bitmap.next_initialized_tick_within_one_word(511, 1, false), (535, true));
    }

    #[test]
    fn spacing_scales_results() {
        let bitmap = bitmap_with(&[-120, 60, 600], 60);
        assert_eq!(bitmap.next_initialized_tick_within_one_word(0, 60, false), (60, true));
        assert_eq!(bitmap.next_initialized_tick_within_one_word(59, 60, true), (0, false));
        assert_eq!(bitmap.next_initialized_tick_within_one_word(-1, 60, true), (-120, true));
        assert_eq!(bitmap.next_initialized_tick_within_one_word(60, 60, false), (600, true));
    }
}
