//! Property-based tests using `proptest` for pool invariant validation.
//!
//! 1. **Swap reversibility**: a round trip `i → j → i` returns at most the
//!    original input.
//! 2. **Consistency**: after any swap sequence `S` and `Q` match the
//!    reserves, every reserve is positive and balances cover reserves.
//! 3. **Quote fidelity**: a quote equals the swap that follows it.
//! 4. **Radius stability**: the radius only changes when a tick is crossed.
//! 5. **Fee monotonicity**: a larger input never pays a smaller fee.
//! 6. **Atomicity**: a failed swap leaves the pool untouched.
//! 7. **Liquidity conservation**: mint then burn never returns more than
//!    was deposited.
//! 8. **Fee accounting**: fees collected by positions plus the protocol
//!    share add up to the fees charged, less rounding dust.
//! 9. **Output monotonicity**: across the crossing of tick 1000 a larger
//!    input never buys a smaller output.
//!
//! Swaps generated here stay below the pool's capacity, so every one of
//! them must succeed.

use proptest::prelude::*;

use crate::config::OrbitalConfig;
use crate::domain::{Address, Amount, BasisPoints, Decimals, FeeTier, Radius, SwapParams, SwapResult, Tick, Token};
use crate::math::WAD;
use crate::pools::OrbitalPool;
use crate::traits::{FromConfig, Funds, LiquidityPool, MintCallback, SwapCallback, SwapPool};

// ---------------------------------------------------------------------------
// Shared helpers
// ---------------------------------------------------------------------------

struct Payer;

impl MintCallback for Payer {
    fn on_mint(&mut self, amounts: &[Amount], funds: &mut Funds<'_>) -> crate::error::Result<()> {
        for (asset, amount) in amounts.iter().enumerate() {
            funds.pay(asset, *amount)?;
        }
        Ok(())
    }
}

impl SwapCallback for Payer {
    fn on_swap(&mut self, result: &SwapResult, funds: &mut Funds<'_>) -> crate::error::Result<()> {
        funds.pay(result.token_in(), result.amount_in())
    }
}

fn tick(v: i32) -> Tick {
    let Ok(t) = Tick::new(v) else {
        panic!("invalid tick in test: {v}");
    };
    t
}

fn lp() -> Address {
    Address::repeat_byte(0xaa)
}

/// Four-asset pool with liquidity at ticks 1000 and 3000.
fn make_pool() -> OrbitalPool {
    let Ok(d) = Decimals::new(18) else {
        panic!("valid decimals");
    };
    let tokens = (1..=4).map(|b| Token::new(Address::repeat_byte(b), d)).collect();
    let Ok(config) = OrbitalConfig::new(tokens, FeeTier::TIER_0_05_PERCENT, BasisPoints::new(1_000), 10) else {
        panic!("valid config");
    };
    let Ok(mut pool) = OrbitalPool::from_config(&config) else {
        panic!("valid pool");
    };
    let Ok(()) = pool.initialize(4_000 * WAD, Tick::ZERO) else {
        panic!("initialize failed");
    };
    for (t, r) in [(1_000, 400 * WAD), (3_000, 600 * WAD)] {
        let Ok(_) = pool.mint(lp(), tick(t), Radius::new(r), &mut Payer) else {
            panic!("mint failed");
        };
    }
    pool
}

fn params(token_in: usize, token_out: usize, amount: u128) -> SwapParams {
    let Ok(p) = SwapParams::exact_in(Address::repeat_byte(0xbb), token_in, token_out, Amount::new(amount)) else {
        panic!("valid params");
    };
    p
}

/// Turns an unexpected error into a failed test case.
fn require<T, E: core::fmt::Debug>(result: Result<T, E>, what: &str) -> Result<T, TestCaseError> {
    result.map_err(|e| TestCaseError::fail(format!("{what} failed: {e:?}")))
}

// ---------------------------------------------------------------------------
// Custom strategies
// ---------------------------------------------------------------------------

/// Swap sizes from 0.001 to 300 whole tokens.
fn amount_strategy() -> impl Strategy<Value = u128> {
    (1u128..=300_000u128).prop_map(|milli| milli * WAD / 1_000)
}

/// Swap sizes from 0.001 to 60 whole tokens, for sequences of up to
/// five swaps.
fn sequence_amount_strategy() -> impl Strategy<Value = u128> {
    (1u128..=60_000u128).prop_map(|milli| milli * WAD / 1_000)
}

/// Swap sizes from 300 to 460 whole tokens, around the crossing of
/// tick 1000.
fn crossing_amount_strategy() -> impl Strategy<Value = u128> {
    (300_000u128..=460_000u128).prop_map(|milli| milli * WAD / 1_000)
}

/// Distinct ordered asset pair.
fn pair_strategy() -> impl Strategy<Value = (usize, usize)> {
    (0usize..4, 1usize..4).prop_map(|(i, k)| (i, (i + k) % 4))
}

// ---------------------------------------------------------------------------
// Properties
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn prop_round_trip_loses_value(
        (i, j) in pair_strategy(),
        amount in amount_strategy(),
    ) {
        let mut pool = make_pool();
        let first = require(pool.swap(&params(i, j, amount), &mut Payer), "outbound swap")?;
        let second = require(pool.swap(&params(j, i, first.amount_out().get()), &mut Payer), "return swap")?;
        prop_assert!(
            second.amount_out().get() <= amount,
            "round trip gained value: {} > {}",
            second.amount_out().get(), amount
        );
    }

    #[test]
    fn prop_pool_stays_consistent(
        swaps in proptest::collection::vec((pair_strategy(), sequence_amount_strategy()), 1..6),
    ) {
        let mut pool = make_pool();
        for ((i, j), amount) in swaps {
            require(pool.swap(&params(i, j, amount), &mut Payer), "swap")?;
            prop_assert!(pool.is_consistent(), "inconsistent after {i}->{j} of {amount}");
        }
    }

    #[test]
    fn prop_quote_matches_swap(
        (i, j) in pair_strategy(),
        amount in amount_strategy(),
    ) {
        let mut pool = make_pool();
        let p = params(i, j, amount);
        let quoted = require(pool.quote(&p), "quote")?;
        let executed = require(pool.swap(&p, &mut Payer), "swap")?;
        prop_assert_eq!(quoted, executed);
    }

    #[test]
    fn prop_radius_changes_only_on_cross(
        (i, j) in pair_strategy(),
        amount in amount_strategy(),
    ) {
        let mut pool = make_pool();
        let before = pool.radius();
        let result = require(pool.swap(&params(i, j, amount), &mut Payer), "swap")?;
        if result.crossed_ticks().is_empty() {
            prop_assert_eq!(pool.radius(), before);
        }
        prop_assert_eq!(result.radius_after(), pool.radius());
    }

    #[test]
    fn prop_fee_monotonic(
        (i, j) in pair_strategy(),
        small in 1u128..=200_000u128,
        extra in 1u128..=200_000u128,
    ) {
        let pool = make_pool();
        let (small, large) = (small * WAD / 1_000, (small + extra) * WAD / 1_000);
        let ra = require(pool.quote(&params(i, j, small)), "smaller quote")?;
        let rb = require(pool.quote(&params(i, j, large)), "larger quote")?;
        prop_assert!(ra.fee() <= rb.fee(), "fee decreased: {} > {}", ra.fee(), rb.fee());
        prop_assert!(ra.protocol_fee() <= ra.fee());
    }

    #[test]
    fn prop_output_grows_across_crossing(
        (i, j) in pair_strategy(),
        a in crossing_amount_strategy(),
        b in crossing_amount_strategy(),
    ) {
        let pool = make_pool();
        let (small, large) = (a.min(b), a.max(b));
        let ra = require(pool.quote(&params(i, j, small)), "smaller quote")?;
        let rb = require(pool.quote(&params(i, j, large)), "larger quote")?;
        prop_assert!(
            ra.amount_out() <= rb.amount_out(),
            "{small} bought {} but {large} bought {}",
            ra.amount_out(), rb.amount_out()
        );
    }

    #[test]
    fn prop_failed_swap_is_atomic(
        (i, j) in pair_strategy(),
        amount in (500u128..=3_000u128).prop_map(|x| x * WAD),
    ) {
        let mut pool = make_pool();
        let before = pool.clone();
        // beyond what the pool can absorb from one side
        let result = pool.swap(&params(i, j, amount), &mut Payer);
        prop_assert!(result.is_err(), "{i}->{j} of {amount} succeeded");
        prop_assert_eq!(pool, before);
    }

    #[test]
    fn prop_mint_burn_conserves(
        t in (1u32..=400u32).prop_map(|x| x as i32 * 10),
        radius in (1u128..=1_000u128).prop_map(|x| x * WAD),
    ) {
        let mut pool = make_pool();
        let owner = Address::repeat_byte(0xcc);
        let paid = require(pool.mint(owner, tick(t), Radius::new(radius), &mut Payer), "mint")?;
        let released = require(pool.burn(owner, tick(t), Radius::new(radius)), "burn")?;
        for (out, into) in released.iter().zip(&paid) {
            prop_assert!(out <= into);
        }
        prop_assert!(pool.is_consistent());
    }

    #[test]
    fn prop_fees_are_fully_accounted(
        swaps in proptest::collection::vec((pair_strategy(), sequence_amount_strategy()), 1..6),
    ) {
        let mut pool = make_pool();
        let mut charged = [0u128; 4];
        for ((i, j), amount) in swaps {
            let result = require(pool.swap(&params(i, j, amount), &mut Payer), "swap")?;
            charged[i] += result.fee().get();
        }
        let mut paid = pool.protocol_fees().iter().map(Amount::get).collect::<Vec<_>>();
        for t in [1_000, 3_000] {
            let Ok(owed) = pool.collect(lp(), tick(t)) else {
                panic!("collect failed");
            };
            for (total, amount) in paid.iter_mut().zip(&owed) {
                *total += amount.get();
            }
        }
        for (asset, (fee, out)) in charged.iter().zip(&paid).enumerate() {
            prop_assert!(out <= fee, "asset {asset}: paid {out} of {fee}");
            prop_assert!(fee - out <= 16, "asset {asset}: lost {} to rounding", fee - out);
        }
        prop_assert!(pool.is_consistent());
    }
}
