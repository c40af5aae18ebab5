//! Property-based tests using `proptest` for pool invariant validation.
//!
//! 1. **Constant product**: `reserve_a × reserve_b` never decreases
//!    across swaps.
//! 2. **Share accounting**: total supply equals the sum of balances
//!    after any sequence of deposits, swaps and withdrawals.
//! 3. **Swap reversibility**: a round trip A→B→A returns at most the
//!    original input.
//! 4. **Liquidity round trip**: adding then immediately removing
//!    liquidity returns no more than was deposited.
//! 5. **Accumulator monotonicity**: price accumulators never decrease
//!    while time moves forward.

#![allow(clippy::panic)]

use proptest::prelude::*;

use crate::config::EngineConfig;
use crate::domain::{Address, Amount, PoolId, Shares, Timestamp};
use crate::exchange::Exchange;
use crate::math::U256;
use crate::router::{AddLiquidity, RemoveLiquidity, Router};
use crate::traits::ManualClock;

// ---------------------------------------------------------------------------
// Shared helpers
// ---------------------------------------------------------------------------

fn addr(byte: u8) -> Address {
    Address::from_bytes([byte; 32])
}

fn token_a() -> Address {
    addr(1)
}

fn token_b() -> Address {
    addr(2)
}

const LP: u8 = 0x11;
const TRADER: u8 = 0x22;
const DEADLINE: Timestamp = Timestamp::from_secs(u64::MAX);

fn make_exchange(ra: u128, rb: u128) -> (Exchange, PoolId, ManualClock) {
    let clock = ManualClock::starting_at(1_000);
    let Ok(mut ex) = Exchange::new(EngineConfig::default(), addr(0xAD), clock.clone()) else {
        panic!("valid exchange");
    };
    let Ok(()) = ex.issue(token_a(), addr(LP), Amount::new(ra)) else {
        panic!("issue a");
    };
    let Ok(()) = ex.issue(token_b(), addr(LP), Amount::new(rb)) else {
        panic!("issue b");
    };
    let request = AddLiquidity {
        token_a: token_a(),
        token_b: token_b(),
        amount_a_desired: Amount::new(ra),
        amount_b_desired: Amount::new(rb),
        amount_a_min: Amount::ZERO,
        amount_b_min: Amount::ZERO,
        recipient: addr(LP),
        deadline: DEADLINE,
    };
    let Ok(_) = Router::add_liquidity(&mut ex, addr(LP), &request) else {
        panic!("bootstrap deposit");
    };
    let Some(pool) = ex.get_pool(token_a(), token_b()) else {
        panic!("pool created");
    };
    (ex, pool, clock)
}

fn k_of(ex: &Exchange, pool: PoolId) -> U256 {
    let Ok(reserves) = ex.get_reserves(pool) else {
        panic!("reserves");
    };
    U256::from(reserves.reserve_a.get()) * U256::from(reserves.reserve_b.get())
}

fn shares_balanced(ex: &Exchange, pool: PoolId) -> bool {
    let Ok(target) = ex.pool(pool) else {
        panic!("pool");
    };
    let sum: u128 = target.shares().holders().map(|(_, s)| s.get()).sum();
    sum == target.shares().total_supply().get()
}

fn sell(ex: &mut Exchange, from: Address, to: Address, amount: u128) -> Option<Amount> {
    let Ok(()) = ex.issue(from, addr(TRADER), Amount::new(amount)) else {
        return None;
    };
    Router::swap_exact_in(
        ex,
        addr(TRADER),
        Amount::new(amount),
        Amount::ZERO,
        &[from, to],
        addr(TRADER),
        DEADLINE,
    )
    .ok()
}

// ---------------------------------------------------------------------------
// Custom strategies
// ---------------------------------------------------------------------------

/// Reserve values in range [10_000, 10_000_000] to avoid extremes.
fn reserve_strategy() -> impl Strategy<Value = u128> {
    10_000u128..=10_000_000u128
}

/// A swap: direction flag and size in parts-per-thousand of the input reserve.
fn swap_strategy() -> impl Strategy<Value = (bool, u128)> {
    (any::<bool>(), 1u128..=300u128)
}

// ---------------------------------------------------------------------------
// Property 1 and 2: Constant product and share accounting
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_k_never_decreases(
        ra in reserve_strategy(),
        rb in reserve_strategy(),
        swaps in prop::collection::vec(swap_strategy(), 1..8),
    ) {
        let (mut ex, pool, _) = make_exchange(ra, rb);
        let mut k_prev = k_of(&ex, pool);

        for (a_to_b, per_mille) in swaps {
            let (from, to) = if a_to_b { (token_a(), token_b()) } else { (token_b(), token_a()) };
            let Ok(reserves) = ex.get_reserves(pool) else {
                panic!("reserves");
            };
            let reserve_in = if a_to_b { reserves.reserve_a } else { reserves.reserve_b };
            let amount = (reserve_in.get() * per_mille / 1_000).max(1);
            let _ = sell(&mut ex, from, to, amount);

            let k_now = k_of(&ex, pool);
            prop_assert!(k_now >= k_prev, "k decreased: {} < {}", k_now, k_prev);
            k_prev = k_now;
        }
        prop_assert!(shares_balanced(&ex, pool));
    }

    #[test]
    fn prop_shares_balanced_after_withdrawal(
        ra in reserve_strategy(),
        rb in reserve_strategy(),
        per_mille in 1u128..=1_000u128,
    ) {
        let (mut ex, pool, _) = make_exchange(ra, rb);
        let _ = sell(&mut ex, token_a(), token_b(), ra / 20);

        let Ok(held) = ex.share_balance(pool, addr(LP)) else {
            panic!("balance");
        };
        let burn = Shares::new((held.get() * per_mille / 1_000).max(1));
        let request = RemoveLiquidity {
            token_a: token_a(),
            token_b: token_b(),
            shares: burn,
            amount_a_min: Amount::ZERO,
            amount_b_min: Amount::ZERO,
            recipient: addr(LP),
            deadline: DEADLINE,
        };
        let _ = Router::remove_liquidity(&mut ex, addr(LP), &request);

        prop_assert!(shares_balanced(&ex, pool));
        let Ok(total) = ex.total_shares(pool) else {
            panic!("total");
        };
        prop_assert!(total >= EngineConfig::default().minimum_liquidity());
    }
}

// ---------------------------------------------------------------------------
// Property 3: Swap reversibility
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_round_trip_swap_loses_value(
        ra in reserve_strategy(),
        rb in reserve_strategy(),
    ) {
        let swap_in = (ra / 1_000).max(1);
        let (mut ex, _, _) = make_exchange(ra, rb);

        let Some(received_b) = sell(&mut ex, token_a(), token_b(), swap_in) else {
            return Ok(());
        };
        if received_b.is_zero() { return Ok(()); }
        let Some(final_a) = sell(&mut ex, token_b(), token_a(), received_b.get()) else {
            return Ok(());
        };

        prop_assert!(
            final_a.get() <= swap_in,
            "round-trip should lose value: final={} > original={}",
            final_a, swap_in
        );
    }
}

// ---------------------------------------------------------------------------
// Property 4: Liquidity round trip
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_add_then_remove_returns_at_most_deposit(
        ra in reserve_strategy(),
        rb in reserve_strategy(),
        per_cent in 1u128..=50u128,
    ) {
        let (mut ex, pool, _) = make_exchange(ra, rb);
        let add_a = ra * per_cent / 100;
        let add_b = rb * per_cent / 100;
        let provider = addr(0x33);
        let Ok(()) = ex.issue(token_a(), provider, Amount::new(add_a)) else {
            panic!("issue");
        };
        let Ok(()) = ex.issue(token_b(), provider, Amount::new(add_b)) else {
            panic!("issue");
        };
        let add = AddLiquidity {
            token_a: token_a(),
            token_b: token_b(),
            amount_a_desired: Amount::new(add_a),
            amount_b_desired: Amount::new(add_b),
            amount_a_min: Amount::ZERO,
            amount_b_min: Amount::ZERO,
            recipient: provider,
            deadline: DEADLINE,
        };
        let Ok((used_a, used_b, minted)) = Router::add_liquidity(&mut ex, provider, &add) else {
            return Ok(());
        };
        prop_assert!(minted.get() > 0);

        let remove = RemoveLiquidity {
            token_a: token_a(),
            token_b: token_b(),
            shares: minted,
            amount_a_min: Amount::ZERO,
            amount_b_min: Amount::ZERO,
            recipient: provider,
            deadline: DEADLINE,
        };
        let Ok((back_a, back_b)) = Router::remove_liquidity(&mut ex, provider, &remove) else {
            return Ok(());
        };
        prop_assert!(back_a <= used_a, "a: {} > {}", back_a, used_a);
        prop_assert!(back_b <= used_b, "b: {} > {}", back_b, used_b);
        prop_assert_eq!(ex.share_balance(pool, provider), Ok(Shares::ZERO));
    }
}

// ---------------------------------------------------------------------------
// Property 5: Accumulator monotonicity
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_accumulators_monotonic(
        ra in reserve_strategy(),
        rb in reserve_strategy(),
        steps in prop::collection::vec((0u64..=3_600u64, swap_strategy()), 1..8),
    ) {
        let (mut ex, pool, clock) = make_exchange(ra, rb);
        let Ok((mut prev_a, mut prev_b)) = ex.price_accumulators(pool) else {
            panic!("accumulators");
        };

        for (wait, (a_to_b, per_mille)) in steps {
            clock.advance(wait);
            let (from, to) = if a_to_b { (token_a(), token_b()) } else { (token_b(), token_a()) };
            let _ = sell(&mut ex, from, to, per_mille * 10);
            let Ok(_) = ex.sync(pool) else {
                panic!("sync");
            };
            let Ok((now_a, now_b)) = ex.price_accumulators(pool) else {
                panic!("accumulators");
            };
            prop_assert!(now_a.raw() >= prev_a.raw());
            prop_assert!(now_b.raw() >= prev_b.raw());
            if wait > 0 {
                prop_assert!(now_a.raw() > prev_a.raw());
            }
            prev_a = now_a;
            prev_b = now_b;
        }
    }
}
