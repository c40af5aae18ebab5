//! Router walkthrough: create pools through deposits, trade across a
//! two-hop path, read the price oracle and withdraw.
//!
//! # Run
//!
//! ```bash
//! RUST_LOG=pairswap=debug cargo run --example router
//! ```

use pairswap::config::EngineConfig;
use pairswap::domain::{Address, Amount, Timestamp};
use pairswap::router::{AddLiquidity, RemoveLiquidity, Router};
use pairswap::traits::ManualClock;
use pairswap::Exchange;
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    println!("=== Pairswap Router ===\n");

    // ── 1. Accounts and tokens ──────────────────────────────────────────
    let admin = Address::from_bytes([0xAD; 32]);
    let alice = Address::from_bytes([0xA1; 32]);
    let bob = Address::from_bytes([0xB0; 32]);
    let usdc = Address::from_bytes([1; 32]);
    let weth = Address::from_bytes([2; 32]);
    let wbtc = Address::from_bytes([3; 32]);

    let clock = ManualClock::starting_at(1_700_000_000);
    let mut ex = Exchange::new(EngineConfig::default(), admin, clock.clone())?;
    let deadline = Timestamp::from_secs(1_700_000_000 + 3_600);

    ex.issue(usdc, alice, Amount::new(2_000_000_000))?;
    ex.issue(weth, alice, Amount::new(2_000_000))?;
    ex.issue(wbtc, alice, Amount::new(50_000))?;
    ex.issue(usdc, bob, Amount::new(10_000_000))?;

    // ── 2. Seed two pools ───────────────────────────────────────────────
    for (token_a, token_b, amount_a, amount_b) in [
        (usdc, weth, 2_000_000_000u128, 1_000_000u128),
        (weth, wbtc, 1_000_000, 50_000),
    ] {
        let request = AddLiquidity {
            token_a,
            token_b,
            amount_a_desired: Amount::new(amount_a),
            amount_b_desired: Amount::new(amount_b),
            amount_a_min: Amount::ZERO,
            amount_b_min: Amount::ZERO,
            recipient: alice,
            deadline,
        };
        let (used_a, used_b, shares) = Router::add_liquidity(&mut ex, alice, &request)?;
        println!("Deposited {used_a} / {used_b} → {shares} shares");
    }
    println!("Pools: {}", ex.registry().pool_count());

    // ── 3. Quote and execute a two-hop trade ────────────────────────────
    let path = [usdc, weth, wbtc];
    let quote = Router::get_amounts_out(&ex, Amount::new(10_000_000), &path)?;
    println!("\n--- Quote: 10 000 000 USDC → WBTC ---");
    println!("  Per hop:     {quote:?}");

    clock.advance(120);
    let min_out = quote
        .last()
        .copied()
        .ok_or("empty quote")?
        .saturating_sub(&Amount::new(1));
    let out = Router::swap_exact_in(&mut ex, bob, Amount::new(10_000_000), min_out, &path, bob, deadline)?;
    println!("  Received:    {out} WBTC");

    // ── 4. Oracle ───────────────────────────────────────────────────────
    let Some(usdc_weth) = ex.get_pool(usdc, weth) else {
        return Err("pool missing".into());
    };
    let start = ex.observe(usdc_weth)?;
    clock.advance(600);
    let end = ex.observe(usdc_weth)?;
    let (price_a, price_b) = start.twap(&end)?;
    println!("\n--- TWAP over 600s ---");
    println!("  first → second:  {price_a}");
    println!("  second → first:  {price_b}");

    // ── 5. Withdraw half of alice's position ────────────────────────────
    let held = ex.share_balance(usdc_weth, alice)?;
    let remove = RemoveLiquidity {
        token_a: usdc,
        token_b: weth,
        shares: pairswap::domain::Shares::new(held.get() / 2),
        amount_a_min: Amount::ZERO,
        amount_b_min: Amount::ZERO,
        recipient: alice,
        deadline,
    };
    let (back_usdc, back_weth) = Router::remove_liquidity(&mut ex, alice, &remove)?;
    println!("\n--- Remove Liquidity ---");
    println!("  Returned:    {back_usdc} USDC + {back_weth} WETH");

    println!("\n--- Events ---");
    for event in ex.take_events() {
        println!("  {event:?}");
    }

    println!("\n=== Done ===");
    Ok(())
}
