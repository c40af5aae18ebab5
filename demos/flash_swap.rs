//! Flash swap walkthrough: borrow from a pool, repay inside the callback,
//! and watch an unpaid loan roll back.
//!
//! # Run
//!
//! ```bash
//! RUST_LOG=pairswap=debug cargo run --example flash_swap
//! ```

use pairswap::config::EngineConfig;
use pairswap::domain::{Address, Amount, Timestamp};
use pairswap::error::AmmError;
use pairswap::router::{get_amount_in, AddLiquidity, Router};
use pairswap::traits::{FlashSwapCallee, FlashSwapContext, ManualClock};
use pairswap::Exchange;
use tracing_subscriber::EnvFilter;

/// Repays the borrowed token plus the pool fee, or nothing at all.
struct Borrower {
    account: Address,
    token: Address,
    repay: bool,
}

impl FlashSwapCallee for Borrower {
    fn on_flash_swap(
        &mut self,
        exchange: &mut Exchange,
        context: &FlashSwapContext<'_>,
    ) -> Result<(), AmmError> {
        println!(
            "  callback: borrowed {} / {} with data {:?}",
            context.amount_a_out,
            context.amount_b_out,
            String::from_utf8_lossy(context.data)
        );
        if !self.repay {
            return Ok(());
        }
        // Same-token repayment owes out·1000/997, rounded up.
        let owed = Amount::new(context.amount_b_out.get() * 1_000 / 997 + 1);
        exchange.transfer(self.token, self.account, context.pool.address(), owed)
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    println!("=== Pairswap Flash Swap ===\n");

    let admin = Address::from_bytes([0xAD; 32]);
    let lp = Address::from_bytes([0x11; 32]);
    let borrower = Address::from_bytes([0x33; 32]);
    let dai = Address::from_bytes([1; 32]);
    let usdc = Address::from_bytes([2; 32]);

    let mut ex = Exchange::new(EngineConfig::default(), admin, ManualClock::starting_at(0))?;
    ex.issue(dai, lp, Amount::new(1_000_000))?;
    ex.issue(usdc, lp, Amount::new(1_000_000))?;
    ex.issue(usdc, borrower, Amount::new(1_000))?;

    let request = AddLiquidity {
        token_a: dai,
        token_b: usdc,
        amount_a_desired: Amount::new(1_000_000),
        amount_b_desired: Amount::new(1_000_000),
        amount_a_min: Amount::ZERO,
        amount_b_min: Amount::ZERO,
        recipient: lp,
        deadline: Timestamp::from_secs(60),
    };
    Router::add_liquidity(&mut ex, lp, &request)?;
    let Some(pool) = ex.get_pool(dai, usdc) else {
        return Err("pool missing".into());
    };
    let before = ex.get_reserves(pool)?;
    println!("Reserves: {} / {}", before.reserve_a, before.reserve_b);

    // ── 1. A loan that is paid back ─────────────────────────────────────
    println!("\n--- Repaid loan of 100 000 USDC ---");
    let mut honest = Borrower { account: borrower, token: usdc, repay: true };
    ex.swap(pool, Amount::ZERO, Amount::new(100_000), borrower, b"arbitrage", Some(&mut honest))?;
    let after = ex.get_reserves(pool)?;
    println!("  Reserves:    {} / {}", after.reserve_a, after.reserve_b);
    println!("  Borrower:    {} USDC left", ex.balance_of(usdc, borrower));

    // For comparison: the cross-token price of the same output.
    let cross = get_amount_in(
        Amount::new(100_000),
        after.reserve_a,
        after.reserve_b,
        ex.config().fee(),
    )?;
    println!("  Cross-token repayment would be {cross} DAI");

    // ── 2. A loan that is not paid back ─────────────────────────────────
    println!("\n--- Defaulted loan of 100 000 USDC ---");
    let mut deadbeat = Borrower { account: borrower, token: usdc, repay: false };
    match ex.swap(pool, Amount::ZERO, Amount::new(100_000), borrower, b"default", Some(&mut deadbeat)) {
        Ok(()) => println!("  unexpectedly settled"),
        Err(error) => println!("  rejected: {error}"),
    }
    let unchanged = ex.get_reserves(pool)?;
    println!("  Reserves:    {} / {}", unchanged.reserve_a, unchanged.reserve_b);

    println!("\n=== Done ===");
    Ok(())
}
