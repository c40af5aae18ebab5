//! # Pairswap
//!
//! A two-token constant-product exchange engine (Uniswap V2 style):
//! permissionless pool creation, share-based liquidity provision,
//! fee-bearing swaps with flash-swap support, a manipulation-resistant
//! cumulative price oracle, and a deadline- and slippage-checked router
//! for multi-hop trades.
//!
//! Everything runs over an in-process token [`Ledger`](ledger::Ledger).
//! Pools hold their tokens in custody accounts on that ledger and measure
//! deposits and repayments themselves, so no operation ever trusts a
//! caller's claim about what it paid.
//!
//! # Quick Start
//!
//! ```rust
//! use pairswap::config::EngineConfig;
//! use pairswap::domain::{Address, Amount, Timestamp};
//! use pairswap::router::{AddLiquidity, Router};
//! use pairswap::traits::ManualClock;
//! use pairswap::Exchange;
//!
//! let admin = Address::from_bytes([0xAD; 32]);
//! let alice = Address::from_bytes([0xA1; 32]);
//! let usdc = Address::from_bytes([1; 32]);
//! let weth = Address::from_bytes([2; 32]);
//! let deadline = Timestamp::from_secs(60);
//!
//! let mut ex = Exchange::new(EngineConfig::default(), admin, ManualClock::starting_at(0))
//!     .expect("valid config");
//! ex.issue(usdc, alice, Amount::new(1_010_000)).expect("issue");
//! ex.issue(weth, alice, Amount::new(1_000_000)).expect("issue");
//!
//! // 1. Provide liquidity; the pool is created on first deposit.
//! let request = AddLiquidity {
//!     token_a: usdc,
//!     token_b: weth,
//!     amount_a_desired: Amount::new(1_000_000),
//!     amount_b_desired: Amount::new(1_000_000),
//!     amount_a_min: Amount::ZERO,
//!     amount_b_min: Amount::ZERO,
//!     recipient: alice,
//!     deadline,
//! };
//! let (_, _, shares) = Router::add_liquidity(&mut ex, alice, &request).expect("deposit");
//! assert!(shares.get() > 0);
//!
//! // 2. Sell 10 000 USDC for as much WETH as the pool gives.
//! let out = Router::swap_exact_in(
//!     &mut ex, alice, Amount::new(10_000), Amount::new(9_800), &[usdc, weth], alice, deadline,
//! )
//! .expect("swap");
//! assert!(out.get() >= 9_800);
//! ```
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐
//! │   Router     │  deadlines, slippage bounds, multi-hop paths
//! └──────┬──────┘
//!        │ atomically(..)
//!        ▼
//! ┌─────────────┐
//! │  Exchange    │  ledger, registry, event log, reentrancy locks
//! └──────┬──────┘
//!        │ mint / burn / swap / skim / sync
//!        ▼
//! ┌─────────────┐
//! │    Pools     │  ConstantProductPool + LiquidityShares + price oracle
//! └──────┬──────┘
//!        ▼
//! ┌─────────────┐
//! │ Domain/Math  │  Amount, Shares, TokenPair, U256, Uq112x112, …
//! └─────────────┘
//! ```
//!
//! # Module Guide
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`domain`] | Newtype value types: [`Amount`](domain::Amount), [`Shares`](domain::Shares), [`TokenPair`](domain::TokenPair), [`PoolId`](domain::PoolId), etc. |
//! | [`math`]   | Checked arithmetic, 256-bit intermediates, 112.112 fixed point |
//! | [`config`] | [`EngineConfig`](config::EngineConfig): fee, minimum liquidity, protocol fee |
//! | [`ledger`] | Multi-token balance ledger |
//! | [`pools`]  | [`ConstantProductPool`](pools::ConstantProductPool), share accounting, oracle readings |
//! | [`registry`] | [`PoolRegistry`](registry::PoolRegistry): one pool per pair, fee administration |
//! | [`router`] | [`Router`](router::Router) and pure pricing functions |
//! | [`traits`] | [`Clock`](traits::Clock) and [`FlashSwapCallee`](traits::FlashSwapCallee) |
//! | [`events`] | [`Event`](events::Event) log entries |
//! | [`error`]  | [`AmmError`](error::AmmError) unified error enum |
//! | [`prelude`] | Convenience re-exports for common types and traits |

pub mod config;
pub mod domain;
pub mod error;
pub mod events;
pub mod exchange;
pub mod ledger;
pub mod math;
pub mod pools;
pub mod prelude;
pub mod registry;
pub mod router;
pub mod traits;

pub use exchange::Exchange;
