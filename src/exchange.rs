//! The exchange: host of every pool, the token ledger and the event log.
//!
//! # Atomicity
//!
//! Each public operation either commits all of its effects or none.
//! Single-step pool operations get there by validating everything
//! before they write.  Operations that hand control to untrusted code
//! (flash swaps) or chain several steps (the router) run inside
//! [`Exchange::atomically`], which snapshots state and restores it if
//! the closure fails.
//!
//! # Reentrancy
//!
//! Every mutating pool operation holds that pool's lock for its whole
//! duration.  A second mutating call on the same pool while the lock is
//! held (for example from inside a flash-swap callback) fails with
//! [`AmmError::Locked`].  Reads are always allowed.  A flash swap whose
//! callee triggered such a rejection fails with [`AmmError::Locked`] as a
//! whole, even if the callee swallowed the error.
//!
//! # Concurrency
//!
//! `Exchange` is `Send` and takes `&mut self` for every mutation, so
//! operations on one exchange are serialised by construction.  Hosts
//! that accept operations from several threads wrap it in
//! `Arc<Mutex<Exchange>>`.

use core::fmt;
use std::collections::BTreeSet;

use tracing::{debug, info, warn};

use crate::config::EngineConfig;
use crate::domain::{Address, Amount, PoolId, Shares, Timestamp};
use crate::error::AmmError;
use crate::events::Event;
use crate::ledger::Ledger;
use crate::math::{CheckedArithmetic, PriceCumulative};
use crate::pools::{ConstantProductPool, PriceObservation, Reserves};
use crate::registry::PoolRegistry;
use crate::traits::{Clock, FlashSwapCallee, FlashSwapContext};

/// Everything an operation may change.  Cloned to take a snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
struct State {
    ledger: Ledger,
    registry: PoolRegistry,
    events: Vec<Event>,
}

/// A constant-product exchange.
///
/// # Example
///
/// ```
/// use pairswap::config::EngineConfig;
/// use pairswap::domain::{Address, Amount, Shares};
/// use pairswap::traits::ManualClock;
/// use pairswap::Exchange;
///
/// let admin = Address::from_bytes([0xAD; 32]);
/// let lp = Address::from_bytes([0x11; 32]);
/// let (usdc, weth) = (Address::from_bytes([1; 32]), Address::from_bytes([2; 32]));
///
/// let mut ex = Exchange::new(EngineConfig::default(), admin, ManualClock::starting_at(0))
///     .expect("valid config");
/// let pool = ex.create_pool(usdc, weth).expect("new pair");
///
/// ex.issue(usdc, lp, Amount::new(10_000)).expect("issue");
/// ex.issue(weth, lp, Amount::new(40_000)).expect("issue");
/// ex.transfer(usdc, lp, pool.address(), Amount::new(10_000)).expect("deposit");
/// ex.transfer(weth, lp, pool.address(), Amount::new(40_000)).expect("deposit");
///
/// let minted = ex.mint(pool, lp).expect("first deposit");
/// assert_eq!(minted, Shares::new(19_000));
/// ```
pub struct Exchange {
    config: EngineConfig,
    clock: Box<dyn Clock>,
    state: State,
    // Pools that rejected a reentrant call while locked.  Kept outside
    // `State` so that rolling back a nested call does not erase it.
    reentered: BTreeSet<PoolId>,
}

impl fmt::Debug for Exchange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Exchange")
            .field("config", &self.config)
            .field("now", &self.clock.now())
            .field("state", &self.state)
            .field("reentered", &self.reentered)
            .finish()
    }
}

impl Exchange {
    /// Creates an exchange administered by `admin`.
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::InvalidConfiguration`] if `config` is invalid.
    pub fn new(
        config: EngineConfig,
        admin: Address,
        clock: impl Clock + 'static,
    ) -> Result<Self, AmmError> {
        config.validate()?;
        Ok(Self {
            config,
            clock: Box::new(clock),
            state: State {
                ledger: Ledger::new(),
                registry: PoolRegistry::new(admin),
                events: Vec::new(),
            },
            reentered: BTreeSet::new(),
        })
    }

    /// Returns the engine configuration.
    #[must_use]
    pub const fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Returns the current time according to the exchange's clock.
    #[must_use]
    pub fn now(&self) -> Timestamp {
        self.clock.now()
    }

    /// Returns the token ledger.
    #[must_use]
    pub const fn ledger(&self) -> &Ledger {
        &self.state.ledger
    }

    /// Returns the pool registry.
    #[must_use]
    pub const fn registry(&self) -> &PoolRegistry {
        &self.state.registry
    }

    /// Returns the pool behind `pool`.
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::UnknownPool`] for an unregistered handle.
    pub fn pool(&self, pool: PoolId) -> Result<&ConstantProductPool, AmmError> {
        self.state.registry.pool(&pool)
    }

    /// Drains the event log.
    pub fn take_events(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.state.events)
    }

    /// Runs `operation` as one all-or-nothing unit.
    ///
    /// If the closure returns an error, every state change it made
    /// (balances, pools, shares, events) is discarded.
    ///
    /// # Errors
    ///
    /// Returns the closure's error.
    pub fn atomically<T>(
        &mut self,
        operation: impl FnOnce(&mut Self) -> Result<T, AmmError>,
    ) -> Result<T, AmmError> {
        let snapshot = self.state.clone();
        let outcome = operation(self);
        if let Err(error) = &outcome {
            warn!(%error, "transaction rolled back");
            self.state = snapshot;
        }
        outcome
    }

    // -- Ledger -----------------------------------------------------------------

    /// Returns `owner`'s balance of `token`.
    #[must_use]
    pub fn balance_of(&self, token: Address, owner: Address) -> Amount {
        self.state.ledger.balance_of(&token, &owner)
    }

    /// Brings `amount` of an external `token` into the exchange for `to`.
    ///
    /// # Errors
    ///
    /// See [`Ledger::issue`].
    pub fn issue(&mut self, token: Address, to: Address, amount: Amount) -> Result<(), AmmError> {
        self.state.ledger.issue(token, to, amount)
    }

    /// Moves tokens between accounts.  Paying a pool means transferring
    /// to its custody address.
    ///
    /// # Errors
    ///
    /// See [`Ledger::transfer`].
    pub fn transfer(
        &mut self,
        token: Address,
        from: Address,
        to: Address,
        amount: Amount,
    ) -> Result<(), AmmError> {
        self.state.ledger.transfer(token, from, to, amount)
    }

    // -- Registry ---------------------------------------------------------------

    /// Registers a pool for `(token_a, token_b)`.
    ///
    /// # Errors
    ///
    /// See [`PoolRegistry::create_pool`].
    pub fn create_pool(&mut self, token_a: Address, token_b: Address) -> Result<PoolId, AmmError> {
        let now = self.now();
        let id = self.state.registry.create_pool(token_a, token_b, now)?;
        let pair = self.state.registry.pool(&id)?.pair();
        self.state.events.push(Event::PoolCreated {
            pool: id,
            pair,
            index: self.state.registry.pool_count() - 1,
        });
        Ok(id)
    }

    /// Looks up the pool for an unordered pair.
    #[must_use]
    pub fn get_pool(&self, token_a: Address, token_b: Address) -> Option<PoolId> {
        self.state.registry.get_pool(token_a, token_b)
    }

    /// Sets or clears the protocol fee recipient.
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::Forbidden`] unless `caller` is the admin.
    pub fn set_fee_recipient(
        &mut self,
        caller: Address,
        fee_recipient: Option<Address>,
    ) -> Result<(), AmmError> {
        self.state.registry.set_fee_recipient(caller, fee_recipient)?;
        self.state
            .events
            .push(Event::FeeRecipientChanged { fee_recipient });
        Ok(())
    }

    /// Hands the admin role to `new_setter`.
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::Forbidden`] unless `caller` is the admin.
    pub fn set_fee_recipient_setter(
        &mut self,
        caller: Address,
        new_setter: Address,
    ) -> Result<(), AmmError> {
        self.state
            .registry
            .set_fee_recipient_setter(caller, new_setter)
    }

    // -- Pool reads -------------------------------------------------------------

    /// Returns the pool's tracked reserves and last commit time.
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::UnknownPool`] for an unregistered handle.
    pub fn get_reserves(&self, pool: PoolId) -> Result<Reserves, AmmError> {
        Ok(self.pool(pool)?.reserves())
    }

    /// Returns the raw price accumulators as of the pool's last commit.
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::UnknownPool`] for an unregistered handle.
    pub fn price_accumulators(
        &self,
        pool: PoolId,
    ) -> Result<(PriceCumulative, PriceCumulative), AmmError> {
        Ok(self.pool(pool)?.price_accumulators())
    }

    /// Reads the price accumulators as they would stand if the pool
    /// committed right now.
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::UnknownPool`] for an unregistered handle.
    pub fn observe(&self, pool: PoolId) -> Result<PriceObservation, AmmError> {
        self.pool(pool)?.observe(self.now())
    }

    // -- Pool mutations ---------------------------------------------------------

    /// Mints shares to `recipient` for tokens already transferred to the
    /// pool's custody address.
    ///
    /// # Errors
    ///
    /// - [`AmmError::Locked`] if the pool is mid-operation.
    /// - [`AmmError::InsufficientInitialLiquidity`] /
    ///   [`AmmError::InsufficientLiquidityMinted`] for deposits too small.
    pub fn mint(&mut self, pool: PoolId, recipient: Address) -> Result<Shares, AmmError> {
        let now = self.now();
        self.guarded(pool, |ex| {
            let fee_recipient = ex.state.registry.fee_recipient();
            let State {
                ledger,
                registry,
                events,
            } = &mut ex.state;
            let target = registry.pool_mut(&pool)?;
            let delta = target.mint(ledger, &ex.config, fee_recipient, recipient, now)?;
            let reserves = target.reserves();
            debug!(
                pool = %pool,
                %recipient,
                amount_a = %delta.amount_a,
                amount_b = %delta.amount_b,
                shares = %delta.shares,
                "liquidity minted"
            );
            events.push(Event::Mint {
                pool,
                recipient,
                amount_a: delta.amount_a,
                amount_b: delta.amount_b,
                shares: delta.shares,
            });
            events.push(Event::Sync {
                pool,
                reserve_a: reserves.reserve_a,
                reserve_b: reserves.reserve_b,
            });
            Ok(delta.shares)
        })
    }

    /// Burns the shares held in the pool's custody and pays the
    /// proportional reserves to `recipient`.
    ///
    /// Returns `(amount_a, amount_b)` in the pair's canonical order.
    ///
    /// # Errors
    ///
    /// - [`AmmError::Locked`] if the pool is mid-operation.
    /// - [`AmmError::InsufficientLiquidityBurned`] if a payout rounds to zero.
    pub fn burn(&mut self, pool: PoolId, recipient: Address) -> Result<(Amount, Amount), AmmError> {
        let now = self.now();
        self.guarded(pool, |ex| {
            let fee_recipient = ex.state.registry.fee_recipient();
            let State {
                ledger,
                registry,
                events,
            } = &mut ex.state;
            let target = registry.pool_mut(&pool)?;
            let delta = target.burn(ledger, &ex.config, fee_recipient, recipient, now)?;
            let reserves = target.reserves();
            debug!(
                pool = %pool,
                %recipient,
                amount_a = %delta.amount_a,
                amount_b = %delta.amount_b,
                shares = %delta.shares,
                "liquidity burned"
            );
            events.push(Event::Burn {
                pool,
                recipient,
                amount_a: delta.amount_a,
                amount_b: delta.amount_b,
                shares: delta.shares,
            });
            events.push(Event::Sync {
                pool,
                reserve_a: reserves.reserve_a,
                reserve_b: reserves.reserve_b,
            });
            Ok((delta.amount_a, delta.amount_b))
        })
    }

    /// Sends `amount_a_out` / `amount_b_out` to `recipient` against
    /// payment already made, or, with non-empty `data`, as a flash swap.
    ///
    /// With non-empty `data` the output is transferred first, then
    /// `callee` is invoked and must repay before it returns.  If the
    /// repayment falls short, or the callee fails, nothing persists.
    ///
    /// # Errors
    ///
    /// - [`AmmError::MissingCallee`] if `data` is non-empty and no callee
    ///   is given.
    /// - [`AmmError::Locked`] if the pool is mid-operation.
    /// - [`AmmError::InsufficientOutputAmount`] if both outputs are zero.
    /// - [`AmmError::InsufficientLiquidity`] if an output reaches its reserve.
    /// - [`AmmError::InsufficientInputAmount`] if nothing was paid in.
    /// - [`AmmError::KInvariantViolated`] if the payment is too small.
    /// - Any error returned by the callee.
    pub fn swap(
        &mut self,
        pool: PoolId,
        amount_a_out: Amount,
        amount_b_out: Amount,
        recipient: Address,
        data: &[u8],
        callee: Option<&mut dyn FlashSwapCallee>,
    ) -> Result<(), AmmError> {
        if data.is_empty() {
            return self.guarded(pool, move |ex| {
                ex.direct_swap(pool, amount_a_out, amount_b_out, recipient)
            });
        }
        let callee = callee.ok_or(AmmError::MissingCallee)?;
        self.atomically(move |ex| {
            ex.guarded(pool, move |ex| {
                ex.flash_swap(pool, amount_a_out, amount_b_out, recipient, data, callee)
            })
        })
    }

    /// Sends any held surplus above the tracked reserves to `recipient`.
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::Locked`] if the pool is mid-operation.
    pub fn skim(&mut self, pool: PoolId, recipient: Address) -> Result<(Amount, Amount), AmmError> {
        self.guarded(pool, |ex| {
            let State {
                ledger, registry, ..
            } = &mut ex.state;
            let (excess_a, excess_b) = registry.pool(&pool)?.skim(ledger, recipient)?;
            debug!(pool = %pool, %recipient, %excess_a, %excess_b, "surplus skimmed");
            Ok((excess_a, excess_b))
        })
    }

    /// Resets the tracked reserves to the pool's held balances.
    ///
    /// # Errors
    ///
    /// - [`AmmError::Locked`] if the pool is mid-operation.
    /// - [`AmmError::Overflow`] if a held balance exceeds the reserve bound.
    pub fn sync(&mut self, pool: PoolId) -> Result<Reserves, AmmError> {
        let now = self.now();
        self.guarded(pool, |ex| {
            let State {
                ledger,
                registry,
                events,
            } = &mut ex.state;
            let reserves = registry.pool_mut(&pool)?.sync(ledger, now)?;
            debug!(
                pool = %pool,
                reserve_a = %reserves.reserve_a,
                reserve_b = %reserves.reserve_b,
                "reserves synced"
            );
            events.push(Event::Sync {
                pool,
                reserve_a: reserves.reserve_a,
                reserve_b: reserves.reserve_b,
            });
            Ok(reserves)
        })
    }

    // -- Liquidity shares -------------------------------------------------------

    /// Returns `owner`'s share balance in `pool`.
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::UnknownPool`] for an unregistered handle.
    pub fn share_balance(&self, pool: PoolId, owner: Address) -> Result<Shares, AmmError> {
        Ok(self.pool(pool)?.shares().balance_of(&owner))
    }

    /// Returns the total share supply of `pool`.
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::UnknownPool`] for an unregistered handle.
    pub fn total_shares(&self, pool: PoolId) -> Result<Shares, AmmError> {
        Ok(self.pool(pool)?.shares().total_supply())
    }

    /// Moves shares of `pool` between holders.  Sending shares to the
    /// pool's custody address queues them for [`burn`](Self::burn).
    ///
    /// # Errors
    ///
    /// See [`LiquidityShares::transfer`](crate::pools::LiquidityShares::transfer).
    pub fn transfer_shares(
        &mut self,
        pool: PoolId,
        from: Address,
        to: Address,
        amount: Shares,
    ) -> Result<(), AmmError> {
        self.state
            .registry
            .pool_mut(&pool)?
            .shares_mut()
            .transfer(from, to, amount)
    }

    /// Mints shares directly.  Only the pool itself may mint, so this
    /// fails for every external caller.
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::Forbidden`] unless `caller` is the pool.
    pub fn mint_shares(
        &mut self,
        caller: Address,
        pool: PoolId,
        to: Address,
        amount: Shares,
    ) -> Result<(), AmmError> {
        self.state
            .registry
            .pool_mut(&pool)?
            .shares_mut()
            .mint(caller, to, amount)
    }

    /// Burns shares directly.  Only the pool itself may burn, so this
    /// fails for every external caller.
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::Forbidden`] unless `caller` is the pool.
    pub fn burn_shares(
        &mut self,
        caller: Address,
        pool: PoolId,
        from: Address,
        amount: Shares,
    ) -> Result<(), AmmError> {
        self.state
            .registry
            .pool_mut(&pool)?
            .shares_mut()
            .burn(caller, from, amount)
    }

    // -- Internals --------------------------------------------------------------

    /// Holds `pool`'s lock while `operation` runs and releases it on
    /// every exit path.  A call that finds the lock held fails without
    /// touching it and marks the pool as reentered.
    fn guarded<T>(
        &mut self,
        pool: PoolId,
        operation: impl FnOnce(&mut Self) -> Result<T, AmmError>,
    ) -> Result<T, AmmError> {
        if let Err(error) = self.state.registry.pool_mut(&pool)?.lock() {
            warn!(pool = %pool, "rejected reentrant call");
            self.reentered.insert(pool);
            return Err(error);
        }
        let outcome = operation(self);
        if let Ok(target) = self.state.registry.pool_mut(&pool) {
            target.unlock();
        }
        self.reentered.remove(&pool);
        outcome
    }

    /// Validates against projected balances, then pays out and commits.
    fn direct_swap(
        &mut self,
        pool: PoolId,
        amount_a_out: Amount,
        amount_b_out: Amount,
        recipient: Address,
    ) -> Result<(), AmmError> {
        let now = self.now();
        let State {
            ledger,
            registry,
            events,
        } = &mut self.state;
        let target = registry.pool_mut(&pool)?;
        target.check_swap_request(amount_a_out, amount_b_out)?;

        let pair = target.pair();
        let custody = target.address();
        let (held_a, held_b) = target.held_balances(ledger);
        let (balance_a, balance_b) = if recipient == custody {
            (held_a, held_b)
        } else {
            (held_a.safe_sub(&amount_a_out)?, held_b.safe_sub(&amount_b_out)?)
        };
        let (amount_a_in, amount_b_in) =
            target.verify_swap(balance_a, balance_b, amount_a_out, amount_b_out, &self.config)?;

        ledger.transfer(pair.first(), custody, recipient, amount_a_out)?;
        ledger.transfer(pair.second(), custody, recipient, amount_b_out)?;
        target.commit(balance_a, balance_b, now)?;

        debug!(
            pool = %pool,
            %recipient,
            %amount_a_in,
            %amount_b_in,
            %amount_a_out,
            %amount_b_out,
            "swap settled"
        );
        events.push(Event::Swap {
            pool,
            recipient,
            amount_a_in,
            amount_b_in,
            amount_a_out,
            amount_b_out,
        });
        events.push(Event::Sync {
            pool,
            reserve_a: balance_a,
            reserve_b: balance_b,
        });
        Ok(())
    }

    /// Pays out optimistically, runs the callee, then re-measures and
    /// verifies.  Must run inside [`atomically`](Self::atomically).
    fn flash_swap(
        &mut self,
        pool: PoolId,
        amount_a_out: Amount,
        amount_b_out: Amount,
        recipient: Address,
        data: &[u8],
        callee: &mut dyn FlashSwapCallee,
    ) -> Result<(), AmmError> {
        let (pair, custody) = {
            let target = self.state.registry.pool(&pool)?;
            target.check_swap_request(amount_a_out, amount_b_out)?;
            (target.pair(), target.address())
        };
        self.state
            .ledger
            .transfer(pair.first(), custody, recipient, amount_a_out)?;
        self.state
            .ledger
            .transfer(pair.second(), custody, recipient, amount_b_out)?;

        debug!(pool = %pool, %recipient, %amount_a_out, %amount_b_out, "flash swap callback");
        let context = FlashSwapContext {
            pool,
            amount_a_out,
            amount_b_out,
            data,
        };
        callee.on_flash_swap(self, &context)?;
        if self.reentered.remove(&pool) {
            warn!(pool = %pool, "callee re-entered the pool");
            return Err(AmmError::Locked);
        }

        let now = self.now();
        let State {
            ledger,
            registry,
            events,
        } = &mut self.state;
        let target = registry.pool_mut(&pool)?;
        let (balance_a, balance_b) = target.held_balances(ledger);
        let (amount_a_in, amount_b_in) =
            target.verify_swap(balance_a, balance_b, amount_a_out, amount_b_out, &self.config)?;
        target.commit(balance_a, balance_b, now)?;

        info!(
            pool = %pool,
            %recipient,
            %amount_a_in,
            %amount_b_in,
            %amount_a_out,
            %amount_b_out,
            "flash swap settled"
        );
        events.push(Event::Swap {
            pool,
            recipient,
            amount_a_in,
            amount_b_in,
            amount_a_out,
            amount_b_out,
        });
        events.push(Event::Sync {
            pool,
            reserve_a: balance_a,
            reserve_b: balance_b,
        });
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::traits::ManualClock;

    fn addr(byte: u8) -> Address {
        Address::from_bytes([byte; 32])
    }

    const ADMIN: u8 = 0xAD;
    const LP: u8 = 0x11;
    const TRADER: u8 = 0x22;
    const TOKEN_A: u8 = 1;
    const TOKEN_B: u8 = 2;

    fn seeded(a: u128, b: u128) -> (Exchange, PoolId, ManualClock) {
        let clock = ManualClock::starting_at(1_000);
        let Ok(mut ex) = Exchange::new(EngineConfig::default(), addr(ADMIN), clock.clone()) else {
            panic!("exchange");
        };
        let Ok(pool) = ex.create_pool(addr(TOKEN_A), addr(TOKEN_B)) else {
            panic!("create pool");
        };
        for (token, amount) in [(TOKEN_A, a), (TOKEN_B, b)] {
            let Ok(()) = ex.issue(addr(token), addr(LP), Amount::new(amount)) else {
                panic!("issue");
            };
            let Ok(()) = ex.transfer(addr(token), addr(LP), pool.address(), Amount::new(amount))
            else {
                panic!("deposit");
            };
        }
        let Ok(_) = ex.mint(pool, addr(LP)) else {
            panic!("bootstrap");
        };
        let _ = ex.take_events();
        (ex, pool, clock)
    }

    fn pay_in(ex: &mut Exchange, pool: PoolId, token: u8, amount: u128) {
        let Ok(()) = ex.issue(addr(token), addr(TRADER), Amount::new(amount)) else {
            panic!("issue");
        };
        let Ok(()) = ex.transfer(addr(token), addr(TRADER), pool.address(), Amount::new(amount))
        else {
            panic!("pay in");
        };
    }

    #[test]
    fn invalid_config_rejected() {
        // Plain deserialization skips validation.
        let Ok(cfg) = toml::from_str::<EngineConfig>("protocol_fee_divisor = 1") else {
            panic!("parses");
        };
        assert!(matches!(
            Exchange::new(cfg, addr(ADMIN), ManualClock::default()),
            Err(AmmError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn direct_swap_settles_and_logs() {
        let (mut ex, pool, _) = seeded(10_000, 20_000);
        pay_in(&mut ex, pool, TOKEN_A, 1_000);
        let Ok(()) = ex.swap(pool, Amount::ZERO, Amount::new(1_813), addr(TRADER), &[], None)
        else {
            panic!("swap");
        };
        assert_eq!(ex.balance_of(addr(TOKEN_B), addr(TRADER)), Amount::new(1_813));
        let Ok(reserves) = ex.get_reserves(pool) else {
            panic!("reserves");
        };
        assert_eq!(reserves.reserve_a, Amount::new(11_000));
        assert_eq!(reserves.reserve_b, Amount::new(18_187));
        let events = ex.take_events();
        assert!(matches!(events.first(), Some(Event::Swap { .. })));
        assert!(matches!(events.get(1), Some(Event::Sync { .. })));
    }

    #[test]
    fn failed_direct_swap_changes_nothing() {
        let (mut ex, pool, _) = seeded(10_000, 20_000);
        pay_in(&mut ex, pool, TOKEN_A, 1_000);
        let before = ex.state.clone();
        assert_eq!(
            ex.swap(pool, Amount::ZERO, Amount::new(1_814), addr(TRADER), &[], None),
            Err(AmmError::KInvariantViolated)
        );
        assert_eq!(ex.state, before);
    }

    #[test]
    fn flash_data_without_callee_rejected() {
        let (mut ex, pool, _) = seeded(10_000, 20_000);
        assert_eq!(
            ex.swap(pool, Amount::ZERO, Amount::new(1), addr(TRADER), b"x", None),
            Err(AmmError::MissingCallee)
        );
    }

    #[test]
    fn atomically_restores_on_error() {
        let (mut ex, pool, _) = seeded(10_000, 20_000);
        let before = ex.state.clone();
        let result: Result<(), AmmError> = ex.atomically(|ex| {
            ex.issue(addr(TOKEN_A), addr(TRADER), Amount::new(5))?;
            ex.transfer(addr(TOKEN_A), addr(TRADER), pool.address(), Amount::new(5))?;
            ex.sync(pool)?;
            Err(AmmError::Expired)
        });
        assert_eq!(result, Err(AmmError::Expired));
        assert_eq!(ex.state, before);
    }

    #[test]
    fn skim_then_sync_reconcile() {
        let (mut ex, pool, clock) = seeded(10_000, 20_000);
        pay_in(&mut ex, pool, TOKEN_B, 50);
        let Ok((a, b)) = ex.skim(pool, addr(TRADER)) else {
            panic!("skim");
        };
        assert_eq!((a, b), (Amount::ZERO, Amount::new(50)));

        pay_in(&mut ex, pool, TOKEN_A, 500);
        clock.advance(10);
        let Ok(reserves) = ex.sync(pool) else {
            panic!("sync");
        };
        assert_eq!(reserves.reserve_a, Amount::new(10_500));
        assert_eq!(reserves.last_sync, Timestamp::from_secs(1_010));
        assert_eq!(ex.total_shares(pool), Ok(Shares::new(14_142)));
    }

    #[test]
    fn external_share_mint_forbidden() {
        let (mut ex, pool, _) = seeded(10_000, 20_000);
        assert_eq!(
            ex.mint_shares(addr(TRADER), pool, addr(TRADER), Shares::new(1)),
            Err(AmmError::Forbidden)
        );
        assert_eq!(
            ex.burn_shares(addr(LP), pool, addr(LP), Shares::new(1)),
            Err(AmmError::Forbidden)
        );
    }

    #[test]
    fn observe_tracks_clock() {
        let (ex, pool, clock) = seeded(10_000, 40_000);
        clock.advance(3);
        let Ok(obs) = ex.observe(pool) else {
            panic!("observe");
        };
        assert_eq!(obs.timestamp, Timestamp::from_secs(1_003));
        assert_eq!(
            obs.price_a_cumulative.raw(),
            crate::math::U256::from(12u64) << 112usize
        );
    }

    #[test]
    fn unknown_pool_reported() {
        let (mut ex, _, _) = seeded(10_000, 20_000);
        let Ok(pair) = crate::domain::TokenPair::new(addr(7), addr(8)) else {
            panic!("pair");
        };
        let ghost = PoolId::derive(&pair);
        assert_eq!(ex.sync(ghost), Err(AmmError::UnknownPool));
        assert!(ex.get_reserves(ghost).is_err());
    }

    #[test]
    fn exchange_is_send() {
        fn assert_send<T: Send>() {}
        assert_send::<Exchange>();
    }
}
