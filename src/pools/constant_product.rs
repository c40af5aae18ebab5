//! Constant-product pool (Uniswap V2 style) over ledger custody.
//!
//! A pool never takes an amount on faith.  Deposits and repayments are
//! made by transferring tokens to the pool's custody address on the
//! [`Ledger`]; each operation then measures the pool's held balances
//! against its tracked reserves and derives what was paid in.
//!
//! # Swap Invariant
//!
//! With fee `N / D`, every swap must leave
//!
//! ```text
//! (balance_a·D − in_a·N) · (balance_b·D − in_b·N) ≥ reserve_a · reserve_b · D²
//! ```
//!
//! so the product of reserves never decreases and the fee portion of the
//! input accrues to liquidity providers.
//!
//! # Mutation Discipline
//!
//! The pool exposes its mutating steps to the [`Exchange`] as separate
//! crate-private pieces (`check_swap_request`, `verify_swap`, `commit`)
//! because a flash swap interleaves an external callback between them.
//! Each piece validates before it writes.
//!
//! [`Exchange`]: crate::Exchange

use serde::Serialize;

use crate::config::EngineConfig;
use crate::domain::{Address, Amount, PoolId, Rounding, Shares, Timestamp, TokenPair};
use crate::error::AmmError;
use crate::ledger::Ledger;
use crate::math::{
    isqrt, mul_div, narrow, CheckedArithmetic, PriceCumulative, Uq112x112, MAX_RESERVE, U256,
};
use crate::pools::oracle::PriceObservation;
use crate::pools::shares::{LiquidityShares, BURN_ADDRESS};

/// Tracked reserves and the time they were last committed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Reserves {
    /// Reserve of the pair's first token.
    pub reserve_a: Amount,
    /// Reserve of the pair's second token.
    pub reserve_b: Amount,
    /// When the reserves were last committed.
    pub last_sync: Timestamp,
}

/// Token amounts and shares moved by a `mint` or `burn`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct LiquidityDelta {
    /// Units of the first token deposited or withdrawn.
    pub amount_a: Amount,
    /// Units of the second token deposited or withdrawn.
    pub amount_b: Amount,
    /// Shares minted or burned.
    pub shares: Shares,
}

/// A constant-product pool for one canonical token pair.
///
/// # State
///
/// - `reserve_a` / `reserve_b`: last committed view of the pool's holdings
///   (in raw token units), never above [`MAX_RESERVE`]
/// - `price_a_cumulative` / `price_b_cumulative`: time-integrated prices
/// - `k_last`: `reserve_a × reserve_b` after the last liquidity event,
///   tracked only while a protocol fee recipient is set
/// - `locked`: reentrancy flag held for the duration of a mutating call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConstantProductPool {
    id: PoolId,
    pair: TokenPair,
    reserve_a: Amount,
    reserve_b: Amount,
    last_sync: Timestamp,
    price_a_cumulative: PriceCumulative,
    price_b_cumulative: PriceCumulative,
    k_last: U256,
    shares: LiquidityShares,
    locked: bool,
}

impl ConstantProductPool {
    /// Creates an empty pool for `pair`.
    #[must_use]
    pub fn new(pair: TokenPair, now: Timestamp) -> Self {
        let id = PoolId::derive(&pair);
        Self {
            id,
            pair,
            reserve_a: Amount::ZERO,
            reserve_b: Amount::ZERO,
            last_sync: now,
            price_a_cumulative: PriceCumulative::ZERO,
            price_b_cumulative: PriceCumulative::ZERO,
            k_last: U256::zero(),
            shares: LiquidityShares::new(id.address()),
            locked: false,
        }
    }

    /// Returns the pool's handle.
    #[must_use]
    pub const fn id(&self) -> PoolId {
        self.id
    }

    /// Returns the canonical token pair.
    #[must_use]
    pub const fn pair(&self) -> TokenPair {
        self.pair
    }

    /// Returns the custody address holding the pool's tokens.
    #[must_use]
    pub const fn address(&self) -> Address {
        self.id.address()
    }

    /// Returns the tracked reserves.
    #[must_use]
    pub const fn reserves(&self) -> Reserves {
        Reserves {
            reserve_a: self.reserve_a,
            reserve_b: self.reserve_b,
            last_sync: self.last_sync,
        }
    }

    /// Returns the raw price accumulators `(price_a, price_b)` as of the
    /// last commit.
    #[must_use]
    pub const fn price_accumulators(&self) -> (PriceCumulative, PriceCumulative) {
        (self.price_a_cumulative, self.price_b_cumulative)
    }

    /// Returns `reserve_a × reserve_b` recorded at the last liquidity event.
    #[must_use]
    pub const fn k_last(&self) -> U256 {
        self.k_last
    }

    /// Returns the pool's share ledger.
    #[must_use]
    pub const fn shares(&self) -> &LiquidityShares {
        &self.shares
    }

    /// Returns `true` while a mutating call is in progress.
    #[must_use]
    pub const fn is_locked(&self) -> bool {
        self.locked
    }

    /// Accumulators extrapolated to `now` from the current reserves,
    /// without writing anything.
    ///
    /// # Errors
    ///
    /// Propagates fixed-point encoding failures, which cannot occur for
    /// committed reserves.
    pub fn observe(&self, now: Timestamp) -> Result<PriceObservation, AmmError> {
        let (price_a_cumulative, price_b_cumulative) = self.accrued(now)?;
        Ok(PriceObservation {
            price_a_cumulative,
            price_b_cumulative,
            timestamp: now.max(self.last_sync),
        })
    }

    // -- Guard ----------------------------------------------------------------

    pub(crate) fn lock(&mut self) -> Result<(), AmmError> {
        if self.locked {
            return Err(AmmError::Locked);
        }
        self.locked = true;
        Ok(())
    }

    pub(crate) fn unlock(&mut self) {
        self.locked = false;
    }

    pub(crate) fn shares_mut(&mut self) -> &mut LiquidityShares {
        &mut self.shares
    }

    // -- Liquidity --------------------------------------------------------------

    /// Mints shares for whatever was deposited since the last commit.
    ///
    /// # Errors
    ///
    /// - [`AmmError::InsufficientInitialLiquidity`] if a first deposit does
    ///   not exceed the locked minimum.
    /// - [`AmmError::InsufficientLiquidityMinted`] if a later deposit earns
    ///   zero shares.
    /// - [`AmmError::Overflow`] if a balance exceeds [`MAX_RESERVE`].
    pub(crate) fn mint(
        &mut self,
        ledger: &Ledger,
        config: &EngineConfig,
        fee_recipient: Option<Address>,
        to: Address,
        now: Timestamp,
    ) -> Result<LiquidityDelta, AmmError> {
        let (balance_a, balance_b) = self.held_balances(ledger);
        check_reserve_bounds(balance_a, balance_b)?;
        let amount_a = balance_a.safe_sub(&self.reserve_a)?;
        let amount_b = balance_b.safe_sub(&self.reserve_b)?;

        let fee_shares = self.protocol_fee_shares(fee_recipient, config.protocol_fee_divisor())?;
        let supply = self.shares.total_supply().safe_add(&fee_shares)?;

        let (liquidity, locked) = if supply.is_zero() {
            let minimum = config.minimum_liquidity();
            let root = isqrt(U256::from(amount_a.get()) * U256::from(amount_b.get()));
            let root = Shares::new(narrow(root, "initial liquidity exceeds u128")?);
            let liquidity = root
                .checked_sub(&minimum)
                .filter(|s| !s.is_zero())
                .ok_or(AmmError::InsufficientInitialLiquidity)?;
            (liquidity, minimum)
        } else {
            let by_a = mul_div(amount_a.get(), supply.get(), self.reserve_a.get(), Rounding::Down)?;
            let by_b = mul_div(amount_b.get(), supply.get(), self.reserve_b.get(), Rounding::Down)?;
            let liquidity = Shares::new(by_a.min(by_b));
            if liquidity.is_zero() {
                return Err(AmmError::InsufficientLiquidityMinted);
            }
            (liquidity, Shares::ZERO)
        };
        supply.safe_add(&liquidity)?.safe_add(&locked)?;

        let custody = self.address();
        if let Some(recipient) = fee_recipient {
            if !fee_shares.is_zero() {
                self.shares.mint(custody, recipient, fee_shares)?;
            }
        }
        if !locked.is_zero() {
            self.shares.mint(custody, BURN_ADDRESS, locked)?;
        }
        self.shares.mint(custody, to, liquidity)?;
        self.commit(balance_a, balance_b, now)?;
        self.refresh_k_last(fee_recipient.is_some());

        Ok(LiquidityDelta {
            amount_a,
            amount_b,
            shares: liquidity,
        })
    }

    /// Burns the shares held in the pool's own custody and pays out the
    /// proportional share of reserves to `to`.
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::InsufficientLiquidityBurned`] if nothing is
    /// held for burning or either payout rounds to zero.
    pub(crate) fn burn(
        &mut self,
        ledger: &mut Ledger,
        config: &EngineConfig,
        fee_recipient: Option<Address>,
        to: Address,
        now: Timestamp,
    ) -> Result<LiquidityDelta, AmmError> {
        let custody = self.address();
        let liquidity = self.shares.balance_of(&custody);
        if liquidity.is_zero() {
            return Err(AmmError::InsufficientLiquidityBurned);
        }
        let (held_a, held_b) = self.held_balances(ledger);

        let fee_shares = self.protocol_fee_shares(fee_recipient, config.protocol_fee_divisor())?;
        let supply = self.shares.total_supply().safe_add(&fee_shares)?;
        let amount_a = Amount::new(mul_div(
            liquidity.get(),
            self.reserve_a.get(),
            supply.get(),
            Rounding::Down,
        )?);
        let amount_b = Amount::new(mul_div(
            liquidity.get(),
            self.reserve_b.get(),
            supply.get(),
            Rounding::Down,
        )?);
        if amount_a.is_zero() || amount_b.is_zero() {
            return Err(AmmError::InsufficientLiquidityBurned);
        }
        let balance_a = held_a
            .checked_sub(&amount_a)
            .ok_or(AmmError::InsufficientBalance)?;
        let balance_b = held_b
            .checked_sub(&amount_b)
            .ok_or(AmmError::InsufficientBalance)?;
        check_reserve_bounds(balance_a, balance_b)?;

        if let Some(recipient) = fee_recipient {
            if !fee_shares.is_zero() {
                self.shares.mint(custody, recipient, fee_shares)?;
            }
        }
        self.shares.burn(custody, custody, liquidity)?;
        ledger.transfer(self.pair.first(), custody, to, amount_a)?;
        ledger.transfer(self.pair.second(), custody, to, amount_b)?;
        self.commit(balance_a, balance_b, now)?;
        self.refresh_k_last(fee_recipient.is_some());

        Ok(LiquidityDelta {
            amount_a,
            amount_b,
            shares: liquidity,
        })
    }

    // -- Swap -------------------------------------------------------------------

    /// Rejects a swap request that cannot be served from current reserves.
    ///
    /// # Errors
    ///
    /// - [`AmmError::InsufficientOutputAmount`] if both outputs are zero.
    /// - [`AmmError::InsufficientLiquidity`] if an output reaches its reserve.
    pub(crate) fn check_swap_request(
        &self,
        amount_a_out: Amount,
        amount_b_out: Amount,
    ) -> Result<(), AmmError> {
        if amount_a_out.is_zero() && amount_b_out.is_zero() {
            return Err(AmmError::InsufficientOutputAmount);
        }
        if amount_a_out >= self.reserve_a || amount_b_out >= self.reserve_b {
            return Err(AmmError::InsufficientLiquidity);
        }
        Ok(())
    }

    /// Derives the amounts paid in from post-swap balances and checks the
    /// fee-adjusted constant product against the current reserves.
    ///
    /// Returns `(amount_a_in, amount_b_in)`.
    ///
    /// # Errors
    ///
    /// - [`AmmError::InsufficientInputAmount`] if nothing was paid in.
    /// - [`AmmError::KInvariantViolated`] if the adjusted product shrank.
    /// - [`AmmError::Overflow`] if a balance exceeds [`MAX_RESERVE`].
    pub(crate) fn verify_swap(
        &self,
        balance_a: Amount,
        balance_b: Amount,
        amount_a_out: Amount,
        amount_b_out: Amount,
        config: &EngineConfig,
    ) -> Result<(Amount, Amount), AmmError> {
        check_reserve_bounds(balance_a, balance_b)?;
        let amount_a_in = balance_a.saturating_sub(&self.reserve_a.saturating_sub(&amount_a_out));
        let amount_b_in = balance_b.saturating_sub(&self.reserve_b.saturating_sub(&amount_b_out));
        if amount_a_in.is_zero() && amount_b_in.is_zero() {
            return Err(AmmError::InsufficientInputAmount);
        }

        let fee = config.fee();
        let numer = U256::from(fee.numerator());
        let denom = U256::from(fee.denominator());
        // in ≤ balance and N < D, so neither adjusted balance underflows.
        let adjusted_a = U256::from(balance_a.get()) * denom - U256::from(amount_a_in.get()) * numer;
        let adjusted_b = U256::from(balance_b.get()) * denom - U256::from(amount_b_in.get()) * numer;
        let lhs = adjusted_a
            .checked_mul(adjusted_b)
            .ok_or(AmmError::Overflow("adjusted balance product overflow"))?;
        let rhs = (U256::from(self.reserve_a.get()) * U256::from(self.reserve_b.get()))
            .checked_mul(denom * denom)
            .ok_or(AmmError::Overflow("reserve product overflow"))?;
        if lhs < rhs {
            return Err(AmmError::KInvariantViolated);
        }
        Ok((amount_a_in, amount_b_in))
    }

    // -- Reconciliation ---------------------------------------------------------

    /// Sends any held surplus above the tracked reserves to `to`.
    ///
    /// Returns the amounts sent.
    ///
    /// # Errors
    ///
    /// Propagates ledger failures.
    pub(crate) fn skim(&self, ledger: &mut Ledger, to: Address) -> Result<(Amount, Amount), AmmError> {
        let (balance_a, balance_b) = self.held_balances(ledger);
        let excess_a = balance_a.saturating_sub(&self.reserve_a);
        let excess_b = balance_b.saturating_sub(&self.reserve_b);
        let custody = self.address();
        ledger.transfer(self.pair.first(), custody, to, excess_a)?;
        ledger.transfer(self.pair.second(), custody, to, excess_b)?;
        Ok((excess_a, excess_b))
    }

    /// Resets the tracked reserves to the held balances.
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::Overflow`] if a balance exceeds [`MAX_RESERVE`].
    pub(crate) fn sync(&mut self, ledger: &Ledger, now: Timestamp) -> Result<Reserves, AmmError> {
        let (balance_a, balance_b) = self.held_balances(ledger);
        self.commit(balance_a, balance_b, now)?;
        Ok(self.reserves())
    }

    // -- Internals --------------------------------------------------------------

    pub(crate) fn held_balances(&self, ledger: &Ledger) -> (Amount, Amount) {
        let custody = self.address();
        (
            ledger.balance_of(&self.pair.first(), &custody),
            ledger.balance_of(&self.pair.second(), &custody),
        )
    }

    /// Accrues the price oracle over the old reserves, then records the
    /// new ones.
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::Overflow`] if a balance exceeds [`MAX_RESERVE`];
    /// nothing is written in that case.
    pub(crate) fn commit(
        &mut self,
        balance_a: Amount,
        balance_b: Amount,
        now: Timestamp,
    ) -> Result<(), AmmError> {
        check_reserve_bounds(balance_a, balance_b)?;
        let (price_a_cumulative, price_b_cumulative) = self.accrued(now)?;
        self.price_a_cumulative = price_a_cumulative;
        self.price_b_cumulative = price_b_cumulative;
        self.reserve_a = balance_a;
        self.reserve_b = balance_b;
        // A clock that stepped back leaves the last sync where it was.
        self.last_sync = self.last_sync.max(now);
        Ok(())
    }

    fn accrued(&self, now: Timestamp) -> Result<(PriceCumulative, PriceCumulative), AmmError> {
        let elapsed = now.elapsed_since(self.last_sync);
        if elapsed == 0 || self.reserve_a.is_zero() || self.reserve_b.is_zero() {
            return Ok((self.price_a_cumulative, self.price_b_cumulative));
        }
        let price_a = Uq112x112::from_ratio(self.reserve_b, self.reserve_a)?;
        let price_b = Uq112x112::from_ratio(self.reserve_a, self.reserve_b)?;
        Ok((
            self.price_a_cumulative.accrue(price_a, elapsed),
            self.price_b_cumulative.accrue(price_b, elapsed),
        ))
    }

    /// Shares owed to the protocol for fee growth since `k_last`:
    /// `S·(√k − √k_last) / ((d − 1)·√k + √k_last)`.
    fn protocol_fee_shares(
        &self,
        fee_recipient: Option<Address>,
        divisor: u32,
    ) -> Result<Shares, AmmError> {
        if fee_recipient.is_none() || self.k_last.is_zero() {
            return Ok(Shares::ZERO);
        }
        let root_k = isqrt(U256::from(self.reserve_a.get()) * U256::from(self.reserve_b.get()));
        let root_k_last = isqrt(self.k_last);
        if root_k <= root_k_last {
            return Ok(Shares::ZERO);
        }
        let numerator = U256::from(self.shares.total_supply().get())
            .checked_mul(root_k - root_k_last)
            .ok_or(AmmError::Overflow("protocol fee numerator overflow"))?;
        let denominator = root_k * U256::from(divisor.saturating_sub(1)) + root_k_last;
        narrow(numerator / denominator, "protocol fee exceeds u128").map(Shares::new)
    }

    fn refresh_k_last(&mut self, fee_on: bool) {
        self.k_last = if fee_on {
            U256::from(self.reserve_a.get()) * U256::from(self.reserve_b.get())
        } else {
            U256::zero()
        };
    }
}

fn check_reserve_bounds(balance_a: Amount, balance_b: Amount) -> Result<(), AmmError> {
    if balance_a.get() > MAX_RESERVE || balance_b.get() > MAX_RESERVE {
        return Err(AmmError::Overflow("reserve exceeds 112 bits"));
    }
    Ok(())
}
