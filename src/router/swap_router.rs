//! Deadline-bound liquidity and multi-hop swap operations.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::{Address, Amount, PoolId, Shares, Timestamp, TokenPair};
use crate::error::AmmError;
use crate::exchange::Exchange;
use crate::router::library::{get_amount_in, get_amount_out, quote};

/// Parameters for [`Router::add_liquidity`].  Amounts are in the
/// caller's `(token_a, token_b)` order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddLiquidity {
    pub token_a: Address,
    pub token_b: Address,
    pub amount_a_desired: Amount,
    pub amount_b_desired: Amount,
    pub amount_a_min: Amount,
    pub amount_b_min: Amount,
    pub recipient: Address,
    pub deadline: Timestamp,
}

/// Parameters for [`Router::remove_liquidity`].  Amounts are in the
/// caller's `(token_a, token_b)` order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoveLiquidity {
    pub token_a: Address,
    pub token_b: Address,
    pub shares: Shares,
    pub amount_a_min: Amount,
    pub amount_b_min: Amount,
    pub recipient: Address,
    pub deadline: Timestamp,
}

/// One step of a swap path, resolved against the registry.
#[derive(Debug, Clone, Copy)]
struct Hop {
    pool: PoolId,
    pair: TokenPair,
    token_out: Address,
    reserve_in: Amount,
    reserve_out: Amount,
}

/// Stateless façade over an [`Exchange`].
///
/// Every mutating call checks its deadline before doing anything else,
/// computes its amounts against the reserves current at execution time,
/// checks the caller's bounds before moving any token, and runs as one
/// all-or-nothing transaction.
///
/// `sender` is the account whose tokens or shares are spent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Router;

impl Router {
    /// Deposits up to the desired amounts at the current ratio and mints
    /// shares to `recipient`, creating the pool first if needed.
    ///
    /// Returns `(amount_a, amount_b, shares)`.
    ///
    /// # Errors
    ///
    /// - [`AmmError::Expired`] if the deadline has passed.
    /// - [`AmmError::SlippageExceeded`] if the ratio-matched amounts fall
    ///   below the minimums.
    /// - Any error from the deposit transfers or [`Exchange::mint`].
    pub fn add_liquidity(
        exchange: &mut Exchange,
        sender: Address,
        request: &AddLiquidity,
    ) -> Result<(Amount, Amount, Shares), AmmError> {
        ensure_deadline(exchange, request.deadline)?;
        exchange.atomically(|ex| {
            let pool = match ex.get_pool(request.token_a, request.token_b) {
                Some(pool) => pool,
                None => ex.create_pool(request.token_a, request.token_b)?,
            };
            let (amount_a, amount_b) = matched_amounts(ex, pool, request)?;
            ex.transfer(request.token_a, sender, pool.address(), amount_a)?;
            ex.transfer(request.token_b, sender, pool.address(), amount_b)?;
            let shares = ex.mint(pool, request.recipient)?;
            debug!(pool = %pool, %sender, %amount_a, %amount_b, %shares, "liquidity added");
            Ok((amount_a, amount_b, shares))
        })
    }

    /// Redeems `shares` for the underlying tokens.
    ///
    /// Returns `(amount_a, amount_b)` in the caller's token order.
    ///
    /// # Errors
    ///
    /// - [`AmmError::Expired`] if the deadline has passed.
    /// - [`AmmError::UnknownPool`] if the pair has no pool.
    /// - [`AmmError::SlippageExceeded`] if a payout is below its minimum.
    /// - Any error from the share transfer or [`Exchange::burn`].
    pub fn remove_liquidity(
        exchange: &mut Exchange,
        sender: Address,
        request: &RemoveLiquidity,
    ) -> Result<(Amount, Amount), AmmError> {
        ensure_deadline(exchange, request.deadline)?;
        let pool = exchange
            .get_pool(request.token_a, request.token_b)
            .ok_or(AmmError::UnknownPool)?;
        exchange.atomically(|ex| {
            ex.transfer_shares(pool, sender, pool.address(), request.shares)?;
            let (first, second) = ex.burn(pool, request.recipient)?;
            let pair = ex.pool(pool)?.pair();
            let (amount_a, amount_b) = pair.sort_by(&request.token_a, first, second);
            if amount_a < request.amount_a_min || amount_b < request.amount_b_min {
                return Err(AmmError::SlippageExceeded);
            }
            debug!(pool = %pool, %sender, %amount_a, %amount_b, "liquidity removed");
            Ok((amount_a, amount_b))
        })
    }

    /// Sells exactly `amount_in` of `path[0]` along `path`.
    ///
    /// Returns the amount of the last token delivered to `recipient`.
    ///
    /// # Errors
    ///
    /// - [`AmmError::Expired`] if the deadline has passed.
    /// - [`AmmError::InvalidPath`] if the path is malformed or a hop has
    ///   no pool.
    /// - [`AmmError::SlippageExceeded`] if the output is below
    ///   `amount_out_min`; no token moves in that case.
    pub fn swap_exact_in(
        exchange: &mut Exchange,
        sender: Address,
        amount_in: Amount,
        amount_out_min: Amount,
        path: &[Address],
        recipient: Address,
        deadline: Timestamp,
    ) -> Result<Amount, AmmError> {
        ensure_deadline(exchange, deadline)?;
        let hops = resolve_path(exchange, path)?;
        let amounts = amounts_out(exchange, &hops, amount_in)?;
        let amount_out = amounts.last().copied().ok_or(AmmError::InvalidPath)?;
        if amount_out < amount_out_min {
            return Err(AmmError::SlippageExceeded);
        }
        exchange.atomically(|ex| execute(ex, sender, path, &hops, &amounts, recipient))?;
        Ok(amount_out)
    }

    /// Buys exactly `amount_out` of the last token in `path`.
    ///
    /// Returns the amount of `path[0]` spent.
    ///
    /// # Errors
    ///
    /// - [`AmmError::Expired`] if the deadline has passed.
    /// - [`AmmError::InvalidPath`] if the path is malformed or a hop has
    ///   no pool.
    /// - [`AmmError::ExcessiveInputAmount`] if the required input exceeds
    ///   `amount_in_max`; no token moves in that case.
    pub fn swap_exact_out(
        exchange: &mut Exchange,
        sender: Address,
        amount_out: Amount,
        amount_in_max: Amount,
        path: &[Address],
        recipient: Address,
        deadline: Timestamp,
    ) -> Result<Amount, AmmError> {
        ensure_deadline(exchange, deadline)?;
        let hops = resolve_path(exchange, path)?;
        let amounts = amounts_in(exchange, &hops, amount_out)?;
        let amount_in = amounts.first().copied().ok_or(AmmError::InvalidPath)?;
        if amount_in > amount_in_max {
            return Err(AmmError::ExcessiveInputAmount);
        }
        exchange.atomically(|ex| execute(ex, sender, path, &hops, &amounts, recipient))?;
        Ok(amount_in)
    }

    /// Amounts at every step of `path` when selling `amount_in`.
    ///
    /// # Errors
    ///
    /// [`AmmError::InvalidPath`] for a malformed path, or any pricing error.
    pub fn get_amounts_out(
        exchange: &Exchange,
        amount_in: Amount,
        path: &[Address],
    ) -> Result<Vec<Amount>, AmmError> {
        let hops = resolve_path(exchange, path)?;
        amounts_out(exchange, &hops, amount_in)
    }

    /// Amounts at every step of `path` when buying `amount_out`.
    ///
    /// # Errors
    ///
    /// [`AmmError::InvalidPath`] for a malformed path, or any pricing error.
    pub fn get_amounts_in(
        exchange: &Exchange,
        amount_out: Amount,
        path: &[Address],
    ) -> Result<Vec<Amount>, AmmError> {
        let hops = resolve_path(exchange, path)?;
        amounts_in(exchange, &hops, amount_out)
    }
}

fn ensure_deadline(exchange: &Exchange, deadline: Timestamp) -> Result<(), AmmError> {
    if exchange.now() > deadline {
        return Err(AmmError::Expired);
    }
    Ok(())
}

/// Deposit amounts matched to the pool's current ratio.
fn matched_amounts(
    exchange: &Exchange,
    pool: PoolId,
    request: &AddLiquidity,
) -> Result<(Amount, Amount), AmmError> {
    let target = exchange.pool(pool)?;
    let reserves = target.reserves();
    let (reserve_a, reserve_b) =
        target
            .pair()
            .sort_by(&request.token_a, reserves.reserve_a, reserves.reserve_b);

    let (amount_a, amount_b) = if reserve_a.is_zero() && reserve_b.is_zero() {
        (request.amount_a_desired, request.amount_b_desired)
    } else {
        let b_optimal = quote(request.amount_a_desired, reserve_a, reserve_b)?;
        if b_optimal <= request.amount_b_desired {
            (request.amount_a_desired, b_optimal)
        } else {
            let a_optimal = quote(request.amount_b_desired, reserve_b, reserve_a)?;
            (a_optimal, request.amount_b_desired)
        }
    };
    if amount_a < request.amount_a_min || amount_b < request.amount_b_min {
        return Err(AmmError::SlippageExceeded);
    }
    Ok((amount_a, amount_b))
}

fn resolve_path(exchange: &Exchange, path: &[Address]) -> Result<Vec<Hop>, AmmError> {
    if path.len() < 2 {
        return Err(AmmError::InvalidPath);
    }
    path.windows(2)
        .map(|step| {
            let (&token_in, &token_out) = match step {
                [token_in, token_out] if token_in != token_out => (token_in, token_out),
                _ => return Err(AmmError::InvalidPath),
            };
            let pool = exchange
                .get_pool(token_in, token_out)
                .ok_or(AmmError::InvalidPath)?;
            let target = exchange.pool(pool)?;
            let reserves = target.reserves();
            let pair = target.pair();
            let (reserve_in, reserve_out) =
                pair.sort_by(&token_in, reserves.reserve_a, reserves.reserve_b);
            Ok(Hop {
                pool,
                pair,
                token_out,
                reserve_in,
                reserve_out,
            })
        })
        .collect()
}

fn amounts_out(
    exchange: &Exchange,
    hops: &[Hop],
    amount_in: Amount,
) -> Result<Vec<Amount>, AmmError> {
    let fee = exchange.config().fee();
    let mut amounts = Vec::with_capacity(hops.len() + 1);
    amounts.push(amount_in);
    let mut carried = amount_in;
    for hop in hops {
        carried = get_amount_out(carried, hop.reserve_in, hop.reserve_out, fee)?;
        amounts.push(carried);
    }
    Ok(amounts)
}

fn amounts_in(
    exchange: &Exchange,
    hops: &[Hop],
    amount_out: Amount,
) -> Result<Vec<Amount>, AmmError> {
    let fee = exchange.config().fee();
    let mut amounts = Vec::with_capacity(hops.len() + 1);
    amounts.push(amount_out);
    let mut needed = amount_out;
    for hop in hops.iter().rev() {
        needed = get_amount_in(needed, hop.reserve_in, hop.reserve_out, fee)?;
        amounts.push(needed);
    }
    amounts.reverse();
    Ok(amounts)
}

/// Pays the first pool, then swaps hop by hop.  Intermediate output goes
/// straight to the next pool; only the last hop pays `recipient`.
fn execute(
    exchange: &mut Exchange,
    sender: Address,
    path: &[Address],
    hops: &[Hop],
    amounts: &[Amount],
    recipient: Address,
) -> Result<(), AmmError> {
    let (Some(&token_in), Some(first), Some(&amount_in)) =
        (path.first(), hops.first(), amounts.first())
    else {
        return Err(AmmError::InvalidPath);
    };
    exchange.transfer(token_in, sender, first.pool.address(), amount_in)?;

    for (index, (hop, &amount_out)) in hops.iter().zip(amounts.iter().skip(1)).enumerate() {
        let (amount_a_out, amount_b_out) = hop.pair.sort_by(&hop.token_out, amount_out, Amount::ZERO);
        let to = hops
            .get(index + 1)
            .map_or(recipient, |next| next.pool.address());
        exchange.swap(hop.pool, amount_a_out, amount_b_out, to, &[], None)?;
    }
    debug!(%sender, %recipient, hops = hops.len(), %amount_in, "path swapped");
    Ok(())
}
