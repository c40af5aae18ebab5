//! Unified error types for the pairswap engine.
//!
//! All fallible operations across the crate return [`AmmError`] as their
//! error type.  Every failure is a fail-closed revert: the operation that
//! returned the error left no observable state change behind.

use thiserror::Error;

/// Every way an engine operation can fail.
///
/// Variants are grouped by the layer that raises them.  String payloads
/// are static context for arithmetic failures and never carry user data.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AmmError {
    // -- Input errors -------------------------------------------------------
    /// Both sides of a pair name the same token.
    #[error("pair requires two distinct tokens")]
    IdenticalTokens,

    /// A token identifier is the null address.
    #[error("token identifier is the zero address")]
    ZeroToken,

    /// A pool already exists for this unordered pair.
    #[error("pool already exists for this pair")]
    PoolExists,

    /// A routing path is too short or contains a hop without a pool.
    #[error("invalid swap path")]
    InvalidPath,

    /// No pool is registered under the given handle.
    #[error("unknown pool")]
    UnknownPool,

    // -- Liquidity errors ---------------------------------------------------
    /// The first deposit does not cover the locked minimum liquidity.
    #[error("insufficient initial liquidity")]
    InsufficientInitialLiquidity,

    /// A deposit would mint zero shares.
    #[error("insufficient liquidity minted")]
    InsufficientLiquidityMinted,

    /// A withdrawal would return zero of either token.
    #[error("insufficient liquidity burned")]
    InsufficientLiquidityBurned,

    // -- Swap errors --------------------------------------------------------
    /// Requested output meets or exceeds the pool reserve, or a reserve is empty.
    #[error("insufficient liquidity")]
    InsufficientLiquidity,

    /// Nothing was paid into the pool.
    #[error("insufficient input amount")]
    InsufficientInputAmount,

    /// A swap would produce no output.
    #[error("insufficient output amount")]
    InsufficientOutputAmount,

    /// The fee-adjusted constant product decreased.
    #[error("constant-product invariant violated")]
    KInvariantViolated,

    /// The input required for an exact-out swap exceeds the caller's maximum.
    #[error("excessive input amount")]
    ExcessiveInputAmount,

    /// Flash callback data was supplied without a callee to receive it.
    #[error("callback data supplied without a flash-swap callee")]
    MissingCallee,

    // -- Protection errors --------------------------------------------------
    /// Executed amounts fell outside the caller's bounds.
    #[error("slippage bound exceeded")]
    SlippageExceeded,

    /// The operation's deadline has passed.
    #[error("deadline expired")]
    Expired,

    /// A mutating call re-entered a pool that is mid-operation.
    #[error("pool is locked")]
    Locked,

    // -- Authorization errors -----------------------------------------------
    /// The caller is not allowed to perform this action.
    #[error("forbidden")]
    Forbidden,

    // -- Ledger errors ------------------------------------------------------
    /// A transfer exceeds the sender's balance.
    #[error("insufficient balance")]
    InsufficientBalance,

    // -- Arithmetic errors --------------------------------------------------
    /// An intermediate value exceeded its representable range.
    #[error("arithmetic overflow: {0}")]
    Overflow(&'static str),

    /// A subtraction went below zero.
    #[error("arithmetic underflow: {0}")]
    Underflow(&'static str),

    /// Division by zero.
    #[error("division by zero")]
    DivisionByZero,

    // -- Configuration errors -----------------------------------------------
    /// A configuration value violates an engine constraint.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(&'static str),

    /// A configuration document could not be parsed.
    #[error("configuration parse error: {0}")]
    ConfigParse(String),
}
