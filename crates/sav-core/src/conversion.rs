//! Share ↔ underlying conversion.
//!
//! Both directions reproduce the pool contract's integer floor division so a
//! client-predicted amount is exactly what the contract mints or burns.
//! Products are taken in 512 bits, so `a * b` never overflows before the division.

use alloy_primitives::{U256, U512};

use crate::INITIAL_SHARE_MULTIPLIER;

/// `floor(a * b / d)` with a 512-bit intermediate. `d` must be non-zero.
/// `None` when the quotient does not fit in 256 bits.
fn checked_mul_div_floor(a: U256, b: U256, d: U256) -> Option<U256> {
    let wide = U512::from(a) * U512::from(b) / U512::from(d);
    U256::checked_from_uint(wide)
}

/// Same as [`checked_mul_div_floor`], clamped to `U256::MAX`. Only reachable with
/// share amounts far larger than the pool's total supply.
fn mul_div_floor(a: U256, b: U256, d: U256) -> U256 {
    checked_mul_div_floor(a, b, d).unwrap_or(U256::MAX)
}

/// Underlying-asset value of `share_amount` at the current pool totals.
///
/// An empty pool (`shares_outstanding == 0`) values every share at zero.
pub fn shares_to_underlying(
    share_amount: U256,
    shares_outstanding: U256,
    underlying_held: U256,
) -> U256 {
    if shares_outstanding.is_zero() {
        return U256::ZERO;
    }
    mul_div_floor(underlying_held, share_amount, shares_outstanding)
}

/// Shares minted for `underlying_amount` at the current pool totals, or `None`
/// when the result exceeds 2^256 - 1 (the pool contract reverts on such a deposit).
///
/// Before the first deposit (either total is zero) the bootstrap rate
/// [`INITIAL_SHARE_MULTIPLIER`] applies.
pub fn checked_underlying_to_shares(
    underlying_amount: U256,
    underlying_held: U256,
    shares_outstanding: U256,
) -> Option<U256> {
    if underlying_held.is_zero() || shares_outstanding.is_zero() {
        return underlying_amount.checked_mul(U256::from(INITIAL_SHARE_MULTIPLIER));
    }
    checked_mul_div_floor(shares_outstanding, underlying_amount, underlying_held)
}

/// Display variant of [`checked_underlying_to_shares`]: overflow reads as `U256::MAX`.
/// Anything that submits a deposit goes through the checked form.
pub fn underlying_to_shares(
    underlying_amount: U256,
    underlying_held: U256,
    shares_outstanding: U256,
) -> U256 {
    checked_underlying_to_shares(underlying_amount, underlying_held, shares_outstanding)
        .unwrap_or(U256::MAX)
}
