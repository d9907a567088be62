use alloy_primitives::{Address, U256};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::conversion::{checked_underlying_to_shares, shares_to_underlying, underlying_to_shares};
use crate::NULL_ADDRESS;

/// Serde adapter for U256 ↔ JSON/TOML: serialize as a decimal string,
/// deserialize from a decimal (or 0x-prefixed) string or a plain integer.
/// Decimal strings keep amounts readable and avoid f64 precision loss in JSON tooling.
pub mod u256_dec {
    use alloy_primitives::U256;
    use serde::{Deserializer, Serializer};

    pub fn serialize<S: Serializer>(val: &U256, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&val.to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<U256, D::Error> {
        use serde::de::{self, Visitor};
        struct U256Visitor;

        impl<'de> Visitor<'de> for U256Visitor {
            type Value = U256;

            fn expecting(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
                f.write_str("a uint256 as a decimal string or integer")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<U256, E> {
                v.trim().parse::<U256>().map_err(E::custom)
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<U256, E> {
                Ok(U256::from(v))
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<U256, E> {
                if v >= 0 {
                    Ok(U256::from(v as u64))
                } else {
                    Err(E::custom("negative value for uint256"))
                }
            }
        }

        d.deserialize_any(U256Visitor)
    }
}

/// Snapshot of the pool's supply on both sides of the exchange rate.
/// Read fresh before every conversion, never cached across operations.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolTotals {
    #[serde(with = "u256_dec")]
    pub shares_outstanding: U256,
    #[serde(with = "u256_dec")]
    pub underlying_held: U256,
}

impl PoolTotals {
    pub fn new(shares_outstanding: U256, underlying_held: U256) -> Self {
        Self {
            shares_outstanding,
            underlying_held,
        }
    }

    pub fn shares_to_underlying(&self, share_amount: U256) -> U256 {
        shares_to_underlying(share_amount, self.shares_outstanding, self.underlying_held)
    }

    pub fn underlying_to_shares(&self, underlying_amount: U256) -> U256 {
        underlying_to_shares(
            underlying_amount,
            self.underlying_held,
            self.shares_outstanding,
        )
    }

    pub fn checked_underlying_to_shares(&self, underlying_amount: U256) -> Option<U256> {
        checked_underlying_to_shares(
            underlying_amount,
            self.underlying_held,
            self.shares_outstanding,
        )
    }
}

/// One in-flight withdrawal as reported by the pool (local view) or by the
/// locked-asset contract (global view). Identity is the exact `(value, unlock_time)` pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingWithdrawal {
    /// Underlying-asset base units released when the withdrawal finishes
    #[serde(with = "u256_dec")]
    pub value: U256,
    /// Unix seconds after which the withdrawal can be finished
    pub unlock_time: u64,
}

impl PendingWithdrawal {
    pub fn new(value: U256, unlock_time: u64) -> Self {
        Self { value, unlock_time }
    }

    /// The locked-asset contract accepts a finish once `now >= unlock_time`.
    pub fn is_unlocked(&self, now: u64) -> bool {
        now >= self.unlock_time
    }

    /// Seconds left until unlock (0 when already unlocked).
    pub fn seconds_remaining(&self, now: u64) -> u64 {
        self.unlock_time.saturating_sub(now)
    }
}

/// Pending vs. active split of one account's votes for one validator group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupVoteBreakdown {
    pub group: Address,
    #[serde(with = "u256_dec")]
    pub pending: U256,
    #[serde(with = "u256_dec")]
    pub active: U256,
}

impl GroupVoteBreakdown {
    pub fn total(&self) -> U256 {
        self.pending.saturating_add(self.active)
    }
}

/// Total votes currently received by an eligible validator group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupVotes {
    pub group: Address,
    #[serde(with = "u256_dec")]
    pub votes: U256,
}

/// Neighbors an entry of the election's sorted vote list will sit between
/// after its total changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteRevocationRange {
    pub lesser: Address,
    pub greater: Address,
}

impl VoteRevocationRange {
    pub const NULL: VoteRevocationRange = VoteRevocationRange {
        lesser: NULL_ADDRESS,
        greater: NULL_ADDRESS,
    };

    pub fn new(lesser: Address, greater: Address) -> Self {
        Self { lesser, greater }
    }

    pub fn is_null(&self) -> bool {
        self.lesser == NULL_ADDRESS && self.greater == NULL_ADDRESS
    }
}

impl Default for VoteRevocationRange {
    fn default() -> Self {
        Self::NULL
    }
}

/// Hypothetical change of a group's vote total.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoteDelta {
    Increase(U256),
    Decrease(U256),
}

impl VoteDelta {
    /// Apply the delta to a vote total. Decreases saturate at zero.
    pub fn apply(&self, votes: U256) -> U256 {
        match self {
            VoteDelta::Increase(amount) => votes.saturating_add(*amount),
            VoteDelta::Decrease(amount) => votes.saturating_sub(*amount),
        }
    }

    pub fn magnitude(&self) -> U256 {
        match self {
            VoteDelta::Increase(amount) | VoteDelta::Decrease(amount) => *amount,
        }
    }
}

impl fmt::Display for VoteDelta {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            VoteDelta::Increase(amount) => write!(f, "+{}", amount),
            VoteDelta::Decrease(amount) => write!(f, "-{}", amount),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pending_withdrawal_json_uses_decimal_strings() {
        let pw = PendingWithdrawal::new(U256::from(1_500_000_000_000_000_000u64), 1_700_000_000);
        let json = serde_json::to_string(&pw).unwrap();
        assert_eq!(
            json,
            r#"{"value":"1500000000000000000","unlock_time":1700000000}"#
        );
        let back: PendingWithdrawal = serde_json::from_str(&json).unwrap();
        assert_eq!(back, pw);
    }

    #[test]
    fn test_u256_dec_accepts_integers() {
        let totals: PoolTotals =
            serde_json::from_str(r#"{"shares_outstanding":1000,"underlying_held":"250"}"#)
                .unwrap();
        assert_eq!(totals.shares_outstanding, U256::from(1000u64));
        assert_eq!(totals.underlying_held, U256::from(250u64));
    }

    #[test]
    fn test_u256_dec_rejects_negative() {
        let res: Result<PoolTotals, _> =
            serde_json::from_str(r#"{"shares_outstanding":-1,"underlying_held":"0"}"#);
        assert!(res.is_err());
    }

    #[test]
    fn test_unlock_boundary() {
        let pw = PendingWithdrawal::new(U256::from(1u64), 100);
        assert!(!pw.is_unlocked(99));
        assert!(pw.is_unlocked(100));
        assert_eq!(pw.seconds_remaining(40), 60);
        assert_eq!(pw.seconds_remaining(400), 0);
    }

    #[test]
    fn test_vote_delta_saturates() {
        let votes = U256::from(10u64);
        assert_eq!(VoteDelta::Decrease(U256::from(25u64)).apply(votes), U256::ZERO);
        assert_eq!(
            VoteDelta::Increase(U256::from(5u64)).apply(votes),
            U256::from(15u64)
        );
        assert_eq!(VoteDelta::Decrease(U256::from(7u64)).to_string(), "-7");
    }

    #[test]
    fn test_null_range() {
        assert!(VoteRevocationRange::NULL.is_null());
        assert!(VoteRevocationRange::default().is_null());
        assert!(!VoteRevocationRange::new(Address::repeat_byte(1), NULL_ADDRESS).is_null());
    }

    #[test]
    fn test_breakdown_total() {
        let b = GroupVoteBreakdown {
            group: Address::repeat_byte(7),
            pending: U256::from(50u64),
            active: U256::from(80u64),
        };
        assert_eq!(b.total(), U256::from(130u64));
    }
}
