// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// SAVINGS POOL - CORE MODULE
//
// Off-chain accounting for the savings pool contract:
// - Share <-> underlying conversion with the contract's floor division
// - Local/global pending-withdrawal reconciliation
// - Sorted vote-list neighbor search for election calls
// - Prepared contract calls with static ABI encoding
// All amounts are U256 base units (no floating-point).
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

pub mod call;
pub mod client_config;
pub mod conversion;
pub mod reconcile;
pub mod sorted_votes;
pub mod types;
pub mod units;

pub use alloy_primitives::{Address, B256, U256};
pub use call::{AbiValue, PreparedCall};
pub use conversion::{checked_underlying_to_shares, shares_to_underlying, underlying_to_shares};
pub use reconcile::{find_global_index, ReconcileError};
pub use sorted_votes::find_lesser_and_greater;
pub use types::{
    GroupVoteBreakdown, GroupVotes, PendingWithdrawal, PoolTotals, VoteDelta, VoteRevocationRange,
};
pub use units::{format_units, parse_units, UnitsError};

/// Exchange rate used before the pool has received its first deposit:
/// 1 base unit of the underlying asset mints this many share units.
/// Must match the pool contract's own bootstrap constant.
pub const INITIAL_SHARE_MULTIPLIER: u64 = 65_536;

/// Decimals of both the underlying asset and the share token (1 token = 10^18 base units).
pub const UNIT_DECIMALS: u32 = 18;

/// Neutral `lesser`/`greater` marker understood by the election contract as "no neighbor".
pub const NULL_ADDRESS: Address = Address::ZERO;

/// Protocol convention: the pool account votes for at most this many groups at a time.
pub const MAX_EXPECTED_VOTED_GROUPS: usize = 1;
