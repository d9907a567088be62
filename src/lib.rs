//! Shared fixtures for the end-to-end scenarios in `tests/`.
//!
//! Addresses are fixed byte patterns so failures are easy to read in logs.

use sav_core::{Address, GroupVotes, U256};
use sav_sdk::testkit::LedgerState;

pub fn u(v: u64) -> U256 {
    U256::from(v)
}

pub fn pool() -> Address {
    Address::repeat_byte(0x50)
}

pub fn voter() -> Address {
    Address::repeat_byte(0x5e)
}

pub fn alice() -> Address {
    Address::repeat_byte(0xa1)
}

pub fn bob() -> Address {
    Address::repeat_byte(0xb0)
}

pub fn group_a() -> Address {
    Address::repeat_byte(0x0a)
}

pub fn group_b() -> Address {
    Address::repeat_byte(0x0b)
}

/// Empty pool wired to its voter, which targets `group_a`.
/// `group_b` holds 5000 votes from other accounts.
pub fn voting_pool_state() -> LedgerState {
    let mut state = LedgerState::default();
    state.pool_voter.insert(pool(), voter());
    state.voter_proxy.insert(voter(), pool());
    state.voter_group.insert(voter(), group_a());
    state.eligible = vec![
        GroupVotes {
            group: group_a(),
            votes: u(1_000),
        },
        GroupVotes {
            group: group_b(),
            votes: u(5_000),
        },
    ];
    state.capacity.insert(group_a(), u(10_000));
    state.capacity.insert(group_b(), u(10_000));
    state
}
