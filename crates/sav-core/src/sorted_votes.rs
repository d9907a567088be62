// Neighbor search over the election's vote list.
//
// The election contract keeps eligible groups in a linked list sorted by total
// votes, descending. Any call that changes a group's total must name the two
// entries the group will sit between afterwards: `greater` (more votes) and
// `lesser` (fewer or equal votes). NULL_ADDRESS marks a missing neighbor.

use alloy_primitives::{Address, U256};

use crate::types::{GroupVotes, VoteDelta, VoteRevocationRange};
use crate::NULL_ADDRESS;

/// Neighbors of `group` after its total changes by `delta`.
///
/// `eligible` may arrive in any order; it is sorted descending by votes (stable on
/// ties, so equal totals keep the order the ledger reported). A group missing from
/// `eligible` is treated as having zero votes.
pub fn find_lesser_and_greater(
    eligible: &[GroupVotes],
    group: Address,
    delta: VoteDelta,
) -> VoteRevocationRange {
    let mut sorted: Vec<&GroupVotes> = eligible.iter().collect();
    sorted.sort_by(|a, b| b.votes.cmp(&a.votes));

    let current = sorted
        .iter()
        .find(|g| g.group == group)
        .map(|g| g.votes)
        .unwrap_or(U256::ZERO);
    let new_total = delta.apply(current);

    let mut greater = NULL_ADDRESS;
    let mut lesser = NULL_ADDRESS;
    for entry in sorted.iter().filter(|g| g.group != group) {
        if entry.votes <= new_total {
            lesser = entry.group;
            break;
        }
        greater = entry.group;
    }

    log::trace!(
        "neighbors for {} after {}: lesser={} greater={}",
        group,
        delta,
        lesser,
        greater
    );
    VoteRevocationRange { lesser, greater }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(b: u8) -> Address {
        Address::repeat_byte(b)
    }

    fn gv(b: u8, votes: u64) -> GroupVotes {
        GroupVotes {
            group: addr(b),
            votes: U256::from(votes),
        }
    }

    #[test]
    fn test_decrease_moves_below_neighbor() {
        // A:500 B:400 C:300 -> B drops to 250 -> between C (greater) and end (lesser)
        let list = vec![gv(1, 500), gv(2, 400), gv(3, 300)];
        let range = find_lesser_and_greater(&list, addr(2), VoteDelta::Decrease(U256::from(150u64)));
        assert_eq!(range.greater, addr(3));
        assert_eq!(range.lesser, NULL_ADDRESS);
    }

    #[test]
    fn test_small_decrease_keeps_position() {
        let list = vec![gv(1, 500), gv(2, 400), gv(3, 300)];
        let range = find_lesser_and_greater(&list, addr(2), VoteDelta::Decrease(U256::from(50u64)));
        assert_eq!(range.greater, addr(1));
        assert_eq!(range.lesser, addr(3));
    }

    #[test]
    fn test_increase_to_top() {
        let list = vec![gv(1, 500), gv(2, 400), gv(3, 300)];
        let range = find_lesser_and_greater(&list, addr(3), VoteDelta::Increase(U256::from(1_000u64)));
        assert_eq!(range.greater, NULL_ADDRESS);
        assert_eq!(range.lesser, addr(1));
    }

    #[test]
    fn test_equal_total_sits_above() {
        // New total equal to a neighbor: that neighbor becomes `lesser`.
        let list = vec![gv(1, 500), gv(2, 400), gv(3, 300)];
        let range = find_lesser_and_greater(&list, addr(2), VoteDelta::Decrease(U256::from(100u64)));
        assert_eq!(range.greater, addr(1));
        assert_eq!(range.lesser, addr(3));
    }

    #[test]
    fn test_unsorted_input_is_sorted() {
        let list = vec![gv(3, 300), gv(1, 500), gv(2, 400)];
        let range = find_lesser_and_greater(&list, addr(1), VoteDelta::Decrease(U256::from(150u64)));
        assert_eq!(range.greater, addr(2));
        assert_eq!(range.lesser, addr(3));
    }

    #[test]
    fn test_unknown_group_starts_at_zero() {
        let list = vec![gv(1, 500), gv(2, 400)];
        let range = find_lesser_and_greater(&list, addr(9), VoteDelta::Increase(U256::from(450u64)));
        assert_eq!(range.greater, addr(1));
        assert_eq!(range.lesser, addr(2));
    }

    #[test]
    fn test_sole_group() {
        let list = vec![gv(1, 500)];
        let range = find_lesser_and_greater(&list, addr(1), VoteDelta::Decrease(U256::from(500u64)));
        assert!(range.is_null());
    }
}
