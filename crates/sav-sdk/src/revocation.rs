// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// REVOCATION PLANNER
//
// Works out how much of the pool's voted stake a withdrawal must unvote and the
// sorted-list neighbors the election needs for the pending and active revokes.
// Only the shortfall over the pool's nonvoting balance is revoked, pending
// bucket first. All reads are fresh; nothing is cached between calls.
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

use sav_core::{
    Address, GroupVoteBreakdown, VoteDelta, VoteRevocationRange, U256, MAX_EXPECTED_VOTED_GROUPS,
};

use crate::error::SdkError;
use crate::ledger::LedgerQuery;

/// Parameters for one `withdrawStart` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RevocationPlan {
    /// Group the votes come from; `None` when nothing needs revoking
    pub group: Option<Address>,
    /// Underlying released by the withdrawal
    pub amount_to_unlock: U256,
    pub amount_to_revoke: U256,
    /// Part of `amount_to_revoke` taken from the pending bucket
    pub pending_portion: U256,
    pub pending_revoke: VoteRevocationRange,
    pub active_revoke: VoteRevocationRange,
}

impl RevocationPlan {
    fn no_revocation(amount_to_unlock: U256) -> Self {
        Self {
            group: None,
            amount_to_unlock,
            amount_to_revoke: U256::ZERO,
            pending_portion: U256::ZERO,
            pending_revoke: VoteRevocationRange::NULL,
            active_revoke: VoteRevocationRange::NULL,
        }
    }

    pub fn active_portion(&self) -> U256 {
        self.amount_to_revoke - self.pending_portion
    }

    pub fn needs_revocation(&self) -> bool {
        !self.amount_to_revoke.is_zero()
    }
}

/// Stake that must be unvoted so `nonvoting` covers `target`.
pub fn revocation_shortfall(target: U256, nonvoting: U256) -> U256 {
    target.saturating_sub(nonvoting)
}

/// Portion of `amount` revoked from the pending bucket.
pub fn split_pending_first(amount: U256, pending: U256) -> U256 {
    amount.min(pending)
}

/// Select the group to revoke from. The pool votes for at most one group;
/// a longer list is an error in strict mode, otherwise the last entry wins.
pub fn select_revocation_group(
    groups: &[Address],
    strict_single_group: bool,
) -> Result<Option<Address>, SdkError> {
    if groups.len() > MAX_EXPECTED_VOTED_GROUPS {
        if strict_single_group {
            return Err(SdkError::UnexpectedVotedGroups {
                count: groups.len(),
            });
        }
        log::warn!(
            "Pool votes for {} groups, revoking from the last one ({})",
            groups.len(),
            groups[groups.len() - 1]
        );
    }
    Ok(groups.last().copied())
}

/// Neighbor ranges for revoking `amount` from `breakdown`, pending bucket first.
/// The active range is always looked up for the full amount.
pub(crate) async fn lookup_revocation_ranges<L: LedgerQuery + ?Sized>(
    ledger: &L,
    breakdown: &GroupVoteBreakdown,
    amount: U256,
) -> Result<(U256, VoteRevocationRange, VoteRevocationRange), SdkError> {
    let pending_portion = split_pending_first(amount, breakdown.pending);
    let pending_revoke = ledger
        .find_neighbors_after_vote_delta(breakdown.group, VoteDelta::Decrease(pending_portion))
        .await?;
    let active_revoke = ledger
        .find_neighbors_after_vote_delta(breakdown.group, VoteDelta::Decrease(amount))
        .await?;
    Ok((pending_portion, pending_revoke, active_revoke))
}

pub struct RevocationPlanner<'a, L: LedgerQuery + ?Sized> {
    ledger: &'a L,
    strict_single_group: bool,
}

impl<'a, L: LedgerQuery + ?Sized> RevocationPlanner<'a, L> {
    pub fn new(ledger: &'a L) -> Self {
        Self {
            ledger,
            strict_single_group: true,
        }
    }

    pub fn strict_single_group(mut self, strict: bool) -> Self {
        self.strict_single_group = strict;
        self
    }

    /// Plan the revocation needed to withdraw `shares` from `pool`.
    pub async fn plan(&self, pool: Address, shares: U256) -> Result<RevocationPlan, SdkError> {
        let totals = self.ledger.get_pool_totals(pool).await?;
        let target = totals.shares_to_underlying(shares);
        let nonvoting = self.ledger.get_nonvoting_locked_balance(pool).await?;
        let amount_to_revoke = revocation_shortfall(target, nonvoting);
        log::debug!(
            "plan: shares={} target={} nonvoting={} to_revoke={}",
            shares,
            target,
            nonvoting,
            amount_to_revoke
        );

        if amount_to_revoke.is_zero() {
            return Ok(RevocationPlan::no_revocation(target));
        }

        let groups = self.ledger.get_voted_groups(pool).await?;
        let group = match select_revocation_group(&groups, self.strict_single_group)? {
            Some(group) => group,
            None => {
                return Err(SdkError::InsufficientVotes {
                    requested: target,
                    max_withdrawable: nonvoting,
                })
            }
        };

        let breakdown = self.ledger.get_vote_breakdown(pool, group).await?;
        let total_votes = breakdown.total();
        if amount_to_revoke > total_votes {
            return Err(SdkError::InsufficientVotes {
                requested: target,
                max_withdrawable: nonvoting.saturating_add(total_votes),
            });
        }

        let (pending_portion, pending_revoke, active_revoke) =
            lookup_revocation_ranges(self.ledger, &breakdown, amount_to_revoke).await?;

        Ok(RevocationPlan {
            group: Some(group),
            amount_to_unlock: target,
            amount_to_revoke,
            pending_portion,
            pending_revoke,
            active_revoke,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testkit::{InMemoryLedger, LedgerState};
    use sav_core::{GroupVotes, PoolTotals};

    fn u(v: u64) -> U256 {
        U256::from(v)
    }

    fn pool() -> Address {
        Address::repeat_byte(0x50)
    }

    fn group() -> Address {
        Address::repeat_byte(0x0a)
    }

    fn ledger(nonvoting: u64, pending: u64, active: u64) -> InMemoryLedger {
        let mut state = LedgerState::default();
        state
            .pool_totals
            .insert(pool(), PoolTotals::new(u(1000), u(1000)));
        state.nonvoting.insert(pool(), u(nonvoting));
        state.set_votes(pool(), group(), u(pending), u(active));
        state.eligible = vec![
            GroupVotes {
                group: Address::repeat_byte(0x0b),
                votes: u(900),
            },
            GroupVotes {
                group: group(),
                votes: u(pending + active),
            },
            GroupVotes {
                group: Address::repeat_byte(0x0c),
                votes: u(200),
            },
        ];
        InMemoryLedger::new(state)
    }

    #[test]
    fn test_shortfall() {
        assert_eq!(revocation_shortfall(u(250), u(100)), u(150));
        assert_eq!(revocation_shortfall(u(100), u(250)), U256::ZERO);
    }

    #[test]
    fn test_pending_first_split() {
        assert_eq!(split_pending_first(u(30), u(50)), u(30));
        assert_eq!(split_pending_first(u(80), u(50)), u(50));
    }

    #[test]
    fn test_select_group_strictness() {
        let groups = vec![Address::repeat_byte(1), Address::repeat_byte(2)];
        assert_eq!(
            select_revocation_group(&groups, true),
            Err(SdkError::UnexpectedVotedGroups { count: 2 })
        );
        assert_eq!(
            select_revocation_group(&groups, false),
            Ok(Some(Address::repeat_byte(2)))
        );
        assert_eq!(select_revocation_group(&[], true), Ok(None));
    }

    #[tokio::test]
    async fn test_end_to_end_plan() {
        let ledger = ledger(50, 100, 400);
        let plan = RevocationPlanner::new(&ledger)
            .plan(pool(), u(300))
            .await
            .unwrap();

        assert_eq!(plan.amount_to_unlock, u(300));
        assert_eq!(plan.amount_to_revoke, u(250));
        assert_eq!(plan.pending_portion, u(100));
        assert_eq!(plan.active_portion(), u(150));
        assert_eq!(plan.group, Some(group()));
        assert_eq!(
            ledger.neighbor_queries(),
            vec![
                (group(), VoteDelta::Decrease(u(100))),
                (group(), VoteDelta::Decrease(u(250))),
            ]
        );
        // 500 - 100 = 400 stays between 900 and 200; 500 - 250 = 250 too.
        let expected =
            VoteRevocationRange::new(Address::repeat_byte(0x0c), Address::repeat_byte(0x0b));
        assert_eq!(plan.pending_revoke, expected);
        assert_eq!(plan.active_revoke, expected);
    }

    #[tokio::test]
    async fn test_no_revocation_when_nonvoting_covers() {
        let ledger = ledger(400, 100, 400);
        let plan = RevocationPlanner::new(&ledger)
            .plan(pool(), u(300))
            .await
            .unwrap();
        assert!(!plan.needs_revocation());
        assert!(plan.pending_revoke.is_null());
        assert!(plan.active_revoke.is_null());
        assert!(ledger.neighbor_queries().is_empty());
    }

    #[tokio::test]
    async fn test_insufficient_votes_reports_max() {
        // target 300, nonvoting 100, votes 50 + 80 = 130 < 200 needed
        let ledger = ledger(100, 50, 80);
        let err = RevocationPlanner::new(&ledger)
            .plan(pool(), u(300))
            .await
            .unwrap_err();
        assert_eq!(
            err,
            SdkError::InsufficientVotes {
                requested: u(300),
                max_withdrawable: u(230),
            }
        );
        assert!(ledger.neighbor_queries().is_empty());
    }

    #[tokio::test]
    async fn test_pending_only_revocation() {
        // target 300, nonvoting 270 → revoke 30, all from pending
        let ledger = ledger(270, 50, 400);
        let plan = RevocationPlanner::new(&ledger)
            .plan(pool(), u(300))
            .await
            .unwrap();
        assert_eq!(plan.amount_to_revoke, u(30));
        assert_eq!(plan.pending_portion, u(30));
        assert_eq!(plan.active_portion(), U256::ZERO);
    }

    #[tokio::test]
    async fn test_no_voted_group_is_insufficient() {
        let ledger = ledger(50, 0, 0);
        let err = RevocationPlanner::new(&ledger)
            .plan(pool(), u(300))
            .await
            .unwrap_err();
        assert_eq!(
            err,
            SdkError::InsufficientVotes {
                requested: u(300),
                max_withdrawable: u(50),
            }
        );
    }

    #[tokio::test]
    async fn test_multiple_groups_strict_vs_lenient() {
        let ledger = ledger(50, 100, 400);
        let other = Address::repeat_byte(0x0d);
        ledger.update(|s| {
            s.set_votes(pool(), other, u(0), u(300));
            s.set_eligible(other, u(300));
        });

        let err = RevocationPlanner::new(&ledger)
            .plan(pool(), u(300))
            .await
            .unwrap_err();
        assert_eq!(err, SdkError::UnexpectedVotedGroups { count: 2 });

        let plan = RevocationPlanner::new(&ledger)
            .strict_single_group(false)
            .plan(pool(), u(300))
            .await
            .unwrap();
        assert_eq!(plan.group, Some(other));
        assert_eq!(plan.pending_portion, U256::ZERO);
    }
}
