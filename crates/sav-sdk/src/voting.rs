// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// VOTE COORDINATOR
//
// Drives the pool's voter contract: activate pending votes and vote free stake
// for the current group, or move the pool's whole position to another group.
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

use sav_core::call::{SIG_ACTIVATE_AND_VOTE, SIG_CHANGE_VOTED_GROUP};
use sav_core::{AbiValue, Address, GroupVoteBreakdown, PreparedCall, VoteDelta, VoteRevocationRange, U256};

use crate::error::SdkError;
use crate::ledger::{LedgerQuery, Receipt, TxSubmitter};
use crate::revocation::lookup_revocation_ranges;

/// Snapshot of the voter contract's view of the pool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoterStatus {
    pub voter: Address,
    pub pool: Address,
    pub voted_group: Address,
    pub votes: GroupVoteBreakdown,
    pub nonvoting: U256,
    pub group_capacity: U256,
    pub votable: U256,
    pub has_activatable: bool,
}

impl VoterStatus {
    pub fn needs_action(&self) -> bool {
        self.has_activatable || !self.votable.is_zero()
    }
}

pub struct VoteCoordinator<'a, L: LedgerQuery + ?Sized, S: TxSubmitter + ?Sized> {
    ledger: &'a L,
    submitter: &'a S,
    pool: Address,
    voter: Address,
}

impl<'a, L: LedgerQuery + ?Sized, S: TxSubmitter + ?Sized> VoteCoordinator<'a, L, S> {
    pub fn new(ledger: &'a L, submitter: &'a S, pool: Address, voter: Address) -> Self {
        Self {
            ledger,
            submitter,
            pool,
            voter,
        }
    }

    /// Look up the pool's voter contract and check that it acts for this pool.
    pub async fn connect(ledger: &'a L, submitter: &'a S, pool: Address) -> Result<Self, SdkError> {
        let voter = ledger.get_pool_voter(pool).await?;
        let proxy = ledger.get_voter_proxy(voter).await?;
        if proxy != pool {
            return Err(SdkError::ProxyMismatch { voter, proxy, pool });
        }
        log::debug!("Voter {} for pool {}", voter, pool);
        Ok(Self::new(ledger, submitter, pool, voter))
    }

    pub fn voter(&self) -> Address {
        self.voter
    }

    pub async fn voted_group(&self) -> Result<Address, SdkError> {
        self.ledger.get_voter_voted_group(self.voter).await
    }

    /// Free stake that can be voted for `group` without exceeding its capacity.
    pub async fn compute_votable_amount(&self, group: Address) -> Result<U256, SdkError> {
        let nonvoting = self.ledger.get_nonvoting_locked_balance(self.pool).await?;
        let capacity = self.ledger.get_group_remaining_capacity(group).await?;
        Ok(nonvoting.min(capacity))
    }

    pub async fn needs_action(&self) -> Result<bool, SdkError> {
        if self.ledger.has_activatable_pending_votes(self.pool).await? {
            return Ok(true);
        }
        let group = self.voted_group().await?;
        Ok(!self.compute_votable_amount(group).await?.is_zero())
    }

    pub async fn status(&self) -> Result<VoterStatus, SdkError> {
        let voted_group = self.voted_group().await?;
        let votes = self.ledger.get_vote_breakdown(self.pool, voted_group).await?;
        let nonvoting = self.ledger.get_nonvoting_locked_balance(self.pool).await?;
        let group_capacity = self
            .ledger
            .get_group_remaining_capacity(voted_group)
            .await?;
        let has_activatable = self.ledger.has_activatable_pending_votes(self.pool).await?;
        Ok(VoterStatus {
            voter: self.voter,
            pool: self.pool,
            voted_group,
            votes,
            nonvoting,
            group_capacity,
            votable: nonvoting.min(group_capacity),
            has_activatable,
        })
    }

    // ─────────────────────────────────────────────────────────────────
    // ACTIVATE AND VOTE
    // ─────────────────────────────────────────────────────────────────

    pub async fn prepare_activate_and_vote(&self) -> Result<(U256, PreparedCall), SdkError> {
        let group = self.voted_group().await?;
        let to_vote = self.compute_votable_amount(group).await?;
        let range = self
            .ledger
            .find_neighbors_after_vote_delta(group, VoteDelta::Increase(to_vote))
            .await?;
        let call = PreparedCall::new(
            "VOTER:ActivateAndVote",
            self.voter,
            SIG_ACTIVATE_AND_VOTE,
            vec![AbiValue::Address(range.lesser), AbiValue::Address(range.greater)],
        );
        Ok((to_vote, call))
    }

    /// Submit `activateAndVote` unless there is nothing to do (`Ok(None)`).
    pub async fn activate_and_vote_if_needed(&self) -> Result<Option<Receipt>, SdkError> {
        if !self.needs_action().await? {
            log::info!("Nothing to activate or vote");
            return Ok(None);
        }
        let (to_vote, call) = self.prepare_activate_and_vote().await?;
        log::info!("Voting {} for the current group", to_vote);
        self.submitter.send_and_confirm(&call).await.map(Some)
    }

    // ─────────────────────────────────────────────────────────────────
    // CHANGE GROUP
    // ─────────────────────────────────────────────────────────────────

    /// Build `changeVotedGroup`, fully revoking the current group when the pool votes for it.
    /// Without a current position the index is 0 and both ranges are null.
    pub async fn prepare_change_group(&self, new_group: Address) -> Result<PreparedCall, SdkError> {
        let current = self.voted_group().await?;
        let groups = self.ledger.get_voted_groups(self.pool).await?;

        let (index, pending_revoke, active_revoke) =
            match groups.iter().position(|g| *g == current) {
                Some(index) => {
                    let breakdown = self.ledger.get_vote_breakdown(self.pool, current).await?;
                    let (_, pending, active) =
                        lookup_revocation_ranges(self.ledger, &breakdown, breakdown.total())
                            .await?;
                    (index, pending, active)
                }
                None => (0, VoteRevocationRange::NULL, VoteRevocationRange::NULL),
            };

        Ok(PreparedCall::new(
            "VOTER:ChangeGroup",
            self.voter,
            SIG_CHANGE_VOTED_GROUP,
            vec![
                AbiValue::Address(new_group),
                AbiValue::index(index),
                AbiValue::Address(pending_revoke.lesser),
                AbiValue::Address(pending_revoke.greater),
                AbiValue::Address(active_revoke.lesser),
                AbiValue::Address(active_revoke.greater),
            ],
        ))
    }

    pub async fn change_group(&self, new_group: Address) -> Result<Receipt, SdkError> {
        let call = self.prepare_change_group(new_group).await?;
        self.submitter.send_and_confirm(&call).await
    }
}
