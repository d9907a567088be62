//! Collaborator interfaces.
//!
//! [`LedgerQuery`] is the read side: point-in-time views of chain state.
//! [`TxSubmitter`] is the write side: it signs, sends and confirms a
//! [`PreparedCall`]. Neither side retries; failures surface to the caller as-is.

use async_trait::async_trait;
use sav_core::{
    find_lesser_and_greater, Address, GroupVoteBreakdown, GroupVotes, PendingWithdrawal,
    PoolTotals, PreparedCall, VoteDelta, VoteRevocationRange, B256, U256,
};

use crate::error::SdkError;

/// Outcome of a mined transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Receipt {
    pub tx_hash: B256,
    pub block_number: u64,
    pub gas_used: u64,
    pub success: bool,
    /// Decoded revert reason, when the node provides one
    pub revert_reason: Option<String>,
}

#[async_trait]
pub trait LedgerQuery: Send + Sync {
    /// Share supply and underlying held by the pool right now.
    async fn get_pool_totals(&self, pool: Address) -> Result<PoolTotals, SdkError>;

    /// Locked balance of `account` not currently voted for any group.
    async fn get_nonvoting_locked_balance(&self, account: Address) -> Result<U256, SdkError>;

    /// Groups `account` holds nonzero votes for, in election order.
    async fn get_voted_groups(&self, account: Address) -> Result<Vec<Address>, SdkError>;

    async fn get_vote_breakdown(
        &self,
        account: Address,
        group: Address,
    ) -> Result<GroupVoteBreakdown, SdkError>;

    /// Remaining votes `group` can receive before hitting its capacity ceiling.
    async fn get_group_remaining_capacity(&self, group: Address) -> Result<U256, SdkError>;

    async fn has_activatable_pending_votes(&self, account: Address) -> Result<bool, SdkError>;

    /// Pending withdrawals of one account as tracked by the pool.
    async fn get_local_pending_withdrawals(
        &self,
        pool: Address,
        account: Address,
    ) -> Result<Vec<PendingWithdrawal>, SdkError>;

    /// Every pending withdrawal of the pool account in the locked-asset contract,
    /// across all pool users.
    async fn get_global_pending_withdrawals(
        &self,
        pool: Address,
    ) -> Result<Vec<PendingWithdrawal>, SdkError>;

    async fn get_share_balance(&self, pool: Address, account: Address) -> Result<U256, SdkError>;

    /// Voter contract attached to the pool.
    async fn get_pool_voter(&self, pool: Address) -> Result<Address, SdkError>;

    /// Pool the voter contract acts for.
    async fn get_voter_proxy(&self, voter: Address) -> Result<Address, SdkError>;

    /// Group the voter contract currently directs the pool's votes to.
    async fn get_voter_voted_group(&self, voter: Address) -> Result<Address, SdkError>;

    /// Eligible validator groups with their total votes.
    async fn get_eligible_group_votes(&self) -> Result<Vec<GroupVotes>, SdkError>;

    /// Savings pool served by a pool-owned validator group contract.
    async fn get_vgroup_savings_pool(&self, vgroup: Address) -> Result<Address, SdkError>;

    /// Neighbors `group` would have in the sorted vote list after its total moves by `delta`.
    /// Every distinct delta needs its own lookup.
    async fn find_neighbors_after_vote_delta(
        &self,
        group: Address,
        delta: VoteDelta,
    ) -> Result<VoteRevocationRange, SdkError> {
        let eligible = self.get_eligible_group_votes().await?;
        Ok(find_lesser_and_greater(&eligible, group, delta))
    }
}

#[async_trait]
pub trait TxSubmitter: Send + Sync {
    /// Sign and broadcast `call`. Returns once the node accepted it.
    async fn submit(&self, call: &PreparedCall) -> Result<B256, SdkError>;

    /// Block until `tx_hash` is mined (or the submitter gives up).
    async fn await_confirmation(&self, tx_hash: B256) -> Result<Receipt, SdkError>;

    /// Submit, wait, and turn a reverted receipt into [`SdkError::TransactionFailed`].
    async fn send_and_confirm(&self, call: &PreparedCall) -> Result<Receipt, SdkError> {
        log::info!("Sending TX: {} ...", call.name);
        log::debug!("{}: {}", call.name, call);
        let tx_hash = self.submit(call).await?;
        log::info!("Waiting TX: {} ...", tx_hash);
        let receipt = self.await_confirmation(tx_hash).await?;
        if !receipt.success {
            return Err(SdkError::TransactionFailed {
                tx_hash,
                reason: receipt
                    .revert_reason
                    .clone()
                    .unwrap_or_else(|| "execution reverted".to_string()),
            });
        }
        log::info!("DONE: {} in block {}", call.name, receipt.block_number);
        Ok(receipt)
    }
}
