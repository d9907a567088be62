// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// TESTKIT - in-memory collaborators
//
// InMemoryLedger answers LedgerQuery from a plain state struct and records every
// neighbor lookup. SimulatedPool is a TxSubmitter that executes prepared calls
// against that state with the pool/election contract rules that matter to the
// client: floor conversions, exact pending-withdrawal matching, neighbor checks.
// Compiled only for tests or with the `testkit` feature.
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

use async_trait::async_trait;
use sav_core::call::{
    SIG_ACTIVATE_AND_VOTE, SIG_CHANGE_VOTED_GROUP, SIG_DEPOSIT, SIG_LOCK_GOLD, SIG_UNLOCK_GOLD,
    SIG_WITHDRAW_CANCEL, SIG_WITHDRAW_FINISH, SIG_WITHDRAW_START,
};
use sav_core::{
    find_lesser_and_greater, Address, GroupVoteBreakdown, GroupVotes, PendingWithdrawal,
    PoolTotals, PreparedCall, VoteDelta, VoteRevocationRange, B256, U256,
};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::error::SdkError;
use crate::ledger::{LedgerQuery, Receipt, TxSubmitter};

/// Everything the in-memory ledger knows. Missing map entries read as zero/empty.
#[derive(Debug, Clone, Default)]
pub struct LedgerState {
    pub pool_totals: HashMap<Address, PoolTotals>,
    pub share_balances: HashMap<(Address, Address), U256>,
    pub nonvoting: HashMap<Address, U256>,
    pub voted_groups: HashMap<Address, Vec<Address>>,
    pub votes: HashMap<(Address, Address), GroupVoteBreakdown>,
    pub eligible: Vec<GroupVotes>,
    pub capacity: HashMap<Address, U256>,
    pub activatable: HashSet<Address>,
    pub local_pending: HashMap<(Address, Address), Vec<PendingWithdrawal>>,
    pub global_pending: HashMap<Address, Vec<PendingWithdrawal>>,
    pub pool_voter: HashMap<Address, Address>,
    pub voter_proxy: HashMap<Address, Address>,
    pub voter_group: HashMap<Address, Address>,
    /// Validator group contract -> savings pool it serves
    pub vgroup_pool: HashMap<Address, Address>,
}

impl LedgerState {
    /// Set `account`'s votes for `group`, registering the group as voted when nonzero.
    pub fn set_votes(&mut self, account: Address, group: Address, pending: U256, active: U256) {
        let breakdown = GroupVoteBreakdown {
            group,
            pending,
            active,
        };
        self.votes.insert((account, group), breakdown);
        let groups = self.voted_groups.entry(account).or_default();
        if breakdown.total().is_zero() {
            groups.retain(|g| *g != group);
        } else if !groups.contains(&group) {
            groups.push(group);
        }
    }

    pub fn set_eligible(&mut self, group: Address, votes: U256) {
        match self.eligible.iter_mut().find(|g| g.group == group) {
            Some(entry) => entry.votes = votes,
            None => self.eligible.push(GroupVotes { group, votes }),
        }
    }

    pub fn eligible_votes(&self, group: Address) -> U256 {
        self.eligible
            .iter()
            .find(|g| g.group == group)
            .map(|g| g.votes)
            .unwrap_or(U256::ZERO)
    }

    fn breakdown(&self, account: Address, group: Address) -> GroupVoteBreakdown {
        self.votes
            .get(&(account, group))
            .copied()
            .unwrap_or(GroupVoteBreakdown {
                group,
                pending: U256::ZERO,
                active: U256::ZERO,
            })
    }
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Deterministic hash for the `n`th submission.
fn tx_hash_for(n: u64) -> B256 {
    B256::left_padding_from(&n.to_be_bytes())
}

#[derive(Debug, Default)]
pub struct InMemoryLedger {
    state: Mutex<LedgerState>,
    neighbor_queries: Mutex<Vec<(Address, VoteDelta)>>,
}

impl InMemoryLedger {
    pub fn new(state: LedgerState) -> Self {
        Self {
            state: Mutex::new(state),
            neighbor_queries: Mutex::new(Vec::new()),
        }
    }

    /// Mutate the state in place, e.g. to simulate another actor's transaction.
    pub fn update<R>(&self, f: impl FnOnce(&mut LedgerState) -> R) -> R {
        f(&mut lock(&self.state))
    }

    pub fn snapshot(&self) -> LedgerState {
        lock(&self.state).clone()
    }

    /// Every `(group, delta)` passed to `find_neighbors_after_vote_delta`, in call order.
    pub fn neighbor_queries(&self) -> Vec<(Address, VoteDelta)> {
        lock(&self.neighbor_queries).clone()
    }

    pub fn clear_neighbor_queries(&self) {
        lock(&self.neighbor_queries).clear();
    }
}

#[async_trait]
impl LedgerQuery for InMemoryLedger {
    async fn get_pool_totals(&self, pool: Address) -> Result<PoolTotals, SdkError> {
        Ok(lock(&self.state)
            .pool_totals
            .get(&pool)
            .copied()
            .unwrap_or_default())
    }

    async fn get_nonvoting_locked_balance(&self, account: Address) -> Result<U256, SdkError> {
        Ok(lock(&self.state)
            .nonvoting
            .get(&account)
            .copied()
            .unwrap_or(U256::ZERO))
    }

    async fn get_voted_groups(&self, account: Address) -> Result<Vec<Address>, SdkError> {
        Ok(lock(&self.state)
            .voted_groups
            .get(&account)
            .cloned()
            .unwrap_or_default())
    }

    async fn get_vote_breakdown(
        &self,
        account: Address,
        group: Address,
    ) -> Result<GroupVoteBreakdown, SdkError> {
        Ok(lock(&self.state).breakdown(account, group))
    }

    async fn get_group_remaining_capacity(&self, group: Address) -> Result<U256, SdkError> {
        Ok(lock(&self.state)
            .capacity
            .get(&group)
            .copied()
            .unwrap_or(U256::ZERO))
    }

    async fn has_activatable_pending_votes(&self, account: Address) -> Result<bool, SdkError> {
        Ok(lock(&self.state).activatable.contains(&account))
    }

    async fn get_local_pending_withdrawals(
        &self,
        pool: Address,
        account: Address,
    ) -> Result<Vec<PendingWithdrawal>, SdkError> {
        Ok(lock(&self.state)
            .local_pending
            .get(&(pool, account))
            .cloned()
            .unwrap_or_default())
    }

    async fn get_global_pending_withdrawals(
        &self,
        pool: Address,
    ) -> Result<Vec<PendingWithdrawal>, SdkError> {
        Ok(lock(&self.state)
            .global_pending
            .get(&pool)
            .cloned()
            .unwrap_or_default())
    }

    async fn get_share_balance(&self, pool: Address, account: Address) -> Result<U256, SdkError> {
        Ok(lock(&self.state)
            .share_balances
            .get(&(pool, account))
            .copied()
            .unwrap_or(U256::ZERO))
    }

    async fn get_pool_voter(&self, pool: Address) -> Result<Address, SdkError> {
        lock(&self.state)
            .pool_voter
            .get(&pool)
            .copied()
            .ok_or_else(|| SdkError::Collaborator(format!("pool {} has no voter", pool)))
    }

    async fn get_voter_proxy(&self, voter: Address) -> Result<Address, SdkError> {
        lock(&self.state)
            .voter_proxy
            .get(&voter)
            .copied()
            .ok_or_else(|| SdkError::Collaborator(format!("unknown voter {}", voter)))
    }

    async fn get_voter_voted_group(&self, voter: Address) -> Result<Address, SdkError> {
        lock(&self.state)
            .voter_group
            .get(&voter)
            .copied()
            .ok_or_else(|| SdkError::Collaborator(format!("unknown voter {}", voter)))
    }

    async fn get_eligible_group_votes(&self) -> Result<Vec<GroupVotes>, SdkError> {
        Ok(lock(&self.state).eligible.clone())
    }

    async fn get_vgroup_savings_pool(&self, vgroup: Address) -> Result<Address, SdkError> {
        lock(&self.state)
            .vgroup_pool
            .get(&vgroup)
            .copied()
            .ok_or_else(|| SdkError::Collaborator(format!("unknown validator group {}", vgroup)))
    }

    async fn find_neighbors_after_vote_delta(
        &self,
        group: Address,
        delta: VoteDelta,
    ) -> Result<VoteRevocationRange, SdkError> {
        lock(&self.neighbor_queries).push((group, delta));
        let eligible = lock(&self.state).eligible.clone();
        Ok(find_lesser_and_greater(&eligible, group, delta))
    }
}

// ─────────────────────────────────────────────────────────────────
// RECORDING SUBMITTER
// ─────────────────────────────────────────────────────────────────

/// Accepts every call without executing it; each one gets a successful receipt.
#[derive(Debug, Default)]
pub struct RecordingSubmitter {
    calls: Mutex<Vec<PreparedCall>>,
}

impl RecordingSubmitter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<PreparedCall> {
        lock(&self.calls).clone()
    }

    pub fn last_call(&self) -> Option<PreparedCall> {
        lock(&self.calls).last().cloned()
    }
}

#[async_trait]
impl TxSubmitter for RecordingSubmitter {
    async fn submit(&self, call: &PreparedCall) -> Result<B256, SdkError> {
        let mut calls = lock(&self.calls);
        calls.push(call.clone());
        Ok(tx_hash_for(calls.len() as u64))
    }

    async fn await_confirmation(&self, tx_hash: B256) -> Result<Receipt, SdkError> {
        let mut counter = [0u8; 8];
        counter.copy_from_slice(&tx_hash[24..]);
        Ok(Receipt {
            tx_hash,
            block_number: u64::from_be_bytes(counter),
            gas_used: 21_000,
            success: true,
            revert_reason: None,
        })
    }
}

// ─────────────────────────────────────────────────────────────────
// SIMULATED POOL (TxSubmitter)
// ─────────────────────────────────────────────────────────────────

/// Seconds between `withdrawStart` and the earliest `withdrawFinish`.
pub const SIMULATED_UNLOCK_PERIOD_SECS: u64 = 3 * 24 * 60 * 60;

/// Executes prepared calls from `sender` against an [`InMemoryLedger`].
/// A call that the real contracts would revert yields a failed receipt.
pub struct SimulatedPool {
    ledger: Arc<InMemoryLedger>,
    pool: Address,
    sender: Address,
    now: Mutex<u64>,
    submitted: Mutex<Vec<PreparedCall>>,
    receipts: Mutex<HashMap<B256, Receipt>>,
    reject_next: Mutex<Option<String>>,
}

impl SimulatedPool {
    pub fn new(ledger: Arc<InMemoryLedger>, pool: Address, sender: Address, now: u64) -> Self {
        Self {
            ledger,
            pool,
            sender,
            now: Mutex::new(now),
            submitted: Mutex::new(Vec::new()),
            receipts: Mutex::new(HashMap::new()),
            reject_next: Mutex::new(None),
        }
    }

    pub fn now(&self) -> u64 {
        *lock(&self.now)
    }

    pub fn advance_time(&self, secs: u64) {
        *lock(&self.now) += secs;
    }

    /// Calls accepted by `submit`, in order (including ones that reverted).
    pub fn submitted(&self) -> Vec<PreparedCall> {
        lock(&self.submitted).clone()
    }

    /// Make the next `submit` fail before execution, as a node refusing the tx would.
    pub fn reject_next(&self, reason: &str) {
        *lock(&self.reject_next) = Some(reason.to_string());
    }

    /// Runs `call` against a copy of the ledger state and commits it only on success,
    /// so a revert leaves no trace.
    fn execute(&self, call: &PreparedCall) -> Result<(), String> {
        let now = self.now();
        let sender = self.sender;
        let pool = self.pool;
        self.ledger.update(|state| {
            let mut next = state.clone();
            let outcome = match call.signature.as_str() {
                SIG_DEPOSIT => deposit(&mut next, pool, sender, call.value.unwrap_or(U256::ZERO)),
                SIG_WITHDRAW_START => withdraw_start(&mut next, pool, sender, call, now),
                SIG_WITHDRAW_FINISH => withdraw_finish(&mut next, pool, sender, call, now),
                SIG_WITHDRAW_CANCEL => withdraw_cancel(&mut next, pool, sender, call),
                SIG_ACTIVATE_AND_VOTE => activate_and_vote(&mut next, pool, call),
                SIG_CHANGE_VOTED_GROUP => change_voted_group(&mut next, pool, call),
                SIG_LOCK_GOLD => lock_gold(&mut next, call),
                SIG_UNLOCK_GOLD => unlock_gold(&mut next, call, now),
                other => Err(format!("unknown method {}", other)),
            };
            if outcome.is_ok() {
                *state = next;
            }
            outcome
        })
    }
}

fn arg_uint(call: &PreparedCall, i: usize) -> Result<U256, String> {
    call.uint_arg(i)
        .ok_or_else(|| format!("{}: argument {} is not uint256", call.method(), i))
}

fn arg_address(call: &PreparedCall, i: usize) -> Result<Address, String> {
    call.address_arg(i)
        .ok_or_else(|| format!("{}: argument {} is not address", call.method(), i))
}

fn arg_index(call: &PreparedCall, i: usize) -> Result<usize, String> {
    let v = arg_uint(call, i)?;
    usize::try_from(v).map_err(|_| format!("{}: index {} too large", call.method(), v))
}

fn arg_range(call: &PreparedCall, i: usize) -> Result<VoteRevocationRange, String> {
    Ok(VoteRevocationRange::new(
        arg_address(call, i)?,
        arg_address(call, i + 1)?,
    ))
}

fn deposit(state: &mut LedgerState, pool: Address, sender: Address, value: U256) -> Result<(), String> {
    if value.is_zero() {
        return Err("deposit: zero value".to_string());
    }
    let totals = state.pool_totals.entry(pool).or_default();
    let shares = totals
        .checked_underlying_to_shares(value)
        .ok_or_else(|| "deposit: share overflow".to_string())?;
    totals.shares_outstanding += shares;
    totals.underlying_held += value;
    *state.share_balances.entry((pool, sender)).or_default() += shares;
    *state.nonvoting.entry(pool).or_default() += value;
    Ok(())
}

/// Revoke `amount` of `pool`'s votes for `group`, pending first, validating both ranges
/// the way the election contract does.
fn revoke(
    state: &mut LedgerState,
    pool: Address,
    group: Address,
    amount: U256,
    pending_range: VoteRevocationRange,
    active_range: VoteRevocationRange,
) -> Result<(), String> {
    let breakdown = state.breakdown(pool, group);
    if amount > breakdown.total() {
        return Err("revoke: not enough votes".to_string());
    }
    let pending_part = amount.min(breakdown.pending);
    let active_part = amount - pending_part;

    let expected_pending =
        find_lesser_and_greater(&state.eligible, group, VoteDelta::Decrease(pending_part));
    if pending_range != expected_pending {
        return Err("revokePending: invalid lesser/greater".to_string());
    }
    let expected_active =
        find_lesser_and_greater(&state.eligible, group, VoteDelta::Decrease(amount));
    if !active_part.is_zero() && active_range != expected_active {
        return Err("revokeActive: invalid lesser/greater".to_string());
    }

    state.set_votes(
        pool,
        group,
        breakdown.pending - pending_part,
        breakdown.active - active_part,
    );
    let remaining = state.eligible_votes(group).saturating_sub(amount);
    state.set_eligible(group, remaining);
    *state.capacity.entry(group).or_default() += amount;
    *state.nonvoting.entry(pool).or_default() += amount;
    Ok(())
}

fn withdraw_start(
    state: &mut LedgerState,
    pool: Address,
    sender: Address,
    call: &PreparedCall,
    now: u64,
) -> Result<(), String> {
    let shares = arg_uint(call, 0)?;
    let pending_range = arg_range(call, 1)?;
    let active_range = arg_range(call, 3)?;

    let balance = state
        .share_balances
        .get(&(pool, sender))
        .copied()
        .unwrap_or(U256::ZERO);
    if shares > balance {
        return Err("withdrawStart: not enough shares".to_string());
    }
    let totals = state.pool_totals.get(&pool).copied().unwrap_or_default();
    let amount = totals.shares_to_underlying(shares);

    let nonvoting = state.nonvoting.get(&pool).copied().unwrap_or(U256::ZERO);
    let to_revoke = amount.saturating_sub(nonvoting);
    if !to_revoke.is_zero() {
        let group = state
            .voted_groups
            .get(&pool)
            .and_then(|g| g.last().copied())
            .ok_or_else(|| "withdrawStart: nothing to revoke".to_string())?;
        revoke(state, pool, group, to_revoke, pending_range, active_range)?;
    }

    *state.nonvoting.entry(pool).or_default() -= amount;
    let totals = state.pool_totals.entry(pool).or_default();
    totals.shares_outstanding -= shares;
    totals.underlying_held -= amount;
    *state.share_balances.entry((pool, sender)).or_default() -= shares;

    let entry = PendingWithdrawal::new(amount, now + SIMULATED_UNLOCK_PERIOD_SECS);
    state
        .local_pending
        .entry((pool, sender))
        .or_default()
        .push(entry);
    state.global_pending.entry(pool).or_default().push(entry);
    Ok(())
}

/// Remove the entry at `(index, index_global)` after checking both views agree.
fn take_pending(
    state: &mut LedgerState,
    pool: Address,
    sender: Address,
    call: &PreparedCall,
) -> Result<PendingWithdrawal, String> {
    let index = arg_index(call, 0)?;
    let index_global = arg_index(call, 1)?;
    let local = state.local_pending.entry((pool, sender)).or_default();
    let entry = *local
        .get(index)
        .ok_or_else(|| format!("{}: bad index", call.method()))?;
    let global = state.global_pending.entry(pool).or_default();
    if global.get(index_global) != Some(&entry) {
        return Err(format!("{}: mismatched global index", call.method()));
    }
    global.remove(index_global);
    if let Some(local) = state.local_pending.get_mut(&(pool, sender)) {
        local.remove(index);
    }
    Ok(entry)
}

fn withdraw_finish(
    state: &mut LedgerState,
    pool: Address,
    sender: Address,
    call: &PreparedCall,
    now: u64,
) -> Result<(), String> {
    let index = arg_index(call, 0)?;
    let ready = state
        .local_pending
        .get(&(pool, sender))
        .and_then(|l| l.get(index))
        .map(|p| p.is_unlocked(now))
        .unwrap_or(false);
    if !ready {
        return Err("withdrawFinish: pending withdrawal not available".to_string());
    }
    take_pending(state, pool, sender, call).map(|_| ())
}

fn withdraw_cancel(
    state: &mut LedgerState,
    pool: Address,
    sender: Address,
    call: &PreparedCall,
) -> Result<(), String> {
    let entry = take_pending(state, pool, sender, call)?;
    // Relocked value mints shares at the current rate.
    let totals = state.pool_totals.entry(pool).or_default();
    let shares = totals.underlying_to_shares(entry.value);
    totals.shares_outstanding += shares;
    totals.underlying_held += entry.value;
    *state.share_balances.entry((pool, sender)).or_default() += shares;
    *state.nonvoting.entry(pool).or_default() += entry.value;
    Ok(())
}

fn voter_for_pool(state: &LedgerState, pool: Address, to: Address) -> Result<Address, String> {
    match state.pool_voter.get(&pool) {
        Some(voter) if *voter == to => Ok(*voter),
        _ => Err("caller is not the pool's voter".to_string()),
    }
}

fn activate_and_vote(state: &mut LedgerState, pool: Address, call: &PreparedCall) -> Result<(), String> {
    let voter = voter_for_pool(state, pool, call.to)?;
    let range = arg_range(call, 0)?;
    let group = *state
        .voter_group
        .get(&voter)
        .ok_or_else(|| "activateAndVote: no voted group".to_string())?;

    if state.activatable.remove(&pool) {
        let b = state.breakdown(pool, group);
        state.set_votes(pool, group, U256::ZERO, b.active + b.pending);
    }

    let nonvoting = state.nonvoting.get(&pool).copied().unwrap_or(U256::ZERO);
    let capacity = state.capacity.get(&group).copied().unwrap_or(U256::ZERO);
    let to_vote = nonvoting.min(capacity);
    if to_vote.is_zero() {
        return Ok(());
    }
    let expected = find_lesser_and_greater(&state.eligible, group, VoteDelta::Increase(to_vote));
    if range != expected {
        return Err("vote: invalid lesser/greater".to_string());
    }
    let b = state.breakdown(pool, group);
    state.set_votes(pool, group, b.pending + to_vote, b.active);
    let total = state.eligible_votes(group) + to_vote;
    state.set_eligible(group, total);
    *state.capacity.entry(group).or_default() -= to_vote;
    *state.nonvoting.entry(pool).or_default() -= to_vote;
    Ok(())
}

fn change_voted_group(state: &mut LedgerState, pool: Address, call: &PreparedCall) -> Result<(), String> {
    let voter = voter_for_pool(state, pool, call.to)?;
    let new_group = arg_address(call, 0)?;
    let index = arg_index(call, 1)?;
    let pending_range = arg_range(call, 2)?;
    let active_range = arg_range(call, 4)?;

    if let Some(current) = state.voter_group.get(&voter).copied() {
        let groups = state.voted_groups.get(&pool).cloned().unwrap_or_default();
        if let Some(pos) = groups.iter().position(|g| *g == current) {
            if pos != index {
                return Err("changeVotedGroup: wrong group index".to_string());
            }
            let total = state.breakdown(pool, current).total();
            revoke(state, pool, current, total, pending_range, active_range)?;
        }
    }
    state.voter_group.insert(voter, new_group);
    Ok(())
}

fn vgroup_target(state: &LedgerState, call: &PreparedCall) -> Result<Address, String> {
    if state.vgroup_pool.contains_key(&call.to) {
        Ok(call.to)
    } else {
        Err(format!("{}: not a validator group contract", call.method()))
    }
}

/// Moves value held by the group contract into its nonvoting locked balance.
fn lock_gold(state: &mut LedgerState, call: &PreparedCall) -> Result<(), String> {
    let vgroup = vgroup_target(state, call)?;
    let amount = arg_uint(call, 0)?;
    *state.nonvoting.entry(vgroup).or_default() += amount;
    Ok(())
}

fn unlock_gold(state: &mut LedgerState, call: &PreparedCall, now: u64) -> Result<(), String> {
    let vgroup = vgroup_target(state, call)?;
    let amount = arg_uint(call, 0)?;
    let nonvoting = state.nonvoting.entry(vgroup).or_default();
    if amount > *nonvoting {
        return Err("unlockGold: not enough nonvoting locked gold".to_string());
    }
    *nonvoting -= amount;
    state
        .global_pending
        .entry(vgroup)
        .or_default()
        .push(PendingWithdrawal::new(amount, now + SIMULATED_UNLOCK_PERIOD_SECS));
    Ok(())
}

#[async_trait]
impl TxSubmitter for SimulatedPool {
    async fn submit(&self, call: &PreparedCall) -> Result<B256, SdkError> {
        if let Some(reason) = lock(&self.reject_next).take() {
            return Err(SdkError::TransactionRejected { reason });
        }
        let mut submitted = lock(&self.submitted);
        submitted.push(call.clone());
        let block_number = submitted.len() as u64;
        let tx_hash = tx_hash_for(block_number);
        drop(submitted);

        let outcome = self.execute(call);
        let receipt = Receipt {
            tx_hash,
            block_number,
            gas_used: 21_000 + 16 * call.calldata().len() as u64,
            success: outcome.is_ok(),
            revert_reason: outcome.err(),
        };
        lock(&self.receipts).insert(tx_hash, receipt);
        Ok(tx_hash)
    }

    async fn await_confirmation(&self, tx_hash: B256) -> Result<Receipt, SdkError> {
        lock(&self.receipts)
            .get(&tx_hash)
            .cloned()
            .ok_or(SdkError::ConfirmationTimeout {
                tx_hash,
                waited_secs: 0,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sav_core::AbiValue;

    fn u(v: u64) -> U256 {
        U256::from(v)
    }

    fn pool() -> Address {
        Address::repeat_byte(0x50)
    }

    fn voter() -> Address {
        Address::repeat_byte(0x5e)
    }

    fn group_a() -> Address {
        Address::repeat_byte(0x0a)
    }

    fn group_b() -> Address {
        Address::repeat_byte(0x0b)
    }

    fn activatable_state() -> LedgerState {
        let mut state = LedgerState::default();
        state.pool_voter.insert(pool(), voter());
        state.voter_proxy.insert(voter(), pool());
        state.voter_group.insert(voter(), group_a());
        state.set_eligible(group_a(), u(100));
        state.set_eligible(group_b(), u(5_000));
        state.capacity.insert(group_a(), u(10_000));
        state.set_votes(pool(), group_a(), u(40), u(60));
        state.nonvoting.insert(pool(), u(25));
        state.activatable.insert(pool());
        state
    }

    #[tokio::test]
    async fn test_reverted_activate_and_vote_leaves_state_untouched() {
        let ledger = Arc::new(InMemoryLedger::new(activatable_state()));
        let sim = SimulatedPool::new(ledger.clone(), pool(), voter(), 0);

        // group_a stays below group_b, so the only valid range is (0, group_b)
        let wrong = VoteRevocationRange::new(group_b(), Address::ZERO);
        let call = PreparedCall::new(
            "VOTER:ActivateAndVote",
            voter(),
            SIG_ACTIVATE_AND_VOTE,
            vec![AbiValue::Address(wrong.lesser), AbiValue::Address(wrong.greater)],
        );
        let err = sim.send_and_confirm(&call).await.unwrap_err();
        match err {
            SdkError::TransactionFailed { reason, .. } => {
                assert_eq!(reason, "vote: invalid lesser/greater")
            }
            other => panic!("Expected TransactionFailed, got {:?}", other),
        }

        let after = ledger.snapshot();
        assert!(after.activatable.contains(&pool()));
        let b = after.breakdown(pool(), group_a());
        assert_eq!((b.pending, b.active), (u(40), u(60)));
        assert_eq!(after.nonvoting[&pool()], u(25));
        assert_eq!(after.eligible_votes(group_a()), u(100));
    }

    #[tokio::test]
    async fn test_tx_hashes_stay_distinct_past_256_submissions() {
        let submitter = RecordingSubmitter::new();
        let call = PreparedCall::new("POOL:Deposit", pool(), SIG_DEPOSIT, vec![]);
        let mut seen = HashSet::new();
        for _ in 0..300 {
            assert!(seen.insert(submitter.submit(&call).await.unwrap()));
        }
        let last = submitter.submit(&call).await.unwrap();
        let receipt = submitter.await_confirmation(last).await.unwrap();
        assert_eq!(receipt.block_number, 301);
    }
}
