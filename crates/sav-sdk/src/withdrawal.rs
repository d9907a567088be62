// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// WITHDRAWAL COORDINATOR
//
// Deposit, balance and the withdrawal lifecycle of one pool account:
//   NONE ──start──► PENDING ──finish──► FINISHED
//                           └─cancel──► CANCELLED
// State lives on the ledger only. Each operation reads what it needs, prepares
// exactly one call and hands it to the submitter.
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

use sav_core::call::{SIG_DEPOSIT, SIG_WITHDRAW_CANCEL, SIG_WITHDRAW_FINISH, SIG_WITHDRAW_START};
use sav_core::{
    find_global_index, AbiValue, Address, PendingWithdrawal, PoolTotals, PreparedCall, U256,
};

use crate::error::SdkError;
use crate::ledger::{LedgerQuery, Receipt, TxSubmitter};
use crate::revocation::{RevocationPlan, RevocationPlanner};

/// Shares held by an account and what they are worth right now.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolPosition {
    pub account: Address,
    pub shares: U256,
    pub underlying: U256,
    pub totals: PoolTotals,
    pub pending: Vec<PendingWithdrawal>,
}

pub struct WithdrawalCoordinator<'a, L: LedgerQuery + ?Sized, S: TxSubmitter + ?Sized> {
    ledger: &'a L,
    submitter: &'a S,
    pool: Address,
    strict_single_group: bool,
}

impl<'a, L: LedgerQuery + ?Sized, S: TxSubmitter + ?Sized> WithdrawalCoordinator<'a, L, S> {
    pub fn new(ledger: &'a L, submitter: &'a S, pool: Address) -> Self {
        Self {
            ledger,
            submitter,
            pool,
            strict_single_group: true,
        }
    }

    pub fn strict_single_group(mut self, strict: bool) -> Self {
        self.strict_single_group = strict;
        self
    }

    pub fn pool(&self) -> Address {
        self.pool
    }

    // ─────────────────────────────────────────────────────────────────
    // DEPOSIT / BALANCE
    // ─────────────────────────────────────────────────────────────────

    pub fn prepare_deposit(&self, amount: U256) -> PreparedCall {
        PreparedCall::new("DEPOSIT", self.pool, SIG_DEPOSIT, vec![]).with_value(amount)
    }

    /// Shares a deposit of `amount` would mint at the current rate.
    pub async fn predict_deposit_shares(&self, amount: U256) -> Result<U256, SdkError> {
        let totals = self.ledger.get_pool_totals(self.pool).await?;
        totals
            .checked_underlying_to_shares(amount)
            .ok_or(SdkError::ShareOverflow { amount })
    }

    pub async fn deposit(&self, amount: U256) -> Result<Receipt, SdkError> {
        let call = self.prepare_deposit(amount);
        self.submitter.send_and_confirm(&call).await
    }

    pub async fn balance(&self, account: Address) -> Result<PoolPosition, SdkError> {
        let shares = self.ledger.get_share_balance(self.pool, account).await?;
        let totals = self.ledger.get_pool_totals(self.pool).await?;
        let pending = self
            .ledger
            .get_local_pending_withdrawals(self.pool, account)
            .await?;
        Ok(PoolPosition {
            account,
            shares,
            underlying: totals.shares_to_underlying(shares),
            totals,
            pending,
        })
    }

    pub async fn pending_withdrawals(
        &self,
        account: Address,
    ) -> Result<Vec<PendingWithdrawal>, SdkError> {
        self.ledger
            .get_local_pending_withdrawals(self.pool, account)
            .await
    }

    // ─────────────────────────────────────────────────────────────────
    // START
    // ─────────────────────────────────────────────────────────────────

    /// Plan the revocation and build the `withdrawStart` call.
    /// Share balance is not checked here; the pool rejects overdrafts.
    pub async fn prepare_start(
        &self,
        shares: U256,
    ) -> Result<(RevocationPlan, PreparedCall), SdkError> {
        let plan = RevocationPlanner::new(self.ledger)
            .strict_single_group(self.strict_single_group)
            .plan(self.pool, shares)
            .await?;
        let call = PreparedCall::new(
            "WITHDRAW:Start",
            self.pool,
            SIG_WITHDRAW_START,
            vec![
                AbiValue::Uint(shares),
                AbiValue::Address(plan.pending_revoke.lesser),
                AbiValue::Address(plan.pending_revoke.greater),
                AbiValue::Address(plan.active_revoke.lesser),
                AbiValue::Address(plan.active_revoke.greater),
            ],
        );
        Ok((plan, call))
    }

    pub async fn start(&self, shares: U256) -> Result<Receipt, SdkError> {
        let (plan, call) = self.prepare_start(shares).await?;
        log::info!(
            "Withdrawing {} shares for {} underlying (revoking {})",
            shares,
            plan.amount_to_unlock,
            plan.amount_to_revoke
        );
        self.submitter.send_and_confirm(&call).await
    }

    // ─────────────────────────────────────────────────────────────────
    // FINISH / CANCEL
    // ─────────────────────────────────────────────────────────────────

    /// Local entry at `local_index` plus its position in the global list.
    /// The local list is read first, then the global one.
    pub async fn resolve_indices(
        &self,
        account: Address,
        local_index: usize,
    ) -> Result<(PendingWithdrawal, usize), SdkError> {
        let local = self
            .ledger
            .get_local_pending_withdrawals(self.pool, account)
            .await?;
        let global = self.ledger.get_global_pending_withdrawals(self.pool).await?;
        let global_index = find_global_index(&local, &global, local_index)?;
        Ok((local[local_index], global_index))
    }

    pub async fn prepare_finish(
        &self,
        account: Address,
        local_index: usize,
    ) -> Result<(PendingWithdrawal, PreparedCall), SdkError> {
        let (entry, global_index) = self.resolve_indices(account, local_index).await?;
        let call = PreparedCall::new(
            "WITHDRAW:Finish",
            self.pool,
            SIG_WITHDRAW_FINISH,
            vec![AbiValue::index(local_index), AbiValue::index(global_index)],
        );
        Ok((entry, call))
    }

    pub async fn finish(&self, account: Address, local_index: usize) -> Result<Receipt, SdkError> {
        let (_, call) = self.prepare_finish(account, local_index).await?;
        self.submitter.send_and_confirm(&call).await
    }

    pub async fn prepare_cancel(
        &self,
        account: Address,
        local_index: usize,
    ) -> Result<(PendingWithdrawal, PreparedCall), SdkError> {
        let (entry, global_index) = self.resolve_indices(account, local_index).await?;
        let call = PreparedCall::new(
            "WITHDRAW:Cancel",
            self.pool,
            SIG_WITHDRAW_CANCEL,
            vec![AbiValue::index(local_index), AbiValue::index(global_index)],
        );
        Ok((entry, call))
    }

    pub async fn cancel(&self, account: Address, local_index: usize) -> Result<Receipt, SdkError> {
        let (_, call) = self.prepare_cancel(account, local_index).await?;
        self.submitter.send_and_confirm(&call).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testkit::{InMemoryLedger, LedgerState, SimulatedPool};
    use sav_core::ReconcileError;
    use std::sync::Arc;

    fn u(v: u64) -> U256 {
        U256::from(v)
    }

    fn pool() -> Address {
        Address::repeat_byte(0x50)
    }

    fn alice() -> Address {
        Address::repeat_byte(0xa1)
    }

    fn pw(value: u64, time: u64) -> PendingWithdrawal {
        PendingWithdrawal::new(u(value), time)
    }

    fn setup(state: LedgerState) -> (Arc<InMemoryLedger>, SimulatedPool) {
        let ledger = Arc::new(InMemoryLedger::new(state));
        let sim = SimulatedPool::new(ledger.clone(), pool(), alice(), 1_000);
        (ledger, sim)
    }

    #[tokio::test]
    async fn test_prepare_finish_uses_global_index() {
        let mut state = LedgerState::default();
        state
            .local_pending
            .insert((pool(), alice()), vec![pw(100, 500)]);
        state
            .global_pending
            .insert(pool(), vec![pw(50, 100), pw(100, 500), pw(20, 300)]);
        let (ledger, sim) = setup(state);
        let coordinator = WithdrawalCoordinator::new(ledger.as_ref(), &sim, pool());

        let (entry, call) = coordinator.prepare_finish(alice(), 0).await.unwrap();
        assert_eq!(entry, pw(100, 500));
        assert_eq!(call.signature, SIG_WITHDRAW_FINISH);
        assert_eq!(call.uint_arg(0), Some(u(0)));
        assert_eq!(call.uint_arg(1), Some(u(1)));
    }

    #[tokio::test]
    async fn test_cancel_reconciliation_failure() {
        let mut state = LedgerState::default();
        state
            .local_pending
            .insert((pool(), alice()), vec![pw(999, 999)]);
        state
            .global_pending
            .insert(pool(), vec![pw(50, 100), pw(20, 300)]);
        let (ledger, sim) = setup(state);
        let coordinator = WithdrawalCoordinator::new(ledger.as_ref(), &sim, pool());

        let err = coordinator.cancel(alice(), 0).await.unwrap_err();
        assert_eq!(
            err,
            SdkError::Reconciliation(ReconcileError::NotFound {
                value: u(999),
                unlock_time: 999,
            })
        );
        assert!(sim.submitted().is_empty());
    }

    #[tokio::test]
    async fn test_deposit_then_balance() {
        let (ledger, sim) = setup(LedgerState::default());
        let coordinator = WithdrawalCoordinator::new(ledger.as_ref(), &sim, pool());

        assert_eq!(coordinator.predict_deposit_shares(u(10)).await.unwrap(), u(655_360));
        coordinator.deposit(u(10)).await.unwrap();

        let position = coordinator.balance(alice()).await.unwrap();
        assert_eq!(position.shares, u(655_360));
        assert_eq!(position.underlying, u(10));
        assert!(position.pending.is_empty());
    }

    #[tokio::test]
    async fn test_oversized_deposit_reports_overflow() {
        let (ledger, sim) = setup(LedgerState::default());
        let coordinator = WithdrawalCoordinator::new(ledger.as_ref(), &sim, pool());

        let huge = U256::MAX >> 8;
        assert_eq!(
            coordinator.predict_deposit_shares(huge).await.unwrap_err(),
            SdkError::ShareOverflow { amount: huge }
        );
        let err = coordinator.deposit(huge).await.unwrap_err();
        assert!(matches!(err, SdkError::TransactionFailed { .. }));
        assert!(ledger.snapshot().pool_totals.is_empty());
    }

    #[tokio::test]
    async fn test_start_without_revocation_uses_null_ranges() {
        let (ledger, sim) = setup(LedgerState::default());
        let coordinator = WithdrawalCoordinator::new(ledger.as_ref(), &sim, pool());
        coordinator.deposit(u(1_000)).await.unwrap();

        let shares = u(65_536 * 400);
        let (plan, call) = coordinator.prepare_start(shares).await.unwrap();
        assert_eq!(plan.amount_to_unlock, u(400));
        for i in 1..5 {
            assert_eq!(call.address_arg(i), Some(Address::ZERO));
        }

        coordinator.start(shares).await.unwrap();
        let pending = coordinator.pending_withdrawals(alice()).await.unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].value, u(400));
    }

    #[tokio::test]
    async fn test_rejected_submission_propagates() {
        let (ledger, sim) = setup(LedgerState::default());
        let coordinator = WithdrawalCoordinator::new(ledger.as_ref(), &sim, pool());
        sim.reject_next("gas required exceeds allowance");

        let err = coordinator.deposit(u(1)).await.unwrap_err();
        assert_eq!(
            err,
            SdkError::TransactionRejected {
                reason: "gas required exceeds allowance".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_early_finish_reverts() {
        let (ledger, sim) = setup(LedgerState::default());
        let coordinator = WithdrawalCoordinator::new(ledger.as_ref(), &sim, pool());
        coordinator.deposit(u(100)).await.unwrap();
        coordinator.start(u(65_536 * 10)).await.unwrap();

        let err = coordinator.finish(alice(), 0).await.unwrap_err();
        assert!(matches!(err, SdkError::TransactionFailed { .. }));
    }
}
