// ========================================
// INTEGRATION TESTS FOR THE SAVINGS POOL CLIENT
// ========================================
//
// Test Scenarios:
// 1. Revocation planning end to end (recorded call parameters)
// 2. Full withdraw lifecycle with two users interleaving pending withdrawals
// 3. Stale neighbor ranges rejected by the election, then recomputed
// 4. Oversized withdrawal reports the single-transaction maximum
//
// Usage:
//   cargo test --test integration_test -- --nocapture
//
// ========================================

use std::sync::Arc;

use sav_core::call::SIG_WITHDRAW_START;
use sav_core::{Address, GroupVotes, PoolTotals, VoteDelta, U256};
use sav_sdk::testkit::{
    InMemoryLedger, LedgerState, RecordingSubmitter, SimulatedPool, SIMULATED_UNLOCK_PERIOD_SECS,
};
use sav_sdk::{SdkError, VoteCoordinator, WithdrawalCoordinator};
use savings_integration_tests::*;

const T0: u64 = 1_700_000_000;

// ========================================
// TEST 1: REVOCATION PLANNING END TO END
// ========================================
#[tokio::test]
async fn test_end_to_end_revocation_scenario() {
    println!("\n🧪 TEST 1: Revocation planning end to end");

    let mut state = LedgerState::default();
    state
        .pool_totals
        .insert(pool(), PoolTotals::new(u(1_000), u(1_000)));
    state.nonvoting.insert(pool(), u(50));
    state.set_votes(pool(), group_a(), u(100), u(400));
    state.eligible = vec![
        GroupVotes {
            group: group_a(),
            votes: u(500),
        },
        GroupVotes {
            group: group_b(),
            votes: u(5_000),
        },
    ];
    let ledger = InMemoryLedger::new(state);
    let submitter = RecordingSubmitter::new();

    let coordinator = WithdrawalCoordinator::new(&ledger, &submitter, pool());
    coordinator.start(u(300)).await.unwrap();

    assert_eq!(
        ledger.neighbor_queries(),
        vec![
            (group_a(), VoteDelta::Decrease(u(100))),
            (group_a(), VoteDelta::Decrease(u(250))),
        ]
    );

    let call = submitter.last_call().unwrap();
    assert_eq!(call.signature, SIG_WITHDRAW_START);
    assert_eq!(call.to, pool());
    assert_eq!(call.uint_arg(0), Some(u(300)));
    // group_a stays below group_b either way: greater = group_b, lesser = none
    assert_eq!(call.address_arg(1), Some(Address::ZERO));
    assert_eq!(call.address_arg(2), Some(group_b()));
    assert_eq!(call.address_arg(3), Some(Address::ZERO));
    assert_eq!(call.address_arg(4), Some(group_b()));
    println!("✅ revoke 250 (100 pending) with neighbors resolved twice");
}

// ========================================
// TEST 2: WITHDRAW LIFECYCLE
// ========================================
#[tokio::test]
async fn test_withdraw_lifecycle_with_interleaved_users() {
    println!("\n🧪 TEST 2: Withdraw lifecycle");

    let ledger = Arc::new(InMemoryLedger::new(voting_pool_state()));
    let as_alice = SimulatedPool::new(ledger.clone(), pool(), alice(), T0);
    let as_bob = SimulatedPool::new(ledger.clone(), pool(), bob(), T0);
    let advance = |secs: u64| {
        as_alice.advance_time(secs);
        as_bob.advance_time(secs);
    };

    let alice_pool = WithdrawalCoordinator::new(ledger.as_ref(), &as_alice, pool());
    let bob_pool = WithdrawalCoordinator::new(ledger.as_ref(), &as_bob, pool());

    // Deposits: 1000 bootstraps the rate, 500 mints at 65536:1
    alice_pool.deposit(u(1_000)).await.unwrap();
    bob_pool.deposit(u(500)).await.unwrap();
    let alice_shares = alice_pool.balance(alice()).await.unwrap().shares;
    let bob_shares = bob_pool.balance(bob()).await.unwrap().shares;
    assert_eq!(alice_shares, u(65_536_000));
    assert_eq!(bob_shares, u(32_768_000));

    // Vote everything for group_a, then activate it
    let voter = VoteCoordinator::connect(ledger.as_ref(), &as_alice, pool())
        .await
        .unwrap();
    assert!(voter.activate_and_vote_if_needed().await.unwrap().is_some());
    ledger.update(|s| {
        s.activatable.insert(pool());
    });
    assert!(voter.activate_and_vote_if_needed().await.unwrap().is_some());
    let status = voter.status().await.unwrap();
    assert_eq!(status.votes.active, u(1_500));
    assert_eq!(status.nonvoting, U256::ZERO);
    println!("✅ 1500 voted and active for group_a");

    // Every withdrawal now has to revoke
    let half = alice_shares / u(2);
    let (plan, _) = alice_pool.prepare_start(half).await.unwrap();
    assert_eq!(plan.amount_to_unlock, u(500));
    assert_eq!(plan.amount_to_revoke, u(500));
    assert_eq!(plan.pending_portion, U256::ZERO);
    alice_pool.start(half).await.unwrap();

    advance(100);
    bob_pool.start(bob_shares).await.unwrap();

    advance(50);
    alice_pool.start(half).await.unwrap();

    let snapshot = ledger.snapshot();
    assert!(snapshot.voted_groups[&pool()].is_empty());
    assert_eq!(snapshot.global_pending[&pool()].len(), 3);
    assert_eq!(snapshot.pool_totals[&pool()], PoolTotals::default());
    println!("✅ three pending withdrawals, all votes revoked");

    // Bob cancels: his only entry sits at global index 1
    let (_, call) = bob_pool.prepare_cancel(bob(), 0).await.unwrap();
    assert_eq!(call.uint_arg(1), Some(u(1)));
    bob_pool.cancel(bob(), 0).await.unwrap();
    let bob_position = bob_pool.balance(bob()).await.unwrap();
    assert_eq!(bob_position.shares, u(32_768_000));
    assert_eq!(bob_position.underlying, u(500));
    assert!(bob_position.pending.is_empty());

    // Too early for alice
    let err = alice_pool.finish(alice(), 0).await.unwrap_err();
    assert!(matches!(err, SdkError::TransactionFailed { .. }));

    advance(SIMULATED_UNLOCK_PERIOD_SECS);
    let (entry, call) = alice_pool.prepare_finish(alice(), 1).await.unwrap();
    assert_eq!(entry.unlock_time, T0 + 150 + SIMULATED_UNLOCK_PERIOD_SECS);
    assert_eq!(call.uint_arg(1), Some(u(1)));
    alice_pool.finish(alice(), 1).await.unwrap();
    alice_pool.finish(alice(), 0).await.unwrap();

    let snapshot = ledger.snapshot();
    assert!(snapshot.global_pending[&pool()].is_empty());
    assert!(snapshot.local_pending[&(pool(), alice())].is_empty());
    println!("✅ cancel and finish resolved global indices after removals");
}

// ========================================
// TEST 3: STALE NEIGHBORS
// ========================================
#[tokio::test]
async fn test_stale_neighbors_rejected_then_recomputed() {
    println!("\n🧪 TEST 3: Stale neighbor ranges");

    let mut state = voting_pool_state();
    state
        .pool_totals
        .insert(pool(), PoolTotals::new(u(1_000), u(1_000)));
    state.share_balances.insert((pool(), alice()), u(1_000));
    state.set_votes(pool(), group_a(), U256::ZERO, u(1_000));
    state.set_eligible(group_a(), u(1_000));
    state.set_eligible(group_b(), u(900));
    let ledger = Arc::new(InMemoryLedger::new(state));
    let sim = SimulatedPool::new(ledger.clone(), pool(), alice(), T0);
    let coordinator = WithdrawalCoordinator::new(ledger.as_ref(), &sim, pool());

    let (_, stale_call) = coordinator.prepare_start(u(500)).await.unwrap();

    // Another actor moves group_b below group_a's post-revoke total
    ledger.update(|s| s.set_eligible(group_b(), u(100)));

    let err = sav_sdk::TxSubmitter::send_and_confirm(&sim, &stale_call)
        .await
        .unwrap_err();
    match err {
        SdkError::TransactionFailed { reason, .. } => {
            assert!(reason.contains("invalid lesser/greater"), "{}", reason)
        }
        other => panic!("Expected TransactionFailed, got {:?}", other),
    }

    coordinator.start(u(500)).await.unwrap();
    assert_eq!(
        ledger.snapshot().local_pending[&(pool(), alice())].len(),
        1
    );
    println!("✅ stale call reverted, fresh parameters accepted");
}

// ========================================
// TEST 4: OVERSIZED WITHDRAWAL
// ========================================
#[tokio::test]
async fn test_oversized_withdrawal_reports_maximum() {
    println!("\n🧪 TEST 4: Oversized withdrawal");

    let mut state = voting_pool_state();
    state
        .pool_totals
        .insert(pool(), PoolTotals::new(u(1_000), u(1_000)));
    state.nonvoting.insert(pool(), u(100));
    state.set_votes(pool(), group_a(), u(50), u(80));
    let ledger = InMemoryLedger::new(state);
    let submitter = RecordingSubmitter::new();
    let coordinator = WithdrawalCoordinator::new(&ledger, &submitter, pool());

    let err = coordinator.start(u(300)).await.unwrap_err();
    assert_eq!(
        err,
        SdkError::InsufficientVotes {
            requested: u(300),
            max_withdrawable: u(230),
        }
    );
    assert!(err
        .to_string()
        .contains("Current maximum withdrawable in a single transaction"));
    assert!(submitter.calls().is_empty());
    println!("✅ refused with max = nonvoting + votes");
}
