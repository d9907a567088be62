// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// SAVINGS POOL - SDK
//
// Orchestration over two collaborators:
// - LedgerQuery: point-in-time reads of pool, election and locked-asset state
// - TxSubmitter: signs, sends and confirms one PreparedCall
// Coordinators read fresh state, compute exact call parameters with sav-core,
// and submit once. No caching, no retries.
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

pub mod error;
pub mod ledger;
pub mod revocation;
pub mod vgroup;
pub mod voting;
pub mod withdrawal;

#[cfg(any(test, feature = "testkit"))]
pub mod testkit;

pub use error::SdkError;
pub use ledger::{LedgerQuery, Receipt, TxSubmitter};
pub use revocation::{RevocationPlan, RevocationPlanner};
pub use vgroup::{VGroupContracts, VGroupCoordinator};
pub use voting::{VoteCoordinator, VoterStatus};
pub use withdrawal::{PoolPosition, WithdrawalCoordinator};
