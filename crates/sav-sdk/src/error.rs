use sav_core::{format_units, Address, ReconcileError, B256, U256, UNIT_DECIMALS};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SdkError {
    /// The withdrawal needs more stake unvoted than one transaction can revoke.
    /// Retry with at most `max_withdrawable` or split into several withdrawals.
    InsufficientVotes {
        requested: U256,
        max_withdrawable: U256,
    },
    /// The deposit would mint more than 2^256 - 1 shares.
    ShareOverflow { amount: U256 },
    /// A local pending withdrawal could not be located in the global list.
    Reconciliation(ReconcileError),
    /// The pool votes for more groups than the single-group convention allows.
    UnexpectedVotedGroups { count: usize },
    /// The voter contract does not belong to this pool.
    ProxyMismatch {
        voter: Address,
        proxy: Address,
        pool: Address,
    },
    /// The call was mined but reverted.
    TransactionFailed { tx_hash: B256, reason: String },
    /// The call was refused before being mined (gas estimation, node validation).
    TransactionRejected { reason: String },
    ConfirmationTimeout { tx_hash: B256, waited_secs: u64 },
    /// Transport/RPC failure inside a collaborator, passed through as-is.
    Collaborator(String),
}

impl fmt::Display for SdkError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            SdkError::InsufficientVotes {
                requested,
                max_withdrawable,
            } => write!(
                f,
                "Can not withdraw {} in a single transaction. \
                 Current maximum withdrawable in a single transaction is: {}",
                format_units(*requested, UNIT_DECIMALS, 18),
                format_units(*max_withdrawable, UNIT_DECIMALS, 18)
            ),
            SdkError::ShareOverflow { amount } => write!(
                f,
                "Depositing {} would overflow the pool's share supply",
                format_units(*amount, UNIT_DECIMALS, 18)
            ),
            SdkError::Reconciliation(e) => write!(f, "{}", e),
            SdkError::UnexpectedVotedGroups { count } => write!(
                f,
                "Pool votes for {} groups, expected at most one",
                count
            ),
            SdkError::ProxyMismatch { voter, proxy, pool } => write!(
                f,
                "Voter {} proxy {} != pool {}",
                voter, proxy, pool
            ),
            SdkError::TransactionFailed { tx_hash, reason } => {
                write!(f, "Transaction {} failed: {}", tx_hash, reason)
            }
            SdkError::TransactionRejected { reason } => {
                write!(f, "Transaction rejected: {}", reason)
            }
            SdkError::ConfirmationTimeout {
                tx_hash,
                waited_secs,
            } => write!(
                f,
                "Transaction {} not confirmed after {}s",
                tx_hash, waited_secs
            ),
            SdkError::Collaborator(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for SdkError {}

impl From<ReconcileError> for SdkError {
    fn from(e: ReconcileError) -> Self {
        SdkError::Reconciliation(e)
    }
}
