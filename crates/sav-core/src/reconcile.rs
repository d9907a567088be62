//! Local → global pending-withdrawal index recovery.
//!
//! The pool keeps a per-account list of pending withdrawals, while the
//! locked-asset contract keeps one list for the whole pool account, where entries
//! from other users are interleaved and indices shift on every removal. Finishing or
//! cancelling a withdrawal needs both indices, so the global one is recovered by
//! exact `(value, unlock_time)` matching.

use alloy_primitives::U256;
use std::fmt;

use crate::types::PendingWithdrawal;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconcileError {
    /// The local entry has no exact counterpart in the global list.
    /// Most likely one of the two snapshots is stale: re-fetch both and retry once.
    NotFound { value: U256, unlock_time: u64 },
    /// The caller asked for a local index the account does not have.
    LocalIndexOutOfRange { index: usize, len: usize },
}

impl fmt::Display for ReconcileError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ReconcileError::NotFound { value, unlock_time } => write!(
                f,
                "{{time: {}, value: {}}} not found in pending withdrawals",
                unlock_time, value
            ),
            ReconcileError::LocalIndexOutOfRange { index, len } => write!(
                f,
                "Pending withdrawal index {} out of range ({} pending)",
                index, len
            ),
        }
    }
}

impl std::error::Error for ReconcileError {}

/// Index in `global` of the entry matching `local[local_index]`.
///
/// Matching is exact on both fields and never positional. If several global
/// entries share the same pair, the first one in list order is returned.
pub fn find_global_index(
    local: &[PendingWithdrawal],
    global: &[PendingWithdrawal],
    local_index: usize,
) -> Result<usize, ReconcileError> {
    let wanted = local
        .get(local_index)
        .ok_or(ReconcileError::LocalIndexOutOfRange {
            index: local_index,
            len: local.len(),
        })?;

    global
        .iter()
        .position(|p| p.value == wanted.value && p.unlock_time == wanted.unlock_time)
        .ok_or(ReconcileError::NotFound {
            value: wanted.value,
            unlock_time: wanted.unlock_time,
        })
}
