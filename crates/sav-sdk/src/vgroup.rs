// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// VALIDATOR GROUP COORDINATOR
//
// Operator side of a pool-owned validator group contract: lock value it holds,
// start unlocking it, and show which savings pool it serves.
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

use sav_core::call::{SIG_LOCK_GOLD, SIG_UNLOCK_GOLD};
use sav_core::{AbiValue, Address, PreparedCall, U256};

use crate::error::SdkError;
use crate::ledger::{LedgerQuery, Receipt, TxSubmitter};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VGroupContracts {
    pub savings_pool: Address,
    pub vgroup: Address,
}

pub struct VGroupCoordinator<'a, L: LedgerQuery + ?Sized, S: TxSubmitter + ?Sized> {
    ledger: &'a L,
    submitter: &'a S,
    vgroup: Address,
}

impl<'a, L: LedgerQuery + ?Sized, S: TxSubmitter + ?Sized> VGroupCoordinator<'a, L, S> {
    pub fn new(ledger: &'a L, submitter: &'a S, vgroup: Address) -> Self {
        Self {
            ledger,
            submitter,
            vgroup,
        }
    }

    pub fn vgroup(&self) -> Address {
        self.vgroup
    }

    pub async fn contracts(&self) -> Result<VGroupContracts, SdkError> {
        let savings_pool = self.ledger.get_vgroup_savings_pool(self.vgroup).await?;
        Ok(VGroupContracts {
            savings_pool,
            vgroup: self.vgroup,
        })
    }

    pub fn prepare_lock(&self, amount: U256) -> PreparedCall {
        PreparedCall::new(
            "VGROUP:Lock",
            self.vgroup,
            SIG_LOCK_GOLD,
            vec![AbiValue::Uint(amount)],
        )
    }

    pub async fn lock(&self, amount: U256) -> Result<Receipt, SdkError> {
        let call = self.prepare_lock(amount);
        self.submitter.send_and_confirm(&call).await
    }

    pub fn prepare_unlock(&self, amount: U256) -> PreparedCall {
        PreparedCall::new(
            "VGROUP:Unlock",
            self.vgroup,
            SIG_UNLOCK_GOLD,
            vec![AbiValue::Uint(amount)],
        )
    }

    /// Starts the unlocking period for `amount` of the group's nonvoting locked balance.
    pub async fn unlock(&self, amount: U256) -> Result<Receipt, SdkError> {
        let call = self.prepare_unlock(amount);
        self.submitter.send_and_confirm(&call).await
    }
}
