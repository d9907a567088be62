// Prepared contract calls.
//
// A PreparedCall is everything the transaction submitter needs to build a
// transaction: target, method, typed arguments and optional attached value.
// Calldata uses the standard static ABI layout: 4-byte Keccak-256 selector
// followed by one 32-byte word per argument.

use alloy_primitives::{Address, U256};
use serde::{Deserialize, Serialize};
use sha3::{Digest, Keccak256};
use std::fmt;

use crate::types::u256_dec;

pub const SIG_DEPOSIT: &str = "deposit()";
pub const SIG_WITHDRAW_START: &str = "withdrawStart(uint256,address,address,address,address)";
pub const SIG_WITHDRAW_FINISH: &str = "withdrawFinish(uint256,uint256)";
pub const SIG_WITHDRAW_CANCEL: &str = "withdrawCancel(uint256,uint256)";
pub const SIG_ACTIVATE_AND_VOTE: &str = "activateAndVote(address,address)";
pub const SIG_CHANGE_VOTED_GROUP: &str =
    "changeVotedGroup(address,uint256,address,address,address,address)";
pub const SIG_LOCK_GOLD: &str = "lockGold(uint256)";
pub const SIG_UNLOCK_GOLD: &str = "unlockGold(uint256)";

/// Static ABI argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum AbiValue {
    Uint(#[serde(with = "u256_dec")] U256),
    Address(Address),
}

impl AbiValue {
    pub fn index(i: usize) -> Self {
        AbiValue::Uint(U256::from(i))
    }

    /// One big-endian 32-byte ABI word.
    pub fn encode_word(&self) -> [u8; 32] {
        match self {
            AbiValue::Uint(v) => v.to_be_bytes::<32>(),
            AbiValue::Address(a) => {
                let mut word = [0u8; 32];
                word[12..].copy_from_slice(a.as_slice());
                word
            }
        }
    }
}

impl fmt::Display for AbiValue {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            AbiValue::Uint(v) => write!(f, "{}", v),
            AbiValue::Address(a) => write!(f, "{}", a),
        }
    }
}

/// First four bytes of Keccak-256 over the canonical method signature.
pub fn selector(signature: &str) -> [u8; 4] {
    let digest = Keccak256::digest(signature.as_bytes());
    let mut out = [0u8; 4];
    out.copy_from_slice(&digest[..4]);
    out
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreparedCall {
    /// Short human label used in logs ("WITHDRAW:Start", ...)
    pub name: String,
    /// Target contract
    pub to: Address,
    /// Canonical method signature, e.g. `withdrawFinish(uint256,uint256)`
    pub signature: String,
    pub args: Vec<AbiValue>,
    /// Native value attached to the call (payable methods only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<U256>,
}

impl PreparedCall {
    pub fn new(name: &str, to: Address, signature: &str, args: Vec<AbiValue>) -> Self {
        Self {
            name: name.to_string(),
            to,
            signature: signature.to_string(),
            args,
            value: None,
        }
    }

    pub fn with_value(mut self, value: U256) -> Self {
        self.value = Some(value);
        self
    }

    /// Method name without the parameter list.
    pub fn method(&self) -> &str {
        self.signature
            .split_once('(')
            .map(|(m, _)| m)
            .unwrap_or(&self.signature)
    }

    pub fn selector(&self) -> [u8; 4] {
        selector(&self.signature)
    }

    pub fn calldata(&self) -> Vec<u8> {
        let mut data = Vec::with_capacity(4 + 32 * self.args.len());
        data.extend_from_slice(&self.selector());
        for arg in &self.args {
            data.extend_from_slice(&arg.encode_word());
        }
        data
    }

    pub fn calldata_hex(&self) -> String {
        format!("0x{}", hex::encode(self.calldata()))
    }

    pub fn uint_arg(&self, i: usize) -> Option<U256> {
        match self.args.get(i) {
            Some(AbiValue::Uint(v)) => Some(*v),
            _ => None,
        }
    }

    pub fn address_arg(&self, i: usize) -> Option<Address> {
        match self.args.get(i) {
            Some(AbiValue::Address(a)) => Some(*a),
            _ => None,
        }
    }
}

impl fmt::Display for PreparedCall {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let args: Vec<String> = self.args.iter().map(|a| a.to_string()).collect();
        write!(f, "{}.{}({})", self.to, self.method(), args.join(", "))?;
        if let Some(v) = self.value {
            write!(f, " value={}", v)?;
        }
        Ok(())
    }
}
