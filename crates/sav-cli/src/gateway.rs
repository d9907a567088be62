// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// HTTP GATEWAY - REST implementations of LedgerQuery and TxSubmitter
//
// Reads:   GET  {rpc}/pool/{pool}/totals, /election/{account}/voted-groups,
//          /vgroup/{vgroup}/savings-pool, ...
// Writes:  POST {rpc}/tx/send, then poll GET {rpc}/tx/{hash}/receipt
// Amounts travel as decimal strings. The node behind the gateway holds the key
// for `from` and signs.
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

use async_trait::async_trait;
use sav_core::types::u256_dec;
use sav_core::{
    Address, GroupVoteBreakdown, GroupVotes, PendingWithdrawal, PoolTotals, PreparedCall, B256,
    U256,
};
use sav_sdk::{LedgerQuery, Receipt, SdkError, TxSubmitter};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

fn collaborator(e: reqwest::Error) -> SdkError {
    SdkError::Collaborator(format!("Network error: {}", e))
}

#[derive(Deserialize)]
struct ValueBody {
    #[serde(with = "u256_dec")]
    value: U256,
}

#[derive(Deserialize)]
struct FlagBody {
    value: bool,
}

#[derive(Deserialize)]
struct AddressBody {
    address: Address,
}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(alias = "msg")]
    error: String,
}

pub struct HttpLedger {
    client: reqwest::Client,
    rpc: String,
}

impl HttpLedger {
    pub fn new(rpc: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            rpc: rpc.trim_end_matches('/').to_string(),
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, SdkError> {
        let url = format!("{}{}", self.rpc, path);
        let response = self.client.get(&url).send().await.map_err(collaborator)?;
        if !response.status().is_success() {
            return Err(SdkError::Collaborator(format!(
                "GET {}: HTTP {}",
                path,
                response.status()
            )));
        }
        let body = response.json::<T>().await.map_err(collaborator)?;
        Ok(body)
    }

    async fn get_value(&self, path: &str) -> Result<U256, SdkError> {
        let body: ValueBody = self.get_json(path).await?;
        log::debug!("{} = {}", path, body.value);
        Ok(body.value)
    }

    async fn get_address(&self, path: &str) -> Result<Address, SdkError> {
        let body: AddressBody = self.get_json(path).await?;
        log::debug!("{} = {}", path, body.address);
        Ok(body.address)
    }
}

#[async_trait]
impl LedgerQuery for HttpLedger {
    async fn get_pool_totals(&self, pool: Address) -> Result<PoolTotals, SdkError> {
        let totals: PoolTotals = self.get_json(&format!("/pool/{}/totals", pool)).await?;
        log::debug!(
            "pool totals: shares={} underlying={}",
            totals.shares_outstanding,
            totals.underlying_held
        );
        Ok(totals)
    }

    async fn get_nonvoting_locked_balance(&self, account: Address) -> Result<U256, SdkError> {
        self.get_value(&format!("/lockedgold/{}/nonvoting", account))
            .await
    }

    async fn get_voted_groups(&self, account: Address) -> Result<Vec<Address>, SdkError> {
        self.get_json(&format!("/election/{}/voted-groups", account))
            .await
    }

    async fn get_vote_breakdown(
        &self,
        account: Address,
        group: Address,
    ) -> Result<GroupVoteBreakdown, SdkError> {
        let votes: GroupVoteBreakdown = self
            .get_json(&format!("/election/{}/votes/{}", account, group))
            .await?;
        log::debug!(
            "votes for {}: pending={} active={}",
            group,
            votes.pending,
            votes.active
        );
        Ok(votes)
    }

    async fn get_group_remaining_capacity(&self, group: Address) -> Result<U256, SdkError> {
        self.get_value(&format!("/election/group/{}/capacity", group))
            .await
    }

    async fn has_activatable_pending_votes(&self, account: Address) -> Result<bool, SdkError> {
        let body: FlagBody = self
            .get_json(&format!("/election/{}/activatable", account))
            .await?;
        Ok(body.value)
    }

    async fn get_local_pending_withdrawals(
        &self,
        pool: Address,
        account: Address,
    ) -> Result<Vec<PendingWithdrawal>, SdkError> {
        self.get_json(&format!("/pool/{}/pending/{}", pool, account))
            .await
    }

    async fn get_global_pending_withdrawals(
        &self,
        pool: Address,
    ) -> Result<Vec<PendingWithdrawal>, SdkError> {
        self.get_json(&format!("/lockedgold/{}/pending", pool)).await
    }

    async fn get_share_balance(&self, pool: Address, account: Address) -> Result<U256, SdkError> {
        self.get_value(&format!("/pool/{}/shares/{}", pool, account))
            .await
    }

    async fn get_pool_voter(&self, pool: Address) -> Result<Address, SdkError> {
        self.get_address(&format!("/pool/{}/voter", pool)).await
    }

    async fn get_voter_proxy(&self, voter: Address) -> Result<Address, SdkError> {
        self.get_address(&format!("/voter/{}/proxy", voter)).await
    }

    async fn get_voter_voted_group(&self, voter: Address) -> Result<Address, SdkError> {
        self.get_address(&format!("/voter/{}/voted-group", voter))
            .await
    }

    async fn get_eligible_group_votes(&self) -> Result<Vec<GroupVotes>, SdkError> {
        self.get_json("/election/eligible").await
    }

    async fn get_vgroup_savings_pool(&self, vgroup: Address) -> Result<Address, SdkError> {
        self.get_address(&format!("/vgroup/{}/savings-pool", vgroup))
            .await
    }
}

// ─────────────────────────────────────────────────────────────────
// SUBMITTER
// ─────────────────────────────────────────────────────────────────

#[derive(Serialize)]
struct SendRequest<'a> {
    from: Option<Address>,
    to: Address,
    data: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    value: Option<String>,
    /// Label for the node's logs
    name: &'a str,
}

#[derive(Deserialize)]
struct SendResponse {
    tx_hash: B256,
}

#[derive(Deserialize)]
struct ReceiptBody {
    block_number: u64,
    #[serde(default)]
    gas_used: u64,
    success: bool,
    #[serde(default)]
    revert_reason: Option<String>,
}

pub struct HttpSubmitter {
    client: reqwest::Client,
    rpc: String,
    from: Option<Address>,
    timeout: Duration,
    poll_interval: Duration,
}

impl HttpSubmitter {
    pub fn new(rpc: &str, from: Option<Address>, timeout: Duration, poll_interval: Duration) -> Self {
        Self {
            client: reqwest::Client::new(),
            rpc: rpc.trim_end_matches('/').to_string(),
            from,
            timeout,
            poll_interval,
        }
    }

    /// `Ok(None)` while the transaction is not mined yet.
    async fn fetch_receipt(&self, tx_hash: B256) -> Result<Option<Receipt>, SdkError> {
        let url = format!("{}/tx/{}/receipt", self.rpc, tx_hash);
        let response = self.client.get(&url).send().await.map_err(collaborator)?;
        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(SdkError::Collaborator(format!(
                "receipt {}: HTTP {}",
                tx_hash,
                response.status()
            )));
        }
        let body: Option<ReceiptBody> = response.json().await.map_err(collaborator)?;
        Ok(body.map(|r| Receipt {
            tx_hash,
            block_number: r.block_number,
            gas_used: r.gas_used,
            success: r.success,
            revert_reason: r.revert_reason,
        }))
    }
}

#[async_trait]
impl TxSubmitter for HttpSubmitter {
    async fn submit(&self, call: &PreparedCall) -> Result<B256, SdkError> {
        let request = SendRequest {
            from: self.from,
            to: call.to,
            data: call.calldata_hex(),
            value: call.value.map(|v| v.to_string()),
            name: &call.name,
        };
        let url = format!("{}/tx/send", self.rpc);
        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(collaborator)?;

        let status = response.status();
        if status.is_client_error() {
            let reason = match response.json::<ErrorBody>().await {
                Ok(body) => body.error,
                Err(_) => format!("HTTP {}", status),
            };
            return Err(SdkError::TransactionRejected { reason });
        }
        if !status.is_success() {
            return Err(SdkError::Collaborator(format!("POST /tx/send: HTTP {}", status)));
        }
        let body: SendResponse = response.json().await.map_err(collaborator)?;
        Ok(body.tx_hash)
    }

    async fn await_confirmation(&self, tx_hash: B256) -> Result<Receipt, SdkError> {
        let started = Instant::now();
        loop {
            if let Some(receipt) = self.fetch_receipt(tx_hash).await? {
                return Ok(receipt);
            }
            if started.elapsed() >= self.timeout {
                return Err(SdkError::ConfirmationTimeout {
                    tx_hash,
                    waited_secs: started.elapsed().as_secs(),
                });
            }
            tokio::time::sleep(self.poll_interval).await;
        }
    }
}
