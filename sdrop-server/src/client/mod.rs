//! HTTP implementation of [`ChainClient`].
//!
//! Reads go to the node gateway; transfers are handed to an external signer
//! that holds the key of the funding account.

use crate::config::ChainSettings;
use async_trait::async_trait;
use reqwest::StatusCode;
use sdrop_core::chain::{Balance, BlockHeight, ChainClient, ChainError};
use sdrop_sdk::objects::{AccountId, RawEvent};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// A number that the gateway may render either as a JSON number or as a
/// decimal string (large integers are always strings).
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum NumberRepr {
    Num(u64),
    Str(String),
}

impl NumberRepr {
    fn parse<T>(&self, what: &str) -> Result<T, ChainError>
    where
        T: TryFrom<u64> + std::str::FromStr,
    {
        match self {
            NumberRepr::Num(n) => T::try_from(*n)
                .map_err(|_| ChainError::Malformed(format!("{what} out of range: {n}"))),
            NumberRepr::Str(s) => s
                .parse()
                .map_err(|_| ChainError::Malformed(format!("invalid {what}: {s:?}"))),
        }
    }
}

#[derive(Debug, Deserialize)]
struct BlockHead {
    number: NumberRepr,
}

#[derive(Debug, Deserialize)]
struct BalanceInfo {
    free: NumberRepr,
}

#[derive(Debug, Serialize)]
struct TransferRequest {
    from: AccountId,
    dest: AccountId,
    amount: String,
}

pub struct HttpChainClient {
    endpoint: String,
    signer_endpoint: String,
    account: AccountId,
    http_client: reqwest::Client,
}

impl HttpChainClient {
    pub fn new(settings: &ChainSettings) -> Result<Self, reqwest::Error> {
        Ok(Self {
            endpoint: settings.endpoint.as_str().trim_end_matches('/').to_string(),
            signer_endpoint: settings
                .signer_endpoint
                .as_str()
                .trim_end_matches('/')
                .to_string(),
            account: settings.account,
            http_client: reqwest::Client::builder()
                .timeout(std::time::Duration::from_secs(30))
                .build()?,
        })
    }

    async fn get<T: serde::de::DeserializeOwned>(&self, url: &str) -> Result<T, ChainError> {
        let response = self.http_client.get(url).send().await.map_err(transport)?;
        let response = check_status(response).await?;
        response
            .json()
            .await
            .map_err(|e| ChainError::Malformed(e.to_string()))
    }
}

fn transport(e: reqwest::Error) -> ChainError {
    ChainError::Transport(e.to_string())
}

async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, ChainError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(ChainError::Rpc {
        message: format!("status {}: {}", status.as_u16(), body),
    })
}

#[async_trait]
impl ChainClient for HttpChainClient {
    async fn latest_finalized_height(&self) -> Result<BlockHeight, ChainError> {
        let head: BlockHead = self.get(&format!("{}/blocks/head", self.endpoint)).await?;
        head.number.parse("block number")
    }

    async fn block_events(&self, height: BlockHeight) -> Result<Vec<RawEvent>, ChainError> {
        self.get(&format!("{}/blocks/{height}/events", self.endpoint))
            .await
    }

    async fn free_balance(&self, account: &AccountId) -> Result<Balance, ChainError> {
        let url = format!("{}/accounts/{account}/balance", self.endpoint);
        let response = self
            .http_client
            .get(&url)
            .send()
            .await
            .map_err(transport)?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(ChainError::AccountNotFound(*account));
        }
        let info: BalanceInfo = check_status(response)
            .await?
            .json()
            .await
            .map_err(|e| ChainError::Malformed(e.to_string()))?;
        info.free.parse("free balance")
    }

    async fn transfer(&self, dest: &AccountId, amount: Balance) -> Result<(), ChainError> {
        let request = TransferRequest {
            from: self.account,
            dest: *dest,
            amount: amount.to_string(),
        };
        debug!(dest = %dest, amount = %amount, "Submitting transfer");

        let response = self
            .http_client
            .post(format!("{}/transfer", self.signer_endpoint))
            .json(&request)
            .send()
            .await
            .map_err(transport)?;

        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(ChainError::TransferRejected(format!(
                "status {}: {}",
                status.as_u16(),
                body
            )))
        }
    }
}
