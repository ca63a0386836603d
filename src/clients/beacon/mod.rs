use std::sync::Arc;

use alloy::primitives::B256;
use anyhow::{anyhow, Context as AnyhowContext};
use async_trait::async_trait;
use reqwest::{Client, Url};

#[cfg(test)]
use mockall::automock;

use crate::{
    clients::{common::ClientResult, rate_limiter::RateLimiter},
    json_get,
    slots::Slot,
};

use self::types::{
    BlockHeadersResponse, BlockResponse, SyncCommitteeResponse, ValidatorsResponse,
};

pub mod types;

#[cfg_attr(test, automock)]
#[async_trait]
pub trait CommonBeaconClient: Send + Sync {
    /// Execution block hash referenced by the beacon block at `slot`.
    async fn get_block_hash(&self, slot: &Slot) -> ClientResult<B256>;
    async fn get_head_slot(&self) -> ClientResult<Slot>;
    async fn get_sync_committee_indices(&self, slot: &Slot) -> ClientResult<Vec<String>>;
    /// Public keys of the given validators, in the order the node returns them.
    async fn get_validator_pubkeys(
        &self,
        slot: &Slot,
        validator_indices: &[String],
    ) -> ClientResult<Vec<String>>;
}

#[derive(Debug, Clone)]
pub struct BeaconClient {
    base_url: Url,
    client: Client,
    rate_limiter: Arc<RateLimiter>,
}

pub struct Config {
    pub base_url: String,
}

impl BeaconClient {
    pub fn try_with_client(
        client: Client,
        rate_limiter: Arc<RateLimiter>,
        config: Config,
    ) -> ClientResult<Self> {
        let base_url = Url::parse(&format!("{}/eth/", config.base_url.trim_end_matches('/')))
            .with_context(|| "Failed to parse base URL")?;

        Ok(Self {
            base_url,
            client,
            rate_limiter,
        })
    }

    fn validators_url(&self, slot: &Slot, validator_indices: &[String]) -> ClientResult<Url> {
        let path = format!("v1/beacon/states/{slot}/validators");
        let mut url = self.base_url.join(path.as_str())?;

        if !validator_indices.is_empty() {
            let mut query = url.query_pairs_mut();

            for index in validator_indices {
                query.append_pair("id", index);
            }
        }

        Ok(url)
    }
}

#[async_trait]
impl CommonBeaconClient for BeaconClient {
    async fn get_block_hash(&self, slot: &Slot) -> ClientResult<B256> {
        let path = format!("v2/beacon/blocks/{slot}");
        let url = self.base_url.join(path.as_str())?;

        json_get!(&self.client, self.rate_limiter, url, BlockResponse)
            .map(|res| res.data.message.body.eth1_data.block_hash)
    }

    async fn get_head_slot(&self) -> ClientResult<Slot> {
        let url = self.base_url.join("v1/beacon/headers")?;

        let response = json_get!(&self.client, self.rate_limiter, url, BlockHeadersResponse)?;
        let head = response
            .data
            .first()
            .ok_or_else(|| anyhow!("Beacon node returned no block headers"))?;

        let slot = head
            .header
            .message
            .slot
            .parse::<Slot>()
            .with_context(|| "Failed to parse head slot")?;

        Ok(slot)
    }

    async fn get_sync_committee_indices(&self, slot: &Slot) -> ClientResult<Vec<String>> {
        let path = format!("v1/beacon/states/{slot}/sync_committees");
        let url = self.base_url.join(path.as_str())?;

        json_get!(&self.client, self.rate_limiter, url, SyncCommitteeResponse)
            .map(|res| res.data.validators)
    }

    async fn get_validator_pubkeys(
        &self,
        slot: &Slot,
        validator_indices: &[String],
    ) -> ClientResult<Vec<String>> {
        let url = self.validators_url(slot, validator_indices)?;

        json_get!(&self.client, self.rate_limiter, url, ValidatorsResponse).map(|res| {
            res.data
                .into_iter()
                .map(|entry| entry.validator.pubkey)
                .collect()
        })
    }
}
