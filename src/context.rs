use std::{fmt, sync::Arc, time::Duration};

use anyhow::Result as AnyhowResult;
use tracing::debug;

use crate::{
    args::Args,
    clients::{
        beacon::{BeaconClient, CommonBeaconClient, Config as BeaconClientConfig},
        execution::{CommonExecutionClient, Config as ExecutionClientConfig, ExecutionClient},
        rate_limiter::RateLimiter,
    },
    env::Environment,
    slots::Slot,
};

/// Network-specific values the slot queries depend on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainSettings {
    /// Slots up to and including this one predate the proof-of-stake transition.
    pub pos_transition_slot: Slot,
    /// A transaction priced strictly above `multiplier × base fee` marks the block as MEV.
    pub mev_base_fee_multiplier: u64,
}

pub const DEFAULT_POS_TRANSITION_SLOT: u64 = 4_700_012;
pub const DEFAULT_MEV_BASE_FEE_MULTIPLIER: u64 = 3;

impl Default for ChainSettings {
    fn default() -> Self {
        Self {
            pos_transition_slot: Slot::from(DEFAULT_POS_TRANSITION_SLOT),
            mev_base_fee_multiplier: DEFAULT_MEV_BASE_FEE_MULTIPLIER,
        }
    }
}

pub struct Config {
    pub beacon_node_endpoint: String,
    pub execution_node_endpoint: String,
    pub requests_per_second: f64,
    pub request_timeout: Duration,
    pub chain_settings: ChainSettings,
}

struct ContextRef {
    pub beacon_client: Box<dyn CommonBeaconClient>,
    pub execution_client: Box<dyn CommonExecutionClient>,
    pub chain_settings: ChainSettings,
}

#[derive(Clone)]
pub struct Context {
    inner: Arc<ContextRef>,
}

impl Context {
    pub fn new(
        beacon_client: Box<dyn CommonBeaconClient>,
        execution_client: Box<dyn CommonExecutionClient>,
        chain_settings: ChainSettings,
    ) -> Self {
        Self {
            inner: Arc::new(ContextRef {
                beacon_client,
                execution_client,
                chain_settings,
            }),
        }
    }

    pub fn try_new(config: Config) -> AnyhowResult<Self> {
        let Config {
            beacon_node_endpoint,
            execution_node_endpoint,
            requests_per_second,
            request_timeout,
            chain_settings,
        } = config;

        // Beacon and execution traffic share one admission budget.
        let rate_limiter = Arc::new(RateLimiter::new(requests_per_second)?);

        debug!(interval = ?rate_limiter.interval(), "Upstream rate limiter configured");

        let client = reqwest::Client::builder().timeout(request_timeout).build()?;

        Ok(Self::new(
            Box::new(BeaconClient::try_with_client(
                client,
                rate_limiter.clone(),
                BeaconClientConfig {
                    base_url: beacon_node_endpoint,
                },
            )?),
            Box::new(ExecutionClient::try_new(
                rate_limiter,
                ExecutionClientConfig {
                    endpoint: execution_node_endpoint,
                    request_timeout,
                },
            )?),
            chain_settings,
        ))
    }

    pub fn beacon_client(&self) -> &dyn CommonBeaconClient {
        self.inner.beacon_client.as_ref()
    }

    pub fn execution_client(&self) -> &dyn CommonExecutionClient {
        self.inner.execution_client.as_ref()
    }

    pub fn chain_settings(&self) -> &ChainSettings {
        &self.inner.chain_settings
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("chain_settings", &self.inner.chain_settings)
            .finish_non_exhaustive()
    }
}

impl From<(&Environment, &Args)> for Config {
    fn from((env, args): (&Environment, &Args)) -> Self {
        Self {
            beacon_node_endpoint: env.rpc_endpoint.clone(),
            execution_node_endpoint: env
                .execution_node_endpoint
                .clone()
                .unwrap_or_else(|| env.rpc_endpoint.clone()),
            requests_per_second: args
                .requests_per_second
                .unwrap_or(env.rpc_rate_limiter_number),
            request_timeout: Duration::from_secs(env.request_timeout_secs),
            chain_settings: ChainSettings {
                pos_transition_slot: Slot::from(env.pos_transition_slot),
                mev_base_fee_multiplier: env.mev_base_fee_multiplier,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use alloy::primitives::B256;
    use httpmock::{Method, MockServer};
    use serde_json::json;

    use super::*;

    #[tokio::test]
    async fn it_should_share_one_rate_limiter_between_beacon_and_execution_clients() {
        let beacon = MockServer::start_async().await;
        beacon
            .mock_async(|when, then| {
                when.method(Method::GET).path("/eth/v1/beacon/headers");
                then.status(200).json_body(json!({
                    "data": [{
                        "root": "0x01",
                        "canonical": true,
                        "header": { "message": { "slot": "6000000", "proposer_index": "1" } }
                    }]
                }));
            })
            .await;

        let execution = MockServer::start_async().await;
        execution
            .mock_async(|when, then| {
                when.method(Method::POST).body_contains("eth_getBlockByHash");
                then.status(200)
                    .json_body(json!({ "jsonrpc": "2.0", "id": 0, "result": null }));
            })
            .await;

        let context = Context::try_new(Config {
            beacon_node_endpoint: beacon.base_url(),
            execution_node_endpoint: execution.base_url(),
            requests_per_second: 2.0,
            request_timeout: Duration::from_secs(5),
            chain_settings: ChainSettings::default(),
        })
        .unwrap();

        let start = std::time::Instant::now();

        context.beacon_client().get_head_slot().await.unwrap();
        context
            .execution_client()
            .get_block(B256::ZERO)
            .await
            .unwrap();

        assert!(
            start.elapsed() >= Duration::from_millis(500),
            "execution call was not spaced after the beacon call: {:?}",
            start.elapsed()
        );
    }

    #[test]
    fn it_should_reject_an_invalid_rate() {
        let result = Context::try_new(Config {
            beacon_node_endpoint: "http://localhost:3500".into(),
            execution_node_endpoint: "http://localhost:8545".into(),
            requests_per_second: 0.0,
            request_timeout: Duration::from_secs(5),
            chain_settings: ChainSettings::default(),
        });

        assert!(result.is_err());
    }
}
