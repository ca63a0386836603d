use envy::Error::{Custom, MissingValue};
use serde::Deserialize;

use crate::{
    api::client_ip::TrustedProxy,
    context::{DEFAULT_MEV_BASE_FEE_MULTIPLIER, DEFAULT_POS_TRANSITION_SLOT},
};

#[derive(Deserialize, Debug)]
pub struct Environment {
    pub rpc_endpoint: String,
    pub execution_node_endpoint: Option<String>,
    pub rpc_rate_limiter_number: f64,
    #[serde(default = "default_server_address", alias = "gin_server_address")]
    pub server_address: String,
    #[serde(alias = "gin_trusted_proxies_list")]
    pub trusted_proxies: Option<String>,
    #[serde(default = "default_pos_transition_slot")]
    pub pos_transition_slot: u64,
    #[serde(default = "default_mev_base_fee_multiplier")]
    pub mev_base_fee_multiplier: u64,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    pub sentry_dsn: Option<String>,
}

fn default_server_address() -> String {
    "0.0.0.0:8080".into()
}

fn default_pos_transition_slot() -> u64 {
    DEFAULT_POS_TRANSITION_SLOT
}

fn default_mev_base_fee_multiplier() -> u64 {
    DEFAULT_MEV_BASE_FEE_MULTIPLIER
}

fn default_request_timeout_secs() -> u64 {
    8
}

impl Environment {
    pub fn from_env() -> Result<Self, envy::Error> {
        Self::from_vars(std::env::vars())
    }

    pub fn from_vars<I>(vars: I) -> Result<Self, envy::Error>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let config = envy::from_iter::<_, Environment>(vars)?;

        if config.rpc_endpoint.is_empty() {
            return Err(MissingValue("RPC_ENDPOINT"));
        } else if config
            .execution_node_endpoint
            .as_ref()
            .is_some_and(|endpoint| endpoint.is_empty())
        {
            return Err(MissingValue("EXECUTION_NODE_ENDPOINT"));
        } else if config.rpc_rate_limiter_number.is_nan() || config.rpc_rate_limiter_number <= 0.0 {
            return Err(Custom(
                "RPC_RATE_LIMITER_NUMBER must be greater than zero".into(),
            ));
        } else if config.server_address.is_empty() {
            return Err(MissingValue("SERVER_ADDRESS"));
        } else if config.request_timeout_secs == 0 {
            return Err(Custom(
                "REQUEST_TIMEOUT_SECS must be greater than zero".into(),
            ));
        }

        config.trusted_proxies()?;

        Ok(config)
    }

    /// Comma separated `TRUSTED_PROXIES` entries, IPs or CIDR ranges. Empty entries are skipped.
    pub fn trusted_proxies(&self) -> Result<Vec<TrustedProxy>, envy::Error> {
        let Some(proxies) = &self.trusted_proxies else {
            return Ok(vec![]);
        };

        proxies
            .split(',')
            .map(str::trim)
            .filter(|proxy| !proxy.is_empty())
            .map(|proxy| {
                proxy
                    .parse::<TrustedProxy>()
                    .map_err(|err| Custom(format!("TRUSTED_PROXIES: {err}")))
            })
            .collect()
    }
}
