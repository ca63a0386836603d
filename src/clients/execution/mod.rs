use std::{future::Future, sync::Arc, time::Duration};

use alloy::{
    primitives::B256,
    providers::{Provider, RootProvider},
};
use async_trait::async_trait;
use url::Url;

#[cfg(test)]
use mockall::automock;

use crate::clients::{
    common::{ClientError, ClientResult},
    rate_limiter::RateLimiter,
};

use self::types::{ExecutionBlock, ExecutionReceipt};

pub mod types;

#[cfg_attr(test, automock)]
#[async_trait]
pub trait CommonExecutionClient: Send + Sync {
    /// Block with full transactions, `None` when the node does not know the hash.
    async fn get_block(&self, hash: B256) -> ClientResult<Option<ExecutionBlock>>;
    async fn get_transaction_receipt(&self, hash: B256) -> ClientResult<Option<ExecutionReceipt>>;
}

/// JSON-RPC client for the execution node. Every call goes through the shared rate limiter.
#[derive(Debug, Clone)]
pub struct ExecutionClient {
    provider: RootProvider,
    rate_limiter: Arc<RateLimiter>,
    request_timeout: Duration,
}

pub struct Config {
    pub endpoint: String,
    pub request_timeout: Duration,
}

impl ExecutionClient {
    pub fn try_new(rate_limiter: Arc<RateLimiter>, config: Config) -> ClientResult<Self> {
        let url = Url::parse(&config.endpoint)?;

        Ok(Self {
            provider: RootProvider::new_http(url),
            rate_limiter,
            request_timeout: config.request_timeout,
        })
    }

    async fn call<T, F>(&self, operation: &str, request: F) -> ClientResult<T>
    where
        F: Future<Output = Result<T, alloy::transports::TransportError>>,
    {
        self.rate_limiter.acquire().await;

        tracing::debug!(method = operation, "Dispatching RPC request");

        match tokio::time::timeout(self.request_timeout, request).await {
            Ok(result) => result.map_err(ClientError::from),
            Err(_) => Err(ClientError::Timeout {
                operation: operation.to_string(),
            }),
        }
    }
}

#[async_trait]
impl CommonExecutionClient for ExecutionClient {
    async fn get_block(&self, hash: B256) -> ClientResult<Option<ExecutionBlock>> {
        let block = self
            .call("eth_getBlockByHash", async {
                self.provider.get_block_by_hash(hash).full().await
            })
            .await?;

        match block {
            Some(block) => Ok(Some(ExecutionBlock::try_from(&block)?)),
            None => Ok(None),
        }
    }

    async fn get_transaction_receipt(&self, hash: B256) -> ClientResult<Option<ExecutionReceipt>> {
        let receipt = self
            .call("eth_getTransactionReceipt", async {
                self.provider.get_transaction_receipt(hash).await
            })
            .await?;

        Ok(receipt.as_ref().map(ExecutionReceipt::from))
    }
}
