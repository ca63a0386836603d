use anyhow::anyhow;
use futures::future::join_all;
use num_bigint::BigUint;
use tracing::{debug, info, warn};

use crate::{
    context::Context,
    slots::{SlotQueryError, SlotValidator},
};

use self::types::{BlockReward, RewardResult, TransactionCharge};

pub mod types;

/// Computes the execution-layer reward of the block proposed at a slot.
#[derive(Debug, Clone)]
pub struct RewardAggregator {
    context: Context,
    slot_validator: SlotValidator,
}

impl RewardAggregator {
    pub fn new(context: Context) -> Self {
        Self {
            slot_validator: SlotValidator::new(context.clone()),
            context,
        }
    }

    pub async fn reward_for_slot(&self, slot_text: &str) -> Result<RewardResult, SlotQueryError> {
        let slot = self.slot_validator.validate(slot_text).await?;

        let block_hash = self.context.beacon_client().get_block_hash(&slot).await?;

        let execution_client = self.context.execution_client();
        let block = execution_client
            .get_block(block_hash)
            .await?
            .ok_or_else(|| anyhow!("Execution block {block_hash} not found"))?;

        debug!(
            %slot,
            execution_block = %block.hash,
            transactions = block.transactions.len(),
            "Fetching transaction receipts"
        );

        // Receipts are independent; admission is left to the shared rate limiter.
        let charges = join_all(block.transactions.iter().map(|tx| async move {
            let receipt = execution_client.get_transaction_receipt(tx.hash).await;

            if let Err(error) = &receipt {
                warn!(tx_hash = %tx.hash, ?error, "Failed to fetch receipt, using transaction values");
            }

            TransactionCharge::from_receipt(tx, &receipt)
        }))
        .await;

        let block_reward = BlockReward::aggregate(
            &BigUint::from(block.base_fee_per_gas),
            &BigUint::from(block.gas_used),
            &charges,
            self.context.chain_settings().mev_base_fee_multiplier,
        );

        info!(
            %slot,
            %block_hash,
            reward_wei = %block_reward.reward,
            status = ?block_reward.status,
            estimated_charges = charges.iter().filter(|c| c.is_estimated()).count(),
            "Block reward computed"
        );

        Ok(block_reward.into())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    };

    use alloy::primitives::B256;
    use mockall::predicate::eq;

    use crate::{
        clients::{
            beacon::MockCommonBeaconClient,
            common::ClientError,
            execution::{
                types::{ExecutionBlock, ExecutionReceipt, ExecutionTransaction},
                MockCommonExecutionClient,
            },
        },
        context::ChainSettings,
        slots::{tests::beacon_client_with_head, Slot},
    };

    use super::{types::RewardStatus, *};

    fn block_hash() -> B256 {
        B256::repeat_byte(0xab)
    }

    fn tx(byte: u8, gas_price: u128, gas_limit: u64) -> ExecutionTransaction {
        ExecutionTransaction {
            hash: B256::repeat_byte(byte),
            gas_price,
            gas_limit,
        }
    }

    fn beacon_client_with_block(head: u64, slot: u64) -> MockCommonBeaconClient {
        let mut beacon_client = beacon_client_with_head(head);

        beacon_client
            .expect_get_block_hash()
            .withf(move |requested| *requested == Slot::from(slot))
            .times(1)
            .returning(|_| Ok(block_hash()));

        beacon_client
    }

    fn execution_client_with_block(block: ExecutionBlock) -> MockCommonExecutionClient {
        let mut execution_client = MockCommonExecutionClient::new();

        execution_client
            .expect_get_block()
            .with(eq(block_hash()))
            .times(1)
            .returning(move |_| Ok(Some(block.clone())));

        execution_client
    }

    fn build_aggregator(
        beacon_client: MockCommonBeaconClient,
        execution_client: MockCommonExecutionClient,
    ) -> RewardAggregator {
        RewardAggregator::new(Context::new(
            Box::new(beacon_client),
            Box::new(execution_client),
            ChainSettings::default(),
        ))
    }

    #[tokio::test]
    async fn it_should_compute_the_reward_of_a_mev_block() {
        let block = ExecutionBlock {
            hash: block_hash(),
            base_fee_per_gas: 10,
            gas_used: 2,
            transactions: vec![tx(1, 60, 5)],
        };
        let mut execution_client = execution_client_with_block(block);

        execution_client
            .expect_get_transaction_receipt()
            .with(eq(B256::repeat_byte(1)))
            .times(1)
            .returning(|_| {
                Ok(Some(ExecutionReceipt {
                    effective_gas_price: 50,
                    gas_used: 1,
                }))
            });

        let aggregator = build_aggregator(
            beacon_client_with_block(6_000_000, 5_000_000),
            execution_client,
        );

        let result = aggregator.reward_for_slot("5000000").await.unwrap();

        assert_eq!(
            result,
            RewardResult {
                reward: "0.000000030".to_string(),
                status: RewardStatus::Mev,
            }
        );
    }

    #[tokio::test]
    async fn it_should_fall_back_when_a_single_receipt_fails() {
        let block = ExecutionBlock {
            hash: block_hash(),
            base_fee_per_gas: 10,
            gas_used: 100,
            transactions: vec![tx(1, 20, 10), tx(2, 25, 40)],
        };
        let mut execution_client = execution_client_with_block(block);

        execution_client
            .expect_get_transaction_receipt()
            .with(eq(B256::repeat_byte(1)))
            .returning(|_| {
                Ok(Some(ExecutionReceipt {
                    effective_gas_price: 15,
                    gas_used: 10,
                }))
            });
        execution_client
            .expect_get_transaction_receipt()
            .with(eq(B256::repeat_byte(2)))
            .returning(|_| Err(ClientError::Timeout {
                operation: "eth_getTransactionReceipt".to_string(),
            }));

        let aggregator = build_aggregator(
            beacon_client_with_block(6_000_000, 5_000_000),
            execution_client,
        );

        let result = aggregator.reward_for_slot("5000000").await.unwrap();

        // 15 * 10 + 25 * 40 - 10 * 100
        assert_eq!(result.reward, "0.000000150");
        assert_eq!(result.status, RewardStatus::Vanilla);
    }

    #[tokio::test]
    async fn it_should_fail_when_the_execution_block_is_missing() {
        let mut execution_client = MockCommonExecutionClient::new();

        execution_client
            .expect_get_block()
            .returning(|_| Ok(None));
        execution_client.expect_get_transaction_receipt().never();

        let aggregator = build_aggregator(
            beacon_client_with_block(6_000_000, 5_000_000),
            execution_client,
        );

        assert!(matches!(
            aggregator.reward_for_slot("5000000").await,
            Err(SlotQueryError::Other(_))
        ));
    }

    #[tokio::test]
    async fn it_should_fail_when_the_execution_block_cannot_be_fetched() {
        let mut execution_client = MockCommonExecutionClient::new();

        execution_client.expect_get_block().returning(|_| {
            Err(ClientError::Timeout {
                operation: "eth_getBlockByHash".to_string(),
            })
        });

        let aggregator = build_aggregator(
            beacon_client_with_block(6_000_000, 5_000_000),
            execution_client,
        );

        assert!(matches!(
            aggregator.reward_for_slot("5000000").await,
            Err(SlotQueryError::Client(ClientError::Timeout { .. }))
        ));
    }

    #[tokio::test]
    async fn it_should_propagate_slot_errors_from_the_block_lookup() {
        let mut beacon_client = beacon_client_with_head(6_000_000);

        beacon_client.expect_get_block_hash().returning(|_| {
            Err(ClientError::SlotUnavailable(
                "slot does not exist".to_string(),
            ))
        });

        let aggregator = build_aggregator(beacon_client, MockCommonExecutionClient::new());

        assert!(matches!(
            aggregator.reward_for_slot("5000000").await,
            Err(SlotQueryError::SlotUnavailable(msg)) if msg == "slot does not exist"
        ));
    }

    #[tokio::test]
    async fn it_should_not_fetch_blocks_for_invalid_slots() {
        let aggregator = build_aggregator(
            beacon_client_with_head(6_000_000),
            MockCommonExecutionClient::new(),
        );

        assert!(matches!(
            aggregator.reward_for_slot("1").await,
            Err(SlotQueryError::SlotUnavailable(_))
        ));
        assert!(matches!(
            aggregator.reward_for_slot("6000001").await,
            Err(SlotQueryError::SlotTooFarInFuture(_))
        ));
        assert!(matches!(
            aggregator.reward_for_slot("slot").await,
            Err(SlotQueryError::InvalidSlot(_))
        ));
    }

    #[tokio::test]
    async fn it_should_fetch_every_receipt_once() {
        let transactions: Vec<_> = (1..=8).map(|i| tx(i, 10, 21_000)).collect();
        let block = ExecutionBlock {
            hash: block_hash(),
            base_fee_per_gas: 5,
            gas_used: 8 * 21_000,
            transactions,
        };
        let calls = Arc::new(AtomicUsize::new(0));
        let mut execution_client = execution_client_with_block(block);

        let counter = calls.clone();
        execution_client
            .expect_get_transaction_receipt()
            .returning(move |_| {
                counter.fetch_add(1, Ordering::SeqCst);

                Ok(None)
            });

        let aggregator = build_aggregator(
            beacon_client_with_block(6_000_000, 5_000_000),
            execution_client,
        );

        let result = aggregator.reward_for_slot("5000000").await.unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 8);
        // (10 - 5) * 21000 * 8 wei
        assert_eq!(result.reward, "0.000840000");
        assert_eq!(result.status, RewardStatus::Vanilla);
    }
}
