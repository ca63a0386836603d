use alloy::{
    consensus::Transaction as ConsensusTx,
    network::TransactionResponse,
    primitives::B256,
    rpc::types::{Block as RpcBlock, Transaction as RpcTransaction, TransactionReceipt},
};
use anyhow::anyhow;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionTransaction {
    pub hash: B256,
    /// Pre-execution price per gas: the fee cap, or the gas price of legacy transactions.
    pub gas_price: u128,
    pub gas_limit: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionBlock {
    pub hash: B256,
    pub base_fee_per_gas: u64,
    pub gas_used: u64,
    pub transactions: Vec<ExecutionTransaction>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionReceipt {
    pub effective_gas_price: u128,
    pub gas_used: u64,
}

impl From<&RpcTransaction> for ExecutionTransaction {
    fn from(tx: &RpcTransaction) -> Self {
        Self {
            hash: TransactionResponse::tx_hash(tx),
            gas_price: ConsensusTx::max_fee_per_gas(tx),
            gas_limit: ConsensusTx::gas_limit(tx),
        }
    }
}

impl TryFrom<&RpcBlock> for ExecutionBlock {
    type Error = anyhow::Error;

    fn try_from(block: &RpcBlock) -> Result<Self, Self::Error> {
        let transactions = match block.transactions.as_transactions() {
            Some(txs) => txs.iter().map(ExecutionTransaction::from).collect(),
            None if block.transactions.is_empty() => vec![],
            None => {
                return Err(anyhow!(
                    "Execution block {} was returned without full transactions",
                    block.header.hash
                ))
            }
        };

        Ok(Self {
            hash: block.header.hash,
            base_fee_per_gas: block.header.base_fee_per_gas.unwrap_or_default(),
            gas_used: block.header.gas_used,
            transactions,
        })
    }
}

impl From<&TransactionReceipt> for ExecutionReceipt {
    fn from(receipt: &TransactionReceipt) -> Self {
        Self {
            effective_gas_price: receipt.effective_gas_price,
            gas_used: receipt.gas_used,
        }
    }
}
