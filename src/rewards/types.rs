use num_bigint::{BigInt, BigUint, Sign};
use serde::Serialize;

use crate::clients::{
    common::ClientResult,
    execution::types::{ExecutionReceipt, ExecutionTransaction},
};

const WEI_PER_GWEI: u64 = 1_000_000_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RewardStatus {
    Vanilla,
    Mev,
}

/// Reward response: the fee recipient's net reward in Gwei and the block classification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RewardResult {
    pub reward: String,
    pub status: RewardStatus,
}

/// What a single transaction paid, taken from its receipt when one could be fetched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransactionCharge {
    Executed {
        effective_gas_price: BigUint,
        gas_used: BigUint,
    },
    Estimated {
        gas_price: BigUint,
        gas_limit: BigUint,
    },
}

impl TransactionCharge {
    pub fn from_receipt(
        tx: &ExecutionTransaction,
        receipt: &ClientResult<Option<ExecutionReceipt>>,
    ) -> Self {
        match receipt {
            Ok(Some(receipt)) => Self::Executed {
                effective_gas_price: BigUint::from(receipt.effective_gas_price),
                gas_used: BigUint::from(receipt.gas_used),
            },
            _ => Self::Estimated {
                gas_price: BigUint::from(tx.gas_price),
                gas_limit: BigUint::from(tx.gas_limit),
            },
        }
    }

    pub fn price(&self) -> &BigUint {
        match self {
            Self::Executed {
                effective_gas_price,
                ..
            } => effective_gas_price,
            Self::Estimated { gas_price, .. } => gas_price,
        }
    }

    pub fn cost(&self) -> BigUint {
        match self {
            Self::Executed {
                effective_gas_price,
                gas_used,
            } => effective_gas_price * gas_used,
            Self::Estimated {
                gas_price,
                gas_limit,
            } => gas_price * gas_limit,
        }
    }

    pub fn is_estimated(&self) -> bool {
        matches!(self, Self::Estimated { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockReward {
    /// Transaction costs minus burnt fees, in wei. Negative when more was burnt than paid.
    pub reward: BigInt,
    pub status: RewardStatus,
}

impl BlockReward {
    /// Folds transaction charges into a block reward. Only sums and a disjunction are
    /// computed, so the order of `charges` does not matter.
    pub fn aggregate(
        base_fee_per_gas: &BigUint,
        gas_used: &BigUint,
        charges: &[TransactionCharge],
        mev_base_fee_multiplier: u64,
    ) -> Self {
        let total_burnt = base_fee_per_gas * gas_used;
        let mev_threshold = base_fee_per_gas * mev_base_fee_multiplier;

        let total_costs: BigUint = charges.iter().map(TransactionCharge::cost).sum();
        let is_mev = charges.iter().any(|charge| *charge.price() > mev_threshold);

        Self {
            reward: BigInt::from(total_costs) - BigInt::from(total_burnt),
            status: if is_mev {
                RewardStatus::Mev
            } else {
                RewardStatus::Vanilla
            },
        }
    }
}

impl From<BlockReward> for RewardResult {
    fn from(block_reward: BlockReward) -> Self {
        Self {
            reward: format_gwei(&block_reward.reward),
            status: block_reward.status,
        }
    }
}

/// Renders a wei amount in Gwei with exactly nine fractional digits.
pub fn format_gwei(wei: &BigInt) -> String {
    let divisor = BigUint::from(WEI_PER_GWEI);
    let magnitude = wei.magnitude();
    let whole = magnitude / &divisor;
    let fraction = magnitude % &divisor;
    let sign = if wei.sign() == Sign::Minus { "-" } else { "" };

    format!("{sign}{whole}.{fraction:0>9}")
}
