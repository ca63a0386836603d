use tracing::{debug, warn};

use crate::context::Context;

pub use self::{
    error::SlotQueryError,
    types::{ParseSlotError, Slot},
};

pub mod error;
mod types;

pub const SLOT_MISSING_MESSAGE: &str = "slot is missing";
pub const SLOT_IN_FUTURE_MESSAGE: &str = "slot is in the future";

/// Checks that a requested slot lies after the proof-of-stake transition and no further than
/// the chain head.
#[derive(Debug, Clone)]
pub struct SlotValidator {
    context: Context,
}

impl SlotValidator {
    pub fn new(context: Context) -> Self {
        Self { context }
    }

    pub async fn validate(&self, slot_text: &str) -> Result<Slot, SlotQueryError> {
        let slot = slot_text.parse::<Slot>()?;

        if slot <= self.context.chain_settings().pos_transition_slot {
            debug!(%slot, "Slot predates the proof-of-stake transition");

            return Err(SlotQueryError::SlotUnavailable(
                SLOT_MISSING_MESSAGE.to_string(),
            ));
        }

        let head_slot = self.current_head_slot().await;

        if slot > head_slot {
            debug!(%slot, %head_slot, "Slot is ahead of the chain head");

            return Err(SlotQueryError::SlotTooFarInFuture(
                SLOT_IN_FUTURE_MESSAGE.to_string(),
            ));
        }

        Ok(slot)
    }

    /// Head slot reported by the beacon node, or zero when it can't be fetched so that no
    /// slot is accepted without a known head.
    async fn current_head_slot(&self) -> Slot {
        match self.context.beacon_client().get_head_slot().await {
            Ok(slot) => slot,
            Err(error) => {
                warn!(?error, "Failed to fetch head slot, assuming slot 0");

                Slot::zero()
            }
        }
    }
}
