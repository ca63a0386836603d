use tracing::debug;

use crate::{
    context::Context,
    slots::{SlotQueryError, SlotValidator},
};

/// Resolves the public keys of the sync committee members for a slot.
#[derive(Debug, Clone)]
pub struct SyncDutiesResolver {
    context: Context,
    slot_validator: SlotValidator,
}

impl SyncDutiesResolver {
    pub fn new(context: Context) -> Self {
        Self {
            slot_validator: SlotValidator::new(context.clone()),
            context,
        }
    }

    /// Public keys are returned in the order the beacon node lists the validators.
    pub async fn duties_for_slot(&self, slot_text: &str) -> Result<Vec<String>, SlotQueryError> {
        let slot = self.slot_validator.validate(slot_text).await?;
        let beacon_client = self.context.beacon_client();

        let validator_indices = beacon_client.get_sync_committee_indices(&slot).await?;

        // An empty id filter would select every validator in the state.
        if validator_indices.is_empty() {
            debug!(%slot, "Sync committee is empty");

            return Ok(vec![]);
        }

        let pubkeys = beacon_client
            .get_validator_pubkeys(&slot, &validator_indices)
            .await?;

        debug!(%slot, members = pubkeys.len(), "Sync committee resolved");

        Ok(pubkeys)
    }
}
