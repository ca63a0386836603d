use alloy::primitives::B256;
use serde::Deserialize;

#[derive(Deserialize, Debug)]
pub struct Eth1Data {
    pub block_hash: B256,
}

#[derive(Deserialize, Debug)]
pub struct BlockBody {
    pub eth1_data: Eth1Data,
}

#[derive(Deserialize, Debug)]
pub struct BlockMessage {
    pub body: BlockBody,
}

#[derive(Deserialize, Debug)]
pub struct Block {
    pub message: BlockMessage,
}

#[derive(Deserialize, Debug)]
pub struct BlockResponse {
    pub data: Block,
}

#[derive(Deserialize, Debug)]
pub struct BlockHeaderMessage {
    pub slot: String,
}

#[derive(Deserialize, Debug)]
pub struct InnerBlockHeader {
    pub message: BlockHeaderMessage,
}

#[derive(Deserialize, Debug)]
pub struct BlockHeader {
    pub header: InnerBlockHeader,
}

#[derive(Deserialize, Debug)]
pub struct BlockHeadersResponse {
    pub data: Vec<BlockHeader>,
}

#[derive(Deserialize, Debug)]
pub struct SyncCommittee {
    pub validators: Vec<String>,
}

#[derive(Deserialize, Debug)]
pub struct SyncCommitteeResponse {
    pub data: SyncCommittee,
}

#[derive(Deserialize, Debug)]
pub struct Validator {
    pub pubkey: String,
}

#[derive(Deserialize, Debug)]
pub struct ValidatorEntry {
    pub validator: Validator,
}

#[derive(Deserialize, Debug)]
pub struct ValidatorsResponse {
    pub data: Vec<ValidatorEntry>,
}
