pub mod events;
pub mod prover;
pub mod verifier;

use alloy::primitives::{Address, B256, U256};

/// Minimal transaction receipt for a committed submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxReceipt {
    pub tx_hash: B256,
    pub block_number: Option<u64>,
    pub success: bool,
}

/// A decoded `ComplaintSubmitted` log, tagged with the emitting contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfirmationLog {
    /// Address of the contract that emitted the log.
    pub address: Address,
    pub root: U256,
    pub nullifier_hash: U256,
    pub topic_id: U256,
    /// Digest the contract reports for the message.
    pub message_hash: B256,
}
