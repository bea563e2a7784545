use alloy::primitives::B256;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::encoding::EncodingCandidate;
use super::proof::Proof;
use crate::crypto::field::field_hash_bytes;

/// Outcome of one dry run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrialResult {
    pub candidate: EncodingCandidate,
    pub accepted: bool,
    /// Revert message (or transport failure) when `accepted` is false.
    pub revert_reason: Option<String>,
}

impl TrialResult {
    pub fn accepted(candidate: EncodingCandidate) -> Self {
        Self {
            candidate,
            accepted: true,
            revert_reason: None,
        }
    }

    pub fn rejected(candidate: EncodingCandidate, reason: impl Into<String>) -> Self {
        Self {
            candidate,
            accepted: false,
            revert_reason: Some(reason.into()),
        }
    }
}

/// Human-readable labels attached to a submission. Neither value reaches
/// the contract; the proof already commits to both.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubmissionContext {
    pub topic: String,
    pub message: String,
}

impl SubmissionContext {
    pub fn new(topic: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            topic: topic.into(),
            message: message.into(),
        }
    }
}

/// Result of comparing the emitted event against the local digest.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Confirmation {
    pub onchain_message_hash: Option<B256>,
    /// `None` when no event could be read; never an error.
    pub verified: Option<bool>,
}

impl Confirmation {
    pub const UNKNOWN: Confirmation = Confirmation {
        onchain_message_hash: None,
        verified: None,
    };
}

/// A committed submission, as shown in the session ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionRecord {
    pub timestamp: DateTime<Utc>,
    pub tx_hash: B256,
    pub block_number: Option<u64>,
    pub encoding: EncodingCandidate,
    pub topic: String,
    pub message: String,

    // Public signals as decimal text.
    pub root: String,
    pub nullifier: String,
    pub message_raw: String,
    pub scope_raw: String,

    /// `field_hash(message)`, always computed regardless of the winning encoding.
    pub message_hash: B256,
    /// `field_hash(scope)`, the contract's `topicId`.
    pub scope_hash: B256,

    pub onchain_message_hash: Option<B256>,
    pub verified: Option<bool>,
}

impl SubmissionRecord {
    pub fn new(
        proof: &Proof,
        encoding: EncodingCandidate,
        tx_hash: B256,
        block_number: Option<u64>,
        context: &SubmissionContext,
    ) -> Self {
        Self {
            timestamp: Utc::now(),
            tx_hash,
            block_number,
            encoding,
            topic: context.topic.clone(),
            message: context.message.clone(),
            root: proof.merkle_root.to_string(),
            nullifier: proof.nullifier.to_string(),
            message_raw: proof.message.to_string(),
            scope_raw: proof.scope.to_string(),
            message_hash: field_hash_bytes(proof.message),
            scope_hash: field_hash_bytes(proof.scope),
            onchain_message_hash: None,
            verified: None,
        }
    }

    /// Fill in the cross-check result. The only mutation a record receives.
    pub fn attach_confirmation(&mut self, confirmation: Confirmation) {
        self.onchain_message_hash = confirmation.onchain_message_hash;
        self.verified = confirmation.verified;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::U256;

    fn sample_proof() -> Proof {
        Proof::new(
            4,
            U256::from(42),
            U256::from(99),
            U256::from(7),
            U256::from(11),
            core::array::from_fn(|i| U256::from(i + 1)),
        )
        .unwrap()
    }

    #[test]
    fn test_record_carries_decimal_and_hashed_signals() {
        let proof = sample_proof();
        let record = SubmissionRecord::new(
            &proof,
            EncodingCandidate::ALL[0],
            B256::repeat_byte(0xAB),
            Some(12),
            &SubmissionContext::new("complaints-v1", "Pizza was cold"),
        );

        assert_eq!(record.root, "42");
        assert_eq!(record.nullifier, "99");
        assert_eq!(record.message_raw, "7");
        assert_eq!(record.scope_raw, "11");
        assert_eq!(record.message_hash, field_hash_bytes(U256::from(7)));
        assert_eq!(record.scope_hash, field_hash_bytes(U256::from(11)));
        assert_eq!(record.verified, None);
    }

    #[test]
    fn test_hashes_independent_of_winning_transform() {
        let proof = sample_proof();
        let context = SubmissionContext::default();
        let identity = SubmissionRecord::new(&proof, EncodingCandidate::ALL[0], B256::ZERO, None, &context);
        let hashed = SubmissionRecord::new(&proof, EncodingCandidate::ALL[4], B256::ZERO, None, &context);
        assert_eq!(identity.message_hash, hashed.message_hash);
        assert_eq!(identity.scope_hash, hashed.scope_hash);
    }

    #[test]
    fn test_attach_confirmation() {
        let mut record = SubmissionRecord::new(
            &sample_proof(),
            EncodingCandidate::ALL[0],
            B256::ZERO,
            None,
            &SubmissionContext::default(),
        );
        let expected = record.message_hash;
        record.attach_confirmation(Confirmation {
            onchain_message_hash: Some(expected),
            verified: Some(true),
        });
        assert_eq!(record.onchain_message_hash, Some(expected));
        assert_eq!(record.verified, Some(true));
    }

    #[test]
    fn test_record_serializes_hashes_as_hex() {
        let record = SubmissionRecord::new(
            &sample_proof(),
            EncodingCandidate::ALL[0],
            B256::ZERO,
            None,
            &SubmissionContext::default(),
        );
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(
            json["message_hash"],
            "0x00a66cc928b5edb82af9bd49922954155ab7b0942694bea4ce44661d9a8736c6"
        );
        assert_eq!(json["encoding"]["point_ordering"], "standard");
    }
}
