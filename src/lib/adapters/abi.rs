use alloy::{primitives::Log, sol, sol_types::SolEvent};

use crate::{domain::encoding::Calldata, ports::ConfirmationLog};

sol! {
    #[sol(rpc)]
    interface IComplaints {
        function allowedRoots(uint256 root) external view returns (bool);

        function submit(
            uint256[2] calldata pA,
            uint256[2][2] calldata pB,
            uint256[2] calldata pC,
            uint256[4] calldata pubSignals,
            uint256 depth
        ) external;

        event ComplaintSubmitted(
            uint256 indexed root,
            uint256 indexed nullifierHash,
            uint256 indexed topicId,
            bytes32 messageHash
        );
    }
}

impl From<&Calldata> for IComplaints::submitCall {
    fn from(calldata: &Calldata) -> Self {
        Self {
            pA: calldata.a,
            pB: calldata.b,
            pC: calldata.c,
            pubSignals: calldata.signals,
            depth: calldata.depth,
        }
    }
}

/// Decode a raw log as `ComplaintSubmitted`. Logs with any other signature
/// yield `None`.
pub fn decode_confirmation(log: &Log) -> Option<ConfirmationLog> {
    let decoded = IComplaints::ComplaintSubmitted::decode_log(log).ok()?;
    Some(ConfirmationLog {
        address: decoded.address,
        root: decoded.data.root,
        nullifier_hash: decoded.data.nullifierHash,
        topic_id: decoded.data.topicId,
        message_hash: decoded.data.messageHash,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::{Address, B256, U256};
    use alloy::sol_types::SolCall;

    use crate::crypto::field::field_hash_bytes;
    use crate::domain::encoding::candidates;
    use crate::domain::proof::Proof;

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
    fn test_every_candidate_decodes_to_root_and_nullifier() {
        let proof = sample_proof();

        for candidate in candidates() {
            let call = IComplaints::submitCall::from(&candidate.encode(&proof));
            let encoded = call.abi_encode();
            let decoded = IComplaints::submitCall::abi_decode(&encoded).unwrap();

            assert_eq!(decoded.pubSignals[0], proof.merkle_root, "{candidate}");
            assert_eq!(decoded.pubSignals[1], proof.nullifier, "{candidate}");
            assert_eq!(decoded.depth, U256::from(4), "{candidate}");
        }
    }

    #[test]
    fn test_submit_selector_matches_signature() {
        assert_eq!(
            IComplaints::submitCall::SIGNATURE,
            "submit(uint256[2],uint256[2][2],uint256[2],uint256[4],uint256)"
        );
    }

    #[test]
    fn test_decode_confirmation_log() {
        let contract = Address::repeat_byte(0x11);
        let event = IComplaints::ComplaintSubmitted {
            root: U256::from(42),
            nullifierHash: U256::from(99),
            topicId: U256::from(11),
            messageHash: field_hash_bytes(U256::from(7)),
        };
        let log = Log {
            address: contract,
            data: event.encode_log_data(),
        };

        let decoded = decode_confirmation(&log).unwrap();
        assert_eq!(decoded.address, contract);
        assert_eq!(decoded.root, U256::from(42));
        assert_eq!(decoded.nullifier_hash, U256::from(99));
        assert_eq!(decoded.topic_id, U256::from(11));
        assert_eq!(decoded.message_hash, field_hash_bytes(U256::from(7)));
    }

    #[test]
    fn test_decode_ignores_unrelated_log() {
        let log = Log::new_unchecked(
            Address::repeat_byte(0x11),
            vec![B256::repeat_byte(0xab)],
            Default::default(),
        );
        assert!(decode_confirmation(&log).is_none());
    }
}
