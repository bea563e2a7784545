use std::collections::{HashMap, HashSet};

use alloy::primitives::{keccak256, Address, B256, U256};
use alloy::sol_types::SolCall;
use tokio::sync::Mutex;

use super::abi::IComplaints;
use crate::crypto::field::{field_hash, field_hash_bytes};
use crate::domain::encoding::{Calldata, EncodingCandidate};
use crate::domain::proof::Proof;
use crate::ports::events::EventLogPort;
use crate::ports::verifier::{VerifierError, VerifierPort};
use crate::ports::{ConfirmationLog, TxReceipt};

/// Revert message for calldata the mock was not told to accept.
pub const MOCK_REVERT_REASON: &str = "InvalidProof()";

/// What the mock emits after a successful commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmitMode {
    /// `ComplaintSubmitted` carrying the registered message digest.
    Digest,
    /// `ComplaintSubmitted` carrying a fixed digest.
    Override(B256),
    /// `ComplaintSubmitted` from another contract address.
    Foreign,
    /// No event at all.
    Silent,
}

#[derive(Debug, Clone)]
struct Accepted {
    calldata: Calldata,
    message_hash: B256,
    topic_id: U256,
}

/// In-process stand-in for the verifier contract and its event logs.
///
/// Accepts only calldata registered through [`MockVerifier::accept`];
/// everything else reverts with [`MOCK_REVERT_REASON`].
pub struct MockVerifier {
    address: Address,
    allowed_roots: Mutex<HashSet<U256>>,
    accepted: Mutex<Vec<Accepted>>,
    transport_failures: Mutex<usize>,
    commit_revert: Mutex<Option<String>>,
    failed_receipts: Mutex<bool>,
    emit_mode: Mutex<EmitMode>,
    fail_log_reads: Mutex<bool>,
    logs: Mutex<HashMap<B256, Vec<ConfirmationLog>>>,
    dry_runs: Mutex<Vec<Calldata>>,
    commits: Mutex<Vec<Calldata>>,
    root_queries: Mutex<usize>,
}

impl MockVerifier {
    pub fn new(address: Address) -> Self {
        Self {
            address,
            allowed_roots: Mutex::new(HashSet::new()),
            accepted: Mutex::new(Vec::new()),
            transport_failures: Mutex::new(0),
            commit_revert: Mutex::new(None),
            failed_receipts: Mutex::new(false),
            emit_mode: Mutex::new(EmitMode::Digest),
            fail_log_reads: Mutex::new(false),
            logs: Mutex::new(HashMap::new()),
            dry_runs: Mutex::new(Vec::new()),
            commits: Mutex::new(Vec::new()),
            root_queries: Mutex::new(0),
        }
    }

    /// Simulates the admin allow step.
    pub async fn allow_root(&self, root: U256) {
        self.allowed_roots.lock().await.insert(root);
    }

    /// Accept `proof` laid out as `candidate`. A commit then emits
    /// `field_hash(message)` and `field_hash(scope)` as the contract would.
    pub async fn accept(&self, proof: &Proof, candidate: EncodingCandidate) {
        self.accepted.lock().await.push(Accepted {
            calldata: candidate.encode(proof),
            message_hash: field_hash_bytes(proof.message),
            topic_id: field_hash(proof.scope),
        });
    }

    /// The next `count` dry runs fail at the transport level.
    pub async fn fail_next_dry_runs(&self, count: usize) {
        *self.transport_failures.lock().await = count;
    }

    /// Commits revert on-chain with `reason` even if the dry run passed.
    pub async fn revert_commits(&self, reason: impl Into<String>) {
        *self.commit_revert.lock().await = Some(reason.into());
    }

    /// Commits are mined but report a failed status instead of an error.
    pub async fn fail_receipts(&self) {
        *self.failed_receipts.lock().await = true;
    }

    pub async fn set_emit_mode(&self, mode: EmitMode) {
        *self.emit_mode.lock().await = mode;
    }

    pub async fn fail_log_reads(&self) {
        *self.fail_log_reads.lock().await = true;
    }

    pub async fn dry_run_count(&self) -> usize {
        self.dry_runs.lock().await.len()
    }

    pub async fn commit_count(&self) -> usize {
        self.commits.lock().await.len()
    }

    pub async fn root_query_count(&self) -> usize {
        *self.root_queries.lock().await
    }

    /// Calldata of every committed transaction, in order.
    pub async fn committed(&self) -> Vec<Calldata> {
        self.commits.lock().await.clone()
    }

    async fn find_accepted(&self, calldata: &Calldata) -> Option<Accepted> {
        self.accepted
            .lock()
            .await
            .iter()
            .find(|accepted| accepted.calldata == *calldata)
            .cloned()
    }

    /// Deterministic per commit: hash of the encoded call and its sequence number.
    fn tx_hash(calldata: &Calldata, sequence: usize) -> B256 {
        let mut preimage = IComplaints::submitCall::from(calldata).abi_encode();
        preimage.extend_from_slice(&(sequence as u64).to_be_bytes());
        keccak256(preimage)
    }
}

impl Default for MockVerifier {
    fn default() -> Self {
        Self::new(Address::repeat_byte(0xc0))
    }
}

impl VerifierPort for MockVerifier {
    fn contract_address(&self) -> Address {
        self.address
    }

    async fn is_root_allowed(&self, root: U256) -> Result<bool, VerifierError> {
        *self.root_queries.lock().await += 1;
        Ok(self.allowed_roots.lock().await.contains(&root))
    }

    async fn submit_dry_run(&self, calldata: &Calldata) -> Result<(), VerifierError> {
        self.dry_runs.lock().await.push(calldata.clone());

        {
            let mut failures = self.transport_failures.lock().await;
            if *failures > 0 {
                *failures -= 1;
                return Err(VerifierError::Rpc("connection reset by peer".into()));
            }
        }

        match self.find_accepted(calldata).await {
            Some(_) => Ok(()),
            None => Err(VerifierError::Reverted(MOCK_REVERT_REASON.into())),
        }
    }

    async fn submit_commit(&self, calldata: &Calldata) -> Result<TxReceipt, VerifierError> {
        let sequence = {
            let mut commits = self.commits.lock().await;
            commits.push(calldata.clone());
            commits.len()
        };
        let tx_hash = Self::tx_hash(calldata, sequence);

        if let Some(reason) = self.commit_revert.lock().await.clone() {
            return Err(VerifierError::TransactionFailed {
                tx_hash: Some(tx_hash),
                reason,
            });
        }

        if *self.failed_receipts.lock().await {
            return Ok(TxReceipt {
                tx_hash,
                block_number: Some(sequence as u64),
                success: false,
            });
        }

        let Some(accepted) = self.find_accepted(calldata).await else {
            return Err(VerifierError::TransactionFailed {
                tx_hash: Some(tx_hash),
                reason: MOCK_REVERT_REASON.into(),
            });
        };

        let digest = accepted.message_hash;
        let (address, message_hash) = match *self.emit_mode.lock().await {
            EmitMode::Digest => (Some(self.address), digest),
            EmitMode::Override(hash) => (Some(self.address), hash),
            EmitMode::Foreign => (Some(Address::repeat_byte(0xee)), digest),
            EmitMode::Silent => (None, digest),
        };

        let logs = address
            .map(|address| ConfirmationLog {
                address,
                root: calldata.root(),
                nullifier_hash: calldata.nullifier(),
                topic_id: accepted.topic_id,
                message_hash,
            })
            .into_iter()
            .collect();
        self.logs.lock().await.insert(tx_hash, logs);

        Ok(TxReceipt {
            tx_hash,
            block_number: Some(sequence as u64),
            success: true,
        })
    }
}

impl EventLogPort for MockVerifier {
    async fn read_confirmation_logs(
        &self,
        tx_hash: B256,
    ) -> Result<Option<Vec<ConfirmationLog>>, VerifierError> {
        if *self.fail_log_reads.lock().await {
            return Err(VerifierError::Rpc("log query timed out".into()));
        }
        Ok(self.logs.lock().await.get(&tx_hash).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

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

    #[tokio::test]
    async fn test_rejects_unregistered_calldata() {
        let mock = MockVerifier::default();
        let calldata = EncodingCandidate::ALL[0].encode(&sample_proof());

        let err = mock.submit_dry_run(&calldata).await.unwrap_err();
        assert_eq!(err, VerifierError::Reverted(MOCK_REVERT_REASON.into()));
        assert_eq!(mock.dry_run_count().await, 1);
    }

    #[tokio::test]
    async fn test_commit_emits_registered_digest() {
        let mock = MockVerifier::default();
        let proof = sample_proof();
        let candidate = EncodingCandidate::ALL[2];
        mock.accept(&proof, candidate).await;

        let receipt = mock.submit_commit(&candidate.encode(&proof)).await.unwrap();
        let logs = mock.read_confirmation_logs(receipt.tx_hash).await.unwrap().unwrap();

        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].address, mock.contract_address());
        assert_eq!(logs[0].message_hash, field_hash_bytes(U256::from(7)));
    }

    #[tokio::test]
    async fn test_transport_failures_are_consumed() {
        let mock = MockVerifier::default();
        let proof = sample_proof();
        let candidate = EncodingCandidate::ALL[0];
        mock.accept(&proof, candidate).await;
        mock.fail_next_dry_runs(1).await;

        let calldata = candidate.encode(&proof);
        assert!(matches!(
            mock.submit_dry_run(&calldata).await,
            Err(VerifierError::Rpc(_))
        ));
        assert!(mock.submit_dry_run(&calldata).await.is_ok());
    }

    #[tokio::test]
    async fn test_unknown_tx_has_no_receipt() {
        let mock = MockVerifier::default();
        let logs = mock.read_confirmation_logs(B256::repeat_byte(1)).await.unwrap();
        assert!(logs.is_none());
    }
}
