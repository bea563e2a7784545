use std::fmt::Write as _;

use alloy::primitives::{Address, B256, U256};
use tracing::{debug, info, warn};

use crate::domain::encoding::{candidates, EncodingCandidate};
use crate::domain::ledger::SubmissionLedger;
use crate::domain::proof::Proof;
use crate::domain::submission::{Confirmation, SubmissionContext, SubmissionRecord, TrialResult};
use crate::ports::events::EventLogPort;
use crate::ports::prover::{ProofRequest, ProverError, ProverPort};
use crate::ports::verifier::{VerifierError, VerifierPort};
use crate::ports::ConfirmationLog;

/// Reason recorded when the node rejects a call without a message.
const GENERIC_REVERT: &str = "execution reverted";

#[derive(Debug, thiserror::Error)]
pub enum ResolutionError {
    #[error("proof failed local verification")]
    InvalidProof,

    #[error("root {root} is not on the verifier's allow-list; run the admin allow-root step for it first")]
    RootNotAllowed { root: U256 },

    #[error("verifier accepted none of the {} candidate encodings", .trials.len())]
    EncodingExhausted { trials: Vec<TrialResult> },

    #[error("network error: {0}")]
    Network(String),

    #[error("submission failed: {reason}")]
    SubmissionFailed {
        tx_hash: Option<B256>,
        reason: String,
    },

    #[error("prover error: {0}")]
    Prover(#[from] ProverError),
}

impl ResolutionError {
    fn from_commit(err: VerifierError) -> Self {
        match err {
            VerifierError::Rpc(reason) => ResolutionError::Network(reason),
            VerifierError::TransactionFailed { tx_hash, reason } => {
                ResolutionError::SubmissionFailed { tx_hash, reason }
            }
            VerifierError::Reverted(reason) | VerifierError::Signer(reason) => {
                ResolutionError::SubmissionFailed {
                    tx_hash: None,
                    reason,
                }
            }
        }
    }
}

/// Progress of one resolution attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionState {
    NotStarted,
    /// Dry-running the candidate at this position in priority order.
    TryingCandidate(usize),
    Resolved(EncodingCandidate),
    Exhausted,
}

/// The winning encoding and every trial that led to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved {
    pub candidate: EncodingCandidate,
    pub trials: Vec<TrialResult>,
}

/// Drives one proof through resolution, commit and confirmation.
///
/// Generic over the prover (local verification and proof generation), the
/// verifier contract and the event log reader. Every step runs sequentially;
/// candidates are never tried in parallel.
pub struct SubmissionResolver<P: ProverPort, V: VerifierPort, E: EventLogPort> {
    prover: P,
    verifier: V,
    events: E,
}

impl<P: ProverPort, V: VerifierPort, E: EventLogPort> SubmissionResolver<P, V, E> {
    pub fn new(prover: P, verifier: V, events: E) -> Self {
        Self {
            prover,
            verifier,
            events,
        }
    }

    /// Whether `root` is currently allowed by the verifier. Read-only.
    pub async fn root_status(&self, root: U256) -> Result<bool, ResolutionError> {
        self.verifier
            .is_root_allowed(root)
            .await
            .map_err(|e| ResolutionError::Network(e.to_string()))
    }

    /// Find the first candidate encoding the verifier accepts.
    ///
    /// Checks the proof locally and the root against the allow-list before
    /// any dry run. Never sends a mutating call.
    pub async fn resolve(&self, proof: &Proof) -> Result<Resolved, ResolutionError> {
        debug!(state = ?ResolutionState::NotStarted, "resolution started");

        if !self.prover.verify_proof(proof).await? {
            warn!("proof rejected by local verification, verifier not contacted");
            return Err(ResolutionError::InvalidProof);
        }

        let root = proof.merkle_root;
        if !self.root_status(root).await? {
            warn!("root {root} is not allowed on-chain");
            return Err(ResolutionError::RootNotAllowed { root });
        }

        select_candidate(&self.verifier, proof).await
    }

    /// Resolve, commit once, cross-check, and append to `ledger`.
    ///
    /// The ledger only changes when the commit succeeded.
    pub async fn submit(
        &self,
        proof: &Proof,
        context: &SubmissionContext,
        ledger: &mut SubmissionLedger,
    ) -> Result<SubmissionRecord, ResolutionError> {
        let resolved = self.resolve(proof).await?;
        let mut record = commit(&self.verifier, proof, resolved.candidate, context).await?;
        self.confirm(&mut record).await;

        ledger.append(record.clone());
        Ok(record)
    }

    /// Generate a proof through the prover, then [`submit`](Self::submit) it.
    pub async fn prove_and_submit(
        &self,
        request: &ProofRequest,
        context: &SubmissionContext,
        ledger: &mut SubmissionLedger,
    ) -> Result<SubmissionRecord, ResolutionError> {
        let proof = self.prover.generate_proof(request).await?;
        info!(root = %proof.merkle_root, depth = proof.tree_depth, "proof generated");
        self.submit(&proof, context, ledger).await
    }

    /// Compare the emitted event digest with the record's local digest.
    ///
    /// Unreadable or missing events leave the result unknown; this never fails.
    pub async fn confirm(&self, record: &mut SubmissionRecord) {
        let confirmation = match self.events.read_confirmation_logs(record.tx_hash).await {
            Ok(Some(logs)) => cross_check(
                self.verifier.contract_address(),
                record.message_hash,
                &logs,
            ),
            Ok(None) => {
                warn!("no receipt found for {}, confirmation unknown", record.tx_hash);
                Confirmation::UNKNOWN
            }
            Err(e) => {
                warn!("failed to read logs for {}: {e}", record.tx_hash);
                Confirmation::UNKNOWN
            }
        };

        match confirmation.verified {
            Some(true) => info!("on-chain message hash matches"),
            Some(false) => warn!(
                "on-chain message hash {:?} differs from local {}",
                confirmation.onchain_message_hash, record.message_hash
            ),
            None => debug!("no confirmation event for {}", record.tx_hash),
        }

        record.attach_confirmation(confirmation);
    }
}

/// Dry-run `proof` laid out as `candidate`. Has no visible side effect.
///
/// Transport failures count as a rejection of this candidate only.
pub async fn try_candidate<V: VerifierPort>(
    verifier: &V,
    proof: &Proof,
    candidate: EncodingCandidate,
) -> TrialResult {
    let calldata = candidate.encode(proof);
    match verifier.submit_dry_run(&calldata).await {
        Ok(()) => TrialResult::accepted(candidate),
        Err(VerifierError::Reverted(reason)) if reason.trim().is_empty() => {
            TrialResult::rejected(candidate, GENERIC_REVERT)
        }
        Err(VerifierError::Reverted(reason)) => TrialResult::rejected(candidate, reason),
        Err(e) => TrialResult::rejected(candidate, e.to_string()),
    }
}

/// Try every candidate in priority order and stop at the first accepted one.
pub async fn select_candidate<V: VerifierPort>(
    verifier: &V,
    proof: &Proof,
) -> Result<Resolved, ResolutionError> {
    let mut trials = Vec::with_capacity(EncodingCandidate::ALL.len());

    for (index, candidate) in candidates().enumerate() {
        debug!(state = ?ResolutionState::TryingCandidate(index), %candidate, "dry run");

        let trial = try_candidate(verifier, proof, candidate).await;
        let accepted = trial.accepted;
        if let Some(reason) = &trial.revert_reason {
            debug!("{candidate} rejected: {reason}");
        }
        trials.push(trial);

        if accepted {
            debug!(state = ?ResolutionState::Resolved(candidate), "resolution finished");
            info!("verifier accepts encoding {candidate}");
            return Ok(Resolved { candidate, trials });
        }
    }

    debug!(state = ?ResolutionState::Exhausted, "resolution finished");
    Err(ResolutionError::EncodingExhausted { trials })
}

/// Send the single state-changing `submit` for `candidate` and build the record.
pub async fn commit<V: VerifierPort>(
    verifier: &V,
    proof: &Proof,
    candidate: EncodingCandidate,
    context: &SubmissionContext,
) -> Result<SubmissionRecord, ResolutionError> {
    let calldata = candidate.encode(proof);
    let receipt = verifier
        .submit_commit(&calldata)
        .await
        .map_err(ResolutionError::from_commit)?;

    if !receipt.success {
        return Err(ResolutionError::SubmissionFailed {
            tx_hash: Some(receipt.tx_hash),
            reason: "transaction reverted".into(),
        });
    }

    info!(tx_hash = %receipt.tx_hash, encoding = %candidate, "submission committed");
    Ok(SubmissionRecord::new(
        proof,
        candidate,
        receipt.tx_hash,
        receipt.block_number,
        context,
    ))
}

/// Judge the first `ComplaintSubmitted` log emitted by `contract`.
pub fn cross_check(contract: Address, expected: B256, logs: &[ConfirmationLog]) -> Confirmation {
    match logs.iter().find(|log| log.address == contract) {
        Some(log) => Confirmation {
            onchain_message_hash: Some(log.message_hash),
            verified: Some(log.message_hash == expected),
        },
        None => Confirmation::UNKNOWN,
    }
}

/// One line per tried candidate with its outcome.
pub fn trial_report(trials: &[TrialResult]) -> String {
    let mut report = String::new();
    for (index, trial) in trials.iter().enumerate() {
        let outcome = match (&trial.revert_reason, trial.accepted) {
            (_, true) => "accepted",
            (Some(reason), false) => reason.as_str(),
            (None, false) => GENERIC_REVERT,
        };
        let _ = writeln!(report, "{}. {:<28} {}", index + 1, trial.candidate.label(), outcome);
    }
    report
}
