use tokio::sync::Mutex;

use crate::domain::proof::Proof;
use crate::ports::prover::{ProofRequest, ProverError, ProverPort};

/// Prover that hands out a fixed proof and a fixed verification verdict.
pub struct StaticProver {
    proof: Option<Proof>,
    valid: bool,
    requests: Mutex<Vec<ProofRequest>>,
    verifications: Mutex<usize>,
}

impl StaticProver {
    /// Verifies every proof as valid; generation returns `proof`.
    pub fn new(proof: Proof) -> Self {
        Self {
            proof: Some(proof),
            valid: true,
            requests: Mutex::new(Vec::new()),
            verifications: Mutex::new(0),
        }
    }

    /// Verification only; generation fails.
    pub fn verifying(valid: bool) -> Self {
        Self {
            proof: None,
            valid,
            requests: Mutex::new(Vec::new()),
            verifications: Mutex::new(0),
        }
    }

    pub async fn requests(&self) -> Vec<ProofRequest> {
        self.requests.lock().await.clone()
    }

    pub async fn verification_count(&self) -> usize {
        *self.verifications.lock().await
    }
}

impl ProverPort for StaticProver {
    async fn generate_proof(&self, request: &ProofRequest) -> Result<Proof, ProverError> {
        self.requests.lock().await.push(request.clone());
        self.proof
            .clone()
            .ok_or_else(|| ProverError::ProofFailed("no proof configured".into()))
    }

    async fn verify_proof(&self, _proof: &Proof) -> Result<bool, ProverError> {
        *self.verifications.lock().await += 1;
        Ok(self.valid)
    }
}
