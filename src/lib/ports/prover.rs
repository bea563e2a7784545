use alloy::primitives::U256;
use serde::Serialize;
use std::future::Future;

use crate::domain::proof::{Proof, ProofError};

/// Everything the proving library needs to produce a membership proof.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProofRequest {
    /// Secret seed the identity is derived from.
    pub identity_seed: String,
    /// Identity commitments of the group, in insertion order.
    #[serde(serialize_with = "serialize_decimal_vec")]
    pub group_members: Vec<U256>,
    /// Message text; the library hashes it into the `signalHash`.
    pub message: String,
    #[serde(serialize_with = "serialize_decimal")]
    pub scope: U256,
    pub tree_depth: u32,
}

fn serialize_decimal<S: serde::Serializer>(value: &U256, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(&value.to_string())
}

fn serialize_decimal_vec<S: serde::Serializer>(values: &[U256], s: S) -> Result<S::Ok, S::Error> {
    s.collect_seq(values.iter().map(|v| v.to_string()))
}

/// Port for the external proving/group library.
///
/// Implementations:
/// - `SemaphoreCliProver` (shells out to the Node proving scripts)
/// - `StaticProver` for testing and the demo
pub trait ProverPort: Send + Sync {
    fn generate_proof(
        &self,
        request: &ProofRequest,
    ) -> impl Future<Output = Result<Proof, ProverError>> + Send;

    /// Fully local validity check; never touches the chain.
    fn verify_proof(
        &self,
        proof: &Proof,
    ) -> impl Future<Output = Result<bool, ProverError>> + Send;
}

#[derive(Debug, thiserror::Error)]
pub enum ProverError {
    #[error("proof generation failed: {0}")]
    ProofFailed(String),

    #[error("proof verification failed to run: {0}")]
    VerificationFailed(String),

    #[error("prover binary not found: {0}")]
    BinaryNotFound(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("invalid proof artifact: {0}")]
    InvalidArtifact(#[from] ProofError),
}

impl<T: ProverPort> ProverPort for std::sync::Arc<T> {
    fn generate_proof(
        &self,
        request: &ProofRequest,
    ) -> impl Future<Output = Result<Proof, ProverError>> + Send {
        (**self).generate_proof(request)
    }

    fn verify_proof(
        &self,
        proof: &Proof,
    ) -> impl Future<Output = Result<bool, ProverError>> + Send {
        (**self).verify_proof(proof)
    }
}
