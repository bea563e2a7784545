use std::path::Path;

use alloy::primitives::U256;
use serde::{Deserialize, Serialize};

use crate::crypto::field::{parse_field, FieldError, BN254_BASE_MODULUS};

/// Number of field elements in a Groth16 proof: A (2), B (2x2), C (2).
pub const PROOF_POINT_COUNT: usize = 8;

#[derive(Debug, thiserror::Error)]
pub enum ProofError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid proof JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("expected 8 proof points, got {0}")]
    PointCount(usize),

    #[error("{name}: {source}")]
    Field {
        name: &'static str,
        #[source]
        source: FieldError,
    },

    #[error("{0} is not an element of the BN254 base field")]
    NotInField(&'static str),

    #[error("tree depth must be positive")]
    ZeroDepth,
}

/// A finished membership proof together with its public signals.
///
/// Root, nullifier and points are checked against the BN254 base field on
/// construction. Message and scope are arbitrary 256-bit words (a bytes32
/// string, a keccak topic id) that the verifier reduces with `field_hash`.
/// The struct is never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Proof {
    pub tree_depth: u32,
    pub merkle_root: U256,
    pub nullifier: U256,
    /// Content commitment (Semaphore `signalHash`).
    pub message: U256,
    /// Topic commitment (Semaphore `externalNullifier`).
    pub scope: U256,
    pub points: [U256; PROOF_POINT_COUNT],
}

impl Proof {
    pub fn new(
        tree_depth: u32,
        merkle_root: U256,
        nullifier: U256,
        message: U256,
        scope: U256,
        points: [U256; PROOF_POINT_COUNT],
    ) -> Result<Self, ProofError> {
        if tree_depth == 0 {
            return Err(ProofError::ZeroDepth);
        }

        for (name, value) in [("merkleTreeRoot", merkle_root), ("nullifierHash", nullifier)] {
            if value >= BN254_BASE_MODULUS {
                return Err(ProofError::NotInField(name));
            }
        }
        if points.iter().any(|p| *p >= BN254_BASE_MODULUS) {
            return Err(ProofError::NotInField("points"));
        }

        Ok(Self {
            tree_depth,
            merkle_root,
            nullifier,
            message,
            scope,
            points,
        })
    }

    /// Render back into the on-disk shape (decimal strings).
    pub fn to_file(&self) -> ProofFile {
        ProofFile {
            public_signals: PublicSignals {
                merkle_tree_root: FieldValue::Text(self.merkle_root.to_string()),
                nullifier_hash: FieldValue::Text(self.nullifier.to_string()),
                signal_hash: FieldValue::Text(self.message.to_string()),
                external_nullifier: FieldValue::Text(self.scope.to_string()),
                tree_depth: self.tree_depth,
            },
            points: self
                .points
                .iter()
                .map(|p| FieldValue::Text(p.to_string()))
                .collect(),
        }
    }
}

/// A field element as it appears in JSON: usually a decimal string, but
/// small values are sometimes written as bare numbers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Text(String),
    Number(u64),
}

impl FieldValue {
    pub(crate) fn parse(&self, name: &'static str) -> Result<U256, ProofError> {
        match self {
            FieldValue::Text(text) => {
                parse_field(text).map_err(|source| ProofError::Field { name, source })
            }
            FieldValue::Number(n) => Ok(U256::from(*n)),
        }
    }
}

/// Public signals block of the proof file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicSignals {
    pub merkle_tree_root: FieldValue,
    pub nullifier_hash: FieldValue,
    pub signal_hash: FieldValue,
    pub external_nullifier: FieldValue,
    pub tree_depth: u32,
}

/// On-wire proof artifact as written by the proving scripts.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProofFile {
    pub public_signals: PublicSignals,
    pub points: Vec<FieldValue>,
}

impl ProofFile {
    pub fn load(path: &Path) -> Result<Self, ProofError> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    pub fn save(&self, path: &Path) -> Result<(), ProofError> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

impl TryFrom<ProofFile> for Proof {
    type Error = ProofError;

    fn try_from(file: ProofFile) -> Result<Self, Self::Error> {
        if file.points.len() != PROOF_POINT_COUNT {
            return Err(ProofError::PointCount(file.points.len()));
        }

        let mut points = [U256::ZERO; PROOF_POINT_COUNT];
        for (slot, value) in points.iter_mut().zip(&file.points) {
            *slot = value.parse("points")?;
        }

        let signals = &file.public_signals;
        Proof::new(
            signals.tree_depth,
            signals.merkle_tree_root.parse("merkleTreeRoot")?,
            signals.nullifier_hash.parse("nullifierHash")?,
            signals.signal_hash.parse("signalHash")?,
            signals.external_nullifier.parse("externalNullifier")?,
            points,
        )
    }
}
