use std::fmt;

use alloy::primitives::U256;
use serde::{Deserialize, Serialize};

use super::proof::Proof;
use crate::crypto::field::field_hash;

/// Layout of the inner pairs of the G2 point `B`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PointOrdering {
    /// `B = ((p2, p3), (p4, p5))`
    Standard,
    /// `B = ((p3, p2), (p5, p4))`, the Fp2 coefficient order some verifiers expect.
    Swapped,
}

/// Position of message and scope in the public signal vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SignalOrdering {
    /// `(root, nullifier, message, scope)`
    Raw,
    /// `(root, nullifier, scope, message)`
    Swapped,
}

/// Value transform applied to message and scope. Root and nullifier are
/// already tree-native field elements and are never transformed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SignalTransform {
    Identity,
    FieldHash,
}

/// One hypothesis about the verifier's calldata layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EncodingCandidate {
    pub point_ordering: PointOrdering,
    pub signal_ordering: SignalOrdering,
    pub signal_transform: SignalTransform,
}

const fn candidate(
    point_ordering: PointOrdering,
    signal_ordering: SignalOrdering,
    signal_transform: SignalTransform,
) -> EncodingCandidate {
    EncodingCandidate {
        point_ordering,
        signal_ordering,
        signal_transform,
    }
}

impl EncodingCandidate {
    /// Every candidate, most likely first.
    ///
    /// Untransformed signals are tried before hashed ones, and within each
    /// transform the point ordering varies before the signal ordering.
    pub const ALL: [EncodingCandidate; 8] = [
        candidate(PointOrdering::Standard, SignalOrdering::Raw, SignalTransform::Identity),
        candidate(PointOrdering::Standard, SignalOrdering::Swapped, SignalTransform::Identity),
        candidate(PointOrdering::Swapped, SignalOrdering::Raw, SignalTransform::Identity),
        candidate(PointOrdering::Swapped, SignalOrdering::Swapped, SignalTransform::Identity),
        candidate(PointOrdering::Standard, SignalOrdering::Raw, SignalTransform::FieldHash),
        candidate(PointOrdering::Standard, SignalOrdering::Swapped, SignalTransform::FieldHash),
        candidate(PointOrdering::Swapped, SignalOrdering::Raw, SignalTransform::FieldHash),
        candidate(PointOrdering::Swapped, SignalOrdering::Swapped, SignalTransform::FieldHash),
    ];

    /// Short label used in logs and reports, e.g. `standard/raw/identity`.
    pub fn label(&self) -> &'static str {
        use PointOrdering as P;
        use SignalOrdering as S;
        use SignalTransform as T;

        match (self.point_ordering, self.signal_ordering, self.signal_transform) {
            (P::Standard, S::Raw, T::Identity) => "standard/raw/identity",
            (P::Standard, S::Swapped, T::Identity) => "standard/swapped/identity",
            (P::Swapped, S::Raw, T::Identity) => "swapped/raw/identity",
            (P::Swapped, S::Swapped, T::Identity) => "swapped/swapped/identity",
            (P::Standard, S::Raw, T::FieldHash) => "standard/raw/field-hash",
            (P::Standard, S::Swapped, T::FieldHash) => "standard/swapped/field-hash",
            (P::Swapped, S::Raw, T::FieldHash) => "swapped/raw/field-hash",
            (P::Swapped, S::Swapped, T::FieldHash) => "swapped/swapped/field-hash",
        }
    }

    /// Lay out a proof according to this candidate.
    pub fn encode(&self, proof: &Proof) -> Calldata {
        let p = &proof.points;

        let b = match self.point_ordering {
            PointOrdering::Standard => [[p[2], p[3]], [p[4], p[5]]],
            PointOrdering::Swapped => [[p[3], p[2]], [p[5], p[4]]],
        };

        let (message, scope) = match self.signal_transform {
            SignalTransform::Identity => (proof.message, proof.scope),
            SignalTransform::FieldHash => (field_hash(proof.message), field_hash(proof.scope)),
        };

        let (third, fourth) = match self.signal_ordering {
            SignalOrdering::Raw => (message, scope),
            SignalOrdering::Swapped => (scope, message),
        };

        Calldata {
            a: [p[0], p[1]],
            b,
            c: [p[6], p[7]],
            signals: [proof.merkle_root, proof.nullifier, third, fourth],
            depth: U256::from(proof.tree_depth),
        }
    }
}

impl fmt::Display for EncodingCandidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Candidates in the order they are tried.
pub fn candidates() -> impl Iterator<Item = EncodingCandidate> {
    EncodingCandidate::ALL.into_iter()
}

/// Arguments of the verifier's `submit(pA, pB, pC, pubSignals, depth)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Calldata {
    pub a: [U256; 2],
    pub b: [[U256; 2]; 2],
    pub c: [U256; 2],
    /// `[root, nullifier, _, _]`; the last two slots depend on the candidate.
    pub signals: [U256; 4],
    pub depth: U256,
}

impl Calldata {
    pub fn root(&self) -> U256 {
        self.signals[0]
    }

    pub fn nullifier(&self) -> U256 {
        self.signals[1]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

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

    fn u(values: [u64; 2]) -> [U256; 2] {
        values.map(U256::from)
    }

    #[test]
    fn test_eight_distinct_candidates() {
        let unique: HashSet<_> = candidates().collect();
        assert_eq!(unique.len(), 8);
    }

    #[test]
    fn test_priority_order() {
        let labels: Vec<_> = candidates().map(|c| c.label()).collect();
        assert_eq!(
            labels,
            [
                "standard/raw/identity",
                "standard/swapped/identity",
                "swapped/raw/identity",
                "swapped/swapped/identity",
                "standard/raw/field-hash",
                "standard/swapped/field-hash",
                "swapped/raw/field-hash",
                "swapped/swapped/field-hash",
            ]
        );
    }

    #[test]
    fn test_standard_layout() {
        let calldata = EncodingCandidate::ALL[0].encode(&sample_proof());
        assert_eq!(calldata.a, u([1, 2]));
        assert_eq!(calldata.b, [u([3, 4]), u([5, 6])]);
        assert_eq!(calldata.c, u([7, 8]));
        assert_eq!(calldata.signals, [42u64, 99, 7, 11].map(U256::from));
        assert_eq!(calldata.depth, U256::from(4));
    }

    #[test]
    fn test_swapped_points_only_touch_b() {
        let calldata = EncodingCandidate::ALL[2].encode(&sample_proof());
        assert_eq!(calldata.a, u([1, 2]));
        assert_eq!(calldata.b, [u([4, 3]), u([6, 5])]);
        assert_eq!(calldata.c, u([7, 8]));
    }

    #[test]
    fn test_swapped_signals() {
        let calldata = EncodingCandidate::ALL[1].encode(&sample_proof());
        assert_eq!(calldata.signals, [42u64, 99, 11, 7].map(U256::from));
    }

    #[test]
    fn test_field_hash_transform() {
        let proof = sample_proof();
        let hashed = EncodingCandidate::ALL[4].encode(&proof);
        assert_eq!(hashed.signals[2], field_hash(proof.message));
        assert_eq!(hashed.signals[3], field_hash(proof.scope));

        let hashed_swapped = EncodingCandidate::ALL[7].encode(&proof);
        assert_eq!(hashed_swapped.signals[2], field_hash(proof.scope));
        assert_eq!(hashed_swapped.signals[3], field_hash(proof.message));
    }

    #[test]
    fn test_root_and_nullifier_never_move() {
        let proof = sample_proof();
        for candidate in candidates() {
            let calldata = candidate.encode(&proof);
            assert_eq!(calldata.root(), proof.merkle_root, "{candidate}");
            assert_eq!(calldata.nullifier(), proof.nullifier, "{candidate}");
        }
    }
}
