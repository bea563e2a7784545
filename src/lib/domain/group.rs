use std::path::Path;

use alloy::primitives::U256;
use serde::{Deserialize, Serialize};

use super::proof::{FieldValue, ProofError};

/// Membership group snapshot, as exported by the group tooling.
///
/// The root is recorded alongside the members so it can be compared with
/// the on-chain allow-list without rebuilding the tree.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupFile {
    pub depth: u32,
    pub members: Vec<FieldValue>,
    pub root: FieldValue,
}

impl GroupFile {
    pub fn load(path: &Path) -> Result<Self, ProofError> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    pub fn root(&self) -> Result<U256, ProofError> {
        self.root.parse("root")
    }

    /// Identity commitments of every member, in insertion order.
    pub fn member_commitments(&self) -> Result<Vec<U256>, ProofError> {
        self.members.iter().map(|m| m.parse("members")).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_group_file() {
        let json = r#"{ "depth": 2, "members": ["1", "2", 3], "root": "12345" }"#;
        let group: GroupFile = serde_json::from_str(json).unwrap();

        assert_eq!(group.depth, 2);
        assert_eq!(group.root().unwrap(), U256::from(12345));
        assert_eq!(
            group.member_commitments().unwrap(),
            vec![U256::from(1), U256::from(2), U256::from(3)]
        );
    }

    #[test]
    fn test_bad_member_rejected() {
        let json = r#"{ "depth": 2, "members": ["abc"], "root": "1" }"#;
        let group: GroupFile = serde_json::from_str(json).unwrap();
        assert!(matches!(
            group.member_commitments(),
            Err(ProofError::Field { name: "members", .. })
        ));
    }
}
