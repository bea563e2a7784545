use std::path::{Path, PathBuf};
use std::process::Output;

use tokio::process::Command;
use tracing::debug;

use crate::domain::proof::{Proof, ProofFile};
use crate::ports::prover::{ProofRequest, ProverError, ProverPort};

const REQUEST_FILE: &str = "request.json";
const PROOF_FILE: &str = "proof.json";
const VERIFY_FILE: &str = "verify-proof.json";

/// SemaphoreCliProver generates and checks proofs by shelling out to the
/// Node proving scripts.
///
/// Proving:
/// 1. Writes the request as JSON to `<work_dir>/request.json`
/// 2. Runs `<runner> <prove_script> request.json proof.json`
/// 3. Reads the proof artifact back from `<work_dir>/proof.json`
///
/// Verification writes the proof to `<work_dir>/verify-proof.json`, runs the
/// verify script on it and reads `true`/`false` from the last line of stdout.
pub struct SemaphoreCliProver {
    /// Program used to run the scripts, e.g. `npx`.
    runner: String,
    /// Arguments passed before the script path, e.g. `["ts-node"]`.
    runner_args: Vec<String>,
    prove_script: PathBuf,
    verify_script: PathBuf,
    work_dir: PathBuf,
}

impl SemaphoreCliProver {
    pub fn new(
        runner: impl Into<String>,
        runner_args: Vec<String>,
        prove_script: PathBuf,
        verify_script: PathBuf,
        work_dir: PathBuf,
    ) -> Self {
        Self {
            runner: runner.into(),
            runner_args,
            prove_script,
            verify_script,
            work_dir,
        }
    }

    fn format_request(request: &ProofRequest) -> Result<String, ProverError> {
        serde_json::to_string_pretty(request).map_err(|e| ProverError::Serialization(e.to_string()))
    }

    async fn run_script(&self, script: &Path, args: &[&Path]) -> Result<Output, ProverError> {
        debug!(runner = %self.runner, script = %script.display(), "running proving script");

        Command::new(&self.runner)
            .args(&self.runner_args)
            .arg(script)
            .args(args)
            .output()
            .await
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::NotFound => ProverError::BinaryNotFound(self.runner.clone()),
                _ => ProverError::IoError(e),
            })
    }
}

/// Read the verdict from the script's last non-empty output line, which may
/// carry a label (`Off-chain verify: true`).
fn parse_verdict(stdout: &str) -> Option<bool> {
    let line = stdout.lines().rev().find(|l| !l.trim().is_empty())?;
    match line.trim().rsplit([' ', ':']).next()? {
        "true" => Some(true),
        "false" => Some(false),
        _ => None,
    }
}

impl ProverPort for SemaphoreCliProver {
    async fn generate_proof(&self, request: &ProofRequest) -> Result<Proof, ProverError> {
        std::fs::create_dir_all(&self.work_dir)?;

        let request_path = self.work_dir.join(REQUEST_FILE);
        let proof_path = self.work_dir.join(PROOF_FILE);
        std::fs::write(&request_path, Self::format_request(request)?)?;

        let output = self
            .run_script(&self.prove_script, &[request_path.as_path(), proof_path.as_path()])
            .await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ProverError::ProofFailed(format!(
                "prove script failed: {}",
                stderr
            )));
        }

        let proof = Proof::try_from(ProofFile::load(&proof_path)?)?;
        Ok(proof)
    }

    async fn verify_proof(&self, proof: &Proof) -> Result<bool, ProverError> {
        std::fs::create_dir_all(&self.work_dir)?;

        let proof_path = self.work_dir.join(VERIFY_FILE);
        proof.to_file().save(&proof_path)?;

        let output = self.run_script(&self.verify_script, &[proof_path.as_path()]).await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ProverError::VerificationFailed(format!(
                "verify script failed: {}",
                stderr
            )));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        parse_verdict(&stdout).ok_or_else(|| {
            ProverError::VerificationFailed(format!("unrecognised verify output: {}", stdout.trim()))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::U256;

    fn sample_request() -> ProofRequest {
        ProofRequest {
            identity_seed: "alice-seed".into(),
            group_members: vec![U256::from(1), U256::from(2), U256::from(3)],
            message: "Pizza was cold".into(),
            scope: U256::from(11),
            tree_depth: 2,
        }
    }

    #[test]
    fn test_format_request() {
        let json = SemaphoreCliProver::format_request(&sample_request()).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed["identitySeed"], "alice-seed");
        assert_eq!(parsed["groupMembers"], serde_json::json!(["1", "2", "3"]));
        assert_eq!(parsed["message"], "Pizza was cold");
        assert_eq!(parsed["scope"], "11");
        assert_eq!(parsed["treeDepth"], 2);
    }

    #[test]
    fn test_parse_verdict() {
        assert_eq!(parse_verdict("true\n"), Some(true));
        assert_eq!(parse_verdict("Off-chain verify: false\n\n"), Some(false));
        assert_eq!(parse_verdict("loading circuit\nOff-chain verify: true"), Some(true));
        assert_eq!(parse_verdict("Error: bad proof"), None);
        assert_eq!(parse_verdict(""), None);
    }

    #[tokio::test]
    async fn test_missing_runner_reported() {
        let work_dir = std::env::temp_dir().join(format!("zk-complaints-cli-{}", std::process::id()));
        let prover = SemaphoreCliProver::new(
            "definitely-not-a-real-runner",
            vec![],
            PathBuf::from("gen-proof.ts"),
            PathBuf::from("verify-offchain.ts"),
            work_dir.clone(),
        );

        let err = prover.generate_proof(&sample_request()).await.unwrap_err();
        assert!(matches!(err, ProverError::BinaryNotFound(ref r) if r == "definitely-not-a-real-runner"));

        let _ = std::fs::remove_dir_all(work_dir);
    }
}
