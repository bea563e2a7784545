use std::path::PathBuf;
use std::time::Duration;

use alloy::primitives::Address;
use serde::Deserialize;

/// Top-level submitter configuration loaded from TOML.
#[derive(Debug, Deserialize)]
pub struct SubmitConfig {
    pub chain: ChainConfig,
    pub prover: ProverConfig,
    pub submission: SubmissionConfig,
}

#[derive(Debug, Deserialize)]
pub struct ChainConfig {
    pub rpc_url: String,
    pub private_key: String,
    /// Deployed complaints verifier contract.
    pub verifier_address: Address,
    /// Block explorer base URL for transaction links (e.g. "https://sepolia.etherscan.io/tx").
    /// When absent, raw tx hashes are printed instead.
    pub explorer_url: Option<String>,
    /// How long to wait for the submit receipt (e.g. "2m"). Parsed via humantime.
    #[serde(default = "default_receipt_timeout", with = "humantime_serde")]
    pub receipt_timeout: Duration,
    #[serde(default = "default_confirmations")]
    pub confirmations: u64,
}

fn default_receipt_timeout() -> Duration {
    zk_complaints::adapters::ethereum::DEFAULT_RECEIPT_TIMEOUT
}

fn default_confirmations() -> u64 {
    1
}

/// How to run the Node proving scripts.
#[derive(Debug, Deserialize)]
pub struct ProverConfig {
    #[serde(default = "default_runner")]
    pub runner: String,
    #[serde(default)]
    pub runner_args: Vec<String>,
    pub prove_script: PathBuf,
    pub verify_script: PathBuf,
    /// Directory for request and proof artifacts.
    pub work_dir: PathBuf,
}

fn default_runner() -> String {
    "npx".into()
}

/// What to submit.
#[derive(Debug, Deserialize)]
pub struct SubmissionConfig {
    /// Human topic name; the proof scope is `keccak256(topic)`.
    pub topic: String,
    pub message: String,
    /// Proof artifact used by `submit`, `verify` and `check-root`.
    pub proof_file: PathBuf,
    /// Group produced by the group tooling. Required for `prove-and-submit`.
    pub group_file: Option<PathBuf>,
    /// Identity seed. Required for `prove-and-submit`.
    pub identity_seed: Option<String>,
}

/// Errors from config loading and validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("validation error: {0}")]
    Validation(String),
}

impl SubmitConfig {
    /// Load and validate a config from a TOML file.
    pub fn load(path: &std::path::Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration invariants.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.chain.rpc_url.trim().is_empty() {
            return Err(ConfigError::Validation("chain.rpc_url must not be empty".into()));
        }
        if self.chain.verifier_address == Address::ZERO {
            return Err(ConfigError::Validation(
                "chain.verifier_address must not be the zero address".into(),
            ));
        }
        if self.chain.receipt_timeout.is_zero() {
            return Err(ConfigError::Validation(
                "chain.receipt_timeout must be positive".into(),
            ));
        }
        if self.submission.topic.trim().is_empty() {
            return Err(ConfigError::Validation("submission.topic must not be empty".into()));
        }

        // Both or neither; prove-and-submit needs the pair.
        if self.submission.identity_seed.is_some() != self.submission.group_file.is_some() {
            return Err(ConfigError::Validation(
                "submission.identity_seed and submission.group_file must both be present or both absent"
                    .into(),
            ));
        }

        Ok(())
    }
}
