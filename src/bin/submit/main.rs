//! Command-line submitter for complaint proofs.
//!
//! Resolves the verifier's calldata layout with dry runs, sends exactly one
//! `submit` transaction and cross-checks the emitted event.
//!
//! Run with:
//!   cargo run --bin submit -- --config config.toml submit

use std::path::PathBuf;

use alloy::primitives::{B256, U256};
use clap::{Parser, Subcommand};
use tracing::{info, warn};

mod config;

use config::SubmitConfig;
use zk_complaints::adapters::ethereum::EthereumVerifier;
use zk_complaints::adapters::semaphore_cli::SemaphoreCliProver;
use zk_complaints::crypto::field::topic_id;
use zk_complaints::domain::group::GroupFile;
use zk_complaints::domain::ledger::SubmissionLedger;
use zk_complaints::domain::proof::{Proof, ProofFile};
use zk_complaints::domain::submission::{SubmissionContext, SubmissionRecord};
use zk_complaints::ports::prover::{ProofRequest, ProverPort as _};
use zk_complaints::resolver::{trial_report, ResolutionError, SubmissionResolver};

#[derive(clap::Parser)]
#[command(name = "submit", about = "Submit a Semaphore complaint proof to the on-chain verifier")]
struct Args {
    /// Path to the TOML configuration file.
    #[arg(long, default_value = "./config.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Resolve the encoding for an existing proof file and submit it.
    Submit {
        /// Overrides `submission.proof_file`.
        #[arg(long)]
        proof: Option<PathBuf>,
    },
    /// Generate a fresh proof through the proving scripts, then submit it.
    ProveAndSubmit,
    /// Report whether the proof root (and the group root) are allowed on-chain.
    CheckRoot {
        #[arg(long)]
        proof: Option<PathBuf>,
    },
    /// Verify a proof locally without touching the chain.
    Verify {
        #[arg(long)]
        proof: Option<PathBuf>,
    },
}

#[derive(Debug, thiserror::Error)]
enum SubmitError {
    #[error("config error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("verifier error: {0}")]
    Verifier(#[from] zk_complaints::ports::verifier::VerifierError),

    #[error("prover error: {0}")]
    Prover(#[from] zk_complaints::ports::prover::ProverError),

    #[error("proof error: {0}")]
    Proof(#[from] zk_complaints::domain::proof::ProofError),

    #[error("{0}")]
    Resolution(#[from] ResolutionError),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("missing setting: {0}")]
    MissingSetting(&'static str),
}

/// Returns a block explorer link for the given transaction hash, or a raw hash if no explorer is configured.
fn tx_link(explorer_url: Option<&str>, tx_hash: B256) -> String {
    match explorer_url {
        Some(base) => format!("{base}/{tx_hash:#x}"),
        None => format!("{tx_hash:#x}"),
    }
}

fn load_proof(path: &std::path::Path) -> Result<Proof, SubmitError> {
    info!("Loading proof from {}", path.display());
    let proof = Proof::try_from(ProofFile::load(path)?)?;
    info!("  root:      {}", proof.merkle_root);
    info!("  nullifier: {}", proof.nullifier);
    info!("  depth:     {}", proof.tree_depth);
    Ok(proof)
}

fn report_record(record: &SubmissionRecord, explorer_url: Option<&str>) -> Result<(), SubmitError> {
    info!("");
    info!("Submitted with encoding {}", record.encoding);
    info!("  tx:       {}", tx_link(explorer_url, record.tx_hash));
    if let Some(block) = record.block_number {
        info!("  block:    {block}");
    }
    match record.verified {
        Some(true) => info!("  event:    messageHash matches {}", record.message_hash),
        Some(false) => warn!(
            "  event:    messageHash {:?} does not match local {}",
            record.onchain_message_hash, record.message_hash
        ),
        None => warn!("  event:    no ComplaintSubmitted event found, match unknown"),
    }
    info!("{}", serde_json::to_string_pretty(record)?);
    Ok(())
}

fn report_failure(err: &ResolutionError, explorer_url: Option<&str>) {
    match err {
        ResolutionError::EncodingExhausted { trials } => {
            warn!("No candidate encoding was accepted:");
            for line in trial_report(trials).lines() {
                warn!("  {line}");
            }
        }
        ResolutionError::SubmissionFailed {
            tx_hash: Some(tx_hash),
            ..
        } => warn!("  tx: {}", tx_link(explorer_url, *tx_hash)),
        _ => {}
    }
}

fn report_ledger(ledger: &SubmissionLedger, explorer_url: Option<&str>) {
    info!("");
    info!("Submissions this session: {}", ledger.len());
    for record in ledger.newest_first() {
        info!(
            "  {}  {}  [{}]  {}",
            record.timestamp.format("%H:%M:%S"),
            record.topic,
            record.encoding,
            tx_link(explorer_url, record.tx_hash)
        );
    }
}

#[tokio::main(flavor = "multi_thread")]
async fn main() -> Result<(), SubmitError> {
    // No timestamps or level prefix so CLI output stays readable.
    tracing_subscriber::fmt()
        .without_time()
        .with_target(false)
        .with_level(false)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    info!("Loading config from {}", args.config.display());
    let config = SubmitConfig::load(&args.config)?;
    let explorer_url = config.chain.explorer_url.as_deref();

    let prover = SemaphoreCliProver::new(
        config.prover.runner.clone(),
        config.prover.runner_args.clone(),
        config.prover.prove_script.clone(),
        config.prover.verify_script.clone(),
        config.prover.work_dir.clone(),
    );

    if let Command::Verify { proof } = &args.command {
        let path = proof.as_ref().unwrap_or(&config.submission.proof_file);
        let proof = load_proof(path)?;
        let valid = prover.verify_proof(&proof).await?;
        info!("Off-chain verify: {valid}");
        return Ok(());
    }

    let verifier = EthereumVerifier::new(
        &config.chain.rpc_url,
        &config.chain.private_key,
        config.chain.verifier_address,
    )
    .await?
    .with_receipt_timeout(config.chain.receipt_timeout)
    .with_confirmations(config.chain.confirmations);
    info!("Verifier: {}", config.chain.verifier_address);
    info!("Signer:   {}", verifier.signer_address());

    let resolver = SubmissionResolver::new(prover, verifier.clone(), verifier);
    let context = SubmissionContext::new(&config.submission.topic, &config.submission.message);
    let mut ledger = SubmissionLedger::new();

    let outcome = match args.command {
        Command::Verify { .. } => return Ok(()),
        Command::CheckRoot { proof } => {
            let path = proof.unwrap_or_else(|| config.submission.proof_file.clone());
            let proof = load_proof(&path)?;
            let allowed = resolver.root_status(proof.merkle_root).await?;
            info!("Proof root {} allowed: {allowed}", proof.merkle_root);

            if let Some(group_path) = &config.submission.group_file {
                let group_root = GroupFile::load(group_path)?.root()?;
                if group_root != proof.merkle_root {
                    warn!("Group root {group_root} differs from the proof root");
                    let allowed = resolver.root_status(group_root).await?;
                    info!("Group root {group_root} allowed: {allowed}");
                }
            }
            if !allowed {
                warn!("Run the admin allow-root step for {} before submitting", proof.merkle_root);
            }
            return Ok(());
        }
        Command::Submit { proof } => {
            let path = proof.unwrap_or_else(|| config.submission.proof_file.clone());
            let proof = load_proof(&path)?;
            check_scope(&proof, &config.submission.topic);
            resolver.submit(&proof, &context, &mut ledger).await
        }
        Command::ProveAndSubmit => {
            let request = proof_request(&config)?;
            info!(
                "Generating proof for {} group members (depth {})",
                request.group_members.len(),
                request.tree_depth
            );
            resolver.prove_and_submit(&request, &context, &mut ledger).await
        }
    };

    match outcome {
        Ok(record) => {
            report_record(&record, explorer_url)?;
            report_ledger(&ledger, explorer_url);
            Ok(())
        }
        Err(err) => {
            report_failure(&err, explorer_url);
            Err(err.into())
        }
    }
}

fn proof_request(config: &SubmitConfig) -> Result<ProofRequest, SubmitError> {
    let seed = config
        .submission
        .identity_seed
        .clone()
        .ok_or(SubmitError::MissingSetting("submission.identity_seed"))?;
    let group_path = config
        .submission
        .group_file
        .as_ref()
        .ok_or(SubmitError::MissingSetting("submission.group_file"))?;
    let group = GroupFile::load(group_path)?;

    Ok(ProofRequest {
        identity_seed: seed,
        group_members: group.member_commitments()?,
        message: config.submission.message.clone(),
        scope: topic_id(&config.submission.topic),
        tree_depth: group.depth,
    })
}

/// Warn when the proof was made for a different topic than configured.
fn check_scope(proof: &Proof, topic: &str) {
    let expected: U256 = topic_id(topic);
    if proof.scope != expected {
        warn!("Proof scope {} is not the scope of topic {topic:?} ({expected})", proof.scope);
    }
}
