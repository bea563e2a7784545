//! Encoding Resolution Demo
//!
//! Walks through the resolution protocol in-process against a mock verifier
//! contract. No proving scripts and no blockchain are involved.
//!
//! Run with: `cargo run --bin demo`

use std::sync::Arc;

use alloy::primitives::{Address, B256, U256};

use zk_complaints::adapters::mock_prover::StaticProver;
use zk_complaints::adapters::mock_verifier::{EmitMode, MockVerifier};
use zk_complaints::crypto::field::{field_hash_bytes, topic_id};
use zk_complaints::domain::encoding::EncodingCandidate;
use zk_complaints::domain::ledger::SubmissionLedger;
use zk_complaints::domain::proof::Proof;
use zk_complaints::domain::submission::SubmissionContext;
use zk_complaints::resolver::{trial_report, ResolutionError, SubmissionResolver};

type DemoResolver = SubmissionResolver<StaticProver, Arc<MockVerifier>, Arc<MockVerifier>>;

const TOPIC: &str = "complaints-v1";

#[tokio::main(flavor = "current_thread")]
async fn main() {
    println!("=== Proof Encoding Resolution & Submission ===");
    println!("=== Protocol Demo (mock verifier, no chain) ===\n");

    let mut ledger = SubmissionLedger::new();

    scenario_hashed_signals(&mut ledger).await;
    println!("\n{}\n", "=".repeat(60));
    scenario_root_not_allowed().await;
    println!("\n{}\n", "=".repeat(60));
    scenario_exhausted(&mut ledger).await;

    println!("\n[Ledger] {} submission(s) this session", ledger.len());
    for record in ledger.newest_first() {
        println!(
            "  {}  {:<14} [{}]  {:#x}  verified={:?}",
            record.timestamp.format("%H:%M:%S"),
            record.topic,
            record.encoding,
            record.tx_hash,
            record.verified
        );
    }

    println!("\n=== All scenarios completed successfully ===");
}

fn demo_proof(message: u64) -> Proof {
    Proof::new(
        16,
        U256::from(0x2a_u64),
        U256::from(0x63_u64),
        U256::from(message),
        topic_id(TOPIC),
        core::array::from_fn(|i| U256::from(i + 1)),
    )
    .expect("demo values lie in the field")
}

async fn demo_resolver(allow_root: bool) -> (DemoResolver, Arc<MockVerifier>) {
    let mock = Arc::new(MockVerifier::new(Address::repeat_byte(0xc0)));
    if allow_root {
        mock.allow_root(U256::from(0x2a_u64)).await;
    }
    let resolver = SubmissionResolver::new(StaticProver::verifying(true), Arc::clone(&mock), Arc::clone(&mock));
    (resolver, mock)
}

async fn scenario_hashed_signals(ledger: &mut SubmissionLedger) {
    println!("--- Scenario 1: Verifier expects swapped B points and hashed signals ---\n");

    let proof = demo_proof(7);
    let (resolver, mock) = demo_resolver(true).await;

    // The contract only accepts candidate #7.
    let expected = EncodingCandidate::ALL[6];
    mock.accept(&proof, expected).await;
    println!("[Setup] Mock verifier accepts only {expected}");

    let context = SubmissionContext::new(TOPIC, "Pizza was cold");
    let record = resolver
        .submit(&proof, &context, ledger)
        .await
        .expect("submission failed");

    println!("[Resolve] {} dry runs before a match", mock.dry_run_count().await);
    println!("[Commit]  tx {:#x} with {}", record.tx_hash, record.encoding);
    println!("[Confirm] messageHash {}", record.message_hash);
    assert_eq!(record.encoding, expected);
    assert_eq!(record.message_hash, field_hash_bytes(U256::from(7)));
    assert_eq!(record.verified, Some(true));
    assert_eq!(mock.commit_count().await, 1);
    println!("  ✓ One commit, event digest matches the local digest");

    println!("\n[Mismatch] Same verifier, contract emits a foreign digest...");
    let proof = demo_proof(8);
    mock.accept(&proof, expected).await;
    mock.set_emit_mode(EmitMode::Override(B256::repeat_byte(0x77))).await;
    let record = resolver
        .submit(&proof, &SubmissionContext::new(TOPIC, "Coffee was late"), ledger)
        .await
        .expect("submission failed");
    assert_eq!(record.verified, Some(false));
    println!("  ✓ Recorded with verified=false; the mismatch is advisory");
}

async fn scenario_root_not_allowed() {
    println!("--- Scenario 2: Root not on the allow-list ---\n");

    let (resolver, mock) = demo_resolver(false).await;
    let err = resolver
        .resolve(&demo_proof(7))
        .await
        .expect_err("root is not allowed");

    println!("[Resolve] {err}");
    assert!(matches!(err, ResolutionError::RootNotAllowed { .. }));
    assert_eq!(mock.dry_run_count().await, 0);
    println!("  ✓ No dry runs, no commit");
}

async fn scenario_exhausted(ledger: &mut SubmissionLedger) {
    println!("--- Scenario 3: Verifier accepts no candidate ---\n");

    let (resolver, mock) = demo_resolver(true).await;
    let before = ledger.len();
    let err = resolver
        .submit(&demo_proof(7), &SubmissionContext::new(TOPIC, "Pizza was cold"), ledger)
        .await
        .expect_err("no candidate should match");

    let ResolutionError::EncodingExhausted { trials } = &err else {
        panic!("unexpected error: {err}");
    };
    println!("[Resolve] {err}");
    for line in trial_report(trials).lines() {
        println!("  {line}");
    }
    assert_eq!(mock.commit_count().await, 0);
    assert_eq!(ledger.len(), before);
    println!("  ✓ Zero commits, ledger unchanged");
}
