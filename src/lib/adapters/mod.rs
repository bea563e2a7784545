pub mod abi;
pub mod ethereum;
pub mod mock_prover;
pub mod mock_verifier;
pub mod semaphore_cli;
