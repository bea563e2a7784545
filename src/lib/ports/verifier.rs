use alloy::primitives::{Address, B256, U256};
use std::future::Future;

use super::TxReceipt;
use crate::domain::encoding::Calldata;

/// Port for the on-chain membership verifier.
///
/// Implementations:
/// - `EthereumVerifier` (alloy RPC)
/// - `MockVerifier` for testing and the demo
pub trait VerifierPort: Send + Sync {
    /// Address of the verifier contract, used to attribute emitted logs.
    fn contract_address(&self) -> Address;

    /// Read-only root allow-list lookup (`allowedRoots(root)`).
    fn is_root_allowed(
        &self,
        root: U256,
    ) -> impl Future<Output = Result<bool, VerifierError>> + Send;

    /// Evaluate `submit(..)` without committing state or paying gas (`eth_call`).
    ///
    /// Must never have an externally visible side effect.
    fn submit_dry_run(
        &self,
        calldata: &Calldata,
    ) -> impl Future<Output = Result<(), VerifierError>> + Send;

    /// Send `submit(..)` as a transaction and wait for its receipt.
    fn submit_commit(
        &self,
        calldata: &Calldata,
    ) -> impl Future<Output = Result<TxReceipt, VerifierError>> + Send;
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VerifierError {
    /// The contract rejected the call.
    #[error("execution reverted: {0}")]
    Reverted(String),

    /// Transport or RPC failure; says nothing about the calldata.
    #[error("RPC error: {0}")]
    Rpc(String),

    /// A transaction was sent (or attempted) but did not finalize successfully.
    #[error("transaction failed: {reason}")]
    TransactionFailed {
        tx_hash: Option<B256>,
        reason: String,
    },

    #[error("signer error: {0}")]
    Signer(String),
}

impl<T: VerifierPort> VerifierPort for std::sync::Arc<T> {
    fn contract_address(&self) -> Address {
        (**self).contract_address()
    }

    fn is_root_allowed(
        &self,
        root: U256,
    ) -> impl Future<Output = Result<bool, VerifierError>> + Send {
        (**self).is_root_allowed(root)
    }

    fn submit_dry_run(
        &self,
        calldata: &Calldata,
    ) -> impl Future<Output = Result<(), VerifierError>> + Send {
        (**self).submit_dry_run(calldata)
    }

    fn submit_commit(
        &self,
        calldata: &Calldata,
    ) -> impl Future<Output = Result<TxReceipt, VerifierError>> + Send {
        (**self).submit_commit(calldata)
    }
}
