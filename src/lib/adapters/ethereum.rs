use std::time::Duration;

use alloy::{
    network::EthereumWallet,
    primitives::{Address, B256, U256},
    providers::{DynProvider, Provider, ProviderBuilder},
    rpc::json_rpc::ErrorPayload,
    signers::local::PrivateKeySigner,
    sol_types::decode_revert_reason,
    transports::RpcError,
};
use tracing::debug;

use super::abi::{decode_confirmation, IComplaints};
use crate::{
    domain::encoding::Calldata,
    ports::{
        events::EventLogPort,
        verifier::{VerifierError, VerifierPort},
        ConfirmationLog, TxReceipt,
    },
};

/// Receipt wait used when none is configured.
pub const DEFAULT_RECEIPT_TIMEOUT: Duration = Duration::from_secs(120);

/// Ethereum RPC adapter for the complaints verifier contract.
///
/// Implements both the verifier and event-log ports; clone it to hand one
/// copy to each.
#[derive(Clone)]
pub struct EthereumVerifier {
    provider: DynProvider,
    verifier: Address,
    signer_address: Address,
    receipt_timeout: Duration,
    confirmations: u64,
}

impl EthereumVerifier {
    pub async fn new(
        rpc_url: &str,
        private_key: &str,
        verifier: Address,
    ) -> Result<Self, VerifierError> {
        let signer: PrivateKeySigner = private_key
            .parse()
            .map_err(|e| VerifierError::Signer(format!("Invalid private key: {}", e)))?;
        let signer_address = signer.address();
        let wallet = EthereumWallet::from(signer);
        let provider = DynProvider::new(
            ProviderBuilder::new().wallet(wallet).connect_http(
                rpc_url
                    .parse()
                    .map_err(|e| VerifierError::Rpc(format!("Invalid RPC URL: {}", e)))?,
            ),
        );

        Ok(Self {
            provider,
            verifier,
            signer_address,
            receipt_timeout: DEFAULT_RECEIPT_TIMEOUT,
            confirmations: 1,
        })
    }

    pub fn with_receipt_timeout(mut self, timeout: Duration) -> Self {
        self.receipt_timeout = timeout;
        self
    }

    pub fn with_confirmations(mut self, confirmations: u64) -> Self {
        self.confirmations = confirmations.max(1);
        self
    }

    pub fn signer_address(&self) -> Address {
        self.signer_address
    }

    fn convert_receipt(receipt: &alloy::rpc::types::TransactionReceipt) -> TxReceipt {
        TxReceipt {
            tx_hash: receipt.transaction_hash,
            block_number: receipt.block_number,
            success: receipt.status(),
        }
    }
}

/// Split contract-call failures into node-reported rejections and transport
/// problems. An error response from the node means the call itself was
/// refused; anything else says nothing about the calldata.
fn classify(err: alloy::contract::Error) -> VerifierError {
    match err {
        alloy::contract::Error::TransportError(RpcError::ErrorResp(payload)) => {
            VerifierError::Reverted(revert_reason(&payload))
        }
        other => VerifierError::Rpc(other.to_string()),
    }
}

/// Best-effort reason for a rejected call. `Error(string)` and `Panic(uint256)`
/// are decoded; a custom error keeps its raw selector and arguments.
fn revert_reason(payload: &ErrorPayload) -> String {
    let Some(data) = payload.as_revert_data().filter(|d| !d.is_empty()) else {
        return payload.message.to_string();
    };

    // Bare selectors are often valid UTF-8 by accident; don't read them as text.
    if data.len() > 4 {
        if let Some(reason) = decode_revert_reason(&data) {
            return reason;
        }
    }
    format!("{}: custom error {data}", payload.message)
}

impl VerifierPort for EthereumVerifier {
    fn contract_address(&self) -> Address {
        self.verifier
    }

    async fn is_root_allowed(&self, root: U256) -> Result<bool, VerifierError> {
        let contract = IComplaints::new(self.verifier, &self.provider);
        contract
            .allowedRoots(root)
            .call()
            .await
            .map_err(|e| VerifierError::Rpc(e.to_string()))
    }

    async fn submit_dry_run(&self, calldata: &Calldata) -> Result<(), VerifierError> {
        let contract = IComplaints::new(self.verifier, &self.provider);
        let call = IComplaints::submitCall::from(calldata);

        contract
            .submit(call.pA, call.pB, call.pC, call.pubSignals, call.depth)
            .from(self.signer_address)
            .call()
            .await
            .map_err(classify)?;
        Ok(())
    }

    async fn submit_commit(&self, calldata: &Calldata) -> Result<TxReceipt, VerifierError> {
        let contract = IComplaints::new(self.verifier, &self.provider);
        let call = IComplaints::submitCall::from(calldata);

        let pending = contract
            .submit(call.pA, call.pB, call.pC, call.pubSignals, call.depth)
            .send()
            .await
            .map_err(classify)?;

        let tx_hash = *pending.tx_hash();
        debug!(%tx_hash, "submit sent, awaiting receipt");

        let receipt = pending
            .with_required_confirmations(self.confirmations)
            .with_timeout(Some(self.receipt_timeout))
            .get_receipt()
            .await
            .map_err(|e| VerifierError::TransactionFailed {
                tx_hash: Some(tx_hash),
                reason: e.to_string(),
            })?;

        if !receipt.status() {
            return Err(VerifierError::TransactionFailed {
                tx_hash: Some(tx_hash),
                reason: "submit reverted".into(),
            });
        }

        Ok(Self::convert_receipt(&receipt))
    }
}

impl EventLogPort for EthereumVerifier {
    async fn read_confirmation_logs(
        &self,
        tx_hash: B256,
    ) -> Result<Option<Vec<ConfirmationLog>>, VerifierError> {
        let receipt = self
            .provider
            .get_transaction_receipt(tx_hash)
            .await
            .map_err(|e| VerifierError::Rpc(e.to_string()))?;

        Ok(receipt.map(|receipt| {
            receipt
                .inner
                .logs()
                .iter()
                .filter_map(|log| decode_confirmation(&log.inner))
                .collect()
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload(json: &str) -> ErrorPayload {
        serde_json::from_str(json).unwrap()
    }

    const ANVIL_KEY: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

    #[tokio::test]
    async fn test_new_rejects_bad_private_key() {
        let result = EthereumVerifier::new("http://localhost:8545", "not-a-key", Address::ZERO).await;
        assert!(matches!(result, Err(VerifierError::Signer(_))));
    }

    #[tokio::test]
    async fn test_new_rejects_bad_rpc_url() {
        let result = EthereumVerifier::new("not a url", ANVIL_KEY, Address::ZERO).await;
        assert!(matches!(result, Err(VerifierError::Rpc(_))));
    }

    #[tokio::test]
    async fn test_builder_settings() {
        let verifier = Address::repeat_byte(0x42);
        let adapter = EthereumVerifier::new("http://localhost:8545", ANVIL_KEY, verifier)
            .await
            .unwrap()
            .with_receipt_timeout(Duration::from_secs(5))
            .with_confirmations(0);

        assert_eq!(adapter.contract_address(), verifier);
        assert_eq!(adapter.receipt_timeout, Duration::from_secs(5));
        assert_eq!(adapter.confirmations, 1);
        assert_eq!(
            adapter.signer_address(),
            "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266"
                .parse::<Address>()
                .unwrap()
        );
    }

    #[test]
    fn test_revert_reason_decodes_error_string() {
        // Error("bad proof")
        let data = concat!(
            "0x08c379a0",
            "0000000000000000000000000000000000000000000000000000000000000020",
            "0000000000000000000000000000000000000000000000000000000000000009",
            "6261642070726f6f660000000000000000000000000000000000000000000000",
        );
        let p = payload(&format!(
            r#"{{"code":3,"message":"execution reverted","data":"{data}"}}"#
        ));
        assert_eq!(revert_reason(&p), "revert: bad proof");
    }

    #[test]
    fn test_revert_reason_keeps_custom_error_selector() {
        // InvalidProof() selector
        let p = payload(r#"{"code":3,"message":"execution reverted","data":"0x09bde339"}"#);
        assert_eq!(
            revert_reason(&p),
            "execution reverted: custom error 0x09bde339"
        );
    }

    #[test]
    fn test_revert_reason_without_data_uses_message() {
        let p = payload(r#"{"code":-32000,"message":"execution reverted"}"#);
        assert_eq!(revert_reason(&p), "execution reverted");

        let p = payload(r#"{"code":-32000,"message":"nonce too low","data":"0x1234"}"#);
        assert_eq!(revert_reason(&p), "nonce too low");
    }
}
