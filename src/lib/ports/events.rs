use alloy::primitives::B256;
use std::future::Future;

use super::verifier::VerifierError;
use super::ConfirmationLog;

/// Port for reading the confirmation events a transaction emitted.
pub trait EventLogPort: Send + Sync {
    /// Decode every `ComplaintSubmitted` log in the receipt of `tx_hash`.
    ///
    /// Returns `Ok(None)` when no receipt is known for the hash. Logs from any
    /// contract are returned; callers filter by address.
    fn read_confirmation_logs(
        &self,
        tx_hash: B256,
    ) -> impl Future<Output = Result<Option<Vec<ConfirmationLog>>, VerifierError>> + Send;
}

impl<T: EventLogPort> EventLogPort for std::sync::Arc<T> {
    fn read_confirmation_logs(
        &self,
        tx_hash: B256,
    ) -> impl Future<Output = Result<Option<Vec<ConfirmationLog>>, VerifierError>> + Send {
        (**self).read_confirmation_logs(tx_hash)
    }
}
