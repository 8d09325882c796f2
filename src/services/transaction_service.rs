use alloy::primitives::{Address, Bytes, TxHash, TxKind, U256};
use alloy::rpc::types::{TransactionInput, TransactionRequest};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::adapters::TransactionSubmitter;
use crate::error::AppError;

/// Zero-value contract call priced at `gas_price` wei
pub fn contract_call(from: Address, to: Address, data: Bytes, gas_price: u128) -> TransactionRequest {
    let mut tx = TransactionRequest::default();
    tx.from = Some(from);
    tx.to = Some(TxKind::Call(to));
    tx.value = Some(U256::ZERO);
    tx.gas_price = Some(gas_price);
    tx.input = TransactionInput::new(data);
    tx
}

/// Sends transactions and tracks them to a receipt
pub struct TransactionService {
    submitter: Arc<dyn TransactionSubmitter>,
    poll_interval: Duration,
    confirmation_timeout: Duration,
}

impl TransactionService {
    pub fn new(
        submitter: Arc<dyn TransactionSubmitter>,
        poll_interval: Duration,
        confirmation_timeout: Duration,
    ) -> Self {
        Self {
            submitter,
            poll_interval,
            confirmation_timeout,
        }
    }

    /// Resolves as soon as the node returns a hash
    pub async fn submit(&self, tx: TransactionRequest) -> Result<TxHash, AppError> {
        let hash = self.submitter.send_transaction(tx).await?;
        info!(tx_hash = %hash, "Transaction submitted");
        Ok(hash)
    }

    /// Poll for the receipt until it lands or the timeout passes.
    /// A reverted transaction is an error.
    pub async fn wait_for_confirmation(&self, hash: TxHash) -> Result<(), AppError> {
        let deadline = Instant::now() + self.confirmation_timeout;

        loop {
            match self.submitter.receipt_status(hash).await {
                Ok(Some(true)) => {
                    info!(tx_hash = %hash, "Transaction confirmed");
                    return Ok(());
                }
                Ok(Some(false)) => {
                    warn!(tx_hash = %hash, "Transaction reverted");
                    return Err(AppError::TransactionError(format!("Transaction {} reverted", hash)));
                }
                Ok(None) => debug!(tx_hash = %hash, "Transaction pending"),
                Err(e) => warn!(tx_hash = %hash, error = %e, "Receipt lookup failed, retrying"),
            }

            if Instant::now() + self.poll_interval > deadline {
                return Err(AppError::Timeout(format!(
                    "Transaction {} not mined within {}s",
                    hash,
                    self.confirmation_timeout.as_secs()
                )));
            }
            tokio::time::sleep(self.poll_interval).await;
        }
    }

    /// Single receipt lookup
    pub async fn status(&self, hash: TxHash) -> Result<Option<bool>, AppError> {
        Ok(self.submitter.receipt_status(hash).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::AdapterError;
    use alloy::primitives::{address, b256};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct ScriptedSubmitter {
        reject: bool,
        pending_polls: usize,
        success: bool,
        polls: AtomicUsize,
    }

    #[async_trait]
    impl TransactionSubmitter for ScriptedSubmitter {
        async fn send_transaction(&self, _tx: TransactionRequest) -> Result<TxHash, AdapterError> {
            if self.reject {
                return Err(AdapterError::TransactionRejected("user denied signature".to_string()));
            }
            Ok(b256!("1111111111111111111111111111111111111111111111111111111111111111"))
        }

        async fn receipt_status(&self, _hash: TxHash) -> Result<Option<bool>, AdapterError> {
            let n = self.polls.fetch_add(1, Ordering::SeqCst);
            if n < self.pending_polls {
                Ok(None)
            } else {
                Ok(Some(self.success))
            }
        }
    }

    fn service(pending_polls: usize, success: bool) -> (TransactionService, Arc<ScriptedSubmitter>) {
        let submitter = Arc::new(ScriptedSubmitter {
            reject: false,
            pending_polls,
            success,
            polls: AtomicUsize::new(0),
        });
        let service = TransactionService::new(submitter.clone(), Duration::from_secs(1), Duration::from_secs(10));
        (service, submitter)
    }

    #[test]
    fn test_contract_call_fields() {
        let from = address!("0000000000000000000000000000000000000001");
        let to = address!("0000000000000000000000000000000000000002");
        let tx = contract_call(from, to, Bytes::from(vec![1, 2, 3]), 7);

        assert_eq!(tx.from, Some(from));
        assert_eq!(tx.to, Some(TxKind::Call(to)));
        assert_eq!(tx.value, Some(U256::ZERO));
        assert_eq!(tx.gas_price, Some(7));
        assert_eq!(tx.input.input().map(|b| b.len()), Some(3));
    }

    #[tokio::test(start_paused = true)]
    async fn test_waits_for_receipt() {
        let (service, submitter) = service(3, true);
        let hash = service.submit(TransactionRequest::default()).await.unwrap();

        service.wait_for_confirmation(hash).await.unwrap();
        assert_eq!(submitter.polls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn test_rejection_before_hash() {
        let submitter = Arc::new(ScriptedSubmitter {
            reject: true,
            pending_polls: 0,
            success: true,
            polls: AtomicUsize::new(0),
        });
        let service = TransactionService::new(submitter, Duration::from_secs(1), Duration::from_secs(10));

        let result = service.submit(TransactionRequest::default()).await;
        assert!(matches!(result, Err(AppError::TransactionError(_))));
    }

    #[tokio::test(start_paused = true)]
    async fn test_reverted_transaction_is_error() {
        let (service, _) = service(0, false);
        let result = service.wait_for_confirmation(TxHash::ZERO).await;
        assert!(matches!(result, Err(AppError::TransactionError(_))));
    }

    #[tokio::test(start_paused = true)]
    async fn test_times_out() {
        let (service, _) = service(usize::MAX, true);
        let result = service.wait_for_confirmation(TxHash::ZERO).await;
        assert!(matches!(result, Err(AppError::Timeout(_))));
    }
}
