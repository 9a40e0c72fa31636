use {
    crate::{ContractError, WalletSigner},
    alloy::primitives::{Address, Bytes, TxHash},
    serde::Serialize,
    std::{fmt, sync::Arc, time::Duration},
    tracing::{info, warn},
};

/// How long to wait before asking again after a failed receipt lookup.
pub const RECEIPT_RETRY_INTERVAL: Duration = Duration::from_secs(4);

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct TransactionRequest {
    pub from: Address,
    pub to: Address,
    pub data: Bytes,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransactionReceipt {
    pub transaction_hash: TxHash,
    pub block_number: u64,
    pub success: bool,
}

/// A submitted transaction that may not be mined yet.
pub struct PendingTransaction {
    hash: TxHash,
    signer: Arc<dyn WalletSigner>,
    retry_interval: Duration,
}

impl PendingTransaction {
    pub fn new(hash: TxHash, signer: Arc<dyn WalletSigner>) -> Self {
        Self {
            hash,
            signer,
            retry_interval: RECEIPT_RETRY_INTERVAL,
        }
    }

    pub fn with_retry_interval(mut self, retry_interval: Duration) -> Self {
        self.retry_interval = retry_interval;
        self
    }

    pub fn hash(&self) -> TxHash {
        self.hash
    }

    /// Wait for the transaction to be mined. There is no timeout: a
    /// transaction that never lands keeps the caller waiting.
    ///
    /// The transaction is already broadcast, so a failed lookup is retried
    /// rather than reported.
    pub async fn confirm(self) -> Result<TransactionReceipt, ContractError> {
        let receipt = loop {
            match self.signer.wait_for_receipt(self.hash).await {
                Ok(receipt) => break receipt,
                Err(ContractError::Read(err)) => {
                    warn!(hash = %self.hash, error = %err, "Failed to fetch receipt, retrying");
                    tokio::time::sleep(self.retry_interval).await;
                },
                Err(err) => return Err(err),
            }
        };

        if !receipt.success {
            return Err(ContractError::FailedOnChain(self.hash));
        }

        info!(
            hash = %self.hash,
            block = receipt.block_number,
            "Transaction confirmed"
        );

        Ok(receipt)
    }
}

impl fmt::Debug for PendingTransaction {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("PendingTransaction")
            .field("hash", &self.hash)
            .field("account", &self.signer.account())
            .finish()
    }
}
