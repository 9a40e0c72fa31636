use {
    crate::{ContractError, ContractReadError, TransactionReceipt, TransactionRequest},
    alloy::primitives::{Address, Bytes, TxHash},
    async_trait::async_trait,
};

/// Read access to a chain: what a JSON-RPC provider offers without an
/// account.
#[async_trait]
pub trait ChainReader: Send + Sync {
    async fn block_number(&self) -> Result<u64, ContractReadError>;

    async fn chain_id(&self) -> Result<u64, ContractReadError>;

    /// Execute a read-only call against `to`, at `block` or the latest block.
    async fn call(
        &self,
        to: Address,
        data: Bytes,
        block: Option<u64>,
    ) -> Result<Bytes, ContractReadError>;
}

/// An account able to submit transactions, typically a wallet daemon that
/// holds the key and asks the user for approval.
#[async_trait]
pub trait WalletSigner: Send + Sync {
    fn account(&self) -> Address;

    /// Submit a transaction. Returns as soon as the wallet has broadcast it.
    async fn send_transaction(&self, tx: TransactionRequest) -> Result<TxHash, ContractError>;

    /// Wait until the transaction is included in a block.
    async fn wait_for_receipt(&self, hash: TxHash) -> Result<TransactionReceipt, ContractError>;
}
