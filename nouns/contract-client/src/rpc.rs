use {
    crate::{
        ChainReader, ContractError, ContractReadError, TransactionReceipt, TransactionRequest,
        WalletSigner,
    },
    alloy::{
        eips::BlockId,
        network::{ReceiptResponse, TransactionBuilder},
        primitives::{Address, Bytes, TxHash},
        providers::{DynProvider, PendingTransactionBuilder, Provider, ProviderBuilder},
        rpc::types::TransactionRequest as RpcTransactionRequest,
        transports::TransportError,
    },
    async_trait::async_trait,
    reqwest::Url,
    std::fmt,
    tracing::debug,
};

/// A JSON-RPC node reached over HTTP.
#[derive(Clone)]
pub struct RpcProvider {
    inner: DynProvider,
    endpoint: String,
}

impl RpcProvider {
    pub fn new(endpoint: &str) -> Result<Self, ContractReadError> {
        let url = endpoint
            .parse::<Url>()
            .map_err(|err| ContractReadError::InvalidEndpoint {
                endpoint: endpoint.to_string(),
                reason: err.to_string(),
            })?;

        Ok(Self {
            inner: ProviderBuilder::new().connect_http(url).erased(),
            endpoint: endpoint.to_string(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// The accounts the node or wallet daemon is willing to sign for.
    pub async fn accounts(&self) -> Result<Vec<Address>, ContractReadError> {
        self.inner.get_accounts().await.map_err(read_error)
    }
}

impl fmt::Debug for RpcProvider {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("RpcProvider")
            .field("endpoint", &self.endpoint)
            .finish()
    }
}

#[async_trait]
impl ChainReader for RpcProvider {
    async fn block_number(&self) -> Result<u64, ContractReadError> {
        self.inner.get_block_number().await.map_err(read_error)
    }

    async fn chain_id(&self) -> Result<u64, ContractReadError> {
        self.inner.get_chain_id().await.map_err(read_error)
    }

    async fn call(
        &self,
        to: Address,
        data: Bytes,
        block: Option<u64>,
    ) -> Result<Bytes, ContractReadError> {
        let tx = RpcTransactionRequest::default().with_to(to).with_input(data);

        let mut call = self.inner.call(tx);
        if let Some(number) = block {
            call = call.block(BlockId::number(number));
        }

        call.await.map_err(read_error)
    }
}

/// Sort a node's error into a revert, an error object, or a transport
/// failure. Nodes report reverted calls as code 3 (or -32000 with an
/// "execution reverted" message).
fn read_error(err: TransportError) -> ContractReadError {
    match err.as_error_resp() {
        Some(payload) if payload.code == 3 || payload.message.contains("execution reverted") => {
            ContractReadError::Reverted(payload.message.to_string())
        },
        Some(payload) => ContractReadError::Rpc {
            code: payload.code,
            message: payload.message.to_string(),
        },
        None => ContractReadError::Transport(err),
    }
}

/// A wallet reached over JSON-RPC (e.g. a local signing daemon) that signs
/// for `account` when asked through `eth_sendTransaction`.
#[derive(Debug, Clone)]
pub struct RpcWallet {
    provider: RpcProvider,
    account: Address,
}

impl RpcWallet {
    pub fn new(provider: RpcProvider, account: Address) -> Self {
        Self { provider, account }
    }
}

#[async_trait]
impl WalletSigner for RpcWallet {
    fn account(&self) -> Address {
        self.account
    }

    async fn send_transaction(&self, tx: TransactionRequest) -> Result<TxHash, ContractError> {
        let tx = RpcTransactionRequest::default()
            .with_from(tx.from)
            .with_to(tx.to)
            .with_input(tx.data);

        match self.provider.inner.send_transaction(tx).await {
            Ok(pending) => Ok(*pending.tx_hash()),
            Err(err) => match err.as_error_resp() {
                Some(payload) => Err(ContractError::from_rpc(payload.code, &payload.message)),
                None => Err(ContractReadError::Transport(err).into()),
            },
        }
    }

    async fn wait_for_receipt(&self, hash: TxHash) -> Result<TransactionReceipt, ContractError> {
        debug!(%hash, "Waiting for transaction");

        let receipt = PendingTransactionBuilder::new(self.provider.inner.root().clone(), hash)
            .get_receipt()
            .await
            .map_err(ContractReadError::from)?;

        Ok(TransactionReceipt {
            transaction_hash: receipt.transaction_hash(),
            block_number: receipt.block_number().unwrap_or_default(),
            success: receipt.status(),
        })
    }
}

// ----------------------------------- tests -----------------------------------
