use {
    crate::config::Config,
    alloy::primitives::Address,
    nouns_contract_client::{ChainReader, ContractReadError, RpcProvider, RpcWallet, WalletSigner},
    nouns_governance::{Connector, WalletEvent},
    std::{sync::Arc, time::Duration},
    tokio::{sync::mpsc, task::JoinHandle},
    tracing::{debug, warn},
};

/// Providers over JSON-RPC: the configured node for reads, and the wallet
/// daemon for signing.
pub struct RpcConnector {
    rpc: RpcProvider,
    wallet: Option<RpcProvider>,
}

impl RpcConnector {
    pub fn new(cfg: &Config) -> Result<Self, ContractReadError> {
        Ok(Self {
            rpc: RpcProvider::new(&cfg.eth_rpc_endpoint)?,
            wallet: cfg.wallet.endpoint.as_deref().map(RpcProvider::new).transpose()?,
        })
    }

    pub fn wallet(&self) -> Option<&RpcProvider> {
        self.wallet.as_ref()
    }

    /// The account to sign with: the configured one, or the wallet's first.
    pub async fn resolve_account(&self, configured: Option<Address>) -> anyhow::Result<Option<Address>> {
        let Some(wallet) = &self.wallet else {
            return Ok(None);
        };

        if configured.is_some() {
            return Ok(configured);
        }

        Ok(wallet.accounts().await?.into_iter().next())
    }
}

impl Connector for RpcConnector {
    fn read_only(&self) -> Arc<dyn ChainReader> {
        Arc::new(self.rpc.clone())
    }

    fn wallet_reader(&self) -> Arc<dyn ChainReader> {
        Arc::new(self.wallet.clone().unwrap_or_else(|| self.rpc.clone()))
    }

    fn signer(&self, account: Address) -> Arc<dyn WalletSigner> {
        let provider = self.wallet.clone().unwrap_or_else(|| self.rpc.clone());

        Arc::new(RpcWallet::new(provider, account))
    }
}

/// Poll the wallet's accounts and network, and report changes as wallet
/// events. Stops when the receiving side is dropped.
pub fn watch_wallet(
    wallet: RpcProvider,
    interval: Duration,
    events: mpsc::Sender<WalletEvent>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut accounts: Option<Vec<String>> = None;
        let mut chain_id: Option<String> = None;
        // The first answer is the starting point, not a change.
        let mut seen = false;
        let mut ticker = tokio::time::interval(interval);

        loop {
            ticker.tick().await;

            let polled = tokio::try_join!(wallet.accounts(), wallet.chain_id()).map(
                |(accounts, chain_id)| {
                    (
                        accounts.iter().map(ToString::to_string).collect::<Vec<_>>(),
                        format!("{chain_id:#x}"),
                    )
                },
            );

            let mut changes = Vec::new();

            match polled {
                Ok((new_accounts, new_chain_id)) => {
                    if seen && accounts.as_ref() != Some(&new_accounts) {
                        changes.push(WalletEvent::AccountsChanged(new_accounts.clone()));
                    }
                    if seen && chain_id.as_ref().is_some_and(|old| *old != new_chain_id) {
                        changes.push(WalletEvent::ChainChanged(new_chain_id.clone()));
                    }
                    accounts = Some(new_accounts);
                    chain_id = Some(new_chain_id);
                    seen = true;
                },
                Err(err) => {
                    debug!(error = %err, "Wallet did not answer");
                    if accounts.take().is_some() {
                        changes.push(WalletEvent::Disconnect);
                    }
                    chain_id = None;
                },
            }

            for event in changes {
                if events.send(event).await.is_err() {
                    warn!("Session closed, no longer watching the wallet");
                    return;
                }
            }
        }
    })
}
