use {
    alloy::primitives::Address,
    nouns_contract_client::{ChainReader, WalletSigner},
    std::sync::Arc,
    tracing::warn,
};

/// A raw notification from the wallet provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WalletEvent {
    AccountsChanged(Vec<String>),
    /// Chain id as a hex quantity, e.g. `0x1`.
    ChainChanged(String),
    Disconnect,
}

/// What a wallet event means for the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionMessage {
    AccountChanged(Address),
    NetworkChanged(u64),
    Disconnected,
}

impl SessionMessage {
    /// `None` for events that carry nothing usable, which are logged.
    pub fn from_event(event: WalletEvent) -> Option<Self> {
        match event {
            WalletEvent::AccountsChanged(accounts) => match accounts.first() {
                None => Some(Self::Disconnected),
                Some(account) => match account.parse() {
                    Ok(address) => Some(Self::AccountChanged(address)),
                    Err(err) => {
                        warn!(%account, error = %err, "Ignoring malformed account from wallet");
                        None
                    },
                },
            },
            WalletEvent::ChainChanged(chain_id) => {
                let digits = chain_id.strip_prefix("0x").unwrap_or(&chain_id);
                match u64::from_str_radix(digits, 16) {
                    Ok(id) => Some(Self::NetworkChanged(id)),
                    Err(err) => {
                        warn!(%chain_id, error = %err, "Ignoring malformed chain id from wallet");
                        None
                    },
                }
            },
            WalletEvent::Disconnect => Some(Self::Disconnected),
        }
    }
}

/// Builds the providers a session runs on.
pub trait Connector: Send + Sync {
    /// Reader on the configured read-only RPC endpoint.
    fn read_only(&self) -> Arc<dyn ChainReader>;

    /// Reader on the wallet's own provider.
    fn wallet_reader(&self) -> Arc<dyn ChainReader>;

    fn signer(&self, account: Address) -> Arc<dyn WalletSigner>;
}

// ----------------------------------- tests -----------------------------------
