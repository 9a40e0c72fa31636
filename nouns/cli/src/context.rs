use {
    crate::{config::Config, connector::RpcConnector},
    anyhow::Context as _,
    nouns_governance::{Connector, GovernanceService},
    nouns_indexer_client::IndexerClient,
    std::sync::Arc,
    tracing::{info, warn},
};

/// Everything a command needs, built from the config.
pub struct Context {
    pub cfg: Config,
    pub connector: Arc<RpcConnector>,
    pub service: Arc<GovernanceService>,
}

impl Context {
    /// A read-only session on the configured RPC endpoint.
    pub fn read_only(cfg: Config) -> anyhow::Result<Self> {
        let connector = Arc::new(RpcConnector::new(&cfg)?);
        let service = GovernanceService::new(
            cfg.service_config(),
            Some(indexer(&cfg)),
            connector.read_only(),
        )
        .with_connector(connector.clone());

        Ok(Self {
            cfg,
            connector,
            service: Arc::new(service),
        })
    }

    /// A session that signs through the configured wallet. Without a wallet
    /// the session stays read-only and writes fail with a missing signer.
    pub async fn with_wallet(cfg: Config) -> anyhow::Result<Self> {
        let connector = Arc::new(RpcConnector::new(&cfg)?);

        let account = connector
            .resolve_account(cfg.wallet.account)
            .await
            .context("failed to read accounts from the wallet")?;

        let service = match account {
            Some(account) => {
                info!(%account, "Using wallet account");
                GovernanceService::new(
                    cfg.service_config(),
                    Some(indexer(&cfg)),
                    connector.wallet_reader(),
                )
                .with_signer(connector.signer(account))
            },
            None => {
                warn!("No wallet account available, continuing read-only");
                GovernanceService::new(
                    cfg.service_config(),
                    Some(indexer(&cfg)),
                    connector.read_only(),
                )
            },
        }
        .with_connector(connector.clone());

        Ok(Self {
            cfg,
            connector,
            service: Arc::new(service),
        })
    }
}

fn indexer(cfg: &Config) -> IndexerClient {
    IndexerClient::with_timeout(&cfg.graph_api_endpoint, cfg.indexer_timeout())
}
