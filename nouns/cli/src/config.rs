use {
    alloy::primitives::Address,
    config::{Environment, File},
    nouns_governance::ServiceConfig,
    nouns_types::constants,
    serde::{Deserialize, Serialize},
    std::{path::PathBuf, time::Duration},
};

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default)]
pub struct Config {
    pub log_level: String,
    pub eth_rpc_endpoint: String,
    pub graph_api_endpoint: String,
    pub use_graph_api: bool,
    pub auto_refresh: bool,
    pub refresh_interval_secs: u64,
    pub fallback_window: u64,
    pub contracts: ContractsConfig,
    pub chain: ChainConfig,
    pub indexer: IndexerConfig,
    pub wallet: WalletConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            eth_rpc_endpoint: constants::DEFAULT_RPC_ENDPOINT.to_string(),
            graph_api_endpoint: constants::DEFAULT_GRAPH_ENDPOINT.to_string(),
            use_graph_api: true,
            auto_refresh: true,
            refresh_interval_secs: 60,
            fallback_window: constants::DEFAULT_FALLBACK_WINDOW,
            contracts: ContractsConfig::default(),
            chain: ChainConfig::default(),
            indexer: IndexerConfig::default(),
            wallet: WalletConfig::default(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default)]
pub struct ContractsConfig {
    pub dao: Address,
    pub token: Address,
}

impl Default for ContractsConfig {
    fn default() -> Self {
        Self {
            dao: constants::NOUNS_DAO,
            token: constants::NOUNS_TOKEN,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default)]
pub struct ChainConfig {
    pub expected_chain_id: u64,
    /// Assumed average block interval, used for time estimates only.
    pub block_time_secs: u64,
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            expected_chain_id: constants::MAINNET_CHAIN_ID,
            block_time_secs: constants::BLOCK_TIME.as_secs(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default)]
pub struct IndexerConfig {
    pub timeout_secs: u64,
    pub page_size: u32,
}

impl Default for IndexerConfig {
    fn default() -> Self {
        Self {
            timeout_secs: constants::QUERY_TIMEOUT.as_secs(),
            page_size: constants::DEFAULT_PAGE_SIZE,
        }
    }
}

/// A JSON-RPC wallet that signs on the user's behalf, e.g. a local signing
/// daemon. Without an endpoint the client is read-only.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct WalletConfig {
    pub endpoint: Option<String>,
    /// Account to sign with [default: the wallet's first account]
    pub account: Option<Address>,
}

impl Config {
    pub fn service_config(&self) -> ServiceConfig {
        ServiceConfig {
            use_graph_api: self.use_graph_api,
            auto_refresh: self.auto_refresh,
            page_size: self.indexer.page_size,
            fallback_window: self.fallback_window,
            expected_chain_id: self.chain.expected_chain_id,
            dao: self.contracts.dao,
            token: self.contracts.token,
            block_time: Duration::from_secs(self.chain.block_time_secs),
        }
    }

    pub fn indexer_timeout(&self) -> Duration {
        Duration::from_secs(self.indexer.timeout_secs)
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_secs)
    }
}

/// Read the config file, if there is one, then apply environment overrides
/// such as `NOUNS_USE_GRAPH_API=false` or `NOUNS_WALLET__ENDPOINT=...`.
pub fn parse_config(path: PathBuf) -> anyhow::Result<Config> {
    let env_override = Environment::with_prefix("NOUNS")
        .prefix_separator("_")
        .separator("__");

    let config = config::Config::builder()
        .add_source(File::from(path).required(false))
        .add_source(env_override)
        .build()?;

    Ok(config.try_deserialize()?)
}

// ----------------------------------- tests -----------------------------------

#[cfg(test)]
mod tests {
    use {super::*, assertor::*, std::fs};

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();

        let cfg = parse_config(dir.path().join("app.toml")).unwrap();

        assert_that!(cfg.use_graph_api).is_true();
        assert_that!(cfg.fallback_window).is_equal_to(20);
        assert_that!(cfg.contracts.dao).is_equal_to(constants::NOUNS_DAO);
        assert_that!(cfg.service_config().block_time).is_equal_to(Duration::from_secs(12));
    }

    #[test]
    fn file_values_override_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("app.toml");
        fs::write(
            &path,
            r#"
            use_graph_api = false
            eth_rpc_endpoint = "http://localhost:8545"

            [indexer]
            page_size = 10

            [wallet]
            endpoint = "http://localhost:1248"
            account = "0x0BC3807Ec262cB779b38D65b38158acC3bfedE10"
            "#,
        )
        .unwrap();

        let cfg = parse_config(path).unwrap();

        assert_that!(cfg.use_graph_api).is_false();
        assert_that!(cfg.eth_rpc_endpoint.as_str()).is_equal_to("http://localhost:8545");
        assert_that!(cfg.indexer.page_size).is_equal_to(10);
        // Untouched fields of a partially written table keep their defaults.
        assert_that!(cfg.indexer.timeout_secs).is_equal_to(10);
        assert_that!(cfg.wallet.account).is_equal_to(Some(constants::NOUNS_EXECUTOR));
    }

    #[test]
    fn environment_overrides_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("app.toml");
        fs::write(&path, "fallback_window = 5\n").unwrap();

        std::env::set_var("NOUNS_CHAIN__EXPECTED_CHAIN_ID", "11155111");

        let cfg = parse_config(path).unwrap();

        assert_that!(cfg.fallback_window).is_equal_to(5);
        assert_that!(cfg.chain.expected_chain_id).is_equal_to(11_155_111);
    }
}
