use {
    alloy::primitives::{address, Address},
    std::time::Duration,
};

/// The Nouns DAO governor proxy on Ethereum mainnet.
pub const NOUNS_DAO: Address = address!("0x6f3E6272A167e8AcCb32072d08E0957F9c79223d");

/// The Nouns ERC-721 token.
pub const NOUNS_TOKEN: Address = address!("0x9C8fF314C9Bc7F6e59A9d9225Fb22946427eDC03");

/// The timelock that executes passed proposals.
pub const NOUNS_EXECUTOR: Address = address!("0x0BC3807Ec262cB779b38D65b38158acC3bfedE10");

pub const MAINNET_CHAIN_ID: u64 = 1;

/// Average mainnet block interval. Time estimates derived from block counts
/// are approximate; reconfigure this when pointing at another chain.
pub const BLOCK_TIME: Duration = Duration::from_secs(12);

pub const DEFAULT_RPC_ENDPOINT: &str = "https://cloudflare-eth.com";

pub const DEFAULT_GRAPH_ENDPOINT: &str =
    "https://api.thegraph.com/subgraphs/name/nounsdao/nouns-subgraph";

/// Time budget for a single indexer request.
pub const QUERY_TIMEOUT: Duration = Duration::from_secs(10);

/// Number of most recent proposal ids read when falling back to the contract.
pub const DEFAULT_FALLBACK_WINDOW: u64 = 20;

/// Number of proposals requested from the indexer per fetch.
pub const DEFAULT_PAGE_SIZE: u32 = 50;

/// Minimum voting power needed before a proposal submission is attempted.
pub const MIN_PROPOSAL_VOTING_POWER: f64 = 1.0;
