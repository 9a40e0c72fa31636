use {
    crate::VoteSupport,
    serde::{Deserialize, Serialize},
};

/// A single vote as recorded by the indexer.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Vote {
    pub id: String,
    pub support: VoteSupport,
    /// Number of votes cast, i.e. the voter's weight at the proposal's
    /// snapshot block.
    pub votes: u64,
    pub voter: String,
    pub block_number: u64,
    pub reason: Option<String>,
    /// Only filled by voter-history queries.
    pub proposal: Option<VotedProposal>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct VotedProposal {
    pub id: u64,
    pub description: String,
}

/// An account's voting weight at a block. Recomputed on demand.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct VotingPower {
    /// `None` means the latest block at the time of the read.
    pub block: Option<u64>,
    pub votes: f64,
}

impl VotingPower {
    pub const ZERO: Self = Self {
        block: None,
        votes: 0.0,
    };
}

/// Tokens held by an account.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct NounsOwned {
    pub count: u64,
    pub token_ids: Vec<u64>,
}
