use {
    crate::ValidationError,
    nouns_contract_client::{ContractError, ContractReadError},
    nouns_indexer_client::QueryError,
    nouns_types::VoteSupport,
    thiserror::Error,
};

#[derive(Error, Debug)]
pub enum GovernanceError {
    #[error(transparent)]
    Query(#[from] QueryError),

    #[error(transparent)]
    Read(#[from] ContractReadError),

    #[error(transparent)]
    Contract(#[from] ContractError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("failed to fetch proposals from every source: {0}")]
    AllSourcesFailed(String),

    #[error("no proposal source is configured")]
    NoSources,

    #[error("the indexer is disabled; {0} needs it")]
    IndexerDisabled(&'static str),

    #[error("a `{support}` vote on proposal {proposal_id} is already in flight")]
    VoteInFlight {
        proposal_id: u64,
        support: VoteSupport,
    },

    #[error("the wallet session changed before the request completed")]
    StaleSession,

    #[error("invalid account address `{0}`")]
    InvalidAddress(String),

    #[error("proposal {0} not found")]
    ProposalNotFound(u64),
}
