use {
    alloy::{primitives::TxHash, providers::PendingTransactionError, transports::TransportError},
    thiserror::Error,
};

/// Error code wallets use when the user declines a request (EIP-1193).
pub const USER_REJECTED_CODE: i64 = 4001;

/// Failure of a read against the node.
#[derive(Error, Debug)]
pub enum ContractReadError {
    #[error("invalid endpoint `{endpoint}`: {reason}")]
    InvalidEndpoint { endpoint: String, reason: String },

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("failed to watch transaction: {0}")]
    Watch(#[from] PendingTransactionError),

    #[error("JSON-RPC error {code}: {message}")]
    Rpc { code: i64, message: String },

    #[error("call reverted: {0}")]
    Reverted(String),

    #[error("failed to decode {what}: {reason}")]
    Decode { what: &'static str, reason: String },
}

impl ContractReadError {
    pub fn decode<E>(what: &'static str, err: E) -> Self
    where
        E: ToString,
    {
        Self::Decode {
            what,
            reason: err.to_string(),
        }
    }
}

/// Failure of a state-changing call.
#[derive(Error, Debug)]
pub enum ContractError {
    #[error("no signer available - wallet not connected")]
    NoSigner,

    #[error("transaction was rejected by user")]
    UserRejected,

    #[error("{0}")]
    Revert(RevertKind),

    #[error("transaction {0} was mined but reverted")]
    FailedOnChain(TxHash),

    #[error(transparent)]
    Read(#[from] ContractReadError),
}

/// Contract reverts the user can act on, recognized from the node's message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RevertKind {
    AlreadyVoted,
    VotingClosed,
    BelowProposalThreshold,
    Other(String),
}

impl RevertKind {
    pub fn from_message(message: &str) -> Self {
        if message.contains("already voted") {
            Self::AlreadyVoted
        } else if message.contains("voting is closed") {
            Self::VotingClosed
        } else if message.contains("proposer votes below proposal threshold") {
            Self::BelowProposalThreshold
        } else {
            Self::Other(message.to_string())
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Self::AlreadyVoted => "You have already voted on this proposal",
            Self::VotingClosed => "Voting period has ended for this proposal",
            Self::BelowProposalThreshold => "You need at least 1 Noun to create a proposal",
            Self::Other(raw) => raw,
        }
    }
}

impl std::fmt::Display for RevertKind {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.write_str(self.message())
    }
}

impl ContractError {
    /// Classify an error object returned by a wallet or node for a write.
    pub fn from_rpc(code: i64, message: &str) -> Self {
        if code == USER_REJECTED_CODE {
            Self::UserRejected
        } else {
            Self::Revert(RevertKind::from_message(message))
        }
    }

    /// Whether the error is the user's own decision rather than a fault.
    pub fn is_user_rejection(&self) -> bool {
        matches!(self, Self::UserRejected)
    }
}

// ----------------------------------- tests -----------------------------------
