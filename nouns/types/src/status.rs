use {
    serde::{Deserialize, Serialize},
    std::{fmt, str::FromStr},
    strum_macros::{Display, EnumString},
};

/// Lifecycle status of a proposal.
///
/// The contract reports a numeric state code (see
/// [`state_code_to_status`](crate::state_code_to_status)); the indexer reports
/// an upper case string. Both end up here.
#[derive(
    Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display,
    EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum ProposalStatus {
    Pending,
    Active,
    #[strum(to_string = "canceled", serialize = "cancelled")]
    Canceled,
    Defeated,
    Succeeded,
    Queued,
    Expired,
    Executed,
    Unknown,
}

impl ProposalStatus {
    pub const ALL: [ProposalStatus; 9] = [
        ProposalStatus::Pending,
        ProposalStatus::Active,
        ProposalStatus::Canceled,
        ProposalStatus::Defeated,
        ProposalStatus::Succeeded,
        ProposalStatus::Queued,
        ProposalStatus::Expired,
        ProposalStatus::Executed,
        ProposalStatus::Unknown,
    ];

    /// Interpret a status string reported by an external source. Anything
    /// unrecognized becomes `Unknown`.
    pub fn from_reported(reported: &str) -> Self {
        reported
            .trim()
            .to_lowercase()
            .parse()
            .unwrap_or(ProposalStatus::Unknown)
    }

    /// Capitalized label for display, e.g. `Active`.
    pub const fn label(self) -> &'static str {
        match self {
            ProposalStatus::Pending => "Pending",
            ProposalStatus::Active => "Active",
            ProposalStatus::Canceled => "Canceled",
            ProposalStatus::Defeated => "Defeated",
            ProposalStatus::Succeeded => "Succeeded",
            ProposalStatus::Queued => "Queued",
            ProposalStatus::Expired => "Expired",
            ProposalStatus::Executed => "Executed",
            ProposalStatus::Unknown => "Unknown",
        }
    }
}

/// The direction of a vote, encoded the way the governor contract expects.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum VoteSupport {
    Against = 0,
    For = 1,
    Abstain = 2,
}

impl VoteSupport {
    pub const fn code(self) -> u8 {
        self as u8
    }
}

impl TryFrom<u8> for VoteSupport {
    type Error = InvalidVoteSupport;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(VoteSupport::Against),
            1 => Ok(VoteSupport::For),
            2 => Ok(VoteSupport::Abstain),
            _ => Err(InvalidVoteSupport(code.to_string())),
        }
    }
}

impl FromStr for VoteSupport {
    type Err = InvalidVoteSupport;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "against" | "0" => Ok(VoteSupport::Against),
            "for" | "1" => Ok(VoteSupport::For),
            "abstain" | "2" => Ok(VoteSupport::Abstain),
            other => Err(InvalidVoteSupport(other.to_string())),
        }
    }
}

impl fmt::Display for VoteSupport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VoteSupport::Against => f.write_str("against"),
            VoteSupport::For => f.write_str("for"),
            VoteSupport::Abstain => f.write_str("abstain"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidVoteSupport(pub String);

impl fmt::Display for InvalidVoteSupport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "invalid vote support `{}`: expecting for, against, or abstain",
            self.0
        )
    }
}

impl std::error::Error for InvalidVoteSupport {}

// ----------------------------------- tests -----------------------------------

#[cfg(test)]
mod tests {
    use {super::*, test_case::test_case};

    #[test_case("ACTIVE" => ProposalStatus::Active; "upper case")]
    #[test_case("executed" => ProposalStatus::Executed; "lower case")]
    #[test_case("CANCELLED" => ProposalStatus::Canceled; "subgraph spelling")]
    #[test_case("canceled" => ProposalStatus::Canceled; "contract spelling")]
    #[test_case("VETOED" => ProposalStatus::Unknown; "status outside the model")]
    #[test_case("" => ProposalStatus::Unknown; "empty")]
    fn interpreting_reported_status(reported: &str) -> ProposalStatus {
        ProposalStatus::from_reported(reported)
    }

    #[test]
    fn display_is_lower_case_and_label_is_capitalized() {
        assert_eq!(ProposalStatus::Canceled.to_string(), "canceled");
        assert_eq!(ProposalStatus::Canceled.label(), "Canceled");
        assert_eq!(
            serde_json::to_string(&ProposalStatus::Active).unwrap(),
            "\"active\""
        );
    }

    #[test_case("for" => Ok(VoteSupport::For))]
    #[test_case("Against" => Ok(VoteSupport::Against))]
    #[test_case("2" => Ok(VoteSupport::Abstain))]
    #[test_case("maybe" => Err(InvalidVoteSupport("maybe".to_string())))]
    fn parsing_vote_support(s: &str) -> Result<VoteSupport, InvalidVoteSupport> {
        s.parse()
    }

    #[test]
    fn vote_support_codes_match_the_contract() {
        for code in 0..3u8 {
            assert_eq!(VoteSupport::try_from(code).unwrap().code(), code);
        }
        assert!(VoteSupport::try_from(3).is_err());
    }
}
