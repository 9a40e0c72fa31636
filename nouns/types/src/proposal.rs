use {
    crate::{derive_title, ProposalStatus, Vote},
    chrono::{DateTime, Utc},
    serde::{Deserialize, Serialize},
};

/// A governance proposal in canonical form, regardless of which source
/// produced it.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Proposal {
    pub id: u64,
    pub proposer: String,
    pub title: String,
    pub description: String,
    pub status: ProposalStatus,
    pub created_at: Option<DateTime<Utc>>,
    pub start_block: u64,
    pub end_block: u64,
    /// Tallies in whole token units.
    pub for_votes: f64,
    pub against_votes: f64,
    pub abstain_votes: f64,
    pub canceled: bool,
    pub executed: bool,
    #[serde(default)]
    pub targets: Vec<String>,
    #[serde(default)]
    pub values: Vec<String>,
    #[serde(default)]
    pub signatures: Vec<String>,
    #[serde(default)]
    pub calldatas: Vec<String>,
    #[serde(default)]
    pub votes: Vec<Vote>,
    pub created_transaction_hash: Option<String>,
    pub executed_transaction_hash: Option<String>,
    /// Present only when the proposal was read straight from the contract.
    pub on_chain: Option<OnChainState>,
    /// Estimated time until voting closes. Recomputed on every fetch.
    pub time_left: Option<String>,
}

/// Values derived from the contract's numeric state and the chain height at
/// the time of the read.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct OnChainState {
    pub state_code: u8,
    pub current_block: u64,
    pub is_active: bool,
    pub has_ended: bool,
}

impl Proposal {
    /// An empty proposal with the given id. The title is the placeholder
    /// [`derive_title`] produces for an empty description.
    pub fn new(id: u64) -> Self {
        Self {
            id,
            proposer: String::new(),
            title: derive_title(id, ""),
            description: String::new(),
            status: ProposalStatus::Unknown,
            created_at: None,
            start_block: 0,
            end_block: 0,
            for_votes: 0.0,
            against_votes: 0.0,
            abstain_votes: 0.0,
            canceled: false,
            executed: false,
            targets: vec![],
            values: vec![],
            signatures: vec![],
            calldatas: vec![],
            votes: vec![],
            created_transaction_hash: None,
            executed_transaction_hash: None,
            on_chain: None,
            time_left: None,
        }
    }

    /// Sum of all three tallies. Never stored, always recomputed.
    pub fn total_votes(&self) -> f64 {
        self.for_votes + self.against_votes + self.abstain_votes
    }

    pub fn is_active(&self) -> bool {
        match self.on_chain {
            Some(state) => state.is_active,
            None => self.status == ProposalStatus::Active,
        }
    }

    /// `None` when the source carried no block height to compare against.
    pub fn has_ended(&self) -> Option<bool> {
        self.on_chain.map(|state| state.has_ended)
    }

    pub fn with_time_left(mut self, time_left: String) -> Self {
        self.time_left = Some(time_left);
        self
    }

    /// Equality on everything except `time_left`, which depends on when the
    /// proposal was fetched.
    pub fn same_content(&self, other: &Self) -> bool {
        Self {
            time_left: None,
            ..self.clone()
        } == Self {
            time_left: None,
            ..other.clone()
        }
    }
}

// ----------------------------------- tests -----------------------------------

#[cfg(test)]
mod tests {
    use {super::*, assertor::*};

    #[test]
    fn total_votes_is_the_sum_of_tallies() {
        let proposal = Proposal {
            for_votes: 5.0,
            against_votes: 2.5,
            abstain_votes: 1.0,
            ..Proposal::new(3)
        };

        assert_that!(proposal.total_votes()).is_equal_to(8.5);
        assert_that!(proposal.total_votes()).is_equal_to(proposal.total_votes());
    }

    #[test]
    fn activity_prefers_on_chain_state() {
        let reported = Proposal {
            status: ProposalStatus::Active,
            ..Proposal::new(1)
        };
        assert!(reported.is_active());
        assert_that!(reported.has_ended()).is_none();

        let derived = Proposal {
            status: ProposalStatus::Active,
            on_chain: Some(OnChainState {
                state_code: 1,
                current_block: 200,
                is_active: false,
                has_ended: true,
            }),
            ..Proposal::new(1)
        };
        assert!(!derived.is_active());
        assert_that!(derived.has_ended()).is_equal_to(Some(true));
    }

    #[test]
    fn same_content_ignores_time_left() {
        let a = Proposal::new(9).with_time_left("1d 2h".to_string());
        let b = Proposal::new(9).with_time_left("1d 1h".to_string());
        let c = Proposal {
            for_votes: 1.0,
            ..Proposal::new(9)
        };

        assert!(a.same_content(&b));
        assert!(!a.same_content(&c));
    }

    #[test]
    fn serializes_in_camel_case() {
        let json = serde_json::to_value(Proposal::new(4)).unwrap();

        assert_that!(json["startBlock"].as_u64()).is_equal_to(Some(0));
        assert_that!(json["title"].as_str()).is_equal_to(Some("Proposal 4"));
    }
}
