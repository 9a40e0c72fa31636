use {
    alloy::primitives::Address,
    nouns_types::{NounsOwned, Proposal, ProposalStatus, Vote},
    serde::Serialize,
    std::collections::BTreeMap,
};

/// Number of proposals read from the indexer for stats.
pub const STATS_SAMPLE_SIZE: u32 = 100;

/// Number of proposals read from the contract when the indexer is out.
pub const STATS_FALLBACK_WINDOW: u64 = 10;

/// Length of the recent activity and voting history lists.
pub const RECENT_LIMIT: usize = 10;

#[derive(Serialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DaoStats {
    pub total_proposals: u64,
    pub active_proposals: usize,
    pub status_breakdown: BTreeMap<ProposalStatus, usize>,
    pub recent_activity: Vec<Proposal>,
    pub account: Option<AccountStats>,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AccountStats {
    pub address: Address,
    pub voting_power: f64,
    pub nouns_owned: NounsOwned,
    pub voting_history: Vec<Vote>,
}

impl DaoStats {
    /// Summarize a newest-first sample of proposals. `total` is the number of
    /// proposals in the DAO, which may exceed the sample.
    pub fn from_sample(total: u64, sample: &[Proposal]) -> Self {
        let mut status_breakdown = BTreeMap::new();
        for proposal in sample {
            *status_breakdown.entry(proposal.status).or_insert(0) += 1;
        }

        Self {
            total_proposals: total,
            active_proposals: status_breakdown
                .get(&ProposalStatus::Active)
                .copied()
                .unwrap_or(0),
            status_breakdown,
            recent_activity: sample.iter().take(RECENT_LIMIT).cloned().collect(),
            account: None,
        }
    }
}

// ----------------------------------- tests -----------------------------------

#[cfg(test)]
mod tests {
    use {super::*, assertor::*};

    #[test]
    fn summarizing_a_sample() {
        let sample = (1..=12)
            .rev()
            .map(|id| Proposal {
                status: if id % 3 == 0 {
                    ProposalStatus::Active
                } else {
                    ProposalStatus::Executed
                },
                ..Proposal::new(id)
            })
            .collect::<Vec<_>>();

        let stats = DaoStats::from_sample(300, &sample);

        assert_that!(stats.total_proposals).is_equal_to(300);
        assert_that!(stats.active_proposals).is_equal_to(4);
        assert_that!(stats.status_breakdown.get(&ProposalStatus::Executed).copied())
            .is_equal_to(Some(8));
        assert_that!(stats.recent_activity).has_length(RECENT_LIMIT);
        assert_that!(stats.recent_activity[0].id).is_equal_to(12);
    }
}
