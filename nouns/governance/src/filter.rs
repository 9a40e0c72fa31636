use {
    nouns_types::{Proposal, ProposalStatus},
    std::cmp::Ordering,
    strum_macros::{Display, EnumString},
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "kebab-case")]
pub enum SortOrder {
    #[default]
    Newest,
    Oldest,
    MostVotes,
    EndingSoon,
}

/// Client-side narrowing of a proposal snapshot for browsing.
#[derive(Debug, Clone, Default)]
pub struct ProposalFilter {
    /// Case-insensitive match against title, description and proposer.
    pub search: Option<String>,
    pub status: Option<ProposalStatus>,
    pub sort: SortOrder,
}

impl ProposalFilter {
    pub fn matches(&self, proposal: &Proposal) -> bool {
        let matches_search = match &self.search {
            Some(term) if !term.is_empty() => {
                let term = term.to_lowercase();
                [&proposal.title, &proposal.description, &proposal.proposer]
                    .iter()
                    .any(|field| field.to_lowercase().contains(&term))
            },
            _ => true,
        };

        let matches_status = self
            .status
            .map_or(true, |status| proposal.status == status);

        matches_search && matches_status
    }

    pub fn apply(&self, proposals: &[Proposal]) -> Vec<Proposal> {
        let mut filtered = proposals
            .iter()
            .filter(|proposal| self.matches(proposal))
            .cloned()
            .collect::<Vec<_>>();

        // Stable, so ties keep the snapshot's order.
        filtered.sort_by(|a, b| match self.sort {
            SortOrder::Newest => b.created_at.cmp(&a.created_at),
            SortOrder::Oldest => a.created_at.cmp(&b.created_at),
            SortOrder::MostVotes => b
                .total_votes()
                .partial_cmp(&a.total_votes())
                .unwrap_or(Ordering::Equal),
            SortOrder::EndingSoon => a.end_block.cmp(&b.end_block),
        });

        filtered
    }
}

// ----------------------------------- tests -----------------------------------
