use {
    crate::GovernanceError,
    async_trait::async_trait,
    nouns_contract_client::GovernanceContract,
    nouns_indexer_client::{IndexerClient, OrderDirection, ProposalOrderBy},
    nouns_types::{blocks_remaining, estimate_duration, format_time_left, Proposal},
    std::{sync::Arc, time::Duration},
    tracing::{debug, warn},
};

/// Description given to proposals read from the contract, which stores no
/// text.
pub const ON_CHAIN_DESCRIPTION: &str = "On-chain proposal data";

/// A place proposals can be listed from.
#[async_trait]
pub trait ProposalSource: Send + Sync {
    fn name(&self) -> &'static str;

    /// The most recent proposals, newest first.
    async fn fetch(&self) -> Result<Vec<Proposal>, GovernanceError>;
}

pub struct IndexedSource {
    client: IndexerClient,
    page_size: u32,
}

impl IndexedSource {
    pub fn new(client: IndexerClient, page_size: u32) -> Self {
        Self { client, page_size }
    }
}

#[async_trait]
impl ProposalSource for IndexedSource {
    fn name(&self) -> &'static str {
        "indexer"
    }

    async fn fetch(&self) -> Result<Vec<Proposal>, GovernanceError> {
        let proposals = self
            .client
            .get_proposals(
                self.page_size,
                0,
                ProposalOrderBy::CreatedTimestamp,
                OrderDirection::Desc,
            )
            .await?;

        Ok(proposals)
    }
}

/// Reads the most recent `window` proposal ids straight from the governor.
pub struct OnChainSource {
    contract: GovernanceContract,
    window: u64,
    block_time: Duration,
}

impl OnChainSource {
    pub fn new(contract: GovernanceContract, window: u64, block_time: Duration) -> Self {
        Self {
            contract,
            window,
            block_time,
        }
    }

    /// The inclusive id range covered for a given proposal count.
    pub fn id_range(count: u64, window: u64) -> Option<(u64, u64)> {
        if count == 0 {
            return None;
        }

        Some((count.saturating_sub(window).max(1), count))
    }

    /// The proposal count along with the proposals in the window.
    pub async fn fetch_with_count(&self) -> Result<(u64, Vec<Proposal>), GovernanceError> {
        let count = self.contract.get_proposal_count().await?;

        let Some((start, end)) = Self::id_range(count, self.window) else {
            return Ok((count, vec![]));
        };

        let results = self.contract.get_proposals(start, end).await;
        let requested = results.len();

        let mut proposals = results
            .into_iter()
            .filter_map(|(proposal_id, result)| match result {
                Ok(proposal) => Some(proposal),
                Err(err) => {
                    warn!(proposal_id, error = %err, "Dropping unreadable proposal");
                    None
                },
            })
            .map(|proposal| present_on_chain(proposal, self.block_time))
            .collect::<Vec<_>>();

        if proposals.len() < requested {
            warn!(
                dropped = requested - proposals.len(),
                requested,
                "Dropped unreadable proposals from the on-chain range"
            );
        }

        proposals.reverse();

        Ok((count, proposals))
    }
}

#[async_trait]
impl ProposalSource for OnChainSource {
    fn name(&self) -> &'static str {
        "contract"
    }

    async fn fetch(&self) -> Result<Vec<Proposal>, GovernanceError> {
        self.fetch_with_count().await.map(|(_, proposals)| proposals)
    }
}

/// Fill in what a contract read lacks: the placeholder description and the
/// time left, estimated from the chain height seen by the read.
pub(crate) fn present_on_chain(mut proposal: Proposal, block_time: Duration) -> Proposal {
    proposal.description = ON_CHAIN_DESCRIPTION.to_string();

    if let Some(on_chain) = proposal.on_chain {
        let blocks = blocks_remaining(on_chain.current_block, proposal.end_block);
        proposal.time_left = Some(format_time_left(estimate_duration(blocks, block_time)));
    }

    proposal
}

/// The proposals a policy settled on and where they came from.
#[derive(Debug, Clone)]
pub struct Fetched {
    pub source: &'static str,
    pub proposals: Vec<Proposal>,
}

/// Tries each source in order until one returns proposals.
#[derive(Clone)]
pub struct SourcePolicy {
    sources: Vec<Arc<dyn ProposalSource>>,
}

impl SourcePolicy {
    pub fn new(sources: Vec<Arc<dyn ProposalSource>>) -> Self {
        Self { sources }
    }

    pub fn source_names(&self) -> Vec<&'static str> {
        self.sources.iter().map(|source| source.name()).collect()
    }

    /// An empty list moves on to the next source. It is only returned when no
    /// source had anything and at least one answered without error.
    pub async fn fetch(&self) -> Result<Fetched, GovernanceError> {
        if self.sources.is_empty() {
            return Err(GovernanceError::NoSources);
        }

        let mut causes = Vec::with_capacity(self.sources.len());
        let mut empty = None;

        for source in &self.sources {
            match source.fetch().await {
                Ok(proposals) if !proposals.is_empty() => {
                    debug!(
                        source = source.name(),
                        count = proposals.len(),
                        "Fetched proposals"
                    );

                    return Ok(Fetched {
                        source: source.name(),
                        proposals,
                    });
                },
                Ok(_) => {
                    warn!(source = source.name(), "Source returned no proposals");
                    empty.get_or_insert(source.name());
                },
                Err(err) => {
                    warn!(source = source.name(), error = %err, "Source failed");
                    causes.push(format!("{}: {err}", source.name()));
                },
            }
        }

        match empty {
            Some(source) => Ok(Fetched {
                source,
                proposals: vec![],
            }),
            None => Err(GovernanceError::AllSourcesFailed(causes.join("; "))),
        }
    }
}

// ----------------------------------- tests -----------------------------------

#[cfg(test)]
mod tests {
    use {super::*, test_case::test_case};

    #[test_case(0, 20 => None; "no proposals")]
    #[test_case(5, 20 => Some((1, 5)); "fewer than the window")]
    #[test_case(20, 20 => Some((1, 20)); "exactly the window")]
    #[test_case(300, 20 => Some((280, 300)); "window plus the latest id")]
    fn on_chain_window(count: u64, window: u64) -> Option<(u64, u64)> {
        OnChainSource::id_range(count, window)
    }
}
