use {
    crate::{
        get_proposal, get_proposal_votes, get_proposals, get_proposals_by_status, get_voter_stats,
        normalize_proposal, normalize_proposals, normalize_votes, search_proposals,
        OrderDirection, ProposalOrderBy, QueryError, Variables,
    },
    graphql_client::{GraphQLQuery, Response},
    nouns_types::{constants::QUERY_TIMEOUT, Proposal, ProposalStatus, Vote},
    serde::Serialize,
    std::time::Duration,
    tracing::{debug, warn},
};

/// Client for the Nouns subgraph.
#[derive(Debug, Clone)]
pub struct IndexerClient {
    inner: reqwest::Client,
    endpoint: String,
    timeout: Duration,
}

impl IndexerClient {
    pub fn new(endpoint: &str) -> Self {
        Self::with_timeout(endpoint, QUERY_TIMEOUT)
    }

    pub fn with_timeout(endpoint: &str, timeout: Duration) -> Self {
        Self {
            inner: reqwest::Client::new(),
            endpoint: endpoint.to_string(),
            timeout,
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn post_graphql<V>(
        &self,
        variables: V,
    ) -> Result<<V::Query as GraphQLQuery>::ResponseData, QueryError>
    where
        V: Variables + Serialize,
    {
        let query = V::Query::build_query(variables);

        debug!(operation = query.operation_name, "Sending indexer query");

        let response = self
            .inner
            .post(&self.endpoint)
            .timeout(self.timeout)
            .json(&query)
            .send()
            .await
            .map_err(|err| self.classify(err))?;

        let status = response.status();
        if !status.is_success() {
            return Err(QueryError::Status(status));
        }

        let bytes = response.bytes().await.map_err(|err| self.classify(err))?;

        let body: Response<<V::Query as GraphQLQuery>::ResponseData> =
            serde_json::from_slice(&bytes).map_err(|err| QueryError::Malformed(err.to_string()))?;

        match body.data {
            Some(data) => Ok(data),
            None => Err(QueryError::GraphQl(format!("{:?}", body.errors))),
        }
    }

    fn classify(&self, err: reqwest::Error) -> QueryError {
        if err.is_timeout() {
            QueryError::Timeout(self.timeout)
        } else {
            QueryError::Transport(err)
        }
    }

    /// One page of proposals.
    pub async fn get_proposals(
        &self,
        limit: u32,
        offset: u32,
        order_by: ProposalOrderBy,
        order_direction: OrderDirection,
    ) -> Result<Vec<Proposal>, QueryError> {
        let response = self
            .post_graphql(get_proposals::Variables {
                first: limit.into(),
                skip: offset.into(),
                order_by,
                order_direction,
            })
            .await?;

        Ok(normalize_proposals(response.proposals))
    }

    /// `Ok(None)` means the indexer has no such proposal.
    pub async fn get_proposal(&self, proposal_id: u64) -> Result<Option<Proposal>, QueryError> {
        let response = self
            .post_graphql(get_proposal::Variables {
                id: proposal_id.to_string(),
            })
            .await?;

        Ok(response.proposal.and_then(normalize_proposal))
    }

    pub async fn get_proposals_by_status(
        &self,
        status: ProposalStatus,
        limit: u32,
    ) -> Result<Vec<Proposal>, QueryError> {
        let response = self
            .post_graphql(get_proposals_by_status::Variables {
                status: subgraph_status(status),
                first: limit.into(),
            })
            .await?;

        Ok(normalize_proposals(response.proposals))
    }

    pub async fn get_proposal_votes(
        &self,
        proposal_id: u64,
        limit: u32,
    ) -> Result<Vec<Vote>, QueryError> {
        let response = self
            .post_graphql(get_proposal_votes::Variables {
                proposal_id: proposal_id.to_string(),
                first: limit.into(),
            })
            .await?;

        Ok(normalize_votes(response.votes))
    }

    /// Voting history of an account, newest first.
    ///
    /// Only ever used to enrich other data, so failures degrade to an empty
    /// history instead of an error.
    pub async fn get_voter_stats(&self, address: &str) -> Vec<Vote> {
        let result = self
            .post_graphql(get_voter_stats::Variables {
                voter: address.to_lowercase(),
            })
            .await;

        match result {
            Ok(response) => normalize_votes(response.votes),
            Err(err) => {
                warn!(address, error = %err, "Failed to fetch voter history, using empty history");
                vec![]
            },
        }
    }

    /// Case-insensitive search over proposal descriptions. Failures degrade to
    /// no results.
    pub async fn search_proposals(&self, term: &str, limit: u32) -> Vec<Proposal> {
        let result = self
            .post_graphql(search_proposals::Variables {
                search_term: term.to_string(),
                first: limit.into(),
            })
            .await;

        match result {
            Ok(response) => normalize_proposals(response.proposals),
            Err(err) => {
                warn!(term, error = %err, "Proposal search failed, returning no results");
                vec![]
            },
        }
    }

    /// Check that the endpoint answers proposal queries. Returns the number of
    /// proposals seen.
    pub async fn ping(&self) -> Result<usize, QueryError> {
        self.get_proposals(1, 0, ProposalOrderBy::default(), OrderDirection::default())
            .await
            .map(|proposals| proposals.len())
    }
}

/// The subgraph's `ProposalStatus` enum is upper case and spells canceled
/// with two Ls.
pub fn subgraph_status(status: ProposalStatus) -> String {
    match status {
        ProposalStatus::Canceled => "CANCELLED".to_string(),
        other => other.to_string().to_uppercase(),
    }
}

// ----------------------------------- tests -----------------------------------
