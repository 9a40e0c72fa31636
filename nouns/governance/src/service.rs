use {
    crate::{
        source::present_on_chain, AccountStats, Connector, DaoStats, GovernanceError,
        IndexedSource, OnChainSource, ProposalDraft, ProposalFilter, ProposalSource,
        SessionMessage, SourcePolicy, WalletEvent, RECENT_LIMIT, STATS_FALLBACK_WINDOW,
        STATS_SAMPLE_SIZE,
    },
    alloy::primitives::{Address, TxHash},
    futures::future::join_all,
    nouns_contract_client::{
        ChainReader, ContractError, ContractReadError, GovernanceContract, TransactionReceipt,
        WalletSigner,
    },
    nouns_indexer_client::{IndexerClient, OrderDirection, ProposalOrderBy},
    nouns_types::{
        constants, NounsOwned, Proposal, ProposalStatus, Vote, VoteSupport, VotingPower,
    },
    std::{
        collections::HashSet,
        sync::{
            atomic::{AtomicU64, Ordering},
            Arc, Mutex as StdMutex, PoisonError,
        },
        time::Duration,
    },
    tokio::{
        sync::{mpsc, Mutex, RwLock},
        task::JoinHandle,
    },
    tracing::{debug, error, info, warn},
};

#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Prefer the indexer. When off, only the contract is read.
    pub use_graph_api: bool,
    /// Refresh proposals after every wallet session change.
    pub auto_refresh: bool,
    pub page_size: u32,
    /// Number of most recent ids read from the contract when falling back.
    pub fallback_window: u64,
    pub expected_chain_id: u64,
    pub dao: Address,
    pub token: Address,
    pub block_time: Duration,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            use_graph_api: true,
            auto_refresh: true,
            page_size: constants::DEFAULT_PAGE_SIZE,
            fallback_window: constants::DEFAULT_FALLBACK_WINDOW,
            expected_chain_id: constants::MAINNET_CHAIN_ID,
            dao: constants::NOUNS_DAO,
            token: constants::NOUNS_TOKEN,
            block_time: constants::BLOCK_TIME,
        }
    }
}

/// Where the proposal list stands.
#[derive(Debug, Clone, Default)]
pub enum FetchState {
    #[default]
    Idle,
    Loading,
    /// A refresh is running; the previous snapshot stays readable.
    Refreshing {
        previous: Arc<[Proposal]>,
    },
    Loaded(Arc<[Proposal]>),
    Failed(String),
}

impl FetchState {
    /// The latest snapshot, if any.
    pub fn proposals(&self) -> Option<&Arc<[Proposal]>> {
        match self {
            FetchState::Refreshing { previous } => Some(previous),
            FetchState::Loaded(proposals) => Some(proposals),
            _ => None,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, FetchState::Loading | FetchState::Refreshing { .. })
    }
}

/// Single entry point for reading and changing governance state.
///
/// Reads prefer the indexer and fall back to the contract. Every request
/// captures the session generation when it starts; a wallet event advances
/// the generation, and results of older requests are discarded.
pub struct GovernanceService {
    config: ServiceConfig,
    indexer: Option<IndexerClient>,
    connector: Option<Arc<dyn Connector>>,
    contract: RwLock<GovernanceContract>,
    state: Mutex<FetchState>,
    generation: AtomicU64,
    votes_in_flight: StdMutex<HashSet<(u64, VoteSupport)>>,
}

impl GovernanceService {
    pub fn new(
        config: ServiceConfig,
        indexer: Option<IndexerClient>,
        reader: Arc<dyn ChainReader>,
    ) -> Self {
        let contract = build_contract(&config, reader, None);

        Self {
            config,
            indexer,
            connector: None,
            contract: RwLock::new(contract),
            state: Mutex::new(FetchState::Idle),
            generation: AtomicU64::new(0),
            votes_in_flight: StdMutex::new(HashSet::new()),
        }
    }

    pub fn with_connector(mut self, connector: Arc<dyn Connector>) -> Self {
        self.connector = Some(connector);
        self
    }

    pub fn with_signer(mut self, signer: Arc<dyn WalletSigner>) -> Self {
        let contract = self.contract.get_mut();
        *contract = contract.clone().with_signer(signer);
        self
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    pub async fn state(&self) -> FetchState {
        self.state.lock().await.clone()
    }

    /// The connection of the current session.
    pub async fn contract(&self) -> GovernanceContract {
        self.contract.read().await.clone()
    }

    fn indexer(&self) -> Option<&IndexerClient> {
        self.indexer.as_ref().filter(|_| self.config.use_graph_api)
    }

    fn ensure_current(&self, generation: u64) -> Result<(), GovernanceError> {
        if self.generation() != generation {
            return Err(GovernanceError::StaleSession);
        }

        Ok(())
    }

    fn policy(&self, contract: GovernanceContract) -> SourcePolicy {
        let mut sources: Vec<Arc<dyn ProposalSource>> = Vec::with_capacity(2);

        if let Some(indexer) = self.indexer() {
            sources.push(Arc::new(IndexedSource::new(
                indexer.clone(),
                self.config.page_size,
            )));
        }

        sources.push(Arc::new(OnChainSource::new(
            contract,
            self.config.fallback_window,
            self.config.block_time,
        )));

        SourcePolicy::new(sources)
    }

    // ------------------------------- proposals -------------------------------

    /// Fetch the proposal list and make it the current snapshot.
    pub async fn fetch_proposals(&self) -> Result<Arc<[Proposal]>, GovernanceError> {
        let generation = {
            let mut state = self.state.lock().await;
            *state = match std::mem::take(&mut *state) {
                FetchState::Loaded(previous) | FetchState::Refreshing { previous } => {
                    FetchState::Refreshing { previous }
                },
                _ => FetchState::Loading,
            };
            self.generation()
        };

        let contract = self.contract().await;

        let result = match self.policy(contract.clone()).fetch().await {
            Ok(fetched) => {
                info!(
                    source = fetched.source,
                    count = fetched.proposals.len(),
                    "Fetched proposals"
                );
                Ok(enrich_time_left(&contract, fetched.proposals).await)
            },
            Err(err) => Err(err),
        };

        let mut state = self.state.lock().await;

        if self.generation() != generation {
            debug!(generation, "Discarding proposals fetched for a previous session");
            return Err(GovernanceError::StaleSession);
        }

        match result {
            Ok(proposals) => {
                let proposals: Arc<[Proposal]> = proposals.into();
                *state = FetchState::Loaded(proposals.clone());
                Ok(proposals)
            },
            Err(err) => {
                error!(error = %err, "Failed to fetch proposals");
                *state = FetchState::Failed(err.to_string());
                Err(err)
            },
        }
    }

    /// The current snapshot, fetching one if there is none yet.
    pub async fn snapshot(&self) -> Result<Arc<[Proposal]>, GovernanceError> {
        if let Some(proposals) = self.state.lock().await.proposals() {
            return Ok(proposals.clone());
        }

        self.fetch_proposals().await
    }

    pub async fn proposal(&self, proposal_id: u64) -> Result<Proposal, GovernanceError> {
        let generation = self.generation();
        let contract = self.contract().await;

        let indexed = match self.indexer() {
            Some(indexer) => indexer.get_proposal(proposal_id).await.unwrap_or_else(|err| {
                warn!(proposal_id, error = %err, "Indexer lookup failed, reading the contract");
                None
            }),
            None => None,
        };

        let proposal = match indexed {
            Some(proposal) => with_time_left(&contract, proposal).await,
            None => {
                let proposal = contract
                    .get_proposal(proposal_id)
                    .await
                    .map_err(|err| match err {
                        ContractReadError::Reverted(_) => {
                            GovernanceError::ProposalNotFound(proposal_id)
                        },
                        other => other.into(),
                    })?;
                present_on_chain(proposal, self.config.block_time)
            },
        };

        self.ensure_current(generation)?;

        Ok(proposal)
    }

    pub async fn proposal_votes(
        &self,
        proposal_id: u64,
        limit: u32,
    ) -> Result<Vec<Vote>, GovernanceError> {
        let indexer = self
            .indexer()
            .ok_or(GovernanceError::IndexerDisabled("listing votes"))?;

        Ok(indexer.get_proposal_votes(proposal_id, limit).await?)
    }

    pub async fn proposals_by_status(
        &self,
        status: ProposalStatus,
        limit: u32,
    ) -> Result<Vec<Proposal>, GovernanceError> {
        if let Some(indexer) = self.indexer() {
            match indexer.get_proposals_by_status(status, limit).await {
                Ok(proposals) => return Ok(proposals),
                Err(err) => {
                    warn!(%status, error = %err, "Indexer status query failed, filtering the snapshot");
                },
            }
        }

        let filter = ProposalFilter {
            status: Some(status),
            ..Default::default()
        };

        let mut proposals = filter.apply(&self.snapshot().await?);
        proposals.truncate(limit as usize);

        Ok(proposals)
    }

    /// Search descriptions through the indexer, or the snapshot when the
    /// indexer is disabled.
    pub async fn search(&self, term: &str, limit: u32) -> Result<Vec<Proposal>, GovernanceError> {
        if let Some(indexer) = self.indexer() {
            return Ok(indexer.search_proposals(term, limit).await);
        }

        let filter = ProposalFilter {
            search: Some(term.to_string()),
            ..Default::default()
        };

        let mut proposals = filter.apply(&self.snapshot().await?);
        proposals.truncate(limit as usize);

        Ok(proposals)
    }

    // -------------------------------- accounts -------------------------------

    pub async fn voting_power(&self, account: Address, block: Option<u64>) -> VotingPower {
        self.contract().await.get_voting_power(account, block).await
    }

    pub async fn nouns_owned(&self, account: Address) -> NounsOwned {
        self.contract().await.get_nouns_owned(account).await
    }

    pub async fn stats(&self, account: Option<&str>) -> Result<DaoStats, GovernanceError> {
        let account = account
            .map(|text| {
                text.parse::<Address>()
                    .map_err(|_| GovernanceError::InvalidAddress(text.to_string()))
            })
            .transpose()?;

        let generation = self.generation();
        let contract = self.contract().await;

        let indexed = match self.indexer() {
            Some(indexer) => {
                match indexer
                    .get_proposals(
                        STATS_SAMPLE_SIZE,
                        0,
                        ProposalOrderBy::CreatedTimestamp,
                        OrderDirection::Desc,
                    )
                    .await
                {
                    Ok(sample) if !sample.is_empty() => {
                        let total = sample.iter().map(|proposal| proposal.id).max().unwrap_or(0);
                        Some(DaoStats::from_sample(total, &sample))
                    },
                    Ok(_) => None,
                    Err(err) => {
                        warn!(error = %err, "Indexer stats failed, reading the contract");
                        None
                    },
                }
            },
            None => None,
        };

        let mut stats = match indexed {
            Some(stats) => stats,
            None => {
                let source = OnChainSource::new(
                    contract.clone(),
                    STATS_FALLBACK_WINDOW,
                    self.config.block_time,
                );
                let (count, sample) = source.fetch_with_count().await?;
                DaoStats::from_sample(count, &sample)
            },
        };

        if let Some(address) = account {
            let (voting_power, nouns_owned) = tokio::join!(
                contract.get_voting_power(address, None),
                contract.get_nouns_owned(address),
            );

            let voting_history = match self.indexer() {
                Some(indexer) => {
                    let mut votes = indexer.get_voter_stats(&address.to_string()).await;
                    votes.truncate(RECENT_LIMIT);
                    votes
                },
                None => vec![],
            };

            stats.account = Some(AccountStats {
                address,
                voting_power: voting_power.votes,
                nouns_owned,
                voting_history,
            });
        }

        self.ensure_current(generation)?;

        Ok(stats)
    }

    // --------------------------------- writes --------------------------------

    /// Cast a vote and wait for it to be mined, then refresh the proposals.
    ///
    /// `on_submitted` is called with the transaction hash as soon as the
    /// wallet has broadcast it. A second cast of the same proposal and support
    /// while the first is in flight fails with
    /// [`GovernanceError::VoteInFlight`] without reaching the wallet.
    pub async fn cast_vote<F>(
        &self,
        proposal_id: u64,
        support: VoteSupport,
        reason: Option<&str>,
        on_submitted: F,
    ) -> Result<TransactionReceipt, GovernanceError>
    where
        F: FnOnce(TxHash) + Send,
    {
        let generation = self.generation();
        let contract = self.contract().await;

        if contract.signer().is_none() {
            return Err(ContractError::NoSigner.into());
        }

        let _guard = VoteGuard::acquire(&self.votes_in_flight, proposal_id, support)?;

        let pending = contract.cast_vote(proposal_id, support, reason).await?;
        on_submitted(pending.hash());

        let receipt = pending.confirm().await?;

        // The vote is on chain either way; only the refresh belongs to the
        // session it was cast in.
        if self.generation() != generation {
            info!(proposal_id, "Session changed while voting, skipping refresh");
            return Ok(receipt);
        }

        if let Err(err) = self.fetch_proposals().await {
            warn!(error = %err, "Failed to refresh proposals after voting");
        }

        Ok(receipt)
    }

    /// Validate a draft, check the proposer's voting power, submit it and
    /// wait for it to be mined.
    pub async fn propose<F>(
        &self,
        draft: &ProposalDraft,
        on_submitted: F,
    ) -> Result<TransactionReceipt, GovernanceError>
    where
        F: FnOnce(TxHash) + Send,
    {
        let submission = draft.validate()?;
        let contract = self.contract().await;

        let account = contract.account().ok_or(ContractError::NoSigner)?;
        let voting_power = contract.get_voting_power(account, None).await;
        submission.ensure_eligible(voting_power.votes)?;

        let pending = contract
            .propose(
                submission.targets,
                submission.values,
                submission.signatures,
                submission.calldatas,
                submission.description,
            )
            .await?;
        on_submitted(pending.hash());

        Ok(pending.confirm().await?)
    }

    // -------------------------------- session --------------------------------

    /// Check the read provider's network against the expected one.
    pub async fn check_network(&self) -> Result<u64, GovernanceError> {
        let chain_id = self.contract().await.chain_id().await?;

        if chain_id != self.config.expected_chain_id {
            warn!(
                chain_id,
                expected = self.config.expected_chain_id,
                "Connected to an unexpected network"
            );
        }

        Ok(chain_id)
    }

    /// Apply a wallet session change: advance the generation and rebuild the
    /// connection.
    pub async fn handle_message(&self, message: SessionMessage) {
        let Some(connector) = self.connector.clone() else {
            warn!(?message, "No wallet connector, ignoring session change");
            return;
        };

        {
            let mut state = self.state.lock().await;
            let mut contract = self.contract.write().await;

            let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
            debug!(generation, ?message, "Wallet session changed");

            // Requests in flight now belong to the previous session and will
            // not land, so do not leave the state waiting for them.
            *state = match std::mem::take(&mut *state) {
                FetchState::Refreshing { previous } => FetchState::Loaded(previous),
                FetchState::Loading => FetchState::Idle,
                other => other,
            };

            *contract = match message {
                SessionMessage::AccountChanged(account) => {
                    info!(%account, "Wallet account changed");
                    build_contract(
                        &self.config,
                        connector.wallet_reader(),
                        Some(connector.signer(account)),
                    )
                },
                SessionMessage::NetworkChanged(chain_id) => {
                    if chain_id == self.config.expected_chain_id {
                        info!(chain_id, "Wallet network changed");
                    } else {
                        warn!(
                            chain_id,
                            expected = self.config.expected_chain_id,
                            "Wallet switched to an unexpected network"
                        );
                    }
                    build_contract(
                        &self.config,
                        connector.wallet_reader(),
                        contract.signer().cloned(),
                    )
                },
                SessionMessage::Disconnected => {
                    info!("Wallet disconnected, using the read-only RPC");
                    build_contract(&self.config, connector.read_only(), None)
                },
            };
        }

        if self.config.auto_refresh {
            if let Err(err) = self.fetch_proposals().await {
                warn!(error = %err, "Failed to refresh proposals after session change");
            }
        }
    }

    /// Consume wallet events until the sender is dropped.
    pub fn start_session(self: &Arc<Self>, mut events: mpsc::Receiver<WalletEvent>) -> JoinHandle<()> {
        let service = self.clone();

        tokio::spawn(async move {
            while let Some(event) = events.recv().await {
                if let Some(message) = SessionMessage::from_event(event) {
                    service.handle_message(message).await;
                }
            }

            debug!("Wallet event channel closed");
        })
    }
}

fn build_contract(
    config: &ServiceConfig,
    reader: Arc<dyn ChainReader>,
    signer: Option<Arc<dyn WalletSigner>>,
) -> GovernanceContract {
    let contract = GovernanceContract::new(reader)
        .with_addresses(config.dao, config.token)
        .with_block_time(config.block_time);

    match signer {
        Some(signer) => contract.with_signer(signer),
        None => contract,
    }
}

async fn with_time_left(contract: &GovernanceContract, proposal: Proposal) -> Proposal {
    if proposal.time_left.is_some() {
        return proposal;
    }

    match contract.get_time_until_end(proposal.end_block).await {
        Ok(time_left) => proposal.with_time_left(time_left),
        Err(err) => {
            debug!(proposal_id = proposal.id, error = %err, "Could not estimate time left");
            proposal
        },
    }
}

/// Add the time left to each proposal. A failure leaves that proposal
/// without one.
async fn enrich_time_left(contract: &GovernanceContract, proposals: Vec<Proposal>) -> Vec<Proposal> {
    join_all(
        proposals
            .into_iter()
            .map(|proposal| with_time_left(contract, proposal)),
    )
    .await
}

/// Marks a `(proposal, support)` pair as in flight until dropped.
struct VoteGuard<'a> {
    in_flight: &'a StdMutex<HashSet<(u64, VoteSupport)>>,
    key: (u64, VoteSupport),
}

impl<'a> VoteGuard<'a> {
    fn acquire(
        in_flight: &'a StdMutex<HashSet<(u64, VoteSupport)>>,
        proposal_id: u64,
        support: VoteSupport,
    ) -> Result<Self, GovernanceError> {
        let key = (proposal_id, support);

        if !in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key)
        {
            return Err(GovernanceError::VoteInFlight {
                proposal_id,
                support,
            });
        }

        Ok(Self { in_flight, key })
    }
}

impl Drop for VoteGuard<'_> {
    fn drop(&mut self) {
        self.in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.key);
    }
}
