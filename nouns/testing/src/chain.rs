use {
    alloy::{
        primitives::{Address, Bytes, U256},
        sol_types::{SolInterface, SolValue},
    },
    async_trait::async_trait,
    nouns_contract_client::{
        ChainReader, ContractReadError, INounsDAO::INounsDAOCalls,
        INounsToken::INounsTokenCalls,
    },
    nouns_types::{constants, parse_amount},
    std::{
        collections::{BTreeMap, HashMap, HashSet},
        sync::{
            atomic::{AtomicUsize, Ordering},
            Mutex,
        },
        time::Duration,
    },
    tracing::debug,
};

/// A proposal as the governor stores it.
#[derive(Debug, Clone)]
pub struct MockProposal {
    pub proposer: Address,
    pub start_block: u64,
    pub end_block: u64,
    pub for_votes: U256,
    pub against_votes: U256,
    pub abstain_votes: U256,
    pub state: u8,
    pub canceled: bool,
    pub executed: bool,
}

impl MockProposal {
    /// An active proposal that ends at `end_block`.
    pub fn active(end_block: u64) -> Self {
        Self {
            proposer: Address::repeat_byte(0xaa),
            start_block: end_block.saturating_sub(7200),
            end_block,
            for_votes: U256::ZERO,
            against_votes: U256::ZERO,
            abstain_votes: U256::ZERO,
            state: 1,
            canceled: false,
            executed: false,
        }
    }

    pub fn with_state(mut self, state: u8) -> Self {
        self.state = state;
        self
    }

    /// Tallies in whole tokens.
    pub fn with_votes(mut self, for_votes: &str, against_votes: &str, abstain_votes: &str) -> Self {
        self.for_votes = whole_tokens(for_votes);
        self.against_votes = whole_tokens(against_votes);
        self.abstain_votes = whole_tokens(abstain_votes);
        self
    }
}

fn whole_tokens(amount: &str) -> U256 {
    parse_amount(amount).unwrap() * U256::from(10).pow(U256::from(18))
}

#[derive(Default)]
struct ChainState {
    block_number: u64,
    proposal_count: Option<u64>,
    proposals: BTreeMap<u64, MockProposal>,
    failing: HashSet<u64>,
    voting_power: HashMap<Address, U256>,
    tokens: HashMap<Address, Vec<u64>>,
    balances: HashMap<Address, U256>,
    unreachable: bool,
    latency: Duration,
}

/// An in-memory governor and token contract behind the [`ChainReader`]
/// interface.
pub struct MockChain {
    chain_id: u64,
    dao: Address,
    token: Address,
    state: Mutex<ChainState>,
    calls: AtomicUsize,
}

impl Default for MockChain {
    fn default() -> Self {
        Self::new(constants::MAINNET_CHAIN_ID)
    }
}

impl MockChain {
    pub fn new(chain_id: u64) -> Self {
        Self {
            chain_id,
            dao: constants::NOUNS_DAO,
            token: constants::NOUNS_TOKEN,
            state: Mutex::new(ChainState::default()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn set_block_number(&self, block_number: u64) {
        self.state.lock().unwrap().block_number = block_number;
    }

    pub fn insert_proposal(&self, id: u64, proposal: MockProposal) {
        self.state.lock().unwrap().proposals.insert(id, proposal);
    }

    /// Override the reported proposal count, which otherwise is the highest
    /// inserted id.
    pub fn set_proposal_count(&self, count: u64) {
        self.state.lock().unwrap().proposal_count = Some(count);
    }

    /// Make every read of proposal `id` revert.
    pub fn fail_proposal(&self, id: u64) {
        self.state.lock().unwrap().failing.insert(id);
    }

    pub fn set_voting_power(&self, account: Address, whole: &str) {
        self.state
            .lock()
            .unwrap()
            .voting_power
            .insert(account, whole_tokens(whole));
    }

    pub fn set_tokens(&self, owner: Address, token_ids: Vec<u64>) {
        self.state.lock().unwrap().tokens.insert(owner, token_ids);
    }

    /// Report `balance` for `owner` regardless of the tokens it holds.
    pub fn set_balance(&self, owner: Address, balance: U256) {
        self.state.lock().unwrap().balances.insert(owner, balance);
    }

    /// Fail every request as if the node could not be reached.
    pub fn set_unreachable(&self, unreachable: bool) {
        self.state.lock().unwrap().unreachable = unreachable;
    }

    /// Delay every request.
    pub fn set_latency(&self, latency: Duration) {
        self.state.lock().unwrap().latency = latency;
    }

    /// Number of requests served so far, successful or not.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    async fn begin(&self) -> Result<(), ContractReadError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        let (latency, unreachable) = {
            let state = self.state.lock().unwrap();
            (state.latency, state.unreachable)
        };

        if !latency.is_zero() {
            tokio::time::sleep(latency).await;
        }

        if unreachable {
            return Err(ContractReadError::Rpc {
                code: -32603,
                message: "node unreachable".to_string(),
            });
        }

        Ok(())
    }

    fn call_dao(&self, data: &[u8]) -> Result<Vec<u8>, ContractReadError> {
        let call = INounsDAOCalls::abi_decode(data)
            .map_err(|err| ContractReadError::decode("governor call", err))?;

        let state = self.state.lock().unwrap();

        match call {
            INounsDAOCalls::proposalCount(_) => {
                let count = state
                    .proposal_count
                    .or_else(|| state.proposals.keys().next_back().copied())
                    .unwrap_or(0);

                Ok(U256::from(count).abi_encode())
            },
            INounsDAOCalls::proposals(call) => {
                let (id, proposal) = state.lookup(call.proposalId)?;

                Ok((
                    U256::from(id),
                    proposal.proposer,
                    U256::from(1),
                    U256::from(70),
                    U256::ZERO,
                    U256::from(proposal.start_block),
                    U256::from(proposal.end_block),
                    proposal.for_votes,
                    proposal.against_votes,
                    proposal.abstain_votes,
                    proposal.canceled,
                    false,
                    proposal.executed,
                )
                    .abi_encode_params())
            },
            INounsDAOCalls::state(call) => {
                let (_, proposal) = state.lookup(call.proposalId)?;

                Ok(U256::from(proposal.state).abi_encode())
            },
            INounsDAOCalls::getVotes(call) => {
                let votes = state
                    .voting_power
                    .get(&call.account)
                    .copied()
                    .unwrap_or_default();

                Ok(votes.abi_encode())
            },
            _ => Err(ContractReadError::Reverted(
                "state-changing call in a read".to_string(),
            )),
        }
    }

    fn call_token(&self, data: &[u8]) -> Result<Vec<u8>, ContractReadError> {
        let call = INounsTokenCalls::abi_decode(data)
            .map_err(|err| ContractReadError::decode("token call", err))?;

        let state = self.state.lock().unwrap();

        match call {
            INounsTokenCalls::balanceOf(call) => {
                let count = match state.balances.get(&call.owner) {
                    Some(balance) => *balance,
                    None => U256::from(state.tokens.get(&call.owner).map_or(0, Vec::len)),
                };

                Ok(count.abi_encode())
            },
            INounsTokenCalls::tokenOfOwnerByIndex(call) => state
                .tokens
                .get(&call.owner)
                .and_then(|ids| ids.get(call.index.saturating_to::<usize>()))
                .map(|id| U256::from(*id).abi_encode())
                .ok_or_else(|| {
                    ContractReadError::Reverted("ERC721Enumerable: owner index out of bounds".into())
                }),
        }
    }
}

impl ChainState {
    fn lookup(&self, id: U256) -> Result<(u64, &MockProposal), ContractReadError> {
        let id = id.saturating_to::<u64>();

        if self.failing.contains(&id) {
            return Err(ContractReadError::Reverted(format!("proposal {id} is unreadable")));
        }

        self.proposals
            .get(&id)
            .map(|proposal| (id, proposal))
            .ok_or_else(|| ContractReadError::Reverted("NounsDAO::state: invalid proposal id".into()))
    }
}

#[async_trait]
impl ChainReader for MockChain {
    async fn block_number(&self) -> Result<u64, ContractReadError> {
        self.begin().await?;

        Ok(self.state.lock().unwrap().block_number)
    }

    async fn chain_id(&self) -> Result<u64, ContractReadError> {
        self.begin().await?;

        Ok(self.chain_id)
    }

    async fn call(
        &self,
        to: Address,
        data: Bytes,
        _block: Option<u64>,
    ) -> Result<Bytes, ContractReadError> {
        self.begin().await?;

        debug!(%to, "Mock chain call");

        let output = if to == self.dao {
            self.call_dao(&data)?
        } else if to == self.token {
            self.call_token(&data)?
        } else {
            return Err(ContractReadError::Reverted(format!("no contract at {to}")));
        };

        Ok(output.into())
    }
}
