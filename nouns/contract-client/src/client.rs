use {
    crate::{
        ChainReader, ContractError, ContractReadError, INounsDAO, INounsToken, PendingTransaction,
        TransactionRequest, WalletSigner,
    },
    alloy::{
        primitives::{Address, Bytes, U256},
        sol_types::SolCall,
    },
    futures::future::join_all,
    nouns_types::{
        blocks_remaining, constants, derive_has_ended, derive_is_active, estimate_duration,
        format_time_left, is_known_state_code, state_code_to_status, to_display_amount,
        NounsOwned, OnChainState, Proposal, VoteSupport, VotingPower,
    },
    std::{sync::Arc, time::Duration},
    tracing::{error, info, warn},
};

/// Client for the Nouns governor and token contracts.
///
/// Reads go through a [`ChainReader`]; writes need a [`WalletSigner`] and fail
/// with [`ContractError::NoSigner`] without one.
#[derive(Clone)]
pub struct GovernanceContract {
    reader: Arc<dyn ChainReader>,
    signer: Option<Arc<dyn WalletSigner>>,
    dao: Address,
    token: Address,
    block_time: Duration,
}

impl GovernanceContract {
    pub fn new(reader: Arc<dyn ChainReader>) -> Self {
        Self {
            reader,
            signer: None,
            dao: constants::NOUNS_DAO,
            token: constants::NOUNS_TOKEN,
            block_time: constants::BLOCK_TIME,
        }
    }

    pub fn with_signer(mut self, signer: Arc<dyn WalletSigner>) -> Self {
        self.signer = Some(signer);
        self
    }

    pub fn with_addresses(mut self, dao: Address, token: Address) -> Self {
        self.dao = dao;
        self.token = token;
        self
    }

    pub fn with_block_time(mut self, block_time: Duration) -> Self {
        self.block_time = block_time;
        self
    }

    pub fn reader(&self) -> &Arc<dyn ChainReader> {
        &self.reader
    }

    pub fn signer(&self) -> Option<&Arc<dyn WalletSigner>> {
        self.signer.as_ref()
    }

    pub fn account(&self) -> Option<Address> {
        self.signer.as_ref().map(|signer| signer.account())
    }

    async fn read<C>(&self, to: Address, call: C) -> Result<C::Return, ContractReadError>
    where
        C: SolCall + Send,
    {
        let data = self.reader.call(to, call.abi_encode().into(), None).await?;

        C::abi_decode_returns(&data).map_err(|err| ContractReadError::decode(C::SIGNATURE, err))
    }

    pub async fn chain_id(&self) -> Result<u64, ContractReadError> {
        self.reader.chain_id().await
    }

    pub async fn get_proposal_count(&self) -> Result<u64, ContractReadError> {
        let count = self.read(self.dao, INounsDAO::proposalCountCall {}).await?;

        to_u64(count, "proposal count")
    }

    /// Read one proposal straight from the governor.
    ///
    /// The contract keeps no text for a proposal, so the title is the
    /// `Proposal {id}` placeholder and the description is left empty.
    pub async fn get_proposal(&self, proposal_id: u64) -> Result<Proposal, ContractReadError> {
        let id = U256::from(proposal_id);

        let (raw, state_code) = tokio::try_join!(
            self.read(self.dao, INounsDAO::proposalsCall { proposalId: id }),
            self.read(self.dao, INounsDAO::stateCall { proposalId: id }),
        )?;

        let current_block = self.reader.block_number().await?;
        let start_block = to_u64(raw.startBlock, "start block")?;
        let end_block = to_u64(raw.endBlock, "end block")?;

        if !is_known_state_code(state_code) {
            warn!(proposal_id, state_code, "Unknown proposal state code");
        }

        Ok(Proposal {
            proposer: raw.proposer.to_string(),
            status: state_code_to_status(state_code),
            start_block,
            end_block,
            for_votes: to_display_amount(raw.forVotes),
            against_votes: to_display_amount(raw.againstVotes),
            abstain_votes: to_display_amount(raw.abstainVotes),
            canceled: raw.canceled,
            executed: raw.executed,
            on_chain: Some(OnChainState {
                state_code,
                current_block,
                is_active: derive_is_active(state_code),
                has_ended: derive_has_ended(current_block, end_block),
            }),
            ..Proposal::new(proposal_id)
        })
    }

    /// Read every id in `start_id..=end_id` concurrently. A failed id does not
    /// affect the others; the caller decides what to do with it.
    pub async fn get_proposals(
        &self,
        start_id: u64,
        end_id: u64,
    ) -> Vec<(u64, Result<Proposal, ContractReadError>)> {
        let reads = (start_id..=end_id).map(|id| async move { (id, self.get_proposal(id).await) });

        join_all(reads).await
    }

    pub async fn cast_vote(
        &self,
        proposal_id: u64,
        support: VoteSupport,
        reason: Option<&str>,
    ) -> Result<PendingTransaction, ContractError> {
        let proposal_id_u256 = U256::from(proposal_id);

        let data = match reason.filter(|reason| !reason.is_empty()) {
            Some(reason) => INounsDAO::castVoteWithReasonCall {
                proposalId: proposal_id_u256,
                support: support.code(),
                reason: reason.to_string(),
            }
            .abi_encode(),
            None => INounsDAO::castVoteCall {
                proposalId: proposal_id_u256,
                support: support.code(),
            }
            .abi_encode(),
        };

        let pending = self.submit(data.into(), "cast vote").await?;

        info!(proposal_id, %support, hash = %pending.hash(), "Vote submitted");

        Ok(pending)
    }

    /// Submit a proposal. The four action lists are expected to be parallel;
    /// the governor enforces that.
    pub async fn propose(
        &self,
        targets: Vec<Address>,
        values: Vec<U256>,
        signatures: Vec<String>,
        calldatas: Vec<Bytes>,
        description: String,
    ) -> Result<PendingTransaction, ContractError> {
        let data = INounsDAO::proposeCall {
            targets,
            values,
            signatures,
            calldatas,
            description,
        }
        .abi_encode();

        let pending = self.submit(data.into(), "create proposal").await?;

        info!(hash = %pending.hash(), "Proposal submitted");

        Ok(pending)
    }

    async fn submit(&self, data: Bytes, action: &str) -> Result<PendingTransaction, ContractError> {
        let signer = self.signer.clone().ok_or(ContractError::NoSigner)?;

        let tx = TransactionRequest {
            from: signer.account(),
            to: self.dao,
            data,
        };

        match signer.send_transaction(tx).await {
            Ok(hash) => Ok(PendingTransaction::new(hash, signer)),
            Err(err) if err.is_user_rejection() => {
                info!(action, "User rejected the transaction");
                Err(err)
            },
            Err(err) => {
                error!(action, error = %err, "Failed to submit transaction");
                Err(err)
            },
        }
    }

    /// Votes held by `account` at `block`, or at the current block. Zero when
    /// the read fails.
    pub async fn get_voting_power(&self, account: Address, block: Option<u64>) -> VotingPower {
        let result = async {
            let block = match block {
                Some(block) => block,
                None => self.reader.block_number().await?,
            };

            let votes = self
                .read(self.dao, INounsDAO::getVotesCall {
                    account,
                    blockNumber: U256::from(block),
                })
                .await?;

            Ok::<_, ContractReadError>(VotingPower {
                block: Some(block),
                votes: to_display_amount(votes),
            })
        }
        .await;

        result.unwrap_or_else(|err| {
            warn!(%account, error = %err, "Failed to get voting power");
            VotingPower::ZERO
        })
    }

    /// Token ids owned by `owner`. Empty when any read fails.
    pub async fn get_nouns_owned(&self, owner: Address) -> NounsOwned {
        let result = async {
            let balance = self.read(self.token, INounsToken::balanceOfCall { owner }).await?;
            let count = to_u64(balance, "balance")?;

            let mut token_ids = Vec::new();
            for index in 0..count {
                let token_id = self
                    .read(self.token, INounsToken::tokenOfOwnerByIndexCall {
                        owner,
                        index: U256::from(index),
                    })
                    .await?;

                token_ids.push(to_u64(token_id, "token id")?);
            }

            Ok::<_, ContractReadError>(NounsOwned { count, token_ids })
        }
        .await;

        result.unwrap_or_else(|err| {
            warn!(%owner, error = %err, "Failed to get Nouns owned");
            NounsOwned::default()
        })
    }

    pub async fn get_blocks_until_end(&self, end_block: u64) -> Result<u64, ContractReadError> {
        let current_block = self.reader.block_number().await?;

        Ok(blocks_remaining(current_block, end_block))
    }

    /// Rough time until `end_block`, assuming a constant block interval.
    pub async fn get_time_until_end(&self, end_block: u64) -> Result<String, ContractReadError> {
        let blocks = self.get_blocks_until_end(end_block).await?;

        Ok(format_time_left(estimate_duration(blocks, self.block_time)))
    }
}

fn to_u64(value: U256, what: &'static str) -> Result<u64, ContractReadError> {
    u64::try_from(value).map_err(|err| ContractReadError::decode(what, err))
}
