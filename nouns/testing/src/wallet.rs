use {
    alloy::{
        primitives::{keccak256, Address, TxHash},
        sol_types::SolInterface,
    },
    async_trait::async_trait,
    nouns_contract_client::{
        ContractError, ContractReadError, INounsDAO::INounsDAOCalls, TransactionReceipt,
        TransactionRequest, WalletSigner,
    },
    std::{collections::HashSet, sync::Mutex},
    tokio::sync::watch,
};

#[derive(Default)]
struct WalletState {
    submitted: Vec<TransactionRequest>,
    voted: HashSet<u64>,
    rejecting: bool,
    revert_message: Option<String>,
    failing_receipts: usize,
    receipt_lookups: usize,
    next_block: u64,
}

/// A wallet that signs instantly. Votes are remembered per proposal so a
/// second vote reverts the way the governor does.
pub struct MockWallet {
    account: Address,
    state: Mutex<WalletState>,
    held: watch::Sender<bool>,
}

impl MockWallet {
    pub fn new(account: Address) -> Self {
        Self {
            account,
            state: Mutex::new(WalletState {
                next_block: 18_000_000,
                ..Default::default()
            }),
            held: watch::Sender::new(false),
        }
    }

    /// Make the user decline every request.
    pub fn reject_requests(&self) {
        self.state.lock().unwrap().rejecting = true;
    }

    /// Make every submission revert with `message`.
    pub fn revert_with(&self, message: &str) {
        self.state.lock().unwrap().revert_message = Some(message.to_string());
    }

    /// Keep submitted transactions pending until [`MockWallet::release`].
    pub fn hold_confirmations(&self) {
        self.held.send_replace(true);
    }

    pub fn release(&self) {
        self.held.send_replace(false);
    }

    /// Fail the next `count` receipt lookups as if the node dropped them.
    pub fn fail_receipts(&self, count: usize) {
        self.state.lock().unwrap().failing_receipts = count;
    }

    /// Number of receipt lookups so far, failed ones included.
    pub fn receipt_lookups(&self) -> usize {
        self.state.lock().unwrap().receipt_lookups
    }

    pub fn submitted(&self) -> Vec<TransactionRequest> {
        self.state.lock().unwrap().submitted.clone()
    }
}

#[async_trait]
impl WalletSigner for MockWallet {
    fn account(&self) -> Address {
        self.account
    }

    async fn send_transaction(&self, tx: TransactionRequest) -> Result<TxHash, ContractError> {
        let mut state = self.state.lock().unwrap();

        if state.rejecting {
            return Err(ContractError::from_rpc(4001, "User denied transaction signature"));
        }

        if let Some(message) = &state.revert_message {
            return Err(ContractError::from_rpc(-32000, message));
        }

        let vote = match INounsDAOCalls::abi_decode(&tx.data) {
            Ok(INounsDAOCalls::castVote(call)) => Some(call.proposalId),
            Ok(INounsDAOCalls::castVoteWithReason(call)) => Some(call.proposalId),
            _ => None,
        };

        if let Some(proposal_id) = vote {
            if !state.voted.insert(proposal_id.saturating_to()) {
                return Err(ContractError::from_rpc(
                    -32000,
                    "execution reverted: NounsDAO::castVoteInternal: voter already voted",
                ));
            }
        }

        let nonce = state.submitted.len() as u64;
        state.submitted.push(tx);

        Ok(keccak256(nonce.to_be_bytes()))
    }

    async fn wait_for_receipt(&self, hash: TxHash) -> Result<TransactionReceipt, ContractError> {
        let mut held = self.held.subscribe();
        // The sender lives as long as `self`, so this only fails on drop.
        let _ = held.wait_for(|held| !*held).await;

        let mut state = self.state.lock().unwrap();
        state.receipt_lookups += 1;

        if state.failing_receipts > 0 {
            state.failing_receipts -= 1;
            return Err(ContractReadError::Rpc {
                code: -32603,
                message: "receipt lookup failed".to_string(),
            }
            .into());
        }

        state.next_block += 1;

        Ok(TransactionReceipt {
            transaction_hash: hash,
            block_number: state.next_block,
            success: true,
        })
    }
}
