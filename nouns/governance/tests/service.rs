use {
    crate::utils::serve,
    alloy::primitives::Address,
    assertor::*,
    nouns_contract_client::{ChainReader, ContractError, WalletSigner},
    nouns_governance::{
        Connector, FetchState, GovernanceError, GovernanceService, ProposalDraft, ServiceConfig,
        SessionMessage, ValidationError, WalletEvent, ON_CHAIN_DESCRIPTION,
    },
    nouns_indexer_client::IndexerClient,
    nouns_testing::{MockChain, MockProposal, MockWallet},
    nouns_types::{ProposalStatus, VoteSupport},
    serde_json::json,
    std::{
        sync::{
            atomic::{AtomicBool, Ordering},
            Arc,
        },
        time::Duration,
    },
    tokio::sync::mpsc,
};

mod utils;

/// Nothing listens here, so every indexer request fails to connect.
const DEAD_INDEXER: &str = "http://127.0.0.1:1/";

const VOTER: Address = Address::repeat_byte(0x11);

struct MockConnector {
    chain: Arc<MockChain>,
}

impl Connector for MockConnector {
    fn read_only(&self) -> Arc<dyn ChainReader> {
        self.chain.clone()
    }

    fn wallet_reader(&self) -> Arc<dyn ChainReader> {
        self.chain.clone()
    }

    fn signer(&self, account: Address) -> Arc<dyn WalletSigner> {
        Arc::new(MockWallet::new(account))
    }
}

fn chain_with_proposals(count: u64) -> Arc<MockChain> {
    let chain = Arc::new(MockChain::default());
    chain.set_block_number(18_000_000);
    for id in 1..=count {
        chain.insert_proposal(id, MockProposal::active(18_000_000 + id * 100));
    }
    chain
}

fn service(chain: &Arc<MockChain>, indexer: Option<&str>, config: ServiceConfig) -> GovernanceService {
    GovernanceService::new(config, indexer.map(IndexerClient::new), chain.clone())
}

fn quiet() -> ServiceConfig {
    ServiceConfig {
        auto_refresh: false,
        ..Default::default()
    }
}

#[tokio::test]
async fn falls_back_to_the_contract_when_the_indexer_fails() -> anyhow::Result<()> {
    let chain = chain_with_proposals(3);
    let service = service(&chain, Some(DEAD_INDEXER), quiet());

    let proposals = service.fetch_proposals().await?;

    assert_that!(proposals.iter().map(|p| p.id).collect::<Vec<_>>())
        .contains_exactly_in_order(vec![3, 2, 1]);
    assert!(proposals.iter().all(|p| p.time_left.is_some()));
    assert_that!(proposals[0].description.as_str()).is_equal_to(ON_CHAIN_DESCRIPTION);
    assert!(matches!(service.state().await, FetchState::Loaded(_)));

    Ok(())
}

#[tokio::test]
async fn fails_only_when_every_source_fails() {
    let chain = chain_with_proposals(3);
    chain.set_unreachable(true);
    let service = service(&chain, Some(DEAD_INDEXER), quiet());

    let err = service.fetch_proposals().await.unwrap_err();

    match err {
        GovernanceError::AllSourcesFailed(causes) => {
            assert_that!(causes.as_str()).contains("indexer");
            assert_that!(causes.as_str()).contains("contract");
        },
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(matches!(service.state().await, FetchState::Failed(_)));
}

#[tokio::test]
async fn unreadable_ids_are_dropped() -> anyhow::Result<()> {
    let chain = chain_with_proposals(5);
    chain.fail_proposal(3);
    let service = service(&chain, None, quiet());

    let proposals = service.fetch_proposals().await?;

    assert_that!(proposals.iter().map(|p| p.id).collect::<Vec<_>>())
        .contains_exactly_in_order(vec![5, 4, 2, 1]);

    Ok(())
}

#[tokio::test]
async fn fallback_window_limits_the_range() -> anyhow::Result<()> {
    let chain = chain_with_proposals(30);
    let service = service(&chain, None, ServiceConfig {
        fallback_window: 5,
        ..quiet()
    });

    let proposals = service.fetch_proposals().await?;

    assert_that!(proposals.first().map(|p| p.id)).is_equal_to(Some(30));
    assert_that!(proposals.last().map(|p| p.id)).is_equal_to(Some(25));

    Ok(())
}

#[tokio::test]
async fn contract_only_when_the_indexer_is_disabled() -> anyhow::Result<()> {
    let chain = chain_with_proposals(2);
    let queried = Arc::new(AtomicBool::new(false));
    let endpoint = serve({
        let queried = queried.clone();
        move |_| {
            queried.store(true, Ordering::SeqCst);
            json!({ "data": { "proposals": [] } })
        }
    })
    .await?;
    let service = service(&chain, Some(&endpoint), ServiceConfig {
        use_graph_api: false,
        ..quiet()
    });

    assert_that!(service.fetch_proposals().await?.len()).is_equal_to(2);
    assert!(!queried.load(Ordering::SeqCst));

    Ok(())
}

#[tokio::test]
async fn indexed_proposals_get_time_left() -> anyhow::Result<()> {
    let chain = chain_with_proposals(0);
    let endpoint = serve(|_| {
        json!({
            "data": {
                "proposals": [{
                    "id": "301",
                    "description": "Sponsor a hackathon",
                    "status": "ACTIVE",
                    "endBlock": "18007500",
                    "forVotes": "5000000000000000000"
                }]
            }
        })
    })
    .await?;
    let service = service(&chain, Some(&endpoint), quiet());

    let proposals = service.fetch_proposals().await?;

    assert_that!(proposals[0].for_votes).is_equal_to(5.0);
    assert_that!(proposals[0].total_votes()).is_equal_to(5.0);
    assert_that!(proposals[0].time_left.as_deref()).is_equal_to(Some("1d 1h"));

    Ok(())
}

#[tokio::test]
async fn time_left_is_best_effort() -> anyhow::Result<()> {
    let chain = chain_with_proposals(0);
    chain.set_unreachable(true);
    let endpoint = serve(|_| {
        json!({ "data": { "proposals": [{ "id": "9", "status": "EXECUTED" }] } })
    })
    .await?;
    let service = service(&chain, Some(&endpoint), quiet());

    let proposals = service.fetch_proposals().await?;

    assert_that!(proposals[0].status).is_equal_to(ProposalStatus::Executed);
    assert_that!(proposals[0].time_left).is_none();

    Ok(())
}

#[tokio::test]
async fn fetching_twice_is_idempotent() -> anyhow::Result<()> {
    let chain = chain_with_proposals(4);
    let service = service(&chain, None, quiet());

    let first = service.fetch_proposals().await?;
    let second = service.fetch_proposals().await?;

    assert_that!(first.len()).is_equal_to(second.len());
    assert!(first.iter().zip(second.iter()).all(|(a, b)| a.same_content(b)));

    Ok(())
}

#[tokio::test]
async fn voting_requires_a_signer() {
    let chain = chain_with_proposals(1);
    let service = service(&chain, None, quiet());

    let err = service
        .cast_vote(1, VoteSupport::For, None, |_| {})
        .await
        .unwrap_err();

    assert!(matches!(err, GovernanceError::Contract(ContractError::NoSigner)));
}

#[tokio::test]
async fn vote_reports_submission_then_refreshes() -> anyhow::Result<()> {
    let chain = chain_with_proposals(1);
    let wallet = Arc::new(MockWallet::new(VOTER));
    let service = service(&chain, None, quiet()).with_signer(wallet.clone());

    let mut submitted = None;
    let receipt = service
        .cast_vote(1, VoteSupport::For, Some("ship it"), |hash| submitted = Some(hash))
        .await?;

    assert_that!(submitted).is_equal_to(Some(receipt.transaction_hash));
    assert!(matches!(service.state().await, FetchState::Loaded(_)));

    Ok(())
}

#[tokio::test]
async fn concurrent_votes_on_the_same_pair_submit_once() -> anyhow::Result<()> {
    let chain = chain_with_proposals(1);
    let wallet = Arc::new(MockWallet::new(VOTER));
    wallet.hold_confirmations();
    let service = Arc::new(service(&chain, None, quiet()).with_signer(wallet.clone()));

    let first = tokio::spawn({
        let service = service.clone();
        async move { service.cast_vote(1, VoteSupport::For, None, |_| {}).await }
    });

    while wallet.submitted().is_empty() {
        tokio::task::yield_now().await;
    }

    let err = service
        .cast_vote(1, VoteSupport::For, None, |_| {})
        .await
        .unwrap_err();
    assert!(matches!(err, GovernanceError::VoteInFlight { proposal_id: 1, .. }));

    wallet.release();
    first.await??;

    assert_that!(wallet.submitted()).has_length(1);

    Ok(())
}

#[tokio::test]
async fn fetch_resolving_after_a_session_change_is_discarded() -> anyhow::Result<()> {
    let chain = chain_with_proposals(2);
    chain.set_latency(Duration::from_millis(100));
    let service = Arc::new(
        service(&chain, None, quiet()).with_connector(Arc::new(MockConnector {
            chain: chain.clone(),
        })),
    );

    let fetch = tokio::spawn({
        let service = service.clone();
        async move { service.fetch_proposals().await }
    });

    tokio::time::sleep(Duration::from_millis(30)).await;
    service
        .handle_message(SessionMessage::AccountChanged(VOTER))
        .await;

    assert!(matches!(fetch.await?, Err(GovernanceError::StaleSession)));
    assert!(matches!(service.state().await, FetchState::Idle));

    Ok(())
}

#[tokio::test]
async fn refreshing_keeps_the_previous_snapshot() -> anyhow::Result<()> {
    let chain = chain_with_proposals(2);
    let service = Arc::new(service(&chain, None, quiet()));
    service.fetch_proposals().await?;

    chain.insert_proposal(3, MockProposal::active(18_000_300));
    chain.set_latency(Duration::from_millis(100));

    let refresh = tokio::spawn({
        let service = service.clone();
        async move { service.fetch_proposals().await }
    });

    tokio::time::sleep(Duration::from_millis(30)).await;

    let state = service.state().await;
    assert!(matches!(state, FetchState::Refreshing { .. }));
    assert_that!(state.proposals().map(|proposals| proposals.len())).is_equal_to(Some(2));

    assert_that!(refresh.await??.len()).is_equal_to(3);
    assert!(matches!(service.state().await, FetchState::Loaded(_)));

    Ok(())
}

#[tokio::test]
async fn vote_confirmed_after_a_session_change_skips_the_refresh() -> anyhow::Result<()> {
    let chain = chain_with_proposals(1);
    let wallet = Arc::new(MockWallet::new(VOTER));
    wallet.hold_confirmations();
    let service = Arc::new(
        service(&chain, None, quiet())
            .with_signer(wallet.clone())
            .with_connector(Arc::new(MockConnector {
                chain: chain.clone(),
            })),
    );

    let vote = tokio::spawn({
        let service = service.clone();
        async move { service.cast_vote(1, VoteSupport::For, None, |_| {}).await }
    });

    while wallet.submitted().is_empty() {
        tokio::task::yield_now().await;
    }

    service
        .handle_message(SessionMessage::AccountChanged(Address::repeat_byte(0x22)))
        .await;
    let calls = chain.calls();

    wallet.release();
    let receipt = vote.await??;

    assert_that!(wallet.submitted()[0].from).is_equal_to(VOTER);
    assert_that!(receipt.success).is_true();
    assert_that!(chain.calls()).is_equal_to(calls);
    assert!(matches!(service.state().await, FetchState::Idle));

    Ok(())
}

#[tokio::test]
async fn wallet_events_rebuild_the_connection() -> anyhow::Result<()> {
    let chain = chain_with_proposals(1);
    let service = Arc::new(
        service(&chain, None, ServiceConfig::default()).with_connector(Arc::new(MockConnector {
            chain: chain.clone(),
        })),
    );

    let (sender, receiver) = mpsc::channel(8);
    let session = service.start_session(receiver);

    sender
        .send(WalletEvent::AccountsChanged(vec![VOTER.to_string()]))
        .await?;
    sender.send(WalletEvent::ChainChanged("0x1".to_string())).await?;
    drop(sender);
    session.await?;

    assert_that!(service.contract().await.account()).is_equal_to(Some(VOTER));
    assert_that!(service.generation()).is_equal_to(2);
    // auto_refresh is on by default
    assert!(matches!(service.state().await, FetchState::Loaded(_)));

    service
        .handle_message(SessionMessage::from_event(WalletEvent::AccountsChanged(vec![])).unwrap())
        .await;

    assert_that!(service.contract().await.account()).is_none();

    Ok(())
}

#[tokio::test]
async fn proposing_checks_voting_power() -> anyhow::Result<()> {
    let chain = chain_with_proposals(1);
    let wallet = Arc::new(MockWallet::new(VOTER));
    let service = service(&chain, None, quiet()).with_signer(wallet.clone());

    let draft = ProposalDraft {
        title: "Fund a Nouns film".to_string(),
        description: "We will make a film.".to_string(),
        ..Default::default()
    };

    let err = service.propose(&draft, |_| {}).await.unwrap_err();
    assert!(matches!(
        err,
        GovernanceError::Validation(ValidationError::InsufficientVotingPower { .. })
    ));
    assert_that!(wallet.submitted()).is_empty();

    chain.set_voting_power(VOTER, "2");
    service.propose(&draft, |_| {}).await?;

    assert_that!(wallet.submitted()).has_length(1);

    Ok(())
}

#[tokio::test]
async fn stats_from_the_contract() -> anyhow::Result<()> {
    let chain = chain_with_proposals(15);
    chain.insert_proposal(15, MockProposal::active(1).with_state(7));
    chain.set_tokens(VOTER, vec![4, 8]);
    let service = service(&chain, Some(DEAD_INDEXER), quiet());

    let stats = service.stats(Some(&VOTER.to_string())).await?;

    assert_that!(stats.total_proposals).is_equal_to(15);
    assert_that!(stats.recent_activity).has_length(10);
    assert_that!(stats.status_breakdown.get(&ProposalStatus::Executed).copied())
        .is_equal_to(Some(1));
    assert_that!(stats.account.map(|account| account.nouns_owned.count)).is_equal_to(Some(2));

    Ok(())
}

#[tokio::test]
async fn stats_reject_malformed_accounts() {
    let chain = chain_with_proposals(1);
    let service = service(&chain, None, quiet());

    let err = service.stats(Some("not-an-address")).await.unwrap_err();

    assert!(matches!(err, GovernanceError::InvalidAddress(_)));
}
