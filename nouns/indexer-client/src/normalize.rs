use {
    crate::{RawNumber, RawProposal, RawVote},
    alloy::primitives::U256,
    chrono::{DateTime, Utc},
    nouns_types::{
        derive_title, parse_amount, to_display_amount, Proposal, ProposalStatus, Vote,
        VoteSupport, VotedProposal,
    },
    tracing::warn,
};

/// Turn raw subgraph records into canonical proposals. Records whose id
/// cannot be read are skipped.
pub fn normalize_proposals(raw: Vec<RawProposal>) -> Vec<Proposal> {
    raw.into_iter().filter_map(normalize_proposal).collect()
}

pub fn normalize_proposal(raw: RawProposal) -> Option<Proposal> {
    let Some(id) = integer(Some(&raw.id), "id").filter(|id| *id > 0) else {
        warn!(id = ?raw.id, "Dropping indexed proposal without a usable id");
        return None;
    };

    let description = raw.description.unwrap_or_default();
    let created_at = raw
        .created_timestamp
        .as_ref()
        .and_then(|timestamp| created_at(integer(Some(timestamp), "createdTimestamp")?));

    Some(Proposal {
        id,
        proposer: raw.proposer.map(|account| account.id).unwrap_or_default(),
        title: derive_title(id, &description),
        description,
        status: raw
            .status
            .as_deref()
            .map(ProposalStatus::from_reported)
            .unwrap_or(ProposalStatus::Unknown),
        created_at,
        start_block: integer(raw.start_block.as_ref(), "startBlock").unwrap_or_default(),
        end_block: integer(raw.end_block.as_ref(), "endBlock").unwrap_or_default(),
        for_votes: tally(raw.for_votes.as_ref(), "forVotes"),
        against_votes: tally(raw.against_votes.as_ref(), "againstVotes"),
        abstain_votes: tally(raw.abstain_votes.as_ref(), "abstainVotes"),
        canceled: raw.canceled.unwrap_or_default(),
        executed: raw.executed.unwrap_or_default(),
        targets: raw.targets.unwrap_or_default(),
        values: raw.values.unwrap_or_default(),
        signatures: raw.signatures.unwrap_or_default(),
        calldatas: raw.calldatas.unwrap_or_default(),
        votes: normalize_votes(raw.votes.unwrap_or_default()),
        created_transaction_hash: raw.created_transaction_hash,
        executed_transaction_hash: raw.executed_transaction_hash,
        on_chain: None,
        time_left: None,
    })
}

/// Votes with a support value outside `0..=2` are skipped.
pub fn normalize_votes(raw: Vec<RawVote>) -> Vec<Vote> {
    raw.into_iter().filter_map(normalize_vote).collect()
}

pub fn normalize_vote(raw: RawVote) -> Option<Vote> {
    let code = integer(raw.support.as_ref(), "support").unwrap_or_default();
    let support = match u8::try_from(code).ok().and_then(|code| VoteSupport::try_from(code).ok()) {
        Some(support) => support,
        None => {
            warn!(vote = %raw.id, code, "Dropping indexed vote with invalid support");
            return None;
        },
    };

    Some(Vote {
        id: raw.id,
        support,
        votes: integer(raw.votes.as_ref(), "votes").unwrap_or_default(),
        voter: raw.voter.map(|account| account.id).unwrap_or_default(),
        block_number: integer(raw.block_number.as_ref(), "blockNumber").unwrap_or_default(),
        reason: raw.reason,
        proposal: raw.proposal.map(|proposal| VotedProposal {
            id: integer(Some(&proposal.id), "proposal.id").unwrap_or_default(),
            description: proposal.description.unwrap_or_default(),
        }),
    })
}

/// Absent or null fields read as `Some(0)`; unreadable values are logged and
/// read as `None` so the caller picks the fallback.
fn integer(raw: Option<&RawNumber>, field: &'static str) -> Option<u64> {
    match raw {
        None => Some(0),
        Some(RawNumber::Integer(value)) => Some(*value),
        Some(RawNumber::Float(value)) if *value >= 0.0 => Some(value.trunc() as u64),
        Some(RawNumber::Text(text)) => match text.trim().parse::<u64>() {
            Ok(value) => Some(value),
            Err(err) => {
                warn!(field, text = %text, error = %err, "Unreadable integer in indexed record");
                None
            },
        },
        Some(other) => {
            warn!(field, value = ?other, "Unreadable integer in indexed record");
            None
        },
    }
}

/// Vote tallies arrive in the token's fixed-point base unit.
fn tally(raw: Option<&RawNumber>, field: &'static str) -> f64 {
    match raw {
        None => 0.0,
        Some(RawNumber::Integer(value)) => to_display_amount(U256::from(*value)),
        Some(RawNumber::Text(text)) => match parse_amount(text) {
            Ok(amount) => to_display_amount(amount),
            Err(err) => {
                warn!(field, text = %text, error = %err, "Unreadable vote tally in indexed record");
                0.0
            },
        },
        Some(RawNumber::Float(value)) => (value / 1e18).max(0.0),
    }
}

fn created_at(epoch_seconds: u64) -> Option<DateTime<Utc>> {
    let millis = i64::try_from(epoch_seconds).ok()?.checked_mul(1000)?;

    DateTime::from_timestamp_millis(millis)
}

// ----------------------------------- tests -----------------------------------

#[cfg(test)]
mod tests {
    use {
        super::*,
        crate::{RawAccount, RawVotedProposal},
        assertor::*,
        test_case::test_case,
    };

    fn raw_proposal(id: &str) -> RawProposal {
        RawProposal {
            id: RawNumber::Text(id.to_string()),
            proposer: None,
            targets: None,
            values: None,
            signatures: None,
            calldatas: None,
            description: None,
            status: None,
            created_timestamp: None,
            start_block: None,
            end_block: None,
            for_votes: None,
            against_votes: None,
            abstain_votes: None,
            canceled: None,
            executed: None,
            created_transaction_hash: None,
            executed_transaction_hash: None,
            votes: None,
        }
    }

    #[test]
    fn tallies_are_converted_to_whole_tokens() {
        let proposal = normalize_proposal(RawProposal {
            for_votes: Some(RawNumber::Text("5000000000000000000".to_string())),
            against_votes: Some(RawNumber::Text("0".to_string())),
            abstain_votes: Some(RawNumber::Text("0".to_string())),
            ..raw_proposal("1")
        })
        .unwrap();

        assert_that!(proposal.for_votes).is_equal_to(5.0);
        assert_that!(proposal.total_votes()).is_equal_to(5.0);
    }

    #[test]
    fn absent_fields_default_to_zero() {
        let proposal = normalize_proposal(raw_proposal("42")).unwrap();

        assert_that!(proposal.id).is_equal_to(42);
        assert_that!(proposal.start_block).is_equal_to(0);
        assert_that!(proposal.end_block).is_equal_to(0);
        assert_that!(proposal.total_votes()).is_equal_to(0.0);
        assert_that!(proposal.status).is_equal_to(ProposalStatus::Unknown);
        assert_that!(proposal.title.as_str()).is_equal_to("Proposal 42");
        assert_that!(proposal.created_at).is_none();
    }

    #[test]
    fn full_record_is_normalized() {
        let proposal = normalize_proposal(RawProposal {
            proposer: Some(RawAccount {
                id: "0xabc".to_string(),
            }),
            description: Some("# Fund a statue\n\nDetails follow.".to_string()),
            status: Some("ACTIVE".to_string()),
            created_timestamp: Some(RawNumber::Text("1700000000".to_string())),
            start_block: Some(RawNumber::Text("18000000".to_string())),
            end_block: Some(RawNumber::Integer(18020000)),
            votes: Some(vec![RawVote {
                id: "0xabc-1".to_string(),
                support: Some(RawNumber::Integer(1)),
                votes: Some(RawNumber::Text("3".to_string())),
                voter: Some(RawAccount {
                    id: "0xdef".to_string(),
                }),
                block_number: Some(RawNumber::Text("18000010".to_string())),
                reason: Some("love it".to_string()),
                proposal: None,
            }]),
            ..raw_proposal("7")
        })
        .unwrap();

        assert_that!(proposal.proposer.as_str()).is_equal_to("0xabc");
        assert_that!(proposal.title.as_str()).is_equal_to("# Fund a statue");
        assert_that!(proposal.status).is_equal_to(ProposalStatus::Active);
        assert_that!(proposal.start_block).is_equal_to(18_000_000);
        assert_that!(proposal.end_block).is_equal_to(18_020_000);
        assert_that!(proposal.created_at.map(|at| at.timestamp_millis()))
            .is_equal_to(Some(1_700_000_000_000));
        assert_that!(proposal.votes).has_length(1);
        assert_that!(proposal.votes[0].support).is_equal_to(VoteSupport::For);
        assert_that!(proposal.votes[0].votes).is_equal_to(3);
    }

    #[test_case(RawNumber::Text("abc".to_string()); "text")]
    #[test_case(RawNumber::Integer(0); "zero")]
    #[test_case(RawNumber::Float(-1.0); "negative")]
    fn proposals_without_usable_id_are_dropped(id: RawNumber) {
        let raw = RawProposal {
            id,
            ..raw_proposal("1")
        };

        assert_that!(normalize_proposals(vec![raw])).is_empty();
    }

    #[test]
    fn unreadable_tally_reads_as_zero() {
        let proposal = normalize_proposal(RawProposal {
            for_votes: Some(RawNumber::Text("lots".to_string())),
            ..raw_proposal("3")
        })
        .unwrap();

        assert_that!(proposal.for_votes).is_equal_to(0.0);
    }

    #[test_case(Some(RawNumber::Integer(0)) => Some(VoteSupport::Against))]
    #[test_case(Some(RawNumber::Text("2".to_string())) => Some(VoteSupport::Abstain))]
    #[test_case(Some(RawNumber::Integer(3)) => None; "out of range")]
    #[test_case(None => Some(VoteSupport::Against); "absent reads as zero")]
    fn normalizing_vote_support(support: Option<RawNumber>) -> Option<VoteSupport> {
        normalize_vote(RawVote {
            id: "v".to_string(),
            support,
            votes: None,
            voter: None,
            block_number: None,
            reason: None,
            proposal: Some(RawVotedProposal {
                id: RawNumber::Text("9".to_string()),
                description: None,
            }),
        })
        .map(|vote| vote.support)
    }
}
