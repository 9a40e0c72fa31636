use {
    colored::{ColoredString, Colorize},
    colored_json::ToColoredJson,
    nouns_types::{Proposal, ProposalStatus, Vote, VoteSupport},
    serde::Serialize,
};

pub fn print_json_pretty<T>(data: T) -> anyhow::Result<()>
where
    T: Serialize,
{
    let json = serde_json::to_string_pretty(&data)?;
    let colored = json.to_colored_json_auto()?;

    println!("{colored}");

    Ok(())
}

pub fn status_label(status: ProposalStatus) -> ColoredString {
    let label = status.label();

    match status {
        ProposalStatus::Active => label.green().bold(),
        ProposalStatus::Pending | ProposalStatus::Queued => label.yellow(),
        ProposalStatus::Succeeded | ProposalStatus::Executed => label.blue(),
        ProposalStatus::Defeated | ProposalStatus::Canceled | ProposalStatus::Expired => {
            label.red()
        },
        ProposalStatus::Unknown => label.dimmed(),
    }
}

fn support_label(support: VoteSupport) -> ColoredString {
    match support {
        VoteSupport::For => "For".green(),
        VoteSupport::Against => "Against".red(),
        VoteSupport::Abstain => "Abstain".dimmed(),
    }
}

/// One line per proposal.
pub fn print_proposal_line(proposal: &Proposal) {
    println!(
        "{:>6}  {:<10}  {}  {}  {}",
        format!("#{}", proposal.id).bold(),
        status_label(proposal.status),
        proposal.title,
        format!(
            "[{} for / {} against / {} abstain]",
            proposal.for_votes, proposal.against_votes, proposal.abstain_votes
        )
        .dimmed(),
        proposal.time_left.as_deref().unwrap_or_default().italic(),
    );
}

pub fn print_proposal(proposal: &Proposal) {
    println!("{} {}", format!("Proposal #{}", proposal.id).bold(), status_label(proposal.status));
    println!("{}", proposal.title.bold());
    println!();
    println!("Proposer:   {}", proposal.proposer);
    println!("Blocks:     {} - {}", proposal.start_block, proposal.end_block);
    if let Some(created_at) = proposal.created_at {
        println!("Created:    {created_at}");
    }
    if let Some(time_left) = &proposal.time_left {
        println!("Time left:  {time_left} (estimate)");
    }
    println!(
        "Votes:      {} for, {} against, {} abstain ({} total)",
        proposal.for_votes.to_string().green(),
        proposal.against_votes.to_string().red(),
        proposal.abstain_votes,
        proposal.total_votes(),
    );

    for (index, target) in proposal.targets.iter().enumerate() {
        println!(
            "Action {}:   {} {} value={}",
            index + 1,
            target,
            proposal.signatures.get(index).map(String::as_str).unwrap_or_default(),
            proposal.values.get(index).map(String::as_str).unwrap_or("0"),
        );
    }

    if let Some(hash) = &proposal.created_transaction_hash {
        println!("Created in: {hash}");
    }
    if let Some(hash) = &proposal.executed_transaction_hash {
        println!("Executed in: {hash}");
    }

    println!();
    println!("{}", proposal.description);
}

pub fn print_vote_line(vote: &Vote) {
    println!(
        "{:<8}  {:>5}  {}{}",
        support_label(vote.support),
        vote.votes,
        vote.voter,
        vote.reason
            .as_deref()
            .filter(|reason| !reason.is_empty())
            .map(|reason| format!("  \"{reason}\"").dimmed().to_string())
            .unwrap_or_default(),
    );
}
