use {
    crate::{context::Context, prompt::confirm},
    anyhow::bail,
    clap::Parser,
    colored::Colorize,
    nouns_types::VoteSupport,
};

#[derive(Parser)]
pub struct VoteCmd {
    /// Proposal id
    id: u64,

    /// for, against or abstain
    support: VoteSupport,

    /// Reason to record with the vote
    #[arg(long, short)]
    reason: Option<String>,

    /// Skip confirmation
    #[arg(short, long)]
    yes: bool,
}

impl VoteCmd {
    pub async fn run(self, ctx: Context) -> anyhow::Result<()> {
        let proposal = ctx.service.proposal(self.id).await?;

        if !proposal.is_active() {
            println!(
                "{}",
                format!(
                    "Proposal #{} is {}; the governor may reject the vote.",
                    proposal.id,
                    proposal.status.label().to_lowercase()
                )
                .yellow()
            );
        }

        if !self.yes
            && !confirm(
                format!(
                    "Vote {} on proposal #{} \"{}\"?",
                    self.support.to_string().bold(),
                    proposal.id,
                    proposal.title
                ),
            )?
        {
            bail!("vote aborted");
        }

        let receipt = ctx
            .service
            .cast_vote(self.id, self.support, self.reason.as_deref(), |hash| {
                println!("Vote submitted: {hash}");
                println!("{}", "Waiting for confirmation...".dimmed());
            })
            .await?;

        println!(
            "{} in block {}",
            "Vote confirmed".green().bold(),
            receipt.block_number
        );

        Ok(())
    }
}
