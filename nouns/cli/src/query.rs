use {
    crate::{
        context::Context,
        print::{print_json_pretty, print_proposal, print_vote_line},
    },
    clap::Parser,
};

#[derive(Parser)]
pub struct ShowCmd {
    /// Proposal id
    id: u64,

    /// Print JSON instead of text
    #[arg(long)]
    json: bool,
}

impl ShowCmd {
    pub async fn run(self, ctx: Context) -> anyhow::Result<()> {
        let proposal = ctx.service.proposal(self.id).await?;

        if self.json {
            return print_json_pretty(proposal);
        }

        print_proposal(&proposal);

        Ok(())
    }
}

#[derive(Parser)]
pub struct VotesCmd {
    /// Proposal id
    id: u64,

    /// Maximum number of votes to fetch
    #[arg(long, default_value_t = 100)]
    limit: u32,

    /// Print JSON instead of text
    #[arg(long)]
    json: bool,
}

impl VotesCmd {
    pub async fn run(self, ctx: Context) -> anyhow::Result<()> {
        let votes = ctx.service.proposal_votes(self.id, self.limit).await?;

        if self.json {
            return print_json_pretty(votes);
        }

        println!("{} votes on proposal #{}", votes.len(), self.id);

        for vote in &votes {
            print_vote_line(vote);
        }

        Ok(())
    }
}
