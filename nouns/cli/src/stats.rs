use {
    crate::{
        context::Context,
        print::{print_json_pretty, print_proposal_line, status_label},
    },
    clap::Parser,
    colored::Colorize,
};

#[derive(Parser)]
pub struct StatsCmd {
    /// Include voting power, Nouns owned and voting history of this account
    #[arg(long)]
    account: Option<String>,

    /// Print JSON instead of text
    #[arg(long)]
    json: bool,
}

impl StatsCmd {
    pub async fn run(self, ctx: Context) -> anyhow::Result<()> {
        let stats = ctx.service.stats(self.account.as_deref()).await?;

        if self.json {
            return print_json_pretty(stats);
        }

        println!("{}", "DAO".bold());
        println!("Total proposals:  {}", stats.total_proposals);
        println!("Active proposals: {}", stats.active_proposals);

        for (status, count) in &stats.status_breakdown {
            println!("  {:<10} {count}", status_label(*status));
        }

        println!();
        println!("{}", "Recent activity".bold());
        for proposal in stats.recent_activity.iter().take(5) {
            print_proposal_line(proposal);
        }

        if let Some(account) = &stats.account {
            println!();
            println!("{} {}", "Account".bold(), account.address);
            println!("Voting power: {}", account.voting_power);
            println!(
                "Nouns owned:  {} {:?}",
                account.nouns_owned.count, account.nouns_owned.token_ids
            );

            for vote in &account.voting_history {
                let proposal = vote
                    .proposal
                    .as_ref()
                    .map(|proposal| format!("#{}", proposal.id))
                    .unwrap_or_default();

                println!("  {proposal:<6} {} with {} votes", vote.support, vote.votes);
            }
        }

        Ok(())
    }
}
