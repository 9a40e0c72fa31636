use {
    crate::{
        connector::watch_wallet,
        context::Context,
        print::{print_json_pretty, print_proposal_line},
    },
    chrono::Local,
    clap::Parser,
    colored::Colorize,
    nouns_governance::{ProposalFilter, SortOrder},
    nouns_types::{Proposal, ProposalStatus},
    tokio::sync::mpsc,
    tracing::error,
};

#[derive(Parser)]
pub struct ProposalsCmd {
    /// Only show proposals whose title, description or proposer contains this text
    #[arg(long, short)]
    search: Option<String>,

    /// Only show proposals with this status
    #[arg(long)]
    status: Option<ProposalStatus>,

    /// newest, oldest, most-votes or ending-soon
    #[arg(long, default_value = "newest")]
    sort: SortOrder,

    /// Maximum number of proposals to print
    #[arg(long, default_value_t = 20)]
    limit: usize,

    /// Print JSON instead of a table
    #[arg(long)]
    json: bool,

    /// Keep refreshing until interrupted
    #[arg(long, short)]
    watch: bool,
}

impl ProposalsCmd {
    pub async fn run(self, ctx: Context) -> anyhow::Result<()> {
        let filter = ProposalFilter {
            search: self.search.clone(),
            status: self.status,
            sort: self.sort,
        };

        if !self.watch {
            let proposals = ctx.service.fetch_proposals().await?;
            return self.print(&filter.apply(&proposals));
        }

        // Follow the wallet so an account or network switch shows up while
        // watching.
        let (sender, receiver) = mpsc::channel(16);
        let session = ctx.service.start_session(receiver);
        let watcher = ctx
            .connector
            .wallet()
            .cloned()
            .map(|wallet| watch_wallet(wallet, ctx.cfg.refresh_interval(), sender));

        let mut ticker = tokio::time::interval(ctx.cfg.refresh_interval());

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    match ctx.service.fetch_proposals().await {
                        Ok(proposals) => {
                            let now = Local::now().format("%H:%M:%S");
                            println!("{}", format!("-- refreshed at {now} --").dimmed());
                            self.print(&filter.apply(&proposals))?;
                        },
                        Err(err) => error!(error = %err, "Refresh failed"),
                    }
                },
                _ = tokio::signal::ctrl_c() => break,
            }
        }

        if let Some(watcher) = watcher {
            watcher.abort();
        }
        session.abort();

        Ok(())
    }

    fn print(&self, proposals: &[Proposal]) -> anyhow::Result<()> {
        let shown = &proposals[..proposals.len().min(self.limit)];

        if self.json {
            return print_json_pretty(shown);
        }

        match &self.search {
            Some(term) => println!("{} proposals found matching \"{term}\"", proposals.len()),
            None => println!("{} proposals found", proposals.len()),
        }

        for proposal in shown {
            print_proposal_line(proposal);
        }

        Ok(())
    }
}
