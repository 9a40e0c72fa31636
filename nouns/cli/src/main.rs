mod check;
mod config;
mod connector;
mod context;
mod home_directory;
mod print;
mod prompt;
mod proposals;
mod propose;
mod query;
mod stats;
mod tracing_filter;
mod vote;

use {
    crate::{
        check::CheckCmd,
        config::parse_config,
        context::Context,
        home_directory::HomeDirectory,
        proposals::ProposalsCmd,
        propose::ProposeCmd,
        query::{ShowCmd, VotesCmd},
        stats::StatsCmd,
        tracing_filter::CustomLevelFilter,
        vote::VoteCmd,
    },
    clap::Parser,
    std::path::PathBuf,
    tracing_subscriber::{fmt, prelude::*, registry},
};

#[derive(Parser)]
#[command(author, version, about, next_display_order = None)]
struct Cli {
    /// Directory for the config file [default: ~/.nouns]
    #[arg(long, global = true)]
    home: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Parser)]
enum Command {
    /// Check that the indexer, the RPC node and the wallet answer
    Check(CheckCmd),

    /// List proposals [alias: ls]
    #[command(next_display_order = None, alias = "ls")]
    Proposals(ProposalsCmd),

    /// Create a proposal
    #[command(next_display_order = None)]
    Propose(ProposeCmd),

    /// Show one proposal
    Show(ShowCmd),

    /// DAO statistics, optionally for one account
    Stats(StatsCmd),

    /// Cast a vote
    #[command(next_display_order = None)]
    Vote(VoteCmd),

    /// List the votes cast on a proposal
    Votes(VotesCmd),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse CLI arguments.
    let cli = Cli::parse();

    // Find the home directory from the CLI `--home` flag.
    let app_dir = HomeDirectory::new_or_default(cli.home)?;

    // Parse the config file.
    let cfg = parse_config(app_dir.config_file())?;

    // Set up tracing. Logs go to stderr so JSON output stays clean.
    registry()
        .with(cfg.log_level.parse::<CustomLevelFilter>()?)
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();

    match cli.command {
        Command::Check(cmd) => cmd.run(Context::read_only(cfg)?).await,
        Command::Proposals(cmd) => cmd.run(Context::read_only(cfg)?).await,
        Command::Propose(cmd) => cmd.run(Context::with_wallet(cfg).await?).await,
        Command::Show(cmd) => cmd.run(Context::read_only(cfg)?).await,
        Command::Stats(cmd) => cmd.run(Context::read_only(cfg)?).await,
        Command::Vote(cmd) => cmd.run(Context::with_wallet(cfg).await?).await,
        Command::Votes(cmd) => cmd.run(Context::read_only(cfg)?).await,
    }
}
