use {
    crate::{context::Context, print::print_json_pretty, prompt::confirm},
    anyhow::bail,
    clap::Parser,
    colored::Colorize,
    nouns_governance::ProposalDraft,
    std::{fs, path::PathBuf},
};

#[derive(Parser)]
pub struct ProposeCmd {
    /// Proposal title
    #[arg(long)]
    title: String,

    /// Proposal description (markdown)
    #[arg(long, conflicts_with = "description_file", required_unless_present = "description_file")]
    description: Option<String>,

    /// Read the description from a file
    #[arg(long)]
    description_file: Option<PathBuf>,

    /// Target addresses as a JSON array
    #[arg(long, default_value = "")]
    targets: String,

    /// Values in wei as a JSON array
    #[arg(long, default_value = "")]
    values: String,

    /// Function signatures as a JSON array
    #[arg(long, default_value = "")]
    signatures: String,

    /// Hex calldatas as a JSON array
    #[arg(long, default_value = "")]
    calldatas: String,

    /// Print what would be submitted and exit
    #[arg(long)]
    preview: bool,

    /// Skip confirmation
    #[arg(short, long)]
    yes: bool,
}

impl ProposeCmd {
    pub async fn run(self, ctx: Context) -> anyhow::Result<()> {
        let description = match &self.description_file {
            Some(path) => fs::read_to_string(path)?,
            None => self.description.clone().unwrap_or_default(),
        };

        let draft = ProposalDraft {
            title: self.title,
            description,
            targets: self.targets,
            values: self.values,
            signatures: self.signatures,
            calldatas: self.calldatas,
        };

        let submission = draft.preview()?;

        if self.preview {
            return print_json_pretty(&submission);
        }

        if !self.yes
            && !confirm(format!(
                "Submit proposal \"{}\" with {} action(s)?",
                draft.title.trim(),
                submission.action_count()
            ))?
        {
            bail!("proposal aborted");
        }

        let receipt = ctx
            .service
            .propose(&draft, |hash| {
                println!("Proposal submitted: {hash}");
                println!("{}", "Waiting for confirmation...".dimmed());
            })
            .await?;

        println!(
            "{} in block {}",
            "Proposal created".green().bold(),
            receipt.block_number
        );

        Ok(())
    }
}
