use {
    crate::context::Context,
    clap::Parser,
    colored::Colorize,
    nouns_contract_client::{ChainReader, RpcProvider},
    nouns_indexer_client::IndexerClient,
    std::{fmt::Display, time::Instant},
};

/// Test the configured endpoints.
#[derive(Parser)]
pub struct CheckCmd;

impl CheckCmd {
    pub async fn run(self, ctx: Context) -> anyhow::Result<()> {
        let indexer = IndexerClient::with_timeout(&ctx.cfg.graph_api_endpoint, ctx.cfg.indexer_timeout());
        let start = Instant::now();
        report(
            "Indexer",
            indexer.endpoint(),
            indexer
                .ping()
                .await
                .map(|_| format!("answered in {} ms", start.elapsed().as_millis())),
        );

        let rpc = RpcProvider::new(&ctx.cfg.eth_rpc_endpoint)?;
        let network = async {
            let (chain_id, block) = tokio::try_join!(rpc.chain_id(), rpc.block_number())?;
            let mismatch = if chain_id == ctx.cfg.chain.expected_chain_id {
                String::new()
            } else {
                format!(" (expected chain {})", ctx.cfg.chain.expected_chain_id)
            };

            Ok::<_, anyhow::Error>(format!("chain {chain_id}{mismatch}, block {block}"))
        }
        .await;
        report("RPC", rpc.endpoint(), network);

        match ctx.connector.wallet() {
            Some(wallet) => report(
                "Wallet",
                wallet.endpoint(),
                wallet
                    .accounts()
                    .await
                    .map(|accounts| format!("{} account(s)", accounts.len())),
            ),
            None => println!("{:<8} {}", "Wallet", "not configured".dimmed()),
        }

        Ok(())
    }
}

fn report<T, E>(name: &str, endpoint: &str, result: Result<T, E>)
where
    T: Display,
    E: Display,
{
    match result {
        Ok(detail) => println!("{:<8} {} {endpoint}: {detail}", name, "ok".green().bold()),
        Err(err) => println!("{:<8} {} {endpoint}: {err}", name, "failed".red().bold()),
    }
}
