//! Entry-point for the `minion-exec` binary.
//!
//! Replays a transcript of inbound agent-protocol messages through the
//! tool-call engine and prints the resulting events.
use clap::Parser;
use minion_exec::Cli;
use minion_exec::run_main;

fn main() -> anyhow::Result<()> {
    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(async {
        let cli = Cli::parse();
        run_main(cli).await?;
        Ok(())
    })
}
