mod cli;
mod toolchain;

use clap::Parser as _;

/// `scc` — a source-to-source translator for a small C-family imperative language.
#[derive(clap::Parser)]
#[command(name = "scc")]
struct Arguments {
	#[command(subcommand)]
	command: cli::SubCommand,
}

fn main() -> anyhow::Result<()> {
	Arguments::parse().command.execute()
}
