use clap::Parser;
use miette::Result;
use tracing_subscriber::EnvFilter;

use assetpack::cli::Cli;
use assetpack::output::Printer;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let printer = Printer::new(cli.verbose);
    assetpack::cli::build::run(cli, &printer)?;

    Ok(())
}
