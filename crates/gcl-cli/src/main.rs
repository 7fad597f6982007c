//! CLI entry point - the composition root.

use clap::{CommandFactory, Parser};
use tracing_subscriber::EnvFilter;

use gcl_cli::{Cli, CliConfig, bootstrap, dispatch};

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    // stdout carries gcl's messages, so logs go to stderr
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = CliConfig::from_cli(&cli);
    let Some(command) = cli.command else {
        Cli::command().print_help()?;
        return Ok(());
    };

    let result = match bootstrap(config).await {
        Ok(ctx) => dispatch(&ctx, command).await,
        Err(e) => Err(e),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(e.exit_code());
    }
    Ok(())
}
