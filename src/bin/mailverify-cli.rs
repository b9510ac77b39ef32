#[path = "mailverify-cli/args.rs"]
mod args;
#[path = "mailverify-cli/input.rs"]
mod input;
#[path = "mailverify-cli/output.rs"]
mod output;

use std::process::ExitCode;

use anyhow::{Context, Result};
use mailverify_lib::{BatchRunner, Config, Validator};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::args::Cli;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(&cli);

    // exit codes: 0 OK, 2 invalid addresses, 1 fatal
    match run(cli).await {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::from(1)
        }
    }
}

fn init_tracing(cli: &Cli) {
    let level = cli.log_filter();
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!("mailverify_lib={level},mailverify_cli={level}"))
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli) -> Result<ExitCode> {
    if !cli.has_input() {
        Cli::clap_command().print_help()?;
        println!();
        return Ok(ExitCode::SUCCESS);
    }

    let mut config = match &cli.config {
        Some(path) => Config::from_file(path)
            .with_context(|| format!("load config {}", path.display()))?,
        None => Config::default(),
    };
    cli.apply_to(&mut config);
    config.check().context("invalid settings")?;

    let addresses = input::collect(&cli)?;
    info!(count = addresses.len(), "addresses loaded");

    let Config {
        resolver,
        probe,
        policy,
        batch,
    } = config;
    let validator = Validator::from_options(resolver, probe, policy)
        .context("cannot initialise the DNS resolver")?;
    let report = BatchRunner::new(validator, batch).run(addresses).await;

    output::write_report(&report, cli.format, cli.out.as_deref())?;
    if cli.out.is_some() {
        eprintln!("{}", output::summary_line(&report.summary));
    }

    if output::any_invalid(&report.results) {
        return Ok(ExitCode::from(2));
    }
    Ok(ExitCode::SUCCESS)
}
