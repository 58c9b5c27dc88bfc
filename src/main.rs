use std::process::ExitCode;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

mod auth;
mod client;
mod error;
mod poll;
mod response;

use auth::Credentials;
use client::{PcClient, ProjectLocator, TestSelector};
use poll::{PollConfig, SlaVerdict};

/// Exit code when the run finished but its SLA was not met.
const EXIT_SLA_NOT_MET: u8 = 1;
/// Exit code for any infrastructure or protocol failure.
const EXIT_ERROR: u8 = 2;

#[derive(Parser, Debug)]
#[command(
    name = "pcrun",
    version,
    about = "Start a Performance Center test run and gate on its SLA verdict"
)]
struct Cli {
    /// Base URL of the Performance Center server
    #[arg(long)]
    base_url: String,

    /// Account user name
    #[arg(long)]
    username: String,

    /// Account password
    #[arg(long)]
    password: String,

    /// Domain the project belongs to
    #[arg(long)]
    domain: String,

    /// Project holding the test
    #[arg(long)]
    project: String,

    /// Numeric id of the scenario test
    #[arg(long)]
    test_id: u32,

    /// Numeric id of the test instance inside its test set
    #[arg(long)]
    test_instance_id: u32,

    /// Log filter (e.g. info, debug, pcrun=debug)
    #[arg(long)]
    log_level: String,

    /// Seconds between status fetches
    #[arg(long, default_value_t = 30)]
    poll_interval_secs: u64,

    /// Overall seconds to wait for a terminal status before giving up
    #[arg(long, default_value_t = 5400)]
    max_wait_secs: u64,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    if let Err(err) = init_logging(&cli.log_level) {
        eprintln!("error: {err:#}");
        return ExitCode::from(EXIT_ERROR);
    }
    match run(&cli) {
        Ok(SlaVerdict::Passed) => {
            info!("test passed");
            ExitCode::SUCCESS
        }
        Ok(SlaVerdict::NotMet { sla_status }) => {
            error!(%sla_status, "test failed: run SLA status not met");
            ExitCode::from(EXIT_SLA_NOT_MET)
        }
        Err(err) => {
            error!("{err:#}");
            ExitCode::from(EXIT_ERROR)
        }
    }
}

/// Install the log subscriber once, from the CLI-supplied filter.
///
/// Logs go to stderr so stdout stays clean for the invoking automation.
fn init_logging(filter: &str) -> Result<()> {
    let filter =
        EnvFilter::try_new(filter).with_context(|| format!("invalid log filter {filter:?}"))?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|err| anyhow!("install log subscriber: {err}"))
}

fn run(cli: &Cli) -> Result<SlaVerdict> {
    let credentials = Credentials {
        username: cli.username.clone(),
        password: cli.password.clone(),
    };
    let locator = ProjectLocator {
        domain: cli.domain.clone(),
        project: cli.project.clone(),
    };
    let client = PcClient::authenticate(&cli.base_url, locator, &credentials)
        .context("authenticate against Performance Center")?;
    let run_id = client
        .start_run(TestSelector {
            test_id: cli.test_id,
            test_instance_id: cli.test_instance_id,
        })
        .context("start test run")?;
    info!(%run_id, "test started");
    let config = PollConfig {
        interval: Duration::from_secs(cli.poll_interval_secs),
        max_wait: Duration::from_secs(cli.max_wait_secs),
    };
    poll::await_verdict(&client, &run_id, &config)
        .with_context(|| format!("await verdict for run {run_id}"))
}
