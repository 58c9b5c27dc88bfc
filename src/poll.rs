//! Run-status polling and SLA evaluation.

use std::thread;
use std::time::{Duration, Instant};

use tracing::{debug, info};

use crate::client::PcClient;
use crate::error::PcError;
use crate::response;

/// Statuses after which the service reports no further change.
const TERMINAL_STATUSES: [&str; 5] = [
    "Run Failure",
    "Failed Collating Results",
    "Failed Creating Analysis Data",
    "Canceled",
    "Finished",
];

const SLA_PASSED: &str = "Passed";

/// How often to re-fetch the status, and how long to keep trying overall.
#[derive(Debug, Clone, Copy)]
pub struct PollConfig {
    pub interval: Duration,
    pub max_wait: Duration,
}

/// Outcome of a run that reached a terminal status.
#[derive(Debug, PartialEq, Eq)]
pub enum SlaVerdict {
    Passed,
    NotMet { sla_status: String },
}

pub fn is_terminal(status: &str) -> bool {
    TERMINAL_STATUSES.contains(&status)
}

/// Poll until the run reports a terminal status, then evaluate its SLA.
pub fn await_verdict(
    client: &PcClient,
    run_id: &str,
    config: &PollConfig,
) -> Result<SlaVerdict, PcError> {
    let initial = response::run_status(&client.fetch_run(run_id)?)?;
    debug!(%run_id, status = %initial, "initial run status");
    let terminal = await_terminal_status(initial, config, || {
        response::run_status(&client.fetch_run(run_id)?)
    })?;
    info!(%run_id, status = %terminal, "run reached terminal status");
    let sla_status = response::sla_status(&client.fetch_run(run_id)?)?;
    debug!(%run_id, sla_status = %sla_status, "run SLA status");
    Ok(evaluate_sla(sla_status))
}

/// Re-fetch the status at a fixed interval until it turns terminal.
///
/// Gives up with [`PcError::PollTimeout`] once `max_wait` has elapsed with
/// the run still in a non-terminal status.
fn await_terminal_status<F>(
    initial: String,
    config: &PollConfig,
    mut fetch: F,
) -> Result<String, PcError>
where
    F: FnMut() -> Result<String, PcError>,
{
    let started = Instant::now();
    let mut status = initial;
    while !is_terminal(&status) {
        if started.elapsed() >= config.max_wait {
            return Err(PcError::PollTimeout {
                last_status: status,
                waited_secs: started.elapsed().as_secs(),
            });
        }
        debug!(
            delay_secs = config.interval.as_secs(),
            "waiting before next status fetch"
        );
        thread::sleep(config.interval);
        status = fetch()?;
        debug!(status = %status, "run status after delay");
    }
    Ok(status)
}

fn evaluate_sla(sla_status: String) -> SlaVerdict {
    if sla_status == SLA_PASSED {
        SlaVerdict::Passed
    } else {
        SlaVerdict::NotMet { sla_status }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quick(max_wait_secs: u64) -> PollConfig {
        PollConfig {
            interval: Duration::ZERO,
            max_wait: Duration::from_secs(max_wait_secs),
        }
    }

    #[test]
    fn stops_polling_at_first_terminal_status() {
        let mut remaining = vec!["Finished", "Running"];
        let mut fetches = 0;
        let status = await_terminal_status("Initializing".to_string(), &quick(60), || {
            fetches += 1;
            Ok(remaining.pop().expect("fetched past terminal status").to_string())
        })
        .expect("terminal status");
        assert_eq!(status, "Finished");
        assert_eq!(fetches, 2);
    }

    #[test]
    fn terminal_initial_status_needs_no_fetch() {
        let mut fetches = 0;
        let status = await_terminal_status("Canceled".to_string(), &quick(60), || {
            fetches += 1;
            Ok("unreachable".to_string())
        })
        .expect("terminal status");
        assert_eq!(status, "Canceled");
        assert_eq!(fetches, 0);
    }

    #[test]
    fn gives_up_once_the_wait_budget_is_spent() {
        let err = await_terminal_status("Running".to_string(), &quick(0), || {
            Ok("Running".to_string())
        })
        .unwrap_err();
        match err {
            PcError::PollTimeout { last_status, .. } => assert_eq!(last_status, "Running"),
            other => panic!("expected PollTimeout, got {other:?}"),
        }
    }

    #[test]
    fn fetch_failure_aborts_polling() {
        let err = await_terminal_status("Running".to_string(), &quick(60), || {
            Err(PcError::MissingField { field: "RunStatus" })
        })
        .unwrap_err();
        assert!(matches!(err, PcError::MissingField { field: "RunStatus" }));
    }

    #[test]
    fn every_failure_status_is_terminal() {
        for status in TERMINAL_STATUSES {
            assert!(is_terminal(status));
        }
        assert!(!is_terminal("Running"));
        assert!(!is_terminal("Initializing"));
        assert!(!is_terminal(""));
    }

    #[test]
    fn only_exact_passed_meets_the_sla() {
        assert_eq!(evaluate_sla("Passed".to_string()), SlaVerdict::Passed);
        assert_eq!(
            evaluate_sla("Failed".to_string()),
            SlaVerdict::NotMet {
                sla_status: "Failed".to_string()
            }
        );
        assert!(matches!(
            evaluate_sla("passed".to_string()),
            SlaVerdict::NotMet { .. }
        ));
    }
}
