//! Failure taxonomy for the run workflow.

use thiserror::Error;

/// Failures that abort the workflow before an SLA verdict is reached.
///
/// An SLA that is not met is a normal terminal outcome, not an error; it is
/// reported through [`crate::poll::SlaVerdict`] and the process exit code.
#[derive(Debug, Error)]
pub enum PcError {
    /// The service could not be reached or the exchange failed outright.
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: Box<ureq::Error>,
    },

    /// The authentication response did not set a required session cookie.
    #[error("authentication response missing cookie {name}")]
    MissingCookie { name: &'static str },

    /// The response body was not well-formed XML.
    #[error("response is not well-formed XML: {0}")]
    Xml(#[from] roxmltree::Error),

    /// An expected element was absent from an otherwise valid response.
    #[error("element <{field}> not found in response")]
    MissingField { field: &'static str },

    /// The service refused to start the run.
    #[error("run start rejected by service: {message}")]
    RunStart { message: String },

    /// The run never reached a terminal status inside the allowed window.
    #[error("run still {last_status:?} after {waited_secs}s; giving up")]
    PollTimeout {
        last_status: String,
        waited_secs: u64,
    },
}
