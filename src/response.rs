//! XML response handling for the Runs API.
//!
//! Every response of interest is a flat document whose payload sits in the
//! immediate children of the root element, so a single child-walk lookup
//! serves the run-id, status, and SLA extractions alike.

use roxmltree::Document;

use crate::error::PcError;

pub const RUN_ID: &str = "RunId";
pub const ERROR: &str = "Error";
pub const RUN_STATUS: &str = "RunStatus";
pub const RUN_SLA_STATUS: &str = "RunSlaStatus";

/// Text of the first immediate child of the root element named `field`.
///
/// Tags are compared by local name so namespaced responses resolve the same
/// as plain ones. An absent or empty element is reported as missing rather
/// than returned as an ambiguous empty string.
pub fn child_text(xml: &str, field: &'static str) -> Result<String, PcError> {
    let doc = Document::parse(xml)?;
    doc.root_element()
        .children()
        .filter(|node| node.is_element())
        .find(|node| node.tag_name().name() == field)
        .and_then(|node| node.text())
        .map(str::to_string)
        .ok_or(PcError::MissingField { field })
}

/// Resolve a start-run response into the id of the new run.
///
/// The service reports refusals in-band as an `<Error>` child of the same
/// document shape; that branch becomes a typed failure carrying the remote
/// message, never an id-shaped string.
pub fn parse_start_response(xml: &str) -> Result<String, PcError> {
    let doc = Document::parse(xml)?;
    for node in doc
        .root_element()
        .children()
        .filter(|node| node.is_element())
    {
        match node.tag_name().name() {
            RUN_ID => {
                if let Some(id) = node.text() {
                    return Ok(id.to_string());
                }
            }
            ERROR => {
                return Err(PcError::RunStart {
                    message: node.text().unwrap_or_default().to_string(),
                });
            }
            _ => {}
        }
    }
    Err(PcError::MissingField { field: RUN_ID })
}

/// Current status of the run.
pub fn run_status(xml: &str) -> Result<String, PcError> {
    child_text(xml, RUN_STATUS)
}

/// SLA verdict of a terminal run.
pub fn sla_status(xml: &str) -> Result<String, PcError> {
    child_text(xml, RUN_SLA_STATUS)
}
