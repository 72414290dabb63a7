//! Binding a discovered candidate onto a managed server record.

use crate::models::{DiscoveredCandidate, ServerRecord};

/// Copy the candidate's connection fields onto `target`.
///
/// Only the first LAN address is kept. An unparsable port leaves `port`
/// unset. Every scheme other than the literal `"http"` turns SSL on.
pub fn bind(candidate: &DiscoveredCandidate, target: &mut ServerRecord) {
    target.ip = Some(first_address(&candidate.local_addresses).to_string());
    target.name = candidate.name.clone();
    target.machine_identifier = Some(candidate.machine_identifier.clone());
    target.auth_token = Some(candidate.access_token.clone());
    target.port = parse_port(&candidate.port);
    target.ssl = candidate.scheme != "http";
}

fn first_address(local_addresses: &str) -> &str {
    local_addresses.split(',').next().unwrap_or("")
}

pub fn parse_port(raw: &str) -> Option<u16> {
    match raw.trim().parse::<u16>() {
        Ok(port) => Some(port),
        Err(e) => {
            tracing::warn!(port = raw, error = %e, "candidate port is not a valid port number");
            None
        }
    }
}
