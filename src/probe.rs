//! Connectivity checks against a configured server.

use async_trait::async_trait;

use crate::models::ServerRecord;

/// Reports whether a server answers at its recorded address.
/// Timeout policy belongs to the implementation.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProbeCollaborator: Send + Sync {
    async fn test(&self, server: &ServerRecord) -> bool;
}

pub(crate) fn connected_message(server: &ServerRecord) -> String {
    format!("Successfully connected to the Plex server {}!", server.name)
}

pub(crate) fn unreachable_message(server: &ServerRecord) -> String {
    format!("We could not connect to the Plex server {}!", server.name)
}
