//! The Plex configuration session.
//!
//! A [`ConfigSession`] owns the loaded settings, the entered credentials, and
//! the servers found by the last discovery. Every step of the workflow is a
//! method on it. Collaborator calls race the session's cancellation token: a
//! reply that arrives after [`ConfigSession::close`] is discarded without
//! touching state or notifying anyone.

use std::future::Future;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::discovery::{self, DiscoveryCollaborator};
use crate::libraries::{self, LibraryCollaborator};
use crate::mapper;
use crate::models::{Credentials, DiscoveredCandidate, PlexSettings, ServerRecord};
use crate::notify::NotificationSink;
use crate::persist;
use crate::probe::{self, ProbeCollaborator};
use crate::settings::{SettingsCollaborator, SettingsError};
use crate::store::{self, RecordEdit};

/// External services the session delegates to.
#[derive(Clone)]
pub struct Collaborators {
    pub settings: Arc<dyn SettingsCollaborator>,
    pub discovery: Arc<dyn DiscoveryCollaborator>,
    pub libraries: Arc<dyn LibraryCollaborator>,
    pub probe: Arc<dyn ProbeCollaborator>,
    pub notifier: Arc<dyn NotificationSink>,
}

impl Collaborators {
    /// Use one Plex client for discovery, probes, and library listings.
    pub fn with_plex_client<C>(
        settings: Arc<dyn SettingsCollaborator>,
        plex: Arc<C>,
        notifier: Arc<dyn NotificationSink>,
    ) -> Self
    where
        C: DiscoveryCollaborator + LibraryCollaborator + ProbeCollaborator + 'static,
    {
        Self {
            settings,
            discovery: plex.clone(),
            libraries: plex.clone(),
            probe: plex,
            notifier,
        }
    }
}

impl std::fmt::Debug for Collaborators {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Collaborators").finish_non_exhaustive()
    }
}

/// Result of an operation that waited on a collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome<T> {
    Applied(T),
    /// The session was closed before the reply arrived; nothing changed.
    Dropped,
}

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("Server record {0} not found")]
    RecordNotFound(u32),
    #[error("Server record {0} is not configured")]
    NotConfigured(u32),
    #[error("No discovered server at position {0}")]
    NoCandidate(usize),
    #[error("Server record {id} has no library with key {key}")]
    UnknownLibrary { id: u32, key: String },
    #[error(transparent)]
    Settings(#[from] SettingsError),
}

pub struct ConfigSession {
    collaborators: Collaborators,
    settings: PlexSettings,
    credentials: Credentials,
    loaded_servers: Option<Vec<DiscoveredCandidate>>,
    cancel: CancellationToken,
}

impl std::fmt::Debug for ConfigSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfigSession")
            .field("servers", &self.settings.servers.len())
            .field("credentials", &self.credentials)
            .field("loaded_servers", &self.loaded_servers.as_ref().map(Vec::len))
            .field("closed", &self.cancel.is_cancelled())
            .finish()
    }
}

impl ConfigSession {
    /// Start with empty settings; call [`ConfigSession::load`] to fetch them.
    pub fn new(collaborators: Collaborators) -> Self {
        Self {
            collaborators,
            settings: PlexSettings::default(),
            credentials: Credentials::default(),
            loaded_servers: None,
            cancel: CancellationToken::new(),
        }
    }

    pub fn settings(&self) -> &PlexSettings {
        &self.settings
    }

    pub fn record(&self, id: u32) -> Option<&ServerRecord> {
        store::find(&self.settings, id)
    }

    pub fn set_credentials(&mut self, credentials: Credentials) {
        self.credentials = credentials;
    }

    /// Servers from the last successful discovery.
    pub fn loaded_servers(&self) -> Option<&[DiscoveredCandidate]> {
        self.loaded_servers.as_deref()
    }

    /// Token observed by every pending collaborator call. Cancelling it is
    /// equivalent to [`ConfigSession::close`].
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Tear the session down. Replies still in flight are discarded.
    pub fn close(&self) {
        if !self.cancel.is_cancelled() {
            debug!("closing plex configuration session");
            self.cancel.cancel();
        }
    }

    pub fn is_closed(&self) -> bool {
        self.cancel.is_cancelled()
    }

    fn notifier(&self) -> &dyn NotificationSink {
        self.collaborators.notifier.as_ref()
    }

    /// Replace the in-memory settings with the stored ones.
    pub async fn load(&mut self) -> Result<Outcome<()>, SessionError> {
        let reply = until_cancelled(&self.cancel, self.collaborators.settings.load_plex_settings()).await;
        let Some(reply) = reply else {
            return Ok(Outcome::Dropped);
        };
        self.settings = reply?;
        info!(servers = self.settings.servers.len(), "plex settings loaded");
        Ok(Outcome::Applied(()))
    }

    /// Ask the account for its servers using the entered credentials.
    ///
    /// Returns whether discovery succeeded. Failures, transport errors
    /// included, leave the previous candidates in place.
    pub async fn request_servers(&mut self) -> Outcome<bool> {
        debug!(username = %self.credentials.username, "requesting plex servers");
        let reply = until_cancelled(
            &self.cancel,
            self.collaborators
                .discovery
                .get_servers(&self.credentials.username, &self.credentials.password),
        )
        .await;
        let Some(reply) = reply else {
            debug!("discarding discovery reply for closed session");
            return Outcome::Dropped;
        };

        let result = discovery::fold_reply(reply);
        if result.success {
            info!(count = result.servers.len(), "plex servers discovered");
            self.loaded_servers = Some(result.servers);
            self.notifier().success("Loaded", "Found the servers! Please select one!");
            Outcome::Applied(true)
        } else {
            self.notifier().warning(
                "Error When Requesting Plex Servers",
                "Please make sure your username and password are correct",
            );
            Outcome::Applied(false)
        }
    }

    /// Bind the discovered server at `index` onto record `id`.
    pub fn select_server(&mut self, index: usize, id: u32) -> Result<(), SessionError> {
        let candidate = self
            .loaded_servers
            .as_deref()
            .and_then(|servers| servers.get(index))
            .ok_or(SessionError::NoCandidate(index))?;
        let record = store::find_mut(&mut self.settings, id).ok_or(SessionError::RecordNotFound(id))?;

        mapper::bind(candidate, record);
        info!(id, name = %record.name, "bound discovered server");
        self.collaborators
            .notifier
            .success("Success", &format!("Selected {}!", record.name));
        Ok(())
    }

    /// Check that record `id` answers at its address.
    pub async fn test_server(&mut self, id: u32) -> Result<Outcome<bool>, SessionError> {
        let record = self.configured_record(id)?;
        debug!(id, name = %record.name, "probing plex server");

        let Some(reachable) = until_cancelled(&self.cancel, self.collaborators.probe.test(record)).await else {
            return Ok(Outcome::Dropped);
        };
        if reachable {
            self.notifier().success("Connected", &probe::connected_message(record));
        } else {
            self.notifier().error("Connected", &probe::unreachable_message(record));
        }
        Ok(Outcome::Applied(reachable))
    }

    /// Replace the libraries of record `id` with the server's current list.
    ///
    /// Every entry comes back unselected. On failure the previous list is
    /// kept and the collaborator's message is shown as is.
    pub async fn load_libraries(&mut self, id: u32) -> Result<Outcome<bool>, SessionError> {
        let record = self.configured_record(id)?;
        debug!(id, name = %record.name, "loading plex libraries");

        let reply = until_cancelled(&self.cancel, self.collaborators.libraries.get_libraries(record)).await;
        let Some(reply) = reply else {
            return Ok(Outcome::Dropped);
        };

        match reply {
            Ok(listing) => {
                let entries = libraries::to_entries(listing);
                let record = store::find_mut(&mut self.settings, id).ok_or(SessionError::RecordNotFound(id))?;
                info!(id, count = entries.len(), "plex libraries loaded");
                record.libraries = entries;
                Ok(Outcome::Applied(true))
            }
            Err(e) => {
                self.notifier().error("Error", &e.to_string());
                Ok(Outcome::Applied(false))
            }
        }
    }

    /// Look up a record that has an address, reporting the guard failure.
    fn configured_record(&self, id: u32) -> Result<&ServerRecord, SessionError> {
        let record = store::find(&self.settings, id).ok_or(SessionError::RecordNotFound(id))?;
        if !record.is_configured() {
            self.notifier()
                .error("Not Configured", "Plex is not yet configured correctly");
            return Err(SessionError::NotConfigured(id));
        }
        Ok(record)
    }

    /// Append an unconfigured placeholder record.
    pub fn add_placeholder(&mut self) -> u32 {
        let id = store::add_placeholder(&mut self.settings);
        debug!(id, "added placeholder server");
        id
    }

    pub fn remove_server(&mut self, id: u32) -> Option<ServerRecord> {
        let removed = store::remove(&mut self.settings, id);
        if removed.is_some() {
            debug!(id, "removed server");
        }
        removed
    }

    pub fn update_server(&mut self, id: u32, edit: RecordEdit) -> Result<(), SessionError> {
        let record = store::find_mut(&mut self.settings, id).ok_or(SessionError::RecordNotFound(id))?;
        edit.apply(record);
        Ok(())
    }

    pub fn set_library_enabled(&mut self, id: u32, key: &str, enabled: bool) -> Result<(), SessionError> {
        let record = store::find_mut(&mut self.settings, id).ok_or(SessionError::RecordNotFound(id))?;
        if !store::set_library_enabled(record, key, enabled) {
            return Err(SessionError::UnknownLibrary {
                id,
                key: key.to_string(),
            });
        }
        Ok(())
    }

    /// Drop unnamed records, then hand the settings to storage.
    ///
    /// A refused save is reported with error severity.
    pub async fn save(&mut self) -> Result<Outcome<bool>, SessionError> {
        let dropped = persist::retain_named(&mut self.settings);
        if dropped > 0 {
            debug!(dropped, "dropped unnamed server records");
        }

        let reply = until_cancelled(
            &self.cancel,
            self.collaborators.settings.save_plex_settings(&self.settings),
        )
        .await;
        let Some(reply) = reply else {
            return Ok(Outcome::Dropped);
        };

        match reply {
            Ok(true) => {
                info!(servers = self.settings.servers.len(), "plex settings saved");
                self.notifier()
                    .success("Settings Saved", "Successfully saved Plex settings");
                Ok(Outcome::Applied(true))
            }
            Ok(false) => {
                self.notifier().error(
                    "Settings Not Saved",
                    "There was an error when saving the Plex settings",
                );
                Ok(Outcome::Applied(false))
            }
            Err(e) => {
                self.notifier().error("Settings Not Saved", &e.to_string());
                Err(e.into())
            }
        }
    }
}

impl Drop for ConfigSession {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

/// Await `fut` unless `cancel` fires first. A reply that completes after
/// cancellation is discarded as well.
async fn until_cancelled<F: Future>(cancel: &CancellationToken, fut: F) -> Option<F::Output> {
    if cancel.is_cancelled() {
        return None;
    }
    let out = tokio::select! {
        biased;
        _ = cancel.cancelled() => None,
        out = fut => Some(out),
    };
    out.filter(|_| !cancel.is_cancelled())
}
