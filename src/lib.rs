//! plexconf - Plex server configuration
//!
//! Discovers the Plex servers an account can reach, binds them to managed
//! server records, probes them, enumerates their libraries, and persists the
//! result.

pub mod config;
pub mod discovery;
pub mod libraries;
pub mod mapper;
pub mod models;
pub mod notify;
pub mod paths;
pub mod persist;
pub mod plex_api;
pub mod probe;
pub mod session;
pub mod settings;
pub mod store;

pub use config::ClientConfig;
pub use discovery::DiscoveryCollaborator;
pub use libraries::LibraryCollaborator;
pub use models::{
    Credentials, DiscoveredCandidate, DiscoveryResult, LibraryDirectory, LibraryEntry, LibraryListing, PlexSettings,
    ServerRecord,
};
pub use notify::NotificationSink;
pub use paths::Paths;
pub use plex_api::{ApiError, PlexHttpClient};
pub use probe::ProbeCollaborator;
pub use session::{Collaborators, ConfigSession, Outcome, SessionError};
pub use settings::{JsonSettingsStore, SettingsCollaborator, SettingsError};
pub use store::RecordEdit;
