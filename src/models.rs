//! Data structures for Plex settings, server records, and discovery results.

use serde::{Deserialize, Deserializer, Serialize};
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Persisted Plex settings document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlexSettings {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub servers: Vec<ServerRecord>,
}

/// A locally managed Plex server entry.
///
/// A record with no `ip` is unconfigured: it is never probed and its
/// libraries are never loaded.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerRecord {
    pub id: u32,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub ip: Option<String>,
    #[serde(default)]
    pub port: Option<u16>,
    #[serde(default)]
    pub ssl: bool,
    #[serde(default)]
    pub machine_identifier: Option<String>,
    #[serde(default, rename = "plexAuthToken")]
    pub auth_token: Option<String>,
    #[serde(
        default,
        rename = "plexSelectedLibraries",
        deserialize_with = "null_as_empty"
    )]
    pub libraries: Vec<LibraryEntry>,
}

impl ServerRecord {
    pub fn is_configured(&self) -> bool {
        self.ip.is_some()
    }
}

/// A library exposed by a server, selectable for inclusion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LibraryEntry {
    pub key: String,
    pub title: String,
    #[serde(default)]
    pub enabled: bool,
}

/// A server the Plex account can see, as returned by discovery.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscoveredCandidate {
    #[serde(default)]
    pub name: String,
    /// Comma-separated list of LAN addresses.
    #[serde(default)]
    pub local_addresses: String,
    #[serde(default)]
    pub machine_identifier: String,
    #[serde(default)]
    pub access_token: String,
    #[serde(default)]
    pub port: String,
    #[serde(default)]
    pub scheme: String,
}

/// Reply of the discovery collaborator.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiscoveryResult {
    pub success: bool,
    pub servers: Vec<DiscoveredCandidate>,
}

impl DiscoveryResult {
    pub fn failed() -> Self {
        Self::default()
    }
}

/// Reply of the library collaborator, one directory per library section.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LibraryListing {
    pub directories: Vec<LibraryDirectory>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LibraryDirectory {
    pub key: String,
    pub title: String,
}

/// Plex account credentials. Never serialized; wiped on drop.
#[derive(Clone, Default, Zeroize, ZeroizeOnDrop)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}
