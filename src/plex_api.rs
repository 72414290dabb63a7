//! HTTP access to plex.tv and to individual Plex servers.

use async_trait::async_trait;
use serde::Deserialize;

use crate::config::ClientConfig;
use crate::discovery::DiscoveryCollaborator;
use crate::libraries::LibraryCollaborator;
use crate::models::{DiscoveredCandidate, DiscoveryResult, LibraryDirectory, LibraryListing, ServerRecord};
use crate::probe::ProbeCollaborator;

pub const DEFAULT_SERVER_PORT: u16 = 32400;

const PRODUCT: &str = "plexconf";

fn build_http_client(config: &ClientConfig) -> Result<reqwest::Client, reqwest::Error> {
    reqwest::Client::builder()
        .user_agent(config.user_agent.as_str())
        .connect_timeout(config.connect_timeout)
        .timeout(config.timeout)
        .build()
}

/// Talks to plex.tv for discovery and to each server for probes and library
/// listings. Plex responses are requested as JSON.
#[derive(Debug, Clone)]
pub struct PlexHttpClient {
    client: reqwest::Client,
    config: ClientConfig,
}

impl PlexHttpClient {
    pub fn new(config: ClientConfig) -> Result<Self, ApiError> {
        let client = build_http_client(&config).map_err(ApiError::HttpClient)?;
        Ok(Self { client, config })
    }

    fn get(&self, url: &str) -> reqwest::RequestBuilder {
        self.client
            .get(url)
            .header(reqwest::header::ACCEPT, "application/json")
            .header("X-Plex-Client-Identifier", self.config.client_identifier.as_str())
            .header("X-Plex-Product", PRODUCT)
    }

    fn server_get(&self, server: &ServerRecord, path: &str) -> Result<(String, reqwest::RequestBuilder), ApiError> {
        let url = format!("{}{}", server_base_url(server)?, path);
        let mut request = self.get(&url);
        if let Some(token) = server.auth_token.as_deref().filter(|t| !t.is_empty()) {
            request = request.header("X-Plex-Token", token);
        }
        Ok((url, request))
    }
}

/// `scheme://ip:port` for a configured record.
pub fn server_base_url(server: &ServerRecord) -> Result<String, ApiError> {
    let ip = server.ip.as_deref().filter(|ip| !ip.is_empty()).ok_or(ApiError::NotConfigured)?;
    let scheme = if server.ssl { "https" } else { "http" };
    let port = server.port.unwrap_or(DEFAULT_SERVER_PORT);
    Ok(format!("{}://{}:{}", scheme, ip, port))
}

#[async_trait]
impl DiscoveryCollaborator for PlexHttpClient {
    async fn get_servers(&self, username: &str, password: &str) -> Result<DiscoveryResult, ApiError> {
        let url = format!("{}/pms/servers", self.config.plex_tv_url);
        tracing::debug!(%url, "requesting account servers");

        let resp = self
            .get(&url)
            .basic_auth(username, Some(password))
            .send()
            .await
            .map_err(|source| ApiError::Request { url: url.clone(), source })?;

        if resp.status() == reqwest::StatusCode::UNAUTHORIZED {
            return Ok(DiscoveryResult::failed());
        }
        if !resp.status().is_success() {
            return Err(ApiError::Status {
                url,
                status: resp.status(),
            });
        }

        let body: Envelope<ServerContainer> = resp
            .json()
            .await
            .map_err(|source| ApiError::Request { url: url.clone(), source })?;

        let servers: Vec<_> = body.media_container.servers.into_iter().map(ServerWire::into_candidate).collect();
        tracing::debug!(count = servers.len(), "account servers received");
        Ok(DiscoveryResult { success: true, servers })
    }
}

#[async_trait]
impl ProbeCollaborator for PlexHttpClient {
    async fn test(&self, server: &ServerRecord) -> bool {
        let (url, request) = match self.server_get(server, "/identity") {
            Ok(r) => r,
            Err(e) => {
                tracing::debug!(error = %e, "probe skipped");
                return false;
            }
        };
        match request.send().await {
            Ok(resp) if resp.status().is_success() => true,
            Ok(resp) => {
                tracing::debug!(%url, status = %resp.status(), "probe rejected");
                false
            }
            Err(e) => {
                tracing::debug!(%url, error = %e, "probe failed");
                false
            }
        }
    }
}

#[async_trait]
impl LibraryCollaborator for PlexHttpClient {
    async fn get_libraries(&self, server: &ServerRecord) -> Result<LibraryListing, ApiError> {
        let (url, request) = self.server_get(server, "/library/sections")?;
        tracing::debug!(%url, "requesting library sections");

        let resp = request
            .send()
            .await
            .map_err(|source| ApiError::Request { url: url.clone(), source })?;
        if !resp.status().is_success() {
            return Err(ApiError::Status {
                url,
                status: resp.status(),
            });
        }

        let body: Envelope<DirectoryContainer> = resp
            .json()
            .await
            .map_err(|source| ApiError::Request { url: url.clone(), source })?;
        Ok(LibraryListing {
            directories: body.media_container.directories,
        })
    }
}

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    #[serde(rename = "MediaContainer")]
    media_container: T,
}

#[derive(Debug, Default, Deserialize)]
struct ServerContainer {
    #[serde(rename = "Server", default)]
    servers: Vec<ServerWire>,
}

#[derive(Debug, Default, Deserialize)]
struct DirectoryContainer {
    #[serde(rename = "Directory", default)]
    directories: Vec<LibraryDirectory>,
}

/// plex.tv reports `port` as either a number or a string.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ServerWire {
    #[serde(default)]
    name: String,
    #[serde(default)]
    local_addresses: String,
    #[serde(default)]
    machine_identifier: String,
    #[serde(default)]
    access_token: String,
    #[serde(default)]
    port: serde_json::Value,
    #[serde(default)]
    scheme: String,
}

impl ServerWire {
    fn into_candidate(self) -> DiscoveredCandidate {
        let port = match self.port {
            serde_json::Value::String(s) => s,
            serde_json::Value::Number(n) => n.to_string(),
            _ => String::new(),
        };
        DiscoveredCandidate {
            name: self.name,
            local_addresses: self.local_addresses,
            machine_identifier: self.machine_identifier,
            access_token: self.access_token,
            port,
            scheme: self.scheme,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("HTTP client error: {0}")]
    HttpClient(#[source] reqwest::Error),
    #[error("Failed to fetch {url}: {source}")]
    Request { url: String, source: reqwest::Error },
    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: reqwest::StatusCode },
    #[error("Plex is not yet configured correctly")]
    NotConfigured,
    #[error("{0}")]
    Message(String),
}
