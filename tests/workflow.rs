use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::oneshot;

use plexconf::notify::{MemorySink, Severity};
use plexconf::{
    ApiError, Collaborators, ConfigSession, Credentials, DiscoveredCandidate, DiscoveryCollaborator,
    DiscoveryResult, JsonSettingsStore, LibraryCollaborator, LibraryDirectory, LibraryListing, Outcome,
    PlexSettings, ProbeCollaborator, ServerRecord, SettingsCollaborator,
};

fn home_candidate() -> DiscoveredCandidate {
    DiscoveredCandidate {
        name: "Home".into(),
        local_addresses: "192.168.1.5,10.0.0.2".into(),
        machine_identifier: "abc123".into(),
        access_token: "tok".into(),
        port: "32400".into(),
        scheme: "https".into(),
    }
}

/// Plex account that only knows alice.
struct FakeAccount;

#[async_trait]
impl DiscoveryCollaborator for FakeAccount {
    async fn get_servers(&self, username: &str, password: &str) -> Result<DiscoveryResult, ApiError> {
        if username == "alice" && password == "secret" {
            Ok(DiscoveryResult {
                success: true,
                servers: vec![home_candidate()],
            })
        } else {
            Ok(DiscoveryResult::failed())
        }
    }
}

#[async_trait]
impl LibraryCollaborator for FakeAccount {
    async fn get_libraries(&self, server: &ServerRecord) -> Result<LibraryListing, ApiError> {
        if server.auth_token.as_deref() != Some("tok") {
            return Err(ApiError::Message("Unauthorized".into()));
        }
        Ok(LibraryListing {
            directories: vec![
                LibraryDirectory {
                    key: "1".into(),
                    title: "Movies".into(),
                },
                LibraryDirectory {
                    key: "2".into(),
                    title: "TV Shows".into(),
                },
            ],
        })
    }
}

#[async_trait]
impl ProbeCollaborator for FakeAccount {
    async fn test(&self, server: &ServerRecord) -> bool {
        server.ip.as_deref() == Some("192.168.1.5")
    }
}

/// Discovery that holds its reply until the test releases it.
struct GatedDiscovery {
    reply: Mutex<Option<oneshot::Receiver<DiscoveryResult>>>,
}

#[async_trait]
impl DiscoveryCollaborator for GatedDiscovery {
    async fn get_servers(&self, _username: &str, _password: &str) -> Result<DiscoveryResult, ApiError> {
        let rx = self.reply.lock().unwrap().take().expect("one request per gate");
        Ok(rx.await.unwrap_or_default())
    }
}

fn session_with(
    settings: Arc<dyn SettingsCollaborator>,
    discovery: Arc<dyn DiscoveryCollaborator>,
) -> (ConfigSession, Arc<MemorySink>) {
    let sink = Arc::new(MemorySink::new());
    let session = ConfigSession::new(Collaborators {
        settings,
        discovery,
        libraries: Arc::new(FakeAccount),
        probe: Arc::new(FakeAccount),
        notifier: sink.clone(),
    });
    (session, sink)
}

#[tokio::test]
async fn discovered_server_binds_onto_placeholder() {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(JsonSettingsStore::new(dir.path().join("plex.json")));
    let (mut session, sink) = session_with(store.clone(), Arc::new(FakeAccount));

    assert_eq!(session.load().await.unwrap(), Outcome::Applied(()));
    let id = session.add_placeholder();
    session.set_credentials(Credentials::new("alice", "secret"));

    assert_eq!(session.request_servers().await, Outcome::Applied(true));
    session.select_server(0, id).unwrap();

    let record = session.record(id).unwrap();
    assert_eq!(record.ip.as_deref(), Some("192.168.1.5"));
    assert_eq!(record.port, Some(32400));
    assert!(record.ssl);
    assert_eq!(record.machine_identifier.as_deref(), Some("abc123"));
    assert_eq!(record.auth_token.as_deref(), Some("tok"));
    assert_eq!(record.name, "Home");

    let notes = sink.take();
    assert_eq!(notes.len(), 2);
    assert_eq!(notes[0].title, "Loaded");
    assert_eq!(notes[1].message, "Selected Home!");
}

#[tokio::test]
async fn full_workflow_persists_selected_libraries() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("plex.json");
    let (mut session, sink) = session_with(Arc::new(JsonSettingsStore::new(&path)), Arc::new(FakeAccount));

    session.load().await.unwrap();
    let id = session.add_placeholder();
    session.set_credentials(Credentials::new("alice", "secret"));
    session.request_servers().await;
    session.select_server(0, id).unwrap();

    assert_eq!(session.test_server(id).await.unwrap(), Outcome::Applied(true));
    assert_eq!(session.load_libraries(id).await.unwrap(), Outcome::Applied(true));
    session.set_library_enabled(id, "2", true).unwrap();
    assert_eq!(session.save().await.unwrap(), Outcome::Applied(true));

    let notes = sink.take();
    assert!(notes.iter().all(|n| n.severity == Severity::Success));
    assert_eq!(notes.last().unwrap().title, "Settings Saved");

    let reloaded = JsonSettingsStore::new(&path).load_plex_settings().await.unwrap();
    let record = &reloaded.servers[0];
    assert_eq!(record.id, id);
    assert_eq!(record.libraries.len(), 2);
    assert!(!record.libraries[0].enabled);
    assert!(record.libraries[1].enabled);

    let raw = std::fs::read_to_string(&path).unwrap();
    assert!(!raw.contains("secret"));
}

#[tokio::test]
async fn wrong_password_leaves_session_untouched() {
    let dir = tempfile::tempdir().unwrap();
    let (mut session, sink) = session_with(
        Arc::new(JsonSettingsStore::new(dir.path().join("plex.json"))),
        Arc::new(FakeAccount),
    );
    session.set_credentials(Credentials::new("alice", "nope"));

    assert_eq!(session.request_servers().await, Outcome::Applied(false));
    assert!(session.loaded_servers().is_none());

    let notes = sink.take();
    assert_eq!(notes.len(), 1);
    assert_eq!(notes[0].severity, Severity::Warning);
}

#[tokio::test]
async fn save_keeps_only_named_records() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("plex.json");
    let seeded = PlexSettings {
        servers: vec![
            ServerRecord {
                id: 1,
                name: "Home".into(),
                ip: Some("192.168.1.5".into()),
                ..Default::default()
            },
            ServerRecord {
                id: 2,
                name: String::new(),
                ..Default::default()
            },
        ],
    };
    let store = JsonSettingsStore::new(&path);
    store.save_plex_settings(&seeded).await.unwrap();

    let (mut session, _sink) = session_with(Arc::new(store), Arc::new(FakeAccount));
    session.load().await.unwrap();
    assert_eq!(session.settings().servers.len(), 2);
    session.save().await.unwrap();

    let persisted = JsonSettingsStore::new(&path).load_plex_settings().await.unwrap();
    assert_eq!(persisted.servers.len(), 1);
    assert_eq!(persisted.servers[0].name, "Home");
}

#[tokio::test]
async fn reply_after_close_is_discarded() {
    let dir = tempfile::tempdir().unwrap();
    let (tx, rx) = oneshot::channel();
    let gated = GatedDiscovery {
        reply: Mutex::new(Some(rx)),
    };
    let (mut session, sink) = session_with(
        Arc::new(JsonSettingsStore::new(dir.path().join("plex.json"))),
        Arc::new(gated),
    );
    session.set_credentials(Credentials::new("alice", "secret"));
    let token = session.cancellation_token();

    let (outcome, ()) = tokio::join!(session.request_servers(), async move {
        tokio::task::yield_now().await;
        token.cancel();
        let _ = tx.send(DiscoveryResult {
            success: true,
            servers: vec![home_candidate()],
        });
    });

    assert_eq!(outcome, Outcome::Dropped);
    assert!(session.loaded_servers().is_none());
    assert!(session.is_closed());
    assert!(sink.is_empty());
}
