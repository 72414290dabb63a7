//! In-memory edits to the server record list.

use rand::Rng;

use crate::models::{PlexSettings, ServerRecord};

pub const PLACEHOLDER_NAME: &str = "New*";
pub const MIN_RECORD_ID: u32 = 1;
pub const MAX_RECORD_ID: u32 = 99_999;

/// Bounded so a nearly full id range cannot spin forever.
const ID_ATTEMPTS: usize = 64;

/// Append an unconfigured placeholder record and return its id.
pub fn add_placeholder(settings: &mut PlexSettings) -> u32 {
    let id = next_record_id(settings, &mut rand::rng());
    settings.servers.push(ServerRecord {
        id,
        name: PLACEHOLDER_NAME.to_string(),
        ..Default::default()
    });
    id
}

/// Random id in [1, 99999], re-drawn while it collides with an existing
/// record. Gives up after a fixed number of draws and keeps the last one.
fn next_record_id<R: Rng>(settings: &PlexSettings, rng: &mut R) -> u32 {
    let mut id = rng.random_range(MIN_RECORD_ID..=MAX_RECORD_ID);
    for _ in 1..ID_ATTEMPTS {
        if find(settings, id).is_none() {
            break;
        }
        id = rng.random_range(MIN_RECORD_ID..=MAX_RECORD_ID);
    }
    id
}

/// Remove the first record with this id. No-op when absent.
pub fn remove(settings: &mut PlexSettings, id: u32) -> Option<ServerRecord> {
    let index = settings.servers.iter().position(|s| s.id == id)?;
    Some(settings.servers.remove(index))
}

pub fn find(settings: &PlexSettings, id: u32) -> Option<&ServerRecord> {
    settings.servers.iter().find(|s| s.id == id)
}

pub fn find_mut(settings: &mut PlexSettings, id: u32) -> Option<&mut ServerRecord> {
    settings.servers.iter_mut().find(|s| s.id == id)
}

/// Operator edits to a record. `None` fields are left as they are.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordEdit {
    pub name: Option<String>,
    pub ip: Option<String>,
    pub port: Option<u16>,
    pub ssl: Option<bool>,
    pub auth_token: Option<String>,
}

impl RecordEdit {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn apply(self, record: &mut ServerRecord) {
        if let Some(name) = self.name {
            record.name = name;
        }
        if let Some(ip) = self.ip {
            record.ip = Some(ip);
        }
        if let Some(port) = self.port {
            record.port = Some(port);
        }
        if let Some(ssl) = self.ssl {
            record.ssl = ssl;
        }
        if let Some(token) = self.auth_token {
            record.auth_token = Some(token);
        }
    }
}

/// Toggle a library selection. Returns false when the key is unknown.
pub fn set_library_enabled(record: &mut ServerRecord, key: &str, enabled: bool) -> bool {
    match record.libraries.iter_mut().find(|l| l.key == key) {
        Some(library) => {
            library.enabled = enabled;
            true
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::LibraryEntry;

    fn named(id: u32, name: &str) -> ServerRecord {
        ServerRecord {
            id,
            name: name.into(),
            ..Default::default()
        }
    }

    #[test]
    fn placeholder_has_marker_name_and_id_in_range() {
        let mut settings = PlexSettings::default();
        for _ in 0..500 {
            let id = add_placeholder(&mut settings);
            assert!((MIN_RECORD_ID..=MAX_RECORD_ID).contains(&id));
        }
        assert_eq!(settings.servers.len(), 500);
        for record in &settings.servers {
            assert_eq!(record.name, "New*");
            assert!(!record.is_configured());
            assert!(record.libraries.is_empty());
        }
    }

    #[test]
    fn colliding_id_is_redrawn() {
        use rand::rngs::StdRng;
        use rand::SeedableRng;

        // Take the first ten ids this seed would produce.
        let mut preview = StdRng::seed_from_u64(7);
        let taken: Vec<u32> = (0..10)
            .map(|_| preview.random_range(MIN_RECORD_ID..=MAX_RECORD_ID))
            .collect();
        let settings = PlexSettings {
            servers: taken.iter().map(|&id| named(id, "Home")).collect(),
        };

        let id = next_record_id(&settings, &mut StdRng::seed_from_u64(7));
        assert!(!taken.contains(&id));
        assert!(find(&settings, id).is_none());
        assert!((MIN_RECORD_ID..=MAX_RECORD_ID).contains(&id));
    }

    #[test]
    fn placeholder_is_appended_last() {
        let mut settings = PlexSettings {
            servers: vec![named(5, "Home")],
        };
        let id = add_placeholder(&mut settings);
        assert_eq!(settings.servers[0].id, 5);
        assert_eq!(settings.servers[1].id, id);
    }

    #[test]
    fn remove_takes_first_match_only() {
        let mut settings = PlexSettings {
            servers: vec![named(1, "a"), named(2, "b"), named(2, "c")],
        };
        let removed = remove(&mut settings, 2).unwrap();
        assert_eq!(removed.name, "b");
        let names: Vec<_> = settings.servers.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, ["a", "c"]);
    }

    #[test]
    fn remove_missing_is_noop() {
        let mut settings = PlexSettings {
            servers: vec![named(1, "a")],
        };
        assert!(remove(&mut settings, 9).is_none());
        assert_eq!(settings.servers.len(), 1);
    }

    #[test]
    fn edit_only_touches_given_fields() {
        let mut record = named(3, "Home");
        record.port = Some(32400);
        RecordEdit {
            ip: Some("10.0.0.9".into()),
            ssl: Some(true),
            ..Default::default()
        }
        .apply(&mut record);
        assert_eq!(record.name, "Home");
        assert_eq!(record.ip.as_deref(), Some("10.0.0.9"));
        assert_eq!(record.port, Some(32400));
        assert!(record.ssl);
        assert!(RecordEdit::default().is_empty());
    }

    #[test]
    fn library_toggle_by_key() {
        let mut record = named(3, "Home");
        record.libraries = vec![LibraryEntry {
            key: "1".into(),
            title: "Movies".into(),
            enabled: false,
        }];
        assert!(set_library_enabled(&mut record, "1", true));
        assert!(record.libraries[0].enabled);
        assert!(!set_library_enabled(&mut record, "2", true));
    }
}
