//! Library enumeration for a configured server.

use async_trait::async_trait;

use crate::models::{LibraryEntry, LibraryListing, ServerRecord};
use crate::plex_api::ApiError;

/// Lists the library sections a server exposes.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LibraryCollaborator: Send + Sync {
    async fn get_libraries(&self, server: &ServerRecord) -> Result<LibraryListing, ApiError>;
}

/// One unselected entry per directory, in listing order.
pub fn to_entries(listing: LibraryListing) -> Vec<LibraryEntry> {
    listing
        .directories
        .into_iter()
        .map(|d| LibraryEntry {
            key: d.key,
            title: d.title,
            enabled: false,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::LibraryDirectory;

    #[test]
    fn entries_keep_order_and_start_disabled() {
        let listing = LibraryListing {
            directories: vec![
                LibraryDirectory {
                    key: "2".into(),
                    title: "TV Shows".into(),
                },
                LibraryDirectory {
                    key: "1".into(),
                    title: "Movies".into(),
                },
            ],
        };
        let entries = to_entries(listing);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].title, "TV Shows");
        assert_eq!(entries[1].key, "1");
        assert!(entries.iter().all(|e| !e.enabled));
    }
}
