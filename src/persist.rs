//! Validation applied to settings before they are written.

use crate::models::PlexSettings;

/// Drop records without a name, in place. Returns how many were dropped.
pub fn retain_named(settings: &mut PlexSettings) -> usize {
    let before = settings.servers.len();
    settings.servers.retain(|s| !s.name.is_empty());
    before - settings.servers.len()
}
