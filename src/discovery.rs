//! Discovery of the Plex servers visible to an account.

use async_trait::async_trait;

use crate::models::DiscoveryResult;
use crate::plex_api::ApiError;

/// Lists the servers a Plex account can access.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DiscoveryCollaborator: Send + Sync {
    async fn get_servers(&self, username: &str, password: &str) -> Result<DiscoveryResult, ApiError>;
}

/// Fold a transport error into an unsuccessful result.
pub fn fold_reply(reply: Result<DiscoveryResult, ApiError>) -> DiscoveryResult {
    match reply {
        Ok(result) => result,
        Err(e) => {
            tracing::warn!(error = %e, "server discovery failed");
            DiscoveryResult::failed()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DiscoveredCandidate;

    #[test]
    fn transport_error_folds_to_failure() {
        let folded = fold_reply(Err(ApiError::Message("connection refused".into())));
        assert!(!folded.success);
        assert!(folded.servers.is_empty());
    }

    #[test]
    fn successful_reply_passes_through() {
        let reply = DiscoveryResult {
            success: true,
            servers: vec![DiscoveredCandidate {
                name: "Home".into(),
                ..Default::default()
            }],
        };
        assert_eq!(fold_reply(Ok(reply.clone())), reply);
    }
}
