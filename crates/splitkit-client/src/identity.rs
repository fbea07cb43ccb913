//! Identity linking: `log_in` and `sign_up`.
//!
//! Both post the identifier to the service, adopt the visitor it returns,
//! and merge assignments with the server winning on conflicts. They differ
//! only in the analytics call made afterwards.

use tracing::{info, instrument};

use crate::errors::Result;
use crate::session::Session;
use crate::transport::IdentifierRequest;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum IdentityHook {
    Identify,
    Alias,
}

impl Session {
    /// Link an existing account's identifier to this visitor.
    ///
    /// Afterwards the analytics provider is asked to identify the visitor.
    pub async fn log_in(&self, identifier_type: &str, value: &str) -> Result<()> {
        self.link_identifier(identifier_type, value, IdentityHook::Identify)
            .await
    }

    /// Link a newly created account's identifier to this visitor.
    ///
    /// Afterwards the analytics provider is asked to alias the visitor.
    pub async fn sign_up(&self, identifier_type: &str, value: &str) -> Result<()> {
        self.link_identifier(identifier_type, value, IdentityHook::Alias)
            .await
    }

    #[instrument(skip(self, value))]
    async fn link_identifier(
        &self,
        identifier_type: &str,
        value: &str,
        hook: IdentityHook,
    ) -> Result<()> {
        let request = IdentifierRequest {
            identifier_type: identifier_type.to_string(),
            value: value.to_string(),
            visitor_id: self.visitor_id(),
        };
        let linked = match self.notifier().transport.post_identifier(&request).await {
            Ok(linked) => linked,
            Err(e) => {
                self.log_error(&format!("splitkit linkIdentifier error: {e}"));
                return Err(e);
            }
        };

        let visitor_id = self.with_visitor(|visitor| {
            visitor.link(linked.id, linked.assignments);
            visitor.id().clone()
        });
        info!(visitor_id = %visitor_id, "visitor linked");

        self.notify_unsynced();
        if let Err(e) = self.storage().set_visitor_id(&visitor_id) {
            self.log_error(&format!("splitkit setVisitorId error: {e}"));
        }

        let analytics = &self.notifier().analytics;
        match hook {
            IdentityHook::Identify => analytics.identify(&visitor_id),
            IdentityHook::Alias => analytics.alias(&visitor_id),
        }
        Ok(())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
