//! One-shot identity assignment loop.
//!
//! The loop waits for the next decoded code and binds it to the pending
//! identity. It runs in the same tick as the scan loop, on the same frame,
//! and ends after its first hit or when its camera session ends.

use passgate_core::{Code, Identity};
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::events::GateEvent;
use crate::identity::IdentityMap;

/// Pending assignment of an identity to the next decoded code.
#[derive(Debug)]
pub struct AssignmentLoop {
    identity: Identity,
    token: CancellationToken,
}

impl AssignmentLoop {
    /// Wait for a code to bind to `identity` within the session of `token`.
    pub fn new(identity: Identity, token: CancellationToken) -> Self {
        Self { identity, token }
    }

    /// Identity waiting for a code.
    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    /// Returns `true` until the camera session ends.
    pub fn is_live(&self) -> bool {
        !self.token.is_cancelled()
    }

    /// Move the pending assignment to a new camera session.
    pub fn rebind(&mut self, token: CancellationToken) {
        self.token = token;
    }

    /// Process the decode result of one frame.
    ///
    /// Returns the confirmation event once a code was bound; the loop is
    /// finished then. A miss returns `None` and the loop waits for the next
    /// tick.
    pub fn step(&self, code: Option<&Code>, identities: &mut IdentityMap) -> Option<GateEvent> {
        let code = code?;

        let previous = identities.assign(code.clone(), self.identity.clone());
        info!(
            %code,
            identity = %self.identity,
            replaced = previous.is_some(),
            "Code assigned"
        );

        Some(GateEvent::Assigned {
            code: code.clone(),
            identity: self.identity.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pending(first: &str, last: &str) -> AssignmentLoop {
        AssignmentLoop::new(
            Identity::new(first, last).unwrap(),
            CancellationToken::new(),
        )
    }

    #[test]
    fn test_miss_keeps_waiting() {
        let assignment = pending("Jane", "Doe");
        let mut identities = IdentityMap::new();

        assert!(assignment.step(None, &mut identities).is_none());
        assert!(identities.is_empty());
    }

    #[test]
    fn test_hit_binds_code() {
        let assignment = pending("Jane", "Doe");
        let mut identities = IdentityMap::new();

        let event = assignment.step(Some(&Code::from("XYZ")), &mut identities);

        assert_eq!(
            event,
            Some(GateEvent::Assigned {
                code: Code::from("XYZ"),
                identity: Identity::new("Jane", "Doe").unwrap(),
            })
        );
        assert_eq!(
            identities.lookup(&Code::from("XYZ")).map(Identity::display_name),
            Some("Jane Doe".to_string())
        );
    }

    #[test]
    fn test_rebind_survives_old_session() {
        let old = CancellationToken::new();
        let mut assignment = AssignmentLoop::new(Identity::new("Jane", "Doe").unwrap(), old.clone());

        old.cancel();
        assert!(!assignment.is_live());

        assignment.rebind(CancellationToken::new());
        assert!(assignment.is_live());
    }
}
