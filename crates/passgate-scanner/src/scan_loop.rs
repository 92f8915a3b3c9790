//! Continuous scan loop.
//!
//! One step per tick while the camera session is live: a decoded code is
//! recorded in the ledger and decided on, a miss clears the stale decision.
//! The loop holds the session's cancellation token and is dropped by the
//! gate as soon as the token is cancelled.

use passgate_core::Code;
use passgate_storage::{AccessLedger, KeyValueStore};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error};

use crate::events::GateEvent;
use crate::identity::IdentityMap;

/// Per-session scan loop state.
#[derive(Debug)]
pub struct ScanLoop {
    token: CancellationToken,
    steps: u64,
    hits: u64,
}

impl ScanLoop {
    /// Bind a scan loop to a camera session token.
    pub fn new(token: CancellationToken) -> Self {
        Self {
            token,
            steps: 0,
            hits: 0,
        }
    }

    /// Returns `true` until the camera session ends.
    pub fn is_live(&self) -> bool {
        !self.token.is_cancelled()
    }

    /// Number of frames processed.
    pub fn steps(&self) -> u64 {
        self.steps
    }

    /// Number of frames that held a code.
    pub fn hits(&self) -> u64 {
        self.hits
    }

    /// Process the decode result of one frame.
    ///
    /// A presentation the ledger cannot record is refused with
    /// [`GateEvent::AccessRefused`] and is not counted.
    pub async fn step<S: KeyValueStore>(
        &mut self,
        code: Option<&Code>,
        ledger: &AccessLedger<S>,
        identities: &IdentityMap,
    ) -> Vec<GateEvent> {
        self.steps += 1;

        let Some(code) = code else {
            return vec![GateEvent::NoCodeDetected];
        };
        self.hits += 1;

        let mut events = vec![GateEvent::CodeDetected { code: code.clone() }];

        match ledger.record_presentation(code).await {
            Ok(presentation) => {
                debug!(
                    %code,
                    count = %presentation.count,
                    decision = %presentation.decision,
                    "Scan decided"
                );
                events.push(GateEvent::AccessDecided {
                    code: presentation.code,
                    count: presentation.count,
                    decision: presentation.decision,
                });
            }
            Err(e) => {
                error!(%code, error = %e, "Failed to record presentation, refusing entry");
                events.push(GateEvent::AccessRefused {
                    code: code.clone(),
                    reason: e.to_string(),
                });
            }
        }

        if let Some(identity) = identities.lookup(code) {
            events.push(GateEvent::IdentityRecognized {
                code: code.clone(),
                identity: identity.clone(),
            });
        }

        events
    }
}
