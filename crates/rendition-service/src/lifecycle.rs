//! Service lifecycle state machine.
//!
//! ```text
//! Uninitialized --create--> Created --start--> Started --stop--> Stopped
//!       \______________________ destroy (from any state) ______________\--> Destroyed
//! ```
//!
//! The current state lives in a [`watch`] channel so observers can await
//! transitions. Checks and updates happen under the channel's own lock, so a
//! rejected transition never changes the state.

use rendition_common::error::{ReportError, Result};
use rendition_common::types::ServiceState;
use tokio::sync::watch;

/// Returns whether `from -> to` is a legal transition.
#[must_use]
pub const fn is_legal(from: ServiceState, to: ServiceState) -> bool {
    matches!(
        (from, to),
        (ServiceState::Uninitialized, ServiceState::Created)
            | (ServiceState::Created, ServiceState::Started)
            | (ServiceState::Started, ServiceState::Stopped)
            | (
                ServiceState::Uninitialized
                    | ServiceState::Created
                    | ServiceState::Started
                    | ServiceState::Stopped,
                ServiceState::Destroyed
            )
    )
}

/// Observable lifecycle state.
#[derive(Debug)]
pub struct Lifecycle {
    state: watch::Sender<ServiceState>,
}

impl Lifecycle {
    /// Creates a lifecycle in [`ServiceState::Uninitialized`].
    #[must_use]
    pub fn new() -> Self {
        let (state, _) = watch::channel(ServiceState::Uninitialized);
        Self { state }
    }

    /// Current state.
    pub fn current(&self) -> ServiceState {
        *self.state.borrow()
    }

    /// Returns a receiver that observes every subsequent transition.
    pub fn subscribe(&self) -> watch::Receiver<ServiceState> {
        self.state.subscribe()
    }

    /// Fails unless the current state is `expected`.
    ///
    /// # Errors
    ///
    /// Returns [`ReportError::IllegalState`] naming the actual state.
    pub fn require(&self, expected: ServiceState, operation: &'static str) -> Result<()> {
        let state = self.current();
        if state == expected {
            Ok(())
        } else {
            Err(ReportError::IllegalState { state, operation })
        }
    }

    /// Fails unless the service is `Created` or `Started`.
    ///
    /// # Errors
    ///
    /// Returns [`ReportError::IllegalState`] naming the actual state.
    pub fn require_serving(&self, operation: &'static str) -> Result<()> {
        let state = self.current();
        if state.is_serving() {
            Ok(())
        } else {
            Err(ReportError::IllegalState { state, operation })
        }
    }

    /// Moves to `to`, provided the current state allows it.
    ///
    /// # Errors
    ///
    /// Returns [`ReportError::IllegalState`] and leaves the state unchanged if
    /// the transition is not legal from the current state.
    pub fn advance(&self, to: ServiceState, operation: &'static str) -> Result<()> {
        let mut observed = ServiceState::Uninitialized;
        let changed = self.state.send_if_modified(|state| {
            observed = *state;
            if is_legal(*state, to) {
                *state = to;
                true
            } else {
                false
            }
        });
        if changed {
            tracing::info!(from = %observed, to = %to, operation, "service state changed");
            Ok(())
        } else {
            Err(ReportError::IllegalState {
                state: observed,
                operation,
            })
        }
    }

    /// Moves to [`ServiceState::Destroyed`] from any other state.
    ///
    /// Returns the previous state, or `None` if already destroyed.
    pub fn destroy(&self) -> Option<ServiceState> {
        let mut previous = None;
        let _ = self.state.send_if_modified(|state| {
            if *state == ServiceState::Destroyed {
                return false;
            }
            previous = Some(*state);
            *state = ServiceState::Destroyed;
            true
        });
        if let Some(from) = previous {
            tracing::info!(from = %from, to = %ServiceState::Destroyed, "service state changed");
        }
        previous
    }
}

impl Default for Lifecycle {
    fn default() -> Self {
        Self::new()
    }
}
