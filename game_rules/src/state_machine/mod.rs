//! Session State Machine - gates every mode change behind a fixed rule table.
//!
//! A transition is legal when:
//! 1. **Known**: the action names an entry in [`TRANSITIONS`]
//! 2. **Placed**: the entry's source mode is the current mode
//! 3. **Guarded**: every [`Condition`] on the entry holds for the snapshot
//!
//! After a legal transition the target mode's [`Validator`]s run against the
//! adopted snapshot. A failing validator does not undo the mode change; it is
//! reported as [`TransitionOutcome::EnteredInvalid`].

mod conditions;
mod mode;
mod transition;
mod validators;

pub use conditions::*;
pub use mode::*;
pub use transition::*;
pub use validators::*;

use tracing::{debug, info, warn};

use crate::world_state::GameSessionState;

/// Guarded finite-state machine over [`SessionMode`].
#[derive(Debug, Clone)]
pub struct SessionStateMachine {
    current: SessionMode,
    state: Option<GameSessionState>,
    transitions: &'static [Transition],
}

impl Default for SessionStateMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionStateMachine {
    /// Create a machine in [`SessionMode::Initializing`].
    pub fn new() -> Self {
        Self {
            current: SessionMode::Initializing,
            state: None,
            transitions: &TRANSITIONS,
        }
    }

    /// Create a machine already in `mode`, e.g. when resuming a saved session.
    pub fn resume(mode: SessionMode, state: GameSessionState) -> Self {
        Self {
            current: mode,
            state: Some(state),
            transitions: &TRANSITIONS,
        }
    }

    pub fn current_mode(&self) -> SessionMode {
        self.current
    }

    /// The snapshot adopted by the last transition, if any.
    pub fn session_state(&self) -> Option<&GameSessionState> {
        self.state.as_ref()
    }

    /// The full, fixed rule table.
    pub fn transitions(&self) -> &'static [Transition] {
        self.transitions
    }

    fn find(&self, action: &str) -> Option<&'static Transition> {
        let transitions: &'static [Transition] = self.transitions;
        transitions.iter().find(|t| t.action == action)
    }

    /// Check a transition and explain why it is refused.
    pub fn check_transition(
        &self,
        action: &str,
        state: &GameSessionState,
    ) -> Result<&'static Transition, TransitionRejection> {
        let transition = self
            .find(action)
            .ok_or_else(|| TransitionRejection::UnknownAction(action.to_string()))?;

        if transition.from != self.current {
            return Err(TransitionRejection::WrongMode {
                action: action.to_string(),
                expected: transition.from,
                current: self.current,
            });
        }

        let unmet: Vec<Condition> = transition
            .conditions
            .iter()
            .copied()
            .filter(|c| !c.evaluate(state))
            .collect();
        if !unmet.is_empty() {
            return Err(TransitionRejection::ConditionsUnmet {
                action: action.to_string(),
                unmet,
            });
        }

        Ok(transition)
    }

    /// True if `action` is legal from the current mode for this snapshot.
    pub fn can_transition(&self, action: &str, state: &GameSessionState) -> bool {
        self.check_transition(action, state).is_ok()
    }

    /// Attempt a transition.
    ///
    /// On success the mode advances and `state` becomes the current snapshot,
    /// then the new mode's validators run. The mode stays advanced even if
    /// validation fails.
    pub fn transition(&mut self, action: &str, state: GameSessionState) -> TransitionOutcome {
        let transition = match self.check_transition(action, &state) {
            Ok(t) => t,
            Err(reason) => {
                debug!(action, mode = %self.current, %reason, "transition rejected");
                return TransitionOutcome::Rejected(reason);
            }
        };

        let from = self.current;
        self.current = transition.to;
        let failed = failed_validators(self.current, &state);
        self.state = Some(state);

        if failed.is_empty() {
            info!(action, %from, to = %self.current, "session transition");
            TransitionOutcome::Entered {
                from,
                to: self.current,
            }
        } else {
            warn!(
                action,
                %from,
                to = %self.current,
                failed = ?failed,
                "entered mode with invalid session state"
            );
            TransitionOutcome::EnteredInvalid {
                from,
                to: self.current,
                failed,
            }
        }
    }

    /// Run the current mode's validators against a snapshot.
    pub fn validate_state(&self, state: &GameSessionState) -> bool {
        failed_validators(self.current, state).is_empty()
    }

    /// Actions legal from the current mode for this snapshot, in table order.
    pub fn valid_actions(&self, state: &GameSessionState) -> Vec<&'static str> {
        self.transitions
            .iter()
            .filter(|t| t.from == self.current)
            .filter(|t| t.conditions.iter().all(|c| c.evaluate(state)))
            .map(|t| t.action)
            .collect()
    }

    /// Return to [`SessionMode::Initializing`] and drop the adopted snapshot.
    pub fn reset(&mut self) {
        self.current = SessionMode::Initializing;
        self.state = None;
    }
}
