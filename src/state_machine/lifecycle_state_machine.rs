use super::events::{LifecycleEvent, LifecycleStep};
use super::states::LifecycleState;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StateMachineError {
    #[error("invalid lifecycle transition from {from} on {event}")]
    InvalidTransition { from: LifecycleState, event: &'static str },
}

pub type StateMachineResult<T> = Result<T, StateMachineError>;

/// Finalizer-gated deletion protocol for declarative resources
///
/// ```text
/// ActiveUnfinalized --FinalizerAdded--> ActiveFinalized
///        |                                   |
/// DeletionRequested                   DeletionRequested
///        v                                   v
///   Collectible <--FinalizerReleased-- TerminatingFinalized
/// ```
///
/// The machine itself holds no state; reconcilers observe the current state
/// from object metadata on every call.
#[derive(Debug, Clone, Copy, Default)]
pub struct LifecycleStateMachine;

impl LifecycleStateMachine {
    /// Determine the target state for an event, rejecting transitions the protocol forbids
    pub fn transition(
        &self,
        from: LifecycleState,
        event: LifecycleEvent,
    ) -> StateMachineResult<LifecycleState> {
        let target = match (from, event) {
            (LifecycleState::ActiveUnfinalized, LifecycleEvent::FinalizerAdded) => {
                LifecycleState::ActiveFinalized
            }
            (LifecycleState::ActiveUnfinalized, LifecycleEvent::DeletionRequested) => {
                LifecycleState::Collectible
            }
            (LifecycleState::ActiveFinalized, LifecycleEvent::DeletionRequested) => {
                LifecycleState::TerminatingFinalized
            }
            (LifecycleState::TerminatingFinalized, LifecycleEvent::FinalizerReleased) => {
                LifecycleState::Collectible
            }
            (from, event) => {
                return Err(StateMachineError::InvalidTransition {
                    from,
                    event: event.event_type(),
                })
            }
        };
        Ok(target)
    }

    /// The reconcile step owed to an object in the given state
    pub fn plan(&self, state: LifecycleState) -> LifecycleStep {
        match state {
            LifecycleState::ActiveUnfinalized => LifecycleStep::AddFinalizerThenRegister,
            LifecycleState::ActiveFinalized => LifecycleStep::Register,
            LifecycleState::TerminatingFinalized => LifecycleStep::UnregisterThenRelease,
            LifecycleState::Collectible => LifecycleStep::Unregister,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn happy_path_walks_to_collectible() {
        let machine = LifecycleStateMachine;
        let state = machine
            .transition(LifecycleState::ActiveUnfinalized, LifecycleEvent::FinalizerAdded)
            .unwrap();
        assert_eq!(state, LifecycleState::ActiveFinalized);

        let state = machine
            .transition(state, LifecycleEvent::DeletionRequested)
            .unwrap();
        assert_eq!(state, LifecycleState::TerminatingFinalized);

        let state = machine
            .transition(state, LifecycleEvent::FinalizerReleased)
            .unwrap();
        assert_eq!(state, LifecycleState::Collectible);
    }

    #[test]
    fn finalizer_release_happens_at_most_once() {
        let machine = LifecycleStateMachine;
        let err = machine
            .transition(LifecycleState::Collectible, LifecycleEvent::FinalizerReleased)
            .unwrap_err();
        assert_eq!(
            err,
            StateMachineError::InvalidTransition {
                from: LifecycleState::Collectible,
                event: "finalizer_released",
            }
        );
        assert!(machine
            .transition(LifecycleState::ActiveFinalized, LifecycleEvent::FinalizerReleased)
            .is_err());
    }

    #[test]
    fn finalizer_cannot_be_added_once_terminating() {
        let machine = LifecycleStateMachine;
        assert!(machine
            .transition(LifecycleState::TerminatingFinalized, LifecycleEvent::FinalizerAdded)
            .is_err());
        assert!(machine
            .transition(LifecycleState::Collectible, LifecycleEvent::FinalizerAdded)
            .is_err());
    }

    #[test]
    fn plan_unregisters_before_release() {
        let machine = LifecycleStateMachine;
        assert_eq!(
            machine.plan(LifecycleState::TerminatingFinalized),
            LifecycleStep::UnregisterThenRelease
        );
        assert_eq!(machine.plan(LifecycleState::Collectible), LifecycleStep::Unregister);
        assert_eq!(
            machine.plan(LifecycleState::ActiveUnfinalized),
            LifecycleStep::AddFinalizerThenRegister
        );
        assert_eq!(machine.plan(LifecycleState::ActiveFinalized), LifecycleStep::Register);
    }

    #[test]
    fn planned_finalizer_changes_are_accepted_transitions() {
        let machine = LifecycleStateMachine;
        let states = [
            LifecycleState::ActiveUnfinalized,
            LifecycleState::ActiveFinalized,
            LifecycleState::TerminatingFinalized,
            LifecycleState::Collectible,
        ];
        for state in states {
            let event = match machine.plan(state) {
                LifecycleStep::AddFinalizerThenRegister => LifecycleEvent::FinalizerAdded,
                LifecycleStep::UnregisterThenRelease => LifecycleEvent::FinalizerReleased,
                LifecycleStep::Register | LifecycleStep::Unregister => continue,
            };
            assert!(machine.transition(state, event).is_ok(), "{state} rejects its own plan");
        }
    }
}
