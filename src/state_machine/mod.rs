// Finalizer lifecycle state machine for Notifier and EventSubscription objects
//
// Models the cooperative two-phase delete protocol explicitly: reconcilers observe
// the state from metadata, ask the machine which step is owed, and validate every
// transition they cause.

pub mod events;
pub mod lifecycle_state_machine;
pub mod states;

pub use events::{LifecycleEvent, LifecycleStep};
pub use lifecycle_state_machine::{LifecycleStateMachine, StateMachineError, StateMachineResult};
pub use states::LifecycleState;
