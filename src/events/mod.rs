//! # Controller Events
//!
//! Outcome of every reconcile request (reconciled, requeued, dropped),
//! broadcast for observers such as tests and operational tooling.

pub mod publisher;

pub use publisher::{ControllerEvent, EventPublisher, ReconcileOutcome};
