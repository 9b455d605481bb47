//! # Controller
//!
//! Reconcilers for the three watched kinds and the runtime that drives them.
//!
//! ## Components
//!
//! - **LifecycleReconciler**: finalizer protocol plus routing-table upkeep for
//!   Notifier and EventSubscription objects
//! - **EventReconciler**: fan-out of a cluster event to matching notifiers
//! - **Controller**: work queue, workers, requeue policy and startup relist
//! - **ControllerSystem**: configuration-driven wiring of all of the above

pub mod backoff;
pub mod bootstrap;
pub mod event_reconciler;
pub mod lifecycle;
pub mod runtime;
pub mod work_queue;

pub use backoff::BackoffPolicy;
pub use bootstrap::{BootstrapError, ControllerError, ControllerHandle, ControllerSystem};
pub use event_reconciler::{DispatchReport, EventReconciler};
pub use lifecycle::{LifecycleOutcome, LifecycleReconciler, LifecycleResource};
pub use runtime::Controller;
pub use work_queue::WorkQueue;
