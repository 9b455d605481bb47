#![allow(clippy::doc_markdown)] // Allow technical terms like EventSubscription, mrkdwn in docs
#![allow(clippy::missing_errors_doc)] // Allow public functions without # Errors sections
#![allow(clippy::must_use_candidate)] // Allow methods without must_use when context is clear

//! # Notify Core
//!
//! Reconciliation core of a cluster notification controller. Users declare
//! **Notifiers** (where to send) and **EventSubscriptions** (which events go
//! to which Notifier); the controller watches cluster events and delivers each
//! matching event to every subscribed Notifier's chat webhook.
//!
//! ## Architecture
//!
//! ```text
//! ClusterClient ──watch──> Controller (work queue + workers)
//!                              │
//!            ┌─────────────────┴─────────────────┐
//!   LifecycleReconciler                   EventReconciler
//!   (finalizers, registration)            (match, render, deliver)
//!            │                                   │
//!            └──────────> RoutingTable <─────────┘
//!                 SubscriptionIndex + NotifierRegistry
//! ```
//!
//! ## Guarantees
//!
//! - a routing entry exists only while its object holds the controller's
//!   finalizer and is not being deleted
//! - reconciles of the same object never overlap; distinct objects run in
//!   parallel up to the configured worker count
//! - retryable delivery failures are retried a bounded number of times;
//!   permanent failures are attempted once
//! - the routing table is derived state, rebuilt by a relist on every start
//!
//! ## Module Organization
//!
//! - [`models`] - Notifier, EventSubscription and cluster event types
//! - [`state_machine`] - Finalizer lifecycle states and transitions
//! - [`registry`] - Subscription index and notifier registry
//! - [`rendering`] - Plain and rich webhook payloads
//! - [`backend`] - Webhook delivery and failure classification
//! - [`cluster`] - Cluster access trait and in-memory implementation
//! - [`controller`] - Reconcilers, work queue and runtime
//! - [`config`] - Layered configuration
//! - [`events`] - Broadcast of reconcile outcomes
//! - [`error`] - Error taxonomy and requeue policy
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use notify_core::cluster::InMemoryCluster;
//! use notify_core::config::ConfigManager;
//! use notify_core::controller::ControllerSystem;
//! use notify_core::logging::init_structured_logging;
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let manager = ConfigManager::load()?;
//! init_structured_logging(&manager.config().logging);
//!
//! let cluster = InMemoryCluster::new();
//! let requests = cluster.watch();
//! let system = ControllerSystem::bootstrap(manager.config().clone(), Arc::new(cluster))?;
//!
//! let handle = system.start(requests);
//! // ...
//! handle.stop().await?;
//! # Ok(())
//! # }
//! ```

pub mod backend;
pub mod cluster;
pub mod config;
pub mod constants;
pub mod controller;
pub mod error;
pub mod events;
pub mod logging;
pub mod models;
pub mod registry;
pub mod rendering;
pub mod state_machine;

pub use backend::{DeliveryError, NotifierBackend, ReqwestTransport, WebhookTransport};
pub use cluster::{ClusterClient, InMemoryCluster, ReconcileRequest, ResourceKind};
pub use config::{ConfigManager, NotifyConfig};
pub use controller::{Controller, ControllerHandle, ControllerSystem, EventReconciler, LifecycleReconciler};
pub use error::{ClusterError, ReconcileError, ReconcileResult, RequeuePolicy};
pub use events::{ControllerEvent, EventPublisher, ReconcileOutcome};
pub use models::{ClusterEvent, EventSubscription, Notifier, ObjectKey, ObjectMeta};
pub use registry::RoutingTable;
pub use rendering::NotificationRenderer;
