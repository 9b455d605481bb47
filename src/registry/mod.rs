//! # Routing Registries
//!
//! Derived, in-memory projections of the live Notifier and EventSubscription
//! objects. They own no persistent state and are rebuilt by replaying every
//! live object after a restart.
//!
//! ## Architecture
//!
//! ```text
//! RoutingTable (one RwLock)
//! ├── SubscriptionIndex   (subscription id -> compiled predicate + notifier ref)
//! └── NotifierRegistry    (notifier key -> backend config)
//! ```

pub mod notifier_registry;
pub mod routing_table;
pub mod subscription_index;

pub use notifier_registry::{NotifierRegistry, RegistryError};
pub use routing_table::{Route, RoutingStats, RoutingTable};
pub use subscription_index::{CompiledPredicate, PredicateError, SubscriptionEntry, SubscriptionIndex};
