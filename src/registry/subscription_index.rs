//! # Subscription Index
//!
//! In-memory projection of active EventSubscriptions into compiled match
//! predicates. Entries are keyed by subscription identity in a `BTreeMap`, so
//! `matches` returns ids in ascending (namespace, name) order regardless of
//! insertion order.

use crate::models::{
    ClusterEvent, EventSubscription, EventType, FieldMatcher, ObjectKey, SubscriptionPredicate,
};
use regex::Regex;
use std::collections::BTreeMap;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PredicateError {
    #[error("invalid {field} pattern '{pattern}': {reason}")]
    InvalidPattern {
        field: &'static str,
        pattern: String,
        reason: String,
    },
}

#[derive(Debug, Clone)]
enum CompiledMatcher {
    Exact(String),
    Pattern(Regex),
}

impl CompiledMatcher {
    fn compile(field: &'static str, matcher: &FieldMatcher) -> Result<Self, PredicateError> {
        match matcher {
            FieldMatcher::Exact(value) => Ok(Self::Exact(value.clone())),
            FieldMatcher::Pattern { pattern } => Regex::new(&format!("^(?:{pattern})$"))
                .map(Self::Pattern)
                .map_err(|e| PredicateError::InvalidPattern {
                    field,
                    pattern: pattern.clone(),
                    reason: e.to_string(),
                }),
        }
    }

    fn is_match(&self, value: &str) -> bool {
        match self {
            Self::Exact(expected) => expected == value,
            Self::Pattern(regex) => regex.is_match(value),
        }
    }
}

#[derive(Debug, Clone)]
enum NamespaceScope {
    /// Only events in the subscription's own namespace
    Own(String),
    Matching(CompiledMatcher),
}

/// A subscription predicate ready for evaluation
#[derive(Debug, Clone)]
pub struct CompiledPredicate {
    event_type: Option<EventType>,
    reason: Option<CompiledMatcher>,
    involved_kind: Option<CompiledMatcher>,
    scope: NamespaceScope,
}

impl CompiledPredicate {
    pub fn compile(
        own_namespace: &str,
        predicate: &SubscriptionPredicate,
    ) -> Result<Self, PredicateError> {
        let reason = predicate
            .reason
            .as_ref()
            .map(|m| CompiledMatcher::compile("reason", m))
            .transpose()?;
        let involved_kind = predicate
            .involved_kind
            .as_ref()
            .map(|m| CompiledMatcher::compile("involved_kind", m))
            .transpose()?;
        let scope = match &predicate.namespace {
            Some(m) => NamespaceScope::Matching(CompiledMatcher::compile("namespace", m)?),
            None => NamespaceScope::Own(own_namespace.to_string()),
        };

        Ok(Self {
            event_type: predicate.event_type.clone(),
            reason,
            involved_kind,
            scope,
        })
    }

    /// Total, side-effect-free evaluation against an event
    pub fn is_satisfied_by(&self, event: &ClusterEvent) -> bool {
        let in_scope = match &self.scope {
            NamespaceScope::Own(namespace) => namespace == event.namespace(),
            NamespaceScope::Matching(matcher) => matcher.is_match(event.namespace()),
        };

        in_scope
            && self.event_type.as_ref().map_or(true, |t| *t == event.event_type)
            && self.reason.as_ref().map_or(true, |m| m.is_match(&event.reason))
            && self
                .involved_kind
                .as_ref()
                .map_or(true, |m| m.is_match(&event.involved_object.kind))
    }
}

/// Index entry for one subscription
#[derive(Debug, Clone)]
pub struct SubscriptionEntry {
    pub predicate: CompiledPredicate,
    pub notifier: ObjectKey,
}

impl SubscriptionEntry {
    pub fn from_subscription(subscription: &EventSubscription) -> Result<Self, PredicateError> {
        Ok(Self {
            predicate: CompiledPredicate::compile(
                &subscription.metadata.namespace,
                &subscription.spec.predicate,
            )?,
            notifier: subscription.notifier_key(),
        })
    }
}

#[derive(Debug, Default)]
pub struct SubscriptionIndex {
    entries: BTreeMap<ObjectKey, SubscriptionEntry>,
}

impl SubscriptionIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the entry for `id` wholesale; returns whether one was replaced
    pub fn upsert(&mut self, id: ObjectKey, entry: SubscriptionEntry) -> bool {
        self.entries.insert(id, entry).is_some()
    }

    /// Safe for ids that were never registered
    pub fn remove(&mut self, id: &ObjectKey) -> bool {
        self.entries.remove(id).is_some()
    }

    /// Ids of every subscription whose predicate the event satisfies, ascending
    pub fn matches(&self, event: &ClusterEvent) -> Vec<ObjectKey> {
        self.entries
            .iter()
            .filter(|(_, entry)| entry.predicate.is_satisfied_by(event))
            .map(|(id, _)| id.clone())
            .collect()
    }

    pub fn get(&self, id: &ObjectKey) -> Option<&SubscriptionEntry> {
        self.entries.get(id)
    }

    pub fn contains(&self, id: &ObjectKey) -> bool {
        self.entries.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
