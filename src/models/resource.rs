use super::cluster_event::ClusterEvent;
use super::event_subscription::EventSubscription;
use super::notifier::Notifier;
use super::object_meta::{ObjectKey, ObjectMeta};
use crate::constants::kinds;

/// Common accessors over every stored resource kind
pub trait Resource {
    const KIND: &'static str;

    fn metadata(&self) -> &ObjectMeta;

    fn metadata_mut(&mut self) -> &mut ObjectMeta;

    fn object_key(&self) -> ObjectKey {
        self.metadata().key()
    }
}

impl Resource for Notifier {
    const KIND: &'static str = kinds::NOTIFIER;

    fn metadata(&self) -> &ObjectMeta {
        &self.metadata
    }

    fn metadata_mut(&mut self) -> &mut ObjectMeta {
        &mut self.metadata
    }
}

impl Resource for EventSubscription {
    const KIND: &'static str = kinds::EVENT_SUBSCRIPTION;

    fn metadata(&self) -> &ObjectMeta {
        &self.metadata
    }

    fn metadata_mut(&mut self) -> &mut ObjectMeta {
        &mut self.metadata
    }
}

impl Resource for ClusterEvent {
    const KIND: &'static str = kinds::EVENT;

    fn metadata(&self) -> &ObjectMeta {
        &self.metadata
    }

    fn metadata_mut(&mut self) -> &mut ObjectMeta {
        &mut self.metadata
    }
}
