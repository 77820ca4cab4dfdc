//! Validated publish/subscribe over the shared store.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use serde_json::Value;
use tracing::{debug, warn};

use crate::registry::{RegistryError, SchemaRegistry, ValidationIssue};
use crate::schema::TopicSchema;
use crate::store::{ChangeEvent, ListenerId, SharedStore};
use crate::topic::TopicPayload;

/// Limits applied to values crossing the shared-store boundary.
#[derive(Debug, Clone)]
pub struct ChannelConfig {
    /// Serialized payloads larger than this are rejected outgoing and
    /// dropped incoming.
    pub max_value_bytes: usize,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            max_value_bytes: 64 * 1024,
        }
    }
}

/// Error from a publish attempt. A failed publish writes nothing.
#[derive(Debug, thiserror::Error)]
pub enum PublishError {
    #[error("invalid payload for topic '{topic}'")]
    Rejected {
        topic: String,
        issues: Vec<ValidationIssue>,
    },

    #[error("payload for topic '{topic}' exceeds {limit} bytes")]
    Oversized { topic: String, limit: usize },

    #[error("payload serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Handle for a registered subscriber. Pass back to
/// [`SyncChannel::unsubscribe`] to detach it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subscription {
    topic: String,
    id: u64,
}

impl Subscription {
    pub fn topic(&self) -> &str {
        &self.topic
    }
}

struct Subscriber {
    id: u64,
    deliver: Rc<dyn Fn(&Value)>,
}

struct ChannelState {
    registry: SchemaRegistry,
    subscribers: HashMap<String, Vec<Subscriber>>,
    last_seen: HashMap<String, Value>,
    next_id: u64,
    config: ChannelConfig,
}

/// One context's end of the synchronization channel.
///
/// Publishing validates the payload, writes it under the topic key,
/// dispatches it to this context's own subscribers (the platform
/// notification only reaches *other* contexts), then clears the key: the
/// store is a relay, and a context that starts later or re-reads the store
/// must not replay a stale message.
///
/// Everything arriving off the store is untrusted. Deleted keys, oversized
/// values, unparseable bytes, and schema violations are dropped with a
/// diagnostic; subscribers only ever observe validated payloads, at most
/// once per publish.
pub struct SyncChannel<S: SharedStore> {
    store: S,
    state: Rc<RefCell<ChannelState>>,
    listener: ListenerId,
}

impl<S: SharedStore> SyncChannel<S> {
    pub fn new(store: S) -> Self {
        Self::with_config(store, ChannelConfig::default())
    }

    pub fn with_config(store: S, config: ChannelConfig) -> Self {
        let state = Rc::new(RefCell::new(ChannelState {
            registry: SchemaRegistry::new(),
            subscribers: HashMap::new(),
            last_seen: HashMap::new(),
            next_id: 0,
            config,
        }));
        let listener = {
            let state = Rc::clone(&state);
            store.on_change(Box::new(move |event| ingest(&state, event)))
        };
        Self {
            store,
            state,
            listener,
        }
    }

    /// Register `T`'s topic on this channel.
    pub fn register<T: TopicPayload>(&self) -> Result<(), RegistryError> {
        self.register_schema(T::schema())
    }

    /// Register a topic only known at runtime.
    pub fn register_schema(&self, schema: TopicSchema) -> Result<(), RegistryError> {
        self.state.borrow_mut().registry.register(schema)
    }

    /// Validate and relay a payload to every subscribed handler in every
    /// context, this one included.
    pub fn publish<T: TopicPayload>(&self, payload: &T) -> Result<(), PublishError> {
        let candidate = serde_json::to_value(payload)?;
        self.publish_untyped(T::TOPIC, candidate)
    }

    /// Runtime entry point for topics without a compile-time payload type.
    pub fn publish_untyped(&self, topic: &str, candidate: Value) -> Result<(), PublishError> {
        if let Err(issues) = self.state.borrow().registry.validate(topic, &candidate) {
            warn!(topic, ?issues, "publish rejected, nothing written");
            return Err(PublishError::Rejected {
                topic: topic.to_string(),
                issues,
            });
        }

        let raw = candidate.to_string();
        let limit = self.state.borrow().config.max_value_bytes;
        if raw.len() > limit {
            warn!(topic, len = raw.len(), limit, "publish rejected, payload too large");
            return Err(PublishError::Oversized {
                topic: topic.to_string(),
                limit,
            });
        }

        self.store.write(topic, &raw);
        // The platform notification skips the originating context, so local
        // subscribers get the same event through the same ingest path.
        ingest(
            &self.state,
            &ChangeEvent {
                key: topic.to_string(),
                new_value: Some(raw),
            },
        );
        // Relay semantics: the value has been delivered, the store must not
        // keep it for late readers to replay.
        self.store.clear(topic);
        debug!(topic, "published");
        Ok(())
    }

    /// Register `handler` for validated deliveries on `T`'s topic.
    ///
    /// Nothing is queued while detached and nothing is replayed on
    /// subscribe; the handler only sees publishes that happen after this
    /// call. The topic must be registered for deliveries to reach it.
    pub fn subscribe<T: TopicPayload>(&self, handler: impl Fn(&T) + 'static) -> Subscription {
        let deliver: Rc<dyn Fn(&Value)> = Rc::new(move |value: &Value| {
            match serde_json::from_value::<T>(value.clone()) {
                Ok(payload) => handler(&payload),
                Err(err) => {
                    warn!(topic = T::TOPIC, %err, "validated payload did not deserialize, dropped")
                }
            }
        });
        let mut state = self.state.borrow_mut();
        let id = state.next_id;
        state.next_id += 1;
        state
            .subscribers
            .entry(T::TOPIC.to_string())
            .or_default()
            .push(Subscriber { id, deliver });
        Subscription {
            topic: T::TOPIC.to_string(),
            id,
        }
    }

    /// Detach a subscriber. Detaching twice is a no-op.
    pub fn unsubscribe(&self, subscription: &Subscription) {
        if let Some(subs) = self
            .state
            .borrow_mut()
            .subscribers
            .get_mut(&subscription.topic)
        {
            subs.retain(|s| s.id != subscription.id);
        }
    }

    /// Most recent validated payload seen on `T`'s topic in this context,
    /// whether published here or delivered from elsewhere.
    pub fn last<T: TopicPayload>(&self) -> Option<T> {
        let value = self.state.borrow().last_seen.get(T::TOPIC).cloned()?;
        serde_json::from_value(value).ok()
    }
}

impl<S: SharedStore> Drop for SyncChannel<S> {
    fn drop(&mut self) {
        self.store.remove_listener(self.listener);
    }
}

fn ingest(state: &Rc<RefCell<ChannelState>>, event: &ChangeEvent) {
    // Deletions carry no payload; the post-publish clear lands here.
    let Some(raw) = event.new_value.as_deref() else {
        return;
    };
    let topic = event.key.as_str();

    {
        let st = state.borrow();
        if !st.registry.contains(topic) {
            return;
        }
        if raw.len() > st.config.max_value_bytes {
            warn!(topic, len = raw.len(), "oversized value in shared store, dropped");
            return;
        }
    }

    let value: Value = match serde_json::from_str(raw) {
        Ok(v) => v,
        Err(err) => {
            warn!(topic, %err, "unparseable value in shared store, dropped");
            return;
        }
    };

    let subscribers = {
        let mut st = state.borrow_mut();
        if let Err(issues) = st.registry.validate(topic, &value) {
            warn!(topic, ?issues, "value in shared store failed validation, dropped");
            return;
        }
        st.last_seen.insert(topic.to_string(), value.clone());
        st.subscribers
            .get(topic)
            .map(|subs| subs.iter().map(|s| Rc::clone(&s.deliver)).collect::<Vec<_>>())
            .unwrap_or_default()
    };

    // Dispatch outside the borrow; a handler may publish in turn.
    for deliver in subscribers {
        deliver(&value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::FieldRule;
    use crate::store::{MemoryHub, MemoryStore};
    use serde::{Deserialize, Serialize};
    use serde_json::json;

    #[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    struct NotePinned {
        note_id: String,
        shelf_id: Option<String>,
    }

    impl TopicPayload for NotePinned {
        const TOPIC: &'static str = "note-pinned";

        fn schema() -> TopicSchema {
            TopicSchema::new(Self::TOPIC)
                .field(FieldRule::string("noteId").min_len(3))
                .field(FieldRule::string("shelfId").min_len(3).nullable())
        }
    }

    fn channel(hub: &MemoryHub) -> SyncChannel<MemoryStore> {
        let channel = SyncChannel::new(hub.context());
        channel.register::<NotePinned>().unwrap();
        channel
    }

    fn collect(channel: &SyncChannel<MemoryStore>) -> Rc<RefCell<Vec<NotePinned>>> {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        channel.subscribe::<NotePinned>(move |payload| sink.borrow_mut().push(payload.clone()));
        seen
    }

    #[test]
    fn publish_round_trips_in_same_context() {
        let hub = MemoryHub::new();
        let channel = channel(&hub);
        let seen = collect(&channel);

        let payload = NotePinned {
            note_id: "note-1".into(),
            shelf_id: Some("shelf-1".into()),
        };
        channel.publish(&payload).unwrap();

        assert_eq!(seen.borrow().as_slice(), &[payload]);
    }

    #[test]
    fn publish_reaches_other_contexts() {
        let hub = MemoryHub::new();
        let publisher = channel(&hub);
        let receiver = channel(&hub);
        let seen = collect(&receiver);

        let payload = NotePinned {
            note_id: "note-2".into(),
            shelf_id: None,
        };
        publisher.publish(&payload).unwrap();

        assert_eq!(seen.borrow().as_slice(), &[payload]);
    }

    #[test]
    fn store_is_cleared_after_publish() {
        let hub = MemoryHub::new();
        let channel = channel(&hub);

        channel
            .publish(&NotePinned {
                note_id: "note-1".into(),
                shelf_id: None,
            })
            .unwrap();

        assert_eq!(hub.value(NotePinned::TOPIC), None);
    }

    #[test]
    fn invalid_publish_has_no_side_effects() {
        let hub = MemoryHub::new();
        let publisher = channel(&hub);
        let receiver = channel(&hub);
        let seen = collect(&receiver);

        let err = publisher
            .publish(&NotePinned {
                note_id: "ab".into(),
                shelf_id: None,
            })
            .unwrap_err();

        assert!(matches!(err, PublishError::Rejected { .. }));
        assert!(seen.borrow().is_empty());
        assert_eq!(hub.value(NotePinned::TOPIC), None);
    }

    #[test]
    fn tampered_store_content_is_dropped() {
        let hub = MemoryHub::new();
        let receiver = channel(&hub);
        let seen = collect(&receiver);
        let raw = hub.context();

        raw.write(NotePinned::TOPIC, "{invalid json}");
        raw.write(NotePinned::TOPIC, "just a string");
        raw.write(NotePinned::TOPIC, "12345");
        raw.write(NotePinned::TOPIC, &json!({"noteId": "x"}).to_string());
        raw.write(NotePinned::TOPIC, &json!(["note-1", "shelf-1"]).to_string());
        raw.clear(NotePinned::TOPIC);

        assert!(seen.borrow().is_empty());
    }

    #[test]
    fn oversized_store_content_is_dropped() {
        let hub = MemoryHub::new();
        let receiver = SyncChannel::with_config(
            hub.context(),
            ChannelConfig {
                max_value_bytes: 64,
            },
        );
        receiver.register::<NotePinned>().unwrap();
        let seen = collect(&receiver);
        let raw = hub.context();

        let value = json!({
            "noteId": "note-1",
            "shelfId": "x".repeat(200),
        });
        raw.write(NotePinned::TOPIC, &value.to_string());

        assert!(seen.borrow().is_empty());
    }

    #[test]
    fn oversized_publish_is_rejected() {
        let hub = MemoryHub::new();
        let publisher = SyncChannel::with_config(
            hub.context(),
            ChannelConfig {
                max_value_bytes: 32,
            },
        );
        publisher.register::<NotePinned>().unwrap();

        let err = publisher
            .publish(&NotePinned {
                note_id: "note-1".into(),
                shelf_id: Some("shelf-00000000000000000001".into()),
            })
            .unwrap_err();

        assert!(matches!(err, PublishError::Oversized { .. }));
        assert_eq!(hub.value(NotePinned::TOPIC), None);
    }

    #[test]
    fn unsubscribe_is_idempotent() {
        let hub = MemoryHub::new();
        let channel = channel(&hub);

        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let subscription =
            channel.subscribe::<NotePinned>(move |payload| sink.borrow_mut().push(payload.clone()));

        channel.unsubscribe(&subscription);
        channel.unsubscribe(&subscription);

        channel
            .publish(&NotePinned {
                note_id: "note-1".into(),
                shelf_id: None,
            })
            .unwrap();

        assert!(seen.borrow().is_empty());
    }

    #[test]
    fn subscribing_after_publish_replays_nothing() {
        let hub = MemoryHub::new();
        let publisher = channel(&hub);
        let late = channel(&hub);

        publisher
            .publish(&NotePinned {
                note_id: "note-1".into(),
                shelf_id: None,
            })
            .unwrap();

        let seen = collect(&late);
        assert!(seen.borrow().is_empty());
    }

    #[test]
    fn last_tracks_most_recent_validated_payload() {
        let hub = MemoryHub::new();
        let publisher = channel(&hub);
        let receiver = channel(&hub);

        assert_eq!(receiver.last::<NotePinned>(), None);

        let first = NotePinned {
            note_id: "note-1".into(),
            shelf_id: Some("shelf-1".into()),
        };
        let second = NotePinned {
            note_id: "note-2".into(),
            shelf_id: None,
        };
        publisher.publish(&first).unwrap();
        publisher.publish(&second).unwrap();

        assert_eq!(receiver.last::<NotePinned>(), Some(second.clone()));
        // The publisher's own view updated too.
        assert_eq!(publisher.last::<NotePinned>(), Some(second));

        // Tampering does not disturb the last validated value.
        hub.context().write(NotePinned::TOPIC, "{invalid json}");
        assert_eq!(receiver.last::<NotePinned>().map(|p| p.note_id), Some("note-2".into()));
    }

    #[test]
    fn each_subscriber_fires_exactly_once_per_publish() {
        let hub = MemoryHub::new();
        let channel = channel(&hub);
        let first = collect(&channel);
        let second = collect(&channel);

        channel
            .publish(&NotePinned {
                note_id: "note-1".into(),
                shelf_id: None,
            })
            .unwrap();

        assert_eq!(first.borrow().len(), 1);
        assert_eq!(second.borrow().len(), 1);
    }

    #[test]
    fn publish_untyped_validates_runtime_topics() {
        let hub = MemoryHub::new();
        let channel = SyncChannel::new(hub.context());
        channel
            .register_schema(TopicSchema::new("runtime-topic").field(FieldRule::string("id")))
            .unwrap();

        assert!(channel
            .publish_untyped("runtime-topic", json!({"id": "abc"}))
            .is_ok());
        let err = channel
            .publish_untyped("runtime-topic", json!({"id": 5}))
            .unwrap_err();
        assert!(matches!(err, PublishError::Rejected { .. }));

        let err = channel
            .publish_untyped("never-registered", json!({}))
            .unwrap_err();
        assert!(matches!(err, PublishError::Rejected { .. }));
    }
}
