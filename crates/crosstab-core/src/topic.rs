use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::schema::TopicSchema;

/// Compile-time binding between a payload type and its topic.
///
/// The topic name doubles as the shared-store key the payload travels under.
/// Implementing this trait (and registering the schema on a channel) is all
/// it takes to add a topic; the channel itself never changes. For topics
/// only known at runtime, register a [`TopicSchema`] directly and go through
/// [`crate::SyncChannel::publish_untyped`].
pub trait TopicPayload: Serialize + DeserializeOwned {
    /// Store key and schema name for this payload type.
    const TOPIC: &'static str;

    /// Validation rules certifying this payload's wire shape.
    fn schema() -> TopicSchema;
}
