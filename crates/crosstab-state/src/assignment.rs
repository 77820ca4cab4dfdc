//! The client-folder assignment topic.

use crosstab_core::{FieldRule, TopicPayload, TopicSchema};
use serde::{Deserialize, Serialize};

/// Message that a client's folder assignment changed.
///
/// `folder_id: None` means "unassign, move to the top level". The payload
/// travels as camelCase JSON with `folderId` explicitly `null` in that case;
/// the key is always present. Each publish constructs a fresh value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentEvent {
    pub client_id: String,
    pub folder_id: Option<String>,
}

impl AssignmentEvent {
    /// Assignment of `client_id` into `folder_id`.
    pub fn assign(client_id: impl Into<String>, folder_id: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            folder_id: Some(folder_id.into()),
        }
    }

    /// Move `client_id` to the top level.
    pub fn unassign(client_id: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            folder_id: None,
        }
    }
}

impl TopicPayload for AssignmentEvent {
    const TOPIC: &'static str = "client-folder-change";

    fn schema() -> TopicSchema {
        TopicSchema::new(Self::TOPIC)
            .field(FieldRule::string("clientId").min_len(3))
            .field(FieldRule::string("folderId").min_len(3).nullable())
    }
}
