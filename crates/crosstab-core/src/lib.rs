//! Crosstab Core - validated cross-context synchronization
//!
//! This crate provides the transport layer for keeping independent execution
//! contexts (browser tabs, windows, embedded views of one application)
//! consistent through a shared key-value store:
//!
//! - **Schema**: Per-topic validation rules for wire payloads
//! - **Registry**: Topic name to rule-set lookup with field-level issues
//! - **Store**: The shared store + change-notification boundary, with an
//!   in-memory hub for tests and demos
//! - **Channel**: Validated publish/subscribe over the store, including
//!   self-delivery for the publishing context and relay-style
//!   write-then-clear semantics
//!
//! # Architecture
//!
//! The shared store is the *only* medium between contexts. A publish
//! validates the payload, writes it under the topic key, hands it to local
//! subscribers directly (the platform notification skips the originating
//! context), then clears the key so the store never acts as durable state.
//! Everything read back off the store is treated as untrusted input:
//! unparseable, oversized, or schema-violating values are dropped with a
//! diagnostic rather than crashing a subscriber.
//!
//! The crate is domain-agnostic. Payload types live with their consumers and
//! bind to a topic through [`TopicPayload`]; adding a topic never touches the
//! channel.

pub mod channel;
pub mod registry;
pub mod schema;
pub mod store;
pub mod topic;

pub use channel::{ChannelConfig, PublishError, Subscription, SyncChannel};
pub use registry::{RegistryError, SchemaRegistry, ValidationIssue};
pub use schema::{FieldKind, FieldRule, TopicSchema};
pub use store::{ChangeEvent, ListenerId, MemoryHub, MemoryStore, SharedStore};
pub use topic::TopicPayload;
