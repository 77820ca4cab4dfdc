//! Crosstab State - client/folder assignment kept consistent across contexts
//!
//! This crate holds the domain side of the crosstab system:
//!
//! - **Assignment**: The `client-folder-change` topic and its payload
//! - **Catalog**: Static folder id to folder name lookup
//! - **Projection**: The three denormalized views (roster, detail, tree)
//!   and the reconciliation engine that folds assignment events into them
//! - **Source**: Read endpoints that seed the views at context startup,
//!   with a bundled fixture directory
//! - **Context**: Wiring for one running context - channel, catalog, and
//!   hosted projections
//!
//! # Architecture
//!
//! Every context owns private copies of its views; the only thing crossing
//! context boundaries is the validated [`AssignmentEvent`]. One engine
//! ([`ContextProjections`]) applies each delivery to every hosted view, so
//! the move logic exists exactly once no matter how many views consume it.

pub mod assignment;
pub mod catalog;
pub mod context;
pub mod projection;
pub mod source;

pub use assignment::AssignmentEvent;
pub use catalog::{FolderCatalog, FolderRef};
pub use context::SyncContext;
pub use projection::{
    ClientRecord, ClientRef, ContextProjections, DetailProjection, DetailRecord, FolderNode,
    Projection, RosterProjection, TreeNode, TreeProjection,
};
pub use source::{DetailSource, FixtureDirectory, RosterSource, SourceError, TreeSource};
