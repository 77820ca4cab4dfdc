//! Read endpoints that seed projections at context startup.
//!
//! Real deployments back these with remote routes; tests and the demo use
//! the bundled fixture set. Fetches run once per context (and once per focus
//! change for details) before the corresponding view first renders.

use thiserror::Error;

use crate::catalog::FolderCatalog;
use crate::projection::{ClientRecord, ClientRef, DetailRecord, FolderNode, TreeNode};

/// Error from a read endpoint.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("client not found: {0}")]
    NotFound(String),

    #[error("source unavailable: {0}")]
    Unavailable(String),
}

/// The full flat client list.
pub trait RosterSource {
    fn fetch_roster(&self) -> Result<Vec<ClientRecord>, SourceError>;
}

/// One client's extended record.
pub trait DetailSource {
    fn fetch_detail(&self, client_id: &str) -> Result<DetailRecord, SourceError>;
}

/// The folder/client tree.
pub trait TreeSource {
    fn fetch_tree(&self) -> Result<Vec<TreeNode>, SourceError>;
}

/// In-memory stand-in for the remote directory endpoints, serving a fixed
/// set of twelve clients across the built-in folders.
#[derive(Debug, Clone, Default)]
pub struct FixtureDirectory;

/// (client id, display name, folder id)
const SEED: &[(&str, &str, Option<&str>)] = &[
    ("client-1", "CloudSync Solutions", Some("folder-1")),
    ("client-2", "DataFlow Analytics", Some("folder-1")),
    ("client-3", "AI Innovations Lab", Some("folder-1")),
    ("client-4", "Fashion Hub Online", Some("folder-2")),
    ("client-5", "Home Decor Marketplace", Some("folder-2")),
    ("client-6", "Sports Gear Direct", Some("folder-2")),
    ("client-7", "MediCare Plus", Some("folder-3")),
    ("client-8", "Wellness Center Network", Some("folder-3")),
    ("client-9", "Acme Corporation", None),
    ("client-10", "Green Energy Solutions", None),
    ("client-11", "Urban Real Estate Group", None),
    ("client-12", "Pacific Consulting Partners", None),
];

impl FixtureDirectory {
    pub fn new() -> Self {
        Self
    }
}

impl RosterSource for FixtureDirectory {
    fn fetch_roster(&self) -> Result<Vec<ClientRecord>, SourceError> {
        let catalog = FolderCatalog::builtin();
        Ok(SEED
            .iter()
            .map(|(id, name, folder)| ClientRecord::new(*id, *name, catalog.resolve(*folder)))
            .collect())
    }
}

impl DetailSource for FixtureDirectory {
    fn fetch_detail(&self, client_id: &str) -> Result<DetailRecord, SourceError> {
        let (id, name, folder) = SEED
            .iter()
            .find(|(id, _, _)| *id == client_id)
            .ok_or_else(|| SourceError::NotFound(client_id.to_string()))?;
        Ok(DetailRecord {
            id: (*id).to_string(),
            name: (*name).to_string(),
            folder: FolderCatalog::builtin().resolve(*folder),
            contact: "someone@example.com".to_string(),
            joined: "25 Feb 2024".to_string(),
            synced: "2 months ago".to_string(),
        })
    }
}

impl TreeSource for FixtureDirectory {
    fn fetch_tree(&self) -> Result<Vec<TreeNode>, SourceError> {
        let catalog = FolderCatalog::builtin();
        let mut nodes: Vec<TreeNode> = catalog
            .iter()
            .map(|folder| {
                let children = SEED
                    .iter()
                    .filter(|(_, _, f)| *f == Some(folder.id.as_str()))
                    .map(|(id, name, _)| ClientRef::new(*id, *name))
                    .collect();
                TreeNode::Folder(
                    FolderNode::new(folder.id.clone(), folder.name.clone()).with_children(children),
                )
            })
            .collect();
        nodes.extend(
            SEED.iter()
                .filter(|(_, _, folder)| folder.is_none())
                .map(|(id, name, _)| TreeNode::Client(ClientRef::new(*id, *name))),
        );
        Ok(nodes)
    }
}
