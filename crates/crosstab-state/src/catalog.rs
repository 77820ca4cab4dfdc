//! Static folder catalog.

use serde::{Deserialize, Serialize};

/// A folder clients can be assigned to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FolderRef {
    pub id: String,
    pub name: String,
}

impl FolderRef {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// Ordered, read-only lookup of folder id to display data.
///
/// Lookups are synchronous and a miss resolves to `None`; the catalog never
/// errors.
#[derive(Debug, Clone, Default)]
pub struct FolderCatalog {
    folders: Vec<FolderRef>,
}

impl FolderCatalog {
    pub fn new(folders: Vec<FolderRef>) -> Self {
        Self { folders }
    }

    /// The folder set the fixture data is organized around.
    pub fn builtin() -> Self {
        Self::new(vec![
            FolderRef::new("folder-1", "Tech Startups"),
            FolderRef::new("folder-2", "E-commerce"),
            FolderRef::new("folder-3", "Healthcare"),
        ])
    }

    pub fn get(&self, id: &str) -> Option<&FolderRef> {
        self.folders.iter().find(|f| f.id == id)
    }

    /// Resolve an optional folder id to its display data. `None` in, an
    /// unknown id, and the top level all resolve to `None`.
    pub fn resolve(&self, folder_id: Option<&str>) -> Option<FolderRef> {
        folder_id.and_then(|id| self.get(id)).cloned()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FolderRef> {
        self.folders.iter()
    }

    pub fn len(&self) -> usize {
        self.folders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.folders.is_empty()
    }
}
