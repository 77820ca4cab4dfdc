use serde::{Deserialize, Serialize};

use super::Projection;
use crate::assignment::AssignmentEvent;
use crate::catalog::{FolderCatalog, FolderRef};

/// Extended record for the focused client.
///
/// The contact, joined, and synced fields are presentation labels fetched
/// once per focus change; only `folder` is synchronized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetailRecord {
    pub id: String,
    pub name: String,
    pub folder: Option<FolderRef>,
    pub contact: String,
    pub joined: String,
    pub synced: String,
}

/// The single focused detail view, empty until a client is opened.
#[derive(Debug, Default)]
pub struct DetailProjection {
    focused: Option<DetailRecord>,
}

impl DetailProjection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install a freshly fetched record as the focus.
    pub fn focus(&mut self, record: DetailRecord) {
        self.focused = Some(record);
    }

    /// Install a fetched record, then fold in an assignment that may have
    /// raced the fetch. A slow read cannot override an in-flight move this
    /// way.
    pub fn hydrate(
        &mut self,
        record: DetailRecord,
        pending: Option<&AssignmentEvent>,
        catalog: &FolderCatalog,
    ) {
        self.focus(record);
        if let Some(event) = pending {
            self.apply(event, catalog);
        }
    }

    pub fn clear_focus(&mut self) {
        self.focused = None;
    }

    pub fn focused(&self) -> Option<&DetailRecord> {
        self.focused.as_ref()
    }
}

impl Projection for DetailProjection {
    fn apply(&mut self, event: &AssignmentEvent, catalog: &FolderCatalog) {
        if let Some(record) = self.focused.as_mut() {
            if record.id == event.client_id {
                record.folder = catalog.resolve(event.folder_id.as_deref());
            }
        }
    }

    fn reset(&mut self) {
        self.focused = None;
    }
}
