use serde::{Deserialize, Serialize};

use super::Projection;
use crate::assignment::AssignmentEvent;
use crate::catalog::{FolderCatalog, FolderRef};

/// One row of the flat client roster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientRecord {
    pub id: String,
    pub name: String,
    pub folder: Option<FolderRef>,
}

impl ClientRecord {
    pub fn new(id: impl Into<String>, name: impl Into<String>, folder: Option<FolderRef>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            folder,
        }
    }
}

/// Flat list of every client known to this context.
#[derive(Debug, Default)]
pub struct RosterProjection {
    clients: Vec<ClientRecord>,
}

impl RosterProjection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install the roster fetched at context startup.
    pub fn load(&mut self, clients: Vec<ClientRecord>) {
        self.clients = clients;
    }

    pub fn clients(&self) -> &[ClientRecord] {
        &self.clients
    }

    pub fn get(&self, id: &str) -> Option<&ClientRecord> {
        self.clients.iter().find(|c| c.id == id)
    }

    pub fn len(&self) -> usize {
        self.clients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }
}

impl Projection for RosterProjection {
    fn apply(&mut self, event: &AssignmentEvent, catalog: &FolderCatalog) {
        // Unknown ids insert nothing: the roster only reflects clients it
        // already knows.
        if let Some(client) = self.clients.iter_mut().find(|c| c.id == event.client_id) {
            client.folder = catalog.resolve(event.folder_id.as_deref());
        }
    }

    fn reset(&mut self) {
        self.clients.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roster() -> RosterProjection {
        let mut roster = RosterProjection::new();
        roster.load(vec![
            ClientRecord::new(
                "client-1",
                "CloudSync Solutions",
                Some(FolderRef::new("folder-1", "Tech Startups")),
            ),
            ClientRecord::new("client-9", "Acme Corporation", None),
        ]);
        roster
    }

    #[test]
    fn assignment_replaces_the_folder() {
        let mut roster = roster();
        roster.apply(
            &AssignmentEvent::assign("client-9", "folder-1"),
            &FolderCatalog::builtin(),
        );

        assert_eq!(
            roster.get("client-9").unwrap().folder,
            Some(FolderRef::new("folder-1", "Tech Startups"))
        );
        // Other entries untouched.
        assert_eq!(
            roster.get("client-1").unwrap().folder,
            Some(FolderRef::new("folder-1", "Tech Startups"))
        );
    }

    #[test]
    fn unassignment_clears_the_folder() {
        let mut roster = roster();
        roster.apply(&AssignmentEvent::unassign("client-1"), &FolderCatalog::builtin());
        assert_eq!(roster.get("client-1").unwrap().folder, None);
    }

    #[test]
    fn unknown_client_changes_nothing() {
        let mut r = roster();
        r.apply(
            &AssignmentEvent::assign("does-not-exist", "folder-1"),
            &FolderCatalog::builtin(),
        );

        assert_eq!(r.len(), 2);
        assert!(r.get("does-not-exist").is_none());
        assert_eq!(r.clients(), roster().clients());
    }

    #[test]
    fn unknown_folder_resolves_to_none() {
        let mut roster = roster();
        roster.apply(
            &AssignmentEvent::assign("client-1", "folder-404"),
            &FolderCatalog::builtin(),
        );
        assert_eq!(roster.get("client-1").unwrap().folder, None);
    }
}
