use serde::{Deserialize, Serialize};

use super::Projection;
use crate::assignment::AssignmentEvent;
use crate::catalog::FolderCatalog;

/// A client entry in the tree, top level or inside a folder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientRef {
    pub id: String,
    pub name: String,
}

impl ClientRef {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// A folder with the clients currently filed under it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FolderNode {
    pub id: String,
    pub name: String,
    pub children: Vec<ClientRef>,
}

impl FolderNode {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            children: Vec::new(),
        }
    }

    pub fn with_children(mut self, children: Vec<ClientRef>) -> Self {
        self.children = children;
        self
    }
}

/// One entry of the hierarchical folder/client view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum TreeNode {
    Folder(FolderNode),
    Client(ClientRef),
}

/// Hierarchical folder/client view.
///
/// A known client appears in exactly one location: inside one folder's
/// children, or once among the top-level entries. Applying assignments
/// preserves that invariant; the same event applied twice lands the client
/// in the same place, never duplicated.
#[derive(Debug, Default)]
pub struct TreeProjection {
    nodes: Vec<TreeNode>,
}

impl TreeProjection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install the tree fetched at context startup.
    pub fn load(&mut self, nodes: Vec<TreeNode>) {
        self.nodes = nodes;
    }

    pub fn nodes(&self) -> &[TreeNode] {
        &self.nodes
    }

    pub fn folder(&self, id: &str) -> Option<&FolderNode> {
        self.nodes.iter().find_map(|node| match node {
            TreeNode::Folder(folder) if folder.id == id => Some(folder),
            _ => None,
        })
    }

    /// Top-level (unfoldered) clients, in order.
    pub fn top_level(&self) -> impl Iterator<Item = &ClientRef> {
        self.nodes.iter().filter_map(|node| match node {
            TreeNode::Client(client) => Some(client),
            _ => None,
        })
    }

    /// How many places `id` occurs across the whole tree.
    pub fn occurrences(&self, id: &str) -> usize {
        self.nodes
            .iter()
            .map(|node| match node {
                TreeNode::Client(client) => usize::from(client.id == id),
                TreeNode::Folder(folder) => {
                    folder.children.iter().filter(|c| c.id == id).count()
                }
            })
            .sum()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.occurrences(id) > 0
    }

    fn folder_mut(&mut self, id: &str) -> Option<&mut FolderNode> {
        self.nodes.iter_mut().find_map(|node| match node {
            TreeNode::Folder(folder) if folder.id == id => Some(folder),
            _ => None,
        })
    }

    /// Detach the client from wherever it currently sits, returning its
    /// display name.
    fn detach(&mut self, client_id: &str) -> Option<String> {
        let top_level = self.nodes.iter().enumerate().find_map(|(idx, node)| match node {
            TreeNode::Client(client) if client.id == client_id => {
                Some((idx, client.name.clone()))
            }
            _ => None,
        });
        if let Some((idx, name)) = top_level {
            self.nodes.remove(idx);
            return Some(name);
        }

        for node in &mut self.nodes {
            if let TreeNode::Folder(folder) = node {
                if let Some(idx) = folder.children.iter().position(|c| c.id == client_id) {
                    return Some(folder.children.remove(idx).name);
                }
            }
        }
        None
    }
}

impl Projection for TreeProjection {
    fn apply(&mut self, event: &AssignmentEvent, _catalog: &FolderCatalog) {
        // Single pass: detach first, then reinsert, so a repeated event
        // cannot duplicate the client. Unknown ids detach nothing and the
        // tree stays as it was.
        let Some(name) = self.detach(&event.client_id) else {
            return;
        };
        let client = ClientRef::new(event.client_id.clone(), name);

        match event.folder_id.as_deref() {
            Some(folder_id) => {
                if let Some(folder) = self.folder_mut(folder_id) {
                    folder.children.push(client);
                } else {
                    // The target folder is not part of this view; keep the
                    // client visible at the top level rather than losing it.
                    self.nodes.push(TreeNode::Client(client));
                }
            }
            None => self.nodes.push(TreeNode::Client(client)),
        }
    }

    fn reset(&mut self) {
        self.nodes.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tree() -> TreeProjection {
        let mut tree = TreeProjection::new();
        tree.load(vec![
            TreeNode::Folder(FolderNode::new("folder-1", "Tech Startups").with_children(vec![
                ClientRef::new("client-1", "CloudSync Solutions"),
                ClientRef::new("client-2", "DataFlow Analytics"),
            ])),
            TreeNode::Folder(FolderNode::new("folder-2", "E-commerce")),
            TreeNode::Client(ClientRef::new("client-9", "Acme Corporation")),
        ]);
        tree
    }

    fn apply(tree: &mut TreeProjection, event: AssignmentEvent) {
        tree.apply(&event, &FolderCatalog::builtin());
    }

    #[test]
    fn top_level_to_folder() {
        let mut tree = tree();
        apply(&mut tree, AssignmentEvent::assign("client-9", "folder-1"));

        assert!(!tree.top_level().any(|c| c.id == "client-9"));
        let folder = tree.folder("folder-1").unwrap();
        assert_eq!(
            folder.children.last(),
            Some(&ClientRef::new("client-9", "Acme Corporation"))
        );
        assert_eq!(tree.occurrences("client-9"), 1);
    }

    #[test]
    fn folder_to_folder() {
        let mut tree = tree();
        apply(&mut tree, AssignmentEvent::assign("client-1", "folder-2"));

        assert!(!tree.folder("folder-1").unwrap().children.iter().any(|c| c.id == "client-1"));
        assert_eq!(
            tree.folder("folder-2").unwrap().children,
            vec![ClientRef::new("client-1", "CloudSync Solutions")]
        );
        // Unrelated entries stay put.
        assert!(tree.folder("folder-1").unwrap().children.iter().any(|c| c.id == "client-2"));
        assert!(tree.top_level().any(|c| c.id == "client-9"));
    }

    #[test]
    fn folder_to_top_level() {
        let mut tree = tree();
        apply(&mut tree, AssignmentEvent::unassign("client-1"));

        assert!(!tree.folder("folder-1").unwrap().children.iter().any(|c| c.id == "client-1"));
        assert!(tree.top_level().any(|c| c.id == "client-1" && c.name == "CloudSync Solutions"));
        assert_eq!(tree.occurrences("client-1"), 1);
    }

    #[test]
    fn missing_target_folder_falls_back_to_top_level() {
        let mut tree = tree();
        apply(&mut tree, AssignmentEvent::assign("client-1", "folder-404"));

        assert_eq!(tree.occurrences("client-1"), 1);
        assert!(tree.top_level().any(|c| c.id == "client-1"));
    }

    #[test]
    fn unknown_client_leaves_the_tree_unchanged() {
        let mut tree = tree();
        let before = tree.nodes().to_vec();
        apply(&mut tree, AssignmentEvent::assign("does-not-exist", "folder-1"));
        assert_eq!(tree.nodes(), before.as_slice());
    }

    #[test]
    fn applying_twice_equals_applying_once() {
        let mut once = tree();
        let mut twice = tree();
        let event = AssignmentEvent::assign("client-9", "folder-1");

        once.apply(&event, &FolderCatalog::builtin());
        twice.apply(&event, &FolderCatalog::builtin());
        twice.apply(&event, &FolderCatalog::builtin());

        assert_eq!(once.nodes(), twice.nodes());
        assert_eq!(twice.occurrences("client-9"), 1);
    }

    #[test]
    fn unassign_twice_keeps_one_top_level_entry() {
        let mut tree = tree();
        let event = AssignmentEvent::unassign("client-1");
        apply(&mut tree, event.clone());
        apply(&mut tree, event);

        assert_eq!(tree.occurrences("client-1"), 1);
    }

    #[test]
    fn tree_wire_shape_is_tagged() {
        let node = TreeNode::Client(ClientRef::new("client-9", "Acme Corporation"));
        assert_eq!(
            serde_json::to_value(&node).unwrap(),
            serde_json::json!({"type": "client", "id": "client-9", "name": "Acme Corporation"})
        );
    }
}
