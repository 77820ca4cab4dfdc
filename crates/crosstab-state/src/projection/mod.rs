//! Denormalized views reconciled from assignment events.
//!
//! Each context hosts private copies of up to three views: the flat client
//! roster, the focused detail record, and the hierarchical folder/client
//! tree. None of them share memory; every view folds each incoming
//! [`AssignmentEvent`] into its own state. The move logic lives here once,
//! behind the [`Projection`] trait, rather than re-implemented per view
//! owner.

mod detail;
mod roster;
mod tree;

pub use detail::{DetailProjection, DetailRecord};
pub use roster::{ClientRecord, RosterProjection};
pub use tree::{ClientRef, FolderNode, TreeNode, TreeProjection};

use crate::assignment::AssignmentEvent;
use crate::catalog::FolderCatalog;

/// A view kept consistent with the shared assignment facts.
pub trait Projection {
    /// Fold one assignment into the view.
    ///
    /// Application never fails: an unknown client, a folder missing from the
    /// catalog, and an absent focus are all defined no-ops that leave the
    /// view unchanged.
    fn apply(&mut self, event: &AssignmentEvent, catalog: &FolderCatalog);

    /// Drop back to the unpopulated state.
    fn reset(&mut self);
}

/// Every view hosted by one context, reconciled together.
#[derive(Debug, Default)]
pub struct ContextProjections {
    pub roster: RosterProjection,
    pub detail: DetailProjection,
    pub tree: TreeProjection,
}

impl ContextProjections {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Projection for ContextProjections {
    fn apply(&mut self, event: &AssignmentEvent, catalog: &FolderCatalog) {
        self.roster.apply(event, catalog);
        self.detail.apply(event, catalog);
        self.tree.apply(event, catalog);
    }

    fn reset(&mut self) {
        self.roster.reset();
        self.detail.reset();
        self.tree.reset();
    }
}
