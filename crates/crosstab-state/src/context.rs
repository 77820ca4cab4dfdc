//! Wiring for one running context.

use std::cell::{Ref, RefCell};
use std::rc::Rc;

use crosstab_core::{PublishError, RegistryError, SharedStore, Subscription, SyncChannel};
use tracing::debug;

use crate::assignment::AssignmentEvent;
use crate::catalog::FolderCatalog;
use crate::projection::{ContextProjections, Projection};
use crate::source::{DetailSource, RosterSource, SourceError, TreeSource};

/// One running execution context: its end of the channel, the folder
/// catalog, and the views it hosts.
///
/// Every validated delivery on the assignment topic, whether published here
/// or in another context, is folded into all hosted views by the same
/// engine. Local user actions go through [`SyncContext::move_client`] and
/// come back as self-deliveries, so a rejected publish leaves the
/// pre-publish state intact.
pub struct SyncContext<S: SharedStore + 'static> {
    channel: SyncChannel<S>,
    catalog: Rc<FolderCatalog>,
    projections: Rc<RefCell<ContextProjections>>,
    subscription: Subscription,
}

impl<S: SharedStore + 'static> SyncContext<S> {
    /// Wire a context over its store handle: register the assignment topic
    /// and subscribe the hosted views to it.
    pub fn new(store: S, catalog: FolderCatalog) -> Result<Self, RegistryError> {
        let channel = SyncChannel::new(store);
        channel.register::<AssignmentEvent>()?;

        let catalog = Rc::new(catalog);
        let projections = Rc::new(RefCell::new(ContextProjections::new()));
        let subscription = {
            let projections = Rc::clone(&projections);
            let catalog = Rc::clone(&catalog);
            channel.subscribe::<AssignmentEvent>(move |event| {
                projections.borrow_mut().apply(event, &catalog);
            })
        };

        Ok(Self {
            channel,
            catalog,
            projections,
            subscription,
        })
    }

    /// Populate the roster view, once, at startup.
    pub fn load_roster(&self, source: &dyn RosterSource) -> Result<(), SourceError> {
        let clients = source.fetch_roster()?;
        self.projections.borrow_mut().roster.load(clients);
        Ok(())
    }

    /// Populate the tree view, once, at startup.
    pub fn load_tree(&self, source: &dyn TreeSource) -> Result<(), SourceError> {
        let nodes = source.fetch_tree()?;
        self.projections.borrow_mut().tree.load(nodes);
        Ok(())
    }

    /// Fetch and focus one client's detail record, folding in the most
    /// recent assignment already seen on the channel so a slow fetch cannot
    /// override an in-flight move.
    pub fn open_detail(&self, source: &dyn DetailSource, client_id: &str) -> Result<(), SourceError> {
        let record = source.fetch_detail(client_id)?;
        let pending = self.channel.last::<AssignmentEvent>();
        self.projections
            .borrow_mut()
            .detail
            .hydrate(record, pending.as_ref(), &self.catalog);
        Ok(())
    }

    /// The one user action: move `client_id` into `folder_id`, or to the
    /// top level with `None`.
    pub fn move_client(&self, client_id: &str, folder_id: Option<&str>) -> Result<(), PublishError> {
        debug!(client_id, ?folder_id, "moving client");
        let event = match folder_id {
            Some(folder_id) => AssignmentEvent::assign(client_id, folder_id),
            None => AssignmentEvent::unassign(client_id),
        };
        self.channel.publish(&event)
    }

    /// Read access to the hosted views for rendering layers.
    pub fn projections(&self) -> Ref<'_, ContextProjections> {
        self.projections.borrow()
    }

    pub fn catalog(&self) -> &FolderCatalog {
        &self.catalog
    }

    pub fn channel(&self) -> &SyncChannel<S> {
        &self.channel
    }

    /// Detach the hosted views from the channel; later deliveries are
    /// ignored until the context is rebuilt.
    pub fn detach(&self) {
        self.channel.unsubscribe(&self.subscription);
    }
}
