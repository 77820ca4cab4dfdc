//! Crosstab demo
//!
//! Simulates two contexts ("tabs") of the same application over one
//! in-memory hub: one tab hosts the roster and detail views, the other the
//! sidebar tree. A move published in the first tab converges in the second.

use crosstab_core::MemoryHub;
use crosstab_state::{FixtureDirectory, FolderCatalog, SyncContext};
use tracing::info;
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let hub = MemoryHub::new();
    let directory = FixtureDirectory::new();

    let roster_tab = SyncContext::new(hub.context(), FolderCatalog::builtin())?;
    let sidebar_tab = SyncContext::new(hub.context(), FolderCatalog::builtin())?;

    roster_tab.load_roster(&directory)?;
    roster_tab.open_detail(&directory, "client-9")?;
    sidebar_tab.load_tree(&directory)?;

    info!("moving client-9 into folder-1 from the roster tab");
    roster_tab.move_client("client-9", Some("folder-1"))?;

    let state = sidebar_tab.projections();
    let folder = state
        .tree
        .folder("folder-1")
        .ok_or("folder-1 missing from the fixture tree")?;
    info!(
        children = folder.children.len(),
        top_level = state.tree.top_level().count(),
        "sidebar tab converged"
    );
    for child in &folder.children {
        info!(client = %child.id, name = %child.name, "filed under Tech Startups");
    }

    let roster_state = roster_tab.projections();
    let detail = roster_state
        .detail
        .focused()
        .ok_or("client-9 detail was opened above")?;
    info!(
        folder = detail.folder.as_ref().map(|f| f.name.as_str()).unwrap_or("-"),
        "detail view for client-9"
    );

    Ok(())
}
