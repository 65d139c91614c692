//! In-memory module store.
//!
//! Holds every discovered module record plus the dependency edges between
//! them. Each edge is stored twice: on the outgoing set of its source and on
//! the incoming set of its target.

mod chains;
mod mutations;
mod queries;
mod store;
mod traversal;

pub use store::ModuleStore;
pub use traversal::ReachabilitySet;

// These wildcard imports are intentional - they add impl blocks to ModuleStore
#[allow(unused_imports)]
use chains::*;
#[allow(unused_imports)]
use mutations::*;
#[allow(unused_imports)]
use queries::*;
#[allow(unused_imports)]
use traversal::*;
