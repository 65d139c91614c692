//! # amdpack-graph
//!
//! Module graph primitives for AMD bundling.
//!
//! Every module in an AMD code base registers itself with
//! `define(id, dependencies, factory)`. This crate models that id space and
//! everything the static bundler needs to know about it:
//!
//! ```text
//! entry ids ──▶ Discoverer ──▶ resolve() ──▶ ModuleStore ──▶ topological_sort()
//!                   │                            │
//!                   ▼                            ▼
//!             Runtime (I/O)              reachable_from() / needed_by_chain()
//! ```
//!
//! - [`ModuleId`] values are interned per [`BuildSession`]; the reserved
//!   pseudo-modules `exports`, `module` and `require` always take ids 0, 1, 2.
//! - [`resolve`] turns a raw dependency string into a [`DependencyRef`].
//! - [`Discoverer`] reads every reachable module exactly once.
//! - [`topological_sort`] orders all modules deterministically.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use amdpack_graph::{BuildSession, Discoverer, topological_sort};
//! use amdpack_graph::runtime::native::NativeRuntime;
//!
//! # #[tokio::main]
//! # async fn main() -> amdpack_graph::Result<()> {
//! let mut session = BuildSession::new();
//! let discoverer = Discoverer::new("src", Arc::new(NativeRuntime::new()));
//! discoverer.discover_into(&mut session.store, &["vs/editor/editor.main"]).await?;
//!
//! let order = topological_sort(&session.store)?;
//! for id in order {
//!     println!("{}", session.store.name(id));
//! }
//! # Ok(())
//! # }
//! ```

pub mod dependency;
pub mod dependency_chain;
pub mod discovery;
mod error;
pub mod memory;
pub mod module;
pub mod module_id;
pub mod resolve;
pub mod runtime;
pub mod session;
pub mod sort;

pub use dependency::DependencyRef;
pub use dependency_chain::DependencyChain;
pub use discovery::{DEFAULT_EXTENSION, Discoverer};
pub use error::{ConfigurationError, Error, Result};
pub use memory::{ModuleStore, ReachabilitySet};
pub use module::{Module, ModuleKind};
pub use module_id::{IdInterner, ModuleId, Reserved};
pub use resolve::{is_relative, normalize, resolve, resolve_id};
pub use runtime::{Runtime, RuntimeError, RuntimeResult};
pub use session::BuildSession;
pub use sort::topological_sort;

#[cfg(any(test, feature = "test-utils"))]
pub use runtime::test_utils;

#[cfg(test)]
mod tests;
