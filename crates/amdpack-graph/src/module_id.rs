//! Interned module identifiers.
//!
//! AMD ids are `/`-separated strings such as `vs/base/common/event`. The graph
//! stores them once in an [`IdInterner`] and passes around copyable
//! [`ModuleId`] handles instead.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

/// Handle to an interned module id.
///
/// Only meaningful together with the [`IdInterner`] that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ModuleId(u32);

impl ModuleId {
    /// The `exports` pseudo-module.
    pub const EXPORTS: ModuleId = ModuleId(0);
    /// The `module` pseudo-module.
    pub const MODULE: ModuleId = ModuleId(1);
    /// The `require` pseudo-module.
    pub const REQUIRE: ModuleId = ModuleId(2);

    /// True for the three pseudo-modules, which have no physical source.
    pub const fn is_reserved(self) -> bool {
        self.0 <= Self::REQUIRE.0
    }

    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// The reserved pseudo-dependencies every AMD loader provides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Reserved {
    Exports,
    Module,
    Require,
}

impl Reserved {
    /// All reserved dependencies in interning order.
    pub const ALL: [Reserved; 3] = [Reserved::Exports, Reserved::Module, Reserved::Require];

    pub const fn id(self) -> ModuleId {
        match self {
            Reserved::Exports => ModuleId::EXPORTS,
            Reserved::Module => ModuleId::MODULE,
            Reserved::Require => ModuleId::REQUIRE,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Reserved::Exports => "exports",
            Reserved::Module => "module",
            Reserved::Require => "require",
        }
    }

    /// Match a literal dependency string. No normalization is applied.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "exports" => Some(Reserved::Exports),
            "module" => Some(Reserved::Module),
            "require" => Some(Reserved::Require),
            _ => None,
        }
    }

    pub fn from_id(id: ModuleId) -> Option<Self> {
        Self::ALL.into_iter().find(|reserved| reserved.id() == id)
    }
}

impl std::fmt::Display for Reserved {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Bidirectional id table.
///
/// A fresh interner already contains the reserved pseudo-modules, so their
/// handles are recognizable without a lookup.
#[derive(Debug, Clone)]
pub struct IdInterner {
    names: Vec<String>,
    lookup: FxHashMap<String, ModuleId>,
}

impl IdInterner {
    pub fn new() -> Self {
        let mut interner = Self {
            names: Vec::new(),
            lookup: FxHashMap::default(),
        };
        for reserved in Reserved::ALL {
            interner.intern(reserved.as_str());
        }
        interner
    }

    /// Return the handle for `name`, allocating one on first use.
    pub fn intern(&mut self, name: &str) -> ModuleId {
        if let Some(&id) = self.lookup.get(name) {
            return id;
        }
        let id = ModuleId(self.names.len() as u32);
        self.names.push(name.to_string());
        self.lookup.insert(name.to_string(), id);
        id
    }

    /// Look up an already interned name.
    pub fn get(&self, name: &str) -> Option<ModuleId> {
        self.lookup.get(name).copied()
    }

    /// The string form of `id`.
    ///
    /// # Panics
    ///
    /// Panics if `id` was produced by a different interner.
    pub fn name(&self, id: ModuleId) -> &str {
        &self.names[id.index()]
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl Default for IdInterner {
    fn default() -> Self {
        Self::new()
    }
}
