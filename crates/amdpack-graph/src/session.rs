//! Per-build state.

use crate::memory::ModuleStore;
use crate::module_id::ModuleId;

/// All mutable state of one build invocation.
///
/// Holds the id-interning table (inside the store) and the plugin-usage map.
/// Every stage takes the session by reference, so independent builds in one
/// process never share state.
#[derive(Debug, Clone, Default)]
pub struct BuildSession {
    pub store: ModuleStore,
    used_plugins: Vec<ModuleId>,
}

impl BuildSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that a plugin emitted content. Returns `true` on first use.
    pub fn record_plugin_use(&mut self, plugin: ModuleId) -> bool {
        if self.used_plugins.contains(&plugin) {
            return false;
        }
        self.used_plugins.push(plugin);
        true
    }

    /// Plugins used so far, in order of first use.
    pub fn used_plugins(&self) -> &[ModuleId] {
        &self.used_plugins
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plugin_use_is_recorded_once() {
        let mut session = BuildSession::new();
        let css = session.store.ids_mut().intern("css");
        let nls = session.store.ids_mut().intern("nls");

        assert!(session.record_plugin_use(css));
        assert!(session.record_plugin_use(nls));
        assert!(!session.record_plugin_use(css));
        assert_eq!(session.used_plugins(), [css, nls]);
    }

    #[test]
    fn sessions_do_not_share_ids() {
        let mut first = BuildSession::new();
        let second = BuildSession::new();
        first.store.ids_mut().intern("only/in/first");
        assert!(second.store.id_of("only/in/first").is_none());
    }
}
