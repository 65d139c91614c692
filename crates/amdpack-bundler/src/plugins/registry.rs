//! Plugin registry keyed by plugin module id.

use std::sync::Arc;

use indexmap::IndexMap;

use super::LoaderPlugin;

/// Maps plugin module ids (`vs/css`, `text`, ...) to their implementation.
#[derive(Debug, Clone, Default)]
pub struct PluginRegistry {
    plugins: IndexMap<String, Arc<dyn LoaderPlugin>>,
}

impl PluginRegistry {
    /// Create a new empty plugin registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `plugin` under module id `id`, replacing any previous one.
    pub fn register(&mut self, id: impl Into<String>, plugin: Arc<dyn LoaderPlugin>) {
        let id = id.into();
        if self.plugins.insert(id.clone(), plugin).is_some() {
            tracing::debug!(plugin = %id, "replaced loader plugin");
        }
    }

    pub fn get(&self, id: &str) -> Option<&Arc<dyn LoaderPlugin>> {
        self.plugins.get(id)
    }

    /// Registered plugin ids in registration order.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.plugins.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plugins::{ModuleWriter, PluginContext};
    use async_trait::async_trait;

    #[derive(Debug)]
    struct Noop;

    #[async_trait]
    impl LoaderPlugin for Noop {
        async fn write(
            &self,
            _ctx: &PluginContext,
            _plugin_name: &str,
            _resource: &str,
            _out: &mut ModuleWriter<'_>,
        ) -> anyhow::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn register_and_lookup() {
        let mut registry = PluginRegistry::new();
        assert!(registry.is_empty());
        registry.register("vs/css", Arc::new(Noop));
        registry.register("text", Arc::new(Noop));
        registry.register("vs/css", Arc::new(Noop));

        assert_eq!(registry.len(), 2);
        assert!(registry.get("vs/css").is_some());
        assert!(registry.get("css").is_none());
        assert_eq!(registry.ids().collect::<Vec<_>>(), ["vs/css", "text"]);
    }
}
