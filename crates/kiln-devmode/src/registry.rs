use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use crate::error::{RecompileError, Result};
use crate::provider::CompilationProvider;

/// Maps a dotted file extension to the provider handling it.
///
/// Lookup is an exact, case-sensitive match: `.BPMN` does not find a `.bpmn`
/// provider.
#[derive(Default)]
pub struct ProviderRegistry {
    providers: BTreeMap<String, Arc<dyn CompilationProvider>>,
}

impl std::fmt::Debug for ProviderRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderRegistry")
            .field("extensions", &self.providers.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, provider: Arc<dyn CompilationProvider>) -> Result<()> {
        let extension = provider.handled_extension().to_string();
        if self.providers.contains_key(&extension) {
            return Err(RecompileError::DuplicateProvider(extension));
        }
        tracing::debug!(target: "kiln.devmode", extension = %extension, "registered provider");
        self.providers.insert(extension, provider);
        Ok(())
    }

    pub fn with_provider(mut self, provider: impl CompilationProvider + 'static) -> Result<Self> {
        self.register(Arc::new(provider))?;
        Ok(self)
    }

    pub fn get(&self, extension: &str) -> Option<&Arc<dyn CompilationProvider>> {
        self.providers.get(extension)
    }

    /// Provider for the extension of `path`, if one is registered.
    pub fn for_path(&self, path: &Path) -> Option<&Arc<dyn CompilationProvider>> {
        self.get(&kiln_core::fs::dotted_extension(path)?)
    }

    pub fn extensions(&self) -> impl Iterator<Item = &str> + '_ {
        self.providers.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}
