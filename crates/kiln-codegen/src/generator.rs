use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::generated_file::GeneratedFile;

pub const DEFAULT_APP_PACKAGE: &str = "org.kie";

/// Inputs shared by every generator in a batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationContext {
    project_root: PathBuf,
    app_package: String,
    dependency_injection: bool,
}

impl GenerationContext {
    pub fn new(project_root: impl Into<PathBuf>) -> Self {
        Self {
            project_root: project_root.into(),
            app_package: DEFAULT_APP_PACKAGE.to_string(),
            dependency_injection: true,
        }
    }

    pub fn with_app_package(mut self, app_package: impl Into<String>) -> Self {
        self.app_package = app_package.into();
        self
    }

    pub fn with_dependency_injection(mut self, enabled: bool) -> Self {
        self.dependency_injection = enabled;
        self
    }

    pub fn project_root(&self) -> &Path {
        &self.project_root
    }

    pub fn app_package(&self) -> &str {
        &self.app_package
    }

    /// Whether generated code should be annotated for the host's injection container.
    pub fn dependency_injection(&self) -> bool {
        self.dependency_injection
    }

    /// Returns `fqcn` if the project ships its own `src/main/java` source for it.
    ///
    /// Generators use this to wire user-supplied configuration classes instead
    /// of generating defaults.
    pub fn custom_class(&self, fqcn: &str) -> Option<String> {
        let path = self
            .project_root
            .join("src/main/java")
            .join(kiln_core::to_class_file_path(fqcn))
            .with_extension("java");
        path.is_file().then(|| fqcn.to_string())
    }
}

/// Turns domain assets under a project root into generated sources.
///
/// Generators are independent: each sees the same project root and never the
/// output of another generator. A failure aborts the whole batch.
pub trait Generator: Send + Sync {
    fn name(&self) -> &str;

    fn generate(&self, ctx: &GenerationContext) -> Result<Vec<GeneratedFile>>;

    /// Asset files the host should watch to trigger regeneration.
    fn watched_assets(&self, _ctx: &GenerationContext) -> Result<Vec<PathBuf>> {
        Ok(Vec::new())
    }
}
