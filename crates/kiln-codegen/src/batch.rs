use std::collections::HashSet;
use std::path::PathBuf;

use kiln_vfs::MemoryFs;

use crate::bootstrap::BootstrapSource;
use crate::error::{GenerationError, Result};
use crate::generated_file::GeneratedFile;
use crate::generator::{GenerationContext, Generator};

/// Ordered set of generators run against one project root.
#[derive(Default)]
pub struct GeneratorPool {
    generators: Vec<Box<dyn Generator>>,
    bootstrap: Option<BootstrapSource>,
}

impl std::fmt::Debug for GeneratorPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeneratorPool")
            .field(
                "generators",
                &self.generators.iter().map(|g| g.name()).collect::<Vec<_>>(),
            )
            .field("bootstrap", &self.bootstrap.as_ref().map(|b| b.class_name()))
            .finish()
    }
}

impl GeneratorPool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_generator(mut self, generator: impl Generator + 'static) -> Self {
        self.register(Box::new(generator));
        self
    }

    pub fn with_bootstrap(mut self, bootstrap: BootstrapSource) -> Self {
        self.bootstrap = Some(bootstrap);
        self
    }

    pub fn register(&mut self, generator: Box<dyn Generator>) {
        self.generators.push(generator);
    }

    pub fn is_empty(&self) -> bool {
        self.generators.is_empty()
    }

    pub fn len(&self) -> usize {
        self.generators.len()
    }

    pub fn bootstrap(&self) -> Option<&BootstrapSource> {
        self.bootstrap.as_ref()
    }

    /// Runs every generator in registration order and pools the output.
    ///
    /// The bootstrap source is appended last, and only when at least one
    /// generator produced output: a project without domain assets yields an
    /// empty batch.
    pub fn generate(&self, ctx: &GenerationContext) -> Result<Batch> {
        if let Some(bootstrap) = &self.bootstrap {
            if !kiln_core::is_valid_class_name(bootstrap.class_name()) {
                return Err(GenerationError::InvalidClassName(
                    bootstrap.class_name().to_string(),
                ));
            }
        }

        let mut batch = Batch::default();
        let mut seen = HashSet::new();

        for generator in &self.generators {
            let files = generator.generate(ctx)?;
            tracing::debug!(
                target: "kiln.codegen",
                generator = generator.name(),
                files = files.len(),
                "generator finished"
            );
            for file in files {
                if !file.is_java_source() {
                    if !seen.insert(file.relative_path().trim_start_matches("./").to_string()) {
                        return Err(GenerationError::DuplicatePath(
                            file.relative_path().to_string(),
                        ));
                    }
                    batch.files.push(file);
                    continue;
                }
                if let Some(bootstrap) = &self.bootstrap {
                    if file.class_name() == bootstrap.class_name() {
                        return Err(GenerationError::ReservedName(file.class_name()));
                    }
                }
                if !seen.insert(file.staging_path()) {
                    return Err(GenerationError::DuplicatePath(
                        file.relative_path().to_string(),
                    ));
                }
                batch.files.push(file);
            }
        }

        if let Some(bootstrap) = self.bootstrap.as_ref().filter(|_| !batch.files.is_empty()) {
            batch.files.push(bootstrap.to_generated_file());
            batch.bootstrap_class = Some(bootstrap.class_name().to_string());
        }

        Ok(batch)
    }

    /// Union of the assets every generator wants watched, sorted and deduplicated.
    pub fn watched_assets(&self, ctx: &GenerationContext) -> Result<Vec<PathBuf>> {
        let mut out = Vec::new();
        for generator in &self.generators {
            out.extend(generator.watched_assets(ctx)?);
        }
        out.sort();
        out.dedup();
        Ok(out)
    }
}

/// All generated files of one build, in generation order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Batch {
    files: Vec<GeneratedFile>,
    bootstrap_class: Option<String>,
}

impl Batch {
    pub fn files(&self) -> &[GeneratedFile] {
        &self.files
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Reserved class name of the bootstrap source, when it was appended.
    pub fn bootstrap_class(&self) -> Option<&str> {
        self.bootstrap_class.as_deref()
    }

    /// Writes every Java source into a fresh source store at its staging path.
    /// Other generated files stay out of the compile set.
    pub fn stage(&self) -> StagedSources {
        let mut store = MemoryFs::new();
        let mut names = Vec::with_capacity(self.files.len());
        for file in self.files.iter().filter(|file| file.is_java_source()) {
            let path = file.staging_path();
            store.write(path.clone(), file.contents());
            names.push(path);
        }
        StagedSources { store, names }
    }
}

/// Source store for a batch plus the staged names in batch order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StagedSources {
    pub store: MemoryFs,
    pub names: Vec<String>,
}
