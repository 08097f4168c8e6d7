use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::error::{GenerationError, Result};
use crate::generated_file::{GeneratedFile, GeneratedFileType};
use crate::generator::{GenerationContext, Generator};

/// Converts a set of discovered domain asset files into generated sources.
///
/// The same transform serves full builds (every asset under the project) and
/// incremental recompilation (only the changed files).
pub trait AssetTransform: Send + Sync {
    fn transform(&self, ctx: &GenerationContext, assets: &[PathBuf]) -> Result<Vec<GeneratedFile>>;
}

impl<T: AssetTransform + ?Sized> AssetTransform for Arc<T> {
    fn transform(&self, ctx: &GenerationContext, assets: &[PathBuf]) -> Result<Vec<GeneratedFile>> {
        (**self).transform(ctx, assets)
    }
}

/// Generator that discovers assets by extension below a project-relative root.
#[derive(Debug, Clone)]
pub struct AssetGenerator<T> {
    name: String,
    extension: String,
    root: PathBuf,
    transform: T,
}

impl<T: AssetTransform> AssetGenerator<T> {
    /// Scans `src/main` for files ending in `extension` (with or without the leading dot).
    pub fn new(name: impl Into<String>, extension: impl Into<String>, transform: T) -> Self {
        Self {
            name: name.into(),
            extension: extension.into().trim_start_matches('.').to_string(),
            root: PathBuf::from("src/main"),
            transform,
        }
    }

    pub fn with_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.root = root.into();
        self
    }

    pub fn extension(&self) -> &str {
        &self.extension
    }

    pub fn transform(&self) -> &T {
        &self.transform
    }

    /// Assets currently present under the project, in path order.
    pub fn discover(&self, ctx: &GenerationContext) -> Result<Vec<PathBuf>> {
        let root = ctx.project_root().join(&self.root);
        kiln_core::fs::collect_files_with_extension(&root, &self.extension)
            .map_err(|source| GenerationError::Io { path: root, source })
    }
}

impl<T: AssetTransform> Generator for AssetGenerator<T> {
    fn name(&self) -> &str {
        &self.name
    }

    fn generate(&self, ctx: &GenerationContext) -> Result<Vec<GeneratedFile>> {
        let assets = self.discover(ctx)?;
        if assets.is_empty() {
            return Ok(Vec::new());
        }
        tracing::debug!(
            target: "kiln.codegen",
            generator = %self.name,
            assets = assets.len(),
            "transforming assets"
        );
        self.transform.transform(ctx, &assets)
    }

    fn watched_assets(&self, ctx: &GenerationContext) -> Result<Vec<PathBuf>> {
        self.discover(ctx)
    }
}

/// Copies each asset verbatim as a generated source, keeping its path relative
/// to `root` (project-relative). Assets outside `root` keep only their file name.
#[derive(Debug, Clone)]
pub struct PassthroughTransform {
    root: PathBuf,
    kind: GeneratedFileType,
}

impl PassthroughTransform {
    pub fn new(root: impl Into<PathBuf>, kind: GeneratedFileType) -> Self {
        Self {
            root: root.into(),
            kind,
        }
    }

    fn relative_path(&self, ctx: &GenerationContext, asset: &Path) -> String {
        let root = ctx.project_root().join(&self.root);
        let relative = asset
            .strip_prefix(&root)
            .ok()
            .map(Path::to_path_buf)
            .or_else(|| asset.file_name().map(PathBuf::from))
            .unwrap_or_else(|| asset.to_path_buf());
        relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/")
    }
}

impl AssetTransform for PassthroughTransform {
    fn transform(&self, ctx: &GenerationContext, assets: &[PathBuf]) -> Result<Vec<GeneratedFile>> {
        let mut out = Vec::with_capacity(assets.len());
        for asset in assets {
            let contents = std::fs::read(asset).map_err(|source| GenerationError::Io {
                path: asset.clone(),
                source,
            })?;
            out.push(GeneratedFile::new(
                self.kind,
                self.relative_path(ctx, asset),
                contents,
            ));
        }
        Ok(out)
    }
}
