//! Source generation for Kiln builds.
//!
//! Generators turn domain assets found under a project root into
//! [`GeneratedFile`]s. A [`GeneratorPool`] runs every registered generator in
//! registration order against the same root and pools their output into a
//! single [`Batch`], which is then staged into a [`kiln_vfs::MemoryFs`] for
//! compilation.

mod asset;
mod batch;
mod bootstrap;
mod debug_dump;
mod error;
mod generated_file;
mod generator;

pub use asset::{AssetGenerator, AssetTransform, PassthroughTransform};
pub use batch::{Batch, GeneratorPool, StagedSources};
pub use bootstrap::BootstrapSource;
pub use debug_dump::DebugDump;
pub use error::{GenerationError, Result};
pub use generated_file::{GeneratedFile, GeneratedFileType};
pub use generator::{GenerationContext, Generator, DEFAULT_APP_PACKAGE};
