//! Incremental, file-granular recompilation for the development loop.
//!
//! Changed files are routed by exact extension to a [`CompilationProvider`].
//! Each provider decides through a [`StalenessChecker`] whether the compiled
//! output of a file is older than its source, and recompiles only the stale
//! files. Failures are scoped to the provider batch that produced them.

mod codegen_provider;
mod error;
mod java_provider;
mod provider;
mod recompiler;
mod registry;
mod staleness;

pub use codegen_provider::CodegenCompilationProvider;
pub use error::{RecompileError, Result};
pub use java_provider::JavaCompilationProvider;
pub use provider::{CompilationProvider, ProviderOutput};
pub use recompiler::{IncrementalRecompiler, ProviderFailure, RecompileReport};
pub use registry::ProviderRegistry;
pub use staleness::{FileState, StalenessChecker, StalenessPolicy};
