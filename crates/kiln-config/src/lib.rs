//! `kiln.toml` configuration and tracing setup.
//!
//! Configuration is read once per process entry point and threaded explicitly
//! into the pipeline; nothing downstream consults the environment.

mod logging;

pub use logging::{init_tracing, LoggingConfig};

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use kiln_build::RestPolicy;
use kiln_codegen::{DebugDump, GeneratedFileType, DEFAULT_APP_PACKAGE};
use kiln_devmode::StalenessPolicy;
use parking_lot::ReentrantMutex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const CONFIG_FILE_NAME: &str = "kiln.toml";

/// Overrides config discovery with an explicit path (absolute or relative to
/// the project root).
pub const KILN_CONFIG_ENV_VAR: &str = "KILN_CONFIG_PATH";

/// Overrides `build.debug_generated_classes_dir`.
pub const DEBUG_DIR_ENV_VAR: &str = "KILN_DEBUG_GENERATED_CLASSES_DIR";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse toml config: {0}")]
    Toml(String),
}

impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        // The default `Display` embeds a snippet of the input; keep only the message.
        ConfigError::Toml(err.message().to_string())
    }
}

/// Top-level `kiln.toml`.
///
/// ```toml
/// [logging]
/// level = "debug"
///
/// [build]
/// app_package = "org.acme"
/// rest_policy = "servlet-init-param"
///
/// [[build.generators]]
/// name = "processes"
/// extension = "java"
/// root = "src/main/kiln"
/// kind = "rest"
///
/// [devmode]
/// staleness_fail_mode = "assume-fresh"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct KilnConfig {
    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub build: BuildConfig,

    #[serde(default)]
    pub devmode: DevModeConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BuildConfig {
    /// Package generated application classes live in.
    #[serde(default = "BuildConfig::default_app_package")]
    pub app_package: String,

    /// Whether generators annotate output for the host's injection container.
    #[serde(default = "BuildConfig::default_dependency_injection")]
    pub dependency_injection: bool,

    /// Mirror of every generated source, for inspection only.
    #[serde(default)]
    pub debug_generated_classes_dir: Option<PathBuf>,

    #[serde(default)]
    pub rest_policy: RestPolicy,

    #[serde(default)]
    pub bootstrap: Option<BootstrapConfig>,

    #[serde(default)]
    pub generators: Vec<GeneratorConfig>,

    /// Extra classpath entries for the compiler.
    #[serde(default)]
    pub classpath: Vec<PathBuf>,

    #[serde(default = "BuildConfig::default_javac")]
    pub javac: PathBuf,
}

impl BuildConfig {
    fn default_app_package() -> String {
        DEFAULT_APP_PACKAGE.to_owned()
    }

    fn default_dependency_injection() -> bool {
        true
    }

    fn default_javac() -> PathBuf {
        PathBuf::from("javac")
    }

    pub fn debug_dump(&self) -> DebugDump {
        DebugDump::new(self.debug_generated_classes_dir.clone())
    }
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            app_package: Self::default_app_package(),
            dependency_injection: Self::default_dependency_injection(),
            debug_generated_classes_dir: None,
            rest_policy: RestPolicy::default(),
            bootstrap: None,
            generators: Vec::new(),
            classpath: Vec::new(),
            javac: Self::default_javac(),
        }
    }
}

/// Host-supplied runtime producer source appended to every non-empty batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BootstrapConfig {
    pub class_name: String,
    /// Relative to the project root unless absolute.
    pub source_path: PathBuf,
}

/// An asset generator that passes matching files through as sources.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GeneratorConfig {
    pub name: String,
    pub extension: String,
    /// Project-relative directory scanned for assets.
    #[serde(default = "GeneratorConfig::default_root")]
    pub root: PathBuf,
    #[serde(default)]
    pub kind: GeneratedFileType,
}

impl GeneratorConfig {
    fn default_root() -> PathBuf {
        PathBuf::from("src/main")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DevModeConfig {
    #[serde(default)]
    pub staleness_fail_mode: StalenessPolicy,

    /// Passed to javac as `--release`.
    #[serde(default)]
    pub java_release: Option<String>,

    /// Project-relative roots watched for changes.
    #[serde(default = "DevModeConfig::default_source_roots")]
    pub source_roots: Vec<PathBuf>,
}

impl DevModeConfig {
    fn default_source_roots() -> Vec<PathBuf> {
        vec![
            PathBuf::from("src/main/java"),
            PathBuf::from("src/main/resources"),
        ]
    }
}

impl Default for DevModeConfig {
    fn default() -> Self {
        Self {
            staleness_fail_mode: StalenessPolicy::default(),
            java_release: None,
            source_roots: Self::default_source_roots(),
        }
    }
}

impl KilnConfig {
    pub fn load_from_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::load_from_str(&text)
    }

    /// Applies environment overrides. Called once by [`load_for_project`].
    pub fn apply_env_overrides(&mut self) {
        let _guard = config_env_lock().lock();
        if let Some(dir) = std::env::var_os(DEBUG_DIR_ENV_VAR).filter(|v| !v.is_empty()) {
            self.build.debug_generated_classes_dir = Some(PathBuf::from(dir));
        }
    }

    /// `path` resolved against `project_root` when relative.
    pub fn resolve(project_root: &Path, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            project_root.join(path)
        }
    }
}

static CONFIG_ENV_LOCK: OnceLock<ReentrantMutex<()>> = OnceLock::new();

fn config_env_lock() -> &'static ReentrantMutex<()> {
    CONFIG_ENV_LOCK.get_or_init(|| ReentrantMutex::new(()))
}

/// Runs `f` while holding the config environment lock, so tests that set
/// [`KILN_CONFIG_ENV_VAR`] or [`DEBUG_DIR_ENV_VAR`] do not race discovery in
/// other threads.
pub fn with_config_env_lock<R>(f: impl FnOnce() -> R) -> R {
    let _guard = config_env_lock().lock();
    f()
}

/// Finds the config file for a project: `KILN_CONFIG_PATH` first, then
/// `kiln.toml` in `project_root`.
pub fn discover_config_path(project_root: &Path) -> Option<PathBuf> {
    let _guard = config_env_lock().lock();
    if let Some(value) = std::env::var_os(KILN_CONFIG_ENV_VAR) {
        return Some(KilnConfig::resolve(project_root, Path::new(&value)));
    }
    Some(project_root.join(CONFIG_FILE_NAME)).filter(|path| path.is_file())
}

/// Loads the project's configuration with environment overrides applied.
///
/// Without a config file, returns [`KilnConfig::default`] and `None`.
pub fn load_for_project(project_root: &Path) -> Result<(KilnConfig, Option<PathBuf>), ConfigError> {
    let _guard = config_env_lock().lock();
    let path = discover_config_path(project_root);
    let mut config = match &path {
        Some(path) => KilnConfig::load_from_path(path)?,
        None => KilnConfig::default(),
    };
    config.apply_env_overrides();
    tracing::debug!(
        target: "kiln.config",
        path = ?path,
        debug_dir = ?config.build.debug_generated_classes_dir,
        "loaded configuration"
    );
    Ok((config, path))
}
