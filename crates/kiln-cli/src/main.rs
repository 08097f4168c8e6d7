mod output;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use kiln_build::{ArtifactRegistrar, BuildError, BuildPipeline, BuildReport};
use kiln_codegen::{AssetGenerator, BootstrapSource, DebugDump, GeneratorPool, PassthroughTransform};
use kiln_compiler::{CompileContext, JavacCompiler};
use kiln_config::{load_for_project, KilnConfig};
use kiln_core::{project_root_from_classes_dir, COMPILED_OUTPUT_DIR, JAVA_SUFFIX};
use kiln_devmode::{
    CodegenCompilationProvider, CompilationProvider, FileState, IncrementalRecompiler, JavaCompilationProvider,
    ProviderRegistry, RecompileReport, StalenessChecker, StalenessPolicy,
};
use kiln_vfs::{FileWatcher, NotifyFileWatcher};
use serde::Serialize;

use crate::output::DirectorySinks;

#[derive(Parser)]
#[command(name = "kiln", version, about = "Kiln (generate, compile and register build artifacts)")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Generate, compile and register every asset of the project owning a classes directory
    Build(BuildArgs),
    /// Report whether the compiled output of a source file is stale
    Stale(StaleArgs),
    /// Watch a project and recompile changed files
    Watch(WatchArgs),
}

#[derive(Args)]
struct BuildArgs {
    /// Compiled classes directory (`<project>/target/classes`) or the project root
    classes_dir: PathBuf,
    /// Emit JSON suitable for CI
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct StaleArgs {
    /// Source file to check
    file: PathBuf,
    /// Root the source file lives under
    #[arg(long)]
    sources: PathBuf,
    /// Root compiled output lives under
    #[arg(long)]
    classes: PathBuf,
    /// Answer when staleness cannot be determined
    #[arg(long, value_enum, default_value_t = FailMode::AssumeStale)]
    fail_mode: FailMode,
    /// Emit JSON suitable for CI
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct WatchArgs {
    /// Project root
    project: PathBuf,
    /// Stop after this many watcher events
    #[arg(long)]
    max_events: Option<usize>,
}

#[derive(Clone, Copy, ValueEnum)]
enum FailMode {
    AssumeStale,
    AssumeFresh,
}

impl From<FailMode> for StalenessPolicy {
    fn from(mode: FailMode) -> Self {
        match mode {
            FailMode::AssumeStale => StalenessPolicy::AssumeStale,
            FailMode::AssumeFresh => StalenessPolicy::AssumeFresh,
        }
    }
}

fn main() {
    let cli = Cli::parse();
    let exit_code = match run(cli) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("{:#}", err);
            2
        }
    };

    std::process::exit(exit_code);
}

fn run(cli: Cli) -> Result<i32> {
    match cli.command {
        Command::Build(args) => build(args),
        Command::Stale(args) => stale(args),
        Command::Watch(args) => watch(args),
    }
}

fn load_config(project_root: &Path) -> Result<KilnConfig> {
    let (config, _) = load_for_project(project_root)
        .with_context(|| format!("failed to load configuration for {}", project_root.display()))?;
    kiln_config::init_tracing(&config.logging);
    Ok(config)
}

fn javac(config: &KilnConfig) -> JavacCompiler {
    let javac = JavacCompiler::new(&config.build.javac);
    match &config.devmode.java_release {
        Some(release) => javac.with_release(release),
        None => javac,
    }
}

fn classpath(config: &KilnConfig, project_root: &Path) -> Vec<PathBuf> {
    config
        .build
        .classpath
        .iter()
        .map(|entry| KilnConfig::resolve(project_root, entry))
        .collect()
}

fn generator_pool(config: &KilnConfig, project_root: &Path) -> Result<GeneratorPool> {
    let mut pool = GeneratorPool::new();
    for generator in &config.build.generators {
        pool.register(Box::new(
            AssetGenerator::new(
                &generator.name,
                &generator.extension,
                PassthroughTransform::new(&generator.root, generator.kind),
            )
            .with_root(&generator.root),
        ));
    }
    if let Some(bootstrap) = &config.build.bootstrap {
        let path = KilnConfig::resolve(project_root, &bootstrap.source_path);
        let source = std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read bootstrap source {}", path.display()))?;
        pool = pool.with_bootstrap(BootstrapSource::new(&bootstrap.class_name, source));
    }
    Ok(pool)
}

fn build(args: BuildArgs) -> Result<i32> {
    let project_root = project_root_from_classes_dir(&args.classes_dir);
    let config = load_config(&project_root)?;

    let debug_dir = config
        .build
        .debug_generated_classes_dir
        .as_ref()
        .map(|dir| KilnConfig::resolve(&project_root, dir));
    let pipeline = BuildPipeline::new(generator_pool(&config, &project_root)?, javac(&config))
        .with_registrar(ArtifactRegistrar::new(config.build.rest_policy))
        .with_debug_dump(DebugDump::new(debug_dir))
        .with_app_package(&config.build.app_package)
        .with_dependency_injection(config.build.dependency_injection)
        .with_classpath(classpath(&config, &project_root));

    let mut sinks = DirectorySinks::new(&args.classes_dir);
    let report = match pipeline.run(&args.classes_dir, &mut sinks) {
        Ok(report) => report,
        Err(BuildError::Compilation { message }) => {
            eprintln!("{message}");
            return Ok(1);
        }
        Err(err) => return Err(err.into()),
    };

    for error in sinks.errors() {
        eprintln!("{error}");
    }
    print_build(&report, &sinks, args.json)?;
    Ok(if sinks.errors().is_empty() { 0 } else { 2 })
}

#[derive(Serialize)]
struct BuildEnvelope<'a> {
    report: &'a BuildReport,
    published: &'a DirectorySinks,
}

fn print_build(report: &BuildReport, sinks: &DirectorySinks, json: bool) -> Result<()> {
    if json {
        let out = serde_json::to_string_pretty(&BuildEnvelope {
            report,
            published: sinks,
        })?;
        println!("{out}");
        return Ok(());
    }

    if report.is_empty() {
        println!("build: no generated files for {}", report.project_root.display());
        return Ok(());
    }
    println!("build: {}", report.project_root.display());
    println!("  generated_files: {}", report.generated_files);
    println!("  classes: {}", report.registration.classes.len());
    println!("  beans: {}", report.registration.beans.len());
    println!("  rest_resources: {}", report.registration.rest_resources.len());
    println!("  watched_assets: {}", report.watched_assets.len());
    for warning in &report.warnings {
        println!("{warning}");
    }
    Ok(())
}

#[derive(Serialize)]
struct StaleOutput<'a> {
    file: &'a Path,
    state: FileState,
}

fn stale(args: StaleArgs) -> Result<i32> {
    let extension = kiln_core::fs::dotted_extension(&args.file)
        .with_context(|| format!("{} has no file extension", args.file.display()))?;
    let source_mod = kiln_core::fs::modified_millis(&args.file)
        .with_context(|| format!("failed to read modification time of {}", args.file.display()))?;

    let state = StalenessChecker::new(args.fail_mode.into()).check(
        &args.file,
        &args.sources,
        &args.classes,
        &extension,
        source_mod,
    );

    if args.json {
        let out = serde_json::to_string_pretty(&StaleOutput {
            file: &args.file,
            state,
        })?;
        println!("{out}");
    } else {
        println!("{}", if state == FileState::Stale { "stale" } else { "fresh" });
    }
    Ok(0)
}

fn recompiler(config: &KilnConfig, project_root: &Path) -> Result<IncrementalRecompiler> {
    let policy = config.devmode.staleness_fail_mode;
    let java = JavaCompilationProvider::new(Arc::new(javac(config))).with_staleness_policy(policy);

    let mut registry = ProviderRegistry::new();
    registry.register(Arc::new(java.clone()))?;
    for generator in &config.build.generators {
        let provider = CodegenCompilationProvider::new(
            &generator.extension,
            PassthroughTransform::new(&generator.root, generator.kind),
            java.clone(),
        )
        .with_project_root(project_root)
        .with_app_package(&config.build.app_package)
        .with_staleness_policy(policy);
        if provider.handled_extension() == JAVA_SUFFIX {
            // Plain sources already have the java provider; templates wait for a full build.
            tracing::debug!(target: "kiln.cli", generator = %generator.name, "not watched incrementally");
            continue;
        }
        registry.register(Arc::new(provider))?;
    }

    let classes_dir = project_root.join(COMPILED_OUTPUT_DIR);
    let context = CompileContext::new(classes_dir).with_classpath(classpath(config, project_root));
    Ok(config
        .devmode
        .source_roots
        .iter()
        .fold(IncrementalRecompiler::new(registry, context), |recompiler, root| {
            recompiler.with_source_root(KilnConfig::resolve(project_root, root))
        }))
}

fn print_recompile(report: &RecompileReport) {
    for failure in &report.failures {
        let files: Vec<String> = failure
            .files
            .iter()
            .map(|path| path.display().to_string())
            .collect();
        eprintln!("{} ({}): {}", failure.extension, files.join(", "), failure.error);
    }
    let recompiled: usize = report.recompiled.values().map(|files| files.len()).sum();
    if recompiled > 0 {
        println!(
            "recompiled {recompiled} file(s), wrote {} class file(s)",
            report.written.len()
        );
    }
    for warning in &report.warnings {
        println!("{warning}");
    }
}

fn watch(args: WatchArgs) -> Result<i32> {
    // Watcher events carry absolute paths.
    let project_root = std::fs::canonicalize(&args.project)
        .with_context(|| format!("failed to resolve {}", args.project.display()))?;
    let config = load_config(&project_root)?;
    let recompiler = recompiler(&config, &project_root)?;

    let mut watcher = NotifyFileWatcher::new().context("failed to start file watcher")?;
    for root in recompiler.source_roots() {
        if root.is_dir() {
            watcher
                .watch_root(root)
                .with_context(|| format!("failed to watch {}", root.display()))?;
        }
    }
    println!("watching {}", project_root.display());

    let mut seen = 0;
    while args.max_events.map_or(true, |max| seen < max) {
        let message = watcher
            .receiver()
            .recv()
            .context("file watcher disconnected")?;
        seen += 1;
        match message {
            Ok(event) => print_recompile(&recompiler.process_event(&event)),
            Err(err) => tracing::warn!(target: "kiln.cli", error = %err, "file watcher error"),
        }
    }
    Ok(0)
}
