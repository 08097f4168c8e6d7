use std::path::{Path, PathBuf};
use std::sync::Arc;

use kiln_vfs::MemoryFs;

use crate::command::{format_command, CommandRunner, DefaultCommandRunner};
use crate::context::CompileContext;
use crate::diagnostic::{Diagnostic, Severity};
use crate::result::CompilationResult;
use crate::{CompileError, CompilerAdapter, Result};

/// [`CompilerAdapter`] backed by a `javac` executable.
///
/// Each call stages the source store into a fresh temporary directory, runs
/// javac once over every requested source and loads the produced `.class`
/// files into the target store.
#[derive(Debug, Clone)]
pub struct JavacCompiler {
    javac: PathBuf,
    release: Option<String>,
    runner: Arc<dyn CommandRunner>,
}

impl Default for JavacCompiler {
    fn default() -> Self {
        Self::new("javac")
    }
}

impl JavacCompiler {
    pub fn new(javac: impl Into<PathBuf>) -> Self {
        Self::with_runner(javac, Arc::new(DefaultCommandRunner::default()))
    }

    pub fn with_runner(javac: impl Into<PathBuf>, runner: Arc<dyn CommandRunner>) -> Self {
        Self {
            javac: javac.into(),
            release: None,
            runner,
        }
    }

    /// Passes `--release <release>` to javac.
    pub fn with_release(mut self, release: impl Into<String>) -> Self {
        self.release = Some(release.into());
        self
    }

    fn args(
        &self,
        src_root: &Path,
        out_root: &Path,
        source_names: &[String],
        ctx: &CompileContext,
    ) -> Result<Vec<String>> {
        let mut args = vec![
            "-d".to_string(),
            out_root.to_string_lossy().into_owned(),
            "-encoding".to_string(),
            "UTF-8".to_string(),
        ];
        if !ctx.classpath.is_empty() {
            let joined = std::env::join_paths(&ctx.classpath).map_err(|err| {
                CompileError::CommandFailed {
                    command: self.javac.display().to_string(),
                    message: format!("invalid classpath entry: {err}"),
                }
            })?;
            args.push("-cp".to_string());
            args.push(joined.to_string_lossy().into_owned());
        }
        if let Some(release) = &self.release {
            args.push("--release".to_string());
            args.push(release.clone());
        }
        for name in source_names {
            args.push(src_root.join(name).to_string_lossy().into_owned());
        }
        Ok(args)
    }
}

impl CompilerAdapter for JavacCompiler {
    fn compile(
        &self,
        source_names: &[String],
        sources: &MemoryFs,
        ctx: &CompileContext,
    ) -> Result<CompilationResult> {
        for name in source_names {
            sources.read(name)?;
        }

        let work = tempfile::Builder::new().prefix("kiln-javac").tempdir()?;
        let src_root = work.path().join("src");
        let out_root = work.path().join("classes");
        sources.write_to_dir(&src_root)?;
        std::fs::create_dir_all(&out_root)?;

        let args = self.args(&src_root, &out_root, source_names, ctx)?;
        tracing::debug!(
            target: "kiln.compiler",
            sources = source_names.len(),
            classpath = ctx.classpath.len(),
            "invoking javac"
        );
        let output = self.runner.run(work.path(), &self.javac, &args)?;

        let mut diagnostics = parse_javac_diagnostics(&output.combined());
        for diagnostic in &mut diagnostics {
            if let Some(file) = diagnostic.file.take() {
                diagnostic.file = Some(relative_source_name(&src_root, &file));
            }
        }

        if !output.success() && !diagnostics.iter().any(Diagnostic::is_error) {
            let combined = output.combined();
            if output.exit_code.is_none() && combined.trim().is_empty() {
                return Err(CompileError::CommandFailed {
                    command: format_command(&self.javac, &args),
                    message: "terminated without output".to_string(),
                });
            }
            diagnostics.push(Diagnostic::error(format!(
                "javac exited with code {:?}: {}",
                output.exit_code,
                combined.trim()
            )));
        }

        let target = if diagnostics.iter().any(Diagnostic::is_error) {
            MemoryFs::new()
        } else {
            MemoryFs::load_dir(&out_root, "class")?
        };
        let result = CompilationResult::from_diagnostics(target, diagnostics);
        tracing::debug!(
            target: "kiln.compiler",
            success = result.is_success(),
            errors = result.errors().len(),
            "javac finished"
        );
        Ok(result)
    }
}

fn relative_source_name(src_root: &Path, file: &str) -> String {
    match Path::new(file).strip_prefix(src_root) {
        Ok(relative) => relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/"),
        Err(_) => file.to_string(),
    }
}

/// Parses javac's plain-text diagnostics.
///
/// Recognizes `<file>:<line>: error|warning: <message>` headers and file-less
/// `error: <message>` lines. Indented `symbol:`/`location:` detail lines are
/// appended to the preceding message; source excerpts, carets and the
/// trailing `N errors` summary are skipped.
pub fn parse_javac_diagnostics(output: &str) -> Vec<Diagnostic> {
    let mut out: Vec<Diagnostic> = Vec::new();

    for line in output.lines() {
        if let Some(diagnostic) = parse_header(line) {
            out.push(diagnostic);
            continue;
        }

        let trimmed = line.trim_start();
        if (trimmed.starts_with("symbol:") || trimmed.starts_with("location:"))
            && line.len() != trimmed.len()
        {
            if let Some(last) = out.last_mut() {
                last.message.push('\n');
                last.message.push_str(trimmed);
            }
        }
    }

    out
}

fn parse_header(line: &str) -> Option<Diagnostic> {
    for (marker, severity) in [(": error: ", Severity::Error), (": warning: ", Severity::Warning)] {
        let Some(idx) = line.find(marker) else {
            continue;
        };
        let location = &line[..idx];
        let message = line[idx + marker.len()..].trim().to_string();
        let (file, line_no) = match location.rsplit_once(':') {
            Some((file, line_no)) => match line_no.parse::<u32>() {
                Ok(line_no) => (file.to_string(), Some(line_no)),
                Err(_) => (location.to_string(), None),
            },
            None => (location.to_string(), None),
        };
        if file.is_empty() {
            continue;
        }
        return Some(Diagnostic {
            file: Some(file),
            line: line_no,
            severity,
            message,
        });
    }

    for (prefix, severity) in [("error: ", Severity::Error), ("warning: ", Severity::Warning)] {
        if let Some(message) = line.strip_prefix(prefix) {
            return Some(Diagnostic {
                file: None,
                line: None,
                severity,
                message: message.trim().to_string(),
            });
        }
    }

    None
}
