use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use kiln_compiler::{
    CommandOutput, CommandRunner, CompilationResult, CompileContext, CompileError,
    CompilerAdapter, JavacCompiler,
};
use kiln_vfs::MemoryFs;
use pretty_assertions::assert_eq;

/// Stands in for javac: records its arguments and, on success, writes one
/// `.class` file per source below the `-d` directory.
#[derive(Debug, Default)]
struct ScriptedJavac {
    calls: Mutex<Vec<Vec<String>>>,
    fail_with: Option<String>,
}

impl ScriptedJavac {
    fn failing(stderr: &str) -> Self {
        Self {
            calls: Mutex::default(),
            fail_with: Some(stderr.to_string()),
        }
    }

    fn calls(&self) -> Vec<Vec<String>> {
        self.calls.lock().unwrap().clone()
    }
}

impl CommandRunner for ScriptedJavac {
    fn run(&self, cwd: &Path, _program: &Path, args: &[String]) -> std::io::Result<CommandOutput> {
        self.calls.lock().unwrap().push(args.to_vec());

        if let Some(stderr) = &self.fail_with {
            let src = cwd.join("src");
            return Ok(CommandOutput {
                exit_code: Some(1),
                stdout: String::new(),
                stderr: stderr.replace("$SRC", &src.to_string_lossy()),
            });
        }

        let out = PathBuf::from(&args[args.iter().position(|a| a == "-d").unwrap() + 1]);
        let src_root = cwd.join("src").join("src/main/java");
        for arg in args.iter().filter(|a| a.ends_with(".java")) {
            let relative = Path::new(arg).strip_prefix(&src_root).unwrap();
            let class = out.join(relative.with_extension("class"));
            std::fs::create_dir_all(class.parent().unwrap())?;
            std::fs::write(class, [0xCA, 0xFE, 0xBA, 0xBE])?;
        }
        Ok(CommandOutput {
            exit_code: Some(0),
            ..CommandOutput::default()
        })
    }
}

fn staged(names: &[&str]) -> (Vec<String>, MemoryFs) {
    let mut store = MemoryFs::new();
    for name in names {
        store.write(*name, format!("// {name}"));
    }
    (names.iter().map(|n| n.to_string()).collect(), store)
}

#[test]
fn compiles_all_sources_in_one_invocation() {
    let runner = Arc::new(ScriptedJavac::default());
    let compiler = JavacCompiler::with_runner("javac", runner.clone()).with_release("17");
    let (names, store) = staged(&[
        "src/main/java/org/kie/Rules.java",
        "src/main/java/org/kie/HelloResource.java",
    ]);
    let ctx = CompileContext::new("/project/target/classes")
        .with_classpath(BTreeSet::from([PathBuf::from("/deps/a.jar")]));

    let result = compiler.compile(&names, &store, &ctx).unwrap();

    let CompilationResult::Success { target, warnings } = result else {
        panic!("expected success");
    };
    assert!(warnings.is_empty());
    assert_eq!(
        target.names().collect::<Vec<_>>(),
        vec!["org/kie/HelloResource.class", "org/kie/Rules.class"]
    );

    let calls = runner.calls();
    assert_eq!(calls.len(), 1);
    let args = &calls[0];
    assert!(args.windows(2).any(|w| w == ["--release", "17"]));
    assert!(args.windows(2).any(|w| w == ["-cp", "/deps/a.jar"]));
    assert_eq!(args.iter().filter(|a| a.ends_with(".java")).count(), 2);
}

#[test]
fn source_errors_fail_the_whole_batch() {
    let runner = Arc::new(ScriptedJavac::failing(
        "$SRC/src/main/java/org/kie/Rules.java:4: error: ';' expected\n1 error\n",
    ));
    let compiler = JavacCompiler::with_runner("javac", runner);
    let (names, store) = staged(&[
        "src/main/java/org/kie/Rules.java",
        "src/main/java/org/kie/Other.java",
    ]);

    let result = compiler
        .compile(&names, &store, &CompileContext::new("/out"))
        .unwrap();

    assert!(!result.is_success());
    assert_eq!(result.errors().len(), 1);
    assert_eq!(
        result.errors()[0].file.as_deref(),
        Some("src/main/java/org/kie/Rules.java")
    );
    assert_eq!(
        result.error_summary(),
        "src/main/java/org/kie/Rules.java:4: error: ';' expected"
    );
}

#[test]
fn non_zero_exit_without_diagnostics_is_still_a_failure() {
    let runner = Arc::new(ScriptedJavac::failing("javac: out of memory\n"));
    let compiler = JavacCompiler::with_runner("javac", runner);
    let (names, store) = staged(&["src/main/java/A.java"]);

    let result = compiler
        .compile(&names, &store, &CompileContext::new("/out"))
        .unwrap();
    assert_eq!(result.errors().len(), 1);
    assert!(result.errors()[0].message.contains("out of memory"));
}

#[test]
fn unknown_source_name_is_rejected_before_running() {
    let runner = Arc::new(ScriptedJavac::default());
    let compiler = JavacCompiler::with_runner("javac", runner.clone());
    let (_, store) = staged(&["src/main/java/A.java"]);

    let err = compiler
        .compile(
            &["src/main/java/Missing.java".to_string()],
            &store,
            &CompileContext::new("/out"),
        )
        .unwrap_err();
    assert!(matches!(err, CompileError::Vfs(_)));
    assert!(runner.calls().is_empty());
}
