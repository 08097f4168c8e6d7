use std::path::Path;
use std::sync::atomic::Ordering;
use std::sync::Arc;

use kiln_build::{
    ArtifactRegistrar, BuildError, BuildPipeline, Publication, RecordingSinks, RestPolicy,
    FEATURE_NAME,
};
use kiln_codegen::{
    AssetGenerator, BootstrapSource, DebugDump, GeneratedFile, GeneratedFileType, GenerationError,
    GeneratorPool, PassthroughTransform,
};
use kiln_compiler::Diagnostic;
use pretty_assertions::assert_eq;

use super::fakes::{ContextEchoGenerator, CountingGenerator, ScriptedCompiler};

const CLASSES: &str = "/project/target/classes";

fn bootstrap() -> BootstrapSource {
    BootstrapSource::new("io.kiln.runtime.RuntimeProducer", "class RuntimeProducer {}")
}

fn two_files() -> Vec<GeneratedFile> {
    vec![
        GeneratedFile::generic("org/kie/Rules.java", "class Rules {}"),
        GeneratedFile::rest("org/kie/gen/HelloResource.java", "class HelloResource {}"),
    ]
}

#[test]
fn empty_pool_publishes_nothing_and_skips_the_compiler() {
    let compiler = Arc::new(ScriptedCompiler::default());
    let pipeline = BuildPipeline::new(GeneratorPool::new().with_bootstrap(bootstrap()), compiler.clone());
    let mut sinks = RecordingSinks::new();

    let report = pipeline.run(Path::new(CLASSES), &mut sinks).unwrap();

    assert!(report.is_empty());
    assert!(sinks.is_empty());
    assert_eq!(compiler.invocations(), 0);
}

#[test]
fn distinct_files_each_appear_once_in_the_class_sink() {
    let compiler = Arc::new(ScriptedCompiler::default());
    let pool = GeneratorPool::new().with_generator(CountingGenerator::new(two_files()));
    let pipeline = BuildPipeline::new(pool, compiler.clone());
    let mut sinks = RecordingSinks::new();

    pipeline.run(Path::new(CLASSES), &mut sinks).unwrap();

    assert_eq!(
        sinks.generated_classes(),
        vec!["org.kie.Rules", "org.kie.gen.HelloResource"]
    );
    assert_eq!(compiler.invocations(), 1);
    assert_eq!(
        sinks.records.last(),
        Some(&Publication::Feature {
            name: FEATURE_NAME.to_string()
        })
    );
}

#[test]
fn compile_errors_publish_nothing_and_aggregate_every_message() {
    let errors = vec![
        Diagnostic::error("cannot find symbol").at("src/main/java/org/kie/Rules.java", Some(3)),
        Diagnostic::error("';' expected").at("src/main/java/org/kie/gen/HelloResource.java", Some(9)),
    ];
    let pool = GeneratorPool::new()
        .with_generator(CountingGenerator::new(two_files()))
        .with_bootstrap(bootstrap());
    let pipeline = BuildPipeline::new(pool, ScriptedCompiler::failing(errors));
    let mut sinks = RecordingSinks::new();

    let err = pipeline.run(Path::new(CLASSES), &mut sinks).unwrap_err();

    let message = match err {
        BuildError::Compilation { message } => message,
        other => panic!("expected a compilation failure, got {other:?}"),
    };
    assert_eq!(
        message,
        "src/main/java/org/kie/Rules.java:3: error: cannot find symbol\n\
         src/main/java/org/kie/gen/HelloResource.java:9: error: ';' expected"
    );
    assert!(sinks.is_empty());
}

#[test]
fn rest_tagged_file_reaches_the_resource_sink() {
    for policy in [RestPolicy::JaxRsResource, RestPolicy::ServletInitParam] {
        let pool = GeneratorPool::new().with_generator(CountingGenerator::new(two_files()));
        let pipeline = BuildPipeline::new(pool, ScriptedCompiler::default())
            .with_registrar(ArtifactRegistrar::new(policy));
        let mut sinks = RecordingSinks::new();

        let report = pipeline.run(Path::new(CLASSES), &mut sinks).unwrap();

        assert_eq!(
            report.registration.rest_resources,
            vec!["org.kie.gen.HelloResource".to_string()]
        );
        match policy {
            RestPolicy::JaxRsResource => {
                assert_eq!(sinks.rest_resources(), vec!["org.kie.gen.HelloResource"])
            }
            RestPolicy::ServletInitParam => assert!(sinks.records.contains(
                &Publication::ServletInitParam {
                    key: kiln_build::REST_RESOURCES_INIT_PARAM.to_string(),
                    value: "org.kie.gen.HelloResource".to_string(),
                }
            )),
        }
    }
}

#[test]
fn bootstrap_is_compiled_and_published_as_a_bean() {
    let pool = GeneratorPool::new()
        .with_generator(CountingGenerator::new(two_files()))
        .with_bootstrap(bootstrap());
    let pipeline = BuildPipeline::new(pool, ScriptedCompiler::default());
    let mut sinks = RecordingSinks::new();

    let report = pipeline.run(Path::new(CLASSES), &mut sinks).unwrap();

    assert_eq!(report.generated_files, 3);
    assert_eq!(sinks.generated_beans(), vec!["io.kiln.runtime.RuntimeProducer"]);
    assert!(!sinks
        .generated_classes()
        .contains(&"io.kiln.runtime.RuntimeProducer"));
}

#[test]
fn rerunning_an_unchanged_project_publishes_identical_artifacts() {
    let generator = CountingGenerator::new(two_files());
    let runs = generator.runs.clone();
    let pool = GeneratorPool::new()
        .with_generator(generator)
        .with_bootstrap(bootstrap());
    let pipeline = BuildPipeline::new(pool, ScriptedCompiler::default());

    let mut first = RecordingSinks::new();
    let mut second = RecordingSinks::new();
    pipeline.run(Path::new(CLASSES), &mut first).unwrap();
    pipeline.run(Path::new(CLASSES), &mut second).unwrap();

    assert_eq!(runs.load(Ordering::SeqCst), 2);
    assert_eq!(first, second);
}

#[test]
fn debug_dump_mirrors_sources_without_changing_the_outcome() {
    let dump = tempfile::tempdir().unwrap();
    let pool = || GeneratorPool::new().with_generator(CountingGenerator::new(two_files()));

    let mut plain = RecordingSinks::new();
    BuildPipeline::new(pool(), ScriptedCompiler::default())
        .run(Path::new(CLASSES), &mut plain)
        .unwrap();

    let mut dumped = RecordingSinks::new();
    let report = BuildPipeline::new(pool(), ScriptedCompiler::default())
        .with_debug_dump(DebugDump::new(Some(dump.path().join("generated"))))
        .run(Path::new(CLASSES), &mut dumped)
        .unwrap();

    assert_eq!(plain, dumped);
    assert_eq!(report.debug_files_written, 2);
    assert_eq!(
        std::fs::read_to_string(dump.path().join("generated/org/kie/gen/HelloResource.java"))
            .unwrap(),
        "class HelloResource {}"
    );
}

#[test]
fn discovered_assets_are_registered_for_hot_deployment() {
    let project = tempfile::tempdir().unwrap();
    let asset = project.path().join("src/main/resources/org/kie/Hello.java");
    std::fs::create_dir_all(asset.parent().unwrap()).unwrap();
    std::fs::write(&asset, "class Hello {}").unwrap();

    let pool = GeneratorPool::new().with_generator(
        AssetGenerator::new(
            "passthrough",
            "java",
            PassthroughTransform::new("src/main/resources", GeneratedFileType::Generic),
        )
        .with_root("src/main/resources"),
    );
    let classes = project.path().join("target/classes");
    let mut sinks = RecordingSinks::new();

    let report = BuildPipeline::new(pool, ScriptedCompiler::default())
        .run(&classes, &mut sinks)
        .unwrap();

    assert_eq!(report.project_root, project.path());
    assert_eq!(sinks.generated_classes(), vec!["org.kie.Hello"]);
    assert!(sinks
        .records
        .contains(&Publication::HotDeploymentWatch { path: asset.clone() }));
    assert_eq!(report.watched_assets, vec![asset]);
}

#[test]
fn non_java_files_are_mirrored_but_never_compiled_or_published_as_classes() {
    let dump = tempfile::tempdir().unwrap();
    let compiler = Arc::new(ScriptedCompiler::default());
    let pool = GeneratorPool::new().with_generator(CountingGenerator::new(vec![
        GeneratedFile::generic("org/kie/A.java", "class A {}"),
        GeneratedFile::rest("META-INF/kmodule.xml", "<kmodule/>"),
    ]));
    let mut sinks = RecordingSinks::new();

    let report = BuildPipeline::new(pool, compiler.clone())
        .with_debug_dump(DebugDump::new(Some(dump.path().to_path_buf())))
        .run(Path::new(CLASSES), &mut sinks)
        .unwrap();

    assert_eq!(compiler.compiled_names(), vec!["src/main/java/org/kie/A.java"]);
    assert_eq!(sinks.generated_classes(), vec!["org.kie.A"]);
    assert!(sinks.rest_resources().is_empty());
    assert_eq!(report.generated_files, 2);
    assert_eq!(report.debug_files_written, 2);
    assert_eq!(
        std::fs::read_to_string(dump.path().join("META-INF/kmodule.xml")).unwrap(),
        "<kmodule/>"
    );
}

#[test]
fn batch_without_java_sources_skips_the_compiler() {
    let compiler = Arc::new(ScriptedCompiler::default());
    let pool = GeneratorPool::new().with_generator(CountingGenerator::new(vec![
        GeneratedFile::generic("META-INF/kmodule.xml", "<kmodule/>"),
    ]));
    let mut sinks = RecordingSinks::new();

    let report = BuildPipeline::new(pool, compiler.clone())
        .run(Path::new(CLASSES), &mut sinks)
        .unwrap();

    assert_eq!(compiler.invocations(), 0);
    assert!(sinks.generated_classes().is_empty());
    assert!(report.registration.classes.is_empty());
    assert_eq!(
        sinks.records,
        vec![Publication::Feature {
            name: FEATURE_NAME.to_string()
        }]
    );
}

#[test]
fn malformed_bootstrap_name_fails_before_compiling() {
    let compiler = Arc::new(ScriptedCompiler::default());
    let pool = GeneratorPool::new()
        .with_generator(CountingGenerator::new(two_files()))
        .with_bootstrap(BootstrapSource::new(
            "org/acme/RuntimeProducer",
            "class RuntimeProducer {}",
        ));
    let mut sinks = RecordingSinks::new();

    let result = BuildPipeline::new(pool, compiler.clone()).run(Path::new(CLASSES), &mut sinks);

    match result {
        Err(BuildError::Generation(GenerationError::InvalidClassName(name))) => {
            assert_eq!(name, "org/acme/RuntimeProducer")
        }
        other => panic!("expected an invalid class name error, got {other:?}"),
    }
    assert!(sinks.is_empty());
    assert_eq!(compiler.invocations(), 0);
}

#[test]
fn generators_see_the_configured_context() {
    let project = tempfile::tempdir().unwrap();
    let custom = project
        .path()
        .join("src/main/java/org/acme/WorkItemHandlerConfig.java");
    std::fs::create_dir_all(custom.parent().unwrap()).unwrap();
    std::fs::write(&custom, "public class WorkItemHandlerConfig {}").unwrap();

    let pool = GeneratorPool::new().with_generator(ContextEchoGenerator {
        config_class: "org.acme.WorkItemHandlerConfig",
    });
    let mut sinks = RecordingSinks::new();

    BuildPipeline::new(pool, ScriptedCompiler::default())
        .with_app_package("org.acme")
        .with_dependency_injection(false)
        .run(&project.path().join("target/classes"), &mut sinks)
        .unwrap();

    let published = sinks.records.iter().find_map(|record| match record {
        Publication::GeneratedClass {
            class_name, bytes, ..
        } if class_name == "org.acme.Application" => {
            Some(String::from_utf8_lossy(bytes).into_owned())
        }
        _ => None,
    });
    assert_eq!(
        published.as_deref(),
        Some("di=false config=org.acme.WorkItemHandlerConfig")
    );
}
