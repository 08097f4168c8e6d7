use std::path::Path;

use filetime::FileTime;
use kiln_devmode::{CompilationProvider, JavaCompilationProvider, StalenessPolicy};

fn set_mtime_millis(path: &Path, millis: i64) {
    let time = FileTime::from_unix_time(millis / 1000, ((millis % 1000) * 1_000_000) as u32);
    filetime::set_file_mtime(path, time).unwrap();
}

#[test]
fn source_at_t100_against_missing_older_and_newer_output() {
    let tmp = tempfile::tempdir().unwrap();
    let sources = tmp.path().join("src/main/java");
    let classes = tmp.path().join("target/classes");
    let source = sources.join("org/kie/Rules.java");
    let class = classes.join("org/kie/Rules.class");
    std::fs::create_dir_all(source.parent().unwrap()).unwrap();
    std::fs::write(&source, "class Rules {}").unwrap();

    for policy in [StalenessPolicy::AssumeStale, StalenessPolicy::AssumeFresh] {
        let provider = JavaCompilationProvider::default().with_staleness_policy(policy);
        let _ = std::fs::remove_file(&class);

        assert!(provider.resource_modified(&source, &sources, &classes, ".java", 100));

        std::fs::create_dir_all(class.parent().unwrap()).unwrap();
        std::fs::write(&class, [0xCA, 0xFE]).unwrap();
        set_mtime_millis(&class, 50);
        assert!(provider.resource_modified(&source, &sources, &classes, ".java", 100));

        set_mtime_millis(&class, 150);
        assert!(!provider.resource_modified(&source, &sources, &classes, ".java", 100));
    }
}
