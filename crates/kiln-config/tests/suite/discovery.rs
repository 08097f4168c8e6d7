use std::path::PathBuf;

use kiln_config::{
    discover_config_path, load_for_project, with_config_env_lock, KilnConfig, CONFIG_FILE_NAME,
    DEBUG_DIR_ENV_VAR, KILN_CONFIG_ENV_VAR,
};
use pretty_assertions::assert_eq;

#[test]
fn missing_config_yields_defaults() {
    let tmp = tempfile::tempdir().unwrap();
    with_config_env_lock(|| {
        std::env::remove_var(KILN_CONFIG_ENV_VAR);
        std::env::remove_var(DEBUG_DIR_ENV_VAR);
        let (config, path) = load_for_project(tmp.path()).unwrap();
        assert_eq!(path, None);
        assert_eq!(config, KilnConfig::default());
    });
}

#[test]
fn project_file_is_discovered() {
    let tmp = tempfile::tempdir().unwrap();
    std::fs::write(
        tmp.path().join(CONFIG_FILE_NAME),
        "[build]\napp_package = \"org.acme\"\n",
    )
    .unwrap();
    with_config_env_lock(|| {
        std::env::remove_var(KILN_CONFIG_ENV_VAR);
        std::env::remove_var(DEBUG_DIR_ENV_VAR);
        let (config, path) = load_for_project(tmp.path()).unwrap();
        assert_eq!(path, Some(tmp.path().join(CONFIG_FILE_NAME)));
        assert_eq!(config.build.app_package, "org.acme");
    });
}

#[test]
fn env_path_takes_precedence_and_resolves_relative_to_root() {
    let tmp = tempfile::tempdir().unwrap();
    std::fs::write(tmp.path().join(CONFIG_FILE_NAME), "").unwrap();
    std::fs::create_dir_all(tmp.path().join("conf")).unwrap();
    std::fs::write(
        tmp.path().join("conf/alt.toml"),
        "[devmode]\njava_release = \"21\"\n",
    )
    .unwrap();

    with_config_env_lock(|| {
        std::env::set_var(KILN_CONFIG_ENV_VAR, "conf/alt.toml");
        std::env::remove_var(DEBUG_DIR_ENV_VAR);
        let discovered = discover_config_path(tmp.path());
        let loaded = load_for_project(tmp.path());
        std::env::remove_var(KILN_CONFIG_ENV_VAR);

        assert_eq!(discovered, Some(tmp.path().join("conf/alt.toml")));
        let (config, _) = loaded.unwrap();
        assert_eq!(config.devmode.java_release.as_deref(), Some("21"));
    });
}

#[test]
fn debug_dir_env_var_overrides_the_file() {
    let tmp = tempfile::tempdir().unwrap();
    std::fs::write(
        tmp.path().join(CONFIG_FILE_NAME),
        "[build]\ndebug_generated_classes_dir = \"from-file\"\n",
    )
    .unwrap();

    with_config_env_lock(|| {
        std::env::remove_var(KILN_CONFIG_ENV_VAR);
        std::env::set_var(DEBUG_DIR_ENV_VAR, "/tmp/kiln-debug");
        let loaded = load_for_project(tmp.path());
        std::env::remove_var(DEBUG_DIR_ENV_VAR);

        let (config, _) = loaded.unwrap();
        assert_eq!(
            config.build.debug_generated_classes_dir,
            Some(PathBuf::from("/tmp/kiln-debug"))
        );
    });
}

#[test]
fn unreadable_file_reports_the_path() {
    let tmp = tempfile::tempdir().unwrap();
    let missing = tmp.path().join("nope.toml");
    let err = KilnConfig::load_from_path(&missing).unwrap_err();
    assert!(err.to_string().contains("nope.toml"));
}
