use std::path::{Path, PathBuf};

use kiln_build::BuildSinks;
use kiln_core::to_class_file_path;
use serde::Serialize;

/// Host side of a command-line build: compiled classes land in the classes
/// directory and everything else is collected into a manifest.
#[derive(Debug, Default, Serialize)]
pub struct DirectorySinks {
    #[serde(skip)]
    classes_dir: PathBuf,
    pub written: Vec<PathBuf>,
    pub beans: Vec<String>,
    pub reflective_classes: Vec<String>,
    pub rest_resources: Vec<String>,
    pub servlet_init_params: Vec<(String, String)>,
    pub watched: Vec<PathBuf>,
    pub features: Vec<String>,
    #[serde(skip)]
    errors: Vec<String>,
}

impl DirectorySinks {
    pub fn new(classes_dir: impl Into<PathBuf>) -> Self {
        Self {
            classes_dir: classes_dir.into(),
            ..Self::default()
        }
    }

    /// Write failures; sinks have no way to report them inline.
    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    fn write_class(&mut self, class_name: &str, bytes: &[u8]) {
        let path = self.classes_dir.join(to_class_file_path(class_name));
        match kiln_core::fs::write_creating_dirs(&path, bytes) {
            Ok(()) => self.written.push(path),
            Err(err) => self
                .errors
                .push(format!("failed to write {}: {err}", path.display())),
        }
    }
}

impl BuildSinks for DirectorySinks {
    fn generated_class(&mut self, class_name: &str, bytes: &[u8], _application_class: bool) {
        self.write_class(class_name, bytes);
    }

    fn generated_bean(&mut self, class_name: &str, bytes: &[u8]) {
        self.write_class(class_name, bytes);
        self.beans.push(class_name.to_string());
    }

    fn reflective_class(&mut self, class_name: &str) {
        self.reflective_classes.push(class_name.to_string());
    }

    fn rest_resource(&mut self, class_name: &str) {
        self.rest_resources.push(class_name.to_string());
    }

    fn servlet_init_param(&mut self, key: &str, value: &str) {
        self.servlet_init_params
            .push((key.to_string(), value.to_string()));
    }

    fn hot_deployment_watch(&mut self, path: &Path) {
        self.watched.push(path.to_path_buf());
    }

    fn feature(&mut self, name: &str) {
        self.features.push(name.to_string());
    }
}
