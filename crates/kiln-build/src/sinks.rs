use std::path::{Path, PathBuf};

/// Host publication endpoints. Write-only: the pipeline never reads back what
/// it publishes.
pub trait BuildSinks {
    /// A compiled class for the host's generated-class space.
    fn generated_class(&mut self, class_name: &str, bytes: &[u8], application_class: bool);

    /// A compiled class the host instantiates through dependency injection.
    fn generated_bean(&mut self, class_name: &str, bytes: &[u8]);

    fn reflective_class(&mut self, class_name: &str);

    fn rest_resource(&mut self, class_name: &str);

    fn servlet_init_param(&mut self, key: &str, value: &str);

    /// A source asset whose change should re-trigger a build.
    fn hot_deployment_watch(&mut self, path: &Path);

    fn feature(&mut self, name: &str);
}

impl<S: BuildSinks + ?Sized> BuildSinks for &mut S {
    fn generated_class(&mut self, class_name: &str, bytes: &[u8], application_class: bool) {
        (**self).generated_class(class_name, bytes, application_class)
    }

    fn generated_bean(&mut self, class_name: &str, bytes: &[u8]) {
        (**self).generated_bean(class_name, bytes)
    }

    fn reflective_class(&mut self, class_name: &str) {
        (**self).reflective_class(class_name)
    }

    fn rest_resource(&mut self, class_name: &str) {
        (**self).rest_resource(class_name)
    }

    fn servlet_init_param(&mut self, key: &str, value: &str) {
        (**self).servlet_init_param(key, value)
    }

    fn hot_deployment_watch(&mut self, path: &Path) {
        (**self).hot_deployment_watch(path)
    }

    fn feature(&mut self, name: &str) {
        (**self).feature(name)
    }
}

/// One record handed to a [`BuildSinks`] method.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Publication {
    GeneratedClass {
        class_name: String,
        bytes: Vec<u8>,
        application_class: bool,
    },
    GeneratedBean {
        class_name: String,
        bytes: Vec<u8>,
    },
    ReflectiveClass {
        class_name: String,
    },
    RestResource {
        class_name: String,
    },
    ServletInitParam {
        key: String,
        value: String,
    },
    HotDeploymentWatch {
        path: PathBuf,
    },
    Feature {
        name: String,
    },
}

/// Sinks that keep every publication in arrival order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordingSinks {
    pub records: Vec<Publication>,
}

impl RecordingSinks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Class names published to the generated-class sink, in order.
    pub fn generated_classes(&self) -> Vec<&str> {
        self.records
            .iter()
            .filter_map(|record| match record {
                Publication::GeneratedClass { class_name, .. } => Some(class_name.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn generated_beans(&self) -> Vec<&str> {
        self.records
            .iter()
            .filter_map(|record| match record {
                Publication::GeneratedBean { class_name, .. } => Some(class_name.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn rest_resources(&self) -> Vec<&str> {
        self.records
            .iter()
            .filter_map(|record| match record {
                Publication::RestResource { class_name } => Some(class_name.as_str()),
                _ => None,
            })
            .collect()
    }
}

impl BuildSinks for RecordingSinks {
    fn generated_class(&mut self, class_name: &str, bytes: &[u8], application_class: bool) {
        self.records.push(Publication::GeneratedClass {
            class_name: class_name.to_string(),
            bytes: bytes.to_vec(),
            application_class,
        });
    }

    fn generated_bean(&mut self, class_name: &str, bytes: &[u8]) {
        self.records.push(Publication::GeneratedBean {
            class_name: class_name.to_string(),
            bytes: bytes.to_vec(),
        });
    }

    fn reflective_class(&mut self, class_name: &str) {
        self.records.push(Publication::ReflectiveClass {
            class_name: class_name.to_string(),
        });
    }

    fn rest_resource(&mut self, class_name: &str) {
        self.records.push(Publication::RestResource {
            class_name: class_name.to_string(),
        });
    }

    fn servlet_init_param(&mut self, key: &str, value: &str) {
        self.records.push(Publication::ServletInitParam {
            key: key.to_string(),
            value: value.to_string(),
        });
    }

    fn hot_deployment_watch(&mut self, path: &Path) {
        self.records.push(Publication::HotDeploymentWatch {
            path: path.to_path_buf(),
        });
    }

    fn feature(&mut self, name: &str) {
        self.records.push(Publication::Feature {
            name: name.to_string(),
        });
    }
}
