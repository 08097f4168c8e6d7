use kiln_codegen::{GeneratedFile, GeneratedFileType};
use kiln_core::{to_logical_name, CLASS_SUFFIX};
use kiln_vfs::MemoryFs;
use serde::{Deserialize, Serialize};

use crate::sinks::BuildSinks;

/// Servlet init-parameter listing REST resource classes under
/// [`RestPolicy::ServletInitParam`].
pub const REST_RESOURCES_INIT_PARAM: &str = "resteasy.resources";

/// How REST-tagged generated files are announced to the host.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RestPolicy {
    /// One REST-resource record per class.
    #[default]
    JaxRsResource,
    /// A single comma-joined [`REST_RESOURCES_INIT_PARAM`] servlet parameter
    /// plus a reflective-access record per class.
    ServletInitParam,
}

/// Counts of what one registration published.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Registration {
    pub classes: Vec<String>,
    pub beans: Vec<String>,
    pub rest_resources: Vec<String>,
}

/// Classifies compiled output and generation-time tags into host sinks.
#[derive(Debug, Clone, Default)]
pub struct ArtifactRegistrar {
    rest_policy: RestPolicy,
}

impl ArtifactRegistrar {
    pub fn new(rest_policy: RestPolicy) -> Self {
        Self { rest_policy }
    }

    pub fn rest_policy(&self) -> RestPolicy {
        self.rest_policy
    }

    /// Publishes every compiled class in `target`, then every REST-tagged file
    /// of `files`.
    ///
    /// The class named `bootstrap_class` goes to the bean sink; all other
    /// classes go to the generated-class sink as application classes. REST
    /// classification reads the tags of the Java sources in `files` since
    /// bytecode does not carry them.
    pub fn register(
        &self,
        target: &MemoryFs,
        files: &[GeneratedFile],
        bootstrap_class: Option<&str>,
        sinks: &mut dyn BuildSinks,
    ) -> Registration {
        let mut registration = Registration::default();

        for (path, bytes) in target.iter() {
            if !path.ends_with(CLASS_SUFFIX) {
                tracing::debug!(target: "kiln.build", path, "skipping non-class compiler output");
                continue;
            }
            let class_name = to_logical_name(path);
            if Some(class_name.as_str()) == bootstrap_class {
                sinks.generated_bean(&class_name, bytes);
                registration.beans.push(class_name);
            } else {
                sinks.generated_class(&class_name, bytes, true);
                registration.classes.push(class_name);
            }
        }

        let rest: Vec<String> = files
            .iter()
            .filter(|file| file.is_java_source() && file.kind() == GeneratedFileType::Rest)
            .map(GeneratedFile::class_name)
            .collect();

        match self.rest_policy {
            RestPolicy::JaxRsResource => {
                for class_name in &rest {
                    sinks.rest_resource(class_name);
                }
            }
            RestPolicy::ServletInitParam => {
                for class_name in &rest {
                    sinks.reflective_class(class_name);
                }
                if !rest.is_empty() {
                    sinks.servlet_init_param(REST_RESOURCES_INIT_PARAM, &rest.join(","));
                }
            }
        }
        registration.rest_resources = rest;

        tracing::debug!(
            target: "kiln.build",
            classes = registration.classes.len(),
            beans = registration.beans.len(),
            rest = registration.rest_resources.len(),
            policy = ?self.rest_policy,
            "registered artifacts"
        );
        registration
    }
}
