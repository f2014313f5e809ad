//! Configuration model for the report catalog service.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_DOCUMENT_EXTENSION, DEFAULT_TEMPLATE_EXTENSION, ENGINE_HOME_DIR, IMAGE_DIR, OUTPUT_DIR,
};
use crate::error::{ReportError, Result};

/// Root configuration for a report catalog service instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Directory scanned (non-recursively) for report templates.
    pub template_dir: PathBuf,
    /// Directory receiving persisted documents and rendered views.
    pub output_dir: PathBuf,
    /// Engine installation home handed to the engine at startup.
    pub engine_home: PathBuf,
    /// Base URL under which HTML views reference extracted images.
    #[serde(default)]
    pub image_base_url: Option<String>,
    /// Extension (without dot) identifying template files.
    #[serde(default = "default_template_extension")]
    pub template_extension: String,
    /// Extension (without dot) of persisted documents.
    #[serde(default = "default_document_extension")]
    pub document_extension: String,
    /// Skip templates that fail to load instead of aborting the catalog build.
    #[serde(default)]
    pub skip_invalid_templates: bool,
}

fn default_template_extension() -> String {
    DEFAULT_TEMPLATE_EXTENSION.to_string()
}

fn default_document_extension() -> String {
    DEFAULT_DOCUMENT_EXTENSION.to_string()
}

impl ServiceConfig {
    /// Derives the conventional layout rooted at `data_dir`: templates in the
    /// directory itself, the engine under `engine/`, artifacts under `output/`.
    #[must_use]
    pub fn from_data_dir(data_dir: impl Into<PathBuf>) -> Self {
        let data_dir = data_dir.into();
        Self {
            engine_home: data_dir.join(ENGINE_HOME_DIR),
            output_dir: data_dir.join(OUTPUT_DIR),
            template_dir: data_dir,
            image_base_url: None,
            template_extension: default_template_extension(),
            document_extension: default_document_extension(),
            skip_invalid_templates: false,
        }
    }

    /// Loads a configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not a valid
    /// configuration document.
    pub fn load(path: &Path) -> Result<Self> {
        tracing::debug!(path = %path.display(), "loading service configuration");
        let content = std::fs::read_to_string(path).map_err(|e| ReportError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        let mut config: Self =
            serde_yaml::from_str(&content).map_err(|e| ReportError::Configuration {
                message: format!("{}: {e}", path.display()),
            })?;
        config.image_base_url = config.image_base_url.take().map(ensure_trailing_slash);
        Ok(config)
    }

    /// Sets the image base URL, normalized to end with `/`.
    #[must_use]
    pub fn with_image_base_url(mut self, url: impl Into<String>) -> Self {
        self.image_base_url = Some(ensure_trailing_slash(url.into()));
        self
    }

    /// Directory where HTML views place extracted images.
    #[must_use]
    pub fn image_directory(&self) -> PathBuf {
        self.output_dir.join(IMAGE_DIR)
    }

    /// Returns whether `file_name` carries the template extension.
    #[must_use]
    pub fn is_template_file_name(&self, file_name: &str) -> bool {
        file_name
            .strip_suffix(self.template_extension.as_str())
            .and_then(|stem| stem.strip_suffix('.'))
            .is_some_and(|stem| !stem.is_empty())
    }

    /// Name of the document artifact persisted for a template.
    #[must_use]
    pub fn document_file_name(&self, template: &str) -> String {
        format!("{template}.{}", self.document_extension)
    }
}

fn ensure_trailing_slash(mut url: String) -> String {
    if !url.ends_with('/') {
        url.push('/');
    }
    url
}
