//! Template file discovery.

use std::path::{Path, PathBuf};

use rendition_common::config::ServiceConfig;
use rendition_common::error::{ReportError, Result};

/// A template file found in the template directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateFile {
    /// File name; the catalog key.
    pub file_name: String,
    /// Full path handed to the engine.
    pub path: PathBuf,
}

fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> ReportError + '_ {
    move |source| ReportError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// Lists regular files in the template directory that carry the template
/// extension, sorted by file name. Subdirectories are not descended into.
///
/// # Errors
///
/// Returns an error if the directory or one of its entries cannot be read.
pub fn discover_templates(config: &ServiceConfig) -> Result<Vec<TemplateFile>> {
    let dir = &config.template_dir;
    let mut found = Vec::new();

    for entry in std::fs::read_dir(dir).map_err(io_error(dir))? {
        let entry = entry.map_err(io_error(dir))?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let Some(file_name) = entry.file_name().to_str().map(str::to_string) else {
            tracing::debug!(path = %path.display(), "skipping non UTF-8 file name");
            continue;
        };
        if config.is_template_file_name(&file_name) {
            found.push(TemplateFile { file_name, path });
        }
    }

    found.sort_by(|a, b| a.file_name.cmp(&b.file_name));
    tracing::debug!(dir = %dir.display(), count = found.len(), "template files discovered");
    Ok(found)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn touch(dir: &Path, name: &str) {
        std::fs::write(dir.join(name), "{}").expect("write");
    }

    #[test]
    fn empty_directory_yields_nothing() {
        let dir = tempfile::tempdir().expect("tempdir");
        let config = ServiceConfig::from_data_dir(dir.path());
        assert!(discover_templates(&config).expect("discover").is_empty());
    }

    #[test]
    fn only_matching_regular_files_are_listed_in_order() {
        let dir = tempfile::tempdir().expect("tempdir");
        touch(dir.path(), "zeta.rpt");
        touch(dir.path(), "alpha.rpt");
        touch(dir.path(), "alpha.rpt.rptdoc");
        touch(dir.path(), "notes.txt");
        std::fs::create_dir(dir.path().join("nested.rpt")).expect("mkdir");
        std::fs::create_dir(dir.path().join("sub")).expect("mkdir");
        touch(&dir.path().join("sub"), "deep.rpt");

        let config = ServiceConfig::from_data_dir(dir.path());
        let names: Vec<String> = discover_templates(&config)
            .expect("discover")
            .into_iter()
            .map(|t| t.file_name)
            .collect();
        assert_eq!(names, vec!["alpha.rpt", "zeta.rpt"]);
    }

    #[test]
    fn missing_directory_is_an_io_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let config = ServiceConfig::from_data_dir(dir.path().join("gone"));
        assert!(matches!(
            discover_templates(&config),
            Err(ReportError::Io { .. })
        ));
    }
}
