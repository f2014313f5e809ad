//! System-wide constants and default paths.

use std::path::PathBuf;
use std::sync::OnceLock;

/// Default base directory when neither the override nor `$HOME` is usable.
pub const SYSTEM_DATA_DIR: &str = "/var/lib/rendition";

/// Environment variable overriding the data directory.
pub const DATA_DIR_ENV: &str = "RENDITION_DATA_DIR";

/// Returns the data directory, preferring `$RENDITION_DATA_DIR` when it
/// exists, then `$HOME/.rendition`, falling back to `/var/lib/rendition`.
fn resolve_data_dir() -> PathBuf {
    if let Ok(custom) = std::env::var(DATA_DIR_ENV) {
        let custom = PathBuf::from(custom);
        if custom.is_dir() {
            return custom;
        }
        tracing::debug!(path = %custom.display(), "ignoring missing custom data directory");
    }
    if let Ok(home) = std::env::var("HOME").or_else(|_| std::env::var("USERPROFILE")) {
        let user_dir = PathBuf::from(home).join(".rendition");
        if std::fs::create_dir_all(&user_dir).is_ok() {
            return user_dir;
        }
    }
    PathBuf::from(SYSTEM_DATA_DIR)
}

static DATA_DIR: OnceLock<PathBuf> = OnceLock::new();

/// Returns the resolved data directory for this session.
pub fn data_dir() -> &'static PathBuf {
    DATA_DIR.get_or_init(resolve_data_dir)
}

/// Title used when a template declares none.
pub const NO_TITLE: &str = "No title";

/// Description used when a template declares none.
pub const NO_DESCRIPTION: &str = "No description";

/// Extension (without dot) of report template files.
pub const DEFAULT_TEMPLATE_EXTENSION: &str = "rpt";

/// Extension (without dot) of persisted report documents.
pub const DEFAULT_DOCUMENT_EXTENSION: &str = "rptdoc";

/// Engine installation directory name under the data directory.
pub const ENGINE_HOME_DIR: &str = "engine";

/// Output directory name under the data directory.
pub const OUTPUT_DIR: &str = "output";

/// Image directory name under the output directory.
pub const IMAGE_DIR: &str = "image";

/// Name of the optional configuration file in the data directory.
pub const CONFIG_FILE: &str = "rendition.yaml";

/// Application name used in logs and CLI output.
pub const APP_NAME: &str = "rendition";

/// Binary name for the CLI.
pub const BIN_NAME: &str = "rendition";
