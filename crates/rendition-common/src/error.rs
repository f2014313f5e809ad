//! Unified error types for the Rendition workspace.
//!
//! [`EngineError`] is what a rendering engine reports. [`ReportError`] is what
//! the catalog service reports; engine errors reach callers wrapped with the
//! operation and template they belong to.

use std::path::PathBuf;

use thiserror::Error;

use crate::types::{DataType, ServiceState};

/// Failure reported by a rendering engine implementation.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The engine platform could not be started or is not running.
    #[error("engine platform error: {message}")]
    Platform {
        /// Description of the platform failure.
        message: String,
    },

    /// A template could not be compiled.
    #[error("failed to compile {path}: {message}")]
    Compile {
        /// Template that failed to compile.
        path: PathBuf,
        /// Description of the compile failure.
        message: String,
    },

    /// A parameter definition or selection list could not be evaluated.
    #[error("parameter {name}: {message}")]
    Parameter {
        /// Parameter or group being evaluated.
        name: String,
        /// Description of the failure.
        message: String,
    },

    /// Running or rendering a report failed.
    #[error("execution failed: {message}")]
    Execution {
        /// Description of the execution failure.
        message: String,
    },

    /// A persisted document could not be opened.
    #[error("cannot open document {path}: {message}")]
    Document {
        /// Document artifact path.
        path: PathBuf,
        /// Description of the failure.
        message: String,
    },

    /// An I/O operation failed.
    #[error("I/O error at {path}: {source}")]
    Io {
        /// Path where the I/O error occurred.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Serialization or deserialization failed.
    #[error("serialization error: {source}")]
    Serialization {
        /// Underlying serialization error.
        #[from]
        source: serde_json::Error,
    },
}

/// Top-level error type of the report catalog service.
#[derive(Debug, Error)]
pub enum ReportError {
    /// Installation or working directories are missing or invalid.
    #[error("invalid configuration: {message}")]
    Configuration {
        /// Description of the invalid configuration.
        message: String,
    },

    /// Building the catalog failed; the service stays uninitialized.
    #[error("failed to load report templates at {template}: {source}")]
    Initialization {
        /// Template that failed to load, or the template directory when it
        /// could not be scanned.
        template: String,
        /// Underlying failure.
        source: Box<ReportError>,
    },

    /// An operation was invoked outside its legal lifecycle states.
    #[error("cannot {operation} in state {state}")]
    IllegalState {
        /// State the service was in.
        state: ServiceState,
        /// Operation that was attempted.
        operation: &'static str,
    },

    /// The requested template is not in the catalog.
    #[error("no such report template: {name}")]
    UnknownTemplate {
        /// Requested template file name.
        name: String,
    },

    /// A supplied parameter is not declared by the template.
    #[error("no such parameter {name} in report template {template}")]
    UnknownParameter {
        /// Template the parameter was supplied for.
        template: String,
        /// Supplied parameter name.
        name: String,
    },

    /// A raw value could not be parsed as the declared data type.
    #[error("cannot convert parameter {name} value {value:?} to {expected}: {reason}")]
    Coercion {
        /// Parameter name.
        name: String,
        /// Raw value supplied.
        value: String,
        /// Declared data type.
        expected: DataType,
        /// Parser failure description.
        reason: String,
    },

    /// The engine failed while compiling or describing a template.
    #[error("engine failed to {operation} {template}: {source}")]
    Engine {
        /// Operation being performed.
        operation: &'static str,
        /// Template being processed.
        template: String,
        /// Underlying engine error.
        source: EngineError,
    },

    /// Template metadata is inconsistent.
    #[error("invalid parameter metadata in {template}: {message}")]
    Extraction {
        /// Template being processed.
        template: String,
        /// Description of the inconsistency.
        message: String,
    },

    /// Running a template into a document failed.
    #[error("failed to render report {template}: {source}")]
    Render {
        /// Template being rendered.
        template: String,
        /// Underlying engine error.
        source: EngineError,
    },

    /// Rendering a persisted document into an output format failed.
    #[error("failed to view report {template}: {source}")]
    View {
        /// Template being viewed.
        template: String,
        /// Underlying engine error.
        source: EngineError,
    },

    /// An I/O operation failed.
    #[error("I/O error at {path}: {source}")]
    Io {
        /// Path where the I/O error occurred.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
}

/// Convenience alias used throughout the workspace.
pub type Result<T> = std::result::Result<T, ReportError>;

/// Result alias for engine implementations.
pub type EngineResult<T> = std::result::Result<T, EngineError>;
