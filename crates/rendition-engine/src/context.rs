//! Per-call execution contexts.

use std::collections::BTreeMap;
use std::fmt;

use uuid::Uuid;

/// Kind of engine work an execution context is opened for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    /// Running a compiled template into a persisted document.
    Run,
    /// Rendering a persisted document into an output format.
    Render,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Run => write!(f, "run"),
            Self::Render => write!(f, "render"),
        }
    }
}

/// Engine state scoped to one render or view invocation.
///
/// Contexts are never shared between concurrent calls. The caller that opens
/// one is responsible for handing it back through
/// [`ReportEngine::close_context`](crate::engine::ReportEngine::close_context).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionContext {
    /// Unique identifier for log correlation.
    pub id: Uuid,
    /// What the context was opened for.
    pub operation: Operation,
    /// Template file name the call works on.
    pub template: String,
    /// Application attributes made visible to the engine during the call.
    pub attributes: BTreeMap<String, String>,
}

impl ExecutionContext {
    /// Creates a fresh context with a random identifier.
    #[must_use]
    pub fn new(operation: Operation, template: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            operation,
            template: template.into(),
            attributes: BTreeMap::new(),
        }
    }

    /// Adds an application attribute.
    #[must_use]
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        let _ = self.attributes.insert(key.into(), value.into());
        self
    }
}
