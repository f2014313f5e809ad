//! Rendering engine abstraction.

use std::path::Path;

use rendition_common::error::EngineResult;
use rendition_common::types::{BoundParameters, SelectionItem};

use crate::context::{ExecutionContext, Operation};
use crate::definition::ParameterDefinition;
use crate::options::RenderOptions;

/// Capability interface of a report rendering engine.
///
/// Implementors compile template files into reusable handles, describe their
/// parameters, run them into persisted documents, and render those documents
/// into HTML or PDF. All methods take `&self`; implementations must be safe to
/// call from many threads at once with distinct execution contexts.
pub trait ReportEngine: Send + Sync + 'static {
    /// Compiled template handle, reusable across executions.
    type Template: Send + Sync + 'static;

    /// Opened persisted document.
    type Document: Send;

    /// Starts the engine platform from its installation home.
    ///
    /// # Errors
    ///
    /// Returns an error if the platform cannot be started.
    fn startup(&self, home: &Path) -> EngineResult<()>;

    /// Releases all engine resources. Called once, on service teardown.
    fn shutdown(&self);

    /// Compiles the template file at `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not a valid template.
    fn compile(&self, path: &Path) -> EngineResult<Self::Template>;

    /// Title declared by the template, if any.
    fn title(&self, template: &Self::Template) -> Option<String>;

    /// Description declared by the template, if any.
    fn description(&self, template: &Self::Template) -> Option<String>;

    /// Flat list of scalar and group definitions, in declaration order.
    ///
    /// # Errors
    ///
    /// Returns an error if the definitions cannot be evaluated.
    fn parameter_definitions(
        &self,
        template: &Self::Template,
    ) -> EngineResult<Vec<ParameterDefinition>>;

    /// Selection list of a parameter that is not part of a cascading group.
    ///
    /// # Errors
    ///
    /// Returns an error if the list query fails.
    fn selection_list(
        &self,
        template: &Self::Template,
        parameter: &str,
    ) -> EngineResult<Option<Vec<SelectionItem>>>;

    /// Selection list of the cascading-group member following the members
    /// whose values are given in `key`, evaluating the group's data query.
    ///
    /// # Errors
    ///
    /// Returns an error if the group query fails.
    fn cascading_selection_list(
        &self,
        template: &Self::Template,
        group: &str,
        key: &[Option<String>],
    ) -> EngineResult<Option<Vec<SelectionItem>>>;

    /// Acquires a fresh execution context for one call.
    ///
    /// # Errors
    ///
    /// Returns an error if the engine cannot provide a context.
    fn open_context(&self, operation: Operation, template: &str) -> EngineResult<ExecutionContext> {
        Ok(ExecutionContext::new(operation, template))
    }

    /// Releases a context obtained from [`open_context`](Self::open_context).
    fn close_context(&self, context: &ExecutionContext) {
        tracing::trace!(
            id = %context.id,
            operation = %context.operation,
            "execution context closed"
        );
    }

    /// Runs `template` with `parameters` and persists the document at `document_path`.
    ///
    /// # Errors
    ///
    /// Returns an error if execution or persistence fails.
    fn execute(
        &self,
        template: &Self::Template,
        context: &ExecutionContext,
        parameters: &BoundParameters,
        document_path: &Path,
    ) -> EngineResult<()>;

    /// Opens a document persisted by [`execute`](Self::execute).
    ///
    /// # Errors
    ///
    /// Returns an error if the document does not exist or cannot be read.
    fn open_document(&self, path: &Path) -> EngineResult<Self::Document>;

    /// Renders `document` to the file and format described by `options`.
    ///
    /// # Errors
    ///
    /// Returns an error if rendering or writing the output fails.
    fn render_document(
        &self,
        document: &Self::Document,
        context: &ExecutionContext,
        parameters: &BoundParameters,
        options: &RenderOptions,
    ) -> EngineResult<()>;
}
