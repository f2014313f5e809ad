//! Reference engine over JSON template descriptors.
//!
//! Templates are JSON files (see [`TemplateDescriptor`](template::TemplateDescriptor)).
//! Running a template substitutes parameter values into its body lines and
//! persists the result as a JSON document; rendering writes that document out
//! as HTML or PDF.

pub mod output;
pub mod template;

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use rendition_common::error::{EngineError, EngineResult};
use rendition_common::types::{BoundParameters, SelectionItem};

use crate::context::{ExecutionContext, Operation};
use crate::definition::ParameterDefinition;
use crate::engine::ReportEngine;
use crate::options::{FormatOptions, RenderOptions};

use self::template::{CompiledDescriptor, DocumentArtifact};

/// Engine that reads JSON descriptors from disk.
#[derive(Debug, Default)]
pub struct DescriptorEngine {
    running: AtomicBool,
    open_contexts: AtomicUsize,
}

impl DescriptorEngine {
    /// Creates an engine that has not been started yet.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns whether [`startup`](ReportEngine::startup) succeeded and
    /// [`shutdown`](ReportEngine::shutdown) has not been called since.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Number of execution contexts currently open.
    pub fn open_contexts(&self) -> usize {
        self.open_contexts.load(Ordering::SeqCst)
    }

    fn ensure_running(&self) -> EngineResult<()> {
        if self.is_running() {
            Ok(())
        } else {
            Err(EngineError::Platform {
                message: "engine is not started".into(),
            })
        }
    }
}

fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> EngineError + '_ {
    move |source| EngineError::Io {
        path: path.to_path_buf(),
        source,
    }
}

fn write_file(path: &Path, bytes: &[u8]) -> EngineResult<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(io_error(parent))?;
    }
    std::fs::write(path, bytes).map_err(io_error(path))
}

impl ReportEngine for DescriptorEngine {
    type Template = CompiledDescriptor;
    type Document = DocumentArtifact;

    fn startup(&self, home: &Path) -> EngineResult<()> {
        if !home.is_dir() {
            return Err(EngineError::Platform {
                message: format!("engine home {} is not a directory", home.display()),
            });
        }
        self.running.store(true, Ordering::SeqCst);
        tracing::info!(home = %home.display(), "descriptor engine started");
        Ok(())
    }

    fn shutdown(&self) {
        self.running.store(false, Ordering::SeqCst);
        tracing::info!("descriptor engine shut down");
    }

    fn compile(&self, path: &Path) -> EngineResult<CompiledDescriptor> {
        self.ensure_running()?;
        let content = std::fs::read_to_string(path).map_err(io_error(path))?;
        let compiled = CompiledDescriptor::parse(path.to_path_buf(), &content)?;
        tracing::debug!(path = %path.display(), "descriptor compiled");
        Ok(compiled)
    }

    fn title(&self, template: &CompiledDescriptor) -> Option<String> {
        template.descriptor.title.clone()
    }

    fn description(&self, template: &CompiledDescriptor) -> Option<String> {
        template.descriptor.description.clone()
    }

    fn parameter_definitions(
        &self,
        template: &CompiledDescriptor,
    ) -> EngineResult<Vec<ParameterDefinition>> {
        Ok(template.definitions())
    }

    fn selection_list(
        &self,
        template: &CompiledDescriptor,
        parameter: &str,
    ) -> EngineResult<Option<Vec<SelectionItem>>> {
        template.choices(parameter)
    }

    fn cascading_selection_list(
        &self,
        template: &CompiledDescriptor,
        group: &str,
        key: &[Option<String>],
    ) -> EngineResult<Option<Vec<SelectionItem>>> {
        template.cascading_choices(group, key).map(Some)
    }

    fn open_context(&self, operation: Operation, template: &str) -> EngineResult<ExecutionContext> {
        self.ensure_running()?;
        let _ = self.open_contexts.fetch_add(1, Ordering::SeqCst);
        Ok(ExecutionContext::new(operation, template))
    }

    fn close_context(&self, context: &ExecutionContext) {
        let _ = self.open_contexts.fetch_sub(1, Ordering::SeqCst);
        tracing::trace!(id = %context.id, "descriptor context closed");
    }

    fn execute(
        &self,
        template: &CompiledDescriptor,
        context: &ExecutionContext,
        parameters: &BoundParameters,
        document_path: &Path,
    ) -> EngineResult<()> {
        let document = template.run(parameters);
        let json = serde_json::to_vec_pretty(&document)?;
        write_file(document_path, &json)?;
        tracing::debug!(
            id = %context.id,
            document = %document_path.display(),
            lines = document.lines.len(),
            "document persisted"
        );
        Ok(())
    }

    fn open_document(&self, path: &Path) -> EngineResult<DocumentArtifact> {
        self.ensure_running()?;
        let content = std::fs::read(path).map_err(|e| EngineError::Document {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Ok(serde_json::from_slice(&content)?)
    }

    fn render_document(
        &self,
        document: &DocumentArtifact,
        context: &ExecutionContext,
        parameters: &BoundParameters,
        options: &RenderOptions,
    ) -> EngineResult<()> {
        let lines = document.resolve_lines(parameters);
        let bytes = match &options.format {
            FormatOptions::Html(html) => {
                std::fs::create_dir_all(&html.image_directory)
                    .map_err(io_error(&html.image_directory))?;
                output::html(&document.title, &lines, html)?.into_bytes()
            }
            FormatOptions::Pdf(pdf) => output::pdf(&document.title, &lines, *pdf),
        };
        write_file(&options.output_path, &bytes)?;
        tracing::debug!(
            id = %context.id,
            format = %options.output_format(),
            output = %options.output_path.display(),
            "document rendered"
        );
        Ok(())
    }
}

/// Writes a descriptor file; used by tooling that scaffolds template directories.
///
/// # Errors
///
/// Returns an error if the file cannot be written.
pub fn write_descriptor(dir: &Path, file_name: &str, json: &str) -> EngineResult<PathBuf> {
    let path = dir.join(file_name);
    write_file(&path, json.as_bytes())?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use rendition_common::types::{OutputFormat, ParameterValue};

    use super::*;
    use crate::options::{HtmlOptions, PdfOptions};

    const TEMPLATE: &str = r#"{
        "title": "Greeting",
        "parameters": [ { "name": "who", "default_value": "world" } ],
        "body": ["Hello ${who}", "Footer ${note}"]
    }"#;

    fn started(home: &Path) -> DescriptorEngine {
        let engine = DescriptorEngine::new();
        engine.startup(home).expect("startup");
        engine
    }

    #[test]
    fn startup_requires_existing_home() {
        let engine = DescriptorEngine::new();
        assert!(engine.startup(Path::new("/definitely/not/here")).is_err());
        assert!(!engine.is_running());
    }

    #[test]
    fn compile_before_startup_fails() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = write_descriptor(dir.path(), "g.rpt", TEMPLATE).expect("write");
        let engine = DescriptorEngine::new();
        assert!(matches!(
            engine.compile(&path),
            Err(EngineError::Platform { .. })
        ));
    }

    #[test]
    fn run_then_render_html_and_pdf() {
        let dir = tempfile::tempdir().expect("tempdir");
        let engine = started(dir.path());
        let path = write_descriptor(dir.path(), "g.rpt", TEMPLATE).expect("write");
        let compiled = engine.compile(&path).expect("compile");
        assert_eq!(engine.title(&compiled).as_deref(), Some("Greeting"));

        let mut params = BoundParameters::new();
        let _ = params.insert("who".into(), ParameterValue::String("Ada".into()));
        let doc_path = dir.path().join("out/g.rpt.rptdoc");
        let ctx = engine.open_context(Operation::Run, "g.rpt").expect("ctx");
        engine
            .execute(&compiled, &ctx, &params, &doc_path)
            .expect("execute");
        engine.close_context(&ctx);
        assert_eq!(engine.open_contexts(), 0);

        let document = engine.open_document(&doc_path).expect("open");
        assert_eq!(document.lines[0], "Hello Ada");

        let mut view_params = BoundParameters::new();
        let _ = view_params.insert("note".into(), ParameterValue::String("v1".into()));
        let html_path = dir.path().join("out/g.html");
        let ctx = engine.open_context(Operation::Render, "g.rpt").expect("ctx");
        let html = RenderOptions {
            output_path: html_path.clone(),
            format: FormatOptions::Html(HtmlOptions {
                image_directory: dir.path().join("out/image"),
                base_image_url: None,
                paginate: false,
                embeddable: false,
                right_to_left: false,
            }),
        };
        engine
            .render_document(&document, &ctx, &view_params, &html)
            .expect("html");
        let page = std::fs::read_to_string(&html_path).expect("read html");
        assert!(page.contains("Hello Ada"));
        assert!(page.contains("Footer v1"));
        assert!(dir.path().join("out/image").is_dir());

        let pdf_path = dir.path().join("out/g.pdf");
        let pdf = RenderOptions {
            output_path: pdf_path.clone(),
            format: FormatOptions::Pdf(PdfOptions {
                fit_to_page: true,
                pagebreak_pagination_only: true,
            }),
        };
        assert_eq!(pdf.output_format(), OutputFormat::Pdf);
        engine
            .render_document(&document, &ctx, &view_params, &pdf)
            .expect("pdf");
        engine.close_context(&ctx);
        let bytes = std::fs::read(&pdf_path).expect("read pdf");
        assert!(bytes.starts_with(b"%PDF-"));
    }

    #[test]
    fn opening_missing_document_is_a_document_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let engine = started(dir.path());
        assert!(matches!(
            engine.open_document(&dir.path().join("none.rptdoc")),
            Err(EngineError::Document { .. })
        ));
    }
}
