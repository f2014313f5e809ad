//! Render and view requests and the engine plumbing around them.

use std::collections::BTreeMap;

use rendition_common::config::ServiceConfig;
use rendition_common::constants::APP_NAME;
use rendition_common::error::EngineResult;
use rendition_common::types::{BoundParameters, OutputFormat, ParameterValue};
use rendition_engine::context::{ExecutionContext, Operation};
use rendition_engine::engine::ReportEngine;
use rendition_engine::options::{FormatOptions, HtmlOptions, PdfOptions, RenderOptions};

/// Request to run a template into a persisted document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderRequest {
    /// Template file name.
    pub template: String,
    /// Raw parameter values, coerced against the template's schemas.
    pub parameters: BTreeMap<String, String>,
}

impl RenderRequest {
    /// Creates a request with no parameters.
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
            parameters: BTreeMap::new(),
        }
    }

    /// Adds a raw parameter value.
    #[must_use]
    pub fn with_parameter(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let _ = self.parameters.insert(name.into(), value.into());
        self
    }
}

/// Request to render a persisted document into HTML or PDF.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewRequest {
    /// Template file name the document was rendered from.
    pub template: String,
    /// Target format.
    pub format: OutputFormat,
    /// Typed parameter values handed to the engine as-is.
    pub parameters: BoundParameters,
    /// Overrides the configured image base URL for HTML views.
    pub image_base_url: Option<String>,
}

impl ViewRequest {
    /// Creates a request with no parameters.
    pub fn new(template: impl Into<String>, format: OutputFormat) -> Self {
        Self {
            template: template.into(),
            format,
            parameters: BoundParameters::new(),
            image_base_url: None,
        }
    }

    /// Adds a typed parameter value.
    #[must_use]
    pub fn with_parameter(mut self, name: impl Into<String>, value: ParameterValue) -> Self {
        let _ = self.parameters.insert(name.into(), value);
        self
    }

    /// Sets the image base URL override.
    #[must_use]
    pub fn with_image_base_url(mut self, url: impl Into<String>) -> Self {
        self.image_base_url = Some(url.into());
        self
    }
}

/// Part of a template file name before its first `.`.
pub fn base_name(file_name: &str) -> &str {
    file_name.split_once('.').map_or(file_name, |(base, _)| base)
}

/// Name of the artifact a view of `template` in `format` produces.
pub fn view_file_name(template: &str, format: OutputFormat) -> String {
    format!("{}.{}", base_name(template), format.extension())
}

/// Builds the engine options for a view of `template`.
///
/// HTML views are a single left-to-right page with images under the output
/// directory. PDF views fit content to the page and break only where the
/// document says so.
pub fn render_options(
    config: &ServiceConfig,
    template: &str,
    format: OutputFormat,
    image_base_url: Option<&str>,
) -> RenderOptions {
    let output_path = config.output_dir.join(view_file_name(template, format));
    let format = match format {
        OutputFormat::Html => FormatOptions::Html(HtmlOptions {
            image_directory: config.image_directory(),
            base_image_url: image_base_url
                .map(with_trailing_slash)
                .or_else(|| config.image_base_url.clone()),
            paginate: false,
            embeddable: false,
            right_to_left: false,
        }),
        OutputFormat::Pdf => FormatOptions::Pdf(PdfOptions {
            fit_to_page: true,
            pagebreak_pagination_only: true,
        }),
    };
    RenderOptions {
        output_path,
        format,
    }
}

fn with_trailing_slash(url: &str) -> String {
    if url.ends_with('/') {
        url.to_string()
    } else {
        format!("{url}/")
    }
}

/// Execution context that is closed when dropped.
pub(crate) struct ContextGuard<'a, E: ReportEngine> {
    engine: &'a E,
    context: ExecutionContext,
}

impl<'a, E: ReportEngine> ContextGuard<'a, E> {
    pub(crate) fn open(engine: &'a E, operation: Operation, template: &str) -> EngineResult<Self> {
        let context = engine
            .open_context(operation, template)?
            .with_attribute("application", APP_NAME);
        tracing::trace!(id = %context.id, %operation, template, "execution context opened");
        Ok(Self { engine, context })
    }

    pub(crate) const fn context(&self) -> &ExecutionContext {
        &self.context
    }
}

impl<E: ReportEngine> Drop for ContextGuard<'_, E> {
    fn drop(&mut self) {
        self.engine.close_context(&self.context);
    }
}
