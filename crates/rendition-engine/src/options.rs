//! Format-specific render options handed to the engine.

use std::path::PathBuf;

use rendition_common::types::OutputFormat;

/// Options for rendering a document into a single HTML page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HtmlOptions {
    /// Directory receiving images referenced by the page.
    pub image_directory: PathBuf,
    /// URL prefix under which those images are served.
    pub base_image_url: Option<String>,
    /// Split the output into pages.
    pub paginate: bool,
    /// Omit the surrounding `html` and `body` tags.
    pub embeddable: bool,
    /// Right-to-left layout.
    pub right_to_left: bool,
}

/// Options for rendering a document into PDF.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PdfOptions {
    /// Scale content so it fits the page width.
    pub fit_to_page: bool,
    /// Break pages only at explicit page breaks.
    pub pagebreak_pagination_only: bool,
}

/// Per-format render settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormatOptions {
    /// HTML output.
    Html(HtmlOptions),
    /// PDF output.
    Pdf(PdfOptions),
}

/// Everything the engine needs to render one view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderOptions {
    /// Absolute path of the file to produce.
    pub output_path: PathBuf,
    /// Format-specific settings.
    pub format: FormatOptions,
}

impl RenderOptions {
    /// Returns the output format these options describe.
    #[must_use]
    pub const fn output_format(&self) -> OutputFormat {
        match self.format {
            FormatOptions::Html(_) => OutputFormat::Html,
            FormatOptions::Pdf(_) => OutputFormat::Pdf,
        }
    }
}
