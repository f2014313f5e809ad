//! HTML and PDF writers for descriptor documents.
//!
//! Layout is plain: one paragraph (HTML) or one text line (PDF)
//! per body line, with form-feed lines acting as page breaks.

use askama::Template;
use rendition_common::error::{EngineError, EngineResult};

use crate::options::{HtmlOptions, PdfOptions};

use super::template::{IMAGE_PREFIX, PAGE_BREAK};

/// Lines per PDF page when automatic pagination is enabled.
pub const LINES_PER_PAGE: usize = 48;

const PAGE_WIDTH: f64 = 612.0;
const PAGE_HEIGHT: f64 = 792.0;
const MARGIN: f64 = 72.0;
const BASE_FONT_SIZE: f64 = 11.0;
const MIN_FONT_SIZE: f64 = 4.0;
/// Average Helvetica glyph width as a fraction of the font size.
const GLYPH_WIDTH: f64 = 0.5;

/// One rendered unit of an HTML report body.
enum Block {
    Text(String),
    Image(String),
    PageBreak,
}

/// Full HTML page.
#[derive(Template)]
#[template(path = "report.html")]
struct ReportPage<'a> {
    title: &'a str,
    dir: &'static str,
    blocks: Vec<Block>,
}

/// Body-only fragment for embedding in a host page.
#[derive(Template)]
#[template(path = "report_fragment.html")]
struct ReportFragment<'a> {
    title: &'a str,
    blocks: Vec<Block>,
}

fn blocks(lines: &[String], options: &HtmlOptions) -> Vec<Block> {
    let base = options.base_image_url.as_deref().unwrap_or_default();
    lines
        .iter()
        .filter_map(|line| {
            if line == PAGE_BREAK {
                return options.paginate.then_some(Block::PageBreak);
            }
            Some(line.strip_prefix(IMAGE_PREFIX).map_or_else(
                || Block::Text(line.clone()),
                |image| Block::Image(format!("{base}{}", image.trim())),
            ))
        })
        .collect()
}

/// Renders lines into an HTML page, or a `<div>` fragment when embeddable.
///
/// # Errors
///
/// Returns [`EngineError::Execution`] if the template fails to render.
pub fn html(title: &str, lines: &[String], options: &HtmlOptions) -> EngineResult<String> {
    let blocks = blocks(lines, options);
    let rendered = if options.embeddable {
        ReportFragment { title, blocks }.render()
    } else {
        let dir = if options.right_to_left { "rtl" } else { "ltr" };
        ReportPage { title, dir, blocks }.render()
    };
    rendered.map_err(|err| EngineError::Execution {
        message: format!("html template rendering failed: {err}"),
    })
}

/// Splits lines into pages according to `options`.
#[must_use]
pub fn paginate(lines: &[String], options: PdfOptions) -> Vec<Vec<String>> {
    let mut pages = vec![Vec::new()];
    for line in lines {
        if line == PAGE_BREAK {
            pages.push(Vec::new());
            continue;
        }
        let full = pages.last().is_some_and(|p| p.len() >= LINES_PER_PAGE);
        if full && !options.pagebreak_pagination_only {
            pages.push(Vec::new());
        }
        if let Some(page) = pages.last_mut() {
            page.push(line.clone());
        }
    }
    pages
}

/// Font size used for `pages`; shrunk to fit the widest line when requested.
#[allow(clippy::cast_precision_loss)]
#[must_use]
pub fn font_size(pages: &[Vec<String>], options: PdfOptions) -> f64 {
    if !options.fit_to_page {
        return BASE_FONT_SIZE;
    }
    let widest = pages
        .iter()
        .flatten()
        .map(|l| l.chars().count())
        .max()
        .unwrap_or(0);
    if widest == 0 {
        return BASE_FONT_SIZE;
    }
    let fitting = (PAGE_WIDTH - 2.0 * MARGIN) / (widest as f64 * GLYPH_WIDTH);
    fitting.clamp(MIN_FONT_SIZE, BASE_FONT_SIZE)
}

/// Renders lines into a PDF file using the built-in Helvetica font.
#[must_use]
pub fn pdf(title: &str, lines: &[String], options: PdfOptions) -> Vec<u8> {
    let pages = paginate(lines, options);
    let size = font_size(&pages, options);

    let first_page = 4;
    let kids: Vec<String> = (0..pages.len())
        .map(|i| format!("{} 0 R", first_page + i * 2))
        .collect();
    let info = first_page + pages.len() * 2;

    let mut objects = vec![
        "<< /Type /Catalog /Pages 2 0 R >>".to_string(),
        format!(
            "<< /Type /Pages /Kids [{}] /Count {} >>",
            kids.join(" "),
            pages.len()
        ),
        "<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica >>".to_string(),
    ];
    for (i, page) in pages.iter().enumerate() {
        let content = content_stream(page, size);
        objects.push(format!(
            "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 {PAGE_WIDTH} {PAGE_HEIGHT}] /Resources << /Font << /F1 3 0 R >> >> /Contents {} 0 R >>",
            first_page + i * 2 + 1
        ));
        objects.push(format!(
            "<< /Length {} >>\nstream\n{content}\nendstream",
            content.len()
        ));
    }
    objects.push(format!("<< /Title ({}) >>", escape_pdf(title)));

    let mut out = String::from("%PDF-1.4\n");
    let mut offsets = Vec::with_capacity(objects.len());
    for (i, object) in objects.iter().enumerate() {
        offsets.push(out.len());
        out.push_str(&format!("{} 0 obj\n{object}\nendobj\n", i + 1));
    }
    let xref = out.len();
    out.push_str(&format!("xref\n0 {}\n0000000000 65535 f \n", objects.len() + 1));
    for offset in offsets {
        out.push_str(&format!("{offset:010} 00000 n \n"));
    }
    out.push_str(&format!(
        "trailer\n<< /Size {} /Root 1 0 R /Info {info} 0 R >>\nstartxref\n{xref}\n%%EOF\n",
        objects.len() + 1
    ));
    out.into_bytes()
}

fn content_stream(lines: &[String], size: f64) -> String {
    let leading = size * 1.4;
    let mut stream = format!(
        "BT /F1 {size:.2} Tf {leading:.2} TL {MARGIN} {:.2} Td",
        PAGE_HEIGHT - MARGIN
    );
    for line in lines {
        stream.push_str(&format!(" ({}) Tj T*", escape_pdf(line)));
    }
    stream.push_str(" ET");
    stream
}

/// Escapes a PDF literal string; characters outside printable ASCII become `?`.
fn escape_pdf(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\\' | '(' | ')' => {
                out.push('\\');
                out.push(c);
            }
            ' '..='~' => out.push(c),
            _ => out.push('?'),
        }
    }
    out
}
