//! # faiform
//!
//! Fixed-layout AS9102 First Article Inspection forms, rendered to PDF.
//!
//! Each form page is a stack of grids at absolute offsets. A static template
//! pass draws the labels and rules of the regulatory form; an optional data
//! pass lays the record's values out on the *same* computed geometry in a
//! borderless theme, so every value lands in the box its label names.
//!
//! ## Architecture
//!
//! ```text
//! Record (JSON/API)
//!       ↓
//!   [model]     -- Form1Record, Form2Record, RenderOptions
//!       ↓
//!   [template]  -- template grids + data grids per form page
//!       ↓
//!   [layout]    -- grid geometry, overlays, page composition
//!       ↓
//!   [pdf]       -- serialize to PDF bytes
//! ```
//!
//! Every render owns its own [`font::FontContext`] and draw list. Nothing is
//! shared between calls, so independent renders may run on separate threads.

pub mod error;
pub mod font;
pub mod layout;
pub mod model;
pub mod pdf;
pub mod style;
pub mod template;
pub mod text;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use error::FormError;
use font::FontContext;
use layout::{compose_document, compose_page, Document, LayoutPage};
use model::{FontEntry, Form1Record, Form2Record, RenderOptions, ReportRecord};
use pdf::{PdfOptions, PdfWriter};
use template::{bind_form1, bind_form2, FormPage};

const DATA_URI_PREFIX: &str = "data:application/pdf;filename=generated.pdf;base64,";

/// A finished document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedPdf {
    bytes: Vec<u8>,
    page_count: usize,
}

impl RenderedPdf {
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    pub fn page_count(&self) -> usize {
        self.page_count
    }

    /// The document as a base64 `data:` URI, ready to hand to a browser.
    pub fn to_data_uri(&self) -> String {
        format!("{}{}", DATA_URI_PREFIX, STANDARD.encode(&self.bytes))
    }
}

/// Renders forms with one font set and one set of options.
///
/// `blank = true`, or no record at all, renders the template only.
#[derive(Debug, Clone, Default)]
pub struct Renderer {
    fonts: FontContext,
    options: RenderOptions,
}

impl Renderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_fonts(mut self, fonts: FontContext) -> Self {
        self.fonts = fonts;
        self
    }

    pub fn with_options(mut self, options: RenderOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> &RenderOptions {
        &self.options
    }

    pub fn compose_form1(&self, blank: bool, record: Option<&Form1Record>) -> Result<Document, FormError> {
        let fonts = self.font_context()?;
        let page = self.form1_page(blank, record, &fonts)?;
        Ok(compose_document(vec![page]))
    }

    pub fn compose_form2(&self, blank: bool, record: Option<&Form2Record>) -> Result<Document, FormError> {
        let fonts = self.font_context()?;
        let page = self.form2_page(blank, record, &fonts)?;
        Ok(compose_document(vec![page]))
    }

    /// Form 1 then Form 2, both from the same `blank` toggle.
    pub fn compose_report(&self, blank: bool, record: Option<&ReportRecord>) -> Result<Document, FormError> {
        let fonts = self.font_context()?;
        self.report_document(blank, record, &fonts)
    }

    pub fn form1(&self, blank: bool, record: Option<&Form1Record>) -> Result<RenderedPdf, FormError> {
        let fonts = self.font_context()?;
        let document = compose_document(vec![self.form1_page(blank, record, &fonts)?]);
        self.write(&document, &fonts)
    }

    pub fn form2(&self, blank: bool, record: Option<&Form2Record>) -> Result<RenderedPdf, FormError> {
        let fonts = self.font_context()?;
        let document = compose_document(vec![self.form2_page(blank, record, &fonts)?]);
        self.write(&document, &fonts)
    }

    pub fn report(&self, blank: bool, record: Option<&ReportRecord>) -> Result<RenderedPdf, FormError> {
        let fonts = self.font_context()?;
        let document = self.report_document(blank, record, &fonts)?;
        self.write(&document, &fonts)
    }

    fn report_document(
        &self,
        blank: bool,
        record: Option<&ReportRecord>,
        fonts: &FontContext,
    ) -> Result<Document, FormError> {
        let form1 = self.form1_page(blank, record.map(|r| &r.form1), fonts)?;
        let form2 = self.form2_page(blank, record.map(|r| &r.form2), fonts)?;
        Ok(compose_document(vec![form1, form2]))
    }

    fn form1_page(
        &self,
        blank: bool,
        record: Option<&Form1Record>,
        fonts: &FontContext,
    ) -> Result<LayoutPage, FormError> {
        let record = if blank { None } else { record };
        compose(bind_form1(record, &self.options)?, fonts)
    }

    fn form2_page(
        &self,
        blank: bool,
        record: Option<&Form2Record>,
        fonts: &FontContext,
    ) -> Result<LayoutPage, FormError> {
        let record = if blank { None } else { record };
        compose(bind_form2(record, &self.options)?, fonts)
    }

    /// The render's own font context: the configured faces plus any
    /// `options.fonts` entries.
    fn font_context(&self) -> Result<FontContext, FormError> {
        let mut fonts = self.fonts.clone();
        for entry in &self.options.fonts {
            fonts.register_ttf(&entry.family, decode_font_src(entry)?)?;
        }
        Ok(fonts)
    }

    fn write(&self, document: &Document, fonts: &FontContext) -> Result<RenderedPdf, FormError> {
        let writer = PdfWriter::new(PdfOptions {
            compress: self.options.compress,
            metadata: self.options.metadata.clone(),
        });
        let bytes = writer.write(&document.pages, fonts)?;
        log::info!(
            "rendered {} page(s), {} bytes",
            document.page_count(),
            bytes.len()
        );
        Ok(RenderedPdf {
            bytes,
            page_count: document.page_count(),
        })
    }
}

fn compose(page: FormPage, fonts: &FontContext) -> Result<LayoutPage, FormError> {
    compose_page(1, &page.free_text, &page.templates, &page.data, fonts)
}

/// Font sources are raw base64 or a `data:` URI.
fn decode_font_src(entry: &FontEntry) -> Result<Vec<u8>, FormError> {
    let encoded = match entry.src.split_once(";base64,") {
        Some((_, data)) if entry.src.starts_with("data:") => data,
        _ => entry.src.as_str(),
    };
    STANDARD.decode(encoded.trim()).map_err(|e| {
        FormError::Font(format!("Failed to decode font '{}': {}", entry.family, e))
    })
}

/// Render Form 1 with the default fonts and options.
pub fn render_form1(blank: bool, record: Option<&Form1Record>) -> Result<RenderedPdf, FormError> {
    Renderer::new().form1(blank, record)
}

/// Render Form 2 with the default fonts and options.
pub fn render_form2(blank: bool, record: Option<&Form2Record>) -> Result<RenderedPdf, FormError> {
    Renderer::new().form2(blank, record)
}

/// Render the two-page report with the default fonts and options.
pub fn render_report(blank: bool, record: Option<&ReportRecord>) -> Result<RenderedPdf, FormError> {
    Renderer::new().report(blank, record)
}

/// Render the two-page report from a JSON record (`{"form1": .., "form2": ..}`).
pub fn render_report_json(blank: bool, json: &str) -> Result<RenderedPdf, FormError> {
    let record = ReportRecord::from_json(json)?;
    render_report(blank, Some(&record))
}
