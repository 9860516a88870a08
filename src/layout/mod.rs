//! # Page Composer
//!
//! Grids are placed at absolute offsets on a fixed letter page. Nothing
//! flows: each grid names its own `start_y` in page coordinates, never
//! relative to the grid above it. That is what lets a data grid land on
//! exactly the region its template occupies.
//!
//! ## Composition
//!
//! 1. Free-floating text (titles, subtitles) goes down first.
//! 2. Each template grid is laid out and drawn: borders, text, hooks.
//! 3. Every data grid bound to that template is laid out *on the template's
//!    geometry* and drawn right after it.
//! 4. A grid whose box leaves the page fails the whole page.
//!
//! All coordinates are inches from the top-left corner of the page.

pub mod grid;
pub mod hooks;

use crate::error::FormError;
use crate::font::FontContext;
use crate::style::{HAlign, Stroke, TextStyle};
use crate::text::TextLayout;

use grid::{draw_grid, layout_grid, layout_grid_pinned, Grid};

/// Page width, US letter portrait.
pub const PAGE_WIDTH: f64 = 8.5;
/// Page height, US letter portrait.
pub const PAGE_HEIGHT: f64 = 11.0;
/// Left edge of every grid unless it says otherwise.
pub const PAGE_MARGIN: f64 = 40.0 / 72.0;

const EDGE_TOLERANCE: f64 = 1e-6;

/// An axis-aligned box in page inches.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    /// Smallest box covering both.
    pub fn union(&self, other: &Rect) -> Rect {
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        Rect::new(
            x,
            y,
            self.right().max(other.right()) - x,
            self.bottom().max(other.bottom()) - y,
        )
    }
}

/// One line of positioned text. `y` is the baseline.
#[derive(Debug, Clone, PartialEq)]
pub struct TextLine {
    pub x: f64,
    pub y: f64,
    pub text: String,
    pub width: f64,
}

/// What to actually draw.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    /// Stroke a rectangle outline.
    Rect { rect: Rect, stroke: Stroke },
    /// Stroke a straight line.
    Line {
        from: (f64, f64),
        to: (f64, f64),
        stroke: Stroke,
    },
    /// Draw text. Every command carries its own style.
    Text {
        lines: Vec<TextLine>,
        style: TextStyle,
    },
}

/// The per-page drawing surface handed to grids and hooks.
///
/// It only accumulates commands. Style is an argument of each call, so two
/// canvases never share a "current font".
pub struct Canvas<'a> {
    font_context: &'a FontContext,
    commands: Vec<DrawCommand>,
}

impl<'a> Canvas<'a> {
    pub fn new(font_context: &'a FontContext) -> Self {
        Self {
            font_context,
            commands: Vec::new(),
        }
    }

    pub fn font_context(&self) -> &'a FontContext {
        self.font_context
    }

    pub fn rect(&mut self, rect: Rect, stroke: Stroke) {
        self.commands.push(DrawCommand::Rect { rect, stroke });
    }

    pub fn line(&mut self, from: (f64, f64), to: (f64, f64), stroke: Stroke) {
        self.commands.push(DrawCommand::Line { from, to, stroke });
    }

    /// Draw a single line of text with its baseline at `y`.
    pub fn text(&mut self, x: f64, y: f64, text: &str, style: &TextStyle) {
        self.commands.push(DrawCommand::Text {
            lines: vec![TextLine {
                x,
                y,
                text: text.to_string(),
                width: 0.0,
            }],
            style: style.clone(),
        });
    }

    pub fn text_lines(&mut self, lines: Vec<TextLine>, style: &TextStyle) {
        if lines.is_empty() {
            return;
        }
        self.commands.push(DrawCommand::Text {
            lines,
            style: style.clone(),
        });
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    pub fn into_commands(self) -> Vec<DrawCommand> {
        self.commands
    }
}

/// Text placed directly on the page, outside any grid.
#[derive(Debug, Clone, PartialEq)]
pub struct FreeText {
    pub x: f64,
    /// Baseline.
    pub y: f64,
    pub text: String,
    pub style: TextStyle,
    /// `Center` centers the text on `x`, `Right` ends it there.
    pub align: HAlign,
}

impl FreeText {
    pub fn new(x: f64, y: f64, text: &str, style: TextStyle) -> Self {
        Self {
            x,
            y,
            text: text.to_string(),
            style,
            align: HAlign::Left,
        }
    }

    pub fn centered(mut self) -> Self {
        self.align = HAlign::Center;
        self
    }
}

/// A data-pass grid and the template grid whose geometry it reuses.
pub struct DataGrid {
    /// Index into the page's template grids.
    pub over: usize,
    pub grid: Grid,
}

/// A fully composed page.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutPage {
    /// One-based position in the document.
    pub index: usize,
    pub width: f64,
    pub height: f64,
    pub elements: Vec<DrawCommand>,
}

impl LayoutPage {
    /// Text of every text command, lines joined with spaces, in draw order.
    pub fn texts(&self) -> Vec<String> {
        self.elements
            .iter()
            .filter_map(|el| match el {
                DrawCommand::Text { lines, .. } => Some(
                    lines
                        .iter()
                        .map(|l| l.text.as_str())
                        .collect::<Vec<_>>()
                        .join(" "),
                ),
                _ => None,
            })
            .collect()
    }
}

/// An ordered sequence of composed pages.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Document {
    pub pages: Vec<LayoutPage>,
}

impl Document {
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }
}

/// Compose one page from free text, template grids, and data grids.
pub fn compose_page(
    index: usize,
    free_text: &[FreeText],
    templates: &[Grid],
    data: &[DataGrid],
    font_context: &FontContext,
) -> Result<LayoutPage, FormError> {
    let mut canvas = Canvas::new(font_context);
    let text_layout = TextLayout::new();

    for item in free_text {
        let x = match item.align {
            HAlign::Left => item.x,
            HAlign::Center | HAlign::Right => {
                let width = text_layout.measure_width(
                    font_context,
                    &item.text,
                    &item.style.font_family,
                    item.style.font_style,
                    item.style.font_size,
                )?;
                if item.align == HAlign::Center {
                    item.x - width / 2.0
                } else {
                    item.x - width
                }
            }
        };
        canvas.text(x, item.y, &item.text, &item.style);
    }

    if let Some(orphan) = data.iter().find(|d| d.over >= templates.len()) {
        return Err(FormError::Render(format!(
            "data grid bound to template {} but the page has {}",
            orphan.over,
            templates.len()
        )));
    }

    for (i, template) in templates.iter().enumerate() {
        let layout = layout_grid(template, font_context)?;
        check_fits(&layout.geometry)?;
        draw_grid(template, &layout, &mut canvas);

        for data_grid in data.iter().filter(|d| d.over == i) {
            let pinned = layout_grid_pinned(&data_grid.grid, &layout.geometry, font_context)?;
            draw_grid(&data_grid.grid, &pinned, &mut canvas);
        }
    }

    let elements = canvas.into_commands();
    log::debug!(
        "composed page {}: {} grids, {} overlays, {} draw commands",
        index,
        templates.len(),
        data.len(),
        elements.len()
    );

    Ok(LayoutPage {
        index,
        width: PAGE_WIDTH,
        height: PAGE_HEIGHT,
        elements,
    })
}

/// Sequence pages into a document, numbering them from one in order.
pub fn compose_document(pages: Vec<LayoutPage>) -> Document {
    let pages = pages
        .into_iter()
        .enumerate()
        .map(|(i, mut page)| {
            page.index = i + 1;
            page
        })
        .collect();
    Document { pages }
}

fn check_fits(geometry: &grid::GridGeometry) -> Result<(), FormError> {
    if geometry.bottom() > PAGE_HEIGHT + EDGE_TOLERANCE {
        return Err(FormError::LayoutOverflow {
            start_y: geometry.y,
            edge: geometry.bottom(),
            limit: PAGE_HEIGHT,
        });
    }
    if geometry.right() > PAGE_WIDTH + EDGE_TOLERANCE {
        return Err(FormError::LayoutOverflow {
            start_y: geometry.y,
            edge: geometry.right(),
            limit: PAGE_WIDTH,
        });
    }
    Ok(())
}
