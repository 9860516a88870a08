//! # Cell Draw Hooks
//!
//! A hook runs once per physical cell, after the cell's box is final and its
//! border and text are drawn. Hooks only add drawing; they get no handle on
//! geometry, so a hook can never move a cell.
//!
//! Form templates don't write raw closures keyed on row/column numbers.
//! They attach [`Overlay`] descriptors to named fields and let
//! [`OverlayHook`] find the cell, so the overlay and the field it decorates
//! cannot drift apart.

use super::{Canvas, Rect};
use crate::font::DINGBATS_FAMILY;
use crate::style::{CellStyle, FontStyle, Stroke, TextStyle};

/// Which band of the grid a row belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Section {
    Head,
    Body,
}

/// What a hook sees about the cell that was just drawn.
#[derive(Debug, Clone, Copy)]
pub struct CellHookData<'a> {
    pub section: Section,
    /// Row index within `section`.
    pub row: usize,
    pub column: usize,
    /// The cell's final box, spans merged.
    pub cell: Rect,
    pub content: &'a str,
    pub style: &'a CellStyle,
}

pub trait DrawHook {
    fn did_draw_cell(&self, data: &CellHookData<'_>, canvas: &mut Canvas<'_>);
}

impl<F> DrawHook for F
where
    F: Fn(&CellHookData<'_>, &mut Canvas<'_>),
{
    fn did_draw_cell(&self, data: &CellHookData<'_>, canvas: &mut Canvas<'_>) {
        self(data, canvas)
    }
}

/// ZapfDingbats code for the heavy check mark.
pub const CHECK_GLYPH: &str = "4";

/// Point size the check glyph is drawn at.
pub const CHECK_SIZE: f64 = 15.0;

/// A graphic drawn relative to a cell's top-left corner. Offsets in inches.
#[derive(Debug, Clone, PartialEq)]
pub enum Overlay {
    /// An empty square box.
    Checkbox {
        dx: f64,
        dy: f64,
        size: f64,
        line_width: f64,
    },
    /// The check glyph for the box at the same `dx`/`dy`/`size`.
    Check { dx: f64, dy: f64, size: f64 },
    /// A straight line between two cell-relative points.
    Rule {
        from: (f64, f64),
        to: (f64, f64),
        stroke: Stroke,
    },
    /// Text at a cell-relative baseline, in its own style.
    Text {
        dx: f64,
        dy: f64,
        text: String,
        style: TextStyle,
    },
}

impl Overlay {
    pub fn checkbox(dx: f64, dy: f64) -> Self {
        Overlay::Checkbox {
            dx,
            dy,
            size: 0.1,
            line_width: 0.012,
        }
    }

    pub fn check(dx: f64, dy: f64) -> Self {
        Overlay::Check { dx, dy, size: 0.1 }
    }

    pub fn draw(&self, cell: &Rect, canvas: &mut Canvas<'_>) {
        match self {
            Overlay::Checkbox {
                dx,
                dy,
                size,
                line_width,
            } => {
                let rect = Rect::new(cell.x + dx, cell.y + dy, *size, *size);
                canvas.rect(rect, Stroke::solid(*line_width));
            }
            Overlay::Check { dx, dy, size } => {
                // The glyph sits on a baseline just under the box and
                // overhangs it upward.
                let style = TextStyle::new(DINGBATS_FAMILY, FontStyle::Normal, CHECK_SIZE);
                canvas.text(cell.x + dx + 0.015, cell.y + dy + size + 0.02, CHECK_GLYPH, &style);
            }
            Overlay::Rule { from, to, stroke } => {
                canvas.line(
                    (cell.x + from.0, cell.y + from.1),
                    (cell.x + to.0, cell.y + to.1),
                    stroke.clone(),
                );
            }
            Overlay::Text {
                dx,
                dy,
                text,
                style,
            } => {
                canvas.text(cell.x + dx, cell.y + dy, text, style);
            }
        }
    }
}

/// An overlay pinned to one cell, drawn only while `condition` holds.
#[derive(Debug, Clone, PartialEq)]
pub struct AnchoredOverlay {
    pub section: Section,
    pub row: usize,
    pub column: usize,
    pub overlay: Overlay,
    pub condition: bool,
}

/// Draws a set of anchored overlays as each anchor cell goes by.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OverlayHook {
    anchors: Vec<AnchoredOverlay>,
}

impl OverlayHook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Always draw `overlay` on the body cell at (`row`, `column`).
    pub fn at(self, row: usize, column: usize, overlay: Overlay) -> Self {
        self.when(row, column, overlay, true)
    }

    /// Draw `overlay` on the body cell at (`row`, `column`) if `condition`.
    pub fn when(mut self, row: usize, column: usize, overlay: Overlay, condition: bool) -> Self {
        self.anchors.push(AnchoredOverlay {
            section: Section::Body,
            row,
            column,
            overlay,
            condition,
        });
        self
    }

    pub fn anchors(&self) -> &[AnchoredOverlay] {
        &self.anchors
    }

    pub fn is_empty(&self) -> bool {
        self.anchors.is_empty()
    }
}

impl DrawHook for OverlayHook {
    fn did_draw_cell(&self, data: &CellHookData<'_>, canvas: &mut Canvas<'_>) {
        for anchor in &self.anchors {
            if anchor.condition
                && anchor.section == data.section
                && anchor.row == data.row
                && anchor.column == data.column
            {
                anchor.overlay.draw(&data.cell, canvas);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::font::FontContext;
    use crate::layout::DrawCommand;
    use crate::style::DashPattern;

    fn hook_data<'a>(row: usize, column: usize, style: &'a CellStyle) -> CellHookData<'a> {
        CellHookData {
            section: Section::Body,
            row,
            column,
            cell: Rect::new(1.0, 2.0, 1.5, 0.2),
            content: "",
            style,
        }
    }

    #[test]
    fn checkbox_is_inset_from_cell_origin() {
        let ctx = FontContext::new();
        let mut canvas = Canvas::new(&ctx);
        let style = CellStyle::default();
        OverlayHook::new()
            .at(1, 0, Overlay::checkbox(1.1, 0.02))
            .did_draw_cell(&hook_data(1, 0, &style), &mut canvas);

        match &canvas.commands()[0] {
            DrawCommand::Rect { rect, stroke } => {
                assert!((rect.x - 2.1).abs() < 1e-9);
                assert!((rect.y - 2.02).abs() < 1e-9);
                assert!((rect.width - 0.1).abs() < 1e-9);
                assert!((stroke.width - 0.012).abs() < 1e-9);
            }
            other => panic!("expected a rect, got {:?}", other),
        }
    }

    #[test]
    fn check_glyph_sits_under_its_box() {
        let ctx = FontContext::new();
        let mut canvas = Canvas::new(&ctx);
        Overlay::check(1.1, 0.02).draw(&Rect::new(1.0, 2.0, 1.5, 0.2), &mut canvas);

        match &canvas.commands()[0] {
            DrawCommand::Text { lines, style } => {
                assert_eq!(style.font_family, DINGBATS_FAMILY);
                assert_eq!(lines[0].text, CHECK_GLYPH);
                assert!((lines[0].x - 2.115).abs() < 1e-9);
                assert!((lines[0].y - 2.14).abs() < 1e-9);
            }
            other => panic!("expected text, got {:?}", other),
        }
    }

    #[test]
    fn false_condition_draws_nothing() {
        let ctx = FontContext::new();
        let mut canvas = Canvas::new(&ctx);
        let style = CellStyle::default();
        OverlayHook::new()
            .when(1, 0, Overlay::check(1.1, 0.02), false)
            .did_draw_cell(&hook_data(1, 0, &style), &mut canvas);
        assert!(canvas.commands().is_empty());
    }

    #[test]
    fn other_cells_are_ignored() {
        let ctx = FontContext::new();
        let mut canvas = Canvas::new(&ctx);
        let style = CellStyle::default();
        let hook = OverlayHook::new().at(3, 1, Overlay::checkbox(0.0, 0.0));
        hook.did_draw_cell(&hook_data(1, 0, &style), &mut canvas);
        hook.did_draw_cell(&hook_data(3, 0, &style), &mut canvas);
        assert!(canvas.commands().is_empty());
    }

    #[test]
    fn dashed_rule_keeps_its_pattern() {
        let ctx = FontContext::new();
        let mut canvas = Canvas::new(&ctx);
        let rule = Overlay::Rule {
            from: (0.0, 0.0),
            to: (5.89, 0.0),
            stroke: Stroke::dashed(0.01, DashPattern::new(0.03, 0.03, 0.015)),
        };
        rule.draw(&Rect::new(2.0, 3.4, 1.8, 0.2), &mut canvas);

        match &canvas.commands()[0] {
            DrawCommand::Line { from, to, stroke } => {
                assert_eq!(*from, (2.0, 3.4));
                assert!((to.0 - 7.89).abs() < 1e-9);
                assert_eq!(stroke.dash, Some(DashPattern::new(0.03, 0.03, 0.015)));
            }
            other => panic!("expected a line, got {:?}", other),
        }
    }

    #[test]
    fn closures_are_hooks() {
        let ctx = FontContext::new();
        let mut canvas = Canvas::new(&ctx);
        let style = CellStyle::default();
        let hook = |data: &CellHookData<'_>, canvas: &mut Canvas<'_>| {
            canvas.rect(data.cell, Stroke::solid(0.02));
        };
        hook.did_draw_cell(&hook_data(0, 0, &style), &mut canvas);
        assert_eq!(canvas.commands().len(), 1);
    }
}
