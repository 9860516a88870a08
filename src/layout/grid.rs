//! # Grid Layout
//!
//! Lays a matrix of cells out at an absolute position on the page. Supports:
//! - Explicit, proportional and content-sized column widths
//! - Row heights from wrapped content with a per-style minimum
//! - Column and row spans (row-major placement around covered slots)
//! - Ruled and borderless themes, plus an optional outline around the grid
//! - Pinned layout: a second grid drawn on a template's exact geometry
//!
//! Geometry depends only on the cell matrix, the styles and the font
//! context, so laying out the same grid twice always yields the same boxes.

use super::hooks::{CellHookData, DrawHook, Section};
use super::{Canvas, Rect, TextLine, PAGE_MARGIN, PAGE_WIDTH};
use crate::error::FormError;
use crate::font::FontContext;
use crate::style::{CellStyle, HAlign, Stroke, StyleOverride, Theme};
use crate::text::{BrokenLine, TextLayout};

const WIDTH_TOLERANCE: f64 = 1e-6;

/// One logical cell: content, span and an optional style override.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Cell {
    pub content: String,
    pub col_span: usize,
    pub row_span: usize,
    pub style: Option<StyleOverride>,
}

impl Cell {
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            col_span: 1,
            row_span: 1,
            style: None,
        }
    }

    pub fn empty() -> Self {
        Self::text("")
    }

    pub fn col_span(mut self, span: usize) -> Self {
        self.col_span = span.max(1);
        self
    }

    pub fn row_span(mut self, span: usize) -> Self {
        self.row_span = span.max(1);
        self
    }

    pub fn styled(mut self, style: StyleOverride) -> Self {
        self.style = Some(style);
        self
    }
}

impl From<&str> for Cell {
    fn from(content: &str) -> Self {
        Cell::text(content)
    }
}

impl From<String> for Cell {
    fn from(content: String) -> Self {
        Cell::text(content)
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Slot {
    Vacant,
    Cell(Cell),
    /// Covered by the spanning cell anchored at (`row`, `col`).
    Covered { row: usize, col: usize },
}

/// A styled matrix of cells anchored at `start_y` on its page.
pub struct Grid {
    pub start_y: f64,
    pub x: f64,
    pub theme: Theme,
    /// Total width. `None` sizes the grid from its columns.
    pub width: Option<f64>,
    pub column_widths: Vec<Option<f64>>,
    pub style: CellStyle,
    /// Stroke around the whole grid, drawn after every cell.
    pub outline: Option<Stroke>,
    /// Leading rows reported to hooks as `Section::Head`.
    pub head_rows: usize,
    slots: Vec<Vec<Slot>>,
    hooks: Vec<Box<dyn DrawHook + Send + Sync>>,
}

impl Grid {
    /// An empty grid of the given shape, filled in with [`Grid::put`].
    pub fn with_shape(rows: usize, cols: usize) -> Self {
        Self {
            start_y: 0.0,
            x: PAGE_MARGIN,
            theme: Theme::Ruled,
            width: None,
            column_widths: Vec::new(),
            style: CellStyle::default(),
            outline: None,
            head_rows: 0,
            slots: vec![vec![Slot::Vacant; cols]; rows],
            hooks: Vec::new(),
        }
    }

    /// Place rows of cells row-major, each cell taking the next slot in its
    /// row that no earlier span covers.
    pub fn from_rows(rows: Vec<Vec<Cell>>) -> Result<Self, FormError> {
        let cols = rows
            .iter()
            .map(|row| row.iter().map(|c| c.col_span.max(1)).sum::<usize>())
            .max()
            .unwrap_or(0);
        let mut grid = Grid::with_shape(rows.len(), cols);

        for (r, row) in rows.into_iter().enumerate() {
            let mut c = 0;
            for cell in row {
                while c < cols && grid.slots[r][c] != Slot::Vacant {
                    c += 1;
                }
                if c >= cols {
                    return Err(FormError::CellOverlap { row: r, col: c });
                }
                let span = cell.col_span.max(1);
                grid.put(r, c, cell)?;
                c += span;
            }
        }
        Ok(grid)
    }

    /// Put a cell at an explicit position. Fails if any slot it would span
    /// is already taken or lies outside the grid.
    pub fn put(&mut self, row: usize, col: usize, cell: Cell) -> Result<(), FormError> {
        let row_span = cell.row_span.max(1);
        let col_span = cell.col_span.max(1);
        if row + row_span > self.rows() || col + col_span > self.cols() {
            return Err(FormError::CellOverlap { row, col });
        }
        for r in row..row + row_span {
            for c in col..col + col_span {
                if self.slots[r][c] != Slot::Vacant {
                    return Err(FormError::CellOverlap { row: r, col: c });
                }
            }
        }
        for r in row..row + row_span {
            for c in col..col + col_span {
                self.slots[r][c] = Slot::Covered { row, col };
            }
        }
        self.slots[row][col] = Slot::Cell(Cell {
            row_span,
            col_span,
            ..cell
        });
        Ok(())
    }

    pub fn at(mut self, start_y: f64) -> Self {
        self.start_y = start_y;
        self
    }

    pub fn theme(mut self, theme: Theme) -> Self {
        self.theme = theme;
        self
    }

    pub fn width(mut self, width: f64) -> Self {
        self.width = Some(width);
        self
    }

    /// Give every column an explicit width. Extra widths add vacant columns.
    pub fn columns(self, widths: &[f64]) -> Self {
        self.column_widths(widths.iter().copied().map(Some).collect())
    }

    /// Per-column widths, `None` for columns sized from their content.
    /// Extra widths add vacant columns.
    pub fn column_widths(mut self, widths: Vec<Option<f64>>) -> Self {
        let cols = widths.len();
        for row in &mut self.slots {
            if row.len() < cols {
                row.resize(cols, Slot::Vacant);
            }
        }
        self.column_widths = widths;
        self
    }

    pub fn with_style(mut self, style: CellStyle) -> Self {
        self.style = style;
        self
    }

    pub fn outline(mut self, stroke: Stroke) -> Self {
        self.outline = Some(stroke);
        self
    }

    pub fn head_rows(mut self, rows: usize) -> Self {
        self.head_rows = rows;
        self
    }

    pub fn hook(mut self, hook: impl DrawHook + Send + Sync + 'static) -> Self {
        self.hooks.push(Box::new(hook));
        self
    }

    pub fn rows(&self) -> usize {
        self.slots.len()
    }

    pub fn cols(&self) -> usize {
        self.slots.first().map_or(0, Vec::len)
    }

    /// The cell anchored at (`row`, `col`), if one was placed there.
    pub fn cell(&self, row: usize, col: usize) -> Option<&Cell> {
        match self.slots.get(row)?.get(col)? {
            Slot::Cell(cell) => Some(cell),
            _ => None,
        }
    }

    /// Every physical cell in draw order with its anchor position. Vacant
    /// slots come back as empty 1x1 cells.
    fn physical_cells(&self) -> Vec<(usize, usize, Cell)> {
        let mut out = Vec::new();
        for (r, row) in self.slots.iter().enumerate() {
            for (c, slot) in row.iter().enumerate() {
                match slot {
                    Slot::Cell(cell) => out.push((r, c, cell.clone())),
                    Slot::Vacant => out.push((r, c, Cell::empty())),
                    Slot::Covered { .. } => {}
                }
            }
        }
        out
    }

    fn resolved_style(&self, cell: &Cell) -> CellStyle {
        match &cell.style {
            Some(over) => self.style.merged(over),
            None => self.style.clone(),
        }
    }
}

/// Resolved track sizes of a grid, in page inches.
#[derive(Debug, Clone, PartialEq)]
pub struct GridGeometry {
    pub x: f64,
    pub y: f64,
    pub column_widths: Vec<f64>,
    pub row_heights: Vec<f64>,
}

impl GridGeometry {
    pub fn width(&self) -> f64 {
        self.column_widths.iter().sum()
    }

    pub fn height(&self) -> f64 {
        self.row_heights.iter().sum()
    }

    pub fn right(&self) -> f64 {
        self.x + self.width()
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height()
    }

    pub fn bounds(&self) -> Rect {
        Rect::new(self.x, self.y, self.width(), self.height())
    }

    /// Box covering `row_span` x `col_span` unit cells from (`row`, `col`).
    pub fn span_rect(&self, row: usize, col: usize, row_span: usize, col_span: usize) -> Rect {
        let x = self.x + self.column_widths[..col].iter().sum::<f64>();
        let y = self.y + self.row_heights[..row].iter().sum::<f64>();
        let width = self.column_widths[col..col + col_span].iter().sum();
        let height = self.row_heights[row..row + row_span].iter().sum();
        Rect::new(x, y, width, height)
    }
}

/// A physical cell with its final box and wrapped text.
#[derive(Debug, Clone, PartialEq)]
pub struct CellBox {
    pub row: usize,
    pub col: usize,
    pub row_span: usize,
    pub col_span: usize,
    pub rect: Rect,
    pub content: String,
    pub style: CellStyle,
    pub lines: Vec<BrokenLine>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GridLayout {
    pub geometry: GridGeometry,
    pub cells: Vec<CellBox>,
}

impl GridLayout {
    /// The box of the physical cell anchored at (`row`, `col`).
    pub fn cell_box(&self, row: usize, col: usize) -> Option<&CellBox> {
        self.cells.iter().find(|b| b.row == row && b.col == col)
    }
}

/// Compute column widths, row heights and every cell's box.
pub fn layout_grid(grid: &Grid, font_context: &FontContext) -> Result<GridLayout, FormError> {
    let text_layout = TextLayout::new();
    let cells = grid.physical_cells();
    let column_widths = resolve_columns(grid, &cells, font_context, &text_layout)?;
    let row_heights = resolve_rows(grid, &cells, &column_widths, font_context, &text_layout)?;

    let geometry = GridGeometry {
        x: grid.x,
        y: grid.start_y,
        column_widths,
        row_heights,
    };
    log::debug!(
        "grid at y={:.3}: {}x{} cells, {:.3}in x {:.3}in",
        geometry.y,
        grid.rows(),
        grid.cols(),
        geometry.width(),
        geometry.height()
    );
    place_cells(grid, cells, geometry, font_context, &text_layout)
}

/// Lay `grid` out on a template's already computed geometry.
///
/// The grid must have the template's row and column counts and start at the
/// same `y`; its own content never changes a track size.
pub fn layout_grid_pinned(
    grid: &Grid,
    template: &GridGeometry,
    font_context: &FontContext,
) -> Result<GridLayout, FormError> {
    let expected = (template.row_heights.len(), template.column_widths.len());
    let found = (grid.rows(), grid.cols());
    if expected != found {
        return Err(FormError::ShapeMismatch { expected, found });
    }
    if (grid.start_y - template.y).abs() > WIDTH_TOLERANCE {
        return Err(FormError::AnchorMismatch {
            expected: template.y,
            found: grid.start_y,
        });
    }
    let text_layout = TextLayout::new();
    place_cells(
        grid,
        grid.physical_cells(),
        template.clone(),
        font_context,
        &text_layout,
    )
}

fn resolve_columns(
    grid: &Grid,
    cells: &[(usize, usize, Cell)],
    font_context: &FontContext,
    text_layout: &TextLayout,
) -> Result<Vec<f64>, FormError> {
    let cols = grid.cols();
    let explicit: Vec<Option<f64>> = (0..cols)
        .map(|c| grid.column_widths.get(c).copied().flatten())
        .collect();
    let explicit_sum: f64 = explicit.iter().flatten().sum();

    if explicit.iter().all(Option::is_some) {
        if let Some(total) = grid.width {
            if explicit_sum > total + WIDTH_TOLERANCE {
                return Err(FormError::ColumnOverflow {
                    explicit: explicit_sum,
                    total,
                });
            }
        }
        return Ok(explicit.into_iter().flatten().collect());
    }

    let available = PAGE_WIDTH - grid.x - PAGE_MARGIN;
    let total = grid.width.unwrap_or(available);
    if explicit_sum > total + WIDTH_TOLERANCE {
        return Err(FormError::ColumnOverflow {
            explicit: explicit_sum,
            total,
        });
    }
    let remaining = (total - explicit_sum).max(0.0);

    // Natural width of each unsized column from its single-column cells.
    let mut natural = vec![0.0_f64; cols];
    for (_, c, cell) in cells {
        if cell.col_span != 1 || explicit[*c].is_some() {
            continue;
        }
        let style = grid.resolved_style(cell);
        let w = text_layout.measure_natural_width(
            font_context,
            &cell.content,
            &style.font_family,
            style.font_style,
            style.font_size,
        )? + style.padding.horizontal();
        natural[*c] = natural[*c].max(w);
    }

    let open: Vec<usize> = (0..cols).filter(|c| explicit[*c].is_none()).collect();
    let natural_sum: f64 = open.iter().map(|c| natural[*c]).sum();
    let fill = grid.width.is_some() || natural_sum > remaining;

    Ok((0..cols)
        .map(|c| match explicit[c] {
            Some(w) => w,
            None if !fill => natural[c],
            None if natural_sum > 0.0 => remaining * natural[c] / natural_sum,
            None => remaining / open.len() as f64,
        })
        .collect())
}

fn resolve_rows(
    grid: &Grid,
    cells: &[(usize, usize, Cell)],
    column_widths: &[f64],
    font_context: &FontContext,
    text_layout: &TextLayout,
) -> Result<Vec<f64>, FormError> {
    let rows = grid.rows();
    let mut heights = vec![0.0_f64; rows];
    let mut anchored = vec![false; rows];
    let mut spanning = Vec::new();

    for (r, c, cell) in cells {
        let style = grid.resolved_style(cell);
        let width: f64 = column_widths[*c..*c + cell.col_span].iter().sum();
        let lines = text_layout.break_into_lines(
            font_context,
            &cell.content,
            width - style.padding.horizontal(),
            &style.font_family,
            style.font_style,
            style.font_size,
        )?;
        let required = required_height(&style, lines.len());
        if cell.row_span == 1 {
            heights[*r] = heights[*r].max(required);
            anchored[*r] = true;
        } else {
            spanning.push((*r, cell.row_span, required));
        }
    }

    // A row made entirely of span continuations gets one empty line.
    let empty = required_height(&grid.style, 1);
    for (h, _) in heights.iter_mut().zip(&anchored).filter(|(_, a)| !**a) {
        *h = empty;
    }

    for (r, span, required) in spanning {
        let have: f64 = heights[r..r + span].iter().sum();
        if required > have {
            heights[r + span - 1] += required - have;
        }
    }

    Ok(heights)
}

fn required_height(style: &CellStyle, line_count: usize) -> f64 {
    let content = line_count.max(1) as f64 * style.line_height() + style.padding.vertical();
    content.max(style.min_cell_height)
}

fn place_cells(
    grid: &Grid,
    cells: Vec<(usize, usize, Cell)>,
    geometry: GridGeometry,
    font_context: &FontContext,
    text_layout: &TextLayout,
) -> Result<GridLayout, FormError> {
    let mut boxes = Vec::with_capacity(cells.len());
    for (row, col, cell) in cells {
        let style = grid.resolved_style(&cell);
        let rect = geometry.span_rect(row, col, cell.row_span, cell.col_span);
        let lines = text_layout.break_into_lines(
            font_context,
            &cell.content,
            rect.width - style.padding.horizontal(),
            &style.font_family,
            style.font_style,
            style.font_size,
        )?;
        boxes.push(CellBox {
            row,
            col,
            row_span: cell.row_span,
            col_span: cell.col_span,
            rect,
            content: cell.content,
            style,
            lines,
        });
    }
    Ok(GridLayout {
        geometry,
        cells: boxes,
    })
}

/// Draw a laid-out grid: per cell its border, its text and then every hook,
/// followed by the grid outline.
pub fn draw_grid(grid: &Grid, layout: &GridLayout, canvas: &mut Canvas<'_>) {
    for cell in &layout.cells {
        if grid.theme == Theme::Ruled {
            canvas.rect(cell.rect, cell.style.border());
        }

        let lines = position_lines(cell);
        canvas.text_lines(lines, &cell.style.text_style());

        let (section, row) = if cell.row < grid.head_rows {
            (Section::Head, cell.row)
        } else {
            (Section::Body, cell.row - grid.head_rows)
        };
        let data = CellHookData {
            section,
            row,
            column: cell.col,
            cell: cell.rect,
            content: &cell.content,
            style: &cell.style,
        };
        for hook in &grid.hooks {
            hook.did_draw_cell(&data, canvas);
        }
    }

    if let Some(stroke) = &grid.outline {
        canvas.rect(layout.geometry.bounds(), stroke.clone());
    }
}

fn position_lines(cell: &CellBox) -> Vec<TextLine> {
    let style = &cell.style;
    let inner = cell.rect.width - style.padding.horizontal();
    let top = cell.rect.y + style.padding.top + style.first_baseline();

    cell.lines
        .iter()
        .enumerate()
        .filter(|(_, line)| !line.text.is_empty())
        .map(|(i, line)| {
            let x = match style.halign {
                HAlign::Left => cell.rect.x + style.padding.left,
                HAlign::Center => cell.rect.x + style.padding.left + (inner - line.width) / 2.0,
                HAlign::Right => cell.rect.right() - style.padding.right - line.width,
            };
            TextLine {
                x,
                y: top + i as f64 * style.line_height(),
                text: line.text.clone(),
                width: line.width,
            }
        })
        .collect()
}
