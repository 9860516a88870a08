//! # Form Schema
//!
//! The two AS9102 form pages as data: the static template grids that are
//! always drawn, and the borderless data grids that carry a record's values
//! onto the same boxes.
//!
//! Every field a value or overlay lands on is a named [`Field`] constant, so
//! the template label, the data value and any checkbox or checkmark for that
//! field all share one anchor.

pub mod form1;
pub mod form2;

use crate::error::FormError;
use crate::layout::grid::{Cell, Grid};
use crate::layout::hooks::{Overlay, OverlayHook};
use crate::layout::{DataGrid, FreeText};
use crate::model::OverflowPolicy;
use crate::style::{FontStyle, TextStyle};

pub use form1::bind_form1;
pub use form2::bind_form2;

/// Full width of every form grid.
pub const FORM_WIDTH: f64 = 7.39;

pub const TITLE: &str = "AS9102 First Article Inspection Form";

/// The position of a named field within its grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Field {
    pub row: usize,
    pub col: usize,
}

impl Field {
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    /// Place `cell` in `grid` at this field.
    pub fn put(self, grid: &mut Grid, cell: impl Into<Cell>) -> Result<(), FormError> {
        grid.put(self.row, self.col, cell.into())
    }

    /// Anchor `overlay` to this field.
    pub fn overlay(self, hook: OverlayHook, overlay: Overlay) -> OverlayHook {
        hook.at(self.row, self.col, overlay)
    }

    /// Anchor `overlay` to this field, drawn only if `condition`.
    pub fn overlay_if(self, hook: OverlayHook, overlay: Overlay, condition: bool) -> OverlayHook {
        hook.when(self.row, self.col, overlay, condition)
    }
}

/// Everything that goes on one form page.
pub struct FormPage {
    pub free_text: Vec<FreeText>,
    pub templates: Vec<Grid>,
    /// Empty for a blank render.
    pub data: Vec<DataGrid>,
}

impl FormPage {
    fn new(free_text: Vec<FreeText>) -> Self {
        Self {
            free_text,
            templates: Vec::new(),
            data: Vec::new(),
        }
    }

    /// Add a template grid; returns its index for binding data grids.
    fn template(&mut self, grid: Grid) -> usize {
        self.templates.push(grid);
        self.templates.len() - 1
    }

    fn data(&mut self, over: usize, grid: Grid) {
        self.data.push(DataGrid { over, grid });
    }
}

pub(crate) fn title() -> FreeText {
    FreeText::new(4.25, 0.5, TITLE, TextStyle::new("Helvetica", FontStyle::Bold, 15.0)).centered()
}

pub(crate) fn subtitle(y: f64, text: &str, size: f64) -> FreeText {
    FreeText::new(0.7, y, text, TextStyle::new("Helvetica", FontStyle::BoldItalic, size))
}

/// Rows of `count` empty cells.
pub(crate) fn empty_rows(rows: usize, count: usize) -> Vec<Vec<Cell>> {
    (0..rows).map(|_| vec![Cell::empty(); count]).collect()
}

/// Apply the overflow policy to a repeating section.
///
/// Returns the entries that get a row. Rows past the returned slice render
/// blank.
pub(crate) fn fit_to_capacity<'a, T>(
    section: &'static str,
    entries: &'a [T],
    capacity: usize,
    policy: OverflowPolicy,
) -> Result<&'a [T], FormError> {
    if entries.len() <= capacity {
        return Ok(entries);
    }
    match policy {
        OverflowPolicy::Truncate => {
            log::warn!(
                "{} has {} entries; rendering the first {}",
                section,
                entries.len(),
                capacity
            );
            Ok(&entries[..capacity])
        }
        OverflowPolicy::Reject => Err(FormError::CapacityExceeded {
            section,
            capacity,
            len: entries.len(),
        }),
    }
}
