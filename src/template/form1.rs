//! Form 1: Part Number Accountability.

use super::{empty_rows, fit_to_capacity, subtitle, title, Field, FormPage, FORM_WIDTH};
use crate::error::FormError;
use crate::font::SIGNATURE_FAMILY;
use crate::layout::grid::{Cell, Grid};
use crate::layout::hooks::{Overlay, OverlayHook};
use crate::model::{Form1Record, RenderOptions};
use crate::style::{CellStyle, DashPattern, Edges, FontStyle, HAlign, Stroke, StyleOverride, TextStyle, Theme};

/// Rows in the sub-assembly index below its label row.
pub const SUB_ASSEMBLY_CAPACITY: usize = 15;

const HEADER_COLUMNS: [f64; 4] = [1.5, 1.8, 1.7, 2.39];
const CLASSIFICATION_COLUMNS: [f64; 3] = [1.5, 1.8, 4.09];
const INDEX_COLUMNS: [f64; 4] = [1.6, 2.2, 1.7, 1.89];
const SIGNATURE_COLUMNS: [f64; 2] = [5.3, 2.09];

const HEADER_Y: f64 = 1.0;
const CLASSIFICATION_Y: f64 = 2.8;
const INSTRUCTIONS_Y: f64 = 4.0;
const INDEX_BANNER_Y: f64 = 4.4;
const INDEX_Y: f64 = 4.6;
const CERTIFICATION_Y: f64 = 7.8;
const SIGNATURES_Y: f64 = 8.3;

/// Checkbox inset within a classification cell.
const CLASS_BOX: (f64, f64) = (1.1, 0.02);
const COMPLETE_BOX: (f64, f64) = (3.5, 0.04);
const NOT_COMPLETE_BOX: (f64, f64) = (5.0, 0.04);
const SIGNATURE_INSET: (f64, f64) = (0.4, 0.4);
const SIGNATURE_SIZE: f64 = 20.0;

mod field {
    use super::Field;

    pub const PART_NUMBER: Field = Field::new(0, 0);
    pub const PART_NAME: Field = Field::new(0, 1);
    pub const SERIAL_NUMBER: Field = Field::new(0, 2);
    pub const FAI_REPORT_NUMBER: Field = Field::new(0, 3);
    pub const PART_REVISION_LEVEL: Field = Field::new(1, 0);
    pub const DRAWING_NUMBER: Field = Field::new(1, 1);
    pub const DRAWING_REVISION_LEVEL: Field = Field::new(1, 2);
    pub const ADDITIONAL_CHANGES: Field = Field::new(1, 3);
    pub const MANUFACTURING_PROCESS_REFERENCE: Field = Field::new(2, 0);
    pub const ORGANIZATION_NAME: Field = Field::new(2, 1);
    pub const SUPPLIER_CODE: Field = Field::new(2, 2);
    pub const PO_NUMBER: Field = Field::new(2, 3);

    pub const DETAIL_FAI: Field = Field::new(1, 0);
    pub const FULL_FAI: Field = Field::new(1, 1);
    pub const ASSEMBLY_FAI: Field = Field::new(2, 0);
    pub const PARTIAL_FAI: Field = Field::new(2, 1);
    pub const DETAIL_DIVIDER: Field = Field::new(0, 1);
    pub const BASELINE_DIVIDER: Field = Field::new(0, 2);
    pub const BASELINE_PART_NUMBER: Field = Field::new(1, 2);
    pub const REASON_FOR_PARTIAL_FAI: Field = Field::new(3, 1);

    pub const FAI_COMPLETE: Field = Field::new(1, 0);

    pub const SIGNATURE: Field = Field::new(0, 0);
    pub const SIGNATURE_DATE: Field = Field::new(0, 1);
    pub const REVIEWED_BY: Field = Field::new(1, 0);
    pub const REVIEWED_BY_DATE: Field = Field::new(1, 1);
    pub const CUSTOMER_APPROVAL: Field = Field::new(2, 0);
    pub const CUSTOMER_APPROVAL_DATE: Field = Field::new(2, 1);
}

fn rows(rows: &[&[&str]]) -> Vec<Vec<Cell>> {
    rows.iter()
        .map(|row| row.iter().map(|s| Cell::text(*s)).collect())
        .collect()
}

fn label_style(font_style: FontStyle, font_size: f64, min_cell_height: f64, padding: Edges) -> CellStyle {
    CellStyle {
        font_style,
        font_size,
        min_cell_height,
        padding,
        ..Default::default()
    }
}

/// Build the Form 1 page. `record` is `None` for a blank form.
pub fn bind_form1(record: Option<&Form1Record>, options: &RenderOptions) -> Result<FormPage, FormError> {
    if let Some(record) = record {
        if options.enforce_exclusive_pairs {
            record.check_exclusive_pairs()?;
        }
    }

    let mut page = FormPage::new(vec![
        title(),
        subtitle(0.8, "Form 1: Part Number Accountability", 12.0),
    ]);

    let header = page.template(header_template()?);
    let classification = page.template(classification_template()?);
    page.template(instructions_template()?);
    page.template(index_banner_template()?);
    let index = page.template(index_template()?);
    let certification = page.template(certification_template()?);
    let signatures = page.template(signatures_template()?);

    if let Some(record) = record {
        page.data(header, header_data(record)?);
        page.data(classification, classification_data(record)?);
        page.data(index, index_data(record, options)?);
        page.data(certification, certification_data(record));
        page.data(signatures, signatures_data(record)?);
    }

    Ok(page)
}

fn header_template() -> Result<Grid, FormError> {
    Ok(Grid::from_rows(rows(&[
        &["1. Part Number", "2. Part Name", "3. Serial Number", "4. FAI Report Number"],
        &["5. Part Revision Level", "6. Drawing Number", "7. Drawing revision level", "8. Additional Changes"],
        &["9. Manufacturing Process Reference", "10. Organization Name", "11. Supplier Code", "12. P.O. Number"],
    ]))?
    .at(HEADER_Y)
    .columns(&HEADER_COLUMNS)
    .with_style(label_style(FontStyle::Bold, 8.5, 0.6, Edges::new(0.02, 0.05, 0.05, 0.1))))
}

fn header_data(record: &Form1Record) -> Result<Grid, FormError> {
    let mut grid = Grid::with_shape(3, 4)
        .at(HEADER_Y)
        .theme(Theme::Borderless)
        .columns(&HEADER_COLUMNS)
        .with_style(label_style(FontStyle::Normal, 15.0, 0.6, Edges::new(0.25, 0.05, 0.05, 0.2)));

    field::PART_NUMBER.put(&mut grid, record.part_number.as_str())?;
    field::PART_NAME.put(&mut grid, record.part_name.as_str())?;
    field::SERIAL_NUMBER.put(&mut grid, record.serial_number.as_str())?;
    field::FAI_REPORT_NUMBER.put(&mut grid, record.fai_report_number.as_str())?;
    field::PART_REVISION_LEVEL.put(&mut grid, record.part_revision_level.as_str())?;
    field::DRAWING_NUMBER.put(&mut grid, record.drawing_number.as_str())?;
    field::DRAWING_REVISION_LEVEL.put(&mut grid, record.drawing_revision_level.as_str())?;
    field::ADDITIONAL_CHANGES.put(&mut grid, record.additional_changes.as_str())?;
    // The label above this one wraps, so the value sits lower.
    field::MANUFACTURING_PROCESS_REFERENCE.put(
        &mut grid,
        Cell::text(record.manufacturing_process_reference.as_str())
            .styled(StyleOverride::default().inset(0.3, 0.2)),
    )?;
    field::ORGANIZATION_NAME.put(&mut grid, record.organization_name.as_str())?;
    field::SUPPLIER_CODE.put(&mut grid, record.supplier_code.as_str())?;
    field::PO_NUMBER.put(&mut grid, record.po_number.as_str())?;
    Ok(grid)
}

fn classification_template() -> Result<Grid, FormError> {
    let mut hook = OverlayHook::new();
    for checkbox in [field::DETAIL_FAI, field::FULL_FAI, field::ASSEMBLY_FAI, field::PARTIAL_FAI] {
        hook = checkbox.overlay(hook, Overlay::checkbox(CLASS_BOX.0, CLASS_BOX.1));
    }
    hook = field::DETAIL_DIVIDER.overlay(
        hook,
        Overlay::Rule {
            from: (0.0, 0.0),
            to: (0.0, 1.2),
            stroke: Stroke::solid(0.01),
        },
    );
    hook = field::REASON_FOR_PARTIAL_FAI.overlay(
        hook,
        Overlay::Rule {
            from: (0.0, 0.0),
            to: (5.89, 0.0),
            stroke: Stroke::dashed(0.01, DashPattern::new(0.03, 0.03, 0.015)),
        },
    );
    hook = field::BASELINE_DIVIDER.overlay(
        hook,
        Overlay::Rule {
            from: (0.0, 0.0),
            to: (0.0, 0.6),
            stroke: Stroke::dashed(0.01, DashPattern::new(0.02, 0.02, 0.0)),
        },
    );

    Ok(Grid::from_rows(rows(&[
        &["13.", "14.", "Baseline Part Number including revision level"],
        &["   Detail FAI", "   Full FAI", ""],
        &["   Assembly FAI", "   Partial FAI", ""],
        &["", "Reason for Partial FAI:", ""],
        &["", "", ""],
        &["", "", ""],
    ]))?
    .at(CLASSIFICATION_Y)
    .theme(Theme::Borderless)
    .outline(Stroke::solid(0.01))
    .width(FORM_WIDTH)
    .columns(&CLASSIFICATION_COLUMNS)
    .with_style(label_style(FontStyle::Bold, 8.5, 0.2, Edges::new(0.02, 0.05, 0.02, 0.1)))
    .hook(hook))
}

fn classification_data(record: &Form1Record) -> Result<Grid, FormError> {
    let check = Overlay::check(CLASS_BOX.0, CLASS_BOX.1);
    let mut hook = OverlayHook::new();
    hook = field::DETAIL_FAI.overlay_if(hook, check.clone(), record.detail_fai);
    hook = field::ASSEMBLY_FAI.overlay_if(hook, check.clone(), record.assembly_fai);
    hook = field::FULL_FAI.overlay_if(hook, check.clone(), record.full_fai);
    hook = field::PARTIAL_FAI.overlay_if(hook, check, record.partial_fai);

    let mut grid = Grid::with_shape(6, 3)
        .at(CLASSIFICATION_Y)
        .theme(Theme::Borderless)
        .width(FORM_WIDTH)
        .columns(&CLASSIFICATION_COLUMNS)
        .with_style(label_style(FontStyle::Normal, 15.0, 0.2, Edges::new(0.01, 0.05, 0.02, 0.15)))
        .hook(hook);

    // The baseline box ends at the dashed divider above the reason box.
    field::BASELINE_PART_NUMBER.put(
        &mut grid,
        Cell::text(record.baseline_part_number.as_str())
            .row_span(2)
            .styled(StyleOverride::default().halign(HAlign::Left)),
    )?;
    field::REASON_FOR_PARTIAL_FAI.put(
        &mut grid,
        Cell::text(record.reason_for_partial_fai.as_str())
            .col_span(2)
            .row_span(3)
            .styled(StyleOverride::default().halign(HAlign::Left)),
    )?;
    Ok(grid)
}

fn instructions_template() -> Result<Grid, FormError> {
    Ok(Grid::from_rows(rows(&[
        &["a) if above part number is a detail part only, go to Field 19"],
        &["b) if above part number is an assembly, go to the \u{201C}INDEX\u{201D} section below"],
    ]))?
    .at(INSTRUCTIONS_Y)
    .theme(Theme::Borderless)
    .outline(Stroke::solid(0.01))
    .width(FORM_WIDTH)
    .with_style(label_style(FontStyle::Italic, 8.4, 0.2, Edges::new(0.03, 0.05, 0.01, 0.1))))
}

fn index_banner_template() -> Result<Grid, FormError> {
    Ok(Grid::from_rows(rows(&[&[
        "INDEX of part numbers or sub-assembly numbers required to make the assembly noted above",
    ]]))?
    .at(INDEX_BANNER_Y)
    .theme(Theme::Borderless)
    .outline(Stroke::solid(0.01))
    .width(FORM_WIDTH)
    .with_style(label_style(FontStyle::Bold, 9.0, 0.2, Edges::new(0.02, 0.05, 0.02, 0.5))))
}

fn index_template() -> Result<Grid, FormError> {
    let mut body = rows(&[&[
        "15. Part Number",
        "16. Part Name",
        "17. Part Serial Number",
        "18. FAI Report Number",
    ]]);
    body.extend(empty_rows(SUB_ASSEMBLY_CAPACITY, INDEX_COLUMNS.len()));

    Ok(Grid::from_rows(body)?
        .at(INDEX_Y)
        .width(FORM_WIDTH)
        .columns(&INDEX_COLUMNS)
        .with_style(label_style(FontStyle::BoldItalic, 8.5, 0.2, Edges::new(0.02, 0.05, 0.02, 0.1))))
}

fn index_data(record: &Form1Record, options: &RenderOptions) -> Result<Grid, FormError> {
    let entries = fit_to_capacity(
        "subAssemblies",
        &record.sub_assemblies,
        SUB_ASSEMBLY_CAPACITY,
        options.overflow,
    )?;

    let mut grid = Grid::with_shape(SUB_ASSEMBLY_CAPACITY + 1, INDEX_COLUMNS.len())
        .at(INDEX_Y)
        .theme(Theme::Borderless)
        .width(FORM_WIDTH)
        .columns(&INDEX_COLUMNS)
        .with_style(label_style(FontStyle::Normal, 9.0, 0.2, Edges::new(0.03, 0.05, 0.01, 0.1)));

    for (i, entry) in entries.iter().enumerate() {
        let row = i + 1;
        grid.put(row, 0, Cell::text(entry.part_number.as_str()))?;
        grid.put(row, 1, Cell::text(entry.part_name.as_str()))?;
        grid.put(row, 2, Cell::text(entry.part_serial_number.as_str()))?;
        grid.put(row, 3, Cell::text(entry.fai_report_number.as_str()))?;
    }
    Ok(grid)
}

fn certification_template() -> Result<Grid, FormError> {
    let hook = OverlayHook::new();
    let hook = field::FAI_COMPLETE.overlay(hook, Overlay::checkbox(COMPLETE_BOX.0, COMPLETE_BOX.1));
    let hook = field::FAI_COMPLETE.overlay(hook, Overlay::checkbox(NOT_COMPLETE_BOX.0, NOT_COMPLETE_BOX.1));

    Ok(Grid::from_rows(rows(&[
        &["1) Signature indicates that all characteristics are accounted for; meet drawing requirements or are properly documented for disposition."],
        &["2) Also indicate if the FAI is complete per Section 5.4:                        FAI Complete                        FAI not Complete"],
    ]))?
    .at(CERTIFICATION_Y)
    .theme(Theme::Borderless)
    .outline(Stroke::solid(0.01))
    .width(FORM_WIDTH)
    .with_style(label_style(FontStyle::Normal, 8.5, 0.25, Edges::new(0.03, 0.05, 0.01, 0.1)))
    .hook(hook))
}

/// Exactly one of the two completion boxes is checked.
fn certification_data(record: &Form1Record) -> Grid {
    let hook = OverlayHook::new();
    let hook = field::FAI_COMPLETE.overlay_if(
        hook,
        Overlay::check(COMPLETE_BOX.0, COMPLETE_BOX.1),
        record.fai_complete,
    );
    let hook = field::FAI_COMPLETE.overlay_if(
        hook,
        Overlay::check(NOT_COMPLETE_BOX.0, NOT_COMPLETE_BOX.1),
        !record.fai_complete,
    );

    Grid::with_shape(2, 1)
        .at(CERTIFICATION_Y)
        .theme(Theme::Borderless)
        .width(FORM_WIDTH)
        .with_style(label_style(FontStyle::Normal, 8.5, 0.25, Edges::new(0.03, 0.05, 0.01, 0.1)))
        .hook(hook)
}

fn signatures_template() -> Result<Grid, FormError> {
    Ok(Grid::from_rows(rows(&[
        &["19. Signature", "20. Date"],
        &["21. Reviewed By", "22. Date"],
        &["23. Customer Approval", "24. Date"],
    ]))?
    .at(SIGNATURES_Y)
    .width(FORM_WIDTH)
    .columns(&SIGNATURE_COLUMNS)
    .with_style(label_style(FontStyle::Bold, 8.5, 0.6, Edges::new(0.02, 0.05, 0.02, 0.1))))
}

fn signatures_data(record: &Form1Record) -> Result<Grid, FormError> {
    let style = TextStyle::new(SIGNATURE_FAMILY, FontStyle::Normal, SIGNATURE_SIZE);
    let mut hook = OverlayHook::new();
    for (anchor, signer) in [
        (field::SIGNATURE, &record.signature),
        (field::REVIEWED_BY, &record.reviewed_by),
        (field::CUSTOMER_APPROVAL, &record.customer_approval),
    ] {
        hook = anchor.overlay_if(
            hook,
            Overlay::Text {
                dx: SIGNATURE_INSET.0,
                dy: SIGNATURE_INSET.1,
                text: signer.clone(),
                style: style.clone(),
            },
            !signer.is_empty(),
        );
    }

    let mut grid = Grid::with_shape(3, 2)
        .at(SIGNATURES_Y)
        .theme(Theme::Borderless)
        .width(FORM_WIDTH)
        .columns(&SIGNATURE_COLUMNS)
        .with_style(label_style(FontStyle::Normal, 15.0, 0.6, Edges::new(0.25, 0.05, 0.02, 0.2)))
        .hook(hook);

    field::SIGNATURE_DATE.put(&mut grid, record.signature_date.as_str())?;
    field::REVIEWED_BY_DATE.put(&mut grid, record.reviewed_by_date.as_str())?;
    field::CUSTOMER_APPROVAL_DATE.put(&mut grid, record.customer_approval_date.as_str())?;
    Ok(grid)
}
