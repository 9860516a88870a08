//! Form 2: Product Accountability (raw material, specifications, special
//! processes and functional testing).
//!
//! One ruled grid covers the whole page. Its rows fall into fixed bands,
//! top to bottom:
//!
//! | rows   | band                                   |
//! |--------|----------------------------------------|
//! | 0      | part identification (fields 1-4)       |
//! | 1      | material/process labels (fields 5-10)  |
//! | 2-25   | material/process entries               |
//! | 26     | functional test labels (fields 11-12)  |
//! | 27-33  | functional test entries                |
//! | 34     | comments (field 13)                    |
//! | 35     | prepared by and date (fields 14-15)    |

use super::{empty_rows, fit_to_capacity, subtitle, title, Field, FormPage, FORM_WIDTH};
use crate::error::FormError;
use crate::font::SIGNATURE_FAMILY;
use crate::layout::grid::{Cell, Grid};
use crate::layout::hooks::{Overlay, OverlayHook};
use crate::model::{Form2Record, RenderOptions};
use crate::style::{CellStyle, Edges, FontStyle, StyleOverride, TextStyle, Theme};

pub const MATERIAL_CAPACITY: usize = 24;
pub const FUNCTIONAL_TEST_CAPACITY: usize = 7;

const COLUMNS: [f64; 6] = [1.4, 1.1, 1.24, 1.25, 0.9, 1.5];
const GRID_Y: f64 = 1.0;

const MATERIAL_FIRST_ROW: usize = 2;
const TEST_HEADER_ROW: usize = MATERIAL_FIRST_ROW + MATERIAL_CAPACITY;
const TEST_FIRST_ROW: usize = TEST_HEADER_ROW + 1;
const COMMENTS_ROW: usize = TEST_FIRST_ROW + FUNCTIONAL_TEST_CAPACITY;
const PREPARED_ROW: usize = COMMENTS_ROW + 1;
const ROWS: usize = PREPARED_ROW + 1;

const PREPARED_BY_INSET: (f64, f64) = (0.4, 0.47);

mod field {
    use super::{Field, COMMENTS_ROW, PREPARED_ROW};

    pub const PART_NUMBER: Field = Field::new(0, 0);
    pub const PART_NAME: Field = Field::new(0, 1);
    pub const SERIAL_NUMBER: Field = Field::new(0, 3);
    pub const FAI_REPORT_NUMBER: Field = Field::new(0, 5);
    pub const COMMENTS: Field = Field::new(COMMENTS_ROW, 0);
    pub const PREPARED_BY: Field = Field::new(PREPARED_ROW, 0);
    pub const PREPARED_BY_DATE: Field = Field::new(PREPARED_ROW, 4);
}

fn label(text: &str, over: StyleOverride) -> Cell {
    Cell::text(text).styled(over)
}

fn base_style(font_style: FontStyle, font_size: f64) -> CellStyle {
    CellStyle {
        font_style,
        font_size,
        min_cell_height: 0.21,
        padding: Edges::new(0.02, 0.05, 0.02, 0.1),
        ..Default::default()
    }
}

/// Build the Form 2 page. `record` is `None` for a blank form.
pub fn bind_form2(record: Option<&Form2Record>, options: &RenderOptions) -> Result<FormPage, FormError> {
    let mut page = FormPage::new(vec![
        title(),
        subtitle(
            0.72,
            "Form 2: Product Accountability - Raw Material, Specifications and",
            11.0,
        ),
        subtitle(0.88, "Special Process(es), Functional Testing", 11.0),
    ]);

    let grid = page.template(template()?);
    if let Some(record) = record {
        page.data(grid, data(record, options)?);
    }
    Ok(page)
}

fn template() -> Result<Grid, FormError> {
    let identification = StyleOverride::default().font_size(9.0).padding(0.02, 0.4, 0.1);
    let material = StyleOverride::default().padding(0.02, 0.17, 0.1);
    let tests = StyleOverride::default()
        .font_style(FontStyle::BoldItalic)
        .padding(0.02, 0.09, 0.1);

    let mut rows = vec![
        vec![
            label("1. Part Number", identification.clone()),
            label("2. Part Name", identification.clone()).col_span(2),
            label("3. Serial Number", identification.clone()).col_span(2),
            label("4. FAI Report Number", identification),
        ],
        [
            "5. Material or Process Name",
            "6. Specification Number",
            "7. Code",
            "8. Special Process Supplier Code",
            "9. Customer Approval Verification",
            "10. Certificate of Conformance Number",
        ]
        .iter()
        .map(|text| label(text, material.clone()))
        .collect(),
    ];
    rows.extend(empty_rows(MATERIAL_CAPACITY, COLUMNS.len()));
    rows.push(vec![
        label("11. Functional Test Procedure Number", tests.clone()),
        label("12. Acceptance report number, if applicable", tests).col_span(5),
    ]);
    for _ in 0..FUNCTIONAL_TEST_CAPACITY {
        rows.push(vec![Cell::empty(), Cell::empty().col_span(5)]);
    }
    rows.push(vec![label(
        "13. Comments",
        StyleOverride::default()
            .font_size(10.0)
            .font_style(FontStyle::BoldItalic)
            .padding(0.02, 0.2, 0.1),
    )
    .col_span(6)]);
    let prepared = StyleOverride::default()
        .font_size(10.0)
        .font_style(FontStyle::Bold)
        .padding(0.02, 0.45, 0.1);
    rows.push(vec![
        label("14. Prepared By", prepared.clone()).col_span(4),
        label("15. Date", prepared).col_span(2),
    ]);

    Ok(Grid::from_rows(rows)?
        .at(GRID_Y)
        .width(FORM_WIDTH)
        .columns(&COLUMNS)
        .with_style(base_style(FontStyle::Bold, 8.4)))
}

fn data(record: &Form2Record, options: &RenderOptions) -> Result<Grid, FormError> {
    let materials = fit_to_capacity(
        "materialOrProcesses",
        &record.material_or_processes,
        MATERIAL_CAPACITY,
        options.overflow,
    )?;
    let tests = fit_to_capacity(
        "functionalTests",
        &record.functional_tests,
        FUNCTIONAL_TEST_CAPACITY,
        options.overflow,
    )?;

    let mut hook = OverlayHook::new();
    hook = field::PREPARED_BY.overlay_if(
        hook,
        Overlay::Text {
            dx: PREPARED_BY_INSET.0,
            dy: PREPARED_BY_INSET.1,
            text: record.prepared_by.clone(),
            style: TextStyle::new(SIGNATURE_FAMILY, FontStyle::Normal, 20.0),
        },
        !record.prepared_by.is_empty(),
    );

    let mut grid = Grid::with_shape(ROWS, COLUMNS.len())
        .at(GRID_Y)
        .width(FORM_WIDTH)
        .columns(&COLUMNS)
        .theme(Theme::Borderless)
        .with_style(base_style(FontStyle::Normal, 9.0))
        .hook(hook);

    let value = StyleOverride::default().font_size(15.0).padding(0.25, 0.05, 0.2);
    field::PART_NUMBER.put(&mut grid, label(&record.part_number, value.clone()))?;
    field::PART_NAME.put(&mut grid, label(&record.part_name, value.clone()).col_span(2))?;
    field::SERIAL_NUMBER.put(&mut grid, label(&record.serial_number, value.clone()).col_span(2))?;
    field::FAI_REPORT_NUMBER.put(&mut grid, label(&record.fai_report_number, value))?;

    for (i, entry) in materials.iter().enumerate() {
        let row = MATERIAL_FIRST_ROW + i;
        let values = [
            &entry.material_or_process_name,
            &entry.specification_number,
            &entry.code,
            &entry.special_process_supplier_code,
            &entry.customer_approval_verification,
            &entry.certificate_of_conformance_number,
        ];
        for (col, text) in values.into_iter().enumerate() {
            grid.put(row, col, Cell::text(text.as_str()))?;
        }
    }

    for (i, test) in tests.iter().enumerate() {
        let row = TEST_FIRST_ROW + i;
        grid.put(row, 0, Cell::text(test.functional_test_procedure_number.as_str()))?;
        grid.put(row, 1, Cell::text(test.acceptance_report_number.as_str()).col_span(5))?;
    }

    field::COMMENTS.put(
        &mut grid,
        label(
            &record.comments,
            StyleOverride::default().font_size(12.0).padding(0.14, 0.0, 0.1),
        )
        .col_span(6),
    )?;
    field::PREPARED_BY.put(&mut grid, Cell::empty().col_span(4))?;
    field::PREPARED_BY_DATE.put(
        &mut grid,
        label(
            &record.prepared_by_date,
            StyleOverride::default().font_size(15.0).padding(0.285, 0.0, 0.2),
        )
        .col_span(2),
    )?;
    Ok(grid)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::font::FontContext;
    use crate::layout::grid::layout_grid;
    use crate::model::{FunctionalTest, MaterialOrProcess, OverflowPolicy};

    fn record() -> Form2Record {
        Form2Record {
            part_number: "482913".into(),
            part_name: "HOUSING".into(),
            material_or_processes: vec![MaterialOrProcess {
                material_or_process_name: "ANODIZE".into(),
                specification_number: "MIL-A-8625".into(),
                code: "TYII".into(),
                special_process_supplier_code: "AQ".into(),
                customer_approval_verification: "Yes".into(),
                certificate_of_conformance_number: "551204".into(),
            }],
            functional_tests: vec![FunctionalTest {
                functional_test_procedure_number: "FTP-12".into(),
                acceptance_report_number: "AR-7".into(),
            }],
            comments: "No deviations.".into(),
            prepared_by: "Rowan Sato".into(),
            prepared_by_date: "2021-6-14".into(),
            ..Default::default()
        }
    }

    #[test]
    fn bands_add_up_to_thirty_six_rows() {
        assert_eq!(ROWS, 36);
        assert_eq!(PREPARED_ROW, 35);
        let grid = template().unwrap();
        assert_eq!(grid.rows(), 36);
        assert_eq!(grid.cols(), 6);
    }

    #[test]
    fn template_fits_on_the_page() {
        let layout = layout_grid(&template().unwrap(), &FontContext::new()).unwrap();
        assert!((layout.geometry.width() - FORM_WIDTH).abs() < 1e-9);
        assert!(layout.geometry.bottom() < 11.0);
    }

    #[test]
    fn spanning_labels_land_on_their_fields() {
        let grid = template().unwrap();
        assert_eq!(grid.cell(0, 1).map(|c| c.col_span), Some(2));
        assert_eq!(grid.cell(0, 3).map(|c| c.content.as_str()), Some("3. Serial Number"));
        assert_eq!(grid.cell(TEST_HEADER_ROW, 1).map(|c| c.col_span), Some(5));
        assert_eq!(grid.cell(PREPARED_ROW, 4).map(|c| c.content.as_str()), Some("15. Date"));
    }

    #[test]
    fn data_rows_map_to_bands() {
        let grid = data(&record(), &RenderOptions::default()).unwrap();
        assert_eq!(grid.cell(2, 1).map(|c| c.content.as_str()), Some("MIL-A-8625"));
        assert!(grid.cell(3, 0).is_none());
        assert_eq!(grid.cell(27, 1).map(|c| c.content.as_str()), Some("AR-7"));
        assert_eq!(grid.cell(34, 0).map(|c| c.content.as_str()), Some("No deviations."));
        assert_eq!(grid.cell(35, 4).map(|c| c.content.as_str()), Some("2021-6-14"));
    }

    #[test]
    fn overfull_sections_follow_policy() {
        let mut rec = record();
        rec.material_or_processes = vec![MaterialOrProcess::default(); 30];
        rec.functional_tests = vec![FunctionalTest::default(); 9];
        assert!(data(&rec, &RenderOptions::default()).is_ok());

        let options = RenderOptions {
            overflow: OverflowPolicy::Reject,
            ..Default::default()
        };
        let err = data(&rec, &options).err().unwrap();
        assert!(matches!(
            err,
            FormError::CapacityExceeded {
                section: "materialOrProcesses",
                capacity: 24,
                len: 30
            }
        ));
    }
}
