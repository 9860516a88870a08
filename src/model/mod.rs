//! # Records and Options
//!
//! The input side of a render: the two form records, the combined report
//! record, and the options that steer a render.
//!
//! Records deserialize from the camelCase JSON the inspection tooling
//! already produces. Every field is optional on the wire; a missing string
//! renders as an empty cell, a missing flag as unchecked.

use crate::error::FormError;
use serde::{Deserialize, Deserializer, Serialize};

/// Form 1: Part Number Accountability.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Form1Record {
    pub part_number: String,
    pub part_name: String,
    pub serial_number: String,
    pub fai_report_number: String,
    pub part_revision_level: String,
    pub drawing_number: String,
    pub drawing_revision_level: String,
    pub additional_changes: String,
    pub manufacturing_process_reference: String,
    pub organization_name: String,
    pub supplier_code: String,
    pub po_number: String,
    pub baseline_part_number: String,
    #[serde(rename = "detailFAI")]
    pub detail_fai: bool,
    #[serde(rename = "fullFAI")]
    pub full_fai: bool,
    #[serde(rename = "assemblyFAI")]
    pub assembly_fai: bool,
    #[serde(rename = "partialFAI")]
    pub partial_fai: bool,
    #[serde(rename = "reasonForPartialFAI")]
    pub reason_for_partial_fai: String,
    pub sub_assemblies: Vec<SubAssembly>,
    /// `false` marks the "FAI not Complete" box.
    pub fai_complete: bool,
    pub signature: String,
    pub signature_date: String,
    pub reviewed_by: String,
    pub reviewed_by_date: String,
    pub customer_approval: String,
    pub customer_approval_date: String,
}

/// One row of the Form 1 sub-assembly index.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SubAssembly {
    #[serde(deserialize_with = "text_or_number")]
    pub part_number: String,
    pub part_name: String,
    #[serde(deserialize_with = "text_or_number")]
    pub part_serial_number: String,
    #[serde(deserialize_with = "text_or_number")]
    pub fai_report_number: String,
}

/// Form 2: Product Accountability.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Form2Record {
    pub part_number: String,
    pub part_name: String,
    pub serial_number: String,
    pub fai_report_number: String,
    pub material_or_processes: Vec<MaterialOrProcess>,
    pub functional_tests: Vec<FunctionalTest>,
    pub comments: String,
    pub prepared_by: String,
    pub prepared_by_date: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MaterialOrProcess {
    pub material_or_process_name: String,
    pub specification_number: String,
    pub code: String,
    pub special_process_supplier_code: String,
    pub customer_approval_verification: String,
    pub certificate_of_conformance_number: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FunctionalTest {
    pub functional_test_procedure_number: String,
    pub acceptance_report_number: String,
}

/// Both forms of a combined report.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportRecord {
    pub form1: Form1Record,
    pub form2: Form2Record,
}

impl ReportRecord {
    pub fn from_json(json: &str) -> Result<Self, FormError> {
        Ok(serde_json::from_str(json)?)
    }
}

impl Form1Record {
    /// Check that each FAI classification pair has exactly one flag set.
    pub fn check_exclusive_pairs(&self) -> Result<(), FormError> {
        if self.detail_fai == self.assembly_fai {
            return Err(FormError::ExclusivePair {
                first: "detailFAI",
                second: "assemblyFAI",
            });
        }
        if self.full_fai == self.partial_fai {
            return Err(FormError::ExclusivePair {
                first: "fullFAI",
                second: "partialFAI",
            });
        }
        Ok(())
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum TextOrNumber {
    Text(String),
    Integer(i64),
    Float(f64),
}

/// Identifiers in the sub-assembly index arrive as strings or as bare JSON
/// numbers depending on the producer.
fn text_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match TextOrNumber::deserialize(deserializer)? {
        TextOrNumber::Text(s) => s,
        TextOrNumber::Integer(n) => n.to_string(),
        TextOrNumber::Float(f) => f.to_string(),
    })
}

/// What to do with repeating-section entries past the form's capacity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OverflowPolicy {
    /// Render the first `capacity` entries and log a warning.
    #[default]
    Truncate,
    /// Fail with `FormError::CapacityExceeded`.
    Reject,
}

/// A TrueType face to register before layout.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FontEntry {
    /// Family name, e.g. "Signature".
    pub family: String,
    /// Base64-encoded font data, or a data URI (e.g. "data:font/ttf;base64,...").
    pub src: String,
}

/// Document metadata embedded in the PDF.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Metadata {
    pub title: Option<String>,
    pub author: Option<String>,
    pub subject: Option<String>,
    pub creator: Option<String>,
}

/// Per-render configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderOptions {
    #[serde(default)]
    pub overflow: OverflowPolicy,

    /// Reject records whose FAI classification pairs are not exactly one
    /// of each. Off by default: checkboxes reflect the raw flags.
    #[serde(default)]
    pub enforce_exclusive_pairs: bool,

    /// Flate-compress page content streams.
    #[serde(default = "default_true")]
    pub compress: bool,

    #[serde(default)]
    pub metadata: Metadata,

    #[serde(default)]
    pub fonts: Vec<FontEntry>,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            overflow: OverflowPolicy::Truncate,
            enforce_exclusive_pairs: false,
            compress: true,
            metadata: Metadata::default(),
            fonts: Vec::new(),
        }
    }
}

fn default_true() -> bool {
    true
}

impl RenderOptions {
    pub fn from_json(json: &str) -> Result<Self, FormError> {
        Ok(serde_json::from_str(json)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_uses_form_field_names() {
        let json = r#"{
            "partNumber": "123456",
            "detailFAI": true,
            "partialFAI": true,
            "reasonForPartialFAI": "Tooling change.",
            "faiComplete": true,
            "customerApprovalDate": "2021-3-4"
        }"#;
        let record: Form1Record = serde_json::from_str(json).unwrap();
        assert_eq!(record.part_number, "123456");
        assert!(record.detail_fai);
        assert!(!record.assembly_fai);
        assert!(record.partial_fai);
        assert_eq!(record.reason_for_partial_fai, "Tooling change.");
        assert_eq!(record.customer_approval_date, "2021-3-4");
        assert!(record.sub_assemblies.is_empty());
    }

    #[test]
    fn sub_assembly_numbers_may_be_json_numbers() {
        let json = r#"{"partNumber": 1234567, "partName": "BRACKET", "partSerialNumber": "SN-9", "faiReportNumber": 7654321}"#;
        let row: SubAssembly = serde_json::from_str(json).unwrap();
        assert_eq!(row.part_number, "1234567");
        assert_eq!(row.part_serial_number, "SN-9");
        assert_eq!(row.fai_report_number, "7654321");
    }

    #[test]
    fn report_parse_error_reports_data_mismatch() {
        let err = ReportRecord::from_json(r#"{"form1": {"detailFAI": "yes"}}"#).unwrap_err();
        assert!(matches!(err, FormError::Parse { .. }));
        assert!(err.to_string().contains("record schema"));
    }

    #[test]
    fn exclusive_pairs() {
        let mut record = Form1Record {
            detail_fai: true,
            full_fai: true,
            ..Default::default()
        };
        assert!(record.check_exclusive_pairs().is_ok());

        record.assembly_fai = true;
        let err = record.check_exclusive_pairs().unwrap_err();
        assert!(matches!(err, FormError::ExclusivePair { first: "detailFAI", .. }));

        record.assembly_fai = false;
        record.partial_fai = true;
        let err = record.check_exclusive_pairs().unwrap_err();
        assert!(matches!(err, FormError::ExclusivePair { first: "fullFAI", .. }));
    }

    #[test]
    fn options_default_from_empty_json() {
        let options = RenderOptions::from_json("{}").unwrap();
        assert_eq!(options.overflow, OverflowPolicy::Truncate);
        assert!(!options.enforce_exclusive_pairs);
        assert!(options.compress);
        assert!(options.fonts.is_empty());
    }

    #[test]
    fn options_parse_camel_case() {
        let options = RenderOptions::from_json(
            r#"{"overflow": "reject", "enforceExclusivePairs": true, "compress": false,
                "metadata": {"title": "FAI 123456"}}"#,
        )
        .unwrap();
        assert_eq!(options.overflow, OverflowPolicy::Reject);
        assert!(options.enforce_exclusive_pairs);
        assert!(!options.compress);
        assert_eq!(options.metadata.title.as_deref(), Some("FAI 123456"));
    }
}
