//! # Text Layout
//!
//! Line breaking and measurement for cell content.
//!
//! Greedy first-fit over UAX#14 break opportunities, measured with the
//! metrics from the render's `FontContext`. A word wider than the line is
//! split between characters so content never spills out of its cell.

use crate::error::FormError;
use crate::font::FontContext;
use crate::style::{FontStyle, PT_PER_INCH};
use unicode_linebreak::{linebreaks, BreakOpportunity};

/// A line of text after line-breaking.
#[derive(Debug, Clone, PartialEq)]
pub struct BrokenLine {
    pub text: String,
    /// Width in inches, trailing whitespace excluded.
    pub width: f64,
}

/// Compute UAX#14 break opportunities indexed by char position.
///
/// Each entry is the break opportunity *before* that character (index 0 is
/// always `None`).
fn compute_break_opportunities(text: &str) -> Vec<Option<BreakOpportunity>> {
    let char_count = text.chars().count();
    let mut result = vec![None; char_count];

    let mut byte_to_char = vec![0usize; text.len() + 1];
    for (char_idx, (byte_idx, _)) in text.char_indices().enumerate() {
        byte_to_char[byte_idx] = char_idx;
    }
    byte_to_char[text.len()] = char_count;

    for (byte_offset, opp) in linebreaks(text) {
        let char_idx = byte_to_char[byte_offset];
        if char_idx < char_count {
            result[char_idx] = Some(opp);
        }
    }

    result
}

fn is_newline(ch: char) -> bool {
    matches!(ch, '\n' | '\r' | '\u{2028}' | '\u{2029}')
}

pub struct TextLayout;

impl Default for TextLayout {
    fn default() -> Self {
        Self::new()
    }
}

impl TextLayout {
    pub fn new() -> Self {
        Self
    }

    /// Break `text` into lines no wider than `max_width` inches.
    ///
    /// Empty text yields a single empty line, which still occupies one line
    /// of height in the cell.
    pub fn break_into_lines(
        &self,
        font_context: &FontContext,
        text: &str,
        max_width: f64,
        font_family: &str,
        font_style: FontStyle,
        font_size: f64,
    ) -> Result<Vec<BrokenLine>, FormError> {
        if text.is_empty() {
            return Ok(vec![BrokenLine {
                text: String::new(),
                width: 0.0,
            }]);
        }

        let chars: Vec<char> = text.chars().collect();
        let widths = chars
            .iter()
            .map(|&ch| {
                if is_newline(ch) {
                    Ok(0.0)
                } else {
                    font_context
                        .char_width(ch, font_family, font_style, font_size)
                        .map(|w| w / PT_PER_INCH)
                }
            })
            .collect::<Result<Vec<f64>, FormError>>()?;
        let break_opps = compute_break_opportunities(text);

        let mut lines = Vec::new();
        let mut line_start = 0;
        let mut line_width = 0.0;
        let mut last_break: Option<usize> = None;

        for i in 0..chars.len() {
            if i > 0 {
                match break_opps[i] {
                    Some(BreakOpportunity::Mandatory) => {
                        lines.push(make_line(&chars[line_start..i], &widths[line_start..i]));
                        line_start = i;
                        line_width = 0.0;
                        last_break = None;
                    }
                    Some(BreakOpportunity::Allowed) => last_break = Some(i),
                    None => {}
                }
            }

            if line_width + widths[i] > max_width && line_start < i && !chars[i].is_whitespace() {
                match last_break.filter(|&bp| bp > line_start) {
                    Some(bp) => {
                        lines.push(make_line(&chars[line_start..bp], &widths[line_start..bp]));
                        line_start = bp;
                        line_width = widths[bp..i].iter().sum();
                    }
                    None => {
                        lines.push(make_line(&chars[line_start..i], &widths[line_start..i]));
                        line_start = i;
                        line_width = 0.0;
                    }
                }
                last_break = None;
            }

            line_width += widths[i];
        }

        lines.push(make_line(&chars[line_start..], &widths[line_start..]));
        Ok(lines)
    }

    /// Width of a single unbroken run in inches.
    pub fn measure_width(
        &self,
        font_context: &FontContext,
        text: &str,
        font_family: &str,
        font_style: FontStyle,
        font_size: f64,
    ) -> Result<f64, FormError> {
        Ok(font_context.measure_string(text, font_family, font_style, font_size)? / PT_PER_INCH)
    }

    /// Width of the widest mandatory-break segment: the width a cell needs
    /// to show `text` without wrapping.
    pub fn measure_natural_width(
        &self,
        font_context: &FontContext,
        text: &str,
        font_family: &str,
        font_style: FontStyle,
        font_size: f64,
    ) -> Result<f64, FormError> {
        let mut widest: f64 = 0.0;
        for segment in text.split(is_newline) {
            let w = self.measure_width(font_context, segment, font_family, font_style, font_size)?;
            widest = widest.max(w);
        }
        Ok(widest)
    }
}

fn make_line(chars: &[char], widths: &[f64]) -> BrokenLine {
    let mut end = chars.len();
    while end > 0 && (chars[end - 1].is_whitespace()) {
        end -= 1;
    }
    BrokenLine {
        text: chars[..end].iter().filter(|c| !is_newline(**c)).collect(),
        width: widths[..end].iter().sum(),
    }
}
