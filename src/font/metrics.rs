//! Advance widths for the standard PDF fonts, in 1/1000 em.
//!
//! Helvetica and Helvetica-Bold come from the Adobe AFM files. The oblique
//! faces share their upright widths.

/// Helvetica, ASCII 0x20..=0x7E.
const HELVETICA: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // ' '..'/'
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, // '0'..'9'
    278, 278, 584, 584, 584, 556, 1015, // ':'..'@'
    667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, // 'A'..'M'
    722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, // 'N'..'Z'
    278, 278, 278, 469, 556, 333, // '['..'`'
    556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, // 'a'..'m'
    556, 556, 556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, // 'n'..'z'
    334, 260, 334, 584, // '{'..'~'
];

/// Helvetica-Bold, ASCII 0x20..=0x7E.
const HELVETICA_BOLD: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278, // ' '..'/'
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, // '0'..'9'
    333, 333, 584, 584, 584, 611, 975, // ':'..'@'
    722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, // 'A'..'M'
    722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, // 'N'..'Z'
    333, 278, 333, 584, 556, 333, // '['..'`'
    556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, // 'a'..'m'
    611, 611, 611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500, // 'n'..'z'
    389, 280, 389, 584, // '{'..'~'
];

/// Width table for one standard face.
#[derive(Debug, Clone, Copy)]
pub enum StandardFontMetrics {
    Proportional {
        ascii: &'static [u16; 95],
        /// Curly quotes and apostrophes, which the labels use.
        quote: u16,
        double_quote: u16,
        fallback: u16,
    },
    Fixed(u16),
}

impl StandardFontMetrics {
    pub const HELVETICA: StandardFontMetrics = StandardFontMetrics::Proportional {
        ascii: &HELVETICA,
        quote: 222,
        double_quote: 333,
        fallback: 556,
    };

    pub const HELVETICA_BOLD: StandardFontMetrics = StandardFontMetrics::Proportional {
        ascii: &HELVETICA_BOLD,
        quote: 278,
        double_quote: 500,
        fallback: 556,
    };

    /// Advance width of `ch` in 1/1000 em.
    pub fn units(&self, ch: char) -> u16 {
        match self {
            StandardFontMetrics::Fixed(w) => *w,
            StandardFontMetrics::Proportional {
                ascii,
                quote,
                double_quote,
                fallback,
            } => match ch {
                ' '..='~' => ascii[ch as usize - 0x20],
                '\u{2018}' | '\u{2019}' => *quote,
                '\u{201C}' | '\u{201D}' => *double_quote,
                '\u{00A0}' => ascii[0],
                _ => *fallback,
            },
        }
    }

    /// Advance width of `ch` in points.
    pub fn char_width(&self, ch: char, font_size: f64) -> f64 {
        self.units(ch) as f64 / 1000.0 * font_size
    }

    /// Width of a whole string in points.
    pub fn measure_string(&self, text: &str, font_size: f64) -> f64 {
        text.chars().map(|ch| self.char_width(ch, font_size)).sum()
    }
}
