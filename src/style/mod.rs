//! # Style System
//!
//! The style record every grid carries, plus the per-cell override merged on
//! top of it. Lengths are inches, font sizes are points.
//!
//! Styles are plain values passed into each layout and draw call. There is no
//! "current font" anywhere: a text command owns the style it was drawn with.

/// Per-edge values (cell padding).
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Edges {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl Edges {
    pub const fn new(top: f64, right: f64, bottom: f64, left: f64) -> Self {
        Self {
            top,
            right,
            bottom,
            left,
        }
    }

    pub fn uniform(v: f64) -> Self {
        Self::new(v, v, v, v)
    }

    pub fn horizontal(&self) -> f64 {
        self.left + self.right
    }

    pub fn vertical(&self) -> f64 {
        self.top + self.bottom
    }
}

/// A padding override: only the edges that are `Some` replace the base.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct EdgesOverride {
    pub top: Option<f64>,
    pub right: Option<f64>,
    pub bottom: Option<f64>,
    pub left: Option<f64>,
}

impl EdgesOverride {
    pub fn apply(&self, base: Edges) -> Edges {
        Edges {
            top: self.top.unwrap_or(base.top),
            right: self.right.unwrap_or(base.right),
            bottom: self.bottom.unwrap_or(base.bottom),
            left: self.left.unwrap_or(base.left),
        }
    }
}

/// An RGB color, components in 0.0..=1.0.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f64,
    pub g: f64,
    pub b: f64,
}

impl Color {
    pub const BLACK: Color = Color {
        r: 0.0,
        g: 0.0,
        b: 0.0,
    };
}

impl Default for Color {
    fn default() -> Self {
        Self::BLACK
    }
}

/// Weight and slant of a face within a family.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FontStyle {
    #[default]
    Normal,
    Bold,
    Italic,
    BoldItalic,
}

impl FontStyle {
    pub fn is_bold(self) -> bool {
        matches!(self, FontStyle::Bold | FontStyle::BoldItalic)
    }

    pub fn is_italic(self) -> bool {
        matches!(self, FontStyle::Italic | FontStyle::BoldItalic)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum HAlign {
    #[default]
    Left,
    Center,
    Right,
}

/// Grid-wide border drawing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Theme {
    /// Stroke every cell border.
    #[default]
    Ruled,
    /// Stroke no cell borders. Data passes use this so the template's lines
    /// stay the only visible grid.
    Borderless,
}

/// A line dash pattern: alternating on/off lengths plus a starting phase.
#[derive(Debug, Clone, PartialEq)]
pub struct DashPattern {
    pub segments: Vec<f64>,
    pub phase: f64,
}

impl DashPattern {
    pub fn new(on: f64, off: f64, phase: f64) -> Self {
        Self {
            segments: vec![on, off],
            phase,
        }
    }
}

/// How a line or rectangle outline is stroked.
#[derive(Debug, Clone, PartialEq)]
pub struct Stroke {
    pub width: f64,
    pub color: Color,
    /// `None` strokes a solid line.
    pub dash: Option<DashPattern>,
}

impl Stroke {
    pub fn solid(width: f64) -> Self {
        Self {
            width,
            color: Color::BLACK,
            dash: None,
        }
    }

    pub fn dashed(width: f64, pattern: DashPattern) -> Self {
        Self {
            width,
            color: Color::BLACK,
            dash: Some(pattern),
        }
    }
}

/// Everything needed to put a run of text on the page.
#[derive(Debug, Clone, PartialEq)]
pub struct TextStyle {
    pub font_family: String,
    pub font_style: FontStyle,
    /// Points.
    pub font_size: f64,
    pub color: Color,
}

impl TextStyle {
    pub fn new(family: &str, font_style: FontStyle, font_size: f64) -> Self {
        Self {
            font_family: family.to_string(),
            font_style,
            font_size,
            color: Color::BLACK,
        }
    }
}

/// Line-height multiplier applied to the font size.
pub const LINE_HEIGHT_FACTOR: f64 = 1.15;

/// Points per inch.
pub const PT_PER_INCH: f64 = 72.0;

/// The fully resolved style of a grid, or of a cell after its override.
#[derive(Debug, Clone, PartialEq)]
pub struct CellStyle {
    pub font_family: String,
    pub font_style: FontStyle,
    pub font_size: f64,
    pub text_color: Color,
    pub line_color: Color,
    pub line_width: f64,
    pub min_cell_height: f64,
    pub padding: Edges,
    pub halign: HAlign,
}

impl Default for CellStyle {
    fn default() -> Self {
        Self {
            font_family: "Helvetica".to_string(),
            font_style: FontStyle::Normal,
            font_size: 10.0,
            text_color: Color::BLACK,
            line_color: Color::BLACK,
            line_width: 0.01,
            min_cell_height: 0.0,
            padding: Edges::uniform(0.05),
            halign: HAlign::Left,
        }
    }
}

impl CellStyle {
    /// Height of one line of text in inches.
    pub fn line_height(&self) -> f64 {
        self.font_size / PT_PER_INCH * LINE_HEIGHT_FACTOR
    }

    /// Distance from the top of the text block to the first baseline.
    pub fn first_baseline(&self) -> f64 {
        self.font_size / PT_PER_INCH * (2.0 - LINE_HEIGHT_FACTOR)
    }

    pub fn text_style(&self) -> TextStyle {
        TextStyle {
            font_family: self.font_family.clone(),
            font_style: self.font_style,
            font_size: self.font_size,
            color: self.text_color,
        }
    }

    pub fn border(&self) -> Stroke {
        Stroke {
            width: self.line_width,
            color: self.line_color,
            dash: None,
        }
    }

    /// Merge an override on top of this style.
    pub fn merged(&self, over: &StyleOverride) -> CellStyle {
        CellStyle {
            font_family: over
                .font_family
                .clone()
                .unwrap_or_else(|| self.font_family.clone()),
            font_style: over.font_style.unwrap_or(self.font_style),
            font_size: over.font_size.unwrap_or(self.font_size),
            text_color: over.text_color.unwrap_or(self.text_color),
            line_color: over.line_color.unwrap_or(self.line_color),
            line_width: over.line_width.unwrap_or(self.line_width),
            min_cell_height: over.min_cell_height.unwrap_or(self.min_cell_height),
            padding: over
                .padding
                .map(|p| p.apply(self.padding))
                .unwrap_or(self.padding),
            halign: over.halign.unwrap_or(self.halign),
        }
    }
}

/// Optional per-cell style properties. Unset fields inherit from the grid.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StyleOverride {
    pub font_family: Option<String>,
    pub font_style: Option<FontStyle>,
    pub font_size: Option<f64>,
    pub text_color: Option<Color>,
    pub line_color: Option<Color>,
    pub line_width: Option<f64>,
    pub min_cell_height: Option<f64>,
    pub padding: Option<EdgesOverride>,
    pub halign: Option<HAlign>,
}

impl StyleOverride {
    pub fn font_size(mut self, size: f64) -> Self {
        self.font_size = Some(size);
        self
    }

    pub fn font_style(mut self, style: FontStyle) -> Self {
        self.font_style = Some(style);
        self
    }

    pub fn halign(mut self, halign: HAlign) -> Self {
        self.halign = Some(halign);
        self
    }

    /// Override top, bottom and left padding, keeping the base right edge.
    pub fn padding(mut self, top: f64, bottom: f64, left: f64) -> Self {
        self.padding = Some(EdgesOverride {
            top: Some(top),
            right: None,
            bottom: Some(bottom),
            left: Some(left),
        });
        self
    }

    /// Override only the top and left padding.
    pub fn inset(mut self, top: f64, left: f64) -> Self {
        self.padding = Some(EdgesOverride {
            top: Some(top),
            right: None,
            bottom: None,
            left: Some(left),
        });
        self
    }
}
