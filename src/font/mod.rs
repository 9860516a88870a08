//! # Font Management
//!
//! A per-render registry mapping family + style to font data.
//!
//! The standard PDF fonts need no embedding. The custom-named `Signature`
//! style starts out as an alias for Times-Italic and becomes an embedded
//! TrueType face once one is registered under that name. A family that was
//! never registered is a missing resource and fails the render.

pub mod metrics;

pub use metrics::StandardFontMetrics;

use std::collections::{BTreeMap, HashMap};

use crate::error::FormError;
use crate::style::FontStyle;

/// Family name of the handwriting-style face used by signature fields.
pub const SIGNATURE_FAMILY: &str = "Signature";

/// Family name of the symbol font that supplies the check glyph.
pub const DINGBATS_FAMILY: &str = "ZapfDingbats";

#[derive(Debug, Clone, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct FontKey {
    pub family: String,
    pub style: FontStyle,
}

impl FontKey {
    pub fn new(family: &str, style: FontStyle) -> Self {
        Self {
            family: family.to_string(),
            style,
        }
    }
}

#[derive(Debug, Clone)]
pub enum FontData {
    /// One of the 14 standard PDF fonts. No embedding needed.
    Standard(StandardFont),
    /// A TrueType face embedded into the output.
    Custom {
        data: Vec<u8>,
        metrics: CustomFontMetrics,
    },
}

/// Parsed metrics from a TrueType face via ttf-parser.
#[derive(Debug, Clone)]
pub struct CustomFontMetrics {
    pub units_per_em: u16,
    pub advance_widths: HashMap<char, u16>,
    pub default_advance: u16,
    pub ascender: i16,
    pub descender: i16,
    /// Maps characters to their glyph IDs.
    pub glyph_ids: HashMap<char, u16>,
}

impl CustomFontMetrics {
    /// Advance width of a character in points.
    pub fn char_width(&self, ch: char, font_size: f64) -> f64 {
        let w = self
            .advance_widths
            .get(&ch)
            .copied()
            .unwrap_or(self.default_advance);
        (w as f64 / self.units_per_em as f64) * font_size
    }

    /// Parse metrics for the Latin range from raw TrueType data.
    pub fn from_font_data(data: &[u8]) -> Result<Self, FormError> {
        let face = ttf_parser::Face::parse(data, 0)
            .map_err(|e| FormError::Font(format!("Failed to parse TrueType data: {}", e)))?;
        let units_per_em = face.units_per_em();

        let mut advance_widths = HashMap::new();
        let mut glyph_ids = HashMap::new();
        let mut default_advance = 0u16;

        // Form content is Latin text; the remaining planes are never drawn.
        for code in (0x20u32..=0x024F).chain(0x2000..=0x206F) {
            if let Some(ch) = char::from_u32(code) {
                if let Some(glyph_id) = face.glyph_index(ch) {
                    let advance = face.glyph_hor_advance(glyph_id).unwrap_or(0);
                    advance_widths.insert(ch, advance);
                    glyph_ids.insert(ch, glyph_id.0);
                    if ch == ' ' {
                        default_advance = advance;
                    }
                }
            }
        }

        if default_advance == 0 {
            default_advance = units_per_em / 2;
        }

        Ok(CustomFontMetrics {
            units_per_em,
            advance_widths,
            default_advance,
            ascender: face.ascender(),
            descender: face.descender(),
            glyph_ids,
        })
    }
}

/// The 14 standard PDF fonts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StandardFont {
    Helvetica,
    HelveticaBold,
    HelveticaOblique,
    HelveticaBoldOblique,
    TimesRoman,
    TimesBold,
    TimesItalic,
    TimesBoldItalic,
    Courier,
    CourierBold,
    CourierOblique,
    CourierBoldOblique,
    Symbol,
    ZapfDingbats,
}

impl StandardFont {
    /// The PDF name for this font.
    pub fn pdf_name(&self) -> &'static str {
        match self {
            Self::Helvetica => "Helvetica",
            Self::HelveticaBold => "Helvetica-Bold",
            Self::HelveticaOblique => "Helvetica-Oblique",
            Self::HelveticaBoldOblique => "Helvetica-BoldOblique",
            Self::TimesRoman => "Times-Roman",
            Self::TimesBold => "Times-Bold",
            Self::TimesItalic => "Times-Italic",
            Self::TimesBoldItalic => "Times-BoldItalic",
            Self::Courier => "Courier",
            Self::CourierBold => "Courier-Bold",
            Self::CourierOblique => "Courier-Oblique",
            Self::CourierBoldOblique => "Courier-BoldOblique",
            Self::Symbol => "Symbol",
            Self::ZapfDingbats => "ZapfDingbats",
        }
    }

    /// Symbol fonts carry their own built-in encoding.
    pub fn is_symbolic(&self) -> bool {
        matches!(self, Self::Symbol | Self::ZapfDingbats)
    }

    pub fn metrics(&self) -> StandardFontMetrics {
        match self {
            Self::Helvetica | Self::HelveticaOblique => StandardFontMetrics::HELVETICA,
            Self::HelveticaBold | Self::HelveticaBoldOblique => StandardFontMetrics::HELVETICA_BOLD,
            Self::Courier | Self::CourierBold | Self::CourierOblique | Self::CourierBoldOblique => {
                StandardFontMetrics::Fixed(600)
            }
            // Times is measured with Helvetica widths; it is only drawn at
            // fixed offsets, never wrapped.
            Self::TimesRoman | Self::TimesItalic => StandardFontMetrics::HELVETICA,
            Self::TimesBold | Self::TimesBoldItalic => StandardFontMetrics::HELVETICA_BOLD,
            Self::Symbol | Self::ZapfDingbats => StandardFontMetrics::Fixed(788),
        }
    }
}

/// A font registry that maps font family + style to font data.
#[derive(Debug, Clone)]
pub struct FontRegistry {
    fonts: BTreeMap<FontKey, FontData>,
}

impl FontRegistry {
    /// A registry holding the standard fonts only.
    pub fn empty_standard() -> Self {
        let mut fonts = BTreeMap::new();

        let standard_mappings = [
            (("Helvetica", FontStyle::Normal), StandardFont::Helvetica),
            (("Helvetica", FontStyle::Bold), StandardFont::HelveticaBold),
            (("Helvetica", FontStyle::Italic), StandardFont::HelveticaOblique),
            (("Helvetica", FontStyle::BoldItalic), StandardFont::HelveticaBoldOblique),
            (("Times", FontStyle::Normal), StandardFont::TimesRoman),
            (("Times", FontStyle::Bold), StandardFont::TimesBold),
            (("Times", FontStyle::Italic), StandardFont::TimesItalic),
            (("Times", FontStyle::BoldItalic), StandardFont::TimesBoldItalic),
            (("Courier", FontStyle::Normal), StandardFont::Courier),
            (("Courier", FontStyle::Bold), StandardFont::CourierBold),
            (("Courier", FontStyle::Italic), StandardFont::CourierOblique),
            (("Courier", FontStyle::BoldItalic), StandardFont::CourierBoldOblique),
            (("Symbol", FontStyle::Normal), StandardFont::Symbol),
            ((DINGBATS_FAMILY, FontStyle::Normal), StandardFont::ZapfDingbats),
        ];

        for ((family, style), font) in standard_mappings {
            fonts.insert(FontKey::new(family, style), FontData::Standard(font));
        }

        Self { fonts }
    }

    /// Look up a face. A family's normal face stands in for styles it lacks.
    pub fn resolve(&self, family: &str, style: FontStyle) -> Result<&FontData, FormError> {
        if let Some(font) = self.fonts.get(&FontKey::new(family, style)) {
            return Ok(font);
        }
        self.fonts
            .get(&FontKey::new(family, FontStyle::Normal))
            .ok_or_else(|| FormError::MissingFont {
                family: family.to_string(),
            })
    }

    /// Resolve to the key the face is registered under.
    pub fn resolve_key(&self, family: &str, style: FontStyle) -> Result<FontKey, FormError> {
        let exact = FontKey::new(family, style);
        if self.fonts.contains_key(&exact) {
            return Ok(exact);
        }
        let normal = FontKey::new(family, FontStyle::Normal);
        if self.fonts.contains_key(&normal) {
            return Ok(normal);
        }
        Err(FormError::MissingFont {
            family: family.to_string(),
        })
    }

    pub fn insert(&mut self, key: FontKey, data: FontData) {
        self.fonts.insert(key, data);
    }

    /// Iterate over all registered fonts in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&FontKey, &FontData)> {
        self.fonts.iter()
    }
}

/// Font context owned by one render: measurement for layout, font data for
/// serialization.
#[derive(Debug, Clone)]
pub struct FontContext {
    registry: FontRegistry,
}

impl Default for FontContext {
    fn default() -> Self {
        Self::new()
    }
}

impl FontContext {
    /// Standard fonts plus the `Signature` alias.
    pub fn new() -> Self {
        let mut registry = FontRegistry::empty_standard();
        registry.insert(
            FontKey::new(SIGNATURE_FAMILY, FontStyle::Normal),
            FontData::Standard(StandardFont::TimesItalic),
        );
        Self { registry }
    }

    /// Standard fonts only; `Signature` stays unresolved until registered.
    pub fn standard_only() -> Self {
        Self {
            registry: FontRegistry::empty_standard(),
        }
    }

    /// Register a TrueType face under `family` (normal style).
    pub fn register_ttf(&mut self, family: &str, data: Vec<u8>) -> Result<(), FormError> {
        let metrics = CustomFontMetrics::from_font_data(&data)?;
        log::debug!(
            "registered TrueType face '{}' ({} bytes, {} mapped chars)",
            family,
            data.len(),
            metrics.glyph_ids.len()
        );
        self.registry.insert(
            FontKey::new(family, FontStyle::Normal),
            FontData::Custom { data, metrics },
        );
        Ok(())
    }

    /// Advance width of a single character in points.
    pub fn char_width(
        &self,
        ch: char,
        family: &str,
        style: FontStyle,
        font_size: f64,
    ) -> Result<f64, FormError> {
        Ok(match self.registry.resolve(family, style)? {
            FontData::Standard(std_font) => std_font.metrics().char_width(ch, font_size),
            FontData::Custom { metrics, .. } => metrics.char_width(ch, font_size),
        })
    }

    /// Width of a string in points.
    pub fn measure_string(
        &self,
        text: &str,
        family: &str,
        style: FontStyle,
        font_size: f64,
    ) -> Result<f64, FormError> {
        Ok(match self.registry.resolve(family, style)? {
            FontData::Standard(std_font) => std_font.metrics().measure_string(text, font_size),
            FontData::Custom { metrics, .. } => {
                text.chars().map(|ch| metrics.char_width(ch, font_size)).sum()
            }
        })
    }

    pub fn resolve(&self, family: &str, style: FontStyle) -> Result<&FontData, FormError> {
        self.registry.resolve(family, style)
    }

    pub fn registry(&self) -> &FontRegistry {
        &self.registry
    }
}
