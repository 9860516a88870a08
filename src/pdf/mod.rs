//! # PDF Serializer
//!
//! Takes composed pages and writes a PDF 1.7 file.
//!
//! Layout works in inches from the top-left corner; PDF user space is points
//! from the bottom-left. Every coordinate is scaled by 72 and flipped on the
//! way out.
//!
//! ## PDF Structure (simplified)
//!
//! ```text
//! %PDF-1.7            <- header
//! 1 0 obj ... endobj  <- objects (fonts, pages, content streams, etc.)
//! 2 0 obj ... endobj
//! ...
//! xref                <- cross-reference table (byte offsets of each object)
//! trailer             <- points to the root object
//! %%EOF
//! ```
//!
//! ## Font Embedding
//!
//! Standard PDF fonts use simple Type1 references. A registered TrueType face
//! is embedded whole as CIDFontType2 with Identity-H encoding, producing 5 PDF
//! objects: FontFile2, FontDescriptor, CIDFont, ToUnicode CMap, and the root
//! Type0 dictionary.
//!
//! Output carries no timestamps and every map is ordered, so the same pages
//! always serialize to the same bytes.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Write as FmtWrite; // for write! on String
use std::io::Write as IoWrite; // for write! on Vec<u8>

use crate::error::FormError;
use crate::font::{FontContext, FontData, FontKey};
use crate::layout::{DrawCommand, LayoutPage, TextLine};
use crate::model::Metadata;
use crate::style::{Color, Stroke, TextStyle, PT_PER_INCH};
use miniz_oxide::deflate::compress_to_vec_zlib;

const PRODUCER: &str = "faiform";

/// Serializer settings taken from the render options.
#[derive(Debug, Clone, Default)]
pub struct PdfOptions {
    pub compress: bool,
    pub metadata: Metadata,
}

pub struct PdfWriter {
    options: PdfOptions,
}

/// Embedding data for a custom TrueType font.
struct CustomFontEmbedData {
    /// Maps characters to glyph IDs in the embedded font.
    char_to_gid: BTreeMap<char, u16>,
}

/// How text for one font resource is encoded in content streams.
enum FontEncoding {
    WinAnsi,
    /// Symbol fonts: bytes go through unchanged.
    BuiltIn,
    Identity(CustomFontEmbedData),
}

struct FontResource {
    obj_id: usize,
    encoding: FontEncoding,
}

/// Tracks allocated PDF objects during writing.
struct PdfBuilder {
    objects: Vec<PdfObject>,
    /// Resource name index is the position in key order.
    fonts: BTreeMap<FontKey, FontResource>,
}

struct PdfObject {
    data: Vec<u8>,
}

impl PdfBuilder {
    fn push(&mut self, data: Vec<u8>) -> usize {
        self.objects.push(PdfObject { data });
        self.objects.len() - 1
    }

    fn push_stream(&mut self, dict_extra: &str, content: &[u8], compress: bool) -> usize {
        let mut data: Vec<u8> = Vec::new();
        if compress {
            let compressed = compress_to_vec_zlib(content, 6);
            let _ = write!(
                data,
                "<< /Length {}{} /Filter /FlateDecode >>\nstream\n",
                compressed.len(),
                dict_extra
            );
            data.extend_from_slice(&compressed);
        } else {
            let _ = write!(data, "<< /Length {}{} >>\nstream\n", content.len(), dict_extra);
            data.extend_from_slice(content);
        }
        data.extend_from_slice(b"\nendstream");
        self.push(data)
    }

    fn font_index(&self, key: &FontKey) -> Option<(usize, &FontResource)> {
        self.fonts
            .iter()
            .enumerate()
            .find(|(_, (k, _))| *k == key)
            .map(|(i, (_, res))| (i, res))
    }
}

fn pt(inches: f64) -> f64 {
    inches * PT_PER_INCH
}

impl PdfWriter {
    pub fn new(options: PdfOptions) -> Self {
        Self { options }
    }

    /// Write composed pages to a PDF byte vector.
    pub fn write(&self, pages: &[LayoutPage], font_context: &FontContext) -> Result<Vec<u8>, FormError> {
        let mut builder = PdfBuilder {
            objects: Vec::new(),
            fonts: BTreeMap::new(),
        };

        // Reserve object IDs:
        // 0 = placeholder (PDF objects are 1-indexed)
        // 1 = Catalog
        // 2 = Pages (page tree root)
        // 3+ = fonts, then content streams and page objects
        builder.push(vec![]);
        builder.push(vec![]);
        builder.push(vec![]);

        self.register_fonts(&mut builder, pages, font_context)?;
        let font_resources = Self::build_font_resource_dict(&builder);

        let mut page_obj_ids: Vec<usize> = Vec::new();
        for page in pages {
            let content = self.build_content_stream(page, &builder, font_context)?;
            let content_obj_id = builder.push_stream("", content.as_bytes(), self.options.compress);

            let page_dict = format!(
                "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 {:.2} {:.2}] \
                 /Contents {} 0 R /Resources << /Font << {} >> >> >>",
                pt(page.width),
                pt(page.height),
                content_obj_id,
                font_resources
            );
            page_obj_ids.push(builder.push(page_dict.into_bytes()));
        }

        builder.objects[1].data = b"<< /Type /Catalog /Pages 2 0 R >>".to_vec();

        let kids: String = page_obj_ids
            .iter()
            .map(|id| format!("{} 0 R", id))
            .collect::<Vec<_>>()
            .join(" ");
        builder.objects[2].data = format!(
            "<< /Type /Pages /Kids [{}] /Count {} >>",
            kids,
            page_obj_ids.len()
        )
        .into_bytes();

        let info_obj_id = builder.push(self.build_info_dict().into_bytes());
        Ok(Self::serialize(&builder, info_obj_id))
    }

    fn build_info_dict(&self) -> String {
        let metadata = &self.options.metadata;
        let mut info = String::from("<< ");
        for (name, value) in [
            ("Title", &metadata.title),
            ("Author", &metadata.author),
            ("Subject", &metadata.subject),
        ] {
            if let Some(value) = value {
                let _ = write!(info, "/{} ({}) ", name, Self::escape_pdf_string(value));
            }
        }
        let creator = metadata.creator.as_deref().unwrap_or(PRODUCER);
        let _ = write!(
            info,
            "/Creator ({}) /Producer ({} {}) >>",
            Self::escape_pdf_string(creator),
            PRODUCER,
            env!("CARGO_PKG_VERSION")
        );
        info
    }

    /// Build the PDF content stream for a single page.
    fn build_content_stream(
        &self,
        page: &LayoutPage,
        builder: &PdfBuilder,
        font_context: &FontContext,
    ) -> Result<String, FormError> {
        let mut stream = String::new();
        for element in &page.elements {
            self.write_element(&mut stream, element, page.height, builder, font_context)?;
        }
        Ok(stream)
    }

    /// Write a single draw command as PDF operators.
    fn write_element(
        &self,
        stream: &mut String,
        element: &DrawCommand,
        page_height: f64,
        builder: &PdfBuilder,
        font_context: &FontContext,
    ) -> Result<(), FormError> {
        match element {
            DrawCommand::Rect { rect, stroke } => {
                let _ = write!(stream, "q\n");
                Self::write_stroke_state(stream, stroke);
                let _ = write!(
                    stream,
                    "{:.2} {:.2} {:.2} {:.2} re\nS\nQ\n",
                    pt(rect.x),
                    pt(page_height - rect.y - rect.height),
                    pt(rect.width),
                    pt(rect.height)
                );
            }

            DrawCommand::Line { from, to, stroke } => {
                let _ = write!(stream, "q\n");
                Self::write_stroke_state(stream, stroke);
                let _ = write!(
                    stream,
                    "{:.2} {:.2} m\n{:.2} {:.2} l\nS\nQ\n",
                    pt(from.0),
                    pt(page_height - from.1),
                    pt(to.0),
                    pt(page_height - to.1)
                );
            }

            DrawCommand::Text { lines, style } => {
                self.write_text(stream, lines, style, page_height, builder, font_context)?;
            }
        }
        Ok(())
    }

    fn write_stroke_state(stream: &mut String, stroke: &Stroke) {
        let Color { r, g, b } = stroke.color;
        let _ = write!(stream, "{:.3} {:.3} {:.3} RG\n{:.3} w\n", r, g, b, pt(stroke.width));
        if let Some(dash) = &stroke.dash {
            let segments = dash
                .segments
                .iter()
                .map(|s| format!("{:.3}", pt(*s)))
                .collect::<Vec<_>>()
                .join(" ");
            let _ = write!(stream, "[{}] {:.3} d\n", segments, pt(dash.phase));
        }
    }

    fn write_text(
        &self,
        stream: &mut String,
        lines: &[TextLine],
        style: &TextStyle,
        page_height: f64,
        builder: &PdfBuilder,
        font_context: &FontContext,
    ) -> Result<(), FormError> {
        let key = font_context
            .registry()
            .resolve_key(&style.font_family, style.font_style)?;
        let (index, resource) = builder.font_index(&key).ok_or_else(|| {
            FormError::Render(format!("font '{}' was not registered for output", key.family))
        })?;

        let Color { r, g, b } = style.color;
        let _ = write!(
            stream,
            "BT\n{:.3} {:.3} {:.3} rg\n/F{} {:.1} Tf\n",
            r, g, b, index, style.font_size
        );

        for line in lines {
            let _ = write!(
                stream,
                "1 0 0 1 {:.2} {:.2} Tm\n",
                pt(line.x),
                pt(page_height - line.y)
            );
            match &resource.encoding {
                FontEncoding::Identity(embed) => {
                    let mut hex = String::new();
                    for ch in line.text.chars() {
                        let gid = embed.char_to_gid.get(&ch).copied().unwrap_or(0);
                        let _ = write!(hex, "{:04X}", gid);
                    }
                    let _ = write!(stream, "<{}> Tj\n", hex);
                }
                FontEncoding::WinAnsi => {
                    let bytes = line
                        .text
                        .chars()
                        .map(|ch| Self::unicode_to_winansi(ch).unwrap_or(b'?'));
                    let _ = write!(stream, "({}) Tj\n", Self::escape_bytes(bytes));
                }
                FontEncoding::BuiltIn => {
                    let bytes = line
                        .text
                        .chars()
                        .map(|ch| if ch.is_ascii() { ch as u8 } else { b'?' });
                    let _ = write!(stream, "({}) Tj\n", Self::escape_bytes(bytes));
                }
            }
        }

        let _ = write!(stream, "ET\n");
        Ok(())
    }

    /// Register every face the pages draw with. Each resolved face gets one
    /// PDF font object; an unresolvable family fails the document.
    fn register_fonts(
        &self,
        builder: &mut PdfBuilder,
        pages: &[LayoutPage],
        font_context: &FontContext,
    ) -> Result<(), FormError> {
        let mut font_chars: BTreeMap<FontKey, BTreeSet<char>> = BTreeMap::new();
        for page in pages {
            for element in &page.elements {
                if let DrawCommand::Text { lines, style } = element {
                    let key = font_context
                        .registry()
                        .resolve_key(&style.font_family, style.font_style)?;
                    let chars = font_chars.entry(key).or_default();
                    for line in lines {
                        chars.extend(line.text.chars());
                    }
                }
            }
        }

        for (key, chars) in &font_chars {
            let resource = match font_context.resolve(&key.family, key.style)? {
                FontData::Standard(std_font) => {
                    let (dict, encoding) = if std_font.is_symbolic() {
                        (
                            format!("<< /Type /Font /Subtype /Type1 /BaseFont /{} >>", std_font.pdf_name()),
                            FontEncoding::BuiltIn,
                        )
                    } else {
                        (
                            format!(
                                "<< /Type /Font /Subtype /Type1 /BaseFont /{} \
                                 /Encoding /WinAnsiEncoding >>",
                                std_font.pdf_name()
                            ),
                            FontEncoding::WinAnsi,
                        )
                    };
                    FontResource {
                        obj_id: builder.push(dict.into_bytes()),
                        encoding,
                    }
                }
                FontData::Custom { data, metrics } => {
                    let char_to_gid: BTreeMap<char, u16> = chars
                        .iter()
                        .filter_map(|ch| metrics.glyph_ids.get(ch).map(|gid| (*ch, *gid)))
                        .collect();
                    let obj_id = self.write_custom_font_objects(builder, key, data, &char_to_gid)?;
                    FontResource {
                        obj_id,
                        encoding: FontEncoding::Identity(CustomFontEmbedData { char_to_gid }),
                    }
                }
            };
            builder.fonts.insert(key.clone(), resource);
        }

        log::debug!("registered {} PDF font resources", builder.fonts.len());
        Ok(())
    }

    /// Write the 5 CIDFont PDF objects for a custom TrueType font.
    /// Returns the object ID of the Type0 root font dictionary.
    fn write_custom_font_objects(
        &self,
        builder: &mut PdfBuilder,
        key: &FontKey,
        ttf_data: &[u8],
        char_to_gid: &BTreeMap<char, u16>,
    ) -> Result<usize, FormError> {
        let face = ttf_parser::Face::parse(ttf_data, 0).map_err(|e| {
            FormError::Font(format!("Failed to parse TTF data for font '{}': {}", key.family, e))
        })?;

        let units_per_em = face.units_per_em();
        let ascender = face.ascender();
        let descender = face.descender();
        let pdf_font_name = Self::sanitize_font_name(&key.family);

        // 1. FontFile2 stream
        let fontfile2_id = builder.push_stream(
            &format!(" /Length1 {}", ttf_data.len()),
            ttf_data,
            self.options.compress,
        );

        // 2. FontDescriptor
        let bbox = face.global_bounding_box();
        let scale = 1000.0 / units_per_em as f64;
        let bbox_str = format!(
            "[{} {} {} {}]",
            (bbox.x_min as f64 * scale) as i32,
            (bbox.y_min as f64 * scale) as i32,
            (bbox.x_max as f64 * scale) as i32,
            (bbox.y_max as f64 * scale) as i32,
        );
        let cap_height = face.capital_height().unwrap_or(ascender) as f64 * scale;
        let font_descriptor_dict = format!(
            "<< /Type /FontDescriptor /FontName /{} /Flags 4 \
             /FontBBox {} /ItalicAngle {} \
             /Ascent {} /Descent {} /CapHeight {} /StemV {} \
             /FontFile2 {} 0 R >>",
            pdf_font_name,
            bbox_str,
            if key.style.is_italic() { -12 } else { 0 },
            (ascender as f64 * scale) as i32,
            (descender as f64 * scale) as i32,
            cap_height as i32,
            if key.style.is_bold() { 120 } else { 80 },
            fontfile2_id,
        );
        let font_descriptor_id = builder.push(font_descriptor_dict.into_bytes());

        // 3. CIDFont dictionary (DescendantFont)
        let w_array = Self::build_w_array(char_to_gid, &face, units_per_em);
        let default_width = face
            .glyph_hor_advance(ttf_parser::GlyphId(0))
            .map(|adv| (adv as f64 * scale) as u32)
            .unwrap_or(1000);
        let cidfont_dict = format!(
            "<< /Type /Font /Subtype /CIDFontType2 /BaseFont /{} \
             /CIDSystemInfo << /Registry (Adobe) /Ordering (Identity) /Supplement 0 >> \
             /FontDescriptor {} 0 R /DW {} /W {} \
             /CIDToGIDMap /Identity >>",
            pdf_font_name, font_descriptor_id, default_width, w_array,
        );
        let cidfont_id = builder.push(cidfont_dict.into_bytes());

        // 4. ToUnicode CMap
        let cmap_content = Self::build_tounicode_cmap(char_to_gid, &pdf_font_name);
        let tounicode_id = builder.push_stream("", cmap_content.as_bytes(), self.options.compress);

        // 5. Type0 font dictionary (the root, referenced by /Resources)
        let type0_dict = format!(
            "<< /Type /Font /Subtype /Type0 /BaseFont /{} \
             /Encoding /Identity-H \
             /DescendantFonts [{} 0 R] \
             /ToUnicode {} 0 R >>",
            pdf_font_name, cidfont_id, tounicode_id,
        );
        Ok(builder.push(type0_dict.into_bytes()))
    }

    /// Build the /W array for per-glyph widths in CIDFont.
    /// Format: [gid [width] gid [width] ...]
    fn build_w_array(
        char_to_gid: &BTreeMap<char, u16>,
        face: &ttf_parser::Face,
        units_per_em: u16,
    ) -> String {
        let scale = 1000.0 / units_per_em as f64;
        let gids: BTreeSet<u16> = char_to_gid.values().copied().collect();

        let mut result = String::from("[");
        for gid in gids {
            let advance = face.glyph_hor_advance(ttf_parser::GlyphId(gid)).unwrap_or(0);
            let _ = write!(result, " {} [{}]", gid, (advance as f64 * scale) as u32);
        }
        result.push_str(" ]");
        result
    }

    /// Build a ToUnicode CMap for text extraction/copy-paste support.
    fn build_tounicode_cmap(char_to_gid: &BTreeMap<char, u16>, font_name: &str) -> String {
        let mut gid_to_unicode: Vec<(u16, u32)> = char_to_gid
            .iter()
            .map(|(&ch, &gid)| (gid, ch as u32))
            .collect();
        gid_to_unicode.sort();
        gid_to_unicode.dedup_by_key(|(gid, _)| *gid);

        let mut cmap = String::new();
        let _ = write!(cmap, "/CIDInit /ProcSet findresource begin\n");
        let _ = write!(cmap, "12 dict begin\n");
        let _ = write!(cmap, "begincmap\n");
        let _ = write!(cmap, "/CIDSystemInfo\n");
        let _ = write!(cmap, "<< /Registry (Adobe) /Ordering (UCS) /Supplement 0 >> def\n");
        let _ = write!(cmap, "/CMapName /{}-UTF16 def\n", font_name);
        let _ = write!(cmap, "/CMapType 2 def\n");
        let _ = write!(cmap, "1 begincodespacerange\n");
        let _ = write!(cmap, "<0000> <FFFF>\n");
        let _ = write!(cmap, "endcodespacerange\n");

        // PDF limits beginbfchar to 100 entries per block
        for chunk in gid_to_unicode.chunks(100) {
            let _ = write!(cmap, "{} beginbfchar\n", chunk.len());
            for &(gid, unicode) in chunk {
                let _ = write!(cmap, "<{:04X}> <{:04X}>\n", gid, unicode);
            }
            let _ = write!(cmap, "endbfchar\n");
        }

        let _ = write!(cmap, "endcmap\n");
        let _ = write!(cmap, "CMapName currentdict /CMap defineresource pop\n");
        let _ = write!(cmap, "end\n");
        let _ = write!(cmap, "end\n");

        cmap
    }

    /// Sanitize a family name for use as a PDF name object.
    fn sanitize_font_name(family: &str) -> String {
        let name: String = family
            .chars()
            .filter(|c| c.is_ascii_alphanumeric() || *c == '-' || *c == '_')
            .collect();
        if name.is_empty() {
            "CustomFont".to_string()
        } else {
            name
        }
    }

    fn build_font_resource_dict(builder: &PdfBuilder) -> String {
        builder
            .fonts
            .values()
            .enumerate()
            .map(|(i, res)| format!("/F{} {} 0 R", i, res.obj_id))
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Escape special characters in a PDF string.
    fn escape_pdf_string(s: &str) -> String {
        s.replace('\\', "\\\\")
            .replace('(', "\\(")
            .replace(')', "\\)")
    }

    /// Escape encoded bytes for a literal string, octal-escaping anything
    /// outside printable ASCII.
    fn escape_bytes(bytes: impl Iterator<Item = u8>) -> String {
        let mut out = String::new();
        for b in bytes {
            match b {
                b'\\' => out.push_str("\\\\"),
                b'(' => out.push_str("\\("),
                b')' => out.push_str("\\)"),
                0x20..=0x7E => out.push(b as char),
                _ => {
                    let _ = write!(out, "\\{:03o}", b);
                }
            }
        }
        out
    }

    /// Map a Unicode codepoint to a WinAnsiEncoding byte value.
    ///
    /// WinAnsiEncoding is based on Windows-1252. Most codepoints in
    /// 0x20..=0x7E and 0xA0..=0xFF map directly. The 0x80..=0x9F range
    /// contains special mappings for smart quotes, bullets, dashes, etc.
    fn unicode_to_winansi(ch: char) -> Option<u8> {
        let cp = ch as u32;
        if (0x20..=0x7E).contains(&cp) || (0xA0..=0xFF).contains(&cp) {
            return Some(cp as u8);
        }
        match cp {
            0x20AC => Some(0x80), // Euro sign
            0x201A => Some(0x82), // Single low-9 quotation mark
            0x0192 => Some(0x83), // Latin small letter f with hook
            0x201E => Some(0x84), // Double low-9 quotation mark
            0x2026 => Some(0x85), // Horizontal ellipsis
            0x2020 => Some(0x86), // Dagger
            0x2021 => Some(0x87), // Double dagger
            0x02C6 => Some(0x88), // Modifier letter circumflex accent
            0x2030 => Some(0x89), // Per mille sign
            0x0160 => Some(0x8A), // Latin capital letter S with caron
            0x2039 => Some(0x8B), // Single left-pointing angle quotation
            0x0152 => Some(0x8C), // Latin capital ligature OE
            0x017D => Some(0x8E), // Latin capital letter Z with caron
            0x2018 => Some(0x91), // Left single quotation mark
            0x2019 => Some(0x92), // Right single quotation mark
            0x201C => Some(0x93), // Left double quotation mark
            0x201D => Some(0x94), // Right double quotation mark
            0x2022 => Some(0x95), // Bullet
            0x2013 => Some(0x96), // En dash
            0x2014 => Some(0x97), // Em dash
            0x02DC => Some(0x98), // Small tilde
            0x2122 => Some(0x99), // Trade mark sign
            0x0161 => Some(0x9A), // Latin small letter s with caron
            0x203A => Some(0x9B), // Single right-pointing angle quotation
            0x0153 => Some(0x9C), // Latin small ligature oe
            0x017E => Some(0x9E), // Latin small letter z with caron
            0x0178 => Some(0x9F), // Latin capital letter Y with diaeresis
            _ => None,
        }
    }

    /// Serialize all objects into the final PDF byte stream.
    fn serialize(builder: &PdfBuilder, info_obj_id: usize) -> Vec<u8> {
        let mut output: Vec<u8> = Vec::new();
        let mut offsets: Vec<usize> = vec![0; builder.objects.len()];

        output.extend_from_slice(b"%PDF-1.7\n");
        output.extend_from_slice(b"%\xe2\xe3\xcf\xd3\n");

        for (i, obj) in builder.objects.iter().enumerate().skip(1) {
            offsets[i] = output.len();
            let header = format!("{} 0 obj\n", i);
            output.extend_from_slice(header.as_bytes());
            output.extend_from_slice(&obj.data);
            output.extend_from_slice(b"\nendobj\n\n");
        }

        let xref_offset = output.len();
        let _ = write!(output, "xref\n0 {}\n", builder.objects.len());
        let _ = write!(output, "0000000000 65535 f \n");
        for offset in offsets.iter().skip(1) {
            let _ = write!(output, "{:010} 00000 n \n", offset);
        }

        let _ = write!(
            output,
            "trailer\n<< /Size {} /Root 1 0 R /Info {} 0 R >>\nstartxref\n{}\n%%EOF\n",
            builder.objects.len(),
            info_obj_id,
            xref_offset
        );

        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::font::{DINGBATS_FAMILY, SIGNATURE_FAMILY};
    use crate::layout::{Rect, PAGE_HEIGHT, PAGE_WIDTH};
    use crate::style::{DashPattern, FontStyle};

    fn page(elements: Vec<DrawCommand>) -> LayoutPage {
        LayoutPage {
            index: 1,
            width: PAGE_WIDTH,
            height: PAGE_HEIGHT,
            elements,
        }
    }

    fn text(s: &str, family: &str, style: FontStyle) -> DrawCommand {
        DrawCommand::Text {
            lines: vec![TextLine {
                x: 1.0,
                y: 1.0,
                text: s.to_string(),
                width: 0.0,
            }],
            style: TextStyle::new(family, style, 10.0),
        }
    }

    fn uncompressed() -> PdfWriter {
        PdfWriter::new(PdfOptions {
            compress: false,
            metadata: Metadata::default(),
        })
    }

    fn write_lossy(writer: &PdfWriter, pages: &[LayoutPage], ctx: &FontContext) -> String {
        String::from_utf8_lossy(&writer.write(pages, ctx).unwrap()).into_owned()
    }

    #[test]
    fn test_escape_pdf_string() {
        assert_eq!(PdfWriter::escape_pdf_string("Hello (World)"), "Hello \\(World\\)");
        assert_eq!(PdfWriter::escape_pdf_string("back\\slash"), "back\\\\slash");
    }

    #[test]
    fn test_empty_document_produces_valid_pdf() {
        let bytes = uncompressed().write(&[page(vec![])], &FontContext::new()).unwrap();
        assert!(bytes.starts_with(b"%PDF-1.7"));
        assert!(bytes.windows(5).any(|w| w == b"%%EOF"));
        assert!(bytes.windows(4).any(|w| w == b"xref"));
        assert!(bytes.windows(7).any(|w| w == b"trailer"));
    }

    #[test]
    fn letter_page_is_612_by_792_points() {
        let text = write_lossy(&uncompressed(), &[page(vec![])], &FontContext::new());
        assert!(text.contains("/MediaBox [0 0 612.00 792.00]"));
    }

    #[test]
    fn test_metadata_in_pdf() {
        let writer = PdfWriter::new(PdfOptions {
            compress: false,
            metadata: Metadata {
                title: Some("FAI 482913".to_string()),
                author: Some("Quality (QA)".to_string()),
                subject: None,
                creator: None,
            },
        });
        let text = write_lossy(&writer, &[page(vec![])], &FontContext::new());
        assert!(text.contains("/Title (FAI 482913)"));
        assert!(text.contains("/Author (Quality \\(QA\\))"));
        assert!(text.contains("/Creator (faiform)"));
        assert!(!text.contains("CreationDate"));
    }

    #[test]
    fn coordinates_are_scaled_and_flipped() {
        let rect = DrawCommand::Rect {
            rect: Rect::new(1.0, 1.0, 2.0, 0.5),
            stroke: Stroke::solid(0.01),
        };
        let text = write_lossy(&uncompressed(), &[page(vec![rect])], &FontContext::new());
        // y = 792 - 72 - 36
        assert!(text.contains("72.00 684.00 144.00 36.00 re\nS"));
        assert!(text.contains("0.720 w"));
    }

    #[test]
    fn dashed_line_sets_dash_pattern() {
        let line = DrawCommand::Line {
            from: (1.0, 1.0),
            to: (2.0, 1.0),
            stroke: Stroke::dashed(0.01, DashPattern::new(0.03, 0.03, 0.015)),
        };
        let text = write_lossy(&uncompressed(), &[page(vec![line])], &FontContext::new());
        assert!(text.contains("[2.160 2.160] 1.080 d"));
        assert!(text.contains("72.00 720.00 m\n144.00 720.00 l\nS"));
    }

    #[test]
    fn bold_font_registered_separately() {
        let pages = [page(vec![
            text("A", "Helvetica", FontStyle::Normal),
            text("A", "Helvetica", FontStyle::Bold),
        ])];
        let text = write_lossy(&uncompressed(), &pages, &FontContext::new());
        assert!(text.contains("/BaseFont /Helvetica /Encoding"));
        assert!(text.contains("/BaseFont /Helvetica-Bold"));
        assert!(text.contains("/F1 "));
    }

    #[test]
    fn dingbats_has_no_text_encoding() {
        let pages = [page(vec![text("4", DINGBATS_FAMILY, FontStyle::Normal)])];
        let text = write_lossy(&uncompressed(), &pages, &FontContext::new());
        assert!(text.contains("<< /Type /Font /Subtype /Type1 /BaseFont /ZapfDingbats >>"));
        assert!(text.contains("(4) Tj"));
    }

    #[test]
    fn curly_quotes_use_winansi_bytes() {
        let pages = [page(vec![text("\u{201C}INDEX\u{201D}", "Helvetica", FontStyle::Italic)])];
        let text = write_lossy(&uncompressed(), &pages, &FontContext::new());
        assert!(text.contains("(\\223INDEX\\224) Tj"));
    }

    #[test]
    fn signature_alias_writes_times_italic() {
        let pages = [page(vec![text("Dana Whitfield", SIGNATURE_FAMILY, FontStyle::Normal)])];
        let text = write_lossy(&uncompressed(), &pages, &FontContext::new());
        assert!(text.contains("/BaseFont /Times-Italic"));
        assert!(!text.contains("CIDFontType2"));
    }

    #[test]
    fn unregistered_family_fails_the_document() {
        let pages = [page(vec![text("Dana Whitfield", SIGNATURE_FAMILY, FontStyle::Normal)])];
        let err = uncompressed().write(&pages, &FontContext::standard_only()).unwrap_err();
        assert!(matches!(err, FormError::MissingFont { .. }));
    }

    #[test]
    fn same_pages_same_bytes() {
        let ctx = FontContext::new();
        let pages = [page(vec![
            text("B", "Courier", FontStyle::Bold),
            text("A", "Helvetica", FontStyle::Normal),
            text("4", DINGBATS_FAMILY, FontStyle::Normal),
        ])];
        let writer = PdfWriter::new(PdfOptions {
            compress: true,
            metadata: Metadata::default(),
        });
        assert_eq!(writer.write(&pages, &ctx).unwrap(), writer.write(&pages, &ctx).unwrap());
    }

    #[test]
    fn test_sanitize_font_name() {
        assert_eq!(PdfWriter::sanitize_font_name("Signature"), "Signature");
        assert_eq!(PdfWriter::sanitize_font_name("Noto Sans"), "NotoSans");
        assert_eq!(PdfWriter::sanitize_font_name("(  )"), "CustomFont");
    }

    #[test]
    fn test_tounicode_cmap_format() {
        let mut char_to_gid = BTreeMap::new();
        char_to_gid.insert('A', 36u16);
        char_to_gid.insert('B', 37u16);

        let cmap = PdfWriter::build_tounicode_cmap(&char_to_gid, "Signature");
        assert!(cmap.contains("begincmap"));
        assert!(cmap.contains("2 beginbfchar"));
        assert!(cmap.contains("<0024> <0041>"));
        assert!(cmap.contains("<0025> <0042>"));
        assert!(cmap.contains("<0000> <FFFF>"));
        assert!(cmap.contains("/CMapName /Signature-UTF16 def"));
    }
}
