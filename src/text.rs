//! Text collaborator: font resources and the `TextSource` interface.
//!
//! The canvas never shapes text itself. A `TextSource` decomposes into
//! filled paths with colors, and may optionally render itself as native
//! SVG text. With the `font` feature, `TextLine` provides a single line of
//! text laid out from TrueType/OpenType glyph outlines via `ttf-parser`.

use std::fmt;
use std::sync::Arc;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;

use crate::color::Rgba8;
use crate::path::Path;

// ============================================================================
// Font
// ============================================================================

/// A font file embedded by the SVG backend. Identity is `Arc` pointer
/// identity: two loads of the same bytes are two fonts.
#[derive(Clone, PartialEq, Eq)]
pub struct Font {
    name: String,
    mimetype: String,
    data: Vec<u8>,
}

impl Font {
    /// Wrap raw font bytes. The mimetype is sniffed from the magic number.
    pub fn new(name: impl Into<String>, data: Vec<u8>) -> Self {
        let mimetype = sniff_mimetype(&data).to_string();
        Self {
            name: name.into(),
            mimetype,
            data,
        }
    }

    pub fn with_mimetype(name: impl Into<String>, mimetype: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            mimetype: mimetype.into(),
            data,
        }
    }

    /// Wrap font bytes after checking that they parse as a font face.
    #[cfg(feature = "font")]
    pub fn parse(name: impl Into<String>, data: Vec<u8>) -> crate::error::Result<Self> {
        ttf_parser::Face::parse(&data, 0)
            .map_err(|e| crate::error::Error::Font(e.to_string()))?;
        Ok(Self::new(name, data))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn mimetype(&self) -> &str {
        &self.mimetype
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// `data:` URI with the base64-encoded font, for `@font-face` rules.
    pub fn to_data_uri(&self) -> String {
        format!("data:{};base64,{}", self.mimetype, STANDARD.encode(&self.data))
    }

    #[cfg(feature = "font")]
    fn face(&self) -> Option<ttf_parser::Face<'_>> {
        ttf_parser::Face::parse(&self.data, 0).ok()
    }

    #[cfg(feature = "font")]
    pub fn units_per_em(&self) -> Option<u16> {
        self.face().map(|f| f.units_per_em())
    }
}

impl fmt::Debug for Font {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Font")
            .field("name", &self.name)
            .field("mimetype", &self.mimetype)
            .field("len", &self.data.len())
            .finish()
    }
}

fn sniff_mimetype(data: &[u8]) -> &'static str {
    match data.get(..4) {
        Some(b"wOFF") => "font/woff",
        Some(b"wOF2") => "font/woff2",
        Some(b"OTTO") => "font/otf",
        Some(b"ttcf") => "font/collection",
        Some([0, 1, 0, 0]) | Some(b"true") => "font/ttf",
        _ => "application/octet-stream",
    }
}

// ============================================================================
// TextSource
// ============================================================================

/// Text that the canvas can place and export.
pub trait TextSource: fmt::Debug + Send + Sync {
    /// Fonts the SVG backend embeds for this text.
    fn fonts(&self) -> Vec<Arc<Font>>;

    /// Filled outlines in text space (origin at the baseline start, y up)
    /// and the fill color of each.
    fn to_paths(&self) -> (Vec<Path>, Vec<Rgba8>);

    /// Native SVG markup placed at document-space `(x, y)` (y down) and
    /// rotated by `rotation` degrees counter-clockwise. `None` makes the SVG
    /// backend fall back to the outlines of [`TextSource::to_paths`].
    fn to_svg(&self, _x: f64, _y: f64, _rotation: f64) -> Option<String> {
        None
    }
}

/// Escape the five XML special characters.
pub fn escape_xml(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

// ============================================================================
// TextLine
// ============================================================================

/// A single line of text in one font, size and color.
///
/// Glyphs are placed by their horizontal advances. There is no shaping,
/// kerning or line breaking.
#[cfg(feature = "font")]
#[derive(Debug, Clone)]
pub struct TextLine {
    font: Arc<Font>,
    size: f64,
    color: Rgba8,
    text: String,
}

#[cfg(feature = "font")]
impl TextLine {
    /// `size` is the em height in document units.
    pub fn new(
        font: Arc<Font>,
        size: f64,
        color: Rgba8,
        text: impl Into<String>,
    ) -> crate::error::Result<Self> {
        if font.face().is_none() {
            return Err(crate::error::Error::Font(format!(
                "font '{}' has no parseable face",
                font.name()
            )));
        }
        Ok(Self {
            font,
            size,
            color,
            text: text.into(),
        })
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Sum of glyph advances in document units.
    pub fn width(&self) -> f64 {
        let Some(face) = self.font.face() else {
            return 0.0;
        };
        let scale = self.size / face.units_per_em() as f64;
        self.text
            .chars()
            .filter_map(|c| face.glyph_index(c))
            .map(|g| face.glyph_hor_advance(g).unwrap_or(0) as f64 * scale)
            .sum()
    }

    fn outline(&self) -> Path {
        let Some(face) = self.font.face() else {
            return Path::new();
        };
        let scale = self.size / face.units_per_em() as f64;
        let mut builder = OutlineCollector {
            path: Path::new(),
            scale,
            x: 0.0,
        };
        for c in self.text.chars() {
            let Some(glyph) = face.glyph_index(c) else {
                log::trace!("no glyph for {c:?} in font '{}'", self.font.name());
                continue;
            };
            face.outline_glyph(glyph, &mut builder);
            builder.x += face.glyph_hor_advance(glyph).unwrap_or(0) as f64 * scale;
        }
        builder.path
    }
}

#[cfg(feature = "font")]
impl TextSource for TextLine {
    fn fonts(&self) -> Vec<Arc<Font>> {
        vec![self.font.clone()]
    }

    fn to_paths(&self) -> (Vec<Path>, Vec<Rgba8>) {
        let path = self.outline();
        if path.is_empty() {
            return (Vec::new(), Vec::new());
        }
        (vec![path], vec![self.color])
    }

    fn to_svg(&self, x: f64, y: f64, rotation: f64) -> Option<String> {
        use crate::path::Num;

        let mut s = format!(
            "<text x=\"{}\" y=\"{}\" font-family=\"{}\" font-size=\"{}\"",
            Num(x),
            Num(y),
            escape_xml(self.font.name()),
            Num(self.size)
        );
        if rotation != 0.0 {
            s.push_str(&format!(
                " transform=\"rotate({} {} {})\"",
                Num(-rotation),
                Num(x),
                Num(y)
            ));
        }
        if self.color != Rgba8::BLACK {
            s.push_str(&format!(" fill=\"{}\"", self.color.to_css()));
        }
        s.push('>');
        s.push_str(&escape_xml(&self.text));
        s.push_str("</text>");
        Some(s)
    }
}

/// Collects glyph outline commands into a `Path`, scaled from font units
/// and shifted by the pen position.
#[cfg(feature = "font")]
struct OutlineCollector {
    path: Path,
    scale: f64,
    x: f64,
}

#[cfg(feature = "font")]
impl OutlineCollector {
    #[inline]
    fn sx(&self, v: f32) -> f64 {
        self.x + v as f64 * self.scale
    }

    #[inline]
    fn sy(&self, v: f32) -> f64 {
        v as f64 * self.scale
    }
}

#[cfg(feature = "font")]
impl ttf_parser::OutlineBuilder for OutlineCollector {
    fn move_to(&mut self, x: f32, y: f32) {
        let (x, y) = (self.sx(x), self.sy(y));
        self.path.move_to(x, y);
    }

    fn line_to(&mut self, x: f32, y: f32) {
        let (x, y) = (self.sx(x), self.sy(y));
        self.path.line_to(x, y);
    }

    fn quad_to(&mut self, x1: f32, y1: f32, x: f32, y: f32) {
        let (cx, cy, x, y) = (self.sx(x1), self.sy(y1), self.sx(x), self.sy(y));
        self.path.quad_to(cx, cy, x, y);
    }

    fn curve_to(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, x: f32, y: f32) {
        let (c1x, c1y) = (self.sx(x1), self.sy(y1));
        let (c2x, c2y) = (self.sx(x2), self.sy(y2));
        let (x, y) = (self.sx(x), self.sy(y));
        self.path.cube_to(c1x, c1y, c2x, c2y, x, y);
    }

    fn close(&mut self) {
        self.path.close();
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sniff_mimetype() {
        assert_eq!(sniff_mimetype(b"wOFF...."), "font/woff");
        assert_eq!(sniff_mimetype(b"wOF2...."), "font/woff2");
        assert_eq!(sniff_mimetype(b"OTTO...."), "font/otf");
        assert_eq!(sniff_mimetype(&[0, 1, 0, 0, 9]), "font/ttf");
        assert_eq!(sniff_mimetype(b"ab"), "application/octet-stream");
    }

    #[test]
    fn test_data_uri() {
        let f = Font::new("Test", b"wOFFabc".to_vec());
        assert_eq!(f.name(), "Test");
        assert_eq!(f.to_data_uri(), "data:font/woff;base64,d09GRmFiYw==");
    }

    #[test]
    fn test_explicit_mimetype() {
        let f = Font::with_mimetype("X", "font/sfnt", vec![1, 2, 3]);
        assert_eq!(f.mimetype(), "font/sfnt");
        assert_eq!(f.data(), &[1, 2, 3]);
    }

    #[test]
    fn test_escape_xml() {
        assert_eq!(escape_xml("a<b & \"c\">"), "a&lt;b &amp; &quot;c&quot;&gt;");
        assert_eq!(escape_xml("plain"), "plain");
    }

    #[derive(Debug)]
    struct Box2;

    impl TextSource for Box2 {
        fn fonts(&self) -> Vec<Arc<Font>> {
            Vec::new()
        }
        fn to_paths(&self) -> (Vec<Path>, Vec<Rgba8>) {
            (vec![Path::rectangle(1.0, 1.0)], vec![Rgba8::RED])
        }
    }

    #[test]
    fn test_default_svg_is_none() {
        assert!(Box2.to_svg(0.0, 0.0, 0.0).is_none());
        let (paths, colors) = Box2.to_paths();
        assert_eq!(paths.len(), colors.len());
    }

    #[cfg(feature = "font")]
    #[test]
    fn test_parse_rejects_garbage() {
        assert!(matches!(
            Font::parse("bad", vec![0; 16]),
            Err(crate::error::Error::Font(_))
        ));
        let f = Arc::new(Font::new("bad", vec![0; 16]));
        assert!(TextLine::new(f, 10.0, Rgba8::BLACK, "hi").is_err());
    }
}
