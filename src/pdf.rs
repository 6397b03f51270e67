//! PDF backend.
//!
//! `PdfWriter` produces a minimal PDF 1.7 file: catalog, page tree, one
//! uncompressed content stream per page, `ExtGState` resources for alpha,
//! and a cross-reference table. `PdfPage` implements [`PageSink`] and
//! drops state operators that would not change the graphics state.
//!
//! Layers are painted with native fill and stroke operators whenever the
//! stroke style is expressible. Joins PDF has no operator for, and fills
//! and strokes with different alpha, are split into two fills with the
//! stroke converted to its outline.

use std::fmt::Write as _;
use std::io::Write;

use crate::basics::FillRule;
use crate::canvas::{Canvas, PT_PER_MM};
use crate::color::Rgba8;
use crate::dash::normalize_dashes;
use crate::error::Result;
use crate::path::{Num, Path};
use crate::style::{Capper, DrawState, Joiner};

/// Miter limit used for joins that never clip.
const UNBOUNDED_MITER_LIMIT: f64 = 1000.0;
/// PDF's initial miter limit.
const DEFAULT_MITER_LIMIT: f64 = 10.0;

// ============================================================================
// PageSink
// ============================================================================

/// Path painting operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaintOp {
    Fill,
    FillEvenOdd,
    Stroke,
    CloseStroke,
    FillStroke,
    FillStrokeEvenOdd,
    CloseFillStroke,
    CloseFillStrokeEvenOdd,
}

impl PaintOp {
    pub fn operator(self) -> &'static str {
        match self {
            PaintOp::Fill => "f",
            PaintOp::FillEvenOdd => "f*",
            PaintOp::Stroke => "S",
            PaintOp::CloseStroke => "s",
            PaintOp::FillStroke => "B",
            PaintOp::FillStrokeEvenOdd => "B*",
            PaintOp::CloseFillStroke => "b",
            PaintOp::CloseFillStrokeEvenOdd => "b*",
        }
    }

    fn fill(rule: FillRule) -> PaintOp {
        match rule {
            FillRule::NonZero => PaintOp::Fill,
            FillRule::EvenOdd => PaintOp::FillEvenOdd,
        }
    }
}

/// Primitive operations of a page content stream.
pub trait PageSink {
    fn set_fill_color(&mut self, color: Rgba8);
    fn set_stroke_color(&mut self, color: Rgba8);
    fn set_line_width(&mut self, width: f64);
    fn set_line_cap(&mut self, capper: Capper);
    /// Join style together with its miter limit.
    fn set_line_join(&mut self, joiner: &Joiner);
    /// An empty array sets solid lines.
    fn set_dashes(&mut self, offset: f64, dashes: &[f64]);
    /// Append path construction operators and paint them.
    fn paint(&mut self, path_data: &str, op: PaintOp);
}

// ============================================================================
// PdfPage
// ============================================================================

/// One page being recorded. Sizes are in millimetres.
#[derive(Debug, Clone)]
pub struct PdfPage {
    width: f64,
    height: f64,
    content: String,
    alphas: Vec<(bool, u8)>,
    fill: Rgba8,
    stroke: Rgba8,
    line_width: f64,
    line_cap: Capper,
    line_join: u8,
    miter_limit: f64,
    dashes: Vec<f64>,
    dash_offset: f64,
}

impl PdfPage {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            content: String::new(),
            alphas: Vec::new(),
            fill: Rgba8::BLACK,
            stroke: Rgba8::BLACK,
            line_width: 1.0,
            line_cap: Capper::Butt,
            line_join: 0,
            miter_limit: DEFAULT_MITER_LIMIT,
            dashes: Vec::new(),
            dash_offset: 0.0,
        }
    }

    /// Content stream recorded so far, in document units.
    pub fn content(&self) -> &str {
        &self.content
    }

    fn set_alpha(&mut self, stroking: bool, a: u8) {
        let key = (stroking, a);
        let index = match self.alphas.iter().position(|k| *k == key) {
            Some(i) => i,
            None => {
                self.alphas.push(key);
                self.alphas.len() - 1
            }
        };
        let _ = writeln!(self.content, "/GS{index} gs");
    }

    fn ext_g_states(&self) -> String {
        let mut s = String::new();
        for (i, &(stroking, a)) in self.alphas.iter().enumerate() {
            let key = if stroking { "CA" } else { "ca" };
            let alpha = (a as f64 / 255.0 * 1e4).round() / 1e4;
            let _ = write!(s, " /GS{i} << /Type /ExtGState /{key} {} >>", Num(alpha));
        }
        s
    }
}

fn same_rgb(a: Rgba8, b: Rgba8) -> bool {
    (a.r, a.g, a.b) == (b.r, b.g, b.b)
}

impl PageSink for PdfPage {
    fn set_fill_color(&mut self, color: Rgba8) {
        if !same_rgb(self.fill, color) {
            let _ = writeln!(self.content, "{} rg", color.device_rgb());
        }
        if self.fill.a != color.a {
            self.set_alpha(false, color.a);
        }
        self.fill = color;
    }

    fn set_stroke_color(&mut self, color: Rgba8) {
        if !same_rgb(self.stroke, color) {
            let _ = writeln!(self.content, "{} RG", color.device_rgb());
        }
        if self.stroke.a != color.a {
            self.set_alpha(true, color.a);
        }
        self.stroke = color;
    }

    fn set_line_width(&mut self, width: f64) {
        if self.line_width != width {
            let _ = writeln!(self.content, "{} w", Num(width));
            self.line_width = width;
        }
    }

    fn set_line_cap(&mut self, capper: Capper) {
        if self.line_cap != capper {
            let code = match capper {
                Capper::Butt => 0,
                Capper::Round => 1,
                Capper::Square => 2,
            };
            let _ = writeln!(self.content, "{code} J");
            self.line_cap = capper;
        }
    }

    fn set_line_join(&mut self, joiner: &Joiner) {
        let (code, limit) = match joiner {
            Joiner::Miter { limit, .. } | Joiner::Arcs { limit } => {
                let limit = if limit.is_finite() {
                    *limit
                } else {
                    UNBOUNDED_MITER_LIMIT
                };
                (0, Some(limit))
            }
            Joiner::Round => (1, None),
            Joiner::Bevel => (2, None),
        };
        if self.line_join != code {
            let _ = writeln!(self.content, "{code} j");
            self.line_join = code;
        }
        // TODO: confirm the limit needs no rescaling by comparing golden
        // files against a reference PDF renderer.
        if let Some(limit) = limit {
            if self.miter_limit != limit {
                let _ = writeln!(self.content, "{} M", Num(limit));
                self.miter_limit = limit;
            }
        }
    }

    fn set_dashes(&mut self, offset: f64, dashes: &[f64]) {
        let offset = if dashes.is_empty() { 0.0 } else { offset };
        if self.dashes != dashes || self.dash_offset != offset {
            let list: Vec<String> = dashes.iter().map(|d| Num(*d).to_string()).collect();
            let _ = writeln!(self.content, "[{}] {} d", list.join(" "), Num(offset));
            self.dashes = dashes.to_vec();
            self.dash_offset = offset;
        }
    }

    fn paint(&mut self, path_data: &str, op: PaintOp) {
        let _ = writeln!(self.content, "{path_data} {}", op.operator());
    }
}

// ============================================================================
// PdfWriter
// ============================================================================

/// Streaming PDF document writer. Objects 1 and 2 are reserved for the
/// catalog and the page tree, which are written by [`PdfWriter::close`].
pub struct PdfWriter<W: Write> {
    w: W,
    pos: usize,
    offsets: Vec<usize>,
    pages: Vec<usize>,
}

impl<W: Write> PdfWriter<W> {
    pub fn new(w: W) -> Result<Self> {
        let mut pdf = Self {
            w,
            pos: 0,
            offsets: vec![0, 0],
            pages: Vec::new(),
        };
        pdf.write_raw(b"%PDF-1.7\n%\xe2\xe3\xcf\xd3\n")?;
        Ok(pdf)
    }

    pub fn new_page(&self, width: f64, height: f64) -> PdfPage {
        PdfPage::new(width, height)
    }

    fn write_raw(&mut self, bytes: &[u8]) -> Result<()> {
        self.w.write_all(bytes)?;
        self.pos += bytes.len();
        Ok(())
    }

    fn reserve(&mut self) -> usize {
        self.offsets.push(0);
        self.offsets.len()
    }

    fn write_object(&mut self, id: usize, body: &str) -> Result<()> {
        self.offsets[id - 1] = self.pos;
        self.write_raw(format!("{id} 0 obj\n{body}\nendobj\n").as_bytes())
    }

    /// Write the content stream and page dictionary of `page`.
    pub fn write_page(&mut self, page: PdfPage) -> Result<()> {
        let mut content = format!("{k} 0 0 {k} 0 0 cm\n", k = Num(PT_PER_MM));
        content.push_str(&page.content);

        let content_id = self.reserve();
        self.write_object(
            content_id,
            &format!(
                "<< /Length {} >>\nstream\n{content}endstream",
                content.len()
            ),
        )?;

        let mut resources = String::new();
        let states = page.ext_g_states();
        if !states.is_empty() {
            let _ = write!(resources, "/ExtGState <<{states} >>");
        }
        let page_id = self.reserve();
        self.write_object(
            page_id,
            &format!(
                "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 {} {}] /Resources << {resources} >> /Contents {content_id} 0 R >>",
                Num(page.width * PT_PER_MM),
                Num(page.height * PT_PER_MM)
            ),
        )?;
        self.pages.push(page_id);
        Ok(())
    }

    /// Write the page tree, catalog, cross-reference table and trailer,
    /// flush, and hand back the sink.
    pub fn close(mut self) -> Result<W> {
        let kids: Vec<String> = self.pages.iter().map(|id| format!("{id} 0 R")).collect();
        let pages = format!(
            "<< /Type /Pages /Kids [{}] /Count {} >>",
            kids.join(" "),
            self.pages.len()
        );
        self.write_object(2, &pages)?;
        self.write_object(1, "<< /Type /Catalog /Pages 2 0 R >>")?;

        let xref = self.pos;
        let mut table = format!("xref\n0 {}\n0000000000 65535 f \n", self.offsets.len() + 1);
        for off in &self.offsets {
            let _ = write!(table, "{off:010} 00000 n \n");
        }
        let _ = write!(
            table,
            "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{xref}\n%%EOF\n",
            self.offsets.len() + 1
        );
        self.write_raw(table.as_bytes())?;
        self.w.flush()?;
        Ok(self.w)
    }
}

// ============================================================================
// Backend
// ============================================================================

/// True when the joiner has no native PDF equivalent and strokes must be
/// drawn as filled outlines.
pub fn needs_outline(joiner: &Joiner) -> bool {
    match joiner {
        Joiner::Arcs { .. } => true,
        Joiner::Miter { limit, fallback } => {
            limit.is_finite() && !matches!(**fallback, Joiner::Bevel)
        }
        Joiner::Round | Joiner::Bevel => false,
    }
}

fn set_stroke_style<S: PageSink + ?Sized>(sink: &mut S, state: &DrawState) {
    sink.set_stroke_color(state.stroke_color);
    sink.set_line_width(state.stroke_width);
    sink.set_line_cap(state.stroke_capper);
    sink.set_line_join(&state.stroke_joiner);
    match normalize_dashes(&state.dashes) {
        Some(dashes) => sink.set_dashes(state.dash_offset, &dashes),
        None => sink.set_dashes(0.0, &[]),
    }
}

/// Paint one path with its draw state into `sink`.
pub fn write_path<S: PageSink + ?Sized>(sink: &mut S, path: &Path, state: &DrawState) {
    let fill = state.has_fill();
    let stroke = state.has_stroke();
    if !fill && !stroke {
        log::trace!("pdf: skipping layer with no visible paint");
        return;
    }

    let full = path.to_pdf();
    let closed = full.ends_with(" h");
    let data = if closed { &full[..full.len() - 2] } else { &full[..] };
    let outline = stroke && needs_outline(&state.stroke_joiner);
    let split_alpha = fill && stroke && state.fill_color.a != state.stroke_color.a;

    if outline || split_alpha {
        if fill {
            sink.set_fill_color(state.fill_color);
            sink.paint(&full, PaintOp::fill(state.fill_rule));
        }
        if stroke {
            let shape = path.stroke_outline(state, Path::DEFAULT_TOLERANCE);
            if !shape.is_empty() {
                sink.set_fill_color(state.stroke_color);
                sink.paint(&shape.to_pdf(), PaintOp::Fill);
            }
        }
        return;
    }

    if fill {
        sink.set_fill_color(state.fill_color);
    }
    if stroke {
        set_stroke_style(sink, state);
    }
    let even_odd = state.fill_rule == FillRule::EvenOdd;
    let op = match (fill, stroke, closed, even_odd) {
        (true, false, _, _) => PaintOp::fill(state.fill_rule),
        (false, _, true, _) => PaintOp::CloseStroke,
        (false, _, false, _) => PaintOp::Stroke,
        (true, true, true, false) => PaintOp::CloseFillStroke,
        (true, true, true, true) => PaintOp::CloseFillStrokeEvenOdd,
        (true, true, false, false) => PaintOp::FillStroke,
        (true, true, false, true) => PaintOp::FillStrokeEvenOdd,
    };
    sink.paint(data, op);
}

/// Write `canvas` as a one-page PDF and return the flushed sink.
pub(crate) fn write_pdf<W: Write>(canvas: &Canvas, w: W) -> Result<W> {
    log::debug!("pdf export: {} layers", canvas.layers().len());
    let mut pdf = PdfWriter::new(w)?;
    let mut page = pdf.new_page(canvas.width(), canvas.height());
    for layer in canvas.layers() {
        layer
            .for_each_path(|path, state| {
                write_path(&mut page, path, state);
                Ok(())
            })
            .unwrap_or_else(|e: std::convert::Infallible| match e {});
    }
    pdf.write_page(page)?;
    pdf.close()
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const PAINT_OPS: [&str; 8] = ["f", "f*", "S", "s", "B", "B*", "b", "b*"];

    fn paints(content: &str) -> Vec<&str> {
        content
            .lines()
            .filter_map(|l| l.rsplit(' ').next())
            .filter(|op| PAINT_OPS.contains(op))
            .collect()
    }

    fn page_with(path: &Path, state: &DrawState) -> PdfPage {
        let mut page = PdfPage::new(10.0, 10.0);
        write_path(&mut page, path, state);
        page
    }

    fn stroked(joiner: Joiner) -> DrawState {
        DrawState {
            stroke_color: Rgba8::BLUE,
            stroke_width: 2.0,
            stroke_joiner: joiner,
            ..DrawState::default()
        }
    }

    #[test]
    fn test_fill_only() {
        let page = page_with(&Path::rectangle(2.0, 2.0), &DrawState::default());
        assert_eq!(page.content(), "0 0 m 2 0 l 2 2 l 0 2 l f\n");
    }

    #[test]
    fn test_fill_and_stroke_closed() {
        let page = page_with(&Path::rectangle(2.0, 2.0), &stroked(Joiner::Bevel));
        assert_eq!(
            page.content(),
            "0 0 1 RG\n2 w\n2 j\n0 0 m 2 0 l 2 2 l 0 2 l b\n"
        );
    }

    #[test]
    fn test_stroke_only_open_even_odd() {
        let mut p = Path::new();
        p.move_to(0.0, 0.0).line_to(3.0, 0.0);
        let mut state = stroked(Joiner::Round);
        state.fill_color = Rgba8::TRANSPARENT;
        state.fill_rule = FillRule::EvenOdd;
        let page = page_with(&p, &state);
        assert_eq!(paints(page.content()), ["S"]);

        let mut state = stroked(Joiner::Round);
        state.fill_rule = FillRule::EvenOdd;
        assert_eq!(paints(page_with(&p, &state).content()), ["B*"]);
        assert_eq!(
            paints(page_with(&Path::rectangle(1.0, 1.0), &state).content()),
            ["b*"]
        );
    }

    #[test]
    fn test_unbounded_miter_is_native() {
        let page = page_with(&Path::rectangle(2.0, 2.0), &stroked(Joiner::miter()));
        assert!(page.content().contains("1000 M\n"));
        assert_eq!(paints(page.content()), ["b"]);
    }

    #[test]
    fn test_limited_miter_with_bevel_is_native() {
        let page = page_with(&Path::rectangle(2.0, 2.0), &stroked(Joiner::miter_clip(2.0)));
        assert!(page.content().contains("2 M\n"));
        assert_eq!(paints(page.content()), ["b"]);
    }

    #[test]
    fn test_unsupported_joins_fall_back_to_outline() {
        for joiner in [
            Joiner::arcs(4.0),
            Joiner::miter_with_fallback(2.0, Joiner::Round),
        ] {
            let page = page_with(&Path::rectangle(2.0, 2.0), &stroked(joiner));
            assert_eq!(paints(page.content()), ["f", "f"]);
            assert!(!page.content().contains(" w\n"));
            assert!(page.content().contains("0 0 1 rg\n"));
        }
    }

    #[test]
    fn test_different_alpha_splits_paint() {
        let mut state = stroked(Joiner::Bevel);
        state.fill_color = Rgba8::new(255, 0, 0, 128);
        let page = page_with(&Path::rectangle(2.0, 2.0), &state);
        assert_eq!(paints(page.content()), ["f", "f"]);
        assert!(!page.content().contains(" w\n"));
        assert!(page.content().contains("0 0 1 rg\n"));
        assert_eq!(
            page.ext_g_states(),
            " /GS0 << /Type /ExtGState /ca 0.502 >> /GS1 << /Type /ExtGState /ca 1 >>"
        );
    }

    #[test]
    fn test_invisible_paint_emits_nothing() {
        let mut state = stroked(Joiner::Bevel);
        state.fill_color = Rgba8::TRANSPARENT;
        state.stroke_width = 0.0;
        assert_eq!(page_with(&Path::rectangle(2.0, 2.0), &state).content(), "");
    }

    #[test]
    fn test_redundant_state_suppressed() {
        let mut page = PdfPage::new(1.0, 1.0);
        page.set_fill_color(Rgba8::RED);
        page.set_fill_color(Rgba8::RED);
        page.set_line_width(1.0);
        page.set_line_cap(Capper::Round);
        page.set_line_cap(Capper::Round);
        page.set_dashes(0.0, &[]);
        page.set_dashes(1.0, &[2.0, 1.0]);
        page.set_dashes(1.0, &[2.0, 1.0]);
        assert_eq!(page.content(), "1 0 0 rg\n1 J\n[2 1] 1 d\n");
    }

    #[test]
    fn test_alpha_states_reused() {
        let mut page = PdfPage::new(1.0, 1.0);
        page.set_fill_color(Rgba8::new(0, 0, 0, 100));
        page.set_fill_color(Rgba8::BLACK);
        page.set_fill_color(Rgba8::new(0, 0, 0, 100));
        page.set_stroke_color(Rgba8::new(0, 0, 0, 100));
        assert_eq!(page.alphas, [(false, 100), (false, 255), (true, 100)]);
        assert_eq!(
            page.content(),
            "/GS0 gs\n/GS1 gs\n/GS0 gs\n/GS2 gs\n"
        );
    }

    #[test]
    fn test_document_structure() {
        let mut c = Canvas::new(100.0, 50.0);
        c.draw_path(1.0, 1.0, &Path::rectangle(5.0, 5.0));
        let mut out = Vec::new();
        c.write_pdf(&mut out).unwrap();

        let header = b"%PDF-1.7\n%\xe2\xe3\xcf\xd3\n";
        assert!(out.starts_with(header));
        let s = std::str::from_utf8(&out[header.len()..]).unwrap();
        let at = |offset: usize| &s[offset - header.len()..];
        assert!(s.ends_with("%%EOF\n"));
        assert!(s.contains("/MediaBox [0 0 283.464567 141.732283]"));
        assert!(s.contains("stream\n2.834646 0 0 2.834646 0 0 cm\n1 1 m 6 1 l 6 6 l 1 6 l f\nendstream"));

        // Every xref entry points at its object header.
        let xref = s.rfind("xref\n").unwrap();
        let entries: Vec<usize> = s[xref..]
            .lines()
            .skip(3)
            .take_while(|l| l.ends_with(" n "))
            .map(|l| l[..10].parse().unwrap())
            .collect();
        assert_eq!(entries.len(), 4);
        for (i, off) in entries.iter().enumerate() {
            assert!(at(*off).starts_with(&format!("{} 0 obj", i + 1)), "object {}", i + 1);
        }
        let startxref: usize = s[s.rfind("startxref\n").unwrap() + 10..]
            .lines()
            .next()
            .unwrap()
            .parse()
            .unwrap();
        assert_eq!(startxref, xref + header.len());
    }
}
