//! EPS backend.
//!
//! Everything is painted as filled geometry: strokes are converted to
//! outlines first. PostScript has no transparency, so alpha only decides
//! whether a paint is drawn at all.

use std::io::Write;

use crate::basics::FillRule;
use crate::canvas::{Canvas, PT_PER_MM};
use crate::color::Rgba8;
use crate::error::Result;
use crate::path::{Num, Path};
use crate::style::DrawState;

/// Primitive operations of a PostScript page.
pub trait PsSink {
    fn set_color(&mut self, color: Rgba8) -> Result<()>;
    /// Append path construction operators and fill them.
    fn fill(&mut self, path_data: &str, rule: FillRule) -> Result<()>;
}

// ============================================================================
// EpsWriter
// ============================================================================

/// Streaming EPS writer. The bounding box is in points, the body in
/// document units.
pub struct EpsWriter<W: Write> {
    w: W,
    color: Rgba8,
}

impl<W: Write> EpsWriter<W> {
    pub fn new(mut w: W, width: f64, height: f64) -> Result<Self> {
        let (pw, ph) = (width * PT_PER_MM, height * PT_PER_MM);
        write!(
            w,
            "%!PS-Adobe-3.0 EPSF-3.0\n%%Creator: vector-canvas\n%%BoundingBox: 0 0 {} {}\n%%HiResBoundingBox: 0 0 {} {}\n%%EndComments\n{k} {k} scale\n",
            pw.ceil().max(0.0),
            ph.ceil().max(0.0),
            Num(pw),
            Num(ph),
            k = Num(PT_PER_MM)
        )?;
        Ok(Self {
            w,
            color: Rgba8::BLACK,
        })
    }

    /// Write the trailer, flush, and hand back the sink.
    pub fn finish(mut self) -> Result<W> {
        self.w.write_all(b"showpage\n%%EOF\n")?;
        self.w.flush()?;
        Ok(self.w)
    }
}

impl<W: Write> PsSink for EpsWriter<W> {
    fn set_color(&mut self, color: Rgba8) -> Result<()> {
        if (color.r, color.g, color.b) != (self.color.r, self.color.g, self.color.b) {
            writeln!(self.w, "{} setrgbcolor", color.device_rgb())?;
            self.color = color;
        }
        Ok(())
    }

    fn fill(&mut self, path_data: &str, rule: FillRule) -> Result<()> {
        let op = match rule {
            FillRule::NonZero => "fill",
            FillRule::EvenOdd => "eofill",
        };
        writeln!(self.w, "{path_data} {op}")?;
        Ok(())
    }
}

// ============================================================================
// Backend
// ============================================================================

/// Paint one path with its draw state into `sink`.
pub fn write_path<S: PsSink + ?Sized>(sink: &mut S, path: &Path, state: &DrawState) -> Result<()> {
    if state.has_fill() {
        sink.set_color(state.fill_color)?;
        sink.fill(&path.to_ps(), state.fill_rule)?;
    }
    if state.has_stroke() {
        let outline = path.stroke_outline(state, Path::DEFAULT_TOLERANCE);
        if !outline.is_empty() {
            sink.set_color(state.stroke_color)?;
            sink.fill(&outline.to_ps(), FillRule::NonZero)?;
        }
    }
    Ok(())
}

/// Write `canvas` as EPS and return the flushed sink.
pub(crate) fn write_eps<W: Write>(canvas: &Canvas, w: W) -> Result<W> {
    log::debug!("eps export: {} layers", canvas.layers().len());
    let mut eps = EpsWriter::new(w, canvas.width(), canvas.height())?;
    for layer in canvas.layers() {
        layer.for_each_path(|path, state| write_path(&mut eps, path, state))?;
    }
    eps.finish()
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::{Capper, Joiner};

    fn eps(c: &Canvas) -> String {
        let mut out = Vec::new();
        c.write_eps(&mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_header_and_trailer() {
        let s = eps(&Canvas::new(100.0, 50.0));
        assert_eq!(
            s,
            "%!PS-Adobe-3.0 EPSF-3.0\n%%Creator: vector-canvas\n%%BoundingBox: 0 0 284 142\n%%HiResBoundingBox: 0 0 283.464567 141.732283\n%%EndComments\n2.834646 2.834646 scale\nshowpage\n%%EOF\n"
        );
    }

    #[test]
    fn test_fill_and_even_odd() {
        let mut c = Canvas::new(10.0, 10.0);
        c.draw_path(0.0, 0.0, &Path::rectangle(1.0, 1.0));
        c.set_fill_color(Rgba8::RED);
        c.set_fill_rule(FillRule::EvenOdd);
        c.draw_path(0.0, 0.0, &Path::rectangle(1.0, 1.0));
        let s = eps(&c);
        assert!(s.contains(
            "scale\n0 0 moveto 1 0 lineto 1 1 lineto 0 1 lineto closepath fill\n1 0 0 setrgbcolor\n0 0 moveto 1 0 lineto 1 1 lineto 0 1 lineto closepath eofill\n"
        ), "{s}");
    }

    #[test]
    fn test_stroke_filled_as_outline() {
        let mut c = Canvas::new(10.0, 10.0);
        c.set_fill_color(Rgba8::TRANSPARENT);
        c.set_stroke_color(Rgba8::BLUE);
        c.set_stroke_width(2.0);
        c.set_stroke_capper(Capper::Square);
        c.set_stroke_joiner(Joiner::arcs(2.0));
        let mut p = Path::new();
        p.move_to(0.0, 0.0).line_to(5.0, 0.0);
        c.draw_path(0.0, 0.0, &p);
        let s = eps(&c);
        assert!(s.contains("0 0 1 setrgbcolor\n"));
        assert_eq!(s.matches(" fill\n").count(), 1);
        assert!(!s.contains("stroke"));
        // Square caps extend the outline to x = -1 and x = 6.
        assert!(s.contains("-1 ") && s.contains("6 "), "{s}");
    }

    #[test]
    fn test_transparent_paints_skipped() {
        let mut c = Canvas::new(10.0, 10.0);
        c.set_fill_color(Rgba8::TRANSPARENT);
        c.draw_path(0.0, 0.0, &Path::rectangle(1.0, 1.0));
        let s = eps(&c);
        assert!(!s.contains("fill"));
    }
}
