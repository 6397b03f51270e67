//! SVG backend.
//!
//! One `<path>` element per painted path, styled with presentation
//! attributes. Document space has y up, so every path is reflected about
//! the horizontal midline on the way out. Fonts referenced by text layers
//! are embedded once as `@font-face` rules with data URIs.

use std::fmt::Write as _;
use std::io::Write;

use crate::basics::FillRule;
use crate::canvas::{Canvas, Layer};
use crate::color::Rgba8;
use crate::dash::normalize_dashes;
use crate::error::{Error, Result};
use crate::path::{Num, Path};
use crate::style::{Capper, DrawState, Joiner};

/// SVG's initial `stroke-miterlimit`.
const DEFAULT_MITER_LIMIT: f64 = 4.0;

/// Escape `s` for a single-quoted CSS string inside a `<style>` element.
/// Quotes and markup characters become CSS hex escapes, so the XML parser
/// never sees them.
fn css_string(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        if matches!(c, '\'' | '"' | '\\' | '<' | '>' | '&') || c.is_control() {
            let _ = write!(out, "\\{:x} ", c as u32);
        } else {
            out.push(c);
        }
    }
    out
}

pub(crate) fn write_svg<W: Write>(canvas: &Canvas, w: &mut W) -> Result<()> {
    let (width, height) = (canvas.width(), canvas.height());
    log::debug!("svg export: {} layers", canvas.layers().len());

    write!(
        w,
        "<svg xmlns=\"http://www.w3.org/2000/svg\" version=\"1.1\" shape-rendering=\"geometricPrecision\" width=\"{}\" height=\"{}\" viewBox=\"0 0 {} {}\">",
        Num(width),
        Num(height),
        Num(width),
        Num(height)
    )?;
    if !canvas.fonts().is_empty() {
        w.write_all(b"<defs><style>")?;
        for font in canvas.fonts() {
            write!(
                w,
                "\n@font-face{{font-family:'{}';src:url('{}');}}",
                css_string(font.name()),
                font.to_data_uri()
            )?;
        }
        w.write_all(b"\n</style></defs>")?;
    }

    for layer in canvas.layers() {
        match layer {
            Layer::Path { path, state } => write_path(w, path, state, height)?,
            Layer::Text {
                text,
                x,
                y,
                rotation,
            } => match text.to_svg(*x, height - *y, *rotation) {
                Some(markup) => w.write_all(markup.as_bytes())?,
                None => layer.for_each_path(|path, state| write_path(&mut *w, path, state, height))?,
            },
        }
    }
    w.write_all(b"</svg>")?;
    Ok(())
}

fn write_path<W: Write>(w: &mut W, path: &Path, state: &DrawState, height: f64) -> Result<()> {
    let fill = state.has_fill();
    let stroke = state.has_stroke();
    if !fill && !stroke {
        log::trace!("svg: skipping layer with no visible paint");
        return Ok(());
    }

    let flipped = path.scale(1.0, -1.0).translate(0.0, height);
    let mut attrs = String::new();
    if stroke {
        stroke_attrs(state, &mut attrs)?;
    }
    if !fill {
        attrs.push_str(" fill=\"none\"");
    } else {
        if state.fill_color != Rgba8::BLACK {
            let _ = write!(attrs, " fill=\"{}\"", state.fill_color.to_css());
        }
        if state.fill_rule == FillRule::EvenOdd {
            attrs.push_str(" fill-rule=\"evenodd\"");
        }
    }
    write!(w, "<path d=\"{}\"{attrs}/>", flipped.to_svg())?;
    Ok(())
}

fn stroke_attrs(state: &DrawState, out: &mut String) -> Result<()> {
    let _ = write!(out, " stroke=\"{}\"", state.stroke_color.to_css());
    if state.stroke_width != 1.0 {
        let _ = write!(out, " stroke-width=\"{}\"", Num(state.stroke_width));
    }
    match state.stroke_capper {
        Capper::Butt => {}
        Capper::Round => out.push_str(" stroke-linecap=\"round\""),
        Capper::Square => out.push_str(" stroke-linecap=\"square\""),
    }
    joiner_attrs(&state.stroke_joiner, out)?;

    if normalize_dashes(&state.dashes).is_some() {
        let list: Vec<String> = state.dashes.iter().map(|d| Num(*d).to_string()).collect();
        let _ = write!(out, " stroke-dasharray=\"{}\"", list.join(" "));
        if state.dash_offset > 0.0 {
            let _ = write!(out, " stroke-dashoffset=\"{}\"", Num(state.dash_offset));
        }
    }
    Ok(())
}

fn joiner_attrs(joiner: &Joiner, out: &mut String) -> Result<()> {
    match joiner {
        Joiner::Round => out.push_str(" stroke-linejoin=\"round\""),
        Joiner::Bevel => out.push_str(" stroke-linejoin=\"bevel\""),
        Joiner::Arcs { limit } => {
            out.push_str(" stroke-linejoin=\"arcs\"");
            miter_limit_attr(*limit, out);
        }
        // Unbounded miter is the initial value.
        Joiner::Miter { limit, .. } if !limit.is_finite() => {}
        Joiner::Miter { limit, fallback } => {
            if fallback.is_limited() {
                return Err(Error::UnsupportedStyle {
                    backend: "svg",
                    detail: format!("miter fallback {fallback:?} has its own limit"),
                });
            }
            out.push_str(" stroke-linejoin=\"miter-clip\"");
            miter_limit_attr(*limit, out);
        }
    }
    Ok(())
}

fn miter_limit_attr(limit: f64, out: &mut String) {
    if limit.is_finite() && limit != DEFAULT_MITER_LIMIT {
        let _ = write!(out, " stroke-miterlimit=\"{}\"", Num(limit));
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::text::{Font, TextSource};

    fn svg(c: &Canvas) -> String {
        let mut out = Vec::new();
        c.write_svg(&mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    fn body(c: &Canvas) -> String {
        let s = svg(c);
        let start = s.find('>').unwrap() + 1;
        s[start..s.len() - "</svg>".len()].to_string()
    }

    #[test]
    fn test_header_and_footer() {
        let s = svg(&Canvas::new(210.0, 297.5));
        assert_eq!(
            s,
            "<svg xmlns=\"http://www.w3.org/2000/svg\" version=\"1.1\" shape-rendering=\"geometricPrecision\" width=\"210\" height=\"297.5\" viewBox=\"0 0 210 297.5\"></svg>"
        );
    }

    #[test]
    fn test_path_is_flipped() {
        let mut c = Canvas::new(10.0, 10.0);
        let mut p = Path::new();
        p.move_to(1.0, 2.0).line_to(3.0, 4.0);
        c.draw_path(0.0, 0.0, &p);
        assert_eq!(body(&c), "<path d=\"M1 8L3 6\"/>");
    }

    #[test]
    fn test_fill_color_and_rule() {
        let mut c = Canvas::new(10.0, 10.0);
        c.set_fill_color(Rgba8::new(255, 0, 0, 128));
        c.set_fill_rule(FillRule::EvenOdd);
        c.draw_path(0.0, 0.0, &Path::rectangle(1.0, 1.0));
        let b = body(&c);
        assert!(b.contains(" fill=\"rgba(255,0,0,0.502)\""), "{b}");
        assert!(b.contains(" fill-rule=\"evenodd\""), "{b}");
        assert!(!b.contains("stroke"), "{b}");
    }

    #[test]
    fn test_stroke_attributes() {
        let mut c = Canvas::new(10.0, 10.0);
        c.set_fill_color(Rgba8::TRANSPARENT);
        c.set_stroke_color(Rgba8::BLUE);
        c.set_stroke_width(0.5);
        c.set_stroke_capper(Capper::Round);
        c.set_stroke_joiner(Joiner::Bevel);
        c.set_dashes(1.5, &[2.0, 1.0]);
        c.draw_path(0.0, 0.0, &Path::rectangle(1.0, 1.0));
        let b = body(&c);
        assert!(b.ends_with(
            " stroke=\"#0000ff\" stroke-width=\"0.5\" stroke-linecap=\"round\" stroke-linejoin=\"bevel\" stroke-dasharray=\"2 1\" stroke-dashoffset=\"1.5\" fill=\"none\"/>"
        ), "{b}");
    }

    #[test]
    fn test_default_stroke_attributes_omitted() {
        let mut c = Canvas::new(10.0, 10.0);
        c.set_stroke_color(Rgba8::BLACK);
        c.set_dashes(0.0, &[1.0]);
        c.draw_path(0.0, 0.0, &Path::rectangle(1.0, 1.0));
        let b = body(&c);
        assert!(b.ends_with(" stroke=\"#000000\" stroke-dasharray=\"1\"/>"), "{b}");
    }

    #[test]
    fn test_miter_limits() {
        let mut c = Canvas::new(10.0, 10.0);
        c.set_stroke_color(Rgba8::BLACK);
        c.set_stroke_joiner(Joiner::miter_clip(4.0));
        c.draw_path(0.0, 0.0, &Path::rectangle(1.0, 1.0));
        c.set_stroke_joiner(Joiner::miter_with_fallback(2.5, Joiner::Round));
        c.draw_path(0.0, 0.0, &Path::rectangle(1.0, 1.0));
        c.set_stroke_joiner(Joiner::arcs(3.0));
        c.draw_path(0.0, 0.0, &Path::rectangle(1.0, 1.0));
        let b = body(&c);
        let paths: Vec<&str> = b.split("/>").filter(|s| !s.is_empty()).collect();
        assert!(paths[0].ends_with("stroke-linejoin=\"miter-clip\""), "{b}");
        assert!(paths[1].ends_with("stroke-linejoin=\"miter-clip\" stroke-miterlimit=\"2.5\""));
        assert!(paths[2].ends_with("stroke-linejoin=\"arcs\" stroke-miterlimit=\"3\""));
    }

    #[test]
    fn test_nested_limited_fallback_is_unsupported() {
        let mut c = Canvas::new(10.0, 10.0);
        c.set_stroke_color(Rgba8::BLACK);
        c.set_stroke_joiner(Joiner::miter_with_fallback(2.0, Joiner::arcs(3.0)));
        c.draw_path(0.0, 0.0, &Path::rectangle(1.0, 1.0));
        let err = c.write_svg(Vec::new()).unwrap_err();
        assert!(matches!(err, Error::UnsupportedStyle { backend: "svg", .. }));
    }

    #[test]
    fn test_invisible_layer_skipped() {
        let mut c = Canvas::new(10.0, 10.0);
        c.set_fill_color(Rgba8::TRANSPARENT);
        c.set_stroke_color(Rgba8::RED);
        c.set_stroke_width(0.0);
        c.draw_path(0.0, 0.0, &Path::rectangle(1.0, 1.0));
        assert_eq!(body(&c), "");
    }

    #[derive(Debug)]
    struct Label {
        font: Arc<Font>,
        native: bool,
    }

    impl TextSource for Label {
        fn fonts(&self) -> Vec<Arc<Font>> {
            vec![self.font.clone()]
        }
        fn to_paths(&self) -> (Vec<Path>, Vec<Rgba8>) {
            (vec![Path::rectangle(1.0, 1.0)], vec![Rgba8::RED])
        }
        fn to_svg(&self, x: f64, y: f64, rotation: f64) -> Option<String> {
            self.native
                .then(|| format!("<text x=\"{}\" y=\"{}\" r=\"{}\">A</text>", Num(x), Num(y), Num(rotation)))
        }
    }

    #[test]
    fn test_text_native_and_fallback() {
        let font = Arc::new(Font::new("Sans", b"wOFFabc".to_vec()));
        let mut c = Canvas::new(10.0, 10.0);
        c.draw_text_rotated(2.0, 3.0, 45.0, Arc::new(Label { font: font.clone(), native: true }));
        c.draw_text(2.0, 3.0, Arc::new(Label { font, native: false }));
        let s = svg(&c);
        assert_eq!(s.matches("@font-face").count(), 1);
        assert!(s.contains(
            "<defs><style>\n@font-face{font-family:'Sans';src:url('data:font/woff;base64,d09GRmFiYw==');}\n</style></defs>"
        ));
        assert!(s.contains("<text x=\"2\" y=\"7\" r=\"45\">A</text>"));
        assert!(s.contains("<path d=\"M2 7L3 7L3 6L2 6z\" fill=\"#ff0000\"/>"), "{s}");
    }

    #[test]
    fn test_font_name_cannot_break_style_block() {
        let font = Arc::new(Font::new("Bob's </style><script>x</script>", b"wOFF".to_vec()));
        let mut c = Canvas::new(10.0, 10.0);
        c.draw_text(1.0, 1.0, Arc::new(Label { font, native: true }));
        let s = svg(&c);
        assert!(!s.contains("<script"), "{s}");
        assert_eq!(s.matches("</style>").count(), 1);
        assert!(s.contains(
            "font-family:'Bob\\27 s \\3c /style\\3e \\3c script\\3e x\\3c /script\\3e ';"
        ));
    }
}
