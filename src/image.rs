//! Raster backend: RGBA8 images and the canvas renderer that fills them.
//!
//! Layers are painted in order over an opaque white background. Fills go
//! through the anti-aliased scanline rasterizer with the layer's fill
//! rule; strokes are expanded into outlines first and filled non-zero in
//! the stroke color.

use crate::basics::{CoverType, FillRule};
use crate::canvas::{Canvas, MM_PER_INCH};
use crate::color::Rgba8;
use crate::curves::clamp_tolerance;
use crate::path::Path;
use crate::rasterizer::{Rasterizer, Scanline};
use crate::style::DrawState;
use crate::trans_affine::TransAffine;

const BPP: usize = 4;

// ============================================================================
// Image
// ============================================================================

/// Owned RGBA8 pixel buffer, row 0 at the top, not premultiplied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Image {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl Image {
    /// Opaque white image.
    pub fn new(width: u32, height: u32) -> Self {
        let mut img = Self {
            width,
            height,
            data: vec![0; width as usize * height as usize * BPP],
        };
        img.clear(Rgba8::WHITE);
        img
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn clear(&mut self, c: Rgba8) {
        for p in self.data.chunks_exact_mut(BPP) {
            p.copy_from_slice(&[c.r, c.g, c.b, c.a]);
        }
    }

    /// Pixel at `(x, y)`, or `None` outside the image.
    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgba8> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let off = self.offset(x as usize, y as usize);
        let p = &self.data[off..off + BPP];
        Some(Rgba8::new(p[0], p[1], p[2], p[3]))
    }

    /// Raw bytes, `width * height * 4`, row-major.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn into_raw(self) -> Vec<u8> {
        self.data
    }

    #[inline]
    fn offset(&self, x: usize, y: usize) -> usize {
        (y * self.width as usize + x) * BPP
    }

    #[inline]
    fn blend_pix(p: &mut [u8], cr: u8, cg: u8, cb: u8, alpha: u8) {
        p[0] = Rgba8::lerp(p[0], cr, alpha);
        p[1] = Rgba8::lerp(p[1], cg, alpha);
        p[2] = Rgba8::lerp(p[2], cb, alpha);
        p[3] = Rgba8::lerp(p[3], 255, alpha);
    }

    #[inline]
    fn blend_cover(p: &mut [u8], c: Rgba8, cover: CoverType) {
        let alpha = Rgba8::multiply(c.a, cover);
        if alpha == 255 {
            p.copy_from_slice(&[c.r, c.g, c.b, 255]);
        } else if alpha > 0 {
            Self::blend_pix(p, c.r, c.g, c.b, alpha);
        }
    }

    /// Clip `[x, x + len)` on row `y` to the image; returns the first
    /// column, the number of leading pixels skipped and the clipped length.
    fn clip_span(&self, x: i32, y: i32, len: usize) -> Option<(usize, usize, usize)> {
        if y < 0 || y >= self.height as i32 || len == 0 {
            return None;
        }
        let x0 = x.max(0);
        let x1 = (x as i64 + len as i64).min(self.width as i64) as i32;
        if x1 <= x0 {
            return None;
        }
        Some((x0 as usize, (x0 - x) as usize, (x1 - x0) as usize))
    }

    /// Blend `len` pixels on row `y` with one color and coverage.
    pub fn blend_hline(&mut self, x: i32, y: i32, len: u32, c: Rgba8, cover: CoverType) {
        let Some((x0, _, n)) = self.clip_span(x, y, len as usize) else {
            return;
        };
        let start = self.offset(x0, y as usize);
        for p in self.data[start..start + n * BPP].chunks_exact_mut(BPP) {
            Self::blend_cover(p, c, cover);
        }
    }

    /// Blend a run of pixels on row `y` with per-pixel coverage.
    pub fn blend_solid_hspan(&mut self, x: i32, y: i32, c: Rgba8, covers: &[CoverType]) {
        let Some((x0, skip, n)) = self.clip_span(x, y, covers.len()) else {
            return;
        };
        let start = self.offset(x0, y as usize);
        let pixels = self.data[start..start + n * BPP].chunks_exact_mut(BPP);
        for (p, &cover) in pixels.zip(&covers[skip..skip + n]) {
            Self::blend_cover(p, c, cover);
        }
    }

    /// Sweep every scanline of `ras` into the image in color `c`.
    pub fn render_scanlines(&mut self, ras: &mut Rasterizer, sl: &mut Scanline, c: Rgba8) {
        if !ras.rewind_scanlines() {
            return;
        }
        sl.reset(ras.min_x(), ras.max_x());
        while ras.sweep_scanline(sl) {
            let y = sl.y();
            for span in sl.spans() {
                self.blend_solid_hspan(span.x, y, c, sl.covers(span));
            }
        }
    }
}

// ============================================================================
// Options
// ============================================================================

/// Output resolution in dots per millimetre.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Resolution(f64);

impl Resolution {
    pub fn from_dpmm(dpmm: f64) -> Self {
        Self(dpmm)
    }

    pub fn from_dpi(dpi: f64) -> Self {
        Self(dpi / MM_PER_INCH)
    }

    pub fn dpmm(self) -> f64 {
        self.0
    }

    pub fn dpi(self) -> f64 {
        self.0 * MM_PER_INCH
    }
}

impl Default for Resolution {
    fn default() -> Self {
        Self::from_dpi(96.0)
    }
}

/// Settings for [`Canvas::write_image`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RasterOptions {
    pub resolution: Resolution,
    /// Curve flattening tolerance in pixels.
    pub tolerance: f64,
}

impl RasterOptions {
    pub fn new(resolution: Resolution) -> Self {
        Self {
            resolution,
            tolerance: 0.25,
        }
    }

    /// Zero, negative and NaN tolerances are clamped to
    /// [`MIN_TOLERANCE`](crate::curves::MIN_TOLERANCE).
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = clamp_tolerance(tolerance);
        self
    }
}

impl Default for RasterOptions {
    fn default() -> Self {
        Self::new(Resolution::default())
    }
}

// ============================================================================
// Renderer
// ============================================================================

struct Renderer {
    image: Image,
    ras: Rasterizer,
    sl: Scanline,
    device: TransAffine,
    dpmm: f64,
    tolerance: f64,
}

impl Renderer {
    fn fill(&mut self, path: &Path, color: Rgba8, rule: FillRule) {
        if color.is_transparent() || path.is_empty() {
            return;
        }
        let device = path.transform(&self.device);
        self.ras.reset();
        self.ras.set_fill_rule(rule);
        self.ras.add_path(&mut device.vertices(self.tolerance));
        self.image.render_scanlines(&mut self.ras, &mut self.sl, color);
    }

    fn draw(&mut self, path: &Path, state: &DrawState) {
        if state.has_fill() {
            self.fill(path, state.fill_color, state.fill_rule);
        }
        if state.has_stroke() {
            let outline = path.stroke_outline(state, self.tolerance / self.dpmm);
            self.fill(&outline, state.stroke_color, FillRule::NonZero);
        }
    }
}

/// Rasterize `canvas` at the given options.
pub(crate) fn render(canvas: &Canvas, options: &RasterOptions) -> Image {
    let dpmm = options.resolution.dpmm();
    let w = (canvas.width() * dpmm + 0.5).max(0.0) as u32;
    let h = (canvas.height() * dpmm + 0.5).max(0.0) as u32;
    log::debug!(
        "rasterizing {} layers to {w}x{h} at {dpmm} dpmm",
        canvas.layers().len()
    );

    let mut ras = Rasterizer::new();
    ras.clip_box(0.0, 0.0, w as f64, h as f64);
    let mut r = Renderer {
        image: Image::new(w, h),
        ras,
        sl: Scanline::new(),
        device: TransAffine::new_custom(dpmm, 0.0, 0.0, -dpmm, 0.0, canvas.height() * dpmm),
        dpmm,
        tolerance: clamp_tolerance(options.tolerance),
    };
    for layer in canvas.layers() {
        layer
            .for_each_path(|path, state| {
                r.draw(path, state);
                Ok(())
            })
            .unwrap_or_else(|e: std::convert::Infallible| match e {});
    }
    r.image
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::{Capper, Joiner};

    fn dpmm(v: f64) -> RasterOptions {
        RasterOptions::new(Resolution::from_dpmm(v))
    }

    #[test]
    fn test_resolution_conversions() {
        let r = Resolution::from_dpi(254.0);
        assert!((r.dpmm() - 10.0).abs() < 1e-12);
        assert!((r.dpi() - 254.0).abs() < 1e-9);
        assert_eq!(RasterOptions::default().tolerance, 0.25);
    }

    #[test]
    fn test_blank_canvas_is_white() {
        let img = Canvas::new(10.0, 5.0).write_image(&dpmm(2.0));
        assert_eq!((img.width(), img.height()), (20, 10));
        assert!(img.data().iter().all(|&b| b == 255));
        assert_eq!(img.pixel(20, 0), None);
    }

    #[test]
    fn test_size_rounds_to_nearest() {
        let img = Canvas::new(10.3, 10.2).write_image(&dpmm(1.0));
        assert_eq!((img.width(), img.height()), (10, 10));
        let img = Canvas::new(10.5, 0.0).write_image(&dpmm(1.0));
        assert_eq!((img.width(), img.height()), (11, 0));
    }

    #[test]
    fn test_fill_orientation_y_up() {
        let mut c = Canvas::new(10.0, 10.0);
        c.set_fill_color(Rgba8::RED);
        // Bottom-left quadrant in document space.
        c.draw_path(0.0, 0.0, &Path::rectangle(5.0, 5.0));
        let img = c.write_image(&dpmm(1.0));
        assert_eq!(img.pixel(1, 8), Some(Rgba8::RED));
        assert_eq!(img.pixel(1, 1), Some(Rgba8::WHITE));
        assert_eq!(img.pixel(8, 8), Some(Rgba8::WHITE));
    }

    #[test]
    fn test_translucent_fill_blends_over_white() {
        let mut c = Canvas::new(4.0, 4.0);
        c.set_fill_color(Rgba8::new(0, 0, 0, 128));
        c.draw_path(0.0, 0.0, &Path::rectangle(4.0, 4.0));
        let img = c.write_image(&dpmm(1.0));
        let p = img.pixel(2, 2).unwrap();
        assert!((120..=135).contains(&p.r), "{p:?}");
        assert_eq!(p.a, 255);
    }

    #[test]
    fn test_stroke_painted_in_stroke_color() {
        let mut c = Canvas::new(20.0, 20.0);
        c.set_fill_color(Rgba8::TRANSPARENT);
        c.set_stroke_color(Rgba8::BLUE);
        c.set_stroke_width(2.0);
        c.set_stroke_capper(Capper::Butt);
        c.set_stroke_joiner(Joiner::miter());
        let mut line = Path::new();
        line.move_to(2.0, 10.0).line_to(18.0, 10.0);
        c.draw_path(0.0, 0.0, &line);
        let img = c.write_image(&dpmm(1.0));
        // Device rows 9 and 10 span document y in [9, 11].
        assert_eq!(img.pixel(10, 9), Some(Rgba8::BLUE));
        assert_eq!(img.pixel(10, 10), Some(Rgba8::BLUE));
        assert_eq!(img.pixel(10, 5), Some(Rgba8::WHITE));
        assert_eq!(img.pixel(0, 10), Some(Rgba8::WHITE));
    }

    #[test]
    fn test_even_odd_leaves_hole() {
        let mut ring = Path::rectangle(10.0, 10.0);
        ring.append(&Path::rectangle(4.0, 4.0).translate(3.0, 3.0));
        let mut c = Canvas::new(10.0, 10.0);
        c.set_fill_rule(FillRule::EvenOdd);
        c.draw_path(0.0, 0.0, &ring);
        let img = c.write_image(&dpmm(1.0));
        assert_eq!(img.pixel(5, 5), Some(Rgba8::WHITE));
        assert_eq!(img.pixel(1, 1), Some(Rgba8::BLACK));
    }

    #[test]
    fn test_geometry_outside_is_clipped() {
        let mut c = Canvas::new(5.0, 5.0);
        c.draw_path(-20.0, -20.0, &Path::rectangle(100.0, 100.0));
        let img = c.write_image(&dpmm(1.0));
        assert!(img
            .data()
            .chunks_exact(4)
            .all(|p| p == [0, 0, 0, 255]));
    }

    #[test]
    fn test_far_off_canvas_geometry() {
        let mut c = Canvas::new(10.0, 10.0);
        let mut tri = Path::new();
        tri.move_to(-1e9, -1e9).line_to(1e9, -1e9).line_to(0.0, 1e9).close();
        c.draw_path(0.0, 0.0, &tri);
        let img = c.write_image(&dpmm(1.0));
        assert_eq!(img.pixel(5, 5), Some(Rgba8::BLACK));
    }

    #[test]
    fn test_zero_tolerance_is_clamped() {
        let mut c = Canvas::new(10.0, 10.0);
        c.set_stroke_color(Rgba8::BLUE);
        c.set_stroke_width(2.0);
        c.set_stroke_capper(Capper::Round);
        let mut line = Path::new();
        line.move_to(2.0, 5.0).line_to(8.0, 5.0);
        c.draw_path(0.0, 0.0, &line);
        for tolerance in [0.0, -1.0, f64::NAN] {
            let opts = dpmm(1.0).with_tolerance(tolerance);
            assert_eq!(opts.tolerance, crate::curves::MIN_TOLERANCE);
            let img = c.write_image(&opts);
            assert_eq!(img.pixel(5, 4), Some(Rgba8::BLUE));
        }
        // A raw zero in the public field is clamped at render time.
        let opts = RasterOptions {
            tolerance: 0.0,
            ..dpmm(1.0)
        };
        assert_eq!(c.write_image(&opts).pixel(5, 4), Some(Rgba8::BLUE));
    }

    #[test]
    fn test_blend_clips_to_image() {
        let mut img = Image::new(4, 2);
        img.blend_hline(-2, 0, 10, Rgba8::RED, 255);
        img.blend_solid_hspan(3, 1, Rgba8::BLUE, &[255, 255, 255]);
        img.blend_hline(0, 5, 4, Rgba8::RED, 255);
        assert_eq!(img.pixel(0, 0), Some(Rgba8::RED));
        assert_eq!(img.pixel(3, 0), Some(Rgba8::RED));
        assert_eq!(img.pixel(3, 1), Some(Rgba8::BLUE));
        assert_eq!(img.pixel(2, 1), Some(Rgba8::WHITE));
    }
}
