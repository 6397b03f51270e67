//! Canvas: the document size, the current draw state and the layer stack.
//!
//! Layers are append-only and each carries a snapshot of the draw state
//! taken when it was recorded. Exports borrow the canvas immutably, so one
//! canvas can be exported by several threads at once as long as nobody is
//! drawing into it at the same time.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::sync::Arc;

use crate::basics::FillRule;
use crate::color::Rgba8;
use crate::error::Result;
use crate::image::{Image, RasterOptions};
use crate::path::Path;
use crate::style::{Capper, DrawState, Joiner};
use crate::text::{Font, TextSource};

/// Millimetres per typographic point.
pub const MM_PER_PT: f64 = 0.3527777777777778;
/// Typographic points per millimetre.
pub const PT_PER_MM: f64 = 1.0 / MM_PER_PT;
pub const MM_PER_INCH: f64 = 25.4;
pub const INCH_PER_MM: f64 = 1.0 / 25.4;

// ============================================================================
// Layer
// ============================================================================

/// One recorded draw operation.
#[derive(Debug, Clone)]
pub enum Layer {
    /// A path in document space with its style snapshot.
    Path { path: Path, state: DrawState },
    /// Text placed at `(x, y)`, rotated counter-clockwise by `rotation`
    /// degrees about its origin.
    Text {
        text: Arc<dyn TextSource>,
        x: f64,
        y: f64,
        rotation: f64,
    },
}

impl Layer {
    /// Visit every painted path of the layer in document space.
    ///
    /// Text is decomposed into its outlines, each rotated about the text
    /// origin, moved to the layer position and filled with its own color.
    pub fn for_each_path<E, F>(&self, mut f: F) -> std::result::Result<(), E>
    where
        F: FnMut(&Path, &DrawState) -> std::result::Result<(), E>,
    {
        match self {
            Layer::Path { path, state } => f(path, state),
            Layer::Text {
                text,
                x,
                y,
                rotation,
            } => {
                let (paths, colors) = text.to_paths();
                for (path, color) in paths.iter().zip(colors) {
                    let placed = path.rotate(*rotation, 0.0, 0.0).translate(*x, *y);
                    if placed.is_empty() {
                        continue;
                    }
                    f(&placed, &DrawState::with_fill(color))?;
                }
                Ok(())
            }
        }
    }
}

// ============================================================================
// Canvas
// ============================================================================

/// A fixed-size drawing surface in millimetres with y pointing up.
#[derive(Debug, Clone)]
pub struct Canvas {
    width: f64,
    height: f64,
    layers: Vec<Layer>,
    fonts: Vec<Arc<Font>>,
    state: DrawState,
}

impl Canvas {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            layers: Vec::new(),
            fonts: Vec::new(),
            state: DrawState::default(),
        }
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    /// Distinct fonts referenced by text layers, in first-use order.
    pub fn fonts(&self) -> &[Arc<Font>] {
        &self.fonts
    }

    /// The style the next draw call will snapshot.
    pub fn state(&self) -> &DrawState {
        &self.state
    }

    // ------------------------------------------------------------------
    // Draw state
    // ------------------------------------------------------------------

    pub fn set_fill_color(&mut self, color: Rgba8) {
        self.state.fill_color = color;
    }

    pub fn set_stroke_color(&mut self, color: Rgba8) {
        self.state.stroke_color = color;
    }

    pub fn set_stroke_width(&mut self, width: f64) {
        self.state.stroke_width = width;
    }

    pub fn set_stroke_capper(&mut self, capper: Capper) {
        self.state.stroke_capper = capper;
    }

    pub fn set_stroke_joiner(&mut self, joiner: Joiner) {
        self.state.stroke_joiner = joiner;
    }

    /// Dash pattern and phase. An empty pattern draws solid strokes.
    pub fn set_dashes(&mut self, offset: f64, dashes: &[f64]) {
        self.state.dash_offset = offset;
        self.state.dashes = dashes.to_vec();
    }

    pub fn set_fill_rule(&mut self, rule: FillRule) {
        self.state.fill_rule = rule;
    }

    /// Restore the default draw state.
    pub fn reset_state(&mut self) {
        self.state = DrawState::default();
    }

    // ------------------------------------------------------------------
    // Drawing
    // ------------------------------------------------------------------

    /// Record `path` translated by `(x, y)` with the current state.
    /// Empty paths are dropped.
    pub fn draw_path(&mut self, x: f64, y: f64, path: &Path) {
        let path = path.translate(x, y);
        if path.is_empty() {
            log::trace!("dropping empty path at ({x}, {y})");
            return;
        }
        self.layers.push(Layer::Path {
            path,
            state: self.state.clone(),
        });
    }

    pub fn draw_text(&mut self, x: f64, y: f64, text: Arc<dyn TextSource>) {
        self.draw_text_rotated(x, y, 0.0, text);
    }

    /// Record text at `(x, y)` rotated by `rotation` degrees and register
    /// its fonts for embedding.
    pub fn draw_text_rotated(&mut self, x: f64, y: f64, rotation: f64, text: Arc<dyn TextSource>) {
        for font in text.fonts() {
            if !self.fonts.iter().any(|f| Arc::ptr_eq(f, &font)) {
                self.fonts.push(font);
            }
        }
        self.layers.push(Layer::Text {
            text,
            x,
            y,
            rotation,
        });
    }

    // ------------------------------------------------------------------
    // Export
    // ------------------------------------------------------------------

    pub fn write_svg<W: Write>(&self, mut w: W) -> Result<()> {
        crate::svg::write_svg(self, &mut w)?;
        w.flush()?;
        Ok(())
    }

    pub fn write_pdf<W: Write>(&self, w: W) -> Result<()> {
        crate::pdf::write_pdf(self, w)?;
        Ok(())
    }

    pub fn write_eps<W: Write>(&self, w: W) -> Result<()> {
        crate::eps::write_eps(self, w)?;
        Ok(())
    }

    /// Rasterize onto an opaque white image.
    pub fn write_image(&self, options: &RasterOptions) -> Image {
        crate::image::render(self, options)
    }

    pub fn save_svg(&self, path: impl AsRef<std::path::Path>) -> Result<()> {
        self.write_svg(BufWriter::new(File::create(path)?))
    }

    pub fn save_pdf(&self, path: impl AsRef<std::path::Path>) -> Result<()> {
        self.write_pdf(BufWriter::new(File::create(path)?))
    }

    pub fn save_eps(&self, path: impl AsRef<std::path::Path>) -> Result<()> {
        self.write_eps(BufWriter::new(File::create(path)?))
    }
}

// ============================================================================
// Tests
// ============================================================================
