//! # vector-canvas
//!
//! A vector-graphics canvas that records paths and text in layers and
//! exports the same scene to SVG, PDF, EPS and anti-aliased RGBA images.
//!
//! Document units are millimetres with y pointing up. Every backend decides
//! per layer whether the style maps onto its native primitives; when it
//! does not, strokes are converted into filled outlines so the output still
//! looks the same.
//!
//! ## Architecture
//!
//! 1. **Model**: `Path`, `Rgba8`, `Capper`, `Joiner`, `DrawState`
//! 2. **Kernel**: stroke outlines (`math_stroke`, `stroke`) and dashing (`dash`)
//! 3. **Layers**: `Canvas` snapshots the draw state into each `Layer`
//! 4. **Backends**: `svg`, `pdf`, `eps`, and `rasterizer` + `image`
//!
//! ```
//! use vector_canvas::{Canvas, Path, Rgba8};
//!
//! let mut canvas = Canvas::new(50.0, 20.0);
//! canvas.set_fill_color(Rgba8::RED);
//! canvas.draw_path(5.0, 5.0, &Path::rectangle(10.0, 10.0));
//!
//! let mut svg = Vec::new();
//! canvas.write_svg(&mut svg).unwrap();
//! assert!(String::from_utf8(svg).unwrap().contains("fill=\"#ff0000\""));
//! ```

// Model
pub mod basics;
pub mod color;
pub mod curves;
pub mod math;
pub mod path;
pub mod style;
pub mod trans_affine;

// Stroking & dashing
pub mod dash;
pub mod math_stroke;
pub mod stroke;

// Layers
pub mod canvas;
pub mod error;
pub mod text;

// Backends
pub mod eps;
pub mod image;
pub mod pdf;
pub mod rasterizer;
mod svg;

pub use basics::{FillRule, PointD};
pub use canvas::{Canvas, Layer, INCH_PER_MM, MM_PER_INCH, MM_PER_PT, PT_PER_MM};
pub use color::Rgba8;
pub use error::{Error, Result};
pub use image::{Image, RasterOptions, Resolution};
pub use path::{Path, Polyline, Segment};
pub use style::{Capper, DrawState, Joiner};
#[cfg(feature = "font")]
pub use text::TextLine;
pub use text::{Font, TextSource};
pub use trans_affine::TransAffine;
