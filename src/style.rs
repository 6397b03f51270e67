//! Stroke and fill style: cap and join policies and the draw state.

use crate::basics::FillRule;
use crate::color::Rgba8;

/// Policy for the free ends of an open stroked sub-path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Capper {
    /// Flat end at the end point.
    #[default]
    Butt,
    /// Semicircle of radius half the stroke width.
    Round,
    /// Flat end extended by half the stroke width.
    Square,
}

/// Policy for the corner where two stroked segments meet.
///
/// Limits are ratios of the miter spike length to half the stroke width,
/// the same convention SVG and PDF use for `miterlimit`. A NaN limit means
/// unbounded: the spike is never cut.
#[derive(Debug, Clone, PartialEq)]
pub enum Joiner {
    /// Extend both offset edges to their intersection. Corners whose spike
    /// exceeds `limit` are rendered with `fallback` instead.
    Miter { limit: f64, fallback: Box<Joiner> },
    Round,
    Bevel,
    /// Curvature-matching join, clipped like a miter beyond `limit`.
    Arcs { limit: f64 },
}

impl Joiner {
    /// Unbounded miter.
    pub fn miter() -> Joiner {
        Joiner::Miter {
            limit: f64::NAN,
            fallback: Box::new(Joiner::Bevel),
        }
    }

    /// Miter that falls back to bevel beyond `limit`.
    pub fn miter_clip(limit: f64) -> Joiner {
        Joiner::miter_with_fallback(limit, Joiner::Bevel)
    }

    pub fn miter_with_fallback(limit: f64, fallback: Joiner) -> Joiner {
        Joiner::Miter {
            limit,
            fallback: Box::new(fallback),
        }
    }

    pub fn arcs(limit: f64) -> Joiner {
        Joiner::Arcs { limit }
    }

    /// True for a miter or arcs joiner with a finite limit.
    pub fn is_limited(&self) -> bool {
        match self {
            Joiner::Miter { limit, .. } | Joiner::Arcs { limit } => limit.is_finite(),
            Joiner::Round | Joiner::Bevel => false,
        }
    }
}

impl Default for Joiner {
    fn default() -> Self {
        Joiner::miter()
    }
}

/// Style snapshot recorded with every layer.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawState {
    pub fill_color: Rgba8,
    pub stroke_color: Rgba8,
    pub stroke_width: f64,
    pub stroke_capper: Capper,
    pub stroke_joiner: Joiner,
    pub dash_offset: f64,
    pub dashes: Vec<f64>,
    pub fill_rule: FillRule,
}

impl DrawState {
    /// Fill is painted iff its color is not fully transparent.
    pub fn has_fill(&self) -> bool {
        self.fill_color.a != 0
    }

    /// Stroke is painted iff its color is visible and the width is positive.
    pub fn has_stroke(&self) -> bool {
        self.stroke_color.a != 0 && self.stroke_width > 0.0
    }

    /// Default state with the given fill and nothing else, used for text.
    pub fn with_fill(color: Rgba8) -> DrawState {
        DrawState {
            fill_color: color,
            ..DrawState::default()
        }
    }
}

impl Default for DrawState {
    fn default() -> Self {
        Self {
            fill_color: Rgba8::BLACK,
            stroke_color: Rgba8::TRANSPARENT,
            stroke_width: 1.0,
            stroke_capper: Capper::Butt,
            stroke_joiner: Joiner::miter(),
            dash_offset: 0.0,
            dashes: Vec::new(),
            fill_rule: FillRule::NonZero,
        }
    }
}
