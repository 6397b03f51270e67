//! Error taxonomy for exports and resource loading.
//!
//! Degenerate geometry (empty paths, zero-width or transparent paints) is
//! never an error: backends skip it silently.

/// Failures surfaced by the export backends and font loading.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// A backend was handed a stroke style it cannot express and for which
    /// no explicit-geometry fallback exists. Export is aborted.
    #[error("unsupported style for {backend}: {detail}")]
    UnsupportedStyle {
        backend: &'static str,
        detail: String,
    },
    /// Writing to the output sink failed. Partial output is not rolled back.
    #[error(transparent)]
    Io(#[from] std::io::Error),
    /// Font data could not be parsed.
    #[error("invalid font data: {0}")]
    Font(String),
}

pub type Result<T> = std::result::Result<T, Error>;
