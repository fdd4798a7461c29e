//! Turning a glyph into an image file.

use std::fmt::{self, Display};

use thiserror::Error;

use crate::{
    config::RenderConfig,
    font::{self, FontError, FontFace, GlyphMetrics},
};

mod bitmap;
mod canvas;
pub mod ppm;

pub use bitmap::CoverageBitmap;
pub use canvas::{AllocationError, Canvas};
pub use ppm::WriteError;

/// A glyph composited onto its canvas, ready to be written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedGlyph {
    pub character: char,
    pub metrics: GlyphMetrics,
    pub canvas: Canvas,
}

impl RenderedGlyph {
    /// Human readable summary of the glyph metrics.
    pub fn report(&self) -> MetricsReport<'_> {
        MetricsReport(self)
    }
}

pub struct MetricsReport<'a>(&'a RenderedGlyph);

impl Display for MetricsReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let RenderedGlyph { character, metrics, .. } = self.0;

        writeln!(f, "Glyph metrics for '{character}':")?;
        writeln!(f, "  Width: {} pixels", metrics.width)?;
        writeln!(f, "  Height: {} pixels", metrics.height)?;
        writeln!(f, "  Advance width: {:.2} pixels", metrics.advance_px())?;
        writeln!(f, "  Bearing X: {} pixels", metrics.bearing_x)?;
        writeln!(f, "  Bearing Y: {} pixels", metrics.bearing_y)
    }
}

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Failed to load font {}", path.display())]
    LoadFont {
        path: std::path::PathBuf,
        source: FontError,
    },

    #[error("Failed to set font size to {size_px}px")]
    SetSize { size_px: u32, source: FontError },

    #[error("Character {0:?} not found in font")]
    GlyphNotFound(char),

    #[error("Failed to render glyph for {character:?}")]
    Rasterize { character: char, source: FontError },

    #[error("Failed to allocate memory for buffer")]
    Allocation(#[from] AllocationError),

    #[error(transparent)]
    Write(#[from] WriteError),
}

/// Rasterizes `config.character` from `face` at `config.size_px` and places it on a padded canvas.
pub fn render_glyph<F: FontFace + ?Sized>(
    face: &mut F,
    config: &RenderConfig,
) -> Result<RenderedGlyph, RenderError> {
    let RenderConfig {
        character, size_px, ..
    } = *config;

    face.set_pixel_size(size_px)
        .map_err(|source| RenderError::SetSize { size_px, source })?;

    let index = face
        .glyph_index(character)
        .ok_or(RenderError::GlyphNotFound(character))?;
    debug!("Character {character:?} maps to glyph {}", index.get());

    let glyph = face.rasterize(index).map_err(|source| match source {
        FontError::Allocation(e) => RenderError::Allocation(e),
        source => RenderError::Rasterize { character, source },
    })?;

    let canvas = Canvas::for_bitmap(&glyph.bitmap)?;

    Ok(RenderedGlyph {
        character,
        metrics: glyph.metrics,
        canvas,
    })
}

/// Loads the font, renders the glyph and writes it to `config.output`.
///
/// Nothing is written unless every step before it succeeded.
pub fn run(config: &RenderConfig) -> Result<RenderedGlyph, RenderError> {
    let mut face = font::open_face(&config.font_path).map_err(|source| RenderError::LoadFont {
        path: config.font_path.clone(),
        source,
    })?;

    let rendered = render_glyph(face.as_mut(), config)?;

    ppm::save_ppm(&rendered.canvas, &config.output)?;

    Ok(rendered)
}
