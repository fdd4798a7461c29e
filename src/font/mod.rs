//! Font loading and glyph rasterization.
//!
//! Every supported format implements [`FontFace`], which is all the rendering pipeline needs to know about a font.
//! Use [`open_face`] to pick the right implementation for a file.

use std::{fs::read, io, path::Path};

use thiserror::Error;

use crate::render::{AllocationError, CoverageBitmap};

pub mod pff2;
pub mod truetype;

/// A font that can rasterize single glyphs at a pixel size.
pub trait FontFace {
    /// Selects the nominal pixel height used by subsequent [`FontFace::rasterize`] calls.
    fn set_pixel_size(&mut self, size_px: u32) -> Result<(), FontError>;

    /// Maps a character to the font's internal glyph id. Returns [`None`] if the font has no glyph for it.
    fn glyph_index(&self, character: char) -> Option<GlyphIndex>;

    fn rasterize(&self, index: GlyphIndex) -> Result<RasterizedGlyph, FontError>;
}

/// Font specific glyph id. Id `0` is reserved for the "missing glyph" and never handed out by [`FontFace`].
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct GlyphIndex(u32);

impl GlyphIndex {
    pub fn new(index: u32) -> Option<Self> {
        if index == 0 {
            return None;
        }

        Some(Self(index))
    }

    pub fn get(self) -> u32 {
        self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct GlyphMetrics {
    pub width: usize,
    pub height: usize,
    /// Horizontal advance in 26.6 fixed point (1/64 px).
    pub advance: i32,
    /// Distance from the pen position to the left edge of the bitmap.
    pub bearing_x: i32,
    /// Distance from the baseline to the top edge of the bitmap, positive upwards.
    pub bearing_y: i32,
}

impl GlyphMetrics {
    pub fn advance_px(&self) -> f64 {
        f64::from(self.advance) / 64.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterizedGlyph {
    pub bitmap: CoverageBitmap,
    pub metrics: GlyphMetrics,
}

#[derive(Error, Debug)]
pub enum FontError {
    #[error("Failed to read font file: {0}")]
    Io(#[from] io::Error),

    #[error("Unrecognized font format")]
    UnknownFormat,

    #[error("Failed to load TrueType font: {0}")]
    TrueType(&'static str),

    #[error("Failed to parse PFF2 font: {0}")]
    Pff2(#[from] pff2::ParserError),

    #[error("Invalid PFF2 font: {0}")]
    Pff2Validation(#[from] pff2::FontValidationError),

    #[error("Invalid pixel size: {0}")]
    InvalidPixelSize(u32),

    #[error("Glyph {0:?} does not exist in this font")]
    NoSuchGlyph(GlyphIndex),

    #[error(transparent)]
    Allocation(#[from] AllocationError),

    #[error("Glyph bitmap of {width}x{height} does not match its {len} bytes of data")]
    MalformedBitmap {
        width: usize,
        height: usize,
        len: usize,
    },
}

/// Reads the file at `path` and opens it with the backend matching its magic bytes.
pub fn open_face<P: AsRef<Path>>(path: P) -> Result<Box<dyn FontFace>, FontError> {
    let path = path.as_ref();
    let data = read(path)?;

    debug!("Read {} bytes from {}", data.len(), path.display());

    match FontFormat::detect(&data) {
        Some(FontFormat::Pff2) => {
            info!("Opening {} as a PFF2 bitmap font", path.display());
            let font = pff2::Parser::parse(&data)?.validate()?;
            Ok(Box::new(font))
        }
        Some(FontFormat::TrueType) => {
            info!("Opening {} as a TrueType/OpenType font", path.display());
            Ok(Box::new(truetype::TrueTypeFace::from_bytes(data)?))
        }
        None => Err(FontError::UnknownFormat),
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum FontFormat {
    TrueType,
    Pff2,
}

impl FontFormat {
    fn detect(data: &[u8]) -> Option<Self> {
        if data.starts_with(pff2::Parser::MAGIC) {
            return Some(Self::Pff2);
        }

        match data.get(..4)? {
            // TrueType 1.0, Apple `true`, CFF based OpenType, collections
            [0x00, 0x01, 0x00, 0x00] | b"true" | b"OTTO" | b"ttcf" => Some(Self::TrueType),
            _ => None,
        }
    }
}
