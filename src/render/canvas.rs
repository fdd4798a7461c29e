use std::collections::TryReserveError;

use thiserror::Error;

use super::CoverageBitmap;

/// RGBA8 pixel buffer the glyph is placed on. Starts out fully transparent black.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Canvas {
    width: usize,
    height: usize,
    pixels: Vec<u8>,
}

impl Canvas {
    pub const BYTES_PER_PIXEL: usize = 4;
    /// Empty margin around the glyph on every side.
    pub const PADDING: usize = 5;

    /// Allocates a zeroed canvas, reporting allocation failure instead of aborting.
    pub fn new(width: usize, height: usize) -> Result<Self, AllocationError> {
        let len = width
            .checked_mul(height)
            .and_then(|pixels| pixels.checked_mul(Self::BYTES_PER_PIXEL))
            .ok_or(AllocationError::Overflow { width, height })?;

        let mut pixels = Vec::new();
        pixels.try_reserve_exact(len)?;
        pixels.resize(len, 0);

        Ok(Self { width, height, pixels })
    }

    /// Allocates a canvas with room for `bitmap` plus [`Self::PADDING`] on each side and composites it.
    pub fn for_bitmap(bitmap: &CoverageBitmap) -> Result<Self, AllocationError> {
        let margin = 2 * Self::PADDING;
        let (width, height) = (bitmap.width(), bitmap.height());

        let mut canvas = Self::new(
            width.checked_add(margin).ok_or(AllocationError::Overflow { width, height })?,
            height.checked_add(margin).ok_or(AllocationError::Overflow { width, height })?,
        )?;
        canvas.composite(bitmap);

        debug!("Composited {width}x{height} glyph onto {}x{} canvas", canvas.width, canvas.height);

        Ok(canvas)
    }

    /// Copies the coverage as the alpha channel of opaque black pixels, offset by [`Self::PADDING`].
    ///
    /// Leaves the canvas untouched unless it is at least `2 * PADDING` larger than the bitmap in
    /// both directions.
    fn composite(&mut self, bitmap: &CoverageBitmap) {
        let margin = 2 * Self::PADDING;
        if bitmap.width() + margin > self.width || bitmap.height() + margin > self.height {
            warn!(
                "{}x{} glyph does not fit on a {}x{} canvas",
                bitmap.width(),
                bitmap.height(),
                self.width,
                self.height
            );
            return;
        }

        for (y, row) in bitmap.rows().enumerate() {
            for (x, &alpha) in row.iter().enumerate() {
                let offset = self.offset(x + Self::PADDING, y + Self::PADDING);
                self.pixels[offset..offset + Self::BYTES_PER_PIXEL]
                    .copy_from_slice(&[0, 0, 0, alpha]);
            }
        }
    }

    /// RGBA value of a pixel, [`None`] if out of bounds.
    pub fn pixel(&self, x: usize, y: usize) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }

        let offset = self.offset(x, y);
        self.pixels[offset..offset + Self::BYTES_PER_PIXEL].try_into().ok()
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Interleaved RGBA bytes, row-major without row padding.
    pub fn as_bytes(&self) -> &[u8] {
        &self.pixels
    }

    fn offset(&self, x: usize, y: usize) -> usize {
        (y * self.width + x) * Self::BYTES_PER_PIXEL
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AllocationError {
    #[error("Canvas of {width}x{height} pixels does not fit in memory")]
    Overflow { width: usize, height: usize },

    #[error("Failed to allocate canvas: {0}")]
    Reserve(#[from] TryReserveError),
}
