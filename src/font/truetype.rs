//! TrueType and OpenType outlines, rasterized with [`fontdue`].

use fontdue::{Font, FontSettings, Metrics};

use super::{FontError, FontFace, GlyphIndex, GlyphMetrics, RasterizedGlyph};
use crate::render::CoverageBitmap;

pub struct TrueTypeFace {
    font: Font,
    size_px: f32,
}

impl TrueTypeFace {
    /// Size used until [`FontFace::set_pixel_size`] is called.
    pub const DEFAULT_SIZE_PX: u32 = 16;

    pub fn from_bytes<D: AsRef<[u8]>>(data: D) -> Result<Self, FontError> {
        let font = Font::from_bytes(data.as_ref(), FontSettings::default())
            .map_err(FontError::TrueType)?;

        debug!("Loaded TrueType font with {} glyphs", font.glyph_count());

        Ok(Self {
            font,
            size_px: Self::DEFAULT_SIZE_PX as f32,
        })
    }
}

impl FontFace for TrueTypeFace {
    fn set_pixel_size(&mut self, size_px: u32) -> Result<(), FontError> {
        if size_px == 0 {
            return Err(FontError::InvalidPixelSize(size_px));
        }

        self.size_px = size_px as f32;
        Ok(())
    }

    fn glyph_index(&self, character: char) -> Option<GlyphIndex> {
        GlyphIndex::new(u32::from(self.font.lookup_glyph_index(character)))
    }

    fn rasterize(&self, index: GlyphIndex) -> Result<RasterizedGlyph, FontError> {
        let id = u16::try_from(index.get())
            .ok()
            .filter(|&id| id < self.font.glyph_count())
            .ok_or(FontError::NoSuchGlyph(index))?;

        let (metrics, coverage) = self.font.rasterize_indexed(id, self.size_px);
        trace!("Rasterized glyph {id} at {}px: {metrics:?}", self.size_px);

        let len = coverage.len();
        let bitmap = CoverageBitmap::new(metrics.width, metrics.height, metrics.width, coverage)
            .ok_or(FontError::MalformedBitmap {
                width: metrics.width,
                height: metrics.height,
                len,
            })?;

        Ok(RasterizedGlyph {
            bitmap,
            metrics: glyph_metrics(&metrics),
        })
    }
}

fn glyph_metrics(metrics: &Metrics) -> GlyphMetrics {
    GlyphMetrics {
        width: metrics.width,
        height: metrics.height,
        advance: (metrics.advance_width * 64.0).round() as i32,
        bearing_x: metrics.xmin,
        // fontdue measures from the baseline to the bottom edge
        bearing_y: metrics.ymin + metrics.height as i32,
    }
}
