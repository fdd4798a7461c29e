use crate::OwnedSlice;

/// 8-bit glyph coverage as produced by a rasterizer. `0` is transparent, `255` is fully covered.
///
/// Rows are `pitch` bytes apart, which may be more than `width` when the rasterizer pads its rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoverageBitmap {
    width: usize,
    height: usize,
    pitch: usize,
    buffer: OwnedSlice<[u8]>,
}

impl CoverageBitmap {
    /// Wraps the coverage buffer, verifying that `pitch >= width` and that the buffer holds at least `height` rows
    /// of `pitch` bytes.
    pub fn new<B: Into<OwnedSlice<[u8]>>>(
        width: usize,
        height: usize,
        pitch: usize,
        buffer: B,
    ) -> Option<Self> {
        let buffer = buffer.into();

        if pitch < width || buffer.len() < height.checked_mul(pitch)? {
            return None;
        }

        Some(Self {
            width,
            height,
            pitch,
            buffer,
        })
    }

    /// Coverage of the pixel or [`None`] if out of bounds.
    pub fn coverage(&self, x: usize, y: usize) -> Option<u8> {
        if x >= self.width || y >= self.height {
            return None;
        }

        Some(self.buffer[y * self.pitch + x])
    }

    /// Bitmap width (line length)
    pub fn width(&self) -> usize {
        self.width
    }

    /// Bitmap height (number of lines)
    pub fn height(&self) -> usize {
        self.height
    }

    /// Yields the visible part of every row, skipping the pitch padding.
    pub fn rows(&self) -> impl Iterator<Item = &[u8]> + '_ {
        (0..self.height).map(move |y| &self.buffer[y * self.pitch..y * self.pitch + self.width])
    }
}

#[cfg(test)]
mod tests {
    use super::CoverageBitmap;

    #[test_case(2, 2, 2, 4 => true; "exact")]
    #[test_case(2, 2, 4, 8 => true; "padded rows")]
    #[test_case(2, 2, 4, 6 => false; "padded rows truncated buffer")]
    #[test_case(3, 1, 2, 6 => false; "pitch narrower than width")]
    #[test_case(0, 0, 0, 0 => true; "empty")]
    #[test_case(2, 2, 2, 9 => true; "trailing bytes")]
    fn new(width: usize, height: usize, pitch: usize, len: usize) -> bool {
        CoverageBitmap::new(width, height, pitch, vec![0; len]).is_some()
    }

    #[test_case(0, 0 => Some(1); "top left")]
    #[test_case(1, 0 => Some(2); "top right")]
    #[test_case(0, 1 => Some(3); "skips row padding")]
    #[test_case(1, 1 => Some(4); "bottom right")]
    #[test_case(2, 0 => None; "padding column is out of bounds")]
    #[test_case(0, 2 => None; "below last row")]
    fn coverage(x: usize, y: usize) -> Option<u8> {
        let bitmap = CoverageBitmap::new(2, 2, 3, vec![1, 2, 99, 3, 4, 99]).unwrap();

        bitmap.coverage(x, y)
    }

    #[test]
    fn rows_skip_padding() {
        let bitmap = CoverageBitmap::new(2, 2, 3, vec![1, 2, 99, 3, 4, 99]).unwrap();

        assert_eq!(bitmap.rows().collect::<Vec<_>>(), vec![&[1, 2][..], &[3, 4][..]]);
    }
}
