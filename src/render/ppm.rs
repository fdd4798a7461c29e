//! Binary PPM (`P6`) output.
//!
//! PPM has no alpha channel, so the canvas is flattened onto an opaque white background first.

use std::{
    fs::File,
    io::{self, BufWriter, Write},
    path::{Path, PathBuf},
};

use thiserror::Error;

use super::Canvas;

const MAGIC: &str = "P6";
const MAX_VALUE: u8 = 255;

/// Blends a color channel onto white, weighted by `alpha`. Rounds towards zero.
///
/// ```rust
/// # use glyph_render::render::ppm::blend_over_white;
/// assert_eq!(blend_over_white(0, 0), 255);
/// assert_eq!(blend_over_white(0, 255), 0);
/// assert_eq!(blend_over_white(0, 128), 127);
/// ```
pub fn blend_over_white(channel: u8, alpha: u8) -> u8 {
    let (channel, alpha) = (u32::from(channel), u32::from(alpha));

    // At most 255 * 255 / 255, always fits
    ((channel * alpha + 255 * (255 - alpha)) / 255) as u8
}

/// The header preceding the pixel data, including its trailing newline.
pub fn header(width: usize, height: usize) -> String {
    format!("{MAGIC}\n{width} {height}\n{MAX_VALUE}\n")
}

/// Writes the canvas as a `P6` image: a text header followed by row-major RGB triples.
pub fn write_ppm<W: Write>(canvas: &Canvas, mut writer: W) -> io::Result<()> {
    writer.write_all(header(canvas.width(), canvas.height()).as_bytes())?;

    for pixel in canvas.as_bytes().chunks_exact(Canvas::BYTES_PER_PIXEL) {
        let [r, g, b, alpha] = [pixel[0], pixel[1], pixel[2], pixel[3]];

        writer.write_all(&[
            blend_over_white(r, alpha),
            blend_over_white(g, alpha),
            blend_over_white(b, alpha),
        ])?;
    }

    writer.flush()
}

/// Creates (or truncates) the file at `path`, writes the canvas into it and confirms on stdout.
pub fn save_ppm<P: AsRef<Path>>(canvas: &Canvas, path: P) -> Result<(), WriteError> {
    let path = path.as_ref();

    let file = File::create(path).map_err(|source| WriteError::Open {
        path: path.to_owned(),
        source,
    })?;

    write_ppm(canvas, BufWriter::new(file)).map_err(|source| WriteError::Write {
        path: path.to_owned(),
        source,
    })?;

    debug!("Wrote {}x{} image to {}", canvas.width(), canvas.height(), path.display());
    println!("Saved output to {}", path.display());

    Ok(())
}

#[derive(Error, Debug)]
pub enum WriteError {
    #[error("Failed to open file for writing: {}", path.display())]
    Open { path: PathBuf, source: io::Error },

    #[error("Failed to write image data to {}", path.display())]
    Write { path: PathBuf, source: io::Error },
}

#[cfg(test)]
mod tests {
    use std::{env, fs, process};

    use super::{blend_over_white, header, save_ppm, write_ppm, WriteError};
    use crate::render::{Canvas, CoverageBitmap};

    #[test_case(0, 0 => 255; "transparent is white")]
    #[test_case(0, 255 => 0; "opaque black is black")]
    #[test_case(0, 128 => 127; "half black truncates")]
    #[test_case(0, 1 => 254; "barely visible")]
    #[test_case(200, 255 => 200; "opaque color is unchanged")]
    #[test_case(255, 17 => 255; "white on white")]
    #[test_case(100, 100 => 194; "mixed")]
    fn blend(channel: u8, alpha: u8) -> u8 {
        blend_over_white(channel, alpha)
    }

    #[test]
    fn blend_black_matches_linear_interpolation() {
        for alpha in 0..=255u8 {
            let expected = (255 * (255 - u32::from(alpha)) / 255) as u8;
            assert_eq!(blend_over_white(0, alpha), expected, "alpha {alpha}");
        }
    }

    #[test_case(12, 12 => "P6\n12 12\n255\n"; "glyph canvas")]
    #[test_case(10, 10 => "P6\n10 10\n255\n"; "empty glyph canvas")]
    #[test_case(123, 7 => "P6\n123 7\n255\n"; "uneven digits")]
    fn header_text(width: usize, height: usize) -> String {
        header(width, height)
    }

    #[test_case(10, 10; "square")]
    #[test_case(37, 52; "tall")]
    fn file_size_is_header_plus_rgb(width: usize, height: usize) {
        let canvas = Canvas::new(width, height).unwrap();
        let mut out = Vec::new();

        write_ppm(&canvas, &mut out).unwrap();

        assert_eq!(out.len(), header(width, height).len() + width * height * 3);
    }

    #[test]
    fn glyph_pixels_blend_onto_white() {
        let bitmap = CoverageBitmap::new(2, 2, 2, vec![255, 0, 0, 128]).unwrap();
        let canvas = Canvas::for_bitmap(&bitmap).unwrap();
        let mut out = Vec::new();

        write_ppm(&canvas, &mut out).unwrap();

        let (head, body) = out.split_at(header(12, 12).len());
        assert_eq!(head, b"P6\n12 12\n255\n");

        let rgb = |x: usize, y: usize| &body[(y * 12 + x) * 3..(y * 12 + x) * 3 + 3];
        assert_eq!(rgb(5, 5), [0, 0, 0]);
        assert_eq!(rgb(6, 5), [255, 255, 255]);
        assert_eq!(rgb(5, 6), [255, 255, 255]);
        assert_eq!(rgb(6, 6), [127, 127, 127]);
        assert_eq!(rgb(0, 0), [255, 255, 255]);

        let white = body.iter().filter(|&&c| c == 255).count();
        assert_eq!(white, (12 * 12 - 2) * 3);
    }

    #[test]
    fn save_writes_file() -> anyhow::Result<()> {
        let path = env::temp_dir().join(format!("glyph-render-save-{}.ppm", process::id()));
        let canvas = Canvas::new(10, 10)?;

        save_ppm(&canvas, &path)?;
        let written = fs::read(&path)?;
        fs::remove_file(&path)?;

        assert_eq!(written.len(), header(10, 10).len() + 300);
        Ok(())
    }

    #[test]
    fn unwritable_path_is_an_error() {
        let dir = env::temp_dir().join(format!("glyph-render-missing-{}", process::id()));
        let path = dir.join("out.ppm");
        let canvas = Canvas::new(10, 10).unwrap();

        let result = save_ppm(&canvas, &path);

        assert!(matches!(result, Err(WriteError::Open { path: p, .. }) if p == path));
        assert!(!path.exists());
    }
}
