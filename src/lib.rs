//! Renders a single character from a font file into a padded RGBA canvas and
//! stores it as a binary PPM image.
//!
//! The pipeline is strictly linear:
//!
//! 1. [`font::open_face`] loads a TrueType/OpenType or GRUB PFF2 font.
//! 2. [`font::FontFace`] looks up and rasterizes the glyph into a [`render::CoverageBitmap`].
//! 3. [`render::Canvas`] composites the coverage as black-on-transparent pixels.
//! 4. [`render::ppm`] blends the canvas onto white and writes the file.
//!
//! ```rust,no_run
//! # use glyph_render::{config::RenderConfig, render};
//! let config = RenderConfig::new("DejaVuSans.ttf", 'A', 48);
//! let glyph = render::run(&config)?;
//!
//! print!("{}", glyph.report());
//! # Ok::<(), render::RenderError>(())
//! ```

#[cfg(test)]
#[macro_use]
extern crate test_case;

#[macro_use]
extern crate log;

pub mod config;
pub mod font;
pub mod render;

/// Shared immutable storage for decoded font data.
pub type OwnedSlice<T> = std::rc::Rc<T>;
