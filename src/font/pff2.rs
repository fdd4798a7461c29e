//! GRUB's PFF2 bitmap font format.
//!
//! A PFF2 file is a sequence of sections, each a 4 byte name, a big endian `u32` length and the payload. The first
//! section is always `FILE` containing `PFF2`. The `DATA` section is last and its glyph records are addressed by
//! absolute file offsets stored in the `CHIX` (character index) section.
//!
//! ```rust,no_run
//! # use glyph_render::font::{pff2::Parser, FontFace};
//! let data = std::fs::read("unicode.pf2")?;
//! let font = Parser::parse(&data)?.validate()?;
//!
//! let glyph = font.glyph_index('A').map(|index| font.rasterize(index));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use core::fmt::Debug;
use std::{marker::PhantomData, string::FromUtf8Error};

use nom::{
    bytes::complete::{tag, take},
    combinator::all_consuming,
    multi::many0,
    number::complete::{be_i16, be_u16, be_u32, u8 as byte},
    sequence::tuple,
    IResult, InputLength, ToUsize,
};
use thiserror::Error;

use super::{FontError, FontFace, GlyphIndex, GlyphMetrics, RasterizedGlyph};
use crate::{
    render::{AllocationError, CoverageBitmap},
    OwnedSlice,
};

pub type Font = Pff2<Validated>;
pub type Parser = Pff2<Unchecked>;

#[allow(private_bounds)]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pff2<T: FontValidation> {
    pub name: String,
    pub family: String,
    pub point_size: u16,
    pub weight: String,
    pub max_char_width: u16,
    pub max_char_height: u16,
    pub ascent: u16,
    pub descent: u16,
    /// Sorted by [`Glyph::code`].
    pub glyphs: OwnedSlice<[Glyph]>,

    _validation: PhantomData<T>,
}

impl<T: FontValidation> Default for Pff2<T> {
    fn default() -> Self {
        Self {
            name: Default::default(),
            family: Default::default(),
            point_size: Default::default(),
            weight: Default::default(),
            max_char_width: Default::default(),
            max_char_height: Default::default(),
            ascent: Default::default(),
            descent: Default::default(),

            glyphs: OwnedSlice::new([]),

            _validation: Default::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Glyph {
    /// Unicode code point
    pub code: u32,

    pub width: u16,
    pub height: u16,
    /// Offset of the bitmap's left edge from the pen position
    pub x_offset: i16,
    /// Offset of the bitmap's bottom edge from the baseline
    pub y_offset: i16,
    /// Horizontal advance in pixels
    pub device_width: i16,

    /// 1 bit per pixel, MSB first, rows are not padded to byte boundaries
    pub bitmap: OwnedSlice<[u8]>,
}

impl Glyph {
    /// Calculates the number of bytes required to store a packed bitmap of this size.
    pub fn byte_count_from_size(width: usize, height: usize) -> usize {
        (width * height + 7) / 8
    }

    /// Returns [`Some(true)`] if the pixel is filled, [`Some(false)`] if the pixel if transparent, [`None`] if out
    /// of bounds.
    pub fn pixel(&self, x: usize, y: usize) -> Option<bool> {
        if x >= usize::from(self.width) || y >= usize::from(self.height) {
            return None;
        }

        let index = y * usize::from(self.width) + x;
        let byte = self.bitmap.get(index / 8)?;
        let bit_index = 7 - (index % 8);

        Some((byte >> bit_index) & 1 != 0)
    }

    /// Expands the packed bitmap into one coverage byte per pixel, `pitch == width`.
    pub fn coverage(&self) -> Result<CoverageBitmap, FontError> {
        let (width, height) = (usize::from(self.width), usize::from(self.height));
        let malformed = || FontError::MalformedBitmap {
            width,
            height,
            len: self.bitmap.len(),
        };

        let len = width
            .checked_mul(height)
            .ok_or(AllocationError::Overflow { width, height })?;
        let mut coverage = Vec::new();
        coverage
            .try_reserve_exact(len)
            .map_err(AllocationError::from)?;

        for y in 0..height {
            for x in 0..width {
                let filled = self.pixel(x, y).ok_or_else(malformed)?;
                coverage.push(if filled { u8::MAX } else { 0 });
            }
        }

        CoverageBitmap::new(width, height, width, coverage).ok_or_else(malformed)
    }
}

impl Parser {
    pub const MAGIC: &'static [u8; 4 + 4 + 4] = b"FILE\0\0\0\x04PFF2";

    pub fn parse(input: &[u8]) -> Result<Self, ParserError> {
        let file = input; // Glyph offsets are absolute

        let (mut input, _) = tag::<_, _, ()>(&Self::MAGIC[..])(input)
            .map_err(|_| ParserError::BadMagicBytes)?;

        let mut font = Self::default();
        let mut char_indexes = Vec::new();

        while input.input_len() != 0 {
            let (rest, (name, length)) =
                section_header(input).map_err(|_| ParserError::InsufficientHeaderBytes)?;

            let Ok(section) = SectionName::try_from(name) else {
                debug!("Skipping unknown PFF2 section {:?}", String::from_utf8_lossy(&name));
                input = rest.get(length..).ok_or(ParserError::TruncatedSection(name))?;
                continue;
            };

            let data = rest.get(..length);

            use SectionName::*;
            match (section, data) {
                // DATA runs until the end of the file, its length field is meaningless
                (Data, _) => {
                    font.glyphs = Self::parse_glyphs(char_indexes, file);
                    break;
                }
                (_, None) => return Err(ParserError::TruncatedSection(name)),
                (FontName, Some(data)) => font.name = Self::parse_string(data)?,
                (Family, Some(data)) => font.family = Self::parse_string(data)?,
                (PointSize, Some(data)) => font.point_size = Self::parse_u16(data)?,
                (Weight, Some(data)) => font.weight = Self::parse_string(data)?,
                (MaxCharWidth, Some(data)) => font.max_char_width = Self::parse_u16(data)?,
                (MaxCharHeight, Some(data)) => font.max_char_height = Self::parse_u16(data)?,
                (Ascent, Some(data)) => font.ascent = Self::parse_u16(data)?,
                (Descent, Some(data)) => font.descent = Self::parse_u16(data)?,
                (CharIndex, Some(data)) => char_indexes = Self::parse_char_indexes(data)?,
            }

            input = &rest[length..];
        }

        debug!("Parsed PFF2 font {:?} with {} glyphs", font.name, font.glyphs.len());

        Ok(font)
    }

    fn parse_string(input: &[u8]) -> Result<String, FromUtf8Error> {
        let input = input.strip_suffix(&[0]).unwrap_or(input);

        String::from_utf8(input.to_vec())
    }

    fn parse_u16(input: &[u8]) -> Result<u16, ParserError> {
        all_consuming(be_u16::<_, ()>)(input)
            .map(|(_, value)| value)
            .map_err(|_| ParserError::InvalidU16Length(input.len()))
    }

    fn parse_char_indexes(input: &[u8]) -> Result<Vec<CharIndexEntry>, ParserError> {
        let (_, entries) = all_consuming(many0(char_index))(input)
            .map_err(|_| ParserError::InvalidCharacterIndex)?;

        Ok(entries)
    }

    fn parse_glyphs(indexes: Vec<CharIndexEntry>, file: &[u8]) -> OwnedSlice<[Glyph]> {
        let mut glyphs = Vec::with_capacity(indexes.len());

        for index in indexes {
            let Some(record) = file.get(index.offset..) else {
                warn!("Glyph U+{:04X} points past the end of the file, skipping", index.code);
                continue;
            };

            match glyph(index.code, record) {
                Ok((_, glyph)) => glyphs.push(glyph),
                Err(_) => warn!("Glyph U+{:04X} is truncated, skipping", index.code),
            }
        }

        glyphs.sort_by_key(|glyph| glyph.code);
        glyphs.dedup_by_key(|glyph| glyph.code);

        OwnedSlice::from(glyphs)
    }

    pub fn validate(self) -> Result<Font, FontValidationError> {
        use FontValidationError::*;
        if self.name.is_empty() {
            return Err(EmptyName);
        }

        for (prop, err) in [
            (self.max_char_width, ZeroMaxCharWidth),
            (self.max_char_height, ZeroMaxCharHeight),
            (self.ascent, ZeroAscent),
            (self.descent, ZeroDescent),
        ] {
            if prop == 0 {
                return Err(err);
            }
        }

        if self.glyphs.is_empty() {
            return Err(NoGlyphs);
        }

        if let Some(glyph) = self.glyphs.iter().find(|glyph| {
            glyph.width > self.max_char_width || glyph.height > self.max_char_height
        }) {
            return Err(OversizedGlyph {
                code: glyph.code,
                width: glyph.width,
                height: glyph.height,
            });
        }

        Ok(Font {
            name: self.name,
            family: self.family,
            point_size: self.point_size,
            weight: self.weight,
            max_char_width: self.max_char_width,
            max_char_height: self.max_char_height,
            ascent: self.ascent,
            descent: self.descent,
            glyphs: self.glyphs,
            _validation: PhantomData,
        })
    }
}

impl Font {
    pub fn glyph(&self, character: char) -> Option<&Glyph> {
        let index = self.glyph_index(character)?;

        self.glyphs.get(index.get().to_usize() - 1)
    }
}

impl FontFace for Font {
    /// Bitmap fonts come in one size only, a mismatch is reported but the glyphs are not scaled.
    fn set_pixel_size(&mut self, size_px: u32) -> Result<(), FontError> {
        if size_px == 0 {
            return Err(FontError::InvalidPixelSize(size_px));
        }

        if size_px != u32::from(self.point_size) {
            warn!(
                "{} is a {}px bitmap font, rendering at {size_px}px is not supported",
                self.name, self.point_size
            );
        }

        Ok(())
    }

    fn glyph_index(&self, character: char) -> Option<GlyphIndex> {
        let position = self
            .glyphs
            .binary_search_by_key(&u32::from(character), |glyph| glyph.code)
            .ok()?;

        GlyphIndex::new(u32::try_from(position + 1).ok()?)
    }

    fn rasterize(&self, index: GlyphIndex) -> Result<RasterizedGlyph, FontError> {
        let glyph = index
            .get()
            .to_usize()
            .checked_sub(1)
            .and_then(|position| self.glyphs.get(position))
            .ok_or(FontError::NoSuchGlyph(index))?;

        let bitmap = glyph.coverage()?;

        Ok(RasterizedGlyph {
            bitmap,
            metrics: GlyphMetrics {
                width: glyph.width.into(),
                height: glyph.height.into(),
                advance: i32::from(glyph.device_width) * 64,
                bearing_x: glyph.x_offset.into(),
                bearing_y: i32::from(glyph.y_offset) + i32::from(glyph.height),
            },
        })
    }
}

fn section_header(input: &[u8]) -> IResult<&[u8], ([u8; 4], usize), ()> {
    let (input, (name, length)) = tuple((take::<_, _, ()>(4usize), be_u32))(input)?;
    let name = <[u8; 4]>::try_from(name).map_err(|_| nom::Err::Error(()))?;

    Ok((input, (name, length.to_usize())))
}

fn char_index(input: &[u8]) -> IResult<&[u8], CharIndexEntry, ()> {
    // storage flags are ignored by GRUB as well
    let (input, (code, _storage_flags, offset)) = tuple((be_u32::<_, ()>, byte, be_u32))(input)?;

    Ok((
        input,
        CharIndexEntry {
            code,
            offset: offset.to_usize(),
        },
    ))
}

fn glyph(code: u32, input: &[u8]) -> IResult<&[u8], Glyph, ()> {
    let (input, (width, height, x_offset, y_offset, device_width)) =
        tuple((be_u16::<_, ()>, be_u16, be_i16, be_i16, be_i16))(input)?;
    let bitmap_len = Glyph::byte_count_from_size(width.into(), height.into());
    let (input, bitmap) = take::<_, _, ()>(bitmap_len)(input)?;

    Ok((
        input,
        Glyph {
            code,
            width,
            height,
            x_offset,
            y_offset,
            device_width,
            bitmap: OwnedSlice::from(bitmap),
        },
    ))
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum SectionName {
    FontName,
    Family,
    PointSize,
    Weight,
    MaxCharWidth,
    MaxCharHeight,
    Ascent,
    Descent,
    CharIndex,
    Data,
}

struct CharIndexEntry {
    pub code: u32,
    pub offset: usize,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParserError {
    #[error("Bad PFF2 magic bytes")]
    BadMagicBytes,

    #[error("Insufficient section header bytes")]
    InsufficientHeaderBytes,

    #[error("Section {:?} is longer than the file", String::from_utf8_lossy(.0))]
    TruncatedSection([u8; 4]),

    #[error("Invalid UTF-8 string: {0}")]
    FromUtf8Error(#[from] FromUtf8Error),

    #[error("A u16 is not encoded using exactly 2 bytes, instead: {0}b")]
    InvalidU16Length(usize),

    #[error("Invalid data in the character index")]
    InvalidCharacterIndex,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FontValidationError {
    #[error("Font has no name")]
    EmptyName,
    #[error("Font doesnt define maximum glyph width")]
    ZeroMaxCharWidth,
    #[error("Font doesnt define maximum glyph height")]
    ZeroMaxCharHeight,
    #[error("Font doesnt define char ascent")]
    ZeroAscent,
    #[error("Font doesnt define char descent")]
    ZeroDescent,
    #[error("Font contains no glyphs")]
    NoGlyphs,
    #[error("Glyph U+{code:04X} is {width}x{height}, larger than the font's maximum glyph size")]
    OversizedGlyph { code: u32, width: u16, height: u16 },
}

impl TryFrom<[u8; 4]> for SectionName {
    /// Unknown section names are usually ignored so no point returning them to the caller.
    type Error = ();

    /// Converts the byte string into a known section name.
    /// The [`Err(())`] indicates that this section name is unknown.
    fn try_from(bytes: [u8; 4]) -> Result<Self, Self::Error> {
        match bytes.as_ref() {
            b"NAME" => Ok(SectionName::FontName),
            b"FAMI" => Ok(SectionName::Family),
            b"PTSZ" => Ok(SectionName::PointSize),
            b"WEIG" => Ok(SectionName::Weight),
            b"MAXW" => Ok(SectionName::MaxCharWidth),
            b"MAXH" => Ok(SectionName::MaxCharHeight),
            b"ASCE" => Ok(SectionName::Ascent),
            b"DESC" => Ok(SectionName::Descent),
            b"CHIX" => Ok(SectionName::CharIndex),
            b"DATA" => Ok(SectionName::Data),
            _ => Err(()),
        }
    }
}

trait FontValidation: Clone + PartialEq + Eq + Debug {}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Validated;
impl FontValidation for Validated {}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Unchecked;
impl FontValidation for Unchecked {}
