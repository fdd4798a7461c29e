use std::path::PathBuf;

use clap::Parser;
use glyph_render::config::RenderConfig;

/// Render a single glyph into a PPM image and print its metrics.
#[derive(Parser)]
#[clap(version)]
pub struct Args {
    /// TrueType/OpenType (.ttf, .otf) or GRUB (.pf2) font
    #[clap(long, short = 'f')]
    pub font_file: PathBuf,

    #[clap(long = "char", short, default_value_t = 'A')]
    pub character: char,

    /// Pixel height to rasterize at
    #[clap(long, short, default_value_t = 48, value_parser = clap::value_parser!(u32).range(1..))]
    pub size: u32,

    /// Defaults to glyph_<char>_<size>px.ppm
    #[clap(long, short)]
    pub output: Option<PathBuf>,
}

impl From<Args> for RenderConfig {
    fn from(args: Args) -> Self {
        let config = RenderConfig::new(args.font_file, args.character, args.size);

        match args.output {
            Some(output) => config.with_output(output),
            None => config,
        }
    }
}
