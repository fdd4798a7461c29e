use args::Args;
use clap::Parser;
use glyph_render::{config::RenderConfig, render};

mod args;

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let config = RenderConfig::from(Args::parse());
    log::debug!("{config:?}");

    let glyph = render::run(&config)?;

    print!("{}", glyph.report());

    Ok(())
}
