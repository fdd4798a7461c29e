use std::path::PathBuf;

/// Everything needed to render one glyph into one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderConfig {
    pub font_path: PathBuf,
    pub character: char,
    pub size_px: u32,
    pub output: PathBuf,
}

impl RenderConfig {
    /// Creates a config writing to `glyph_<char>_<size>px.ppm` in the working directory.
    ///
    /// ```rust
    /// # use glyph_render::config::RenderConfig;
    /// let config = RenderConfig::new("arial.ttf", 'A', 48);
    ///
    /// assert_eq!(config.output.to_str(), Some("glyph_A_48px.ppm"));
    /// ```
    pub fn new<P: Into<PathBuf>>(font_path: P, character: char, size_px: u32) -> Self {
        Self {
            font_path: font_path.into(),
            character,
            size_px,
            output: Self::default_output(character, size_px),
        }
    }

    pub fn with_output<P: Into<PathBuf>>(mut self, output: P) -> Self {
        self.output = output.into();
        self
    }

    fn default_output(character: char, size_px: u32) -> PathBuf {
        PathBuf::from(format!("glyph_{character}_{size_px}px.ppm"))
    }
}

#[cfg(test)]
mod tests {
    use super::RenderConfig;

    #[test_case('A', 48 => "glyph_A_48px.ppm"; "default character")]
    #[test_case('ж', 12 => "glyph_ж_12px.ppm"; "non ascii character")]
    fn default_output(character: char, size_px: u32) -> String {
        RenderConfig::new("font.ttf", character, size_px)
            .output
            .to_string_lossy()
            .into_owned()
    }

    #[test]
    fn with_output_overrides_default() {
        let config = RenderConfig::new("font.ttf", 'A', 48).with_output("/tmp/out.ppm");

        assert_eq!(config.output.to_str(), Some("/tmp/out.ppm"));
        assert_eq!(config.size_px, 48);
    }
}
