//! Image optimization.
//!
//! # Modules
//!
//! - [`policy`]: compiled-in per-format parameters
//! - `raster`: JPEG / PNG / GIF recompression
//! - `svg`: SVG normalization through usvg
//! - `webp`: lossless WebP conversion

pub mod policy;
mod raster;
mod svg;
mod webp;

use std::path::Path;

use anyhow::{Context, Result};

pub use policy::{IMAGE_POLICY, ImagePolicy};
pub use webp::convert_to_webp;

/// Image formats the pipeline understands, keyed by extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageKind {
    Jpeg,
    Png,
    Gif,
    Svg,
    Webp,
}

impl ImageKind {
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "jpg" | "jpeg" | "jfif" => Some(Self::Jpeg),
            "png" => Some(Self::Png),
            "gif" => Some(Self::Gif),
            "svg" => Some(Self::Svg),
            "webp" => Some(Self::Webp),
            _ => None,
        }
    }
}

/// Recompress an image according to the policy.
///
/// WebP and unknown formats pass through. A result larger than the input
/// is discarded in favor of the input bytes.
pub fn optimize_image(path: &Path, bytes: &[u8], policy: &ImagePolicy) -> Result<Vec<u8>> {
    let optimized = match ImageKind::from_path(path) {
        Some(ImageKind::Jpeg) => raster::recompress_jpeg(bytes, &policy.jpeg),
        Some(ImageKind::Png) => raster::recompress_png(bytes, &policy.png),
        Some(ImageKind::Gif) => raster::recompress_gif(bytes, &policy.gif),
        Some(ImageKind::Svg) => svg::optimize_svg(bytes, &policy.svg),
        Some(ImageKind::Webp) | None => return Ok(bytes.to_vec()),
    }
    .with_context(|| format!("failed to optimize {}", path.display()))?;

    if optimized.len() < bytes.len() {
        Ok(optimized)
    } else {
        Ok(bytes.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::ImageFormat;

    #[test]
    fn test_kind_from_path() {
        assert_eq!(ImageKind::from_path(Path::new("a.JFIF")), Some(ImageKind::Jpeg));
        assert_eq!(ImageKind::from_path(Path::new("a.svg")), Some(ImageKind::Svg));
        assert_eq!(ImageKind::from_path(Path::new("a.bmp")), None);
        assert_eq!(ImageKind::from_path(Path::new("noext")), None);
    }

    #[test]
    fn test_optimize_never_grows() {
        for (name, format) in [
            ("a.png", ImageFormat::Png),
            ("a.jpg", ImageFormat::Jpeg),
            ("a.gif", ImageFormat::Gif),
        ] {
            let input = raster::tests::sample(format);
            let out = optimize_image(Path::new(name), &input, &IMAGE_POLICY).unwrap();
            assert!(out.len() <= input.len(), "{name}");
        }
    }

    #[test]
    fn test_webp_passes_through() {
        let bytes = b"RIFF....WEBP".to_vec();
        let out = optimize_image(Path::new("a.webp"), &bytes, &IMAGE_POLICY).unwrap();
        assert_eq!(out, bytes);
    }

    #[test]
    fn test_svg_text_survives() {
        let svg = br#"<svg xmlns="http://www.w3.org/2000/svg" width="100" height="20"><text>Hello world</text></svg>"#;
        let out = optimize_image(Path::new("a.svg"), svg, &IMAGE_POLICY).unwrap();
        assert!(String::from_utf8(out).unwrap().contains("Hello world"));
    }

    #[test]
    fn test_error_names_file() {
        let err = optimize_image(Path::new("img/broken.png"), b"nope", &IMAGE_POLICY).unwrap_err();
        assert!(err.to_string().contains("broken.png"));
    }
}
