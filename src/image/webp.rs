//! Lossless WebP conversion for raster sources.

use anyhow::{Context, Result};
use image::DynamicImage;
use image::codecs::webp::WebPEncoder;

/// Decode any supported raster and encode it as lossless WebP.
pub fn convert_to_webp(bytes: &[u8]) -> Result<Vec<u8>> {
    let img = image::load_from_memory(bytes).context("failed to decode image")?;
    // The WebP encoder only takes 8-bit RGB(A)
    let img = if img.color().has_alpha() {
        DynamicImage::ImageRgba8(img.to_rgba8())
    } else {
        DynamicImage::ImageRgb8(img.to_rgb8())
    };

    let mut out = Vec::new();
    img.write_with_encoder(WebPEncoder::new_lossless(&mut out))
        .context("failed to encode WebP")?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::raster::tests::sample;
    use image::ImageFormat;

    #[test]
    fn test_convert_png_and_jpeg() {
        for format in [ImageFormat::Png, ImageFormat::Jpeg] {
            let out = convert_to_webp(&sample(format)).unwrap();
            assert_eq!(&out[..4], b"RIFF");
            assert_eq!(&out[8..12], b"WEBP");
            let back = image::load_from_memory_with_format(&out, ImageFormat::WebP).unwrap();
            assert_eq!(back.width(), 16);
        }
    }

    #[test]
    fn test_convert_garbage() {
        assert!(convert_to_webp(b"\x00\x01\x02").is_err());
    }
}
