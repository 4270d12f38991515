//! Raster recompression through the `image` codecs.

use std::io::Cursor;

use anyhow::{Context, Result};
use image::codecs::gif::{GifDecoder, GifEncoder, Repeat};
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::{FilterType, PngEncoder};
use image::{AnimationDecoder, DynamicImage, ImageFormat};

use super::policy::{GifPolicy, JpegPolicy, PngPolicy};

/// Re-encode a JPEG (or JFIF) at the policy quality.
pub fn recompress_jpeg(bytes: &[u8], policy: &JpegPolicy) -> Result<Vec<u8>> {
    let img = image::load_from_memory_with_format(bytes, ImageFormat::Jpeg)
        .context("failed to decode JPEG")?;
    // JPEG has no alpha channel
    let img = DynamicImage::ImageRgb8(img.to_rgb8());

    let mut out = Vec::new();
    img.write_with_encoder(JpegEncoder::new_with_quality(&mut out, policy.quality))
        .context("failed to encode JPEG")?;
    Ok(out)
}

/// Re-encode a PNG with the policy compression level and adaptive filtering.
pub fn recompress_png(bytes: &[u8], policy: &PngPolicy) -> Result<Vec<u8>> {
    let img = image::load_from_memory_with_format(bytes, ImageFormat::Png)
        .context("failed to decode PNG")?;

    let mut out = Vec::new();
    let encoder = PngEncoder::new_with_quality(&mut out, policy.compression(), FilterType::Adaptive);
    img.write_with_encoder(encoder)
        .context("failed to encode PNG")?;
    Ok(out)
}

/// Re-encode every GIF frame, keeping delays and looping forever.
pub fn recompress_gif(bytes: &[u8], policy: &GifPolicy) -> Result<Vec<u8>> {
    let decoder = GifDecoder::new(Cursor::new(bytes)).context("failed to decode GIF")?;
    let frames = decoder
        .into_frames()
        .collect_frames()
        .context("failed to decode GIF frames")?;

    let mut out = Vec::new();
    {
        let mut encoder = GifEncoder::new_with_speed(&mut out, policy.encoder_speed());
        encoder.set_repeat(Repeat::Infinite)?;
        encoder
            .encode_frames(frames)
            .context("failed to encode GIF")?;
    }
    Ok(out)
}

#[cfg(test)]
pub(super) mod tests {
    use super::*;
    use crate::image::policy::IMAGE_POLICY;
    use image::{Rgb, RgbImage, Rgba, RgbaImage};

    /// Encode a small gradient as the given format.
    pub fn sample(format: ImageFormat) -> Vec<u8> {
        let img = RgbImage::from_fn(16, 16, |x, y| Rgb([(x * 16) as u8, (y * 16) as u8, 128]));
        let img = match format {
            ImageFormat::Png | ImageFormat::Gif => {
                DynamicImage::ImageRgba8(RgbaImage::from_fn(16, 16, |x, y| {
                    let Rgb([r, g, b]) = *img.get_pixel(x, y);
                    Rgba([r, g, b, 255])
                }))
            }
            _ => DynamicImage::ImageRgb8(img),
        };
        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, format).unwrap();
        out.into_inner()
    }

    #[test]
    fn test_recompress_jpeg_decodes() {
        let out = recompress_jpeg(&sample(ImageFormat::Jpeg), &IMAGE_POLICY.jpeg).unwrap();
        let img = image::load_from_memory_with_format(&out, ImageFormat::Jpeg).unwrap();
        assert_eq!((img.width(), img.height()), (16, 16));
    }

    #[test]
    fn test_recompress_png_keeps_pixels() {
        let input = sample(ImageFormat::Png);
        let out = recompress_png(&input, &IMAGE_POLICY.png).unwrap();
        let before = image::load_from_memory(&input).unwrap().to_rgba8();
        let after = image::load_from_memory(&out).unwrap().to_rgba8();
        assert_eq!(before, after);
    }

    #[test]
    fn test_recompress_gif() {
        let out = recompress_gif(&sample(ImageFormat::Gif), &IMAGE_POLICY.gif).unwrap();
        assert!(out.starts_with(b"GIF8"));
    }

    #[test]
    fn test_recompress_rejects_garbage() {
        assert!(recompress_jpeg(b"not a jpeg", &IMAGE_POLICY.jpeg).is_err());
        assert!(recompress_png(b"not a png", &IMAGE_POLICY.png).is_err());
        assert!(recompress_gif(b"not a gif", &IMAGE_POLICY.gif).is_err());
    }
}
