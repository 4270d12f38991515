//! Compiled-in image optimization policy.

/// Per-format recompression parameters. Applied the same way under both
/// profiles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImagePolicy {
    pub gif: GifPolicy,
    pub jpeg: JpegPolicy,
    pub png: PngPolicy,
    pub svg: SvgPolicy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GifPolicy {
    /// Interlaced row order. The bundled GIF encoder always writes rows
    /// sequentially, so this is recorded but not applied.
    pub interlaced: bool,
    /// 1 (fast) ..= 3 (smallest).
    pub optimization_level: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JpegPolicy {
    /// 1 ..= 100.
    pub quality: u8,
    /// Progressive scans. The bundled JPEG encoder is baseline-only, so
    /// this is recorded but output is baseline.
    pub progressive: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PngPolicy {
    /// 0 (store) ..= 7 (exhaustive).
    pub optimization_level: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SvgPolicy {
    /// Drop `viewBox` when it only restates `width`/`height`.
    pub remove_view_box: bool,
    /// Rename/strip element ids. usvg writes ids as-is, so only `false`
    /// is honored.
    pub cleanup_ids: bool,
}

pub const IMAGE_POLICY: ImagePolicy = ImagePolicy {
    gif: GifPolicy {
        interlaced: true,
        optimization_level: 3,
    },
    jpeg: JpegPolicy {
        quality: 95,
        progressive: true,
    },
    png: PngPolicy {
        optimization_level: 2,
    },
    svg: SvgPolicy {
        remove_view_box: true,
        cleanup_ids: false,
    },
};

impl GifPolicy {
    /// NeuQuant sampling speed for the encoder: 1 is slowest and best.
    pub fn encoder_speed(&self) -> i32 {
        match self.optimization_level {
            0 | 1 => 20,
            2 => 10,
            _ => 1,
        }
    }
}

impl PngPolicy {
    pub fn compression(&self) -> image::codecs::png::CompressionType {
        use image::codecs::png::CompressionType;
        match self.optimization_level {
            0 | 1 => CompressionType::Fast,
            2..=4 => CompressionType::Default,
            _ => CompressionType::Best,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::codecs::png::CompressionType;

    #[test]
    fn test_policy_values() {
        assert_eq!(IMAGE_POLICY.jpeg.quality, 95);
        assert!(IMAGE_POLICY.gif.interlaced);
        assert!(IMAGE_POLICY.svg.remove_view_box);
        assert!(!IMAGE_POLICY.svg.cleanup_ids);
    }

    #[test]
    fn test_png_compression_mapping() {
        assert!(matches!(
            PngPolicy { optimization_level: 0 }.compression(),
            CompressionType::Fast
        ));
        assert!(matches!(IMAGE_POLICY.png.compression(), CompressionType::Default));
        assert!(matches!(
            PngPolicy { optimization_level: 7 }.compression(),
            CompressionType::Best
        ));
    }

    #[test]
    fn test_gif_speed_mapping() {
        assert_eq!(IMAGE_POLICY.gif.encoder_speed(), 1);
        assert_eq!(GifPolicy { interlaced: false, optimization_level: 1 }.encoder_speed(), 20);
    }
}
