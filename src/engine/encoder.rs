// src/engine/encoder.rs
//
// Encoder operations: PNG (image + oxipng), JPEG (mozjpeg), WebP (libwebp).

use super::common::{run_with_panic_policy, EngineResult};
use super::MAX_DIMENSION;
use crate::error::CropEngineError;
use crate::policy::OutputFormat;
use image::{DynamicImage, ImageFormat, RgbImage, RgbaImage};
use mozjpeg::{ColorSpace, Compress, ScanMode};
use std::io::Cursor;

/// Derives per-format encoder knobs from a single 0-100 quality value.
#[derive(Debug, Clone, Copy)]
pub struct QualitySettings {
    quality: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum QualityBand {
    High,
    Balanced,
    Fast,
}

impl QualitySettings {
    pub fn new(quality: u8) -> Self {
        Self {
            quality: quality.min(100) as f32,
        }
    }

    pub fn quality(&self) -> f32 {
        self.quality
    }

    fn band(&self) -> QualityBand {
        if self.quality >= 85.0 {
            QualityBand::High
        } else if self.quality >= 70.0 {
            QualityBand::Balanced
        } else {
            QualityBand::Fast
        }
    }

    pub fn jpeg_smoothing(&self) -> u8 {
        if self.quality >= 90.0 {
            0
        } else if self.quality >= 70.0 {
            5
        } else if self.quality >= 60.0 {
            10
        } else {
            18
        }
    }

    pub fn webp_sns_strength(&self) -> i32 {
        match self.band() {
            QualityBand::High => 50,
            QualityBand::Balanced => 70,
            QualityBand::Fast => 80,
        }
    }

    pub fn webp_filter_strength(&self) -> i32 {
        if self.quality >= 80.0 {
            20
        } else if self.quality >= 60.0 {
            30
        } else {
            40
        }
    }

    pub fn webp_filter_sharpness(&self) -> i32 {
        match self.band() {
            QualityBand::High => 2,
            QualityBand::Balanced | QualityBand::Fast => 0,
        }
    }
}

/// Encode the result surface in the requested format.
pub fn encode(img: &RgbaImage, format: OutputFormat) -> EngineResult<Vec<u8>> {
    match format {
        OutputFormat::Png => encode_png(img),
        OutputFormat::Jpeg { quality } => encode_jpeg(img, quality),
        OutputFormat::WebP { quality } => encode_webp(img, quality),
    }
}

/// Encode to PNG with the image crate, then recompress losslessly with oxipng.
pub fn encode_png(img: &RgbaImage) -> EngineResult<Vec<u8>> {
    run_with_panic_policy("encode:png", || {
        let mut buf = Vec::new();
        img.write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
            .map_err(|e| CropEngineError::encode_failed("png", format!("PNG encode failed: {e}")))?;

        let mut options = oxipng::Options::from_preset(2);
        options.strip = oxipng::StripChunks::Safe;

        oxipng::optimize_from_memory(&buf, &options).map_err(|e| {
            CropEngineError::encode_failed("png", format!("oxipng optimization failed: {e}"))
        })
    })
}

/// Encode to JPEG with mozjpeg. Alpha is dropped; the result surface is
/// already opaque because it is filled with the background first.
pub fn encode_jpeg(img: &RgbaImage, quality: u8) -> EngineResult<Vec<u8>> {
    run_with_panic_policy("encode:jpeg", || {
        let rgb: RgbImage = DynamicImage::ImageRgba8(img.clone()).to_rgb8();
        let (w, h) = rgb.dimensions();
        let pixels: &[u8] = rgb.as_raw();

        if w == 0 || h == 0 {
            return Err(CropEngineError::encode_failed(
                "jpeg",
                "width or height is zero",
            ));
        }
        if w > MAX_DIMENSION || h > MAX_DIMENSION {
            return Err(CropEngineError::dimension_exceeds_limit(
                w.max(h),
                MAX_DIMENSION,
            ));
        }

        let settings = QualitySettings::new(quality);
        let mut comp = Compress::new(ColorSpace::JCS_RGB);
        comp.set_size(w as usize, h as usize);
        comp.set_color_space(ColorSpace::JCS_YCbCr);
        comp.set_quality(settings.quality());
        comp.set_chroma_sampling_pixel_sizes((2, 2), (2, 2));
        comp.set_progressive_mode();
        comp.set_optimize_coding(true);
        comp.set_optimize_scans(true);
        comp.set_scan_optimization_mode(ScanMode::AllComponentsTogether);
        comp.set_smoothing_factor(settings.jpeg_smoothing());

        let mut output = Vec::with_capacity((w as usize * h as usize * 3 / 10).max(4096));
        {
            let mut writer = comp.start_compress(&mut output).map_err(|e| {
                CropEngineError::encode_failed(
                    "jpeg",
                    format!("mozjpeg: failed to start compress: {e:?}"),
                )
            })?;

            let stride = w as usize * 3;
            for row in pixels.chunks(stride) {
                writer.write_scanlines(row).map_err(|e| {
                    CropEngineError::encode_failed(
                        "jpeg",
                        format!("mozjpeg: failed to write scanlines: {e:?}"),
                    )
                })?;
            }

            writer.finish().map_err(|e| {
                CropEngineError::encode_failed("jpeg", format!("mozjpeg: failed to finish: {e:?}"))
            })?;
        }
        Ok(output)
    })
}

/// Encode to lossy WebP with libwebp, keeping alpha.
pub fn encode_webp(img: &RgbaImage, quality: u8) -> EngineResult<Vec<u8>> {
    run_with_panic_policy("encode:webp", || {
        let (w, h) = img.dimensions();
        let encoder = webp::Encoder::from_rgba(img.as_raw(), w, h);

        let mut config = webp::WebPConfig::new()
            .map_err(|_| CropEngineError::internal_panic("failed to create WebPConfig"))?;

        let settings = QualitySettings::new(quality);
        config.quality = settings.quality();
        config.method = 4;
        config.pass = 1;
        config.preprocessing = 0;
        config.sns_strength = settings.webp_sns_strength();
        config.autofilter = 1;
        config.filter_strength = settings.webp_filter_strength();
        config.filter_sharpness = settings.webp_filter_sharpness();

        let mem = encoder.encode_advanced(&config).map_err(|e| {
            CropEngineError::encode_failed("webp", format!("WebP encode failed: {e:?}"))
        })?;
        Ok(mem.to_vec())
    })
}
