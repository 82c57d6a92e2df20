// src/engine/decoder.rs
//
// Decoder operations: JPEG (mozjpeg), PNG (zune-png), WebP (libwebp), with the
// image crate as the fallback for everything else.

use super::common::{run_with_panic_policy, EngineResult};
use super::{MAX_DIMENSION, MAX_PIXELS};
use crate::error::CropEngineError;
use image::{DynamicImage, GrayAlphaImage, GrayImage, ImageFormat, ImageReader, RgbImage, RgbaImage};
use mozjpeg::Decompress;
use std::io::Cursor;
use std::sync::Arc;
use webp::{BitstreamFeatures, Decoder as WebPDecoder};
use zune_core::colorspace::ColorSpace;
use zune_core::options::DecoderOptions;
use zune_png::PngDecoder;

/// A decoded, upright source image held for the lifetime of a session.
///
/// Pixels are always RGBA8 and shared, so cloning is cheap and the compositor
/// can borrow them from a background task.
#[derive(Clone, Debug)]
pub struct SourceImage {
    pixels: Arc<RgbaImage>,
    format: Option<ImageFormat>,
}

impl SourceImage {
    pub fn from_rgba(pixels: RgbaImage) -> Self {
        Self {
            pixels: Arc::new(pixels),
            format: None,
        }
    }

    /// Natural width after EXIF orientation.
    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    /// Natural height after EXIF orientation.
    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }

    /// Container format detected from magic bytes, if any.
    pub fn format(&self) -> Option<ImageFormat> {
        self.format
    }
}

/// Decode JPEG using mozjpeg (backed by libjpeg-turbo)
pub fn decode_jpeg_mozjpeg(data: &[u8]) -> EngineResult<DynamicImage> {
    run_with_panic_policy("decode:mozjpeg", || {
        if !data.windows(2).any(|pair| pair == [0xFF, 0xD9]) {
            return Err(CropEngineError::decode_failed(
                "mozjpeg: missing JPEG EOI marker",
            ));
        }

        let decompress = Decompress::new_mem(data).map_err(|e| {
            CropEngineError::decode_failed(format!("mozjpeg decompress init failed: {e:?}"))
        })?;

        let mut decompress = decompress.rgb().map_err(|e| {
            CropEngineError::decode_failed(format!("mozjpeg rgb conversion failed: {e:?}"))
        })?;

        let width = u32::try_from(decompress.width())
            .map_err(|_| CropEngineError::dimension_exceeds_limit(u32::MAX, MAX_DIMENSION))?;
        let height = u32::try_from(decompress.height())
            .map_err(|_| CropEngineError::dimension_exceeds_limit(u32::MAX, MAX_DIMENSION))?;
        check_dimensions(width, height)?;

        let pixels: Vec<[u8; 3]> = decompress.read_scanlines().map_err(|e| {
            CropEngineError::decode_failed(format!("mozjpeg: failed to read scanlines: {e:?}"))
        })?;
        let flat_pixels: Vec<u8> = pixels.into_iter().flatten().collect();

        let rgb_image = RgbImage::from_raw(width, height, flat_pixels).ok_or_else(|| {
            CropEngineError::decode_failed("mozjpeg: failed to create image from raw data")
        })?;

        Ok(DynamicImage::ImageRgb8(rgb_image))
    })
}

/// Decode PNG using zune-png. 16-bit input is stripped to 8-bit.
pub fn decode_png_zune(data: &[u8]) -> EngineResult<DynamicImage> {
    run_with_panic_policy("decode:png", || {
        let options = DecoderOptions::default().png_set_strip_to_8bit(true);
        let mut decoder = PngDecoder::new_with_options(data, options);
        let pixels = decoder
            .decode()
            .map_err(|e| CropEngineError::decode_failed(format!("png: decode failed: {e}")))?;

        let info = decoder
            .get_info()
            .ok_or_else(|| CropEngineError::decode_failed("png: missing header info"))?;

        let width = info.width as u32;
        let height = info.height as u32;
        check_dimensions(width, height)?;

        let buf = match pixels {
            zune_core::result::DecodingResult::U8(v) => v,
            _ => {
                return Err(CropEngineError::decode_failed(
                    "png: unexpected non-U8 pixel buffer",
                ))
            }
        };

        let colorspace = decoder
            .get_colorspace()
            .ok_or_else(|| CropEngineError::decode_failed("png: missing colorspace"))?;

        let img = match colorspace {
            ColorSpace::RGB => RgbImage::from_raw(width, height, buf)
                .map(DynamicImage::ImageRgb8)
                .ok_or_else(|| CropEngineError::decode_failed("png: failed to build RGB image"))?,
            ColorSpace::RGBA => RgbaImage::from_raw(width, height, buf)
                .map(DynamicImage::ImageRgba8)
                .ok_or_else(|| CropEngineError::decode_failed("png: failed to build RGBA image"))?,
            ColorSpace::Luma => GrayImage::from_raw(width, height, buf)
                .map(DynamicImage::ImageLuma8)
                .ok_or_else(|| CropEngineError::decode_failed("png: failed to build Luma image"))?,
            ColorSpace::LumaA => GrayAlphaImage::from_raw(width, height, buf)
                .map(DynamicImage::ImageLumaA8)
                .ok_or_else(|| {
                    CropEngineError::decode_failed("png: failed to build LumaA image")
                })?,
            other => {
                return Err(CropEngineError::decode_failed(format!(
                    "png: unsupported colorspace {other:?}"
                )))
            }
        };

        Ok(img)
    })
}

/// Decode WebP using libwebp. Animated WebP falls back to the image crate,
/// which yields the first frame.
pub fn decode_webp_libwebp(data: &[u8]) -> EngineResult<DynamicImage> {
    run_with_panic_policy("decode:webp", || {
        // Parse header first to avoid allocating huge buffers on malformed files
        let features = BitstreamFeatures::new(data).ok_or_else(|| {
            CropEngineError::decode_failed("webp: failed to read bitstream features")
        })?;

        check_dimensions(features.width(), features.height())?;

        if features.has_animation() {
            return image::load_from_memory(data).map_err(|e| {
                CropEngineError::decode_failed(format!("webp (animated) decode failed: {e}"))
            });
        }

        let decoded = WebPDecoder::new(data)
            .decode()
            .ok_or_else(|| CropEngineError::decode_failed("webp: decode failed"))?;
        check_dimensions(decoded.width(), decoded.height())?;

        Ok(decoded.to_image())
    })
}

/// Decode any other format the image crate understands.
pub fn decode_with_image_crate(data: &[u8]) -> EngineResult<DynamicImage> {
    run_with_panic_policy("decode:image", || {
        ensure_dimensions_safe(data)?;
        image::load_from_memory(data).map_err(|e| match e {
            image::ImageError::Unsupported(u) => {
                CropEngineError::unsupported_format(u.to_string())
            }
            other => CropEngineError::decode_failed(format!("decode failed: {other}")),
        })
    })
}

/// Detect input format using magic bytes. Returns None if unknown.
pub fn detect_format(bytes: &[u8]) -> Option<ImageFormat> {
    image::guess_format(bytes).ok()
}

/// Route by magic bytes: JPEG to mozjpeg, PNG to zune-png, WebP to libwebp,
/// everything else to the image crate.
pub fn decode_image(bytes: &[u8]) -> EngineResult<(DynamicImage, Option<ImageFormat>)> {
    if bytes.is_empty() {
        return Err(CropEngineError::decode_failed("empty image data"));
    }
    let detected = detect_format(bytes);
    let img = match detected {
        Some(ImageFormat::Jpeg) => decode_jpeg_mozjpeg(bytes)?,
        Some(ImageFormat::Png) => decode_png_zune(bytes)?,
        Some(ImageFormat::WebP) => decode_webp_libwebp(bytes)?,
        Some(_) => decode_with_image_crate(bytes)?,
        None => return Err(CropEngineError::unsupported_format("unknown")),
    };
    Ok((img, detected))
}

/// Decode, auto-orient and normalize to RGBA8.
pub fn decode_source(bytes: &[u8]) -> EngineResult<SourceImage> {
    let (img, format) = decode_image(bytes)?;
    let img = match detect_exif_orientation(bytes) {
        Some(orientation) => apply_orientation(img, orientation),
        None => img,
    };
    let rgba = match img {
        DynamicImage::ImageRgba8(rgba) => rgba,
        other => other.to_rgba8(),
    };
    if rgba.width() == 0 || rgba.height() == 0 {
        return Err(CropEngineError::decode_failed("image has zero width or height"));
    }
    Ok(SourceImage {
        pixels: Arc::new(rgba),
        format,
    })
}

/// Check if image dimensions are within safe limits.
/// Returns an error if the image is too large (potential decompression bomb).
pub fn check_dimensions(width: u32, height: u32) -> EngineResult<()> {
    if width > MAX_DIMENSION || height > MAX_DIMENSION {
        return Err(CropEngineError::dimension_exceeds_limit(
            width.max(height),
            MAX_DIMENSION,
        ));
    }
    let pixels = width as u64 * height as u64;
    if pixels > MAX_PIXELS {
        return Err(CropEngineError::pixel_count_exceeds_limit(
            pixels, MAX_PIXELS,
        ));
    }
    Ok(())
}

/// Inspect encoded bytes and ensure the image dimensions are safe before decoding.
pub fn ensure_dimensions_safe(bytes: &[u8]) -> EngineResult<()> {
    if let Some((width, height)) = peek_dimensions(bytes) {
        return check_dimensions(width, height);
    }
    Ok(())
}

/// Header-only dimension probe. `None` when the header cannot be read.
pub fn peek_dimensions(bytes: &[u8]) -> Option<(u32, u32)> {
    ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .ok()?
        .into_dimensions()
        .ok()
}

/// Extract EXIF Orientation tag (1-8). Returns None if missing or invalid.
pub fn detect_exif_orientation(bytes: &[u8]) -> Option<u16> {
    let mut cursor = Cursor::new(bytes);
    let exif = exif::Reader::new().read_from_container(&mut cursor).ok()?;
    let field = exif.get_field(exif::Tag::Orientation, exif::In::PRIMARY)?;
    let orientation = field.value.get_uint(0)? as u16;
    if (1..=8).contains(&orientation) {
        Some(orientation)
    } else {
        None
    }
}

/// Rotate/flip so the pixels are upright for the given EXIF orientation.
pub fn apply_orientation(img: DynamicImage, orientation: u16) -> DynamicImage {
    match orientation {
        2 => img.fliph(),
        3 => img.rotate180(),
        4 => img.flipv(),
        5 => img.rotate90().fliph(), // transpose
        6 => img.rotate90(),
        7 => img.rotate270().fliph(), // transverse
        8 => img.rotate270(),
        _ => img,
    }
}
