// src/engine/surface.rs
//
// Rendering-surface capability used by the compositor.
//
// The compositor only ever talks to `RenderSurface`/`SurfaceProvider`, so it can
// be driven against the in-memory `RasterSurface` here or a fake in tests.

use super::common::{run_with_panic_policy, EngineResult};
use super::geometry::Rect;
use crate::error::CropEngineError;
use fast_image_resize::{self as fir, MulDiv, PixelType, ResizeOptions};
use image::{imageops, Rgba, RgbaImage};

/// A 2D drawing surface with a canvas-like current transform.
pub trait RenderSurface {
    fn width(&self) -> u32;
    fn height(&self) -> u32;

    /// Fill every pixel with `color`, ignoring the current transform.
    fn fill(&mut self, color: [u8; 4]);

    /// Post-multiply a translation onto the current transform.
    fn translate(&mut self, dx: f64, dy: f64);

    /// Post-multiply a rotation (clockwise, multiples of 90) onto the current transform.
    fn rotate(&mut self, degrees: i32) -> EngineResult<()>;

    fn reset_transform(&mut self);

    /// Draw `image` with its top-left at `(dx, dy)` in user space.
    fn draw_image(&mut self, image: &RgbaImage, dx: f64, dy: f64) -> EngineResult<()>;

    /// Resample the `src` region of `image` into the `dst` rectangle (device
    /// pixels, unaffected by the current transform). Parts of `src` outside
    /// the image are skipped and `dst` shrinks proportionally.
    fn draw_region(&mut self, image: &RgbaImage, src: Rect, dst: Rect) -> EngineResult<()>;

    /// Consume the surface and return its pixels.
    fn readback(self: Box<Self>) -> RgbaImage;
}

/// Hands out drawing surfaces. Acquisition is the one hard failure point of Save.
pub trait SurfaceProvider: Send + Sync {
    fn acquire(&self, width: u32, height: u32) -> EngineResult<Box<dyn RenderSurface>>;
}

/// 2x3 affine matrix in canvas order: x' = a*x + c*y + e, y' = b*x + d*y + f.
#[derive(Clone, Copy, Debug, PartialEq)]
struct Affine {
    a: f64,
    b: f64,
    c: f64,
    d: f64,
    e: f64,
    f: f64,
}

impl Affine {
    const IDENTITY: Affine = Affine {
        a: 1.0,
        b: 0.0,
        c: 0.0,
        d: 1.0,
        e: 0.0,
        f: 0.0,
    };

    fn translate(&mut self, tx: f64, ty: f64) {
        self.e += self.a * tx + self.c * ty;
        self.f += self.b * tx + self.d * ty;
    }

    fn rotate(&mut self, cos: f64, sin: f64) {
        let (a, b, c, d) = (self.a, self.b, self.c, self.d);
        self.a = a * cos + c * sin;
        self.b = b * cos + d * sin;
        self.c = c * cos - a * sin;
        self.d = d * cos - b * sin;
    }

    fn apply(&self, x: f64, y: f64) -> (f64, f64) {
        (
            self.a * x + self.c * y + self.e,
            self.b * x + self.d * y + self.f,
        )
    }

    fn invert(&self) -> Option<Affine> {
        let det = self.a * self.d - self.b * self.c;
        if det == 0.0 || !det.is_finite() {
            return None;
        }
        let inv = 1.0 / det;
        Some(Affine {
            a: self.d * inv,
            b: -self.b * inv,
            c: -self.c * inv,
            d: self.a * inv,
            e: (self.c * self.f - self.d * self.e) * inv,
            f: (self.b * self.e - self.a * self.f) * inv,
        })
    }
}

/// Exact (cos, sin) for quarter turns so rotated pixels land on the grid.
fn quarter_turn(degrees: i32) -> EngineResult<(f64, f64)> {
    match degrees.rem_euclid(360) {
        0 => Ok((1.0, 0.0)),
        90 => Ok((0.0, 1.0)),
        180 => Ok((-1.0, 0.0)),
        270 => Ok((0.0, -1.0)),
        _ => Err(CropEngineError::invalid_rotation_angle(degrees)),
    }
}

/// Source-over compositing of one straight-alpha pixel.
#[inline]
fn blend_over(dst: &mut Rgba<u8>, src: &Rgba<u8>) {
    let sa = src.0[3] as u32;
    if sa == 255 {
        *dst = *src;
        return;
    }
    if sa == 0 {
        return;
    }
    let da = dst.0[3] as u32;
    let out_a = sa * 255 + da * (255 - sa); // scaled by 255
    if out_a == 0 {
        *dst = Rgba([0, 0, 0, 0]);
        return;
    }
    for i in 0..3 {
        let s = src.0[i] as u32 * sa * 255;
        let d = dst.0[i] as u32 * da * (255 - sa);
        dst.0[i] = ((s + d + out_a / 2) / out_a) as u8;
    }
    dst.0[3] = ((out_a + 127) / 255) as u8;
}

/// In-memory RGBA surface. Starts fully transparent.
pub struct RasterSurface {
    pixels: RgbaImage,
    transform: Affine,
}

impl RasterSurface {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            pixels: RgbaImage::new(width, height),
            transform: Affine::IDENTITY,
        }
    }

    fn from_buffer(width: u32, height: u32, buffer: Vec<u8>) -> Option<Self> {
        RgbaImage::from_raw(width, height, buffer).map(|pixels| Self {
            pixels,
            transform: Affine::IDENTITY,
        })
    }

    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }
}

impl RenderSurface for RasterSurface {
    fn width(&self) -> u32 {
        self.pixels.width()
    }

    fn height(&self) -> u32 {
        self.pixels.height()
    }

    fn fill(&mut self, color: [u8; 4]) {
        for px in self.pixels.pixels_mut() {
            *px = Rgba(color);
        }
    }

    fn translate(&mut self, dx: f64, dy: f64) {
        self.transform.translate(dx, dy);
    }

    fn rotate(&mut self, degrees: i32) -> EngineResult<()> {
        let (cos, sin) = quarter_turn(degrees)?;
        self.transform.rotate(cos, sin);
        Ok(())
    }

    fn reset_transform(&mut self) {
        self.transform = Affine::IDENTITY;
    }

    fn draw_image(&mut self, image: &RgbaImage, dx: f64, dy: f64) -> EngineResult<()> {
        let (iw, ih) = (image.width() as f64, image.height() as f64);
        if iw == 0.0 || ih == 0.0 {
            return Ok(());
        }
        let inverse = self.transform.invert().ok_or_else(|| {
            CropEngineError::invalid_argument("transform", "singular", "cannot draw through a singular transform")
        })?;

        // Device-space bounding box of the transformed image.
        let corners = [
            self.transform.apply(dx, dy),
            self.transform.apply(dx + iw, dy),
            self.transform.apply(dx, dy + ih),
            self.transform.apply(dx + iw, dy + ih),
        ];
        let min_x = corners.iter().map(|c| c.0).fold(f64::INFINITY, f64::min);
        let max_x = corners.iter().map(|c| c.0).fold(f64::NEG_INFINITY, f64::max);
        let min_y = corners.iter().map(|c| c.1).fold(f64::INFINITY, f64::min);
        let max_y = corners.iter().map(|c| c.1).fold(f64::NEG_INFINITY, f64::max);

        let x0 = min_x.floor().max(0.0) as u32;
        let y0 = min_y.floor().max(0.0) as u32;
        let x1 = (max_x.ceil().max(0.0) as u32).min(self.width());
        let y1 = (max_y.ceil().max(0.0) as u32).min(self.height());

        // Nearest-neighbour through the inverse transform. Quarter turns map
        // pixel centers onto pixel centers, so this copies exactly.
        const NUDGE: f64 = 1e-7;
        for y in y0..y1 {
            for x in x0..x1 {
                let (ux, uy) = inverse.apply(x as f64 + 0.5, y as f64 + 0.5);
                let sx = ux - dx + NUDGE;
                let sy = uy - dy + NUDGE;
                if sx < 0.0 || sy < 0.0 || sx >= iw || sy >= ih {
                    continue;
                }
                let src = image.get_pixel(sx as u32, sy as u32);
                blend_over(self.pixels.get_pixel_mut(x, y), src);
            }
        }
        Ok(())
    }

    fn draw_region(&mut self, image: &RgbaImage, src: Rect, dst: Rect) -> EngineResult<()> {
        if src.is_empty() || dst.is_empty() {
            return Ok(());
        }
        let bounds = Rect::new(0.0, 0.0, image.width() as f64, image.height() as f64);
        let Some(clipped) = src.intersect(&bounds) else {
            return Ok(());
        };

        // Shrink the destination by the same fractions the source lost.
        let sx = dst.width / src.width;
        let sy = dst.height / src.height;
        let dst_clipped = Rect::new(
            dst.x + (clipped.x - src.x) * sx,
            dst.y + (clipped.y - src.y) * sy,
            clipped.width * sx,
            clipped.height * sy,
        );

        let dx0 = dst_clipped.x.round() as i64;
        let dy0 = dst_clipped.y.round() as i64;
        let dx1 = dst_clipped.right().round() as i64;
        let dy1 = dst_clipped.bottom().round() as i64;
        if dx1 <= dx0 || dy1 <= dy0 {
            return Ok(());
        }
        let (out_w, out_h) = ((dx1 - dx0) as u32, (dy1 - dy0) as u32);

        let resampled = resample_region(image, clipped, out_w, out_h)?;

        for (x, y, px) in resampled.enumerate_pixels() {
            let tx = dx0 + x as i64;
            let ty = dy0 + y as i64;
            if tx < 0 || ty < 0 || tx >= self.width() as i64 || ty >= self.height() as i64 {
                continue;
            }
            blend_over(self.pixels.get_pixel_mut(tx as u32, ty as u32), px);
        }
        Ok(())
    }

    fn readback(self: Box<Self>) -> RgbaImage {
        self.pixels
    }
}

fn default_resize_options() -> ResizeOptions {
    ResizeOptions::new().resize_alg(fir::ResizeAlg::Convolution(fir::FilterType::Lanczos3))
}

/// Resample a fractional region of `image` to `out_w x out_h`.
///
/// Only the integer-aligned window around `region` is copied out of the
/// (potentially huge) work surface before premultiplying.
fn resample_region(
    image: &RgbaImage,
    region: Rect,
    out_w: u32,
    out_h: u32,
) -> EngineResult<RgbaImage> {
    run_with_panic_policy("composite:resample", || {
        let wx0 = region.x.floor().max(0.0) as u32;
        let wy0 = region.y.floor().max(0.0) as u32;
        let wx1 = (region.right().ceil() as u32).min(image.width());
        let wy1 = (region.bottom().ceil() as u32).min(image.height());
        let (win_w, win_h) = (wx1.saturating_sub(wx0), wy1.saturating_sub(wy0));
        if win_w == 0 || win_h == 0 {
            return Err(CropEngineError::resample_failed(
                (win_w, win_h),
                (out_w, out_h),
                "empty source window",
            ));
        }

        let window = imageops::crop_imm(image, wx0, wy0, win_w, win_h).to_image();
        let to_err = |message: String| {
            CropEngineError::resample_failed((win_w, win_h), (out_w, out_h), message)
        };

        let mut src_image =
            fir::images::Image::from_vec_u8(win_w, win_h, window.into_raw(), PixelType::U8x4)
                .map_err(|e| to_err(format!("fir source image error: {e:?}")))?;
        let mut dst_image = fir::images::Image::new(out_w, out_h, PixelType::U8x4);

        // Transparent work-surface margins must not bleed dark fringes.
        let mul_div = MulDiv::default();
        mul_div
            .multiply_alpha_inplace(&mut src_image)
            .map_err(|e| to_err(format!("failed to premultiply alpha: {e}")))?;

        let options = default_resize_options().crop(
            region.x - wx0 as f64,
            region.y - wy0 as f64,
            region.width,
            region.height,
        );
        let mut resizer = fir::Resizer::new();
        resizer
            .resize(&src_image, &mut dst_image, &options)
            .map_err(|e| to_err(format!("fir resize error: {e:?}")))?;

        mul_div
            .divide_alpha_inplace(&mut dst_image)
            .map_err(|e| to_err(format!("failed to unpremultiply alpha: {e}")))?;

        RgbaImage::from_raw(out_w, out_h, dst_image.into_vec())
            .ok_or_else(|| to_err("failed to create rgba image from resampled data".to_string()))
    })
}

/// Default provider: heap-backed raster surfaces up to `max_side` per edge.
#[derive(Clone, Debug)]
pub struct RasterSurfaceProvider {
    max_side: u32,
}

impl RasterSurfaceProvider {
    pub fn new(max_side: u32) -> Self {
        Self { max_side }
    }

    pub fn max_side(&self) -> u32 {
        self.max_side
    }
}

impl Default for RasterSurfaceProvider {
    fn default() -> Self {
        Self::new(super::MAX_SURFACE_SIDE)
    }
}

impl SurfaceProvider for RasterSurfaceProvider {
    fn acquire(&self, width: u32, height: u32) -> EngineResult<Box<dyn RenderSurface>> {
        if width == 0 || height == 0 {
            return Err(CropEngineError::surface_acquisition_failed(
                width,
                height,
                "surface dimensions must be positive",
            ));
        }
        if width > self.max_side || height > self.max_side {
            return Err(CropEngineError::surface_acquisition_failed(
                width,
                height,
                format!("exceeds maximum surface side {}", self.max_side),
            ));
        }
        let len = (width as usize)
            .checked_mul(height as usize)
            .and_then(|n| n.checked_mul(4))
            .ok_or_else(|| {
                CropEngineError::surface_acquisition_failed(width, height, "buffer size overflow")
            })?;

        let mut buffer = Vec::new();
        buffer.try_reserve_exact(len).map_err(|e| {
            CropEngineError::surface_acquisition_failed(width, height, format!("allocation failed: {e}"))
        })?;
        buffer.resize(len, 0);

        let surface = RasterSurface::from_buffer(width, height, buffer).ok_or_else(|| {
            CropEngineError::surface_acquisition_failed(width, height, "buffer size mismatch")
        })?;
        Ok(Box::new(surface))
    }
}
