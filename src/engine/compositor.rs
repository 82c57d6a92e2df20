// src/engine/compositor.rs
//
// Two-stage render of the final image:
//   1. rotate the whole source onto a square work surface big enough for any angle
//   2. resample the crop rectangle from the work surface into the target raster
// then encode the target raster.

use super::common::EngineResult;
use super::decoder::SourceImage;
use super::encoder;
use super::geometry::{
    rotated_bounds, work_surface_origin, work_surface_side, Rect, SourceCropRect,
};
use super::surface::SurfaceProvider;
use super::transform::TransformState;
use crate::policy::{OutputFormat, OutputPolicy};
use crate::ApplyMetrics;
use image::RgbaImage;
use std::time::Instant;

/// Encoded result of an Apply.
#[derive(Clone, Debug)]
pub struct OutputImage {
    pub data: Vec<u8>,
    pub width: u32,
    pub height: u32,
    pub format: OutputFormat,
    pub metrics: ApplyMetrics,
}

impl OutputImage {
    pub fn mime_type(&self) -> &'static str {
        self.format.mime_type()
    }
}

pub struct CanvasCompositor<'a> {
    provider: &'a dyn SurfaceProvider,
    background: [u8; 4],
    padding: u32,
}

impl<'a> CanvasCompositor<'a> {
    pub fn new(provider: &'a dyn SurfaceProvider, background: [u8; 4], padding: u32) -> Self {
        Self {
            provider,
            background,
            padding,
        }
    }

    /// Render the target raster without encoding it.
    ///
    /// Areas of the target not covered by the image keep the background color.
    pub fn render(
        &self,
        source: &SourceImage,
        state: &TransformState,
        crop: &SourceCropRect,
        target_width: u32,
        target_height: u32,
    ) -> EngineResult<RgbaImage> {
        let (work, side) = self.rotate_onto_work_surface(source, state)?;
        let region =
            crop.on_work_surface(side, source.width(), source.height(), state.rotation_degrees);
        self.crop_from_work_surface(&work, region, target_width, target_height)
    }

    /// Render and encode per `policy`, timing each stage.
    pub fn compose(
        &self,
        source: &SourceImage,
        state: &TransformState,
        crop: &SourceCropRect,
        policy: &OutputPolicy,
    ) -> EngineResult<OutputImage> {
        policy.validate()?;
        let total_start = Instant::now();

        let rotate_start = Instant::now();
        let (work, side) = self.rotate_onto_work_surface(source, state)?;
        let rotate_ms = rotate_start.elapsed().as_secs_f64() * 1000.0;

        let crop_start = Instant::now();
        let region =
            crop.on_work_surface(side, source.width(), source.height(), state.rotation_degrees);
        let raster = self.crop_from_work_surface(
            &work,
            region,
            policy.target_width,
            policy.target_height,
        )?;
        drop(work);
        let crop_ms = crop_start.elapsed().as_secs_f64() * 1000.0;

        let encode_start = Instant::now();
        let data = encoder::encode(&raster, policy.format)?;
        let encode_ms = encode_start.elapsed().as_secs_f64() * 1000.0;

        let metrics = ApplyMetrics {
            rotate_ms,
            crop_ms,
            encode_ms,
            total_ms: total_start.elapsed().as_secs_f64() * 1000.0,
            work_surface_side: side,
            bytes_out: data.len(),
            ..ApplyMetrics::default()
        };

        Ok(OutputImage {
            data,
            width: raster.width(),
            height: raster.height(),
            format: policy.format,
            metrics,
        })
    }

    fn rotate_onto_work_surface(
        &self,
        source: &SourceImage,
        state: &TransformState,
    ) -> EngineResult<(RgbaImage, u32)> {
        let (w, h) = (source.width(), source.height());
        let side = work_surface_side(w, h, self.padding);

        let rotation = state.rotation_degrees;
        let (rw, rh) = rotated_bounds(w, h, rotation);
        let (ox, oy) = work_surface_origin(side, w, h, rotation);

        let mut surface = self.provider.acquire(side, side)?;
        surface.translate(ox as f64 + rw as f64 / 2.0, oy as f64 + rh as f64 / 2.0);
        surface.rotate(rotation)?;
        surface.draw_image(source.pixels(), -(w as f64) / 2.0, -(h as f64) / 2.0)?;
        surface.reset_transform();

        Ok((surface.readback(), side))
    }

    fn crop_from_work_surface(
        &self,
        work: &RgbaImage,
        region: Rect,
        target_width: u32,
        target_height: u32,
    ) -> EngineResult<RgbaImage> {
        let mut surface = self.provider.acquire(target_width, target_height)?;
        surface.fill(self.background);
        surface.draw_region(
            work,
            region,
            Rect::new(0.0, 0.0, target_width as f64, target_height as f64),
        )?;
        Ok(surface.readback())
    }
}
