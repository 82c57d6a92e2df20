// src/engine/geometry.rs
//
// On-screen transform -> crop rectangle in source pixels.
//
// The crop frame stays screen-axis-aligned while the image is panned, zoomed
// and rotated underneath it. Because rotation is applied to the image pixels
// (on the work surface) rather than to the frame, the rectangle is expressed
// relative to the center of the rotated image, in unscaled source pixels.

use super::transform::{Point, TransformState};

/// The on-screen crop window. Fixed for the lifetime of a session.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CropFrameSpec {
    pub display_width: f64,
    pub display_height: f64,
    pub aspect_ratio: f64,
}

impl CropFrameSpec {
    pub fn new(display_width: f64, display_height: f64) -> Self {
        let aspect_ratio = if display_height > 0.0 {
            display_width / display_height
        } else {
            0.0
        };
        Self {
            display_width,
            display_height,
            aspect_ratio,
        }
    }

    /// Frame of the given width whose height follows `aspect_ratio` (w / h).
    pub fn with_aspect_ratio(display_width: f64, aspect_ratio: f64) -> Self {
        Self {
            display_width,
            display_height: display_width / aspect_ratio,
            aspect_ratio,
        }
    }

    pub fn aspect_ratio(&self) -> f64 {
        self.aspect_ratio
    }

    pub fn is_valid(&self) -> bool {
        self.display_width.is_finite()
            && self.display_height.is_finite()
            && self.display_width > 0.0
            && self.display_height > 0.0
    }
}

/// The editing viewport in display pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
    /// Top-left of the crop frame inside the viewport; `None` centers it.
    pub frame_origin: Option<Point>,
}

impl Viewport {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            frame_origin: None,
        }
    }

    /// Viewport exactly the size of the frame.
    pub fn fitting(frame: &CropFrameSpec) -> Self {
        Self::new(frame.display_width, frame.display_height)
    }

    pub fn with_frame_origin(mut self, origin: Point) -> Self {
        self.frame_origin = Some(origin);
        self
    }

    pub fn center(&self) -> Point {
        Point::new(self.width / 2.0, self.height / 2.0)
    }

    pub fn frame_center(&self, frame: &CropFrameSpec) -> Point {
        let origin = self.frame_origin.unwrap_or_else(|| {
            Point::new(
                (self.width - frame.display_width) / 2.0,
                (self.height - frame.display_height) / 2.0,
            )
        });
        Point::new(
            origin.x + frame.display_width / 2.0,
            origin.y + frame.display_height / 2.0,
        )
    }
}

/// Axis-aligned rectangle with fractional coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn is_empty(&self) -> bool {
        !(self.width > 0.0 && self.height > 0.0)
    }

    /// Overlap with `other`, or `None` when they do not intersect.
    pub fn intersect(&self, other: &Rect) -> Option<Rect> {
        let x = self.x.max(other.x);
        let y = self.y.max(other.y);
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());
        let rect = Rect::new(x, y, right - x, bottom - y);
        if rect.is_empty() {
            None
        } else {
            Some(rect)
        }
    }
}

/// Crop rectangle in source pixels, centered `center_offset` away from the
/// center of the (rotated) image.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SourceCropRect {
    pub center_offset: Point,
    pub width: f64,
    pub height: f64,
}

impl SourceCropRect {
    /// Rectangle on a square work surface of side `side`, relative to the
    /// rotated image placed at [`work_surface_origin`].
    pub fn on_work_surface(
        &self,
        side: u32,
        natural_width: u32,
        natural_height: u32,
        rotation: i32,
    ) -> Rect {
        let (ox, oy) = work_surface_origin(side, natural_width, natural_height, rotation);
        let r = self.in_image_frame(natural_width, natural_height, rotation);
        Rect::new(r.x + ox as f64, r.y + oy as f64, r.width, r.height)
    }

    /// Rectangle relative to the top-left of the rotated image's bounding box.
    /// For rotation 0 these are plain source-image coordinates.
    pub fn in_image_frame(&self, natural_width: u32, natural_height: u32, rotation: i32) -> Rect {
        let (w, h) = rotated_bounds(natural_width, natural_height, rotation);
        self.around(Point::new(w as f64 / 2.0, h as f64 / 2.0))
    }

    fn around(&self, image_center: Point) -> Rect {
        let center = image_center + self.center_offset;
        Rect::new(
            center.x - self.width / 2.0,
            center.y - self.height / 2.0,
            self.width,
            self.height,
        )
    }
}

/// Map the live transform to the part of the source image under the frame.
///
/// Pure and total: scale is always clamped positive, and pan may put the
/// rectangle partly or wholly outside the image.
pub fn resolve_crop_rect(
    state: &TransformState,
    natural_width: u32,
    natural_height: u32,
    frame: &CropFrameSpec,
    viewport: &Viewport,
) -> SourceCropRect {
    let displayed_width = natural_width as f64 * state.scale;
    let displayed_height = natural_height as f64 * state.scale;

    let crop_center_offset = viewport.frame_center(frame) - viewport.center();
    let adjusted_offset = crop_center_offset - state.pan;

    // natural / displayed is 1/scale on either axis; width is the reference.
    let source_scale = if displayed_width > 0.0 {
        natural_width as f64 / displayed_width
    } else if displayed_height > 0.0 {
        natural_height as f64 / displayed_height
    } else {
        1.0 / state.scale
    };

    SourceCropRect {
        center_offset: adjusted_offset * source_scale,
        width: frame.display_width * source_scale,
        height: frame.display_height * source_scale,
    }
}

/// Side of a square surface that holds the image under any rotation.
pub fn work_surface_side(natural_width: u32, natural_height: u32, padding: u32) -> u32 {
    let w = natural_width as f64;
    let h = natural_height as f64;
    let diagonal = (w * w + h * h).sqrt().ceil();
    (diagonal as u32).saturating_add(padding)
}

/// Top-left of the rotated image's bounding box on a work surface of side
/// `side`. Always whole pixels, so the image copies onto the grid exactly.
pub fn work_surface_origin(
    side: u32,
    natural_width: u32,
    natural_height: u32,
    rotation: i32,
) -> (u32, u32) {
    let (rw, rh) = rotated_bounds(natural_width, natural_height, rotation);
    (side.saturating_sub(rw) / 2, side.saturating_sub(rh) / 2)
}

/// Bounding box of the image after rotating by a multiple of 90 degrees.
pub fn rotated_bounds(natural_width: u32, natural_height: u32, rotation: i32) -> (u32, u32) {
    if rotation.rem_euclid(180) == 90 {
        (natural_height, natural_width)
    } else {
        (natural_width, natural_height)
    }
}
