// src/engine.rs
//
// The core of votecard-crop. An interactive transform-and-crop engine that:
// 1. Tracks scale / rotation / pan while the user manipulates an image
// 2. Maps that transform to a crop rectangle in source pixels
// 3. Renders the crop into a fixed-size raster on Apply
//
// This file is a facade over the modules in engine/

// =============================================================================
// SECURITY LIMITS
// =============================================================================

/// Maximum allowed image dimension (width or height).
/// Anything larger is rejected before the pixel buffer is allocated.
pub const MAX_DIMENSION: u32 = 16384;

/// Maximum allowed total pixels (width * height).
/// 100 megapixels = 400MB uncompressed RGBA.
pub const MAX_PIXELS: u64 = 100_000_000;

/// Hard ceiling for either side of any drawing surface, including the
/// square rotation work surface.
pub const MAX_SURFACE_SIDE: u32 = 16384;

// =============================================================================
// MODULE DECOMPOSITION
// =============================================================================

mod common;
mod compositor;
mod decoder;
mod editor;
mod encoder;
mod geometry;
mod gesture;
mod history;
mod io;
mod limits;
mod surface;
mod transform;

pub use common::{run_with_panic_policy, EngineResult};
pub use compositor::{CanvasCompositor, OutputImage};
pub use decoder::{
    apply_orientation, check_dimensions, decode_image, decode_source, detect_exif_orientation,
    detect_format, peek_dimensions, SourceImage,
};
pub use editor::{
    ApplyOutcome, ApplyTask, EditorConfig, EditorState, LoadOutcome, LoadTask, SessionSpec,
    TransformEditor, DEFAULT_BACKGROUND, DEFAULT_WORK_SURFACE_PADDING,
};
pub use encoder::{encode, encode_jpeg, encode_png, encode_webp, QualitySettings};
pub use geometry::{
    resolve_crop_rect, rotated_bounds, work_surface_origin, work_surface_side, CropFrameSpec, Rect,
    SourceCropRect, Viewport,
};
pub use gesture::{
    transition, GestureController, GestureEvent, GestureTracking, PinchStart, PINCH_DAMPING,
    ZOOM_STEP,
};
pub use history::{EditHistoryEntry, EditHistoryStore, SessionKey};
#[cfg(feature = "http")]
pub use io::HttpFetcher;
pub use io::{decode_data_url, ImageFetcher, ImageIdentity, ImageSource};
pub use limits::{EditorLimits, LimitPolicy};
pub use surface::{RasterSurface, RasterSurfaceProvider, RenderSurface, SurfaceProvider};
pub use transform::{
    clamp_scale, Point, PreviewTransform, TransformState, MAX_SCALE, MIN_SCALE, ROTATION_STEP,
};
