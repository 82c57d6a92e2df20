// lib.rs
//
// votecard-crop: interactive image transform-and-crop engine for vote card forms
//
// Design goals:
// - Gesture handling that is pure and frame-coalesced
// - Crop geometry that is exact and testable without a renderer
// - Output that is always exactly the caller's target size
// - Edit history that survives reopening the same image, and only that image
// - No panics escaping into the host's UI loop

pub mod engine;
pub mod error;
pub mod policy;

pub use engine::{
    EditHistoryStore, EditorConfig, EditorLimits, EditorState, GestureEvent, ImageSource,
    OutputImage, SessionKey, SessionSpec, TransformEditor, TransformState,
};
pub use error::{CropEngineError, ErrorCategory, Result};
pub use policy::{OutputFormat, OutputPolicy, SlotPreset};

/// Metrics payload version.
pub const APPLY_METRICS_VERSION: &str = "1.0.0";

/// Stage timings and output size for one Apply
#[derive(Debug, Clone, PartialEq)]
pub struct ApplyMetrics {
    /// Schema version for compatibility negotiation
    pub version: &'static str,
    /// Work-surface stage: rotate the full source image
    pub rotate_ms: f64,
    /// Result-surface stage: resample the crop into the target size
    pub crop_ms: f64,
    /// Encode stage duration in milliseconds
    pub encode_ms: f64,
    /// Total wall-clock duration in milliseconds
    pub total_ms: f64,
    /// Side of the square rotation work surface in pixels
    pub work_surface_side: u32,
    /// Encoded output size in bytes
    pub bytes_out: usize,
}

impl Default for ApplyMetrics {
    fn default() -> Self {
        Self {
            version: APPLY_METRICS_VERSION,
            rotate_ms: 0.0,
            crop_ms: 0.0,
            encode_ms: 0.0,
            total_ms: 0.0,
            work_surface_side: 0,
            bytes_out: 0,
        }
    }
}

impl ApplyMetrics {
    /// Time spent compositing (both surfaces), excluding encode.
    pub fn composite_ms(&self) -> f64 {
        self.rotate_ms + self.crop_ms
    }
}
