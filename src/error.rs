// src/error.rs
//
// Unified error handling for votecard-crop
// Uses thiserror for simple, type-safe error handling
//
// Error Taxonomy:
// - Decode: the image could not be fetched, decoded or is too large
// - Surface: a drawing surface could not be acquired
// - Encode: rasterization to the output format failed
// - UserError: the host called the editor in the wrong state or with bad input
// - InternalBug: library bugs (should not happen)

use std::borrow::Cow;
use thiserror::Error;

/// Error taxonomy surfaced to the host application.
///
/// None of these crash the host: every category leaves the editor in a
/// well-defined state (Closed after a failed load, Ready after a failed save).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum ErrorCategory {
    /// Image could not be fetched/decoded; the session never reaches Ready
    Decode,
    /// Drawing surface unavailable; Save aborts and the session returns to Ready
    Surface,
    /// Rasterization to the output format failed; same recovery as Surface
    Encode,
    /// Invalid input or an operation issued in the wrong editor state
    UserError,
    /// Library bugs (should not happen)
    InternalBug,
}

impl ErrorCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCategory::Decode => "Decode",
            ErrorCategory::Surface => "Surface",
            ErrorCategory::Encode => "Encode",
            ErrorCategory::UserError => "UserError",
            ErrorCategory::InternalBug => "InternalBug",
        }
    }
}

/// votecard-crop error types
#[derive(Debug, Error)]
pub enum CropEngineError {
    // Fetch Errors
    #[error("Failed to fetch image '{url}': {message}")]
    FetchFailed {
        url: Cow<'static, str>,
        message: Cow<'static, str>,
    },

    #[error("Malformed data URL: {reason}")]
    InvalidDataUrl { reason: Cow<'static, str> },

    // Decode Errors
    #[error("Unsupported image format: {format}")]
    UnsupportedFormat { format: Cow<'static, str> },

    #[error("Failed to decode image: {message}")]
    DecodeFailed { message: Cow<'static, str> },

    // Size Limit Errors
    #[error("Image dimension {dimension} exceeds maximum {max}")]
    DimensionExceedsLimit { dimension: u32, max: u32 },

    #[error("Image pixel count {pixels} exceeds maximum {max}")]
    PixelCountExceedsLimit { pixels: u64, max: u64 },

    #[error("Editor limit exceeded: {reason}")]
    LimitExceeded { reason: Cow<'static, str> },

    // Render Errors
    #[error("Failed to acquire a {width}x{height} drawing surface: {reason}")]
    SurfaceAcquisitionFailed {
        width: u32,
        height: u32,
        reason: Cow<'static, str>,
    },

    #[error(
        "Unsupported rotation angle: {degrees}. Only multiples of 90 degrees are supported"
    )]
    InvalidRotationAngle { degrees: i32 },

    #[error("Resample failed ({source_width}x{source_height} -> {target_width}x{target_height}): {message}")]
    ResampleFailed {
        source_width: u32,
        source_height: u32,
        target_width: u32,
        target_height: u32,
        message: Cow<'static, str>,
    },

    // Encode Errors
    #[error("Failed to encode as {format}: {message}")]
    EncodeFailed {
        format: Cow<'static, str>,
        message: Cow<'static, str>,
    },

    // Configuration Errors
    #[error("Unknown slot preset: '{name}'. Available: question, option, thumbnail, avatar")]
    InvalidPreset { name: Cow<'static, str> },

    #[error("Invalid value for {name}: {value}. {reason}")]
    InvalidArgument {
        name: Cow<'static, str>,
        value: Cow<'static, str>,
        reason: Cow<'static, str>,
    },

    // State Errors
    #[error("Cannot {operation} while the editor is {state}")]
    InvalidState {
        operation: Cow<'static, str>,
        state: Cow<'static, str>,
    },

    #[error("Result belongs to a session that is no longer open")]
    StaleSession,

    // Internal Errors
    #[error("Internal error: {message}")]
    InternalPanic { message: Cow<'static, str> },
}

impl Clone for CropEngineError {
    fn clone(&self) -> Self {
        match self {
            Self::FetchFailed { url, message } => Self::FetchFailed {
                url: url.clone(),
                message: message.clone(),
            },
            Self::InvalidDataUrl { reason } => Self::InvalidDataUrl {
                reason: reason.clone(),
            },
            Self::UnsupportedFormat { format } => Self::UnsupportedFormat {
                format: format.clone(),
            },
            Self::DecodeFailed { message } => Self::DecodeFailed {
                message: message.clone(),
            },
            Self::DimensionExceedsLimit { dimension, max } => Self::DimensionExceedsLimit {
                dimension: *dimension,
                max: *max,
            },
            Self::PixelCountExceedsLimit { pixels, max } => Self::PixelCountExceedsLimit {
                pixels: *pixels,
                max: *max,
            },
            Self::LimitExceeded { reason } => Self::LimitExceeded {
                reason: reason.clone(),
            },
            Self::SurfaceAcquisitionFailed {
                width,
                height,
                reason,
            } => Self::SurfaceAcquisitionFailed {
                width: *width,
                height: *height,
                reason: reason.clone(),
            },
            Self::InvalidRotationAngle { degrees } => {
                Self::InvalidRotationAngle { degrees: *degrees }
            }
            Self::ResampleFailed {
                source_width,
                source_height,
                target_width,
                target_height,
                message,
            } => Self::ResampleFailed {
                source_width: *source_width,
                source_height: *source_height,
                target_width: *target_width,
                target_height: *target_height,
                message: message.clone(),
            },
            Self::EncodeFailed { format, message } => Self::EncodeFailed {
                format: format.clone(),
                message: message.clone(),
            },
            Self::InvalidPreset { name } => Self::InvalidPreset { name: name.clone() },
            Self::InvalidArgument {
                name,
                value,
                reason,
            } => Self::InvalidArgument {
                name: name.clone(),
                value: value.clone(),
                reason: reason.clone(),
            },
            Self::InvalidState { operation, state } => Self::InvalidState {
                operation: operation.clone(),
                state: state.clone(),
            },
            Self::StaleSession => Self::StaleSession,
            Self::InternalPanic { message } => Self::InternalPanic {
                message: message.clone(),
            },
        }
    }
}

// Constructor Helpers
impl CropEngineError {
    pub fn fetch_failed(
        url: impl Into<Cow<'static, str>>,
        message: impl Into<Cow<'static, str>>,
    ) -> Self {
        Self::FetchFailed {
            url: url.into(),
            message: message.into(),
        }
    }

    pub fn invalid_data_url(reason: impl Into<Cow<'static, str>>) -> Self {
        Self::InvalidDataUrl {
            reason: reason.into(),
        }
    }

    pub fn unsupported_format(format: impl Into<Cow<'static, str>>) -> Self {
        Self::UnsupportedFormat {
            format: format.into(),
        }
    }

    pub fn decode_failed(message: impl Into<Cow<'static, str>>) -> Self {
        Self::DecodeFailed {
            message: message.into(),
        }
    }

    pub fn dimension_exceeds_limit(dimension: u32, max: u32) -> Self {
        Self::DimensionExceedsLimit { dimension, max }
    }

    pub fn pixel_count_exceeds_limit(pixels: u64, max: u64) -> Self {
        Self::PixelCountExceedsLimit { pixels, max }
    }

    pub fn limit_exceeded(reason: impl Into<Cow<'static, str>>) -> Self {
        Self::LimitExceeded {
            reason: reason.into(),
        }
    }

    pub fn surface_acquisition_failed(
        width: u32,
        height: u32,
        reason: impl Into<Cow<'static, str>>,
    ) -> Self {
        Self::SurfaceAcquisitionFailed {
            width,
            height,
            reason: reason.into(),
        }
    }

    pub fn invalid_rotation_angle(degrees: i32) -> Self {
        Self::InvalidRotationAngle { degrees }
    }

    pub fn resample_failed(
        source_dims: (u32, u32),
        target_dims: (u32, u32),
        message: impl Into<Cow<'static, str>>,
    ) -> Self {
        Self::ResampleFailed {
            source_width: source_dims.0,
            source_height: source_dims.1,
            target_width: target_dims.0,
            target_height: target_dims.1,
            message: message.into(),
        }
    }

    pub fn encode_failed(
        format: impl Into<Cow<'static, str>>,
        message: impl Into<Cow<'static, str>>,
    ) -> Self {
        Self::EncodeFailed {
            format: format.into(),
            message: message.into(),
        }
    }

    pub fn invalid_preset(name: impl Into<Cow<'static, str>>) -> Self {
        Self::InvalidPreset { name: name.into() }
    }

    pub fn invalid_argument(
        name: impl Into<Cow<'static, str>>,
        value: impl Into<Cow<'static, str>>,
        reason: impl Into<Cow<'static, str>>,
    ) -> Self {
        Self::InvalidArgument {
            name: name.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }

    pub fn invalid_state(
        operation: impl Into<Cow<'static, str>>,
        state: impl Into<Cow<'static, str>>,
    ) -> Self {
        Self::InvalidState {
            operation: operation.into(),
            state: state.into(),
        }
    }

    pub fn stale_session() -> Self {
        Self::StaleSession
    }

    pub fn internal_panic(message: impl Into<Cow<'static, str>>) -> Self {
        Self::InternalPanic {
            message: message.into(),
        }
    }

    /// Check if the host can recover from this error without restarting.
    ///
    /// Only library bugs are treated as unrecoverable; even then the editor
    /// itself is left in a defined state.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self.category(), ErrorCategory::InternalBug)
    }

    /// Get the error category for this error
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::FetchFailed { .. }
            | Self::InvalidDataUrl { .. }
            | Self::UnsupportedFormat { .. }
            | Self::DecodeFailed { .. }
            | Self::DimensionExceedsLimit { .. }
            | Self::PixelCountExceedsLimit { .. }
            | Self::LimitExceeded { .. } => ErrorCategory::Decode,

            Self::SurfaceAcquisitionFailed { .. } | Self::InvalidRotationAngle { .. } => {
                ErrorCategory::Surface
            }

            // Resampling is part of rasterizing the result surface.
            Self::EncodeFailed { .. } | Self::ResampleFailed { .. } => ErrorCategory::Encode,

            Self::InvalidPreset { .. }
            | Self::InvalidArgument { .. }
            | Self::InvalidState { .. }
            | Self::StaleSession => ErrorCategory::UserError,

            Self::InternalPanic { .. } => ErrorCategory::InternalBug,
        }
    }

    /// The single message shown to the end user. The `Display` text is for logs.
    pub fn user_message(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Decode => match self {
                Self::DimensionExceedsLimit { .. }
                | Self::PixelCountExceedsLimit { .. }
                | Self::LimitExceeded { .. } => "This image is too large to edit.",
                _ => "The image could not be loaded.",
            },
            ErrorCategory::Surface | ErrorCategory::Encode => {
                "The image could not be saved. Please try again."
            }
            ErrorCategory::UserError => "This action is not available right now.",
            ErrorCategory::InternalBug => "Something went wrong while editing the image.",
        }
    }
}

// Result type alias
pub type Result<T> = std::result::Result<T, CropEngineError>;
