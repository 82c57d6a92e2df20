// src/policy.rs
//
// Caller-supplied output policy: target raster size and encoding.
// The engine never hardcodes these; the host picks one per Open.

use crate::engine::CropFrameSpec;
use crate::error::CropEngineError;

/// Output format for encoding the result surface
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Png,
    Jpeg { quality: u8 },
    WebP { quality: u8 },
}

impl OutputFormat {
    pub fn from_str(format: &str, quality: Option<u8>) -> Result<Self, CropEngineError> {
        let q = quality.unwrap_or(85);
        match format.to_lowercase().as_str() {
            "png" => Ok(Self::Png),
            "jpeg" | "jpg" => Ok(Self::Jpeg { quality: q }),
            "webp" => Ok(Self::WebP { quality: q }),
            other => Err(CropEngineError::unsupported_format(other.to_string())),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg { .. } => "jpeg",
            Self::WebP { .. } => "webp",
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg { .. } => "image/jpeg",
            Self::WebP { .. } => "image/webp",
        }
    }
}

/// Target raster produced by Apply: exactly `target_width x target_height`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OutputPolicy {
    pub target_width: u32,
    pub target_height: u32,
    pub format: OutputFormat,
}

impl OutputPolicy {
    pub fn new(target_width: u32, target_height: u32, format: OutputFormat) -> Self {
        Self {
            target_width,
            target_height,
            format,
        }
    }

    pub fn png(target_width: u32, target_height: u32) -> Self {
        Self::new(target_width, target_height, OutputFormat::Png)
    }

    pub fn validate(&self) -> Result<(), CropEngineError> {
        if self.target_width == 0 || self.target_height == 0 {
            return Err(CropEngineError::invalid_argument(
                "target size",
                format!("{}x{}", self.target_width, self.target_height),
                "target width and height must be positive",
            ));
        }
        Ok(())
    }
}

// =============================================================================
// PRESETS - The image slots of a vote card form
// =============================================================================

/// Crop frame + output policy for one kind of image slot.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SlotPreset {
    pub frame: CropFrameSpec,
    pub output: OutputPolicy,
}

impl SlotPreset {
    pub fn new(frame: CropFrameSpec, output: OutputPolicy) -> Self {
        Self { frame, output }
    }

    /// Get the built-in preset by name
    pub fn get(name: &str) -> Result<Self, CropEngineError> {
        match name.to_lowercase().as_str() {
            "question" => Ok(Self::question()),
            "option" | "image-option" => Ok(Self::image_option()),
            "thumbnail" | "text-option" => Ok(Self::text_option_thumbnail()),
            "avatar" => Ok(Self::avatar()),
            other => Err(CropEngineError::invalid_preset(other.to_string())),
        }
    }

    /// Question image: 600x300 banner
    pub fn question() -> Self {
        Self::new(CropFrameSpec::new(600.0, 300.0), OutputPolicy::png(600, 300))
    }

    /// Image option: 400x400 square
    pub fn image_option() -> Self {
        Self::new(CropFrameSpec::new(400.0, 400.0), OutputPolicy::png(400, 400))
    }

    /// Thumbnail next to a text option
    pub fn text_option_thumbnail() -> Self {
        Self::new(CropFrameSpec::new(100.0, 100.0), OutputPolicy::png(100, 100))
    }

    /// User profile picture
    pub fn avatar() -> Self {
        Self::new(CropFrameSpec::new(200.0, 200.0), OutputPolicy::png(200, 200))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_format_from_str() {
        assert_eq!(OutputFormat::from_str("PNG", None).unwrap(), OutputFormat::Png);
        assert_eq!(
            OutputFormat::from_str("jpg", Some(70)).unwrap(),
            OutputFormat::Jpeg { quality: 70 }
        );
        assert_eq!(
            OutputFormat::from_str("webp", None).unwrap(),
            OutputFormat::WebP { quality: 85 }
        );
        assert!(OutputFormat::from_str("gif", None).is_err());
    }

    #[test]
    fn test_presets_match_observed_slot_sizes() {
        let q = SlotPreset::question();
        assert_eq!((q.output.target_width, q.output.target_height), (600, 300));
        assert_eq!(q.frame.aspect_ratio(), 2.0);

        assert_eq!(SlotPreset::image_option().output.target_width, 400);
        assert_eq!(SlotPreset::text_option_thumbnail().output.target_height, 100);
        assert_eq!(SlotPreset::avatar().output.target_width, 200);
    }

    #[test]
    fn test_preset_lookup() {
        assert_eq!(SlotPreset::get("Avatar").unwrap(), SlotPreset::avatar());
        assert!(matches!(
            SlotPreset::get("banner"),
            Err(CropEngineError::InvalidPreset { .. })
        ));
    }

    #[test]
    fn test_policy_rejects_zero_target() {
        assert!(OutputPolicy::png(0, 10).validate().is_err());
        assert!(OutputPolicy::png(10, 10).validate().is_ok());
    }
}
