// src/engine/limits.rs
//
// Per-editor resource limits and enforcement helpers.
// The global ceilings in the engine facade always apply on top of these.

use super::common::EngineResult;
use super::geometry::work_surface_side;
use super::MAX_SURFACE_SIDE;
use crate::error::CropEngineError;
use std::time::{Duration, Instant};

const STRICT_MAX_PIXELS: u64 = 24_000_000; // ~6K x 4K
const LENIENT_MAX_PIXELS: u64 = 75_000_000; // below global MAX_PIXELS
const STRICT_MAX_BYTES: u64 = 20 * 1024 * 1024;
const LENIENT_MAX_BYTES: u64 = 48 * 1024 * 1024;
const STRICT_MAX_SURFACE_SIDE: u32 = 8192;
const LENIENT_MAX_SURFACE_SIDE: u32 = 12288;
const STRICT_TIMEOUT_MS: u64 = 10_000;
const LENIENT_TIMEOUT_MS: u64 = 30_000;

/// Byte cap for fetches when no `max_bytes` is configured.
const FALLBACK_MAX_BYTES: u64 = 256 * 1024 * 1024;
/// Fetch timeout when no `timeout_ms` is configured.
const FALLBACK_TIMEOUT_MS: u64 = 60_000;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LimitPolicy {
    Strict,
    Lenient,
    Custom,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EditorLimits {
    pub policy: LimitPolicy,
    pub max_bytes: Option<u64>,
    pub max_pixels: Option<u64>,
    pub max_surface_side: Option<u32>,
    pub timeout_ms: Option<u64>,
}

impl Default for EditorLimits {
    fn default() -> Self {
        Self::lenient()
    }
}

impl EditorLimits {
    pub fn strict() -> Self {
        Self {
            policy: LimitPolicy::Strict,
            max_bytes: Some(STRICT_MAX_BYTES),
            max_pixels: Some(STRICT_MAX_PIXELS),
            max_surface_side: Some(STRICT_MAX_SURFACE_SIDE),
            timeout_ms: Some(STRICT_TIMEOUT_MS),
        }
    }

    pub fn lenient() -> Self {
        Self {
            policy: LimitPolicy::Lenient,
            max_bytes: Some(LENIENT_MAX_BYTES),
            max_pixels: Some(LENIENT_MAX_PIXELS),
            max_surface_side: Some(LENIENT_MAX_SURFACE_SIDE),
            timeout_ms: Some(LENIENT_TIMEOUT_MS),
        }
    }

    /// No per-editor limits; only the global ceilings apply.
    pub fn custom() -> Self {
        Self {
            policy: LimitPolicy::Custom,
            max_bytes: None,
            max_pixels: None,
            max_surface_side: None,
            timeout_ms: None,
        }
    }

    pub fn apply_policy(policy: LimitPolicy) -> Self {
        match policy {
            LimitPolicy::Strict => Self::strict(),
            LimitPolicy::Lenient => Self::lenient(),
            LimitPolicy::Custom => Self::custom(),
        }
    }

    /// Effective surface side cap, never above `MAX_SURFACE_SIDE`.
    pub fn surface_side_cap(&self) -> u32 {
        self.max_surface_side
            .map_or(MAX_SURFACE_SIDE, |side| side.min(MAX_SURFACE_SIDE))
    }

    pub fn byte_cap(&self) -> u64 {
        self.max_bytes.unwrap_or(FALLBACK_MAX_BYTES)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms.unwrap_or(FALLBACK_TIMEOUT_MS))
    }

    pub fn enforce_source_len(&self, len: usize) -> EngineResult<()> {
        if let Some(limit) = self.max_bytes {
            let len_u64 = len as u64;
            if len_u64 > limit {
                return Err(CropEngineError::limit_exceeded(format!(
                    "input size {len_u64} bytes exceeds limit of {limit} bytes; \
                     raise EditorLimits::max_bytes or use the lenient policy"
                )));
            }
        }
        Ok(())
    }

    pub fn enforce_pixels(&self, width: u32, height: u32) -> EngineResult<()> {
        if let Some(limit) = self.max_pixels {
            let pixels = width as u64 * height as u64;
            if pixels > limit {
                return Err(CropEngineError::pixel_count_exceeds_limit(pixels, limit));
            }
        }
        Ok(())
    }

    /// Reject sources whose rotation work surface could not be acquired at Apply.
    pub fn enforce_surface_side(&self, width: u32, height: u32, padding: u32) -> EngineResult<()> {
        let side = work_surface_side(width, height, padding);
        let cap = self.surface_side_cap();
        if side > cap {
            return Err(CropEngineError::dimension_exceeds_limit(side, cap));
        }
        Ok(())
    }

    pub fn enforce_timeout(&self, started_at: Instant, stage: &'static str) -> EngineResult<()> {
        if let Some(limit_ms) = self.timeout_ms {
            let elapsed_ms = started_at.elapsed().as_millis() as u64;
            if elapsed_ms > limit_ms {
                return Err(CropEngineError::limit_exceeded(format!(
                    "{stage} exceeded {limit_ms}ms timeout (elapsed: {elapsed_ms}ms)"
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCategory;

    #[test]
    fn strict_policy_enforces_pixels_and_bytes() {
        let limits = EditorLimits::strict();
        assert!(limits.enforce_pixels(4000, 3000).is_ok());
        assert!(limits.enforce_pixels(7000, 7000).is_err());
        assert!(limits.enforce_source_len(1024).is_ok());
        let err = limits
            .enforce_source_len(STRICT_MAX_BYTES as usize + 1)
            .unwrap_err();
        assert_eq!(err.category(), ErrorCategory::Decode);
    }

    #[test]
    fn surface_side_is_checked_against_diagonal() {
        let limits = EditorLimits::strict();
        // 5000x5000 has a 7072px diagonal: fits under 8192.
        assert!(limits.enforce_surface_side(5000, 5000, 2).is_ok());
        // 6000x6000 needs 8488.
        let err = limits.enforce_surface_side(6000, 6000, 2).unwrap_err();
        assert!(matches!(
            err,
            CropEngineError::DimensionExceedsLimit { dimension: 8488, max: 8192 }
        ));
    }

    #[test]
    fn custom_falls_back_to_global_ceilings() {
        let limits = EditorLimits::custom();
        assert_eq!(limits.surface_side_cap(), MAX_SURFACE_SIDE);
        assert!(limits.enforce_pixels(u32::MAX, 2).is_ok());
        assert_eq!(limits.byte_cap(), FALLBACK_MAX_BYTES);

        let mut limits = EditorLimits::custom();
        limits.max_surface_side = Some(u32::MAX);
        assert_eq!(limits.surface_side_cap(), MAX_SURFACE_SIDE);
    }

    #[test]
    fn apply_policy_matches_constructors() {
        assert_eq!(EditorLimits::apply_policy(LimitPolicy::Strict), EditorLimits::strict());
        assert_eq!(EditorLimits::default(), EditorLimits::lenient());
    }

    #[test]
    fn timeout_enforced() {
        let limits = EditorLimits {
            timeout_ms: Some(1),
            ..EditorLimits::custom()
        };
        let fake_start = Instant::now() - Duration::from_millis(5);
        assert!(limits.enforce_timeout(fake_start, "decode").is_err());
        assert!(EditorLimits::custom()
            .enforce_timeout(fake_start, "decode")
            .is_ok());
    }
}
