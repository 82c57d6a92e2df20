// src/engine/common.rs
//
// Common utilities shared across engine modules.
// Provides the engine Result alias and the panic policy for codec/raster work.

use crate::error::CropEngineError;
use std::panic::{catch_unwind, AssertUnwindSafe};

/// Every engine stage returns the crate error directly so the taxonomy
/// (Decode, Surface, Encode, ...) survives up to the orchestrator.
pub type EngineResult<T> = std::result::Result<T, CropEngineError>;

/// Run a codec or raster stage, converting a panic inside third-party code
/// into `InternalPanic` instead of unwinding into the host's UI loop.
pub fn run_with_panic_policy<T, F>(stage: &'static str, f: F) -> EngineResult<T>
where
    F: FnOnce() -> EngineResult<T>,
{
    match catch_unwind(AssertUnwindSafe(f)) {
        Ok(result) => result,
        Err(payload) => {
            let detail = payload
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unknown panic payload".to_string());
            tracing::error!(stage, %detail, "panic caught in engine stage");
            Err(CropEngineError::internal_panic(format!(
                "{stage} panicked: {detail}"
            )))
        }
    }
}
