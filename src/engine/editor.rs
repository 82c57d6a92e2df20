// src/engine/editor.rs
//
// TransformEditor: the per-form session orchestrator.
//
// Closed -> Loading -> Ready -> Saving -> Closed, with Saving -> Ready on a
// failed save and Cancel closing from any open state. The suspendable halves
// (fetch + decode, composite + encode) live in LoadTask / ApplyTask so the
// host can run them on its own executor; their results come back through
// finish_load / finish_apply, which drop anything from an older generation.

use super::common::{run_with_panic_policy, EngineResult};
use super::compositor::{CanvasCompositor, OutputImage};
use super::decoder::{decode_source, SourceImage};
use super::geometry::{resolve_crop_rect, CropFrameSpec, SourceCropRect, Viewport};
use super::gesture::{GestureController, GestureEvent};
use super::history::{EditHistoryEntry, EditHistoryStore, SessionKey};
use super::io::{ImageFetcher, ImageIdentity, ImageSource};
use super::limits::EditorLimits;
use super::surface::{RasterSurfaceProvider, SurfaceProvider};
use super::transform::{PreviewTransform, TransformState};
use crate::error::CropEngineError;
use crate::policy::{OutputPolicy, SlotPreset};
use std::fmt;
use std::sync::Arc;
use std::time::Instant;

/// Dark neutral fill for result-surface areas the image does not cover.
pub const DEFAULT_BACKGROUND: [u8; 4] = [0x1E, 0x1E, 0x1E, 0xFF];
/// Extra pixels added to the work-surface diagonal.
pub const DEFAULT_WORK_SURFACE_PADDING: u32 = 2;

#[derive(Clone, Debug, PartialEq)]
pub struct EditorConfig {
    pub limits: EditorLimits,
    pub background: [u8; 4],
    pub work_surface_padding: u32,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            limits: EditorLimits::lenient(),
            background: DEFAULT_BACKGROUND,
            work_surface_padding: DEFAULT_WORK_SURFACE_PADDING,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EditorState {
    Closed,
    Loading,
    Ready,
    Saving,
}

impl EditorState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Closed => "closed",
            Self::Loading => "loading",
            Self::Ready => "ready",
            Self::Saving => "saving",
        }
    }
}

impl fmt::Display for EditorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Everything about a session that is fixed at Open.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SessionSpec {
    pub key: SessionKey,
    pub frame: CropFrameSpec,
    pub viewport: Viewport,
    pub output: OutputPolicy,
}

impl SessionSpec {
    /// Frame centered in a viewport of exactly its size.
    pub fn new(key: SessionKey, frame: CropFrameSpec, output: OutputPolicy) -> Self {
        Self {
            key,
            frame,
            viewport: Viewport::fitting(&frame),
            output,
        }
    }

    pub fn from_preset(key: SessionKey, preset: &SlotPreset) -> Self {
        Self::new(key, preset.frame, preset.output)
    }

    pub fn with_viewport(mut self, viewport: Viewport) -> Self {
        self.viewport = viewport;
        self
    }

    fn validate(&self) -> EngineResult<()> {
        if !self.frame.is_valid() {
            return Err(CropEngineError::invalid_argument(
                "frame",
                format!("{}x{}", self.frame.display_width, self.frame.display_height),
                "crop frame size must be positive and finite",
            ));
        }
        if !(self.viewport.width.is_finite() && self.viewport.height.is_finite()) {
            return Err(CropEngineError::invalid_argument(
                "viewport",
                format!("{}x{}", self.viewport.width, self.viewport.height),
                "viewport size must be finite",
            ));
        }
        self.output.validate()
    }
}

struct Session {
    spec: SessionSpec,
    identity: ImageIdentity,
    source: Option<SourceImage>,
    transform: TransformState,
    gestures: GestureController,
}

/// Result of running a [`LoadTask`], to be handed back to [`TransformEditor::finish_load`].
#[derive(Debug)]
pub struct LoadOutcome {
    generation: u64,
    result: EngineResult<SourceImage>,
}

/// Fetch + decode for one Open. Runs without access to the editor.
pub struct LoadTask {
    generation: u64,
    source: ImageSource,
    fetcher: Option<Arc<dyn ImageFetcher>>,
    limits: EditorLimits,
    padding: u32,
}

impl LoadTask {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn compute(&self) -> LoadOutcome {
        let result = run_with_panic_policy("load", || self.load());
        LoadOutcome {
            generation: self.generation,
            result,
        }
    }

    fn load(&self) -> EngineResult<SourceImage> {
        let started_at = Instant::now();
        let bytes = self.source.load(self.fetcher.as_deref())?;
        self.limits.enforce_source_len(bytes.len())?;
        self.limits.enforce_timeout(started_at, "fetch")?;

        let image = decode_source(&bytes)?;
        self.limits.enforce_pixels(image.width(), image.height())?;
        self.limits
            .enforce_surface_side(image.width(), image.height(), self.padding)?;
        self.limits.enforce_timeout(started_at, "decode")?;
        Ok(image)
    }
}

/// Result of running an [`ApplyTask`], to be handed back to [`TransformEditor::finish_apply`].
#[derive(Debug)]
pub struct ApplyOutcome {
    generation: u64,
    result: EngineResult<OutputImage>,
}

/// Composite + encode for one Apply, on a snapshot of the session.
pub struct ApplyTask {
    generation: u64,
    source: SourceImage,
    transform: TransformState,
    crop: SourceCropRect,
    output: OutputPolicy,
    provider: Arc<dyn SurfaceProvider>,
    background: [u8; 4],
    padding: u32,
}

impl ApplyTask {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn crop_rect(&self) -> SourceCropRect {
        self.crop
    }

    pub fn compute(&self) -> ApplyOutcome {
        let result = run_with_panic_policy("apply", || {
            CanvasCompositor::new(self.provider.as_ref(), self.background, self.padding).compose(
                &self.source,
                &self.transform,
                &self.crop,
                &self.output,
            )
        });
        ApplyOutcome {
            generation: self.generation,
            result,
        }
    }
}

/// One editor per form. Owns the form's edit history and at most one open session.
pub struct TransformEditor {
    config: EditorConfig,
    provider: Arc<dyn SurfaceProvider>,
    fetcher: Option<Arc<dyn ImageFetcher>>,
    history: EditHistoryStore,
    state: EditorState,
    session: Option<Session>,
    generation: u64,
    last_error: Option<CropEngineError>,
}

impl Default for TransformEditor {
    fn default() -> Self {
        Self::new(EditorConfig::default())
    }
}

impl TransformEditor {
    pub fn new(config: EditorConfig) -> Self {
        let provider: Arc<dyn SurfaceProvider> =
            Arc::new(RasterSurfaceProvider::new(config.limits.surface_side_cap()));
        #[cfg(feature = "http")]
        let fetcher: Option<Arc<dyn ImageFetcher>> =
            match super::io::HttpFetcher::from_limits(&config.limits) {
                Ok(fetcher) => Some(Arc::new(fetcher)),
                Err(err) => {
                    tracing::warn!(error = %err, "http fetcher unavailable");
                    None
                }
            };
        #[cfg(not(feature = "http"))]
        let fetcher: Option<Arc<dyn ImageFetcher>> = None;

        Self {
            config,
            provider,
            fetcher,
            history: EditHistoryStore::new(),
            state: EditorState::Closed,
            session: None,
            generation: 0,
            last_error: None,
        }
    }

    pub fn with_surface_provider(mut self, provider: Arc<dyn SurfaceProvider>) -> Self {
        self.provider = provider;
        self
    }

    pub fn with_fetcher(mut self, fetcher: Arc<dyn ImageFetcher>) -> Self {
        self.fetcher = Some(fetcher);
        self
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn state(&self) -> EditorState {
        self.state
    }

    pub fn history(&self) -> &EditHistoryStore {
        &self.history
    }

    pub fn session_key(&self) -> Option<SessionKey> {
        self.session.as_ref().map(|s| s.spec.key)
    }

    /// Live transform while a session is Ready or Saving.
    pub fn transform(&self) -> Option<TransformState> {
        match self.state {
            EditorState::Ready | EditorState::Saving => self.session.as_ref().map(|s| s.transform),
            EditorState::Closed | EditorState::Loading => None,
        }
    }

    /// Natural size of the loaded source image.
    pub fn source_size(&self) -> Option<(u32, u32)> {
        self.session
            .as_ref()
            .and_then(|s| s.source.as_ref())
            .map(|src| (src.width(), src.height()))
    }

    /// How the host should draw the live preview.
    pub fn preview(&self) -> Option<PreviewTransform> {
        let session = self.session.as_ref()?;
        let source = session.source.as_ref()?;
        Some(PreviewTransform::from_state(
            &session.transform,
            source.width(),
            source.height(),
        ))
    }

    /// Source-pixel rectangle that Apply would crop right now.
    pub fn crop_rect(&self) -> Option<SourceCropRect> {
        let session = self.session.as_ref()?;
        let source = session.source.as_ref()?;
        Some(resolve_crop_rect(
            &session.transform,
            source.width(),
            source.height(),
            &session.spec.frame,
            &session.spec.viewport,
        ))
    }

    /// User-facing message for the most recent failure, if it has not been
    /// cleared by a later gesture or Apply.
    pub fn last_error(&self) -> Option<&'static str> {
        self.last_error.as_ref().map(|e| e.user_message())
    }

    pub fn last_error_detail(&self) -> Option<&CropEngineError> {
        self.last_error.as_ref()
    }

    // =========================================================================
    // Loading
    // =========================================================================

    /// Start a session. The returned task must be computed and passed to
    /// [`finish_load`](Self::finish_load).
    pub fn open(&mut self, source: ImageSource, spec: SessionSpec) -> EngineResult<LoadTask> {
        if self.state != EditorState::Closed {
            return Err(self.reject(CropEngineError::invalid_state("open", self.state.as_str())));
        }
        spec.validate().map_err(|e| self.reject(e))?;

        self.generation += 1;
        self.last_error = None;
        self.session = Some(Session {
            spec,
            identity: source.identity(),
            source: None,
            transform: TransformState::default(),
            gestures: GestureController::new(),
        });
        self.transition_to(EditorState::Loading);

        Ok(LoadTask {
            generation: self.generation,
            source,
            fetcher: self.fetcher.clone(),
            limits: self.config.limits.clone(),
            padding: self.config.work_surface_padding,
        })
    }

    /// Complete a load. Outcomes from a cancelled or superseded session are
    /// dropped with `StaleSession` and leave the editor untouched.
    pub fn finish_load(&mut self, outcome: LoadOutcome) -> EngineResult<()> {
        if outcome.generation != self.generation || self.state != EditorState::Loading {
            tracing::debug!(
                generation = outcome.generation,
                current = self.generation,
                "discarding stale load"
            );
            return Err(CropEngineError::stale_session());
        }

        match outcome.result {
            Ok(image) => {
                let Some(session) = self.session.as_mut() else {
                    return Err(CropEngineError::invalid_state("finish_load", "closed"));
                };
                session.transform = self.history.seed_for(session.spec.key, &session.identity);
                session.source = Some(image);
                self.transition_to(EditorState::Ready);
                Ok(())
            }
            Err(err) => {
                let err = self.reject(err);
                self.transition_to(EditorState::Closed);
                self.session = None;
                Err(err)
            }
        }
    }

    /// `open` + `compute` + `finish_load` on the calling thread.
    pub fn open_blocking(&mut self, source: ImageSource, spec: SessionSpec) -> EngineResult<()> {
        let task = self.open(source, spec)?;
        let outcome = task.compute();
        self.finish_load(outcome)
    }

    // =========================================================================
    // Ready: gestures and controls
    // =========================================================================

    /// Apply one input event immediately.
    pub fn handle(&mut self, event: &GestureEvent) -> EngineResult<()> {
        let session = self.ready_session("handle")?;
        session.gestures.handle(event, &mut session.transform);
        self.last_error = None;
        Ok(())
    }

    /// Queue an input event; moves are coalesced until [`flush_frame`](Self::flush_frame).
    pub fn queue(&mut self, event: GestureEvent) -> EngineResult<()> {
        let session = self.ready_session("queue")?;
        session.gestures.queue(event, &mut session.transform);
        self.last_error = None;
        Ok(())
    }

    /// Apply the latest queued move, once per display frame.
    pub fn flush_frame(&mut self) -> EngineResult<bool> {
        let session = self.ready_session("flush_frame")?;
        Ok(session.gestures.flush_frame(&mut session.transform))
    }

    fn ready_session(&mut self, operation: &'static str) -> EngineResult<&mut Session> {
        let state = self.state;
        match (state, self.session.as_mut()) {
            (EditorState::Ready, Some(session)) => Ok(session),
            _ => Err(CropEngineError::invalid_state(operation, state.as_str())),
        }
    }

    // =========================================================================
    // Saving
    // =========================================================================

    /// Snapshot the session and enter Saving. The returned task must be
    /// computed and passed to [`finish_apply`](Self::finish_apply).
    pub fn begin_apply(&mut self) -> EngineResult<ApplyTask> {
        let generation = self.generation;
        let provider = Arc::clone(&self.provider);
        let background = self.config.background;
        let padding = self.config.work_surface_padding;

        let session = match self.ready_session("apply") {
            Ok(session) => session,
            Err(err) => return Err(self.reject(err)),
        };
        session.gestures.flush_frame(&mut session.transform);
        let Some(source) = session.source.clone() else {
            let err = CropEngineError::invalid_state("apply", "ready without image");
            return Err(self.reject(err));
        };
        let crop = resolve_crop_rect(
            &session.transform,
            source.width(),
            source.height(),
            &session.spec.frame,
            &session.spec.viewport,
        );
        let task = ApplyTask {
            generation,
            source,
            transform: session.transform,
            crop,
            output: session.spec.output,
            provider,
            background,
            padding,
        };

        self.last_error = None;
        self.transition_to(EditorState::Saving);
        Ok(task)
    }

    /// Complete an Apply. On success the transform is committed to the edit
    /// history and the session closes; on failure the session returns to Ready
    /// with the error available from [`last_error`](Self::last_error).
    pub fn finish_apply(&mut self, outcome: ApplyOutcome) -> EngineResult<OutputImage> {
        if outcome.generation != self.generation || self.state != EditorState::Saving {
            tracing::debug!(
                generation = outcome.generation,
                current = self.generation,
                "discarding stale apply"
            );
            return Err(CropEngineError::stale_session());
        }

        match outcome.result {
            Ok(output) => {
                if let Some(session) = self.session.as_ref() {
                    let key = session.spec.key;
                    self.history.put(
                        key,
                        EditHistoryEntry::new(key, session.identity.clone(), &session.transform),
                    );
                    tracing::info!(
                        session = %key,
                        width = output.width,
                        height = output.height,
                        format = output.format.as_str(),
                        bytes = output.data.len(),
                        total_ms = output.metrics.total_ms,
                        rotate_ms = output.metrics.rotate_ms,
                        crop_ms = output.metrics.crop_ms,
                        encode_ms = output.metrics.encode_ms,
                        "apply succeeded"
                    );
                }
                self.transition_to(EditorState::Closed);
                self.session = None;
                Ok(output)
            }
            Err(err) => {
                let err = self.reject(err);
                self.transition_to(EditorState::Ready);
                Err(err)
            }
        }
    }

    /// `begin_apply` + `compute` + `finish_apply` on the calling thread.
    pub fn apply(&mut self) -> EngineResult<OutputImage> {
        let task = self.begin_apply()?;
        let outcome = task.compute();
        self.finish_apply(outcome)
    }

    // =========================================================================
    // Closing
    // =========================================================================

    /// Discard the session. Any in-flight load or apply becomes stale, so the
    /// edit history is never written for a cancelled session.
    pub fn cancel(&mut self) {
        if self.state == EditorState::Closed {
            return;
        }
        self.generation += 1;
        self.transition_to(EditorState::Closed);
        self.session = None;
        self.last_error = None;
    }

    /// Form unmount: close any session and forget all edit history.
    pub fn teardown(&mut self) {
        self.cancel();
        self.history.clear();
        tracing::debug!("editor torn down");
    }

    fn transition_to(&mut self, to: EditorState) {
        let from = self.state;
        self.state = to;
        match self.session.as_ref() {
            Some(session) => tracing::debug!(
                session = %session.spec.key,
                from = from.as_str(),
                to = to.as_str(),
                "editor state transition"
            ),
            None => tracing::debug!(from = from.as_str(), to = to.as_str(), "editor state transition"),
        }
    }

    /// Boundary for errors leaving the editor: log once, remember for the banner.
    fn reject(&mut self, err: CropEngineError) -> CropEngineError {
        tracing::warn!(
            category = err.category().as_str(),
            error = %err,
            state = self.state.as_str(),
            "editor operation failed"
        );
        self.last_error = Some(err.clone());
        err
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::surface::RenderSurface;
    use crate::engine::transform::Point;
    use crate::error::ErrorCategory;
    use image::{ImageFormat, Rgba, RgbaImage};
    use std::io::Cursor;
    use std::sync::atomic::{AtomicBool, Ordering};

    fn png_source(width: u32, height: u32) -> ImageSource {
        let img = RgbaImage::from_fn(width, height, |x, y| {
            Rgba([(x * 7 % 256) as u8, (y * 13 % 256) as u8, 90, 255])
        });
        let mut buf = Vec::new();
        img.write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
            .unwrap();
        ImageSource::from_bytes(buf)
    }

    fn small_spec(key: SessionKey) -> SessionSpec {
        SessionSpec::new(key, CropFrameSpec::new(40.0, 20.0), OutputPolicy::png(60, 30))
    }

    /// Provider that can be switched to fail acquisition.
    struct FlakyProvider {
        fail: AtomicBool,
        inner: RasterSurfaceProvider,
    }

    impl SurfaceProvider for FlakyProvider {
        fn acquire(&self, width: u32, height: u32) -> EngineResult<Box<dyn RenderSurface>> {
            if self.fail.load(Ordering::SeqCst) {
                return Err(CropEngineError::surface_acquisition_failed(
                    width,
                    height,
                    "no 2d context",
                ));
            }
            self.inner.acquire(width, height)
        }
    }

    #[test]
    fn full_lifecycle() {
        let mut editor = TransformEditor::default();
        assert_eq!(editor.state(), EditorState::Closed);

        let task = editor
            .open(png_source(80, 40), small_spec(SessionKey::Question))
            .unwrap();
        assert_eq!(editor.state(), EditorState::Loading);
        assert!(editor.transform().is_none());

        editor.finish_load(task.compute()).unwrap();
        assert_eq!(editor.state(), EditorState::Ready);
        assert_eq!(editor.source_size(), Some((80, 40)));
        assert_eq!(editor.transform(), Some(TransformState::default()));

        editor.handle(&GestureEvent::RotateRight).unwrap();
        let task = editor.begin_apply().unwrap();
        assert_eq!(editor.state(), EditorState::Saving);
        assert!(editor.handle(&GestureEvent::ZoomIn).is_err());

        let out = editor.finish_apply(task.compute()).unwrap();
        assert_eq!((out.width, out.height), (60, 30));
        assert_eq!(editor.state(), EditorState::Closed);
        assert_eq!(
            editor
                .history()
                .get(SessionKey::Question)
                .unwrap()
                .rotation_degrees,
            90
        );
    }

    #[test]
    fn apply_without_decoded_image_sets_banner() {
        let mut editor = TransformEditor::default();
        editor
            .open_blocking(png_source(10, 10), small_spec(SessionKey::Avatar))
            .unwrap();
        if let Some(session) = editor.session.as_mut() {
            session.source = None;
        }

        let err = editor.begin_apply().err().unwrap();
        assert!(matches!(err, CropEngineError::InvalidState { .. }));
        assert_eq!(editor.last_error(), Some(err.user_message()));
        assert!(matches!(
            editor.last_error_detail(),
            Some(CropEngineError::InvalidState { .. })
        ));
        assert_eq!(editor.state(), EditorState::Ready);
    }

    #[test]
    fn open_while_open_is_rejected() {
        let mut editor = TransformEditor::default();
        editor
            .open_blocking(png_source(10, 10), small_spec(SessionKey::Avatar))
            .unwrap();
        let err = editor
            .open(png_source(10, 10), small_spec(SessionKey::Question))
            .err()
            .unwrap();
        assert!(matches!(err, CropEngineError::InvalidState { .. }));
        assert_eq!(editor.state(), EditorState::Ready);
        assert_eq!(editor.session_key(), Some(SessionKey::Avatar));
    }

    #[test]
    fn decode_failure_closes_session() {
        let mut editor = TransformEditor::default();
        let err = editor
            .open_blocking(
                ImageSource::from_bytes(b"not an image".to_vec()),
                small_spec(SessionKey::Question),
            )
            .unwrap_err();
        assert_eq!(err.category(), ErrorCategory::Decode);
        assert_eq!(editor.state(), EditorState::Closed);
        assert_eq!(editor.last_error(), Some("The image could not be loaded."));
    }

    #[test]
    fn cancel_during_loading_discards_completion() {
        let mut editor = TransformEditor::default();
        let task = editor
            .open(png_source(10, 10), small_spec(SessionKey::Question))
            .unwrap();
        editor.cancel();
        let err = editor.finish_load(task.compute()).unwrap_err();
        assert!(matches!(err, CropEngineError::StaleSession));
        assert_eq!(editor.state(), EditorState::Closed);
    }

    #[test]
    fn cancel_during_saving_leaves_history_untouched() {
        let mut editor = TransformEditor::default();
        editor
            .open_blocking(png_source(20, 20), small_spec(SessionKey::Option(2)))
            .unwrap();
        editor.handle(&GestureEvent::ZoomTo(2.0)).unwrap();
        let task = editor.begin_apply().unwrap();
        editor.cancel();
        assert!(editor.finish_apply(task.compute()).is_err());
        assert!(editor.history().is_empty());
    }

    #[test]
    fn failed_save_returns_to_ready_with_banner() {
        let provider = Arc::new(FlakyProvider {
            fail: AtomicBool::new(true),
            inner: RasterSurfaceProvider::default(),
        });
        let mut editor = TransformEditor::default().with_surface_provider(provider.clone());
        editor
            .open_blocking(png_source(20, 20), small_spec(SessionKey::Question))
            .unwrap();
        editor.handle(&GestureEvent::ZoomIn).unwrap();
        let before = editor.transform();

        let err = editor.apply().unwrap_err();
        assert_eq!(err.category(), ErrorCategory::Surface);
        assert_eq!(editor.state(), EditorState::Ready);
        assert_eq!(editor.transform(), before);
        assert_eq!(
            editor.last_error(),
            Some("The image could not be saved. Please try again.")
        );
        assert!(editor.history().is_empty());

        // Any gesture clears the banner.
        editor.handle(&GestureEvent::ZoomOut).unwrap();
        assert!(editor.last_error().is_none());

        provider.fail.store(false, Ordering::SeqCst);
        editor.apply().unwrap();
        assert_eq!(editor.history().len(), 1);
    }

    #[test]
    fn oversized_source_rejected_at_loading() {
        let config = EditorConfig {
            limits: EditorLimits {
                max_surface_side: Some(64),
                ..EditorLimits::custom()
            },
            ..EditorConfig::default()
        };
        let mut editor = TransformEditor::new(config);
        let err = editor
            .open_blocking(png_source(60, 60), small_spec(SessionKey::Question))
            .unwrap_err();
        assert!(matches!(err, CropEngineError::DimensionExceedsLimit { .. }));
        assert_eq!(editor.state(), EditorState::Closed);
    }

    #[test]
    fn queued_moves_are_flushed_before_apply() {
        let mut editor = TransformEditor::default();
        editor
            .open_blocking(png_source(20, 20), small_spec(SessionKey::Question))
            .unwrap();
        editor
            .queue(GestureEvent::PointerDown(Point::new(0.0, 0.0)))
            .unwrap();
        editor
            .queue(GestureEvent::PointerMove(Point::new(5.0, 5.0)))
            .unwrap();
        editor
            .queue(GestureEvent::PointerMove(Point::new(8.0, -3.0)))
            .unwrap();
        editor.apply().unwrap();
        let entry = editor.history().get(SessionKey::Question).unwrap();
        assert_eq!(entry.pan, Point::new(8.0, -3.0));
    }

    #[test]
    fn invalid_spec_is_rejected_before_loading() {
        let mut editor = TransformEditor::default();
        let spec = SessionSpec::new(
            SessionKey::Question,
            CropFrameSpec::new(0.0, 10.0),
            OutputPolicy::png(10, 10),
        );
        assert!(editor.open(png_source(4, 4), spec).is_err());
        assert_eq!(editor.state(), EditorState::Closed);

        let spec = SessionSpec::new(
            SessionKey::Question,
            CropFrameSpec::new(10.0, 10.0),
            OutputPolicy::png(0, 10),
        );
        assert!(editor.open(png_source(4, 4), spec).is_err());
    }

    #[test]
    fn teardown_clears_history() {
        let mut editor = TransformEditor::default();
        editor
            .open_blocking(png_source(20, 20), small_spec(SessionKey::Avatar))
            .unwrap();
        editor.apply().unwrap();
        editor
            .open_blocking(png_source(20, 20), small_spec(SessionKey::Question))
            .unwrap();
        editor.teardown();
        assert_eq!(editor.state(), EditorState::Closed);
        assert!(editor.history().is_empty());
    }
}
