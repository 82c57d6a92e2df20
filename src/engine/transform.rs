// src/engine/transform.rs
//
// The geometric state of one editing session.

/// Smallest zoom factor the editor will store.
pub const MIN_SCALE: f64 = 0.1;
/// Largest zoom factor the editor will store.
pub const MAX_SCALE: f64 = 5.0;
/// Rotation granularity of the rotate controls.
pub const ROTATION_STEP: i32 = 90;

/// A point or offset in on-screen display pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const ZERO: Point = Point { x: 0.0, y: 0.0 };

    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance_to(&self, other: Point) -> f64 {
        ((other.x - self.x).powi(2) + (other.y - self.y).powi(2)).sqrt()
    }
}

impl std::ops::Sub for Point {
    type Output = Point;

    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl std::ops::Add for Point {
    type Output = Point;

    fn add(self, rhs: Point) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl std::ops::Mul<f64> for Point {
    type Output = Point;

    fn mul(self, rhs: f64) -> Point {
        Point::new(self.x * rhs, self.y * rhs)
    }
}

/// Scale, rotation and pan of the image under the crop frame.
///
/// `pan` is relative to the viewport center and is never clamped: the image may
/// be dragged fully outside the frame. `rotation_degrees` accumulates in steps
/// of 90 and is never normalized, so five right turns read back as 450.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TransformState {
    pub scale: f64,
    pub rotation_degrees: i32,
    pub pan: Point,
}

impl Default for TransformState {
    fn default() -> Self {
        Self {
            scale: 1.0,
            rotation_degrees: 0,
            pan: Point::ZERO,
        }
    }
}

impl TransformState {
    pub fn new(scale: f64, rotation_degrees: i32, pan: Point) -> Self {
        Self {
            scale: clamp_scale(scale),
            rotation_degrees,
            pan,
        }
    }

    pub fn set_scale(&mut self, scale: f64) {
        self.scale = clamp_scale(scale);
    }

    pub fn rotate_by(&mut self, degrees: i32) {
        self.rotation_degrees += degrees;
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Rotation reduced to `[0, 360)` for rendering. The stored value is untouched.
    pub fn normalized_rotation(&self) -> i32 {
        self.rotation_degrees.rem_euclid(360)
    }

    /// True when the image is turned on its side (90 or 270 degrees).
    pub fn is_quarter_turned(&self) -> bool {
        self.normalized_rotation() % 180 == 90
    }
}

/// Clamp a requested zoom into `[MIN_SCALE, MAX_SCALE]`. NaN falls back to 1.
pub fn clamp_scale(scale: f64) -> f64 {
    if scale.is_nan() {
        return 1.0;
    }
    scale.clamp(MIN_SCALE, MAX_SCALE)
}

/// How the host should draw the live preview while the session is Ready.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PreviewTransform {
    pub displayed_width: f64,
    pub displayed_height: f64,
    pub translate: Point,
    pub rotation_degrees: i32,
}

impl PreviewTransform {
    pub fn from_state(state: &TransformState, natural_width: u32, natural_height: u32) -> Self {
        Self {
            displayed_width: natural_width as f64 * state.scale,
            displayed_height: natural_height as f64 * state.scale,
            translate: state.pan,
            rotation_degrees: state.rotation_degrees,
        }
    }

    /// CSS transform for an image element centered in the viewport and sized
    /// to `displayed_width x displayed_height`.
    pub fn to_css(&self) -> String {
        format!(
            "translate(-50%, -50%) translate({}px, {}px) rotate({}deg)",
            self.translate.x, self.translate.y, self.rotation_degrees
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_identity() {
        let state = TransformState::default();
        assert_eq!(state.scale, 1.0);
        assert_eq!(state.rotation_degrees, 0);
        assert_eq!(state.pan, Point::ZERO);
    }

    #[test]
    fn scale_is_clamped_on_write() {
        let mut state = TransformState::default();
        state.set_scale(12.0);
        assert_eq!(state.scale, MAX_SCALE);
        state.set_scale(0.0);
        assert_eq!(state.scale, MIN_SCALE);
        state.set_scale(f64::NAN);
        assert_eq!(state.scale, 1.0);
        assert_eq!(TransformState::new(-3.0, 0, Point::ZERO).scale, MIN_SCALE);
    }

    #[test]
    fn rotation_is_not_normalized() {
        let mut state = TransformState::default();
        for _ in 0..5 {
            state.rotate_by(ROTATION_STEP);
        }
        assert_eq!(state.rotation_degrees, 450);
        assert_eq!(state.normalized_rotation(), 90);
        assert!(state.is_quarter_turned());

        state.rotation_degrees = -90;
        assert_eq!(state.normalized_rotation(), 270);
    }

    #[test]
    fn preview_uses_scaled_size() {
        let state = TransformState::new(0.5, 90, Point::new(10.0, -4.0));
        let preview = PreviewTransform::from_state(&state, 1200, 800);
        assert_eq!(preview.displayed_width, 600.0);
        assert_eq!(preview.displayed_height, 400.0);
        assert_eq!(
            preview.to_css(),
            "translate(-50%, -50%) translate(10px, -4px) rotate(90deg)"
        );
    }

    #[test]
    fn point_arithmetic() {
        let a = Point::new(3.0, 4.0);
        assert_eq!(Point::ZERO.distance_to(a), 5.0);
        assert_eq!(a - Point::new(1.0, 1.0), Point::new(2.0, 3.0));
        assert_eq!(a * 2.0, Point::new(6.0, 8.0));
    }
}
