/// Viewport transform: pan/zoom state and screen <-> canvas mapping
///
/// Screen points handed to this module are already relative to the canvas
/// element's top-left corner. Canvas points are what node positions use.

use crate::workflow::types::Point;
use serde::{Deserialize, Serialize};

pub const MIN_SCALE: f64 = 0.1;
pub const MAX_SCALE: f64 = 3.0;

/// Increment used by zoom buttons and keyboard shortcuts
pub const ZOOM_STEP: f64 = 0.1;

/// Translation of the canvas origin (screen pixels) plus a uniform zoom factor
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub x: f64,
    pub y: f64,
    pub scale: f64,
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Direction of a discrete zoom step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZoomStep {
    In,
    Out,
}

pub fn clamp_scale(scale: f64) -> f64 {
    scale.clamp(MIN_SCALE, MAX_SCALE)
}

impl Transform {
    pub const IDENTITY: Transform = Transform { x: 0.0, y: 0.0, scale: 1.0 };

    pub fn translation(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// `(screen - translation) / scale`
    pub fn screen_to_canvas(&self, screen: Point) -> Point {
        Point::new((screen.x - self.x) / self.scale, (screen.y - self.y) / self.scale)
    }

    pub fn canvas_to_screen(&self, canvas: Point) -> Point {
        Point::new(canvas.x * self.scale + self.x, canvas.y * self.scale + self.y)
    }

    /// Zoom about `cursor`, keeping the canvas point under it stationary
    ///
    /// When clamping leaves the scale unchanged the transform is returned as-is,
    /// so a zero delta (or a delta pushing past a bound) never shifts the view.
    pub fn zoom(&self, delta: f64, cursor: Point) -> Transform {
        let new_scale = clamp_scale(self.scale + delta);
        if new_scale == self.scale {
            return *self;
        }

        let ratio = new_scale / self.scale;
        Transform {
            x: cursor.x - (cursor.x - self.x) * ratio,
            y: cursor.y - (cursor.y - self.y) * ratio,
            scale: new_scale,
        }
    }

    pub fn pan(&self, delta: Point) -> Transform {
        Transform {
            x: self.x + delta.x,
            y: self.y + delta.y,
            scale: self.scale,
        }
    }

    /// Button/shortcut zoom: fixed step about the origin, no pivot correction
    pub fn step(&self, step: ZoomStep) -> Transform {
        let scale = match step {
            ZoomStep::In => self.scale + ZOOM_STEP,
            ZoomStep::Out => self.scale - ZOOM_STEP,
        };
        Transform {
            scale: clamp_scale(scale),
            ..*self
        }
    }

    pub fn reset(&mut self) {
        *self = Transform::IDENTITY;
    }

    /// Zoom percentage shown in the toolbar
    pub fn zoom_percent(&self) -> u32 {
        (self.scale * 100.0).round() as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(a: Point, b: Point) {
        assert!((a.x - b.x).abs() < 1e-9 && (a.y - b.y).abs() < 1e-9, "{a:?} != {b:?}");
    }

    #[test]
    fn test_screen_to_canvas() {
        let t = Transform { x: 50.0, y: -20.0, scale: 2.0 };
        assert_close(t.screen_to_canvas(Point::new(150.0, 80.0)), Point::new(50.0, 50.0));
        assert_close(t.canvas_to_screen(Point::new(50.0, 50.0)), Point::new(150.0, 80.0));
    }

    #[test]
    fn test_zoom_zero_delta_is_identity() {
        let t = Transform { x: 12.5, y: -7.25, scale: 1.3 };
        assert_eq!(t.zoom(0.0, Point::new(333.3, 17.1)), t);
    }

    #[test]
    fn test_zoom_keeps_cursor_point_fixed() {
        let before = Transform::IDENTITY;
        let cursor = Point::new(100.0, 100.0);
        let after = before.zoom(0.2, cursor);

        assert!((after.scale - 1.2).abs() < 1e-12);
        assert_close(after.screen_to_canvas(cursor), before.screen_to_canvas(cursor));
    }

    #[test]
    fn test_zoom_pivot_holds_for_arbitrary_transforms() {
        let cases = [
            (Transform { x: 40.0, y: 90.0, scale: 0.7 }, -0.35, Point::new(10.0, 640.0)),
            (Transform { x: -300.0, y: 12.0, scale: 2.5 }, 0.4, Point::new(800.0, 3.0)),
            (Transform { x: 0.5, y: 0.5, scale: 0.2 }, 0.05, Point::new(0.0, 0.0)),
        ];
        for (t, delta, cursor) in cases {
            let zoomed = t.zoom(delta, cursor);
            assert_close(zoomed.screen_to_canvas(cursor), t.screen_to_canvas(cursor));
        }
    }

    #[test]
    fn test_zoom_is_clamped() {
        let mut t = Transform::IDENTITY;
        for _ in 0..50 {
            t = t.zoom(0.37, Point::new(10.0, 10.0));
            assert!(t.scale <= MAX_SCALE);
        }
        assert_eq!(t.scale, MAX_SCALE);
        for _ in 0..50 {
            t = t.zoom(-0.91, Point::new(10.0, 10.0));
            assert!(t.scale >= MIN_SCALE);
        }
        assert_eq!(t.scale, MIN_SCALE);
    }

    #[test]
    fn test_step_zoom_clamps_without_moving() {
        let t = Transform { x: 5.0, y: 6.0, scale: 2.95 };
        let zoomed = t.step(ZoomStep::In);
        assert_eq!(zoomed.scale, MAX_SCALE);
        assert_eq!((zoomed.x, zoomed.y), (5.0, 6.0));

        let low = Transform { x: 0.0, y: 0.0, scale: 0.15 }.step(ZoomStep::Out);
        assert_eq!(low.scale, MIN_SCALE);
    }

    #[test]
    fn test_pan_and_reset() {
        let mut t = Transform::IDENTITY.pan(Point::new(30.0, -10.0));
        assert_eq!(t, Transform { x: 30.0, y: -10.0, scale: 1.0 });
        t.reset();
        assert_eq!(t, Transform::IDENTITY);
    }
}
