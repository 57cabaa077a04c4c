//! Viewport math: screen ↔ world conversion, clamping, zoom toward cursor.
//!
//! The viewport maps world to screen as `screen = (world - pan) * zoom`.
//! Screen coordinates are CSS pixels relative to the render target's
//! top-left corner.

use serde::{Deserialize, Serialize};

/// A point in either screen or world space.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Pan/zoom transform between screen pixels and document-world units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Viewport {
    pub pan_x: f32,
    pub pan_y: f32,
    pub zoom: f32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Viewport {
    pub const IDENTITY: Viewport = Viewport {
        pan_x: 0.0,
        pan_y: 0.0,
        zoom: 1.0,
    };

    pub const fn new(pan_x: f32, pan_y: f32, zoom: f32) -> Self {
        Self { pan_x, pan_y, zoom }
    }

    pub fn screen_to_world(&self, screen: Point) -> Point {
        screen_to_world(screen.x, screen.y, self)
    }

    pub fn world_to_screen(&self, world: Point) -> Point {
        world_to_screen(world.x, world.y, self)
    }

    /// Multiply the zoom by `factor` (clamped to `[min, max]`) while keeping
    /// the world point under `screen` fixed on screen.
    #[must_use]
    pub fn zoomed_at(&self, screen: Point, factor: f32, min: f32, max: f32) -> Viewport {
        let before = self.screen_to_world(screen);
        let mut next = Viewport {
            zoom: clamp(self.zoom * factor, min, max),
            ..*self
        };
        let after = next.screen_to_world(screen);
        next.pan_x += before.x - after.x;
        next.pan_y += before.y - after.y;
        next
    }
}

pub fn screen_to_world(x: f32, y: f32, vp: &Viewport) -> Point {
    Point {
        x: x / vp.zoom + vp.pan_x,
        y: y / vp.zoom + vp.pan_y,
    }
}

pub fn world_to_screen(x: f32, y: f32, vp: &Viewport) -> Point {
    Point {
        x: (x - vp.pan_x) * vp.zoom,
        y: (y - vp.pan_y) * vp.zoom,
    }
}

/// Clamp `v` to `[min, max]`. Unlike `f32::clamp` this never panics when
/// `min > max`; `min` wins, as `max(min, min(max, v))` does.
pub fn clamp(v: f32, min: f32, max: f32) -> f32 {
    v.min(max).max(min)
}

/// Smooth multiplicative zoom factor for a wheel delta.
/// Positive `delta_y` (scrolling down) zooms out.
pub fn wheel_zoom_factor(delta_y: f32, speed: f32) -> f32 {
    (-delta_y * speed).exp()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f32, b: f32, eps: f32) -> bool {
        (a - b).abs() <= eps * (1.0 + a.abs().max(b.abs()))
    }

    #[test]
    fn screen_world_roundtrip() {
        let viewports = [
            Viewport::new(10.0, 20.0, 2.0),
            Viewport::new(-350.5, 12.25, 0.1),
            Viewport::new(0.0, 0.0, 8.0),
            Viewport::new(250.0, -125.0, 0.37),
        ];
        let points = [(15.0, 25.0), (0.0, 0.0), (-123.4, 987.6), (1e5, 3.0)];
        for vp in &viewports {
            for &(x, y) in &points {
                let s = world_to_screen(x, y, vp);
                let back = screen_to_world(s.x, s.y, vp);
                assert!(close(back.x, x, 1e-4), "{vp:?} x {x} -> {}", back.x);
                assert!(close(back.y, y, 1e-4), "{vp:?} y {y} -> {}", back.y);
            }
        }
    }

    #[test]
    fn clamp_values() {
        assert_eq!(clamp(5.0, 0.0, 10.0), 5.0);
        assert_eq!(clamp(-1.0, 0.0, 10.0), 0.0);
        assert_eq!(clamp(11.0, 0.0, 10.0), 10.0);
        assert_eq!(clamp(3.0, 4.0, 2.0), 4.0);
    }

    #[test]
    fn zoom_keeps_cursor_point_fixed() {
        let starts = [
            Viewport::IDENTITY,
            Viewport::new(40.0, -12.0, 0.5),
            Viewport::new(-800.0, 300.0, 3.0),
        ];
        let cursors = [Point::new(0.0, 0.0), Point::new(400.0, 300.0), Point::new(17.5, 911.0)];
        let factors = [0.5, 0.9, 1.0, 1.25, 4.0];
        for vp in starts {
            for cursor in cursors {
                for factor in factors {
                    let before = vp.screen_to_world(cursor);
                    let next = vp.zoomed_at(cursor, factor, 0.1, 8.0);
                    let after = next.screen_to_world(cursor);
                    assert!(close(before.x, after.x, 1e-4), "{vp:?} {cursor:?} {factor}");
                    assert!(close(before.y, after.y, 1e-4), "{vp:?} {cursor:?} {factor}");
                }
            }
        }
    }

    #[test]
    fn zoom_is_clamped() {
        let vp = Viewport::new(0.0, 0.0, 7.0);
        assert_eq!(vp.zoomed_at(Point::new(10.0, 10.0), 10.0, 0.1, 8.0).zoom, 8.0);
        let vp = Viewport::new(0.0, 0.0, 0.2);
        assert_eq!(vp.zoomed_at(Point::new(10.0, 10.0), 0.01, 0.1, 8.0).zoom, 0.1);
    }

    #[test]
    fn wheel_factor_is_multiplicative() {
        assert_eq!(wheel_zoom_factor(0.0, 0.002), 1.0);
        assert!(wheel_zoom_factor(100.0, 0.002) < 1.0);
        assert!(wheel_zoom_factor(-100.0, 0.002) > 1.0);
        let two_steps = wheel_zoom_factor(50.0, 0.002) * wheel_zoom_factor(50.0, 0.002);
        assert!(close(two_steps, wheel_zoom_factor(100.0, 0.002), 1e-6));
    }

    #[test]
    fn viewport_wire_names() {
        let json = serde_json::to_string(&Viewport::new(1.0, 2.0, 3.0)).unwrap();
        assert_eq!(json, r#"{"panX":1.0,"panY":2.0,"zoom":3.0}"#);
    }
}
