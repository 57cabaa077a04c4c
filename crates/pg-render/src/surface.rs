//! Backing-store sizing for the render target.

/// Displayed size of the render target.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DisplaySize {
    /// Layout width in CSS pixels.
    pub css_width: f32,
    /// Layout height in CSS pixels.
    pub css_height: f32,
    /// Device pixel ratio.
    pub dpr: f32,
}

impl DisplaySize {
    pub const fn new(css_width: f32, css_height: f32, dpr: f32) -> Self {
        Self {
            css_width,
            css_height,
            dpr,
        }
    }

    /// Backing-store size in device pixels, `floor(css * dpr)`.
    pub fn backing_size(&self) -> (u32, u32) {
        // `as` saturates: negative and NaN become 0.
        (
            (self.css_width * self.dpr).floor() as u32,
            (self.css_height * self.dpr).floor() as u32,
        )
    }
}

/// Tracks the last applied backing size so the surface is only
/// reconfigured when the pixel dimensions actually change.
#[derive(Debug, Default)]
pub struct SurfaceSizer {
    current: Option<(u32, u32)>,
}

impl SurfaceSizer {
    /// Returns the new backing size if it differs from the last one.
    pub fn update(&mut self, size: DisplaySize) -> Option<(u32, u32)> {
        let next = size.backing_size();
        if self.current == Some(next) {
            return None;
        }
        self.current = Some(next);
        Some(next)
    }

    pub fn current(&self) -> Option<(u32, u32)> {
        self.current
    }
}
