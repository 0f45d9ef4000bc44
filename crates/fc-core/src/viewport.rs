//! Viewport: the visible window into the logical plane.
//!
//! The viewport is a logical rectangle `(x, y, width, height)` mapped onto a
//! rendering surface of `surface` pixels. The screen → logical transform is
//! a translation by `(x, y)` and a uniform scale of `width / surface.width`.
//! The scale is derived on every call, so a resize between two calls is
//! always observed.

use kurbo::{Point, Rect, Size, Vec2};

/// Which way a zoom step goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZoomDirection {
    /// Shrink the visible rectangle (content grows).
    In,
    /// Grow the visible rectangle (content shrinks).
    Out,
}

impl ZoomDirection {
    /// Map a wheel delta to a direction: scrolling up zooms in.
    /// A zero delta means no zoom.
    pub fn from_wheel(delta_y: f64) -> Option<Self> {
        if delta_y < 0.0 {
            Some(ZoomDirection::In)
        } else if delta_y > 0.0 {
            Some(ZoomDirection::Out)
        } else {
            None
        }
    }
}

/// The visible logical rectangle plus the pixel size of the surface it is
/// drawn on.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    surface: Size,
}

/// Surface assumed when the host reports an unusable size (an unmeasured
/// or hidden element).
pub const FALLBACK_SURFACE: Size = Size::new(800.0, 600.0);

fn usable(size: Size) -> bool {
    size.width > 0.0 && size.height > 0.0 && size.width.is_finite() && size.height.is_finite()
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(FALLBACK_SURFACE)
    }
}

impl Viewport {
    /// A viewport at the origin showing the surface 1:1. A zero, negative or
    /// non-finite size falls back to [`FALLBACK_SURFACE`].
    pub fn new(surface: Size) -> Self {
        let surface = if usable(surface) {
            surface
        } else {
            log::debug!("surface {surface:?} unusable, assuming {FALLBACK_SURFACE:?}");
            FALLBACK_SURFACE
        };
        Self {
            x: 0.0,
            y: 0.0,
            width: surface.width,
            height: surface.height,
            surface,
        }
    }

    /// Pixel size of the rendering surface.
    pub fn surface(&self) -> Size {
        self.surface
    }

    /// Logical units per screen pixel.
    pub fn scale(&self) -> f64 {
        if self.surface.width > 0.0 {
            self.width / self.surface.width
        } else {
            1.0
        }
    }

    /// The visible logical rectangle.
    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.x + self.width, self.y + self.height)
    }

    /// Surface-relative pixel position → logical position.
    pub fn screen_to_logical(&self, screen: Point) -> Point {
        let scale = self.scale();
        Point::new(self.x + screen.x * scale, self.y + screen.y * scale)
    }

    /// Logical position → surface-relative pixel position.
    pub fn logical_to_screen(&self, logical: Point) -> Point {
        let scale = self.scale();
        Point::new((logical.x - self.x) / scale, (logical.y - self.y) / scale)
    }

    /// Screen-space displacement → logical displacement at the current zoom.
    pub fn screen_delta_to_logical(&self, delta: Vec2) -> Vec2 {
        delta * self.scale()
    }

    /// Pan by a screen-pixel delta. The content follows the pointer, so the
    /// origin moves the opposite way by `delta * scale`.
    pub fn pan(&mut self, delta: Vec2) {
        let d = self.screen_delta_to_logical(delta);
        self.x -= d.x;
        self.y -= d.y;
    }

    /// Zoom by `factor`, keeping the logical point under `anchor` (a screen
    /// position) fixed on screen.
    pub fn zoom(&mut self, anchor: Point, direction: ZoomDirection, factor: f64) {
        if !factor.is_finite() || factor <= 0.0 {
            log::debug!("ignoring zoom factor {factor}");
            return;
        }
        if !(self.width > 0.0 && self.height > 0.0) {
            log::debug!("ignoring zoom on empty viewport {}x{}", self.width, self.height);
            return;
        }
        let anchor_logical = self.screen_to_logical(anchor);
        let (new_width, new_height) = match direction {
            ZoomDirection::In => (self.width / factor, self.height / factor),
            ZoomDirection::Out => (self.width * factor, self.height * factor),
        };
        self.x -= (anchor_logical.x - self.x) * (new_width / self.width - 1.0);
        self.y -= (anchor_logical.y - self.y) * (new_height / self.height - 1.0);
        self.width = new_width;
        self.height = new_height;
    }

    /// Track a new surface size 1:1. The pan position is kept.
    pub fn resize(&mut self, surface: Size) {
        if !usable(surface) {
            log::debug!("ignoring degenerate surface size {surface:?}");
            return;
        }
        self.surface = surface;
        self.width = surface.width;
        self.height = surface.height;
    }
}
