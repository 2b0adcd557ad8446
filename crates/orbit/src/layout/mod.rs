use crate::config::BreakpointSettings;
use crate::geometry::{Circle, Point, Rect, Size, clamp_span};
use serde::{Deserialize, Serialize};

pub mod collision;
pub mod placement;
pub mod sheet;
pub mod wheel;

pub use collision::{ExclusionSet, Resolution, resolve};
pub use placement::{PlacementRequest, PlacementResult, Side, place};
pub use sheet::{Presentation, should_use_sheet};
pub use wheel::{TriggerId, TriggerSpec, WheelAnchor, position_wheel};

pub const WHEEL_RADIUS: f64 = 60.0; // trigger orbit at scale 1.0
pub const DEFAULT_TRIGGER_SIZE: Size = Size {
    width: 44.0,
    height: 44.0,
};
pub const HUB_MIN_RADIUS: f64 = 20.0;
pub const PANEL_FLOOR: Size = Size {
    width: 200.0,
    height: 120.0,
};
pub const PANEL_GAP: f64 = 12.0;
pub const MOBILE_EXTRA_GAP: f64 = 8.0;
pub const VIEWPORT_MARGIN: f64 = 8.0;
pub const CENTER_BIAS: f64 = 0.15; // mobile only
pub const ARROW_MARGIN: f64 = 14.0;
pub const MAX_ITERATIONS: usize = 12;
pub const PUSH_EPSILON: f64 = 0.5;
pub const HUB_WEIGHT: f64 = 1000.0;
pub const MOBILE_MAX_WIDTH: f64 = 768.0;
pub const MOBILE_SCALE: f64 = 0.7;
pub const DESKTOP_SCALE: f64 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ViewportInfo {
    pub width: f64,
    pub height: f64,
    pub offset_left: f64,
    pub offset_top: f64,
}

impl ViewportInfo {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            offset_left: 0.0,
            offset_top: 0.0,
        }
    }

    pub fn center(&self) -> Point {
        Point::new(
            self.offset_left + self.width / 2.0,
            self.offset_top + self.height / 2.0,
        )
    }

    /// Where in the viewport `y` sits, 0.0 at the top edge and 1.0 at the bottom.
    pub fn vertical_ratio(&self, y: f64) -> f64 {
        if self.height <= 0.0 {
            return 0.5;
        }
        (y - self.offset_top) / self.height
    }

    /// Allowed origins for a box of `size` kept `margin` away from every edge.
    pub fn bounds_for(&self, size: Size, margin: f64) -> Bounds {
        Bounds {
            min_x: self.offset_left + margin,
            max_x: self.offset_left + self.width - size.width - margin,
            min_y: self.offset_top + margin,
            max_y: self.offset_top + self.height - size.height - margin,
        }
    }
}

/// Range of valid top-left corners for a placed panel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min_x: f64,
    pub max_x: f64,
    pub min_y: f64,
    pub max_y: f64,
}

impl Bounds {
    pub fn clamp(&self, rect: Rect) -> Rect {
        Rect::new(
            clamp_span(rect.x, self.min_x, self.max_x),
            clamp_span(rect.y, self.min_y, self.max_y),
            rect.width,
            rect.height,
        )
    }
}

/// The hub's rectangle as the host lays it out.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct AnchorRect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl AnchorRect {
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    pub fn centered_at(center: Point, size: Size) -> Self {
        let r = Rect::centered_at(center, size);
        Self::new(r.x, r.y, r.width, r.height)
    }

    pub fn center(&self) -> Point {
        Point::new(self.left + self.width / 2.0, self.top + self.height / 2.0)
    }

    pub fn rect(&self) -> Rect {
        Rect::new(self.left, self.top, self.width, self.height)
    }

    /// Circular footprint of the hub, never smaller than `min_radius * scale`.
    pub fn hub_circle(&self, scale: f64, min_radius: f64) -> Circle {
        let radius = (self.width.max(self.height) / 2.0).max(min_radius * scale);
        Circle::new(self.center(), radius)
    }
}

/// Mobile/desktop classification plus the wheel scale that goes with it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Breakpoint {
    pub mobile: bool,
    pub scale: f64,
}

impl Breakpoint {
    pub fn classify(viewport: &ViewportInfo, settings: &BreakpointSettings) -> Self {
        let mobile = viewport.width <= settings.mobile_max_width;
        Self {
            mobile,
            scale: if mobile {
                settings.mobile_scale
            } else {
                settings.desktop_scale
            },
        }
    }
}
