use serde::{Deserialize, Serialize};

/// Lengths at or below this are treated as zero.
const DEGENERATE_EPSILON: f64 = 1e-9;

/// Vertical slices used when integrating a circle/rect intersection.
const AREA_SLICES: usize = 48;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance(&self, other: Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    /// Vector pointing from `self` to `to`.
    pub fn toward(&self, to: Point) -> Vector {
        Vector::new(to.x - self.x, to.y - self.y)
    }

    pub fn offset(&self, v: Vector, amount: f64) -> Point {
        Point::new(self.x + v.x * amount, self.y + v.y * amount)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vector {
    pub x: f64,
    pub y: f64,
}

impl Vector {
    pub const RIGHT: Vector = Vector { x: 1.0, y: 0.0 };

    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn length(&self) -> f64 {
        self.x.hypot(self.y)
    }

    pub fn is_degenerate(&self) -> bool {
        self.length() <= DEGENERATE_EPSILON
    }

    /// Unit vector in the same direction, or `fallback` for (near) zero input.
    pub fn normalized_or(&self, fallback: Vector) -> Vector {
        if self.is_degenerate() {
            fallback
        } else {
            let len = self.length();
            Vector::new(self.x / len, self.y / len)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Both dimensions strictly positive and finite.
    pub fn is_measurable(&self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0
    }

    pub fn scaled(&self, factor: f64) -> Size {
        Size::new(self.width * factor, self.height * factor)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn centered_at(center: Point, size: Size) -> Self {
        Self::new(
            center.x - size.width / 2.0,
            center.y - size.height / 2.0,
            size.width,
            size.height,
        )
    }

    pub fn at(origin: Point, size: Size) -> Self {
        Self::new(origin.x, origin.y, size.width, size.height)
    }

    pub fn left(&self) -> f64 {
        self.x
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn top(&self) -> f64 {
        self.y
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    pub fn translated(&self, v: Vector, amount: f64) -> Rect {
        Rect::at(self.origin().offset(v, amount), self.size())
    }

    /// Overlap along each axis; non-positive values mean the rects are apart on that axis.
    pub fn overlap_extents(&self, other: &Rect) -> (f64, f64) {
        let dx = self.right().min(other.right()) - self.left().max(other.left());
        let dy = self.bottom().min(other.bottom()) - self.top().max(other.top());
        (dx, dy)
    }

    /// Touching edges do not count as an intersection.
    pub fn intersects(&self, other: &Rect) -> bool {
        let (dx, dy) = self.overlap_extents(other);
        dx > 0.0 && dy > 0.0
    }

    pub fn overlap_area(&self, other: &Rect) -> f64 {
        let (dx, dy) = self.overlap_extents(other);
        if dx > 0.0 && dy > 0.0 { dx * dy } else { 0.0 }
    }

    pub fn clamp_point(&self, p: Point) -> Point {
        Point::new(
            clamp_span(p.x, self.left(), self.right()),
            clamp_span(p.y, self.top(), self.bottom()),
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Circle {
    pub cx: f64,
    pub cy: f64,
    pub radius: f64,
}

impl Circle {
    pub fn new(center: Point, radius: f64) -> Self {
        Self {
            cx: center.x,
            cy: center.y,
            radius,
        }
    }

    pub fn center(&self) -> Point {
        Point::new(self.cx, self.cy)
    }

    /// Distance from the circle's center to the closest point of `rect`; zero when inside.
    pub fn distance_to_rect(&self, rect: &Rect) -> f64 {
        self.center().distance(rect.clamp_point(self.center()))
    }

    pub fn intersects_rect(&self, rect: &Rect) -> bool {
        self.distance_to_rect(rect) < self.radius
    }

    /// Area shared by the circle and `rect`, integrated over vertical slices.
    pub fn overlap_area(&self, rect: &Rect) -> f64 {
        if self.radius <= 0.0 || !self.intersects_rect(rect) {
            return 0.0;
        }

        let x0 = rect.left().max(self.cx - self.radius);
        let x1 = rect.right().min(self.cx + self.radius);
        if x1 <= x0 {
            return 0.0;
        }

        let step = (x1 - x0) / AREA_SLICES as f64;
        (0..AREA_SLICES)
            .map(|i| {
                let x = x0 + (i as f64 + 0.5) * step;
                let dx = x - self.cx;
                let half = (self.radius * self.radius - dx * dx).max(0.0).sqrt();
                let lo = rect.top().max(self.cy - half);
                let hi = rect.bottom().min(self.cy + half);
                (hi - lo).max(0.0) * step
            })
            .sum()
    }
}

/// Clamps `value` into `[lo, hi]`, pinning to `lo` when the range is inverted.
///
/// `f64::clamp` panics on an inverted range, which happens whenever a panel is
/// larger than the viewport minus its margins.
pub fn clamp_span(value: f64, lo: f64, hi: f64) -> f64 {
    if hi < lo { lo } else { value.max(lo).min(hi) }
}
