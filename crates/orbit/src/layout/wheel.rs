use crate::geometry::{Point, Rect, Size};
use derive_more::{AsRef, Deref, Display, From, Into};
use serde::{Deserialize, Serialize};

/// Identifies a trigger and the one panel it reveals.
#[derive(
    Debug,
    Clone,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    Display,
    Deref,
    From,
    Into,
    AsRef,
)]
#[serde(transparent)]
pub struct TriggerId(String);

crate::impl_string_newtype!(TriggerId);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TriggerSpec {
    pub id: TriggerId,
    /// Screen-space degrees: 0 is right, 90 is down.
    pub angle_degrees: f64,
}

impl TriggerSpec {
    pub fn new(id: impl Into<TriggerId>, angle_degrees: f64) -> Self {
        Self {
            id: id.into(),
            angle_degrees,
        }
    }

    pub fn angle(&self) -> f64 {
        self.angle_degrees.to_radians()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WheelAnchor {
    pub id: TriggerId,
    pub x: f64,
    pub y: f64,
    /// Radians.
    pub angle: f64,
    pub rect: Rect,
}

impl WheelAnchor {
    pub fn point(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn size(&self) -> Size {
        self.rect.size()
    }
}

/// Places every trigger on a circle of `radius * scale` around `center`.
///
/// `measured` returns the trigger's rendered size when the host knows it;
/// otherwise `fallback` scaled by the same factor is used.
pub fn position_wheel(
    specs: &[TriggerSpec],
    center: Point,
    radius: f64,
    scale: f64,
    fallback: Size,
    mut measured: impl FnMut(&TriggerId) -> Option<Size>,
) -> Vec<WheelAnchor> {
    let orbit = radius * scale;

    specs
        .iter()
        .map(|spec| {
            let angle = spec.angle();
            let (x, y) = (
                center.x + angle.cos() * orbit,
                center.y + angle.sin() * orbit,
            );
            let size = measured(&spec.id)
                .filter(Size::is_measurable)
                .unwrap_or_else(|| fallback.scaled(scale));

            WheelAnchor {
                id: spec.id.clone(),
                x,
                y,
                angle,
                rect: Rect::centered_at(Point::new(x, y), size),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn specs() -> Vec<TriggerSpec> {
        vec![
            TriggerSpec::new(TriggerId::new("ask"), 270.0),
            TriggerSpec::new(TriggerId::new("tone"), 30.0),
            TriggerSpec::new(TriggerId::new("fix"), 150.0),
            TriggerSpec::new(TriggerId::new("odd"), -37.5),
        ]
    }

    #[test]
    fn test_anchors_sit_on_the_orbit() {
        let center = Point::new(312.5, 97.25);
        for scale in [0.5, 0.7, 1.0, 1.75] {
            let anchors = position_wheel(&specs(), center, 60.0, scale, Size::new(44.0, 44.0), |_| None);
            for (anchor, spec) in anchors.iter().zip(specs()) {
                let dist = center.distance(anchor.point());
                assert!((dist - 60.0 * scale).abs() < 1e-6, "{} at {dist}", anchor.id);

                let angle = (anchor.y - center.y).atan2(anchor.x - center.x);
                let expected = spec.angle();
                let diff = (angle - expected).rem_euclid(std::f64::consts::TAU);
                assert!(diff < 1e-9 || (std::f64::consts::TAU - diff) < 1e-9);
            }
        }
    }

    #[test]
    fn test_north_is_up() {
        let anchors = position_wheel(
            &specs()[..1],
            Point::new(100.0, 100.0),
            60.0,
            1.0,
            Size::new(44.0, 44.0),
            |_| None,
        );
        assert!((anchors[0].x - 100.0).abs() < 1e-9);
        assert!((anchors[0].y - 40.0).abs() < 1e-9);
    }

    #[test]
    fn test_rect_uses_measured_size_or_scaled_fallback() {
        let anchors = position_wheel(
            &specs()[..2],
            Point::default(),
            60.0,
            0.5,
            Size::new(44.0, 44.0),
            |id| (id.as_str() == "tone").then(|| Size::new(30.0, 20.0)),
        );

        assert_eq!(anchors[0].size(), Size::new(22.0, 22.0));
        assert_eq!(anchors[1].size(), Size::new(30.0, 20.0));
        assert_eq!(anchors[1].rect.center(), anchors[1].point());
    }

    #[test]
    fn test_degenerate_measurement_falls_back() {
        let anchors = position_wheel(
            &specs()[..1],
            Point::default(),
            60.0,
            1.0,
            Size::new(44.0, 44.0),
            |_| Some(Size::new(0.0, 30.0)),
        );
        assert_eq!(anchors[0].size(), Size::new(44.0, 44.0));
    }
}
