use super::collision::{ExclusionSet, resolve};
use super::wheel::WheelAnchor;
use super::{AnchorRect, Breakpoint, ViewportInfo};
use crate::config::Settings;
use crate::geometry::{Point, Rect, Size, Vector, clamp_span};
use serde::{Deserialize, Serialize};
use strum::{Display as StrumDisplay, EnumIter, EnumString};

/// Edge of the trigger a panel is attached to.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    EnumString,
    EnumIter,
    StrumDisplay,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Left,
    Right,
    Top,
    Bottom,
}

impl Side {
    pub fn opposite(&self) -> Self {
        match self {
            Self::Left => Self::Right,
            Self::Right => Self::Left,
            Self::Top => Self::Bottom,
            Self::Bottom => Self::Top,
        }
    }

    pub fn is_horizontal(&self) -> bool {
        matches!(self, Self::Left | Self::Right)
    }

    /// Side facing along the dominant axis of `direction`; ties go horizontal.
    pub fn facing(direction: Vector) -> Self {
        if direction.x.abs() >= direction.y.abs() {
            if direction.x >= 0.0 { Self::Right } else { Self::Left }
        } else if direction.y < 0.0 {
            Self::Top
        } else {
            Self::Bottom
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlacementResult {
    pub x: f64,
    pub y: f64,
    pub side: Side,
    /// Where along the panel's attached edge the pointer to the trigger goes.
    pub arrow_offset: f64,
    pub collides: bool,
    pub penalty: f64,
}

pub struct PlacementRequest<'a> {
    pub anchor: &'a WheelAnchor,
    pub hub: &'a AnchorRect,
    pub exclusions: &'a ExclusionSet,
    pub panel: Size,
    pub viewport: ViewportInfo,
    pub breakpoint: Breakpoint,
}

/// Sides in the order they are tried: preferred, its opposite, then the other
/// axis. `bias` (if any) is pulled to the front; the rest keep their order.
pub fn fallback_order(preferred: Side, bias: Option<Side>) -> [Side; 4] {
    let rest = if preferred.is_horizontal() {
        [Side::Top, Side::Bottom]
    } else {
        [Side::Right, Side::Left]
    };
    let mut order = [preferred, preferred.opposite(), rest[0], rest[1]];

    if let Some(pos) = bias.and_then(|b| order.iter().position(|s| *s == b)) {
        order[..=pos].rotate_right(1);
    }
    order
}

/// On small screens keep the panel on the roomier vertical half: a hub in the
/// lower half prefers opening upward and vice versa.
fn mobile_bias(request: &PlacementRequest) -> Option<Side> {
    request.breakpoint.mobile.then(|| {
        if request.viewport.vertical_ratio(request.hub.center().y) > 0.5 {
            Side::Top
        } else {
            Side::Bottom
        }
    })
}

fn candidate(side: Side, request: &PlacementRequest, settings: &Settings) -> Rect {
    let anchor = request.anchor;
    let (panel, trigger) = (request.panel, anchor.size());
    let padding = settings.panel.gap
        + if request.breakpoint.mobile {
            settings.panel.mobile_extra_gap
        } else {
            0.0
        };

    let (x, y) = match side {
        Side::Top => (
            anchor.x - panel.width / 2.0,
            anchor.y - trigger.height / 2.0 - padding - panel.height,
        ),
        Side::Bottom => (
            anchor.x - panel.width / 2.0,
            anchor.y + trigger.height / 2.0 + padding,
        ),
        Side::Left => (
            anchor.x - trigger.width / 2.0 - padding - panel.width,
            anchor.y - panel.height / 2.0,
        ),
        Side::Right => (
            anchor.x + trigger.width / 2.0 + padding,
            anchor.y - panel.height / 2.0,
        ),
    };

    let mut origin = Point::new(x, y);
    if request.breakpoint.mobile {
        let centered = request.viewport.center();
        let target = Point::new(centered.x - panel.width / 2.0, centered.y - panel.height / 2.0);
        origin = origin.offset(origin.toward(target), settings.panel.center_bias);
    }

    request
        .viewport
        .bounds_for(panel, settings.panel.margin)
        .clamp(Rect::at(origin, panel))
}

/// Offset of the trigger along the panel edge, kept `margin` away from both ends.
fn arrow_offset(side: Side, anchor: &WheelAnchor, rect: &Rect, margin: f64) -> f64 {
    let (offset, length) = if side.is_horizontal() {
        (anchor.y - rect.y, rect.height)
    } else {
        (anchor.x - rect.x, rect.width)
    };

    if length < margin * 2.0 {
        length / 2.0
    } else {
        clamp_span(offset, margin, length - margin)
    }
}

/// Picks a side for the panel and a collision-free spot next to its trigger.
///
/// The first side that resolves cleanly wins. When none does, the side with
/// the lowest penalty is returned with `collides` set; exact ties keep the
/// earlier side in the fallback order.
pub fn place(request: &PlacementRequest, settings: &Settings) -> PlacementResult {
    let hub_center = request.hub.center();
    let direction = hub_center
        .toward(request.anchor.point())
        .normalized_or(Vector::RIGHT);
    let preferred = Side::facing(direction);
    let order = fallback_order(preferred, mobile_bias(request));
    let bounds = request
        .viewport
        .bounds_for(request.panel, settings.panel.margin);

    let attempt = |side: Side| {
        let rect = candidate(side, request, settings);
        let resolved = resolve(
            rect,
            request.exclusions,
            hub_center,
            &bounds,
            &settings.collision,
        );
        let rect = Rect::new(resolved.x, resolved.y, rect.width, rect.height);

        PlacementResult {
            x: resolved.x,
            y: resolved.y,
            side,
            arrow_offset: arrow_offset(side, request.anchor, &rect, settings.panel.arrow_margin),
            collides: resolved.collides,
            penalty: resolved.penalty,
        }
    };

    let [first, rest @ ..] = order;
    let mut best = attempt(first);
    if !best.collides {
        return best;
    }

    for side in rest {
        let result = attempt(side);
        if !result.collides {
            return result;
        }
        if result.penalty < best.penalty {
            best = result;
        }
    }

    log::debug!(
        "no clean side for {}, keeping {} with penalty {:.1}",
        request.anchor.id,
        best.side,
        best.penalty
    );
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::collision::ExclusionSet;
    use crate::layout::wheel::{TriggerId, TriggerSpec, position_wheel};
    use crate::layout::{DEFAULT_TRIGGER_SIZE, WHEEL_RADIUS};
    use strum::IntoEnumIterator;

    struct Scene {
        hub: AnchorRect,
        wheel: Vec<WheelAnchor>,
        exclusions: ExclusionSet,
        viewport: ViewportInfo,
        breakpoint: Breakpoint,
    }

    impl Scene {
        fn new(viewport: ViewportInfo, hub_center: Point, specs: &[TriggerSpec]) -> Self {
            let settings = Settings::default();
            let breakpoint = Breakpoint::classify(&viewport, &settings.breakpoint);
            let hub = AnchorRect::centered_at(hub_center, Size::new(40.0, 40.0));
            let wheel = position_wheel(
                specs,
                hub.center(),
                WHEEL_RADIUS,
                breakpoint.scale,
                DEFAULT_TRIGGER_SIZE,
                |_| None,
            );
            let exclusions = ExclusionSet::build(
                &hub,
                &wheel,
                breakpoint.scale,
                settings.wheel.hub_min_radius,
            );
            Self {
                hub,
                wheel,
                exclusions,
                viewport,
                breakpoint,
            }
        }

        fn request(&self, index: usize, panel: Size) -> PlacementRequest<'_> {
            PlacementRequest {
                anchor: &self.wheel[index],
                hub: &self.hub,
                exclusions: &self.exclusions,
                panel,
                viewport: self.viewport,
                breakpoint: self.breakpoint,
            }
        }

        fn place(&self, index: usize, panel: Size) -> PlacementResult {
            place(&self.request(index, panel), &Settings::default())
        }
    }

    fn default_specs() -> Vec<TriggerSpec> {
        Settings::default().trigger_specs()
    }

    #[test]
    fn test_side_parsing_and_opposites() {
        assert_eq!("TOP".parse::<Side>().unwrap(), Side::Top);
        assert_eq!(Side::Left.to_string(), "left");
        for side in Side::iter() {
            assert_eq!(side.opposite().opposite(), side);
            assert_ne!(side.opposite(), side);
        }
    }

    #[test]
    fn test_facing_uses_dominant_axis() {
        assert_eq!(Side::facing(Vector::new(1.0, 0.2)), Side::Right);
        assert_eq!(Side::facing(Vector::new(-1.0, 0.9)), Side::Left);
        assert_eq!(Side::facing(Vector::new(0.1, -1.0)), Side::Top);
        assert_eq!(Side::facing(Vector::new(-0.1, 1.0)), Side::Bottom);
        assert_eq!(Side::facing(Vector::new(0.5, 0.5)), Side::Right);
    }

    #[test]
    fn test_fallback_order_and_bias() {
        assert_eq!(
            fallback_order(Side::Right, None),
            [Side::Right, Side::Left, Side::Top, Side::Bottom]
        );
        assert_eq!(
            fallback_order(Side::Top, None),
            [Side::Top, Side::Bottom, Side::Right, Side::Left]
        );
        assert_eq!(
            fallback_order(Side::Right, Some(Side::Top)),
            [Side::Top, Side::Right, Side::Left, Side::Bottom]
        );
        assert_eq!(
            fallback_order(Side::Left, Some(Side::Bottom)),
            [Side::Bottom, Side::Left, Side::Right, Side::Top]
        );
        assert_eq!(
            fallback_order(Side::Top, Some(Side::Top)),
            [Side::Top, Side::Bottom, Side::Right, Side::Left]
        );
    }

    #[test]
    fn test_desktop_trigger_above_hub_opens_upward() {
        let specs = vec![TriggerSpec::new(TriggerId::new("up"), 270.0)];
        let scene = Scene::new(
            ViewportInfo::new(1920.0, 1080.0),
            Point::new(960.0, 540.0),
            &specs,
        );
        let result = scene.place(0, Size::new(230.0, 150.0));

        assert_eq!(result.side, Side::Top);
        assert!(!result.collides);
        assert_eq!(result.penalty, 0.0);
        assert!((result.x - 845.0).abs() < 1e-9);
        assert!((result.y - 296.0).abs() < 1e-9);
        assert!((result.arrow_offset - 115.0).abs() < 1e-9);
    }

    #[test]
    fn test_mobile_corner_hub_prefers_top_and_stays_on_screen() {
        let viewport = ViewportInfo::new(375.0, 667.0);
        let scene = Scene::new(viewport, Point::new(10.0, 600.0), &default_specs());
        assert!(scene.breakpoint.mobile);

        let orbit = scene.hub.center().distance(scene.wheel[1].point());
        assert!((orbit - 42.0).abs() < 1e-6);

        let panel = Size::new(260.0, 200.0);
        for index in 0..scene.wheel.len() {
            let result = scene.place(index, panel);
            assert!(result.x >= 8.0 && result.x <= 375.0 - 260.0 - 8.0, "{result:?}");
            assert!(result.y >= 8.0 && result.y <= 667.0 - 200.0 - 8.0, "{result:?}");
        }

        // "tone" points right, but the low hub pulls the panel above it
        let tone = scene.place(1, panel);
        assert_eq!(tone.side, Side::Top);
        assert!(!tone.collides);
    }

    #[test]
    fn test_placement_is_deterministic() {
        let scene = Scene::new(
            ViewportInfo::new(500.0, 400.0),
            Point::new(250.0, 200.0),
            &default_specs(),
        );
        for index in 0..3 {
            let a = scene.place(index, Size::new(480.0, 380.0));
            let b = scene.place(index, Size::new(480.0, 380.0));
            assert_eq!(a.x.to_bits(), b.x.to_bits());
            assert_eq!(a.y.to_bits(), b.y.to_bits());
            assert_eq!(a.side, b.side);
            assert_eq!(a.arrow_offset.to_bits(), b.arrow_offset.to_bits());
            assert_eq!(a.collides, b.collides);
            assert_eq!(a.penalty.to_bits(), b.penalty.to_bits());
        }
    }

    #[test]
    fn test_bounds_hold_across_viewports_and_hubs() {
        let panel = Size::new(220.0, 140.0);
        let margin = Settings::default().panel.margin;

        for (w, h) in [(375.0, 667.0), (800.0, 600.0), (1920.0, 1080.0), (240.0, 160.0)] {
            let viewport = ViewportInfo::new(w, h);
            for hx in [0.0, 0.25, 0.5, 0.9, 1.0] {
                for hy in [0.0, 0.3, 0.5, 0.51, 1.0] {
                    let scene = Scene::new(viewport, Point::new(w * hx, h * hy), &default_specs());
                    for index in 0..3 {
                        let r = scene.place(index, panel);
                        assert!(r.x >= margin && r.x <= w - panel.width - margin, "{r:?}");
                        assert!(r.y >= margin && r.y <= h - panel.height - margin, "{r:?}");
                    }
                }
            }
        }
    }

    #[test]
    fn test_arrow_offset_stays_inside_panel() {
        // Hub at the far right edge: the panel gets clamped well away from the trigger.
        let scene = Scene::new(
            ViewportInfo::new(1280.0, 800.0),
            Point::new(1275.0, 400.0),
            &default_specs(),
        );
        for index in 0..3 {
            let r = scene.place(index, Size::new(300.0, 200.0));
            let length = if r.side.is_horizontal() { 200.0 } else { 300.0 };
            assert!(r.arrow_offset >= 14.0 && r.arrow_offset <= length - 14.0, "{r:?}");
        }
    }

    #[test]
    fn test_arrow_offset_on_tiny_panel_is_centered() {
        let anchor = WheelAnchor {
            id: TriggerId::new("a"),
            x: 100.0,
            y: 100.0,
            angle: 0.0,
            rect: Rect::centered_at(Point::new(100.0, 100.0), Size::new(10.0, 10.0)),
        };
        let rect = Rect::new(0.0, 0.0, 20.0, 20.0);
        assert_eq!(arrow_offset(Side::Top, &anchor, &rect, 14.0), 10.0);
    }

    #[test]
    fn test_arrow_offset_tolerates_nan_margin() {
        let anchor = WheelAnchor {
            id: TriggerId::new("a"),
            x: 150.0,
            y: 100.0,
            angle: 0.0,
            rect: Rect::centered_at(Point::new(150.0, 100.0), Size::new(44.0, 44.0)),
        };
        let rect = Rect::new(100.0, 0.0, 200.0, 120.0);
        assert_eq!(arrow_offset(Side::Bottom, &anchor, &rect, f64::NAN), 50.0);

        let mut settings = Settings::default();
        settings.panel.arrow_margin = f64::NAN;
        let scene = Scene::new(
            ViewportInfo::new(1280.0, 800.0),
            Point::new(640.0, 400.0),
            &default_specs(),
        );
        let result = place(&scene.request(0, Size::new(200.0, 120.0)), &settings);
        assert!(result.arrow_offset.is_finite());
    }

    #[test]
    fn test_mobile_candidate_leans_toward_viewport_center() {
        let viewport = ViewportInfo::new(375.0, 667.0);
        let scene = Scene::new(viewport, Point::new(187.5, 200.0), &default_specs());
        assert!(scene.breakpoint.mobile);

        let panel = Size::new(200.0, 120.0);
        let request = scene.request(0, panel);
        let mut unbiased = Settings::default();
        unbiased.panel.center_bias = 0.0;

        let raw = candidate(Side::Bottom, &request, &unbiased);
        let leaned = candidate(Side::Bottom, &request, &Settings::default());

        // "ask" sits 42px above the hub; 15.4 half trigger + 20 padding below it
        assert!((raw.y - 193.4).abs() < 1e-6, "{raw:?}");
        let target_y = 667.0 / 2.0 - 60.0;
        assert!((leaned.y - (raw.y + 0.15 * (target_y - raw.y))).abs() < 1e-6);
        assert!((leaned.x - raw.x).abs() < 1e-6);
    }

    #[test]
    fn test_offset_viewport_places_in_page_coordinates() {
        let viewport = ViewportInfo {
            width: 800.0,
            height: 600.0,
            offset_left: 1000.0,
            offset_top: 200.0,
        };
        let specs = vec![TriggerSpec::new(TriggerId::new("up"), 270.0)];
        let scene = Scene::new(viewport, Point::new(1400.0, 500.0), &specs);
        assert!(!scene.breakpoint.mobile);

        let result = scene.place(0, Size::new(230.0, 150.0));
        assert_eq!(result.side, Side::Top);
        assert!(!result.collides);
        assert!((result.x - 1285.0).abs() < 1e-9);
        assert!((result.y - 256.0).abs() < 1e-9);

        // hub tucked into the viewport's top-left corner
        let panel = Size::new(220.0, 140.0);
        let corner = Scene::new(viewport, Point::new(1010.0, 210.0), &default_specs());
        for index in 0..3 {
            let r = corner.place(index, panel);
            assert!(r.x >= 1008.0 && r.x <= 1000.0 + 800.0 - 220.0 - 8.0, "{r:?}");
            assert!(r.y >= 208.0 && r.y <= 200.0 + 600.0 - 140.0 - 8.0, "{r:?}");
        }
    }
}
