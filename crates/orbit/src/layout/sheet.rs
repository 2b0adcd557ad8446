use super::placement::PlacementResult;
use serde::{Deserialize, Serialize};
use strum::Display as StrumDisplay;

/// How the host should present the active panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, StrumDisplay)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Presentation {
    /// Positioned next to its trigger using the placement result.
    Popover,
    /// Full-viewport overlay with a dismissible backdrop; the placement
    /// coordinates are meaningless in this mode.
    Sheet,
}

/// Only constrained viewports give up on popovers, and only when no side
/// could be resolved without overlap.
pub fn should_use_sheet(placement: &PlacementResult, is_mobile: bool) -> bool {
    is_mobile && placement.collides
}

impl Presentation {
    pub fn for_placement(placement: &PlacementResult, is_mobile: bool) -> Self {
        if should_use_sheet(placement, is_mobile) {
            Self::Sheet
        } else {
            Self::Popover
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;
    use crate::geometry::{Point, Size};
    use crate::layout::collision::ExclusionSet;
    use crate::layout::placement::{PlacementRequest, Side, place};
    use crate::layout::wheel::position_wheel;
    use crate::layout::{AnchorRect, Breakpoint, ViewportInfo};

    fn result(collides: bool) -> PlacementResult {
        PlacementResult {
            x: 0.0,
            y: 0.0,
            side: Side::Top,
            arrow_offset: 14.0,
            collides,
            penalty: if collides { 10.0 } else { 0.0 },
        }
    }

    #[test]
    fn test_sheet_truth_table() {
        assert!(should_use_sheet(&result(true), true));
        assert!(!should_use_sheet(&result(false), true));
        assert!(!should_use_sheet(&result(true), false));
        assert!(!should_use_sheet(&result(false), false));
        assert_eq!(Presentation::for_placement(&result(true), true), Presentation::Sheet);
        assert_eq!(Presentation::for_placement(&result(true), false), Presentation::Popover);
    }

    #[test]
    fn test_oversized_panel_falls_back_to_sheet_on_mobile_only() {
        let settings = Settings::default();
        let viewport = ViewportInfo::new(360.0, 640.0);
        let hub = AnchorRect::centered_at(Point::new(180.0, 320.0), Size::new(40.0, 40.0));
        // Panel fills the whole usable area, so it must cover the hub wherever it goes.
        let panel = Size::new(344.0, 624.0);

        let mobile = Breakpoint::classify(&viewport, &settings.breakpoint);
        assert!(mobile.mobile);
        let desktop = Breakpoint {
            mobile: false,
            scale: 1.0,
        };

        for breakpoint in [mobile, desktop] {
            let wheel = position_wheel(
                &settings.trigger_specs(),
                hub.center(),
                settings.wheel.radius,
                breakpoint.scale,
                settings.wheel.trigger_size,
                |_| None,
            );
            let exclusions =
                ExclusionSet::build(&hub, &wheel, breakpoint.scale, settings.wheel.hub_min_radius);
            let placement = place(
                &PlacementRequest {
                    anchor: &wheel[0],
                    hub: &hub,
                    exclusions: &exclusions,
                    panel,
                    viewport,
                    breakpoint,
                },
                &settings,
            );

            assert!(placement.collides);
            assert_eq!(should_use_sheet(&placement, breakpoint.mobile), breakpoint.mobile);
        }
    }
}
