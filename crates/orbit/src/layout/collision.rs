use super::wheel::WheelAnchor;
use super::{AnchorRect, Bounds};
use crate::config::CollisionSettings;
use crate::geometry::{Circle, Point, Rect, Vector};
use serde::{Deserialize, Serialize};

/// Areas a panel must stay clear of: the hub and every trigger.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ExclusionSet {
    pub hub: Circle,
    pub triggers: Vec<Rect>,
}

impl ExclusionSet {
    pub fn build(anchor: &AnchorRect, wheel: &[WheelAnchor], scale: f64, hub_min_radius: f64) -> Self {
        Self {
            hub: anchor.hub_circle(scale, hub_min_radius),
            triggers: wheel.iter().map(|a| a.rect).collect(),
        }
    }

    pub fn intersects(&self, rect: &Rect) -> bool {
        self.hub.intersects_rect(rect) || self.triggers.iter().any(|t| t.intersects(rect))
    }

    /// Weighted overlap left over at `rect`; zero when clear.
    pub fn penalty(&self, rect: &Rect, hub_weight: f64) -> f64 {
        let triggers: f64 = self.triggers.iter().map(|t| t.overlap_area(rect)).sum();
        hub_weight * self.hub.overlap_area(rect) + triggers
    }

    /// The zone overlapping `rect` the most, as (overlap metric, zone center).
    /// The hub is checked first, so it wins exact ties.
    fn deepest(&self, rect: &Rect) -> Option<(f64, Point)> {
        let hub = Some((self.hub.radius - self.hub.distance_to_rect(rect), self.hub.center()));
        let triggers = self.triggers.iter().map(|t| {
            let (dx, dy) = rect.overlap_extents(t);
            (dx.min(dy), t.center())
        });

        hub.into_iter()
            .chain(triggers)
            .filter(|(overlap, _)| *overlap > 0.0)
            .fold(None, |best, zone| match best {
                Some((depth, _)) if depth >= zone.0 => best,
                _ => Some(zone),
            })
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Resolution {
    pub x: f64,
    pub y: f64,
    pub collides: bool,
    pub penalty: f64,
    /// Push steps performed; never more than the configured cap.
    pub iterations: usize,
}

impl Resolution {
    fn clear(rect: Rect, iterations: usize) -> Self {
        Self {
            x: rect.x,
            y: rect.y,
            collides: false,
            penalty: 0.0,
            iterations,
        }
    }
}

/// Pushes `rect` out of the exclusion zones, one deepest zone per step.
///
/// Every step moves the rect away from the zone's center by the overlap plus
/// `epsilon`, then clamps it back into `bounds`. When the step budget runs out
/// the lowest-penalty position seen (the clamped input included) is returned,
/// so the result is never worse than where it started.
pub fn resolve(
    rect: Rect,
    exclusions: &ExclusionSet,
    fallback_origin: Point,
    bounds: &Bounds,
    settings: &CollisionSettings,
) -> Resolution {
    let mut current = bounds.clamp(rect);
    if !exclusions.intersects(&current) {
        return Resolution::clear(current, 0);
    }

    let mut best = (current, exclusions.penalty(&current, settings.hub_weight));

    for step in 1..=settings.max_iterations {
        let Some((overlap, zone_center)) = exclusions.deepest(&current) else {
            return Resolution::clear(current, step - 1);
        };

        let center = current.center();
        let direction = zone_center
            .toward(center)
            .normalized_or(fallback_origin.toward(center).normalized_or(Vector::RIGHT));

        current = bounds.clamp(current.translated(direction, overlap + settings.epsilon));
        log::trace!(
            "collision step {}: pushed {:.2} along ({:.3}, {:.3}) to ({:.2}, {:.2})",
            step,
            overlap + settings.epsilon,
            direction.x,
            direction.y,
            current.x,
            current.y
        );

        if !exclusions.intersects(&current) {
            return Resolution::clear(current, step);
        }

        let penalty = exclusions.penalty(&current, settings.hub_weight);
        if penalty < best.1 {
            best = (current, penalty);
        }
    }

    let (rect, penalty) = best;
    Resolution {
        x: rect.x,
        y: rect.y,
        collides: true,
        penalty,
        iterations: settings.max_iterations,
    }
}
