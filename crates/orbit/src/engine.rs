use crate::config::Settings;
use crate::geometry::Size;
use crate::layout::{
    AnchorRect, Breakpoint, ExclusionSet, PlacementRequest, PlacementResult, Presentation,
    TriggerId, TriggerSpec, ViewportInfo, WheelAnchor, place, position_wheel,
};
use crate::scheduler::{FrameClock, FrameTicket, Invalidation, LayoutScheduler};
use crate::sizes::{SizeCache, SizeKey};
use serde::Serialize;
use std::collections::HashSet;

/// Everything the engine needs from the presentation layer.
pub trait LayoutHost {
    /// Current visible viewport; read once per layout pass.
    fn viewport(&self) -> ViewportInfo;

    /// Rendered size of a panel or trigger, `None` if not laid out yet.
    fn measure(&self, key: &SizeKey) -> Option<Size>;

    /// Host-supplied breakpoint; `None` derives one from the settings.
    fn breakpoint(&self, _viewport: &ViewportInfo) -> Option<Breakpoint> {
        None
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PanelPlacement {
    pub id: TriggerId,
    pub size: Size,
    pub result: PlacementResult,
    pub presentation: Presentation,
}

/// Geometry produced by the most recent layout pass.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LayoutSnapshot {
    pub pass: u64,
    pub viewport: ViewportInfo,
    pub breakpoint: Breakpoint,
    pub anchor: AnchorRect,
    pub wheel: Vec<WheelAnchor>,
    pub exclusions: ExclusionSet,
    pub active: Option<TriggerId>,
    pub panel: Option<PanelPlacement>,
}

type Observer = Box<dyn FnMut(&LayoutSnapshot)>;

/// Handle to one mounted radial control.
///
/// At most one panel is active at a time. All geometry is recomputed from
/// scratch on every pass; the only state carried between passes is the
/// active panel id and the size cache.
pub struct Engine<H: LayoutHost, C: FrameClock> {
    settings: Settings,
    specs: Vec<TriggerSpec>,
    anchor: AnchorRect,
    host: H,
    clock: C,
    scheduler: LayoutScheduler,
    sizes: SizeCache,
    active: Option<TriggerId>,
    layout: LayoutSnapshot,
    observers: Vec<Observer>,
    destroyed: bool,
}

impl<H: LayoutHost, C: FrameClock> Engine<H, C> {
    /// Builds the engine and runs the first pass synchronously, so the wheel
    /// is positioned before the host draws anything.
    pub fn create(
        specs: Vec<TriggerSpec>,
        anchor: AnchorRect,
        host: H,
        clock: C,
        settings: Settings,
    ) -> Self {
        let mut seen = HashSet::new();
        let specs: Vec<TriggerSpec> = specs
            .into_iter()
            .filter(|spec| {
                let fresh = seen.insert(spec.id.clone());
                if !fresh {
                    log::warn!("Ignoring duplicate trigger '{}'", spec.id);
                }
                fresh
            })
            .collect();

        let viewport = host.viewport();
        let breakpoint = host
            .breakpoint(&viewport)
            .unwrap_or_else(|| Breakpoint::classify(&viewport, &settings.breakpoint));

        let mut engine = Self {
            settings,
            specs,
            anchor,
            host,
            clock,
            scheduler: LayoutScheduler::new(),
            sizes: SizeCache::new(),
            active: None,
            layout: LayoutSnapshot {
                pass: 0,
                viewport,
                breakpoint,
                anchor,
                wheel: Vec::new(),
                exclusions: ExclusionSet::default(),
                active: None,
                panel: None,
            },
            observers: Vec::new(),
            destroyed: false,
        };
        engine.run_pass(Invalidation::ALL);
        engine
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn snapshot(&self) -> &LayoutSnapshot {
        &self.layout
    }

    pub fn active_panel(&self) -> Option<&TriggerId> {
        self.active.as_ref()
    }

    pub fn is_mobile(&self) -> bool {
        self.layout.breakpoint.mobile
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    pub fn has_pending_pass(&self) -> bool {
        self.scheduler.is_pending()
    }

    pub fn size_cache(&self) -> &SizeCache {
        &self.sizes
    }

    fn knows(&self, id: &TriggerId) -> bool {
        self.specs.iter().any(|s| s.id == *id)
    }

    /// Observers see every completed pass until the engine is destroyed.
    pub fn subscribe(&mut self, observer: impl FnMut(&LayoutSnapshot) + 'static) {
        if !self.destroyed {
            self.observers.push(Box::new(observer));
        }
    }

    pub fn invalidate(&mut self, what: Invalidation) {
        if !self.destroyed {
            self.scheduler.invalidate(&mut self.clock, what);
        }
    }

    /// Runs anything pending plus `what` right now instead of on the next frame.
    /// Meant for the end of an open/close animation, where a one-frame-stale
    /// position would be visible.
    pub fn flush_now(&mut self, what: Invalidation) {
        if self.destroyed {
            return;
        }
        let work = self.scheduler.flush_now(&mut self.clock, what);
        if !work.is_empty() {
            self.run_pass(work);
        }
    }

    /// Delivers a display frame requested through the clock.
    pub fn on_frame(&mut self, ticket: FrameTicket) {
        if self.destroyed {
            return;
        }
        match self.scheduler.take_frame(ticket) {
            Some(work) if !work.is_empty() => self.run_pass(work),
            Some(_) => {}
            None => log::trace!("Ignoring stale frame {}", ticket),
        }
    }

    pub fn reposition(&mut self, anchor: AnchorRect) {
        if self.destroyed {
            return;
        }
        self.anchor = anchor;
        self.invalidate(Invalidation::ALL);
    }

    pub fn reposition_sync(&mut self, anchor: AnchorRect) {
        if self.destroyed {
            return;
        }
        self.anchor = anchor;
        self.flush_now(Invalidation::ALL);
    }

    /// Opens `id`'s panel, or closes it if it is already the active one.
    pub fn toggle_panel(&mut self, id: &TriggerId) {
        if self.destroyed {
            return;
        }
        if !self.knows(id) {
            log::debug!("toggle_panel: unknown trigger '{}'", id);
            return;
        }

        self.active = if self.active.as_ref() == Some(id) {
            None
        } else {
            Some(id.clone())
        };
        self.invalidate(Invalidation::PANEL);
    }

    /// Closes whatever panel is open, without waiting for a frame.
    pub fn collapse_all(&mut self) {
        if self.destroyed || (self.active.is_none() && self.layout.panel.is_none()) {
            return;
        }
        self.active = None;
        self.layout.active = None;
        self.layout.panel = None;
        self.notify_observers();
    }

    pub fn wheel_anchor(&self, id: &TriggerId) -> Option<&WheelAnchor> {
        self.layout.wheel.iter().find(|a| a.id == *id)
    }

    /// Placement of `id`'s panel from the last pass; `None` unless it is the active panel.
    pub fn panel_placement(&self, id: &TriggerId) -> Option<&PanelPlacement> {
        self.layout
            .panel
            .as_ref()
            .filter(|p| p.id == *id && self.active.as_ref() == Some(id))
    }

    /// The panel's or trigger's rendered content changed size.
    pub fn notify_content_changed(&mut self, id: &TriggerId) {
        if self.destroyed {
            return;
        }
        if !self.knows(id) {
            log::debug!("notify_content_changed: unknown trigger '{}'", id);
            return;
        }
        self.sizes.invalidate(&SizeKey::Panel(id.clone()));
        self.sizes.invalidate(&SizeKey::Trigger(id.clone()));
        self.invalidate(Invalidation::ALL);
    }

    pub fn notify_viewport_changed(&mut self) {
        if self.destroyed {
            return;
        }
        self.sizes.invalidate_all();
        self.invalidate(Invalidation::ALL);
    }

    /// Cancels pending work and drops observers. Every later call is a no-op.
    pub fn destroy(&mut self) {
        if self.destroyed {
            return;
        }
        self.scheduler.cancel_pending(&mut self.clock);
        self.observers.clear();
        self.active = None;
        self.destroyed = true;
        log::debug!("engine destroyed after {} passes", self.layout.pass);
    }

    fn run_pass(&mut self, mut work: Invalidation) {
        let viewport = self.host.viewport();
        let breakpoint = self
            .host
            .breakpoint(&viewport)
            .unwrap_or_else(|| Breakpoint::classify(&viewport, &self.settings.breakpoint));

        if breakpoint != self.layout.breakpoint {
            log::debug!(
                "breakpoint changed (mobile {} -> {}), dropping cached sizes",
                self.layout.breakpoint.mobile,
                breakpoint.mobile
            );
            self.sizes.invalidate_all();
            work = Invalidation::ALL;
        }
        // New trigger footprints move the exclusion zones an open panel was placed against.
        if work.wheel && self.active.is_some() {
            work.panel = true;
        }

        self.layout.pass += 1;
        self.layout.viewport = viewport;
        self.layout.breakpoint = breakpoint;
        self.layout.anchor = self.anchor;

        if work.wheel {
            self.layout.wheel = self.compute_wheel(breakpoint);
            self.layout.exclusions = ExclusionSet::build(
                &self.anchor,
                &self.layout.wheel,
                breakpoint.scale,
                self.settings.wheel.hub_min_radius,
            );
        }
        if work.panel {
            self.layout.active = self.active.clone();
            self.layout.panel = self.compute_panel(viewport, breakpoint);
        }

        log::debug!(
            "layout pass {} (wheel: {}, panel: {}) active={:?}",
            self.layout.pass,
            work.wheel,
            work.panel,
            self.layout.active
        );
        self.notify_observers();
    }

    fn compute_wheel(&mut self, breakpoint: Breakpoint) -> Vec<WheelAnchor> {
        let sizes = &mut self.sizes;
        let host = &self.host;
        position_wheel(
            &self.specs,
            self.anchor.center(),
            self.settings.wheel.radius,
            breakpoint.scale,
            self.settings.wheel.trigger_size,
            |id| sizes.lookup(&SizeKey::Trigger(id.clone()), |key| host.measure(key)),
        )
    }

    fn compute_panel(
        &mut self,
        viewport: ViewportInfo,
        breakpoint: Breakpoint,
    ) -> Option<PanelPlacement> {
        let id = self.active.clone()?;
        let anchor = self.layout.wheel.iter().find(|a| a.id == id)?;

        let host = &self.host;
        let size = self.sizes.get_size(
            &SizeKey::Panel(id.clone()),
            self.settings.panel.min_size,
            |key| host.measure(key),
        );

        let result = place(
            &PlacementRequest {
                anchor,
                hub: &self.anchor,
                exclusions: &self.layout.exclusions,
                panel: size,
                viewport,
                breakpoint,
            },
            &self.settings,
        );
        let presentation = Presentation::for_placement(&result, breakpoint.mobile);
        if presentation == Presentation::Sheet {
            log::debug!("panel '{}' has no clear side, presenting as sheet", id);
        }

        Some(PanelPlacement {
            id,
            size,
            result,
            presentation,
        })
    }

    fn notify_observers(&mut self) {
        let layout = &self.layout;
        for observer in &mut self.observers {
            observer(layout);
        }
    }
}

impl<H: LayoutHost, C: FrameClock> Drop for Engine<H, C> {
    fn drop(&mut self) {
        self.destroy();
    }
}
