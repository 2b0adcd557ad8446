//! Placement engine for a floating radial quick-action control.
//!
//! A hub sits at a host-supplied anchor, a ring of triggers orbits it, and at
//! most one trigger's panel is open. Every layout pass recomputes the trigger
//! positions and finds a spot for the open panel that stays clear of the hub,
//! the triggers, and the viewport edges, falling back to a full-screen sheet
//! on small screens when no such spot exists.

pub mod config;
pub mod engine;
pub mod geometry;
pub mod layout;
pub mod macros;
pub mod scheduler;
pub mod sizes;

pub use config::Settings;
pub use engine::{Engine, LayoutHost, LayoutSnapshot, PanelPlacement};
pub use geometry::{Point, Rect, Size};
pub use layout::{AnchorRect, Breakpoint, Presentation, Side, TriggerId, TriggerSpec, ViewportInfo};
pub use scheduler::{FrameClock, FrameTicket, Invalidation, ManualClock};
