//! Scroll/resize adapter for the `iron-list-core` windowing engine.
//!
//! `iron-list-core` is host-agnostic bookkeeping. This crate binds it to a
//! real element pool and scroll container through two small traits:
//!
//! - [`RenderHost`]: element creation, population, measurement, positioning,
//!   and the scroll container surface
//! - [`PlatformQuirks`]: platform-specific scroll behavior (wheel units,
//!   inertial scrolling), no-op by default
//!
//! On top of those it implements the behaviors a production list widget
//! needs: position-preserving size changes, zero-height placeholder sizing,
//! wheel handling, focus-preserving element reordering, invalid-position
//! repair, and a large-range index remapper for item counts past the safe
//! rendering ceiling.
//!
//! All deferral is explicit scheduler state driven by the host
//! (`run_frame` / `run_timers` / `run_idle`), or run to completion with
//! `flush()`.
#![cfg_attr(not(feature = "std"), no_std)]
#![forbid(unsafe_code)]

extern crate alloc;

#[cfg(test)]
extern crate std;

#[macro_use]
mod macros;

mod adapter;
mod config;
mod host;
mod quirks;
mod remap;
mod scheduler;
mod wheel;

#[cfg(test)]
mod tests;

pub use adapter::VirtualScroller;
pub use config::ScrollerConfig;
pub use host::{ElementId, RenderHost};
pub use quirks::{NoQuirks, PlatformQuirks};
pub use remap::{AdjustContext, DEFAULT_MAX_VIRTUAL_COUNT, IndexRemap};
pub use wheel::{WheelDeltaMode, WheelEvent};
