//! Windowed-rendering metrics core.
//!
//! This crate is the bookkeeping half of a list virtualization engine: it maps
//! a bounded pool of recyclable "physical" slots onto an unbounded "virtual"
//! index range, decides which slots to recycle as the scroll position moves,
//! and estimates the total scrollable extent from a running average of sampled
//! slot sizes without measuring every item.
//!
//! It is host-agnostic. An adapter layer (see the `iron-list-adapter` crate)
//! is expected to provide:
//! - element creation/population/measurement
//! - the real scroll container and its events
//! - task scheduling (frame, idle, timers)
#![cfg_attr(not(feature = "std"), no_std)]
#![forbid(unsafe_code)]

extern crate alloc;

#[cfg(test)]
extern crate std;

#[macro_use]
mod macros;

mod config;
mod list;
mod types;


pub use config::CoreConfig;
pub use list::ListCore;
pub use types::{PoolGrowth, ScrollUpdate};
