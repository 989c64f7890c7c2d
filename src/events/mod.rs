//! Bootstrap events: phase model and ordered dispatch.
//!
//! This module groups the event **data model** and the **multicaster** used
//! to deliver phase events to the registered observers.
//!
//! ## Contents
//! - [`Phase`], [`PhaseSet`], [`Event`] — phase tags, interest sets, and
//!   per-phase payloads
//! - [`EventMulticaster`] — ordered registry plus the sequential dispatch
//!   loop (fail-fast and contained variants)
//!
//! See `core/mod.rs` for how the orchestrator wires these together.

mod event;
mod multicaster;

pub use event::{BootFailure, Event, Phase, PhaseSet};
pub use multicaster::EventMulticaster;
