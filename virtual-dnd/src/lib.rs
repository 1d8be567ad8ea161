//! A headless windowing engine for very large, drag-sortable lists.
//!
//! For drag-and-drop reconciliation and a ready-made list controller, see the
//! `virtual-dnd-adapter` crate.
//!
//! The engine keeps only a small window of items mounted: it learns item sizes as they are
//! measured, classifies the list as fixed- or variable-size, maps scroll offsets to indexes and
//! emits `{start, end, front, behind}` so a host can render `[start, end]` between two spacers
//! that stand in for everything else.
//!
//! It is UI-agnostic. A host is expected to provide:
//! - a [`Viewport`] (scroll offset, scroll extent, client extent)
//! - scroll notifications and the current time (`now_ms`)
//! - rendered item sizes, keyed by [`ItemKey`]
#![cfg_attr(not(feature = "std"), no_std)]
#![forbid(unsafe_code)]

extern crate alloc;

#[cfg(test)]
extern crate std;

#[macro_use]
mod macros;

mod error;
mod fenwick;
mod key;
mod options;
mod rate_limit;
mod sizes;
mod types;
mod viewport;
mod virtual_list;

#[cfg(test)]
mod tests;

pub use error::ResolveError;
pub use key::{ItemKey, KeyPath, KeySource, resolve};
pub use options::{
    ConfigChange, OnScrollCallback, OnUpdateCallback, VirtualOption, VirtualOptions,
    default_buffer,
};
pub use rate_limit::RateLimiter;
pub use sizes::SizeTracker;
pub use types::{Axis, CalcSize, Range, ScrollDirection, ScrollEvent, SizingMode};
pub use viewport::Viewport;
pub use virtual_list::{BOTTOM_SETTLE_INTERVAL_MS, MAX_BOTTOM_RETRIES, Virtual};
