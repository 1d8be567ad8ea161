//! Drag-and-drop reconciliation for `virtual-dnd` lists.
//!
//! The `virtual-dnd` engine decides which rows are mounted. This crate adds the other half of a
//! sortable virtual list, still framework-neutral:
//!
//! - [`Sortable`]: applies drag gesture events (choose, drag, change, add, remove, drop) to a
//!   shadow copy of the full list, locating items by key rather than by mount position
//! - [`VirtualDndList`]: one model wired to both the engine and a `Sortable`, with render slicing,
//!   size-change batching, debounced edge signals and drop commits
//!
//! Pointer handling itself belongs to an external drag provider; [`SortableOptions`] is the
//! configuration handed through to it.
#![cfg_attr(not(feature = "std"), no_std)]
#![forbid(unsafe_code)]

extern crate alloc;

#[cfg(test)]
extern crate std;

#[macro_use]
mod macros;

mod controller;
mod event;
mod options;
mod sortable;


pub use controller::{EDGE_DEBOUNCE_MS, VirtualDndList};
pub use event::{
    AddEvent, ChangeEvent, ChooseEvent, ContainerId, DragStartEvent, DragStore, DropEvent,
    DropParams, ItemEvent, Location, PullMode, Relative, RemoveEvent,
};
pub use options::{
    Group, ListOptions, LockAxis, OnEdgeCallback, OnModelChangeCallback, OnRangeChangeCallback,
    ScrollSpeed, SortableChange, SortableOptions,
};
pub use sortable::{Sortable, drop_across};
