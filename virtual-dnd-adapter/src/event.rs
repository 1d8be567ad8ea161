use alloc::vec::Vec;

use virtual_dnd::ItemKey;

/// Identifies one sortable container (one list) for the drag provider.
pub type ContainerId = u64;

/// Where a dropped or moved item lands relative to the target row.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Relative {
    /// Insert before the target.
    Before,
    /// No target: the end of the list.
    #[default]
    End,
    /// Insert after the target.
    After,
}

impl Relative {
    /// Maps the provider's `-1 / 0 / +1` tie-break.
    pub fn from_sign(sign: i32) -> Self {
        match sign.signum() {
            -1 => Self::Before,
            1 => Self::After,
            _ => Self::End,
        }
    }
}

/// Whether a cross-container drag moves the source item or copies it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PullMode {
    #[default]
    Move,
    Clone,
}

/// A position inside a container.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Location {
    pub container: ContainerId,
    pub index: usize,
}

/// Provenance of the dragged element for the duration of one gesture.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DragStore<T> {
    pub item: T,
    pub key: ItemKey,
    /// Where the drag started.
    pub origin: Location,
    /// Where the item was last taken from.
    pub from: Location,
    /// Where the item currently sits.
    pub to: Location,
}

/// Pointer went down on a row (`chosen`) or back up without dragging.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChooseEvent {
    pub key: ItemKey,
}

/// The provider confirmed a drag on the row with `key`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DragStartEvent {
    pub key: ItemKey,
}

/// Reorder inside the container the dragged row currently sits in.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChangeEvent {
    pub node_key: ItemKey,
    /// Row hovered over; `None` when dropping into empty space.
    pub target_key: Option<ItemKey>,
    pub relative: Relative,
    /// The provider moved the row back where it came from; restore the pre-drag list.
    pub revert_drag: bool,
}

/// The dragged row entered this container from another one.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AddEvent {
    pub target_key: Option<ItemKey>,
    pub relative: Relative,
}

/// The dragged row left this container.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RemoveEvent {
    pub key: ItemKey,
    pub pull_mode: PullMode,
}

/// End of the gesture.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DropParams {
    pub from: ContainerId,
    pub to: ContainerId,
    pub pull_mode: PullMode,
    /// The provider cancelled the gesture.
    pub reverted: bool,
}

/// An item taken, added or started dragging at `index`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ItemEvent<T> {
    pub item: T,
    pub key: ItemKey,
    pub index: usize,
}

/// The committed result of a gesture, as seen by one container.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DropEvent<T> {
    pub item: T,
    pub key: ItemKey,
    /// This container's list after the gesture.
    pub list: Vec<T>,
    /// This container's list before the gesture.
    pub old_list: Vec<T>,
    pub from: Location,
    pub to: Location,
    /// `from` and `to` containers differ, or the item moved.
    pub changed: bool,
    /// The window shifted mid-drag; the host should remove the leftover dragged node.
    pub remove_dragged: bool,
    /// Cross-container drop in [`PullMode::Clone`]; the host should remove the provider's clone.
    pub remove_clone: bool,
}

impl<T> DropEvent<T> {
    pub fn old_index(&self) -> usize {
        self.from.index
    }

    pub fn new_index(&self) -> usize {
        self.to.index
    }
}
