use alloc::string::{String, ToString};
use alloc::sync::Arc;

use virtual_dnd::{KeyPath, VirtualOptions};

use crate::{ContainerId, PullMode};

/// Fired when a drop commits a new model.
pub type OnModelChangeCallback<T> = Arc<dyn Fn(&[T]) + Send + Sync>;

/// Fired for the debounced reached-top / reached-bottom signals.
pub type OnEdgeCallback = Arc<dyn Fn() + Send + Sync>;

/// Fired when the mounted window moves (`start` changed).
pub type OnRangeChangeCallback = Arc<dyn Fn(virtual_dnd::Range) + Send + Sync>;

/// Restricts dragging to one axis.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum LockAxis {
    X,
    Y,
}

/// Cross-container rules: lists sharing a group name can exchange items.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Group {
    pub name: String,
    /// How items may leave this list; `None` keeps them in.
    pub pull: Option<PullMode>,
    /// Whether items from other lists may be dropped here.
    pub put: bool,
    /// Send the item back to its origin when it leaves a list it cannot be put into.
    pub revert_drag: bool,
}

impl Group {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            pull: Some(PullMode::Move),
            put: true,
            revert_drag: false,
        }
    }

    pub fn with_pull(mut self, pull: Option<PullMode>) -> Self {
        self.pull = pull;
        self
    }

    pub fn with_put(mut self, put: bool) -> Self {
        self.put = put;
        self
    }

    pub fn with_revert_drag(mut self, revert_drag: bool) -> Self {
        self.revert_drag = revert_drag;
        self
    }
}

impl From<&str> for Group {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

/// Autoscroll speed near the scroller edges, per axis.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScrollSpeed {
    pub x: u32,
    pub y: u32,
}

impl Default for ScrollSpeed {
    fn default() -> Self {
        Self { x: 10, y: 10 }
    }
}

/// Configuration handed through to the drag gesture provider.
///
/// The adapter reads only `disabled`; everything else is forwarded verbatim.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SortableOptions {
    /// Press duration before a drag starts.
    pub delay: u64,
    pub group: Option<Group>,
    /// Selector of the drag handle inside a row.
    pub handle: Option<String>,
    pub lock_axis: Option<LockAxis>,
    pub disabled: bool,
    /// Selector of the draggable rows.
    pub draggable: String,
    /// Reorder animation duration.
    pub animation: u64,
    pub auto_scroll: bool,
    pub scroll_speed: ScrollSpeed,
    pub ghost_class: String,
    pub chosen_class: String,
    pub placeholder_class: String,
    pub fallback_on_body: bool,
    /// Distance from the scroller edge at which autoscroll kicks in.
    pub scroll_threshold: u32,
    pub delay_on_touch_only: bool,
}

impl Default for SortableOptions {
    fn default() -> Self {
        Self {
            delay: 0,
            group: None,
            handle: None,
            lock_axis: None,
            disabled: false,
            draggable: ".virtual-dnd-list-item".to_string(),
            animation: 150,
            auto_scroll: true,
            scroll_speed: ScrollSpeed::default(),
            ghost_class: String::new(),
            chosen_class: String::new(),
            placeholder_class: String::new(),
            fallback_on_body: false,
            scroll_threshold: 55,
            delay_on_touch_only: false,
        }
    }
}

impl SortableOptions {
    pub fn with_delay(mut self, delay: u64) -> Self {
        self.delay = delay;
        self
    }

    pub fn with_group(mut self, group: impl Into<Group>) -> Self {
        self.group = Some(group.into());
        self
    }

    pub fn with_handle(mut self, handle: impl Into<String>) -> Self {
        self.handle = Some(handle.into());
        self
    }

    pub fn with_lock_axis(mut self, lock_axis: Option<LockAxis>) -> Self {
        self.lock_axis = lock_axis;
        self
    }

    pub fn with_disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }

    pub fn with_animation(mut self, animation: u64) -> Self {
        self.animation = animation;
        self
    }

    pub fn with_auto_scroll(mut self, auto_scroll: bool) -> Self {
        self.auto_scroll = auto_scroll;
        self
    }

    /// Reports which passthrough fields differ, so a host can forward only those.
    pub fn diff(old: &Self, new: &Self) -> SortableChange {
        SortableChange {
            delay: old.delay != new.delay,
            group: old.group != new.group,
            handle: old.handle != new.handle,
            lock_axis: old.lock_axis != new.lock_axis,
            disabled: old.disabled != new.disabled,
            draggable: old.draggable != new.draggable,
            animation: old.animation != new.animation,
            auto_scroll: old.auto_scroll != new.auto_scroll,
            scroll_speed: old.scroll_speed != new.scroll_speed,
            ghost_class: old.ghost_class != new.ghost_class,
            chosen_class: old.chosen_class != new.chosen_class,
            placeholder_class: old.placeholder_class != new.placeholder_class,
            fallback_on_body: old.fallback_on_body != new.fallback_on_body,
            scroll_threshold: old.scroll_threshold != new.scroll_threshold,
            delay_on_touch_only: old.delay_on_touch_only != new.delay_on_touch_only,
        }
    }
}

/// Which [`SortableOptions`] fields changed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SortableChange {
    pub delay: bool,
    pub group: bool,
    pub handle: bool,
    pub lock_axis: bool,
    pub disabled: bool,
    pub draggable: bool,
    pub animation: bool,
    pub auto_scroll: bool,
    pub scroll_speed: bool,
    pub ghost_class: bool,
    pub chosen_class: bool,
    pub placeholder_class: bool,
    pub fallback_on_body: bool,
    pub scroll_threshold: bool,
    pub delay_on_touch_only: bool,
}

impl SortableChange {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Configuration for [`crate::VirtualDndList`].
pub struct ListOptions<T> {
    /// This list's id towards the drag provider.
    pub container: ContainerId,
    /// Path from an item to its key.
    pub key_path: KeyPath,
    /// After a reached-top signal, keep the viewport on the same row when items are prepended.
    pub keep_offset: bool,
    /// When `false`, every drag event is ignored.
    pub sortable: bool,
    pub virtual_options: VirtualOptions,
    pub sortable_options: SortableOptions,
    pub on_model_change: Option<OnModelChangeCallback<T>>,
    pub on_top: Option<OnEdgeCallback>,
    pub on_bottom: Option<OnEdgeCallback>,
    pub on_range_change: Option<OnRangeChangeCallback>,
}

impl<T> Clone for ListOptions<T> {
    fn clone(&self) -> Self {
        Self {
            container: self.container,
            key_path: self.key_path.clone(),
            keep_offset: self.keep_offset,
            sortable: self.sortable,
            virtual_options: self.virtual_options.clone(),
            sortable_options: self.sortable_options.clone(),
            on_model_change: self.on_model_change.clone(),
            on_top: self.on_top.clone(),
            on_bottom: self.on_bottom.clone(),
            on_range_change: self.on_range_change.clone(),
        }
    }
}

impl<T> core::fmt::Debug for ListOptions<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ListOptions")
            .field("container", &self.container)
            .field("key_path", &self.key_path)
            .field("keep_offset", &self.keep_offset)
            .field("sortable", &self.sortable)
            .field("virtual_options", &self.virtual_options)
            .field("sortable_options", &self.sortable_options)
            .finish_non_exhaustive()
    }
}

impl<T> ListOptions<T> {
    pub fn new(container: ContainerId, key_path: impl Into<KeyPath>) -> Self {
        Self {
            container,
            key_path: key_path.into(),
            keep_offset: false,
            sortable: true,
            virtual_options: VirtualOptions::default(),
            sortable_options: SortableOptions::default(),
            on_model_change: None,
            on_top: None,
            on_bottom: None,
            on_range_change: None,
        }
    }

    pub fn with_keep_offset(mut self, keep_offset: bool) -> Self {
        self.keep_offset = keep_offset;
        self
    }

    pub fn with_sortable(mut self, sortable: bool) -> Self {
        self.sortable = sortable;
        self
    }

    pub fn with_virtual_options(mut self, options: VirtualOptions) -> Self {
        self.virtual_options = options;
        self
    }

    pub fn with_sortable_options(mut self, options: SortableOptions) -> Self {
        self.sortable_options = options;
        self
    }

    pub fn with_on_model_change(
        mut self,
        f: Option<impl Fn(&[T]) + Send + Sync + 'static>,
    ) -> Self {
        self.on_model_change = f.map(|f| Arc::new(f) as _);
        self
    }

    pub fn with_on_top(mut self, f: Option<impl Fn() + Send + Sync + 'static>) -> Self {
        self.on_top = f.map(|f| Arc::new(f) as _);
        self
    }

    pub fn with_on_bottom(mut self, f: Option<impl Fn() + Send + Sync + 'static>) -> Self {
        self.on_bottom = f.map(|f| Arc::new(f) as _);
        self
    }

    pub fn with_on_range_change(
        mut self,
        f: Option<impl Fn(virtual_dnd::Range) + Send + Sync + 'static>,
    ) -> Self {
        self.on_range_change = f.map(|f| Arc::new(f) as _);
        self
    }
}
