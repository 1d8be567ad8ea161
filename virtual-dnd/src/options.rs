use alloc::sync::Arc;
use alloc::vec::Vec;

use crate::{Axis, ItemKey, Range, ScrollEvent};

/// Fired on every handled scroll event (after rate limiting).
pub type OnScrollCallback = Arc<dyn Fn(ScrollEvent) + Send + Sync>;

/// Fired whenever the engine emits a new [`Range`].
pub type OnUpdateCallback = Arc<dyn Fn(Range) + Send + Sync>;

/// Default hysteresis for a window of `keeps` items: `round(keeps / 3)`.
pub fn default_buffer(keeps: usize) -> usize {
    (keeps + 1) / 3
}

/// Configuration for [`crate::Virtual`].
///
/// Cheap to clone: the key sequence and callbacks are shared through `Arc`s, so hosts can tweak
/// a field and hand the options back to `Virtual::set_options`.
pub struct VirtualOptions {
    /// Size assumed for unmeasured items until an average is known.
    pub size: u32,
    /// Number of items kept mounted.
    pub keeps: usize,
    /// Index slack before the window shifts while scrolling.
    pub buffer: usize,
    pub direction: Axis,
    pub debounce_time: u64,
    pub throttle_time: u64,
    /// Where the list starts inside the scroller (headers, wrapper offset).
    pub scroll_margin: u64,
    /// Keys of the backing list, in list order.
    pub unique_keys: Arc<[ItemKey]>,
    pub on_scroll: Option<OnScrollCallback>,
    pub on_update: Option<OnUpdateCallback>,
}

impl Clone for VirtualOptions {
    fn clone(&self) -> Self {
        Self {
            size: self.size,
            keeps: self.keeps,
            buffer: self.buffer,
            direction: self.direction,
            debounce_time: self.debounce_time,
            throttle_time: self.throttle_time,
            scroll_margin: self.scroll_margin,
            unique_keys: Arc::clone(&self.unique_keys),
            on_scroll: self.on_scroll.clone(),
            on_update: self.on_update.clone(),
        }
    }
}

impl Default for VirtualOptions {
    fn default() -> Self {
        Self::new(30)
    }
}

impl VirtualOptions {
    pub fn new(keeps: usize) -> Self {
        Self {
            size: 0,
            keeps,
            buffer: default_buffer(keeps),
            direction: Axis::Vertical,
            debounce_time: 0,
            throttle_time: 0,
            scroll_margin: 0,
            unique_keys: Arc::from(Vec::new()),
            on_scroll: None,
            on_update: None,
        }
    }

    pub fn with_size(mut self, size: u32) -> Self {
        self.size = size;
        self
    }

    /// Sets `keeps` and resets `buffer` to its default for the new window width.
    pub fn with_keeps(mut self, keeps: usize) -> Self {
        self.keeps = keeps;
        self.buffer = default_buffer(keeps);
        self
    }

    pub fn with_buffer(mut self, buffer: usize) -> Self {
        self.buffer = buffer;
        self
    }

    pub fn with_direction(mut self, direction: Axis) -> Self {
        self.direction = direction;
        self
    }

    pub fn with_debounce_time(mut self, debounce_time: u64) -> Self {
        self.debounce_time = debounce_time;
        self
    }

    pub fn with_throttle_time(mut self, throttle_time: u64) -> Self {
        self.throttle_time = throttle_time;
        self
    }

    pub fn with_scroll_margin(mut self, scroll_margin: u64) -> Self {
        self.scroll_margin = scroll_margin;
        self
    }

    pub fn with_unique_keys(mut self, keys: impl Into<Arc<[ItemKey]>>) -> Self {
        self.unique_keys = keys.into();
        self
    }

    pub fn with_on_scroll(
        mut self,
        f: Option<impl Fn(ScrollEvent) + Send + Sync + 'static>,
    ) -> Self {
        self.on_scroll = f.map(|f| Arc::new(f) as _);
        self
    }

    pub fn with_on_update(
        mut self,
        f: Option<impl Fn(Range) + Send + Sync + 'static>,
    ) -> Self {
        self.on_update = f.map(|f| Arc::new(f) as _);
        self
    }

    /// Enumerates what differs between `old` and `new`.
    pub fn diff(old: &Self, new: &Self) -> ConfigChange {
        ConfigChange {
            size: old.size != new.size,
            keeps: old.keeps != new.keeps,
            buffer: old.buffer != new.buffer,
            direction: old.direction != new.direction,
            rate_limit: old.debounce_time != new.debounce_time
                || old.throttle_time != new.throttle_time,
            scroll_margin: old.scroll_margin != new.scroll_margin,
            unique_keys: !Arc::ptr_eq(&old.unique_keys, &new.unique_keys)
                && old.unique_keys != new.unique_keys,
            callbacks: !opt_arc_eq(&old.on_scroll, &new.on_scroll)
                || !opt_arc_eq(&old.on_update, &new.on_update),
        }
    }

    /// Applies a single tunable.
    pub fn apply(&mut self, option: VirtualOption) {
        match option {
            VirtualOption::Size(v) => self.size = v,
            VirtualOption::Keeps(v) => self.keeps = v,
            VirtualOption::Buffer(v) => self.buffer = v,
            VirtualOption::Direction(v) => self.direction = v,
            VirtualOption::DebounceTime(v) => self.debounce_time = v,
            VirtualOption::ThrottleTime(v) => self.throttle_time = v,
            VirtualOption::ScrollMargin(v) => self.scroll_margin = v,
            VirtualOption::UniqueKeys(v) => self.unique_keys = v,
        }
    }
}

fn opt_arc_eq<T: ?Sized>(a: &Option<Arc<T>>, b: &Option<Arc<T>>) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => Arc::ptr_eq(a, b),
        (None, None) => true,
        _ => false,
    }
}

impl core::fmt::Debug for VirtualOptions {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("VirtualOptions")
            .field("size", &self.size)
            .field("keeps", &self.keeps)
            .field("buffer", &self.buffer)
            .field("direction", &self.direction)
            .field("debounce_time", &self.debounce_time)
            .field("throttle_time", &self.throttle_time)
            .field("scroll_margin", &self.scroll_margin)
            .field("unique_keys", &self.unique_keys.len())
            .finish_non_exhaustive()
    }
}

/// One live-reconfigurable tunable, for [`crate::Virtual::option`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum VirtualOption {
    Size(u32),
    Keeps(usize),
    Buffer(usize),
    Direction(Axis),
    DebounceTime(u64),
    ThrottleTime(u64),
    ScrollMargin(u64),
    UniqueKeys(Arc<[ItemKey]>),
}

/// Which tunables changed between two [`VirtualOptions`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ConfigChange {
    /// Default item size: re-estimate unmeasured items.
    pub size: bool,
    /// Window width: recompute `end`.
    pub keeps: bool,
    pub buffer: bool,
    /// Axis: reset direction tracking and re-read the offset.
    pub direction: bool,
    /// Debounce or throttle time: rebuild the rate limiter.
    pub rate_limit: bool,
    pub scroll_margin: bool,
    /// Key sequence: prune sizes and rebuild prefix sums.
    pub unique_keys: bool,
    pub callbacks: bool,
}

impl ConfigChange {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Whether the emitted range must be recomputed after this change.
    pub fn affects_range(&self) -> bool {
        self.size || self.keeps || self.buffer
    }
}
