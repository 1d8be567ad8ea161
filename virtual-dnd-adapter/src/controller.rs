use alloc::vec::Vec;
use core::cmp;

use virtual_dnd::{
    ConfigChange, ItemKey, KeyPath, KeySource, Range, RateLimiter, ScrollEvent, Viewport,
    Virtual, VirtualOption,
};

use crate::{
    AddEvent, ChangeEvent, ChooseEvent, DragStartEvent, DragStore, DropEvent, DropParams,
    ItemEvent, ListOptions, OnEdgeCallback, OnModelChangeCallback, OnRangeChangeCallback,
    RemoveEvent, Sortable, SortableChange, SortableOptions,
};

/// Quiet period before a reached-top / reached-bottom signal is reported.
pub const EDGE_DEBOUNCE_MS: u64 = 50;

/// A framework-neutral list view: the windowing engine and the drag adapter wired to one model.
///
/// This type holds no UI objects. Adapters drive it by calling:
/// - `set_model` when the host replaces the list, reading `render_list` and `range` back
/// - `on_size_change` for every rendered row's measured size
/// - `on_scroll` on scroll notifications and `tick(now_ms)` from a timer/frame loop
/// - the `on_choose` .. `on_drop` family for drag provider events
///
/// A drop that changes the list commits it as the new model and fires `on_model_change`.
pub struct VirtualDndList<T, V> {
    v: Virtual<V>,
    sortable: Sortable<T>,
    model: Vec<T>,
    key_path: KeyPath,
    range: Range,
    dragging: bool,
    sortable_enabled: bool,
    keep_offset: bool,
    /// Model length when the last reached-top signal fired; 0 when none is pending.
    last_length: usize,
    prev_length: usize,
    top: RateLimiter,
    bottom: RateLimiter,
    on_model_change: Option<OnModelChangeCallback<T>>,
    on_top: Option<OnEdgeCallback>,
    on_bottom: Option<OnEdgeCallback>,
    on_range_change: Option<OnRangeChangeCallback>,
}

impl<T: Clone + KeySource, V: Viewport> VirtualDndList<T, V> {
    pub fn new(options: ListOptions<T>, model: Vec<T>, scroller: Option<V>) -> Self {
        let ListOptions {
            container,
            key_path,
            keep_offset,
            sortable,
            virtual_options,
            sortable_options,
            on_model_change,
            on_top,
            on_bottom,
            on_range_change,
        } = options;

        let keys = resolve_keys(&key_path, &model);
        let v = Virtual::new(virtual_options.with_unique_keys(keys), scroller);
        let range = v.range();
        Self {
            v,
            sortable: Sortable::new(container, key_path.clone(), sortable_options, model.clone()),
            prev_length: model.len(),
            model,
            key_path,
            range,
            dragging: false,
            sortable_enabled: sortable,
            keep_offset,
            last_length: 0,
            top: RateLimiter::debounce(EDGE_DEBOUNCE_MS),
            bottom: RateLimiter::debounce(EDGE_DEBOUNCE_MS),
            on_model_change,
            on_top,
            on_bottom,
            on_range_change,
        }
    }

    pub fn virtual_list(&self) -> &Virtual<V> {
        &self.v
    }

    pub fn virtual_list_mut(&mut self) -> &mut Virtual<V> {
        &mut self.v
    }

    pub fn sortable(&self) -> &Sortable<T> {
        &self.sortable
    }

    pub fn model(&self) -> &[T] {
        &self.model
    }

    /// Replaces the list.
    ///
    /// Rebuilds the key sequence, keeps the window pinned to the end when the list grows while
    /// scrolled to the bottom, and (with `keep_offset`) keeps the viewport on the same row when
    /// items were prepended after a reached-top signal.
    pub fn set_model(&mut self, model: Vec<T>, now_ms: u64) {
        self.model = model;
        let keys = resolve_keys(&self.key_path, &self.model);
        self.v.set_unique_keys(keys);
        self.sortable.set_list(self.model.clone());
        if !self.detect_range_update() {
            // Same length, new order: the spacers follow the new key order.
            self.v.update_range(None);
        }

        if self.keep_offset && self.last_length > 0 {
            let added = self.model.len().saturating_sub(self.last_length);
            if added > 0 {
                vdebug!(added, "keep_offset: scrolling to the previous first row");
                self.v.scroll_to_index(added, now_ms);
            }
            self.last_length = 0;
        }

        self.prev_length = self.model.len();
        self.sync_range();
    }

    /// The current window.
    pub fn range(&self) -> Range {
        self.range
    }

    /// The items to render: `model[start..=end]`.
    pub fn render_list(&self) -> &[T] {
        let Some(last) = self.model.len().checked_sub(1) else {
            return &[];
        };
        let end = cmp::min(self.range.end, last);
        let start = cmp::min(self.range.start, end);
        &self.model[start..=end]
    }

    /// Whether the mounted row with `key` must be hidden (it is being dragged).
    pub fn item_hidden(&self, key: &ItemKey) -> bool {
        self.dragging && self.sortable.chosen_key() == Some(key)
    }

    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    pub fn is_sortable(&self) -> bool {
        self.sortable_enabled
    }

    /// Enables or disables drag handling; while disabled every drag event is ignored.
    pub fn set_sortable(&mut self, enabled: bool) {
        self.sortable_enabled = enabled;
    }

    pub fn set_keep_offset(&mut self, keep_offset: bool) {
        self.keep_offset = keep_offset;
    }

    /// Call this with every rendered row's measured size.
    ///
    /// Sizes of the pressed row are ignored (it is hidden while dragged). The window is refreshed
    /// once every row of the initial render has reported.
    pub fn on_size_change(&mut self, key: ItemKey, size: u32) {
        if self.sortable.chosen_key() == Some(&key) {
            return;
        }
        let measured = self.v.size_tracker().len();
        let renders = cmp::min(self.v.options().keeps, self.model.len());
        self.v.on_item_resized(key, size);
        if renders > 0 && measured == renders - 1 {
            self.v.update_range(Some(self.range));
        }
        self.sync_range();
    }

    /// Call this when the scroller reports a scroll.
    pub fn on_scroll(&mut self, now_ms: u64) -> Option<ScrollEvent> {
        let event = self.v.on_scroll_event(now_ms);
        if let Some(e) = event {
            self.handle_scroll_event(e, now_ms);
        }
        self.sync_range();
        event
    }

    /// Advances deferred work: rate-limited scroll handling, scroll-to-bottom settling and the
    /// debounced edge signals.
    pub fn tick(&mut self, now_ms: u64) -> Option<ScrollEvent> {
        let event = self.v.tick(now_ms);
        if let Some(e) = event {
            self.handle_scroll_event(e, now_ms);
        }
        if self.top.poll(now_ms) {
            vdebug!("reached top");
            self.last_length = self.model.len();
            if let Some(cb) = &self.on_top {
                cb();
            }
        }
        if self.bottom.poll(now_ms) {
            vdebug!("reached bottom");
            if let Some(cb) = &self.on_bottom {
                cb();
            }
        }
        self.sync_range();
        event
    }

    /// When [`Self::tick`] next has work to do, if any.
    pub fn next_tick_ms(&self) -> Option<u64> {
        [self.v.next_tick_ms(), self.top.due_ms(), self.bottom.due_ms()]
            .into_iter()
            .flatten()
            .min()
    }

    /// Measured size of `key`, or the current estimate.
    pub fn size_of(&self, key: &ItemKey) -> u32 {
        self.v.size_of(key)
    }

    pub fn offset(&self) -> u64 {
        self.v.offset()
    }

    pub fn scroll_size(&self) -> u64 {
        self.v.scroll_size()
    }

    pub fn client_size(&self) -> u64 {
        self.v.client_size()
    }

    pub fn scroll_to_offset(&mut self, offset: u64) {
        self.v.scroll_to_offset(offset);
    }

    pub fn scroll_to_index(&mut self, index: usize, now_ms: u64) {
        self.v.scroll_to_index(index, now_ms);
    }

    /// Returns `false` if `key` is not in the model.
    pub fn scroll_to_key(&mut self, key: &ItemKey, now_ms: u64) -> bool {
        self.v.scroll_to_key(key, now_ms)
    }

    pub fn scroll_to_bottom(&mut self, now_ms: u64) {
        self.v.scroll_to_bottom(now_ms);
    }

    pub fn enable_scroll(&mut self, enable: bool) {
        self.v.enable_scroll(enable);
    }

    pub fn set_scroller(&mut self, scroller: Option<V>) -> Option<V> {
        self.v.set_scroller(scroller)
    }

    /// Live reconfiguration of one engine tunable.
    pub fn option(&mut self, option: VirtualOption) -> ConfigChange {
        let change = self.v.option(option);
        self.sync_range();
        change
    }

    /// Replaces the drag provider options; returns the fields to forward to the provider.
    pub fn set_sortable_options(&mut self, options: SortableOptions) -> SortableChange {
        self.sortable.set_options(options)
    }

    /// Tears the view down: stops listening to the scroller and drops any pending signal.
    pub fn destroy(&mut self) {
        self.v.remove_scroll_listener();
        self.top.cancel();
        self.bottom.cancel();
    }

    /// The in-flight drag record, for a peer list's `on_add` / `on_drop`.
    pub fn store(&self) -> Option<&DragStore<T>> {
        self.sortable.store()
    }

    pub fn on_choose(&mut self, event: &ChooseEvent) {
        if self.sortable_enabled {
            self.sortable.on_choose(event);
        }
    }

    pub fn on_unchoose(&mut self, event: &ChooseEvent) {
        if self.sortable_enabled {
            self.sortable.on_unchoose(event);
        }
    }

    pub fn on_drag(&mut self, event: &DragStartEvent) -> Option<ItemEvent<T>> {
        if !self.sortable_enabled {
            return None;
        }
        let started = self.sortable.on_drag(event)?;
        self.dragging = true;
        Some(started)
    }

    pub fn on_change(&mut self, event: &ChangeEvent) -> Option<usize> {
        if !self.sortable_enabled {
            return None;
        }
        self.sortable.on_change(event)
    }

    pub fn on_add(&mut self, event: &AddEvent, source: &DragStore<T>) -> Option<ItemEvent<T>> {
        if !self.sortable_enabled {
            return None;
        }
        self.sortable.on_add(event, source)
    }

    pub fn on_remove(&mut self, event: &RemoveEvent) -> Option<ItemEvent<T>> {
        if !self.sortable_enabled {
            return None;
        }
        self.sortable.on_remove(event)
    }

    /// Ends the gesture. A changed list is committed as the new model.
    ///
    /// `peer` is the other list's drag record in a cross-container drop.
    pub fn on_drop(
        &mut self,
        params: &DropParams,
        peer: Option<&DragStore<T>>,
        now_ms: u64,
    ) -> Option<DropEvent<T>> {
        if !self.sortable_enabled {
            return None;
        }
        self.dragging = false;
        let event = self.sortable.on_drop(params, peer)?;
        if event.changed {
            self.set_model(event.list.clone(), now_ms);
            if let Some(cb) = &self.on_model_change {
                cb(&self.model);
            }
        }
        Some(event)
    }

    /// Drops a cross-container gesture on both lists. Returns `(source_event, target_event)`.
    pub fn drop_across(
        source: &mut Self,
        target: &mut Self,
        params: &DropParams,
        now_ms: u64,
    ) -> (Option<DropEvent<T>>, Option<DropEvent<T>>) {
        let source_store = source.store().cloned();
        let target_store = target.store().cloned();
        (
            source.on_drop(params, target_store.as_ref(), now_ms),
            target.on_drop(params, source_store.as_ref(), now_ms),
        )
    }

    fn handle_scroll_event(&mut self, event: ScrollEvent, now_ms: u64) {
        self.last_length = 0;
        if event.top {
            self.top.call(now_ms);
        }
        if event.bottom {
            self.bottom.call(now_ms);
        }
    }

    /// Adopts a window for the new model length. When the list grew while the window was pinned
    /// to the old end and the viewport sat at the bottom, the window follows the new end.
    ///
    /// Returns `false` when the length is unchanged and nothing was adopted.
    fn detect_range_update(&mut self) -> bool {
        let len = self.model.len();
        let prev = self.prev_length;
        if len == prev {
            return false;
        }
        let keeps = self.v.options().keeps;
        let mut start = self.range.start;
        if prev > keeps && len > prev && self.range.end == prev - 1 && self.v.is_at_bottom() {
            start += 1;
        }

        let last = match len {
            0 => keeps.saturating_sub(1),
            n => n - 1,
        };
        let (start, end) = if len <= keeps {
            (0, last)
        } else {
            let end = cmp::min(start.saturating_add(keeps).saturating_sub(1), last);
            if end.saturating_sub(start) < keeps.saturating_sub(1) || start > end {
                ((end + 1).saturating_sub(keeps), end)
            } else {
                (start, end)
            }
        };
        vtrace!(prev, len, start, end, "model length changed");
        self.v.update_range(Some(Range {
            start,
            end,
            ..Range::default()
        }));
        true
    }

    fn sync_range(&mut self) {
        let range = self.v.range();
        if range.start != self.range.start {
            if self.dragging {
                self.sortable.set_range_changed(true);
            }
            if let Some(cb) = &self.on_range_change {
                cb(range);
            }
        }
        self.range = range;
    }
}

fn resolve_keys<T: KeySource>(path: &KeyPath, model: &[T]) -> Vec<ItemKey> {
    model
        .iter()
        .enumerate()
        .map(|(i, item)| {
            path.resolve(item).unwrap_or_else(|| {
                vwarn!(index = i, path = %path, "item has no key; using its index");
                ItemKey::from(i)
            })
        })
        .collect()
}

impl<T: core::fmt::Debug, V: core::fmt::Debug> core::fmt::Debug for VirtualDndList<T, V> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("VirtualDndList")
            .field("v", &self.v)
            .field("sortable", &self.sortable)
            .field("model", &self.model.len())
            .field("range", &self.range)
            .field("dragging", &self.dragging)
            .field("sortable_enabled", &self.sortable_enabled)
            .field("keep_offset", &self.keep_offset)
            .finish_non_exhaustive()
    }
}
