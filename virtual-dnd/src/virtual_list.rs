use alloc::sync::Arc;
use core::cmp;

use crate::fenwick::MeasuredPrefix;
use crate::{
    Axis, CalcSize, ConfigChange, ItemKey, Range, RateLimiter, ScrollDirection, ScrollEvent,
    SizeTracker, SizingMode, Viewport, VirtualOption, VirtualOptions,
};

/// Delay between scroll-to-bottom settle checks.
pub const BOTTOM_SETTLE_INTERVAL_MS: u64 = 5;

/// Upper bound on scroll-to-bottom re-issues before giving up on a viewport that never settles.
pub const MAX_BOTTOM_RETRIES: u32 = 40;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct BottomSettle {
    due_ms: u64,
    retries: u32,
}

/// The windowing engine.
///
/// Tracks measured sizes by key, follows the scroll offset of a [`Viewport`] and decides which
/// contiguous index range `[start, end]` should be mounted, together with the spacer extents
/// (`front`/`behind`) that keep the scrollbar geometry of the full list.
///
/// The engine holds no clock and no UI objects. The host:
/// - forwards scroll notifications through [`Virtual::on_scroll_event`],
/// - reports rendered sizes through [`Virtual::on_item_resized`],
/// - calls [`Virtual::tick`] from its timer/frame loop so rate-limited scroll handling and
///   scroll-to-bottom settling can run.
#[derive(Debug)]
pub struct Virtual<V> {
    options: VirtualOptions,
    scroller: Option<V>,
    sizes: SizeTracker,
    prefix: MeasuredPrefix,
    range: Range,
    offset: u64,
    direction: ScrollDirection,
    limiter: RateLimiter,
    bottom: Option<BottomSettle>,
}

impl<V: Viewport> Virtual<V> {
    /// Creates an engine and starts listening to `scroller`, if given.
    ///
    /// The initial window is `[0, keeps - 1]` (clamped to the list); no update is emitted.
    pub fn new(options: VirtualOptions, scroller: Option<V>) -> Self {
        vdebug!(
            keeps = options.keeps,
            buffer = options.buffer,
            count = options.unique_keys.len(),
            "Virtual::new"
        );
        let sizes = SizeTracker::new();
        let prefix = MeasuredPrefix::rebuild(&options.unique_keys, &sizes);
        let limiter = RateLimiter::from_times(options.debounce_time, options.throttle_time);
        let mut v = Self {
            options,
            scroller,
            sizes,
            prefix,
            range: Range::default(),
            offset: 0,
            direction: ScrollDirection::Stationary,
            limiter,
            bottom: None,
        };
        if let Some(s) = v.scroller.as_mut() {
            s.attach();
        }
        let (start, end) = v.clamp_window(0, v.end_by_start(0));
        v.range = v.compute_range(start, end);
        v
    }

    pub fn options(&self) -> &VirtualOptions {
        &self.options
    }

    /// Replaces the options and applies the effect of every changed tunable.
    ///
    /// Returns what changed.
    pub fn set_options(&mut self, options: VirtualOptions) -> ConfigChange {
        let change = VirtualOptions::diff(&self.options, &options);
        self.options = options;
        if change.is_empty() {
            return change;
        }
        vdebug!(?change, "Virtual::set_options");

        if change.unique_keys {
            self.sizes.prune_keys(&self.options.unique_keys);
            self.prefix = MeasuredPrefix::rebuild(&self.options.unique_keys, &self.sizes);
        }
        if change.rate_limit {
            self.limiter =
                RateLimiter::from_times(self.options.debounce_time, self.options.throttle_time);
        }
        if change.direction {
            self.direction = ScrollDirection::Stationary;
            self.offset = self.read_offset();
        }
        if change.affects_range() {
            self.refresh_range();
        }
        change
    }

    /// Clones the current options, applies `f`, then delegates to [`Self::set_options`].
    pub fn update_options(&mut self, f: impl FnOnce(&mut VirtualOptions)) -> ConfigChange {
        let mut next = self.options.clone();
        f(&mut next);
        self.set_options(next)
    }

    /// Live reconfiguration of a single tunable.
    pub fn option(&mut self, option: VirtualOption) -> ConfigChange {
        self.update_options(|o| o.apply(option))
    }

    /// Replaces the key sequence of the backing list. Sizes of vanished keys are dropped.
    pub fn set_unique_keys(&mut self, keys: impl Into<Arc<[ItemKey]>>) -> ConfigChange {
        self.option(VirtualOption::UniqueKeys(keys.into()))
    }

    pub fn scroller(&self) -> Option<&V> {
        self.scroller.as_ref()
    }

    pub fn scroller_mut(&mut self) -> Option<&mut V> {
        self.scroller.as_mut()
    }

    /// Stops listening to the current scroller, starts listening to `scroller`, and returns the
    /// previous one.
    pub fn set_scroller(&mut self, scroller: Option<V>) -> Option<V> {
        let mut prev = core::mem::replace(&mut self.scroller, scroller);
        if let Some(p) = prev.as_mut() {
            p.detach();
        }
        self.limiter.cancel();
        if let Some(s) = self.scroller.as_mut() {
            s.attach();
        }
        vdebug!(
            had_scroller = prev.is_some(),
            has_scroller = self.scroller.is_some(),
            "Virtual::set_scroller"
        );
        prev
    }

    /// Stops listening to the scroller without replacing it.
    pub fn remove_scroll_listener(&mut self) {
        self.limiter.cancel();
        self.bottom = None;
        if let Some(s) = self.scroller.as_mut() {
            s.detach();
        }
    }

    /// Blocks (`false`) or unblocks (`true`) user scrolling on the scroller.
    pub fn enable_scroll(&mut self, enable: bool) {
        if let Some(s) = self.scroller.as_mut() {
            s.set_scroll_locked(!enable);
        }
    }

    pub fn range(&self) -> Range {
        self.range
    }

    pub fn direction(&self) -> ScrollDirection {
        self.direction
    }

    pub fn sizing_mode(&self) -> SizingMode {
        self.sizes.mode()
    }

    pub fn calc_size(&self) -> CalcSize {
        self.sizes.calc_size()
    }

    pub fn size_tracker(&self) -> &SizeTracker {
        &self.sizes
    }

    pub fn unique_keys(&self) -> &[ItemKey] {
        &self.options.unique_keys
    }

    /// Logical list length used by range math.
    pub fn len(&self) -> usize {
        self.options.unique_keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.options.unique_keys.is_empty()
    }

    /// Position of `key` in the key sequence.
    pub fn index_of_key(&self, key: &ItemKey) -> Option<usize> {
        self.prefix.position(key)
    }

    /// Records the rendered size of the item with `key`.
    ///
    /// This does not recompute the range; the host decides when to call [`Self::update_range`]
    /// (typically once all mounted items have reported).
    pub fn on_item_resized(&mut self, key: ItemKey, size: u32) {
        vtrace!(%key, size, "on_item_resized");
        let prev = self.sizes.record_size(key.clone(), size);
        self.prefix.record(&key, size, prev);
    }

    /// Records several sizes at once.
    pub fn on_items_resized(&mut self, sizes: impl IntoIterator<Item = (ItemKey, u32)>) {
        for (key, size) in sizes {
            self.on_item_resized(key, size);
        }
    }

    /// Measured size of `key`, or the current estimate when it was never measured.
    pub fn size_of(&self, key: &ItemKey) -> u32 {
        self.sizes.get(key).unwrap_or_else(|| self.estimate_size())
    }

    /// Best available size for an unmeasured item.
    pub fn estimate_size(&self) -> u32 {
        self.sizes.estimate_size(self.options.size)
    }

    /// Current scroll offset of the scroller (0 without one).
    pub fn offset(&self) -> u64 {
        self.read_offset()
    }

    pub fn scroll_size(&self) -> u64 {
        let axis = self.options.direction;
        self.scroller.as_ref().map_or(0, |s| s.scroll_size(axis))
    }

    pub fn client_size(&self) -> u64 {
        let axis = self.options.direction;
        self.scroller.as_ref().map_or(0, |s| s.client_size(axis))
    }

    pub fn scroll_to_offset(&mut self, offset: u64) {
        let axis = self.options.direction;
        if let Some(s) = self.scroller.as_mut() {
            s.set_offset(axis, offset);
        }
    }

    /// Scrolls so the item at `index` starts at the top of the viewport.
    ///
    /// The last index (and anything past it) scrolls to the bottom instead, which starts the
    /// settle loop driven by [`Self::tick`].
    pub fn scroll_to_index(&mut self, index: usize, now_ms: u64) {
        if index.saturating_add(1) >= self.len() {
            self.scroll_to_bottom(now_ms);
            return;
        }
        let offset = self.offset_of_index(index) + self.options.scroll_margin;
        self.scroll_to_offset(offset);
    }

    /// Scrolls to the item with `key`. Returns `false` if the key is not in the list.
    pub fn scroll_to_key(&mut self, key: &ItemKey, now_ms: u64) -> bool {
        let Some(index) = self.index_of_key(key) else {
            vwarn!(%key, "scroll_to_key: unknown key");
            return false;
        };
        self.scroll_to_index(index, now_ms);
        true
    }

    /// Scrolls to the full scroll extent, then keeps re-checking every
    /// [`BOTTOM_SETTLE_INTERVAL_MS`] (from [`Self::tick`]) until the viewport is within one
    /// pixel of the end, for content that settles after being mounted.
    pub fn scroll_to_bottom(&mut self, now_ms: u64) {
        let extent = self.scroll_size();
        self.scroll_to_offset(extent);
        self.bottom = Some(BottomSettle {
            due_ms: now_ms.saturating_add(BOTTOM_SETTLE_INTERVAL_MS),
            retries: 0,
        });
    }

    pub fn is_settling_bottom(&self) -> bool {
        self.bottom.is_some()
    }

    /// Whether the viewport is scrolled to within one pixel of its end.
    pub fn is_at_bottom(&self) -> bool {
        self.read_offset() + self.client_size() + 1 >= self.scroll_size()
    }

    /// Call this when the scroller reports a scroll. The event goes through the rate limiter;
    /// returns the handled event when it ran right away.
    pub fn on_scroll_event(&mut self, now_ms: u64) -> Option<ScrollEvent> {
        if self.limiter.call(now_ms) {
            Some(self.handle_scroll())
        } else {
            None
        }
    }

    /// Advances deferred work: a rate-limited scroll that came due, and the scroll-to-bottom
    /// settle loop. Returns the scroll event if one was handled.
    pub fn tick(&mut self, now_ms: u64) -> Option<ScrollEvent> {
        let event = self.limiter.poll(now_ms).then(|| self.handle_scroll());
        self.settle_bottom(now_ms);
        event
    }

    /// When the next deferred work is due, if any. Hosts can use it to schedule [`Self::tick`].
    pub fn next_tick_ms(&self) -> Option<u64> {
        match (self.limiter.due_ms(), self.bottom.map(|b| b.due_ms)) {
            (Some(a), Some(b)) => Some(cmp::min(a, b)),
            (a, b) => a.or(b),
        }
    }

    /// Recomputes or adopts the window.
    ///
    /// With `Some(range)`, adopts `range.start`/`range.end` directly (spacers are recomputed) and
    /// always emits. With `None`, recomputes `end` from the current `start` and emits only if the
    /// resulting range differs from the current one.
    pub fn update_range(&mut self, range: Option<Range>) -> Range {
        if let Some(range) = range {
            self.handle_update(range.start, range.end);
            return self.range;
        }
        self.refresh_range();
        self.range
    }

    /// Index of the item containing `offset` (measured from the start of the list).
    ///
    /// Uses `offset / fixed` for uniformly sized lists; otherwise bisects the prefix sums, using
    /// the live measurements and the current estimate for unmeasured items.
    pub fn index_at_offset(&self, offset: u64) -> usize {
        if offset == 0 {
            return 0;
        }
        if let (SizingMode::Fixed, Some(fixed)) = (self.sizes.mode(), self.sizes.calc_size().fixed)
        {
            if fixed > 0 {
                return (offset / fixed as u64) as usize;
            }
        }

        let estimate = self.estimate_size();
        let mut low = 0usize;
        let mut high = self.len();
        while low <= high {
            let middle = low + (high - low) / 2;
            let middle_offset = self.prefix.offset_at(middle, estimate);
            match middle_offset.cmp(&offset) {
                cmp::Ordering::Equal => return middle,
                cmp::Ordering::Less => low = middle + 1,
                cmp::Ordering::Greater => {
                    if middle == 0 {
                        break;
                    }
                    high = middle - 1;
                }
            }
        }
        low.saturating_sub(1)
    }

    /// Summed extent of indexes `[0, index)`.
    pub fn offset_of_index(&self, index: usize) -> u64 {
        if let (SizingMode::Fixed, Some(fixed)) = (self.sizes.mode(), self.sizes.calc_size().fixed)
        {
            return fixed as u64 * index as u64;
        }
        self.prefix.offset_at(index, self.estimate_size())
    }

    /// Index the current scroll offset falls on.
    pub fn scrolled_index(&self) -> usize {
        let offset = self.offset.saturating_sub(self.options.scroll_margin);
        self.index_at_offset(offset)
    }

    fn read_offset(&self) -> u64 {
        let axis = self.options.direction;
        self.scroller.as_ref().map_or(0, |s| s.offset(axis))
    }

    fn handle_scroll(&mut self) -> ScrollEvent {
        let axis: Axis = self.options.direction;
        let (offset, client, scroll) = match self.scroller.as_ref() {
            Some(s) => (s.offset(axis), s.client_size(axis), s.scroll_size(axis)),
            None => (self.offset, 0, 0),
        };

        let direction = match offset.cmp(&self.offset) {
            cmp::Ordering::Equal => ScrollDirection::Stationary,
            cmp::Ordering::Less => ScrollDirection::Front,
            cmp::Ordering::Greater => ScrollDirection::Behind,
        };
        if direction != self.direction {
            vtrace!(?direction, offset, "scroll direction changed");
        }
        self.direction = direction;
        self.offset = offset;

        let event = ScrollEvent {
            top: direction == ScrollDirection::Front && offset == 0,
            bottom: direction == ScrollDirection::Behind
                && client.saturating_add(offset) >= scroll,
            offset,
            direction,
        };
        if let Some(cb) = &self.options.on_scroll {
            cb(event);
        }

        match direction {
            ScrollDirection::Front => self.handle_scroll_front(),
            ScrollDirection::Behind => self.handle_scroll_behind(),
            ScrollDirection::Stationary => {}
        }
        event
    }

    fn handle_scroll_front(&mut self) {
        let scrolls = self.scrolled_index();
        if scrolls > self.range.start {
            return;
        }
        let start = scrolls.saturating_sub(self.options.buffer);
        self.check_if_update(start, self.end_by_start(start));
    }

    fn handle_scroll_behind(&mut self) {
        let scrolls = self.scrolled_index();
        if scrolls < self.range.start.saturating_add(self.options.buffer) {
            return;
        }
        self.check_if_update(scrolls, self.end_by_start(scrolls));
    }

    fn settle_bottom(&mut self, now_ms: u64) {
        let Some(settle) = self.bottom else {
            return;
        };
        if now_ms < settle.due_ms {
            return;
        }
        if self.scroller.is_none() || self.is_at_bottom() {
            self.bottom = None;
            return;
        }
        if settle.retries >= MAX_BOTTOM_RETRIES {
            vwarn!(
                retries = settle.retries,
                "scroll_to_bottom: viewport did not settle; giving up"
            );
            self.bottom = None;
            return;
        }
        vtrace!(retry = settle.retries + 1, "scroll_to_bottom: re-issuing");
        let extent = self.scroll_size();
        self.scroll_to_offset(extent);
        self.bottom = Some(BottomSettle {
            due_ms: now_ms.saturating_add(BOTTOM_SETTLE_INTERVAL_MS),
            retries: settle.retries + 1,
        });
    }

    fn refresh_range(&mut self) {
        let (start, end) = self.clamp_window(self.range.start, self.end_by_start(self.range.start));
        let next = self.compute_range(start, end);
        if next != self.range {
            self.range = next;
            self.emit();
        }
    }

    fn check_if_update(&mut self, start: usize, end: usize) {
        let (start, end) = self.clamp_window(start, end);
        if self.range.start != start {
            self.handle_update(start, end);
        }
    }

    fn clamp_window(&self, start: usize, end: usize) -> (usize, usize) {
        let keeps = self.options.keeps;
        if self.len() <= keeps {
            return (0, self.last_index());
        }
        if end.saturating_sub(start) < keeps.saturating_sub(1) {
            return ((end + 1).saturating_sub(keeps), end);
        }
        (start, end)
    }

    fn handle_update(&mut self, start: usize, end: usize) {
        self.range = self.compute_range(start, end);
        self.emit();
    }

    fn emit(&self) {
        vtrace!(
            start = self.range.start,
            end = self.range.end,
            front = self.range.front,
            behind = self.range.behind,
            "range update"
        );
        if let Some(cb) = &self.options.on_update {
            cb(self.range);
        }
    }

    fn compute_range(&self, start: usize, end: usize) -> Range {
        Range {
            start,
            end,
            front: self.offset_of_index(start),
            behind: self.behind_offset(end),
        }
    }

    fn behind_offset(&self, end: usize) -> u64 {
        let remaining = self.last_index().saturating_sub(end) as u64;
        remaining * self.estimate_size() as u64
    }

    fn end_by_start(&self, start: usize) -> usize {
        let end = start.saturating_add(self.options.keeps).saturating_sub(1);
        cmp::min(end, self.last_index())
    }

    fn last_index(&self) -> usize {
        match self.len() {
            0 => self.options.keeps.saturating_sub(1),
            n => n - 1,
        }
    }
}
