use crate::*;

use alloc::sync::Arc;
use alloc::vec::Vec;
use std::collections::HashMap;
use std::string::String;
use std::sync::Mutex;

#[derive(Clone, Copy, Debug)]
struct Lcg(u64);

impl Lcg {
    fn new(seed: u64) -> Self {
        Self(seed)
    }

    fn next_u64(&mut self) -> u64 {
        // Deterministic, dependency-free PRNG for tests.
        self.0 = self
            .0
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        self.0
    }

    fn gen_range_u64(&mut self, start: u64, end_exclusive: u64) -> u64 {
        debug_assert!(start < end_exclusive);
        let span = end_exclusive - start;
        start + (self.next_u64() % span)
    }

    fn gen_range_usize(&mut self, start: usize, end_exclusive: usize) -> usize {
        self.gen_range_u64(start as u64, end_exclusive as u64) as usize
    }

    fn gen_range_u32(&mut self, start: u32, end_exclusive: u32) -> u32 {
        self.gen_range_u64(start as u64, end_exclusive as u64) as u32
    }
}

#[derive(Debug, Default)]
struct MockViewport {
    offset: u64,
    scroll: u64,
    client: u64,
    grow_by: u64,
    grow_until: u64,
    writes: u32,
    attached: u32,
    detached: u32,
    locked: bool,
}

impl MockViewport {
    fn new(scroll: u64, client: u64) -> Self {
        Self {
            scroll,
            client,
            ..Self::default()
        }
    }
}

impl Viewport for MockViewport {
    fn offset(&self, _axis: Axis) -> u64 {
        self.offset
    }

    fn set_offset(&mut self, _axis: Axis, offset: u64) {
        self.writes += 1;
        self.offset = offset.min(self.scroll.saturating_sub(self.client));
        // Content below the fold settles after the jump.
        if self.scroll < self.grow_until {
            self.scroll = self.scroll.saturating_add(self.grow_by).min(self.grow_until);
        }
    }

    fn scroll_size(&self, _axis: Axis) -> u64 {
        self.scroll
    }

    fn client_size(&self, _axis: Axis) -> u64 {
        self.client
    }

    fn attach(&mut self) {
        self.attached += 1;
    }

    fn detach(&mut self) {
        self.detached += 1;
    }

    fn set_scroll_locked(&mut self, locked: bool) {
        self.locked = locked;
    }
}

fn keys(n: usize) -> Arc<[ItemKey]> {
    (0..n).map(|i| ItemKey::Int(i as i64)).collect()
}

fn engine(keeps: usize, count: usize, viewport: MockViewport) -> Virtual<MockViewport> {
    Virtual::new(
        VirtualOptions::new(keeps).with_unique_keys(keys(count)),
        Some(viewport),
    )
}

fn scroll_to(v: &mut Virtual<MockViewport>, offset: u64, now_ms: u64) -> Option<ScrollEvent> {
    v.scroller_mut().unwrap().offset = offset;
    v.on_scroll_event(now_ms)
}

fn expected_prefix(sizes: &[u32], index: usize) -> u64 {
    sizes.iter().take(index).map(|&s| s as u64).sum()
}

fn expected_index_at_offset(sizes: &[u32], offset: u64) -> usize {
    let mut index = 0;
    for i in 0..=sizes.len() {
        if expected_prefix(sizes, i) <= offset {
            index = i;
        }
    }
    index
}

#[test]
fn key_path_parses_dots_and_brackets() {
    assert_eq!(KeyPath::parse("a[0].b").segments(), ["a", "0", "b"]);
    assert_eq!(KeyPath::parse("id").segments(), ["id"]);
    assert_eq!(
        KeyPath::from(&["meta", "id"][..]),
        KeyPath::parse("meta.id")
    );
    assert_eq!(KeyPath::parse("a[0].b").to_string(), "a.0.b");
}

#[test]
fn resolve_walks_nested_maps_and_lists() {
    let mut inner = HashMap::new();
    inner.insert(String::from("b"), ItemKey::from("key-1"));
    let mut item = HashMap::new();
    item.insert(String::from("a"), alloc::vec![inner]);

    assert_eq!(
        resolve(&item, &KeyPath::parse("a[0].b")),
        Some(ItemKey::from("key-1"))
    );
    assert_eq!(resolve(&item, &KeyPath::parse("a[1].b")), None);
    assert_eq!(
        KeyPath::parse("a.0.c").try_resolve(&item),
        Err(ResolveError::MissingSegment {
            segment: String::from("c"),
            depth: 2
        })
    );
    assert_eq!(
        KeyPath::parse("a").try_resolve(&item),
        Err(ResolveError::NotAKey)
    );
    assert_eq!(
        KeyPath::default().try_resolve(&item),
        Err(ResolveError::EmptyPath)
    );
}

#[cfg(feature = "json")]
#[test]
fn resolve_reads_json_values() {
    let item = serde_json::json!({
        "a": [{ "id": "row-1", "seq": 17 }],
        "flag": true
    });

    assert_eq!(
        resolve(&item, &KeyPath::parse("a[0].id")),
        Some(ItemKey::from("row-1"))
    );
    assert_eq!(
        resolve(&item, &KeyPath::parse("a[0].seq")),
        Some(ItemKey::Int(17))
    );
    assert_eq!(
        resolve(&item, &KeyPath::parse("a.0.seq")),
        Some(ItemKey::from("17"))
    );
    assert_eq!(
        KeyPath::parse("a[0].missing").try_resolve(&item),
        Err(ResolveError::MissingSegment {
            segment: String::from("missing"),
            depth: 2
        })
    );
    assert_eq!(
        KeyPath::parse("flag").try_resolve(&item),
        Err(ResolveError::NotAKey)
    );
}

#[test]
fn item_keys_compare_loosely_and_hash_consistently() {
    assert_eq!(ItemKey::from("3"), ItemKey::Int(3));
    assert_eq!(ItemKey::from("-12"), ItemKey::Int(-12));
    assert_ne!(ItemKey::from("03"), ItemKey::Int(3));
    assert_ne!(ItemKey::from("+3"), ItemKey::Int(3));
    assert_ne!(ItemKey::from("-0"), ItemKey::Int(0));
    assert_ne!(ItemKey::from("a"), ItemKey::from("b"));

    let mut map = HashMap::new();
    map.insert(ItemKey::Int(42), "answer");
    assert_eq!(map.get(&ItemKey::from("42")), Some(&"answer"));
    assert_eq!(map.get(&ItemKey::from("042")), None);
}

#[test]
fn size_tracker_moves_from_init_to_fixed_to_dynamic() {
    let mut s = SizeTracker::new();
    assert_eq!(s.mode(), SizingMode::Init);
    assert_eq!(s.estimate_size(25), 25);

    s.record_size(ItemKey::Int(0), 40);
    assert_eq!(s.mode(), SizingMode::Fixed);
    assert_eq!(s.calc_size().fixed, Some(40));
    s.record_size(ItemKey::Int(1), 40);
    assert_eq!(s.mode(), SizingMode::Fixed);
    assert_eq!(s.estimate_size(25), 40);

    s.record_size(ItemKey::Int(2), 45);
    assert_eq!(s.mode(), SizingMode::Dynamic);
    assert_eq!(s.calc_size().fixed, None);
    assert_eq!(s.calc_size().total, 125);
    // round(125 / 3) = 42
    assert_eq!(s.calc_size().average, 42);
    assert_eq!(s.estimate_size(25), 42);

    // Every item the same size again does not bring back fixed mode.
    s.record_size(ItemKey::Int(2), 40);
    assert_eq!(s.mode(), SizingMode::Dynamic);
    assert_eq!(s.calc_size().total, 120);
    assert_eq!(s.calc_size().average, 40);
}

#[test]
fn size_tracker_average_rounds_half_up() {
    let mut s = SizeTracker::new();
    s.record_size(ItemKey::Int(0), 10);
    s.record_size(ItemKey::Int(1), 15);
    // round(12.5) = 13
    assert_eq!(s.calc_size().average, 13);
}

#[test]
fn prune_keys_removes_only_absent_keys() {
    let mut s = SizeTracker::new();
    for (i, size) in [10u32, 20, 30, 40].into_iter().enumerate() {
        s.record_size(ItemKey::Int(i as i64), size);
    }
    let removed = s.prune_keys(&[ItemKey::Int(1), ItemKey::from("3"), ItemKey::Int(9)]);
    assert_eq!(removed, 2);
    assert_eq!(s.len(), 2);
    assert_eq!(s.get(&ItemKey::Int(0)), None);
    assert_eq!(s.get(&ItemKey::Int(1)), Some(20));
    assert_eq!(s.get(&ItemKey::Int(2)), None);
    assert_eq!(s.get(&ItemKey::Int(3)), Some(40));
    assert_eq!(s.calc_size().total, 60);
    assert_eq!(s.calc_size().average, 30);
}

#[test]
fn debounce_fires_after_the_last_call() {
    let mut r = RateLimiter::from_times(20, 0);
    assert!(!r.call(0));
    assert!(!r.poll(10));
    assert!(!r.call(15));
    assert!(!r.poll(30));
    assert!(r.poll(35));
    assert!(!r.poll(100));
}

#[test]
fn throttle_fires_once_per_window() {
    let mut r = RateLimiter::from_times(0, 20);
    assert!(!r.call(0));
    assert!(!r.call(15));
    assert!(r.poll(20));
    assert!(!r.is_pending());
    assert!(!r.call(25));
    assert_eq!(r.due_ms(), Some(45));
    r.cancel();
    assert!(!r.poll(50));
}

#[test]
fn no_rate_limit_runs_immediately_and_debounce_wins_conflicts() {
    let mut r = RateLimiter::from_times(0, 0);
    assert!(r.call(0));
    assert!(!r.poll(0));
    assert!(matches!(
        RateLimiter::from_times(10, 20),
        RateLimiter::Debounce { wait_ms: 10, .. }
    ));
}

#[test]
fn initial_range_covers_keeps_without_emitting() {
    let updates = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&updates);
    let v = Virtual::new(
        VirtualOptions::new(10)
            .with_unique_keys(keys(100))
            .with_on_update(Some(move |r: Range| sink.lock().unwrap().push(r))),
        Some(MockViewport::new(1000, 100)),
    );
    assert_eq!(v.range().start, 0);
    assert_eq!(v.range().end, 9);
    assert!(updates.lock().unwrap().is_empty());
    assert_eq!(v.scroller().unwrap().attached, 1);
}

#[test]
fn fixed_mode_scrolled_index_uses_division() {
    let mut v = engine(5, 100, MockViewport::new(4000, 200));
    for i in 0..100 {
        v.on_item_resized(ItemKey::Int(i), 40);
    }
    assert_eq!(v.sizing_mode(), SizingMode::Fixed);
    assert_eq!(v.index_at_offset(2000), 50);

    let event = scroll_to(&mut v, 2000, 0).unwrap();
    assert_eq!(event.direction, ScrollDirection::Behind);
    assert_eq!(v.scrolled_index(), 50);
    assert_eq!(
        v.range(),
        Range {
            start: 50,
            end: 54,
            front: 2000,
            behind: 45 * 40,
        }
    );
}

#[test]
fn dynamic_mode_bisects_alternating_sizes() {
    let count = 100;
    let sizes: Vec<u32> = (0..count).map(|i| if i % 2 == 0 { 10 } else { 20 }).collect();
    let mut v = engine(10, count, MockViewport::new(1500, 100));
    for (i, &size) in sizes.iter().enumerate() {
        v.on_item_resized(ItemKey::Int(i as i64), size);
    }
    assert_eq!(v.sizing_mode(), SizingMode::Dynamic);

    let total = expected_prefix(&sizes, count);
    for offset in 0..=total + 5 {
        assert_eq!(
            v.index_at_offset(offset),
            expected_index_at_offset(&sizes, offset),
            "offset={offset}"
        );
    }
    for index in 0..=count {
        assert_eq!(v.offset_of_index(index), expected_prefix(&sizes, index));
    }
}

#[test]
fn bisection_follows_measurements_as_they_arrive() {
    let mut v = Virtual::new(
        VirtualOptions::new(5)
            .with_size(50)
            .with_unique_keys(keys(20)),
        Some(MockViewport::new(1000, 100)),
    );
    v.on_item_resized(ItemKey::Int(0), 10);
    v.on_item_resized(ItemKey::Int(1), 30);
    // Dynamic, average 20: [10, 30, 20, 20, ...]
    assert_eq!(v.offset_of_index(3), 60);
    assert_eq!(v.index_at_offset(85), 4);

    v.on_item_resized(ItemKey::Int(2), 80);
    // Average is now 40: [10, 30, 80, 40, ...]
    assert_eq!(v.estimate_size(), 40);
    assert_eq!(v.offset_of_index(3), 120);
    assert_eq!(v.index_at_offset(85), 2);
    assert_eq!(v.index_at_offset(160), 4);
}

#[test]
fn scrolling_front_shifts_window_back_with_buffer() {
    let mut v = engine(6, 100, MockViewport::new(1000, 60));
    for i in 0..100 {
        v.on_item_resized(ItemKey::Int(i), 10);
    }
    scroll_to(&mut v, 500, 0);
    assert_eq!(v.range().start, 50);

    // Still inside the window: no update.
    scroll_to(&mut v, 515, 1);
    scroll_to(&mut v, 512, 2);
    assert_eq!(v.direction(), ScrollDirection::Front);
    assert_eq!(v.range().start, 50);

    scroll_to(&mut v, 400, 3);
    // scrolled index 40, buffer round(6 / 3) = 2
    assert_eq!(v.range().start, 38);
    assert_eq!(v.range().end, 43);
    assert_eq!(v.range().front, 380);
}

#[test]
fn small_lists_mount_everything() {
    let mut v = engine(10, 4, MockViewport::new(400, 100));
    assert_eq!((v.range().start, v.range().end), (0, 3));
    for i in 0..4 {
        v.on_item_resized(ItemKey::Int(i), 100);
    }
    scroll_to(&mut v, 300, 0);
    assert_eq!((v.range().start, v.range().end), (0, 3));
    assert_eq!(v.range().behind, 0);
}

#[test]
fn property_random_scrolls_keep_range_invariants() {
    let mut rng = Lcg::new(0x5eed);
    for _case in 0..60 {
        let keeps = rng.gen_range_usize(1, 20);
        let count = rng.gen_range_usize(1, 200);
        let sizes: Vec<u32> = (0..count).map(|_| rng.gen_range_u32(5, 60)).collect();
        let total = expected_prefix(&sizes, count);
        let mut v = engine(keeps, count, MockViewport::new(total, 50));
        for (i, &size) in sizes.iter().enumerate() {
            v.on_item_resized(ItemKey::Int(i as i64), size);
        }
        v.update_range(None);

        for step in 0..80 {
            let offset = rng.gen_range_u64(0, total + 1);
            scroll_to(&mut v, offset, step);
            let r = v.range();
            assert!(r.start <= r.end, "{r:?}");
            if count <= keeps {
                assert_eq!((r.start, r.end), (0, count - 1));
            } else {
                assert_eq!(r.end - r.start + 1, keeps, "{r:?} keeps={keeps}");
                assert!(r.end < count);
            }
            assert_eq!(r.front, expected_prefix(&sizes, r.start));
        }
    }
}

#[test]
fn update_range_is_idempotent() {
    let updates = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&updates);
    let mut v = Virtual::new(
        VirtualOptions::new(5)
            .with_size(20)
            .with_unique_keys(keys(50))
            .with_on_update(Some(move |r: Range| sink.lock().unwrap().push(r))),
        Some(MockViewport::new(1000, 100)),
    );
    for i in 0..5 {
        v.on_item_resized(ItemKey::Int(i), 30);
    }
    let a = v.update_range(None);
    let b = v.update_range(None);
    assert_eq!(a, b);
    assert_eq!(a.behind, 45 * 30);
    assert_eq!(updates.lock().unwrap().len(), 1);
}

#[test]
fn explicit_range_is_adopted_and_spacers_recomputed() {
    let mut v = engine(5, 50, MockViewport::new(1000, 100));
    for i in 0..50 {
        v.on_item_resized(ItemKey::Int(i), 20);
    }
    let r = v.update_range(Some(Range {
        start: 10,
        end: 14,
        front: 0,
        behind: 0,
    }));
    assert_eq!(r, Range { start: 10, end: 14, front: 200, behind: 35 * 20 });
}

#[test]
fn scroll_events_report_top_and_bottom() {
    let events = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&events);
    let mut v = Virtual::new(
        VirtualOptions::new(5)
            .with_unique_keys(keys(50))
            .with_on_scroll(Some(move |e: ScrollEvent| sink.lock().unwrap().push(e))),
        Some(MockViewport::new(1000, 100)),
    );
    let e = scroll_to(&mut v, 900, 0).unwrap();
    assert!(e.bottom && !e.top);
    let e = scroll_to(&mut v, 0, 1).unwrap();
    assert!(e.top && !e.bottom);
    let e = scroll_to(&mut v, 0, 2).unwrap();
    assert_eq!(e.direction, ScrollDirection::Stationary);
    assert!(!e.top);
    assert_eq!(events.lock().unwrap().len(), 3);
}

#[test]
fn debounced_scroll_runs_from_tick() {
    let mut v = Virtual::new(
        VirtualOptions::new(5)
            .with_unique_keys(keys(100))
            .with_debounce_time(20),
        Some(MockViewport::new(2000, 100)),
    );
    for i in 0..100 {
        v.on_item_resized(ItemKey::Int(i), 20);
    }
    assert!(scroll_to(&mut v, 400, 0).is_none());
    assert!(scroll_to(&mut v, 600, 10).is_none());
    assert_eq!(v.next_tick_ms(), Some(30));
    assert!(v.tick(25).is_none());
    let e = v.tick(30).unwrap();
    assert_eq!(e.offset, 600);
    assert_eq!(v.range().start, 30);
}

#[test]
fn scroll_to_index_writes_prefix_offset_plus_margin() {
    let mut v = Virtual::new(
        VirtualOptions::new(5)
            .with_unique_keys(keys(100))
            .with_scroll_margin(15),
        Some(MockViewport::new(10_000, 100)),
    );
    v.on_item_resized(ItemKey::Int(0), 10);
    v.on_item_resized(ItemKey::Int(1), 30);
    v.scroll_to_index(3, 0);
    // 10 + 30 + 20 (average) + margin
    assert_eq!(v.offset(), 75);

    assert!(v.scroll_to_key(&ItemKey::from("2"), 0));
    assert_eq!(v.offset(), 55);
    assert!(!v.scroll_to_key(&ItemKey::from("missing"), 0));
}

#[test]
fn scroll_to_last_index_scrolls_to_bottom_and_settles() {
    let mut vp = MockViewport::new(1000, 200);
    vp.grow_by = 100;
    vp.grow_until = 1300;
    let mut v = engine(5, 100, vp);

    v.scroll_to_index(99, 0);
    assert!(v.is_settling_bottom());
    let mut now = 0;
    while v.is_settling_bottom() {
        now += BOTTOM_SETTLE_INTERVAL_MS;
        v.tick(now);
        assert!(now < 1000, "settle loop did not stop");
    }
    assert_eq!(v.offset(), 1100);
    assert!(v.is_at_bottom());
}

#[test]
fn scroll_to_bottom_gives_up_on_a_viewport_that_never_settles() {
    let mut vp = MockViewport::new(1000, 200);
    vp.grow_by = 100;
    vp.grow_until = u64::MAX;
    let mut v = engine(5, 100, vp);

    v.scroll_to_bottom(0);
    for step in 1..=10_000u64 {
        v.tick(step * BOTTOM_SETTLE_INTERVAL_MS);
    }
    assert!(!v.is_settling_bottom());
    assert_eq!(v.scroller().unwrap().writes, MAX_BOTTOM_RETRIES + 1);
}

#[test]
fn changing_unique_keys_prunes_sizes() {
    let mut v = engine(5, 10, MockViewport::new(1000, 100));
    for i in 0..10 {
        v.on_item_resized(ItemKey::Int(i), 10 + i as u32);
    }
    let change = v.set_unique_keys(alloc::vec![ItemKey::Int(3), ItemKey::Int(7), ItemKey::Int(42)]);
    assert!(change.unique_keys);
    assert_eq!(v.size_tracker().len(), 2);
    assert_eq!(v.size_of(&ItemKey::Int(3)), 13);
    assert_eq!(v.index_of_key(&ItemKey::Int(42)), Some(2));
    assert_eq!(v.offset_of_index(2), 13 + 17);

    let change = v.set_unique_keys(v.unique_keys().to_vec());
    assert!(change.is_empty());
}

#[test]
fn option_changes_apply_their_effects() {
    let mut v = engine(5, 100, MockViewport::new(2000, 100));
    assert!(scroll_to(&mut v, 10, 0).is_some());

    let change = v.option(VirtualOption::ThrottleTime(16));
    assert!(change.rate_limit && !change.keeps);
    assert!(scroll_to(&mut v, 20, 1).is_none());
    assert!(v.tick(17).is_some());

    let change = v.option(VirtualOption::Keeps(8));
    assert!(change.keeps);
    assert_eq!(v.range().len(), 8);

    let change = v.option(VirtualOption::Direction(Axis::Horizontal));
    assert!(change.direction);
    assert_eq!(v.direction(), ScrollDirection::Stationary);
}

#[test]
fn replacing_the_scroller_rebinds_listeners() {
    let mut v = engine(5, 100, MockViewport::new(2000, 100));
    let old = v.set_scroller(Some(MockViewport::new(3000, 100))).unwrap();
    assert_eq!((old.attached, old.detached), (1, 1));
    assert_eq!(v.scroller().unwrap().attached, 1);

    v.enable_scroll(false);
    assert!(v.scroller().unwrap().locked);
    v.enable_scroll(true);
    assert!(!v.scroller().unwrap().locked);

    v.remove_scroll_listener();
    assert_eq!(v.scroller().unwrap().detached, 1);
}
