// Example: scroll-to-bottom on content that keeps growing for a few frames.
use virtual_dnd::{Axis, BOTTOM_SETTLE_INTERVAL_MS, ItemKey, Viewport, Virtual, VirtualOptions};

struct Pane {
    offset: u64,
    scroll: u64,
    settled: u64,
}

impl Viewport for Pane {
    fn offset(&self, _axis: Axis) -> u64 {
        self.offset
    }

    fn set_offset(&mut self, _axis: Axis, offset: u64) {
        self.offset = offset.min(self.scroll.saturating_sub(200));
        // Images below the fold finish loading after the jump.
        self.scroll = (self.scroll + 150).min(self.settled);
    }

    fn scroll_size(&self, _axis: Axis) -> u64 {
        self.scroll
    }

    fn client_size(&self, _axis: Axis) -> u64 {
        200
    }
}

fn main() {
    let keys: Vec<ItemKey> = (0..100i64).map(ItemKey::from).collect();
    let mut v = Virtual::new(
        VirtualOptions::new(10).with_unique_keys(keys),
        Some(Pane {
            offset: 0,
            scroll: 2_000,
            settled: 2_600,
        }),
    );

    v.scroll_to_bottom(0);
    let mut now = 0;
    while v.is_settling_bottom() {
        now += BOTTOM_SETTLE_INTERVAL_MS;
        v.tick(now);
        println!("t={now}ms offset={} scroll={}", v.offset(), v.scroll_size());
    }
    println!("at_bottom={}", v.is_at_bottom());
}
