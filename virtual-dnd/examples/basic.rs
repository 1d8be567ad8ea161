// Example: a fixed-size list, a scroll event and scroll-to-index.
use virtual_dnd::{Axis, ItemKey, Range, Viewport, Virtual, VirtualOptions};

struct Pane {
    offset: u64,
    scroll: u64,
    client: u64,
}

impl Viewport for Pane {
    fn offset(&self, _axis: Axis) -> u64 {
        self.offset
    }

    fn set_offset(&mut self, _axis: Axis, offset: u64) {
        self.offset = offset.min(self.scroll - self.client);
    }

    fn scroll_size(&self, _axis: Axis) -> u64 {
        self.scroll
    }

    fn client_size(&self, _axis: Axis) -> u64 {
        self.client
    }
}

fn main() {
    let keys: Vec<ItemKey> = (0..10_000i64).map(ItemKey::from).collect();
    let options = VirtualOptions::new(20)
        .with_size(24)
        .with_unique_keys(keys)
        .with_on_update(Some(|r: Range| println!("on_update: {r:?}")));
    let mut v = Virtual::new(
        options,
        Some(Pane {
            offset: 0,
            scroll: 240_000,
            client: 480,
        }),
    );

    // The host measures what it rendered.
    for i in 0..20i64 {
        v.on_item_resized(ItemKey::from(i), 24);
    }
    println!("mode={:?} range={:?}", v.sizing_mode(), v.range());

    if let Some(pane) = v.scroller_mut() {
        pane.offset = 48_000;
    }
    let event = v.on_scroll_event(0);
    println!("scroll: {event:?}");

    v.scroll_to_index(5_000, 0);
    v.on_scroll_event(1);
    println!("after scroll_to_index: offset={} range={:?}", v.offset(), v.range());
}
