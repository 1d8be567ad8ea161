// Example: variable item sizes, the running average and the spacer estimates.
use virtual_dnd::{Axis, ItemKey, Viewport, Virtual, VirtualOptions};

#[derive(Default)]
struct Pane {
    offset: u64,
}

impl Viewport for Pane {
    fn offset(&self, _axis: Axis) -> u64 {
        self.offset
    }

    fn set_offset(&mut self, _axis: Axis, offset: u64) {
        self.offset = offset;
    }

    fn scroll_size(&self, _axis: Axis) -> u64 {
        100_000
    }

    fn client_size(&self, _axis: Axis) -> u64 {
        300
    }
}

fn main() {
    let keys: Vec<ItemKey> = (0..1_000).map(|i| ItemKey::from(format!("row-{i}"))).collect();
    let mut v = Virtual::new(
        VirtualOptions::new(15).with_size(40).with_unique_keys(keys),
        Some(Pane::default()),
    );
    println!("before: calc={:?} range={:?}", v.calc_size(), v.range());

    // Rows alternate between a one-line and a two-line layout.
    v.on_items_resized((0..15).map(|i| {
        let size = if i % 2 == 0 { 20 } else { 44 };
        (ItemKey::from(format!("row-{i}")), size)
    }));
    let range = v.update_range(None);
    println!("measured: mode={:?} calc={:?}", v.sizing_mode(), v.calc_size());
    println!("range={range:?}");

    for offset in [0, 150, 320, 5_000] {
        println!("index_at_offset({offset}) = {}", v.index_at_offset(offset));
    }

    // Later measurements refine offsets past the measured prefix.
    v.on_item_resized(ItemKey::from("row-15"), 200);
    println!(
        "after a tall row: average={} offset_of_index(20)={}",
        v.estimate_size(),
        v.offset_of_index(20)
    );
}
