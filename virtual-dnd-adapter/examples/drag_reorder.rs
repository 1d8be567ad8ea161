// Example: reordering a virtualized list while only a window of it is mounted.
use virtual_dnd::{Axis, ItemKey, KeySource, Viewport, VirtualOptions};
use virtual_dnd_adapter::{
    ChangeEvent, ChooseEvent, DragStartEvent, DropParams, ListOptions, PullMode, Relative,
    VirtualDndList,
};

#[derive(Clone, Debug)]
struct Task {
    id: u32,
    title: String,
}

impl KeySource for Task {
    fn child(&self, segment: &str) -> Option<&dyn KeySource> {
        match segment {
            "id" => Some(&self.id),
            "title" => Some(&self.title),
            _ => None,
        }
    }
}

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
        32 * 1_000
    }

    fn client_size(&self, _axis: Axis) -> u64 {
        320
    }
}

fn main() {
    let tasks: Vec<Task> = (0..1_000)
        .map(|id| Task {
            id,
            title: format!("task #{id}"),
        })
        .collect();
    let options = ListOptions::new(1, "id")
        .with_virtual_options(VirtualOptions::new(12))
        .with_on_model_change(Some(|model: &[Task]| {
            let head: Vec<u32> = model.iter().take(4).map(|t| t.id).collect();
            println!("model committed, head={head:?}");
        }));
    let mut list = VirtualDndList::new(options, tasks, Some(Pane { offset: 0 }));

    // The host renders `render_list()` and reports the measured rows.
    let mounted: Vec<u32> = list.render_list().iter().map(|t| t.id).collect();
    for id in mounted {
        list.on_size_change(ItemKey::from(id), 32);
    }
    println!("range={:?}", list.range());

    // The drag provider reports keys as written on the row attributes.
    let pressed = ChooseEvent {
        key: ItemKey::from("3"),
    };
    list.on_choose(&pressed);
    let started = list.on_drag(&DragStartEvent {
        key: ItemKey::from("3"),
    });
    println!("drag: {started:?}");
    println!("row 3 hidden: {}", list.item_hidden(&ItemKey::from(3)));

    list.on_change(&ChangeEvent {
        node_key: ItemKey::from("3"),
        target_key: Some(ItemKey::from("0")),
        relative: Relative::Before,
        revert_drag: false,
    });
    let dropped = list.on_drop(
        &DropParams {
            from: 1,
            to: 1,
            pull_mode: PullMode::Move,
            reverted: false,
        },
        None,
        0,
    );
    list.on_unchoose(&pressed);
    if let Some(d) = dropped {
        println!(
            "drop: key={} {} -> {} changed={}",
            d.key,
            d.old_index(),
            d.new_index(),
            d.changed
        );
    }
}
