// Example: moving and cloning items between two sortable containers.
use virtual_dnd::{ItemKey, KeySource};
use virtual_dnd_adapter::{
    AddEvent, DragStartEvent, DropParams, Group, PullMode, Relative, RemoveEvent, Sortable,
    SortableOptions, drop_across,
};

fn names(list: &[String]) -> String {
    list.join(", ")
}

fn main() {
    #[derive(Clone, Debug)]
    struct Card(String);

    impl KeySource for Card {
        fn child(&self, segment: &str) -> Option<&dyn KeySource> {
            (segment == "name").then_some(&self.0 as &dyn KeySource)
        }
    }

    let cards = |xs: &[&str]| xs.iter().map(|s| Card(s.to_string())).collect::<Vec<_>>();
    let options = SortableOptions::default().with_group(Group::new("board"));
    let mut todo = Sortable::new(1, "name", options.clone(), cards(&["write", "test", "ship"]));
    let mut done = Sortable::new(2, "name", options, cards(&["plan"]));

    for (name, pull_mode) in [("test", PullMode::Move), ("write", PullMode::Clone)] {
        todo.on_drag(&DragStartEvent {
            key: ItemKey::from(name),
        });
        todo.on_remove(&RemoveEvent {
            key: ItemKey::from(name),
            pull_mode,
        });
        if let Some(store) = todo.store().cloned() {
            done.on_add(
                &AddEvent {
                    target_key: Some(ItemKey::from("plan")),
                    relative: Relative::After,
                },
                &store,
            );
        }
        let params = DropParams {
            from: 1,
            to: 2,
            pull_mode,
            reverted: false,
        };
        let (from, to) = drop_across(&mut todo, &mut done, &params);
        if let (Some(from), Some(to)) = (from, to) {
            let show = |l: &[Card]| names(&l.iter().map(|c| c.0.clone()).collect::<Vec<_>>());
            println!(
                "{pull_mode:?}: todo=[{}] done=[{}] remove_clone={}",
                show(&from.list),
                show(&to.list),
                to.remove_clone
            );
            todo.set_list(from.list);
            done.set_list(to.list);
        }
    }
}
