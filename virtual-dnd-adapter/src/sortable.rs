use alloc::vec::Vec;

use virtual_dnd::{ItemKey, KeyPath, KeySource};

use crate::{
    AddEvent, ChangeEvent, ChooseEvent, ContainerId, DragStartEvent, DragStore, DropEvent,
    DropParams, ItemEvent, Location, PullMode, Relative, RemoveEvent, SortableChange,
    SortableOptions,
};

/// Reconciles drag gestures against the full backing list of one container.
///
/// Only a window of rows is mounted, so a row's mount position says nothing about where its
/// item sits in the list. Every lookup goes through the item key instead: the adapter keeps a
/// shadow copy of the list, applies each gesture event to it, and hands back the committed list
/// on drop.
///
/// Gesture events for one pointer arrive one at a time. Cross-container moves involve two
/// `Sortable`s; the host passes the source's [`DragStore`] to the target's [`Sortable::on_add`]
/// and the peer's store to [`Sortable::on_drop`] (see [`drop_across`]).
#[derive(Clone, Debug)]
pub struct Sortable<T> {
    container: ContainerId,
    key_path: KeyPath,
    options: SortableOptions,
    list: Vec<T>,
    snapshot: Vec<T>,
    store: Option<DragStore<T>>,
    /// A record received through `on_add` whose item has since left again.
    handoff: Option<DragStore<T>>,
    chosen: Option<ItemKey>,
    range_changed: bool,
}

impl<T: Clone + KeySource> Sortable<T> {
    pub fn new(
        container: ContainerId,
        key_path: impl Into<KeyPath>,
        options: SortableOptions,
        list: Vec<T>,
    ) -> Self {
        Self {
            container,
            key_path: key_path.into(),
            options,
            snapshot: list.clone(),
            list,
            store: None,
            handoff: None,
            chosen: None,
            range_changed: false,
        }
    }

    pub fn container(&self) -> ContainerId {
        self.container
    }

    pub fn key_path(&self) -> &KeyPath {
        &self.key_path
    }

    /// The shadow list, including any in-flight gesture edits.
    pub fn list(&self) -> &[T] {
        &self.list
    }

    /// The committed list the current gesture started from.
    pub fn snapshot(&self) -> &[T] {
        &self.snapshot
    }

    /// Replaces the committed list (and the shadow copy).
    pub fn set_list(&mut self, list: Vec<T>) {
        self.list = list.clone();
        self.snapshot = list;
    }

    pub fn options(&self) -> &SortableOptions {
        &self.options
    }

    /// Replaces the passthrough options and returns what changed.
    pub fn set_options(&mut self, options: SortableOptions) -> SortableChange {
        let change = SortableOptions::diff(&self.options, &options);
        self.options = options;
        change
    }

    pub fn is_disabled(&self) -> bool {
        self.options.disabled
    }

    /// The in-flight drag record.
    ///
    /// After an item received through [`Sortable::on_add`] is removed again, this still returns
    /// that record so the next container's `on_add` can read it, but the gesture no longer
    /// counts as this container's.
    pub fn store(&self) -> Option<&DragStore<T>> {
        self.store.as_ref().or(self.handoff.as_ref())
    }

    pub fn is_dragging(&self) -> bool {
        self.store.is_some()
    }

    pub fn chosen_key(&self) -> Option<&ItemKey> {
        self.chosen.as_ref()
    }

    /// Marks that the mounted window moved while a drag was in flight.
    pub fn set_range_changed(&mut self, changed: bool) {
        self.range_changed = changed;
    }

    pub fn range_changed(&self) -> bool {
        self.range_changed
    }

    pub fn key_of(&self, item: &T) -> Option<ItemKey> {
        self.key_path.resolve(item)
    }

    /// Position of `key` in the shadow list.
    pub fn index_of(&self, key: &ItemKey) -> Option<usize> {
        self.list
            .iter()
            .position(|item| self.key_path.resolve(item).as_ref() == Some(key))
    }

    pub fn on_choose(&mut self, event: &ChooseEvent) {
        vtrace!(container = self.container, key = %event.key, "choose");
        self.chosen = Some(event.key.clone());
    }

    pub fn on_unchoose(&mut self, _event: &ChooseEvent) {
        self.chosen = None;
    }

    /// Starts a gesture: captures the [`DragStore`] for the row with `event.key`.
    pub fn on_drag(&mut self, event: &DragStartEvent) -> Option<ItemEvent<T>> {
        let Some(index) = self.index_of(&event.key) else {
            vwarn!(container = self.container, key = %event.key, "drag start: unknown key");
            return None;
        };
        let item = self.list[index].clone();
        let here = self.location(index);
        self.handoff = None;
        self.store = Some(DragStore {
            item: item.clone(),
            key: event.key.clone(),
            origin: here,
            from: here,
            to: here,
        });
        vdebug!(container = self.container, key = %event.key, index, "drag start");
        Some(ItemEvent {
            item,
            key: event.key.clone(),
            index,
        })
    }

    /// Reorders inside this container.
    ///
    /// The item lands before (`Relative::Before`) or after (`Relative::After`) the target row,
    /// or at the end of the list when there is no target. Returns the new index.
    pub fn on_change(&mut self, event: &ChangeEvent) -> Option<usize> {
        if event.revert_drag {
            self.list = self.snapshot.clone();
            if let Some(store) = self.store.as_mut() {
                store.from = store.origin;
                store.to = store.origin;
            }
            vdebug!(container = self.container, "change: reverted");
            return None;
        }

        let Some(from) = self.index_of(&event.node_key) else {
            vwarn!(container = self.container, key = %event.node_key, "change: unknown key");
            return None;
        };
        let target = match &event.target_key {
            Some(key) => Some(self.index_of(key)?),
            None => None,
        };

        let item = self.list.remove(from);
        let to = match (target, event.relative) {
            (Some(target), Relative::Before | Relative::After) => {
                // The target shifts down by one once the dragged item is out of the way.
                let target = if from < target { target - 1 } else { target };
                if event.relative == Relative::After {
                    target + 1
                } else {
                    target
                }
            }
            _ => self.list.len(),
        };
        self.list.insert(to, item);

        let here = self.location(to);
        if let Some(store) = self.store.as_mut() {
            store.from = here;
            store.to = here;
        }
        vtrace!(container = self.container, from, to, "change");
        Some(to)
    }

    /// The dragged row left this container.
    ///
    /// In [`PullMode::Clone`] the item is copied, so the list is left as is.
    pub fn on_remove(&mut self, event: &RemoveEvent) -> Option<ItemEvent<T>> {
        let Some(index) = self.index_of(&event.key) else {
            vwarn!(container = self.container, key = %event.key, "remove: unknown key");
            return None;
        };
        let item = match event.pull_mode {
            PullMode::Move => self.list.remove(index),
            PullMode::Clone => self.list[index].clone(),
        };
        if let Some(store) = self.store.as_mut() {
            store.item = item.clone();
            store.key = event.key.clone();
        }
        // The item passed through on its way elsewhere; this container no longer takes part.
        if self.store.as_ref().is_some_and(|s| s.origin.container != self.container) {
            self.handoff = self.store.take();
        }
        vdebug!(
            container = self.container,
            key = %event.key,
            index,
            pull_mode = ?event.pull_mode,
            "remove"
        );
        Some(ItemEvent {
            item,
            key: event.key.clone(),
            index,
        })
    }

    /// The dragged row entered this container; `source` is the store of the container it left.
    pub fn on_add(&mut self, event: &AddEvent, source: &DragStore<T>) -> Option<ItemEvent<T>> {
        let index = match (&event.target_key, event.relative) {
            (Some(key), Relative::Before) => self.index_of(key)?,
            (Some(key), Relative::After) => self.index_of(key)? + 1,
            _ => self.list.len(),
        };
        self.list.insert(index, source.item.clone());

        let here = self.location(index);
        self.handoff = None;
        self.store = Some(DragStore {
            item: source.item.clone(),
            key: source.key.clone(),
            origin: source.origin,
            from: source.from,
            to: here,
        });
        vdebug!(container = self.container, key = %source.key, index, "add");
        Some(ItemEvent {
            item: source.item.clone(),
            key: source.key.clone(),
            index,
        })
    }

    /// Ends the gesture and reports the result for this container.
    ///
    /// `peer` is the store of the other container in a cross-container drop; it is ignored when
    /// `from == to`. A reverted drop restores the pre-drag list and reports `changed = false`.
    pub fn on_drop(
        &mut self,
        params: &DropParams,
        peer: Option<&DragStore<T>>,
    ) -> Option<DropEvent<T>> {
        let own = self.store.take();
        self.handoff = None;
        let (source, target) = if params.from == params.to {
            (own.as_ref(), own.as_ref())
        } else if params.from == self.container {
            (own.as_ref(), peer)
        } else {
            (peer, own.as_ref())
        };
        let (Some(source), Some(target)) = (source, target) else {
            vwarn!(container = self.container, "drop without an active drag");
            self.range_changed = false;
            return None;
        };

        let old_list = self.snapshot.clone();
        let (list, to, changed) = if params.reverted {
            (old_list.clone(), source.origin, false)
        } else {
            let changed = params.from != params.to || source.origin.index != target.to.index;
            (self.list.clone(), target.to, changed)
        };
        let event = DropEvent {
            item: source.item.clone(),
            key: source.key.clone(),
            list,
            old_list,
            from: source.origin,
            to,
            changed,
            remove_dragged: params.from == self.container && self.range_changed,
            remove_clone: params.from != params.to && params.pull_mode == PullMode::Clone,
        };

        if params.reverted {
            self.list = self.snapshot.clone();
        } else {
            self.snapshot = self.list.clone();
        }
        self.range_changed = false;
        vdebug!(
            container = self.container,
            key = %event.key,
            changed = event.changed,
            old_index = event.from.index,
            new_index = event.to.index,
            "drop"
        );
        Some(event)
    }

    fn location(&self, index: usize) -> Location {
        Location {
            container: self.container,
            index,
        }
    }
}

/// Drops a cross-container gesture on both sides.
///
/// Each side needs the other's [`DragStore`]; both are captured before either is consumed.
/// Returns `(source_event, target_event)`.
pub fn drop_across<T: Clone + KeySource>(
    source: &mut Sortable<T>,
    target: &mut Sortable<T>,
    params: &DropParams,
) -> (Option<DropEvent<T>>, Option<DropEvent<T>>) {
    let source_store = source.store().cloned();
    let target_store = target.store().cloned();
    (
        source.on_drop(params, target_store.as_ref()),
        target.on_drop(params, source_store.as_ref()),
    )
}
