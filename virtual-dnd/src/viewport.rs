use crate::Axis;

/// The scroll container the list lives in.
///
/// Implemented by the host's UI layer (a DOM element, a TUI pane, a test double). All extents are
/// measured along `axis`.
pub trait Viewport {
    /// Current scroll offset.
    fn offset(&self, axis: Axis) -> u64;

    /// Writes the scroll offset. Implementations may clamp it to their scrollable range.
    fn set_offset(&mut self, axis: Axis, offset: u64);

    /// Full scrollable extent, including content outside the visible area.
    fn scroll_size(&self, axis: Axis) -> u64;

    /// Visible extent.
    fn client_size(&self, axis: Axis) -> u64;

    /// Called when the engine starts listening to this viewport's scroll notifications.
    fn attach(&mut self) {}

    /// Called when the engine stops listening (scroller replaced or engine torn down).
    fn detach(&mut self) {}

    /// Blocks or unblocks user-driven scrolling (wheel, touch, arrow keys).
    fn set_scroll_locked(&mut self, _locked: bool) {}
}

impl<V: Viewport + ?Sized> Viewport for alloc::boxed::Box<V> {
    fn offset(&self, axis: Axis) -> u64 {
        (**self).offset(axis)
    }

    fn set_offset(&mut self, axis: Axis, offset: u64) {
        (**self).set_offset(axis, offset);
    }

    fn scroll_size(&self, axis: Axis) -> u64 {
        (**self).scroll_size(axis)
    }

    fn client_size(&self, axis: Axis) -> u64 {
        (**self).client_size(axis)
    }

    fn attach(&mut self) {
        (**self).attach();
    }

    fn detach(&mut self) {
        (**self).detach();
    }

    fn set_scroll_locked(&mut self, locked: bool) {
        (**self).set_scroll_locked(locked);
    }
}
