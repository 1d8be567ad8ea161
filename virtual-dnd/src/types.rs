/// The scroll axis of the list.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Axis {
    #[default]
    Vertical,
    Horizontal,
}

impl Axis {
    pub fn is_horizontal(self) -> bool {
        self == Self::Horizontal
    }
}

/// Direction of the last scroll movement, derived by comparing consecutive offsets.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ScrollDirection {
    /// Toward index 0.
    Front,
    /// Toward the end of the list.
    Behind,
    #[default]
    Stationary,
}

/// The mounted window plus the spacer extents standing in for unmounted items.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Range {
    /// First mounted index (inclusive).
    pub start: usize,
    /// Last mounted index (inclusive).
    pub end: usize,
    /// Estimated extent of all items before `start`.
    pub front: u64,
    /// Estimated extent of all items after `end`.
    pub behind: u64,
}

impl Range {
    /// Number of mounted indexes.
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start) + 1
    }

    pub fn contains(&self, index: usize) -> bool {
        index >= self.start && index <= self.end
    }
}

/// Reported on every handled scroll event.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScrollEvent {
    /// Scrolling toward the front reached offset 0.
    pub top: bool,
    /// Scrolling toward the end reached the full scroll extent.
    pub bottom: bool,
    pub offset: u64,
    pub direction: ScrollDirection,
}

/// How item sizes are being estimated.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SizingMode {
    /// Nothing measured yet.
    #[default]
    Init,
    /// Every measurement so far had the same size.
    Fixed,
    /// Measurements differ. Never goes back to `Fixed`.
    Dynamic,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CalcSize {
    /// The shared size; only meaningful in [`SizingMode::Fixed`].
    pub fixed: Option<u32>,
    pub total: u64,
    pub average: u32,
}
