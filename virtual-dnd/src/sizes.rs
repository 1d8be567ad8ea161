use crate::key::KeyMap;
use crate::{CalcSize, ItemKey, SizingMode};

/// Measured sizes by key, plus the fixed/dynamic classification derived from them.
///
/// The first measurement switches the tracker to [`SizingMode::Fixed`]; the first measurement
/// that differs from it switches to [`SizingMode::Dynamic`] for good.
#[derive(Clone, Debug, Default)]
pub struct SizeTracker {
    sizes: KeyMap<u32>,
    mode: SizingMode,
    calc: CalcSize,
    sum: u64,
}

impl SizeTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(&self) -> SizingMode {
        self.mode
    }

    pub fn is_fixed(&self) -> bool {
        self.mode == SizingMode::Fixed
    }

    pub fn calc_size(&self) -> CalcSize {
        self.calc
    }

    pub fn get(&self, key: &ItemKey) -> Option<u32> {
        self.sizes.get(key).copied()
    }

    pub fn len(&self) -> usize {
        self.sizes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sizes.is_empty()
    }

    /// Stores a measurement and returns the size it replaced, if any.
    pub fn record_size(&mut self, key: ItemKey, size: u32) -> Option<u32> {
        let prev = self.sizes.insert(key, size);
        self.sum = self.sum.saturating_add(size as u64);
        if let Some(prev) = prev {
            self.sum = self.sum.saturating_sub(prev as u64);
        }

        match self.mode {
            SizingMode::Init => {
                vdebug!(size, "sizing mode: fixed");
                self.mode = SizingMode::Fixed;
                self.calc.fixed = Some(size);
            }
            SizingMode::Fixed if self.calc.fixed != Some(size) => {
                vdebug!(
                    fixed = ?self.calc.fixed,
                    size,
                    "sizing mode: dynamic"
                );
                self.mode = SizingMode::Dynamic;
                self.calc.fixed = None;
            }
            _ => {}
        }

        if self.mode != SizingMode::Fixed {
            self.refresh_average();
        }
        prev
    }

    /// Best available size for an unmeasured item.
    pub fn estimate_size(&self, default_size: u32) -> u32 {
        if let (SizingMode::Fixed, Some(fixed)) = (self.mode, self.calc.fixed) {
            return fixed;
        }
        if self.calc.average != 0 {
            return self.calc.average;
        }
        default_size
    }

    /// Drops every measurement whose key is not in `current`. Returns how many were removed.
    pub fn prune_keys(&mut self, current: &[ItemKey]) -> usize {
        if self.sizes.is_empty() {
            return 0;
        }
        let mut live = KeyMap::new();
        for key in current {
            live.insert(key.clone(), ());
        }
        let before = self.sizes.len();
        let mut removed_sum = 0u64;
        self.sizes.retain(|k, v| {
            let keep = live.contains_key(k);
            if !keep {
                removed_sum = removed_sum.saturating_add(*v as u64);
            }
            keep
        });
        self.sum = self.sum.saturating_sub(removed_sum);
        let removed = before - self.sizes.len();
        if removed > 0 && self.mode != SizingMode::Fixed {
            self.refresh_average();
        }
        vtrace!(removed, remaining = self.sizes.len(), "prune_keys");
        removed
    }

    /// Forgets every measurement and returns to [`SizingMode::Init`].
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    fn refresh_average(&mut self) {
        self.calc.total = self.sum;
        let count = self.sizes.len() as u64;
        self.calc.average = if count == 0 {
            0
        } else {
            ((self.sum + count / 2) / count) as u32
        };
    }
}
