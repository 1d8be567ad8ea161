use alloc::vec::Vec;
use core::cmp;

use crate::ItemKey;
use crate::key::KeyMap;
use crate::sizes::SizeTracker;

#[derive(Clone, Debug, Default)]
pub(crate) struct Fenwick {
    tree: Vec<u64>, // 1-indexed
}

impl Fenwick {
    pub(crate) fn from_values(values: impl ExactSizeIterator<Item = u64>) -> Self {
        let n = values.len();
        let mut tree = alloc::vec![0u64; n + 1];
        for (i, v) in (1..=n).zip(values) {
            tree[i] = tree[i].saturating_add(v);
            let j = i + lsb(i);
            if j <= n {
                tree[j] = tree[j].saturating_add(tree[i]);
            }
        }
        Self { tree }
    }

    pub(crate) fn len(&self) -> usize {
        self.tree.len().saturating_sub(1)
    }

    pub(crate) fn add(&mut self, index: usize, delta: i64) {
        let n = self.len();
        if index >= n {
            return;
        }
        let mut i = index + 1;
        while i <= n {
            let cur = self.tree[i] as i128;
            let next = cur + delta as i128;
            debug_assert!(
                next >= 0,
                "Fenwick underflow (idx={i}, cur={cur}, delta={delta})"
            );
            self.tree[i] = next.clamp(0, u64::MAX as i128) as u64;
            i += lsb(i);
        }
    }

    /// Sum of the first `count` values.
    pub(crate) fn prefix_sum(&self, count: usize) -> u64 {
        let mut i = cmp::min(count, self.len());
        let mut sum = 0u64;
        while i > 0 {
            sum = sum.saturating_add(self.tree[i]);
            i &= i - 1;
        }
        sum
    }
}

fn lsb(i: usize) -> usize {
    i & i.wrapping_neg()
}

/// Prefix sums over the unique key sequence that only store *measured* sizes.
///
/// Unmeasured slots are counted instead of summed, so the offset of an index can be evaluated
/// against whatever the current size estimate is:
/// `offset_at(i) = measured_sum(i) + (i - measured_count(i)) * estimate`.
/// Estimates can change on every measurement without forcing a rebuild.
#[derive(Clone, Debug, Default)]
pub(crate) struct MeasuredPrefix {
    sums: Fenwick,
    counts: Fenwick,
    positions: KeyMap<usize>,
}

impl MeasuredPrefix {
    pub(crate) fn rebuild(keys: &[ItemKey], sizes: &SizeTracker) -> Self {
        let mut positions = KeyMap::new();
        for (i, key) in keys.iter().enumerate() {
            positions.entry(key.clone()).or_insert(i);
        }
        let sums = Fenwick::from_values(keys.iter().map(|k| sizes.get(k).unwrap_or(0) as u64));
        let counts = Fenwick::from_values(keys.iter().map(|k| sizes.get(k).is_some() as u64));
        Self {
            sums,
            counts,
            positions,
        }
    }

    /// First index of `key` in the sequence the prefix was built from.
    pub(crate) fn position(&self, key: &ItemKey) -> Option<usize> {
        self.positions.get(key).copied()
    }

    /// Applies a new measurement for `key`; `prev` is the size it replaced, if any.
    pub(crate) fn record(&mut self, key: &ItemKey, size: u32, prev: Option<u32>) {
        let Some(index) = self.position(key) else {
            return;
        };
        match prev {
            Some(prev) => self.sums.add(index, size as i64 - prev as i64),
            None => {
                self.sums.add(index, size as i64);
                self.counts.add(index, 1);
            }
        }
    }

    /// Offset of the item at `index`, i.e. the summed extent of indexes `[0, index)`.
    ///
    /// Indexes past the end of the sequence are treated as unmeasured.
    pub(crate) fn offset_at(&self, index: usize, estimate: u32) -> u64 {
        let measured = self.sums.prefix_sum(index);
        let measured_count = self.counts.prefix_sum(index) as usize;
        let unmeasured = index.saturating_sub(measured_count) as u64;
        measured.saturating_add(unmeasured.saturating_mul(estimate as u64))
    }
}
