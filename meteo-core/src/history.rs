//! Fixed-Size History Window for Change Detection
//!
//! ## Overview
//!
//! The change detector compares the newest snapshot against the oldest one
//! it still remembers. This module provides the bounded, oldest-first
//! window holding those snapshots, with capacity fixed at compile time
//! through const generics so the detector never allocates.
//!
//! ## Eviction and the Drifting Baseline
//!
//! Once the window is full, every push evicts exactly one entry: the
//! oldest. The "baseline" used for comparison is therefore not fixed; it
//! is whatever entry is currently oldest and moves forward by one sample on
//! every insertion after the window fills:
//!
//! ```text
//! HistoryWindow<4>, after pushing a, b, c, d:   [a, b, c, d]   baseline = a
//! push(e) evicts a:                              [b, c, d, e]   baseline = b
//! push(f) evicts b:                              [c, d, e, f]   baseline = c
//! ```
//!
//! ### Memory Layout
//!
//! Storage is an array of `Option<T>` plus a write position, so a push is a
//! single slot write and the oldest entry is found without shifting:
//!
//! ```text
//! Physical array:  [e, f, c, d]  (write_pos = 2)
//!                   0  1  2  3
//!
//! Logical view:    [c, d, e, f]  (oldest first)
//! ```
//!
//! ## Usage Example
//!
//! ```rust
//! use meteo_core::history::HistoryWindow;
//!
//! let mut window: HistoryWindow<u32, 3> = HistoryWindow::new();
//! window.push(1);
//! window.push(2);
//! window.push(3);
//!
//! // Full: the next push hands back the evicted oldest entry
//! assert_eq!(window.push(4), Some(1));
//! assert_eq!(window.oldest(), Some(&2));
//! assert_eq!(window.newest(), Some(&4));
//! ```

/// Bounded FIFO of `T`, oldest first
///
/// ## Internal Invariants
///
/// - `write_pos < N`
/// - `len <= N`
/// - When `len == N`, the oldest entry sits at `write_pos`
#[derive(Debug, Clone)]
pub struct HistoryWindow<T: Copy, const N: usize> {
    data: [Option<T>; N],

    /// Index where the next write will occur
    write_pos: usize,

    /// Current number of valid entries
    len: usize,
}

impl<T: Copy, const N: usize> HistoryWindow<T, N> {
    /// Creates a new empty window
    pub const fn new() -> Self {
        Self {
            data: [None; N],
            write_pos: 0,
            len: 0,
        }
    }

    /// Maximum number of entries retained
    pub const fn capacity(&self) -> usize {
        N
    }

    /// Appends an entry, evicting and returning the oldest when full
    pub fn push(&mut self, entry: T) -> Option<T> {
        let evicted = if self.is_full() {
            self.evict_oldest()
        } else {
            None
        };

        self.data[self.write_pos] = Some(entry);
        self.write_pos = (self.write_pos + 1) % N;
        self.len += 1;

        evicted
    }

    /// Removes and returns the oldest entry
    pub fn evict_oldest(&mut self) -> Option<T> {
        if self.is_empty() {
            return None;
        }

        let idx = self.physical_index(0);
        self.len -= 1;
        self.data[idx].take()
    }

    /// Get number of stored entries
    pub fn len(&self) -> usize {
        self.len
    }

    /// Check if window is empty
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Check if window is full
    pub fn is_full(&self) -> bool {
        self.len == N
    }

    /// The current baseline
    pub fn oldest(&self) -> Option<&T> {
        self.get(0)
    }

    /// The most recent entry
    pub fn newest(&self) -> Option<&T> {
        if self.is_empty() {
            return None;
        }
        self.get(self.len - 1)
    }

    /// Iterate over entries from oldest to newest
    pub fn iter(&self) -> HistoryIter<'_, T, N> {
        HistoryIter {
            window: self,
            index: 0,
        }
    }

    /// Drop every entry
    pub fn clear(&mut self) {
        self.data = [None; N];
        self.write_pos = 0;
        self.len = 0;
    }

    /// Entry at logical index (0 = oldest, len-1 = newest)
    pub fn get(&self, index: usize) -> Option<&T> {
        if index >= self.len {
            return None;
        }
        self.data[self.physical_index(index)].as_ref()
    }

    /// Maps a logical index onto the backing array.
    ///
    /// The oldest entry sits `len` slots behind the write position.
    fn physical_index(&self, index: usize) -> usize {
        (self.write_pos + N - self.len + index) % N
    }
}

/// Iterator over window contents, oldest first
pub struct HistoryIter<'a, T: Copy, const N: usize> {
    window: &'a HistoryWindow<T, N>,
    index: usize,
}

impl<'a, T: Copy, const N: usize> Iterator for HistoryIter<'a, T, N> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        let item = self.window.get(self.index)?;
        self.index += 1;
        Some(item)
    }
}

impl<T: Copy, const N: usize> Default for HistoryWindow<T, N> {
    fn default() -> Self {
        Self::new()
    }
}
