//! Bounded bit-pool allocator for marks, and the per-line bit columns the
//! marks are written to.
//!
//! Every orbit container owns one [`MarkColumn`] per thread slot; every
//! `(orbit, thread)` pair owns one [`MarkerSet`] that leases bit positions
//! of that column. Bits are atomics so that read-only traversals running on
//! different worker threads can mark their own slot through a shared map.

use std::sync::atomic::{AtomicU32, Ordering};

/// Number of marks available per orbit and thread slot.
pub const NB_MARKS: u32 = 32;

/// One leased bit position.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Mark(u8);

impl Mark {
    pub(crate) const fn from_position(pos: u8) -> Mark {
        assert!((pos as u32) < NB_MARKS);
        Mark(pos)
    }

    /// Bit position in `[0, NB_MARKS)`.
    #[inline]
    pub const fn position(self) -> u32 {
        self.0 as u32
    }

    #[inline]
    pub(crate) const fn bit(self) -> u32 {
        1u32 << self.0
    }
}

/// Bit allocator: grants and releases one mark at a time.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MarkerSet {
    used: u32,
}

impl MarkerSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the lowest unused mark, or `None` once all
    /// [`NB_MARKS`] bits are leased.
    pub fn get_new_mark(&mut self) -> Option<Mark> {
        let free = !self.used;
        if free == 0 {
            return None;
        }
        let pos = free.trailing_zeros();
        self.used |= 1 << pos;
        Some(Mark(pos as u8))
    }

    /// Leases a specific mark. Returns `false` if it was already taken.
    pub fn reserve(&mut self, mark: Mark) -> bool {
        let free = self.used & mark.bit() == 0;
        self.used |= mark.bit();
        free
    }

    /// Returns `mark` to the pool. Returns `false` on double release.
    pub fn release_mark(&mut self, mark: Mark) -> bool {
        let was_used = self.used & mark.bit() != 0;
        self.used &= !mark.bit();
        was_used
    }

    #[inline]
    pub fn is_used(&self, mark: Mark) -> bool {
        self.used & mark.bit() != 0
    }

    /// Number of marks currently leased.
    #[inline]
    pub fn nb_used(&self) -> u32 {
        self.used.count_ones()
    }
}

/// One 32-bit mark word per container line.
#[derive(Debug, Default)]
pub struct MarkColumn {
    bits: Vec<AtomicU32>,
}

impl MarkColumn {
    pub fn new(len: usize) -> Self {
        let mut col = Self::default();
        col.resize(len);
        col
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.bits.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }

    pub fn resize(&mut self, len: usize) {
        self.bits.resize_with(len, || AtomicU32::new(0));
    }

    #[inline]
    pub fn mark(&self, line: usize, mark: Mark) {
        self.bits[line].fetch_or(mark.bit(), Ordering::Relaxed);
    }

    #[inline]
    pub fn unmark(&self, line: usize, mark: Mark) {
        self.bits[line].fetch_and(!mark.bit(), Ordering::Relaxed);
    }

    #[inline]
    pub fn is_marked(&self, line: usize, mark: Mark) -> bool {
        self.bits
            .get(line)
            .is_some_and(|w| w.load(Ordering::Relaxed) & mark.bit() != 0)
    }

    /// Clears `mark` on every line.
    pub fn unmark_all(&self, mark: Mark) {
        for w in &self.bits {
            w.fetch_and(!mark.bit(), Ordering::Relaxed);
        }
    }

    /// Sets `mark` on every line.
    pub fn mark_all(&self, mark: Mark) {
        for w in &self.bits {
            w.fetch_or(mark.bit(), Ordering::Relaxed);
        }
    }

    /// `true` if no line carries `mark`.
    pub fn is_all_unmarked(&self, mark: Mark) -> bool {
        self.bits
            .iter()
            .all(|w| w.load(Ordering::Relaxed) & mark.bit() == 0)
    }

    pub(crate) fn reset_line(&mut self, line: usize) {
        if let Some(w) = self.bits.get_mut(line) {
            *w.get_mut() = 0;
        }
    }

    pub(crate) fn copy_line(&mut self, dst: usize, src: usize) {
        let v = self.bits[src].load(Ordering::Relaxed);
        *self.bits[dst].get_mut() = v;
    }
}
