//! AttributeContainer: a growable table of named, typed columns addressed by
//! free-listed line indices.
//!
//! Each orbit of a map owns one container. Lines are reference counted so
//! that several darts (or several cells) can share one embedded line; a line
//! only returns to the free list when its count drops to zero, at which
//! point every column and every mark word of that line is reset.
//!
//! Besides user columns, a container owns one [`MarkColumn`] per thread
//! slot. Marks live here rather than in the map so that compaction moves
//! them together with the rest of the line.

use crate::data::marker_set::MarkColumn;
use crate::data::multi_vector::{AttributeColumn, AttributeMultiVector, AttributeValue};
use crate::map_error::MapError;

/// Sentinel returned by [`AttributeContainer::compact`] for lines that were
/// free before compaction.
pub const NO_LINE: u32 = u32::MAX;

/// A table of columns sharing one line allocator.
///
/// # Invariants
/// - `refs.len()` equals the capacity; every column and every mark column
///   has exactly that many lines.
/// - A line is allocated iff `refs[line] > 0`; free lines are exactly the
///   entries of `free`.
/// - `nb_used` counts allocated lines.
#[derive(Debug, Default)]
pub struct AttributeContainer {
    refs: Vec<u32>,
    free: Vec<u32>,
    nb_used: usize,
    columns: Vec<Option<Box<dyn AttributeColumn>>>,
    marks: Vec<MarkColumn>,
}

impl AttributeContainer {
    /// Creates an empty container with `thread_slots` mark columns.
    pub fn new(thread_slots: usize) -> Self {
        Self {
            marks: (0..thread_slots.max(1)).map(|_| MarkColumn::new(0)).collect(),
            ..Self::default()
        }
    }

    /// Total number of lines, allocated or free.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.refs.len()
    }

    /// Number of allocated lines.
    #[inline]
    pub fn size(&self) -> usize {
        self.nb_used
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nb_used == 0
    }

    #[inline]
    pub fn is_used(&self, line: u32) -> bool {
        self.refs.get(line as usize).is_some_and(|&r| r > 0)
    }

    /// Current reference count of `line` (0 when free).
    #[inline]
    pub fn ref_count(&self, line: u32) -> u32 {
        self.refs.get(line as usize).copied().unwrap_or(0)
    }

    /// Pre-allocates room for `additional` lines.
    pub fn reserve(&mut self, additional: usize) {
        self.refs.reserve(additional);
    }

    fn grow_to(&mut self, len: usize) {
        self.refs.resize(len, 0);
        for col in self.columns.iter_mut().flatten() {
            col.resize(len);
        }
        for m in &mut self.marks {
            m.resize(len);
        }
    }

    /// Allocates a line with reference count 1, reusing the most recently
    /// freed slot when one exists.
    pub fn insert_line(&mut self) -> u32 {
        let line = match self.free.pop() {
            Some(line) => line,
            None => {
                let line = self.refs.len() as u32;
                self.grow_to(line as usize + 1);
                line
            }
        };
        self.refs[line as usize] = 1;
        self.nb_used += 1;
        line
    }

    fn check_used(&self, line: u32) -> Result<(), MapError> {
        if self.is_used(line) {
            Ok(())
        } else {
            Err(MapError::InvalidHandle {
                what: "container line",
                index: line,
            })
        }
    }

    /// Adds one reference to an allocated line.
    pub fn ref_line(&mut self, line: u32) -> Result<(), MapError> {
        self.check_used(line)?;
        self.refs[line as usize] += 1;
        Ok(())
    }

    /// Drops one reference; frees and resets the line when none remain.
    /// Returns `true` if the line was freed.
    pub fn unref_line(&mut self, line: u32) -> Result<bool, MapError> {
        self.check_used(line)?;
        let r = &mut self.refs[line as usize];
        *r -= 1;
        if *r > 0 {
            return Ok(false);
        }
        let idx = line as usize;
        for col in self.columns.iter_mut().flatten() {
            col.reset_line(idx);
        }
        for m in &mut self.marks {
            m.reset_line(idx);
        }
        self.free.push(line);
        self.nb_used -= 1;
        Ok(true)
    }

    /// Same as [`unref_line`](Self::unref_line): a line is removed by
    /// releasing the reference its creator holds.
    #[inline]
    pub fn remove_line(&mut self, line: u32) -> Result<bool, MapError> {
        self.unref_line(line)
    }

    /// Copies every user column of line `src` into line `dst`.
    pub fn copy_line(&mut self, dst: u32, src: u32) -> Result<(), MapError> {
        self.check_used(dst)?;
        self.check_used(src)?;
        for col in self.columns.iter_mut().flatten() {
            col.copy_line(dst as usize, src as usize);
        }
        Ok(())
    }

    /// Resets every user column of `line` to default values.
    pub fn init_line(&mut self, line: u32) -> Result<(), MapError> {
        self.check_used(line)?;
        for col in self.columns.iter_mut().flatten() {
            col.reset_line(line as usize);
        }
        Ok(())
    }

    /// First allocated line, or [`end`](Self::end) when empty.
    pub fn begin(&self) -> u32 {
        self.next_from(0)
    }

    /// Next allocated line strictly after `line`.
    pub fn next(&self, line: u32) -> u32 {
        self.next_from(line.saturating_add(1))
    }

    /// One past the last line; the terminal value of `begin`/`next`.
    #[inline]
    pub fn end(&self) -> u32 {
        self.refs.len() as u32
    }

    fn next_from(&self, start: u32) -> u32 {
        let start = start as usize;
        self.refs
            .get(start..)
            .and_then(|tail| tail.iter().position(|&r| r > 0))
            .map_or(self.end(), |off| (start + off) as u32)
    }

    /// Iterator over allocated lines in index order.
    pub fn lines(&self) -> impl Iterator<Item = u32> + '_ {
        self.refs
            .iter()
            .enumerate()
            .filter(|(_, r)| **r > 0)
            .map(|(i, _)| i as u32)
    }

    // --- columns ---

    /// Index of the live column called `name`.
    pub fn find_column(&self, name: &str) -> Option<usize> {
        self.columns
            .iter()
            .position(|c| c.as_ref().is_some_and(|c| c.name() == name))
    }

    /// Adds a typed column, default-valued on every existing line.
    ///
    /// Returns `None` if a column with that name already exists.
    pub fn add_column<T: AttributeValue>(&mut self, name: &str) -> Option<usize> {
        if self.find_column(name).is_some() {
            return None;
        }
        let col = AttributeMultiVector::<T>::new(name, self.capacity());
        Some(self.push_column(Box::new(col)))
    }

    /// Adds an already-built column (used when loading). Its length is
    /// adjusted to the container capacity.
    pub fn push_column(&mut self, mut col: Box<dyn AttributeColumn>) -> usize {
        col.resize(self.capacity());
        // Slots of removed columns are never reused, so a stale handle
        // cannot alias a newer column.
        self.columns.push(Some(col));
        self.columns.len() - 1
    }

    /// Removes a column. Returns `false` if it did not exist.
    pub fn remove_column(&mut self, index: usize) -> bool {
        self.columns
            .get_mut(index)
            .and_then(Option::take)
            .is_some()
    }

    pub fn column_dyn(&self, index: usize) -> Option<&dyn AttributeColumn> {
        self.columns.get(index)?.as_deref()
    }

    /// Typed view of a column; `None` if missing or of another type.
    pub fn column<T: AttributeValue>(&self, index: usize) -> Option<&AttributeMultiVector<T>> {
        self.column_dyn(index)?
            .as_any()
            .downcast_ref::<AttributeMultiVector<T>>()
    }

    pub fn column_mut<T: AttributeValue>(
        &mut self,
        index: usize,
    ) -> Option<&mut AttributeMultiVector<T>> {
        self.columns
            .get_mut(index)?
            .as_deref_mut()?
            .as_any_mut()
            .downcast_mut::<AttributeMultiVector<T>>()
    }

    /// Live columns with their indices.
    pub fn columns(&self) -> impl Iterator<Item = (usize, &dyn AttributeColumn)> + '_ {
        self.columns
            .iter()
            .enumerate()
            .filter_map(|(i, c)| c.as_deref().map(|c| (i, c)))
    }

    // --- marks ---

    /// Number of mark columns (one per thread slot).
    #[inline]
    pub fn thread_slots(&self) -> usize {
        self.marks.len()
    }

    #[inline]
    pub fn mark_column(&self, thread: usize) -> Option<&MarkColumn> {
        self.marks.get(thread)
    }

    /// Mark column of a thread slot already validated by the caller.
    #[inline]
    pub(crate) fn marks(&self, thread: usize) -> &MarkColumn {
        &self.marks[thread]
    }

    /// Appends one mark column for a new thread slot.
    pub fn add_mark_column(&mut self) -> usize {
        self.marks.push(MarkColumn::new(self.capacity()));
        self.marks.len() - 1
    }

    // --- persistence support ---

    pub(crate) fn ref_counts(&self) -> &[u32] {
        &self.refs
    }

    /// Rebuilds the allocator state from persisted reference counts.
    /// Columns are dropped and must be pushed again afterwards.
    pub(crate) fn restore_lines(&mut self, refs: Vec<u32>) {
        let len = refs.len();
        self.columns.clear();
        self.nb_used = refs.iter().filter(|&&r| r > 0).count();
        self.free = (0..len as u32).rev().filter(|&l| refs[l as usize] == 0).collect();
        self.refs = refs;
        for m in &mut self.marks {
            *m = MarkColumn::new(len);
        }
    }

    /// Moves every allocated line down into the holes so that lines occupy
    /// `0..size()`, then shrinks the capacity.
    ///
    /// Returns the old→new index table (entries of free lines are
    /// [`NO_LINE`]). Relative order of allocated lines is preserved.
    pub fn compact(&mut self) -> Vec<u32> {
        let mut remap = vec![NO_LINE; self.capacity()];
        let mut next = 0usize;
        for old in 0..self.capacity() {
            if self.refs[old] == 0 {
                continue;
            }
            remap[old] = next as u32;
            if next != old {
                // `next < old` and every line below `old` was already moved.
                self.refs[next] = self.refs[old];
                for col in self.columns.iter_mut().flatten() {
                    col.copy_line(next, old);
                }
                for m in &mut self.marks {
                    m.copy_line(next, old);
                }
            }
            next += 1;
        }
        self.refs.truncate(next);
        for col in self.columns.iter_mut().flatten() {
            col.resize(next);
        }
        for m in &mut self.marks {
            m.resize(next);
        }
        self.free.clear();
        self.nb_used = next;
        remap
    }
}

impl Clone for AttributeContainer {
    /// Clones lines and columns. Marks are not part of the value: the clone
    /// starts with every mark word cleared.
    fn clone(&self) -> Self {
        let len = self.capacity();
        Self {
            refs: self.refs.clone(),
            free: self.free.clone(),
            nb_used: self.nb_used,
            columns: self
                .columns
                .iter()
                .map(|c| c.as_ref().map(|c| c.clone_box()))
                .collect(),
            marks: self.marks.iter().map(|_| MarkColumn::new(len)).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_reuses_freed_lines() {
        let mut c = AttributeContainer::new(1);
        let a = c.insert_line();
        let b = c.insert_line();
        assert_eq!((a, b), (0, 1));
        assert!(c.remove_line(a).unwrap());
        assert_eq!(c.size(), 1);
        assert_eq!(c.insert_line(), a);
        assert_eq!(c.capacity(), 2);
    }

    #[test]
    fn refcount_delays_free() {
        let mut c = AttributeContainer::new(1);
        let l = c.insert_line();
        c.ref_line(l).unwrap();
        assert!(!c.unref_line(l).unwrap());
        assert!(c.is_used(l));
        assert!(c.unref_line(l).unwrap());
        assert!(!c.is_used(l));
        assert!(matches!(
            c.unref_line(l),
            Err(MapError::InvalidHandle { index: 0, .. })
        ));
    }

    #[test]
    fn freed_lines_are_reset() {
        let mut c = AttributeContainer::new(1);
        let idx = c.add_column::<i32>("v").unwrap();
        let l = c.insert_line();
        *c.column_mut::<i32>(idx).unwrap().get_mut(l as usize).unwrap() = 9;
        c.remove_line(l).unwrap();
        let l2 = c.insert_line();
        assert_eq!(c.column::<i32>(idx).unwrap().get(l2 as usize), Some(&0));
    }

    #[test]
    fn begin_next_skip_free_lines() {
        let mut c = AttributeContainer::new(1);
        for _ in 0..5 {
            c.insert_line();
        }
        c.remove_line(0).unwrap();
        c.remove_line(3).unwrap();
        let mut seen = Vec::new();
        let mut l = c.begin();
        while l != c.end() {
            seen.push(l);
            l = c.next(l);
        }
        assert_eq!(seen, vec![1, 2, 4]);
        assert_eq!(c.lines().collect::<Vec<_>>(), seen);
    }

    #[test]
    fn columns_are_typed_and_named() {
        let mut c = AttributeContainer::new(1);
        let idx = c.add_column::<f32>("w").unwrap();
        assert!(c.add_column::<f32>("w").is_none());
        assert!(c.column::<f64>(idx).is_none());
        assert_eq!(c.find_column("w"), Some(idx));
        assert!(c.remove_column(idx));
        assert!(c.column::<f32>(idx).is_none());
        let again = c.add_column::<f32>("w").unwrap();
        assert_ne!(again, idx);
    }

    #[test]
    fn compact_moves_lines_and_values() {
        let mut c = AttributeContainer::new(1);
        let idx = c.add_column::<u64>("id").unwrap();
        for i in 0..6u64 {
            let l = c.insert_line();
            *c.column_mut::<u64>(idx).unwrap().get_mut(l as usize).unwrap() = i * 10;
        }
        c.remove_line(1).unwrap();
        c.remove_line(2).unwrap();
        c.remove_line(4).unwrap();
        let remap = c.compact();
        assert_eq!(remap, vec![0, NO_LINE, NO_LINE, 1, NO_LINE, 2]);
        assert_eq!(c.capacity(), 3);
        assert_eq!(c.column::<u64>(idx).unwrap().as_slice(), &[0, 30, 50]);
        assert_eq!(c.insert_line(), 3);
    }
}
