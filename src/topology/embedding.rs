//! Cell embeddings: mapping every dart of a cell to one shared line of the
//! cell's attribute container, and keeping that mapping consistent while
//! topology changes.
//!
//! Topological operators never touch embeddings themselves. Every relation
//! change records the darts involved, and when the outermost operation
//! returns, [`GenericMap::update_embeddings`] re-establishes the invariant
//! "one line per cell" for every embedded orbit:
//!
//! - a cell whose darts already agree keeps its line;
//! - a cell made of pieces of several old cells (a merge) keeps the line
//!   held by most of its darts;
//! - a cell that lost its line to another cell in the same pass (a split)
//!   gets a fresh line initialised from the line it was split from, even
//!   when none of its darts was recorded;
//! - a brand-new cell gets a fresh default line.

use crate::data::attribute_container::NO_LINE;
use crate::data::multi_vector::{AttributeColumn, AttributeMultiVector};
use crate::topology::dart::Dart;
use crate::topology::generic_map::{EMBNULL, GenericMap};
use crate::topology::marker::{ScratchMarks, VisitedDarts};
use crate::topology::orbit::Orbit;

impl GenericMap {
    /// Creates the embedding column of `orbit` and gives every cell its own
    /// line. No-op if the orbit is already embedded.
    pub fn init_orbit_embedding(&mut self, orbit: Orbit) {
        if self.is_orbit_embedded(orbit) {
            return;
        }
        let cap = self.containers[Orbit::Dart.index()].capacity();
        let mut col = AttributeMultiVector::<u32>::new(format!("EMB_{}", orbit.name()), cap);
        col.as_mut_slice().fill(EMBNULL);
        self.embeddings[orbit.index()] = Some(col);
        let darts: Vec<Dart> = self.darts().collect();
        let mut cells = 0usize;
        for d in darts {
            if self.embedding(orbit, d) == EMBNULL {
                self.set_orbit_embedding_on_new_cell(orbit, d);
                cells += 1;
            }
        }
        log::debug!("embedded {cells} cells of {orbit}");
    }

    /// Points dart `d` at `line`, moving one reference from its previous
    /// line (if any) to the new one.
    pub(crate) fn set_dart_embedding(&mut self, orbit: Orbit, d: Dart, line: u32) {
        let Some(emb) = self.embeddings[orbit.index()].as_mut() else {
            return;
        };
        let slot = &mut emb.as_mut_slice()[d.index()];
        let old = *slot;
        if old == line {
            return;
        }
        *slot = line;
        let c = &mut self.containers[orbit.index()];
        if line != EMBNULL && c.ref_line(line).is_err() {
            log::warn!("dart {d} embedded on free {orbit} line {line}");
        }
        if old != EMBNULL && c.unref_line(old).is_err() {
            log::warn!("dart {d} released free {orbit} line {old}");
        }
    }

    /// Points every dart of the cell of `d` at `line`.
    pub fn set_orbit_embedding(&mut self, orbit: Orbit, d: Dart, line: u32) {
        for x in self.orbit_darts(orbit, d) {
            self.set_dart_embedding(orbit, x, line);
        }
    }

    /// Gives the cell of `d` a fresh default line and returns it.
    pub fn set_orbit_embedding_on_new_cell(&mut self, orbit: Orbit, d: Dart) -> u32 {
        let line = self.containers[orbit.index()].insert_line();
        self.set_orbit_embedding(orbit, d, line);
        // Drop the creation reference; the darts now hold the line.
        let _ = self.containers[orbit.index()].unref_line(line);
        line
    }

    /// Copies all attribute values of container line `src` into `dst`.
    pub fn copy_cell_attributes(&mut self, orbit: Orbit, dst: u32, src: u32) {
        if let Err(e) = self.containers[orbit.index()].copy_line(dst, src) {
            log::warn!("copy of {orbit} attributes failed: {e}");
        }
    }

    /// Re-establishes one line per cell for every embedded orbit, looking
    /// only at cells containing darts recorded since the last call.
    pub(crate) fn update_embeddings(&mut self) {
        let dirty = std::mem::take(&mut self.dirty);
        if dirty.is_empty() {
            return;
        }
        let orbits: Vec<Orbit> = Orbit::ALL
            .into_iter()
            .skip(1)
            .filter(|o| self.embeddings[o.index()].is_some())
            .collect();
        for orbit in orbits {
            self.repair_orbit(orbit, &dirty);
        }
    }

    fn repair_orbit(&mut self, orbit: Orbit, dirty: &[Dart]) {
        let mut done = ScratchMarks::new(self, Orbit::Dart);
        let mut claimed = ScratchMarks::new(self, orbit);
        let mut seeds = dirty.to_vec();
        loop {
            // Lines handed out this round with the size of their cell, and
            // lines some repaired cell gave up.
            let mut given: Vec<(u32, usize)> = Vec::new();
            let mut dropped: Vec<u32> = Vec::new();
            for &seed in &seeds {
                if !self.is_dart(seed) || done.contains_dart(self, seed) {
                    continue;
                }
                let cell = self.orbit_darts(orbit, seed);
                // Candidate lines in order of first appearance, with counts.
                let mut candidates: Vec<(u32, usize)> = Vec::new();
                for &x in &cell {
                    let l = self.embedding(orbit, x);
                    if l == EMBNULL {
                        continue;
                    }
                    match candidates.iter_mut().find(|(c, _)| *c == l) {
                        Some((_, n)) => *n += 1,
                        None => candidates.push((l, 1)),
                    }
                }
                candidates.sort_by(|a, b| b.1.cmp(&a.1));
                let line = match candidates.iter().find(|(l, _)| !claimed.contains(self, *l)) {
                    Some(&(l, _)) => l,
                    None => {
                        let fresh = self.containers[orbit.index()].insert_line();
                        if let Some(&(src, _)) = candidates.first() {
                            self.copy_cell_attributes(orbit, fresh, src);
                        }
                        fresh
                    }
                };
                let fresh = !candidates.iter().any(|(l, _)| *l == line);
                for &x in &cell {
                    self.set_dart_embedding(orbit, x, line);
                }
                if fresh {
                    let _ = self.containers[orbit.index()].unref_line(line);
                }
                dropped.extend(candidates.iter().map(|&(l, _)| l).filter(|&l| l != line));
                given.push((line, cell.len()));
                claimed.insert(self, line);
                for x in cell {
                    done.insert_dart(self, x);
                }
            }
            // A line still held outside the cells repaired above belongs to
            // a piece of a split cell that no recorded dart reached.
            let c = &self.containers[orbit.index()];
            let mut stray: Vec<u32> = given
                .iter()
                .filter(|&&(l, n)| c.ref_count(l) as usize > n)
                .map(|&(l, _)| l)
                .collect();
            stray.extend(
                dropped
                    .into_iter()
                    .filter(|&l| c.is_used(l) && !claimed.contains(self, l)),
            );
            if stray.is_empty() {
                break;
            }
            seeds = self
                .darts()
                .filter(|&x| !done.contains_dart(self, x) && stray.contains(&self.embedding(orbit, x)))
                .collect();
            if seeds.is_empty() {
                break;
            }
            log::trace!("{} {orbit} darts left on split lines", seeds.len());
        }
        done.release(self);
        claimed.release(self);
    }

    /// Gives the cell of `dst` a fresh line holding a copy of the
    /// attributes of the cell of `src`. No-op when `orbit` is not embedded
    /// or `src` has no line.
    pub(crate) fn inherit_cell(&mut self, orbit: Orbit, src: Dart, dst: Dart) {
        if !self.is_orbit_embedded(orbit) {
            return;
        }
        let line = self.embedding(orbit, src);
        if line == EMBNULL {
            return;
        }
        let fresh = self.set_orbit_embedding_on_new_cell(orbit, dst);
        self.copy_cell_attributes(orbit, fresh, line);
    }

    /// Number of cells of `orbit`, counted through the embedding when the
    /// orbit is embedded.
    pub fn nb_cells(&self, orbit: Orbit) -> usize {
        if orbit == Orbit::Dart {
            return self.nb_darts();
        }
        if self.is_orbit_embedded(orbit) {
            return self.containers[orbit.index()].size();
        }
        let mut seen = VisitedDarts::new(self);
        let mut n = 0;
        for d in self.darts() {
            if seen.contains(d) {
                continue;
            }
            n += 1;
            self.foreach_dart_of_orbit(orbit, d, |x| {
                seen.insert(x);
                false
            });
        }
        n
    }

    /// Removes every hole from every container and renumbers darts and
    /// lines accordingly. Outstanding darts and line indices are invalidated.
    pub fn compact(&mut self) {
        for orbit in Orbit::ALL.into_iter().skip(1) {
            if self.embeddings[orbit.index()].is_none() {
                continue;
            }
            let remap = self.containers[orbit.index()].compact();
            if let Some(emb) = self.embeddings[orbit.index()].as_mut() {
                for l in emb.as_mut_slice() {
                    if *l != EMBNULL {
                        *l = remap[*l as usize];
                    }
                }
            }
        }
        let remap = self.containers[Orbit::Dart.index()].compact();
        let len = self.containers[Orbit::Dart.index()].capacity();
        let moved = |d: Dart| Dart::new(remap[d.index()]);
        for rel in &mut self.relations {
            let old = rel.as_slice().to_vec();
            for (i, &new) in remap.iter().enumerate() {
                if new != NO_LINE {
                    rel.as_mut_slice()[new as usize] = moved(old[i]);
                }
            }
            rel.resize(len);
        }
        for emb in self.embeddings.iter_mut().flatten() {
            let old = emb.as_slice().to_vec();
            for (i, &new) in remap.iter().enumerate() {
                if new != NO_LINE {
                    emb.as_mut_slice()[new as usize] = old[i];
                }
            }
            emb.resize(len);
        }
        log::debug!("compacted map to {len} darts");
    }
}
