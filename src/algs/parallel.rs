//! Parallel cell traversal on the rayon pool.
//!
//! Representatives are collected once on the calling thread, split into one
//! chunk per thread slot of the map, and each chunk is processed by a rayon
//! task that receives its slot index. Functors may lease markers on that
//! slot (for instance with [`DartMarker::on_thread`]) without contending for
//! the mark pool of another worker.
//!
//! The map is only borrowed immutably, so functors are read-only with
//! respect to topology; attribute writes must go through interior
//! mutability or be collected and applied afterwards.
//!
//! [`DartMarker::on_thread`]: crate::topology::marker::DartMarker::on_thread

use crate::algs::traversor::TraversorCell;
use crate::map_error::MapError;
use crate::topology::dart::Dart;
use crate::topology::generic_map::CombinatorialMap;
use crate::topology::orbit::Orbit;
use rayon::prelude::*;

/// Calls `f(d, slot)` on one dart of every non-boundary cell of `orbit`.
///
/// The number of concurrent chunks equals
/// [`nb_thread_slots`](crate::topology::generic_map::GenericMap::nb_thread_slots);
/// call [`add_thread_marker`](CombinatorialMap::add_thread_marker) first to
/// get more parallelism.
pub fn par_foreach_cell<M, F>(map: &M, orbit: Orbit, f: F) -> Result<(), MapError>
where
    M: CombinatorialMap + Sync + ?Sized,
    F: Fn(Dart, usize) + Sync,
{
    let cells: Vec<Dart> = TraversorCell::new(map, orbit)?.collect();
    let slots = map.generic().nb_thread_slots();
    if cells.is_empty() {
        return Ok(());
    }
    let chunk = cells.len().div_ceil(slots);
    log::debug!(
        "parallel traversal of {} {orbit} cells in chunks of {chunk}",
        cells.len()
    );
    cells.par_chunks(chunk).enumerate().for_each(|(slot, darts)| {
        for &d in darts {
            f(d, slot);
        }
    });
    Ok(())
}

/// Like [`par_foreach_cell`] but gathers one value per cell, in traversal
/// order.
pub fn par_map_cells<M, F, T>(map: &M, orbit: Orbit, f: F) -> Result<Vec<T>, MapError>
where
    M: CombinatorialMap + Sync + ?Sized,
    F: Fn(Dart, usize) -> T + Sync,
    T: Send,
{
    let cells: Vec<Dart> = TraversorCell::new(map, orbit)?.collect();
    let slots = map.generic().nb_thread_slots();
    let chunk = cells.len().div_ceil(slots).max(1);
    Ok(cells
        .par_chunks(chunk)
        .enumerate()
        .flat_map_iter(|(slot, darts)| darts.iter().map(move |&d| (d, slot)))
        .map(|(d, slot)| f(d, slot))
        .collect())
}
