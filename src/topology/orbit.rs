//! Orbits: the cell kinds of a combinatorial map and the traversal rule
//! that enumerates the darts of one cell.
//!
//! Orbits are never materialised. `foreach_dart_of_orbit` walks the darts
//! reachable from a seed through the generating relations of the orbit,
//! which depend on the map dimension:
//!
//! | orbit     | Map1        | Map2                | Map3                    |
//! |-----------|-------------|---------------------|-------------------------|
//! | `Vertex`  | `{d}`       | `phi2∘phi_1` fan    | `<phi2∘phi_1, phi3∘phi_1>` |
//! | `Edge`    | `{d}`       | `{d, phi2 d}`       | `<phi2, phi3>`          |
//! | `Face`    | `phi1` cycle| `phi1` cycle        | `<phi1, phi3>`          |
//! | `Volume`  | `phi1` cycle| `<phi1, phi2>`      | `<phi1, phi2>`          |
//!
//! `Vertex1`/`Edge1` are the in-face restrictions (always `{d}`);
//! `Vertex2`/`Edge2`/`Face2` are the in-volume restrictions (the Map2 rule).
//!
//! Every walk tolerates fixed points of `phi2`/`phi3`, which exist while a
//! mesh is being built without boundary.

use crate::topology::dart::Dart;
use crate::topology::generic_map::{GenericMap, MapKind};
use crate::topology::marker::VisitedDarts;

/// Number of orbit kinds, and therefore of attribute containers per map.
pub const NB_ORBITS: usize = 10;

/// Cell kinds.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize,
)]
#[repr(u8)]
pub enum Orbit {
    Dart = 0,
    Vertex = 1,
    Edge = 2,
    Face = 3,
    Volume = 4,
    Vertex1 = 5,
    Edge1 = 6,
    Vertex2 = 7,
    Edge2 = 8,
    Face2 = 9,
}

impl Orbit {
    pub const ALL: [Orbit; NB_ORBITS] = [
        Orbit::Dart,
        Orbit::Vertex,
        Orbit::Edge,
        Orbit::Face,
        Orbit::Volume,
        Orbit::Vertex1,
        Orbit::Edge1,
        Orbit::Vertex2,
        Orbit::Edge2,
        Orbit::Face2,
    ];

    /// Container index of this orbit.
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(i: usize) -> Option<Orbit> {
        Orbit::ALL.get(i).copied()
    }

    /// Short upper-case name, as used in persisted column names.
    pub const fn name(self) -> &'static str {
        match self {
            Orbit::Dart => "DART",
            Orbit::Vertex => "VERTEX",
            Orbit::Edge => "EDGE",
            Orbit::Face => "FACE",
            Orbit::Volume => "VOLUME",
            Orbit::Vertex1 => "VERTEX1",
            Orbit::Edge1 => "EDGE1",
            Orbit::Vertex2 => "VERTEX2",
            Orbit::Edge2 => "EDGE2",
            Orbit::Face2 => "FACE2",
        }
    }
}

impl std::fmt::Display for Orbit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

type Step = fn(&GenericMap, Dart) -> Dart;

impl GenericMap {
    /// Applies `f` to every dart of the `orbit` of `d`, each exactly once.
    ///
    /// `f` returning `true` stops the walk; the function then returns `true`.
    pub fn foreach_dart_of_orbit<F>(&self, orbit: Orbit, d: Dart, mut f: F) -> bool
    where
        F: FnMut(Dart) -> bool,
    {
        match (self.kind(), orbit) {
            (_, Orbit::Dart | Orbit::Vertex1 | Orbit::Edge1) => f(d),
            (MapKind::Map1, Orbit::Vertex | Orbit::Edge | Orbit::Vertex2 | Orbit::Edge2) => f(d),
            (MapKind::Map1, Orbit::Face | Orbit::Volume | Orbit::Face2) => self.foreach_phi1(d, f),
            (_, Orbit::Face2) | (MapKind::Map2, Orbit::Face) => self.foreach_phi1(d, f),
            (_, Orbit::Vertex2) | (MapKind::Map2, Orbit::Vertex) => self.foreach_fan(d, f),
            (_, Orbit::Edge2) | (MapKind::Map2, Orbit::Edge) => {
                let e = self.phi2(d);
                f(d) || (e != d && f(e))
            }
            (_, Orbit::Volume) => self.foreach_bfs(d, &[GenericMap::phi1, GenericMap::phi2], f),
            (MapKind::Map3, Orbit::Face) => {
                let e = self.phi3(d);
                self.foreach_phi1(d, &mut f) || (e != d && self.foreach_phi1(e, &mut f))
            }
            (MapKind::Map3, Orbit::Edge) => {
                self.foreach_bfs(d, &[GenericMap::phi2, GenericMap::phi3], f)
            }
            (MapKind::Map3, Orbit::Vertex) => self.foreach_bfs(
                d,
                &[
                    |m, x| {
                        let p = m.phi_1(x);
                        let y = m.phi2(p);
                        if y == p { x } else { y }
                    },
                    |m, x| {
                        let y = m.phi2(x);
                        if y == x { x } else { m.phi1(y) }
                    },
                    |m, x| {
                        let p = m.phi_1(x);
                        let y = m.phi3(p);
                        if y == p { x } else { y }
                    },
                    |m, x| {
                        let y = m.phi3(x);
                        if y == x { x } else { m.phi1(y) }
                    },
                ],
                f,
            ),
        }
    }

    /// Collects the darts of the `orbit` of `d`.
    pub fn orbit_darts(&self, orbit: Orbit, d: Dart) -> Vec<Dart> {
        let mut v = Vec::new();
        self.foreach_dart_of_orbit(orbit, d, |x| {
            v.push(x);
            false
        });
        v
    }

    /// Number of darts in the `orbit` of `d`.
    pub fn orbit_size(&self, orbit: Orbit, d: Dart) -> usize {
        let mut n = 0;
        self.foreach_dart_of_orbit(orbit, d, |_| {
            n += 1;
            false
        });
        n
    }

    /// `true` if `e` lies in the `orbit` of `d`.
    pub fn same_orbit(&self, orbit: Orbit, d: Dart, e: Dart) -> bool {
        self.foreach_dart_of_orbit(orbit, d, |x| x == e)
    }

    fn foreach_phi1<F: FnMut(Dart) -> bool>(&self, d: Dart, mut f: F) -> bool {
        let mut x = d;
        loop {
            if f(x) {
                return true;
            }
            x = self.phi1(x);
            if x == d {
                return false;
            }
        }
    }

    /// Darts sharing the origin of `d` inside its surface. Turns with
    /// `phi2∘phi_1`; if a fixed point of `phi2` opens the fan, the other
    /// side is walked with `phi1∘phi2`.
    fn foreach_fan<F: FnMut(Dart) -> bool>(&self, d: Dart, mut f: F) -> bool {
        let mut x = d;
        loop {
            if f(x) {
                return true;
            }
            let p = self.phi_1(x);
            let n = self.phi2(p);
            if n == p {
                break;
            }
            x = n;
            if x == d {
                return false;
            }
        }
        let mut x = d;
        loop {
            let t = self.phi2(x);
            if t == x {
                return false;
            }
            x = self.phi1(t);
            if f(x) {
                return true;
            }
        }
    }

    /// Breadth-first closure of `d` under `steps`. A step returning its
    /// argument is treated as "no neighbour".
    fn foreach_bfs<F: FnMut(Dart) -> bool>(&self, d: Dart, steps: &[Step], mut f: F) -> bool {
        let mut seen = VisitedDarts::new(self);
        let mut queue = vec![d];
        seen.insert(d);
        let mut i = 0;
        while i < queue.len() {
            let x = queue[i];
            i += 1;
            if f(x) {
                return true;
            }
            for step in steps {
                let y = step(self, x);
                if y != x && seen.insert(y) {
                    queue.push(y);
                }
            }
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_roundtrip() {
        for o in Orbit::ALL {
            assert_eq!(Orbit::from_index(o.index()), Some(o));
        }
        assert_eq!(Orbit::from_index(NB_ORBITS), None);
        assert_eq!(Orbit::Vertex2.to_string(), "VERTEX2");
    }
}
