//! Consistency checks of map relations, boundary marking and embeddings.

use crate::debug_invariants::DebugInvariants;
use crate::map_error::MapError;
use crate::topology::dart::Dart;
use crate::topology::generic_map::{EMBNULL, GenericMap};
use crate::topology::marker::VisitedDarts;
use crate::topology::orbit::Orbit;

impl GenericMap {
    /// Validates every relation of every live dart:
    ///
    /// - `phi1` and `phi_1` are mutual inverses over live darts,
    /// - `phi2` (and `phi3`) are involutions; fixed points are tolerated and
    ///   mean "open, not yet closed",
    /// - boundary marks follow the boundary convention of the dimension,
    /// - on 3-maps, `phi1(phi3(d)) == phi3(phi_1(d))` wherever both sides
    ///   are sewn.
    ///
    /// Returns the first violation found.
    pub fn validate_topology(&self) -> Result<(), MapError> {
        let dim = self.dimension();
        for d in self.darts() {
            self.check_phi1(d)?;
            if dim >= 2 {
                self.check_involution(d, self.phi2(d), "phi2")?;
            }
            if dim >= 3 {
                self.check_involution(d, self.phi3(d), "phi3")?;
                self.check_phi3_commutes(d)?;
            }
            match dim {
                2 => self.check_boundary2(d)?,
                3 => self.check_boundary3(d)?,
                _ => {}
            }
        }
        Ok(())
    }

    fn check_phi1(&self, d: Dart) -> Result<(), MapError> {
        let n = self.phi1(d);
        let p = self.phi_1(d);
        if !self.is_dart(n) || !self.is_dart(p) {
            return Err(MapError::malformed(d, "phi1 leads to a freed dart"));
        }
        if self.phi_1(n) != d || self.phi1(p) != d {
            return Err(MapError::malformed(d, "phi1 and phi_1 are not inverse"));
        }
        Ok(())
    }

    fn check_involution(&self, d: Dart, e: Dart, rel: &str) -> Result<(), MapError> {
        if !self.is_dart(e) {
            return Err(MapError::malformed(d, format!("{rel} leads to a freed dart")));
        }
        let back = match rel {
            "phi2" => self.phi2(e),
            _ => self.phi3(e),
        };
        if back != d {
            return Err(MapError::malformed(d, format!("{rel} is not an involution (maps back to {back})")));
        }
        Ok(())
    }

    fn check_phi3_commutes(&self, d: Dart) -> Result<(), MapError> {
        let d3 = self.phi3(d);
        let p = self.phi_1(d);
        if d3 == d || self.phi3(p) == p {
            return Ok(());
        }
        if self.phi1(d3) != self.phi3(p) {
            return Err(MapError::malformed(d, "phi3 does not mirror the face cycle"));
        }
        Ok(())
    }

    /// Boundary faces are whole faces and only face real ones.
    fn check_boundary2(&self, d: Dart) -> Result<(), MapError> {
        let b = self.is_boundary_marked(d);
        if self.is_boundary_marked(self.phi1(d)) != b {
            return Err(MapError::malformed(d, "boundary mark does not cover the whole face"));
        }
        let e = self.phi2(d);
        if b && (e == d || self.is_boundary_marked(e)) {
            return Err(MapError::malformed(d, "boundary face is not sewn to a real face"));
        }
        Ok(())
    }

    /// Boundary volumes are whole volumes and only face real ones.
    fn check_boundary3(&self, d: Dart) -> Result<(), MapError> {
        let b = self.is_boundary_marked(d);
        if self.is_boundary_marked(self.phi1(d)) != b {
            return Err(MapError::malformed(d, "boundary mark does not cover the whole face"));
        }
        let e = self.phi2(d);
        if e != d && self.is_boundary_marked(e) != b {
            return Err(MapError::malformed(d, "boundary mark does not cover the whole volume"));
        }
        let f = self.phi3(d);
        if b && (f == d || self.is_boundary_marked(f)) {
            return Err(MapError::malformed(d, "boundary volume is not sewn to a real volume"));
        }
        Ok(())
    }

    /// Every live dart of an embedded orbit points at a live line, all
    /// darts of one cell agree on it and no two cells share it.
    pub fn validate_embeddings(&self) -> Result<(), MapError> {
        for orbit in Orbit::ALL.into_iter().skip(1) {
            if !self.is_orbit_embedded(orbit) {
                continue;
            }
            let c = self.container(orbit);
            let mut owner = vec![Dart::NIL; c.capacity()];
            let mut seen = VisitedDarts::new(self);
            for d in self.darts() {
                if seen.contains(d) {
                    continue;
                }
                let line = self.embedding(orbit, d);
                let mut disagree = false;
                self.foreach_dart_of_orbit(orbit, d, |x| {
                    seen.insert(x);
                    disagree |= self.embedding(orbit, x) != line;
                    false
                });
                if disagree {
                    return Err(MapError::malformed(d, format!("darts of one {orbit} cell disagree on their line")));
                }
                if line == EMBNULL {
                    continue;
                }
                if !c.is_used(line) {
                    return Err(MapError::malformed(d, format!("{orbit} embedding {line} is not allocated")));
                }
                let slot = &mut owner[line as usize];
                if !slot.is_nil() {
                    return Err(MapError::malformed(
                        d,
                        format!("{orbit} line {line} is shared with the cell of dart {slot}"),
                    ));
                }
                *slot = d;
            }
        }
        Ok(())
    }
}

impl DebugInvariants for GenericMap {
    fn debug_assert_invariants(&self) {
        crate::debug_invariants!(self.validate_invariants(), "GenericMap");
    }

    fn validate_invariants(&self) -> Result<(), MapError> {
        self.validate_topology()?;
        self.validate_embeddings()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::topology::generic_map::{MapKind, PHI1};

    #[test]
    fn detects_broken_phi1() {
        let mut m = GenericMap::new(MapKind::Map1);
        let d = m.new_cycle(3);
        assert!(m.validate_topology().is_ok());
        let e = m.phi1(d);
        m.set_rel(PHI1, e, e);
        assert!(matches!(m.validate_topology(), Err(MapError::Malformed { .. })));
    }

    #[test]
    fn detects_half_sewn_phi2() {
        let mut m = GenericMap::new(MapKind::Map2);
        let a = m.new_face2(3, false);
        let b = m.new_face2(3, false);
        m.set_rel(crate::topology::generic_map::PHI2, a, b);
        let err = m.validate_topology().unwrap_err();
        assert!(err.to_string().contains("involution"));
    }

    #[test]
    fn embeddings_agree_after_sew() {
        let mut m = GenericMap::new(MapKind::Map2);
        m.init_orbit_embedding(Orbit::Vertex);
        let a = m.new_face2(3, true);
        let b = m.new_face2(3, true);
        m.begin_op();
        m.sew_faces2(a, b);
        m.end_op();
        assert!(m.validate_invariants().is_ok());
    }

    #[test]
    fn detects_line_shared_by_two_cells() {
        let mut m = GenericMap::new(MapKind::Map2);
        m.init_orbit_embedding(Orbit::Face);
        let a = m.new_face2(3, true);
        let b = m.new_face2(4, true);
        m.begin_op();
        m.end_op();
        assert!(m.validate_embeddings().is_ok());
        let line = m.embedding(Orbit::Face, a);
        m.set_orbit_embedding(Orbit::Face, b, line);
        let err = m.validate_embeddings().unwrap_err();
        assert!(err.to_string().contains("shared"));
    }
}
