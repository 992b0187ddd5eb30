//! Binary map files.
//!
//! Layout (all integers little endian):
//!
//! ```text
//! header   256 bytes
//!   0..32    magic "CGoGN_Map", zero padded
//!   32..64   map type name ("Map1", "Map2", "Map3"), zero padded
//!   64..68   u32 number of container records
//!   68..256  zero
//! record   one per stored orbit (the dart orbit first)
//!   u32      orbit id
//!   u32      capacity (number of lines, allocated or free)
//!   u32 * capacity   reference counts (0 = free line)
//!   u32      number of attribute columns, then one column per entry
//!   dart record only:
//!   u32      number of topology columns (relations, embeddings,
//!            boundary flags), then one column per entry
//! column
//!   u32 + utf8  column name
//!   u32 + utf8  value type name
//!   u64 + raw   bincode encoding of the column values
//! ```
//!
//! Attribute columns are rebuilt through the attribute type registry, so
//! user value types must be registered before loading.

use crate::data::attribute_container::AttributeContainer;
use crate::data::multi_vector::{AttributeColumn, AttributeMultiVector};
use crate::data::registry::decode_column;
use crate::debug_invariants::DebugInvariants;
use crate::map_error::MapError;
use crate::topology::dart::Dart;
use crate::topology::generic_map::{CombinatorialMap, GenericMap, MapKind};
use crate::topology::map1::Map1;
use crate::topology::map2::Map2;
use crate::topology::map3::Map3;
use crate::topology::orbit::Orbit;
use bytes::{Buf, BufMut, Bytes, BytesMut};
use std::io::{Read, Write};
use std::path::Path;

pub const MAGIC: &str = "CGoGN_Map";
pub const HEADER_LEN: usize = 256;

const BOUNDARY_COLUMN: &str = "BOUNDARY";
const RELATION_NAMES: [&str; 4] = ["phi1", "phi_1", "phi2", "phi3"];

/// A map of whichever dimension a file holds.
#[derive(Debug, Clone)]
pub enum AnyMap {
    Map1(Map1),
    Map2(Map2),
    Map3(Map3),
}

impl AnyMap {
    pub fn kind(&self) -> MapKind {
        self.generic().kind()
    }

    pub fn into_map1(self) -> Option<Map1> {
        match self {
            AnyMap::Map1(m) => Some(m),
            _ => None,
        }
    }

    pub fn into_map2(self) -> Option<Map2> {
        match self {
            AnyMap::Map2(m) => Some(m),
            _ => None,
        }
    }

    pub fn into_map3(self) -> Option<Map3> {
        match self {
            AnyMap::Map3(m) => Some(m),
            _ => None,
        }
    }
}

impl CombinatorialMap for AnyMap {
    fn generic(&self) -> &GenericMap {
        match self {
            AnyMap::Map1(m) => m.generic(),
            AnyMap::Map2(m) => m.generic(),
            AnyMap::Map3(m) => m.generic(),
        }
    }

    fn generic_mut(&mut self) -> &mut GenericMap {
        match self {
            AnyMap::Map1(m) => m.generic_mut(),
            AnyMap::Map2(m) => m.generic_mut(),
            AnyMap::Map3(m) => m.generic_mut(),
        }
    }
}

/// Writes `map` to `w`.
pub fn save_map<M, W>(map: &M, mut w: W) -> Result<(), MapError>
where
    M: CombinatorialMap + ?Sized,
    W: Write,
{
    let bytes = to_bytes(map)?;
    w.write_all(&bytes)?;
    w.flush()?;
    Ok(())
}

/// Reads a map written by [`save_map`].
pub fn load_map<R: Read>(mut r: R) -> Result<AnyMap, MapError> {
    let mut buf = Vec::new();
    r.read_to_end(&mut buf)?;
    from_bytes(&buf)
}

pub fn save_map_to_file<M, P>(map: &M, path: P) -> Result<(), MapError>
where
    M: CombinatorialMap + ?Sized,
    P: AsRef<Path>,
{
    let file = std::fs::File::create(path)?;
    save_map(map, std::io::BufWriter::new(file))
}

pub fn load_map_from_file<P: AsRef<Path>>(path: P) -> Result<AnyMap, MapError> {
    let file = std::fs::File::open(path)?;
    load_map(std::io::BufReader::new(file))
}

/// Serializes `map` into an in-memory buffer.
pub fn to_bytes<M: CombinatorialMap + ?Sized>(map: &M) -> Result<Bytes, MapError> {
    let g = map.generic();
    let orbits: Vec<Orbit> = Orbit::ALL
        .into_iter()
        .filter(|&o| g.is_orbit_embedded(o))
        .collect();

    let mut out = BytesMut::with_capacity(HEADER_LEN + 16 * g.nb_darts());
    put_padded(&mut out, MAGIC, 32)?;
    put_padded(&mut out, g.kind().name(), 32)?;
    out.put_u32_le(orbits.len() as u32);
    out.put_bytes(0, HEADER_LEN - 68);

    for &orbit in &orbits {
        let c = g.container(orbit);
        out.put_u32_le(orbit.index() as u32);
        out.put_u32_le(c.capacity() as u32);
        for &r in c.ref_counts() {
            out.put_u32_le(r);
        }
        let columns: Vec<&dyn AttributeColumn> = c.columns().map(|(_, col)| col).collect();
        put_columns(&mut out, &columns)?;
        if orbit == Orbit::Dart {
            put_topology(&mut out, g)?;
        }
    }
    log::debug!(
        "saved {} with {} darts and {} containers ({} bytes)",
        g.kind().name(),
        g.nb_darts(),
        orbits.len(),
        out.len()
    );
    Ok(out.freeze())
}

/// Rebuilds a map from [`to_bytes`] output.
pub fn from_bytes(data: &[u8]) -> Result<AnyMap, MapError> {
    let mut buf = data;
    if buf.remaining() < HEADER_LEN {
        return Err(MapError::Format("file shorter than its header".into()));
    }
    let magic = get_padded(&mut buf, 32)?;
    if magic != MAGIC {
        return Err(MapError::Format(format!("bad magic `{magic}`")));
    }
    let type_name = get_padded(&mut buf, 32)?;
    let kind = MapKind::from_name(&type_name)
        .ok_or_else(|| MapError::Format(format!("unknown map type `{type_name}`")))?;
    let nb_records = buf.get_u32_le() as usize;
    buf.advance(HEADER_LEN - 68);

    let mut map = GenericMap::new(kind);
    let mut boundary: Option<Vec<bool>> = None;
    let mut seen_dart = false;
    for _ in 0..nb_records {
        let orbit = Orbit::from_index(get_u32(&mut buf)? as usize)
            .ok_or_else(|| MapError::Format("unknown orbit id".into()))?;
        let capacity = get_u32(&mut buf)? as usize;
        if buf.remaining() < capacity * 4 {
            return Err(MapError::Format(format!("truncated {orbit} reference counts")));
        }
        let refs: Vec<u32> = (0..capacity).map(|_| buf.get_u32_le()).collect();
        let container = &mut map.containers[orbit.index()];
        container.restore_lines(refs);
        for (name, type_name, bytes) in get_columns(&mut buf)? {
            let col = decode_column(&type_name, &name, &bytes)?;
            push_checked(container, col, orbit)?;
        }
        if orbit == Orbit::Dart {
            seen_dart = true;
            for (name, _, bytes) in get_columns(&mut buf)? {
                restore_topology_column(&mut map, &name, &bytes, capacity, &mut boundary)?;
            }
        }
    }
    if !seen_dart {
        return Err(MapError::Format("no dart container".into()));
    }
    if map.relations.iter().any(|r| r.len() != map.container(Orbit::Dart).capacity()) {
        return Err(MapError::Format("missing relation column".into()));
    }
    if let Some(flags) = boundary {
        for d in map.darts() {
            if flags.get(d.index()).copied().unwrap_or(false) {
                map.mark_boundary(d);
            }
        }
    }
    map.validate_invariants()?;
    log::debug!("loaded {} with {} darts", kind.name(), map.nb_darts());
    Ok(match kind {
        MapKind::Map1 => AnyMap::Map1(Map1::from_generic(map)),
        MapKind::Map2 => AnyMap::Map2(Map2::from_generic(map)),
        MapKind::Map3 => AnyMap::Map3(Map3::from_generic(map)),
    })
}

/// Relations, embeddings and boundary flags, all indexed by dart.
fn put_topology(out: &mut BytesMut, g: &GenericMap) -> Result<(), MapError> {
    let capacity = g.container(Orbit::Dart).capacity();
    let flags: Vec<bool> = (0..capacity)
        .map(|i| g.is_boundary_marked(Dart::new(i as u32)))
        .collect();
    let nb_embeddings = g.embeddings.iter().flatten().count();
    out.put_u32_le((g.relations.len() + nb_embeddings + 1) as u32);
    for rel in &g.relations {
        put_column(out, rel.name(), rel.type_name(), &rel.encode()?);
    }
    for emb in g.embeddings.iter().flatten() {
        put_column(out, emb.name(), emb.type_name(), &emb.encode()?);
    }
    put_column(
        out,
        BOUNDARY_COLUMN,
        std::any::type_name::<bool>(),
        &bincode::serialize(&flags)?,
    );
    Ok(())
}

fn restore_topology_column(
    map: &mut GenericMap,
    name: &str,
    bytes: &[u8],
    capacity: usize,
    boundary: &mut Option<Vec<bool>>,
) -> Result<(), MapError> {
    let check_len = |len: usize| {
        if len == capacity {
            Ok(())
        } else {
            Err(MapError::Format(format!("column `{name}` has {len} lines, expected {capacity}")))
        }
    };
    if name == BOUNDARY_COLUMN {
        let flags: Vec<bool> = bincode::deserialize(bytes)?;
        check_len(flags.len())?;
        *boundary = Some(flags);
    } else if let Some(rel) = RELATION_NAMES.iter().position(|&r| r == name) {
        if rel >= map.relations.len() {
            return Err(MapError::Format(format!("relation `{name}` on a {}", map.kind().name())));
        }
        let darts: Vec<Dart> = bincode::deserialize(bytes)?;
        check_len(darts.len())?;
        map.relations[rel] = AttributeMultiVector::from_vec(name, darts);
    } else if let Some(orbit) = name
        .strip_prefix("EMB_")
        .and_then(|o| Orbit::ALL.into_iter().find(|x| x.name() == o))
    {
        let lines: Vec<u32> = bincode::deserialize(bytes)?;
        check_len(lines.len())?;
        map.embeddings[orbit.index()] = Some(AttributeMultiVector::from_vec(name, lines));
    } else {
        return Err(MapError::Format(format!("unknown topology column `{name}`")));
    }
    Ok(())
}

fn push_checked(
    container: &mut AttributeContainer,
    col: Box<dyn AttributeColumn>,
    orbit: Orbit,
) -> Result<(), MapError> {
    if col.len() != container.capacity() {
        return Err(MapError::Format(format!(
            "{orbit} column `{}` has {} lines, expected {}",
            col.name(),
            col.len(),
            container.capacity()
        )));
    }
    container.push_column(col);
    Ok(())
}

fn put_padded(out: &mut BytesMut, s: &str, width: usize) -> Result<(), MapError> {
    if s.len() >= width {
        return Err(MapError::Format(format!("`{s}` does not fit in {width} bytes")));
    }
    out.put_slice(s.as_bytes());
    out.put_bytes(0, width - s.len());
    Ok(())
}

fn get_padded(buf: &mut &[u8], width: usize) -> Result<String, MapError> {
    let field = get_slice(buf, width)?;
    let end = field.iter().position(|&b| b == 0).unwrap_or(width);
    String::from_utf8(field[..end].to_vec()).map_err(|e| MapError::Format(e.to_string()))
}

fn put_str(out: &mut BytesMut, s: &str) {
    out.put_u32_le(s.len() as u32);
    out.put_slice(s.as_bytes());
}

fn get_str(buf: &mut &[u8]) -> Result<String, MapError> {
    let len = get_u32(buf)? as usize;
    let raw = get_slice(buf, len)?;
    String::from_utf8(raw.to_vec()).map_err(|e| MapError::Format(e.to_string()))
}

fn get_u32(buf: &mut &[u8]) -> Result<u32, MapError> {
    if buf.remaining() < 4 {
        return Err(MapError::Format("unexpected end of file".into()));
    }
    Ok(buf.get_u32_le())
}

fn get_slice<'b>(buf: &mut &'b [u8], len: usize) -> Result<&'b [u8], MapError> {
    if buf.len() < len {
        return Err(MapError::Format("unexpected end of file".into()));
    }
    let (head, tail) = buf.split_at(len);
    *buf = tail;
    Ok(head)
}

fn put_column(out: &mut BytesMut, name: &str, type_name: &str, bytes: &[u8]) {
    put_str(out, name);
    put_str(out, type_name);
    out.put_u64_le(bytes.len() as u64);
    out.put_slice(bytes);
}

fn put_columns(out: &mut BytesMut, columns: &[&dyn AttributeColumn]) -> Result<(), MapError> {
    out.put_u32_le(columns.len() as u32);
    for col in columns {
        put_column(out, col.name(), col.type_name(), &col.encode()?);
    }
    Ok(())
}

type ColumnRecord = (String, String, Vec<u8>);

fn get_columns(buf: &mut &[u8]) -> Result<Vec<ColumnRecord>, MapError> {
    let n = get_u32(buf)? as usize;
    let mut out = Vec::with_capacity(n.min(64));
    for _ in 0..n {
        let name = get_str(buf)?;
        let type_name = get_str(buf)?;
        if buf.remaining() < 8 {
            return Err(MapError::Format("unexpected end of file".into()));
        }
        let len = usize::try_from(buf.get_u64_le()).map_err(|e| MapError::Format(e.to_string()))?;
        let bytes = get_slice(buf, len)?.to_vec();
        out.push((name, type_name, bytes));
    }
    Ok(out)
}
