//! Process-wide registry mapping attribute value type names to column
//! decoders.
//!
//! Persisted columns only carry the name of their value type. Loading a map
//! looks that name up here to rebuild a typed [`AttributeMultiVector`]. Common
//! scalar, vector and `Dart` types are registered up front; user types are
//! added with [`register_attribute_type`].

use crate::data::multi_vector::{AttributeColumn, AttributeMultiVector, AttributeValue};
use crate::map_error::MapError;
use crate::topology::dart::Dart;
use hashbrown::HashMap;
use once_cell::sync::Lazy;
use parking_lot::RwLock;

type Decoder = fn(&str, &[u8]) -> Result<Box<dyn AttributeColumn>, MapError>;

fn decode<T: AttributeValue>(name: &str, bytes: &[u8]) -> Result<Box<dyn AttributeColumn>, MapError> {
    let data: Vec<T> = bincode::deserialize(bytes)?;
    Ok(Box::new(AttributeMultiVector::from_vec(name, data)))
}

macro_rules! builtin_types {
    ($map:ident; $($t:ty),* $(,)?) => {
        $( $map.insert(std::any::type_name::<$t>(), decode::<$t> as Decoder); )*
    };
}

static REGISTRY: Lazy<RwLock<HashMap<&'static str, Decoder>>> = Lazy::new(|| {
    let mut m = HashMap::new();
    builtin_types!(m;
        Dart, bool, u8, u16, u32, u64, i8, i16, i32, i64, f32, f64, String,
        [f32; 2], [f32; 3], [f32; 4], [f64; 2], [f64; 3], [f64; 4],
        Vec<u32>, Vec<f64>,
    );
    RwLock::new(m)
});

/// Makes columns of `T` loadable. Registering a type twice is harmless.
pub fn register_attribute_type<T: AttributeValue>() {
    let key = std::any::type_name::<T>();
    let mut reg = REGISTRY.write();
    if reg.insert(key, decode::<T>).is_none() {
        log::debug!("registered attribute type {key}");
    }
}

/// `true` if columns of `type_name` can be decoded.
pub fn is_registered(type_name: &str) -> bool {
    REGISTRY.read().contains_key(type_name)
}

/// Rebuilds a column from its persisted type name, column name and bytes.
pub(crate) fn decode_column(
    type_name: &str,
    name: &str,
    bytes: &[u8],
) -> Result<Box<dyn AttributeColumn>, MapError> {
    let decoder = REGISTRY
        .read()
        .get(type_name)
        .copied()
        .ok_or_else(|| MapError::UnknownAttributeType(type_name.to_string()))?;
    decoder(name, bytes)
}
