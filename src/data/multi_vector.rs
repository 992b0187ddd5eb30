//! Typed attribute columns ("multi-vectors") stored inside an
//! [`AttributeContainer`](crate::data::attribute_container::AttributeContainer).
//!
//! A column is a dense `Vec<T>` indexed by container line. The container
//! only sees columns through the object-safe [`AttributeColumn`] trait so
//! that one container can hold columns of unrelated value types.

use crate::map_error::MapError;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::any::Any;
use std::fmt::{self, Debug};

/// Bound for every value type that can be stored in an attribute column.
///
/// Values are default-initialised on line insertion and reset on removal;
/// serde is required so that columns can be persisted.
pub trait AttributeValue:
    Clone + Default + Send + Sync + Serialize + DeserializeOwned + 'static
{
}

impl<T> AttributeValue for T where
    T: Clone + Default + Send + Sync + Serialize + DeserializeOwned + 'static
{
}

/// Type-erased view of one column, used by the container for bookkeeping.
pub trait AttributeColumn: Send + Sync + Debug {
    /// Column name, unique within its container.
    fn name(&self) -> &str;
    /// Stable type name of the stored values, used as registry key.
    fn type_name(&self) -> &'static str;
    /// Number of lines (equals the container capacity).
    fn len(&self) -> usize;
    /// Grow or shrink to `len` lines, new lines default-initialised.
    fn resize(&mut self, len: usize);
    /// Reset one line to the default value.
    fn reset_line(&mut self, line: usize);
    /// Copy the value of line `src` into line `dst`.
    fn copy_line(&mut self, dst: usize, src: usize);
    /// Serialize the raw values.
    fn encode(&self) -> Result<Vec<u8>, MapError>;
    fn clone_box(&self) -> Box<dyn AttributeColumn>;
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// A single typed column.
#[derive(Clone)]
pub struct AttributeMultiVector<T> {
    name: String,
    data: Vec<T>,
}

impl<T: AttributeValue> AttributeMultiVector<T> {
    /// Creates a column of `len` default values.
    pub fn new(name: impl Into<String>, len: usize) -> Self {
        Self {
            name: name.into(),
            data: vec![T::default(); len],
        }
    }

    /// Wraps existing values (used when loading a persisted column).
    pub fn from_vec(name: impl Into<String>, data: Vec<T>) -> Self {
        Self {
            name: name.into(),
            data,
        }
    }

    #[inline]
    pub fn get(&self, line: usize) -> Option<&T> {
        self.data.get(line)
    }

    #[inline]
    pub fn get_mut(&mut self, line: usize) -> Option<&mut T> {
        self.data.get_mut(line)
    }

    /// Raw values, including lines that are currently free.
    #[inline]
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.data
    }
}

impl<T> Debug for AttributeMultiVector<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AttributeMultiVector")
            .field("name", &self.name)
            .field("type", &std::any::type_name::<T>())
            .field("len", &self.data.len())
            .finish()
    }
}

impl<T: AttributeValue> AttributeColumn for AttributeMultiVector<T> {
    fn name(&self) -> &str {
        &self.name
    }

    fn type_name(&self) -> &'static str {
        std::any::type_name::<T>()
    }

    fn len(&self) -> usize {
        self.data.len()
    }

    fn resize(&mut self, len: usize) {
        self.data.resize(len, T::default());
    }

    fn reset_line(&mut self, line: usize) {
        if let Some(v) = self.data.get_mut(line) {
            *v = T::default();
        }
    }

    fn copy_line(&mut self, dst: usize, src: usize) {
        if dst != src && src < self.data.len() && dst < self.data.len() {
            let v = self.data[src].clone();
            self.data[dst] = v;
        }
    }

    fn encode(&self) -> Result<Vec<u8>, MapError> {
        Ok(bincode::serialize(&self.data)?)
    }

    fn clone_box(&self) -> Box<dyn AttributeColumn> {
        Box::new(self.clone())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
