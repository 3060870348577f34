//! Presence-aware scalar wrappers for the normalized game model.
//!
//! An absent value serializes as JSON `null` and a present one as the bare
//! value. Strings are the odd one out: a present but empty string is also
//! written as `null`. Mirror clients already depend on that output, so it
//! stays even though it makes `present("")` and `absent()` indistinguishable
//! on the wire.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A scalar that may be absent, independent of its zero value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Nullable<T>(Option<T>);

pub type NullString = Nullable<String>;
pub type NullInt = Nullable<i32>;
pub type NullBool = Nullable<bool>;

impl<T> Nullable<T> {
    pub const fn absent() -> Self {
        Self(None)
    }

    pub const fn present(value: T) -> Self {
        Self(Some(value))
    }

    pub fn is_present(&self) -> bool {
        self.0.is_some()
    }

    pub fn get(&self) -> Option<&T> {
        self.0.as_ref()
    }

    pub fn into_inner(self) -> Option<T> {
        self.0
    }
}

impl<T> Default for Nullable<T> {
    fn default() -> Self {
        Self::absent()
    }
}

impl<T> From<Option<T>> for Nullable<T> {
    fn from(value: Option<T>) -> Self {
        Self(value)
    }
}

/// Decides whether a present value is still written out as `null`.
pub trait NullMarker {
    fn emits_null(&self) -> bool {
        false
    }
}

impl NullMarker for String {
    fn emits_null(&self) -> bool {
        self.is_empty()
    }
}

impl NullMarker for i32 {}
impl NullMarker for bool {}

impl<T> Serialize for Nullable<T>
where
    T: Serialize + NullMarker,
{
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match &self.0 {
            Some(value) if !value.emits_null() => value.serialize(serializer),
            _ => serializer.serialize_none(),
        }
    }
}

impl<'de, T> Deserialize<'de> for Nullable<T>
where
    T: Deserialize<'de>,
{
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Option::<T>::deserialize(deserializer).map(Self)
    }
}
