use plaintree::Value;
use serde::Serialize;

use crate::errors::SerializationError;
use crate::ser::map::SerializeMap;
use crate::ser::seq::SerializeSeq;
use crate::ser::wrap_in_map_with_key;

pub struct SerializeTupleVariant {
    variant: &'static str,

    inner: SerializeSeq,
}

impl SerializeTupleVariant {
    pub fn new(variant: &'static str) -> Self {
        Self {
            variant,
            inner: SerializeSeq::new(None),
        }
    }
}

impl serde::ser::SerializeTupleVariant for SerializeTupleVariant {
    type Error = SerializationError;
    type Ok = Value;

    fn serialize_field<T: ?Sized>(&mut self, value: &T) -> Result<(), Self::Error>
    where
        T: Serialize,
    {
        <SerializeSeq as serde::ser::SerializeSeq>::serialize_element(&mut self.inner, value)
    }

    fn end(self) -> Result<Self::Ok, Self::Error> {
        // Tuple variants are represented as `{ NAME: [DATA...] }`, the
        // externally tagged representation.
        let inner = self.inner.finish_array();
        Ok(wrap_in_map_with_key(self.variant, inner))
    }
}

pub struct SerializeStructVariant {
    variant: &'static str,

    inner: SerializeMap,
}

impl SerializeStructVariant {
    pub fn new(variant: &'static str) -> Self {
        Self {
            variant,
            inner: SerializeMap::new(),
        }
    }
}

impl serde::ser::SerializeStructVariant for SerializeStructVariant {
    type Error = SerializationError;
    type Ok = Value;

    fn serialize_field<T: ?Sized>(
        &mut self,
        key: &'static str,
        value: &T,
    ) -> Result<(), Self::Error>
    where
        T: Serialize,
    {
        <SerializeMap as serde::ser::SerializeMap>::serialize_entry(&mut self.inner, key, value)
    }

    fn end(self) -> Result<Self::Ok, Self::Error> {
        // Struct variants are represented as `{ NAME: { K: V, ... } }`.
        let inner = self.inner.finish_object()?;
        Ok(wrap_in_map_with_key(self.variant, inner))
    }
}
