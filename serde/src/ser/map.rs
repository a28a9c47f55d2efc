use std::collections::HashMap;

use plaintree::Value;
use serde::Serialize;

use crate::errors::SerializationError;
use crate::ser::Serializer;

pub struct SerializeMap {
    object: HashMap<String, Value>,
    pending_key: Option<String>,
}

impl SerializeMap {
    pub(crate) fn new() -> Self {
        Self {
            object: HashMap::new(),
            pending_key: None,
        }
    }

    fn key_to_string(key: Value) -> Result<String, SerializationError> {
        // Only strings and numbers make valid object keys; numbers are
        // rendered the way JSON encoders render numeric keys.
        match key {
            Value::String(s) => Ok(s),
            Value::Int(i) => Ok(i.to_string()),
            _ => Err(SerializationError::InvalidKey),
        }
    }

    pub(crate) fn finish_object(mut self) -> Result<Value, SerializationError> {
        if self.pending_key.take().is_some() {
            return Err(SerializationError::MissingValue);
        }

        Ok(Value::Object(self.object))
    }
}

impl serde::ser::SerializeMap for SerializeMap {
    type Error = SerializationError;
    type Ok = Value;

    fn serialize_key<T: ?Sized>(&mut self, key: &T) -> Result<(), Self::Error>
    where
        T: Serialize,
    {
        let key = key.serialize(Serializer)?;
        self.pending_key = Some(Self::key_to_string(key)?);
        Ok(())
    }

    fn serialize_value<T: ?Sized>(&mut self, value: &T) -> Result<(), Self::Error>
    where
        T: Serialize,
    {
        let key = self
            .pending_key
            .take()
            .ok_or(SerializationError::MissingKey)?;

        let value = value.serialize(Serializer)?;
        self.object.insert(key, value);
        Ok(())
    }

    fn serialize_entry<K: ?Sized, V: ?Sized>(
        &mut self,
        key: &K,
        value: &V,
    ) -> Result<(), Self::Error>
    where
        K: Serialize,
        V: Serialize,
    {
        // we don't need to buffer the key, we can serialize it directly

        let key = Self::key_to_string(key.serialize(Serializer)?)?;
        let value = value.serialize(Serializer)?;

        self.object.insert(key, value);
        Ok(())
    }

    fn end(self) -> Result<Self::Ok, Self::Error> {
        self.finish_object()
    }
}

impl serde::ser::SerializeStruct for SerializeMap {
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
        <Self as serde::ser::SerializeMap>::serialize_entry(self, key, value)
    }

    fn end(self) -> Result<Self::Ok, Self::Error> {
        <Self as serde::ser::SerializeMap>::end(self)
    }
}
