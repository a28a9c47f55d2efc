use plaintree::Value;
use serde::Serialize;

use crate::errors::SerializationError;
use crate::ser::Serializer;

pub struct SerializeSeq {
    items: Vec<Value>,
}

impl SerializeSeq {
    pub fn new(len: Option<usize>) -> Self {
        Self {
            items: Vec::with_capacity(len.unwrap_or(0)),
        }
    }

    fn push<T: ?Sized>(&mut self, value: &T) -> Result<(), SerializationError>
    where
        T: Serialize,
    {
        let value = value.serialize(Serializer)?;
        self.items.push(value);
        Ok(())
    }

    pub(crate) fn finish_array(self) -> Value {
        Value::Array(self.items)
    }
}

impl serde::ser::SerializeSeq for SerializeSeq {
    type Error = SerializationError;
    type Ok = Value;

    fn serialize_element<T: ?Sized>(&mut self, value: &T) -> Result<(), Self::Error>
    where
        T: Serialize,
    {
        self.push(value)
    }

    fn end(self) -> Result<Self::Ok, Self::Error> {
        Ok(self.finish_array())
    }
}

impl serde::ser::SerializeTuple for SerializeSeq {
    type Error = SerializationError;
    type Ok = Value;

    fn serialize_element<T: ?Sized>(&mut self, value: &T) -> Result<(), Self::Error>
    where
        T: Serialize,
    {
        self.push(value)
    }

    fn end(self) -> Result<Self::Ok, Self::Error> {
        Ok(self.finish_array())
    }
}

impl serde::ser::SerializeTupleStruct for SerializeSeq {
    type Error = SerializationError;
    type Ok = Value;

    fn serialize_field<T: ?Sized>(&mut self, value: &T) -> Result<(), Self::Error>
    where
        T: Serialize,
    {
        self.push(value)
    }

    fn end(self) -> Result<Self::Ok, Self::Error> {
        Ok(self.finish_array())
    }
}
