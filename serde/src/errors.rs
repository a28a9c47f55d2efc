use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SerializationError {
    #[error("Unknown error: {0}")]
    Unknown(String),
    #[error("Expected call to `serialize_key` before `serialize_value`")]
    MissingKey,
    #[error("Expected call times of calls to `serialize_key` and `serialize_value` to be equal")]
    MissingValue,
    #[error("Expected either a string or a number as a key")]
    InvalidKey,
    #[error("The number is too large to be represented")]
    IntTooLarge,
}

impl serde::ser::Error for SerializationError {
    fn custom<T: std::fmt::Display>(msg: T) -> Self {
        Self::Unknown(msg.to_string())
    }
}
