use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProtocolError {
    #[error("request body is not valid JSON")]
    InvalidJson,

    #[error("request body is not a JSON object")]
    NotAnObject,

    #[error("missing field: {0}")]
    MissingField(&'static str),

    #[error("field {field} has the wrong type: expected {expected}")]
    WrongType {
        field: &'static str,
        expected: &'static str,
    },

    #[error("provisions must be a non-empty list")]
    EmptyProvisions,

    #[error("action must name exactly one of accept or reject")]
    AmbiguousAction,
}

pub type ProtocolResult<T> = Result<T, ProtocolError>;
