use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FilterError {
    #[error("Invalid table name: {0}")]
    InvalidTableName(String),

    #[error("Invalid column name: {0}")]
    InvalidColumn(String),

    #[error("filter not allowed: {0}")]
    NotAllowed(String),

    #[error("{0} must be >= 0")]
    NegativeBound(String),

    #[error("{min} cannot be greater than {max}")]
    InvertedRange { min: String, max: String },

    #[error("{name} must be {expected}")]
    InvalidValue { name: String, expected: &'static str },
}
