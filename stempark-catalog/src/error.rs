/// Errors raised by variant tree operations
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VariantError {
    #[error("Invalid variant path: {0}")]
    InvalidPath(String),

    #[error("No variant node at path {0}")]
    NodeNotFound(String),

    #[error("Operation requires a non-empty path")]
    EmptyPath,

    #[error("Field {field} only exists on leaves; node at path {path} has children")]
    NotALeaf { path: String, field: &'static str },

    #[error("Unknown variant field: {0}")]
    UnknownField(String),

    #[error("Field {0} is read-only")]
    ReadOnlyField(String),

    #[error("Invalid value for field {field}: {reason}")]
    InvalidFieldValue {
        field: String,
        reason: String,
    },

    #[error("Invalid currency code: {0}")]
    InvalidCurrency(String),

    #[error("Currency {0} is already priced for this variant")]
    DuplicateCurrency(String),

    #[error("Currency {0} is not priced for this variant")]
    CurrencyNotFound(String),

    #[error("No media item {index} at path {path}")]
    MediaNotFound {
        path: String,
        index: usize,
    },

    #[error("Level depth must start at 1")]
    InvalidDepth,
}
