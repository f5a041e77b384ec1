//! Error types for conversion, comparison, iteration and parsing.

use thiserror::Error;

use crate::engine::{EngineError, ReadError, TypeTag};

/// Failures turning a host value into an ASON value.
///
/// Whatever the variant, no partially built value survives the error.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConversionError {
    /// Integer outside both the signed and unsigned 64-bit ranges.
    #[error("integer {value} is not representable as a signed or unsigned 64-bit value")]
    NotRepresentable { value: String },

    /// Mapping key that is not a string.
    #[error("cannot ASONify mapping with non-string key of kind '{found}'")]
    KeyTypeError { found: &'static str },

    /// Extension object offering neither `to_ason` nor `to_json`.
    #[error("type '{type_name}' is not ASONifiable")]
    NotAsonifiable { type_name: String },

    #[error("engine allocation failed: {0}")]
    AllocationFailure(#[from] EngineError),

    /// Nesting (or delegation chain) deeper than the configured limit.
    #[error("conversion exceeded the maximum depth of {limit}")]
    DepthExceeded { limit: usize },

    /// A delegate call failed on the host side.
    #[error("conversion delegate failed: {0}")]
    Host(String),

    /// A delegate returned an expression string that does not read.
    #[error("delegate returned an invalid expression: {0}")]
    Expression(#[from] ReadError),
}

/// Failures of ordering comparisons.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ComparisonError {
    /// The other operand could not be converted. Only ordering operators
    /// report this; equality treats it as "not equal".
    #[error("operands are not comparable: {0}")]
    Incomparable(#[source] ConversionError),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IterationError {
    #[error("values of type {tag:?} are not iterable")]
    NotIterable { tag: TypeTag },
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum BindError {
    #[error("'{0}' is not a valid variable name")]
    InvalidName(String),

    #[error("cannot bind value: {0}")]
    Conversion(#[from] ConversionError),
}

/// Failures reading an expression, including setting up its bindings.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    #[error(transparent)]
    Read(#[from] ReadError),

    #[error(transparent)]
    Bind(#[from] BindError),
}

/// Any error the bridge layer reports.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AsonError {
    #[error(transparent)]
    Conversion(#[from] ConversionError),

    #[error(transparent)]
    Comparison(#[from] ComparisonError),

    #[error(transparent)]
    Iteration(#[from] IterationError),

    #[error(transparent)]
    Parse(#[from] ParseError),
}

impl From<BindError> for AsonError {
    fn from(err: BindError) -> Self {
        AsonError::Parse(ParseError::Bind(err))
    }
}

/// Convenience alias used by callers that mix bridge operations.
pub type Result<T> = std::result::Result<T, AsonError>;
