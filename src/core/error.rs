//! Errors raised while turning user input into operations, before anything is sent to an
//! appliance.

use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum Error {
    /// The function name does not match any verb and resource in the catalog.
    #[error("unknown function: {0}")]
    UnknownFunction(String),

    /// The resource exists, but it does not support the requested verb.
    #[error("{resource} does not support {verb}")]
    UnsupportedVerb {
        resource: &'static str,
        verb: &'static str,
    },

    /// An argument that the function does not accept.
    #[error("{function} got an unexpected argument: {argument}")]
    UnknownArgument { function: String, argument: String },

    /// An argument whose value cannot be coerced to the field's kind.
    #[error("invalid value for {field} (expected {expected}): {value}")]
    InvalidValue {
        field: String,
        expected: &'static str,
        value: String,
    },

    /// A `key=value` pair from the command line that has no `=`.
    #[error("expected an argument in the form key=value, got: {0}")]
    MalformedArgument(String),
}
