use thiserror::Error;
use std::io;

/// Unified error type for the searchmap library.
///
/// Compiling a registered schema never fails; these errors come from the
/// surrounding steps (parsing definitions, registering and validating
/// schemas, looking a schema up by name).
#[derive(Error, Debug)]
pub enum Error {
    /// Error related to schema construction or registration.
    #[error("Schema Error: {0}")]
    SchemaError(String),

    /// Error raised while reading schema definitions.
    #[error("Parse Error: {0}")]
    ParseError(String),

    /// A schema graph that would produce an invalid or unbounded mapping.
    #[error("Validation Error: {0}")]
    ValidationError(String),

    /// A schema name that is not present in the registry.
    #[error("Unknown schema '{0}'")]
    UnknownSchema(String),

    /// Malformed JSON input.
    #[error("JSON Error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A specialized `Result` type for searchmap operations.
pub type Result<T> = std::result::Result<T, Error>;

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        // Reading definitions is the only I/O the crate ever sees
        Error::ParseError(format!("IO Error while reading definitions: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::UnknownSchema("Book".to_string());
        assert_eq!(err.to_string(), "Unknown schema 'Book'");

        let err = Error::ValidationError("depth exceeded".to_string());
        assert_eq!(err.to_string(), "Validation Error: depth exceeded");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "missing.json");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::ParseError(_)));
        assert!(err.to_string().contains("missing.json"));
    }

    #[test]
    fn test_json_error_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: Error = json_err.into();
        assert!(matches!(err, Error::Json(_)));
    }
}
