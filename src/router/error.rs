use std::fmt;

/// Routing error
///
/// Raised by [`Router::add`](super::Router::add) when a pattern does not compile, and by
/// [`PathParams`](super::PathParams) when a handler asks for a parameter the matched route
/// did not supply.
#[derive(Debug)]
pub enum RouteError {
    /// The route pattern is not a valid regular expression
    InvalidPattern {
        /// The pattern as it was registered
        pattern: String,
        /// Compilation error reported by the regex engine
        source: regex::Error,
    },
    /// The handler required a parameter the pattern did not capture
    MissingParam {
        /// Name the handler asked for
        name: String,
    },
    /// A captured parameter could not be converted to the handler's type
    InvalidParam {
        /// Parameter name
        name: String,
        /// Captured text
        value: String,
        /// Conversion error message
        reason: String,
    },
}

impl fmt::Display for RouteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RouteError::InvalidPattern { pattern, source } => {
                write!(f, "invalid route pattern '{pattern}': {source}")
            }
            RouteError::MissingParam { name } => {
                write!(f, "missing path parameter '{name}'")
            }
            RouteError::InvalidParam {
                name,
                value,
                reason,
            } => {
                write!(f, "invalid path parameter '{name}' = '{value}': {reason}")
            }
        }
    }
}

impl std::error::Error for RouteError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RouteError::InvalidPattern { source, .. } => Some(source),
            _ => None,
        }
    }
}
