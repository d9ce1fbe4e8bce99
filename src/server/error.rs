use std::fmt;
use std::io;

/// Error raised while reading or interpreting a request payload
///
/// None of these are recovered by the dispatcher: a handler that hits one either
/// handles it or returns it, and a returned error goes to the host unchanged.
#[derive(Debug)]
pub enum RequestError {
    /// The body was requested but the host supplied no usable `Content-Length`,
    /// so the read could not be bounded
    MissingContentLength,
    /// The body bytes are not valid in the request's character set
    Decoding {
        /// Character set the decode was attempted with
        charset: String,
        /// Description of the failure
        reason: String,
    },
    /// The body is not valid JSON (or does not fit the requested type)
    MalformedPayload(serde_json::Error),
    /// The host's input stream failed during the read
    Io(io::Error),
}

impl fmt::Display for RequestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequestError::MissingContentLength => {
                write!(f, "request body requested without a usable Content-Length")
            }
            RequestError::Decoding { charset, reason } => {
                write!(f, "request body is not valid {charset}: {reason}")
            }
            RequestError::MalformedPayload(e) => write!(f, "malformed JSON payload: {e}"),
            RequestError::Io(e) => write!(f, "failed to read request body: {e}"),
        }
    }
}

impl std::error::Error for RequestError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RequestError::MalformedPayload(e) => Some(e),
            RequestError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for RequestError {
    fn from(e: io::Error) -> Self {
        RequestError::Io(e)
    }
}
