use super::RequestError;
use serde::de::DeserializeOwned;
use smallvec::SmallVec;
use std::fmt;
use std::io::{self, Read};
use std::sync::Arc;
use tracing::{debug, warn};

/// Maximum inline headers before heap allocation
pub const MAX_INLINE_HEADERS: usize = 16;

/// Header storage for the per-request environment
///
/// Header names use `Arc<str>` so hosts can reuse interned names.
pub type HeaderVec = SmallVec<[(Arc<str>, String); MAX_INLINE_HEADERS]>;

/// Character set used by [`RequestView::text`] when neither the host nor the app says otherwise
pub const DEFAULT_CHARSET: &str = "utf-8";

/// Largest buffer reserved up front for a body read; longer bodies grow as they arrive.
const MAX_PREALLOCATED_BODY: usize = 64 * 1024;

/// The per-request environment a host hands to [`App::call`](crate::dispatcher::App::call).
///
/// Field values are taken as the host reports them; [`RequestView`] applies the
/// normalisation (upper-cased method, `/` for an empty path).
pub struct Environ<'a> {
    /// Request method as sent by the client
    pub method: String,
    /// Request path without the query string; may be empty
    pub path: String,
    /// Raw query string without the leading `?`
    pub query: String,
    /// Raw `Content-Length` value; required only if the body is read
    pub content_length: Option<String>,
    /// Character set hint for decoding the body (e.g. from `Content-Type`)
    pub charset: Option<String>,
    /// Request headers in arrival order
    pub headers: HeaderVec,
    /// Request payload stream; read at most once
    pub input: Box<dyn Read + 'a>,
}

impl<'a> Environ<'a> {
    /// Environment for a request with no payload
    pub fn new(method: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            path: path.into(),
            query: String::new(),
            content_length: None,
            charset: None,
            headers: HeaderVec::new(),
            input: Box::new(io::empty()),
        }
    }

    #[must_use]
    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        self.query = query.into();
        self
    }

    /// Attach an in-memory payload and its matching content length
    #[must_use]
    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        let body = body.into();
        self.content_length = Some(body.len().to_string());
        self.input = Box::new(io::Cursor::new(body));
        self
    }

    /// Attach a payload stream with an explicit (possibly absent) content length
    #[must_use]
    pub fn with_input<R: Read + 'a>(mut self, input: R, content_length: Option<String>) -> Self {
        self.input = Box::new(input);
        self.content_length = content_length;
        self
    }

    #[must_use]
    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.push((Arc::from(name), value.into()));
        self
    }

    #[must_use]
    pub fn with_charset(mut self, charset: impl Into<String>) -> Self {
        self.charset = Some(charset.into());
        self
    }
}

impl fmt::Debug for Environ<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Environ")
            .field("method", &self.method)
            .field("path", &self.path)
            .field("query", &self.query)
            .field("content_length", &self.content_length)
            .field("charset", &self.charset)
            .field("headers", &self.headers)
            .finish_non_exhaustive()
    }
}

/// Read-only view over an [`Environ`], handed to handlers.
///
/// The body is read from the host stream on first access and cached; every later
/// call to [`body`](Self::body), [`text`](Self::text) or [`json`](Self::json) works
/// from the cached bytes.
pub struct RequestView<'a> {
    environ: Environ<'a>,
    method: String,
    charset: String,
    body: Option<Vec<u8>>,
}

impl<'a> RequestView<'a> {
    /// Wrap an environment, using `default_charset` unless the host supplied a hint
    pub fn new(environ: Environ<'a>, default_charset: &str) -> Self {
        let method = environ.method.to_ascii_uppercase();
        let charset = environ
            .charset
            .clone()
            .unwrap_or_else(|| default_charset.to_string());
        Self {
            environ,
            method,
            charset,
            body: None,
        }
    }

    /// Request path; `/` when the host reports an empty path
    #[inline]
    #[must_use]
    pub fn path(&self) -> &str {
        request_path(&self.environ.path)
    }

    /// Request method, upper-cased
    #[inline]
    #[must_use]
    pub fn method(&self) -> &str {
        &self.method
    }

    /// Raw query string, unparsed
    #[inline]
    #[must_use]
    pub fn query(&self) -> &str {
        &self.environ.query
    }

    /// Query string decoded as `application/x-www-form-urlencoded` pairs, in order
    #[must_use]
    pub fn query_params(&self) -> Vec<(String, String)> {
        url::form_urlencoded::parse(self.environ.query.as_bytes())
            .into_owned()
            .collect()
    }

    /// Get a query parameter by name
    ///
    /// Uses "last write wins" semantics: for `?limit=10&limit=20` this returns `20`.
    #[must_use]
    pub fn query_param(&self, name: &str) -> Option<String> {
        url::form_urlencoded::parse(self.environ.query.as_bytes())
            .filter(|(k, _)| k == name)
            .last()
            .map(|(_, v)| v.into_owned())
    }

    /// Get a header by name (case-insensitive per RFC 7230)
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.environ
            .headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Character set [`text`](Self::text) decodes with
    #[must_use]
    pub fn charset(&self) -> &str {
        &self.charset
    }

    /// Declared content length, if the host supplied a usable one
    #[must_use]
    pub fn content_length(&self) -> Option<usize> {
        parse_content_length(self.environ.content_length.as_deref())
    }

    /// Raw request payload
    ///
    /// The first call reads `Content-Length` bytes from the host stream; the bytes are
    /// cached and the stream is never touched again.
    ///
    /// # Errors
    ///
    /// - [`RequestError::MissingContentLength`] if the host gave no usable content length
    /// - [`RequestError::Io`] if the stream fails while reading
    pub fn body(&mut self) -> Result<&[u8], RequestError> {
        let body = match self.body.take() {
            Some(body) => body,
            None => self.read_body()?,
        };
        Ok(self.body.insert(body).as_slice())
    }

    /// Payload decoded with the request's character set
    ///
    /// # Errors
    ///
    /// Everything [`body`](Self::body) returns, plus [`RequestError::Decoding`] when the
    /// bytes are not valid in the character set or the character set is unsupported.
    pub fn text(&mut self) -> Result<String, RequestError> {
        let charset = self.charset.clone();
        decode(self.body()?, &charset)
    }

    /// Payload parsed as JSON
    ///
    /// # Errors
    ///
    /// Everything [`body`](Self::body) returns, plus [`RequestError::MalformedPayload`].
    pub fn json(&mut self) -> Result<serde_json::Value, RequestError> {
        self.json_as()
    }

    /// Payload deserialized into `T`
    ///
    /// # Errors
    ///
    /// Everything [`body`](Self::body) returns, plus [`RequestError::MalformedPayload`]
    /// when the payload is not valid JSON or does not fit `T`.
    pub fn json_as<T: DeserializeOwned>(&mut self) -> Result<T, RequestError> {
        serde_json::from_slice(self.body()?).map_err(RequestError::MalformedPayload)
    }

    fn read_body(&mut self) -> Result<Vec<u8>, RequestError> {
        let len = self
            .content_length()
            .ok_or(RequestError::MissingContentLength)?;

        let mut buf = Vec::with_capacity(len.min(MAX_PREALLOCATED_BODY));
        self.environ
            .input
            .by_ref()
            .take(len as u64)
            .read_to_end(&mut buf)?;

        if buf.len() < len {
            warn!(
                expected = len,
                received = buf.len(),
                path = %self.path(),
                "Request body shorter than Content-Length"
            );
        } else {
            debug!(bytes = buf.len(), path = %self.path(), "Request body read");
        }
        Ok(buf)
    }
}

impl fmt::Debug for RequestView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestView")
            .field("method", &self.method)
            .field("path", &self.path())
            .field("query", &self.query())
            .field("charset", &self.charset)
            .field("body_cached", &self.body.is_some())
            .finish()
    }
}

/// Normalise a host-reported path: empty means `/`
#[inline]
#[must_use]
pub fn request_path(raw: &str) -> &str {
    if raw.is_empty() {
        "/"
    } else {
        raw
    }
}

/// Parse a raw `Content-Length` value
///
/// Accepts a non-negative decimal integer with optional surrounding whitespace;
/// anything else is treated as absent.
#[must_use]
pub fn parse_content_length(raw: Option<&str>) -> Option<usize> {
    let digits = raw?.trim();
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

/// Extract the `charset` parameter from a `Content-Type` value
///
/// `text/plain; charset="ISO-8859-1"` yields `ISO-8859-1`.
#[must_use]
pub fn charset_from_content_type(content_type: &str) -> Option<String> {
    content_type.split(';').skip(1).find_map(|param| {
        let (key, value) = param.split_once('=')?;
        key.trim()
            .eq_ignore_ascii_case("charset")
            .then(|| value.trim().trim_matches('"').to_string())
            .filter(|v| !v.is_empty())
    })
}

/// Decode bytes in one of the supported character sets
///
/// Supported: UTF-8, US-ASCII and ISO-8859-1 (Latin-1), under their common labels.
///
/// # Errors
///
/// Returns [`RequestError::Decoding`] for invalid input or an unsupported charset.
pub fn decode(bytes: &[u8], charset: &str) -> Result<String, RequestError> {
    let decoding_error = |reason: String| RequestError::Decoding {
        charset: charset.to_string(),
        reason,
    };

    match charset.trim().to_ascii_lowercase().as_str() {
        "utf-8" | "utf8" => std::str::from_utf8(bytes)
            .map(str::to_string)
            .map_err(|e| decoding_error(e.to_string())),
        "us-ascii" | "ascii" => match bytes.iter().position(|b| !b.is_ascii()) {
            None => Ok(bytes.iter().map(|&b| char::from(b)).collect()),
            Some(pos) => Err(decoding_error(format!(
                "byte 0x{:02x} at position {pos} is not ASCII",
                bytes[pos]
            ))),
        },
        "iso-8859-1" | "latin-1" | "latin1" | "l1" => {
            Ok(bytes.iter().map(|&b| char::from(b)).collect())
        }
        _ => Err(decoding_error("unsupported charset".to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_path_defaults_to_root() {
        assert_eq!(request_path(""), "/");
        assert_eq!(request_path("/a"), "/a");
    }

    #[test]
    fn test_parse_content_length() {
        assert_eq!(parse_content_length(Some("12")), Some(12));
        assert_eq!(parse_content_length(Some(" 7 ")), Some(7));
        assert_eq!(parse_content_length(Some("")), None);
        assert_eq!(parse_content_length(Some("-1")), None);
        assert_eq!(parse_content_length(Some("abc")), None);
        assert_eq!(parse_content_length(None), None);
    }

    #[test]
    fn test_charset_from_content_type() {
        assert_eq!(
            charset_from_content_type("text/plain; charset=\"ISO-8859-1\""),
            Some("ISO-8859-1".to_string())
        );
        assert_eq!(
            charset_from_content_type("application/json;Charset=utf-8"),
            Some("utf-8".to_string())
        );
        assert_eq!(charset_from_content_type("application/json"), None);
    }

    #[test]
    fn test_decode_charsets() {
        assert_eq!(decode("héllo".as_bytes(), "UTF-8").unwrap(), "héllo");
        assert_eq!(decode(&[0x68, 0xe9], "latin-1").unwrap(), "hé");
        assert!(matches!(
            decode(&[0xff, 0xfe], "utf-8"),
            Err(RequestError::Decoding { .. })
        ));
        assert!(matches!(
            decode(&[0x68, 0xe9], "ascii"),
            Err(RequestError::Decoding { .. })
        ));
        assert!(matches!(
            decode(b"abc", "koi8-r"),
            Err(RequestError::Decoding { .. })
        ));
    }

    #[test]
    fn test_method_is_upper_cased() {
        let view = RequestView::new(Environ::new("post", "/x"), DEFAULT_CHARSET);
        assert_eq!(view.method(), "POST");
    }

    #[test]
    fn test_charset_hint_overrides_default() {
        let view = RequestView::new(Environ::new("GET", "/").with_charset("latin-1"), "utf-8");
        assert_eq!(view.charset(), "latin-1");
        let view = RequestView::new(Environ::new("GET", "/"), "utf-8");
        assert_eq!(view.charset(), "utf-8");
    }
}
