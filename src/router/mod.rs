//! # Router Module
//!
//! The router maps an incoming `(method, path)` pair to a registered handler and the
//! path parameters captured by the route's regular expression.
//!
//! ## Overview
//!
//! The router is responsible for:
//! - Holding the ordered route table built at startup
//! - Prefix-matching request paths against each route's pattern, in registration order
//! - Extracting named capture groups (`(?P<name>...)`) as path parameters
//! - Falling back to the built-in not-found handler when nothing matches
//!
//! ## Matching rules
//!
//! 1. **Prefix match**: a pattern only has to match at the start of the path. `/tmp`
//!    matches `/tmp`, `/tmpfile` and `/tmp/a`; anchor with `$` to require a full match.
//! 2. **First match wins**: routes are tried in the order they were added. There is no
//!    specificity scoring, so a broad pattern registered early shadows later ones.
//! 3. **Path only**: the method is accepted for logging but does not filter routes.
//!
//! ## Example
//!
//! ```rust
//! use routegate::router::Router;
//! use routegate::server::Response;
//!
//! let mut router = Router::new();
//! router
//!     .add(r"^/index/(?P<name>[a-zA-Z]+)$", |_req, params| {
//!         Ok(Response::new(format!("Hello index: {}!", params.require("name")?)))
//!     })
//!     .unwrap();
//!
//! let matched = router.route("GET", "/index/world");
//! assert_eq!(matched.path_params.get("name"), Some("world"));
//! ```

mod core;
mod error;
#[cfg(test)]
mod tests;

pub use core::{ParamVec, PathParams, RouteMatch, Router, MAX_INLINE_PARAMS};
pub use error::RouteError;
