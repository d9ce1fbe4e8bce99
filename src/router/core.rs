//! Router core module - the per-request route scan.

use crate::dispatcher::{not_found, Handler};
use crate::server::{RequestView, Response};
use regex::{Captures, Regex};
use smallvec::SmallVec;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use super::RouteError;

/// Maximum number of path parameters before heap allocation.
pub const MAX_INLINE_PARAMS: usize = 8;

/// Stack-allocated parameter storage.
///
/// Param names use `Arc<str>` because they come from the route table, which is built once
/// at startup; values are per-request substrings of the path.
pub type ParamVec = SmallVec<[(Arc<str>, String); MAX_INLINE_PARAMS]>;

/// Path parameters captured by a matched route, in the order the pattern declares them.
///
/// Only groups that took part in the match are present. A handler asking for a name the
/// pattern does not capture gets `None` from [`get`](Self::get) and an error from
/// [`require`](Self::require); that error is the handler's failure to report.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathParams(ParamVec);

impl PathParams {
    /// Create an empty parameter set
    #[must_use]
    pub fn new() -> Self {
        Self(ParamVec::new())
    }

    /// Get a parameter by name
    #[inline]
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k.as_ref() == name)
            .map(|(_, v)| v.as_str())
    }

    /// Get a parameter the handler cannot work without.
    ///
    /// # Errors
    ///
    /// Returns [`RouteError::MissingParam`] if the route did not capture `name`.
    pub fn require(&self, name: &str) -> Result<&str, RouteError> {
        self.get(name).ok_or_else(|| RouteError::MissingParam {
            name: name.to_string(),
        })
    }

    /// Parse a required parameter into the type the handler works with.
    ///
    /// ```rust
    /// # use routegate::router::PathParams;
    /// let params = PathParams::from_pairs([("num", "42")]);
    /// let num: u32 = params.parse("num").unwrap();
    /// assert_eq!(num, 42);
    /// ```
    ///
    /// # Errors
    ///
    /// Returns [`RouteError::MissingParam`] if the parameter is absent and
    /// [`RouteError::InvalidParam`] if it does not parse as `T`.
    pub fn parse<T>(&self, name: &str) -> Result<T, RouteError>
    where
        T: FromStr,
        T::Err: fmt::Display,
    {
        let raw = self.require(name)?;
        raw.parse().map_err(|e: T::Err| RouteError::InvalidParam {
            name: name.to_string(),
            value: raw.to_string(),
            reason: e.to_string(),
        })
    }

    /// Build a parameter set from `(name, value)` pairs
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        Self(
            pairs
                .into_iter()
                .map(|(k, v)| (Arc::from(k.as_ref()), v.into()))
                .collect(),
        )
    }

    /// Iterate over `(name, value)` pairs in capture order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_ref(), v.as_str()))
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Convert to a HashMap
    /// Note: This allocates - use get() on the request path
    #[must_use]
    pub fn to_map(&self) -> HashMap<String, String> {
        self.0
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }
}

/// Result of resolving a request path against the route table
///
/// Every lookup produces a `RouteMatch`: when no route matches, `handler` is the
/// built-in not-found handler, `path_params` is empty and `pattern` is `None`.
#[derive(Clone)]
pub struct RouteMatch {
    /// Handler that should process this request
    pub handler: Handler,
    /// Named capture groups of the matched pattern
    pub path_params: PathParams,
    /// Pattern of the matched route as it was registered
    pub pattern: Option<Arc<str>>,
}

impl RouteMatch {
    /// Whether this lookup fell through to the not-found handler
    #[inline]
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        self.pattern.is_none()
    }
}

impl fmt::Debug for RouteMatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteMatch")
            .field("pattern", &self.pattern)
            .field("path_params", &self.path_params)
            .finish_non_exhaustive()
    }
}

/// A single route binding: the registered pattern, its compiled form, and its handler.
#[derive(Clone)]
struct Route {
    pattern: Arc<str>,
    /// Compiled from `pattern` unchanged; anchoring is applied when matching
    regex: Regex,
    /// Named capture groups of `pattern`, in declaration order
    param_names: Vec<Arc<str>>,
    handler: Handler,
}

/// Router that resolves request paths to handlers with a linear, ordered regex scan
///
/// The route table is append-only during setup and read-only afterwards, so a built
/// router can be shared across threads without locking.
#[derive(Clone)]
pub struct Router {
    routes: Vec<Route>,
    not_found: Handler,
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Router {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Router")
            .field("patterns", &self.patterns())
            .finish_non_exhaustive()
    }
}

impl Router {
    /// Create a router with an empty route table
    #[must_use]
    pub fn new() -> Self {
        Self {
            routes: Vec::new(),
            not_found: Arc::new(not_found),
        }
    }

    /// Append a route binding to the end of the route table
    ///
    /// No deduplication is done: a pattern identical to an earlier one is unreachable.
    ///
    /// # Errors
    ///
    /// Returns [`RouteError::InvalidPattern`] if `pattern` is not a valid regular expression.
    pub fn add<H>(&mut self, pattern: &str, handler: H) -> Result<(), RouteError>
    where
        H: Fn(&mut RequestView<'_>, &PathParams) -> anyhow::Result<Response>
            + Send
            + Sync
            + 'static,
    {
        self.add_handler(pattern, Arc::new(handler))
    }

    /// Append a route binding whose handler is already shared
    ///
    /// # Errors
    ///
    /// Returns [`RouteError::InvalidPattern`] if `pattern` is not a valid regular expression.
    pub fn add_handler(&mut self, pattern: &str, handler: Handler) -> Result<(), RouteError> {
        let (regex, param_names) = Self::compile(pattern)?;

        info!(
            pattern = %pattern,
            position = self.routes.len(),
            params = ?param_names,
            "Route registered"
        );

        self.routes.push(Route {
            pattern: Arc::from(pattern),
            regex,
            param_names,
            handler,
        });
        Ok(())
    }

    /// Resolve a request to a handler and its path parameters
    ///
    /// Scans the route table in registration order and returns the first route whose
    /// pattern matches at the start of `path`. The `method` is only recorded in logs:
    /// a route matches requests of any method.
    ///
    /// # Arguments
    ///
    /// * `method` - HTTP method (GET, POST, etc.)
    /// * `path` - Request path without query string (e.g., `/index/world`)
    #[must_use]
    pub fn route(&self, method: &str, path: &str) -> RouteMatch {
        debug!(method = %method, path = %path, "Route match attempt");

        let match_start = Instant::now();

        for route in &self.routes {
            let Some(captures) = captures_at_start(&route.regex, path) else {
                continue;
            };

            let mut params = ParamVec::new();
            for name in &route.param_names {
                if let Some(value) = captures.name(name) {
                    params.push((Arc::clone(name), value.as_str().to_string()));
                }
            }

            let match_duration = match_start.elapsed();
            if match_duration > Duration::from_millis(1) {
                warn!(
                    method = %method,
                    path = %path,
                    route_pattern = %route.pattern,
                    duration_us = match_duration.as_micros(),
                    "Slow route matching detected"
                );
            } else {
                info!(
                    method = %method,
                    path = %path,
                    route_pattern = %route.pattern,
                    path_params = ?params,
                    duration_us = match_duration.as_micros(),
                    "Route matched"
                );
            }

            return RouteMatch {
                handler: Arc::clone(&route.handler),
                path_params: PathParams(params),
                pattern: Some(Arc::clone(&route.pattern)),
            };
        }

        warn!(
            method = %method,
            path = %path,
            duration_us = match_start.elapsed().as_micros(),
            routes_count = self.routes.len(),
            "No route matched"
        );

        RouteMatch {
            handler: Arc::clone(&self.not_found),
            path_params: PathParams::new(),
            pattern: None,
        }
    }

    /// The handler returned when no route matches
    #[must_use]
    pub fn not_found_handler(&self) -> &Handler {
        &self.not_found
    }

    /// Number of registered routes
    #[must_use]
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Registered patterns in match order
    #[must_use]
    pub fn patterns(&self) -> Vec<&str> {
        self.routes.iter().map(|r| r.pattern.as_ref()).collect()
    }

    /// Print all registered routes to stdout
    ///
    /// Useful for verifying registration order, which decides which route wins.
    pub fn dump_routes(&self) {
        println!("[routes] count={}", self.routes.len());
        for (position, route) in self.routes.iter().enumerate() {
            println!(
                "[route] #{position} {} params={:?}",
                route.pattern, route.param_names
            );
        }
    }

    /// Compile a route pattern and list its named groups
    ///
    /// The pattern is compiled as written. Prefix anchoring happens at match time in
    /// [`captures_at_start`], so flags such as `(?x)` with trailing comments stay valid.
    pub(crate) fn compile(pattern: &str) -> Result<(Regex, Vec<Arc<str>>), RouteError> {
        let regex = Regex::new(pattern).map_err(|source| {
            RouteError::InvalidPattern {
                pattern: pattern.to_string(),
                source,
            }
        })?;
        let param_names = regex.capture_names().flatten().map(Arc::from).collect();
        Ok((regex, param_names))
    }
}

/// Match `regex` against `path`, accepting only a match that begins at offset 0
///
/// The search is leftmost-first, so if any match starts at 0 it is the one found.
/// The match need not consume the whole path.
pub(crate) fn captures_at_start<'h>(regex: &Regex, path: &'h str) -> Option<Captures<'h>> {
    regex
        .captures(path)
        .filter(|captures| captures.get(0).is_some_and(|m| m.start() == 0))
}
