//! Dispatcher core module - per-request orchestration.

use crate::router::{PathParams, RouteError, RouteMatch, Router};
use crate::server::request::request_path;
use crate::server::{
    translate, Environ, RequestView, Response, StartResponse, TransportResponse, DEFAULT_CHARSET,
};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

/// A route handler
///
/// Receives the request view and the path parameters captured by its route. Any
/// `Err` it returns reaches the host untouched.
pub type Handler =
    Arc<dyn Fn(&mut RequestView<'_>, &PathParams) -> anyhow::Result<Response> + Send + Sync>;

/// Built-in handler for requests no route matches
///
/// Always answers `404 Not Found` with a plain-text body of the same text, whatever
/// the method or path.
///
/// # Errors
///
/// Never fails; the `Result` matches the [`Handler`] signature.
pub fn not_found(_req: &mut RequestView<'_>, _params: &PathParams) -> anyhow::Result<Response> {
    Ok(Response::not_found())
}

/// Application-wide settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Character set for decoding request bodies when the host gives no hint
    pub charset: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            charset: DEFAULT_CHARSET.to_string(),
        }
    }
}

/// The application: a router plus the per-request dispatch loop
///
/// Built once at startup, then shared read-only with the host (wrap it in an `Arc`
/// for multi-threaded hosts).
#[derive(Clone, Debug, Default)]
pub struct App {
    router: Router,
    config: AppConfig,
}

/// Registration helper returned by [`App::route`]
#[must_use = "a route is only registered once `to` is called"]
pub struct RouteRegistrar<'a> {
    router: &'a mut Router,
    pattern: String,
}

impl RouteRegistrar<'_> {
    /// Register `handler` for this registrar's pattern and hand the handler back
    ///
    /// # Errors
    ///
    /// Returns [`RouteError::InvalidPattern`] if the pattern does not compile.
    pub fn to<H>(self, handler: H) -> Result<H, RouteError>
    where
        H: Fn(&mut RequestView<'_>, &PathParams) -> anyhow::Result<Response>
            + Clone
            + Send
            + Sync
            + 'static,
    {
        self.router.add(&self.pattern, handler.clone())?;
        Ok(handler)
    }
}

impl App {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_config(config: AppConfig) -> Self {
        Self {
            router: Router::new(),
            config,
        }
    }

    #[must_use]
    pub fn router(&self) -> &Router {
        &self.router
    }

    /// Mutable access to the route table, for setup code
    pub fn router_mut(&mut self) -> &mut Router {
        &mut self.router
    }

    #[must_use]
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Start registering a route for `pattern`
    ///
    /// Call [`RouteRegistrar::to`] on the result with the handler. Routes are matched in
    /// the order they are registered.
    pub fn route(&mut self, pattern: &str) -> RouteRegistrar<'_> {
        RouteRegistrar {
            router: &mut self.router,
            pattern: pattern.to_string(),
        }
    }

    /// Host entry point
    ///
    /// Dispatches the request, signals `(status, headers)` to `start_response` exactly
    /// once, and returns the body chunks.
    ///
    /// # Errors
    ///
    /// Returns the handler's error unchanged if the handler fails; `start_response`
    /// is not called in that case.
    pub fn call(
        &self,
        environ: Environ<'_>,
        start_response: &mut dyn StartResponse,
    ) -> anyhow::Result<Vec<Vec<u8>>> {
        let TransportResponse {
            status,
            headers,
            body,
        } = self.handle(environ)?;
        start_response.start_response(&status, &headers);
        Ok(body)
    }

    /// Dispatch a request and return the translated response
    ///
    /// # Errors
    ///
    /// Returns the handler's error unchanged if the handler fails.
    pub fn handle(&self, environ: Environ<'_>) -> anyhow::Result<TransportResponse> {
        let start = Instant::now();
        let method = environ.method.to_ascii_uppercase();

        let RouteMatch {
            handler,
            path_params,
            pattern,
        } = self.router.route(&method, request_path(&environ.path));

        let mut request = RequestView::new(environ, &self.config.charset);
        debug!(
            method = %method,
            path = %request.path(),
            route_pattern = ?pattern,
            "Dispatching to handler"
        );

        let response = handler(&mut request, &path_params)?;
        let transport = translate(response);

        info!(
            method = %method,
            path = %request.path(),
            status = %transport.status,
            duration_us = start.elapsed().as_micros(),
            "Request dispatched"
        );
        Ok(transport)
    }
}
