//! # routegate
//!
//! **routegate** is a small request router and dispatcher that sits on top of a
//! gateway-style host interface. The host hands it a per-request environment; routegate
//! matches the path against an ordered list of regular-expression routes, runs the
//! matched handler, and translates the handler's response into a status line, a header
//! list and a body for the host to send.
//!
//! ## Architecture
//!
//! - **[`router`]** - Ordered regex route table, prefix matching and parameter extraction
//! - **[`dispatcher`]** - The [`App`] composition root and the built-in not-found handler
//! - **[`server`]** - Request view, response value, transport translation, and a
//!   reference `tiny_http` host
//! - **[`runtime_config`]** / **[`logging`]** - Environment-driven configuration and
//!   `tracing` setup
//! - **[`cli`]** / **[`demo`]** - The `routegate` binary and its demo application
//!
//! ### Request Handling Flow
//!
//! ```mermaid
//! sequenceDiagram
//!     participant Host
//!     participant App
//!     participant Router
//!     participant Handler
//!
//!     Host->>App: call(environ, start_response)
//!     App->>Router: route("GET", "/index/alice")
//!     Router->>Router: Scan patterns in registration order
//!     alt No Route Match
//!         Router-->>App: not_found handler, no params
//!     end
//!     Router-->>App: handler, {name: "alice"}
//!     App->>Handler: handler(&mut RequestView, &PathParams)
//!     Handler-->>App: Response { body }
//!     App->>App: translate (defaults: 200 OK, text/plain)
//!     App->>Host: start_response("200 OK", headers)
//!     App-->>Host: [body bytes]
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use routegate::{App, Environ, Response};
//!
//! let mut app = App::new();
//! app.route(r"^/index/(?P<name>[a-zA-Z]+)$")
//!     .to(|_req, params| {
//!         Ok(Response::new(format!("Hello index: {}!", params.require("name")?)))
//!     })
//!     .unwrap();
//!
//! let mut status = String::new();
//! let body = app
//!     .call(Environ::new("GET", "/index/alice"), &mut |s: &str, _h: &[(String, String)]| {
//!         status = s.to_string();
//!     })
//!     .unwrap();
//!
//! assert_eq!(status, "200 OK");
//! assert_eq!(body, vec![b"Hello index: alice!".to_vec()]);
//! ```
//!
//! ## Routing rules worth knowing
//!
//! - Patterns match at the **start** of the path only; `/tmp` also matches `/tmpfile`.
//!   Anchor with `$` for an exact match.
//! - The **first** registered match wins.
//! - Routing looks at the **path only**. A route answers every method.
//! - Handler errors are returned to the host as they are; only unmatched paths get a
//!   built-in answer (`404 Not Found`).

pub mod cli;
pub mod demo;
pub mod dispatcher;
pub mod logging;
pub mod router;
pub mod runtime_config;
pub mod server;

pub use dispatcher::{App, AppConfig, Handler};
pub use router::{PathParams, RouteError, RouteMatch, Router};
pub use server::{Environ, RequestError, RequestView, Response, StartResponse, TransportResponse};
