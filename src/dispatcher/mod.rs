//! # Dispatcher Module
//!
//! The dispatcher is the composition root of a routegate application. An [`App`] owns the
//! [`Router`](crate::router::Router) for the life of the process and is the entry point the
//! host calls once per request.
//!
//! ## Request Flow
//!
//! 1. Host builds an [`Environ`](crate::server::Environ) and calls [`App::call`]
//! 2. The router resolves the path to a handler and its path parameters
//! 3. A [`RequestView`](crate::server::RequestView) is built over the environment
//! 4. The handler runs with the view and the parameters and returns a
//!    [`Response`](crate::server::Response)
//! 5. The response is translated, the host's `start_response` is called once, and the
//!    body chunks are returned
//!
//! ## Handler Registration
//!
//! ```rust
//! use routegate::dispatcher::App;
//! use routegate::server::Response;
//!
//! let mut app = App::new();
//! app.route("/tmp")
//!     .to(|_req, _params| Ok(Response::new("Hello tmp!")))
//!     .unwrap();
//! ```
//!
//! ## Error Handling
//!
//! Unmatched paths are not errors: they go to [`not_found`], which always answers
//! `404 Not Found`. Anything a handler returns as `Err` is passed back to the host
//! unchanged; the dispatcher has no 500 fallback of its own.

mod core;

pub use core::{not_found, App, AppConfig, Handler, RouteRegistrar};
