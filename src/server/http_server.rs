//! Reference host transport built on `tiny_http`.
//!
//! The router core never depends on this module; it exists so an [`App`] can be served
//! over real sockets by the `routegate serve` command and by the integration tests.
//! It plays the host's part of the contract: it builds an [`Environ`] per request,
//! drives [`App::call`], and decides what to do when a handler fails (log it and
//! answer a bare `500`).

use super::request::{charset_from_content_type, Environ, HeaderVec};
use super::response::parse_status_code;
use crate::dispatcher::App;
use std::io::{self, Read};
use std::net::{SocketAddr, TcpStream, ToSocketAddrs};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Default number of worker threads pulling requests off the listener
pub const DEFAULT_WORKERS: usize = 4;

/// Wrapper around a `tiny_http` server that hands every request to an [`App`]
pub struct HttpServer {
    app: Arc<App>,
    workers: usize,
}

/// Handle to a running HTTP server
///
/// Provides methods for waiting until the server is ready, stopping it, or joining
/// the worker threads.
pub struct ServerHandle {
    addr: SocketAddr,
    server: Arc<tiny_http::Server>,
    workers: Vec<JoinHandle<()>>,
}

impl ServerHandle {
    /// Address the server is listening on
    #[must_use]
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Wait for the server to be ready to accept connections
    ///
    /// # Errors
    ///
    /// Returns `TimedOut` if the server doesn't accept a connection within ~250ms.
    pub fn wait_ready(&self) -> io::Result<()> {
        for _ in 0..50 {
            if TcpStream::connect(self.addr).is_ok() {
                return Ok(());
            }
            thread::sleep(Duration::from_millis(5));
        }
        Err(io::Error::new(io::ErrorKind::TimedOut, "server not ready"))
    }

    /// Stop accepting requests and wait for the workers to exit
    pub fn stop(self) {
        for _ in &self.workers {
            self.server.unblock();
        }
        for worker in self.workers {
            if worker.join().is_err() {
                warn!("Worker thread panicked during shutdown");
            }
        }
        info!(addr = %self.addr, "HTTP server stopped");
    }

    /// Block until every worker thread exits
    ///
    /// # Errors
    ///
    /// Returns an error if a worker thread panicked.
    pub fn join(self) -> thread::Result<()> {
        for worker in self.workers {
            worker.join()?;
        }
        Ok(())
    }
}

impl HttpServer {
    #[must_use]
    pub fn new(app: App) -> Self {
        Self::from_shared(Arc::new(app))
    }

    /// Serve an app that is already shared with other owners
    #[must_use]
    pub fn from_shared(app: Arc<App>) -> Self {
        Self {
            app,
            workers: DEFAULT_WORKERS,
        }
    }

    /// Set the number of worker threads (at least one)
    #[must_use]
    pub fn workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    /// Start the HTTP server on the given address
    ///
    /// # Arguments
    ///
    /// * `addr` - Address to bind to (e.g., `"0.0.0.0:8080"` or `"127.0.0.1:0"`)
    ///
    /// # Errors
    ///
    /// Returns an error if the address is invalid, the port cannot be bound, or a
    /// worker thread cannot be spawned.
    pub fn start<A: ToSocketAddrs>(self, addr: A) -> io::Result<ServerHandle> {
        let addr = addr
            .to_socket_addrs()?
            .next()
            .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "invalid address"))?;

        let server = Arc::new(tiny_http::Server::http(addr).map_err(io::Error::other)?);
        let addr = server.server_addr().to_ip().unwrap_or(addr);

        let mut workers = Vec::with_capacity(self.workers);
        for id in 0..self.workers {
            let server = Arc::clone(&server);
            let app = Arc::clone(&self.app);
            let worker = thread::Builder::new()
                .name(format!("routegate-worker-{id}"))
                .spawn(move || {
                    for request in server.incoming_requests() {
                        serve_request(&app, request);
                    }
                    debug!(worker = id, "Worker exiting");
                })?;
            workers.push(worker);
        }

        info!(addr = %addr, workers = self.workers, routes = self.app.router().len(), "HTTP server listening");

        Ok(ServerHandle {
            addr,
            server,
            workers,
        })
    }
}

/// Run one request through the app and write the result back to the client
fn serve_request(app: &App, mut request: tiny_http::Request) {
    let method = request.method().to_string();
    let (path, query) = split_url(request.url());
    let (path, query) = (decode_path(path), query.to_string());

    let headers: HeaderVec = request
        .headers()
        .iter()
        .map(|h| (Arc::from(h.field.to_string()), h.value.to_string()))
        .collect();
    let content_length = find_header(&headers, "content-length")
        .map(str::to_string)
        .or_else(|| request.body_length().map(|len| len.to_string()));
    let charset = find_header(&headers, "content-type").and_then(charset_from_content_type);

    let mut started: Option<(String, Vec<(String, String)>)> = None;
    let outcome = {
        let input: &mut dyn Read = request.as_reader();
        let environ = Environ {
            method: method.clone(),
            path: path.clone(),
            query,
            content_length,
            charset,
            headers,
            input: Box::new(input),
        };
        app.call(environ, &mut |status: &str, headers: &[(String, String)]| {
            started = Some((status.to_string(), headers.to_vec()));
        })
    };

    let response = match (outcome, started) {
        (Ok(chunks), Some((status, headers))) => {
            let code = match parse_status_code(&status) {
                Some(code) => code.as_u16(),
                None => {
                    error!(status = %status, method = %method, path = %path, "Handler returned an unparseable status line");
                    500
                }
            };
            let mut response = tiny_http::Response::from_data(chunks.concat())
                .with_status_code(tiny_http::StatusCode(code));
            for (name, value) in &headers {
                match tiny_http::Header::from_bytes(name.as_bytes(), value.as_bytes()) {
                    Ok(header) => response = response.with_header(header),
                    Err(()) => warn!(header = %name, "Dropping header that is not valid on the wire"),
                }
            }
            debug!(method = %method, path = %path, status = %status, "Request served");
            response
        }
        (Ok(_), None) => {
            error!(method = %method, path = %path, "App returned a body without starting the response");
            tiny_http::Response::from_data(Vec::new()).with_status_code(tiny_http::StatusCode(500))
        }
        (Err(err), _) => {
            error!(method = %method, path = %path, error = %format!("{err:#}"), "Handler failed");
            tiny_http::Response::from_data(Vec::new()).with_status_code(tiny_http::StatusCode(500))
        }
    };

    if let Err(e) = request.respond(response) {
        warn!(method = %method, path = %path, error = %e, "Failed to write response");
    }
}

/// Split a request target into path and query string
fn split_url(url: &str) -> (&str, &str) {
    url.split_once('?').unwrap_or((url, ""))
}

/// Percent-decode the path part of a request target
///
/// Handlers see `/index/%41lice` as `/index/Alice`. Invalid UTF-8 after decoding is
/// replaced rather than rejected. `+` is left alone; it only means space in queries.
fn decode_path(raw: &str) -> String {
    String::from_utf8_lossy(&urlencoding::decode_binary(raw.as_bytes())).into_owned()
}

fn find_header<'h>(headers: &'h HeaderVec, name: &str) -> Option<&'h str> {
    headers
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case(name))
        .map(|(_, v)| v.as_str())
}
