pub mod error;
pub mod http_server;
pub mod request;
pub mod response;

pub use error::RequestError;
pub use http_server::{HttpServer, ServerHandle};
pub use request::{Environ, HeaderVec, RequestView, DEFAULT_CHARSET};
pub use response::{translate, Response, StartResponse, TransportResponse};
