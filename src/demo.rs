//! Demo application served by `routegate serve`.
//!
//! | Pattern                          | Response                |
//! |----------------------------------|-------------------------|
//! | `^/index/(?P<name>[a-zA-Z]+)$`   | `Hello index: {name}!`  |
//! | `^/number/(?P<num>[0-9]+)$`      | `Hello index: {num}!`   |
//! | `/tmp` (prefix, unanchored)      | `Hello tmp!`            |

use crate::dispatcher::{App, AppConfig};
use crate::router::{PathParams, RouteError};
use crate::server::{RequestView, Response};

pub const INDEX_PATTERN: &str = r"^/index/(?P<name>[a-zA-Z]+)$";
pub const NUMBER_PATTERN: &str = r"^/number/(?P<num>[0-9]+)$";
pub const TMP_PATTERN: &str = "/tmp";

/// Greets the captured name
///
/// # Errors
///
/// Fails if the route did not capture `name`.
pub fn index(_req: &mut RequestView<'_>, params: &PathParams) -> anyhow::Result<Response> {
    let name = params.require("name")?;
    Ok(Response::new(format!("Hello index: {name}!")))
}

/// Echoes the captured digits exactly as they appear in the path
///
/// # Errors
///
/// Fails if the route did not capture `num`.
pub fn number(_req: &mut RequestView<'_>, params: &PathParams) -> anyhow::Result<Response> {
    let num = params.require("num")?;
    Ok(Response::new(format!("Hello index: {num}!")))
}

/// # Errors
///
/// Never fails.
pub fn tmp(_req: &mut RequestView<'_>, _params: &PathParams) -> anyhow::Result<Response> {
    Ok(Response::new("Hello tmp!"))
}

/// Build the demo application
///
/// # Errors
///
/// Returns [`RouteError`] if a demo pattern fails to compile.
pub fn demo_app(config: AppConfig) -> Result<App, RouteError> {
    let mut app = App::with_config(config);
    app.route(INDEX_PATTERN).to(index)?;
    app.route(NUMBER_PATTERN).to(number)?;
    app.route(TMP_PATTERN).to(tmp)?;
    Ok(app)
}
