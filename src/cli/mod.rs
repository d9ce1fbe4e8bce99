//! # CLI Module
//!
//! Command-line interface for the `routegate` binary.
//!
//! ## Commands
//!
//! ### `serve`
//!
//! Serve the demo application over the reference HTTP host:
//!
//! ```bash
//! routegate serve --addr 127.0.0.1:8080 --workers 4
//! ```
//!
//! Options (each falls back to its environment variable, then to the default):
//! - `--addr <ADDR>` - Bind address (`ROUTEGATE_ADDR`, default `127.0.0.1:8080`)
//! - `--workers <N>` - Worker threads (`ROUTEGATE_WORKERS`, default `4`)
//! - `--charset <NAME>` - Default body charset (`ROUTEGATE_CHARSET`, default `utf-8`)
//!
//! ### `routes`
//!
//! Print the demo route table in match order:
//!
//! ```bash
//! routegate routes
//! ```

mod cli;

pub use cli::{run_cli, Cli, Commands};
