//! Command-line interface.
//!
//! - `serve` - Start the HTTP server
//! - `migrate` - Database migrations
//! - `jobs` - Email worker, queue inspection and expiration digests
//! - `admin` - Create the first administrator

pub mod args;

pub use args::{Cli, Commands};
