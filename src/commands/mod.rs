//! CLI command implementations, one module per subcommand.

pub mod admin;
pub mod jobs;
pub mod migrate;
pub mod serve;
