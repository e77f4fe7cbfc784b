//! CLI command implementations for malsync.
//!
//! Each module corresponds to a subcommand available to users.

pub mod sync;
pub mod validate;
