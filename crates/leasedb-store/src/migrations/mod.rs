//! Migration framework
//!
//! - Embedded SQL migrations applied in order
//! - Checksums recorded at apply time and verified on every open
//! - Idempotent application

mod checksums;
mod embedded;
mod runner;

pub use runner::apply_migrations;
