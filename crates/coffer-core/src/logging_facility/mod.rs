//! Logging facility
//!
//! Single initialization point for the tracing stack.

mod init;

pub use init::{init, Profile};
