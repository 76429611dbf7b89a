//! Coffer core types - shared identifier and schema vocabulary
//!
//! Small leaf crate holding the types every other coffer crate agrees on:
//! the `Pid` object identifier and the fixed index/datastream schema
//! constants.

pub mod pid;
pub mod schema;

pub use pid::{Pid, PidParseError};
