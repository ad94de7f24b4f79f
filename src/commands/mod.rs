//! # Command Implementations
//!
//! Each submodule handles one CLI command; `pipeline` holds the fetch and
//! rank steps they share.

pub mod digest;
pub mod pipeline;
pub mod preview;
