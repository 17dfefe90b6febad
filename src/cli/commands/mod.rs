//! CLI command implementations.

pub mod policies;
pub mod replay;
pub mod run;
pub mod validate;
