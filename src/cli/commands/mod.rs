//! Command implementations.

pub mod init;
pub mod jobs;
pub mod search;
