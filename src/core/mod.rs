//! Core types: frames, errors and the dispatcher shared by every transport.

pub mod dispatch;
pub mod error;
pub mod mcp;
