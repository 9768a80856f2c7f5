//! HTTP transport adapter
//!
//! Delivers authority commands and session lifecycle notifications to the
//! engine, feeds the entity directory, and exposes session observability.

pub mod handlers;
pub mod sender;
pub mod server;
pub mod sse;

pub use server::{build_router, run, AppContext};
