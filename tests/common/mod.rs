//! Integration test common infrastructure.
//!
//! Provides a scripted IRC server for exercising the relay end to end.

pub mod server;

#[allow(unused_imports)]
pub use server::{Behavior, TestIrcServer};
