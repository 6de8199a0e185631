//! Integration test infrastructure: an in-process server plus a thin
//! line-oriented test client.

#![allow(dead_code)]

pub mod client;
pub mod server;

#[allow(unused_imports)]
pub use client::{PASSWORD, TestClient};
#[allow(unused_imports)]
pub use server::TestServer;
