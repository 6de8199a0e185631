//! ircserv - a minimal IRC server (RFC 1459 / RFC 2812 subset).
//!
//! The crate is a library so the integration tests and the bundled
//! load-test client can drive a real server in-process; the `ircserv`
//! binary is a thin wrapper around [`server::Server`].

pub mod channel;
pub mod client;
pub mod config;
pub mod constants;
pub mod errors;
pub mod handlers;
pub mod message;
pub mod modes;
pub mod parsers;
pub mod registry;
pub mod replies;
pub mod server;
