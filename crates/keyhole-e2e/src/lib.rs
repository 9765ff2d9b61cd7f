//! End-to-end test utilities for the keyhole secrets API
//!
//! This crate boots the real HTTP API on an ephemeral port with in-memory
//! collaborators, so tests exercise routing, query parsing and the response
//! contract over an actual socket.

pub mod certificates;
pub mod harness;

pub use certificates::TestCertificates;
pub use harness::TestServer;
