//! Shared helpers for provider tests.

#![allow(dead_code)]

mod stub_server;

pub use stub_server::{CannedResponse, StubServer};
