//! Common test utilities for the execution core.
//!
//! - [`harness`] - Logger and executor construction
//! - [`server`] - Local HTTP servers standing in for the remote API

#![allow(dead_code)]

pub mod harness;
pub mod server;
