//! Common test utilities for the suite.
//!
//! - [`mock_api`] - Stateful local stand-in for the target API
//! - [`fixtures`] - Fixture paths and run configuration

#![allow(dead_code)]

pub mod fixtures;
pub mod mock_api;
