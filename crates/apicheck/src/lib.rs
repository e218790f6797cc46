//! # apicheck - data-driven REST API test suite
//!
//! Fourteen scenarios against the automationexercise.com API, driven by a
//! fixture workbook and executed concurrently on top of
//! [`apicheck_harness`].
//!
//! ## Architecture
//!
//! - [`endpoints`] - Endpoint paths
//! - [`clients`] - Domain clients (products, brands, users)
//! - [`schema`] - Embedded response schemas and their validator
//! - [`data`] - Fixture workbook loader
//! - [`assertions`] - Status / business code / message checks
//! - [`context`] - Per-test fixture bundle
//! - [`suite`] - Bounded parallel runner and report
//! - [`cases`] - The scenarios
//!
//! ## Example
//!
//! ```rust,ignore
//! use apicheck::{cases, suite};
//! use apicheck_harness::HarnessConfig;
//!
//! let config = HarnessConfig::from_env();
//! let report = suite::run_suite(&config, cases::all(), Box::new(std::io::stdout())).await?;
//! println!("{report}");
//! ```

pub mod assertions;
pub mod cases;
pub mod clients;
pub mod context;
pub mod data;
pub mod endpoints;
pub mod schema;
pub mod suite;

pub use context::TestContext;
pub use data::{Row, TestData};
pub use schema::{SchemaName, SchemaValidator};
pub use suite::{SuiteReport, SuiteRunner, TestCase, TestOutcome, TestResult, run_suite};
