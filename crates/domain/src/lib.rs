//! Wisent Domain - Core harness types
//!
//! This crate defines the data model shared by the Wisent test harness:
//! request descriptors, buffered responses, status expectations and
//! test/benchmark outcomes. All types here are pure Rust with no I/O.

pub mod error;
pub mod request;
pub mod response;
pub mod serde_util;
pub mod testing;

pub use error::{DomainError, DomainResult};
pub use request::{Header, Headers, HttpMethod, RequestDescriptor};
pub use response::HttpResponse;
pub use testing::{
    AssertionFailure, BenchReport, CaseOutcome, CaseResult, StatusExpectation, TestResults,
};
