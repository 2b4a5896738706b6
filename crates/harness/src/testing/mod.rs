//! In-memory reporting contexts.
//!
//! [`TestReport`] and [`Bencher`] implement the context ports for plain
//! `#[tokio::test]` functions and for custom benchmark drivers.

mod bencher;
mod report;

pub use bencher::Bencher;
pub use report::TestReport;
