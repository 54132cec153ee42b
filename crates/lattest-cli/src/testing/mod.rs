//! Suite runner for lattest
//!
//! Discovers `.lat` cases, drives the external compiler and interpreter,
//! and reports one classified line per case.

pub mod discovery;
pub mod process;
pub mod reporter;
pub mod runner;

#[cfg(all(test, unix))]
pub(crate) mod test_support;

pub use discovery::SuitePlan;
pub use reporter::{ReportFormat, TestReporter};
pub use runner::TestRunner;

/// Suites run when none are named and no `lattest.toml` lists any
pub const DEFAULT_SUITES: &[&str] = &[
    "basic",
    "arrays",
    "struct",
    "objects1",
    "objects2",
    "garbage-collector",
    "other",
];
