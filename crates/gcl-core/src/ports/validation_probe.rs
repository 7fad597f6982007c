//! Validation probe port.

use async_trait::async_trait;

use crate::error::ValidationError;

/// Runs a candidate executable and captures what it prints.
///
/// The probe only reports output; deciding whether that output identifies
/// gcl is up to the caller.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ValidationProbe: Send + Sync {
    /// Run `path` with `args` and return its captured output.
    ///
    /// Returns `ValidationError::ProbeFailed` if the program cannot be run.
    async fn run(&self, path: &str, args: &[String]) -> Result<String, ValidationError>;
}
