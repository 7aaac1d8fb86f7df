//! Interpreter seams

use crate::error::ScriptError;
use std::future::Future;

/// An embedded interpreter.
///
/// The bridge treats it as an opaque async call: source text in, result text
/// or a [`ScriptError`] out.
pub trait ScriptRunner: Send + Sync {
    /// Bring the interpreter up. Called once before the first execution.
    fn load(&self) -> impl Future<Output = Result<(), ScriptError>> + Send;

    fn run(&self, source: &str) -> impl Future<Output = Result<String, ScriptError>> + Send;

    fn install(&self, packages: &[String]) -> impl Future<Output = Result<(), ScriptError>> + Send;
}

/// Where script sources come from
pub trait ScriptSource: Send + Sync {
    fn fetch(&self, path: &str) -> impl Future<Output = Result<String, ScriptError>> + Send;
}
