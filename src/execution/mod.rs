//! Interactive execution of test cases.
//!
//! A run is started from a stored `TestCase` and a `TesterRole`, driven step
//! by step, and finished with `commit()`. The resulting `ExecutionCommit` is
//! written back with `DomainStore::record_execution`.

mod run;

pub use run::{ExecutionCommit, ExecutionRun, StepVerdict};
