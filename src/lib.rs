//! qadesk - test case management core
//!
//! Test cases, suites and users live in a `DomainStore` backed by a
//! key-value store. Cases are executed step by step through an
//! `ExecutionRun`, suites export to CSV, and an assistant can create suites
//! and cases from natural language.

pub mod assistant;
pub mod config;
pub mod domain;
pub mod error;
pub mod execution;
pub mod export;
pub mod id;
pub mod link;
pub mod storage;
pub mod store;

pub use error::{QaError, Result};
