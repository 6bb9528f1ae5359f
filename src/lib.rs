//! Core library for the cloudaudit-tools command line application.
//!
//! Inventory exports of an AWS account are loaded as source tables
//! ([`cloudaudit::tools::io`]), resolved and joined across resource types,
//! flattened into display cells ([`cloudaudit::tools::flatten`]) and written
//! as one audit sheet per resource type ([`cloudaudit::tools::transform`]).
//! [`cloudaudit::tools::sync`] orchestrates a run end to end.

pub mod cloudaudit;

pub use cloudaudit::tools::{
    Result, ToolError, compare, config, error, flatten, io, join, model, resolve, sync, transform,
};
