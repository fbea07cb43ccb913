//! # splitkit-core
//!
//! Foundation types and pure logic for the splitkit assignment engine.
//!
//! This crate provides the shared vocabulary that the client crate builds on:
//!
//! - **Visitor IDs**: [`VisitorId`] newtype, UUID v4 for anonymous visitors
//! - **Splits**: [`Split`] and the loaded/unloaded [`SplitRegistry`]
//! - **Assignments**: immutable [`Assignment`] records and the per-visitor
//!   [`AssignmentRegistry`]
//! - **Visitor**: [`Visitor`] state with the identity merge rule
//! - **Bucketing**: [`calculate_variant`], the deterministic hash-based
//!   variant calculator
//! - **Errors**: [`CoreError`] via `thiserror`
//! - **Logging**: `tracing` subscriber bootstrap and test capture helpers

#![deny(unsafe_code)]

pub mod assignment;
pub mod calculator;
pub mod errors;
pub mod ids;
pub mod logging;
pub mod split;
pub mod visitor;

pub use assignment::{Assignment, AssignmentRegistry};
pub use calculator::{assignment_bucket, calculate_variant};
pub use errors::{CoreError, Result};
pub use ids::VisitorId;
pub use split::{Split, SplitRegistry, Weighting};
pub use visitor::Visitor;
