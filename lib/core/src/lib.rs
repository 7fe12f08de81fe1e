//! Core domain types and utilities for the punchcard console.
//!
//! This crate provides the foundational types, error handling, and shared
//! utilities used throughout the punchcard sign-in automation console.

pub mod error;
pub mod id;

pub use error::Result;
pub use id::{NodeId, PluginId, TaskId, UserId};
