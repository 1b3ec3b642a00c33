//! pr-automerge - merge GitHub pull requests once they satisfy a merge policy
//!
//! Each requested pull request is evaluated against a [`config::MergePolicy`],
//! merged when eligible, and retried with exponential backoff when the merge
//! call itself fails.

pub mod config;
pub mod error;
pub mod events;
pub mod merge;
pub mod platform;
pub mod types;
