//! jobpvc - per-job persistent volume claims
//!
//! Gives every build of a job the same workspace claim on a cluster, and
//! removes that claim when the job is deleted, renamed or moved.

pub mod annotation;
pub mod audit;
pub mod cli;
pub mod cluster;
pub mod config;
pub mod env;
pub mod error;
pub mod naming;
pub mod reconcile;
pub mod ui;
pub mod volume;

pub use error::{JobPvcError, JobPvcResult};
