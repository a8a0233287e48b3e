//! Lifecycle reconciliation
//!
//! Removes job claims when a job's identity stops being valid: the job
//! is deleted, renamed, moved, or sits in a folder that was renamed.
//! New identities get a fresh claim on their next build; claims are
//! never renamed in place.

pub mod item;
mod reconciler;

pub use item::{Item, ItemEvent};
pub use reconciler::{affected_jobs, CleanupOutcome, CleanupReport, CleanupStatus, Reconciler};
