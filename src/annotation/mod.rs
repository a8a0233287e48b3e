//! Annotation carrier
//!
//! Build runs hand facts to the volume layer as `(key, value)`
//! annotations. Producers implement [`AnnotationProvider`] and are passed
//! explicitly to the call site; there is no global registry.

mod provider;

pub use provider::{
    collect_for_env, collect_for_run, default_providers, AnnotationProvider,
    JobAnnotationProvider, RunContext,
};

use serde::{Deserialize, Serialize};

/// Annotation keys
pub mod keys {
    /// Carries the full name of the job that owns the build run
    pub const JOB_FULL_NAME: &str = "jobFullName";
}

/// A single immutable `(key, value)` fact
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Annotation {
    key: String,
    value: String,
}

impl Annotation {
    /// Create a new annotation
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn value(&self) -> &str {
        &self.value
    }
}

/// First annotation with the given key
///
/// Keys are not unique across producers; callers must not depend on
/// which producer wins for a conflicting key.
pub fn find_annotation<'a>(annotations: &'a [Annotation], key: &str) -> Option<&'a Annotation> {
    annotations.iter().find(|a| a.key() == key)
}
