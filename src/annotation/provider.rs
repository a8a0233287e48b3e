//! Annotation providers

use crate::annotation::{keys, Annotation};
use crate::env::EnvSnapshot;

/// A build run as seen by annotation providers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunContext {
    /// Current full name of the job owning the run
    pub job_full_name: String,
    /// Build number of the run
    pub build_number: u64,
}

impl RunContext {
    /// Create a run context
    pub fn new(job_full_name: impl Into<String>, build_number: u64) -> Self {
        Self {
            job_full_name: job_full_name.into(),
            build_number,
        }
    }
}

/// Contributes annotations for a build run or an environment
///
/// Both entry points contribute nothing unless overridden.
pub trait AnnotationProvider: Send + Sync {
    /// Annotations for a build run
    fn build_for_run(&self, _run: &RunContext) -> Vec<Annotation> {
        Vec::new()
    }

    /// Annotations for an environment snapshot
    fn build_for_env(&self, _env: &EnvSnapshot) -> Vec<Annotation> {
        Vec::new()
    }
}

/// Publishes the owning job's full name
#[derive(Debug, Clone, Copy, Default)]
pub struct JobAnnotationProvider;

impl AnnotationProvider for JobAnnotationProvider {
    fn build_for_run(&self, run: &RunContext) -> Vec<Annotation> {
        vec![Annotation::new(
            keys::JOB_FULL_NAME,
            run.job_full_name.clone(),
        )]
    }
}

/// Built-in providers
pub fn default_providers() -> Vec<Box<dyn AnnotationProvider>> {
    vec![Box::new(JobAnnotationProvider)]
}

/// Collect run annotations from every provider, in list order
pub fn collect_for_run(
    providers: &[Box<dyn AnnotationProvider>],
    run: &RunContext,
) -> Vec<Annotation> {
    providers
        .iter()
        .flat_map(|p| p.build_for_run(run))
        .collect()
}

/// Collect environment annotations from every provider, in list order
pub fn collect_for_env(
    providers: &[Box<dyn AnnotationProvider>],
    env: &EnvSnapshot,
) -> Vec<Annotation> {
    providers
        .iter()
        .flat_map(|p| p.build_for_env(env))
        .collect()
}
