//! Volume naming
//!
//! Derives the claim name for a job from its full hierarchical name.
//! Only case and the choice of separator (space, underscore, slash)
//! collapse; every other character is carried through unchanged.

use crate::error::{JobPvcError, JobPvcResult};

/// Prefix of every job volume name
pub const VOLUME_NAME_PREFIX: &str = "pvc-";

/// Normalize a job full name into its volume name
///
/// `"Team/My Job_1"` becomes `"pvc-team-my-job-1"`. Fails with
/// [`JobPvcError::EmptyJobName`] when nothing is left after trimming.
pub fn normalize_job_name(job_full_name: &str) -> JobPvcResult<String> {
    let trimmed = job_full_name.trim();
    if trimmed.is_empty() {
        return Err(JobPvcError::EmptyJobName);
    }

    let body: String = trimmed
        .chars()
        .map(|c| match c {
            ' ' | '_' | '/' => '-',
            other => other,
        })
        .collect();

    Ok(format!("{}{}", VOLUME_NAME_PREFIX, body.to_lowercase()))
}
