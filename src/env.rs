//! Environment snapshots and placeholder substitution
//!
//! Size requests may reference environment variables as `${VAR}` or
//! `$VAR`. They are resolved against an explicit snapshot; a reference
//! that cannot be resolved is an error, never left as literal text.

use crate::error::{JobPvcError, JobPvcResult};
use regex::{Captures, Regex};
use std::collections::HashMap;
use std::sync::OnceLock;

/// Immutable view of environment variables
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvSnapshot {
    vars: HashMap<String, String>,
}

impl EnvSnapshot {
    /// Create an empty snapshot
    pub fn new() -> Self {
        Self::default()
    }

    /// Capture the current process environment
    ///
    /// Variables whose name or value is not valid UTF-8 are skipped.
    pub fn from_process() -> Self {
        Self {
            vars: std::env::vars_os()
                .filter_map(|(key, value)| Some((key.into_string().ok()?, value.into_string().ok()?)))
                .collect(),
        }
    }

    /// Add or replace a variable
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.vars.insert(key.into(), value.into());
        self
    }

    /// Overlay extra variables on top of this snapshot
    pub fn extend<I>(mut self, vars: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        self.vars.extend(vars);
        self
    }

    /// Look up a variable
    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(String::as_str)
    }
}

fn placeholder_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_.]*)\}|\$([A-Za-z_][A-Za-z0-9_]*)")
            .expect("placeholder pattern is valid")
    })
}

fn quantity_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^[0-9]+(\.[0-9]+)?(Ki|Mi|Gi|Ti|Pi|Ei|m|k|M|G|T|P|E|[eE][0-9]+)?$")
            .expect("quantity pattern is valid")
    })
}

/// Replace every `${VAR}` / `$VAR` reference in `input` from `env`
pub fn substitute_env(input: &str, env: &EnvSnapshot) -> JobPvcResult<String> {
    let mut unresolved = None;

    let replaced = placeholder_regex().replace_all(input, |caps: &Captures| {
        let name = caps
            .get(1)
            .or_else(|| caps.get(2))
            .map(|m| m.as_str())
            .unwrap_or_default();

        match env.get(name) {
            Some(value) => value.to_string(),
            None => {
                if unresolved.is_none() {
                    unresolved = Some(caps[0].to_string());
                }
                caps[0].to_string()
            }
        }
    });

    match unresolved {
        Some(placeholder) => Err(JobPvcError::UnresolvedPlaceholder {
            placeholder,
            input: input.to_string(),
        }),
        None => Ok(replaced.into_owned()),
    }
}

/// Resolve a size request into a quantity string the cluster accepts
pub fn resolve_quantity(input: &str, env: &EnvSnapshot) -> JobPvcResult<String> {
    let resolved = substitute_env(input, env)?;
    let resolved = resolved.trim();

    if !quantity_regex().is_match(resolved) {
        return Err(JobPvcError::InvalidQuantity(resolved.to_string()));
    }

    Ok(resolved.to_string())
}
