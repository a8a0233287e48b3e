//! Jobs, containers and the events that change their identity

use serde::{Deserialize, Serialize};

/// Separator between segments of a full name
pub const PATH_SEPARATOR: char = '/';

/// A node of the job tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Item {
    /// A buildable job
    Job { full_name: String },

    /// A folder holding jobs and other folders
    #[serde(alias = "folder")]
    Container {
        full_name: String,
        #[serde(default)]
        children: Vec<Item>,
    },
}

impl Item {
    pub fn job(full_name: impl Into<String>) -> Self {
        Self::Job {
            full_name: full_name.into(),
        }
    }

    pub fn container(full_name: impl Into<String>, children: Vec<Item>) -> Self {
        Self::Container {
            full_name: full_name.into(),
            children,
        }
    }

    /// Current full name
    pub fn full_name(&self) -> &str {
        match self {
            Self::Job { full_name } | Self::Container { full_name, .. } => full_name,
        }
    }

    pub fn is_job(&self) -> bool {
        matches!(self, Self::Job { .. })
    }

    /// Every job below this item, at any depth, in tree order
    ///
    /// A job yields nothing; only containers have descendants.
    pub fn descendant_jobs(&self) -> Vec<&Item> {
        let mut jobs = Vec::new();
        if let Self::Container { children, .. } = self {
            collect_jobs(children, &mut jobs);
        }
        jobs
    }
}

fn collect_jobs<'a>(items: &'a [Item], out: &mut Vec<&'a Item>) {
    for item in items {
        match item {
            Item::Job { .. } => out.push(item),
            Item::Container { children, .. } => collect_jobs(children, out),
        }
    }
}

/// Replace the last segment of a full name
pub fn replace_last_segment(full_name: &str, segment: &str) -> String {
    match full_name.rfind(PATH_SEPARATOR) {
        Some(idx) => format!("{}{}", &full_name[..=idx], segment),
        None => segment.to_string(),
    }
}

/// Swap the `new_prefix` of a descendant's full name for `old_prefix`
///
/// Returns `None` when `full_name` is not under `new_prefix`.
pub fn rebase(full_name: &str, new_prefix: &str, old_prefix: &str) -> Option<String> {
    let rest = full_name.strip_prefix(new_prefix)?;
    if !rest.starts_with(PATH_SEPARATOR) {
        return None;
    }
    Some(format!("{}{}", old_prefix, rest))
}

/// An identity-changing event reported by the build host
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ItemEvent {
    /// The item was deleted
    Deleted { item: Item },

    /// The item's own name changed; `item` carries the new names
    Renamed {
        item: Item,
        old_name: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        new_name: Option<String>,
    },

    /// The item moved to a new full name
    LocationChanged {
        item: Item,
        old_full_name: String,
        new_full_name: String,
    },
}

impl ItemEvent {
    /// Item the event is about
    pub fn item(&self) -> &Item {
        match self {
            Self::Deleted { item }
            | Self::Renamed { item, .. }
            | Self::LocationChanged { item, .. } => item,
        }
    }

    /// Short event name for logs
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Deleted { .. } => "deleted",
            Self::Renamed { .. } => "renamed",
            Self::LocationChanged { .. } => "location_changed",
        }
    }
}
