//! Cluster backends
//!
//! Each configured cloud is one backend. Clients are created fresh per
//! operation through a [`ClientFactory`]; nothing here caches them.

mod client;
mod kubectl;
#[cfg(test)]
pub(crate) mod testing;

pub use client::{ClientFactory, ClusterClient};
pub use kubectl::{KubectlClient, KubectlClientFactory};

use crate::config::Config;
use crate::error::{JobPvcError, JobPvcResult};

/// Create a client for the named cloud, or the first configured one
pub fn create_client(
    config: &Config,
    factory: &dyn ClientFactory,
    cloud: Option<&str>,
) -> JobPvcResult<Box<dyn ClusterClient>> {
    let cloud = match cloud {
        Some(name) => config
            .cloud(name)
            .ok_or_else(|| JobPvcError::CloudNotFound(name.to_string()))?,
        None => config.clouds.first().ok_or(JobPvcError::NoCloudsConfigured)?,
    };

    factory.create_client(cloud)
}
