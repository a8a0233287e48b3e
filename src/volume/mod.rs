//! Job workspace volumes
//!
//! Claim wire types and the create-or-reuse provisioning of per-job
//! claims.

pub mod claim;
mod dynamic;

pub use claim::{
    AccessMode, ClaimList, ClaimSpec, ClaimVolumeSource, ObjectMeta, PersistentVolumeClaim,
    PodVolume, ResourceRequirements,
};
pub use dynamic::{
    DynamicJobVolume, PodMetadata, ProvisionOutcome, Provisioned, DEFAULT_REQUESTS_SIZE,
};
