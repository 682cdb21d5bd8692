//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that
//! accept `&PgPool` (or, for steps composed into a caller's transaction, an
//! explicit executor) as the first argument.

pub mod feature_repo;
pub mod job_event_repo;
pub mod job_repo;
pub mod media_asset_repo;
pub mod plan_repo;
pub mod subscription_repo;
pub mod usage_repo;

pub use feature_repo::FeatureRepo;
pub use job_event_repo::JobEventRepo;
pub use job_repo::{JobRepo, NewJob, TransitionOutcome};
pub use media_asset_repo::{MediaAssetRepo, NewOutputAsset};
pub use plan_repo::PlanRepo;
pub use subscription_repo::SubscriptionRepo;
pub use usage_repo::UsageRepo;
