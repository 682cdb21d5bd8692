//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row
//! - `Deserialize` DTOs for the requests that touch the table

pub mod feature;
pub mod job;
pub mod job_event;
pub mod media_asset;
pub mod plan;
pub mod subscription;
pub mod usage;
