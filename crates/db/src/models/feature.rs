//! Catalog entries (processors, processor options, plain feature flags).

use serde::Serialize;
use sqlx::FromRow;

use fuze_core::types::{DbId, Timestamp};

/// Catalog entry kind (TEXT column). Only `Processor` rows contribute to
/// job weight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeatureType {
    Processor,
    ProcessorOption,
    Feature,
}

impl FeatureType {
    pub fn as_str(self) -> &'static str {
        match self {
            FeatureType::Processor => "processor",
            FeatureType::ProcessorOption => "processor_option",
            FeatureType::Feature => "feature",
        }
    }
}

/// Catalog entry availability (TEXT column).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeatureStatus {
    Active,
    Inactive,
}

impl FeatureStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            FeatureStatus::Active => "ACTIVE",
            FeatureStatus::Inactive => "INACTIVE",
        }
    }
}

/// A row from the `features` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Feature {
    pub id: DbId,
    pub name: String,
    pub feature_type: String,
    pub weight: i64,
    pub status: String,
    pub category: Option<String>,
    pub created_at: Timestamp,
}
