//! Typed view of the versioned plan entitlement blob.
//!
//! Entitlements are stored as JSONB, one row per `(plan, version)`, and the
//! highest version wins. The blob is loosely typed at rest; this struct is
//! the single place it becomes strongly typed. A missing or ill-typed
//! required field fails admission -- it is never read as "unlimited".

use serde::Deserialize;

use crate::admission::AdmissionError;

/// Resolved limits for a plan version.
///
/// Unknown extra keys in the blob are ignored so plans can carry
/// forward-compatible fields without breaking older deployments.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PlanEntitlements {
    /// Maximum number of processors a single job may request.
    pub max_processors_per_job: i64,
    /// Maximum summed catalog weight of a single job.
    pub max_weight_per_job: i64,
    /// Total weight a user may consume per daily period.
    pub daily_weight_quota: i64,
    /// Maximum source video duration in seconds.
    pub max_video_sec: i64,
    /// Resolution tier name, e.g. `"720p"`.
    pub max_resolution: String,

    #[serde(default)]
    pub watermark: Option<bool>,
    #[serde(default)]
    pub concurrency: Option<i64>,
}

impl PlanEntitlements {
    /// Parse the stored JSONB blob for a plan version.
    pub fn from_blob(blob: &serde_json::Value) -> Result<Self, AdmissionError> {
        serde_json::from_value(blob.clone())
            .map_err(|e| AdmissionError::InvalidEntitlement(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use serde_json::json;

    #[test]
    fn parses_complete_blob() {
        let blob = json!({
            "max_processors_per_job": 2,
            "max_weight_per_job": 8,
            "daily_weight_quota": 10,
            "max_video_sec": 60,
            "max_resolution": "720p",
            "watermark": true,
            "concurrency": 1,
        });
        let ent = PlanEntitlements::from_blob(&blob).unwrap();
        assert_eq!(ent.daily_weight_quota, 10);
        assert_eq!(ent.watermark, Some(true));
    }

    #[test]
    fn optional_fields_may_be_absent() {
        let blob = json!({
            "max_processors_per_job": 2,
            "max_weight_per_job": 8,
            "daily_weight_quota": 10,
            "max_video_sec": 60,
            "max_resolution": "1080p",
        });
        let ent = PlanEntitlements::from_blob(&blob).unwrap();
        assert_eq!(ent.watermark, None);
        assert_eq!(ent.concurrency, None);
    }

    #[test]
    fn missing_required_field_is_an_error_not_unlimited() {
        let blob = json!({
            "max_processors_per_job": 2,
            "max_weight_per_job": 8,
            // daily_weight_quota absent
            "max_video_sec": 60,
            "max_resolution": "720p",
        });
        let err = PlanEntitlements::from_blob(&blob).unwrap_err();
        assert_matches!(err, AdmissionError::InvalidEntitlement(_));
    }

    #[test]
    fn ill_typed_field_is_an_error() {
        let blob = json!({
            "max_processors_per_job": "two",
            "max_weight_per_job": 8,
            "daily_weight_quota": 10,
            "max_video_sec": 60,
            "max_resolution": "720p",
        });
        assert!(PlanEntitlements::from_blob(&blob).is_err());
    }

    #[test]
    fn unknown_keys_are_ignored() {
        let blob = json!({
            "max_processors_per_job": 2,
            "max_weight_per_job": 8,
            "daily_weight_quota": 10,
            "max_video_sec": 60,
            "max_resolution": "480p",
            "jobs_per_month": 200,
        });
        assert!(PlanEntitlements::from_blob(&blob).is_ok());
    }
}
