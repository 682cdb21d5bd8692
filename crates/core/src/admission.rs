//! The pure admission gate: given a resolved entitlement, the requested
//! processors' catalog weights, current usage, and optional source-media
//! metadata, decide whether a job may run.
//!
//! The gate is deliberately free of I/O so every rejection rule is unit
//! testable. Callers resolve the subscription, entitlement blob, catalog
//! rows and usage counter first, then ask [`evaluate`] for a verdict. The
//! quota check here is a fail-fast precheck only; the authoritative guard is
//! the conditional usage update executed in the same transaction that
//! creates the job row.

use crate::entitlement::PlanEntitlements;
use crate::resolution::ResolutionTier;

/// Why a job request was refused before any row was written.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AdmissionError {
    #[error("no active subscription")]
    NoActiveSubscription,

    #[error("plan has no entitlement versions")]
    NoEntitlement,

    #[error("entitlement blob is unusable: {0}")]
    InvalidEntitlement(String),

    #[error("unknown processor: {0}")]
    UnknownProcessor(String),

    #[error("requested {requested} processors, plan allows {limit} per job")]
    ExceedsProcessorCount { requested: usize, limit: i64 },

    #[error("job weight {weight} exceeds plan limit {limit} per job")]
    ExceedsJobWeight { weight: i64, limit: i64 },

    #[error("daily quota exceeded: used {used} + requested {requested} > {quota}")]
    QuotaExceeded {
        used: i64,
        requested: i64,
        quota: i64,
    },

    #[error("source media exceeds plan limit: {0}")]
    ExceedsMediaLimit(String),
}

/// A catalog processor admitted into weight accounting: its name and weight.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessorWeight {
    pub name: String,
    pub weight: i64,
}

/// Source-media metadata relevant to plan ceilings. Fields the asset store
/// could not probe stay `None` and the corresponding check is skipped.
#[derive(Debug, Clone, Copy, Default)]
pub struct MediaProbe {
    pub duration_sec: Option<i64>,
    pub width: Option<i64>,
    pub height: Option<i64>,
}

/// Total weight of a processor set: the sum of catalog weights.
pub fn total_weight(processors: &[ProcessorWeight]) -> i64 {
    processors.iter().map(|p| p.weight).sum()
}

/// Ordered, fail-fast validation of a job request against its entitlement.
///
/// Covers the processor-count, per-job-weight, daily-quota and media-ceiling
/// checks. The caller has already resolved `processors` against the catalog
/// (an unresolvable name is an [`AdmissionError::UnknownProcessor`] before
/// this point) and loaded `used` from the current period's usage counter.
pub fn evaluate(
    entitlements: &PlanEntitlements,
    processors: &[ProcessorWeight],
    used: i64,
    media: Option<&MediaProbe>,
) -> Result<i64, AdmissionError> {
    let weight = total_weight(processors);

    if processors.len() as i64 > entitlements.max_processors_per_job {
        return Err(AdmissionError::ExceedsProcessorCount {
            requested: processors.len(),
            limit: entitlements.max_processors_per_job,
        });
    }

    if weight > entitlements.max_weight_per_job {
        return Err(AdmissionError::ExceedsJobWeight {
            weight,
            limit: entitlements.max_weight_per_job,
        });
    }

    if used + weight > entitlements.daily_weight_quota {
        return Err(AdmissionError::QuotaExceeded {
            used,
            requested: weight,
            quota: entitlements.daily_weight_quota,
        });
    }

    if let Some(probe) = media {
        check_media(entitlements, probe)?;
    }

    Ok(weight)
}

/// Duration and resolution ceilings for the source asset.
fn check_media(entitlements: &PlanEntitlements, probe: &MediaProbe) -> Result<(), AdmissionError> {
    if let Some(duration) = probe.duration_sec {
        if duration > entitlements.max_video_sec {
            return Err(AdmissionError::ExceedsMediaLimit(format!(
                "duration {duration}s exceeds plan limit {}s",
                entitlements.max_video_sec
            )));
        }
    }

    if let (Some(width), Some(height)) = (probe.width, probe.height) {
        let Some(tier) = ResolutionTier::parse(&entitlements.max_resolution) else {
            // An unrecognized tier string on the plan is itself a rejection,
            // not an unlimited pass.
            return Err(AdmissionError::ExceedsMediaLimit(format!(
                "unrecognized resolution tier '{}'",
                entitlements.max_resolution
            )));
        };
        if !tier.allows(width, height) {
            return Err(AdmissionError::ExceedsMediaLimit(format!(
                "{width}x{height} exceeds plan ceiling {tier}"
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn entitlements() -> PlanEntitlements {
        PlanEntitlements {
            max_processors_per_job: 2,
            max_weight_per_job: 8,
            daily_weight_quota: 10,
            max_video_sec: 60,
            max_resolution: "720p".to_string(),
            watermark: None,
            concurrency: None,
        }
    }

    fn processors(weights: &[i64]) -> Vec<ProcessorWeight> {
        weights
            .iter()
            .enumerate()
            .map(|(i, &weight)| ProcessorWeight {
                name: format!("proc_{i}"),
                weight,
            })
            .collect()
    }

    #[test]
    fn weight_is_sum_of_catalog_weights() {
        let set = vec![
            ProcessorWeight {
                name: "face_swapper".into(),
                weight: 3,
            },
            ProcessorWeight {
                name: "face_enhancer".into(),
                weight: 2,
            },
        ];
        assert_eq!(total_weight(&set), 5);
        assert_eq!(total_weight(&[]), 0);
    }

    #[test]
    fn too_many_processors_rejected() {
        let err = evaluate(&entitlements(), &processors(&[1, 1, 1]), 0, None).unwrap_err();
        assert_matches!(
            err,
            AdmissionError::ExceedsProcessorCount {
                requested: 3,
                limit: 2
            }
        );
    }

    #[test]
    fn overweight_job_rejected() {
        let err = evaluate(&entitlements(), &processors(&[5, 4]), 0, None).unwrap_err();
        assert_matches!(err, AdmissionError::ExceedsJobWeight { weight: 9, limit: 8 });
    }

    #[test]
    fn quota_boundary_is_inclusive() {
        // used 8 of 10: weight 3 is over, weight 2 lands exactly on the quota.
        let err = evaluate(&entitlements(), &processors(&[3]), 8, None).unwrap_err();
        assert_matches!(err, AdmissionError::QuotaExceeded { used: 8, requested: 3, quota: 10 });

        let admitted = evaluate(&entitlements(), &processors(&[2]), 8, None).unwrap();
        assert_eq!(admitted, 2);
    }

    #[test]
    fn duration_over_plan_limit_rejected() {
        let probe = MediaProbe {
            duration_sec: Some(61),
            ..Default::default()
        };
        let err = evaluate(&entitlements(), &processors(&[1]), 0, Some(&probe)).unwrap_err();
        assert_matches!(err, AdmissionError::ExceedsMediaLimit(_));
    }

    #[test]
    fn resolution_over_plan_tier_rejected() {
        let probe = MediaProbe {
            width: Some(1920),
            height: Some(1080),
            ..Default::default()
        };
        let err = evaluate(&entitlements(), &processors(&[1]), 0, Some(&probe)).unwrap_err();
        assert_matches!(err, AdmissionError::ExceedsMediaLimit(_));

        let mut roomy = entitlements();
        roomy.max_resolution = "1080p".to_string();
        assert!(evaluate(&roomy, &processors(&[1]), 0, Some(&probe)).is_ok());
    }

    #[test]
    fn unrecognized_tier_string_rejected() {
        let mut ent = entitlements();
        ent.max_resolution = "4k".to_string();
        let probe = MediaProbe {
            width: Some(640),
            height: Some(480),
            ..Default::default()
        };
        let err = evaluate(&ent, &processors(&[1]), 0, Some(&probe)).unwrap_err();
        assert_matches!(err, AdmissionError::ExceedsMediaLimit(_));
    }

    #[test]
    fn missing_probe_fields_skip_their_checks() {
        // No metadata at all: media checks are skipped entirely.
        let probe = MediaProbe::default();
        assert!(evaluate(&entitlements(), &processors(&[1]), 0, Some(&probe)).is_ok());
    }
}
