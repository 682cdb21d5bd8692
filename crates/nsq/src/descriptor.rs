//! The job descriptor published to the worker queue.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Everything a worker needs to process a job without querying the API.
///
/// Field names are camelCase on the wire -- the worker protocol predates
/// this service and is shared with the queue consumer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct JobDescriptor {
    pub job_id: Uuid,
    pub user_id: Uuid,
    pub source_asset_id: Uuid,
    pub target_asset_id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audio_asset_id: Option<Uuid>,
    pub processors: Vec<String>,
    pub options: serde_json::Value,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn descriptor(audio: Option<Uuid>) -> JobDescriptor {
        JobDescriptor {
            job_id: Uuid::nil(),
            user_id: Uuid::nil(),
            source_asset_id: Uuid::nil(),
            target_asset_id: Uuid::nil(),
            audio_asset_id: audio,
            processors: vec!["face_swapper".into()],
            options: json!({ "faceSwap": { "model": "v1" } }),
        }
    }

    #[test]
    fn wire_format_is_camel_case() {
        let value = serde_json::to_value(descriptor(None)).unwrap();
        let obj = value.as_object().unwrap();
        assert!(obj.contains_key("jobId"));
        assert!(obj.contains_key("sourceAssetId"));
        assert!(obj.contains_key("targetAssetId"));
        assert!(obj.contains_key("processors"));
        // Absent audio track: the key is omitted, not null.
        assert!(!obj.contains_key("audioAssetId"));
    }

    #[test]
    fn audio_track_serializes_when_present() {
        let value = serde_json::to_value(descriptor(Some(Uuid::nil()))).unwrap();
        assert!(value.as_object().unwrap().contains_key("audioAssetId"));
    }
}
