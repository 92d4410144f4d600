use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Inbound event pushed by the chat transport
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct InboundEventRequest {
    #[validate(range(min = 1))]
    #[serde(alias = "user_id", rename = "userId")]
    pub user_id: i64,
    #[serde(default)]
    pub username: Option<String>,
    #[validate(length(max = 256))]
    #[serde(alias = "display_name", rename = "displayName", default)]
    pub display_name: String,
    pub event: InboundPayload,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum InboundPayload {
    Text {
        text: String,
    },
    Media {
        #[serde(alias = "media_ref", rename = "mediaRef")]
        media_ref: String,
    },
    Choice {
        key: String,
    },
}

/// Request to record a like or dislike
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RecordInterestRequest {
    #[validate(range(min = 1))]
    #[serde(alias = "user_id", rename = "userId")]
    pub user_id: i64,
    #[serde(alias = "profile_id", rename = "profileId")]
    pub profile_id: Uuid,
    pub liked: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inbound_event_deserialize() {
        let json = r#"{"userId": 7, "displayName": "Ann", "event": {"type": "media", "mediaRef": "file-1"}}"#;
        let req: InboundEventRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.user_id, 7);
        assert!(req.username.is_none());
        assert!(matches!(req.event, InboundPayload::Media { ref media_ref } if media_ref == "file-1"));
    }

    #[test]
    fn test_inbound_event_rejects_non_positive_user() {
        let req = InboundEventRequest {
            user_id: 0,
            username: None,
            display_name: "Ann".to_string(),
            event: InboundPayload::Text { text: "hi".to_string() },
        };
        assert!(req.validate().is_err());
    }
}
