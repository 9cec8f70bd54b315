use serde::Serialize;
use utoipa::ToSchema;

/// Response envelope: `{"success": true, "message": ..., ...payload}` with the
/// payload fields flattened to the top level.
#[derive(Debug, Serialize, ToSchema)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(flatten)]
    pub data: Option<T>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            message: None,
            data: Some(data),
        }
    }

    pub fn with_message(message: impl Into<String>, data: T) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
            data: Some(data),
        }
    }
}

impl ApiResponse<serde_json::Value> {
    /// `{"success": true, "message": ...}` with no payload.
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
            data: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Serialize;

    #[derive(Serialize)]
    #[serde(rename_all = "camelCase")]
    struct Payload {
        item_id: u32,
    }

    #[test]
    fn flattens_payload_into_envelope() {
        let json =
            serde_json::to_value(ApiResponse::success(Payload { item_id: 7 })).unwrap();
        assert_eq!(json["success"], true);
        assert_eq!(json["itemId"], 7);
        assert!(json.get("message").is_none());
        assert!(json.get("data").is_none());
    }

    #[test]
    fn message_only_has_no_payload_fields() {
        let json = serde_json::to_value(ApiResponse::ok("done")).unwrap();
        assert_eq!(json["success"], true);
        assert_eq!(json["message"], "done");
        assert_eq!(json.as_object().unwrap().len(), 2);
    }
}
