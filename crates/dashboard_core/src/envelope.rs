//! JSON response envelopes shared by boundary layers.

use serde::Serialize;

/// `{"success": true, "data": ..., "total": n}` or
/// `{"success": false, "error": "..."}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApiEnvelope<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiEnvelope<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            total: None,
            error: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            total: None,
            error: Some(message.into()),
        }
    }
}

impl<T> ApiEnvelope<Vec<T>> {
    /// Wraps a list and records its length in `total`.
    pub fn list(items: Vec<T>) -> Self {
        let total = items.len();
        Self {
            total: Some(total),
            ..Self::ok(items)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::ApiEnvelope;
    use serde_json::json;

    #[test]
    fn list_envelope_carries_total() {
        let value = serde_json::to_value(ApiEnvelope::list(vec!["a", "b"])).unwrap();
        assert_eq!(value, json!({"success": true, "data": ["a", "b"], "total": 2}));
    }

    #[test]
    fn error_envelope_has_no_data() {
        let value = serde_json::to_value(ApiEnvelope::<()>::error("boom")).unwrap();
        assert_eq!(value, json!({"success": false, "error": "boom"}));
    }
}
