use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A persisted text record. Never mutated after insert.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct Item {
    pub id: i64,
    pub text: String,
    pub created_on: DateTime<Utc>,
}

impl fmt::Display for Item {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Item: {} ({})",
            self.text,
            self.created_on.format("%Y-%m-%d %H:%M:%S")
        )
    }
}

/// Which end of the queue a pop removes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PopOrder {
    /// Latest `created_on` first.
    Lifo,
    /// Earliest `created_on` first.
    Fifo,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AddItemRequest {
    // Older clients post the text under "elephant".
    #[serde(alias = "elephant")]
    pub text: String,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct AddItemResponse {
    pub response: String,
}

impl AddItemResponse {
    pub fn ok() -> Self {
        Self {
            response: "ok".to_string(),
        }
    }
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct PopResponse {
    pub deleted: Option<String>,
}

impl From<Option<Item>> for PopResponse {
    fn from(item: Option<Item>) -> Self {
        PopResponse {
            deleted: item.map(|item| item.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample_item() -> Item {
        Item {
            id: 1,
            text: "hello".to_string(),
            created_on: Utc.with_ymd_and_hms(2019, 3, 20, 19, 41, 26).unwrap(),
        }
    }

    #[test]
    fn test_item_display() {
        assert_eq!(sample_item().to_string(), "Item: hello (2019-03-20 19:41:26)");
    }

    #[test]
    fn test_add_request_text_field() {
        let request: AddItemRequest = serde_json::from_str(r#"{"text": "hello"}"#).unwrap();
        assert_eq!(request.text, "hello");
    }

    #[test]
    fn test_add_request_legacy_field() {
        let request: AddItemRequest = serde_json::from_str(r#"{"elephant": "hello"}"#).unwrap();
        assert_eq!(request.text, "hello");
    }

    #[test]
    fn test_add_request_missing_field() {
        let result = serde_json::from_str::<AddItemRequest>(r#"{"giraffe": "hello"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_pop_response_empty_is_null() {
        let json = serde_json::to_string(&PopResponse::from(None::<Item>)).unwrap();
        assert_eq!(json, r#"{"deleted":null}"#);
    }

    #[test]
    fn test_pop_response_with_item() {
        let json = serde_json::to_value(PopResponse::from(Some(sample_item()))).unwrap();
        assert_eq!(json["deleted"], "Item: hello (2019-03-20 19:41:26)");
    }

    #[test]
    fn test_add_response() {
        let json = serde_json::to_string(&AddItemResponse::ok()).unwrap();
        assert_eq!(json, r#"{"response":"ok"}"#);
    }
}
