//! Uniform `{status, message, data, error}` response body

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum EnvelopeStatus {
    Success,
    Error,
}

/// Machine-readable part of an error envelope
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ErrorBody {
    pub code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl ErrorBody {
    pub fn new(code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            field: None,
            detail: None,
        }
    }

    pub fn with_field(mut self, field: impl Into<String>) -> Self {
        self.field = Some(field.into());
        self
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Envelope {
    pub status: EnvelopeStatus,
    pub message: String,
    #[schema(value_type = Option<Object>)]
    pub data: Option<Map<String, Value>>,
    pub error: Option<ErrorBody>,
}

impl Envelope {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            status: EnvelopeStatus::Success,
            message: message.into(),
            data: None,
            error: None,
        }
    }

    pub fn error(message: impl Into<String>, error: ErrorBody) -> Self {
        Self {
            status: EnvelopeStatus::Error,
            message: message.into(),
            data: None,
            error: Some(error),
        }
    }

    /// Add `key` to the `data` object.
    pub fn with_data(mut self, key: &str, value: impl Serialize) -> serde_json::Result<Self> {
        let value = serde_json::to_value(value)?;
        self.data
            .get_or_insert_with(Map::new)
            .insert(key.to_string(), value);
        Ok(self)
    }
}
