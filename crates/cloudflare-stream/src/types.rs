use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Result, StreamError};

/// Standard Cloudflare API response envelope
#[derive(Debug, Deserialize, Clone)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(default)]
    pub errors: Vec<ApiError>,
    #[serde(default)]
    pub messages: Vec<ApiMessage>,
    pub result: Option<T>,
    pub result_info: Option<ResultInfo>,
}

impl<T> ApiResponse<T> {
    /// Unwrap the envelope, turning `success: false` into [StreamError::Api].
    ///
    /// A successful envelope may still carry a `null` result, so the payload stays optional.
    pub fn into_result(self) -> Result<Option<T>> {
        if !self.success {
            return Err(StreamError::Api {
                status: 200,
                errors: self.errors,
            });
        }
        Ok(self.result)
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct ApiError {
    #[serde(default)]
    pub code: i32,
    pub message: Option<String>,
}

impl ApiError {
    pub fn join(errors: &[ApiError]) -> String {
        errors
            .iter()
            .map(|e| match &e.message {
                Some(m) => format!("{}: {}", e.code, m),
                None => e.code.to_string(),
            })
            .collect::<Vec<_>>()
            .join("; ")
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct ApiMessage {
    #[serde(default)]
    pub code: i32,
    pub message: Option<String>,
}

/// Paging information attached to list responses
#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
pub struct ResultInfo {
    pub count: Option<u64>,
    pub page: Option<u64>,
    pub per_page: Option<u64>,
    pub total_count: Option<u64>,
}

/// Only the `errors` of an envelope, used when reading failed responses
#[derive(Debug, Deserialize)]
pub(crate) struct ApiErrorBody {
    #[serde(default)]
    pub errors: Vec<ApiError>,
}

/// A Cloudflare Stream video asset, e.g. a recording made from a live input
#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct Video {
    pub uid: String,
    pub creator: Option<String>,
    pub thumbnail: Option<String>,
    pub thumbnail_timestamp_pct: Option<f64>,
    pub ready_to_stream: bool,
    pub ready_to_stream_at: Option<DateTime<Utc>>,
    pub status: Option<VideoStatus>,
    pub meta: Option<HashMap<String, serde_json::Value>>,
    pub created: Option<DateTime<Utc>>,
    pub modified: Option<DateTime<Utc>>,
    pub scheduled_deletion: Option<DateTime<Utc>>,
    pub size: Option<u64>,
    pub preview: Option<String>,
    pub allowed_origins: Option<Vec<String>>,
    #[serde(rename = "requireSignedURLs")]
    pub require_signed_urls: Option<bool>,
    pub uploaded: Option<DateTime<Utc>>,
    pub upload_expiry: Option<DateTime<Utc>>,
    pub max_size_bytes: Option<u64>,
    pub max_duration_seconds: Option<i64>,
    /// Seconds, `-1` while unknown
    pub duration: Option<f64>,
    pub input: Option<VideoInput>,
    pub playback: Option<Playback>,
    pub live_input: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct VideoStatus {
    pub state: Option<String>,
    pub pct_complete: Option<String>,
    pub error_reason_code: Option<String>,
    pub error_reason_text: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
pub struct VideoInput {
    pub width: Option<i64>,
    pub height: Option<i64>,
}

/// Playback URLs for a Video Asset
#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
#[serde(default)]
pub struct Playback {
    pub hls: Option<String>,
    pub dash: Option<String>,
}
