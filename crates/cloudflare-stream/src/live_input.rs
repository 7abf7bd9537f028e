//! Cloudflare Stream live inputs
//!
//! A live input is the ingest side of a live stream: the RTMPS/SRT/WebRTC endpoints an encoder
//! pushes to, plus the recording settings applied to whatever is pushed.
//!
//! API reference: <https://developers.cloudflare.com/api/resources/stream/subresources/live_inputs/>

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use reqwest::Method;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info};

use crate::client::{CloudflareClient, build_uri};
use crate::error::{Result, StreamError};
use crate::types::Video;

/// Details about a Cloudflare Live Input
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LiveInput {
    #[serde(default)]
    pub uid: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rtmps: Option<RtmpsEndpoint>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rtmps_playback: Option<RtmpsEndpoint>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub srt: Option<SrtEndpoint>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub srt_playback: Option<SrtEndpoint>,
    #[serde(
        rename = "webRTC",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub webrtc: Option<WebRtcEndpoint>,
    #[serde(
        rename = "webRTCPlayback",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub webrtc_playback: Option<WebRtcEndpoint>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modified: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<HashMap<String, Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_creator: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<LiveInputStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recording: Option<RecordingSettings>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delete_recording_after_days: Option<u32>,
    #[serde(default)]
    pub prefer_low_latency: bool,
}

impl LiveInput {
    pub fn is_connected(&self) -> bool {
        self.status
            .as_ref()
            .map(|s| s.is_connected())
            .unwrap_or(false)
    }
}

/// Live input as returned in list results
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LiveInputListItem {
    #[serde(default)]
    pub uid: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modified: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<HashMap<String, Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delete_recording_after_days: Option<u32>,
}

/// RTMPS endpoint details
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RtmpsEndpoint {
    pub url: String,
    pub stream_key: String,
}

/// SRT endpoint details
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SrtEndpoint {
    pub url: String,
    pub stream_id: String,
    pub passphrase: String,
}

/// WebRTC endpoint details
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WebRtcEndpoint {
    pub url: String,
}

/// Connection status of a live input, the current state and what came before it.
///
/// Some responses carry only the bare state string, that is read as `current`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "StatusShape")]
pub struct LiveInputStatus {
    pub current: Option<LiveInputStatusEvent>,
    pub history: Vec<LiveInputStatusEvent>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StatusShape {
    Full {
        #[serde(default)]
        current: Option<LiveInputStatusEvent>,
        #[serde(default)]
        history: Vec<LiveInputStatusEvent>,
    },
    Simple(LiveInputState),
}

impl From<StatusShape> for LiveInputStatus {
    fn from(s: StatusShape) -> Self {
        match s {
            StatusShape::Simple(state) => Self {
                current: Some(LiveInputStatusEvent {
                    state: Some(state),
                    ..Default::default()
                }),
                history: vec![],
            },
            StatusShape::Full { current, history } => Self { current, history },
        }
    }
}

impl LiveInputStatus {
    pub fn is_connected(&self) -> bool {
        self.current
            .as_ref()
            .and_then(|c| c.state.as_ref())
            .map(|s| s.is_connected())
            .unwrap_or(false)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LiveInputStatusEvent {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<LiveInputState>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_entered_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_last_seen: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LiveInputState {
    Connected,
    Reconnected,
    Reconnecting,
    ClientDisconnect,
    TtlExceeded,
    FailedToConnect,
    FailedToReconnect,
    NewConfigurationAccepted,
    #[serde(other)]
    Unknown,
}

impl LiveInputState {
    pub fn is_connected(&self) -> bool {
        matches!(
            self,
            Self::Connected | Self::Reconnected | Self::NewConfigurationAccepted
        )
    }
}

/// Recording settings for a Live Input
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RecordingSettings {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<RecordingMode>,
    #[serde(rename = "requireSignedURLs", skip_serializing_if = "Option::is_none")]
    pub require_signed_urls: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allowed_origins: Option<Vec<String>>,
    /// Seconds to wait for a reconnect before the recording is ended
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_seconds: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hide_live_viewer_count: Option<bool>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordingMode {
    Off,
    Automatic,
    #[serde(other)]
    Unknown,
}

/// The caller-editable part of a live input, sent as the body of create and update
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LiveInputSettings {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_creator: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delete_recording_after_days: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<HashMap<String, Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recording: Option<RecordingSettings>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prefer_low_latency: Option<bool>,
}

#[derive(Debug, Clone, Default)]
pub struct ListLiveInputsParams {
    pub account_id: String,
    /// Ask for the total/range counts alongside the list
    pub include_counts: bool,
}

impl ListLiveInputsParams {
    pub fn new(account_id: impl Into<String>) -> Self {
        Self {
            account_id: account_id.into(),
            include_counts: false,
        }
    }

    fn query(&self) -> Vec<(&'static str, &'static str)> {
        if self.include_counts {
            vec![("include_counts", "true")]
        } else {
            vec![]
        }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct CreateLiveInputParams {
    #[serde(skip)]
    pub account_id: String,
    #[serde(flatten)]
    pub input: LiveInputSettings,
}

impl CreateLiveInputParams {
    pub fn new(account_id: impl Into<String>, input: LiveInputSettings) -> Self {
        Self {
            account_id: account_id.into(),
            input,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct UpdateLiveInputParams {
    #[serde(skip)]
    pub account_id: String,
    #[serde(skip)]
    pub live_input_id: String,
    #[serde(flatten)]
    pub input: LiveInputSettings,
}

impl UpdateLiveInputParams {
    pub fn new(
        account_id: impl Into<String>,
        live_input_id: impl Into<String>,
        input: LiveInputSettings,
    ) -> Self {
        Self {
            account_id: account_id.into(),
            live_input_id: live_input_id.into(),
            input,
        }
    }
}

/// Identifies a single live input
#[derive(Debug, Clone, Default)]
pub struct LiveInputParams {
    pub account_id: String,
    pub live_input_id: String,
}

impl LiveInputParams {
    pub fn new(account_id: impl Into<String>, live_input_id: impl Into<String>) -> Self {
        Self {
            account_id: account_id.into(),
            live_input_id: live_input_id.into(),
        }
    }
}

/// The list result is a plain array, or an object with counts when `include_counts` is set
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum LiveInputList {
    Items(Vec<LiveInputListItem>),
    Paged {
        #[serde(rename = "liveInputs", default)]
        live_inputs: Vec<LiveInputListItem>,
    },
}

impl LiveInputList {
    fn into_items(self) -> Vec<LiveInputListItem> {
        match self {
            Self::Items(i) => i,
            Self::Paged { live_inputs } => live_inputs,
        }
    }
}

fn live_inputs_path(account_id: &str) -> Result<String> {
    if account_id.is_empty() {
        return Err(StreamError::MissingAccountId);
    }
    Ok(format!("/accounts/{account_id}/stream/live_inputs"))
}

fn live_input_path(account_id: &str, live_input_id: &str) -> Result<String> {
    let base = live_inputs_path(account_id)?;
    if live_input_id.is_empty() {
        return Err(StreamError::MissingLiveInputId);
    }
    Ok(format!("{base}/{live_input_id}"))
}

impl CloudflareClient {
    /// List the live inputs of an account
    pub async fn list_live_inputs(
        &self,
        params: &ListLiveInputsParams,
    ) -> Result<Vec<LiveInputListItem>> {
        let uri = build_uri(&live_inputs_path(&params.account_id)?, params.query());
        debug!("Listing live inputs for account {}", params.account_id);

        let list: Option<LiveInputList> = self.fetch(Method::GET, &uri, None).await?;
        Ok(list.map(LiveInputList::into_items).unwrap_or_default())
    }

    /// Create a new live input
    pub async fn create_live_input(&self, params: &CreateLiveInputParams) -> Result<LiveInput> {
        let uri = live_inputs_path(&params.account_id)?;
        let body = serde_json::to_vec(params)?;

        let input: LiveInput = self
            .fetch(Method::POST, &uri, Some(body))
            .await?
            .ok_or(StreamError::MissingResult)?;
        info!("Created live input {}", input.uid);
        Ok(input)
    }

    /// Get the details of a single live input
    pub async fn get_live_input(&self, params: &LiveInputParams) -> Result<LiveInput> {
        let uri = live_input_path(&params.account_id, &params.live_input_id)?;
        debug!("Fetching live input {}", params.live_input_id);

        self.fetch(Method::GET, &uri, None)
            .await?
            .ok_or(StreamError::MissingResult)
    }

    /// Replace the editable settings of a live input
    pub async fn update_live_input(&self, params: &UpdateLiveInputParams) -> Result<LiveInput> {
        let uri = live_input_path(&params.account_id, &params.live_input_id)?;
        let body = serde_json::to_vec(params)?;

        let input: LiveInput = self
            .fetch(Method::PUT, &uri, Some(body))
            .await?
            .ok_or(StreamError::MissingResult)?;
        info!("Updated live input {}", input.uid);
        Ok(input)
    }

    /// Delete a live input, recordings made from it are kept
    pub async fn delete_live_input(&self, params: &LiveInputParams) -> Result<()> {
        let uri = live_input_path(&params.account_id, &params.live_input_id)?;

        self.send(Method::DELETE, &uri, None).await?;
        info!("Deleted live input {}", params.live_input_id);
        Ok(())
    }

    /// List the videos (recordings) made from a live input
    pub async fn list_live_input_videos(&self, params: &LiveInputParams) -> Result<Vec<Video>> {
        let uri = format!(
            "{}/videos",
            live_input_path(&params.account_id, &params.live_input_id)?
        );
        debug!("Listing videos of live input {}", params.live_input_id);

        let videos: Option<Vec<Video>> = self.fetch(Method::GET, &uri, None).await?;
        Ok(videos.unwrap_or_default())
    }
}
