use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::Method;

use crate::client::RequestExecutor;
use crate::error::Result;

#[derive(Debug, Clone, PartialEq)]
pub struct RecordedRequest {
    pub method: Method,
    pub uri: String,
    pub body: Option<serde_json::Value>,
}

/// Records every request and answers all of them with the same body
pub struct FakeExecutor {
    response: Vec<u8>,
    requests: Mutex<Vec<RecordedRequest>>,
}

impl FakeExecutor {
    pub fn new(response: impl Into<Vec<u8>>) -> Arc<Self> {
        Arc::new(Self {
            response: response.into(),
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl RequestExecutor for FakeExecutor {
    async fn execute(&self, method: Method, uri: &str, body: Option<Vec<u8>>) -> Result<Bytes> {
        let body = body.map(|b| serde_json::from_slice(&b).unwrap());
        self.requests.lock().unwrap().push(RecordedRequest {
            method,
            uri: uri.to_string(),
            body,
        });
        Ok(Bytes::from(self.response.clone()))
    }
}

/// Never completes
pub struct PendingExecutor;

#[async_trait]
impl RequestExecutor for PendingExecutor {
    async fn execute(&self, _method: Method, _uri: &str, _body: Option<Vec<u8>>) -> Result<Bytes> {
        std::future::pending().await
    }
}
