//! In-process collaborators for development and tests.

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::notification::Notification;
use crate::ports::{DocumentSource, Notifier, PortError};

/// Serves fixed bodies by URL. Unknown URLs fail as retrieval errors.
#[derive(Debug, Default)]
pub struct MemoryDocuments {
    bodies: HashMap<String, Vec<u8>>,
    requests: Mutex<Vec<String>>,
}

impl MemoryDocuments {
    /// An empty document set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `body` at `url`.
    pub fn with(mut self, url: impl Into<String>, body: impl Into<Vec<u8>>) -> Self {
        self.bodies.insert(url.into(), body.into());
        self
    }

    /// URLs requested so far, in order.
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().clone()
    }

    fn get(&self, url: &str) -> Result<Vec<u8>, PortError> {
        self.requests.lock().push(url.to_string());
        self.bodies
            .get(url)
            .cloned()
            .ok_or_else(|| PortError::Retrieval {
                url: url.to_string(),
                message: "404 Not Found".to_string(),
            })
    }
}

#[async_trait]
impl DocumentSource for MemoryDocuments {
    async fn fetch_index(&self, url: &str) -> Result<String, PortError> {
        let bytes = self.get(url)?;
        String::from_utf8(bytes).map_err(|e| PortError::Retrieval {
            url: url.to_string(),
            message: e.to_string(),
        })
    }

    async fn fetch_document(&self, url: &str) -> Result<Vec<u8>, PortError> {
        self.get(url)
    }
}

/// Keeps every notification it receives.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<Notification>>,
}

impl RecordingNotifier {
    /// An empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Notifications received so far.
    pub fn sent(&self) -> Vec<Notification> {
        self.sent.lock().clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(&self, notification: &Notification) -> Result<(), PortError> {
        self.sent.lock().push(notification.clone());
        Ok(())
    }
}
