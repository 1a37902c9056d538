//! Conversation sources.
//!
//! [`RemoteSource`] is what the export job pulls from. [`HttpRemoteSource`]
//! talks to the claude.ai web API one request at a time; [`LocalSource`]
//! serves an already-downloaded `conversations.json` through the same
//! interface so offline extraction runs the identical pipeline.

use std::path::Path;

use async_trait::async_trait;
use reqwest::header::{ACCEPT, COOKIE};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::conversation::{ConversationFull, ConversationSummary};
use crate::error::{ExportError, Result};

pub const DEFAULT_BASE_URL: &str = "https://claude.ai/api";
pub const DEFAULT_USER_AGENT: &str = concat!("artifactctl/", env!("CARGO_PKG_VERSION"));

#[async_trait]
pub trait RemoteSource: Send + Sync {
    /// List every conversation, in the order the service returns them.
    async fn fetch_index(&self) -> Result<Vec<ConversationSummary>>;

    /// Fetch one conversation with its full message list.
    async fn fetch_full(&self, id: &str) -> Result<ConversationFull>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Organization {
    #[serde(alias = "id")]
    pub uuid: String,
    #[serde(default)]
    pub name: Option<String>,
}

/// Session-authenticated client for the claude.ai web API.
pub struct ClaudeClient {
    client: Client,
    base_url: String,
    session_key: String,
}

impl ClaudeClient {
    pub fn new(
        base_url: impl Into<String>,
        session_key: impl Into<String>,
        user_agent: &str,
    ) -> Result<Self> {
        let session_key = session_key.into();
        if session_key.trim().is_empty() {
            return Err(ExportError::config("session key is empty"));
        }
        let client = Client::builder().user_agent(user_agent).build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            session_key,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Organizations visible to this session.
    pub async fn organizations(&self) -> Result<Vec<Organization>> {
        let url = format!("{}/organizations", self.base_url);
        self.get_json(&url, "organization list").await
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str, context: &str) -> Result<T> {
        debug!(%url, "GET");
        let response = self
            .client
            .get(url)
            .header(COOKIE, format!("sessionKey={}", self.session_key))
            .header(ACCEPT, "application/json")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ExportError::remote_status(url, status.as_u16()));
        }

        let body = response.bytes().await?;
        serde_json::from_slice(&body).map_err(|e| ExportError::json(context, e))
    }
}

/// [`RemoteSource`] backed by one organization's chat history.
pub struct HttpRemoteSource {
    client: ClaudeClient,
    org_id: String,
}

impl HttpRemoteSource {
    pub fn new(client: ClaudeClient, org_id: impl Into<String>) -> Self {
        Self {
            client,
            org_id: org_id.into(),
        }
    }

    pub fn org_id(&self) -> &str {
        &self.org_id
    }

    fn index_url(&self) -> String {
        format!(
            "{}/organizations/{}/chat_conversations",
            self.client.base_url(),
            self.org_id
        )
    }

    fn conversation_url(&self, id: &str) -> String {
        format!(
            "{}/{}?tree=true&rendering_mode=messages&render_all_tools=true",
            self.index_url(),
            id
        )
    }
}

#[async_trait]
impl RemoteSource for HttpRemoteSource {
    async fn fetch_index(&self) -> Result<Vec<ConversationSummary>> {
        self.client
            .get_json(&self.index_url(), "conversation index")
            .await
    }

    async fn fetch_full(&self, id: &str) -> Result<ConversationFull> {
        self.client
            .get_json(&self.conversation_url(id), &format!("conversation {id}"))
            .await
    }
}

/// Conversations loaded from a local JSON export.
#[derive(Debug, Clone, Default)]
pub struct LocalSource {
    conversations: Vec<ConversationFull>,
}

impl LocalSource {
    pub fn new(conversations: Vec<ConversationFull>) -> Self {
        Self { conversations }
    }

    /// Read a file holding one conversation object or an array of them.
    /// Array entries that do not decode as conversations are skipped.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)?;
        let value: Value = serde_json::from_slice(&bytes)
            .map_err(|e| ExportError::json(path.display().to_string(), e))?;

        let conversations = match value {
            Value::Array(items) => items
                .into_iter()
                .enumerate()
                .filter_map(|(idx, item)| match serde_json::from_value(item) {
                    Ok(conv) => Some(conv),
                    Err(err) => {
                        warn!(index = idx, error = %err, "skipping undecodable conversation");
                        None
                    }
                })
                .collect(),
            other => vec![serde_json::from_value(other)
                .map_err(|e| ExportError::json(path.display().to_string(), e))?],
        };

        Ok(Self::new(conversations))
    }

    pub fn len(&self) -> usize {
        self.conversations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.conversations.is_empty()
    }
}

#[async_trait]
impl RemoteSource for LocalSource {
    async fn fetch_index(&self) -> Result<Vec<ConversationSummary>> {
        Ok(self.conversations.iter().map(ConversationFull::summary).collect())
    }

    async fn fetch_full(&self, id: &str) -> Result<ConversationFull> {
        self.conversations
            .iter()
            .find(|conv| conv.id == id)
            .cloned()
            .ok_or_else(|| ExportError::ConversationNotFound { id: id.to_string() })
    }
}
