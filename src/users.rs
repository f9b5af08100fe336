use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use serde::Deserialize;
use std::collections::HashMap;
use tracing::{info, warn};

use crate::error::PipelineError;

/// Resolves a caller uid to the name stamped into generated PDFs.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn display_name(&self, uid: &str) -> Result<Option<String>, PipelineError>;
}

/// In-memory directory for local runs and tests.
#[derive(Default)]
pub struct StaticUsers {
    names: HashMap<String, String>,
}

impl StaticUsers {
    pub fn new() -> Self { Self::default() }

    pub fn with_user(mut self, uid: impl Into<String>, name: impl Into<String>) -> Self {
        self.names.insert(uid.into(), name.into());
        self
    }
}

#[async_trait]
impl UserDirectory for StaticUsers {
    async fn display_name(&self, uid: &str) -> Result<Option<String>, PipelineError> {
        Ok(self.names.get(uid).cloned())
    }
}

/// Reads `users/{uid}` through the Firestore REST API.
pub struct FirestoreUsers {
    client: Client,
    base_url: String,
    project_id: String,
    access_token: Option<String>,
}

impl FirestoreUsers {
    pub fn new(client: Client, base_url: impl Into<String>, project_id: impl Into<String>, access_token: Option<String>) -> Self {
        Self { client, base_url: base_url.into(), project_id: project_id.into(), access_token }
    }

    /// `users/{uid}` with every component percent-encoded as one segment.
    fn document_url(&self, uid: &str) -> Result<Url, PipelineError> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| PipelineError::Internal(format!("bad firestore base url: {e}")))?;
        url.path_segments_mut()
            .map_err(|_| PipelineError::Internal("firestore base url cannot be a base".into()))?
            .pop_if_empty()
            .extend(["v1", "projects", self.project_id.as_str(), "databases", "(default)", "documents", "users", uid]);
        Ok(url)
    }
}

// --- Firestore document shape (only what we read) ---

#[derive(Debug, Deserialize)]
struct FirestoreDocument {
    #[serde(default)]
    fields: HashMap<String, FirestoreValue>,
}

#[derive(Debug, Deserialize)]
struct FirestoreValue {
    #[serde(rename = "stringValue")]
    string_value: Option<String>,
}

#[async_trait]
impl UserDirectory for FirestoreUsers {
    async fn display_name(&self, uid: &str) -> Result<Option<String>, PipelineError> {
        if uid.is_empty() || uid.contains('/') {
            return Ok(None);
        }
        let url = self.document_url(uid)?;
        let mut request = self.client.get(url);
        if let Some(token) = &self.access_token {
            request = request.bearer_auth(token);
        }
        let response = request.send().await?;
        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            info!(uid, "👤 user document not found");
            return Ok(None);
        }
        if !status.is_success() {
            warn!(%status, uid, "firestore lookup failed");
            return Err(PipelineError::Internal(format!("firestore returned {status}")));
        }
        let doc: FirestoreDocument = response
            .json()
            .await
            .map_err(|e| PipelineError::Internal(format!("parse error: {e}")))?;
        Ok(doc.fields.get("nome_completo").and_then(|v| v.string_value.clone()))
    }
}
