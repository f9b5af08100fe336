//! Material content retrieval: the local materials directory written by
//! `/upload`, and Cloud Storage objects addressed by storage path.

use async_trait::async_trait;
use bytes::Bytes;
use regex::Regex;
use reqwest::{Client, StatusCode, Url};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use tracing::{info, warn};

use crate::error::PipelineError;

#[derive(Debug, Clone)]
pub struct StoredObject {
    pub bytes: Bytes,
    pub content_type: Option<String>,
}

#[async_trait]
pub trait ContentStore: Send + Sync {
    async fn fetch(&self, identifier: &str) -> Result<StoredObject, PipelineError>;
}

/// Reduces an identifier to its final path component so callers cannot
/// escape the materials directory.
pub fn sanitize_file_name(name: &str) -> Option<String> {
    let base = Path::new(name.trim()).file_name()?.to_str()?;
    if base.is_empty() || base == "." || base == ".." { None } else { Some(base.to_string()) }
}

fn content_type_for(name: &str) -> Option<String> {
    let ext = Path::new(name).extension()?.to_str()?.to_ascii_lowercase();
    let mime = match ext.as_str() {
        "html" | "htm" => "text/html",
        "txt" => "text/plain",
        "json" => "application/json",
        "pdf" => "application/pdf",
        _ => return None,
    };
    Some(mime.to_string())
}

pub struct LocalMaterials {
    dir: PathBuf,
}

impl LocalMaterials {
    pub fn new(dir: impl Into<PathBuf>) -> Self { Self { dir: dir.into() } }

    pub fn dir(&self) -> &Path { &self.dir }

    pub fn path_for(&self, file_name: &str) -> Option<PathBuf> {
        sanitize_file_name(file_name).map(|n| self.dir.join(n))
    }
}

#[async_trait]
impl ContentStore for LocalMaterials {
    async fn fetch(&self, identifier: &str) -> Result<StoredObject, PipelineError> {
        let path = self
            .path_for(identifier)
            .ok_or_else(|| PipelineError::Validation(format!("nome de arquivo inválido: {identifier}")))?;
        match tokio::fs::read(&path).await {
            Ok(bytes) => {
                info!(path = %path.display(), size = bytes.len(), "📂 loaded local material");
                Ok(StoredObject { bytes: Bytes::from(bytes), content_type: content_type_for(identifier) })
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(PipelineError::NotFound(format!("Arquivo não encontrado: {identifier}")))
            }
            Err(e) => Err(e.into()),
        }
    }
}

/// Cloud Storage JSON API client (`alt=media` downloads).
pub struct CloudStorage {
    client: Client,
    base_url: String,
    bucket: String,
    access_token: Option<String>,
}

impl CloudStorage {
    pub fn new(client: Client, base_url: impl Into<String>, bucket: impl Into<String>, access_token: Option<String>) -> Self {
        Self { client, base_url: base_url.into(), bucket: bucket.into(), access_token }
    }

    fn object_url(&self, path: &str) -> Result<Url, PipelineError> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| PipelineError::Internal(format!("bad storage base url: {e}")))?;
        url.path_segments_mut()
            .map_err(|_| PipelineError::Internal("storage base url cannot be a base".into()))?
            .pop_if_empty()
            .extend(["storage", "v1", "b", self.bucket.as_str(), "o", path]);
        url.query_pairs_mut().append_pair("alt", "media");
        Ok(url)
    }
}

#[async_trait]
impl ContentStore for CloudStorage {
    async fn fetch(&self, identifier: &str) -> Result<StoredObject, PipelineError> {
        let path = identifier.trim_start_matches('/');
        if path.is_empty() {
            return Err(PipelineError::Validation("storagePath vazio".into()));
        }
        let url = self.object_url(path)?;
        info!(bucket = %self.bucket, path, "☁️ downloading material");

        let mut request = self.client.get(url);
        if let Some(token) = &self.access_token {
            request = request.bearer_auth(token);
        }
        let response = request.send().await?;
        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(PipelineError::NotFound(format!("Arquivo não encontrado: {path}")));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(%status, %body, "storage download failed");
            return Err(PipelineError::Internal(format!("storage returned {status}")));
        }
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
            .or_else(|| content_type_for(path));
        let bytes = response.bytes().await?;
        Ok(StoredObject { bytes, content_type })
    }
}

pub fn is_html(identifier: &str, content_type: Option<&str>) -> bool {
    let by_type = content_type.is_some_and(|ct| ct.to_ascii_lowercase().starts_with("text/html"));
    let by_ext = Path::new(identifier)
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("html") || e.eq_ignore_ascii_case("htm"));
    by_type || by_ext
}

fn tag_pattern() -> &'static Regex {
    static TAGS: OnceLock<Regex> = OnceLock::new();
    TAGS.get_or_init(|| Regex::new(r"<[^>]*>?").expect("static regex"))
}

/// Removes anything that looks like a tag. Entities are left as they are.
pub fn strip_markup(html: &str) -> String {
    tag_pattern().replace_all(html, "").into_owned()
}

/// Material text as loaded from storage, before and after markup removal.
#[derive(Debug, Clone)]
pub struct LoadedContent {
    pub raw: String,
    pub is_html: bool,
}

impl LoadedContent {
    pub fn from_object(identifier: &str, object: &StoredObject) -> Self {
        Self {
            raw: String::from_utf8_lossy(&object.bytes).into_owned(),
            is_html: is_html(identifier, object.content_type.as_deref()),
        }
    }

    /// Plain text for the template pipeline.
    pub fn plain_text(&self) -> String {
        if self.is_html { strip_markup(&self.raw) } else { self.raw.clone() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    #[test]
    fn strips_tags_without_touching_text() {
        assert_eq!(strip_markup("<b>bold</b> text"), "bold text");
        assert_eq!(strip_markup("<p class=\"x\">a</p>\n<p>b &amp; c</p>"), "a\nb &amp; c");
        assert_eq!(strip_markup("trailing <br"), "trailing ");
    }

    #[test]
    fn html_detection_by_extension_or_type() {
        assert!(is_html("aula.HTML", None));
        assert!(is_html("aula", Some("text/html; charset=utf-8")));
        assert!(!is_html("aula.txt", Some("text/plain")));
    }

    #[test]
    fn sanitizes_traversal() {
        assert_eq!(sanitize_file_name("../../etc/passwd").as_deref(), Some("passwd"));
        assert_eq!(sanitize_file_name("aula 1.html").as_deref(), Some("aula 1.html"));
        assert_eq!(sanitize_file_name(".."), None);
        assert_eq!(sanitize_file_name(""), None);
    }

    #[tokio::test]
    async fn local_missing_file_is_not_found() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = LocalMaterials::new(dir.path());
        let err = store.fetch("nada.html").await.unwrap_err();
        assert!(matches!(err, PipelineError::NotFound(_)));
    }

    #[tokio::test]
    async fn local_reads_file_and_guesses_type() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::write(dir.path().join("aula.html"), "<b>bold</b> text").expect("write");
        let store = LocalMaterials::new(dir.path());
        let obj = store.fetch("aula.html").await.expect("fetch");
        assert_eq!(obj.content_type.as_deref(), Some("text/html"));
        assert_eq!(LoadedContent::from_object("aula.html", &obj).plain_text(), "bold text");
    }

    #[tokio::test]
    async fn cloud_storage_downloads_media() {
        let server = MockServer::start_async().await;
        let mock = server.mock_async(|when, then| {
            when.method(GET)
                .path("/storage/v1/b/bucket-teste/o/resumo.txt")
                .query_param("alt", "media")
                .header("authorization", "Bearer tok");
            then.status(200).header("content-type", "text/plain").body("resumo");
        }).await;

        let store = CloudStorage::new(Client::new(), server.base_url(), "bucket-teste", Some("tok".into()));
        let obj = store.fetch("resumo.txt").await.expect("fetch");
        mock.assert_async().await;
        assert_eq!(&obj.bytes[..], b"resumo");
        assert_eq!(obj.content_type.as_deref(), Some("text/plain"));
    }

    #[tokio::test]
    async fn cloud_storage_404_is_not_found() {
        let server = MockServer::start_async().await;
        server.mock_async(|when, then| {
            when.method(GET).path("/storage/v1/b/bucket-teste/o/sumiu.html");
            then.status(404);
        }).await;

        let store = CloudStorage::new(Client::new(), server.base_url(), "bucket-teste", None);
        let err = store.fetch("sumiu.html").await.unwrap_err();
        assert!(matches!(err, PipelineError::NotFound(_)));
    }

    #[tokio::test]
    async fn nested_storage_path_is_one_encoded_object_segment() {
        let server = MockServer::start_async().await;
        let mock = server.mock_async(|when, then| {
            when.method(GET)
                .path("/storage/v1/b/bucket-teste/o/disciplinas%2Fimuno%2Faula1.html")
                .query_param("alt", "media");
            then.status(200).body("<p>aula</p>");
        }).await;

        let store = CloudStorage::new(Client::new(), server.base_url(), "bucket-teste", None);
        let url = store.object_url("disciplinas/imuno/aula1.html").unwrap();
        assert!(url.path().ends_with("/o/disciplinas%2Fimuno%2Faula1.html"), "{url}");

        let obj = store.fetch("/disciplinas/imuno/aula1.html").await.expect("fetch");
        mock.assert_async().await;
        assert_eq!(&obj.bytes[..], b"<p>aula</p>");
    }
}
