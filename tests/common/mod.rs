//! Shared harness for the HTTP tests: an app wired to in-memory collaborators.

#![allow(dead_code)]

use async_trait::async_trait;
use axum::{body::Body, http::Request, Router};
use bytes::Bytes;
use medstudy_pdf::{
    app,
    catalog::InMemoryCatalog,
    error::PipelineError,
    render::{RendererKind, Renderers},
    routes::AppState,
    storage::{ContentStore, LocalMaterials, StoredObject},
    users::StaticUsers,
};
use std::{collections::HashMap, sync::Arc};
use tempfile::TempDir;
use tower::ServiceExt;

/// Bucket stand-in keyed by storage path.
#[derive(Default)]
pub struct MemoryBucket {
    objects: HashMap<String, (String, Option<String>)>,
}

impl MemoryBucket {
    pub fn with(mut self, path: &str, body: &str, content_type: Option<&str>) -> Self {
        self.objects.insert(path.to_string(), (body.to_string(), content_type.map(str::to_string)));
        self
    }
}

#[async_trait]
impl ContentStore for MemoryBucket {
    async fn fetch(&self, identifier: &str) -> Result<StoredObject, PipelineError> {
        let (body, content_type) = self
            .objects
            .get(identifier)
            .ok_or_else(|| PipelineError::NotFound(format!("Arquivo não encontrado: {identifier}")))?;
        Ok(StoredObject { bytes: Bytes::from(body.clone()), content_type: content_type.clone() })
    }
}

pub struct TestApp {
    pub router: Router,
    pub materials: TempDir,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_bucket(MemoryBucket::default())
    }

    pub fn with_bucket(bucket: MemoryBucket) -> Self {
        let materials = tempfile::tempdir().expect("tempdir");
        let state = AppState {
            materials: Arc::new(LocalMaterials::new(materials.path())),
            storage: Arc::new(bucket),
            users: Arc::new(StaticUsers::new().with_user("uid-ana", "Ana Costa")),
            catalog: Arc::new(InMemoryCatalog::with_demo_data()),
            renderers: Renderers::new(RendererKind::Template, None),
            site_url: "www.meusaasmedico.com.br".into(),
        };
        Self { router: app(state, 1024 * 1024), materials }
    }

    pub fn write_material(&self, name: &str, body: &str) {
        std::fs::write(self.materials.path().join(name), body).expect("write material");
    }

    pub async fn send(&self, req: Request<Body>) -> (u16, Vec<(String, String)>, Bytes) {
        let resp = self.router.clone().oneshot(req).await.expect("router response");
        let status = resp.status().as_u16();
        let headers = resp
            .headers()
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_str().unwrap_or_default().to_string()))
            .collect();
        let body = axum::body::to_bytes(resp.into_body(), usize::MAX).await.expect("body");
        (status, headers, body)
    }

    pub async fn post_json(&self, uri: &str, body: serde_json::Value, bearer: Option<&str>) -> (u16, Vec<(String, String)>, Bytes) {
        let mut req = Request::builder().method("POST").uri(uri).header("content-type", "application/json");
        if let Some(uid) = bearer {
            req = req.header("authorization", format!("Bearer {uid}"));
        }
        self.send(req.body(Body::from(body.to_string())).expect("request")).await
    }

    pub async fn get(&self, uri: &str) -> (u16, Bytes) {
        let (status, _, body) = self.send(Request::builder().uri(uri).body(Body::empty()).expect("request")).await;
        (status, body)
    }
}

pub fn header<'a>(headers: &'a [(String, String)], name: &str) -> Option<&'a str> {
    headers.iter().find(|(k, _)| k.eq_ignore_ascii_case(name)).map(|(_, v)| v.as_str())
}

pub fn json(body: &Bytes) -> serde_json::Value {
    serde_json::from_slice(body).expect("json body")
}
