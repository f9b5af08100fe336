//! The two rendering pipelines behind one `Renderer` capability.

pub mod browser;

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::{str::FromStr, sync::Arc};
use tracing::info;

use crate::error::PipelineError;
use crate::pdf::{render_template, PageSize, RenderRequest};
use crate::storage::LoadedContent;

pub use browser::BrowserRenderer;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RendererKind {
    #[default]
    Template,
    Browser,
    Auto,
}

impl FromStr for RendererKind {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "template" => Ok(RendererKind::Template),
            "browser" => Ok(RendererKind::Browser),
            "auto" => Ok(RendererKind::Auto),
            other => Err(PipelineError::Validation(format!("renderer desconhecido: {other}"))),
        }
    }
}

/// Input shared by both pipelines for one material.
#[derive(Debug, Clone)]
pub struct RenderJob {
    pub material_title: String,
    pub requester_display_name: String,
    pub content: LoadedContent,
    pub page_size: PageSize,
    pub generated_on: NaiveDate,
    pub site_url: String,
}

#[async_trait]
pub trait Renderer: Send + Sync {
    fn kind(&self) -> RendererKind;
    async fn render(&self, job: &RenderJob) -> Result<Vec<u8>, PipelineError>;
}

/// Text shaping + manual pagination with the branded chrome.
pub struct TemplateRenderer;

impl TemplateRenderer {
    pub fn request_for(job: &RenderJob) -> RenderRequest {
        RenderRequest {
            material_title: job.material_title.clone(),
            requester_display_name: job.requester_display_name.clone(),
            content_text: job.content.plain_text(),
            page_size: job.page_size,
            generated_on: job.generated_on,
            site_url: job.site_url.clone(),
        }
    }
}

#[async_trait]
impl Renderer for TemplateRenderer {
    fn kind(&self) -> RendererKind { RendererKind::Template }

    async fn render(&self, job: &RenderJob) -> Result<Vec<u8>, PipelineError> {
        let req = Self::request_for(job);
        tokio::task::spawn_blocking(move || render_template(&req))
            .await
            .map_err(|e| PipelineError::Internal(format!("render task failed: {e}")))?
    }
}

const RICH_MARKUP: [&str; 4] = ["<table", "<img", "<svg", "<style"];

/// True when HTML carries layout a plain-text rendering would lose.
pub fn has_rich_layout(content: &LoadedContent) -> bool {
    if !content.is_html {
        return false;
    }
    let lower = content.raw.to_ascii_lowercase();
    RICH_MARKUP.iter().any(|tag| lower.contains(tag))
}

/// Both renderers plus the configured default.
#[derive(Clone)]
pub struct Renderers {
    pub default_kind: RendererKind,
    pub template: Arc<dyn Renderer>,
    pub browser: Option<Arc<dyn Renderer>>,
}

impl Renderers {
    pub fn new(default_kind: RendererKind, browser: Option<Arc<dyn Renderer>>) -> Self {
        Self { default_kind, template: Arc::new(TemplateRenderer), browser }
    }

    /// Picks the renderer for a job: explicit override first, then the
    /// configured default. `Auto` sniffs the content.
    pub fn select(&self, requested: Option<RendererKind>, content: &LoadedContent) -> Result<Arc<dyn Renderer>, PipelineError> {
        let kind = match requested.unwrap_or(self.default_kind) {
            RendererKind::Auto if has_rich_layout(content) && self.browser.is_some() => RendererKind::Browser,
            RendererKind::Auto => RendererKind::Template,
            k => k,
        };
        info!(?kind, "🧭 renderer selected");
        match kind {
            RendererKind::Browser => self
                .browser
                .clone()
                .ok_or_else(|| PipelineError::Validation("renderer browser não está habilitado".into())),
            _ => Ok(self.template.clone()),
        }
    }
}
