//! Hand-drawn template pipeline: shape, paginate, compose, encode.

pub mod compose;
pub mod encode;
pub mod metrics;
pub mod paginate;
pub mod shaper;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::PipelineError;
use compose::{compose, Chrome, ComposedDocument, TemplateLayout};
use metrics::FontMetrics;
use paginate::{paginate, stamp_page_count};
use shaper::shape;

pub const HEADER_TEXT: &str = "MedStudy";

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PageSize {
    #[default]
    A4,
    Letter,
    Custom { width: f32, height: f32 },
}

impl PageSize {
    /// Width and height in points.
    pub fn dimensions(&self) -> (f32, f32) {
        match self {
            PageSize::A4 => (595.28, 841.89),
            PageSize::Letter => (612.0, 792.0),
            PageSize::Custom { width, height } => (*width, *height),
        }
    }
}

/// Everything one template render needs. Built per invocation.
#[derive(Debug, Clone)]
pub struct RenderRequest {
    pub material_title: String,
    pub requester_display_name: String,
    pub content_text: String,
    pub page_size: PageSize,
    pub generated_on: NaiveDate,
    pub site_url: String,
}

impl RenderRequest {
    fn chrome(&self) -> Chrome {
        Chrome {
            header_text: HEADER_TEXT.to_string(),
            sub_title: self.material_title.clone(),
            footer_left: format!("{} - {}", self.requester_display_name, self.generated_on.format("%d/%m/%Y")),
            footer_center: self.site_url.clone(),
        }
    }
}

/// Runs shaping, both pagination passes and composition. Pure.
pub fn compose_request(req: &RenderRequest) -> ComposedDocument {
    let (width, height) = req.page_size.dimensions();
    let layout = TemplateLayout::for_page(width, height);
    let font = FontMetrics::helvetica();

    let lines = shape(&req.content_text, &font, layout.body_size, layout.usable_width());
    let pages = stamp_page_count(paginate(lines, layout.content_height(), layout.line_height));
    compose(&pages, &req.chrome(), &layout, &font)
}

pub fn render_template(req: &RenderRequest) -> Result<Vec<u8>, PipelineError> {
    let doc = compose_request(req);
    tracing::info!(title = %req.material_title, pages = doc.pages.len(), "📄 composed template document");
    encode::encode(&doc)
}
