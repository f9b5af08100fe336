//! MedStudy materials backend.
//!
//! Renders study materials into branded, paginated PDFs stamped with the
//! requester's identity, stores uploads, and serves the admin catalog.

pub mod catalog;
pub mod config;
pub mod error;
pub mod extract;
pub mod models;
pub mod pdf;
pub mod render;
pub mod routes;
pub mod storage;
pub mod users;

use axum::{extract::DefaultBodyLimit, routing::{get, post}, Router};
use std::sync::Arc;
use tower_http::{cors::{Any, CorsLayer}, trace::TraceLayer};

use crate::{
    catalog::InMemoryCatalog,
    config::Config,
    render::{BrowserRenderer, Renderer, Renderers},
    routes::AppState,
    storage::{CloudStorage, LocalMaterials},
    users::FirestoreUsers,
};

/// Wires the production collaborators described by `config`. One HTTP client
/// is shared by the storage and user lookups.
pub fn build_state(config: &Config) -> AppState {
    let http = reqwest::Client::new();
    let browser = config.chromium_path.as_ref().map(|path| {
        Arc::new(BrowserRenderer::new(path, config.browser_pool_size, config.render_timeout)) as Arc<dyn Renderer>
    });
    AppState {
        materials: Arc::new(LocalMaterials::new(&config.materials_dir)),
        storage: Arc::new(CloudStorage::new(
            http.clone(),
            &config.storage_api_base,
            &config.storage_bucket,
            config.storage_access_token.clone(),
        )),
        users: Arc::new(FirestoreUsers::new(
            http,
            &config.firestore_api_base,
            &config.firebase_project_id,
            config.storage_access_token.clone(),
        )),
        catalog: Arc::new(InMemoryCatalog::with_demo_data()),
        renderers: Renderers::new(config.default_renderer, browser),
        site_url: config.site_url.clone(),
    }
}

pub fn app(state: AppState, max_upload_bytes: usize) -> Router {
    Router::new()
        .route("/health", get(routes::health))
        .route("/generatePdf", post(routes::generate_pdf))
        .route("/callable/generatePdf", post(routes::generate_pdf_callable))
        .route("/upload", post(routes::upload_material))
        .route("/api/universities", get(routes::list_universities).post(routes::create_university))
        .route("/api/periods", get(routes::list_periods).post(routes::create_period))
        .route("/api/disciplines", get(routes::list_disciplines).post(routes::create_discipline))
        .route("/api/materials", get(routes::list_materials).post(routes::create_material))
        .route("/api/subscribers", get(routes::list_subscribers).post(routes::create_subscriber))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any)
        )
        .with_state(state)
}
