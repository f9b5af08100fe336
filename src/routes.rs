use axum::{
    extract::{Multipart, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use base64::Engine;
use chrono::Local;
use std::{path::Path, sync::Arc};
use tracing::{info, warn};

use crate::{
    catalog::CatalogRepository,
    error::{CallableError, HttpError, PipelineError},
    extract::{ApiJson, CallableJson},
    models::{
        CallableEnvelope, CallableGeneratePdf, CatalogFilter, Discipline, GeneratePdfRequest, Material, NewDiscipline,
        NewMaterial, NewPeriod, NewSubscriber, NewUniversity, PdfBase64, Period, Subscriber, University, UploadResponse,
    },
    pdf::PageSize,
    render::{RenderJob, RendererKind, Renderers},
    storage::{sanitize_file_name, ContentStore, LoadedContent, LocalMaterials},
    users::UserDirectory,
};

pub const ANONYMOUS_REQUESTER: &str = "Visitante";

#[derive(Clone)]
pub struct AppState {
    pub materials: Arc<LocalMaterials>,
    pub storage: Arc<dyn ContentStore>,
    pub users: Arc<dyn UserDirectory>,
    pub catalog: Arc<dyn CatalogRepository>,
    pub renderers: Renderers,
    pub site_url: String,
}

/// Caller uid from `Authorization: Bearer <uid>`, as asserted by the auth gateway.
fn caller_uid(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let uid = value.strip_prefix("Bearer ").or_else(|| value.strip_prefix("bearer "))?.trim();
    (!uid.is_empty()).then(|| uid.to_string())
}

fn non_empty(v: Option<String>) -> Option<String> {
    v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

/// Loads the material, picks a renderer and renders. Shared by both PDF endpoints.
async fn render_material(
    state: &AppState,
    store: &dyn ContentStore,
    identifier: &str,
    material_title: String,
    requester: String,
    renderer: Option<RendererKind>,
) -> Result<Vec<u8>, PipelineError> {
    let object = store.fetch(identifier).await?;
    let content = LoadedContent::from_object(identifier, &object);
    let chosen = state.renderers.select(renderer, &content)?;
    let job = RenderJob {
        material_title,
        requester_display_name: requester,
        content,
        page_size: PageSize::A4,
        generated_on: Local::now().date_naive(),
        site_url: state.site_url.clone(),
    };
    chosen.render(&job).await.inspect_err(|e| {
        tracing::error!(identifier, renderer = ?chosen.kind(), error = %e, "❌ Erro ao gerar PDF");
    })
}

pub async fn health() -> &'static str { "OK" }

/// `POST /generatePdf`: `{fileName}` from the materials dir or `{storagePath}`
/// from Cloud Storage; replies with the PDF bytes.
pub async fn generate_pdf(
    State(state): State<AppState>,
    headers: HeaderMap,
    ApiJson(body): ApiJson<GeneratePdfRequest>,
) -> Result<Response, HttpError> {
    let (store, identifier): (&dyn ContentStore, String) = match (non_empty(body.file_name), non_empty(body.storage_path)) {
        (Some(name), _) => (state.materials.as_ref() as &dyn ContentStore, name),
        (None, Some(path)) => (state.storage.as_ref(), path),
        (None, None) => {
            return Err(PipelineError::Validation("fileName ou storagePath é obrigatório.".into()).into());
        }
    };

    let requester = match caller_uid(&headers) {
        Some(uid) => state.users.display_name(&uid).await?.unwrap_or_else(|| ANONYMOUS_REQUESTER.to_string()),
        None => ANONYMOUS_REQUESTER.to_string(),
    };
    let title = non_empty(body.material_title).unwrap_or_else(|| {
        Path::new(&identifier).file_stem().and_then(|s| s.to_str()).unwrap_or(identifier.as_str()).to_string()
    });

    info!(%identifier, %title, "🚀 generating PDF");
    let pdf = render_material(&state, store, &identifier, title, requester, body.renderer).await?;

    let disposition = match sanitize_file_name(&identifier) {
        Some(name) => format!("inline; filename=\"{}.pdf\"", name.replace('"', "")),
        None => "inline".to_string(),
    };
    let mut out = HeaderMap::new();
    out.insert(header::CONTENT_TYPE, header::HeaderValue::from_static("application/pdf"));
    if let Ok(v) = disposition.parse() {
        out.insert(header::CONTENT_DISPOSITION, v);
    }
    Ok((StatusCode::OK, out, pdf).into_response())
}

/// Callable variant: authenticated, `{data: {storagePath, materialTitle}}` in,
/// `{result: {pdfBase64}}` out.
pub async fn generate_pdf_callable(
    State(state): State<AppState>,
    headers: HeaderMap,
    CallableJson(envelope): CallableJson<CallableEnvelope<CallableGeneratePdf>>,
) -> Result<Json<serde_json::Value>, CallableError> {
    let uid = caller_uid(&headers)
        .ok_or_else(|| PipelineError::Auth("Você precisa estar logado para acessar os materiais.".into()))?;
    let args = envelope.into_inner();
    let (Some(storage_path), Some(material_title)) = (non_empty(args.storage_path), non_empty(args.material_title)) else {
        return Err(PipelineError::Validation("O caminho do arquivo e o título são obrigatórios.".into()).into());
    };

    let requester = state
        .users
        .display_name(&uid)
        .await?
        .ok_or_else(|| PipelineError::NotFound("Usuário não encontrado.".into()))?;

    info!(%uid, %storage_path, "🚀 callable PDF request");
    let pdf = render_material(&state, state.storage.as_ref(), &storage_path, material_title, requester, args.renderer).await?;
    let encoded = base64::engine::general_purpose::STANDARD.encode(&pdf);
    Ok(Json(serde_json::json!({ "result": PdfBase64 { pdf_base64: encoded } })))
}

/// `POST /upload`: stores the single file field under its original name.
pub async fn upload_material(State(state): State<AppState>, mut multipart: Multipart) -> Result<Json<UploadResponse>, HttpError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| PipelineError::Validation(format!("multipart inválido: {e}")))?
    {
        let Some(original) = field.file_name().map(str::to_string) else { continue };
        let file_name = sanitize_file_name(&original)
            .ok_or_else(|| PipelineError::Validation(format!("nome de arquivo inválido: {original}")))?;
        let data = field
            .bytes()
            .await
            .map_err(|e| PipelineError::Validation(format!("falha ao ler arquivo: {e}")))?;

        tokio::fs::create_dir_all(state.materials.dir()).await.map_err(PipelineError::from)?;
        let path = state.materials.dir().join(&file_name);
        tokio::fs::write(&path, &data).await.map_err(PipelineError::from)?;
        info!(path = %path.display(), size = data.len(), "✅ material uploaded");
        return Ok(Json(UploadResponse { file_name }));
    }
    warn!("upload without a file field");
    Err(PipelineError::Validation("Nenhum arquivo enviado.".into()).into())
}

// --- Catalog ---

pub async fn list_universities(State(state): State<AppState>) -> Json<Vec<University>> {
    Json(state.catalog.list_universities())
}

pub async fn create_university(State(state): State<AppState>, ApiJson(body): ApiJson<NewUniversity>) -> Result<(StatusCode, Json<University>), HttpError> {
    Ok((StatusCode::CREATED, Json(state.catalog.add_university(&body.name)?)))
}

pub async fn list_periods(State(state): State<AppState>, Query(f): Query<CatalogFilter>) -> Json<Vec<Period>> {
    Json(state.catalog.list_periods(f.university_id.as_deref()))
}

pub async fn create_period(State(state): State<AppState>, ApiJson(body): ApiJson<NewPeriod>) -> Result<(StatusCode, Json<Period>), HttpError> {
    Ok((StatusCode::CREATED, Json(state.catalog.add_period(body)?)))
}

pub async fn list_disciplines(State(state): State<AppState>, Query(f): Query<CatalogFilter>) -> Json<Vec<Discipline>> {
    Json(state.catalog.list_disciplines(f.university_id.as_deref(), f.period_id.as_deref()))
}

pub async fn create_discipline(State(state): State<AppState>, ApiJson(body): ApiJson<NewDiscipline>) -> Result<(StatusCode, Json<Discipline>), HttpError> {
    Ok((StatusCode::CREATED, Json(state.catalog.add_discipline(body)?)))
}

pub async fn list_materials(State(state): State<AppState>, Query(f): Query<CatalogFilter>) -> Json<Vec<Material>> {
    Json(state.catalog.list_materials(f.discipline_id.as_deref()))
}

pub async fn create_material(State(state): State<AppState>, ApiJson(body): ApiJson<NewMaterial>) -> Result<(StatusCode, Json<Material>), HttpError> {
    Ok((StatusCode::CREATED, Json(state.catalog.add_material(body)?)))
}

pub async fn list_subscribers(State(state): State<AppState>) -> Json<Vec<Subscriber>> {
    Json(state.catalog.list_subscribers())
}

pub async fn create_subscriber(State(state): State<AppState>, ApiJson(body): ApiJson<NewSubscriber>) -> Result<(StatusCode, Json<Subscriber>), HttpError> {
    Ok((StatusCode::CREATED, Json(state.catalog.add_subscriber(body)?)))
}
