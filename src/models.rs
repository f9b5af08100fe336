use serde::{Serialize, Deserialize};
use chrono::{DateTime, Utc};

use crate::render::RendererKind;

// --- PDF endpoints ---

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct GeneratePdfRequest {
    #[serde(default)]
    pub file_name: Option<String>,
    #[serde(default)]
    pub storage_path: Option<String>,
    #[serde(default)]
    pub material_title: Option<String>,
    #[serde(default)]
    pub renderer: Option<RendererKind>,
}

/// Arguments of the callable variant, usually wrapped as `{"data": {...}}`.
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct CallableGeneratePdf {
    #[serde(default)]
    pub storage_path: Option<String>,
    #[serde(default)]
    pub material_title: Option<String>,
    #[serde(default)]
    pub renderer: Option<RendererKind>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum CallableEnvelope<T> {
    Wrapped { data: T },
    Bare(T),
}

impl<T> CallableEnvelope<T> {
    pub fn into_inner(self) -> T {
        match self { CallableEnvelope::Wrapped { data } => data, CallableEnvelope::Bare(t) => t }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct PdfBase64 {
    pub pdf_base64: String,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub file_name: String,
}

// --- Catalog ---

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum Category { Slides, ResumoAudio, MapaMental, Relatorios }

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum RelatorioSubcategory { GuiaDeEstudo, DocumentoDeResumo, Perguntas, LinhaDoTempo }

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MaterialType { Html, Wav, Json, Mp3, Pdf, Ppt, Pptx, Ppx, Png, Jpg, Jpeg }

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct University {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Period {
    pub id: String,
    pub name: String,
    pub university_id: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RelatorioCounters {
    pub guia_de_estudo: u32,
    pub documento_de_resumo: u32,
    pub perguntas: u32,
    pub linha_do_tempo: u32,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DisciplineCounters {
    pub slides: u32,
    pub resumo_audio: u32,
    pub mapa_mental: u32,
    pub relatorios: RelatorioCounters,
}

impl DisciplineCounters {
    pub fn record(&mut self, category: Category, subcategory: Option<RelatorioSubcategory>) {
        match category {
            Category::Slides => self.slides += 1,
            Category::ResumoAudio => self.resumo_audio += 1,
            Category::MapaMental => self.mapa_mental += 1,
            Category::Relatorios => match subcategory {
                Some(RelatorioSubcategory::GuiaDeEstudo) => self.relatorios.guia_de_estudo += 1,
                Some(RelatorioSubcategory::DocumentoDeResumo) => self.relatorios.documento_de_resumo += 1,
                Some(RelatorioSubcategory::Perguntas) => self.relatorios.perguntas += 1,
                Some(RelatorioSubcategory::LinhaDoTempo) => self.relatorios.linha_do_tempo += 1,
                None => {}
            },
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Discipline {
    pub id: String,
    pub name: String,
    pub course: String,
    pub period_id: String,
    pub university_id: String,
    pub counters: DisciplineCounters,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Material {
    pub id: String,
    pub title: String,
    pub filename: String,
    #[serde(rename = "type")]
    pub material_type: MaterialType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    pub discipline_id: String,
    pub university_id: String,
    pub period_id: String,
    pub category: Category,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subcategory: Option<RelatorioSubcategory>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Subscriber {
    pub id: String,
    pub name: String,
    pub email: String,
    pub university_id: String,
    pub period_id: String,
    pub active: bool,
}

// --- Catalog create payloads ---

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct NewUniversity {
    pub name: String,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct NewPeriod {
    pub university_id: String,
    pub name: String,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct NewDiscipline {
    pub university_id: String,
    pub period_id: String,
    pub name: String,
    #[serde(default)]
    pub course: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct NewMaterial {
    pub title: String,
    pub filename: String,
    #[serde(rename = "type")]
    pub material_type: MaterialType,
    #[serde(default)]
    pub size: Option<u64>,
    #[serde(default)]
    pub url: Option<String>,
    pub discipline_id: String,
    pub university_id: String,
    pub period_id: String,
    pub category: Category,
    #[serde(default)]
    pub subcategory: Option<RelatorioSubcategory>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct NewSubscriber {
    pub name: String,
    pub email: String,
    pub university_id: String,
    pub period_id: String,
    #[serde(default = "default_true")]
    pub active: bool,
}

fn default_true() -> bool { true }

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct CatalogFilter {
    pub university_id: Option<String>,
    pub period_id: Option<String>,
    pub discipline_id: Option<String>,
}
