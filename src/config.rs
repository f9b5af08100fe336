use std::{env, path::PathBuf, time::Duration};

use crate::render::RendererKind;

/// Process configuration, read once from the environment at startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub materials_dir: PathBuf,
    pub storage_bucket: String,
    pub storage_api_base: String,
    pub firebase_project_id: String,
    pub firestore_api_base: String,
    /// Bearer token for the Google REST APIs, if the host doesn't inject one.
    pub storage_access_token: Option<String>,
    pub service_region: String,
    pub site_url: String,
    pub default_renderer: RendererKind,
    /// Browser renderer is disabled when unset.
    pub chromium_path: Option<PathBuf>,
    pub browser_pool_size: usize,
    pub render_timeout: Duration,
    pub max_upload_bytes: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 3001,
            materials_dir: PathBuf::from("materials"),
            storage_bucket: "cardio-learn-pro.appspot.com".into(),
            storage_api_base: "https://storage.googleapis.com".into(),
            firebase_project_id: "cardio-learn-pro".into(),
            firestore_api_base: "https://firestore.googleapis.com".into(),
            storage_access_token: None,
            service_region: "southamerica-east1".into(),
            site_url: "www.meusaasmedico.com.br".into(),
            default_renderer: RendererKind::Template,
            chromium_path: None,
            browser_pool_size: 2,
            render_timeout: Duration::from_secs(30),
            max_upload_bytes: 25 * 1024 * 1024,
        }
    }
}

fn var(key: &str) -> Option<String> {
    env::var(key).ok().map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(var)
    }

    /// Builds a config from any key lookup; `from_env` passes the process env.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let d = Self::default();
        let get = |key: &str| lookup(key);
        let parse_or = |key: &str, fallback: u64| get(key).and_then(|v| v.parse().ok()).unwrap_or(fallback);
        Self {
            port: get("PORT").and_then(|v| v.parse().ok()).unwrap_or(d.port),
            materials_dir: get("MATERIALS_DIR").map(PathBuf::from).unwrap_or(d.materials_dir),
            storage_bucket: get("STORAGE_BUCKET").unwrap_or(d.storage_bucket),
            storage_api_base: get("STORAGE_API_BASE").unwrap_or(d.storage_api_base),
            firebase_project_id: get("FIREBASE_PROJECT_ID").unwrap_or(d.firebase_project_id),
            firestore_api_base: get("FIRESTORE_API_BASE").unwrap_or(d.firestore_api_base),
            storage_access_token: get("STORAGE_ACCESS_TOKEN").or_else(|| get("GOOGLE_ACCESS_TOKEN")),
            service_region: get("SERVICE_REGION").unwrap_or(d.service_region),
            site_url: get("SITE_URL").unwrap_or(d.site_url),
            default_renderer: get("DEFAULT_RENDERER").and_then(|v| v.parse().ok()).unwrap_or(d.default_renderer),
            chromium_path: get("CHROMIUM_PATH").map(PathBuf::from),
            browser_pool_size: parse_or("BROWSER_POOL_SIZE", d.browser_pool_size as u64) as usize,
            render_timeout: Duration::from_secs(parse_or("RENDER_TIMEOUT_SECS", d.render_timeout.as_secs())),
            max_upload_bytes: parse_or("MAX_UPLOAD_BYTES", d.max_upload_bytes as u64) as usize,
        }
    }
}
