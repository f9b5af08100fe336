use async_trait::async_trait;
use regex::Regex;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::{Arc, OnceLock};
use std::time::Duration;
use tokio::process::Command;
use tokio::sync::Semaphore;
use tracing::{error, info, warn};
use uuid::Uuid;

use super::{RenderJob, Renderer, RendererKind};
use crate::error::PipelineError;

const PRINT_CSS: &str = "<style>@page { size: A4; }</style>";

fn head_open() -> &'static Regex {
    static HEAD: OnceLock<Regex> = OnceLock::new();
    HEAD.get_or_init(|| Regex::new(r"(?i)<head(\s[^>]*)?>").expect("static regex"))
}

fn doctype() -> &'static Regex {
    static DOCTYPE: OnceLock<Regex> = OnceLock::new();
    DOCTYPE.get_or_init(|| Regex::new(r"(?i)^\s*<!doctype[^>]*>").expect("static regex"))
}

/// Hands the raw HTML to headless Chromium and returns its A4 print.
pub struct BrowserRenderer {
    chromium_path: PathBuf,
    pool: Arc<Semaphore>,
    timeout: Duration,
    work_dir: PathBuf,
}

impl BrowserRenderer {
    pub fn new(chromium_path: impl Into<PathBuf>, max_concurrent: usize, timeout: Duration) -> Self {
        Self {
            chromium_path: chromium_path.into(),
            pool: Arc::new(Semaphore::new(max_concurrent.max(1))),
            timeout,
            work_dir: std::env::temp_dir(),
        }
    }

    pub fn with_work_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.work_dir = dir.into();
        self
    }

    /// Puts the A4 page rule right inside `<head ...>` when there is one,
    /// else after any doctype so the page stays in standards mode.
    pub fn print_ready_html(html: &str) -> String {
        let at = head_open()
            .find(html)
            .or_else(|| doctype().find(html))
            .map_or(0, |m| m.end());
        format!("{}{}{}", &html[..at], PRINT_CSS, &html[at..])
    }

    async fn run_chromium(&self, input: &Path, output: &Path) -> Result<(), PipelineError> {
        // Dropping the future on timeout drops the child, which kills it.
        let mut cmd = Command::new(&self.chromium_path);
        cmd.arg("--headless")
            .arg("--disable-gpu")
            .arg("--no-sandbox")
            .arg("--no-pdf-header-footer")
            .arg(format!("--print-to-pdf={}", output.display()))
            .arg(format!("file://{}", input.display()))
            .stdin(Stdio::null())
            .kill_on_drop(true);
        let run = cmd.output();

        let out = match tokio::time::timeout(self.timeout, run).await {
            Ok(Ok(out)) => out,
            Ok(Err(e)) => {
                return Err(PipelineError::Render(format!("failed to launch {}: {e}", self.chromium_path.display())));
            }
            Err(_) => {
                warn!(timeout = ?self.timeout, "⏱️ browser render timed out, process killed");
                return Err(PipelineError::RenderTimeout(self.timeout));
            }
        };

        if !out.status.success() {
            let stderr = String::from_utf8_lossy(&out.stderr);
            error!(status = %out.status, stderr = %stderr.trim(), "❌ browser exited with failure");
            return Err(PipelineError::Render(format!("browser exited with {}", out.status)));
        }
        Ok(())
    }
}

#[async_trait]
impl Renderer for BrowserRenderer {
    fn kind(&self) -> RendererKind { RendererKind::Browser }

    async fn render(&self, job: &RenderJob) -> Result<Vec<u8>, PipelineError> {
        let _permit = self
            .pool
            .acquire()
            .await
            .map_err(|_| PipelineError::Render("browser pool closed".into()))?;

        let id = Uuid::new_v4();
        let input = self.work_dir.join(format!("medstudy-{id}.html"));
        let output = self.work_dir.join(format!("medstudy-{id}.pdf"));
        tokio::fs::write(&input, Self::print_ready_html(&job.content.raw)).await?;
        info!(title = %job.material_title, input = %input.display(), "🌐 rendering with headless browser");

        let result = match self.run_chromium(&input, &output).await {
            Ok(()) => tokio::fs::read(&output)
                .await
                .map_err(|e| PipelineError::Render(format!("browser produced no PDF: {e}"))),
            Err(e) => Err(e),
        };

        for path in [&input, &output] {
            if let Err(e) = tokio::fs::remove_file(path).await {
                if e.kind() != std::io::ErrorKind::NotFound {
                    warn!(path = %path.display(), error = %e, "failed to remove temp file");
                }
            }
        }
        let bytes = result?;
        info!(size = bytes.len(), "✅ browser PDF ready");
        Ok(bytes)
    }
}
