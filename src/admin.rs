//! Admin portal client: document ingestion jobs, services and Huduma
//! Centre records.
//!
//! DESIGN
//! ======
//! Thin pass-through calls: build the request, send it, hand back the
//! server's JSON untouched. The only client-side logic is input validation
//! and best-effort extraction of the server's error message, which is
//! surfaced verbatim to the operator. Nothing here retries.

use std::path::{Path, PathBuf};

use reqwest::multipart::{Form, Part};
use reqwest::{RequestBuilder, StatusCode};
use serde::Serialize;
use serde_json::Value;
use tracing::{info, warn};

use crate::config::{ClientConfig, ConfigError};
use crate::error::ErrorCode;

pub const ADMIN_PREFIX: &str = "/api/v1/admin";

// =============================================================================
// ERROR
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum AdminError {
    /// Input rejected before anything was sent.
    #[error("{0}")]
    Invalid(String),

    /// A local file could not be read.
    #[error("could not read {path}: {reason}")]
    File { path: String, reason: String },

    /// Transport-level failure.
    #[error("request failed: {0}")]
    Request(String),

    /// The server refused the call; `message` is its own explanation.
    #[error("{message}")]
    Server { status: u16, message: String },

    /// The server answered 2xx with a body that is not JSON.
    #[error("response parse failed: {0}")]
    Parse(String),
}

impl ErrorCode for AdminError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Invalid(_) => "E_ADMIN_INVALID",
            Self::File { .. } => "E_ADMIN_FILE",
            Self::Request(_) => "E_ADMIN_REQUEST",
            Self::Server { .. } => "E_ADMIN_SERVER",
            Self::Parse(_) => "E_ADMIN_PARSE",
        }
    }

    fn retryable(&self) -> bool {
        matches!(self, Self::Request(_) | Self::Server { status: 429 | 500..=599, .. })
    }
}

/// Best-effort operator-facing message for a failed call: the body's
/// `detail`, then `message`, then the status reason, then `fallback`.
#[must_use]
pub fn error_message(status: StatusCode, body: &str, fallback: &str) -> String {
    if let Ok(json) = serde_json::from_str::<Value>(body) {
        for key in ["detail", "message"] {
            match json.get(key) {
                Some(Value::String(s)) if !s.is_empty() => return s.clone(),
                Some(Value::String(_) | Value::Null) | None => {}
                Some(other) => return other.to_string(),
            }
        }
    }
    status
        .canonical_reason()
        .map_or_else(|| fallback.to_owned(), str::to_owned)
}

// =============================================================================
// REQUEST TYPES
// =============================================================================

/// Filters for the job listing. Unset fields are omitted from the query.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JobFilter {
    pub status: Option<String>,
    pub job_type: Option<String>,
}

impl JobFilter {
    #[must_use]
    pub fn query_pairs(&self) -> Vec<(&'static str, &str)> {
        let mut pairs = Vec::new();
        if let Some(status) = self.status.as_deref() {
            pairs.push(("status", status));
        }
        if let Some(job_type) = self.job_type.as_deref() {
            pairs.push(("job_type", job_type));
        }
        pairs
    }
}

#[derive(Debug, Clone, Serialize)]
struct ScrapeRequest<'a> {
    url: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    category: Option<&'a str>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewService {
    pub title: String,
    pub description: String,
    pub category: String,
    pub logo: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NewHudumaCentre {
    pub name: String,
    pub county: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sub_county: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub town: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact_phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact_email: Option<String>,
}

// =============================================================================
// VALIDATION
// =============================================================================

/// # Errors
///
/// Rejects paths without a `.pdf` extension.
pub fn validate_pdf_path(path: &Path) -> Result<(), AdminError> {
    let is_pdf = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"));
    if is_pdf { Ok(()) } else { Err(AdminError::Invalid("Please upload a PDF file".into())) }
}

/// # Errors
///
/// Rejects empty input and anything that is not an absolute http(s) URL.
pub fn validate_scrape_url(raw: &str) -> Result<reqwest::Url, AdminError> {
    if raw.trim().is_empty() {
        return Err(AdminError::Invalid("Please enter a URL".into()));
    }
    match reqwest::Url::parse(raw.trim()) {
        Ok(url) if matches!(url.scheme(), "http" | "https") && url.has_host() => Ok(url),
        _ => Err(AdminError::Invalid("Please enter a valid URL".into())),
    }
}

/// # Errors
///
/// Rejects services without a title or description.
pub fn validate_service(service: &NewService) -> Result<(), AdminError> {
    if service.title.trim().is_empty() || service.description.trim().is_empty() {
        return Err(AdminError::Invalid("Please fill in title and description".into()));
    }
    Ok(())
}

/// # Errors
///
/// Rejects centres without a name or county.
pub fn validate_huduma_centre(centre: &NewHudumaCentre) -> Result<(), AdminError> {
    if centre.name.trim().is_empty() || centre.county.trim().is_empty() {
        return Err(AdminError::Invalid("Please fill in name and county".into()));
    }
    Ok(())
}

fn validate_job_id(job_id: &str) -> Result<(), AdminError> {
    if job_id.trim().is_empty() || job_id.contains('/') {
        return Err(AdminError::Invalid(format!("invalid job id '{job_id}'")));
    }
    Ok(())
}

// =============================================================================
// CLIENT
// =============================================================================

pub struct AdminClient {
    http: reqwest::Client,
    base_url: String,
}

impl AdminClient {
    #[must_use]
    pub fn new(http: reqwest::Client, base_url: &str) -> Self {
        Self { http, base_url: base_url.trim_end_matches('/').to_owned() }
    }

    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn from_config(config: &ClientConfig) -> Result<Self, ConfigError> {
        Ok(Self::new(config.http_client()?, &config.api_base_url))
    }

    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("{}{ADMIN_PREFIX}{path}", self.base_url)
    }

    /// Queue a PDF for ingestion.
    ///
    /// # Errors
    ///
    /// Validation, file read, transport or server errors.
    pub async fn upload_pdf(&self, path: &Path, category: Option<&str>) -> Result<Value, AdminError> {
        validate_pdf_path(path)?;
        let part = file_part(path, "application/pdf").await?;
        let mut form = Form::new().part("file", part);
        if let Some(category) = category.filter(|c| !c.is_empty()) {
            form = form.text("category", category.to_owned());
        }
        let builder = self.http.post(self.url("/documents/upload-pdf")).multipart(form);
        self.send("upload_pdf", builder, "Upload failed").await
    }

    /// Queue a web page for scraping.
    ///
    /// # Errors
    ///
    /// Validation, transport or server errors.
    pub async fn scrape_url(&self, url: &str, category: Option<&str>) -> Result<Value, AdminError> {
        let url = validate_scrape_url(url)?;
        let body = ScrapeRequest { url: url.as_str(), category: category.filter(|c| !c.is_empty()) };
        let builder = self.http.post(self.url("/documents/scrape-url")).json(&body);
        self.send("scrape_url", builder, "Scraping failed").await
    }

    /// # Errors
    ///
    /// Transport or server errors.
    pub async fn list_jobs(&self, filter: &JobFilter) -> Result<Value, AdminError> {
        let builder = self.http.get(self.url("/jobs")).query(&filter.query_pairs());
        self.send("list_jobs", builder, "Failed to fetch jobs").await
    }

    /// # Errors
    ///
    /// Validation, transport or server errors.
    pub async fn job_status(&self, job_id: &str) -> Result<Value, AdminError> {
        validate_job_id(job_id)?;
        let builder = self.http.get(self.url(&format!("/jobs/{job_id}")));
        self.send("job_status", builder, "Failed to fetch job status").await
    }

    /// # Errors
    ///
    /// Validation, transport or server errors.
    pub async fn delete_job(&self, job_id: &str) -> Result<Value, AdminError> {
        validate_job_id(job_id)?;
        let builder = self.http.delete(self.url(&format!("/jobs/{job_id}")));
        self.send("delete_job", builder, "Failed to delete job").await
    }

    /// # Errors
    ///
    /// Validation, transport or server errors.
    pub async fn delete_jobs(&self, job_ids: &[String]) -> Result<Value, AdminError> {
        if job_ids.is_empty() {
            return Err(AdminError::Invalid("no jobs selected".into()));
        }
        let builder = self.http.delete(self.url("/jobs")).json(job_ids);
        self.send("delete_jobs", builder, "Failed to delete jobs").await
    }

    /// # Errors
    ///
    /// Transport or server errors.
    pub async fn list_services(&self) -> Result<Value, AdminError> {
        let builder = self.http.get(self.url("/services"));
        self.send("list_services", builder, "Failed to fetch services").await
    }

    /// # Errors
    ///
    /// Validation, file read, transport or server errors.
    pub async fn create_service(&self, service: &NewService) -> Result<Value, AdminError> {
        validate_service(service)?;
        let mut form = Form::new()
            .text("title", service.title.clone())
            .text("description", service.description.clone())
            .text("category", service.category.clone());
        if let Some(logo) = &service.logo {
            form = form.part("logo", file_part(logo, "application/octet-stream").await?);
        }
        let builder = self.http.post(self.url("/services")).multipart(form);
        self.send("create_service", builder, "Failed to create service").await
    }

    /// # Errors
    ///
    /// Transport or server errors.
    pub async fn list_huduma_centres(&self) -> Result<Value, AdminError> {
        let builder = self.http.get(self.url("/huduma-centres"));
        self.send("list_huduma_centres", builder, "Failed to fetch Huduma Centres").await
    }

    /// # Errors
    ///
    /// Validation, transport or server errors.
    pub async fn create_huduma_centre(&self, centre: &NewHudumaCentre) -> Result<Value, AdminError> {
        validate_huduma_centre(centre)?;
        let builder = self.http.post(self.url("/huduma-centres")).json(centre);
        self.send("create_huduma_centre", builder, "Failed to create Huduma Centre").await
    }

    /// Live chat metrics, or `None` so the caller falls back to local figures.
    pub async fn chat_metrics(&self) -> Option<Value> {
        let builder = self.http.get(self.url("/metrics"));
        match self.send("chat_metrics", builder, "Failed to fetch metrics").await {
            Ok(json) => Some(json),
            Err(e) => {
                warn!(error = %e, "admin: chat metrics unavailable, using local figures");
                None
            }
        }
    }

    async fn send(&self, op: &'static str, builder: RequestBuilder, fallback: &str) -> Result<Value, AdminError> {
        let response = builder
            .send()
            .await
            .map_err(|e| AdminError::Request(e.to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| AdminError::Request(e.to_string()))?;

        if !status.is_success() {
            let message = error_message(status, &text, fallback);
            warn!(op, status = status.as_u16(), %message, "admin: request rejected");
            return Err(AdminError::Server { status: status.as_u16(), message });
        }

        info!(op, status = status.as_u16(), "admin: request ok");
        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&text).map_err(|e| AdminError::Parse(e.to_string()))
    }
}

async fn file_part(path: &Path, mime: &str) -> Result<Part, AdminError> {
    let display = path.display().to_string();
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|e| AdminError::File { path: display.clone(), reason: e.to_string() })?;
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("upload")
        .to_owned();
    Part::bytes(bytes)
        .file_name(file_name)
        .mime_str(mime)
        .map_err(|e| AdminError::File { path: display, reason: e.to_string() })
}

#[cfg(test)]
#[path = "admin_test.rs"]
mod tests;
