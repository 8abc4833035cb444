#![warn(missing_docs)]
//! # fourgrid-app
//!
//! ## Purpose
//! Orchestrates submission validation, staging, composition, encoding, and
//! delivery for `fourgrid`.
//!
//! ## Responsibilities
//! - Resolve runtime configuration from the environment.
//! - Initialize the staging directory once, before submissions are handled.
//! - Run the submission pipeline: validate -> stage -> decode -> compose ->
//!   encode -> deliver.
//! - Shape the response as an attachment or a structured hosted payload.
//! - Provide per-run file logging with secret redaction.
//!
//! ## Data flow
//! Uploaded parts -> [`handle_submission`] -> [`CollageOutcome`] consumed by
//! the binary (or any thin HTTP wrapper).
//!
//! ## Ownership and lifetimes
//! The handler passes owned buffers between pipeline stages so delivery and
//! hosting upload never borrow request-scoped state.
//!
//! ## Error model
//! Subsystem failures are wrapped in [`AppError`]. Request-shape and decode
//! failures abort the submission; hosting failures only degrade it and are
//! reported inside the outcome for logging.
//!
//! ## Security and privacy notes
//! Log lines pass through [`redact_sensitive`] so hosting API keys and
//! authorization material never reach the run log.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use fourgrid_compose::watermark::WatermarkConfig;
use fourgrid_compose::{
    CollageImage, ComposeError, DEFAULT_JPEG_QUALITY, JPEG_CONTENT_TYPE, compose_collage,
    decode_source, encode_jpeg,
};
use fourgrid_core::{
    CollageResponsePayload, CoreError, LayoutConfig, SCHEMA_VERSION_V1, SourceImage, UploadedPart,
    select_image_parts,
};
use fourgrid_hosting::{HostingClient, artifact_checksum};
use thiserror::Error;
use time::OffsetDateTime;

/// Build-time application version loaded from root `VERSION` file.
pub const APP_VERSION: &str = env!("FOURGRID_VERSION");

/// File name reported for attachment-style delivery.
pub const COLLAGE_FILE_NAME: &str = "collage.jpg";

/// Returns the app version sourced from root `VERSION`.
pub fn app_version() -> &'static str {
    APP_VERSION
}

/// How the finished collage leaves the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryMode {
    /// Return the encoded bytes directly as a downloadable attachment.
    Attachment,
    /// Forward the encoded bytes to the hosting collaborator and return URLs.
    Hosted,
}

/// Runtime configuration resolved before the service accepts submissions.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Staging directory for uploaded input files.
    pub staging_dir: PathBuf,
    /// 2x2 grid layout.
    pub layout: LayoutConfig,
    /// Watermark text and rendering settings.
    pub watermark: WatermarkConfig,
    /// Configured delivery mode.
    pub delivery: DeliveryMode,
    /// JPEG encoder quality.
    pub jpeg_quality: u8,
    /// Whether hosted payloads also carry the encoded bytes as base64.
    pub include_image_data: bool,
    /// Hosting collaborator upload endpoint.
    pub hosting_endpoint: String,
    /// Hosting collaborator API key, when configured.
    pub hosting_api_key: Option<String>,
}

impl AppConfig {
    /// Resolves configuration from `FOURGRID_*` environment variables.
    ///
    /// Unset variables fall back to stock values; the hosting API key has no
    /// fallback and stays `None` until configured.
    pub fn from_env() -> Self {
        let mut watermark = WatermarkConfig::default();
        if let Ok(text) = std::env::var("FOURGRID_WATERMARK_TEXT") {
            watermark.text = text;
        }
        watermark.preferred_font = std::env::var("FOURGRID_FONT_PATH")
            .ok()
            .filter(|path| !path.trim().is_empty())
            .map(PathBuf::from);

        Self {
            staging_dir: std::env::var("FOURGRID_STAGING_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("uploads")),
            layout: LayoutConfig::default(),
            watermark,
            delivery: delivery_mode_from_value(std::env::var("FOURGRID_DELIVERY").ok().as_deref()),
            jpeg_quality: DEFAULT_JPEG_QUALITY,
            include_image_data: flag_from_value(
                std::env::var("FOURGRID_INCLUDE_IMAGE_DATA").ok().as_deref(),
            ),
            hosting_endpoint: std::env::var("FOURGRID_HOSTING_ENDPOINT")
                .unwrap_or_else(|_| "https://api.imgbb.example.test/1/upload".to_string()),
            hosting_api_key: std::env::var("FOURGRID_HOSTING_API_KEY")
                .ok()
                .filter(|key| !key.trim().is_empty()),
        }
    }
}

/// Parses a delivery-mode setting.
///
/// # Semantics
/// - Unset => attachment delivery.
/// - `hosted` (case-insensitive) => hosted delivery.
/// - Any other value => attachment delivery.
pub fn delivery_mode_from_value(value: Option<&str>) -> DeliveryMode {
    match value {
        Some(raw) if raw.trim().eq_ignore_ascii_case("hosted") => DeliveryMode::Hosted,
        _ => DeliveryMode::Attachment,
    }
}

/// Parses a boolean flag setting.
///
/// # Semantics
/// - Unset => `false`.
/// - `1`, `true`, `on` (case-insensitive) => `true`.
/// - Any other value => `false`.
pub fn flag_from_value(value: Option<&str>) -> bool {
    match value {
        Some(raw) => {
            let normalized = raw.trim().to_ascii_lowercase();
            normalized == "1" || normalized == "true" || normalized == "on"
        }
        None => false,
    }
}

/// Attachment-shaped delivery response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttachmentResponse {
    /// Download file name.
    pub file_name: String,
    /// MIME type of the encoded bytes.
    pub content_type: String,
    /// Encoded collage bytes.
    pub bytes: Vec<u8>,
}

impl AttachmentResponse {
    /// Returns the `Content-Disposition` value for this attachment.
    pub fn content_disposition(&self) -> String {
        format!("attachment; filename=\"{}\"", self.file_name)
    }
}

/// Finished submission result in the configured delivery shape.
#[derive(Debug)]
pub enum CollageOutcome {
    /// Direct delivery of the encoded bytes.
    Attachment(AttachmentResponse),
    /// Structured delivery carrying hosting URLs.
    Hosted {
        /// Response payload with links, checksum, and optional image copy.
        payload: CollageResponsePayload,
        /// Captured hosting failure when the collaborator degraded.
        hosting_failure: Option<String>,
    },
}

/// Initializes the staging directory.
///
/// # Semantics
/// Explicit one-time setup executed before any submission is handled; the
/// path comes from [`AppConfig`], never from ambient process state.
///
/// # Errors
/// Returns [`AppError::Staging`] when the directory cannot be created.
pub fn init_staging_dir(path: &Path) -> Result<(), AppError> {
    std::fs::create_dir_all(path).map_err(|error| {
        AppError::Staging(format!(
            "unable to create staging directory '{}': {error}",
            path.display()
        ))
    })
}

/// Writes the four image parts into the staging directory.
///
/// File naming (`image_{index}.jpg`) is an implementation convenience, not a
/// contract surface.
///
/// # Errors
/// Returns [`AppError::Staging`] when any write fails.
pub fn stage_submission(
    staging_dir: &Path,
    parts: &[&UploadedPart],
) -> Result<Vec<PathBuf>, AppError> {
    let mut staged = Vec::with_capacity(parts.len());
    for (index, part) in parts.iter().enumerate() {
        let path = staging_dir.join(format!("image_{index}.jpg"));
        std::fs::write(&path, &part.bytes).map_err(|error| {
            AppError::Staging(format!(
                "unable to stage upload '{}': {error}",
                path.display()
            ))
        })?;
        staged.push(path);
    }

    Ok(staged)
}

/// Handles one four-picture submission end to end.
///
/// # Errors
/// Returns [`AppError::Core`] for request-shape failures (wrong count,
/// missing field), [`AppError::Compose`] when decoding/composition/encoding
/// fails, and [`AppError::Config`] when hosted delivery is configured without
/// a hosting client. Hosting-collaborator failures do NOT error: the hosted
/// outcome carries absent links plus the failure text.
pub fn handle_submission(
    parts: &[UploadedPart],
    config: &AppConfig,
    hosting: Option<&HostingClient>,
) -> Result<CollageOutcome, AppError> {
    let images = select_image_parts(parts)?;
    stage_submission(&config.staging_dir, &images)?;

    let mut sources: Vec<SourceImage> = Vec::with_capacity(images.len());
    for part in &images {
        sources.push(decode_source(&part.bytes)?);
    }

    let collage = compose_collage(&sources, &config.layout, &config.watermark)?;
    let encoded = encode_jpeg(&collage, config.jpeg_quality)?;

    match config.delivery {
        DeliveryMode::Attachment => Ok(CollageOutcome::Attachment(AttachmentResponse {
            file_name: COLLAGE_FILE_NAME.to_string(),
            content_type: JPEG_CONTENT_TYPE.to_string(),
            bytes: encoded,
        })),
        DeliveryMode::Hosted => {
            let client = hosting.ok_or_else(|| {
                AppError::Config("hosted delivery requires a configured hosting client".to_string())
            })?;

            let outcome = client.publish(&encoded, COLLAGE_FILE_NAME);
            Ok(CollageOutcome::Hosted {
                payload: hosted_payload(&collage, &encoded, outcome.links, config),
                hosting_failure: outcome.failure.map(|failure| failure.to_string()),
            })
        }
    }
}

fn hosted_payload(
    collage: &CollageImage,
    encoded: &[u8],
    links: fourgrid_core::HostedLinks,
    config: &AppConfig,
) -> CollageResponsePayload {
    CollageResponsePayload {
        schema_version: SCHEMA_VERSION_V1.to_string(),
        links,
        width: collage.width,
        height: collage.height,
        content_type: JPEG_CONTENT_TYPE.to_string(),
        checksum: artifact_checksum(encoded),
        image_base64: config
            .include_image_data
            .then(|| BASE64_STANDARD.encode(encoded)),
    }
}

/// Redacts common secret markers in log-safe output.
pub fn redact_sensitive(input: &str) -> String {
    let mut redacted = input.to_string();
    for key in ["api_key", "key", "authorization", "bearer"] {
        redacted = redact_key_value(&redacted, key);
    }
    redacted
}

fn redact_key_value(input: &str, key: &str) -> String {
    let lower = input.to_ascii_lowercase();
    if let Some(position) = lower.find(key) {
        let prefix = &input[..position];
        return format!("{prefix}{key}=<redacted>");
    }

    input.to_string()
}

/// Per-run file logger shared by the binary's pipeline stages.
pub struct RunLogger {
    file: Mutex<File>,
    path: PathBuf,
}

impl RunLogger {
    /// Creates a `{timestamp}_log.txt` logger inside `dir`.
    ///
    /// # Errors
    /// Returns [`AppError::Logging`] when the log file cannot be opened.
    pub fn create(dir: &Path) -> Result<Self, AppError> {
        let timestamp = timestamp_compact_utc();
        let path = dir.join(format!("{timestamp}_log.txt"));
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|error| {
                AppError::Logging(format!(
                    "unable to create log file '{}': {error}",
                    path.display()
                ))
            })?;

        Ok(Self {
            file: Mutex::new(file),
            path,
        })
    }

    /// Appends one redacted pipeline log line.
    pub fn write_line(&self, level: &str, stage: &str, action: &str, detail: &str) {
        let timestamp = timestamp_compact_utc();
        let detail = redact_sensitive(detail);
        let line = format!("{timestamp} | {level} | {stage} | {action} | {detail}\n");

        if let Ok(mut file) = self.file.lock() {
            let _ = file.write_all(line.as_bytes());
            if level == "ERROR" {
                let _ = file.flush();
            }
        }
    }

    /// Returns the log file path.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn timestamp_compact_utc() -> String {
    let now = OffsetDateTime::now_utc();
    format!(
        "{:04}{:02}{:02}_{:02}{:02}{:02}",
        now.year(),
        now.month() as u8,
        now.day(),
        now.hour(),
        now.minute(),
        now.second()
    )
}

/// App integration error type.
#[derive(Debug, Error)]
pub enum AppError {
    /// Core model/request-shape error.
    #[error("core error: {0}")]
    Core(#[from] CoreError),
    /// Composition/codec error.
    #[error("compose error: {0}")]
    Compose(#[from] ComposeError),
    /// Staging directory or file I/O error.
    #[error("staging error: {0}")]
    Staging(String),
    /// Run log setup error.
    #[error("logging error: {0}")]
    Logging(String),
    /// Invalid runtime configuration.
    #[error("config error: {0}")]
    Config(String),
}

impl AppError {
    /// Returns `true` when the failure maps to a client (4xx) response.
    pub fn is_client_error(&self) -> bool {
        match self {
            Self::Core(error) => error.is_request_shape(),
            Self::Compose(error) => matches!(error, ComposeError::Decode(_)),
            _ => false,
        }
    }
}
