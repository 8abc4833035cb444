#![warn(missing_docs)]
//! # fourgrid-app binary
//!
//! Command-line entry point: composes one collage from four image files named
//! on the command line and delivers it per the configured delivery mode.

use std::path::PathBuf;
use std::sync::Arc;

use fourgrid_app::{
    AppConfig, AppError, CollageOutcome, DeliveryMode, RunLogger, app_version, handle_submission,
    init_staging_dir,
};
use fourgrid_core::{IMAGE_FIELD_NAME, REQUIRED_IMAGE_COUNT, UploadedPart};
use fourgrid_hosting::{
    HostingClient, HostingError, HostingTransport, TransportReply, UploadEnvelope, artifact_checksum,
};

/// Stand-in hosting transport for the CLI shell.
///
/// The real vendor call is a thin, swappable wrapper; the CLI answers with
/// deterministic URLs derived from the uploaded bytes so the hosted delivery
/// path stays exercisable end to end.
#[derive(Debug, Default)]
struct MockHostingTransport;

impl HostingTransport for MockHostingTransport {
    fn send(&self, envelope: &UploadEnvelope) -> Result<TransportReply, HostingError> {
        let image = envelope
            .field(fourgrid_hosting::FIELD_IMAGE)
            .ok_or_else(|| HostingError::Transport("envelope has no image field".to_string()))?;
        let checksum = artifact_checksum(image.as_bytes());
        let tag = &checksum[..12];

        Ok(TransportReply {
            status: 200,
            body: serde_json::json!({
                "success": true,
                "data": {
                    "url_viewer": format!("https://mock.fourgrid.test/v/{tag}"),
                    "url": format!("https://mock.fourgrid.test/i/{tag}.jpg"),
                }
            })
            .to_string(),
        })
    }
}

/// CLI entry point.
fn main() {
    if let Err(error) = run() {
        eprintln!("{error}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), String> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.len() != REQUIRED_IMAGE_COUNT {
        return Err(format!(
            "Usage: fourgrid-app <image1> <image2> <image3> <image4>\n\
             (fourgrid-app {}: exactly {REQUIRED_IMAGE_COUNT} image paths are required)",
            app_version()
        ));
    }

    let config = AppConfig::from_env();
    init_staging_dir(&config.staging_dir).map_err(|error| error.to_string())?;

    let logger = RunLogger::create(&config.staging_dir).map_err(|error| error.to_string())?;
    logger.write_line(
        "INFO",
        "config",
        "resolved",
        &format!(
            "version={} delivery={:?} staging_dir={}",
            app_version(),
            config.delivery,
            config.staging_dir.display()
        ),
    );

    let parts = read_parts(&args)?;
    let hosting = build_hosting_client(&config).map_err(|error| error.to_string())?;

    let outcome = match handle_submission(&parts, &config, hosting.as_ref()) {
        Ok(outcome) => outcome,
        Err(error) => {
            let kind = if error.is_client_error() {
                "rejected"
            } else {
                "failed"
            };
            logger.write_line("ERROR", "pipeline", kind, &error.to_string());
            return Err(error.to_string());
        }
    };

    match outcome {
        CollageOutcome::Attachment(attachment) => {
            let output = PathBuf::from(&attachment.file_name);
            std::fs::write(&output, &attachment.bytes)
                .map_err(|error| format!("unable to write '{}': {error}", output.display()))?;
            logger.write_line(
                "INFO",
                "deliver",
                "attachment",
                &format!(
                    "file={} content_type={} bytes={}",
                    output.display(),
                    attachment.content_type,
                    attachment.bytes.len()
                ),
            );
            println!(
                "wrote {} ({}; {})",
                output.display(),
                attachment.content_type,
                attachment.content_disposition()
            );
        }
        CollageOutcome::Hosted {
            payload,
            hosting_failure,
        } => {
            if let Some(failure) = hosting_failure {
                logger.write_line("WARN", "deliver", "hosting_degraded", &failure);
            } else {
                logger.write_line(
                    "INFO",
                    "deliver",
                    "hosted",
                    &format!("checksum={}", payload.checksum),
                );
            }

            let json = payload
                .to_json_bytes()
                .map_err(|error| format!("unable to encode response payload: {error}"))?;
            println!("{}", String::from_utf8_lossy(&json));
        }
    }

    Ok(())
}

fn read_parts(paths: &[String]) -> Result<Vec<UploadedPart>, String> {
    let mut parts = Vec::with_capacity(paths.len());
    for path in paths {
        let bytes = std::fs::read(path)
            .map_err(|error| format!("unable to read image '{path}': {error}"))?;
        let file_name = PathBuf::from(path)
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload.jpg".to_string());
        parts.push(UploadedPart::new(IMAGE_FIELD_NAME, file_name, bytes));
    }

    Ok(parts)
}

fn build_hosting_client(config: &AppConfig) -> Result<Option<HostingClient>, AppError> {
    if config.delivery != DeliveryMode::Hosted {
        return Ok(None);
    }

    let api_key = config.hosting_api_key.clone().ok_or_else(|| {
        AppError::Config("hosted delivery requires FOURGRID_HOSTING_API_KEY".to_string())
    })?;

    let client = HostingClient::new(
        config.hosting_endpoint.clone(),
        api_key,
        Arc::new(MockHostingTransport),
    )
    .map_err(|error| AppError::Config(error.to_string()))?;

    Ok(Some(client))
}
