#![warn(missing_docs)]
//! # fourgrid-hosting
//!
//! ## Purpose
//! Models the third-party image-hosting collaborator that turns collage bytes
//! into public URLs.
//!
//! ## Responsibilities
//! - Validate hosting endpoint policy (HTTPS) and API key presence.
//! - Build the multipart-style upload form envelope (API key + base64 image).
//! - Execute uploads through an injectable transport abstraction.
//! - Parse collaborator replies into viewer/direct URLs.
//! - Degrade to explicitly absent URLs on ANY failure without crashing.
//!
//! ## Data flow
//! Encoded collage bytes -> [`HostingClient::publish`] builds an
//! [`UploadEnvelope`] -> [`HostingTransport`] performs the outbound call ->
//! the reply becomes [`fourgrid_core::HostedLinks`] inside a
//! [`PublishOutcome`].
//!
//! ## Ownership and lifetimes
//! Envelopes own their field values so transports can be retried by callers
//! or run on other threads without borrowing the collage buffer.
//!
//! ## Error model
//! Failures surface as [`HostingError`] internally, but `publish` never
//! propagates them: the outcome carries degraded links plus the captured
//! failure for logging. There are deliberately no retries.
//!
//! ## Security and privacy notes
//! The API key travels only inside the envelope; it is the caller's job to
//! redact it from any logged representation.

use std::sync::Arc;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use fourgrid_core::HostedLinks;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;
use url::Url;

/// Form field carrying the API key.
pub const FIELD_API_KEY: &str = "key";
/// Form field carrying the base64-encoded image.
pub const FIELD_IMAGE: &str = "image";
/// Form field carrying the artifact file name.
pub const FIELD_NAME: &str = "name";

/// One outbound upload call, fully described.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadEnvelope {
    /// Hosting service upload endpoint.
    pub endpoint: String,
    /// Multipart form fields in send order.
    pub fields: Vec<(String, String)>,
}

impl UploadEnvelope {
    /// Returns the named form field value, if present.
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(field, _)| field == name)
            .map(|(_, value)| value.as_str())
    }
}

/// Raw reply captured by a transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportReply {
    /// HTTP status code reported by the hosting service.
    pub status: u16,
    /// Raw response body.
    pub body: String,
}

/// Parsed hosting service reply body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostingReply {
    /// Whether the hosting service accepted the upload.
    pub success: bool,
    /// Uploaded artifact record.
    pub data: HostingReplyData,
}

/// URL record inside a successful hosting reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostingReplyData {
    /// Browser-facing viewer page URL.
    pub url_viewer: String,
    /// Direct image URL.
    pub url: String,
}

/// Abstract transport used by the hosting client.
pub trait HostingTransport: Send + Sync {
    /// Sends one upload envelope to the hosting service.
    ///
    /// # Errors
    /// Returns [`HostingError::Transport`] when the call cannot complete.
    fn send(&self, envelope: &UploadEnvelope) -> Result<TransportReply, HostingError>;
}

/// Outcome of one publish attempt.
///
/// The submission-level contract: links are complete on success and
/// explicitly absent on failure; `failure` exists for logging only.
#[derive(Debug)]
pub struct PublishOutcome {
    /// URLs to report to the caller.
    pub links: HostedLinks,
    /// Captured failure when the collaborator degraded.
    pub failure: Option<HostingError>,
}

impl PublishOutcome {
    fn degraded(failure: HostingError) -> Self {
        Self {
            links: HostedLinks::absent(),
            failure: Some(failure),
        }
    }
}

/// Hosting client that validates endpoint policy and executes uploads.
#[derive(Clone)]
pub struct HostingClient {
    endpoint: String,
    api_key: String,
    transport: Arc<dyn HostingTransport>,
}

impl HostingClient {
    /// Creates a validated hosting client.
    ///
    /// # Errors
    /// Returns [`HostingError::InvalidEndpoint`] when the URL does not parse
    /// or is not HTTPS.
    /// Returns [`HostingError::MissingApiKey`] for a blank API key.
    pub fn new(
        endpoint: impl Into<String>,
        api_key: impl Into<String>,
        transport: Arc<dyn HostingTransport>,
    ) -> Result<Self, HostingError> {
        let endpoint = endpoint.into();
        validate_hosting_endpoint(&endpoint)?;

        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(HostingError::MissingApiKey);
        }

        Ok(Self {
            endpoint,
            api_key,
            transport,
        })
    }

    /// Builds the upload envelope for one encoded artifact.
    pub fn envelope(&self, image_bytes: &[u8], file_name: &str) -> UploadEnvelope {
        UploadEnvelope {
            endpoint: self.endpoint.clone(),
            fields: vec![
                (FIELD_API_KEY.to_string(), self.api_key.clone()),
                (
                    FIELD_IMAGE.to_string(),
                    BASE64_STANDARD.encode(image_bytes),
                ),
                (FIELD_NAME.to_string(), file_name.to_string()),
            ],
        }
    }

    /// Publishes one encoded artifact to the hosting service.
    ///
    /// # Semantics
    /// Never fails the submission: transport errors, non-2xx statuses, and
    /// malformed or unsuccessful reply bodies all produce a degraded outcome
    /// with both URLs absent. A single attempt is made; there are no retries.
    pub fn publish(&self, image_bytes: &[u8], file_name: &str) -> PublishOutcome {
        let envelope = self.envelope(image_bytes, file_name);

        let reply = match self.transport.send(&envelope) {
            Ok(reply) => reply,
            Err(failure) => return PublishOutcome::degraded(failure),
        };

        if !(200..300).contains(&reply.status) {
            return PublishOutcome::degraded(HostingError::Status(reply.status));
        }

        match parse_reply(&reply.body) {
            Ok(links) => PublishOutcome {
                links,
                failure: None,
            },
            Err(failure) => PublishOutcome::degraded(failure),
        }
    }

    /// Returns the configured upload endpoint.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

/// Validates hosting endpoint constraints.
///
/// # Errors
/// Returns [`HostingError::InvalidEndpoint`] for unparsable or non-HTTPS URLs.
pub fn validate_hosting_endpoint(endpoint: &str) -> Result<(), HostingError> {
    let parsed = Url::parse(endpoint)
        .map_err(|error| HostingError::InvalidEndpoint(format!("invalid hosting url: {error}")))?;

    if parsed.scheme() != "https" {
        return Err(HostingError::InvalidEndpoint(
            "hosting endpoint must use https".to_string(),
        ));
    }

    Ok(())
}

/// Parses a hosting reply body into delivered links.
///
/// # Errors
/// Returns [`HostingError::InvalidReply`] for malformed JSON or a reply the
/// service itself marked unsuccessful.
pub fn parse_reply(body: &str) -> Result<HostedLinks, HostingError> {
    let reply: HostingReply = serde_json::from_str(body)
        .map_err(|error| HostingError::InvalidReply(format!("malformed reply body: {error}")))?;

    if !reply.success {
        return Err(HostingError::InvalidReply(
            "hosting service reported an unsuccessful upload".to_string(),
        ));
    }

    Ok(HostedLinks {
        viewer_url: Some(reply.data.url_viewer),
        direct_url: Some(reply.data.url),
    })
}

/// Computes the hex SHA-256 checksum of an encoded artifact.
pub fn artifact_checksum(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

/// Errors produced by hosting client logic.
#[derive(Debug, Error)]
pub enum HostingError {
    /// Endpoint violates hosting contract requirements.
    #[error("invalid endpoint: {0}")]
    InvalidEndpoint(String),
    /// API key is missing or blank.
    #[error("hosting api key must be non-empty")]
    MissingApiKey,
    /// Transport failure while calling the hosting service.
    #[error("hosting transport failure: {0}")]
    Transport(String),
    /// Hosting service answered with a non-success status.
    #[error("hosting service returned status {0}")]
    Status(u16),
    /// Reply body violated the hosting contract.
    #[error("invalid hosting reply: {0}")]
    InvalidReply(String),
}
