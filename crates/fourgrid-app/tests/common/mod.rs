//! Shared fixtures for app integration tests.

use std::sync::Arc;

use fourgrid_app::{AppConfig, DeliveryMode};
use fourgrid_compose::watermark::WatermarkConfig;
use fourgrid_core::{IMAGE_FIELD_NAME, LayoutConfig, UploadedPart};
use fourgrid_hosting::{
    HostingClient, HostingError, HostingTransport, TransportReply, UploadEnvelope,
};
use image::{Rgba, RgbaImage};

/// Encodes one solid-color PNG for use as an uploaded picture.
#[allow(dead_code)]
pub fn encoded_solid_png(width: u32, height: u32, rgb: [u8; 3]) -> Vec<u8> {
    let bitmap = RgbaImage::from_pixel(width, height, Rgba([rgb[0], rgb[1], rgb[2], 255]));
    let mut cursor = std::io::Cursor::new(Vec::new());
    image::DynamicImage::ImageRgba8(bitmap)
        .write_to(&mut cursor, image::ImageFormat::Png)
        .expect("png fixture should encode");
    cursor.into_inner()
}

/// Creates a deterministic four-picture submission with distinct colors.
#[allow(dead_code)]
pub fn fixture_parts() -> Vec<UploadedPart> {
    let colors = [[255, 0, 0], [0, 255, 0], [0, 0, 255], [255, 255, 0]];
    colors
        .into_iter()
        .enumerate()
        .map(|(index, rgb)| {
            UploadedPart::new(
                IMAGE_FIELD_NAME,
                format!("photo_{index}.png"),
                encoded_solid_png(12 + index as u32, 9, rgb),
            )
        })
        .collect()
}

/// Creates a small attachment-mode config with an isolated staging dir.
#[allow(dead_code)]
pub fn test_config(tag: &str) -> AppConfig {
    AppConfig {
        staging_dir: std::env::temp_dir().join(format!("fourgrid-{tag}-{}", std::process::id())),
        layout: LayoutConfig::new(128, 4).expect("test layout should build"),
        watermark: WatermarkConfig {
            text: "fg".to_string(),
            font_size: 16,
            margin: 10,
            color: [64, 64, 64],
            preferred_font: None,
        },
        delivery: DeliveryMode::Attachment,
        jpeg_quality: 85,
        include_image_data: false,
        hosting_endpoint: "https://api.host.example.test/1/upload".to_string(),
        hosting_api_key: Some("test-key".to_string()),
    }
}

/// Replays one canned reply; `None` behaves as a transport failure.
#[allow(dead_code)]
pub struct CannedHostingTransport {
    pub reply: Option<TransportReply>,
}

impl HostingTransport for CannedHostingTransport {
    fn send(&self, _envelope: &UploadEnvelope) -> Result<TransportReply, HostingError> {
        self.reply
            .clone()
            .ok_or_else(|| HostingError::Transport("connection refused".to_string()))
    }
}

/// Builds a hosting client around one canned reply.
#[allow(dead_code)]
pub fn hosting_client(reply: Option<TransportReply>) -> HostingClient {
    HostingClient::new(
        "https://api.host.example.test/1/upload",
        "test-key",
        Arc::new(CannedHostingTransport { reply }),
    )
    .expect("hosting client should build")
}

/// Canned successful hosting reply with both URLs present.
#[allow(dead_code)]
pub fn success_reply() -> TransportReply {
    TransportReply {
        status: 200,
        body: serde_json::json!({
            "success": true,
            "data": {
                "url_viewer": "https://host.example.test/v/abc",
                "url": "https://cdn.example.test/abc.jpg",
            }
        })
        .to_string(),
    }
}
