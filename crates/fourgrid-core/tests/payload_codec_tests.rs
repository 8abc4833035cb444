//! Tests response payload serialization and deserialization stability.

use fourgrid_core::{CollageResponsePayload, HostedLinks, SCHEMA_VERSION_V1};

#[test]
fn payload_codec_tests_round_trip_json() {
    let payload = CollageResponsePayload {
        schema_version: SCHEMA_VERSION_V1.to_string(),
        links: HostedLinks {
            viewer_url: Some("https://host.example.test/v/abc".to_string()),
            direct_url: Some("https://cdn.example.test/abc.jpg".to_string()),
        },
        width: 1280,
        height: 1280,
        content_type: "image/jpeg".to_string(),
        checksum: "ab".repeat(32),
        image_base64: Some("aGVsbG8=".to_string()),
    };

    let encoded = payload.to_json_bytes().expect("encoding should succeed");
    let decoded =
        CollageResponsePayload::from_json_bytes(&encoded).expect("decoding should succeed");
    assert_eq!(decoded, payload);
}

#[test]
fn payload_codec_tests_degraded_links_serialize_as_null() {
    let payload = CollageResponsePayload {
        schema_version: SCHEMA_VERSION_V1.to_string(),
        links: HostedLinks::absent(),
        width: 1280,
        height: 1280,
        content_type: "image/jpeg".to_string(),
        checksum: "00".repeat(32),
        image_base64: None,
    };

    let encoded = payload.to_json_bytes().expect("encoding should succeed");
    let value: serde_json::Value =
        serde_json::from_slice(&encoded).expect("payload should be valid JSON");
    assert!(value["links"]["viewer_url"].is_null());
    assert!(value["links"]["direct_url"].is_null());
    assert!(!payload.links.is_complete());
}
