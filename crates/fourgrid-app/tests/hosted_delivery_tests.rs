//! Integration tests for hosted delivery and collaborator degradation.

mod common;

use fourgrid_app::{CollageOutcome, DeliveryMode, handle_submission, init_staging_dir};
use fourgrid_core::SCHEMA_VERSION_V1;

#[test]
fn hosted_delivery_tests_success_reports_both_urls() {
    let mut config = common::test_config("hosted-success");
    config.delivery = DeliveryMode::Hosted;
    config.include_image_data = true;
    init_staging_dir(&config.staging_dir).expect("staging dir should initialize");

    let client = common::hosting_client(Some(common::success_reply()));
    let outcome = handle_submission(&common::fixture_parts(), &config, Some(&client))
        .expect("submission should succeed");

    let (payload, hosting_failure) = match outcome {
        CollageOutcome::Hosted {
            payload,
            hosting_failure,
        } => (payload, hosting_failure),
        other => panic!("hosted mode should yield hosted outcome, got {other:?}"),
    };

    assert!(hosting_failure.is_none());
    assert_eq!(payload.schema_version, SCHEMA_VERSION_V1);
    assert!(payload.links.is_complete());
    assert_eq!(
        payload.links.viewer_url.as_deref(),
        Some("https://host.example.test/v/abc")
    );
    assert_eq!(payload.width, config.layout.canvas_size());
    assert_eq!(payload.height, config.layout.canvas_size());
    assert_eq!(payload.checksum.len(), 64);
    assert!(payload.image_base64.is_some());
}

#[test]
fn hosted_delivery_tests_collaborator_failure_degrades_without_error() {
    let mut config = common::test_config("hosted-degraded");
    config.delivery = DeliveryMode::Hosted;
    init_staging_dir(&config.staging_dir).expect("staging dir should initialize");

    let client = common::hosting_client(None);
    let outcome = handle_submission(&common::fixture_parts(), &config, Some(&client))
        .expect("collaborator failure must not fail the submission");

    match outcome {
        CollageOutcome::Hosted {
            payload,
            hosting_failure,
        } => {
            assert!(payload.links.viewer_url.is_none());
            assert!(payload.links.direct_url.is_none());
            assert!(hosting_failure.is_some());
            assert!(payload.image_base64.is_none());
        }
        other => panic!("hosted mode should yield hosted outcome, got {other:?}"),
    }
}

#[test]
fn hosted_delivery_tests_hosted_mode_without_client_is_config_error() {
    let mut config = common::test_config("hosted-noclient");
    config.delivery = DeliveryMode::Hosted;
    init_staging_dir(&config.staging_dir).expect("staging dir should initialize");

    let error = handle_submission(&common::fixture_parts(), &config, None)
        .expect_err("hosted delivery without a client should be a config error");
    assert!(!error.is_client_error());
}
