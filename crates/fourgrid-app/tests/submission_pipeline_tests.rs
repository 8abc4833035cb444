//! Integration tests for the attachment delivery pipeline.

mod common;

use fourgrid_app::{CollageOutcome, handle_submission, init_staging_dir};

#[test]
fn submission_pipeline_tests_attachment_bytes_decode_to_canvas_size() {
    let config = common::test_config("pipeline-attachment");
    init_staging_dir(&config.staging_dir).expect("staging dir should initialize");

    let outcome = handle_submission(&common::fixture_parts(), &config, None)
        .expect("submission should succeed");

    let attachment = match outcome {
        CollageOutcome::Attachment(attachment) => attachment,
        other => panic!("attachment mode should yield attachment outcome, got {other:?}"),
    };

    assert_eq!(attachment.file_name, "collage.jpg");
    assert_eq!(attachment.content_type, "image/jpeg");
    assert_eq!(
        attachment.content_disposition(),
        "attachment; filename=\"collage.jpg\""
    );

    let decoded =
        image::load_from_memory(&attachment.bytes).expect("attachment bytes should decode");
    assert_eq!(decoded.width(), config.layout.canvas_size());
    assert_eq!(decoded.height(), config.layout.canvas_size());
}

#[test]
fn submission_pipeline_tests_stages_inputs_per_index() {
    let config = common::test_config("pipeline-staging");
    init_staging_dir(&config.staging_dir).expect("staging dir should initialize");

    let parts = common::fixture_parts();
    handle_submission(&parts, &config, None).expect("submission should succeed");

    for (index, part) in parts.iter().enumerate() {
        let staged = config.staging_dir.join(format!("image_{index}.jpg"));
        let bytes = std::fs::read(&staged).expect("staged file should exist");
        assert_eq!(bytes, part.bytes);
    }
}

#[test]
fn submission_pipeline_tests_undecodable_input_fails_whole_submission() {
    let config = common::test_config("pipeline-decode");
    init_staging_dir(&config.staging_dir).expect("staging dir should initialize");

    let mut parts = common::fixture_parts();
    parts[2].bytes = b"not an image at all".to_vec();

    let error = handle_submission(&parts, &config, None)
        .expect_err("undecodable input should fail the submission");
    assert!(error.is_client_error());
}
