//! Benchmark smoke test for the deterministic compose/encode/checksum loop.

use std::time::Instant;

use fourgrid_compose::watermark::WatermarkConfig;
use fourgrid_compose::{DEFAULT_JPEG_QUALITY, compose_collage, encode_jpeg};
use fourgrid_core::{LayoutConfig, SourceImage};
use fourgrid_hosting::artifact_checksum;

#[test]
fn benchmark_pipeline_smoke_prints_latency() {
    let mut sources = Vec::new();
    for index in 0..4_u8 {
        sources.push(
            SourceImage::new(64, 64, vec![index; 64 * 64 * 4]).expect("source should be valid"),
        );
    }

    let layout = LayoutConfig::new(256, 8).expect("layout should build");
    let watermark = WatermarkConfig::default();

    let start = Instant::now();
    let mut checksum_lengths = 0usize;

    for _ in 0..100 {
        let collage = compose_collage(&sources, &layout, &watermark).expect("collage should compose");
        let encoded = encode_jpeg(&collage, DEFAULT_JPEG_QUALITY).expect("encode should succeed");
        checksum_lengths += artifact_checksum(&encoded).len();
    }

    let elapsed_ms = start.elapsed().as_millis();
    println!("benchmark_pipeline_elapsed_ms={elapsed_ms}");
    println!("benchmark_checksum_total_len={checksum_lengths}");

    // This is a lightweight guardrail; strict NFR checks are environment-specific.
    assert!(
        elapsed_ms < 10_000,
        "pipeline smoke benchmark should stay bounded"
    );
}
