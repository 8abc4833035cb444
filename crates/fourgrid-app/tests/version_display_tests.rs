//! Tests build-time version propagation from the root VERSION file.

use fourgrid_app::app_version;

#[test]
fn version_display_tests_version_is_nonempty_semverish() {
    let version = app_version();
    assert!(!version.trim().is_empty());
    assert!(version.chars().next().is_some_and(|ch| ch.is_ascii_digit()));
}
