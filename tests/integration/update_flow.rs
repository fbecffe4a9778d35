//! Tests for the update check, typically the host's "check for updates"
//! command. This flow never installs anything; hosts call `install_latest`
//! from the update prompt.

#![cfg(unix)]

use crate::common::{Harness, fake_executable};

#[tokio::test]
async fn update_from_5_to_10_prompts() {
    let mut h = Harness::new().await;
    h.mock_release().await;
    let exe = fake_executable(h.storage.path(), "tool version 5.0.0");
    h.ui().configure_executable(exe.display().to_string());

    h.updater.check_updates(true).await;

    assert_eq!(h.ui().events(), vec!["prompt_update"]);
}

#[tokio::test]
async fn upgrade_prompts_even_when_not_requested() {
    let mut h = Harness::new().await;
    h.mock_release().await;
    let exe = fake_executable(h.storage.path(), "tool version 5.0.0");
    h.ui().configure_executable(exe.display().to_string());

    h.updater.check_updates(false).await;

    assert_eq!(h.ui().events(), vec!["prompt_update"]);
}

#[tokio::test]
async fn update_from_15_to_10_reports_up_to_date_when_requested() {
    let mut h = Harness::new().await;
    h.mock_release().await;
    let exe = fake_executable(h.storage.path(), "tool version 15.0.0");
    h.ui().configure_executable(exe.display().to_string());

    h.updater.check_updates(true).await;

    assert_eq!(h.ui().events(), vec!["info"]);
}

#[tokio::test]
async fn up_to_date_is_silent_when_not_requested() {
    let mut h = Harness::new().await;
    h.mock_release().await;
    let exe = fake_executable(h.storage.path(), "tool version 15.0.0");
    h.ui().configure_executable(exe.display().to_string());

    h.updater.check_updates(false).await;

    assert_eq!(h.ui().events(), Vec::<&str>::new());
}

#[tokio::test]
async fn equal_versions_are_not_an_upgrade() {
    let mut h = Harness::new().await;
    h.mock_release().await;
    let exe = fake_executable(h.storage.path(), "tool version 10.0.0");
    h.ui().configure_executable(exe.display().to_string());

    h.updater.check_updates(true).await;

    assert_eq!(h.ui().events(), vec!["info"]);
}

#[tokio::test]
async fn vendor_version_cannot_be_compared() {
    let mut h = Harness::new().await;
    h.mock_release().await;
    let exe = fake_executable(h.storage.path(), "Vendor tool version 5.0.0");
    h.ui().configure_executable(exe.display().to_string());

    h.updater.check_updates(true).await;

    // "Cannot determine" is an error-class event, not a silent "no upgrade".
    assert_eq!(h.ui().events(), vec!["error"]);
}

#[tokio::test]
async fn check_failure_is_silent_when_not_requested() {
    let mut h = Harness::new().await;
    h.mock_registry_down().await;
    let exe = fake_executable(h.storage.path(), "tool version 5.0.0");
    h.ui().configure_executable(exe.display().to_string());

    h.updater.check_updates(false).await;

    assert_eq!(h.ui().events(), Vec::<&str>::new());
}

#[tokio::test]
async fn check_failure_is_reported_when_requested() {
    let mut h = Harness::new().await;
    h.mock_registry_down().await;
    let exe = fake_executable(h.storage.path(), "tool version 5.0.0");
    h.ui().configure_executable(exe.display().to_string());

    h.updater.check_updates(true).await;

    assert_eq!(h.ui().events(), vec!["error"]);
}

#[tokio::test]
async fn no_compatible_asset_fails_the_check() {
    let mut h = Harness::new().await;
    h.mock_incompatible_release().await;
    let exe = fake_executable(h.storage.path(), "tool version 5.0.0");
    h.ui().configure_executable(exe.display().to_string());

    h.updater.check_updates(true).await;

    assert_eq!(h.ui().events(), vec!["error"]);
}
