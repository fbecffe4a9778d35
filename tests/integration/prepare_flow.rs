//! Tests for the generic startup flow, which locates the configured
//! executable if available, suggests installing it if missing, and checks
//! for updates if present. This flow never installs anything either.

use crate::common::Harness;
use std::sync::Arc;


#[tokio::test]
async fn prepare_with_no_executable_offers_install() {
    let mut h = Harness::new().await;
    h.mock_release().await;
    h.ui().configure_executable("/definitely/missing/tool");

    let status = Arc::clone(&h.updater).prepare(true).await;
    status.background.await.unwrap();

    assert_eq!(status.executable_path, None);
    assert_eq!(h.ui().events(), vec!["prompt_install"]);
}

#[tokio::test]
async fn prepare_with_unknown_bare_name_offers_install() {
    let mut h = Harness::new().await;
    h.mock_release().await;
    h.ui().configure_executable("binup-test-no-such-tool");

    let status = Arc::clone(&h.updater).prepare(true).await;
    status.background.await.unwrap();

    assert_eq!(status.executable_path, None);
    assert_eq!(h.ui().events(), vec!["prompt_install"]);
}

#[tokio::test]
async fn prepare_missing_executable_and_no_asset_shows_help() {
    let mut h = Harness::new().await;
    h.mock_incompatible_release().await;
    h.ui().configure_executable("/definitely/missing/tool");

    let status = Arc::clone(&h.updater).prepare(true).await;
    status.background.await.unwrap();

    assert_eq!(status.executable_path, None);
    assert_eq!(h.ui().events(), vec!["show_help"]);
}

#[tokio::test]
async fn prepare_missing_executable_and_registry_down_shows_help() {
    let mut h = Harness::new().await;
    h.mock_registry_down().await;
    h.ui().configure_executable("/definitely/missing/tool");

    let status = Arc::clone(&h.updater).prepare(true).await;
    status.background.await.unwrap();

    assert_eq!(status.executable_path, None);
    assert_eq!(h.ui().events(), vec!["show_help"]);
}

#[cfg(unix)]
#[tokio::test]
async fn prepare_with_old_executable_prompts_update() {
    let mut h = Harness::new().await;
    h.mock_release().await;
    let exe = crate::common::fake_executable(h.storage.path(), "tool version 5.0.0");
    h.ui().configure_executable(exe.display().to_string());

    let status = Arc::clone(&h.updater).prepare(true).await;
    status.background.await.unwrap();

    assert_eq!(status.executable_path, Some(exe));
    assert_eq!(h.ui().events(), vec!["prompt_update"]);
}

#[cfg(unix)]
#[tokio::test]
async fn prepare_with_updates_disabled_is_silent() {
    let mut h = Harness::new().await;
    h.mock_release().await;
    let exe = crate::common::fake_executable(h.storage.path(), "tool version 5.0.0");
    h.ui().configure_executable(exe.display().to_string());

    let status = Arc::clone(&h.updater).prepare(false).await;
    status.background.await.unwrap();

    assert_eq!(status.executable_path, Some(exe));
    assert_eq!(h.ui().events(), Vec::<&str>::new());
}

#[cfg(unix)]
#[tokio::test]
async fn prepare_with_current_executable_is_silent() {
    let mut h = Harness::new().await;
    h.mock_release().await;
    let exe = crate::common::fake_executable(h.storage.path(), "tool version 15.0.0");
    h.ui().configure_executable(exe.display().to_string());

    let status = Arc::clone(&h.updater).prepare(true).await;
    status.background.await.unwrap();

    // Unsolicited check: no "up to date" chatter.
    assert_eq!(h.ui().events(), Vec::<&str>::new());
}

#[cfg(unix)]
#[tokio::test]
async fn prepare_with_unversioned_executable_is_silent() {
    let mut h = Harness::new().await;
    h.mock_release().await;
    let exe = crate::common::fake_executable(h.storage.path(), "some custom build");
    h.ui().configure_executable(exe.display().to_string());

    let status = Arc::clone(&h.updater).prepare(true).await;
    status.background.await.unwrap();

    // The check cannot determine a version, and nobody asked: stay quiet.
    assert_eq!(status.executable_path, Some(exe));
    assert_eq!(h.ui().events(), Vec::<&str>::new());
}

#[cfg(unix)]
#[tokio::test]
async fn prepare_with_old_executable_and_registry_down_is_silent() {
    let mut h = Harness::new().await;
    h.mock_registry_down().await;
    let exe = crate::common::fake_executable(h.storage.path(), "tool version 5.0.0");
    h.ui().configure_executable(exe.display().to_string());

    let status = Arc::clone(&h.updater).prepare(true).await;
    status.background.await.unwrap();

    assert_eq!(status.executable_path, Some(exe));
    assert_eq!(h.ui().events(), Vec::<&str>::new());
}
