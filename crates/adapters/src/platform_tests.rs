// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::path::Path;
use std::time::Duration;

use super::*;

fn config() -> LaunchConfig {
    LaunchConfig {
        graph: b"g".to_vec(),
        resource_kit: b"r".to_vec(),
        platform: b"p".to_vec(),
        sample_sheet: b"s".to_vec(),
        startup_script: None,
    }
}

#[tokio::test]
async fn records_launch_call_with_commit_id() {
    let driver = FakePlatformDriver::new();
    driver.launch(&config(), Some("abc123")).await.unwrap();
    assert_eq!(
        driver.calls(),
        vec![PlatformCall::Launch {
            commit_id: Some("abc123".to_string())
        }]
    );
}

#[tokio::test]
async fn launch_failure_surfaces_as_platform_error() {
    let driver = FakePlatformDriver::new();
    driver.fail_launch("quota exceeded");
    let err = driver.launch(&config(), None).await.unwrap_err();
    assert!(matches!(err, PlatformError::LaunchFailed(msg) if msg == "quota exceeded"));
}

#[tokio::test]
async fn path_exists_reflects_programmed_state() {
    let driver = FakePlatformDriver::new();
    assert!(!driver.path_exists("/out/result.txt").await.unwrap());
    driver.set_path_exists("/out/result.txt", true);
    assert!(driver.path_exists("/out/result.txt").await.unwrap());
}

#[tokio::test]
async fn cat_file_returns_programmed_contents() {
    let driver = FakePlatformDriver::new();
    driver.set_file_contents("/out/qc.json", b"{}".to_vec());
    let bytes = driver.cat_file("/out/qc.json").await.unwrap();
    assert_eq!(bytes, b"{}");
}

#[tokio::test]
async fn cat_file_errors_for_unknown_path() {
    let driver = FakePlatformDriver::new();
    let err = driver.cat_file("/missing").await.unwrap_err();
    assert!(matches!(err, PlatformError::FileIo(_)));
}

#[tokio::test]
async fn set_final_output_dir_is_recorded_and_stored() {
    let driver = FakePlatformDriver::new();
    driver.set_final_output_dir(Path::new("/final/123"));
    assert_eq!(
        driver.final_output_dir(),
        Some(Path::new("/final/123").to_path_buf())
    );
}

#[tokio::test]
async fn cancel_launch_accepts_a_timeout_bound() {
    let driver = FakePlatformDriver::new();
    driver.cancel_launch(Duration::from_secs(500)).await.unwrap();
    assert_eq!(driver.calls(), vec![PlatformCall::CancelLaunch]);
}

#[tokio::test]
async fn noop_driver_never_finds_a_path_and_never_fails() {
    let driver = NoOpPlatformDriver::new();
    driver.launch(&config(), Some("abc123")).await.unwrap();
    assert!(!driver.path_exists("/anything").await.unwrap());
    driver.cancel_cc().await.unwrap();
    driver.finalize().await.unwrap();
}

#[tokio::test]
async fn noop_factory_builds_noop_drivers() {
    let factory = NoOpPlatformFactory::new();
    let driver = factory.build("pipeline-1").await.unwrap();
    assert!(driver.run_cc().await.unwrap().0.is_empty());
}
