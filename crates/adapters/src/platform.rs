// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The platform driver: one instance per pipeline, owning VM provisioning,
//! remote execution, and file I/O for that job's lifetime. Grounded on
//! `CCDaemon/Platform/Platform.py`'s `launch`/`run_cc`/`cancel_cc`/
//! `cancel_launch`/`finalize` and the `path_exists`/`cat_file`/`transfer`
//! helpers `ReportWorker.py` and `PipelineRunner.py` call through it.
//!
//! The real driver (VM lifecycle, SSH, cloud CLI shelling) is out of scope;
//! this module defines the contract plus an in-memory fake.

use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

/// The four mandatory config blobs plus optional startup script, already
/// decoded to raw bytes (base64 decoding is `cc-db`'s concern).
#[derive(Debug, Clone)]
pub struct LaunchConfig {
    pub graph: Vec<u8>,
    pub resource_kit: Vec<u8>,
    pub platform: Vec<u8>,
    pub sample_sheet: Vec<u8>,
    pub startup_script: Option<Vec<u8>>,
}

/// Errors from platform operations. Every variant is non-retryable from the
/// caller's point of view: a Runner captures these into its own
/// `err_type`/`err_msg`, never propagating them further.
#[derive(Debug, Error)]
pub enum PlatformError {
    #[error("launch failed: {0}")]
    LaunchFailed(String),
    #[error("remote execution failed: {0}")]
    RunFailed(String),
    #[error("cancel failed: {0}")]
    CancelFailed(String),
    #[error("finalize failed: {0}")]
    FinalizeFailed(String),
    #[error("timed out waiting for a platform handle after {0:?}")]
    HandleTimeout(Duration),
    #[error("file operation failed: {0}")]
    FileIo(String),
}

/// Per-job driver over VM provisioning, remote execution, and file
/// transfer. One is constructed by the Platform Factory for each Runner and
/// lives exactly as long as the Runner does.
#[async_trait]
pub trait PlatformDriver: Send + Sync + 'static {
    /// Provision a VM, upload the config blobs, clone the execution engine
    /// (optionally pinned to `commit_id`), and run the driver's
    /// `preprocess_configs` hook. Blocks until provisioning completes.
    async fn launch(
        &self,
        config: &LaunchConfig,
        commit_id: Option<&str>,
    ) -> Result<(), PlatformError>;

    /// Run the pipeline execution engine on the provisioned VM, blocking
    /// until it exits. Returns captured stdout/stderr.
    async fn run_cc(&self) -> Result<(String, String), PlatformError>;

    /// Send a graceful cancel signal to the running remote process.
    async fn cancel_cc(&self) -> Result<(), PlatformError>;

    /// Cancel an in-flight launch: poll until a platform handle exists then
    /// stop it, bounded by `timeout` (500s in the original).
    async fn cancel_launch(&self, timeout: Duration) -> Result<(), PlatformError>;

    /// Upload the log directory as a final output then destroy the VM.
    /// Must tolerate being called when launch never completed.
    async fn finalize(&self) -> Result<(), PlatformError>;

    /// Does `path` exist on the platform's filesystem?
    async fn path_exists(&self, path: &str) -> Result<bool, PlatformError>;

    async fn mkdir(&self, path: &str) -> Result<(), PlatformError>;

    /// Copy `src` into `dst_dir` on the platform.
    async fn transfer(&self, src: &Path, dst_dir: &str) -> Result<(), PlatformError>;

    async fn upload_file(&self, local: &Path, remote: &str) -> Result<(), PlatformError>;

    /// Read a remote file's bytes (used to parse QC reports).
    async fn cat_file(&self, path: &str) -> Result<Vec<u8>, PlatformError>;

    /// Where this job's final outputs should be copied (set once, before
    /// `launch`).
    fn set_final_output_dir(&self, path: &Path);
}

/// Produces an isolated platform driver per job (the Platform Factory).
#[async_trait]
pub trait PlatformFactory: Send + Sync + 'static {
    type Driver: PlatformDriver;

    async fn build(&self, pipeline_name: &str) -> Result<Self::Driver, PlatformError>;
}

/// Platform driver that does nothing: every provisioning/teardown call
/// succeeds immediately, `path_exists` always reports absent, and reads
/// return empty. The real cloud driver (VM lifecycle, SSH, cloud CLI
/// shelling) is out of scope for this repository; `ccd` is wired to this
/// driver pending a concrete one, matching the adapter module's
/// trait-plus-fake-plus-no-op convention.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpPlatformDriver;

impl NoOpPlatformDriver {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl PlatformDriver for NoOpPlatformDriver {
    async fn launch(&self, _config: &LaunchConfig, _commit_id: Option<&str>) -> Result<(), PlatformError> {
        Ok(())
    }

    async fn run_cc(&self) -> Result<(String, String), PlatformError> {
        Ok((String::new(), String::new()))
    }

    async fn cancel_cc(&self) -> Result<(), PlatformError> {
        Ok(())
    }

    async fn cancel_launch(&self, _timeout: Duration) -> Result<(), PlatformError> {
        Ok(())
    }

    async fn finalize(&self) -> Result<(), PlatformError> {
        Ok(())
    }

    async fn path_exists(&self, _path: &str) -> Result<bool, PlatformError> {
        Ok(false)
    }

    async fn mkdir(&self, _path: &str) -> Result<(), PlatformError> {
        Ok(())
    }

    async fn transfer(&self, _src: &Path, _dst_dir: &str) -> Result<(), PlatformError> {
        Ok(())
    }

    async fn upload_file(&self, _local: &Path, _remote: &str) -> Result<(), PlatformError> {
        Ok(())
    }

    async fn cat_file(&self, _path: &str) -> Result<Vec<u8>, PlatformError> {
        Ok(Vec::new())
    }

    fn set_final_output_dir(&self, _path: &Path) {}
}

/// Factory that hands out [`NoOpPlatformDriver`] instances. Stands in for a
/// real cloud-backed factory until one is built.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpPlatformFactory;

impl NoOpPlatformFactory {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl PlatformFactory for NoOpPlatformFactory {
    type Driver = NoOpPlatformDriver;

    async fn build(&self, _pipeline_name: &str) -> Result<Self::Driver, PlatformError> {
        Ok(NoOpPlatformDriver)
    }
}

#[cfg(any(test, feature = "test-support"))]
mod fake {
    use super::*;
    use parking_lot::Mutex;
    use std::sync::Arc;

    /// Recorded platform call, for assertions in Runner/Worker tests.
    #[derive(Debug, Clone, PartialEq)]
    pub enum PlatformCall {
        Launch { commit_id: Option<String> },
        RunCc,
        CancelCc,
        CancelLaunch,
        Finalize,
        PathExists(String),
        Mkdir(String),
        Transfer { src: PathBuf, dst_dir: String },
        UploadFile { local: PathBuf, remote: String },
        CatFile(String),
        SetFinalOutputDir(PathBuf),
    }

    struct FakeState {
        calls: Vec<PlatformCall>,
        launch_result: Result<(), String>,
        run_cc_result: Result<(String, String), String>,
        cancel_cc_result: Result<(), String>,
        cancel_launch_result: Result<(), String>,
        finalize_result: Result<(), String>,
        existing_paths: Vec<String>,
        file_contents: Vec<(String, Vec<u8>)>,
        final_output_dir: Option<PathBuf>,
    }

    impl Default for FakeState {
        fn default() -> Self {
            Self {
                calls: Vec::new(),
                launch_result: Ok(()),
                run_cc_result: Ok((String::new(), String::new())),
                cancel_cc_result: Ok(()),
                cancel_launch_result: Ok(()),
                finalize_result: Ok(()),
                existing_paths: Vec::new(),
                file_contents: Vec::new(),
                final_output_dir: None,
            }
        }
    }

    /// In-memory `PlatformDriver` fake. Every method records a
    /// [`PlatformCall`] and returns a pre-programmed result, mirroring
    /// `FakeSessionAdapter` from the session adapter.
    #[derive(Clone)]
    pub struct FakePlatformDriver {
        inner: Arc<Mutex<FakeState>>,
    }

    impl Default for FakePlatformDriver {
        fn default() -> Self {
            Self {
                inner: Arc::new(Mutex::new(FakeState::default())),
            }
        }
    }

    impl FakePlatformDriver {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn calls(&self) -> Vec<PlatformCall> {
            self.inner.lock().calls.clone()
        }

        pub fn fail_launch(&self, msg: &str) {
            self.inner.lock().launch_result = Err(msg.to_string());
        }

        pub fn fail_run_cc(&self, msg: &str) {
            self.inner.lock().run_cc_result = Err(msg.to_string());
        }

        pub fn fail_finalize(&self, msg: &str) {
            self.inner.lock().finalize_result = Err(msg.to_string());
        }

        pub fn set_path_exists(&self, path: &str, exists: bool) {
            let mut inner = self.inner.lock();
            inner.existing_paths.retain(|p| p != path);
            if exists {
                inner.existing_paths.push(path.to_string());
            }
        }

        pub fn set_file_contents(&self, path: &str, contents: Vec<u8>) {
            self.inner.lock().file_contents.push((path.to_string(), contents));
        }

        pub fn final_output_dir(&self) -> Option<PathBuf> {
            self.inner.lock().final_output_dir.clone()
        }
    }

    #[async_trait]
    impl PlatformDriver for FakePlatformDriver {
        async fn launch(
            &self,
            _config: &LaunchConfig,
            commit_id: Option<&str>,
        ) -> Result<(), PlatformError> {
            let mut inner = self.inner.lock();
            inner.calls.push(PlatformCall::Launch {
                commit_id: commit_id.map(str::to_string),
            });
            inner.launch_result.clone().map_err(PlatformError::LaunchFailed)
        }

        async fn run_cc(&self) -> Result<(String, String), PlatformError> {
            let mut inner = self.inner.lock();
            inner.calls.push(PlatformCall::RunCc);
            inner.run_cc_result.clone().map_err(PlatformError::RunFailed)
        }

        async fn cancel_cc(&self) -> Result<(), PlatformError> {
            let mut inner = self.inner.lock();
            inner.calls.push(PlatformCall::CancelCc);
            inner.cancel_cc_result.clone().map_err(PlatformError::CancelFailed)
        }

        async fn cancel_launch(&self, _timeout: Duration) -> Result<(), PlatformError> {
            let mut inner = self.inner.lock();
            inner.calls.push(PlatformCall::CancelLaunch);
            inner.cancel_launch_result.clone().map_err(PlatformError::CancelFailed)
        }

        async fn finalize(&self) -> Result<(), PlatformError> {
            let mut inner = self.inner.lock();
            inner.calls.push(PlatformCall::Finalize);
            inner.finalize_result.clone().map_err(PlatformError::FinalizeFailed)
        }

        async fn path_exists(&self, path: &str) -> Result<bool, PlatformError> {
            let mut inner = self.inner.lock();
            inner.calls.push(PlatformCall::PathExists(path.to_string()));
            Ok(inner.existing_paths.iter().any(|p| p == path))
        }

        async fn mkdir(&self, path: &str) -> Result<(), PlatformError> {
            self.inner.lock().calls.push(PlatformCall::Mkdir(path.to_string()));
            Ok(())
        }

        async fn transfer(&self, src: &Path, dst_dir: &str) -> Result<(), PlatformError> {
            self.inner.lock().calls.push(PlatformCall::Transfer {
                src: src.to_path_buf(),
                dst_dir: dst_dir.to_string(),
            });
            Ok(())
        }

        async fn upload_file(&self, local: &Path, remote: &str) -> Result<(), PlatformError> {
            self.inner.lock().calls.push(PlatformCall::UploadFile {
                local: local.to_path_buf(),
                remote: remote.to_string(),
            });
            Ok(())
        }

        async fn cat_file(&self, path: &str) -> Result<Vec<u8>, PlatformError> {
            let mut inner = self.inner.lock();
            inner.calls.push(PlatformCall::CatFile(path.to_string()));
            inner
                .file_contents
                .iter()
                .find(|(p, _)| p == path)
                .map(|(_, bytes)| bytes.clone())
                .ok_or_else(|| PlatformError::FileIo(format!("no such file: {path}")))
        }

        fn set_final_output_dir(&self, path: &Path) {
            let mut inner = self.inner.lock();
            inner.calls.push(PlatformCall::SetFinalOutputDir(path.to_path_buf()));
            inner.final_output_dir = Some(path.to_path_buf());
        }
    }
}

#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakePlatformDriver, PlatformCall};

#[cfg(test)]
#[path = "platform_tests.rs"]
mod tests;
