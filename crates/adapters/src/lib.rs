// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
// Enable coverage(off) attribute for excluding test infrastructure
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Adapters for external collaborators: the cloud platform driver, the
//! report bus, and the email notifier. Everything in this crate is an
//! interface plus an in-memory fake; the real cloud/SMTP/message-bus
//! implementations are out of scope.

pub mod email;
pub mod platform;
pub mod report_source;

pub use email::{EmailError, EmailNotifier, SmtpEmailNotifier};
pub use platform::{
    LaunchConfig, NoOpPlatformDriver, NoOpPlatformFactory, PlatformDriver, PlatformError,
    PlatformFactory,
};
pub use report_source::{
    parse_report, IncomingReport, NoOpReportSource, ReportFile, ReportSource, ReportSourceError,
};

#[cfg(any(test, feature = "test-support"))]
pub use email::FakeEmailNotifier;
#[cfg(any(test, feature = "test-support"))]
pub use platform::{FakePlatformDriver, PlatformCall};
#[cfg(any(test, feature = "test-support"))]
pub use report_source::FakeReportSource;
