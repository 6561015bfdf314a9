// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Audit artifacts for lifecycle workflow runs.
//!
//! - [`RunLog`]: the append-only, leveled log context a workflow writes every
//!   step outcome to, persisted per run and mirrored to the console
//! - [`MembershipSnapshot`]: the forensic record of an identity's groups
//!   captured before offboarding removes them

pub mod entry;
pub mod error;
pub mod run_log;
pub mod snapshot;

pub use entry::{LogEntry, LogLevel};
pub use error::{AuditError, AuditResult};
pub use run_log::RunLog;
pub use snapshot::MembershipSnapshot;
