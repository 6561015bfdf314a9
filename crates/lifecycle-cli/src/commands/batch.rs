// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Args;
use lifecycle_audit::RunLog;
use lifecycle_provisioning::{read_batch_csv, BatchReport, BatchRunner};
use tracing::instrument;

use crate::context::CliContext;
use crate::output;

/// Exit code when every record of a non-empty batch failed.
pub const ALL_FAILED_EXIT_CODE: u8 = 2;

#[derive(Debug, Clone, Args)]
pub struct BatchArgs {
	/// CSV with header FirstName,LastName,Department,Title,Manager,StartDate
	pub input: PathBuf,
}

#[instrument(skip_all, fields(input = %args.input.display()))]
pub async fn handle_batch(args: BatchArgs, ctx: &CliContext) -> anyhow::Result<ExitCode> {
	let rows = read_batch_csv(&args.input)?;

	let subject = args
		.input
		.file_stem()
		.map(|s| s.to_string_lossy().to_string())
		.unwrap_or_else(|| "input".to_string());
	let mut log = RunLog::create(ctx.log_dir(), "batch", &subject).await?;

	let workflow = ctx.onboarding();
	let report = BatchRunner::new(&workflow, ctx.log_dir())
		.run(rows, &mut log)
		.await;
	let log_path = log.close().await?;

	output::batch(&report, log_path.as_deref(), ctx)?;
	Ok(exit_code(&report))
}

fn exit_code(report: &BatchReport) -> ExitCode {
	if report.all_failed() {
		ExitCode::from(ALL_FAILED_EXIT_CODE)
	} else {
		ExitCode::SUCCESS
	}
}
