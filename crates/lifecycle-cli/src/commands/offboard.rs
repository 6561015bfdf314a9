// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::process::ExitCode;

use chrono::NaiveDate;
use clap::Args;
use lifecycle_audit::RunLog;
use lifecycle_provisioning::OffboardingRequest;
use tracing::instrument;

use crate::context::CliContext;
use crate::output;

#[derive(Debug, Clone, Args)]
pub struct OffboardArgs {
	/// Username of the leaver
	pub username: String,

	/// Forward the leaver's mail to this address, keeping a copy
	#[arg(long)]
	pub forward_to: Option<String>,

	/// Effective date (YYYY-MM-DD); defaults to today
	#[arg(long)]
	pub date: Option<NaiveDate>,

	/// Days until the account expires, overriding the configured value
	#[arg(long)]
	pub retention_days: Option<u32>,
}

impl OffboardArgs {
	fn into_request(self) -> OffboardingRequest {
		let run_date = self
			.date
			.unwrap_or_else(|| chrono::Local::now().date_naive());
		OffboardingRequest {
			username: self.username,
			forward_to: self.forward_to,
			run_date,
			retention_days: self.retention_days,
		}
	}
}

#[instrument(skip_all, fields(username = %args.username))]
pub async fn handle_offboard(args: OffboardArgs, ctx: &CliContext) -> anyhow::Result<ExitCode> {
	let request = args.into_request();

	let mut log = RunLog::create(ctx.log_dir(), "offboard", &request.username).await?;
	let outcome = ctx.offboarding().run(&request, &mut log).await;
	let log_path = log.close().await?;

	match outcome {
		Ok(result) => {
			output::offboarding(&result, ctx)?;
			Ok(ExitCode::SUCCESS)
		}
		Err(e) => {
			output::failure("offboarding", &e, log_path.as_deref(), ctx)?;
			Ok(ExitCode::FAILURE)
		}
	}
}
