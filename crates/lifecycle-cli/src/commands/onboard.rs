// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::process::ExitCode;

use chrono::NaiveDate;
use clap::Args;
use lifecycle_audit::RunLog;
use lifecycle_core::{derive_username, EmployeeRecord};
use tracing::instrument;

use crate::context::CliContext;
use crate::output;

#[derive(Debug, Clone, Args)]
pub struct OnboardArgs {
	#[arg(long)]
	pub first_name: String,

	#[arg(long)]
	pub last_name: String,

	/// Department; selects the role template
	#[arg(long)]
	pub department: String,

	#[arg(long, default_value = "")]
	pub title: String,

	#[arg(long)]
	pub manager: Option<String>,

	/// First working day (YYYY-MM-DD)
	#[arg(long)]
	pub start_date: Option<NaiveDate>,
}

impl OnboardArgs {
	fn into_record(self) -> EmployeeRecord {
		EmployeeRecord {
			first_name: self.first_name,
			last_name: self.last_name,
			department: self.department,
			title: self.title,
			manager: self.manager,
			start_date: self.start_date,
		}
	}
}

#[instrument(skip_all, fields(department = %args.department))]
pub async fn handle_onboard(args: OnboardArgs, ctx: &CliContext) -> anyhow::Result<ExitCode> {
	let record = args.into_record();
	let subject = derive_username(&record.first_name, &record.last_name)
		.unwrap_or_else(|_| "invalid".to_string());

	let mut log = RunLog::create(ctx.log_dir(), "onboard", &subject).await?;
	let outcome = ctx.onboarding().run(&record, &mut log).await;
	let log_path = log.close().await?;

	match outcome {
		Ok(result) => {
			output::onboarding(&result, ctx)?;
			Ok(ExitCode::SUCCESS)
		}
		Err(e) => {
			output::failure("onboarding", &e, log_path.as_deref(), ctx)?;
			Ok(ExitCode::FAILURE)
		}
	}
}
