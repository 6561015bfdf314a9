// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Result rendering for the terminal.
//!
//! Results go to stdout; diagnostics go to stderr through `tracing`.

use std::fmt::Write as _;
use std::path::Path;

use lifecycle_provisioning::{
	BatchOutcome, BatchReport, OffboardingResult, OnboardingResult, ProvisioningError, StepStatus,
};
use serde_json::{json, Value};

use crate::context::CliContext;

pub fn onboarding(result: &OnboardingResult, ctx: &CliContext) -> anyhow::Result<()> {
	if ctx.json {
		println!(
			"{}",
			serde_json::to_string_pretty(&onboarding_json(result, ctx.reveal_password)?)?
		);
	} else {
		print!("{}", render_onboarding(result, ctx.reveal_password));
	}
	Ok(())
}

pub fn offboarding(result: &OffboardingResult, ctx: &CliContext) -> anyhow::Result<()> {
	if ctx.json {
		println!("{}", serde_json::to_string_pretty(result)?);
	} else {
		print!("{}", render_offboarding(result));
	}
	Ok(())
}

pub fn batch(report: &BatchReport, log_path: Option<&Path>, ctx: &CliContext) -> anyhow::Result<()> {
	if ctx.json {
		let mut value = serde_json::to_value(report)?;
		if ctx.reveal_password {
			reveal_batch_passwords(&mut value, report);
		}
		if let Some(path) = log_path {
			value["log_path"] = json!(path);
		}
		println!("{}", serde_json::to_string_pretty(&value)?);
	} else {
		print!("{}", render_batch(report, log_path, ctx.reveal_password));
	}
	Ok(())
}

pub fn failure(
	kind: &str,
	err: &ProvisioningError,
	log_path: Option<&Path>,
	ctx: &CliContext,
) -> anyhow::Result<()> {
	if ctx.json {
		let value = json!({
			"status": "aborted",
			"workflow": kind,
			"error": err.to_string(),
			"log_path": log_path,
		});
		println!("{}", serde_json::to_string_pretty(&value)?);
	} else {
		eprintln!("{kind} aborted: {err}");
		if let Some(path) = log_path {
			eprintln!("  log: {}", path.display());
		}
	}
	Ok(())
}

fn onboarding_json(result: &OnboardingResult, reveal: bool) -> serde_json::Result<Value> {
	let mut value = serde_json::to_value(result)?;
	if reveal {
		value["temporary_password"] = json!(result.temporary_password.expose());
	}
	Ok(value)
}

fn reveal_batch_passwords(value: &mut Value, report: &BatchReport) {
	for (i, entry) in report.entries.iter().enumerate() {
		if let BatchOutcome::Succeeded(result) = &entry.outcome {
			value["entries"][i]["outcome"]["temporary_password"] =
				json!(result.temporary_password.expose());
		}
	}
}

fn render_onboarding(result: &OnboardingResult, reveal: bool) -> String {
	let mut out = String::new();
	let _ = writeln!(out, "Onboarded {} ({})", result.display_name, result.status);
	let _ = writeln!(out, "  username:   {}", result.username);
	let _ = writeln!(out, "  principal:  {}", result.principal_name);
	let _ = writeln!(out, "  email:      {}", result.email);
	let _ = writeln!(out, "  department: {}", result.department);
	if !result.title.is_empty() {
		let _ = writeln!(out, "  title:      {}", result.title);
	}
	if let Some(manager) = &result.manager {
		let _ = writeln!(out, "  manager:    {manager}");
	}
	if let Some(date) = result.start_date {
		let _ = writeln!(out, "  starts:     {date}");
	}
	if let Some(home) = &result.home_directory {
		let _ = writeln!(out, "  home:       {}", home.display());
	}
	let _ = writeln!(
		out,
		"  groups:     {} assigned, {} failed",
		result.groups_assigned.len(),
		result.groups_failed.len()
	);
	for group in &result.groups_failed {
		let _ = writeln!(out, "    failed: {group}");
	}
	match (&result.license_sku, result.license_assigned) {
		(Some(sku), true) => {
			let _ = writeln!(out, "  license:    {sku}");
		}
		(Some(sku), false) => {
			let _ = writeln!(out, "  license:    {sku} (not assigned)");
		}
		(None, _) => {}
	}
	if !result.channels.is_empty() || !result.sites.is_empty() {
		let _ = writeln!(
			out,
			"  to add manually: {}",
			result
				.channels
				.iter()
				.chain(&result.sites)
				.cloned()
				.collect::<Vec<_>>()
				.join(", ")
		);
	}
	write_steps(&mut out, &result.steps);
	if reveal {
		let _ = writeln!(
			out,
			"  temporary password: {}",
			result.temporary_password.expose()
		);
	}
	if let Some(path) = &result.log_path {
		let _ = writeln!(out, "  log: {}", path.display());
	}
	out
}

fn render_offboarding(result: &OffboardingResult) -> String {
	let mut out = String::new();
	let _ = writeln!(out, "Offboarded {} ({})", result.display_name, result.status);
	let _ = writeln!(out, "  username:  {}", result.username);
	let _ = writeln!(
		out,
		"  groups:    {} removed, {} failed, {} kept",
		result.groups_removed.len(),
		result.groups_failed.len(),
		result.groups_kept.len()
	);
	if let Some(date) = result.expires_on {
		let _ = writeln!(out, "  expires:   {date}");
	}
	if let Some(ou) = &result.moved_to {
		let _ = writeln!(out, "  moved to:  {ou}");
	}
	if let Some(target) = &result.forwarded_to {
		let _ = writeln!(out, "  forwarded: {target}");
	}
	if let Some(path) = &result.archive_path {
		let _ = writeln!(out, "  archive:   {}", path.display());
	}
	write_steps(&mut out, &result.steps);
	if let Some(path) = &result.snapshot_path {
		let _ = writeln!(out, "  snapshot: {}", path.display());
	}
	if let Some(path) = &result.log_path {
		let _ = writeln!(out, "  log: {}", path.display());
	}
	out
}

fn render_batch(report: &BatchReport, log_path: Option<&Path>, reveal: bool) -> String {
	let mut out = String::new();
	for entry in &report.entries {
		match &entry.outcome {
			BatchOutcome::Succeeded(result) => {
				let _ = write!(
					out,
					"row {:>3}  ok      {} <{}> ({})",
					entry.row, result.username, result.email, result.status
				);
				if reveal {
					let _ = write!(out, " password: {}", result.temporary_password.expose());
				}
				out.push('\n');
			}
			BatchOutcome::Failed { error } => {
				let _ = writeln!(out, "row {:>3}  FAILED  {}: {error}", entry.row, entry.subject);
			}
		}
	}
	let _ = writeln!(
		out,
		"{} records: {} succeeded, {} failed",
		report.total(),
		report.succeeded,
		report.failed
	);
	if let Some(path) = log_path {
		let _ = writeln!(out, "log: {}", path.display());
	}
	out
}

/// Only steps that did not fully succeed are listed.
fn write_steps(out: &mut String, steps: &[lifecycle_provisioning::StepOutcome]) {
	for step in steps
		.iter()
		.filter(|s| matches!(s.status, StepStatus::Partial | StepStatus::Failed))
	{
		let _ = writeln!(
			out,
			"  ! {} {}: {}",
			step.step,
			step.status,
			step.detail.as_deref().unwrap_or("")
		);
	}
}
