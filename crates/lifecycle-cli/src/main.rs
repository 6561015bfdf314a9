// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! `lifecycle` - onboard and offboard employee identities.

mod commands;
mod context;
mod output;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::{BatchArgs, OffboardArgs, OnboardArgs};
use context::CliContext;

/// Employee identity lifecycle tools.
#[derive(Parser, Debug)]
#[command(name = "lifecycle", version)]
struct Args {
	/// Configuration file (defaults to ./lifecycle.toml when present)
	#[arg(long, global = true, env = "LIFECYCLE_CONFIG")]
	config: Option<PathBuf>,

	/// Local directory state file, overriding `paths.state_file`
	#[arg(long, global = true)]
	state: Option<PathBuf>,

	/// Print results as JSON
	#[arg(long, global = true)]
	json: bool,

	/// Include generated temporary passwords in the output
	#[arg(long, global = true)]
	reveal_password: bool,

	#[command(subcommand)]
	command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
	/// Onboard a single new hire
	Onboard(OnboardArgs),
	/// Offboard a leaver
	Offboard(OffboardArgs),
	/// Onboard every row of a CSV file
	Batch(BatchArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
	let args = Args::parse();

	let config = context::load_config(args.config.as_deref())?;

	tracing_subscriber::fmt()
		.with_env_filter(
			EnvFilter::try_from_default_env()
				.unwrap_or_else(|_| EnvFilter::new(&config.logging.level)),
		)
		.with_writer(std::io::stderr)
		.init();

	let ctx = CliContext::new(config, args.state, args.json, args.reveal_password).await?;

	match args.command {
		Command::Onboard(onboard) => commands::handle_onboard(onboard, &ctx).await,
		Command::Offboard(offboard) => commands::handle_offboard(offboard, &ctx).await,
		Command::Batch(batch) => commands::handle_batch(batch, &ctx).await,
	}
}
