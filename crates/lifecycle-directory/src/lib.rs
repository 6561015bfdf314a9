// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Local implementations of the lifecycle client interfaces.
//!
//! - [`LocalDirectory`]: directory, mail and license state in one JSON file
//! - [`FsHomeProvisioner`]: home folders on a mounted share

pub mod home;
pub mod local;

pub use home::FsHomeProvisioner;
pub use local::{DirectoryState, LocalDirectory};
