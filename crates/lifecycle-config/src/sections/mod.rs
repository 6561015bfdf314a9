// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Configuration sections.

mod directory;
mod logging;
mod offboarding;
mod paths;
mod shares;
mod tenant;

pub use directory::{DirectoryConfig, DirectoryConfigLayer};
pub use logging::{LoggingConfig, LoggingConfigLayer};
pub use offboarding::{OffboardingConfig, OffboardingConfigLayer, DEFAULT_ACCOUNT_EXPIRY_DAYS};
pub use paths::{PathsConfig, PathsConfigLayer};
pub use shares::{SharesConfig, SharesConfigLayer};
pub use tenant::{TenantConfig, TenantConfigLayer, DEFAULT_LICENSE_PROPAGATION_DELAY_SECS};
