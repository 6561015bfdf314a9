// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

mod batch;
mod offboard;
mod onboard;

pub use batch::{handle_batch, BatchArgs};
pub use offboard::{handle_offboard, OffboardArgs};
pub use onboard::{handle_onboard, OnboardArgs};
