// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Approval event definitions, log queries and the historical scanner

mod definitions;
mod filter;
mod scanner;

pub use definitions::{Approval, ApprovalEvent, IERC20};
pub use filter::{ApprovalFilterBuilder, ApprovalQuery};
pub use scanner::{ApprovalScanner, ScanOutcome, ScanReport, ScanStrategy};
