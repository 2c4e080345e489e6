// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//
//! Action implementations

pub mod completions;
pub mod deps;
pub mod exec;
pub mod link;
