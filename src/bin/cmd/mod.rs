// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! CLI subcommands.

mod echo;
mod info;
mod topics;

pub use echo::EchoCmd;
pub use info::InfoCmd;
pub use topics::TopicsCmd;
