// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Schema parser implementations.

pub mod msg_parser;

use crate::core::Result;
use crate::schema::MessageSchema;

/// Parse a ROS1 message definition.
///
/// # Arguments
///
/// * `name` - Full legacy type name of the root message (e.g. `std_msgs/String`)
/// * `definition` - Definition text, optionally with `MSG:` dependency blocks
pub fn parse_schema(name: &str, definition: &str) -> Result<MessageSchema> {
    msg_parser::parse(name, definition)
}
