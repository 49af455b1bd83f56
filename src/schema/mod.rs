// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Schema parsing for ROS1 `.msg` definitions.

pub mod ast;
pub mod builtin_types;
pub mod parser;

pub use ast::{Constant, Field, FieldType, MessageSchema, MessageType, PrimitiveType};
pub use parser::{msg_parser, parse_schema};
