// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Message decoding.
//!
//! - [`ros1`] - ROS1 wire format cursor and schema-driven decoder
//! - [`registry`] - type-support registry mapping legacy type names to codecs

pub mod registry;
pub mod ros1;

pub use registry::{LegacyCodec, SchemaCodec, TypeSupportRegistry};
pub use ros1::Ros1Decoder;
