// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Deserializer plugin interface and the legacy bag implementation.

pub mod rosbag_v2;

pub use rosbag_v2::{split_type_tag, RosbagV2Deserializer};

use serde::Serialize;

use crate::core::{DecodedMessage, Result};
use crate::io::metadata::SerializedBagMessage;

/// Target-side type support handed in by the replay host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeSupport {
    /// Target type name (e.g. `std_msgs/msg/String`)
    pub type_name: String,
}

impl TypeSupport {
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
        }
    }
}

/// A decoded message in the target layout.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IntrospectionMessage {
    pub topic_name: String,
    /// Receive time (ns since epoch)
    pub time_stamp: i64,
    /// Target type name
    pub type_name: String,
    pub message: DecodedMessage,
}

/// Turns serialized bag messages into introspectable messages.
pub trait SerializationFormatDeserializer {
    /// Decode `serialized` using the target `type_support`.
    ///
    /// Failures concern this message only; the deserializer stays usable.
    fn deserialize(
        &self,
        serialized: &SerializedBagMessage,
        type_support: &TypeSupport,
    ) -> Result<IntrospectionMessage>;
}
