// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Deserializer for `<legacy type>\0<ROS1 wire bytes>` payloads.

use std::sync::Arc;

use super::{IntrospectionMessage, SerializationFormatDeserializer, TypeSupport};
use crate::core::{BridgeError, Result};
use crate::encoding::registry::TypeSupportRegistry;
use crate::io::metadata::SerializedBagMessage;
use crate::storage::rosbag_v2::TYPE_TAG_TERMINATOR;

/// Split a tagged payload into the legacy type name and the wire bytes.
///
/// The type name is everything before the first null byte.
pub fn split_type_tag(buffer: &[u8]) -> Result<(&str, &[u8])> {
    let terminator = buffer
        .iter()
        .position(|&b| b == TYPE_TAG_TERMINATOR)
        .ok_or_else(|| {
            BridgeError::format(
                "type tag",
                format!(
                    "no null terminator in {} byte payload; expected `<type>\\0<data>`",
                    buffer.len()
                ),
            )
        })?;
    let type_name = std::str::from_utf8(&buffer[..terminator])
        .map_err(|e| BridgeError::format("type tag", format!("type name is not UTF-8: {e}")))?;
    if type_name.is_empty() {
        return Err(BridgeError::format("type tag", "empty type name"));
    }
    let payload = &buffer[terminator + 1..];
    if payload.is_empty() {
        return Err(BridgeError::format(
            "type tag",
            format!("no message bytes after type tag '{type_name}'"),
        ));
    }
    Ok((type_name, payload))
}

/// Decodes legacy payloads through a [`TypeSupportRegistry`].
#[derive(Clone)]
pub struct RosbagV2Deserializer {
    registry: Arc<TypeSupportRegistry>,
}

impl RosbagV2Deserializer {
    /// Create a deserializer resolving codecs from `registry`.
    pub fn new(registry: Arc<TypeSupportRegistry>) -> Self {
        Self { registry }
    }

    /// Create a deserializer over the built-in definitions only.
    pub fn with_builtin() -> Result<Self> {
        Ok(Self::new(Arc::new(TypeSupportRegistry::with_builtin()?)))
    }

    /// The codec registry.
    pub fn registry(&self) -> &Arc<TypeSupportRegistry> {
        &self.registry
    }
}

impl SerializationFormatDeserializer for RosbagV2Deserializer {
    fn deserialize(
        &self,
        serialized: &SerializedBagMessage,
        type_support: &TypeSupport,
    ) -> Result<IntrospectionMessage> {
        let (legacy_type, payload) = split_type_tag(&serialized.serialized_data)?;
        let codec = self
            .registry
            .get(legacy_type)?
            .ok_or_else(|| BridgeError::type_not_found(legacy_type))?;

        let legacy = codec.decode(payload)?;
        let message = codec.convert_1_to_2(legacy)?;

        Ok(IntrospectionMessage {
            topic_name: serialized.topic_name.clone(),
            time_stamp: serialized.time_stamp,
            type_name: type_support.type_name.clone(),
            message,
        })
    }
}

impl std::fmt::Debug for RosbagV2Deserializer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RosbagV2Deserializer").finish_non_exhaustive()
    }
}
