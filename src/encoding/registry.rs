// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Type-support registry: legacy type name → codec.
//!
//! The deserializer looks up a [`LegacyCodec`] by the type name embedded in
//! each payload. The default codec is schema-driven ([`SchemaCodec`]): it
//! parses the ROS1 definition text once and walks it for every message.
//! Definitions come from the built-in table or from a bag's connection
//! records.

use std::sync::Arc;

use tracing::{debug, warn};

use super::ros1::Ros1Decoder;
use crate::convert::convert_1_to_2;
use crate::core::{DecodedMessage, Result, TypeRegistry};
use crate::io::formats::bag::ConnectionRecord;
use crate::schema::{builtin_types, parse_schema, MessageSchema};

/// Decoder for one legacy message type.
pub trait LegacyCodec: Send + Sync {
    /// Legacy type this codec handles (e.g. `std_msgs/String`).
    fn legacy_type(&self) -> &str;

    /// Decode ROS1 wire bytes into the legacy layout.
    fn decode(&self, payload: &[u8]) -> Result<DecodedMessage>;

    /// Reshape a legacy-layout message into the target layout.
    fn convert_1_to_2(&self, message: DecodedMessage) -> Result<DecodedMessage>;
}

/// Codec backed by a parsed ROS1 message definition.
pub struct SchemaCodec {
    schema: MessageSchema,
    decoder: Ros1Decoder,
}

impl SchemaCodec {
    /// Parse `definition` as the full definition of `legacy_type`.
    pub fn from_definition(legacy_type: &str, definition: &str) -> Result<Self> {
        Ok(Self {
            schema: parse_schema(legacy_type, definition)?,
            decoder: Ros1Decoder::new(),
        })
    }

    /// The parsed schema.
    pub fn schema(&self) -> &MessageSchema {
        &self.schema
    }
}

impl LegacyCodec for SchemaCodec {
    fn legacy_type(&self) -> &str {
        &self.schema.name
    }

    fn decode(&self, payload: &[u8]) -> Result<DecodedMessage> {
        self.decoder.decode(&self.schema, payload)
    }

    fn convert_1_to_2(&self, message: DecodedMessage) -> Result<DecodedMessage> {
        convert_1_to_2(&self.schema, message)
    }
}

/// Registry of codecs keyed by legacy type name.
///
/// Safe for concurrent reads; registration takes a short write lock.
#[derive(Default)]
pub struct TypeSupportRegistry {
    codecs: TypeRegistry<Arc<dyn LegacyCodec>>,
}

impl TypeSupportRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry preloaded with the built-in definitions.
    pub fn with_builtin() -> Result<Self> {
        let registry = Self::new();
        for name in builtin_types::builtin_type_names() {
            if let Some(definition) = builtin_types::builtin_definition(name) {
                registry.register_definition(name, &definition)?;
            }
        }
        Ok(registry)
    }

    /// Register a codec, replacing any previous one for the same type.
    pub fn register(&self, codec: Arc<dyn LegacyCodec>) -> Result<()> {
        self.codecs.register(codec.legacy_type().to_string(), codec)
    }

    /// Parse and register a ROS1 definition.
    pub fn register_definition(&self, legacy_type: &str, definition: &str) -> Result<()> {
        let codec = SchemaCodec::from_definition(legacy_type, definition)?;
        self.register(Arc::new(codec))
    }

    /// Register the definitions carried by a bag's connection records.
    ///
    /// Definitions found in the bag take precedence over built-ins since they
    /// describe exactly what was recorded. Connections without a definition,
    /// or whose definition does not parse, are skipped with a warning. Types
    /// without fields (`std_msgs/Empty`) have empty payloads, which never get
    /// past the type tag check, so they are not registered either.
    /// Returns the number of types registered.
    pub fn register_connections(&self, connections: &[ConnectionRecord]) -> Result<usize> {
        let mut registered = 0;
        let mut seen = std::collections::HashSet::new();
        for conn in connections {
            if !seen.insert(conn.legacy_type.as_str()) {
                continue;
            }
            if conn.message_definition.trim().is_empty() {
                debug!(
                    topic = %conn.topic,
                    legacy_type = %conn.legacy_type,
                    "connection carries no message definition"
                );
                continue;
            }
            match SchemaCodec::from_definition(&conn.legacy_type, &conn.message_definition) {
                Ok(codec) => {
                    self.register(Arc::new(codec))?;
                    registered += 1;
                }
                Err(e) => {
                    warn!(
                        topic = %conn.topic,
                        legacy_type = %conn.legacy_type,
                        error = %e,
                        "skipping unparsable message definition"
                    );
                }
            }
        }
        Ok(registered)
    }

    /// Look up the codec for a legacy type.
    pub fn get(&self, legacy_type: &str) -> Result<Option<Arc<dyn LegacyCodec>>> {
        self.codecs.get(legacy_type)
    }

    /// Check if a codec is registered for a legacy type.
    pub fn contains(&self, legacy_type: &str) -> Result<bool> {
        self.codecs.contains(legacy_type)
    }

    /// All registered legacy type names, sorted.
    pub fn type_names(&self) -> Result<Vec<String>> {
        self.codecs.names()
    }
}
