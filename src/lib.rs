// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! # rosbag-v2-bridge
//!
//! Read-only bridge replaying ROS1 bag v2.0 files through a ROS2-style
//! storage and deserializer interface.
//!
//! - [`storage::RosbagV2Storage`] opens a bag, keeps the topics whose legacy
//!   type has a target mapping and replays their raw messages in time order
//! - [`serialization::RosbagV2Deserializer`] decodes those raw messages into
//!   introspectable [`DecodedMessage`]s in the target layout
//! - [`mapping::TypeNameMapper`] decides which legacy types are replayable
//!
//! ## Architecture
//!
//! - `io/formats/bag/` - ROS1 bag parser and topic-filtered views
//! - `mapping/` - legacy → target type names
//! - `schema/` - ROS1 `.msg` definition parsing and built-in definitions
//! - `encoding/` - ROS1 wire decoder and the type-support registry
//! - `convert/` - legacy → target message layout
//! - `storage/`, `serialization/` - host-facing plugin interfaces
//!
//! ## Example
//!
//! ```rust,no_run
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use std::sync::Arc;
//! use rosbag_v2_bridge::encoding::TypeSupportRegistry;
//! use rosbag_v2_bridge::serialization::{
//!     RosbagV2Deserializer, SerializationFormatDeserializer, TypeSupport,
//! };
//! use rosbag_v2_bridge::storage::{IoFlag, ReadOnlyStorage, RosbagV2Storage};
//!
//! let mut storage = RosbagV2Storage::new();
//! storage.open("recording.bag", IoFlag::ReadOnly)?;
//!
//! let registry = TypeSupportRegistry::with_builtin()?;
//! registry.register_connections(storage.connections()?)?;
//! let deserializer = RosbagV2Deserializer::new(Arc::new(registry));
//!
//! let topics = storage.get_all_topics_and_types()?;
//! while storage.has_next() {
//!     let raw = storage.read_next()?;
//!     if let Some(topic) = topics.iter().find(|t| t.name == raw.topic_name) {
//!         let msg = deserializer.deserialize(&raw, &TypeSupport::new(&topic.type_name))?;
//!         println!("{} {}", msg.topic_name, msg.time_stamp);
//!     }
//! }
//! # Ok(())
//! # }
//! ```

// Core types
pub mod core;

// Re-export core types for convenience
pub use core::{BridgeError, CodecValue, DecodedMessage, ErrorKind, Result};

// Legacy → target type names
pub mod mapping;

// Schema parsing
pub mod schema;

// Wire decoding and type support
pub mod encoding;

// Message layout conversion
pub mod convert;

// Bag container and metadata
pub mod io;

// Host-facing plugins
pub mod serialization;
pub mod storage;

pub use io::metadata::{BagMetadata, SerializedBagMessage, TopicInformation, TopicMetadata};
pub use mapping::{TypeMappingConfig, TypeNameMapper};
pub use serialization::{
    IntrospectionMessage, RosbagV2Deserializer, SerializationFormatDeserializer, TypeSupport,
};
pub use storage::{IoFlag, ReadOnlyStorage, RosbagV2Storage};
