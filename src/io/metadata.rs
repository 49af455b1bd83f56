// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Bag-level metadata handed to the replay host.

use serde::Serialize;

/// Serialization format reported for every topic of a legacy bag.
pub const SERIALIZATION_FORMAT: &str = "rosbag_v2";

/// Storage identifier of the legacy bag plugin.
pub const STORAGE_IDENTIFIER: &str = "rosbag_v2";

/// Metadata version reported for legacy bags.
pub const METADATA_VERSION: u32 = 2;

/// A replayable topic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TopicMetadata {
    /// Topic name (e.g., "/joint_states")
    pub name: String,
    /// Target message type (e.g., "sensor_msgs/msg/JointState")
    #[serde(rename = "type")]
    pub type_name: String,
    /// Always [`SERIALIZATION_FORMAT`]
    pub serialization_format: String,
}

impl TopicMetadata {
    /// Create metadata for a topic carried in a legacy bag.
    pub fn new(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
            serialization_format: SERIALIZATION_FORMAT.to_string(),
        }
    }
}

/// A replayable topic and its message count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TopicInformation {
    pub topic_metadata: TopicMetadata,
    pub message_count: u64,
}

/// Bag-level statistics.
///
/// Timing and `message_count` cover every message in the file, mapped or
/// not; `topics_with_message_count` lists only replayable topics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BagMetadata {
    pub version: u32,
    pub storage_identifier: String,
    /// File size in bytes
    pub bag_size: u64,
    pub relative_file_paths: Vec<String>,
    /// End time minus start time (ns)
    pub duration: u64,
    /// Time of the first message (ns since epoch)
    pub starting_time: u64,
    pub message_count: u64,
    pub topics_with_message_count: Vec<TopicInformation>,
}

/// A raw message as read from storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SerializedBagMessage {
    pub topic_name: String,
    /// Receive time (ns since epoch)
    pub time_stamp: i64,
    /// `<legacy type>\0<ROS1 wire bytes>`
    pub serialized_data: Vec<u8>,
}
