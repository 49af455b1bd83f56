// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Storage plugin interface and the legacy bag implementation.

pub mod rosbag_v2;

pub use rosbag_v2::RosbagV2Storage;

use crate::core::Result;
use crate::io::metadata::{BagMetadata, SerializedBagMessage, TopicMetadata};

/// How a storage is opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IoFlag {
    ReadOnly,
    ReadWrite,
    Append,
}

/// Sequential, read-only access to a recorded bag.
///
/// A storage is opened once, then replayed front to back with
/// [`has_next`](Self::has_next) / [`read_next`](Self::read_next). Metadata
/// calls may be interleaved with replay and never move the replay cursor.
pub trait ReadOnlyStorage {
    /// Open the bag at `uri`. Only [`IoFlag::ReadOnly`] is accepted.
    fn open(&mut self, uri: &str, flag: IoFlag) -> Result<()>;

    /// Whether another message is available.
    fn has_next(&self) -> bool;

    /// Return the next message and advance.
    fn read_next(&mut self) -> Result<SerializedBagMessage>;

    /// Replayable topics with their target type names.
    fn get_all_topics_and_types(&self) -> Result<Vec<TopicMetadata>>;

    /// Bag-level statistics.
    fn get_metadata(&self) -> Result<BagMetadata>;

    /// Identifier of this storage plugin.
    fn get_storage_identifier(&self) -> &str;

    /// Size of the bag file in bytes.
    fn get_bagfile_size(&self) -> Result<u64>;

    /// File name of the bag, without directories.
    fn get_relative_file_path(&self) -> Result<String>;
}
