// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Read-only storage over ROS1 bag v2.0 files.
//!
//! Only topics whose legacy type has a target mapping are replayed. Bag-level
//! timing and the total message count still describe the whole file.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::{debug, info};

use super::{IoFlag, ReadOnlyStorage};
use crate::core::{BridgeError, Result};
use crate::io::formats::bag::{Bag, BagView, ConnectionRecord};
use crate::io::metadata::{
    BagMetadata, SerializedBagMessage, TopicInformation, TopicMetadata, METADATA_VERSION,
    STORAGE_IDENTIFIER,
};
use crate::mapping::TypeNameMapper;

/// Separator between the legacy type name and the wire bytes of a payload.
pub const TYPE_TAG_TERMINATOR: u8 = 0;

struct OpenBag {
    bag: Arc<Bag>,
    /// Mapped topics, first-seen order
    topics: Vec<String>,
    view: BagView,
    cursor: usize,
}

/// Storage plugin reading legacy ROS1 bags.
pub struct RosbagV2Storage {
    mapper: Arc<TypeNameMapper>,
    state: Option<OpenBag>,
}

impl RosbagV2Storage {
    /// Create a closed storage using the built-in type mapping.
    pub fn new() -> Self {
        Self::with_mapper(Arc::new(TypeNameMapper::builtin()))
    }

    /// Create a closed storage using `mapper` to decide which topics replay.
    pub fn with_mapper(mapper: Arc<TypeNameMapper>) -> Self {
        Self {
            mapper,
            state: None,
        }
    }

    /// Whether `open` has succeeded.
    pub fn is_open(&self) -> bool {
        self.state.is_some()
    }

    /// Every connection of the bag, mapped or not, ordered by id.
    pub fn connections(&self) -> Result<&[ConnectionRecord]> {
        Ok(self.open_bag()?.bag.connections())
    }

    /// Replayable topics with their message counts.
    ///
    /// Each count comes from its own topic-scoped view.
    pub fn get_topic_information(&self) -> Result<Vec<TopicInformation>> {
        let state = self.open_bag()?;
        let topics = self.get_all_topics_and_types()?;
        Ok(topics
            .into_iter()
            .map(|topic_metadata| {
                let scope = [topic_metadata.name.clone()];
                let view = BagView::new(Arc::clone(&state.bag), Some(&scope));
                TopicInformation {
                    topic_metadata,
                    message_count: view.size() as u64,
                }
            })
            .collect())
    }

    fn open_bag(&self) -> Result<&OpenBag> {
        self.state.as_ref().ok_or(BridgeError::NotOpen)
    }

    /// Topics with at least one mapped connection, in connection order. The
    /// first mapped connection of a topic decides its type.
    fn mapped_topics(&self, bag: &Bag) -> Vec<TopicMetadata> {
        let mut seen = HashSet::new();
        bag.connections()
            .iter()
            .filter_map(|c| self.mapper.map(&c.legacy_type).map(|target| (c, target)))
            .filter(|(c, _)| seen.insert(c.topic.as_str()))
            .map(|(c, target)| TopicMetadata::new(c.topic.clone(), target))
            .collect()
    }
}

impl Default for RosbagV2Storage {
    fn default() -> Self {
        Self::new()
    }
}

impl ReadOnlyStorage for RosbagV2Storage {
    fn open(&mut self, uri: &str, flag: IoFlag) -> Result<()> {
        if flag != IoFlag::ReadOnly {
            return Err(BridgeError::configuration(format!(
                "{STORAGE_IDENTIFIER} storage only supports read-only access, got {flag:?}"
            )));
        }

        let bag = Arc::new(Bag::open(uri)?);

        for connection in bag.connections() {
            if !self.mapper.is_mapped(&connection.legacy_type) {
                info!(
                    topic = %connection.topic,
                    legacy_type = %connection.legacy_type,
                    "no target type for legacy message type; topic will not be replayed"
                );
            }
        }

        let topics: Vec<String> = self
            .mapped_topics(&bag)
            .into_iter()
            .map(|t| t.name)
            .collect();
        let view = BagView::new(Arc::clone(&bag), Some(&topics));
        debug!(
            uri,
            topics = topics.len(),
            messages = view.size(),
            "opened {STORAGE_IDENTIFIER} storage"
        );

        self.state = Some(OpenBag {
            bag,
            topics,
            view,
            cursor: 0,
        });
        Ok(())
    }

    fn has_next(&self) -> bool {
        self.state
            .as_ref()
            .is_some_and(|s| s.cursor < s.view.size())
    }

    fn read_next(&mut self) -> Result<SerializedBagMessage> {
        let state = self.state.as_mut().ok_or(BridgeError::NotOpen)?;
        if state.cursor >= state.view.size() {
            return Err(BridgeError::EndOfStream);
        }
        let index = state.cursor;
        // Advance first so an unreadable record is skipped on the next call
        state.cursor += 1;
        let message = state.view.message_at(index)?;

        let mut serialized_data =
            Vec::with_capacity(message.legacy_type.len() + 1 + message.data.len());
        serialized_data.extend_from_slice(message.legacy_type.as_bytes());
        serialized_data.push(TYPE_TAG_TERMINATOR);
        serialized_data.extend_from_slice(&message.data);

        Ok(SerializedBagMessage {
            topic_name: message.topic,
            time_stamp: message.time as i64,
            serialized_data,
        })
    }

    fn get_all_topics_and_types(&self) -> Result<Vec<TopicMetadata>> {
        let state = self.open_bag()?;
        Ok(self.mapped_topics(&state.bag))
    }

    fn get_metadata(&self) -> Result<BagMetadata> {
        let state = self.open_bag()?;
        let full = BagView::new(Arc::clone(&state.bag), None);
        let starting_time = full.begin_time().unwrap_or(0);
        let duration = full
            .end_time()
            .map_or(0, |end| end.saturating_sub(starting_time));

        Ok(BagMetadata {
            version: METADATA_VERSION,
            storage_identifier: STORAGE_IDENTIFIER.to_string(),
            bag_size: self.get_bagfile_size()?,
            relative_file_paths: vec![self.get_relative_file_path()?],
            duration,
            starting_time,
            message_count: full.size() as u64,
            topics_with_message_count: self.get_topic_information()?,
        })
    }

    fn get_storage_identifier(&self) -> &str {
        STORAGE_IDENTIFIER
    }

    fn get_bagfile_size(&self) -> Result<u64> {
        Ok(self.open_bag()?.bag.file_size())
    }

    fn get_relative_file_path(&self) -> Result<String> {
        let path = self.open_bag()?.bag.path();
        Ok(path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.to_string_lossy().into_owned()))
    }
}

impl std::fmt::Debug for RosbagV2Storage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut s = f.debug_struct("RosbagV2Storage");
        if let Some(state) = &self.state {
            s.field("bag", &state.bag.path())
                .field("topics", &state.topics)
                .field("cursor", &state.cursor);
        }
        s.finish()
    }
}
