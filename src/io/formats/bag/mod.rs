// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! ROS1 bag v2.0 container.
//!
//! [`Bag`] owns the memory-mapped file and its index; [`BagView`] projects it
//! onto an optional topic set and iterates messages in time order.

// Parser utilities
pub mod parser;

// Topic-filtered, time-ordered projection
pub mod view;

use std::path::Path;
use std::sync::{Arc, Mutex};

use tracing::debug;

use crate::core::{BridgeError, Result};

pub use parser::{BagChunkInfo, BagHeader, BagParser, ConnectionRecord, IndexEntry};
pub use view::{BagView, BagViewIter};

/// One message read from a bag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BagMessage {
    /// Connection ID
    pub connection_id: u32,
    /// Topic name
    pub topic: String,
    /// Legacy message type of the connection
    pub legacy_type: String,
    /// Receive time (ns)
    pub time: u64,
    /// ROS1 wire bytes
    pub data: Vec<u8>,
}

/// An open, indexed bag file.
pub struct Bag {
    parser: BagParser,
    /// Last decompressed chunk; sequential reads hit the same chunk repeatedly
    chunk_cache: Mutex<Option<(usize, Arc<Vec<u8>>)>>,
}

impl Bag {
    /// Open a bag and read its index.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let parser = BagParser::open(path)?;
        debug!(
            path = %parser.path().display(),
            connections = parser.connections().len(),
            chunks = parser.chunks().len(),
            messages = parser.index().len(),
            "opened bag"
        );
        Ok(Self {
            parser,
            chunk_cache: Mutex::new(None),
        })
    }

    /// All connections, ordered by connection id.
    pub fn connections(&self) -> &[ConnectionRecord] {
        self.parser.connections()
    }

    /// Look up a connection by id.
    pub fn connection(&self, id: u32) -> Option<&ConnectionRecord> {
        self.parser
            .connections()
            .binary_search_by_key(&id, |c| c.id)
            .ok()
            .map(|i| &self.parser.connections()[i])
    }

    /// Time-ordered index over every message in the bag.
    pub fn index(&self) -> &[IndexEntry] {
        self.parser.index()
    }

    /// Chunk information.
    pub fn chunks(&self) -> &[BagChunkInfo] {
        self.parser.chunks()
    }

    /// Header of the bag file.
    pub fn header(&self) -> &BagHeader {
        self.parser.header()
    }

    /// Size of the file in bytes.
    pub fn file_size(&self) -> u64 {
        self.parser.file_size()
    }

    /// Path the bag was opened from.
    pub fn path(&self) -> &Path {
        self.parser.path()
    }

    /// Read the message an index entry points at.
    pub fn read_message(&self, entry: &IndexEntry) -> Result<BagMessage> {
        let chunk = self.chunk_data(entry.chunk)?;
        let (conn_id, time, data) = parser::message_record(&chunk, entry.offset as usize)?;
        if conn_id != entry.conn_id {
            return Err(BridgeError::container(
                "message data",
                format!(
                    "index points at a record of connection {conn_id}, expected {}",
                    entry.conn_id
                ),
            ));
        }
        let connection = self.connection(conn_id).ok_or_else(|| {
            BridgeError::container("message data", format!("unknown connection {conn_id}"))
        })?;
        Ok(BagMessage {
            connection_id: conn_id,
            topic: connection.topic.clone(),
            legacy_type: connection.legacy_type.clone(),
            // The index time and the record time agree in well-formed bags
            time: if time == 0 { entry.time } else { time },
            data: data.to_vec(),
        })
    }

    fn chunk_data(&self, chunk_idx: usize) -> Result<Arc<Vec<u8>>> {
        let mut cache = self
            .chunk_cache
            .lock()
            .map_err(|_| BridgeError::Other("chunk cache lock poisoned".to_string()))?;
        if let Some((idx, data)) = cache.as_ref() {
            if *idx == chunk_idx {
                return Ok(Arc::clone(data));
            }
        }
        let data = Arc::new(self.parser.read_chunk(chunk_idx)?);
        *cache = Some((chunk_idx, Arc::clone(&data)));
        Ok(data)
    }
}

impl std::fmt::Debug for Bag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Bag")
            .field("path", &self.path())
            .field("connections", &self.connections().len())
            .field("messages", &self.index().len())
            .finish()
    }
}
