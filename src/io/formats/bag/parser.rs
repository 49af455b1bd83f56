// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! ROS1 bag v2.0 parser.
//!
//! Reads an indexed bag through a memory map:
//! 1. the bag header record, to locate the index section
//! 2. the connection and chunk info records of the index section
//! 3. the index data records that follow every chunk, giving the time and
//!    in-chunk offset of each message
//!
//! # BAG Format Structure (Version 2.0)
//!
//! ## File Header
//! - Magic: "#ROSBAG V2.0\n" (13 bytes)
//! - Followed by bag header record in standard record format
//!
//! ## Record Format
//! All records follow: `<header_len: u32><header><data_len: u32><data>`
//! where header contains `<field_len: u32><field_name>=<field_value>` pairs
//!
//! ## Op Codes
//! - 0x02: Message data
//! - 0x03: Bag header
//! - 0x04: Index data
//! - 0x05: Chunk
//! - 0x06: Chunk info
//! - 0x07: Connection

use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use byteorder::{ByteOrder, LittleEndian};

use crate::core::{BridgeError, Result};

/// BAG op codes
pub(crate) const OP_MSG_DATA: u8 = 0x02;
pub(crate) const OP_BAG_HEADER: u8 = 0x03;
pub(crate) const OP_INDEX_DATA: u8 = 0x04;
pub(crate) const OP_CHUNK: u8 = 0x05;
pub(crate) const OP_CHUNK_INFO: u8 = 0x06;
pub(crate) const OP_CONNECTION: u8 = 0x07;

const MAGIC: &[u8] = b"#ROSBAG V";
const SUPPORTED_VERSION: &str = "2.0";

/// BAG file header information.
#[derive(Debug, Clone)]
pub struct BagHeader {
    /// Version string (e.g., "2.0")
    pub version: String,
    /// Position of index section in file
    pub index_pos: u64,
    /// Number of connections in the file
    pub conn_count: u32,
    /// Number of chunks in the file
    pub chunk_count: u32,
}

/// BAG chunk information for random access.
#[derive(Debug, Clone)]
pub struct BagChunkInfo {
    /// Offset of chunk record in file (position of header_len)
    pub chunk_pos: u64,
    /// Start time of messages in this chunk (ns)
    pub start_time: u64,
    /// End time of messages in this chunk (ns)
    pub end_time: u64,
    /// Message count per connection id
    pub connection_counts: Vec<(u32, u32)>,
    /// Compression format ("none", "bz2", "lz4"), read from the chunk record
    pub compression: String,
    /// Uncompressed data size
    pub uncompressed_size: u32,
}

impl BagChunkInfo {
    /// Total number of messages in this chunk.
    pub fn message_count(&self) -> u64 {
        self.connection_counts.iter().map(|(_, n)| *n as u64).sum()
    }
}

/// One connection record of the bag index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionRecord {
    /// Connection ID
    pub id: u32,
    /// Topic name
    pub topic: String,
    /// Legacy message type (e.g. `std_msgs/String`)
    pub legacy_type: String,
    /// MD5 sum of message definition
    pub md5sum: String,
    /// Full message definition text, with `MSG:` dependency blocks
    pub message_definition: String,
    /// Caller ID (publishing node)
    pub caller_id: String,
}

/// Location of one message in the bag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexEntry {
    /// Receive time (ns)
    pub time: u64,
    /// Connection ID
    pub conn_id: u32,
    /// Index into [`BagParser::chunks`]
    pub chunk: usize,
    /// Offset of the message record within the uncompressed chunk data
    pub offset: u32,
}

/// Parsed fields from a BAG record header
#[derive(Debug, Default)]
pub(crate) struct RecordHeader {
    pub op: Option<u8>,
    pub conn: Option<u32>,
    pub time: Option<u64>,
    pub topic: Option<String>,
    pub md5sum: Option<String>,
    pub message_type: Option<String>,
    pub message_definition: Option<String>,
    pub callerid: Option<String>,
    pub index_pos: Option<u64>,
    pub conn_count: Option<u32>,
    pub chunk_count: Option<u32>,
    pub chunk_pos: Option<u64>,
    pub start_time: Option<u64>,
    pub end_time: Option<u64>,
    pub compression: Option<String>,
    pub size: Option<u32>,
    pub ver: Option<u32>,
    pub count: Option<u32>,
}

/// One record borrowed from a buffer.
pub(crate) struct Record<'a> {
    pub header: RecordHeader,
    pub data: &'a [u8],
    /// Position just past the record
    pub end: usize,
}

/// Indexed ROS1 bag.
pub struct BagParser {
    path: PathBuf,
    header: BagHeader,
    chunks: Vec<BagChunkInfo>,
    /// Sorted by connection id
    connections: Vec<ConnectionRecord>,
    /// Sorted by (time, chunk, offset)
    index: Vec<IndexEntry>,
    mmap: memmap2::Mmap,
    file_size: u64,
}

impl BagParser {
    /// Open a BAG file and read its index.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let context = || format!("open {}", path.display());

        let file = File::open(&path).map_err(|e| BridgeError::io(context(), e.to_string()))?;
        let file_size = file
            .metadata()
            .map_err(|e| BridgeError::io(context(), e.to_string()))?
            .len();

        // SAFETY: the map is read-only and lives as long as the parser; bags
        // are not expected to be modified while open.
        let mmap = unsafe { memmap2::Mmap::map(&file) }
            .map_err(|e| BridgeError::io(context(), format!("failed to mmap file: {e}")))?;

        let (version, header_pos) = Self::parse_magic(&mmap)?;
        let header = Self::parse_bag_header_record(&mmap, header_pos, version)?;

        if header.index_pos == 0 {
            return Err(BridgeError::container(
                "bag header",
                "bag is not indexed (index_pos = 0); run `rosbag reindex` on it first",
            ));
        }
        if header.index_pos >= mmap.len() as u64 {
            return Err(BridgeError::container(
                "bag header",
                format!(
                    "index position {} is past the end of the file ({} bytes); the bag is truncated",
                    header.index_pos,
                    mmap.len()
                ),
            ));
        }

        let (connections, mut chunks) = Self::parse_index_section(&mmap, &header)?;
        let mut index = Vec::new();
        for (i, chunk) in chunks.iter_mut().enumerate() {
            Self::read_chunk_index(&mmap, i, chunk, &mut index)?;
        }
        index.sort_by_key(|e| (e.time, e.chunk, e.offset));

        Ok(Self {
            path,
            header,
            chunks,
            connections,
            index,
            mmap,
            file_size,
        })
    }

    /// Parse the BAG magic string; returns the version and the position after it.
    fn parse_magic(buf: &[u8]) -> Result<(String, usize)> {
        if buf.len() < MAGIC.len() || &buf[..MAGIC.len()] != MAGIC {
            return Err(BridgeError::container(
                "magic",
                "not a ROS bag (missing '#ROSBAG V' magic)",
            ));
        }
        let rest = &buf[MAGIC.len()..];
        let newline = rest.iter().position(|&b| b == b'\n').ok_or_else(|| {
            BridgeError::container("magic", "unterminated version line")
        })?;
        let version = String::from_utf8_lossy(&rest[..newline]).trim().to_string();
        if version != SUPPORTED_VERSION {
            return Err(BridgeError::container(
                "magic",
                format!("unsupported bag version {version}, expected {SUPPORTED_VERSION}"),
            ));
        }
        Ok((version, MAGIC.len() + newline + 1))
    }

    /// Parse the bag header record (first record after magic).
    fn parse_bag_header_record(buf: &[u8], pos: usize, version: String) -> Result<BagHeader> {
        let record = read_record(buf, pos, "bag header")?;
        if record.header.op != Some(OP_BAG_HEADER) {
            return Err(BridgeError::container(
                "bag header",
                format!(
                    "expected bag header record (op=0x03), got op={:?}",
                    record.header.op
                ),
            ));
        }
        Ok(BagHeader {
            version,
            index_pos: record.header.index_pos.unwrap_or(0),
            conn_count: record.header.conn_count.unwrap_or(0),
            chunk_count: record.header.chunk_count.unwrap_or(0),
        })
    }

    /// Parse the index section: `conn_count` connection records, then
    /// `chunk_count` chunk info records.
    fn parse_index_section(
        buf: &[u8],
        header: &BagHeader,
    ) -> Result<(Vec<ConnectionRecord>, Vec<BagChunkInfo>)> {
        let mut pos = header.index_pos as usize;
        let mut connections = Vec::with_capacity(header.conn_count as usize);
        let mut chunks = Vec::with_capacity(header.chunk_count as usize);

        while connections.len() < header.conn_count as usize
            || chunks.len() < header.chunk_count as usize
        {
            let record = read_record(buf, pos, "index section")?;
            pos = record.end;
            match record.header.op {
                Some(OP_CONNECTION) => {
                    connections.push(Self::connection_from_record(&record)?);
                }
                Some(OP_CHUNK_INFO) => {
                    chunks.push(Self::chunk_info_from_record(&record)?);
                }
                other => {
                    return Err(BridgeError::container(
                        "index section",
                        format!("unexpected record op={other:?} at {pos}"),
                    ));
                }
            }
        }

        connections.sort_by_key(|c| c.id);
        connections.dedup_by_key(|c| c.id);
        chunks.sort_by_key(|c| c.chunk_pos);
        Ok((connections, chunks))
    }

    /// Create a ConnectionRecord from a connection record.
    fn connection_from_record(record: &Record) -> Result<ConnectionRecord> {
        let missing = |field: &str| {
            BridgeError::container("connection record", format!("missing '{field}' field"))
        };
        // type, md5sum, message_definition live in the data section, which
        // uses the same field=value encoding as record headers
        let data = parse_record_header(record.data)?;
        Ok(ConnectionRecord {
            id: record.header.conn.ok_or_else(|| missing("conn"))?,
            topic: record.header.topic.clone().ok_or_else(|| missing("topic"))?,
            legacy_type: data.message_type.ok_or_else(|| missing("type"))?,
            md5sum: data.md5sum.unwrap_or_default(),
            message_definition: data.message_definition.unwrap_or_default(),
            caller_id: data.callerid.unwrap_or_default(),
        })
    }

    /// Create a BagChunkInfo from a chunk info record.
    ///
    /// Data section: `count` pairs of (conn: u32, message count: u32).
    fn chunk_info_from_record(record: &Record) -> Result<BagChunkInfo> {
        let chunk_pos = record.header.chunk_pos.ok_or_else(|| {
            BridgeError::container("chunk info record", "missing 'chunk_pos' field")
        })?;
        let count = record.header.count.unwrap_or(0) as usize;
        if record.data.len() < count * 8 {
            return Err(BridgeError::container(
                "chunk info record",
                format!("{count} connection counts need {} bytes, got {}", count * 8, record.data.len()),
            ));
        }
        let connection_counts = record
            .data
            .chunks_exact(8)
            .take(count)
            .map(|pair| (LittleEndian::read_u32(&pair[..4]), LittleEndian::read_u32(&pair[4..])))
            .collect();

        Ok(BagChunkInfo {
            chunk_pos,
            start_time: record.header.start_time.unwrap_or(0),
            end_time: record.header.end_time.unwrap_or(0),
            connection_counts,
            compression: String::new(),
            uncompressed_size: 0,
        })
    }

    /// Read the chunk record header and the index data records after it.
    fn read_chunk_index(
        buf: &[u8],
        chunk_idx: usize,
        chunk: &mut BagChunkInfo,
        index: &mut Vec<IndexEntry>,
    ) -> Result<()> {
        let record = read_record(buf, chunk.chunk_pos as usize, "chunk")?;
        if record.header.op != Some(OP_CHUNK) {
            return Err(BridgeError::container(
                "chunk",
                format!(
                    "expected chunk record (op=0x05) at {}, got op={:?}",
                    chunk.chunk_pos, record.header.op
                ),
            ));
        }
        chunk.compression = record
            .header
            .compression
            .clone()
            .unwrap_or_else(|| "none".to_string());
        chunk.uncompressed_size = record.header.size.unwrap_or(record.data.len() as u32);

        // One index data record per connection present in the chunk
        let mut pos = record.end;
        for _ in 0..chunk.connection_counts.len() {
            let idx = read_record(buf, pos, "index data")?;
            pos = idx.end;
            if idx.header.op != Some(OP_INDEX_DATA) {
                return Err(BridgeError::container(
                    "index data",
                    format!("expected index data record (op=0x04), got op={:?}", idx.header.op),
                ));
            }
            if idx.header.ver != Some(1) {
                return Err(BridgeError::container(
                    "index data",
                    format!("unsupported index data version {:?}", idx.header.ver),
                ));
            }
            let conn_id = idx
                .header
                .conn
                .ok_or_else(|| BridgeError::container("index data", "missing 'conn' field"))?;
            let count = idx.header.count.unwrap_or(0) as usize;
            if idx.data.len() < count * 12 {
                return Err(BridgeError::container(
                    "index data",
                    format!("{count} entries need {} bytes, got {}", count * 12, idx.data.len()),
                ));
            }
            for entry in idx.data.chunks_exact(12).take(count) {
                index.push(IndexEntry {
                    time: ros_time_ns(&entry[..8]),
                    conn_id,
                    chunk: chunk_idx,
                    offset: LittleEndian::read_u32(&entry[8..12]),
                });
            }
        }
        Ok(())
    }

    /// Get chunk information.
    pub fn chunks(&self) -> &[BagChunkInfo] {
        &self.chunks
    }

    /// Get connections, ordered by connection id.
    pub fn connections(&self) -> &[ConnectionRecord] {
        &self.connections
    }

    /// Get the time-ordered message index.
    pub fn index(&self) -> &[IndexEntry] {
        &self.index
    }

    /// Get the file size.
    pub fn file_size(&self) -> u64 {
        self.file_size
    }

    /// Get the file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Get header info.
    pub fn header(&self) -> &BagHeader {
        &self.header
    }

    /// Read and decompress a single chunk.
    pub fn read_chunk(&self, chunk_idx: usize) -> Result<Vec<u8>> {
        let chunk_info = self.chunks.get(chunk_idx).ok_or_else(|| {
            BridgeError::container("chunk", format!("no chunk #{chunk_idx}"))
        })?;
        let record = read_record(&self.mmap, chunk_info.chunk_pos as usize, "chunk")?;
        decompress_chunk(
            &chunk_info.compression,
            record.data,
            chunk_info.uncompressed_size as usize,
        )
    }
}

/// Decompress chunk data; `size_hint` is the uncompressed size from the chunk header.
pub(crate) fn decompress_chunk(compression: &str, data: &[u8], size_hint: usize) -> Result<Vec<u8>> {
    let mut decompressed = Vec::with_capacity(size_hint);
    match compression {
        "none" => return Ok(data.to_vec()),
        "bz2" => {
            use bzip2::read::BzDecoder;
            BzDecoder::new(data)
                .read_to_end(&mut decompressed)
                .map_err(|e| {
                    BridgeError::container("chunk", format!("BZ2 decompression failed: {e}"))
                })?;
        }
        "lz4" => {
            // roslz4 writes the standard LZ4 frame format
            use lz4_flex::frame::FrameDecoder;
            FrameDecoder::new(data)
                .read_to_end(&mut decompressed)
                .map_err(|e| {
                    BridgeError::container("chunk", format!("LZ4 decompression failed: {e}"))
                })?;
        }
        other => {
            return Err(BridgeError::container(
                "chunk",
                format!("unsupported compression format: {other}"),
            ))
        }
    }
    Ok(decompressed)
}

/// Read the message data record at `offset` in uncompressed chunk data.
///
/// Returns the connection id, time and payload.
pub(crate) fn message_record(chunk_data: &[u8], offset: usize) -> Result<(u32, u64, &[u8])> {
    let record = read_record(chunk_data, offset, "message data")?;
    if record.header.op != Some(OP_MSG_DATA) {
        return Err(BridgeError::container(
            "message data",
            format!(
                "expected message data record (op=0x02) at chunk offset {offset}, got op={:?}",
                record.header.op
            ),
        ));
    }
    let conn = record
        .header
        .conn
        .ok_or_else(|| BridgeError::container("message data", "missing 'conn' field"))?;
    Ok((conn, record.header.time.unwrap_or(0), record.data))
}

/// Read a single BAG record at `pos`: `<header_len: u32><header><data_len: u32><data>`
pub(crate) fn read_record<'a>(buf: &'a [u8], pos: usize, context: &str) -> Result<Record<'a>> {
    let truncated = |what: &str| {
        BridgeError::container(
            context,
            format!("truncated record at {pos}: cannot read {what}"),
        )
    };

    let header_len = read_u32_at(buf, pos).ok_or_else(|| truncated("header_len"))? as usize;
    let header_start = pos + 4;
    let header_end = header_start
        .checked_add(header_len)
        .filter(|&end| end <= buf.len())
        .ok_or_else(|| truncated("header"))?;
    let header = parse_record_header(&buf[header_start..header_end])?;

    let data_len = read_u32_at(buf, header_end).ok_or_else(|| truncated("data_len"))? as usize;
    let data_start = header_end + 4;
    let data_end = data_start
        .checked_add(data_len)
        .filter(|&end| end <= buf.len())
        .ok_or_else(|| truncated("data"))?;

    Ok(Record {
        header,
        data: &buf[data_start..data_end],
        end: data_end,
    })
}

fn read_u32_at(buf: &[u8], pos: usize) -> Option<u32> {
    let end = pos.checked_add(4)?;
    buf.get(pos..end).map(LittleEndian::read_u32)
}

/// Parse header bytes into named fields.
/// Format: sequence of `<field_len: u32><field_name>=<field_value>`
pub(crate) fn parse_record_header(header_bytes: &[u8]) -> Result<RecordHeader> {
    let mut fields = RecordHeader::default();
    let mut pos = 0;

    while pos < header_bytes.len() {
        let field_len = read_u32_at(header_bytes, pos).ok_or_else(|| {
            BridgeError::container("record header", format!("truncated field length at {pos}"))
        })? as usize;
        pos += 4;
        let field = pos
            .checked_add(field_len)
            .and_then(|end| header_bytes.get(pos..end))
            .ok_or_else(|| {
                BridgeError::container(
                    "record header",
                    format!("field of {field_len} bytes at {pos} overruns the header"),
                )
            })?;
        pos += field_len;

        // Find the '=' separator
        if let Some(eq_pos) = field.iter().position(|&b| b == b'=') {
            parse_field(&mut fields, &field[..eq_pos], &field[eq_pos + 1..]);
        }
    }

    Ok(fields)
}

/// Decode a ROS time (sec: u32, nsec: u32) into nanoseconds.
fn ros_time_ns(value: &[u8]) -> u64 {
    let sec = LittleEndian::read_u32(&value[..4]) as u64;
    let nsec = LittleEndian::read_u32(&value[4..8]) as u64;
    sec * 1_000_000_000 + nsec
}

/// Parse a single field from name and value bytes.
fn parse_field(fields: &mut RecordHeader, name: &[u8], value: &[u8]) {
    let text = || String::from_utf8_lossy(value).into_owned();
    match name {
        b"op" if value.len() == 1 => fields.op = Some(value[0]),
        b"conn" if value.len() >= 4 => fields.conn = Some(LittleEndian::read_u32(value)),
        b"time" if value.len() >= 8 => fields.time = Some(ros_time_ns(value)),
        b"topic" => fields.topic = Some(text()),
        b"md5sum" => fields.md5sum = Some(text()),
        b"type" => fields.message_type = Some(text()),
        b"message_definition" => fields.message_definition = Some(text()),
        b"callerid" => fields.callerid = Some(text()),
        b"index_pos" if value.len() >= 8 => fields.index_pos = Some(LittleEndian::read_u64(value)),
        b"conn_count" if value.len() >= 4 => {
            fields.conn_count = Some(LittleEndian::read_u32(value))
        }
        b"chunk_count" if value.len() >= 4 => {
            fields.chunk_count = Some(LittleEndian::read_u32(value))
        }
        b"chunk_pos" if value.len() >= 8 => fields.chunk_pos = Some(LittleEndian::read_u64(value)),
        b"start_time" if value.len() >= 8 => fields.start_time = Some(ros_time_ns(value)),
        b"end_time" if value.len() >= 8 => fields.end_time = Some(ros_time_ns(value)),
        b"compression" => fields.compression = Some(text()),
        b"size" if value.len() >= 4 => fields.size = Some(LittleEndian::read_u32(value)),
        b"ver" if value.len() >= 4 => fields.ver = Some(LittleEndian::read_u32(value)),
        b"count" if value.len() >= 4 => fields.count = Some(LittleEndian::read_u32(value)),
        _ => {
            // Ignore unknown fields (latching, ...)
        }
    }
}
