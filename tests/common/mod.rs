// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Common utilities for integration tests.
//!
//! [`BagFixture`] writes small, indexed ROS1 bag v2.0 files; [`Wire`]
//! serializes ROS1 message payloads by hand.

#![allow(dead_code)]

use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

const OP_MSG_DATA: u8 = 0x02;
const OP_BAG_HEADER: u8 = 0x03;
const OP_INDEX_DATA: u8 = 0x04;
const OP_CHUNK: u8 = 0x05;
const OP_CHUNK_INFO: u8 = 0x06;
const OP_CONNECTION: u8 = 0x07;

/// Size of the padded bag header, as rosbag writes it.
const FILE_HEADER_LEN: usize = 4096;

pub const INT32_DEF: &str = "int32 data\n";
pub const STRING_DEF: &str = "string data\n";

// ============================================================================
// Temporary files
// ============================================================================

pub fn temp_dir() -> PathBuf {
    let random = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    let thread_id = format!("{:?}", std::thread::current().id());
    std::env::temp_dir().join(format!(
        "rosbag_v2_bridge_{}_{}_{}",
        std::process::id(),
        thread_id.replace(|c: char| !c.is_ascii_alphanumeric(), ""),
        random
    ))
}

/// Path for a bag named `name` inside a fresh directory removed on drop.
pub fn temp_bag_path(name: &str) -> (PathBuf, CleanupGuard) {
    let dir = temp_dir();
    fs::create_dir_all(&dir).unwrap();
    let path = dir.join(format!("{name}.bag"));
    (path, CleanupGuard(dir))
}

#[derive(Debug)]
pub struct CleanupGuard(pub PathBuf);

impl Drop for CleanupGuard {
    fn drop(&mut self) {
        let _ = fs::remove_dir_all(&self.0);
    }
}

// ============================================================================
// ROS1 wire serialization
// ============================================================================

/// Little-endian ROS1 payload builder.
#[derive(Debug, Default, Clone)]
pub struct Wire(Vec<u8>);

impl Wire {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn u8(mut self, v: u8) -> Self {
        self.0.push(v);
        self
    }

    pub fn i32(mut self, v: i32) -> Self {
        self.0.extend_from_slice(&v.to_le_bytes());
        self
    }

    pub fn u32(mut self, v: u32) -> Self {
        self.0.extend_from_slice(&v.to_le_bytes());
        self
    }

    pub fn f64(mut self, v: f64) -> Self {
        self.0.extend_from_slice(&v.to_le_bytes());
        self
    }

    /// Length-prefixed, no terminator.
    pub fn string(mut self, s: &str) -> Self {
        self = self.u32(s.len() as u32);
        self.0.extend_from_slice(s.as_bytes());
        self
    }

    pub fn time(self, sec: u32, nsec: u32) -> Self {
        self.u32(sec).u32(nsec)
    }

    pub fn duration(self, sec: i32, nsec: i32) -> Self {
        self.i32(sec).i32(nsec)
    }

    /// `std_msgs/Header`: seq, stamp, frame_id.
    pub fn header(self, seq: u32, sec: u32, nsec: u32, frame_id: &str) -> Self {
        self.u32(seq).time(sec, nsec).string(frame_id)
    }

    pub fn build(self) -> Vec<u8> {
        self.0
    }
}

pub fn int32_payload(v: i32) -> Vec<u8> {
    Wire::new().i32(v).build()
}

pub fn string_payload(s: &str) -> Vec<u8> {
    Wire::new().string(s).build()
}

// ============================================================================
// Bag fixture writer
// ============================================================================

/// Chunk compression of a fixture bag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compression {
    None,
    Bz2,
    Lz4,
}

impl Compression {
    fn name(self) -> &'static str {
        match self {
            Compression::None => "none",
            Compression::Bz2 => "bz2",
            Compression::Lz4 => "lz4",
        }
    }

    fn compress(self, data: &[u8]) -> Vec<u8> {
        match self {
            Compression::None => data.to_vec(),
            Compression::Bz2 => {
                let mut encoder =
                    bzip2::write::BzEncoder::new(Vec::new(), bzip2::Compression::default());
                encoder.write_all(data).unwrap();
                encoder.finish().unwrap()
            }
            Compression::Lz4 => {
                let mut encoder = lz4_flex::frame::FrameEncoder::new(Vec::new());
                encoder.write_all(data).unwrap();
                encoder.finish().unwrap()
            }
        }
    }
}

#[derive(Debug, Clone)]
struct FixtureConnection {
    id: u32,
    topic: String,
    legacy_type: String,
    definition: String,
}

#[derive(Debug, Clone)]
struct FixtureMessage {
    conn: u32,
    time: u64,
    data: Vec<u8>,
}

#[derive(Debug, Default)]
struct ChunkInfo {
    pos: u64,
    start: u64,
    end: u64,
    counts: BTreeMap<u32, u32>,
}

/// Builder for indexed ROS1 bags.
///
/// Messages are stored in insertion order, `messages_per_chunk` at a time,
/// so a fixture can put later timestamps in earlier chunks.
#[derive(Debug, Clone)]
pub struct BagFixture {
    connections: Vec<FixtureConnection>,
    messages: Vec<FixtureMessage>,
    messages_per_chunk: usize,
    compression: Compression,
    indexed: bool,
}

impl Default for BagFixture {
    fn default() -> Self {
        Self::new()
    }
}

impl BagFixture {
    pub fn new() -> Self {
        Self {
            connections: Vec::new(),
            messages: Vec::new(),
            messages_per_chunk: usize::MAX,
            compression: Compression::None,
            indexed: true,
        }
    }

    /// Add a connection and return its id.
    pub fn connection(&mut self, topic: &str, legacy_type: &str, definition: &str) -> u32 {
        let id = self.connections.len() as u32;
        self.connections.push(FixtureConnection {
            id,
            topic: topic.to_string(),
            legacy_type: legacy_type.to_string(),
            definition: definition.to_string(),
        });
        id
    }

    pub fn message(&mut self, conn: u32, time: u64, data: Vec<u8>) -> &mut Self {
        self.messages.push(FixtureMessage { conn, time, data });
        self
    }

    pub fn messages_per_chunk(&mut self, n: usize) -> &mut Self {
        self.messages_per_chunk = n.max(1);
        self
    }

    pub fn compression(&mut self, compression: Compression) -> &mut Self {
        self.compression = compression;
        self
    }

    /// Write `index_pos = 0`, as a recorder that crashed before closing would.
    pub fn unindexed(&mut self) -> &mut Self {
        self.indexed = false;
        self
    }

    pub fn write(&self, path: &Path) {
        fs::write(path, self.to_bytes()).unwrap();
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut body = Vec::new();
        let mut chunk_infos = Vec::new();

        for group in self.messages.chunks(self.messages_per_chunk) {
            let mut info = ChunkInfo {
                pos: (FILE_HEADER_LEN + body.len()) as u64,
                start: u64::MAX,
                ..Default::default()
            };
            let mut data = Vec::new();
            let mut indexes: BTreeMap<u32, Vec<(u64, u32)>> = BTreeMap::new();

            for msg in group {
                if !indexes.contains_key(&msg.conn) {
                    write_connection_record(&mut data, &self.connections[msg.conn as usize]);
                }
                let offset = data.len() as u32;
                let mut fields = BTreeMap::new();
                fields.insert("op", vec![OP_MSG_DATA]);
                fields.insert("conn", msg.conn.to_le_bytes().to_vec());
                fields.insert("time", time_bytes(msg.time));
                write_record(&mut data, &fields, &msg.data);

                indexes.entry(msg.conn).or_default().push((msg.time, offset));
                *info.counts.entry(msg.conn).or_default() += 1;
                info.start = info.start.min(msg.time);
                info.end = info.end.max(msg.time);
            }

            let compressed = self.compression.compress(&data);
            let mut fields = BTreeMap::new();
            fields.insert("op", vec![OP_CHUNK]);
            fields.insert("compression", self.compression.name().as_bytes().to_vec());
            fields.insert("size", (data.len() as u32).to_le_bytes().to_vec());
            write_record(&mut body, &fields, &compressed);

            for (conn, entries) in &indexes {
                let mut fields = BTreeMap::new();
                fields.insert("op", vec![OP_INDEX_DATA]);
                fields.insert("ver", 1u32.to_le_bytes().to_vec());
                fields.insert("conn", conn.to_le_bytes().to_vec());
                fields.insert("count", (entries.len() as u32).to_le_bytes().to_vec());
                let mut index_data = Vec::new();
                for (time, offset) in entries {
                    index_data.extend_from_slice(&time_bytes(*time));
                    index_data.extend_from_slice(&offset.to_le_bytes());
                }
                write_record(&mut body, &fields, &index_data);
            }

            chunk_infos.push(info);
        }

        let index_pos = (FILE_HEADER_LEN + body.len()) as u64;
        for conn in &self.connections {
            write_connection_record(&mut body, conn);
        }
        for info in &chunk_infos {
            let mut fields = BTreeMap::new();
            fields.insert("op", vec![OP_CHUNK_INFO]);
            fields.insert("ver", 1u32.to_le_bytes().to_vec());
            fields.insert("chunk_pos", info.pos.to_le_bytes().to_vec());
            fields.insert("start_time", time_bytes(info.start));
            fields.insert("end_time", time_bytes(info.end));
            fields.insert("count", (info.counts.len() as u32).to_le_bytes().to_vec());
            let mut counts = Vec::new();
            for (conn, count) in &info.counts {
                counts.extend_from_slice(&conn.to_le_bytes());
                counts.extend_from_slice(&count.to_le_bytes());
            }
            write_record(&mut body, &fields, &counts);
        }

        let mut out = file_header(
            if self.indexed { index_pos } else { 0 },
            self.connections.len() as u32,
            chunk_infos.len() as u32,
        );
        out.extend_from_slice(&body);
        out
    }
}

/// Magic plus bag header record, padded to [`FILE_HEADER_LEN`].
fn file_header(index_pos: u64, conn_count: u32, chunk_count: u32) -> Vec<u8> {
    let mut buffer = b"#ROSBAG V2.0\n".to_vec();
    let mut fields = BTreeMap::new();
    fields.insert("op", vec![OP_BAG_HEADER]);
    fields.insert("index_pos", index_pos.to_le_bytes().to_vec());
    fields.insert("conn_count", conn_count.to_le_bytes().to_vec());
    fields.insert("chunk_count", chunk_count.to_le_bytes().to_vec());
    write_header(&mut buffer, &fields);
    let padding = FILE_HEADER_LEN - buffer.len() - 4;
    buffer.extend_from_slice(&(padding as u32).to_le_bytes());
    buffer.resize(FILE_HEADER_LEN, b' ');
    buffer
}

fn write_connection_record(buffer: &mut Vec<u8>, conn: &FixtureConnection) {
    let mut fields = BTreeMap::new();
    fields.insert("op", vec![OP_CONNECTION]);
    fields.insert("conn", conn.id.to_le_bytes().to_vec());
    fields.insert("topic", conn.topic.as_bytes().to_vec());

    let mut data_fields = BTreeMap::new();
    data_fields.insert("topic", conn.topic.as_bytes().to_vec());
    data_fields.insert("type", conn.legacy_type.as_bytes().to_vec());
    data_fields.insert("md5sum", b"00000000000000000000000000000000".to_vec());
    data_fields.insert("message_definition", conn.definition.as_bytes().to_vec());
    data_fields.insert("callerid", b"/fixture".to_vec());
    data_fields.insert("latching", b"0".to_vec());
    let mut data = Vec::new();
    encode_fields(&mut data, &data_fields);

    write_record(buffer, &fields, &data);
}

fn write_record(buffer: &mut Vec<u8>, fields: &BTreeMap<&str, Vec<u8>>, data: &[u8]) {
    write_header(buffer, fields);
    buffer.extend_from_slice(&(data.len() as u32).to_le_bytes());
    buffer.extend_from_slice(data);
}

fn write_header(buffer: &mut Vec<u8>, fields: &BTreeMap<&str, Vec<u8>>) {
    let mut header = Vec::new();
    encode_fields(&mut header, fields);
    buffer.extend_from_slice(&(header.len() as u32).to_le_bytes());
    buffer.extend_from_slice(&header);
}

fn encode_fields(buffer: &mut Vec<u8>, fields: &BTreeMap<&str, Vec<u8>>) {
    for (key, value) in fields {
        let field_len = key.len() + 1 + value.len();
        buffer.extend_from_slice(&(field_len as u32).to_le_bytes());
        buffer.extend_from_slice(key.as_bytes());
        buffer.push(b'=');
        buffer.extend_from_slice(value);
    }
}

fn time_bytes(ns: u64) -> Vec<u8> {
    let sec = (ns / 1_000_000_000) as u32;
    let nsec = (ns % 1_000_000_000) as u32;
    let mut bytes = sec.to_le_bytes().to_vec();
    bytes.extend_from_slice(&nsec.to_le_bytes());
    bytes
}

// ============================================================================
// Common fixtures
// ============================================================================

/// Legacy type with a definition but no target mapping in the built-in table.
pub const UNMAPPED_TYPE: &str = "custom_msgs/Unmapped";

/// Two mapped topics and one unmapped topic, interleaved in time.
///
/// - `/a` std_msgs/Int32: 3 messages at t = 10s, 30s, 50s
/// - `/b` std_msgs/String: 2 messages at t = 20s, 40s
/// - `/c` custom_msgs/Unmapped: 2 messages at t = 5s and 60s
pub fn mixed_bag() -> BagFixture {
    const S: u64 = 1_000_000_000;
    let mut bag = BagFixture::new();
    let a = bag.connection("/a", "std_msgs/Int32", INT32_DEF);
    let b = bag.connection("/b", "std_msgs/String", STRING_DEF);
    let c = bag.connection("/c", UNMAPPED_TYPE, INT32_DEF);
    bag.message(c, 5 * S, int32_payload(-1))
        .message(a, 10 * S, int32_payload(1))
        .message(b, 20 * S, string_payload("two"))
        .message(a, 30 * S, int32_payload(3))
        .message(b, 40 * S, string_payload("four"))
        .message(a, 50 * S, int32_payload(5))
        .message(c, 60 * S, int32_payload(-2));
    bag
}
