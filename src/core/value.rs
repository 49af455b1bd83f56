// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Codec value type system.
//!
//! Decoded legacy messages are represented as a tree of [`CodecValue`]s keyed
//! by field name. The ROS1 decoder produces `Timestamp`/`Duration` leaves for
//! `time` and `duration` fields; the 1→2 conversion reshapes them into
//! `builtin_interfaces` structs. All variants are serde-serializable so a
//! decoded message can be printed as JSON.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Field name -> value mapping for one decoded message.
pub type DecodedMessage = HashMap<String, CodecValue>;

/// A decoded field value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CodecValue {
    Bool(bool),

    Int8(i8),
    Int16(i16),
    Int32(i32),
    Int64(i64),

    UInt8(u8),
    UInt16(u16),
    UInt32(u32),
    UInt64(u64),

    Float32(f32),
    Float64(f64),

    String(String),

    /// `uint8[]` and `byte[]` payloads such as image frames
    Bytes(Vec<u8>),

    /// Nanoseconds since the Unix epoch
    Timestamp(i64),

    /// Signed nanoseconds
    Duration(i64),

    Array(Vec<CodecValue>),

    Struct(DecodedMessage),
}

impl CodecValue {
    pub fn as_struct(&self) -> Option<&DecodedMessage> {
        match self {
            CodecValue::Struct(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[CodecValue]> {
        match self {
            CodecValue::Array(arr) => Some(arr),
            _ => None,
        }
    }

    /// Short lowercase name of the variant, used in conversion errors.
    pub fn type_name(&self) -> &'static str {
        match self {
            CodecValue::Bool(_) => "bool",
            CodecValue::Int8(_) => "int8",
            CodecValue::Int16(_) => "int16",
            CodecValue::Int32(_) => "int32",
            CodecValue::Int64(_) => "int64",
            CodecValue::UInt8(_) => "uint8",
            CodecValue::UInt16(_) => "uint16",
            CodecValue::UInt32(_) => "uint32",
            CodecValue::UInt64(_) => "uint64",
            CodecValue::Float32(_) => "float32",
            CodecValue::Float64(_) => "float64",
            CodecValue::String(_) => "string",
            CodecValue::Bytes(_) => "bytes",
            CodecValue::Timestamp(_) => "time",
            CodecValue::Duration(_) => "duration",
            CodecValue::Array(_) => "array",
            CodecValue::Struct(_) => "struct",
        }
    }

    /// ROS1 `time` (unsigned seconds and nanoseconds) as a [`CodecValue::Timestamp`].
    pub fn from_ros1_time(secs: u32, nsecs: u32) -> Self {
        CodecValue::Timestamp(i64::from(secs) * 1_000_000_000 + i64::from(nsecs))
    }

    /// ROS1 `duration` as a [`CodecValue::Duration`].
    ///
    /// ROS1 durations are not required to be normalized, so `nsecs` may be
    /// negative or exceed one second.
    pub fn from_ros1_duration(secs: i32, nsecs: i32) -> Self {
        CodecValue::Duration(i64::from(secs) * 1_000_000_000 + i64::from(nsecs))
    }
}
