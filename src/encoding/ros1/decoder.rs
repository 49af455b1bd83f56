// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Schema-driven ROS1 message decoder.
//!
//! Walks a parsed [`MessageSchema`] over ROS1 wire bytes:
//! - primitives are packed little-endian
//! - `string` is a u32 length followed by the bytes (no terminator)
//! - `time` is (u32 sec, u32 nsec), `duration` is (i32 sec, i32 nsec)
//! - `T[N]` has no length prefix, `T[]` has a u32 count
//! - nested messages are inlined
//!
//! `uint8[]`, `byte[]` and `char[]` decode to [`CodecValue::Bytes`].

use std::collections::HashMap;

use super::cursor::Ros1Cursor;
use crate::core::{BridgeError, CodecValue, DecodedMessage, Result};
use crate::schema::{FieldType, MessageSchema, MessageType, PrimitiveType};

/// Upper bound on element count for arrays whose elements may be empty.
const MAX_ARRAY_LENGTH: usize = 10_000_000;

/// Nesting limit; ROS1 definitions are acyclic, so hitting it means a broken schema.
const MAX_DEPTH: usize = 64;

/// ROS1 decoder.
#[derive(Debug, Default, Clone, Copy)]
pub struct Ros1Decoder;

impl Ros1Decoder {
    /// Create a new decoder.
    pub fn new() -> Self {
        Self
    }

    /// Decode a full payload as the root type of `schema`.
    ///
    /// The payload must be consumed exactly; leftover bytes mean the
    /// definition does not describe the data.
    pub fn decode(&self, schema: &MessageSchema, data: &[u8]) -> Result<DecodedMessage> {
        let root = schema
            .root()
            .ok_or_else(|| BridgeError::type_not_found(&schema.name))?;
        let mut cursor = Ros1Cursor::new(data);
        let message = self.read_struct(&mut cursor, root, schema, 0)?;
        if !cursor.is_at_end() {
            return Err(BridgeError::decode(
                &schema.name,
                format!(
                    "{} trailing bytes after decoding {} of {}",
                    cursor.remaining(),
                    cursor.position(),
                    data.len()
                ),
            ));
        }
        Ok(message)
    }

    fn read_struct(
        &self,
        cursor: &mut Ros1Cursor,
        msg_type: &MessageType,
        schema: &MessageSchema,
        depth: usize,
    ) -> Result<DecodedMessage> {
        if depth > MAX_DEPTH {
            return Err(BridgeError::decode(
                &schema.name,
                format!("nesting deeper than {MAX_DEPTH} at '{}'", msg_type.name),
            ));
        }
        let mut fields = HashMap::with_capacity(msg_type.fields.len());
        for field in &msg_type.fields {
            let value =
                self.read_field(cursor, &field.type_name, &msg_type.name, schema, depth)?;
            fields.insert(field.name.clone(), value);
        }
        Ok(fields)
    }

    fn read_field(
        &self,
        cursor: &mut Ros1Cursor,
        field_type: &FieldType,
        context: &str,
        schema: &MessageSchema,
        depth: usize,
    ) -> Result<CodecValue> {
        match field_type {
            FieldType::Primitive(prim) => self.read_primitive(cursor, *prim),
            FieldType::Nested(name) => {
                let nested = resolve(schema, name, context)?;
                Ok(CodecValue::Struct(
                    self.read_struct(cursor, nested, schema, depth + 1)?,
                ))
            }
            FieldType::Array { base_type, size } => {
                self.read_array(cursor, base_type, *size, context, schema, depth)
            }
        }
    }

    fn read_array(
        &self,
        cursor: &mut Ros1Cursor,
        base_type: &FieldType,
        fixed_count: Option<usize>,
        context: &str,
        schema: &MessageSchema,
        depth: usize,
    ) -> Result<CodecValue> {
        let min_size = min_wire_size(base_type, context, schema, 0);
        let len = match fixed_count {
            Some(n) => n,
            None => {
                let len = cursor.read_length(min_size)?;
                if min_size == 0 && len > MAX_ARRAY_LENGTH {
                    return Err(BridgeError::length_exceeded(
                        len,
                        cursor.position(),
                        cursor.position() + cursor.remaining(),
                    ));
                }
                len
            }
        };

        if let FieldType::Primitive(prim) = base_type {
            if prim.is_byte_like() {
                return Ok(CodecValue::Bytes(cursor.read_bytes(len)?.to_vec()));
            }
        }

        let mut values = Vec::with_capacity(len.min(1024));
        for _ in 0..len {
            values.push(self.read_field(cursor, base_type, context, schema, depth)?);
        }
        Ok(CodecValue::Array(values))
    }

    fn read_primitive(&self, cursor: &mut Ros1Cursor, prim: PrimitiveType) -> Result<CodecValue> {
        Ok(match prim {
            PrimitiveType::Bool => CodecValue::Bool(cursor.read_u8()? != 0),
            PrimitiveType::Int8 => CodecValue::Int8(cursor.read_i8()?),
            PrimitiveType::Int16 => CodecValue::Int16(cursor.read_i16()?),
            PrimitiveType::Int32 => CodecValue::Int32(cursor.read_i32()?),
            PrimitiveType::Int64 => CodecValue::Int64(cursor.read_i64()?),
            PrimitiveType::UInt8 | PrimitiveType::Byte | PrimitiveType::Char => {
                CodecValue::UInt8(cursor.read_u8()?)
            }
            PrimitiveType::UInt16 => CodecValue::UInt16(cursor.read_u16()?),
            PrimitiveType::UInt32 => CodecValue::UInt32(cursor.read_u32()?),
            PrimitiveType::UInt64 => CodecValue::UInt64(cursor.read_u64()?),
            PrimitiveType::Float32 => CodecValue::Float32(cursor.read_f32()?),
            PrimitiveType::Float64 => CodecValue::Float64(cursor.read_f64()?),
            PrimitiveType::String => {
                let len = cursor.read_length(1)?;
                let bytes = cursor.read_bytes(len)?;
                CodecValue::String(String::from_utf8_lossy(bytes).into_owned())
            }
            PrimitiveType::Time => {
                let sec = cursor.read_u32()?;
                let nsec = cursor.read_u32()?;
                CodecValue::from_ros1_time(sec, nsec)
            }
            PrimitiveType::Duration => {
                let sec = cursor.read_i32()?;
                let nsec = cursor.read_i32()?;
                CodecValue::from_ros1_duration(sec, nsec)
            }
        })
    }
}

fn resolve<'s>(schema: &'s MessageSchema, name: &str, context: &str) -> Result<&'s MessageType> {
    schema
        .resolve(name, context)
        .ok_or_else(|| BridgeError::type_not_found(name))
}

/// Smallest number of bytes one value of `field_type` can occupy.
fn min_wire_size(field_type: &FieldType, context: &str, schema: &MessageSchema, depth: usize) -> usize {
    if depth > MAX_DEPTH {
        return 0;
    }
    match field_type {
        FieldType::Primitive(prim) => prim.size().unwrap_or(4),
        FieldType::Array { size: None, .. } => 4,
        FieldType::Array {
            base_type,
            size: Some(n),
        } => n.saturating_mul(min_wire_size(base_type, context, schema, depth + 1)),
        FieldType::Nested(name) => match schema.resolve(name, context) {
            Some(nested) => nested
                .fields
                .iter()
                .map(|f| min_wire_size(&f.type_name, &nested.name, schema, depth + 1))
                .fold(0usize, usize::saturating_add),
            None => 0,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::parse_schema;

    fn string_bytes(s: &str) -> Vec<u8> {
        let mut out = (s.len() as u32).to_le_bytes().to_vec();
        out.extend_from_slice(s.as_bytes());
        out
    }

    #[test]
    fn test_decode_int32() {
        let schema = parse_schema("std_msgs/Int32", "int32 data").unwrap();
        let msg = Ros1Decoder::new()
            .decode(&schema, &(-7i32).to_le_bytes())
            .unwrap();
        assert_eq!(msg.get("data"), Some(&CodecValue::Int32(-7)));
    }

    #[test]
    fn test_decode_string_has_no_terminator() {
        let schema = parse_schema("std_msgs/String", "string data").unwrap();
        let msg = Ros1Decoder::new()
            .decode(&schema, &string_bytes("hello"))
            .unwrap();
        assert_eq!(msg.get("data"), Some(&CodecValue::String("hello".to_string())));
    }

    #[test]
    fn test_decode_header_and_time() {
        let def = "Header header\nfloat64 value\n\
=====\nMSG: std_msgs/Header\nuint32 seq\ntime stamp\nstring frame_id\n";
        let schema = parse_schema("test/Stamped", def).unwrap();

        let mut data = Vec::new();
        data.extend_from_slice(&3u32.to_le_bytes());
        data.extend_from_slice(&10u32.to_le_bytes());
        data.extend_from_slice(&500u32.to_le_bytes());
        data.extend_from_slice(&string_bytes("map"));
        data.extend_from_slice(&1.5f64.to_le_bytes());

        let msg = Ros1Decoder::new().decode(&schema, &data).unwrap();
        let header = msg.get("header").and_then(|h| h.as_struct()).unwrap();
        assert_eq!(header.get("seq"), Some(&CodecValue::UInt32(3)));
        assert_eq!(
            header.get("stamp"),
            Some(&CodecValue::Timestamp(10_000_000_500))
        );
        assert_eq!(header.get("frame_id"), Some(&CodecValue::String("map".to_string())));
        assert_eq!(msg.get("value"), Some(&CodecValue::Float64(1.5)));
    }

    #[test]
    fn test_decode_arrays() {
        let def = "uint8[] raw\nfloat32[2] pair\nstring[] names";
        let schema = parse_schema("test/Arrays", def).unwrap();

        let mut data = Vec::new();
        data.extend_from_slice(&3u32.to_le_bytes());
        data.extend_from_slice(&[7, 8, 9]);
        data.extend_from_slice(&1.0f32.to_le_bytes());
        data.extend_from_slice(&2.0f32.to_le_bytes());
        data.extend_from_slice(&2u32.to_le_bytes());
        data.extend_from_slice(&string_bytes("a"));
        data.extend_from_slice(&string_bytes("bc"));

        let msg = Ros1Decoder::new().decode(&schema, &data).unwrap();
        assert_eq!(msg.get("raw"), Some(&CodecValue::Bytes(vec![7, 8, 9])));
        assert_eq!(
            msg.get("pair"),
            Some(&CodecValue::Array(vec![
                CodecValue::Float32(1.0),
                CodecValue::Float32(2.0)
            ]))
        );
        assert_eq!(msg.get("names").and_then(|v| v.as_array()).map(|a| a.len()), Some(2));
    }

    #[test]
    fn test_decode_negative_duration() {
        let schema = parse_schema("std_msgs/Duration", "duration data").unwrap();
        let mut data = (-2i32).to_le_bytes().to_vec();
        data.extend_from_slice(&(-250_000_000i32).to_le_bytes());
        let msg = Ros1Decoder::new().decode(&schema, &data).unwrap();
        assert_eq!(msg.get("data"), Some(&CodecValue::Duration(-2_250_000_000)));
    }

    #[test]
    fn test_truncated_payload() {
        let schema = parse_schema("std_msgs/Int64", "int64 data").unwrap();
        let err = Ros1Decoder::new().decode(&schema, &[1, 2, 3]).unwrap_err();
        assert!(err.is_per_record());
        assert!(matches!(err, BridgeError::BufferTooShort { .. }));
    }

    #[test]
    fn test_trailing_bytes_rejected() {
        let schema = parse_schema("std_msgs/UInt8", "uint8 data").unwrap();
        let err = Ros1Decoder::new().decode(&schema, &[1, 2]).unwrap_err();
        assert!(matches!(err, BridgeError::Decode { .. }));
    }

    #[test]
    fn test_oversized_array_prefix() {
        let schema = parse_schema("test/Big", "float64[] values").unwrap();
        let err = Ros1Decoder::new()
            .decode(&schema, &u32::MAX.to_le_bytes())
            .unwrap_err();
        assert!(matches!(err, BridgeError::LengthExceeded { .. }));
    }

    #[test]
    fn test_unresolved_nested_type() {
        let schema = parse_schema("test/Outer", "Missing inner").unwrap();
        let err = Ros1Decoder::new().decode(&schema, &[]).unwrap_err();
        assert!(matches!(err, BridgeError::TypeNotFound { .. }));
    }
}
