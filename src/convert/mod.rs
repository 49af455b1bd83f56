// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! ROS1 → ROS2 message layout conversion.
//!
//! The decoder produces values in the legacy layout. Replay hosts expect the
//! target layout instead:
//! - `time` becomes `builtin_interfaces/Time` `{sec: int32, nanosec: uint32}`
//! - `duration` becomes `builtin_interfaces/Duration` `{sec: int32, nanosec: uint32}`
//! - `std_msgs/Header` drops `seq`
//!
//! Everything else is carried over unchanged.

use crate::core::{BridgeError, CodecValue, DecodedMessage, Result};
use crate::schema::{FieldType, MessageSchema, MessageType, PrimitiveType};

const NANOS_PER_SEC: i64 = 1_000_000_000;

/// Convert a decoded ROS1 message (root type of `schema`) into the ROS2 layout.
pub fn convert_1_to_2(schema: &MessageSchema, message: DecodedMessage) -> Result<DecodedMessage> {
    let root = schema
        .root()
        .ok_or_else(|| BridgeError::type_not_found(&schema.name))?;
    convert_struct(schema, root, message)
}

fn convert_struct(
    schema: &MessageSchema,
    msg_type: &MessageType,
    mut message: DecodedMessage,
) -> Result<DecodedMessage> {
    let mut out = DecodedMessage::with_capacity(msg_type.fields.len());
    for field in &msg_type.fields {
        if msg_type.is_header() && field.name == "seq" {
            continue;
        }
        let value = message.remove(&field.name).ok_or_else(|| {
            BridgeError::decode(&msg_type.name, format!("missing field '{}'", field.name))
        })?;
        let converted = convert_value(schema, &field.type_name, &msg_type.name, value)?;
        out.insert(field.name.clone(), converted);
    }
    Ok(out)
}

fn convert_value(
    schema: &MessageSchema,
    field_type: &FieldType,
    context: &str,
    value: CodecValue,
) -> Result<CodecValue> {
    match (field_type, value) {
        (FieldType::Primitive(PrimitiveType::Time), CodecValue::Timestamp(nanos)) => {
            Ok(time_struct(nanos))
        }
        (FieldType::Primitive(PrimitiveType::Duration), CodecValue::Duration(nanos)) => {
            Ok(time_struct(nanos))
        }
        (FieldType::Primitive(_), value) => Ok(value),
        (FieldType::Nested(name), CodecValue::Struct(fields)) => {
            let nested = schema
                .resolve(name, context)
                .ok_or_else(|| BridgeError::type_not_found(name))?;
            Ok(CodecValue::Struct(convert_struct(schema, nested, fields)?))
        }
        (FieldType::Array { base_type, .. }, CodecValue::Array(items)) => items
            .into_iter()
            .map(|item| convert_value(schema, base_type, context, item))
            .collect::<Result<Vec<_>>>()
            .map(CodecValue::Array),
        (FieldType::Array { .. }, bytes @ CodecValue::Bytes(_)) => Ok(bytes),
        (_, other) => Err(BridgeError::decode(
            context,
            format!("value of type {} does not match its definition", other.type_name()),
        )),
    }
}

/// Split nanoseconds into a normalized `{sec, nanosec}` struct.
///
/// `nanosec` is always in `[0, 1e9)`; negative values borrow from `sec`.
/// Seconds past the int32 range wrap the way a C cast does.
fn time_struct(nanos: i64) -> CodecValue {
    let sec = nanos.div_euclid(NANOS_PER_SEC);
    let nanosec = nanos.rem_euclid(NANOS_PER_SEC);
    let mut fields = DecodedMessage::with_capacity(2);
    fields.insert("sec".to_string(), CodecValue::Int32(sec as i32));
    fields.insert("nanosec".to_string(), CodecValue::UInt32(nanosec as u32));
    CodecValue::Struct(fields)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoding::ros1::Ros1Decoder;
    use crate::schema::parse_schema;

    fn sec_nanosec(value: &CodecValue) -> (i32, u32) {
        let s = value.as_struct().unwrap();
        let sec = match s.get("sec") {
            Some(CodecValue::Int32(v)) => *v,
            other => panic!("unexpected sec {other:?}"),
        };
        let nanosec = match s.get("nanosec") {
            Some(CodecValue::UInt32(v)) => *v,
            other => panic!("unexpected nanosec {other:?}"),
        };
        (sec, nanosec)
    }

    #[test]
    fn test_header_loses_seq() {
        let def = "Header header\n===\nMSG: std_msgs/Header\nuint32 seq\ntime stamp\nstring frame_id\n";
        let schema = parse_schema("test/Stamped", def).unwrap();
        let mut data = Vec::new();
        data.extend_from_slice(&9u32.to_le_bytes());
        data.extend_from_slice(&42u32.to_le_bytes());
        data.extend_from_slice(&7u32.to_le_bytes());
        data.extend_from_slice(&0u32.to_le_bytes());

        let ros1 = Ros1Decoder::new().decode(&schema, &data).unwrap();
        let ros2 = convert_1_to_2(&schema, ros1).unwrap();
        let header = ros2.get("header").and_then(|h| h.as_struct()).unwrap();

        assert!(!header.contains_key("seq"));
        assert_eq!(sec_nanosec(&header["stamp"]), (42, 7));
        assert_eq!(header.get("frame_id"), Some(&CodecValue::String(String::new())));
    }

    #[test]
    fn test_negative_duration_is_normalized() {
        assert_eq!(sec_nanosec(&time_struct(-1_500_000_000)), (-2, 500_000_000));
        assert_eq!(sec_nanosec(&time_struct(2_000_000_001)), (2, 1));
    }

    #[test]
    fn test_time_arrays_convert() {
        let schema = parse_schema("test/Times", "time[2] stamps\nuint8[] raw").unwrap();
        let mut message = DecodedMessage::new();
        message.insert(
            "stamps".to_string(),
            CodecValue::Array(vec![CodecValue::Timestamp(1), CodecValue::Timestamp(2)]),
        );
        message.insert("raw".to_string(), CodecValue::Bytes(vec![1]));

        let ros2 = convert_1_to_2(&schema, message).unwrap();
        let stamps = ros2["stamps"].as_array().unwrap();
        assert_eq!(sec_nanosec(&stamps[1]), (0, 2));
        assert_eq!(ros2["raw"], CodecValue::Bytes(vec![1]));
    }

    #[test]
    fn test_missing_field_is_decode_error() {
        let schema = parse_schema("test/Pair", "int32 a\nint32 b").unwrap();
        let mut message = DecodedMessage::new();
        message.insert("a".to_string(), CodecValue::Int32(1));
        let err = convert_1_to_2(&schema, message).unwrap_err();
        assert!(err.is_per_record());
    }
}
