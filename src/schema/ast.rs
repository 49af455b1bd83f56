// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! AST types for parsed ROS1 .msg schemas.

use std::collections::HashMap;

/// A parsed ROS1 message schema: the root type plus every dependency block.
#[derive(Debug, Clone, PartialEq)]
pub struct MessageSchema {
    /// Root type name (e.g., "sensor_msgs/Imu")
    pub name: String,
    /// Package name (e.g., "sensor_msgs")
    pub package: Option<String>,
    /// All types defined in this schema (root type + dependencies)
    pub types: HashMap<String, MessageType>,
}

/// A message type definition with its fields.
#[derive(Debug, Clone, PartialEq)]
pub struct MessageType {
    /// Type name including package if available
    pub name: String,
    /// Ordered list of fields
    pub fields: Vec<Field>,
    /// Constant declarations; they take no space on the wire
    pub constants: Vec<Constant>,
}

/// A field in a message type.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    /// Field name
    pub name: String,
    /// Field type
    pub type_name: FieldType,
}

/// A constant declaration (`int32 FOO=1`).
#[derive(Debug, Clone, PartialEq)]
pub struct Constant {
    /// Constant name
    pub name: String,
    /// Declared type
    pub type_name: FieldType,
    /// Literal value text
    pub value: String,
}

/// Field type - can be primitive, array, or nested message.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldType {
    /// Primitive type
    Primitive(PrimitiveType),
    /// Array type
    Array {
        /// Base type (element type)
        base_type: Box<FieldType>,
        /// Array size (None = dynamic, Some(N) = fixed)
        size: Option<usize>,
    },
    /// Nested message type, as written in the definition
    Nested(String),
}

/// Primitive ROS1 types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveType {
    /// Boolean
    Bool,
    /// 8-bit signed integer
    Int8,
    /// 16-bit signed integer
    Int16,
    /// 32-bit signed integer
    Int32,
    /// 64-bit signed integer
    Int64,
    /// 8-bit unsigned integer
    UInt8,
    /// 16-bit unsigned integer
    UInt16,
    /// 32-bit unsigned integer
    UInt32,
    /// 64-bit unsigned integer
    UInt64,
    /// 32-bit float
    Float32,
    /// 64-bit float
    Float64,
    /// String
    String,
    /// Deprecated alias for int8
    Byte,
    /// Deprecated alias for uint8
    Char,
    /// Time (sec: uint32, nsec: uint32)
    Time,
    /// Duration (sec: int32, nsec: int32)
    Duration,
}

impl PrimitiveType {
    /// Get the size in bytes for this primitive type, if fixed.
    pub fn size(self) -> Option<usize> {
        match self {
            PrimitiveType::Bool
            | PrimitiveType::Int8
            | PrimitiveType::UInt8
            | PrimitiveType::Byte
            | PrimitiveType::Char => Some(1),
            PrimitiveType::Int16 | PrimitiveType::UInt16 => Some(2),
            PrimitiveType::Int32 | PrimitiveType::UInt32 | PrimitiveType::Float32 => Some(4),
            PrimitiveType::Int64 | PrimitiveType::UInt64 | PrimitiveType::Float64 => Some(8),
            PrimitiveType::Time | PrimitiveType::Duration => Some(8),
            PrimitiveType::String => None,
        }
    }

    /// Parse a primitive type from a string.
    pub fn try_from_str(s: &str) -> Option<Self> {
        match s {
            "bool" => Some(PrimitiveType::Bool),
            "int8" => Some(PrimitiveType::Int8),
            "int16" => Some(PrimitiveType::Int16),
            "int32" => Some(PrimitiveType::Int32),
            "int64" => Some(PrimitiveType::Int64),
            "uint8" => Some(PrimitiveType::UInt8),
            "uint16" => Some(PrimitiveType::UInt16),
            "uint32" => Some(PrimitiveType::UInt32),
            "uint64" => Some(PrimitiveType::UInt64),
            "float32" => Some(PrimitiveType::Float32),
            "float64" => Some(PrimitiveType::Float64),
            "string" => Some(PrimitiveType::String),
            "byte" => Some(PrimitiveType::Byte),
            "char" => Some(PrimitiveType::Char),
            "time" => Some(PrimitiveType::Time),
            "duration" => Some(PrimitiveType::Duration),
            _ => None,
        }
    }

    /// Whether arrays of this type are decoded as raw bytes.
    pub fn is_byte_like(self) -> bool {
        matches!(
            self,
            PrimitiveType::UInt8 | PrimitiveType::Byte | PrimitiveType::Char
        )
    }
}

impl MessageSchema {
    /// Create an empty schema.
    pub fn new(name: String) -> Self {
        Self {
            package: package_of(&name).map(str::to_string),
            name,
            types: HashMap::new(),
        }
    }

    /// Register a type in this schema.
    pub fn add_type(&mut self, msg_type: MessageType) {
        self.types.insert(msg_type.name.clone(), msg_type);
    }

    /// Look up a type by name.
    pub fn get_type(&self, name: &str) -> Option<&MessageType> {
        self.types.get(name)
    }

    /// The root type of this schema.
    pub fn root(&self) -> Option<&MessageType> {
        self.types.get(&self.name)
    }

    /// Resolve a nested type reference the way ROS1 does.
    ///
    /// `context` is the full name of the type containing the reference. A
    /// bare `Header` means `std_msgs/Header`; any other bare name lives in the
    /// package of the containing type.
    pub fn resolve(&self, name: &str, context: &str) -> Option<&MessageType> {
        if let Some(t) = self.types.get(name) {
            return Some(t);
        }
        if !name.contains('/') {
            if name == "Header" {
                if let Some(t) = self.types.get("std_msgs/Header") {
                    return Some(t);
                }
            }
            if let Some(pkg) = package_of(context) {
                if let Some(t) = self.types.get(&format!("{pkg}/{name}")) {
                    return Some(t);
                }
            }
        }
        self.get_type_variants(name)
    }

    /// Look up a type by name with variant resolution.
    ///
    /// Accepts ROS2-style `pkg/msg/Type` spellings and bare short names.
    pub fn get_type_variants(&self, name: &str) -> Option<&MessageType> {
        if let Some(t) = self.types.get(name) {
            return Some(t);
        }

        if name.contains("/msg/") {
            if let Some(t) = self.types.get(&name.replace("/msg/", "/")) {
                return Some(t);
            }
        }

        if !name.contains('/') {
            let suffix = format!("/{name}");
            let mut candidates: Vec<&String> =
                self.types.keys().filter(|k| k.ends_with(&suffix)).collect();
            // Deterministic pick when several packages define the same short name
            candidates.sort();
            if let Some(key) = candidates.first() {
                return self.types.get(*key);
            }
        }

        None
    }
}

impl MessageType {
    /// Create a new message type.
    pub fn new(name: String) -> Self {
        Self {
            name,
            fields: Vec::new(),
            constants: Vec::new(),
        }
    }

    /// Add a field to this message type.
    pub fn add_field(&mut self, field: Field) {
        self.fields.push(field);
    }

    /// Whether this is the ROS1 standard header.
    pub fn is_header(&self) -> bool {
        self.name == "std_msgs/Header" || self.name == "Header"
    }
}

/// Extract the package from a `pkg/Type` name.
pub fn package_of(name: &str) -> Option<&str> {
    match name.split_once('/') {
        Some((pkg, _)) if !pkg.is_empty() => Some(pkg),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schema_with(names: &[&str]) -> MessageSchema {
        let mut schema = MessageSchema::new("pkg/Root".to_string());
        for name in names {
            schema.add_type(MessageType::new(name.to_string()));
        }
        schema
    }

    #[test]
    fn test_primitive_type_from_str() {
        assert_eq!(PrimitiveType::try_from_str("int32"), Some(PrimitiveType::Int32));
        assert_eq!(PrimitiveType::try_from_str("time"), Some(PrimitiveType::Time));
        assert_eq!(PrimitiveType::try_from_str("double"), None);
        assert_eq!(PrimitiveType::try_from_str("unknown"), None);
    }

    #[test]
    fn test_primitive_sizes() {
        assert_eq!(PrimitiveType::Duration.size(), Some(8));
        assert_eq!(PrimitiveType::Char.size(), Some(1));
        assert_eq!(PrimitiveType::String.size(), None);
    }

    #[test]
    fn test_resolve_header_shorthand() {
        let schema = schema_with(&["pkg/Root", "std_msgs/Header"]);
        let t = schema.resolve("Header", "pkg/Root").unwrap();
        assert_eq!(t.name, "std_msgs/Header");
        assert!(t.is_header());
    }

    #[test]
    fn test_resolve_same_package() {
        let schema = schema_with(&["pkg/Root", "pkg/Inner", "other/Inner"]);
        assert_eq!(schema.resolve("Inner", "pkg/Root").unwrap().name, "pkg/Inner");
        assert_eq!(schema.resolve("Inner", "other/Thing").unwrap().name, "other/Inner");
    }

    #[test]
    fn test_resolve_ros2_spelling() {
        let schema = schema_with(&["geometry_msgs/Point"]);
        assert_eq!(
            schema.resolve("geometry_msgs/msg/Point", "pkg/Root").unwrap().name,
            "geometry_msgs/Point"
        );
        assert!(schema.resolve("geometry_msgs/Pose", "pkg/Root").is_none());
    }

    #[test]
    fn test_package_of() {
        assert_eq!(package_of("std_msgs/String"), Some("std_msgs"));
        assert_eq!(package_of("String"), None);
        assert_eq!(package_of("/String"), None);
    }
}
