// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Predefined ROS1 message definitions.
//!
//! Bags normally carry the full definition of every recorded type in their
//! connection records. These built-ins cover the common `std_msgs` and
//! `geometry_msgs` types so payloads can be decoded even when a host has no
//! bag at hand (e.g. when deserializing buffers produced elsewhere).
//!
//! Definitions are stored in the same concatenated form `rosbag` writes:
//! the root body followed by `MSG:` blocks for every dependency.

const SEP: &str = "================================================================================";

const HEADER: &str = "uint32 seq\ntime stamp\nstring frame_id\n";
const POINT: &str = "float64 x\nfloat64 y\nfloat64 z\n";
const QUATERNION: &str = "float64 x\nfloat64 y\nfloat64 z\nfloat64 w\n";

/// Root-only definitions without dependencies.
const FLAT: &[(&str, &str)] = &[
    ("std_msgs/Bool", "bool data\n"),
    ("std_msgs/Byte", "byte data\n"),
    ("std_msgs/Char", "char data\n"),
    ("std_msgs/Float32", "float32 data\n"),
    ("std_msgs/Float64", "float64 data\n"),
    ("std_msgs/Int8", "int8 data\n"),
    ("std_msgs/Int16", "int16 data\n"),
    ("std_msgs/Int32", "int32 data\n"),
    ("std_msgs/Int64", "int64 data\n"),
    ("std_msgs/UInt8", "uint8 data\n"),
    ("std_msgs/UInt16", "uint16 data\n"),
    ("std_msgs/UInt32", "uint32 data\n"),
    ("std_msgs/UInt64", "uint64 data\n"),
    ("std_msgs/String", "string data\n"),
    ("std_msgs/Time", "time data\n"),
    ("std_msgs/Duration", "duration data\n"),
    ("std_msgs/ColorRGBA", "float32 r\nfloat32 g\nfloat32 b\nfloat32 a\n"),
    ("std_msgs/Header", HEADER),
    ("geometry_msgs/Point", POINT),
    ("geometry_msgs/Point32", "float32 x\nfloat32 y\nfloat32 z\n"),
    ("geometry_msgs/Vector3", POINT),
    ("geometry_msgs/Quaternion", QUATERNION),
    ("rosgraph_msgs/Clock", "time clock\n"),
];

/// Definitions with dependencies: (type, root body, dependency types).
const COMPOSED: &[(&str, &str, &[&str])] = &[
    (
        "geometry_msgs/Pose",
        "Point position\nQuaternion orientation\n",
        &["geometry_msgs/Point", "geometry_msgs/Quaternion"],
    ),
    (
        "geometry_msgs/Transform",
        "Vector3 translation\nQuaternion rotation\n",
        &["geometry_msgs/Vector3", "geometry_msgs/Quaternion"],
    ),
    (
        "geometry_msgs/Twist",
        "Vector3 linear\nVector3 angular\n",
        &["geometry_msgs/Vector3"],
    ),
    (
        "geometry_msgs/PointStamped",
        "Header header\nPoint point\n",
        &["std_msgs/Header", "geometry_msgs/Point"],
    ),
    (
        "geometry_msgs/PoseStamped",
        "Header header\nPose pose\n",
        &[
            "std_msgs/Header",
            "geometry_msgs/Pose",
            "geometry_msgs/Point",
            "geometry_msgs/Quaternion",
        ],
    ),
    (
        "geometry_msgs/TwistStamped",
        "Header header\nTwist twist\n",
        &["std_msgs/Header", "geometry_msgs/Twist", "geometry_msgs/Vector3"],
    ),
    (
        "geometry_msgs/TransformStamped",
        "Header header\nstring child_frame_id\nTransform transform\n",
        &[
            "std_msgs/Header",
            "geometry_msgs/Transform",
            "geometry_msgs/Vector3",
            "geometry_msgs/Quaternion",
        ],
    ),
    (
        "tf2_msgs/TFMessage",
        "geometry_msgs/TransformStamped[] transforms\n",
        &[
            "geometry_msgs/TransformStamped",
            "std_msgs/Header",
            "geometry_msgs/Transform",
            "geometry_msgs/Vector3",
            "geometry_msgs/Quaternion",
        ],
    ),
    (
        "rosgraph_msgs/Log",
        "byte DEBUG=1\nbyte INFO=2\nbyte WARN=4\nbyte ERROR=8\nbyte FATAL=16\n\
Header header\nbyte level\nstring name\nstring msg\nstring file\nstring function\n\
uint32 line\nstring[] topics\n",
        &["std_msgs/Header"],
    ),
];

fn body_of(type_name: &str) -> Option<&'static str> {
    FLAT.iter()
        .find(|(name, _)| *name == type_name)
        .map(|(_, body)| *body)
        .or_else(|| {
            COMPOSED
                .iter()
                .find(|(name, _, _)| *name == type_name)
                .map(|(_, body, _)| *body)
        })
}

/// Full concatenated definition text for a built-in type.
pub fn builtin_definition(type_name: &str) -> Option<String> {
    if let Some((_, body)) = FLAT.iter().find(|(name, _)| *name == type_name) {
        return Some(body.to_string());
    }
    let (_, body, deps) = COMPOSED.iter().find(|(name, _, _)| *name == type_name)?;
    let mut text = body.to_string();
    for dep in deps.iter() {
        text.push_str(SEP);
        text.push_str("\nMSG: ");
        text.push_str(dep);
        text.push('\n');
        text.push_str(body_of(dep)?);
    }
    Some(text)
}

/// Names of all built-in types.
pub fn builtin_type_names() -> impl Iterator<Item = &'static str> {
    FLAT.iter()
        .map(|(name, _)| *name)
        .chain(COMPOSED.iter().map(|(name, _, _)| *name))
}
