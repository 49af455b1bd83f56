// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Core error types for the bag bridge.
//!
//! Every failure the bridge can surface is a [`BridgeError`]. Variants are
//! grouped into the coarse [`ErrorKind`] classes a replay host acts on:
//! configuration and I/O failures are fatal for the call that produced them,
//! format and decode failures are scoped to a single record and leave the
//! storage usable for the next one.

use thiserror::Error;

/// Coarse classification of a [`BridgeError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Invalid open mode or invalid mapping configuration. Raised before any I/O.
    Configuration,
    /// Missing, unreadable, truncated or unindexed container, or storage not open.
    Io,
    /// A raw payload violates the `<type>\0<bytes>` framing.
    Format,
    /// No codec for the legacy type, or the codec rejected the bytes.
    Decode,
    /// API contract violation by the caller (e.g. reading past the end).
    Usage,
}

impl ErrorKind {
    /// Get string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Configuration => "configuration",
            ErrorKind::Io => "io",
            ErrorKind::Format => "format",
            ErrorKind::Decode => "decode",
            ErrorKind::Usage => "usage",
        }
    }
}

/// Errors that can occur while reading a legacy bag or decoding its payloads.
#[derive(Debug, Clone, Error)]
pub enum BridgeError {
    /// Invalid configuration (open mode, mapping file)
    #[error("Configuration error: {message}")]
    Configuration {
        /// Error message
        message: String,
    },

    /// File system level failure
    #[error("I/O error in {context}: {message}")]
    Io {
        /// Operation that failed
        context: String,
        /// Error message
        message: String,
    },

    /// The container itself is malformed (bad magic, truncated record, no index)
    #[error("Malformed bag in {context}: {message}")]
    Container {
        /// What was being read
        context: String,
        /// Error message
        message: String,
    },

    /// The storage was used before `open` succeeded
    #[error("Storage is not open")]
    NotOpen,

    /// Raw payload framing violation
    #[error("Format error in {context}: {message}")]
    Format {
        /// What was being parsed
        context: String,
        /// Error message
        message: String,
    },

    /// Parse error in a message definition
    #[error("Parse error in {context}: {message}")]
    Parse {
        /// What was being parsed
        context: String,
        /// Error message
        message: String,
    },

    /// No codec registered for a legacy type
    #[error("Type not found: '{type_name}'")]
    TypeNotFound {
        /// Type name that was not found
        type_name: String,
    },

    /// Buffer too short for requested read
    #[error(
        "Buffer too short: requested {requested} bytes at position {cursor_pos}, but only {available} bytes available"
    )]
    BufferTooShort {
        /// Requested bytes
        requested: usize,
        /// Available bytes
        available: usize,
        /// Cursor position when error occurred
        cursor_pos: u64,
    },

    /// Array or string length exceeded data bounds
    #[error("Length {length} exceeds buffer at position {position} (buffer length: {buffer_len})")]
    LengthExceeded {
        /// Length that was read
        length: usize,
        /// Position in buffer
        position: usize,
        /// Buffer length
        buffer_len: usize,
    },

    /// Codec rejected the payload
    #[error("Failed to decode '{type_name}': {message}")]
    Decode {
        /// Legacy type being decoded
        type_name: String,
        /// Error message
        message: String,
    },

    /// `read_next` was called after the iterator reached the end
    #[error("read_next called with no message left in the view")]
    EndOfStream,

    /// Other error
    #[error("Other error: {0}")]
    Other(String),
}

impl BridgeError {
    /// Create a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        BridgeError::Configuration {
            message: message.into(),
        }
    }

    /// Create an I/O error.
    pub fn io(context: impl Into<String>, message: impl Into<String>) -> Self {
        BridgeError::Io {
            context: context.into(),
            message: message.into(),
        }
    }

    /// Create a malformed container error.
    pub fn container(context: impl Into<String>, message: impl Into<String>) -> Self {
        BridgeError::Container {
            context: context.into(),
            message: message.into(),
        }
    }

    /// Create a payload format error.
    pub fn format(context: impl Into<String>, message: impl Into<String>) -> Self {
        BridgeError::Format {
            context: context.into(),
            message: message.into(),
        }
    }

    /// Create a parse error.
    pub fn parse(context: impl Into<String>, message: impl Into<String>) -> Self {
        BridgeError::Parse {
            context: context.into(),
            message: message.into(),
        }
    }

    /// Create a "type not found" error.
    pub fn type_not_found(type_name: impl Into<String>) -> Self {
        BridgeError::TypeNotFound {
            type_name: type_name.into(),
        }
    }

    /// Create a decode error.
    pub fn decode(type_name: impl Into<String>, message: impl Into<String>) -> Self {
        BridgeError::Decode {
            type_name: type_name.into(),
            message: message.into(),
        }
    }

    /// Create a buffer too short error.
    pub fn buffer_too_short(requested: usize, available: usize, cursor_pos: u64) -> Self {
        BridgeError::BufferTooShort {
            requested,
            available,
            cursor_pos,
        }
    }

    /// Create a length exceeded error.
    pub fn length_exceeded(length: usize, position: usize, buffer_len: usize) -> Self {
        BridgeError::LengthExceeded {
            length,
            position,
            buffer_len,
        }
    }

    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            BridgeError::Configuration { .. } => ErrorKind::Configuration,
            BridgeError::Io { .. } | BridgeError::Container { .. } | BridgeError::NotOpen => {
                ErrorKind::Io
            }
            BridgeError::Format { .. } => ErrorKind::Format,
            BridgeError::Parse { .. }
            | BridgeError::TypeNotFound { .. }
            | BridgeError::BufferTooShort { .. }
            | BridgeError::LengthExceeded { .. }
            | BridgeError::Decode { .. } => ErrorKind::Decode,
            BridgeError::EndOfStream | BridgeError::Other(_) => ErrorKind::Usage,
        }
    }

    /// Whether this error only affects the record being processed.
    ///
    /// Per-record errors leave the storage positioned at the next record, so a
    /// caller may log them and keep replaying.
    pub fn is_per_record(&self) -> bool {
        matches!(self.kind(), ErrorKind::Format | ErrorKind::Decode)
    }

    /// Get structured fields for logging.
    pub fn log_fields(&self) -> Vec<(&'static str, String)> {
        let mut fields = vec![("kind", self.kind().as_str().to_string())];
        match self {
            BridgeError::Configuration { message } => fields.push(("message", message.clone())),
            BridgeError::Io { context, message }
            | BridgeError::Container { context, message }
            | BridgeError::Format { context, message }
            | BridgeError::Parse { context, message } => {
                fields.push(("context", context.clone()));
                fields.push(("message", message.clone()));
            }
            BridgeError::TypeNotFound { type_name } => fields.push(("type", type_name.clone())),
            BridgeError::BufferTooShort {
                requested,
                available,
                cursor_pos,
            } => {
                fields.push(("requested", requested.to_string()));
                fields.push(("available", available.to_string()));
                fields.push(("cursor", cursor_pos.to_string()));
            }
            BridgeError::LengthExceeded {
                length,
                position,
                buffer_len,
            } => {
                fields.push(("length", length.to_string()));
                fields.push(("position", position.to_string()));
                fields.push(("buffer_len", buffer_len.to_string()));
            }
            BridgeError::Decode { type_name, message } => {
                fields.push(("type", type_name.clone()));
                fields.push(("message", message.clone()));
            }
            BridgeError::NotOpen | BridgeError::EndOfStream => {}
            BridgeError::Other(msg) => fields.push(("message", msg.clone())),
        }
        fields
    }
}

impl From<std::io::Error> for BridgeError {
    fn from(err: std::io::Error) -> Self {
        BridgeError::Io {
            context: "io".to_string(),
            message: err.to_string(),
        }
    }
}

/// Result type for bridge operations.
pub type Result<T> = std::result::Result<T, BridgeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_error() {
        let err = BridgeError::format("type tag", "no terminator");
        assert_eq!(err.kind(), ErrorKind::Format);
        assert!(err.is_per_record());
        assert_eq!(err.to_string(), "Format error in type tag: no terminator");
    }

    #[test]
    fn test_configuration_error() {
        let err = BridgeError::configuration("read only");
        assert_eq!(err.kind(), ErrorKind::Configuration);
        assert!(!err.is_per_record());
        assert_eq!(err.to_string(), "Configuration error: read only");
    }

    #[test]
    fn test_container_errors_are_io() {
        assert_eq!(BridgeError::container("index", "eof").kind(), ErrorKind::Io);
        assert_eq!(BridgeError::NotOpen.kind(), ErrorKind::Io);
        assert_eq!(BridgeError::io("open", "denied").kind(), ErrorKind::Io);
    }

    #[test]
    fn test_decode_family() {
        for err in [
            BridgeError::type_not_found("pkg/Type"),
            BridgeError::buffer_too_short(4, 1, 0),
            BridgeError::length_exceeded(100, 4, 8),
            BridgeError::decode("pkg/Type", "bad"),
            BridgeError::parse("msg", "bad line"),
        ] {
            assert_eq!(err.kind(), ErrorKind::Decode, "{err}");
            assert!(err.is_per_record());
        }
    }

    #[test]
    fn test_type_not_found_display() {
        let err = BridgeError::type_not_found("UnknownType");
        assert_eq!(err.to_string(), "Type not found: 'UnknownType'");
    }

    #[test]
    fn test_buffer_too_short_display() {
        let err = BridgeError::buffer_too_short(100, 50, 10);
        assert_eq!(
            err.to_string(),
            "Buffer too short: requested 100 bytes at position 10, but only 50 bytes available"
        );
    }

    #[test]
    fn test_end_of_stream_is_usage() {
        assert_eq!(BridgeError::EndOfStream.kind(), ErrorKind::Usage);
        assert!(!BridgeError::EndOfStream.is_per_record());
    }

    #[test]
    fn test_log_fields_buffer_too_short() {
        let fields = BridgeError::buffer_too_short(100, 50, 10).log_fields();
        assert_eq!(fields.len(), 4);
        assert_eq!(fields[0], ("kind", "decode".to_string()));
        assert_eq!(fields[1], ("requested", "100".to_string()));
        assert_eq!(fields[2], ("available", "50".to_string()));
        assert_eq!(fields[3], ("cursor", "10".to_string()));
    }

    #[test]
    fn test_log_fields_type_not_found() {
        let fields = BridgeError::type_not_found("MyType").log_fields();
        assert_eq!(fields, vec![("kind", "decode".to_string()), ("type", "MyType".to_string())]);
    }

    #[test]
    fn test_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: BridgeError = io_err.into();
        assert_eq!(err.kind(), ErrorKind::Io);
        assert_eq!(err.to_string(), "I/O error in io: file not found");
    }
}
