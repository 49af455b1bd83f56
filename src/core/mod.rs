// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Core types used throughout the bridge.
//!
//! - [`BridgeError`] - error handling with coarse [`ErrorKind`] classes
//! - [`CodecValue`] - unified value representation for decoded messages
//! - [`TypeRegistry`] - thread-safe name-keyed registry

pub mod error;
pub mod registry;
pub mod value;

pub use error::{BridgeError, ErrorKind, Result};
pub use registry::TypeRegistry;
pub use value::{CodecValue, DecodedMessage};
