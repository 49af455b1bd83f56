// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Container I/O and bag metadata.

pub mod formats;
pub mod metadata;

pub use formats::bag::{Bag, BagMessage, BagView, ConnectionRecord};
pub use metadata::{BagMetadata, SerializedBagMessage, TopicInformation, TopicMetadata};
