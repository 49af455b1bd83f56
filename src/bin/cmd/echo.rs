// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Echo command - replay and print decoded messages.

use std::collections::HashMap;
use std::io::Write as _;
use std::sync::Arc;

use clap::Args;
use rosbag_v2_bridge::encoding::TypeSupportRegistry;
use rosbag_v2_bridge::{
    ReadOnlyStorage, RosbagV2Deserializer, SerializationFormatDeserializer, TypeSupport,
};
use tracing::warn;

use crate::common::{BagArgs, Result};

/// Print decoded messages as JSON lines.
#[derive(Args, Clone, Debug)]
pub struct EchoCmd {
    #[command(flatten)]
    bag: BagArgs,

    /// Only print these topics (repeatable)
    #[arg(short, long = "topic", value_name = "TOPIC")]
    topics: Vec<String>,

    /// Stop after printing N messages
    #[arg(short = 'n', long, value_name = "N")]
    limit: Option<usize>,
}

impl EchoCmd {
    pub fn run(self) -> Result<()> {
        let mut storage = self.bag.open()?;

        let registry = TypeSupportRegistry::with_builtin()?;
        registry.register_connections(storage.connections()?)?;
        let deserializer = RosbagV2Deserializer::new(Arc::new(registry));

        let type_supports: HashMap<String, TypeSupport> = storage
            .get_all_topics_and_types()?
            .into_iter()
            .map(|t| (t.name, TypeSupport::new(t.type_name)))
            .collect();

        let stdout = std::io::stdout();
        let mut out = stdout.lock();
        let mut printed = 0usize;

        while storage.has_next() {
            if self.limit.is_some_and(|limit| printed >= limit) {
                break;
            }
            let raw = match storage.read_next() {
                Ok(raw) => raw,
                Err(e) => {
                    warn!(error = %e, "skipping unreadable record");
                    continue;
                }
            };
            if !self.topics.is_empty() && !self.topics.contains(&raw.topic_name) {
                continue;
            }
            let Some(type_support) = type_supports.get(&raw.topic_name) else {
                continue;
            };
            match deserializer.deserialize(&raw, type_support) {
                Ok(message) => {
                    serde_json::to_writer(&mut out, &message)?;
                    writeln!(out)?;
                    printed += 1;
                }
                Err(e) if e.is_per_record() => {
                    warn!(
                        topic = %raw.topic_name,
                        time = raw.time_stamp,
                        error = %e,
                        "skipping message"
                    );
                }
                Err(e) => return Err(e.into()),
            }
        }

        Ok(())
    }
}
