// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Topics command - replayable and skipped topics.

use clap::Args;
use rosbag_v2_bridge::ReadOnlyStorage;

use crate::common::{BagArgs, Result};

/// List replayable topics.
#[derive(Args, Clone, Debug)]
pub struct TopicsCmd {
    #[command(flatten)]
    bag: BagArgs,

    /// Also list topics that will not be replayed
    #[arg(long)]
    all: bool,
}

impl TopicsCmd {
    pub fn run(self) -> Result<()> {
        let storage = self.bag.open()?;

        for info in storage.get_topic_information()? {
            println!(
                "{} | {} | {} messages",
                info.topic_metadata.name, info.topic_metadata.type_name, info.message_count
            );
        }

        if self.all {
            let replayed = storage.get_all_topics_and_types()?;
            for connection in storage.connections()? {
                if !replayed.iter().any(|t| t.name == connection.topic) {
                    println!(
                        "{} | {} (unmapped, skipped)",
                        connection.topic, connection.legacy_type
                    );
                }
            }
        }

        Ok(())
    }
}
