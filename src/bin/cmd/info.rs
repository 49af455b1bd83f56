// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Info command - bag metadata summary.

use clap::Args;
use rosbag_v2_bridge::ReadOnlyStorage;

use crate::common::{format_duration, format_size, format_timestamp, BagArgs, Result};

/// Show bag metadata.
#[derive(Args, Clone, Debug)]
pub struct InfoCmd {
    #[command(flatten)]
    bag: BagArgs,

    /// Print the metadata as JSON
    #[arg(long)]
    json: bool,
}

impl InfoCmd {
    pub fn run(self) -> Result<()> {
        let storage = self.bag.open()?;
        let metadata = storage.get_metadata()?;

        if self.json {
            println!("{}", serde_json::to_string_pretty(&metadata)?);
            return Ok(());
        }

        println!("Files:             {}", metadata.relative_file_paths.join(", "));
        println!("Bag size:          {}", format_size(metadata.bag_size));
        println!("Storage id:        {}", metadata.storage_identifier);
        println!("Duration:          {}", format_duration(metadata.duration));
        println!("Start:             {}", format_timestamp(metadata.starting_time));
        println!(
            "End:               {}",
            format_timestamp(metadata.starting_time + metadata.duration)
        );
        println!("Messages:          {}", metadata.message_count);

        let topics = &metadata.topics_with_message_count;
        if topics.is_empty() {
            println!("Topic information:");
            return Ok(());
        }
        for (i, info) in topics.iter().enumerate() {
            let label = if i == 0 { "Topic information: " } else { "                   " };
            println!(
                "{label}Topic: {} | Type: {} | Count: {} | Serialization Format: {}",
                info.topic_metadata.name,
                info.topic_metadata.type_name,
                info.message_count,
                info.topic_metadata.serialization_format
            );
        }

        Ok(())
    }
}
