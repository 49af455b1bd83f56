// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Topic-filtered view over a bag.

use std::collections::HashSet;
use std::sync::Arc;

use super::{Bag, BagMessage, ConnectionRecord, IndexEntry};
use crate::core::{BridgeError, Result};

/// Time-ordered projection of a bag onto a set of topics.
///
/// Building a view never reads message data; it only filters the index.
#[derive(Debug, Clone)]
pub struct BagView {
    bag: Arc<Bag>,
    connection_ids: Vec<u32>,
    entries: Vec<IndexEntry>,
}

impl BagView {
    /// Build a view over `topics`, or over every topic when `None`.
    pub fn new(bag: Arc<Bag>, topics: Option<&[String]>) -> Self {
        let connection_ids: Vec<u32> = match topics {
            None => bag.connections().iter().map(|c| c.id).collect(),
            Some(topics) => {
                let wanted: HashSet<&str> = topics.iter().map(String::as_str).collect();
                bag.connections()
                    .iter()
                    .filter(|c| wanted.contains(c.topic.as_str()))
                    .map(|c| c.id)
                    .collect()
            }
        };
        let entries = if topics.is_none() {
            bag.index().to_vec()
        } else {
            let ids: HashSet<u32> = connection_ids.iter().copied().collect();
            bag.index()
                .iter()
                .filter(|e| ids.contains(&e.conn_id))
                .copied()
                .collect()
        };
        Self {
            bag,
            connection_ids,
            entries,
        }
    }

    /// Number of messages in the view.
    pub fn size(&self) -> usize {
        self.entries.len()
    }

    /// True when the view holds no messages.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Time of the earliest message (ns).
    pub fn begin_time(&self) -> Option<u64> {
        self.entries.first().map(|e| e.time)
    }

    /// Time of the latest message (ns).
    pub fn end_time(&self) -> Option<u64> {
        self.entries.last().map(|e| e.time)
    }

    /// Connections included in the view, ordered by id.
    pub fn connections(&self) -> Vec<&ConnectionRecord> {
        self.connection_ids
            .iter()
            .filter_map(|&id| self.bag.connection(id))
            .collect()
    }

    /// Read the `index`-th message of the view.
    pub fn message_at(&self, index: usize) -> Result<BagMessage> {
        let entry = self.entries.get(index).ok_or(BridgeError::EndOfStream)?;
        self.bag.read_message(entry)
    }

    /// Iterate messages in time order.
    pub fn iter(&self) -> BagViewIter<'_> {
        BagViewIter {
            view: self,
            position: 0,
        }
    }
}

/// Iterator over the messages of a [`BagView`].
pub struct BagViewIter<'a> {
    view: &'a BagView,
    position: usize,
}

impl Iterator for BagViewIter<'_> {
    type Item = Result<BagMessage>;

    fn next(&mut self) -> Option<Self::Item> {
        let entry = self.view.entries.get(self.position)?;
        self.position += 1;
        Some(self.view.bag.read_message(entry))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.view.entries.len() - self.position;
        (remaining, Some(remaining))
    }
}

impl<'a> IntoIterator for &'a BagView {
    type Item = Result<BagMessage>;
    type IntoIter = BagViewIter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
