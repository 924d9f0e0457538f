// -------------------------------------------------------------------------------------------------
//  Copyright (C) 2026 traderepublic-rs contributors. All rights reserved.
//
//  Licensed under the GNU Lesser General Public License Version 3.0 (the "License");
//  You may not use this file except in compliance with the License.
//  You may obtain a copy of the License at https://www.gnu.org/licenses/lgpl-3.0.en.html
//
//  Unless required by applicable law or agreed to in writing, software
//  distributed under the License is distributed on an "AS IS" BASIS,
//  WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
//  See the License for the specific language governing permissions and
//  limitations under the License.
// -------------------------------------------------------------------------------------------------

//! Subscription identifier allocation and consumer routing state.
//!
//! The registry is the gating mechanism for inbound routing: a frame whose id
//! has no entry is dropped silently. Unsubscribe therefore never removes an
//! entry locally; only the server's close frame (or a full disconnect) evicts
//! it, which keeps in-flight snapshots and deltas routing correctly.

use std::sync::atomic::{AtomicU64, Ordering};

use ahash::AHashMap;
use serde_json::Value;
use tokio::sync::mpsc::UnboundedSender;

use super::messages::SubscriptionEvent;
use crate::common::consts::RESERVED_CONNECT_ID;

/// Allocates monotonically increasing subscription identifiers.
///
/// The counter starts at 1 and skips the reserved handshake id so long-lived
/// sessions never collide with it.
#[derive(Debug)]
pub struct SubscriptionIdAllocator {
    next: AtomicU64,
}

impl Default for SubscriptionIdAllocator {
    fn default() -> Self {
        Self::new()
    }
}

impl SubscriptionIdAllocator {
    /// Creates a new allocator starting at 1.
    #[must_use]
    pub fn new() -> Self {
        Self {
            next: AtomicU64::new(1),
        }
    }

    /// Returns the next free identifier.
    #[must_use]
    pub fn next_id(&self) -> u64 {
        loop {
            let id = self.next.fetch_add(1, Ordering::Relaxed);
            if id != RESERVED_CONNECT_ID {
                return id;
            }
        }
    }
}

/// State held for one active subscription.
#[derive(Debug)]
pub struct SubscriptionEntry {
    /// The caller-supplied topic, echoed on unsubscribe.
    pub topic: Value,
    /// Consumer channel for decoded documents and the close notification.
    pub event_tx: UnboundedSender<SubscriptionEvent>,
    /// Raw text of the last snapshot, the base for delta application.
    ///
    /// Absent until the first `A` frame arrives.
    pub last_snapshot: Option<String>,
}

/// Maps subscription identifiers to their consumer state.
#[derive(Debug, Default)]
pub struct SubscriptionRegistry {
    entries: AHashMap<u64, SubscriptionEntry>,
}

impl SubscriptionRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Installs an entry for `id`, returning any entry it replaced.
    pub fn install(
        &mut self,
        id: u64,
        topic: Value,
        event_tx: UnboundedSender<SubscriptionEvent>,
    ) -> Option<SubscriptionEntry> {
        self.entries.insert(
            id,
            SubscriptionEntry {
                topic,
                event_tx,
                last_snapshot: None,
            },
        )
    }

    /// Removes and returns the entry for `id`.
    pub fn remove(&mut self, id: u64) -> Option<SubscriptionEntry> {
        self.entries.remove(&id)
    }

    /// Returns a mutable reference to the entry for `id`.
    pub fn get_mut(&mut self, id: u64) -> Option<&mut SubscriptionEntry> {
        self.entries.get_mut(&id)
    }

    /// Returns whether an entry exists for `id`.
    #[must_use]
    pub fn contains(&self, id: u64) -> bool {
        self.entries.contains_key(&id)
    }

    /// Returns the number of active entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns whether the registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drops all entries, closing every consumer channel.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
