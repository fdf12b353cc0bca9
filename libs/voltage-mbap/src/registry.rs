//! Transaction registry
//!
//! Maps transaction ids to the request that produced them. Ids come from a
//! client-owned 16-bit counter that starts at 1 and wraps 0xFFFF -> 0x0000.
//! With more than 65536 requests outstanding a new registration replaces the
//! older entry under the same id; nothing guards against that.

use std::collections::HashMap;

use tracing::{debug, warn};

use crate::request::Request;

/// Pending requests keyed by transaction id
#[derive(Debug)]
pub struct TransactionRegistry {
    pending: HashMap<u16, Request>,
    next_transaction_id: u16,
}

impl Default for TransactionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl TransactionRegistry {
    pub fn new() -> Self {
        Self {
            pending: HashMap::new(),
            next_transaction_id: 1,
        }
    }

    /// Hand out the current counter value and advance it
    pub fn allocate(&mut self) -> u16 {
        let id = self.next_transaction_id;
        // Wraps naturally from 0xFFFF to 0x0000
        self.next_transaction_id = self.next_transaction_id.wrapping_add(1);
        id
    }

    /// Id the next `allocate` will return
    pub fn peek_next(&self) -> u16 {
        self.next_transaction_id
    }

    pub fn register(&mut self, transaction_id: u16, request: Request) {
        if self.pending.insert(transaction_id, request).is_some() {
            warn!(
                "Transaction {:04X} re-registered while still pending",
                transaction_id
            );
        }
        debug!(
            "Registered trans_id={:04X}, pending={}",
            transaction_id,
            self.pending.len()
        );
    }

    /// Remove and return the request for `transaction_id`
    pub fn take(&mut self, transaction_id: u16) -> Option<Request> {
        self.pending.remove(&transaction_id)
    }

    pub fn contains(&self, transaction_id: u16) -> bool {
        self.pending.contains_key(&transaction_id)
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Outstanding transaction ids, unordered
    pub fn pending_ids(&self) -> Vec<u16> {
        self.pending.keys().copied().collect()
    }
}
