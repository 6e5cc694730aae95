//! Sequence-numbered request tickets.
//!
//! Every request is issued a ticket carrying a per-kind sequence number.
//! Only the most recently issued ticket of a kind is accepted; older tickets
//! and tickets issued before [`RequestSequencer::invalidate_all`] (image
//! reload, reset) are stale and their responses are dropped.

use serde::{Deserialize, Serialize};

/// Backend request kinds tracked independently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RequestKind {
    Landmarks,
    Analysis,
}

impl RequestKind {
    fn slot(&self) -> usize {
        match self {
            RequestKind::Landmarks => 0,
            RequestKind::Analysis => 1,
        }
    }
}

/// Handle for one outstanding request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestTicket {
    pub kind: RequestKind,
    pub seq: u64,
}

#[derive(Debug, Clone, Default)]
pub struct RequestSequencer {
    next_seq: u64,
    latest: [Option<u64>; 2],
}

impl RequestSequencer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue a ticket, superseding any outstanding request of the same kind.
    pub fn issue(&mut self, kind: RequestKind) -> RequestTicket {
        self.next_seq += 1;
        self.latest[kind.slot()] = Some(self.next_seq);
        RequestTicket {
            kind,
            seq: self.next_seq,
        }
    }

    /// Whether a request of this kind is still outstanding.
    pub fn is_pending(&self, kind: RequestKind) -> bool {
        self.latest[kind.slot()].is_some()
    }

    /// Accept the response for `ticket`. Returns false (and leaves state
    /// alone) when the ticket is stale.
    pub fn accept(&mut self, ticket: RequestTicket) -> bool {
        let slot = &mut self.latest[ticket.kind.slot()];
        if *slot == Some(ticket.seq) {
            *slot = None;
            true
        } else {
            log::debug!("Dropping stale {:?} response #{}", ticket.kind, ticket.seq);
            false
        }
    }

    /// Make every outstanding ticket stale.
    pub fn invalidate_all(&mut self) {
        self.latest = [None; 2];
    }
}
