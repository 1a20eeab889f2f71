use std::collections::HashMap;

use roomsvital_core::RoomId;

use crate::config::LockOrdering;

/// Identifies one lock toggle request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct LockTicket {
    pub seq: u64,
    /// Cached value before this toggle.
    pub previous: bool,
}

#[derive(Debug)]
struct InFlight {
    latest: u64,
    /// Highest sequence the store has accepted.
    accepted: u64,
    /// Last value known to be stored.
    confirmed: bool,
    pending: usize,
}

/// Per-room bookkeeping for optimistic lock toggles.
///
/// Entries exist only while a toggle for that room is unresolved.
pub struct LockLedger {
    ordering: LockOrdering,
    in_flight: HashMap<RoomId, InFlight>,
}

impl LockLedger {
    pub fn new(ordering: LockOrdering) -> Self {
        Self {
            ordering,
            in_flight: HashMap::new(),
        }
    }

    pub fn pending(&self, id: &RoomId) -> usize {
        self.in_flight.get(id).map_or(0, |f| f.pending)
    }

    /// Records a toggle away from `previous`. When nothing is in flight the
    /// cached value is taken as the stored one.
    pub fn issue(&mut self, id: &RoomId, previous: bool) -> LockTicket {
        let entry = self.in_flight.entry(id.clone()).or_insert(InFlight {
            latest: 0,
            accepted: 0,
            confirmed: previous,
            pending: 0,
        });
        entry.latest += 1;
        entry.pending += 1;
        LockTicket {
            seq: entry.latest,
            previous,
        }
    }

    pub fn accepted(&mut self, id: &RoomId, ticket: LockTicket) {
        if let Some(entry) = self.in_flight.get_mut(id) {
            if ticket.seq > entry.accepted {
                entry.accepted = ticket.seq;
                entry.confirmed = !ticket.previous;
            }
        }
        self.settle(id);
    }

    /// The value to put back into the cache after `ticket` failed, or
    /// `None` if the failure must not touch the cache.
    pub fn rejected(&mut self, id: &RoomId, ticket: LockTicket) -> Option<bool> {
        let restore = match self.ordering {
            LockOrdering::LastResponseWins => Some(ticket.previous),
            LockOrdering::LatestRequestWins => self
                .in_flight
                .get(id)
                .filter(|entry| entry.latest == ticket.seq)
                .map(|entry| entry.confirmed),
        };
        self.settle(id);
        restore
    }

    fn settle(&mut self, id: &RoomId) {
        if let Some(entry) = self.in_flight.get_mut(id) {
            entry.pending = entry.pending.saturating_sub(1);
            if entry.pending == 0 {
                self.in_flight.remove(id);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn room() -> RoomId {
        RoomId::new("12")
    }

    #[test]
    fn last_response_restores_own_previous() {
        let mut ledger = LockLedger::new(LockOrdering::LastResponseWins);
        let a = ledger.issue(&room(), false);
        let b = ledger.issue(&room(), true);
        assert_eq!(ledger.rejected(&room(), a), Some(false));
        assert_eq!(ledger.rejected(&room(), b), Some(true));
        assert_eq!(ledger.pending(&room()), 0);
    }

    #[test]
    fn stale_failure_is_ignored() {
        let mut ledger = LockLedger::new(LockOrdering::LatestRequestWins);
        let a = ledger.issue(&room(), false);
        let b = ledger.issue(&room(), true);
        assert_eq!(ledger.rejected(&room(), a), None);
        // Nothing was stored, so the newest failure falls back to the original value.
        assert_eq!(ledger.rejected(&room(), b), Some(false));
    }

    #[test]
    fn latest_failure_restores_last_accepted() {
        let mut ledger = LockLedger::new(LockOrdering::LatestRequestWins);
        let a = ledger.issue(&room(), false);
        let b = ledger.issue(&room(), true);
        ledger.accepted(&room(), a);
        assert_eq!(ledger.rejected(&room(), b), Some(true));
        assert_eq!(ledger.pending(&room()), 0);
    }

    #[test]
    fn entries_are_per_room() {
        let mut ledger = LockLedger::new(LockOrdering::LatestRequestWins);
        let a = ledger.issue(&room(), false);
        let other = RoomId::new("5");
        let b = ledger.issue(&other, true);
        assert_eq!(ledger.rejected(&room(), a), Some(false));
        assert_eq!(ledger.rejected(&other, b), Some(true));
    }
}
