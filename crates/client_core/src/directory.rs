use std::sync::Arc;

use shared::domain::Property;

/// Lifecycle of the mirrored directory: `Empty` until the first successful
/// refresh, `Loading` while one is outstanding, `Ready` afterwards. A failed
/// refresh falls back to the prior terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirectoryPhase {
    Empty,
    Loading,
    Ready,
}

/// Handle for one refresh round-trip. Sequence numbers increase
/// monotonically with each issued refresh; a response only applies if
/// nothing newer has been applied first.
#[derive(Debug, Clone, Copy)]
#[must_use = "a refresh ticket must be completed or failed"]
pub struct RefreshTicket {
    seq: u64,
}

/// Single-owner mirror of the remote property catalog. The snapshot is
/// replaced wholesale on each applied refresh, never patched, so readers
/// always observe an internally consistent catalog.
#[derive(Debug)]
pub struct PropertyDirectory {
    snapshot: Arc<Vec<Property>>,
    issued: u64,
    applied: u64,
    outstanding: u32,
}

impl Default for PropertyDirectory {
    fn default() -> Self {
        Self::new()
    }
}

impl PropertyDirectory {
    pub fn new() -> Self {
        Self {
            snapshot: Arc::new(Vec::new()),
            issued: 0,
            applied: 0,
            outstanding: 0,
        }
    }

    pub fn phase(&self) -> DirectoryPhase {
        if self.outstanding > 0 {
            DirectoryPhase::Loading
        } else if self.applied > 0 {
            DirectoryPhase::Ready
        } else {
            DirectoryPhase::Empty
        }
    }

    pub fn is_refreshing(&self) -> bool {
        self.outstanding > 0
    }

    pub fn begin_refresh(&mut self) -> RefreshTicket {
        self.issued += 1;
        self.outstanding += 1;
        RefreshTicket { seq: self.issued }
    }

    /// Replaces the snapshot wholesale. Returns `false` when a newer
    /// response was applied first and this one is discarded as superseded
    /// (last-request-wins; an older response never overwrites a newer one).
    pub fn complete_refresh(&mut self, ticket: RefreshTicket, properties: Vec<Property>) -> bool {
        self.outstanding = self.outstanding.saturating_sub(1);
        if ticket.seq <= self.applied {
            return false;
        }
        self.applied = ticket.seq;
        self.snapshot = Arc::new(properties);
        true
    }

    /// A failed refresh leaves the last good snapshot intact
    /// (stale-but-available).
    pub fn fail_refresh(&mut self, _ticket: RefreshTicket) {
        self.outstanding = self.outstanding.saturating_sub(1);
    }

    /// Current snapshot; empty before the first successful refresh. Never
    /// suspends.
    pub fn read(&self) -> Arc<Vec<Property>> {
        Arc::clone(&self.snapshot)
    }
}
