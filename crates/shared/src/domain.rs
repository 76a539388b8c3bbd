use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Ledger-assigned property identifier. Stable, never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PropertyId(pub u64);

impl fmt::Display for PropertyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Opaque identity token. Handles are compared only by their canonical
/// string form; the client never inspects their structure.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OwnerHandle(String);

impl OwnerHandle {
    pub fn new(handle: impl Into<String>) -> Self {
        Self(handle.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OwnerHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A property record as mirrored from the ledger. Prices are exact integer
/// currency units and must never pass through a float.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Property {
    pub id: PropertyId,
    pub name: String,
    pub price: u64,
    pub owner: OwnerHandle,
    pub is_leased: bool,
    pub created_at: DateTime<Utc>,
}

impl Property {
    /// Listing label shown next to a record: leased properties are offered
    /// for lease, everything else is offered for purchase.
    pub fn listing_label(&self) -> &'static str {
        if self.is_leased {
            "lease"
        } else {
            "buy"
        }
    }
}
