use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{OwnerHandle, PropertyId};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePropertyRequest {
    pub name: String,
    pub price: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InquiryRequest {
    pub property_id: PropertyId,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionAction {
    Added,
    Bought,
}

/// Entry in the ledger's audit log. Read-only on the client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionRecord {
    pub property_id: PropertyId,
    pub property_name: String,
    pub price: u64,
    pub action: TransactionAction,
    pub actor: OwnerHandle,
    pub occurred_at: DateTime<Utc>,
}

/// Raw wire form of an ownership-transfer reply. The ledger answers with
/// `{"ok": "..."}` or `{"err": "..."}`; anything else is malformed.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TransferReply {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ok: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub err: Option<String>,
}

/// Interpreted form of a transfer reply. `ok` wins when both keys are
/// present; a reply carrying neither is `Malformed`, a distinct case from
/// an explicit rejection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransferOutcome {
    Completed(String),
    Rejected(String),
    Malformed,
}

impl From<TransferReply> for TransferOutcome {
    fn from(reply: TransferReply) -> Self {
        if let Some(message) = reply.ok {
            TransferOutcome::Completed(message)
        } else if let Some(reason) = reply.err {
            TransferOutcome::Rejected(reason)
        } else {
            TransferOutcome::Malformed
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ok_reply_completes() {
        let reply: TransferReply = serde_json::from_str(r#"{"ok":"transferred"}"#).expect("json");
        assert_eq!(
            TransferOutcome::from(reply),
            TransferOutcome::Completed("transferred".into())
        );
    }

    #[test]
    fn err_reply_rejects() {
        let reply: TransferReply =
            serde_json::from_str(r#"{"err":"already leased"}"#).expect("json");
        assert_eq!(
            TransferOutcome::from(reply),
            TransferOutcome::Rejected("already leased".into())
        );
    }

    #[test]
    fn empty_reply_is_malformed() {
        let reply: TransferReply = serde_json::from_str("{}").expect("json");
        assert_eq!(TransferOutcome::from(reply), TransferOutcome::Malformed);
    }

    #[test]
    fn ok_wins_when_both_keys_present() {
        let reply: TransferReply =
            serde_json::from_str(r#"{"ok":"done","err":"ignored"}"#).expect("json");
        assert_eq!(
            TransferOutcome::from(reply),
            TransferOutcome::Completed("done".into())
        );
    }
}
