use std::collections::HashMap;

use async_trait::async_trait;
use hashledger_core::{NewReceipt, Receipt};
use tokio::sync::Mutex;

use crate::error::LedgerError;
use crate::types::{LedgerKind, ReceiptLedger};

/// Process-local ledger. Nothing survives a restart.
#[derive(Debug, Default)]
pub struct InMemoryReceiptLedger {
    state: Mutex<State>,
}

#[derive(Debug, Default)]
struct State {
    /// Receipt plus the write sequence it was stored at.
    by_session: HashMap<String, (u64, Receipt)>,
    next_seq: u64,
}

impl InMemoryReceiptLedger {
    async fn upsert(&self, receipt: Receipt) -> Receipt {
        let mut state = self.state.lock().await;
        state.next_seq += 1;
        let seq = state.next_seq;
        state
            .by_session
            .insert(receipt.session_id.clone(), (seq, receipt.clone()));
        receipt
    }
}

#[async_trait]
impl ReceiptLedger for InMemoryReceiptLedger {
    async fn register(&self, new: NewReceipt) -> Result<Receipt, LedgerError> {
        Ok(self.upsert(new.issue()).await)
    }

    async fn get_by_session_id(&self, session_id: &str) -> Result<Option<Receipt>, LedgerError> {
        Ok(self
            .state
            .lock()
            .await
            .by_session
            .get(session_id)
            .map(|(_, r)| r.clone()))
    }

    async fn get_by_hash(&self, session_hash: &str) -> Result<Option<Receipt>, LedgerError> {
        Ok(self
            .state
            .lock()
            .await
            .by_session
            .values()
            .filter(|(_, r)| r.session_hash == session_hash)
            .min_by_key(|(seq, r)| (r.first_seen_at, *seq))
            .map(|(_, r)| r.clone()))
    }

    async fn get_by_receipt_id(&self, receipt_id: &str) -> Result<Option<Receipt>, LedgerError> {
        Ok(self
            .state
            .lock()
            .await
            .by_session
            .values()
            .find(|(_, r)| r.receipt_id == receipt_id)
            .map(|(_, r)| r.clone()))
    }

    fn kind(&self) -> LedgerKind {
        LedgerKind::Memory
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn same_instant_hash_tie_goes_to_first_registration() {
        let ledger = InMemoryReceiptLedger::default();
        let at = chrono::Utc::now();
        let first = ledger
            .upsert(NewReceipt::new("zz-first", "h").issue_at(at))
            .await;
        ledger
            .upsert(NewReceipt::new("aa-second", "h").issue_at(at))
            .await;

        assert_eq!(ledger.get_by_hash("h").await.unwrap(), Some(first));
    }
}
