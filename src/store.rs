use std::time::{Duration, Instant};

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use thiserror::Error;
use tracing::error;
use uuid::Uuid;

use crate::db::snapshot::SnapshotStore;
use crate::models::transaction::{resolve_category, Transaction, TransactionType};

/// How long a deleted transaction stays restorable.
pub const UNDO_WINDOW: Duration = Duration::from_secs(8);

/// Candidate record for the store, before an id and timestamps are assigned.
#[derive(Debug, Clone)]
pub struct TransactionDraft {
    pub date: NaiveDate,
    pub transaction_type: TransactionType,
    pub amount: Decimal,
    pub category: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub reason: String,
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("invalid transaction: {}", format_field_errors(.0))]
    Invalid(Vec<FieldError>),
}

fn format_field_errors(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(|e| format!("{} {}", e.field, e.reason))
        .collect::<Vec<_>>()
        .join(", ")
}

#[derive(Debug, Default, Clone)]
pub struct ListFilter {
    /// Case-insensitive substring matched against description and category.
    pub text: Option<String>,
    /// Exact category (case-insensitive).
    pub category: Option<String>,
    pub transaction_type: Option<TransactionType>,
}

impl ListFilter {
    fn matches(&self, transaction: &Transaction) -> bool {
        if let Some(text) = &self.text {
            let needle = text.to_lowercase();
            let in_description = transaction.description.to_lowercase().contains(&needle);
            let in_category = transaction.category.to_lowercase().contains(&needle);
            if !in_description && !in_category {
                return false;
            }
        }
        if let Some(category) = &self.category {
            if !transaction.category.eq_ignore_ascii_case(category) {
                return false;
            }
        }
        if let Some(transaction_type) = self.transaction_type {
            if transaction.transaction_type != transaction_type {
                return false;
            }
        }
        true
    }
}

struct UndoCandidate {
    transaction: Transaction,
    deleted_at: Instant,
}

/// Single source of truth for the transaction collection. Every mutation goes
/// through here so it can be followed by a full-snapshot persist; the
/// collection itself is never handed out mutably.
pub struct TransactionStore {
    transactions: Vec<Transaction>,
    undo: Option<UndoCandidate>,
    undo_window: Duration,
    snapshot: SnapshotStore,
    storage_warning: Option<String>,
}

impl TransactionStore {
    pub fn open(snapshot: SnapshotStore) -> Self {
        let transactions = snapshot.load_transactions();
        Self {
            transactions,
            undo: None,
            undo_window: UNDO_WINDOW,
            snapshot,
            storage_warning: None,
        }
    }

    #[cfg(test)]
    fn with_undo_window(snapshot: SnapshotStore, undo_window: Duration) -> Self {
        let mut store = Self::open(snapshot);
        store.undo_window = undo_window;
        store
    }

    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }

    /// Read-only view of the collection, most-recent-first.
    pub fn all(&self) -> &[Transaction] {
        &self.transactions
    }

    /// Validates all fields at once and returns the draft with the trimmed
    /// description and the canonical category spelling. Shared by add, update
    /// and the import paths so every entry point enforces the same rules.
    pub fn validate(draft: &TransactionDraft) -> Result<TransactionDraft, Vec<FieldError>> {
        let mut errors = Vec::new();

        if draft.amount <= Decimal::ZERO {
            errors.push(FieldError {
                field: "amount",
                reason: "must be greater than zero".to_string(),
            });
        }

        let description = draft.description.trim();
        if description.is_empty() {
            errors.push(FieldError {
                field: "description",
                reason: "cannot be empty".to_string(),
            });
        }

        let mut category = draft.category.trim().to_string();
        if category.is_empty() {
            errors.push(FieldError {
                field: "category",
                reason: "cannot be empty".to_string(),
            });
        } else {
            match resolve_category(draft.transaction_type, &category) {
                Some(canonical) => category = canonical.to_string(),
                None => errors.push(FieldError {
                    field: "category",
                    reason: format!(
                        "'{}' is not a known {} category",
                        category,
                        draft.transaction_type.as_str()
                    ),
                }),
            }
        }

        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(TransactionDraft {
            date: draft.date,
            transaction_type: draft.transaction_type,
            amount: draft.amount,
            category,
            description: description.to_string(),
        })
    }

    /// Validates the draft, assigns a fresh id and creation timestamp, inserts
    /// at the front and persists. Nothing is mutated on a validation failure.
    pub fn add(&mut self, draft: TransactionDraft) -> Result<Transaction, StoreError> {
        let draft = Self::validate(&draft).map_err(StoreError::Invalid)?;
        let transaction = Transaction {
            id: self.fresh_id(),
            date: draft.date,
            transaction_type: draft.transaction_type,
            amount: draft.amount,
            category: draft.category,
            description: draft.description,
            created_at: Utc::now(),
            updated_at: None,
        };
        self.transactions.insert(0, transaction.clone());
        self.persist();
        Ok(transaction)
    }

    /// Overwrites the record's fields in place, keeping its id, position and
    /// creation timestamp. `Ok(None)` when the id is absent; that only arises
    /// from stale UI state and is not an error.
    pub fn update(
        &mut self,
        id: &str,
        draft: TransactionDraft,
    ) -> Result<Option<Transaction>, StoreError> {
        let Some(index) = self.transactions.iter().position(|t| t.id == id) else {
            return Ok(None);
        };
        let draft = Self::validate(&draft).map_err(StoreError::Invalid)?;

        let record = &mut self.transactions[index];
        record.date = draft.date;
        record.transaction_type = draft.transaction_type;
        record.amount = draft.amount;
        record.category = draft.category;
        record.description = draft.description;
        record.updated_at = Some(Utc::now());
        let updated = record.clone();

        self.persist();
        Ok(Some(updated))
    }

    /// Removes the record and keeps it as the sole undo candidate, replacing
    /// any earlier candidate and restarting the undo window.
    pub fn remove(&mut self, id: &str) -> Option<Transaction> {
        let index = self.transactions.iter().position(|t| t.id == id)?;
        let removed = self.transactions.remove(index);
        self.undo = Some(UndoCandidate {
            transaction: removed.clone(),
            deleted_at: Instant::now(),
        });
        self.persist();
        Some(removed)
    }

    /// Restores the last removed transaction if its undo window has not
    /// elapsed. The record comes back at the front with its original id and
    /// timestamps. Expired or absent candidates make this a no-op.
    pub fn undo_last_removal(&mut self) -> Option<Transaction> {
        let candidate = self.undo.take()?;
        if candidate.deleted_at.elapsed() > self.undo_window {
            return None;
        }
        self.transactions.insert(0, candidate.transaction.clone());
        self.persist();
        Some(candidate.transaction)
    }

    /// Pure read: clones of the matching records in collection order.
    pub fn list(&self, filter: &ListFilter) -> Vec<Transaction> {
        self.transactions
            .iter()
            .filter(|t| filter.matches(t))
            .cloned()
            .collect()
    }

    /// One-shot warning from the last failed persist, for the UI to show as a
    /// notification. The in-memory collection is always kept on such failures;
    /// only durability is at risk.
    pub fn take_storage_warning(&mut self) -> Option<String> {
        self.storage_warning.take()
    }

    fn fresh_id(&self) -> String {
        loop {
            let id = Uuid::new_v4().to_string();
            if !self.transactions.iter().any(|t| t.id == id) {
                return id;
            }
        }
    }

    fn persist(&mut self) {
        if let Err(e) = self.snapshot.save_transactions(&self.transactions) {
            error!(error = %e, "failed to persist transactions");
            self.storage_warning = Some(format!("Failed to save transactions: {}", e));
        }
    }
}
