use std::fs;
use std::path::PathBuf;

use thiserror::Error;
use tracing::warn;

use crate::models::theme::Theme;
use crate::models::transaction::Transaction;

const TRANSACTIONS_KEY: &str = "transactions.json";
const THEME_KEY: &str = "theme";

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("failed to write {key}: {source}")]
    Write {
        key: &'static str,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to serialize {key}: {source}")]
    Serialize {
        key: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

/// File-backed key-value snapshot storage. Two fixed keys live under the data
/// directory: the full serialized transaction collection and the theme string.
/// Reads never fail outward; a missing or corrupt value degrades to the empty
/// collection (or the default theme) with a logged warning.
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    data_dir: PathBuf,
}

impl SnapshotStore {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    pub fn save_transactions(&self, transactions: &[Transaction]) -> Result<(), SnapshotError> {
        let raw = serde_json::to_string_pretty(transactions).map_err(|source| {
            SnapshotError::Serialize {
                key: TRANSACTIONS_KEY,
                source,
            }
        })?;
        self.write_key(TRANSACTIONS_KEY, &raw)
    }

    pub fn load_transactions(&self) -> Vec<Transaction> {
        let Some(raw) = self.read_key(TRANSACTIONS_KEY) else {
            return Vec::new();
        };
        match serde_json::from_str(&raw) {
            Ok(transactions) => transactions,
            Err(e) => {
                warn!(key = TRANSACTIONS_KEY, error = %e, "discarding corrupt snapshot");
                Vec::new()
            }
        }
    }

    pub fn save_theme(&self, theme: Theme) -> Result<(), SnapshotError> {
        self.write_key(THEME_KEY, theme.as_str())
    }

    pub fn load_theme(&self) -> Theme {
        let Some(raw) = self.read_key(THEME_KEY) else {
            return Theme::default();
        };
        match Theme::parse(&raw) {
            Some(theme) => theme,
            None => {
                warn!(key = THEME_KEY, value = raw.trim(), "unknown saved theme, using default");
                Theme::default()
            }
        }
    }

    fn write_key(&self, key: &'static str, contents: &str) -> Result<(), SnapshotError> {
        fs::create_dir_all(&self.data_dir)
            .map_err(|source| SnapshotError::Write { key, source })?;
        fs::write(self.data_dir.join(key), contents)
            .map_err(|source| SnapshotError::Write { key, source })
    }

    /// Returns None when the key has never been written. Read failures on an
    /// existing file are logged and treated the same way.
    fn read_key(&self, key: &'static str) -> Option<String> {
        let path = self.data_dir.join(key);
        if !path.exists() {
            return None;
        }
        match fs::read_to_string(&path) {
            Ok(raw) => Some(raw),
            Err(e) => {
                warn!(key, error = %e, "failed to read saved value");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::transaction::TransactionType;
    use chrono::{NaiveDate, Utc};
    use rust_decimal::Decimal;

    fn create_test_transaction(id: &str, category: &str) -> Transaction {
        Transaction {
            id: id.to_string(),
            date: NaiveDate::from_ymd_opt(2025, 1, 15).unwrap(),
            transaction_type: TransactionType::Expense,
            amount: Decimal::new(4250, 2),
            category: category.to_string(),
            description: "Test Transaction".to_string(),
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    #[test]
    fn test_load_transactions_empty_when_never_saved() {
        let dir = tempfile::tempdir().unwrap();
        let store = SnapshotStore::new(dir.path());

        assert!(store.load_transactions().is_empty());
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = SnapshotStore::new(dir.path());

        let transactions = vec![
            create_test_transaction("a", "Food"),
            create_test_transaction("b", "Travel"),
        ];
        store.save_transactions(&transactions).unwrap();

        assert_eq!(store.load_transactions(), transactions);
    }

    #[test]
    fn test_save_displaces_prior_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let store = SnapshotStore::new(dir.path());

        store
            .save_transactions(&[create_test_transaction("a", "Food")])
            .unwrap();
        store
            .save_transactions(&[create_test_transaction("b", "Travel")])
            .unwrap();

        let loaded = store.load_transactions();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].id, "b");
    }

    #[test]
    fn test_corrupt_snapshot_degrades_to_empty() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(TRANSACTIONS_KEY), "{not json").unwrap();
        let store = SnapshotStore::new(dir.path());

        assert!(store.load_transactions().is_empty());
    }

    #[test]
    fn test_theme_round_trip_and_default() {
        let dir = tempfile::tempdir().unwrap();
        let store = SnapshotStore::new(dir.path());

        assert_eq!(store.load_theme(), Theme::Light);
        store.save_theme(Theme::Dark).unwrap();
        assert_eq!(store.load_theme(), Theme::Dark);
    }

    #[test]
    fn test_unknown_theme_falls_back_to_default() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(THEME_KEY), "sepia").unwrap();
        let store = SnapshotStore::new(dir.path());

        assert_eq!(store.load_theme(), Theme::Light);
    }
}
