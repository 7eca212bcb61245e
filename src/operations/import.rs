use std::fs::File;

use crate::operations::add::draft_from_fields;
use crate::operations::export::ExportDocument;
use crate::store::{StoreError, TransactionDraft, TransactionStore};

#[derive(Debug, Clone, Copy)]
pub enum ImportFormat {
    Csv,
    Json,
}

impl ImportFormat {
    pub fn parse(input: &str) -> Option<Self> {
        match input.to_lowercase().as_str() {
            "csv" => Some(ImportFormat::Csv),
            "json" => Some(ImportFormat::Json),
            _ => None,
        }
    }
}

/// Reads the whole file first and validates every record before adding any,
/// so a bad record anywhere in the file leaves the collection untouched.
/// Imported data passes the same validation as form entry and gets fresh ids
/// and creation timestamps.
pub fn import_transactions(
    store: &mut TransactionStore,
    format: ImportFormat,
    path: &str,
) -> Result<usize, String> {
    let drafts = match format {
        ImportFormat::Csv => read_csv(path)?,
        ImportFormat::Json => read_json(path)?,
    };

    for (index, draft) in drafts.iter().enumerate() {
        TransactionStore::validate(draft)
            .map_err(|e| format!("Record {}: {}", index + 1, StoreError::Invalid(e)))?;
    }

    let mut count = 0;
    for (index, draft) in drafts.into_iter().enumerate() {
        store
            .add(draft)
            .map_err(|e| format!("Record {}: {}", index + 1, e))?;
        count += 1;
    }
    Ok(count)
}

/// Headerless 5-column CSV: `date,description,amount,type,category`.
fn read_csv(path: &str) -> Result<Vec<TransactionDraft>, String> {
    let file = File::open(path).map_err(|e| format!("Failed to open file '{}': {}", path, e))?;

    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .has_headers(false)
        .from_reader(file);

    let mut drafts = Vec::new();
    for (line_index, result) in reader.records().enumerate() {
        let record =
            result.map_err(|e| format!("CSV parse error on line {}: {}", line_index + 1, e))?;

        if record.len() != 5 {
            return Err(format!(
                "Invalid number of columns on line {}: expected 5, got {}",
                line_index + 1,
                record.len()
            ));
        }

        let draft = draft_from_fields(
            record.get(0).unwrap_or(""),
            record.get(1).unwrap_or(""),
            record.get(2).unwrap_or(""),
            record.get(3).unwrap_or(""),
            record.get(4).unwrap_or(""),
        )
        .map_err(|e| format!("Line {}: {}", line_index + 1, e))?;

        drafts.push(draft);
    }

    Ok(drafts)
}

/// Wrapped JSON document, as produced by the JSON export.
fn read_json(path: &str) -> Result<Vec<TransactionDraft>, String> {
    let file = File::open(path).map_err(|e| format!("Failed to open file '{}': {}", path, e))?;

    let document: ExportDocument = serde_json::from_reader(file)
        .map_err(|e| format!("Failed to parse export document '{}': {}", path, e))?;

    Ok(document
        .transactions
        .into_iter()
        .map(|t| TransactionDraft {
            date: t.date,
            transaction_type: t.transaction_type,
            amount: t.amount,
            category: t.category,
            description: t.description,
        })
        .collect())
}
