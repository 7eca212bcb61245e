use std::fs;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::transaction::{Transaction, TransactionType};
use crate::operations::summary::{format_amount, totals};

pub const APP_NAME: &str = "NeoFin";
const EXPORT_VERSION: &str = "1.0";

/// Wrapper document for the JSON export/import path.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportDocument {
    pub app_name: String,
    pub export_date: DateTime<Utc>,
    pub version: String,
    pub transactions: Vec<Transaction>,
}

impl ExportDocument {
    pub fn new(transactions: Vec<Transaction>) -> Self {
        Self {
            app_name: APP_NAME.to_string(),
            export_date: Utc::now(),
            version: EXPORT_VERSION.to_string(),
            transactions,
        }
    }
}

/// Builds a self-contained HTML receipt: embedded styling, a summary block and
/// one table row per transaction. Suitable for saving or printing.
pub fn render_receipt(transactions: &[Transaction]) -> Result<String, String> {
    if transactions.is_empty() {
        return Err("No transactions to export.".to_string());
    }

    let summary = totals(transactions);
    let mut html = String::new();
    html.push_str(
        "<html><head><title>NeoFin Receipt</title><style>\n\
         body{font-family:Segoe UI,Tahoma,Geneva,Verdana,sans-serif;background:#fff;color:#222;margin:0;padding:0;}\n\
         .receipt-container{max-width:700px;margin:30px auto;padding:24px 18px;background:#fafbfc;border-radius:12px;box-shadow:0 2px 12px #0001;}\n\
         h2{text-align:center;margin-bottom:8px;}\n\
         .summary{margin-bottom:18px;}\n\
         .summary p{margin:4px 0;font-size:16px;}\n\
         table{border-collapse:collapse;width:100%;margin-top:12px;}\n\
         th,td{border:1px solid #ccc;padding:8px 10px;text-align:left;}\n\
         th{background:#f0f0f0;}\n\
         .income{color:#3ecf8e;}\n\
         .expense{color:#ff6b6b;}\n\
         .footer{text-align:center;margin-top:24px;font-size:13px;color:#888;}\n\
         </style></head><body>",
    );
    html.push_str("<div class=\"receipt-container\">");
    html.push_str("<h2>NeoFin - Transactions Receipt</h2>");
    html.push_str(&format!(
        "<div class=\"summary\">\
         <p><strong>Exported:</strong> {}</p>\
         <p><strong>Total Balance:</strong> ${}</p>\
         <p class=\"income\"><strong>Total Income:</strong> ${}</p>\
         <p class=\"expense\"><strong>Total Expense:</strong> ${}</p>\
         <p><strong>Transactions:</strong> {}</p>\
         </div>",
        Utc::now().format("%Y-%m-%d %H:%M:%S UTC"),
        format_amount(summary.balance),
        format_amount(summary.income),
        format_amount(summary.expense),
        transactions.len()
    ));
    html.push_str(
        "<table><thead><tr><th>Date</th><th>Type</th><th>Category</th>\
         <th>Description</th><th>Amount ($)</th></tr></thead><tbody>",
    );
    for transaction in transactions {
        let type_class = transaction.transaction_type.as_str();
        let type_label = match transaction.transaction_type {
            TransactionType::Income => "Income",
            TransactionType::Expense => "Expense",
        };
        html.push_str(&format!(
            "<tr><td>{}</td><td class=\"{}\">{}</td><td>{}</td><td>{}</td><td class=\"{}\">${}</td></tr>",
            transaction.date,
            type_class,
            type_label,
            escape_html(&transaction.category),
            escape_html(&transaction.description),
            type_class,
            format_amount(transaction.amount)
        ));
    }
    html.push_str("</tbody></table>");
    html.push_str("<div class=\"footer\">Exported by NeoFin Expense Tracker.</div>");
    html.push_str("</div></body></html>");

    Ok(html)
}

/// Renders the receipt and writes it next to the working directory as
/// `neofin_receipt_YYYY-MM-DD.html`. Returns the path written.
pub fn export_receipt(transactions: &[Transaction]) -> Result<PathBuf, String> {
    let html = render_receipt(transactions)?;
    let path = PathBuf::from(format!(
        "neofin_receipt_{}.html",
        Utc::now().format("%Y-%m-%d")
    ));
    write_export(&path, &html)?;
    Ok(path)
}

pub fn render_json(transactions: &[Transaction]) -> Result<String, String> {
    if transactions.is_empty() {
        return Err("No transactions to export.".to_string());
    }
    let document = ExportDocument::new(transactions.to_vec());
    serde_json::to_string_pretty(&document)
        .map_err(|e| format!("Failed to serialize transactions: {}", e))
}

pub fn export_json(transactions: &[Transaction]) -> Result<PathBuf, String> {
    let json = render_json(transactions)?;
    let path = PathBuf::from(format!(
        "neofin_export_{}.json",
        Utc::now().format("%Y-%m-%d")
    ));
    write_export(&path, &json)?;
    Ok(path)
}

/// Headerless 5-column CSV (`date,description,amount,type,category`), the same
/// shape the CSV import accepts.
pub fn render_csv(transactions: &[Transaction]) -> Result<String, String> {
    if transactions.is_empty() {
        return Err("No transactions to export.".to_string());
    }

    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());
    for transaction in transactions {
        writer
            .write_record([
                transaction.date.to_string(),
                transaction.description.clone(),
                transaction.amount.to_string(),
                transaction.transaction_type.as_str().to_string(),
                transaction.category.clone(),
            ])
            .map_err(|e| format!("Failed to write CSV record: {}", e))?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| format!("Failed to finish CSV output: {}", e))?;
    String::from_utf8(bytes).map_err(|e| format!("CSV output was not valid UTF-8: {}", e))
}

pub fn export_csv(transactions: &[Transaction]) -> Result<PathBuf, String> {
    let csv = render_csv(transactions)?;
    let path = PathBuf::from(format!(
        "neofin_export_{}.csv",
        Utc::now().format("%Y-%m-%d")
    ));
    write_export(&path, &csv)?;
    Ok(path)
}

fn write_export(path: &PathBuf, contents: &str) -> Result<(), String> {
    fs::write(path, contents).map_err(|e| format!("Failed to write '{}': {}", path.display(), e))
}

fn escape_html(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}
