use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::models::transaction::TransactionType;
use crate::store::TransactionDraft;

const MAX_DESCRIPTION_LEN: usize = 255;
const MAX_CATEGORY_LEN: usize = 50;

/// Parses one entry line in the format
/// `date(YYYY-MM-DD), description, amount, type(income/expense), category`
/// into a draft. Field-level rules (positive amount, known category) are
/// enforced later by the store; this only gets the raw text into typed form.
pub fn parse_entry_line(input: &str) -> Result<TransactionDraft, String> {
    let parts: Vec<&str> = input.split(',').map(|s| s.trim()).collect();
    if parts.len() != 5 {
        return Err(format!(
            "Invalid number of details provided. Expected 5 details separated by commas but got {}",
            parts.len()
        ));
    }
    draft_from_fields(parts[0], parts[1], parts[2], parts[3], parts[4])
}

/// Shared by the entry line parser and the CSV import path so both accept
/// exactly the same field formats.
pub fn draft_from_fields(
    date: &str,
    description: &str,
    amount: &str,
    transaction_type: &str,
    category: &str,
) -> Result<TransactionDraft, String> {
    let date = NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .map_err(|_| "Invalid date format. Please use YYYY-MM-DD.".to_string())?;

    let amount = amount.parse::<Decimal>().map_err(|_| {
        format!(
            "Invalid amount format '{}'. Please provide a valid decimal number.",
            amount
        )
    })?;

    let transaction_type = TransactionType::parse(transaction_type)
        .ok_or_else(|| "Invalid transaction type. Use 'income' or 'expense'.".to_string())?;

    if description.len() > MAX_DESCRIPTION_LEN {
        return Err("Description too long".to_string());
    }

    if category.len() > MAX_CATEGORY_LEN {
        return Err("Category too long".to_string());
    }

    Ok(TransactionDraft {
        date,
        transaction_type,
        amount,
        category: category.to_string(),
        description: description.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_parse_entry_line_success() {
        let draft = parse_entry_line("2024-01-10, Groceries, 200.50, expense, Food").unwrap();
        assert_eq!(draft.date, NaiveDate::from_ymd_opt(2024, 1, 10).unwrap());
        assert_eq!(draft.description, "Groceries");
        assert_eq!(draft.amount, Decimal::from_str("200.50").unwrap());
        assert_eq!(draft.transaction_type, TransactionType::Expense);
        assert_eq!(draft.category, "Food");
    }

    #[test]
    fn test_parse_entry_line_wrong_field_count() {
        let result = parse_entry_line("2024-01-10, Groceries, 200.50, expense");
        assert!(result.is_err());
        assert!(result.unwrap_err().contains("Expected 5 details"));
    }

    #[test]
    fn test_parse_entry_line_bad_date() {
        let result = parse_entry_line("10.01.2024, Groceries, 200.50, expense, Food");
        assert!(result.is_err());
        assert!(result.unwrap_err().contains("Invalid date"));
    }

    #[test]
    fn test_parse_entry_line_bad_amount() {
        let result = parse_entry_line("2024-01-10, Groceries, lots, expense, Food");
        assert!(result.is_err());
        assert!(result.unwrap_err().contains("Invalid amount"));
    }

    #[test]
    fn test_parse_entry_line_bad_type() {
        let result = parse_entry_line("2024-01-10, Groceries, 200.50, transfer, Food");
        assert!(result.is_err());
        assert!(result.unwrap_err().contains("Invalid transaction type"));
    }

    #[test]
    fn test_parse_entry_line_description_too_long() {
        let long = "x".repeat(300);
        let line = format!("2024-01-10, {}, 200.50, expense, Food", long);
        let result = parse_entry_line(&line);
        assert!(result.is_err());
        assert!(result.unwrap_err().contains("Description too long"));
    }
}
