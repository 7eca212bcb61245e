use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    Income,
    Expense,
}

impl TransactionType {
    pub fn as_str(self) -> &'static str {
        match self {
            TransactionType::Income => "income",
            TransactionType::Expense => "expense",
        }
    }

    pub fn parse(input: &str) -> Option<Self> {
        match input.to_lowercase().as_str() {
            "income" => Some(TransactionType::Income),
            "expense" => Some(TransactionType::Expense),
            _ => None,
        }
    }
}

pub const INCOME_CATEGORIES: [&str; 5] =
    ["Salary", "Freelance", "Investment", "Gift", "Other Income"];

pub const EXPENSE_CATEGORIES: [&str; 10] = [
    "Food",
    "Transportation",
    "Housing",
    "Entertainment",
    "Shopping",
    "Utilities",
    "Health",
    "Education",
    "Travel",
    "Other Expense",
];

pub fn categories_for(transaction_type: TransactionType) -> &'static [&'static str] {
    match transaction_type {
        TransactionType::Income => &INCOME_CATEGORIES,
        TransactionType::Expense => &EXPENSE_CATEGORIES,
    }
}

/// Looks up `category` in the list for the given type, ignoring case, and
/// returns the canonical spelling so stored records group consistently.
pub fn resolve_category(transaction_type: TransactionType, category: &str) -> Option<&'static str> {
    categories_for(transaction_type)
        .iter()
        .find(|known| known.eq_ignore_ascii_case(category.trim()))
        .copied()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: String,
    pub date: NaiveDate,
    #[serde(rename = "type")]
    pub transaction_type: TransactionType,
    pub amount: Decimal,
    pub category: String,
    pub description: String,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "updatedAt", skip_serializing_if = "Option::is_none", default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Transaction {
    /// Grouping key for monthly aggregation, e.g. "2024-01".
    pub fn month_key(&self) -> String {
        self.date.format("%Y-%m").to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_transaction_type() {
        assert_eq!(TransactionType::parse("income"), Some(TransactionType::Income));
        assert_eq!(TransactionType::parse("EXPENSE"), Some(TransactionType::Expense));
        assert_eq!(TransactionType::parse("transfer"), None);
    }

    #[test]
    fn test_resolve_category_case_insensitive() {
        assert_eq!(resolve_category(TransactionType::Expense, "food"), Some("Food"));
        assert_eq!(resolve_category(TransactionType::Income, " SALARY "), Some("Salary"));
    }

    #[test]
    fn test_resolve_category_respects_type() {
        assert_eq!(resolve_category(TransactionType::Income, "Food"), None);
        assert_eq!(resolve_category(TransactionType::Expense, "Salary"), None);
    }

    #[test]
    fn test_month_key() {
        let transaction = Transaction {
            id: "t1".to_string(),
            date: NaiveDate::from_ymd_opt(2024, 1, 5).unwrap(),
            transaction_type: TransactionType::Income,
            amount: Decimal::new(100000, 2),
            category: "Salary".to_string(),
            description: "Jan pay".to_string(),
            created_at: Utc::now(),
            updated_at: None,
        };
        assert_eq!(transaction.month_key(), "2024-01");
    }
}
