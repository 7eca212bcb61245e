use std::collections::BTreeMap;

use rust_decimal::{Decimal, RoundingStrategy};

use crate::models::transaction::{Transaction, TransactionType};

/// Income/expense totals over the whole collection. `balance` is always
/// exactly `income - expense`; amounts accumulate unrounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Totals {
    pub income: Decimal,
    pub expense: Decimal,
    pub balance: Decimal,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MonthFlow {
    pub income: Decimal,
    pub expense: Decimal,
}

pub fn totals(transactions: &[Transaction]) -> Totals {
    let mut income = Decimal::ZERO;
    let mut expense = Decimal::ZERO;
    for transaction in transactions {
        match transaction.transaction_type {
            TransactionType::Income => income += transaction.amount,
            TransactionType::Expense => expense += transaction.amount,
        }
    }
    Totals {
        income,
        expense,
        balance: income - expense,
    }
}

/// Summed expense amount per category, for the category chart. Categories
/// without any expense never appear.
pub fn expense_by_category(transactions: &[Transaction]) -> BTreeMap<String, Decimal> {
    let mut by_category = BTreeMap::new();
    for transaction in transactions {
        if transaction.transaction_type != TransactionType::Expense {
            continue;
        }
        let entry = by_category
            .entry(transaction.category.clone())
            .or_insert(Decimal::ZERO);
        *entry += transaction.amount;
    }
    by_category
}

/// Income and expense sums keyed by "YYYY-MM". BTreeMap ordering puts the
/// zero-padded keys in chronological order.
pub fn monthly_flows(transactions: &[Transaction]) -> BTreeMap<String, MonthFlow> {
    let mut monthly: BTreeMap<String, MonthFlow> = BTreeMap::new();
    for transaction in transactions {
        let flow = monthly.entry(transaction.month_key()).or_default();
        match transaction.transaction_type {
            TransactionType::Income => flow.income += transaction.amount,
            TransactionType::Expense => flow.expense += transaction.amount,
        }
    }
    monthly
}

/// Formats an amount with two decimal places and thousands separators, e.g.
/// `1,234.50`. Rounding happens here only; aggregation stays exact.
pub fn format_amount(amount: Decimal) -> String {
    let rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    let raw = rounded.abs().to_string();
    let (int_part, frac_part) = match raw.split_once('.') {
        Some((int_part, frac_part)) => (int_part.to_string(), format!("{:0<2}", frac_part)),
        None => (raw, "00".to_string()),
    };

    let mut grouped = String::new();
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if rounded.is_sign_negative() { "-" } else { "" };
    format!("{}{}.{}", sign, grouped, frac_part)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Utc};
    use std::str::FromStr;

    fn create_test_transaction(
        date: &str,
        transaction_type: TransactionType,
        amount: &str,
        category: &str,
    ) -> Transaction {
        Transaction {
            id: uuid::Uuid::new_v4().to_string(),
            date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
            transaction_type,
            amount: Decimal::from_str(amount).unwrap(),
            category: category.to_string(),
            description: "Test Transaction".to_string(),
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    #[test]
    fn test_totals_on_empty_collection() {
        let result = totals(&[]);
        assert_eq!(result.income, Decimal::ZERO);
        assert_eq!(result.expense, Decimal::ZERO);
        assert_eq!(result.balance, Decimal::ZERO);
    }

    #[test]
    fn test_totals_and_monthly_flows_scenario() {
        let transactions = vec![
            create_test_transaction("2024-01-05", TransactionType::Income, "1000", "Salary"),
            create_test_transaction("2024-01-10", TransactionType::Expense, "200", "Food"),
        ];

        let result = totals(&transactions);
        assert_eq!(result.income, Decimal::from_str("1000").unwrap());
        assert_eq!(result.expense, Decimal::from_str("200").unwrap());
        assert_eq!(result.balance, Decimal::from_str("800").unwrap());

        let monthly = monthly_flows(&transactions);
        assert_eq!(monthly.len(), 1);
        let january = &monthly["2024-01"];
        assert_eq!(january.income, Decimal::from_str("1000").unwrap());
        assert_eq!(january.expense, Decimal::from_str("200").unwrap());
    }

    #[test]
    fn test_balance_equals_income_minus_expense() {
        let transactions = vec![
            create_test_transaction("2024-01-05", TransactionType::Income, "10.10", "Salary"),
            create_test_transaction("2024-02-06", TransactionType::Income, "0.01", "Gift"),
            create_test_transaction("2024-02-07", TransactionType::Expense, "3.33", "Food"),
            create_test_transaction("2024-03-08", TransactionType::Expense, "6.78", "Travel"),
        ];

        let result = totals(&transactions);
        assert_eq!(result.balance, result.income - result.expense);
        assert_eq!(result.balance, Decimal::from_str("0.00").unwrap());
    }

    #[test]
    fn test_expense_by_category_sums_and_omits_zero_entries() {
        let transactions = vec![
            create_test_transaction("2024-01-05", TransactionType::Expense, "30", "Food"),
            create_test_transaction("2024-01-06", TransactionType::Expense, "20", "Food"),
            create_test_transaction("2024-01-07", TransactionType::Expense, "50", "Travel"),
            create_test_transaction("2024-01-08", TransactionType::Income, "500", "Salary"),
        ];

        let by_category = expense_by_category(&transactions);
        assert_eq!(by_category.len(), 2);
        assert_eq!(by_category["Food"], Decimal::from_str("50").unwrap());
        assert_eq!(by_category["Travel"], Decimal::from_str("50").unwrap());
    }

    #[test]
    fn test_monthly_flows_keys_sorted_ascending() {
        let transactions = vec![
            create_test_transaction("2024-11-05", TransactionType::Expense, "10", "Food"),
            create_test_transaction("2023-12-05", TransactionType::Income, "20", "Salary"),
            create_test_transaction("2024-02-05", TransactionType::Expense, "30", "Travel"),
        ];

        let keys: Vec<String> = monthly_flows(&transactions).into_keys().collect();
        assert_eq!(keys, vec!["2023-12", "2024-02", "2024-11"]);
    }

    #[test]
    fn test_format_amount() {
        assert_eq!(format_amount(Decimal::from_str("0").unwrap()), "0.00");
        assert_eq!(format_amount(Decimal::from_str("3.5").unwrap()), "3.50");
        assert_eq!(format_amount(Decimal::from_str("1234.567").unwrap()), "1,234.57");
        assert_eq!(
            format_amount(Decimal::from_str("9876543.21").unwrap()),
            "9,876,543.21"
        );
        assert_eq!(format_amount(Decimal::from_str("-1234.5").unwrap()), "-1,234.50");
    }
}
