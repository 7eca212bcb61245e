mod db;
mod models;
mod operations;
mod store;

use std::io;
use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use db::snapshot::SnapshotStore;
use models::transaction::{Transaction, TransactionType};
use operations::add::parse_entry_line;
use operations::calculator;
use operations::export;
use operations::import::{import_transactions, ImportFormat};
use operations::report::run_report;
use operations::summary::{expense_by_category, format_amount, monthly_flows, totals};
use store::{ListFilter, StoreError, TransactionStore, UNDO_WINDOW};

#[derive(Parser)]
#[command(name = "neofin", about = "Local personal finance tracker")]
struct Args {
    /// Directory holding the saved transactions and theme
    #[arg(long, default_value = "neofin_data")]
    data_dir: PathBuf,
}

pub enum UserCommands {
    Add,
    Edit,
    Remove,
    Undo,
    List,
    Search,
    Summary,
    Report,
    Export,
    Import,
    Calc,
    Theme,
    Exit,
    Unknown,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    let snapshot = SnapshotStore::new(&args.data_dir);
    let mut theme = snapshot.load_theme();
    let mut store = TransactionStore::open(snapshot.clone());

    println!(
        "Welcome to NeoFin! Loaded {} transactions ({} theme).",
        store.len(),
        theme.as_str()
    );

    loop {
        println!(
            "Please enter a command (add, edit, remove, undo, list, search, summary, report, export, import, calc, theme, exit):"
        );

        let input = match read_user_input() {
            Ok(cmd) => cmd,
            Err(e) => {
                println!("Error reading input: {}", e);
                continue;
            }
        };
        let parts: Vec<&str> = input.split_whitespace().collect();
        if parts.is_empty() {
            continue;
        }
        let command = check_for_command(parts[0]);
        let rest = input[parts[0].len()..].trim();

        match command {
            UserCommands::Add => {
                println!(
                    "Add command selected. Please enter transaction details in the format:\ndate(YYYY-MM-DD), description, amount, type(income/expense), category"
                );
                let details = match read_user_input() {
                    Ok(details) => details,
                    Err(e) => {
                        println!("Error reading input: {}", e);
                        continue;
                    }
                };
                match parse_entry_line(&details) {
                    Ok(draft) => match store.add(draft) {
                        Ok(transaction) => {
                            println!("Transaction added successfully! (id {})", transaction.id)
                        }
                        Err(StoreError::Invalid(errors)) => {
                            println!("Transaction rejected:");
                            for error in errors {
                                println!("  - {}: {}", error.field, error.reason);
                            }
                        }
                    },
                    Err(e) => println!("Error adding transaction: {}", e),
                }
                report_storage_warning(&mut store);
            }
            UserCommands::Edit => {
                println!("Edit command selected. Provide the transaction ID to edit:");
                let id = match read_user_input() {
                    Ok(id) => id,
                    Err(e) => {
                        println!("Error reading input: {}", e);
                        continue;
                    }
                };
                println!(
                    "Enter the new details in the format:\ndate(YYYY-MM-DD), description, amount, type(income/expense), category"
                );
                let details = match read_user_input() {
                    Ok(details) => details,
                    Err(e) => {
                        println!("Error reading input: {}", e);
                        continue;
                    }
                };
                match parse_entry_line(&details) {
                    Ok(draft) => match store.update(&id, draft) {
                        Ok(Some(_)) => println!("Transaction updated successfully!"),
                        Ok(None) => println!("No transaction with ID {}.", id),
                        Err(StoreError::Invalid(errors)) => {
                            println!("Update rejected:");
                            for error in errors {
                                println!("  - {}: {}", error.field, error.reason);
                            }
                        }
                    },
                    Err(e) => println!("Error updating transaction: {}", e),
                }
                report_storage_warning(&mut store);
            }
            UserCommands::Remove => {
                println!("Remove command selected. Provide the transaction ID to remove:");
                let id = match read_user_input() {
                    Ok(id) => id,
                    Err(e) => {
                        println!("Error reading input: {}", e);
                        continue;
                    }
                };
                match store.remove(&id) {
                    Some(removed) => println!(
                        "Removed '{}'. Type 'undo' within {} seconds to restore it.",
                        removed.description,
                        UNDO_WINDOW.as_secs()
                    ),
                    None => println!("No transaction with ID {}.", id),
                }
                report_storage_warning(&mut store);
            }
            UserCommands::Undo => {
                match store.undo_last_removal() {
                    Some(restored) => println!("Transaction '{}' restored!", restored.description),
                    None => println!("Nothing to undo (the undo window may have expired)."),
                }
                report_storage_warning(&mut store);
            }
            UserCommands::List => {
                let filter = if rest.is_empty() {
                    ListFilter::default()
                } else {
                    ListFilter {
                        text: Some(rest.to_string()),
                        ..Default::default()
                    }
                };
                let transactions = store.list(&filter);
                if transactions.is_empty() {
                    println!("No transactions found.");
                } else {
                    for transaction in &transactions {
                        print_transaction(transaction);
                    }
                }
            }
            UserCommands::Search => {
                println!("Search command selected. Provide the category to search for:");
                let category = match read_user_input() {
                    Ok(category) => category,
                    Err(e) => {
                        println!("Error reading input: {}", e);
                        continue;
                    }
                };
                let transactions = store.list(&ListFilter {
                    category: Some(category.clone()),
                    ..Default::default()
                });
                if transactions.is_empty() {
                    println!("No transactions found for category: {}", category);
                } else {
                    println!("Transactions found for category '{}':", category);
                    for transaction in &transactions {
                        print_transaction(transaction);
                    }
                }
            }
            UserCommands::Summary => {
                let summary = totals(store.all());
                println!("Income:   {}", format_amount(summary.income));
                println!("Expense:  {}", format_amount(summary.expense));
                println!("Balance:  {}", format_amount(summary.balance));

                let by_category = expense_by_category(store.all());
                if !by_category.is_empty() {
                    println!("Expenses by category:");
                    for (category, amount) in by_category {
                        println!("  {:<15} {:>12}", category, format_amount(amount));
                    }
                }

                let monthly = monthly_flows(store.all());
                if !monthly.is_empty() {
                    println!("Monthly flows:");
                    for (month, flow) in monthly {
                        println!(
                            "  {}  income {:>12}  expense {:>12}",
                            month,
                            format_amount(flow.income),
                            format_amount(flow.expense)
                        );
                    }
                }
            }
            UserCommands::Report => {
                if let Err(e) = run_report(store.all()) {
                    println!("Error: {}", e);
                }
            }
            UserCommands::Export => {
                let result = match rest {
                    "" | "html" => export::export_receipt(store.all()),
                    "json" => export::export_json(store.all()),
                    "csv" => export::export_csv(store.all()),
                    other => Err(format!("Unknown export format '{}'. Use html, json or csv.", other)),
                };
                match result {
                    Ok(path) => println!("Exported to {}.", path.display()),
                    Err(e) => println!("Error exporting transactions: {}", e),
                }
            }
            UserCommands::Import => {
                let mut import_args = rest.split_whitespace();
                match (import_args.next(), import_args.next()) {
                    (Some(format), Some(path)) => match ImportFormat::parse(format) {
                        Some(format) => match import_transactions(&mut store, format, path) {
                            Ok(count) => {
                                println!("Successfully imported {} transactions.", count)
                            }
                            Err(e) => println!("Error importing transactions: {}", e),
                        },
                        None => println!("Unknown import format '{}'. Use csv or json.", format),
                    },
                    _ => println!("Usage: import <csv|json> <path>"),
                }
                report_storage_warning(&mut store);
            }
            UserCommands::Calc => {
                let expression = if rest.is_empty() {
                    println!("Enter an expression (e.g. 12.50 * 3 + 4):");
                    match read_user_input() {
                        Ok(expression) => expression,
                        Err(e) => {
                            println!("Error reading input: {}", e);
                            continue;
                        }
                    }
                } else {
                    rest.to_string()
                };
                match calculator::evaluate(&expression) {
                    Ok(result) => println!("= {}", result),
                    Err(e) => println!("Error: {}", e),
                }
            }
            UserCommands::Theme => {
                theme = theme.toggled();
                if let Err(e) = snapshot.save_theme(theme) {
                    println!("Warning: failed to save theme: {}", e);
                }
                println!("Theme set to {}.", theme.as_str());
            }
            UserCommands::Exit => {
                println!("Exiting the application.");
                break;
            }
            UserCommands::Unknown => {
                println!("No valid command found. Type 'exit' to quit.");
            }
        }
    }
}

fn read_user_input() -> Result<String, String> {
    let mut input = String::new();
    io::stdin()
        .read_line(&mut input)
        .map_err(|_| "Failed to read line".to_string())?;
    Ok(input.trim().to_string())
}

fn check_for_command(input: &str) -> UserCommands {
    match input {
        "add" => UserCommands::Add,
        "edit" => UserCommands::Edit,
        "remove" => UserCommands::Remove,
        "undo" => UserCommands::Undo,
        "list" => UserCommands::List,
        "search" => UserCommands::Search,
        "summary" => UserCommands::Summary,
        "report" => UserCommands::Report,
        "export" => UserCommands::Export,
        "import" => UserCommands::Import,
        "calc" => UserCommands::Calc,
        "theme" => UserCommands::Theme,
        "exit" => UserCommands::Exit,
        _ => UserCommands::Unknown,
    }
}

fn print_transaction(transaction: &Transaction) {
    let sign = match transaction.transaction_type {
        TransactionType::Income => '+',
        TransactionType::Expense => '-',
    };
    println!(
        "{}  {}  {:<7}  {:<15}  {}{:>12}  {}",
        transaction.id,
        transaction.date,
        transaction.transaction_type.as_str(),
        transaction.category,
        sign,
        format_amount(transaction.amount),
        transaction.description
    );
}

fn report_storage_warning(store: &mut TransactionStore) {
    if let Some(warning) = store.take_storage_warning() {
        println!("Warning: {}", warning);
    }
}
