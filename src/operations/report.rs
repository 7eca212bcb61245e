use crossterm::{
    event::{self, Event, KeyCode},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::widgets::canvas::{Canvas, Points};
use ratatui::{
    prelude::{Alignment, Color, Constraint, Direction, Layout, Modifier, Rect, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use std::cmp::max;
use std::collections::HashMap;
use std::io;

use crate::models::transaction::Transaction;
use crate::operations::summary::{
    expense_by_category, format_amount, monthly_flows, totals, MonthFlow, Totals,
};

/// Full-screen dashboard: monthly income/expense bars on top, expense share
/// pie and category breakdown below. Press q or Esc to leave.
pub fn run_report(transactions: &[Transaction]) -> Result<(), String> {
    if transactions.is_empty() {
        return Err("No transactions to report on.".to_string());
    }

    let data = build_dashboard(transactions);
    render_dashboard(&data)
}

struct DashboardData {
    months: Vec<(String, MonthFlow)>,
    category_totals: Vec<(String, Decimal)>,
    category_colors: HashMap<String, Color>,
    totals: Totals,
}

fn build_dashboard(transactions: &[Transaction]) -> DashboardData {
    let months: Vec<(String, MonthFlow)> = monthly_flows(transactions).into_iter().collect();

    let mut category_totals: Vec<(String, Decimal)> =
        expense_by_category(transactions).into_iter().collect();
    category_totals.sort_by(|a, b| b.1.cmp(&a.1));

    let categories: Vec<String> = category_totals.iter().map(|(c, _)| c.clone()).collect();
    let category_colors = assign_colors(&categories);

    DashboardData {
        months,
        category_totals,
        category_colors,
        totals: totals(transactions),
    }
}

fn assign_colors(categories: &[String]) -> HashMap<String, Color> {
    let palette = vec![
        Color::Cyan,
        Color::Magenta,
        Color::Yellow,
        Color::Green,
        Color::Blue,
        Color::Red,
        Color::LightCyan,
        Color::LightMagenta,
        Color::LightYellow,
        Color::LightGreen,
        Color::LightBlue,
    ];

    let mut map = HashMap::new();
    for (idx, category) in categories.iter().enumerate() {
        map.insert(category.clone(), palette[idx % palette.len()]);
    }
    map
}

fn render_dashboard(data: &DashboardData) -> Result<(), String> {
    enable_raw_mode().map_err(|e| format!("Failed to enable raw mode: {}", e))?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)
        .map_err(|e| format!("Failed to enter alternate screen: {}", e))?;

    let result = (|| {
        let backend = ratatui::backend::CrosstermBackend::new(stdout);
        let mut terminal = ratatui::Terminal::new(backend)
            .map_err(|e| format!("Failed to initialize terminal: {}", e))?;

        loop {
            terminal
                .draw(|frame| {
                    let size = frame.area();
                    let layout = Layout::default()
                        .direction(Direction::Vertical)
                        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
                        .split(size);

                    render_monthly_chart(frame, layout[0], data);

                    let bottom = Layout::default()
                        .direction(Direction::Horizontal)
                        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
                        .split(layout[1]);

                    render_expense_pie(frame, bottom[0], data);
                    render_summary_panel(frame, bottom[1], data);
                })
                .map_err(|e| format!("Failed to draw terminal UI: {}", e))?;

            if event::poll(std::time::Duration::from_millis(250))
                .map_err(|e| format!("Failed to poll input: {}", e))?
            {
                match event::read().map_err(|e| format!("Failed to read input: {}", e))? {
                    Event::Key(key) if key.code == KeyCode::Char('q') => break,
                    Event::Key(key) if key.code == KeyCode::Esc => break,
                    Event::Resize(_, _) => continue,
                    _ => {}
                }
            }
        }

        Ok(())
    })();

    disable_raw_mode().map_err(|e| format!("Failed to disable raw mode: {}", e))?;
    let mut stdout = io::stdout();
    execute!(stdout, LeaveAlternateScreen)
        .map_err(|e| format!("Failed to leave alternate screen: {}", e))?;

    result
}

fn render_monthly_chart(frame: &mut ratatui::Frame, area: Rect, data: &DashboardData) {
    let inner = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(2)])
        .split(area);

    let block = Block::default()
        .title(Line::from(vec![Span::styled(
            "Monthly Income (green) vs Expense (red)  (press q to exit)",
            Style::default().fg(Color::White),
        )]))
        .borders(Borders::ALL);

    let chart_area = block.inner(inner[0]);
    frame.render_widget(block, inner[0]);

    let bar_height = chart_area.height.saturating_sub(1) as usize;
    if bar_height == 0 || data.months.is_empty() {
        return;
    }

    let month_width = max(4, chart_area.width as usize / data.months.len());
    let bar_width = max(1, (month_width - 1) / 2);
    let gap = month_width - bar_width * 2;

    let max_value = data
        .months
        .iter()
        .map(|(_, flow)| {
            flow.income
                .max(flow.expense)
                .to_f64()
                .unwrap_or(0.0)
        })
        .fold(0.0_f64, f64::max)
        .max(1.0);

    let mut lines: Vec<Line> = Vec::new();
    for row in 0..bar_height {
        let level = (bar_height - row) as f64;
        let mut spans: Vec<Span> = Vec::new();

        for (_, flow) in &data.months {
            for (value, color) in [(flow.income, Color::Green), (flow.expense, Color::Red)] {
                let amount = value.to_f64().unwrap_or(0.0);
                let scaled_height = (amount / max_value * bar_height as f64).ceil();
                if amount > 0.0 && level <= scaled_height {
                    spans.push(Span::styled(
                        "█".repeat(bar_width),
                        Style::default().fg(color),
                    ));
                } else {
                    spans.push(Span::raw(" ".repeat(bar_width)));
                }
            }
            spans.push(Span::raw(" ".repeat(gap)));
        }
        lines.push(Line::from(spans));
    }

    let chart = Paragraph::new(lines).alignment(Alignment::Left);
    frame.render_widget(chart, chart_area);

    let labels = build_month_labels(&data.months, month_width);
    let label_paragraph = Paragraph::new(labels)
        .alignment(Alignment::Left)
        .block(Block::default().borders(Borders::NONE));
    frame.render_widget(label_paragraph, inner[1]);
}

fn build_month_labels(months: &[(String, MonthFlow)], month_width: usize) -> Vec<Line> {
    if months.is_empty() {
        return vec![Line::from("")];
    }

    let mut spans = Vec::new();
    for (key, _) in months {
        let mut label = key.clone();
        if label.len() > month_width {
            label.truncate(month_width);
        }
        let padded = format!("{:width$}", label, width = month_width);
        spans.push(Span::raw(padded));
    }

    vec![Line::from(spans)]
}

fn render_expense_pie(frame: &mut ratatui::Frame, area: Rect, data: &DashboardData) {
    let block = Block::default()
        .title("Expense Share by Category")
        .borders(Borders::ALL);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    if data.totals.expense <= Decimal::ZERO {
        let empty = Paragraph::new("No expenses recorded").alignment(Alignment::Center);
        frame.render_widget(empty, inner);
        return;
    }

    let mut slices = Vec::new();
    let total = data.totals.expense.to_f64().unwrap_or(1.0).max(1.0);
    let mut start_angle = 0.0_f64;
    for (category, amount) in &data.category_totals {
        let value = amount.to_f64().unwrap_or(0.0);
        let ratio = value / total;
        let sweep = ratio * std::f64::consts::TAU;
        slices.push((start_angle, start_angle + sweep, category.clone()));
        start_angle += sweep;
    }

    let canvas = Canvas::default()
        .x_bounds([-1.0, 1.0])
        .y_bounds([-1.0, 1.0])
        .paint(|ctx| {
            let step = 0.04;
            for (start, end, category) in &slices {
                let color = data
                    .category_colors
                    .get(category)
                    .copied()
                    .unwrap_or(Color::White);
                let mut points = Vec::new();
                let mut r = 0.0;
                while r <= 1.0 {
                    let mut angle = *start;
                    while angle <= *end {
                        points.push((r * angle.cos(), r * angle.sin()));
                        angle += 0.05;
                    }
                    r += step;
                }
                if !points.is_empty() {
                    ctx.draw(&Points {
                        coords: &points,
                        color,
                    });
                }
            }
        });

    frame.render_widget(canvas, inner);
}

fn render_summary_panel(frame: &mut ratatui::Frame, area: Rect, data: &DashboardData) {
    let block = Block::default().title("Summary").borders(Borders::ALL);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let bold = Style::default()
        .fg(Color::White)
        .add_modifier(Modifier::BOLD);

    let mut lines = vec![
        Line::from(vec![
            Span::styled("Income   ", Style::default().fg(Color::Green)),
            Span::raw(format!("{:>12}", format_amount(data.totals.income))),
        ]),
        Line::from(vec![
            Span::styled("Expense  ", Style::default().fg(Color::Red)),
            Span::raw(format!("{:>12}", format_amount(data.totals.expense))),
        ]),
        Line::from(vec![
            Span::styled("Balance  ", bold),
            Span::raw(format!("{:>12}", format_amount(data.totals.balance))),
        ]),
        Line::from(""),
        Line::from(vec![
            Span::styled("Category", bold),
            Span::raw("  "),
            Span::styled("Amount", bold),
        ]),
    ];

    for (category, amount) in &data.category_totals {
        let color = data
            .category_colors
            .get(category)
            .copied()
            .unwrap_or(Color::White);
        lines.push(Line::from(vec![
            Span::styled(format!("{:15}", category), Style::default().fg(color)),
            Span::raw("  "),
            Span::styled(
                format!("{:>12}", format_amount(*amount)),
                Style::default().fg(color),
            ),
        ]));
    }

    let paragraph = Paragraph::new(lines).alignment(Alignment::Left);
    frame.render_widget(paragraph, inner);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::transaction::TransactionType;
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
    fn test_run_report_refuses_empty_collection() {
        let result = run_report(&[]);
        assert!(result.is_err());
        assert!(result.unwrap_err().contains("No transactions"));
    }

    #[test]
    fn test_build_dashboard_orders_months_and_categories() {
        let transactions = vec![
            create_test_transaction("2024-02-01", TransactionType::Expense, "50", "Travel"),
            create_test_transaction("2024-01-05", TransactionType::Income, "1000", "Salary"),
            create_test_transaction("2024-01-10", TransactionType::Expense, "30", "Food"),
            create_test_transaction("2024-01-11", TransactionType::Expense, "45", "Food"),
        ];

        let data = build_dashboard(&transactions);

        let month_keys: Vec<&str> = data.months.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(month_keys, vec!["2024-01", "2024-02"]);

        // Category totals sorted by spend, largest first.
        assert_eq!(data.category_totals[0].0, "Food");
        assert_eq!(data.category_totals[0].1, Decimal::from_str("75").unwrap());
        assert_eq!(data.category_totals[1].0, "Travel");

        assert!(data.category_colors.contains_key("Food"));
        assert!(data.category_colors.contains_key("Travel"));
        assert_eq!(data.totals.balance, Decimal::from_str("875").unwrap());
    }

    #[test]
    fn test_month_labels_fit_column_width() {
        let months = vec![
            ("2024-01".to_string(), MonthFlow::default()),
            ("2024-02".to_string(), MonthFlow::default()),
        ];

        let lines = build_month_labels(&months, 5);
        let rendered: String = lines[0].spans.iter().map(|s| s.content.clone()).collect();
        assert_eq!(rendered, "2024-2024-");
    }
}
