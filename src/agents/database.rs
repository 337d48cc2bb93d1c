use crate::db::{company::COMPANY_SCHEMA, Cell, QueryResult, SqlStore};
use crate::llm::LLMClient;
use crate::tools::{Tool, ToolContext, DATABASE_QUERY};
use crate::types::{AppError, Result};
use async_trait::async_trait;
use std::sync::Arc;

/// Keywords that mark a statement as data-mutating.
const FORBIDDEN_KEYWORDS: [&str; 4] = ["drop", "delete", "update", "insert"];

/// Substrings that switch a row to currency formatting.
const CURRENCY_HINTS: [&str; 2] = ["salary", "budget"];

/// Natural-language questions over the employees/departments store.
pub struct DatabaseAgent {
    llm: Arc<dyn LLMClient>,
    store: Arc<dyn SqlStore>,
}

impl DatabaseAgent {
    pub fn new(llm: Arc<dyn LLMClient>, store: Arc<dyn SqlStore>) -> Self {
        Self { llm, store }
    }

    /// Ask the model for a single SQL statement answering `question`.
    pub async fn generate_sql(&self, question: &str) -> Result<String> {
        let system = format!(
            "You are a SQL expert. Use this schema:\n{}\n\
             Return ONLY the SQL query without any explanation or markdown formatting.",
            COMPANY_SCHEMA
        );
        let raw = self
            .llm
            .generate_with_system(&system, &format!("Generate SQL for: {}", question))
            .await?;
        Ok(clean_sql(&raw))
    }

    pub async fn run(&self, question: &str) -> Result<String> {
        let sql = self.generate_sql(question).await?;
        tracing::info!(%sql, "Generated SQL");

        let sql = validate_sql(&sql)?;
        let result = self.store.query(sql).await?;
        Ok(format_results(&result))
    }
}

/// Strip markdown fences and fold the statement onto one line.
pub fn clean_sql(raw: &str) -> String {
    raw.trim()
        .replace("```sql", "")
        .replace("```SQL", "")
        .replace("```", "")
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Reject any statement containing a data-mutating keyword, case-insensitively.
///
/// The check is a plain substring match, so identifiers such as
/// `updated_at` are rejected too.
pub fn validate_sql(sql: &str) -> Result<&str> {
    let lower = sql.to_lowercase();
    if FORBIDDEN_KEYWORDS.iter().any(|kw| lower.contains(kw)) {
        return Err(AppError::QueryRejected(
            "Only SELECT queries are allowed".to_string(),
        ));
    }
    Ok(sql)
}

/// Render a result set as text.
///
/// Single-column results are one value per line. Wider results are
/// tab-separated rows; floats get two decimals, and a `$` prefix with
/// thousands separators when the row looks like money (a `salary` or
/// `budget` column, or a text cell mentioning either).
pub fn format_results(result: &QueryResult) -> String {
    if result.is_empty() {
        return "No results found".to_string();
    }

    if result.columns.len() == 1 {
        return result
            .rows
            .iter()
            .filter_map(|row| row.first().map(Cell::to_string))
            .collect::<Vec<_>>()
            .join("\n");
    }

    let currency_columns = result.columns.iter().any(|c| mentions_currency(c));
    result
        .rows
        .iter()
        .map(|row| {
            let currency = currency_columns
                || row.iter().any(|cell| match cell {
                    Cell::Text(s) => mentions_currency(s),
                    _ => false,
                });
            row.iter()
                .map(|cell| match cell {
                    Cell::Real(value) if currency => format_currency(*value),
                    Cell::Real(value) => format!("{:.2}", value),
                    other => other.to_string(),
                })
                .collect::<Vec<_>>()
                .join("\t")
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn mentions_currency(text: &str) -> bool {
    let lower = text.to_lowercase();
    CURRENCY_HINTS.iter().any(|hint| lower.contains(hint))
}

/// `75000.0` -> `$75,000.00`
pub fn format_currency(value: f64) -> String {
    let fixed = format!("{:.2}", value.abs());
    let (whole, cents) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, digit) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    let sign = if value < 0.0 { "-" } else { "" };
    format!("${}{}.{}", sign, grouped, cents)
}

#[async_trait]
impl Tool for DatabaseAgent {
    fn name(&self) -> &str {
        DATABASE_QUERY
    }

    fn description(&self) -> &str {
        "Use this tool ONLY for questions about employees, departments, salaries, or budgets. \
         Examples: 'Who has the highest salary?', 'What is the budget for the Engineering department?'"
    }

    async fn invoke(&self, argument: &str, _context: &ToolContext<'_>) -> String {
        match self.run(argument).await {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!(error = %e, "Database query failed");
                format!("Error: {}", e)
            }
        }
    }
}
