//! Table and JSON output formatting for CLI commands.

use serde::Serialize;
use tabled::{Table, Tabled};

use userhub_auth::PublicUser;

/// Output format selection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table
    #[default]
    Table,
    /// JSON output
    Json,
}

/// One session as a table row.
#[derive(Debug, Serialize, Tabled)]
pub struct SessionRow {
    /// Session ID
    pub id: String,
    /// Client
    pub who: String,
    /// Origin
    pub from: String,
    /// Created at
    pub created: String,
    /// Expires at
    pub expires: String,
}

impl SessionRow {
    /// Rows for every session of `user`.
    pub fn from_user(user: &PublicUser) -> Vec<Self> {
        user.sessions
            .iter()
            .map(|s| SessionRow {
                id: s.id.clone(),
                who: s.who.clone(),
                from: s.from.clone(),
                created: s.created_at.format("%Y-%m-%d %H:%M").to_string(),
                expires: s
                    .expires_at
                    .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
                    .unwrap_or_else(|| "never".to_string()),
            })
            .collect()
    }
}

/// Print a list of items in the selected format
pub fn print_list<T: Serialize + Tabled>(items: &[T], format: OutputFormat) {
    match format {
        OutputFormat::Table => {
            if items.is_empty() {
                println!("No results found.");
            } else {
                println!("{}", Table::new(items));
            }
        }
        OutputFormat::Json => print_json(items),
    }
}

/// Print one user with their sessions
pub fn print_user(user: &PublicUser, format: OutputFormat) {
    match format {
        OutputFormat::Table => {
            print_kv("User", &user.user);
            print_kv("Groups", &user.groups.join(", "));
            print_kv("Sessions", &user.sessions.len().to_string());
            let rows = SessionRow::from_user(user);
            if !rows.is_empty() {
                println!("{}", Table::new(rows));
            }
        }
        OutputFormat::Json => print_json(user),
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{}", json),
        Err(e) => print_error(&format!("Failed to encode output: {e}")),
    }
}

/// Print a success message
pub fn print_success(msg: &str) {
    println!("✓ {}", msg);
}

/// Print a warning message
pub fn print_warning(msg: &str) {
    println!("⚠ {}", msg);
}

/// Print an error message
pub fn print_error(msg: &str) {
    eprintln!("✗ {}", msg);
}

/// Print a key-value pair
pub fn print_kv(key: &str, value: &str) {
    println!("  {:<12} {}", format!("{}:", key), value);
}
