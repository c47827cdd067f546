use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};

use clap::ValueEnum;
use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
    Compact,
}

/// Global output settings
static FORMAT: AtomicU8 = AtomicU8::new(0);
static QUIET: AtomicBool = AtomicBool::new(false);

pub fn set_format(format: OutputFormat) {
    FORMAT.store(format as u8, Ordering::Relaxed);
}

pub fn format() -> OutputFormat {
    match FORMAT.load(Ordering::Relaxed) {
        1 => OutputFormat::Json,
        2 => OutputFormat::Compact,
        _ => OutputFormat::Table,
    }
}

pub fn set_quiet(quiet: bool) {
    QUIET.store(quiet, Ordering::Relaxed);
}

pub fn is_quiet() -> bool {
    QUIET.load(Ordering::Relaxed)
}

/// Print a list as a table, JSON, or one line per item
pub fn print_list<T, R, F, C>(items: &[T], to_row: F, to_line: C)
where
    T: Serialize,
    R: Tabled,
    F: Fn(&T) -> R,
    C: Fn(&T) -> String,
{
    match format() {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(items).unwrap_or_default());
        }
        OutputFormat::Compact => {
            for item in items {
                println!("{}", to_line(item));
            }
        }
        OutputFormat::Table => {
            let rows: Vec<R> = items.iter().map(to_row).collect();
            let table = Table::new(rows).with(Style::rounded()).to_string();
            println!("{table}");
        }
    }
}

/// Print a single item or JSON depending on output mode
pub fn print_item<T: Serialize>(item: &T, display: impl FnOnce(&T)) {
    if format() == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(item).unwrap_or_default());
    } else {
        display(item);
    }
}

/// Print a plain list of names
pub fn print_names(names: &[String]) {
    if format() == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(names).unwrap_or_default());
    } else {
        for name in names {
            println!("{name}");
        }
    }
}

/// Print a message (suppressed by --quiet, wrapped in an object in JSON mode)
pub fn print_message(message: &str) {
    if is_quiet() {
        return;
    }
    if format() == OutputFormat::Json {
        println!("{}", json_message("message", message));
    } else {
        println!("{message}");
    }
}

pub fn json_message(key: &str, message: &str) -> String {
    let mut object = serde_json::Map::new();
    object.insert(key.to_string(), message.into());
    serde_json::Value::Object(object).to_string()
}
