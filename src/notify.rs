use colored::Colorize;

use crate::output::{self, OutputFormat};

/// Transient notifications raised by forms.
pub trait Notifier {
    fn success(&self, message: &str);
    fn error(&self, message: &str);
}

/// Prints notifications to the terminal, honoring the global output mode.
#[derive(Debug, Default)]
pub struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn success(&self, message: &str) {
        if output::is_quiet() {
            return;
        }
        match output::format() {
            OutputFormat::Json => println!("{}", output::json_message("success", message)),
            _ => println!("{} {}", "✓".green().bold(), message.green()),
        }
    }

    fn error(&self, message: &str) {
        match output::format() {
            OutputFormat::Json => eprintln!("{}", output::json_message("error", message)),
            _ => eprintln!("{} {}", "✗".red().bold(), message.red()),
        }
    }
}
