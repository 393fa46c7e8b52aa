use std::io::{self, IsTerminal};

use anyhow::Result;
use colored::*;
use odata_query::{Properties, Value};

use crate::formatters::Formatter;

/// Formateur au format texte
pub struct TextFormatter {
    /// Indique si les couleurs sont activées
    colored: bool,
}

impl TextFormatter {
    /// Crée un nouveau formateur texte
    pub fn new() -> Self {
        TextFormatter {
            colored: io::stdout().is_terminal(),
        }
    }
}

impl Formatter for TextFormatter {
    fn format_query(&self, query: &str) -> String {
        if self.colored {
            format!("{}", query.cyan())
        } else {
            query.to_string()
        }
    }

    fn format_value(&self, value: &Value) -> Result<String> {
        Ok(format!("{}", value))
    }

    fn format_entries(&self, entries: &[Properties]) -> Result<String> {
        let blocks: Vec<String> = entries
            .iter()
            .enumerate()
            .map(|(i, entry)| {
                let header = format!("[{}]", i);
                let header = if self.colored {
                    header.bold().to_string()
                } else {
                    header
                };
                let lines: Vec<String> = entry
                    .iter()
                    .map(|(key, value)| format!("  {}: {}", key, value))
                    .collect();
                format!("{}\n{}", header, lines.join("\n"))
            })
            .collect();
        Ok(blocks.join("\n"))
    }

    fn format_names(&self, names: &[String]) -> Result<String> {
        Ok(names.join("\n"))
    }

    fn format_error(&self, error: &str) -> String {
        if self.colored {
            format!("{}", error.red().bold())
        } else {
            format!("Erreur: {}", error)
        }
    }

    fn format_info(&self, info: &str) -> String {
        if self.colored {
            format!("{}", info.blue())
        } else {
            format!("Info: {}", info)
        }
    }

    fn format_success(&self, success: &str) -> String {
        if self.colored {
            format!("{}", success.green().bold())
        } else {
            format!("Succès: {}", success)
        }
    }
}
